//! Translation of the backend's `user_input_form` into a tool input schema.
//!
//! The produced value is the JSON-Schema-shaped object MCP clients expect:
//! `{ "type": "object", "properties": {...}, "required": [...] }`. Every
//! recognized control becomes a string-typed property named by its
//! `variable` and described by its `label`; `select` controls additionally
//! carry their option set as an `enum`. Unrecognized control kinds
//! (uploads, images, future widgets) contribute nothing.

use agentx_types::{FormField, FormFieldEntry};
use serde_json::{Map, Value, json};

/// Build the tool input schema for an ordered form entry sequence.
///
/// Property order and `required` order follow field-encounter order;
/// duplicate variables are not expected and not deduplicated.
pub fn build_input_schema(entries: &[FormFieldEntry]) -> Map<String, Value> {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in entries.iter().filter_map(FormFieldEntry::known) {
        let mut property = Map::new();
        property.insert("type".to_string(), json!("string"));
        property.insert("description".to_string(), json!(field.label()));
        if let FormField::Select(select) = field {
            property.insert("enum".to_string(), json!(select.options));
        }

        if field.required() {
            required.push(json!(field.variable()));
        }
        properties.insert(field.variable().to_string(), Value::Object(property));
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    schema.insert("required".to_string(), Value::Array(required));
    schema
}
