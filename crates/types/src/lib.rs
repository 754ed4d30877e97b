//! Shared wire types for the Dify workflow API.
//!
//! These models mirror the payloads exchanged with a Dify-compatible
//! backend: application metadata (`/v1/info`), the user input form schema
//! (`/v1/parameters`), and the workflow invocation request/response pair
//! (`/v1/workflows/run`). All response types are deliberately lenient:
//! unknown fields are ignored and optional fields are defaulted, because
//! the backend schema evolves independently of this bridge.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Descriptive metadata for one workflow application (`GET /v1/info`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppInfo {
    /// Application name; used to derive the exposed tool identifier.
    pub name: String,
    /// Human-readable description shown to MCP clients.
    #[serde(default)]
    pub description: String,
    /// Free-form tags configured on the application.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Input-form schema and system limits (`GET /v1/parameters`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppParameters {
    /// Ordered form entries describing the application's inputs.
    #[serde(default)]
    pub user_input_form: Vec<FormFieldEntry>,
    /// Upload limits reported alongside the schema.
    #[serde(default)]
    pub system_parameters: SystemParameters,
}

/// File upload limits the backend reports with the form schema.
///
/// The bridge does not enforce these; they are carried through as tool
/// metadata only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemParameters {
    #[serde(default)]
    pub file_size_limit: u64,
    #[serde(default)]
    pub image_file_size_limit: u64,
    #[serde(default)]
    pub audio_file_size_limit: u64,
    #[serde(default)]
    pub video_file_size_limit: u64,
}

/// One entry of `user_input_form`.
///
/// The backend encodes each entry as a single-key object tagged by the
/// control kind, for example `{"text-input": {"variable": "q", ...}}`.
/// Kinds this bridge does not understand (`file_upload`, `image`, and any
/// kind added later) deserialize into [`FormFieldEntry::Unrecognized`] and
/// are preserved verbatim instead of failing the whole schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormFieldEntry {
    Known(FormField),
    Unrecognized(Value),
}

impl FormFieldEntry {
    /// The recognized control, if this entry is one.
    pub fn known(&self) -> Option<&FormField> {
        match self {
            FormFieldEntry::Known(field) => Some(field),
            FormFieldEntry::Unrecognized(_) => None,
        }
    }
}

/// Recognized form controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FormField {
    /// Single-line text input.
    #[serde(rename = "text-input")]
    TextInput(FormControl),
    /// Multi-line text input.
    #[serde(rename = "paragraph")]
    Paragraph(FormControl),
    /// Dropdown with a fixed option set.
    #[serde(rename = "select")]
    Select(SelectControl),
}

impl FormField {
    /// Stable variable identifier for this control.
    pub fn variable(&self) -> &str {
        &self.control().variable
    }

    /// Human-readable label for this control.
    pub fn label(&self) -> &str {
        &self.control().label
    }

    /// Whether a value for this control is mandatory.
    pub fn required(&self) -> bool {
        self.control().required
    }

    /// The enumerated options of a `select` control, empty otherwise.
    pub fn options(&self) -> &[String] {
        match self {
            FormField::Select(select) => &select.options,
            _ => &[],
        }
    }

    fn control(&self) -> &FormControl {
        match self {
            FormField::TextInput(control) | FormField::Paragraph(control) => control,
            FormField::Select(select) => &select.control,
        }
    }
}

/// Fields common to every recognized control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormControl {
    /// Stable identifier used as the property name in the tool schema.
    pub variable: String,
    /// Human-readable label used as the property description.
    #[serde(default)]
    pub label: String,
    /// Whether the backend requires a value for this control.
    #[serde(default)]
    pub required: bool,
    /// Default value configured on the application, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// A dropdown control: the common fields plus its option set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectControl {
    #[serde(flatten)]
    pub control: FormControl,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Invocation modes accepted by `/v1/workflows/run`.
///
/// This bridge only ever sends [`ResponseMode::Blocking`]: the call waits
/// for the complete result instead of streaming incremental output. Note
/// that intermediate proxies may enforce their own hard timeout on long
/// blocking runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    Streaming,
    Blocking,
}

/// Request body for `POST /v1/workflows/run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRunRequest {
    /// Caller-supplied inputs, forwarded without validation.
    pub inputs: Map<String, Value>,
    pub response_mode: ResponseMode,
    /// End-user identifier passed through to the backend.
    pub user: String,
}

impl WorkflowRunRequest {
    /// Build a blocking-mode request for the given inputs.
    pub fn blocking(inputs: Map<String, Value>, user: impl Into<String>) -> Self {
        Self {
            inputs,
            response_mode: ResponseMode::Blocking,
            user: user.into(),
        }
    }
}

/// Response envelope for a blocking `POST /v1/workflows/run`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRunResponse {
    #[serde(default)]
    pub workflow_run_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub data: WorkflowRunResult,
}

/// Completion data of a workflow run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRunResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub workflow_id: Option<String>,
    /// `running`, `succeeded`, `failed`, or `stopped`.
    #[serde(default)]
    pub status: Option<String>,
    /// Output values of a successful run.
    #[serde(default)]
    pub outputs: Option<Value>,
    /// Error reported by the backend for a failed run.
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub elapsed_time: Option<f64>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
    #[serde(default)]
    pub total_steps: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn form_entries_deserialize_recognized_kinds() {
        let raw = json!([
            { "text-input": { "variable": "q", "label": "Query", "required": true } },
            { "paragraph": { "variable": "body", "label": "Body" } },
            { "select": { "variable": "lang", "label": "Language", "required": false, "options": ["en", "de"] } }
        ]);

        let entries: Vec<FormFieldEntry> = serde_json::from_value(raw).unwrap();
        assert_eq!(entries.len(), 3);

        let first = entries[0].known().expect("text-input should be recognized");
        assert_eq!(first.variable(), "q");
        assert_eq!(first.label(), "Query");
        assert!(first.required());
        assert!(first.options().is_empty());

        let select = entries[2].known().expect("select should be recognized");
        assert_eq!(select.options(), ["en", "de"]);
        assert!(!select.required());
    }

    #[test]
    fn unknown_form_kinds_fall_through_without_error() {
        let raw = json!([
            { "file_upload": { "variable": "doc", "label": "Document", "required": true } },
            { "image": { "enabled": true, "number_limits": 1 } },
            { "brand-new-widget": { "variable": "x" } }
        ]);

        let entries: Vec<FormFieldEntry> = serde_json::from_value(raw).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|entry| entry.known().is_none()));
    }

    #[test]
    fn unrecognized_entries_round_trip_verbatim() {
        let raw = json!({ "file_upload": { "variable": "doc", "image": { "enabled": true } } });
        let entry: FormFieldEntry = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
    }

    #[test]
    fn app_parameters_default_missing_sections() {
        let params: AppParameters = serde_json::from_value(json!({})).unwrap();
        assert!(params.user_input_form.is_empty());
        assert_eq!(params.system_parameters.file_size_limit, 0);

        let params: AppParameters = serde_json::from_value(json!({
            "user_input_form": [],
            "system_parameters": { "file_size_limit": 15, "image_file_size_limit": 10 }
        }))
        .unwrap();
        assert_eq!(params.system_parameters.file_size_limit, 15);
    }

    #[test]
    fn blocking_request_serializes_fixed_mode() {
        let mut inputs = Map::new();
        inputs.insert("q".into(), json!("hello"));
        let request = WorkflowRunRequest::blocking(inputs, "default_user");

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["response_mode"], json!("blocking"));
        assert_eq!(value["user"], json!("default_user"));
        assert_eq!(value["inputs"]["q"], json!("hello"));
    }

    #[test]
    fn workflow_response_tolerates_partial_payloads() {
        let response: WorkflowRunResponse = serde_json::from_value(json!({
            "data": { "status": "succeeded", "outputs": { "x": 1 } }
        }))
        .unwrap();
        assert_eq!(response.data.status.as_deref(), Some("succeeded"));
        assert_eq!(response.data.outputs, Some(json!({ "x": 1 })));
        assert!(response.data.error.is_none());

        let failed: WorkflowRunResponse = serde_json::from_value(json!({
            "data": { "status": "failed", "error": "boom" }
        }))
        .unwrap();
        assert_eq!(failed.data.error, Some(json!("boom")));
    }
}
