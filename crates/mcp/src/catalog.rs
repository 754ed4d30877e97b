//! Tool catalog construction and the name-to-credential route table.
//!
//! Every `tools/list` request rebuilds the catalog from the backend; there
//! is no caching across builds. The catalog build is also what establishes
//! which credential owns which tool name: the route table is assembled in
//! full and then published in a single swap, so a concurrent `tools/call`
//! observes either the previous complete table or the new one, never a
//! half-built state.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use agentx_api::{ApiError, DifyClient};
use agentx_types::{AppInfo, AppParameters};
use rmcp::model::Tool;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::schema::build_input_schema;

/// Prefix for every exposed tool name.
pub const TOOL_NAME_PREFIX: &str = "agentx_app_info_";

/// Deterministic tool name for an application name.
pub fn tool_name(app_name: &str) -> String {
    format!("{TOOL_NAME_PREFIX}{app_name}")
}

/// One invocable capability derived from a workflow application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    /// `agentx_app_info_<application name>`.
    pub name: String,
    /// Application description with its tags appended.
    pub description: String,
    /// Object-shaped input schema translated from the form schema.
    pub input_schema: Map<String, Value>,
    /// Raw backend payloads the descriptor was derived from.
    pub metadata: ToolMetadata,
}

/// Backend payloads retained alongside a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolMetadata {
    pub info: AppInfo,
    pub parameters: AppParameters,
}

impl ToolDescriptor {
    /// Derive a descriptor from the two per-application fetches.
    pub fn from_application(info: AppInfo, parameters: AppParameters) -> Self {
        Self {
            name: tool_name(&info.name),
            description: format!("{} (tags: {})", info.description, info.tags.join(", ")),
            input_schema: build_input_schema(&parameters.user_input_form),
            metadata: ToolMetadata { info, parameters },
        }
    }

    /// Convert to the rmcp wire model.
    ///
    /// The wire `Tool` has no metadata slot, so only name, description, and
    /// input schema cross the protocol boundary.
    pub fn to_rmcp_tool(&self) -> Tool {
        Tool::new(
            self.name.clone(),
            self.description.clone(),
            Arc::new(self.input_schema.clone()),
        )
    }
}

/// Catalog builder and owner of the name-to-credential route table.
#[derive(Debug)]
pub struct Catalog {
    client: DifyClient,
    credentials: Vec<String>,
    routes: RwLock<Arc<HashMap<String, String>>>,
}

impl Catalog {
    /// Create a catalog over an ordered credential list.
    pub fn new(client: DifyClient, credentials: Vec<String>) -> Self {
        Self {
            client,
            credentials,
            routes: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// The shared backend client.
    pub fn client(&self) -> &DifyClient {
        &self.client
    }

    /// Rebuild the catalog from the backend and publish a fresh route table.
    ///
    /// Credentials are processed sequentially in configured order. A failing
    /// credential (transport error, bad status, malformed body) is logged
    /// and skipped; it never aborts the build or drops other credentials'
    /// tools. When two applications share a name the later credential wins
    /// both the route entry and the descriptor slot.
    pub async fn build(&self) -> Vec<ToolDescriptor> {
        let mut routes = HashMap::new();
        let mut tools: Vec<ToolDescriptor> = Vec::new();

        for credential in &self.credentials {
            let descriptor = match self.load_descriptor(credential).await {
                Ok(descriptor) => descriptor,
                Err(error) => {
                    warn!(error = %error, "skipping credential: application fetch failed");
                    continue;
                }
            };

            if routes
                .insert(descriptor.name.clone(), credential.clone())
                .is_some()
            {
                warn!(tool = %descriptor.name, "tool name collision, later credential wins");
                tools.retain(|tool| tool.name != descriptor.name);
            }
            tools.push(descriptor);
        }

        debug!(tool_count = tools.len(), "catalog rebuilt");
        self.publish(routes);
        tools
    }

    /// Resolve a tool name against the most recently published table.
    pub fn credential_for(&self, tool_name: &str) -> Option<String> {
        self.snapshot().get(tool_name).cloned()
    }

    async fn load_descriptor(&self, credential: &str) -> Result<ToolDescriptor, ApiError> {
        let info: AppInfo = self.client.get("/v1/info", credential).await?;
        let parameters: AppParameters = self.client.get("/v1/parameters", credential).await?;
        Ok(ToolDescriptor::from_application(info, parameters))
    }

    fn publish(&self, routes: HashMap<String, String>) {
        let mut guard = match self.routes.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(routes);
    }

    fn snapshot(&self) -> Arc<HashMap<String, String>> {
        let guard = match self.routes.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(&guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn catalog(server: &MockServer, credentials: &[&str]) -> Catalog {
        let client = DifyClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        Catalog::new(client, credentials.iter().map(|key| key.to_string()).collect())
    }

    async fn mount_app(server: &MockServer, credential: &str, info: Value, form: Value) {
        let bearer = format!("Bearer {credential}");
        Mock::given(method("GET"))
            .and(path("/v1/info"))
            .and(header("authorization", bearer.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(info))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/parameters"))
            .and(header("authorization", bearer.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user_input_form": form,
                "system_parameters": { "file_size_limit": 15 }
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn tool_names_are_prefixed_deterministically() {
        assert_eq!(tool_name("Foo"), "agentx_app_info_Foo");
    }

    #[test]
    fn descriptor_joins_tags_into_the_description() {
        let info: AppInfo = serde_json::from_value(json!({
            "name": "Translator",
            "description": "Translates text",
            "tags": ["nlp", "demo"]
        }))
        .unwrap();
        let descriptor = ToolDescriptor::from_application(info, AppParameters::default());

        assert_eq!(descriptor.name, "agentx_app_info_Translator");
        assert_eq!(descriptor.description, "Translates text (tags: nlp, demo)");
        assert_eq!(descriptor.input_schema["type"], json!("object"));
    }

    #[test]
    fn rmcp_conversion_carries_name_description_and_schema() {
        let info: AppInfo =
            serde_json::from_value(json!({ "name": "Foo", "description": "Does foo" })).unwrap();
        let descriptor = ToolDescriptor::from_application(info, AppParameters::default());
        let tool = descriptor.to_rmcp_tool();

        assert_eq!(tool.name.as_ref(), "agentx_app_info_Foo");
        assert_eq!(tool.description.as_deref(), Some("Does foo (tags: )"));
        assert_eq!(tool.input_schema.get("type"), Some(&json!("object")));
    }

    #[tokio::test]
    async fn builds_one_tool_per_credential_in_order() {
        let server = MockServer::start().await;
        mount_app(
            &server,
            "k1",
            json!({ "name": "Alpha", "description": "A", "tags": [] }),
            json!([]),
        )
        .await;
        mount_app(
            &server,
            "k2",
            json!({ "name": "Beta", "description": "B", "tags": [] }),
            json!([]),
        )
        .await;

        let catalog = catalog(&server, &["k1", "k2"]);
        let tools = catalog.build().await;

        let names: Vec<&str> = tools.iter().map(|tool| tool.name.as_str()).collect();
        assert_eq!(names, ["agentx_app_info_Alpha", "agentx_app_info_Beta"]);
        assert_eq!(catalog.credential_for("agentx_app_info_Alpha").as_deref(), Some("k1"));
        assert_eq!(catalog.credential_for("agentx_app_info_Beta").as_deref(), Some("k2"));
    }

    #[tokio::test]
    async fn failed_credential_is_skipped_without_affecting_others() {
        // k1 has no mounted routes, so its /v1/info fetch returns 404.
        let server = MockServer::start().await;
        mount_app(
            &server,
            "k2",
            json!({ "name": "Foo", "description": "Works", "tags": [] }),
            json!([{ "text-input": { "variable": "q", "label": "Query", "required": true } }]),
        )
        .await;

        let catalog = catalog(&server, &["k1", "k2"]);
        let tools = catalog.build().await;

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "agentx_app_info_Foo");
        assert_eq!(tools[0].input_schema["required"], json!(["q"]));
        assert!(catalog.credential_for("agentx_app_info_Foo").as_deref() == Some("k2"));
        assert!(catalog.credential_for("agentx_app_info_Bar").is_none());
    }

    #[tokio::test]
    async fn duplicate_application_names_resolve_to_the_later_credential() {
        let server = MockServer::start().await;
        mount_app(
            &server,
            "k1",
            json!({ "name": "Same", "description": "first", "tags": [] }),
            json!([]),
        )
        .await;
        mount_app(
            &server,
            "k2",
            json!({ "name": "Same", "description": "second", "tags": [] }),
            json!([]),
        )
        .await;

        let catalog = catalog(&server, &["k1", "k2"]);
        let tools = catalog.build().await;

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].description, "second (tags: )");
        assert_eq!(catalog.credential_for("agentx_app_info_Same").as_deref(), Some("k2"));
    }

    #[tokio::test]
    async fn rebuild_replaces_the_route_table_wholesale() {
        let server = MockServer::start().await;
        mount_app(
            &server,
            "k1",
            json!({ "name": "Alpha", "description": "A", "tags": [] }),
            json!([]),
        )
        .await;

        let catalog = catalog(&server, &["k1", "gone"]);
        catalog.build().await;
        assert!(catalog.credential_for("agentx_app_info_Alpha").is_some());

        // Second build with the backend gone for k1 as well: the new table
        // is empty and the stale entry no longer resolves.
        server.reset().await;
        catalog.build().await;
        assert!(catalog.credential_for("agentx_app_info_Alpha").is_none());
    }

    #[tokio::test]
    async fn metadata_retains_backend_payloads() {
        let server = MockServer::start().await;
        mount_app(
            &server,
            "k1",
            json!({ "name": "Foo", "description": "d", "tags": ["t"] }),
            json!([{ "file_upload": { "variable": "doc" } }]),
        )
        .await;

        let catalog = catalog(&server, &["k1"]);
        let tools = catalog.build().await;

        assert_eq!(tools[0].metadata.info.tags, ["t"]);
        assert_eq!(tools[0].metadata.parameters.system_parameters.file_size_limit, 15);
        assert_eq!(tools[0].metadata.parameters.user_input_form.len(), 1);
        // The upload control is preserved in metadata even though the
        // schema ignores it.
        assert_eq!(tools[0].input_schema["properties"], json!({}));
    }
}
