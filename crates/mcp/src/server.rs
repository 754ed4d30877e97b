//! rmcp server surface and stdio transport entry point.

use std::sync::Arc;

use agentx_api::DifyClient;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ErrorData, Implementation, ListToolsResult,
    PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::transport::stdio;
use rmcp::{RoleServer, ServerHandler, ServiceExt};
use tracing::info;

use crate::catalog::{Catalog, ToolDescriptor};
use crate::dispatch::{DispatchError, invoke};

/// MCP handler exposing one tool per configured workflow application.
#[derive(Clone)]
pub struct AgentxMcpCore {
    catalog: Arc<Catalog>,
}

impl AgentxMcpCore {
    /// Create a handler over a backend client and an ordered credential list.
    pub fn new(client: DifyClient, credentials: Vec<String>) -> Self {
        Self {
            catalog: Arc::new(Catalog::new(client, credentials)),
        }
    }

    /// The catalog backing this handler.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl ServerHandler for AgentxMcpCore {
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        async move {
            let tools = self
                .catalog
                .build()
                .await
                .iter()
                .map(ToolDescriptor::to_rmcp_tool)
                .collect();
            Ok(ListToolsResult {
                next_cursor: None,
                tools,
                ..Default::default()
            })
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        async move {
            let text = invoke(&self.catalog, request.name.as_ref(), request.arguments)
                .await
                .map_err(dispatch_error_data)?;
            Ok(CallToolResult::success(vec![Content::text(text)]))
        }
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: "agentx-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("AgentX Dify bridge".to_string()),
                ..Default::default()
            },
            instructions: Some(
                "Each tool is one Dify workflow application. Call tools/list to discover \
                 the available applications and their input schemas, then tools/call with \
                 the tool name and inputs. Runs execute in blocking mode and return the \
                 workflow outputs (or its reported error) as JSON text."
                    .to_string(),
            ),
        }
    }
}

/// Map a dispatch failure onto the protocol error model.
fn dispatch_error_data(error: DispatchError) -> ErrorData {
    match &error {
        DispatchError::UnknownTool { name } => ErrorData::resource_not_found(
            error.to_string(),
            Some(serde_json::json!({ "tool_name": name })),
        ),
        DispatchError::Api(_) | DispatchError::Serialize(_) => {
            ErrorData::internal_error(error.to_string(), None)
        }
    }
}

/// Serve the handler over stdio until the client disconnects.
///
/// stdout belongs to the transport; all diagnostics must go to stderr.
pub async fn serve_stdio(core: AgentxMcpCore) -> anyhow::Result<()> {
    let service = core.serve(stdio()).await?;
    info!("MCP server connected on stdio");
    service.waiting().await?;
    Ok(())
}
