//! Invocation dispatch: tool name to credential to workflow run.
//!
//! The dispatcher is stateless between calls; its only link to mutable
//! state is a read of the route table published by the most recent catalog
//! build. It never mutates that table.

use agentx_api::ApiError;
use agentx_types::{WorkflowRunRequest, WorkflowRunResponse};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::catalog::Catalog;

/// End-user identifier forwarded to the backend with every run.
const DEFAULT_USER: &str = "default_user";

/// Errors surfaced to the protocol layer for a single `tools/call`.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The name is not in the route table: either no catalog build has run
    /// yet in this process, or the name is stale or unknown.
    #[error("tool '{name}' not found")]
    UnknownTool { name: String },

    /// Transport-level failure during the workflow run. No retry happens at
    /// this layer.
    #[error("workflow run failed: {0}")]
    Api(#[from] ApiError),

    #[error("could not serialize workflow result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Run the workflow behind `tool_name` and normalize the result to text.
///
/// The run uses blocking mode: the call waits for full completion instead
/// of streaming. Arguments are forwarded as-is, without validation against
/// the generated schema. If the backend reports an in-band `error` it takes
/// precedence over `outputs`; either way the selected value is returned
/// JSON-serialized, so callers must inspect the text to tell a remote
/// failure from a success.
pub async fn invoke(
    catalog: &Catalog,
    tool_name: &str,
    arguments: Option<Map<String, Value>>,
) -> Result<String, DispatchError> {
    let credential = catalog
        .credential_for(tool_name)
        .ok_or_else(|| DispatchError::UnknownTool {
            name: tool_name.to_string(),
        })?;

    let request = WorkflowRunRequest::blocking(arguments.unwrap_or_default(), DEFAULT_USER);
    let response: WorkflowRunResponse = catalog
        .client()
        .post("/v1/workflows/run", &request, &credential)
        .await?;

    debug!(
        tool = tool_name,
        status = response.data.status.as_deref().unwrap_or("unknown"),
        "workflow run completed"
    );

    let selected = response
        .data
        .error
        .or(response.data.outputs)
        .unwrap_or(Value::Null);
    Ok(serde_json::to_string(&selected)?)
}
