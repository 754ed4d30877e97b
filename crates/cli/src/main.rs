use agentx_api::DifyClient;
use agentx_mcp::{AgentxMcpCore, Settings, serve_stdio};
use anyhow::{Context, Result};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let settings = Settings::from_env().context("loading configuration from the environment")?;
    let client = DifyClient::new(&settings.base_url, settings.timeout)
        .context("building the backend HTTP client")?;

    info!(
        base_url = %client.base_url(),
        credential_count = settings.api_keys.len(),
        "starting MCP server on stdio"
    );

    let core = AgentxMcpCore::new(client, settings.api_keys);
    serve_stdio(core).await
}

/// Route diagnostics to stderr; stdout carries the MCP transport.
fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
