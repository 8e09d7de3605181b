pub mod logging;
pub mod mcp_server;
pub mod mobsf;

use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;

use logging::{DiagnosticLog, FileLog};
use mcp_server::{Dispatcher, StdioTransport};
use mobsf::{BackendError, MobsfClient, MobsfConfig, ScanOrchestrator};

/// Wire the production dispatcher: reqwest backend + injected log.
pub fn build_dispatcher(
    config: MobsfConfig,
    log: Arc<dyn DiagnosticLog>,
) -> Result<Dispatcher, BackendError> {
    let backend = Arc::new(MobsfClient::new(config)?);
    let orchestrator = ScanOrchestrator::new(backend, log.clone());
    Ok(Dispatcher::new(orchestrator, log))
}

/// Run the MCP server on stdin/stdout until the client disconnects.
///
/// stdout carries protocol messages only. Diagnostics go to stderr and the
/// temp-dir log file. Call [`logging::init_tracing`] first.
pub async fn run() -> anyhow::Result<()> {
    let log: Arc<dyn DiagnosticLog> = Arc::new(FileLog::new());
    log.append("Starting MobSF MCP server...");

    let result = serve_stdio(log.clone()).await;
    if let Err(ref e) = result {
        log.append(&format!("Fatal startup error: {e:#}"));
    }
    result
}

async fn serve_stdio(log: Arc<dyn DiagnosticLog>) -> anyhow::Result<()> {
    let config = MobsfConfig::load();
    tracing::info!(
        base_url = %config.base_url,
        api_key_set = config.api_key.is_some(),
        "MobSF backend configured"
    );

    let dispatcher =
        build_dispatcher(config, log.clone()).context("failed to initialize MobSF client")?;

    let mut transport = StdioTransport::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    log.append("Server connected and ready.");

    mcp_server::serve(&dispatcher, &mut transport)
        .await
        .context("stdio transport failed")?;
    Ok(())
}
