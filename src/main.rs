// POLICY: stdout is RESERVED for protocol messages.
// All logs, panics, and diagnostics MUST write to stderr.
#[tokio::main]
async fn main() {
    mobsf_mcp::logging::init_tracing();

    std::panic::set_hook(Box::new(|info| {
        tracing::error!("Panic: {}", info);
    }));

    if let Err(e) = mobsf_mcp::run().await {
        tracing::error!(error = %format!("{e:#}"), "mobsf-mcp exiting");
        std::process::exit(1);
    }
}
