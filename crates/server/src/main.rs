//! Decision bridge entry point.
use anyhow::{Context, Result};
use bridge_runtime::{ChannelSession, Runtime, StaticCardOracle};
use bridge_server::logging::setup_logging;
use bridge_server::{McpServer, ServerConfig, ToolDispatcher, engine_link};
use tokio::io::BufReader;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env();
    let _log_guard = setup_logging(&config)?;

    let oracle = match &config.card_oracle_path {
        Some(path) => StaticCardOracle::from_json_file(path)
            .with_context(|| format!("failed to load card database {}", path.display()))?,
        None => StaticCardOracle::new(),
    };
    info!(cards = oracle.len(), "card oracle ready");

    let (session, outbound) = ChannelSession::new();
    let runtime = Runtime::builder()
        .config(config.bridge.clone())
        .session(session)
        .oracle(oracle)
        .build()
        .await?;

    let link = tokio::spawn({
        let events = runtime.events();
        let addr = config.engine_addr.clone();
        async move {
            if let Err(err) = engine_link::run(&addr, events, outbound).await {
                error!(error = %err, "engine link stopped");
            }
        }
    });

    let server = McpServer::new(ToolDispatcher::new(runtime.handle()));
    server
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("MCP stream failed")?;

    link.abort();
    let _ = link.await;
    drop(server);
    runtime.shutdown().await?;
    info!("decision bridge stopped");
    Ok(())
}
