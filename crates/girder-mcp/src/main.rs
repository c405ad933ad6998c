//! Girder MCP server binary.
//!
//! Runs the MCP server over stdio (default) or the networked SSE transport,
//! selected by `--transport` / `GIRDER_TRANSPORT`.

use clap::Parser;
use girder_mcp::config::{ServerConfig, TransportMode};
use girder_mcp::dispatcher::Dispatcher;
use girder_mcp::protocol::ProtocolHandler;
use girder_mcp::registry::ToolRegistry;
use girder_mcp::tools::Tools;
use girder_mcp::transport::TransportManager;
use girder_mcp::{http, stdio};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; in stdio mode stdout carries the message stream.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("girder=info,girder_mcp=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::parse();
    tracing::info!(transport = ?config.transport, "starting girder-mcp server");

    let store = config.build_store();
    let tools = Arc::new(Tools::new(store));
    let registry = Arc::new(ToolRegistry::builtin(tools));
    let handler = ProtocolHandler::new(Dispatcher::new(registry));

    match config.transport {
        TransportMode::Stdio => stdio::run(&handler).await?,
        TransportMode::Sse => {
            let manager = TransportManager::new(handler, config.transport_config());
            http::serve(manager, config.port).await?;
        }
    }

    Ok(())
}
