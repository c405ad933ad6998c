//! Server configuration.
//!
//! All settings come from CLI flags or their environment-variable
//! equivalents. Remote tracker credentials are optional: when absent the
//! server starts in degraded mode against the in-memory store and logs a
//! warning rather than refusing to start.

use crate::transport::TransportConfig;
use clap::{Parser, ValueEnum};
use girder::store::{MemoryStore, RemoteStore, TrackerStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Which transport the server binary should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportMode {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    Stdio,

    /// Networked SSE push-stream transport.
    Sse,
}

/// Configuration for the girder MCP server.
#[derive(Debug, Parser)]
#[command(
    name = "girder-mcp",
    version,
    about = "MCP server for girder project and issue tracking"
)]
pub struct ServerConfig {
    /// Transport to serve.
    #[arg(long, value_enum, default_value = "stdio", env = "GIRDER_TRANSPORT")]
    pub transport: TransportMode,

    /// Listen port for the sse transport.
    #[arg(long, default_value_t = 8484, env = "GIRDER_PORT")]
    pub port: u16,

    /// Seconds between keep-alive frames on each open channel.
    #[arg(long, default_value_t = 30, env = "GIRDER_KEEPALIVE_SECS")]
    pub keepalive_secs: u64,

    /// Seconds a closed session stays routable before removal.
    #[arg(long, default_value_t = 10, env = "GIRDER_CLOSE_GRACE_SECS")]
    pub close_grace_secs: u64,

    /// Base URL of the remote tracker API.
    #[arg(long, env = "GIRDER_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token for the remote tracker API.
    #[arg(long, env = "GIRDER_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,
}

impl ServerConfig {
    /// Transport timings derived from this configuration.
    #[must_use]
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            keepalive_interval: Duration::from_secs(self.keepalive_secs.max(1)),
            close_grace: Duration::from_secs(self.close_grace_secs),
        }
    }

    /// Select the tracker store backend.
    ///
    /// Uses the remote tracker when both URL and token are configured;
    /// otherwise warns and falls back to the ephemeral in-memory store.
    #[must_use]
    pub fn build_store(&self) -> Arc<dyn TrackerStore> {
        match (&self.api_url, &self.api_token) {
            (Some(url), Some(token)) => {
                info!(url = %url, "using remote tracker store");
                Arc::new(RemoteStore::new(url.clone(), token.clone()))
            }
            (Some(url), None) => {
                warn!(
                    url = %url,
                    "GIRDER_API_TOKEN not set; starting degraded with in-memory store"
                );
                Arc::new(MemoryStore::new())
            }
            (None, _) => {
                warn!("no remote tracker configured; starting degraded with in-memory store");
                Arc::new(MemoryStore::new())
            }
        }
    }
}
