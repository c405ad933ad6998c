//! Operation dispatcher.
//!
//! The single failure-normalization boundary for the whole tool surface.
//! Every outcome of executing an operation, including unknown names, schema
//! violations, and handler errors, becomes a [`ToolOutcome`] envelope; no
//! failure propagates past this point, so one bad request can never tear
//! down a channel.

use crate::registry::ToolRegistry;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// The response envelope produced for every operation call.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    /// Human-readable text payload.
    pub text: String,

    /// Whether the operation failed. Failures travel inside the envelope,
    /// never as transport errors.
    pub is_error: bool,
}

impl ToolOutcome {
    fn success(text: String) -> Self {
        Self {
            text,
            is_error: false,
        }
    }

    fn failure(text: String) -> Self {
        Self {
            text,
            is_error: true,
        }
    }
}

/// Executes operations from a [`ToolRegistry`], normalizing all failures.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over the given registry.
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this dispatcher serves.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute the named operation against the given argument bag.
    ///
    /// Infallible by design: unknown operations and handler failures are
    /// reported inside the returned envelope.
    pub async fn execute(&self, name: &str, args: Value) -> ToolOutcome {
        let Some(tool) = self.registry.get(name) else {
            let available: Vec<&str> = self.registry.iter().map(|t| t.name()).collect();
            warn!(tool = name, "unknown tool requested");
            return ToolOutcome::failure(format!(
                "Unknown tool: {name}. Available tools: {}",
                available.join(", ")
            ));
        };

        debug!(tool = name, "executing tool");
        match tool.call(args).await {
            Ok(text) => ToolOutcome::success(text),
            Err(e) => {
                debug!(tool = name, error = %e, "tool failed");
                ToolOutcome::failure(e.to_string())
            }
        }
    }
}
