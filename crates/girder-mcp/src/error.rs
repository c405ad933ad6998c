//! Error types for the girder MCP server.

use thiserror::Error;

/// Errors that can occur in the girder MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// An inbound request referenced a session id that is not in the live set.
    ///
    /// This is an expected, recoverable condition: the session may have
    /// expired past its close grace window, or the request may have reached a
    /// different server replica. The live identifiers are included so the
    /// submitter can tell this apart from a malformed request.
    #[error("Session not found: {id}. Live sessions: [{}]", live.join(", "))]
    SessionNotFound {
        /// The identifier the request carried.
        id: String,
        /// Identifiers of all currently live sessions.
        live: Vec<String>,
    },

    /// The session's outbound sink could not accept a write.
    #[error("Channel closed for session {0}")]
    ChannelClosed(String),

    /// The argument bag failed validation against the operation's schema.
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments {
        /// The operation whose schema was violated.
        tool: &'static str,
        /// What failed to validate.
        message: String,
    },

    /// An error from the tracker storage layer.
    #[error("{0}")]
    Store(#[from] girder::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for girder MCP operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_not_found_lists_live_ids() {
        let err = Error::SessionNotFound {
            id: "bogus-id".to_string(),
            live: vec!["a1".to_string(), "b2".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("bogus-id"));
        assert!(message.contains("[a1, b2]"));
    }

    #[test]
    fn test_session_not_found_with_empty_live_set() {
        let err = Error::SessionNotFound {
            id: "bogus-id".to_string(),
            live: Vec::new(),
        };
        assert!(err.to_string().contains("Live sessions: []"));
    }
}
