//! MCP server for girder project and issue tracking.
//!
//! This crate exposes girder's tracker operations to AI assistants over the
//! Model Context Protocol. Two transports are supported:
//!
//! - **stdio** - newline-delimited JSON-RPC over stdin/stdout (the default)
//! - **sse** - a networked push-stream transport: `GET /sse` opens a
//!   server-sent-events channel with a per-connection session id, and
//!   `POST /messages?sessionId=<id>` submits requests routed to that channel
//!
//! # Architecture
//!
//! Inbound messages flow through [`protocol::ProtocolHandler`] (JSON-RPC
//! parsing and MCP method surface) into [`dispatcher::Dispatcher`], which
//! looks up operations in the [`registry::ToolRegistry`] and converts every
//! handler failure into a failed response envelope. The SSE side is owned by
//! [`transport::TransportManager`], which tracks live [`session::ChannelSession`]s,
//! keeps them alive with periodic comment frames, and removes closed sessions
//! only after a grace delay so in-flight requests are not rejected by a
//! teardown race.
//!
//! # Tools
//!
//! - `list_all_projects` - list every tracked project
//! - `create_project` - create a new project
//! - `add_issue` - file an issue against a project (fuzzy name match)
//! - `list_issues` - list a project's issues, optionally by status
//! - `update_issue_status` - move an issue to a new workflow stage
//! - `set_issue_priority` - change an issue's priority

#![forbid(unsafe_code)]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod models;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod stdio;
pub mod tools;
pub mod transport;

pub use error::{Error, Result};
pub use transport::TransportManager;
