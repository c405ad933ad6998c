//! Girder - project and issue tracking primitives.
//!
//! This crate provides the domain model (projects, issues, priorities,
//! statuses) and the storage backends used by the girder MCP server.
//!
//! # Storage backends
//!
//! Storage is abstracted behind the [`store::TrackerStore`] trait:
//!
//! - [`store::MemoryStore`] - ephemeral in-memory backend, used for tests and
//!   when no remote tracker credentials are configured (degraded mode)
//! - [`store::RemoteStore`] - HTTP client for a remote tracker API

#![forbid(unsafe_code)]

pub mod domain;
pub mod error;
pub mod store;

pub use error::{Error, Result};
