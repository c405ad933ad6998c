//! Error types for girder storage operations.

use thiserror::Error;

/// The error type for girder storage operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No project matched the given name query.
    #[error("No project found matching '{0}'")]
    ProjectNotFound(String),

    /// More than one project matched the given name query.
    #[error("Project name '{query}' is ambiguous; matches: {}", matches.join(", "))]
    AmbiguousProject {
        /// The name query that was searched for.
        query: String,
        /// Names of all projects that matched.
        matches: Vec<String>,
    },

    /// A project with this name already exists.
    #[error("A project named '{0}' already exists")]
    DuplicateProject(String),

    /// No issue matched the given title query within the project.
    #[error("No issue found matching '{query}' in project '{project}'")]
    IssueNotFound {
        /// The title query that was searched for.
        query: String,
        /// Name of the project that was searched.
        project: String,
    },

    /// More than one issue matched the given title query.
    #[error("Issue title '{query}' is ambiguous; matches: {}", matches.join(", "))]
    AmbiguousIssue {
        /// The title query that was searched for.
        query: String,
        /// Titles of all issues that matched.
        matches: Vec<String>,
    },

    /// The referenced entity id does not exist.
    #[error("Unknown id: {0}")]
    UnknownId(String),

    /// The remote tracker API returned a failure status.
    #[error("Remote tracker API error ({status}): {message}")]
    RemoteApi {
        /// HTTP status code returned by the remote API.
        status: u16,
        /// Response body or status description.
        message: String,
    },

    /// Transport-level failure talking to the remote tracker API.
    #[error("Remote tracker request failed: {0}")]
    Remote(#[from] reqwest::Error),
}

/// A specialized Result type for girder storage operations.
pub type Result<T> = std::result::Result<T, Error>;
