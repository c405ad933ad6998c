//! Storage backends for projects and issues.
//!
//! The [`TrackerStore`] trait is the fixed interface the MCP tool layer is
//! written against. Two implementations are provided: an ephemeral
//! [`MemoryStore`] and a [`RemoteStore`] HTTP client for an external tracker
//! service.

pub mod memory;
pub mod remote;

pub use memory::MemoryStore;
pub use remote::RemoteStore;

use crate::domain::{Issue, IssueId, IssueStatus, IssueUpdate, NewIssue, NewProject, Project, ProjectId};
use crate::error::Result;
use async_trait::async_trait;

/// Backend-agnostic storage interface for the tracker.
///
/// All lookups by name are fuzzy: a case-insensitive exact match wins,
/// otherwise a unique case-insensitive substring match is accepted.
#[async_trait]
pub trait TrackerStore: Send + Sync {
    /// List all projects.
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Create a new project.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::DuplicateProject`] if a project with the same
    /// name already exists.
    async fn create_project(&self, new: NewProject) -> Result<Project>;

    /// Resolve a project by fuzzy name match.
    async fn find_project(&self, name: &str) -> Result<Project>;

    /// Add an issue to a project.
    async fn add_issue(&self, project_id: &ProjectId, new: NewIssue) -> Result<Issue>;

    /// List issues for a project, optionally filtered by status.
    async fn list_issues(
        &self,
        project_id: &ProjectId,
        status: Option<IssueStatus>,
    ) -> Result<Vec<Issue>>;

    /// Resolve an issue within a project by fuzzy title match.
    async fn find_issue(&self, project_id: &ProjectId, title: &str) -> Result<Issue>;

    /// Apply field updates to an issue.
    async fn update_issue(&self, issue_id: &IssueId, update: IssueUpdate) -> Result<Issue>;
}

/// Outcome of a fuzzy name lookup.
#[derive(Debug)]
pub(crate) enum NameMatch<T> {
    /// Exactly one candidate matched.
    Unique(T),
    /// Nothing matched.
    None,
    /// Several candidates matched; holds their display names.
    Ambiguous(Vec<String>),
}

/// Resolve `query` against `items` by name.
///
/// Case-insensitive exact matches take precedence; otherwise the query is
/// treated as a substring and must select exactly one candidate.
pub(crate) fn resolve_by_name<T>(
    items: Vec<T>,
    name_of: impl Fn(&T) -> &str,
    query: &str,
) -> NameMatch<T> {
    let needle = query.to_lowercase();

    if let Some(pos) = items
        .iter()
        .position(|item| name_of(item).to_lowercase() == needle)
    {
        let mut items = items;
        return NameMatch::Unique(items.swap_remove(pos));
    }

    let mut candidates: Vec<T> = items
        .into_iter()
        .filter(|item| name_of(item).to_lowercase().contains(&needle))
        .collect();

    match candidates.len() {
        0 => NameMatch::None,
        1 => NameMatch::Unique(candidates.remove(0)),
        _ => NameMatch::Ambiguous(
            candidates
                .iter()
                .map(|item| name_of(item).to_string())
                .collect(),
        ),
    }
}
