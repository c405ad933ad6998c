//! In-memory storage backend.
//!
//! All data is held in RAM and lost when the process exits. This backend is
//! used for tests and as the degraded-mode fallback when no remote tracker
//! credentials are configured.
//!
//! # Thread safety
//!
//! State lives behind a single `tokio::sync::RwLock`, so the store can be
//! shared across tasks as `Arc<MemoryStore>`.

use crate::domain::{
    Issue, IssueId, IssueStatus, IssueUpdate, NewIssue, NewProject, Project, ProjectId,
};
use crate::error::{Error, Result};
use crate::store::{resolve_by_name, NameMatch, TrackerStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Mutable state guarded by the store lock.
#[derive(Default)]
struct MemoryState {
    projects: HashMap<ProjectId, Project>,
    issues: HashMap<IssueId, Issue>,
}

/// Ephemeral in-memory implementation of [`TrackerStore`].
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrackerStore for MemoryStore {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let state = self.state.read().await;
        let mut projects: Vec<Project> = state.projects.values().cloned().collect();
        projects.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(projects)
    }

    async fn create_project(&self, new: NewProject) -> Result<Project> {
        let mut state = self.state.write().await;

        if state
            .projects
            .values()
            .any(|p| p.name.eq_ignore_ascii_case(&new.name))
        {
            return Err(Error::DuplicateProject(new.name));
        }

        let project = Project {
            id: ProjectId::generate(),
            name: new.name,
            description: new.description,
            created_at: Utc::now(),
        };
        state.projects.insert(project.id.clone(), project.clone());
        debug!(project = %project.id, name = %project.name, "project created");
        Ok(project)
    }

    async fn find_project(&self, name: &str) -> Result<Project> {
        let projects = self.list_projects().await?;
        match resolve_by_name(projects, |p| p.name.as_str(), name) {
            NameMatch::Unique(project) => Ok(project),
            NameMatch::None => Err(Error::ProjectNotFound(name.to_string())),
            NameMatch::Ambiguous(matches) => Err(Error::AmbiguousProject {
                query: name.to_string(),
                matches,
            }),
        }
    }

    async fn add_issue(&self, project_id: &ProjectId, new: NewIssue) -> Result<Issue> {
        let mut state = self.state.write().await;

        if !state.projects.contains_key(project_id) {
            return Err(Error::UnknownId(project_id.to_string()));
        }

        let now = Utc::now();
        let issue = Issue {
            id: IssueId::generate(),
            project_id: project_id.clone(),
            title: new.title,
            description: new.description,
            status: IssueStatus::Open,
            priority: new.priority,
            created_at: now,
            updated_at: now,
        };
        state.issues.insert(issue.id.clone(), issue.clone());
        debug!(issue = %issue.id, project = %project_id, title = %issue.title, "issue added");
        Ok(issue)
    }

    async fn list_issues(
        &self,
        project_id: &ProjectId,
        status: Option<IssueStatus>,
    ) -> Result<Vec<Issue>> {
        let state = self.state.read().await;
        let mut issues: Vec<Issue> = state
            .issues
            .values()
            .filter(|i| &i.project_id == project_id)
            .filter(|i| status.is_none_or(|s| i.status == s))
            .cloned()
            .collect();
        issues.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(issues)
    }

    async fn find_issue(&self, project_id: &ProjectId, title: &str) -> Result<Issue> {
        let issues = self.list_issues(project_id, None).await?;
        let project_name = {
            let state = self.state.read().await;
            state
                .projects
                .get(project_id)
                .map_or_else(|| project_id.to_string(), |p| p.name.clone())
        };
        match resolve_by_name(issues, |i| i.title.as_str(), title) {
            NameMatch::Unique(issue) => Ok(issue),
            NameMatch::None => Err(Error::IssueNotFound {
                query: title.to_string(),
                project: project_name,
            }),
            NameMatch::Ambiguous(matches) => Err(Error::AmbiguousIssue {
                query: title.to_string(),
                matches,
            }),
        }
    }

    async fn update_issue(&self, issue_id: &IssueId, update: IssueUpdate) -> Result<Issue> {
        let mut state = self.state.write().await;
        let issue = state
            .issues
            .get_mut(issue_id)
            .ok_or_else(|| Error::UnknownId(issue_id.to_string()))?;

        if let Some(status) = update.status {
            issue.status = status;
        }
        if let Some(priority) = update.priority {
            issue.priority = priority;
        }
        issue.updated_at = Utc::now();
        debug!(
            issue = %issue.id,
            status = %issue.status,
            priority = %issue.priority,
            "issue updated"
        );
        Ok(issue.clone())
    }
}
