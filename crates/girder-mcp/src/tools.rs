//! MCP tool implementations.
//!
//! Thin business logic over the [`TrackerStore`] collaborator. Every method
//! returns a human-readable summary string; failures propagate as errors and
//! are converted into failed response envelopes at the dispatcher boundary.

use crate::error::Result;
use crate::models::{
    AddIssueParams, CreateProjectParams, ListAllProjectsParams, ListIssuesParams,
    SetIssuePriorityParams, UpdateIssueStatusParams,
};
use girder::domain::{IssueUpdate, NewIssue, NewProject};
use girder::store::TrackerStore;
use std::fmt::Write as _;
use std::sync::Arc;

/// Tool implementations for the girder MCP server.
pub struct Tools {
    store: Arc<dyn TrackerStore>,
}

impl Tools {
    /// Create a new `Tools` instance over the given store.
    pub fn new(store: Arc<dyn TrackerStore>) -> Self {
        Self { store }
    }

    /// List every tracked project.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage lookup fails.
    pub async fn list_all_projects(&self, _params: ListAllProjectsParams) -> Result<String> {
        let projects = self.store.list_projects().await?;
        if projects.is_empty() {
            return Ok(
                "No projects exist yet. Use create_project to add one.".to_string(),
            );
        }

        let mut out = format!("{} project(s):\n", projects.len());
        for project in projects {
            match project.description {
                Some(description) => {
                    let _ = writeln!(out, "- {}: {description}", project.name);
                }
                None => {
                    let _ = writeln!(out, "- {}", project.name);
                }
            }
        }
        Ok(out.trim_end().to_string())
    }

    /// Create a new project.
    ///
    /// # Errors
    ///
    /// Returns an error if a project with the same name already exists.
    pub async fn create_project(&self, params: CreateProjectParams) -> Result<String> {
        let project = self
            .store
            .create_project(NewProject {
                name: params.name,
                description: params.description,
            })
            .await?;
        Ok(format!("Created project '{}' (id {})", project.name, project.id))
    }

    /// File a new issue against a project.
    ///
    /// # Errors
    ///
    /// Returns an error if no project matches the given name or the name is
    /// ambiguous.
    pub async fn add_issue(&self, params: AddIssueParams) -> Result<String> {
        let project = self.store.find_project(&params.project_name).await?;
        let issue = self
            .store
            .add_issue(
                &project.id,
                NewIssue {
                    title: params.title,
                    description: params.description.unwrap_or_default(),
                    priority: params.priority.unwrap_or_default(),
                },
            )
            .await?;
        Ok(format!(
            "Added issue '{}' to project '{}' with {} priority",
            issue.title, project.name, issue.priority
        ))
    }

    /// List a project's issues, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if no project matches the given name.
    pub async fn list_issues(&self, params: ListIssuesParams) -> Result<String> {
        let project = self.store.find_project(&params.project_name).await?;
        let issues = self.store.list_issues(&project.id, params.status).await?;

        if issues.is_empty() {
            return Ok(match params.status {
                Some(status) => {
                    format!("No {status} issues in project '{}'", project.name)
                }
                None => format!("No issues in project '{}'", project.name),
            });
        }

        let mut out = format!("{} issue(s) in '{}':\n", issues.len(), project.name);
        for issue in issues {
            let _ = writeln!(
                out,
                "- [{}/{}] {}",
                issue.status, issue.priority, issue.title
            );
        }
        Ok(out.trim_end().to_string())
    }

    /// Move an issue to a new workflow stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the project or issue cannot be resolved.
    pub async fn update_issue_status(&self, params: UpdateIssueStatusParams) -> Result<String> {
        let project = self.store.find_project(&params.project_name).await?;
        let issue = self.store.find_issue(&project.id, &params.issue_title).await?;
        let updated = self
            .store
            .update_issue(
                &issue.id,
                IssueUpdate {
                    status: Some(params.status),
                    priority: None,
                },
            )
            .await?;
        Ok(format!(
            "Marked '{}' as {} in project '{}'",
            updated.title, updated.status, project.name
        ))
    }

    /// Change an issue's priority.
    ///
    /// # Errors
    ///
    /// Returns an error if the project or issue cannot be resolved.
    pub async fn set_issue_priority(&self, params: SetIssuePriorityParams) -> Result<String> {
        let project = self.store.find_project(&params.project_name).await?;
        let issue = self.store.find_issue(&project.id, &params.issue_title).await?;
        let updated = self
            .store
            .update_issue(
                &issue.id,
                IssueUpdate {
                    status: None,
                    priority: Some(params.priority),
                },
            )
            .await?;
        Ok(format!(
            "Set priority of '{}' to {} in project '{}'",
            updated.title, updated.priority, project.name
        ))
    }
}
