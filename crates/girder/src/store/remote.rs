//! HTTP client backend for a remote tracker service.
//!
//! Used when the server is configured with a remote API endpoint and token.
//! Name resolution stays client-side so fuzzy-match semantics are identical
//! across backends.

use crate::domain::{
    Issue, IssueId, IssueStatus, IssueUpdate, NewIssue, NewProject, Project, ProjectId,
};
use crate::error::{Error, Result};
use crate::store::{resolve_by_name, NameMatch, TrackerStore};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::warn;

/// HTTP implementation of [`TrackerStore`] against a remote tracker API.
#[derive(Clone, Debug)]
pub struct RemoteStore {
    base_url: String,
    token: String,
    client: Client,
}

impl RemoteStore {
    /// Create a client for the tracker API at `base_url`, authenticating with
    /// the given bearer token.
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            token: token.into(),
            client: Client::new(),
        }
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(&self.token)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            warn!(status = status.as_u16(), message = %message, "remote tracker API error");
            return Err(Error::RemoteApi {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let response = self.authed(self.client.get(&url)).send().await?;
        Self::parse(response).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        body: &impl serde::Serialize,
    ) -> Result<T> {
        let response = self.authed(builder).json(body).send().await?;
        Self::parse(response).await
    }
}

#[async_trait]
impl TrackerStore for RemoteStore {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.get_json("/api/projects").await
    }

    async fn create_project(&self, new: NewProject) -> Result<Project> {
        let url = format!("{}/api/projects", self.base_url);
        self.send_json(self.client.post(&url), &new).await
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
        let url = format!("{}/api/projects/{project_id}/issues", self.base_url);
        self.send_json(self.client.post(&url), &new).await
    }

    async fn list_issues(
        &self,
        project_id: &ProjectId,
        status: Option<IssueStatus>,
    ) -> Result<Vec<Issue>> {
        let mut path = format!("/api/projects/{project_id}/issues");
        if let Some(status) = status {
            path.push_str(&format!("?status={status}"));
        }
        self.get_json(&path).await
    }

    async fn find_issue(&self, project_id: &ProjectId, title: &str) -> Result<Issue> {
        let issues = self.list_issues(project_id, None).await?;
        match resolve_by_name(issues, |i| i.title.as_str(), title) {
            NameMatch::Unique(issue) => Ok(issue),
            NameMatch::None => Err(Error::IssueNotFound {
                query: title.to_string(),
                project: project_id.to_string(),
            }),
            NameMatch::Ambiguous(matches) => Err(Error::AmbiguousIssue {
                query: title.to_string(),
                matches,
            }),
        }
    }

    async fn update_issue(&self, issue_id: &IssueId, update: IssueUpdate) -> Result<Issue> {
        let url = format!("{}/api/issues/{issue_id}", self.base_url);
        self.send_json(self.client.patch(&url), &update).await
    }
}
