//! Tool parameter models.
//!
//! Each MCP tool declares its argument bag as a typed struct here. The same
//! struct drives both sides of validation: `schemars` derives the JSON Schema
//! advertised in `tools/list`, and serde deserialization enforces required
//! fields and enum constraints before a handler body ever runs.

use girder::domain::{IssueStatus, Priority};
use schemars::JsonSchema;
use serde::Deserialize;

/// Arguments for the `list_all_projects` tool. Takes no arguments.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListAllProjectsParams {}

/// Arguments for the `create_project` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateProjectParams {
    /// Name for the new project.
    pub name: String,

    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Arguments for the `add_issue` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddIssueParams {
    /// Name of the project to file the issue against (fuzzy matched).
    pub project_name: String,

    /// Issue title.
    pub title: String,

    /// Optional issue description.
    #[serde(default)]
    pub description: Option<String>,

    /// Priority level; defaults to medium.
    #[serde(default)]
    pub priority: Option<Priority>,
}

/// Arguments for the `list_issues` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListIssuesParams {
    /// Name of the project whose issues to list (fuzzy matched).
    pub project_name: String,

    /// Only list issues in this workflow stage.
    #[serde(default)]
    pub status: Option<IssueStatus>,
}

/// Arguments for the `update_issue_status` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateIssueStatusParams {
    /// Name of the project the issue belongs to (fuzzy matched).
    pub project_name: String,

    /// Title of the issue to update (fuzzy matched).
    pub issue_title: String,

    /// New workflow stage.
    pub status: IssueStatus,
}

/// Arguments for the `set_issue_priority` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetIssuePriorityParams {
    /// Name of the project the issue belongs to (fuzzy matched).
    pub project_name: String,

    /// Title of the issue to update (fuzzy matched).
    pub issue_title: String,

    /// New priority level.
    pub priority: Priority,
}
