//! Domain types for project and issue tracking.
//!
//! This module contains the core domain types shared by all storage backends
//! and by the MCP tool surface.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Generate a fresh random project id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for an issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueId(pub String);

impl IssueId {
    /// Generate a fresh random issue id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IssueId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A tracked project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier.
    pub id: ProjectId,

    /// Project name (unique among live projects).
    pub name: String,

    /// Optional free-form description.
    pub description: Option<String>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// An issue belonging to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Unique identifier.
    pub id: IssueId,

    /// Identifier of the owning project.
    pub project_id: ProjectId,

    /// Issue title.
    pub title: String,

    /// Issue description.
    pub description: String,

    /// Current workflow stage.
    pub status: IssueStatus,

    /// Priority level.
    pub priority: Priority,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Priority level of an issue.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,

    /// Normal priority.
    #[default]
    Medium,

    /// Needs attention soon.
    High,
}

impl Priority {
    /// Parse a priority from its string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{s}")
    }
}

/// Workflow stage of an issue.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    /// Newly filed, not started.
    #[default]
    Open,

    /// Currently being worked on.
    InProgress,

    /// Completed.
    Done,
}

impl IssueStatus {
    /// Parse a status from its string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "in_progress" | "in-progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}

/// Data for creating a new project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    /// Project name.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,
}

/// Data for creating a new issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIssue {
    /// Issue title.
    pub title: String,

    /// Issue description.
    pub description: String,

    /// Priority level.
    pub priority: Priority,
}

/// Field updates to apply to an existing issue.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueUpdate {
    /// New workflow stage, if changing.
    pub status: Option<IssueStatus>,

    /// New priority, if changing.
    pub priority: Option<Priority>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::low("low", Some(Priority::Low))]
    #[case::medium("medium", Some(Priority::Medium))]
    #[case::high("high", Some(Priority::High))]
    #[case::uppercase("HIGH", Some(Priority::High))]
    #[case::invalid("urgent", None)]
    #[case::empty("", None)]
    fn test_parse_priority(#[case] input: &str, #[case] expected: Option<Priority>) {
        assert_eq!(Priority::parse(input), expected);
    }

    #[rstest]
    #[case::open("open", Some(IssueStatus::Open))]
    #[case::in_progress_underscore("in_progress", Some(IssueStatus::InProgress))]
    #[case::in_progress_hyphen("in-progress", Some(IssueStatus::InProgress))]
    #[case::done("done", Some(IssueStatus::Done))]
    #[case::uppercase("DONE", Some(IssueStatus::Done))]
    #[case::invalid("closed", None)]
    fn test_parse_status(#[case] input: &str, #[case] expected: Option<IssueStatus>) {
        assert_eq!(IssueStatus::parse(input), expected);
    }

    #[rstest]
    #[case(Priority::Low, "low")]
    #[case(Priority::Medium, "medium")]
    #[case(Priority::High, "high")]
    fn test_priority_display_round_trips(#[case] priority: Priority, #[case] text: &str) {
        assert_eq!(priority.to_string(), text);
        assert_eq!(Priority::parse(text), Some(priority));
    }

    #[test]
    fn test_priority_serde_uses_lowercase() {
        let json = serde_json::to_string(&Priority::High).unwrap();
        assert_eq!(json, "\"high\"");
        let parsed: Priority = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(parsed, Priority::Low);
    }

    #[test]
    fn test_status_serde_uses_snake_case() {
        let json = serde_json::to_string(&IssueStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        assert_ne!(ProjectId::generate(), ProjectId::generate());
        assert_ne!(IssueId::generate(), IssueId::generate());
    }
}
