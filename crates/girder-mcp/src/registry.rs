//! Operation registry.
//!
//! A static catalog mapping each tool name to its description, its JSON input
//! schema, and the handler that runs it. The registry is pure lookup; all
//! failure normalization happens in the dispatcher.

use crate::error::{Error, Result};
use crate::models::{
    AddIssueParams, CreateProjectParams, ListAllProjectsParams, ListIssuesParams,
    SetIssuePriorityParams, UpdateIssueStatusParams,
};
use crate::tools::Tools;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type ToolFuture = Pin<Box<dyn Future<Output = Result<String>> + Send>>;
type ToolFn = Box<dyn Fn(Value) -> ToolFuture + Send + Sync>;

/// A single registered operation: name, description, argument schema, handler.
pub struct Tool {
    name: &'static str,
    description: &'static str,
    input_schema: Value,
    run: ToolFn,
}

impl Tool {
    /// Register a handler taking a typed parameter struct.
    ///
    /// The schema advertised for the tool and the validation applied to the
    /// argument bag both derive from `P`, so they cannot drift apart.
    fn new<P, F, Fut>(name: &'static str, description: &'static str, handler: F) -> Self
    where
        P: DeserializeOwned + JsonSchema,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        let input_schema = serde_json::to_value(schemars::schema_for!(P)).unwrap_or_default();
        let handler = Arc::new(handler);
        let run: ToolFn = Box::new(move |args| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let params: P =
                    serde_json::from_value(args).map_err(|e| Error::InvalidArguments {
                        tool: name,
                        message: e.to_string(),
                    })?;
                handler(params).await
            })
        });
        Self {
            name,
            description,
            input_schema,
            run,
        }
    }

    /// Tool name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// JSON Schema for the argument bag.
    #[must_use]
    pub fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// Validate the argument bag and run the handler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArguments`] if the bag does not satisfy the
    /// tool's schema, or whatever error the handler itself produced.
    pub async fn call(&self, args: Value) -> Result<String> {
        (self.run)(args).await
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool").field("name", &self.name).finish()
    }
}

/// The catalog of all operations exposed by this server.
#[derive(Debug)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    /// Build the registry of built-in tracker tools over the given `Tools`.
    #[must_use]
    pub fn builtin(tools: Arc<Tools>) -> Self {
        let t = Arc::clone(&tools);
        let list_all_projects = Tool::new(
            "list_all_projects",
            "List every tracked project with its description.",
            move |params: ListAllProjectsParams| {
                let t = Arc::clone(&t);
                async move { t.list_all_projects(params).await }
            },
        );

        let t = Arc::clone(&tools);
        let create_project = Tool::new(
            "create_project",
            "Create a new project with a name and optional description.",
            move |params: CreateProjectParams| {
                let t = Arc::clone(&t);
                async move { t.create_project(params).await }
            },
        );

        let t = Arc::clone(&tools);
        let add_issue = Tool::new(
            "add_issue",
            "File a new issue against a project. The project is located by fuzzy name match.",
            move |params: AddIssueParams| {
                let t = Arc::clone(&t);
                async move { t.add_issue(params).await }
            },
        );

        let t = Arc::clone(&tools);
        let list_issues = Tool::new(
            "list_issues",
            "List a project's issues, optionally filtered by status (open, in_progress, done).",
            move |params: ListIssuesParams| {
                let t = Arc::clone(&t);
                async move { t.list_issues(params).await }
            },
        );

        let t = Arc::clone(&tools);
        let update_issue_status = Tool::new(
            "update_issue_status",
            "Move an issue to a new workflow stage (open, in_progress, done).",
            move |params: UpdateIssueStatusParams| {
                let t = Arc::clone(&t);
                async move { t.update_issue_status(params).await }
            },
        );

        let t = Arc::clone(&tools);
        let set_issue_priority = Tool::new(
            "set_issue_priority",
            "Change an issue's priority (low, medium, high).",
            move |params: SetIssuePriorityParams| {
                let t = Arc::clone(&t);
                async move { t.set_issue_priority(params).await }
            },
        );

        Self {
            tools: vec![
                list_all_projects,
                create_project,
                add_issue,
                list_issues,
                update_issue_status,
                set_issue_priority,
            ],
        }
    }

    /// Look up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    /// Iterate over all tools in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter()
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
