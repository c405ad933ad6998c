//! Integration tests for the in-memory tracker store.
//!
//! These exercise the store through the `TrackerStore` trait object, the way
//! the MCP server consumes it.

use girder::domain::{IssueStatus, IssueUpdate, NewIssue, NewProject, Priority};
use girder::store::{MemoryStore, TrackerStore};
use girder::Error;
use std::sync::Arc;

fn store() -> Arc<dyn TrackerStore> {
    Arc::new(MemoryStore::new())
}

async fn create_project(store: &Arc<dyn TrackerStore>, name: &str) {
    store
        .create_project(NewProject {
            name: name.to_string(),
            description: Some(format!("Description for {name}")),
        })
        .await
        .expect("create_project should succeed");
}

#[tokio::test]
async fn full_issue_workflow_through_trait_object() {
    let store = store();
    create_project(&store, "Phoenix").await;

    let project = store.find_project("phoen").await.unwrap();
    let issue = store
        .add_issue(
            &project.id,
            NewIssue {
                title: "Crash on load".to_string(),
                description: "Segfault during startup".to_string(),
                priority: Priority::High,
            },
        )
        .await
        .unwrap();

    let found = store.find_issue(&project.id, "crash").await.unwrap();
    assert_eq!(found.id, issue.id);

    store
        .update_issue(
            &issue.id,
            IssueUpdate {
                status: Some(IssueStatus::InProgress),
                priority: None,
            },
        )
        .await
        .unwrap();

    let in_progress = store
        .list_issues(&project.id, Some(IssueStatus::InProgress))
        .await
        .unwrap();
    assert_eq!(in_progress.len(), 1);
    assert_eq!(in_progress[0].priority, Priority::High);
}

#[tokio::test]
async fn ambiguous_project_query_lists_candidates() {
    let store = store();
    create_project(&store, "API Gateway").await;
    create_project(&store, "API Docs").await;

    let err = store.find_project("api").await.unwrap_err();
    match err {
        Error::AmbiguousProject { query, matches } => {
            assert_eq!(query, "api");
            assert_eq!(matches.len(), 2);
        }
        other => panic!("expected AmbiguousProject, got {other}"),
    }
}

#[tokio::test]
async fn missing_project_error_names_the_query() {
    let store = store();
    let err = store.find_project("Phoenix").await.unwrap_err();
    assert!(matches!(err, Error::ProjectNotFound(_)));
    assert!(err.to_string().contains("Phoenix"));
}

#[tokio::test]
async fn concurrent_project_creation_yields_distinct_ids() {
    let store: Arc<dyn TrackerStore> = Arc::new(MemoryStore::new());

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .create_project(NewProject {
                    name: format!("project-{i}"),
                    description: None,
                })
                .await
                .unwrap()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().id);
    }
    ids.sort_by(|a, b| a.0.cmp(&b.0));
    ids.dedup();
    assert_eq!(ids.len(), 8);
}
