//! Integration tests for the girder MCP server.
//!
//! These exercise the full stack: HTTP endpoints -> transport manager ->
//! protocol layer -> dispatcher -> tools -> in-memory store, reading real
//! SSE frames off the response body.

use axum::body::{Body, BodyDataStream};
use axum::http::{Request, StatusCode};
use axum::Router;
use futures::StreamExt;
use girder_mcp::config::ServerConfig;
use girder_mcp::dispatcher::Dispatcher;
use girder_mcp::http::router;
use girder_mcp::protocol::ProtocolHandler;
use girder_mcp::registry::ToolRegistry;
use girder_mcp::tools::Tools;
use girder_mcp::transport::{TransportConfig, TransportManager};
use girder::store::MemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

mod helpers {
    use super::*;

    pub fn manager_with(config: TransportConfig) -> TransportManager {
        let store = Arc::new(MemoryStore::new());
        let registry = ToolRegistry::builtin(Arc::new(Tools::new(store)));
        let protocol = ProtocolHandler::new(Dispatcher::new(Arc::new(registry)));
        TransportManager::new(protocol, config)
    }

    pub fn manager() -> TransportManager {
        manager_with(TransportConfig::default())
    }

    /// Incremental reader over an SSE response body.
    pub struct SseReader {
        stream: BodyDataStream,
        buffer: String,
    }

    impl SseReader {
        pub fn new(body: Body) -> Self {
            Self {
                stream: body.into_data_stream(),
                buffer: String::new(),
            }
        }

        /// Read the next complete SSE block (terminated by a blank line).
        pub async fn next_block(&mut self) -> String {
            loop {
                if let Some(end) = self.buffer.find("\n\n") {
                    let block = self.buffer[..end].to_string();
                    self.buffer.drain(..end + 2);
                    return block;
                }
                let chunk = tokio::time::timeout(Duration::from_secs(5), self.stream.next())
                    .await
                    .expect("timed out waiting for an SSE frame")
                    .expect("SSE stream ended unexpectedly")
                    .expect("SSE body error");
                self.buffer
                    .push_str(std::str::from_utf8(&chunk).expect("SSE frames are UTF-8"));
            }
        }

        /// Read blocks until the next `message` event, returning its JSON data.
        pub async fn next_message(&mut self) -> Value {
            loop {
                let block = self.next_block().await;
                if !block.lines().any(|line| line.trim() == "event: message") {
                    continue;
                }
                let data = data_of(&block);
                return serde_json::from_str(&data).expect("message data is JSON");
            }
        }
    }

    /// Extract the data payload of an SSE block.
    pub fn data_of(block: &str) -> String {
        block
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(str::trim_start)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Open an SSE channel over HTTP, returning the session id and a frame
    /// reader positioned after the endpoint announcement.
    pub async fn open_sse(app: &Router) -> (String, SseReader) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/sse").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let mut reader = SseReader::new(response.into_body());
        let endpoint = loop {
            let block = reader.next_block().await;
            if block.lines().any(|line| line.trim() == "event: endpoint") {
                break data_of(&block);
            }
        };
        let session_id = endpoint
            .split("sessionId=")
            .nth(1)
            .expect("endpoint event should carry the session id")
            .to_string();
        (session_id, reader)
    }

    /// Submit a JSON-RPC request body for the given session.
    pub async fn submit(app: &Router, session_id: &str, body: Value) -> StatusCode {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/messages?sessionId={session_id}"))
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        response.status()
    }

    pub fn call_tool(id: u64, name: &str, arguments: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        })
    }
}

use helpers::{call_tool, manager, manager_with, open_sse, submit};

#[tokio::test]
async fn full_session_lifecycle_over_http() {
    let app = router(manager());
    let (session_id, mut reader) = open_sse(&app).await;

    // Initialize handshake.
    let status = submit(
        &app,
        &session_id,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let response = reader.next_message().await;
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["serverInfo"]["name"], "girder-mcp");

    // Empty catalog lists no projects, failure flag clear.
    let status = submit(
        &app,
        &session_id,
        call_tool(2, "list_all_projects", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let response = reader.next_message().await;
    assert_eq!(response["result"]["isError"], false);
    assert!(response["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("No projects exist yet"));
}

#[tokio::test]
async fn add_issue_against_missing_project_fails_inside_envelope() {
    let app = router(manager());
    let (session_id, mut reader) = open_sse(&app).await;

    let status = submit(
        &app,
        &session_id,
        call_tool(
            1,
            "add_issue",
            json!({"project_name": "Phoenix", "title": "Crash on load"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let response = reader.next_message().await;
    // The JSON-RPC layer reports success; the failure rides the envelope.
    assert!(response.get("error").is_none());
    assert_eq!(response["result"]["isError"], true);
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Phoenix"));
}

#[tokio::test]
async fn issue_workflow_spans_multiple_requests_on_one_channel() {
    let app = router(manager());
    let (session_id, mut reader) = open_sse(&app).await;

    submit(
        &app,
        &session_id,
        call_tool(1, "create_project", json!({"name": "Phoenix"})),
    )
    .await;
    let created = reader.next_message().await;
    assert_eq!(created["result"]["isError"], false);

    submit(
        &app,
        &session_id,
        call_tool(
            2,
            "add_issue",
            json!({
                "project_name": "phoenix",
                "title": "Crash on load",
                "priority": "high"
            }),
        ),
    )
    .await;
    let added = reader.next_message().await;
    assert_eq!(added["result"]["isError"], false);

    submit(
        &app,
        &session_id,
        call_tool(
            3,
            "update_issue_status",
            json!({
                "project_name": "Phoenix",
                "issue_title": "crash",
                "status": "done"
            }),
        ),
    )
    .await;
    let updated = reader.next_message().await;
    assert_eq!(updated["result"]["isError"], false);

    submit(
        &app,
        &session_id,
        call_tool(4, "list_issues", json!({"project_name": "Phoenix"})),
    )
    .await;
    let listed = reader.next_message().await;
    let text = listed["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("[done/high] Crash on load"));
}

#[tokio::test]
async fn concurrent_channels_get_distinct_sessions_and_isolated_responses() {
    let app = router(manager());
    let (id1, mut reader1) = open_sse(&app).await;
    let (id2, mut reader2) = open_sse(&app).await;
    assert_ne!(id1, id2);

    submit(&app, &id1, call_tool(10, "list_all_projects", json!({}))).await;
    submit(&app, &id2, call_tool(20, "list_all_projects", json!({}))).await;

    let response1 = reader1.next_message().await;
    let response2 = reader2.next_message().await;
    assert_eq!(response1["id"], 10);
    assert_eq!(response2["id"], 20);
}

#[tokio::test]
async fn bogus_session_id_yields_diagnostic_bad_request() {
    let app = router(manager());
    let (live_id, _reader) = open_sse(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/messages?sessionId=bogus-id")
                .body(Body::from(
                    json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("bogus-id"));
    assert!(text.contains(&live_id));
}

#[tokio::test]
async fn keepalives_flow_on_short_cadence_and_stop_after_close() {
    let manager = manager_with(TransportConfig {
        keepalive_interval: Duration::from_millis(25),
        close_grace: Duration::from_millis(50),
    });
    let (id, mut rx) = manager.open_channel().await.unwrap();

    // Initial flush comment and endpoint event come first.
    rx.recv().await.unwrap();
    rx.recv().await.unwrap();

    let mut comments = 0;
    while comments < 3 {
        match tokio::time::timeout(Duration::from_secs(2), rx.recv()).await {
            Ok(Some(girder_mcp::session::SseFrame::Comment(_))) => comments += 1,
            Ok(Some(_)) => {}
            other => panic!("keep-alive stream stalled: {other:?}"),
        }
    }

    manager.close_channel(&id);

    // At most one already-queued frame may drain; then the stream ends.
    let rest = tokio::time::timeout(Duration::from_secs(2), async {
        let mut frames = 0;
        while rx.recv().await.is_some() {
            frames += 1;
        }
        frames
    })
    .await
    .expect("stream should end after the grace period");
    assert!(rest <= 1, "keep-alives kept flowing after close: {rest}");
    assert_eq!(manager.session_count(), 0);
}

#[test]
fn default_config_matches_transport_defaults() {
    use clap::Parser;
    let config = ServerConfig::try_parse_from(["girder-mcp"]).unwrap();
    let timings = config.transport_config();
    let defaults = TransportConfig::default();
    assert_eq!(timings.keepalive_interval, defaults.keepalive_interval);
    assert_eq!(timings.close_grace, defaults.close_grace);
}
