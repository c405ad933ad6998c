//! HTTP endpoints for the networked push-stream transport.
//!
//! - `GET /sse` opens a server-sent-events channel and announces the
//!   request-submission endpoint for the new session
//! - `POST /messages?sessionId=<id>` submits a JSON-RPC message routed to
//!   that session
//!
//! Client disconnects are observed through stream drop: when the SSE body is
//! dropped, the guard stream reports the closure to the transport manager,
//! which starts the grace-delayed removal.

use crate::error::Error;
use crate::session::SseFrame;
use crate::transport::{TransportManager, MESSAGES_PATH};
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use futures::Stream;
use serde::Deserialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

/// Build the transport router.
pub fn router(manager: TransportManager) -> Router {
    Router::new()
        .route("/sse", get(open_channel))
        .route(MESSAGES_PATH, post(submit_message))
        .with_state(manager)
}

/// Bind the listen port and serve the transport until shutdown.
///
/// # Errors
///
/// Returns an error if the port cannot be bound (the only fatal startup
/// condition) or if the server loop fails.
pub async fn serve(manager: TransportManager, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening for SSE connections");
    axum::serve(listener, router(manager)).await?;
    Ok(())
}

/// Session frames adapted to SSE events, with close-on-drop reporting.
struct SessionStream {
    frames: ReceiverStream<SseFrame>,
    manager: TransportManager,
    id: String,
}

impl Stream for SessionStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.frames)
            .poll_next(cx)
            .map(|frame| frame.map(|frame| Ok(frame_to_event(frame))))
    }
}

impl Drop for SessionStream {
    fn drop(&mut self) {
        debug!(session = %self.id, "SSE stream dropped");
        // Deferred removal needs a timer, so only report the close while the
        // runtime is still up.
        if tokio::runtime::Handle::try_current().is_ok() {
            self.manager.close_channel(&self.id);
        }
    }
}

fn frame_to_event(frame: SseFrame) -> Event {
    match frame {
        SseFrame::Comment(text) => Event::default().comment(text),
        SseFrame::Event { name, data } => Event::default().event(name).data(data),
    }
}

async fn open_channel(State(manager): State<TransportManager>) -> Response {
    let (id, rx) = match manager.open_channel().await {
        Ok(opened) => opened,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let stream = SessionStream {
        frames: ReceiverStream::new(rx),
        manager,
        id,
    };

    let mut response = Sse::new(stream).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert("x-accel-buffering", HeaderValue::from_static("no"));
    response
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

async fn submit_message(
    State(manager): State<TransportManager>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> Response {
    let Some(session_id) = query.session_id else {
        return (
            StatusCode::BAD_REQUEST,
            "Missing sessionId query parameter",
        )
            .into_response();
    };

    match manager.submit_request(&session_id, body).await {
        Ok(()) => (StatusCode::ACCEPTED, "Accepted").into_response(),
        Err(e @ Error::SessionNotFound { .. }) => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::protocol::ProtocolHandler;
    use crate::registry::ToolRegistry;
    use crate::tools::Tools;
    use crate::transport::TransportConfig;
    use axum::body::Body;
    use axum::http::Request;
    use girder::store::MemoryStore;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn manager() -> TransportManager {
        let store = Arc::new(MemoryStore::new());
        let registry = ToolRegistry::builtin(Arc::new(Tools::new(store)));
        let protocol = ProtocolHandler::new(Dispatcher::new(Arc::new(registry)));
        TransportManager::new(protocol, TransportConfig::default())
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_sse_endpoint_sets_stream_headers() {
        let app = router(manager());
        let response = app
            .oneshot(Request::builder().uri("/sse").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert!(headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
        assert_eq!(headers[header::CONNECTION], "keep-alive");
        assert_eq!(headers["x-accel-buffering"], "no");
    }

    #[tokio::test]
    async fn test_missing_session_id_is_bad_request() {
        let app = router(manager());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/messages")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("Missing sessionId"));
    }

    #[tokio::test]
    async fn test_unknown_session_id_is_bad_request_with_live_listing() {
        let manager = manager();
        let (live_id, _rx) = manager.open_channel().await.unwrap();

        let app = router(manager);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/messages?sessionId=bogus-id")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let text = body_text(response).await;
        assert!(text.contains("Session not found: bogus-id"));
        assert!(text.contains(&live_id));
    }

    #[tokio::test]
    async fn test_submission_to_live_session_is_accepted() {
        let manager = manager();
        let (id, _rx) = manager.open_channel().await.unwrap();

        let app = router(manager);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/messages?sessionId={id}"))
                    .body(Body::from(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_submission_to_dropped_channel_is_server_error() {
        let manager = manager();
        let (id, rx) = manager.open_channel().await.unwrap();
        drop(rx);

        let app = router(manager);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/messages?sessionId={id}"))
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
