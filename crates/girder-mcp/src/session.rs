//! Channel sessions.
//!
//! A [`ChannelSession`] wraps exactly one outbound push sink and its
//! keep-alive cadence. No business logic lives here; sessions are driven by
//! the [`crate::transport::TransportManager`].
//!
//! The sink is a bounded mpsc channel consumed by a single SSE response
//! stream. Keep-alive frames and response payloads are producers into the
//! same channel, which serializes them and preserves per-session send order.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

/// One frame pushed down a session's event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// An SSE comment line. Used for the initial buffering-proxy flush and
    /// for keep-alive signals; clients ignore comments.
    Comment(String),

    /// A named SSE event with a data payload.
    Event {
        /// Event name (`endpoint` or `message`).
        name: &'static str,
        /// Event data.
        data: String,
    },
}

/// One open push channel: an outbound sink plus its keep-alive timer.
pub struct ChannelSession {
    id: String,
    sink: mpsc::Sender<SseFrame>,
    keepalive: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
    created_at: Instant,
}

impl ChannelSession {
    /// Create a session around an already-established sink.
    #[must_use]
    pub fn new(id: String, sink: mpsc::Sender<SseFrame>) -> Self {
        Self {
            id,
            sink,
            keepalive: Mutex::new(None),
            closed: AtomicBool::new(false),
            created_at: Instant::now(),
        }
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// How long the session has been open.
    #[must_use]
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Start the recurring keep-alive signal.
    ///
    /// The task writes a comment frame to the sink every `interval` and stops
    /// on its own if the sink closes. Restarting replaces the previous timer.
    pub fn start_keepalive(&self, interval: Duration) {
        let sink = self.sink.clone();
        let id = self.id.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; skip it so the cadence
            // starts one full interval after channel open.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                trace!(session = %id, "keep-alive");
                if sink
                    .send(SseFrame::Comment("keep-alive".to_string()))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });

        if let Some(previous) = self.keepalive.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Stop the keep-alive timer. Safe to call any number of times.
    pub fn cancel_keepalive(&self) {
        if let Some(handle) = self.keepalive.lock().take() {
            handle.abort();
        }
    }

    /// Latch the session as closed.
    ///
    /// Returns `true` only for the first call, so close-triggered work runs
    /// at most once.
    pub fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::SeqCst)
    }

    /// Whether the consuming stream has gone away.
    #[must_use]
    pub fn is_sink_closed(&self) -> bool {
        self.sink.is_closed()
    }

    /// Push a frame to the session's sink.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the consuming stream has been
    /// dropped.
    pub async fn send(&self, frame: SseFrame) -> Result<()> {
        self.sink
            .send(frame)
            .await
            .map_err(|_| Error::ChannelClosed(self.id.clone()))
    }

    /// Push a response payload as a `message` event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the consuming stream has been
    /// dropped.
    pub async fn send_message(&self, data: String) -> Result<()> {
        self.send(SseFrame::Event {
            name: "message",
            data,
        })
        .await
    }
}

impl Drop for ChannelSession {
    fn drop(&mut self) {
        // A session removed from the live set must not leave its timer
        // running.
        self.cancel_keepalive();
    }
}

impl std::fmt::Debug for ChannelSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelSession")
            .field("id", &self.id)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

/// Create a session plus the receiving half of its sink.
#[must_use]
pub fn channel(id: String, capacity: usize) -> (Arc<ChannelSession>, mpsc::Receiver<SseFrame>) {
    let (tx, rx) = mpsc::channel(capacity);
    (Arc::new(ChannelSession::new(id, tx)), rx)
}
