//! Session-multiplexed transport manager.
//!
//! Owns the set of live [`ChannelSession`]s. New push channels are opened
//! here, inbound requests are routed to the session named by their
//! identifier, and closed sessions are removed from the live set only after
//! a grace delay so requests racing a connection teardown are not rejected.

use crate::error::{Error, Result};
use crate::protocol::ProtocolHandler;
use crate::session::{self, ChannelSession, SseFrame};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Path of the request-submission endpoint, advertised to clients in the
/// `endpoint` event when a channel opens.
pub const MESSAGES_PATH: &str = "/messages";

/// Per-session sink capacity. Writers briefly await when a slow client falls
/// this far behind.
const SINK_CAPACITY: usize = 64;

/// Tunable transport timings.
#[derive(Debug, Clone, Copy)]
pub struct TransportConfig {
    /// Cadence of keep-alive comment frames on each open channel.
    pub keepalive_interval: Duration,

    /// How long a closed session stays in the live set to absorb in-flight
    /// requests.
    pub close_grace: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            keepalive_interval: Duration::from_secs(30),
            close_grace: Duration::from_secs(10),
        }
    }
}

struct Inner {
    sessions: Mutex<HashMap<String, Arc<ChannelSession>>>,
    protocol: ProtocolHandler,
    config: TransportConfig,
}

/// Owns the live session set and routes all channel traffic.
///
/// Cheap to clone; all clones share the same session table.
#[derive(Clone)]
pub struct TransportManager {
    inner: Arc<Inner>,
}

impl TransportManager {
    /// Create a manager that routes requests into the given protocol handler.
    #[must_use]
    pub fn new(protocol: ProtocolHandler, config: TransportConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                sessions: Mutex::new(HashMap::new()),
                protocol,
                config,
            }),
        }
    }

    /// Open a new push channel.
    ///
    /// Allocates a session with a fresh identifier, queues the initial
    /// buffering-flush comment and the `endpoint` event carrying the
    /// submission URL, starts the keep-alive timer, and registers the session
    /// in the live set. Registration happens last so a channel that cannot
    /// accept the initial frames never becomes routable.
    ///
    /// Returns the session id and the receiving half of the channel's sink,
    /// which the caller drains into the actual push connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the initial frames cannot be
    /// queued.
    pub async fn open_channel(&self) -> Result<(String, mpsc::Receiver<SseFrame>)> {
        let id = Uuid::new_v4().to_string();
        let (session, rx) = session::channel(id.clone(), SINK_CAPACITY);

        session.send(SseFrame::Comment("ok".to_string())).await?;
        session
            .send(SseFrame::Event {
                name: "endpoint",
                data: format!("{MESSAGES_PATH}?sessionId={id}"),
            })
            .await?;

        session.start_keepalive(self.inner.config.keepalive_interval);
        self.inner
            .sessions
            .lock()
            .insert(id.clone(), session);

        info!(session = %id, "channel opened");
        Ok((id, rx))
    }

    /// Route a raw inbound request to the session named by `id`.
    ///
    /// The request is parsed and executed asynchronously; its response is
    /// pushed down the session's channel as a `message` event. A delivery
    /// failure in that async path is logged and triggers the same cleanup as
    /// an explicit close.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionNotFound`] (with the currently live
    /// identifiers for diagnostics) if `id` is not in the live set, or
    /// [`Error::ChannelClosed`] if the session's sink is already gone.
    pub async fn submit_request(&self, id: &str, body: String) -> Result<()> {
        let session = self.inner.sessions.lock().get(id).cloned();
        let Some(session) = session else {
            return Err(Error::SessionNotFound {
                id: id.to_string(),
                live: self.live_sessions(),
            });
        };

        if session.is_sink_closed() {
            return Err(Error::ChannelClosed(id.to_string()));
        }

        let manager = self.clone();
        tokio::spawn(async move {
            let Some(response) = manager.inner.protocol.handle_message(&body).await else {
                return;
            };
            let payload = match serde_json::to_string(&response) {
                Ok(payload) => payload,
                Err(e) => {
                    error!(session = %session.id(), error = %e, "failed to encode response");
                    return;
                }
            };
            if session.send_message(payload).await.is_err() {
                warn!(session = %session.id(), "response delivery failed, closing channel");
                manager.close_channel(session.id());
            }
        });

        Ok(())
    }

    /// Handle closure of a session's underlying connection.
    ///
    /// Stops the keep-alive timer immediately, then schedules removal from
    /// the live set after the grace delay. Closing an already-closed or
    /// unknown session is a no-op, so the removal task is spawned at most
    /// once per session.
    pub fn close_channel(&self, id: &str) {
        let session = self.inner.sessions.lock().get(id).cloned();
        let Some(session) = session else {
            debug!(session = %id, "close for unknown session ignored");
            return;
        };

        session.cancel_keepalive();
        if !session.mark_closed() {
            return;
        }

        info!(
            session = %id,
            grace_secs = self.inner.config.close_grace.as_secs(),
            "channel closed, removal deferred"
        );

        let manager = self.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(manager.inner.config.close_grace).await;
            manager.remove_session(&id);
        });
    }

    fn remove_session(&self, id: &str) {
        if self.inner.sessions.lock().remove(id).is_some() {
            info!(session = %id, "session removed from live set");
        }
    }

    /// Identifiers of all currently live sessions.
    #[must_use]
    pub fn live_sessions(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.sessions.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.inner.sessions.lock().len()
    }
}

impl std::fmt::Debug for TransportManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportManager")
            .field("sessions", &self.session_count())
            .finish()
    }
}
