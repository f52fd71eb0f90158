//! The relay session: active plugin connection plus correlation table.
//!
//! A single [`RelaySession`] is created at startup and shared (via `Arc`)
//! between the WebSocket listener, which feeds it connection events and
//! inbound frames, and the command catalog, which dispatches through it.
//!
//! The session never touches a socket directly. A connection is represented by
//! the sending half of an unbounded channel of [`OutboundFrame`]s; whoever
//! owns the receiving half writes those frames to the wire. This keeps every
//! state transition testable without a network.
//!
//! # Locking
//!
//! The active connection and the correlation table each sit behind their own
//! mutex. Locks are never held across an `.await`, and when both are needed
//! the connection is locked first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::relay::envelope::{parse_envelope, InboundEnvelope, OutboundEnvelope, RequestId};
use crate::relay::error::{RelayError, RelayResult};
use crate::relay::pending::{CorrelationTable, PendingHandle};

/// Identifies one accepted plugin connection for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A frame queued for delivery to the plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// A serialised envelope.
    Text(String),
    /// Close the connection; it has been superseded.
    Close,
}

/// Sender half of a connection's outbound queue.
pub type FrameSender = mpsc::UnboundedSender<OutboundFrame>;

/// The currently trusted plugin connection.
#[derive(Debug)]
struct ActiveConnection {
    id: ConnectionId,
    outbound: FrameSender,
}

impl ActiveConnection {
    /// A connection is open while its writer still drains the queue.
    fn is_open(&self) -> bool {
        !self.outbound.is_closed()
    }
}

/// Process-wide relay state.
#[derive(Debug)]
pub struct RelaySession {
    active: Mutex<Option<ActiveConnection>>,
    pending: CorrelationTable,
    next_request: AtomicU64,
    next_connection: AtomicU64,
}

impl RelaySession {
    /// Creates a session with no connection and the given request timeout.
    #[must_use]
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            active: Mutex::new(None),
            pending: CorrelationTable::new(request_timeout),
            next_request: AtomicU64::new(0),
            next_connection: AtomicU64::new(0),
        }
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveConnection>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the correlation table.
    #[must_use]
    pub const fn pending(&self) -> &CorrelationTable {
        &self.pending
    }

    /// Returns `true` if an open plugin connection is active.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.lock_active()
            .as_ref()
            .is_some_and(ActiveConnection::is_open)
    }

    /// Returns the ID of the active connection, if any.
    #[must_use]
    pub fn active_connection(&self) -> Option<ConnectionId> {
        self.lock_active().as_ref().map(|connection| connection.id)
    }

    // -------------------------------------------------------------------------
    // Connection events
    // -------------------------------------------------------------------------

    /// Installs a new connection as the active one.
    ///
    /// A previous connection that is still open is told to close. Requests
    /// already sent over it are left to their deadlines.
    pub fn attach(&self, outbound: FrameSender) -> ConnectionId {
        let id = ConnectionId(self.next_connection.fetch_add(1, Ordering::Relaxed) + 1);
        let previous = self
            .lock_active()
            .replace(ActiveConnection { id, outbound });

        if let Some(previous) = previous.filter(ActiveConnection::is_open) {
            info!(previous = %previous.id, connection = %id, "Replacing previous plugin connection");
            // The writer may already be gone; either way the old connection is dead to us.
            let _ = previous.outbound.send(OutboundFrame::Close);
        }

        info!(connection = %id, "Figma plugin connected");
        id
    }

    /// Handles the close event of connection `id`.
    ///
    /// Only the active connection is cleared; a stale close event from a
    /// superseded connection is ignored. Closing the active connection fails
    /// every pending request with [`RelayError::Disconnected`].
    ///
    /// Returns `true` if `id` was the active connection.
    pub fn detach(&self, id: ConnectionId) -> bool {
        let mut active = self.lock_active();
        if active.as_ref().map(|connection| connection.id) != Some(id) {
            debug!(connection = %id, "Ignoring close of superseded connection");
            return false;
        }
        *active = None;

        // Drained under the connection lock so a newer connection cannot
        // register requests that this close would then fail.
        let failed = self.pending.fail_all(|| RelayError::Disconnected);
        drop(active);

        info!(connection = %id, failed, "Figma plugin disconnected");
        true
    }

    // -------------------------------------------------------------------------
    // Inbound messages
    // -------------------------------------------------------------------------

    /// Handles a raw text frame from the plugin.
    ///
    /// Malformed frames are logged and dropped. Returns `true` if the frame
    /// settled a pending request.
    pub fn on_message(&self, text: &str) -> bool {
        match parse_envelope(text) {
            Ok(envelope) => self.on_envelope(envelope),
            Err(e) => {
                warn!(error = %e, "Failed to parse plugin message");
                false
            }
        }
    }

    /// Routes a parsed envelope to the request it answers.
    ///
    /// Envelopes without a `requestId`, or whose request is no longer pending,
    /// are ignored. Returns `true` if a pending request was settled.
    pub fn on_envelope(&self, envelope: InboundEnvelope) -> bool {
        let Some(request_id) = envelope.request_id.clone() else {
            debug!(kind = ?envelope.kind, "Ignoring plugin message without requestId");
            return false;
        };
        let kind = envelope.kind.clone();

        let settled = match envelope.into_outcome() {
            Ok(data) => self.pending.resolve(&request_id, data),
            Err(e) => self.pending.fail(&request_id, e),
        };

        if settled {
            debug!(request_id = %request_id, kind = ?kind, "Plugin response delivered");
        } else {
            debug!(request_id = %request_id, kind = ?kind, "Ignoring response for unknown or expired request");
        }
        settled
    }

    // -------------------------------------------------------------------------
    // Command dispatch
    // -------------------------------------------------------------------------

    /// Sends a command to the plugin and waits for its outcome.
    ///
    /// # Errors
    ///
    /// - [`RelayError::NotConnected`] if no plugin is connected
    /// - [`RelayError::Timeout`] if the plugin does not answer in time
    /// - [`RelayError::Disconnected`] if the plugin disconnects first
    /// - [`RelayError::Remote`] if the plugin reports a failure
    pub async fn send(&self, kind: &str, data: Value) -> RelayResult<Value> {
        let handle = self.dispatch(kind, data)?;
        handle.wait().await
    }

    /// Registers and enqueues a command without waiting for the outcome.
    ///
    /// The connection check, registration and enqueue happen under the
    /// connection lock, so a concurrent disconnect either sees the request in
    /// the table or the request sees no connection.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::NotConnected`] without creating a pending request
    /// if no open connection is active, or [`RelayError::Encode`] if the
    /// payload cannot be serialised.
    pub fn dispatch(&self, kind: &str, data: Value) -> RelayResult<PendingHandle> {
        let active = self.lock_active();
        let Some(connection) = active.as_ref().filter(|c| c.is_open()) else {
            return Err(RelayError::NotConnected);
        };

        let request_id =
            RequestId::from_sequence(self.next_request.fetch_add(1, Ordering::Relaxed) + 1);
        let frame = OutboundEnvelope {
            request_id: request_id.clone(),
            kind: kind.to_string(),
            data,
        }
        .encode()?;

        let handle = self.pending.register(request_id.clone());
        if connection.outbound.send(OutboundFrame::Text(frame)).is_err() {
            self.pending.fail(&request_id, RelayError::NotConnected);
            return Err(RelayError::NotConnected);
        }

        debug!(
            request_id = %request_id,
            kind,
            connection = %connection.id,
            "Sent command to plugin"
        );
        Ok(handle)
    }
}

impl Default for RelaySession {
    fn default() -> Self {
        Self::new(crate::relay::pending::DEFAULT_REQUEST_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn connect(session: &RelaySession) -> (ConnectionId, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (session.attach(tx), rx)
    }

    #[test]
    fn connection_id_display() {
        assert_eq!(ConnectionId(3).to_string(), "#3");
    }

    #[test]
    fn new_session_is_disconnected() {
        let session = RelaySession::default();
        assert!(!session.is_connected());
        assert_eq!(session.active_connection(), None);
        assert!(session.pending().is_empty());
    }

    #[tokio::test]
    async fn dispatch_writes_envelope() {
        let session = RelaySession::default();
        let (_id, mut rx) = connect(&session);

        let handle = session
            .dispatch("get-node", json!({"id": "1:2"}))
            .unwrap();
        assert_eq!(handle.id().as_str(), "req_1");
        assert!(session.pending().contains(handle.id()));

        let Some(OutboundFrame::Text(text)) = rx.recv().await else {
            panic!("expected a text frame");
        };
        let sent: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            sent,
            json!({"requestId": "req_1", "type": "get-node", "data": {"id": "1:2"}})
        );
    }

    #[tokio::test]
    async fn request_ids_increment() {
        let session = RelaySession::default();
        let (_id, _rx) = connect(&session);

        let first = session.dispatch("ping", json!({})).unwrap();
        let second = session.dispatch("ping", json!({})).unwrap();
        assert_eq!(first.id().as_str(), "req_1");
        assert_eq!(second.id().as_str(), "req_2");
    }

    #[tokio::test]
    async fn closed_writer_counts_as_disconnected() {
        let session = RelaySession::default();
        let (_id, rx) = connect(&session);
        drop(rx);

        assert!(!session.is_connected());
        assert!(matches!(
            session.dispatch("ping", json!({})),
            Err(RelayError::NotConnected)
        ));
        assert!(session.pending().is_empty());
    }

    #[tokio::test]
    async fn replacing_connection_closes_previous() {
        let session = RelaySession::default();
        let (first, mut first_rx) = connect(&session);
        let (second, _second_rx) = connect(&session);

        assert_ne!(first, second);
        assert_eq!(session.active_connection(), Some(second));
        assert_eq!(first_rx.recv().await, Some(OutboundFrame::Close));
    }

    #[tokio::test]
    async fn message_without_request_id_is_ignored() {
        let session = RelaySession::default();
        let (_id, _rx) = connect(&session);
        let _handle = session.dispatch("ping", json!({})).unwrap();

        assert!(!session.on_message(r#"{"type":"pong","data":{}}"#));
        assert!(!session.on_message("garbage"));
        assert_eq!(session.pending().len(), 1);
    }
}
