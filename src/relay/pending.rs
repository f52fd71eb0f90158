//! Correlation table for in-flight plugin requests.
//!
//! Each request sent to the plugin is registered here under its
//! [`RequestId`] before the envelope leaves the process. The caller keeps a
//! [`PendingHandle`] and suspends on it until exactly one of three things
//! happens:
//!
//! 1. The plugin answers (`resolve` / `fail`)
//! 2. The deadline passes (`expire`, driven by a per-request timer)
//! 3. The plugin disconnects (`fail_all`)
//!
//! Whichever happens first removes the entry; the others become no-ops because
//! the entry is gone. Timers are aborted as soon as their entry is removed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::relay::envelope::RequestId;
use crate::relay::error::{RelayError, RelayResult};

/// How long a request may wait for the plugin before it is abandoned.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on the per-request timeout. Longer timeouts are clamped.
pub const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// A request waiting for its response.
struct PendingRequest {
    /// Delivers the outcome to the waiting caller.
    sender: oneshot::Sender<RelayResult<Value>>,
    /// Absolute time after which the request expires.
    deadline: Instant,
    /// Timer task that expires the request at its deadline.
    timer: AbortHandle,
}

type Entries = HashMap<RequestId, PendingRequest>;

fn lock(entries: &Mutex<Entries>) -> MutexGuard<'_, Entries> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Maps request IDs to waiting callers.
///
/// Cloning is cheap and yields a handle to the same table.
#[derive(Clone)]
pub struct CorrelationTable {
    entries: Arc<Mutex<Entries>>,
    timeout: Duration,
}

impl CorrelationTable {
    /// Creates an empty table whose requests expire after `timeout`,
    /// capped at [`MAX_REQUEST_TIMEOUT`].
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        if timeout > MAX_REQUEST_TIMEOUT {
            warn!(
                requested_secs = timeout.as_secs(),
                max_secs = MAX_REQUEST_TIMEOUT.as_secs(),
                "Request timeout clamped"
            );
        }
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            timeout: timeout.min(MAX_REQUEST_TIMEOUT),
        }
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Registers a new pending request and arms its timeout.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use = "the handle is the only way to observe the outcome"]
    pub fn register(&self, id: RequestId) -> PendingHandle {
        let (sender, receiver) = oneshot::channel();
        let now = Instant::now();
        let deadline = now
            .checked_add(self.timeout)
            .or_else(|| now.checked_add(MAX_REQUEST_TIMEOUT))
            .unwrap_or(now);

        let mut entries = lock(&self.entries);
        let timer = tokio::spawn(expire_at(
            Arc::downgrade(&self.entries),
            id.clone(),
            deadline,
        ))
        .abort_handle();

        let replaced = entries.insert(
            id.clone(),
            PendingRequest {
                sender,
                deadline,
                timer,
            },
        );
        if let Some(replaced) = replaced {
            // IDs are never reused within a session; the displaced caller sees
            // a dropped sender and reports a disconnect.
            replaced.timer.abort();
            warn!(request_id = %id, "Replaced pending request with duplicate ID");
        }
        drop(entries);

        debug!(request_id = %id, timeout_ms = self.timeout.as_millis(), "Registered pending request");

        PendingHandle { id, receiver }
    }

    /// Delivers a successful response.
    ///
    /// Returns `false` if the request is no longer pending.
    pub fn resolve(&self, id: &RequestId, value: Value) -> bool {
        self.settle(id, Ok(value))
    }

    /// Delivers a failure.
    ///
    /// Returns `false` if the request is no longer pending.
    pub fn fail(&self, id: &RequestId, reason: RelayError) -> bool {
        self.settle(id, Err(reason))
    }

    /// Expires a request whose deadline has passed.
    ///
    /// Returns `false` if the request was already settled.
    pub fn expire(&self, id: &RequestId) -> bool {
        expire_entry(&self.entries, id)
    }

    /// Fails every pending request and empties the table.
    ///
    /// `reason` is called once per request. Returns the number of requests
    /// failed; calling this on an empty table is a no-op.
    pub fn fail_all(&self, reason: impl Fn() -> RelayError) -> usize {
        let drained: Vec<_> = lock(&self.entries).drain().collect();
        let count = drained.len();

        for (id, request) in drained {
            request.timer.abort();
            deliver(&id, request.sender, Err(reason()));
        }

        if count > 0 {
            debug!(failed = count, "Failed all pending requests");
        }
        count
    }

    /// Returns the number of pending requests.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Returns `true` if no requests are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    /// Returns `true` if `id` is still pending.
    #[must_use]
    pub fn contains(&self, id: &RequestId) -> bool {
        lock(&self.entries).contains_key(id)
    }

    /// Returns the deadline of a pending request.
    #[must_use]
    pub fn deadline(&self, id: &RequestId) -> Option<Instant> {
        lock(&self.entries).get(id).map(|request| request.deadline)
    }

    fn settle(&self, id: &RequestId, outcome: RelayResult<Value>) -> bool {
        let Some(request) = lock(&self.entries).remove(id) else {
            return false;
        };
        request.timer.abort();
        deliver(id, request.sender, outcome);
        true
    }
}

impl Default for CorrelationTable {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

impl std::fmt::Debug for CorrelationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorrelationTable")
            .field("pending", &self.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Sleeps until `deadline`, then expires `id` if the table still exists.
async fn expire_at(entries: Weak<Mutex<Entries>>, id: RequestId, deadline: Instant) {
    tokio::time::sleep_until(deadline).await;
    if let Some(entries) = entries.upgrade() {
        expire_entry(&entries, &id);
    }
}

fn expire_entry(entries: &Mutex<Entries>, id: &RequestId) -> bool {
    let Some(request) = lock(entries).remove(id) else {
        return false;
    };
    request.timer.abort();
    warn!(request_id = %id, "Request timed out waiting for plugin");
    deliver(id, request.sender, Err(RelayError::Timeout));
    true
}

fn deliver(id: &RequestId, sender: oneshot::Sender<RelayResult<Value>>, outcome: RelayResult<Value>) {
    if sender.send(outcome).is_err() {
        debug!(request_id = %id, "Caller stopped waiting before the outcome arrived");
    }
}

/// The caller's view of a pending request.
#[derive(Debug)]
pub struct PendingHandle {
    id: RequestId,
    receiver: oneshot::Receiver<RelayResult<Value>>,
}

impl PendingHandle {
    /// Returns the request ID.
    #[must_use]
    pub const fn id(&self) -> &RequestId {
        &self.id
    }

    /// Waits for the outcome of the request.
    ///
    /// # Errors
    ///
    /// Returns the failure delivered by the table, or
    /// [`RelayError::Disconnected`] if the entry was dropped without one.
    pub async fn wait(self) -> RelayResult<Value> {
        self.receiver
            .await
            .unwrap_or_else(|_| Err(RelayError::Disconnected))
    }
}
