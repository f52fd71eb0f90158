//! Request/response relay between the MCP server and the Figma plugin.
//!
//! The plugin runs inside Figma's sandbox and is the only component with
//! access to the document. This module carries commands to it and matches its
//! asynchronous answers back to the callers waiting for them.
//!
//! # Architecture
//!
//! ```text
//!   Catalog ──send(type, data)──▶ RelaySession ──OutboundFrame──▶ PluginListener ──▶ plugin
//!      ▲                            │      ▲                            │
//!      │                     register│      │on_message                  │
//!      │                            ▼      │                            ▼
//!      └────────outcome─────── CorrelationTable ◀────── text frames ─────┘
//! ```
//!
//! - [`envelope`] — wire format of requests and responses
//! - [`pending`] — correlation table with per-request deadlines
//! - [`session`] — active connection tracking and command dispatch
//! - [`listener`] — WebSocket accept loop

pub mod envelope;
pub mod error;
pub mod listener;
pub mod pending;
pub mod session;

pub use envelope::{InboundEnvelope, OutboundEnvelope, RequestId};
pub use error::{RelayError, RelayResult};
pub use listener::PluginListener;
pub use pending::{CorrelationTable, PendingHandle, DEFAULT_REQUEST_TIMEOUT, MAX_REQUEST_TIMEOUT};
pub use session::{ConnectionId, FrameSender, OutboundFrame, RelaySession};
