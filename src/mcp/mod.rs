//! Model Context Protocol (MCP) server implementation.
//!
//! This module exposes the Figma command catalog as MCP tools. The server
//! communicates over stdio transport using JSON-RPC 2.0 messages.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         MCP Server                          │
//! │                                                             │
//! │   ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │   │  Transport  │───▶│   Server    │───▶│   Catalog   │──▶ relay
//! │   │   (stdio)   │    │ (lifecycle) │    │  (commands) │     │
//! │   └─────────────┘    └─────────────┘    └─────────────┘     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallResult, ToolDefinition,
    MCP_PROTOCOL_VERSION,
};
pub use server::{McpServer, ServerState};
pub use transport::{MessageReader, MessageWriter};
