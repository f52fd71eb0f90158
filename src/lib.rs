//! figma-bridge-mcp: MCP server that drives Figma through a companion plugin
//!
//! AI assistants speak MCP to this server over stdio. Each tool call is relayed
//! over a local WebSocket to a Figma plugin, which executes it against the
//! open document and sends the result back.
//!
//! # Architecture
//!
//! ```text
//!   MCP client ──stdio──▶ mcp ──▶ catalog ──▶ relay ──WebSocket──▶ Figma plugin
//! ```
//!
//! # Modules
//!
//! - [`catalog`] — Figma commands, their input schemas and dispatch
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Configuration error types
//! - [`mcp`] — MCP protocol implementation
//! - [`relay`] — WebSocket listener and request correlation

pub mod catalog;
pub mod config;
pub mod error;
pub mod mcp;
pub mod relay;
