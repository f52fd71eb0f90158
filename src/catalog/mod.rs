//! The command catalog exposed to MCP clients as tools.
//!
//! [`Catalog`] turns a `tools/call` into a relay command: it looks up the
//! [`Command`], validates and normalises the arguments against its declared
//! [`Shape`](schema::Shape), and sends the result to the plugin under the
//! command's wire type.
//!
//! Every failure becomes a [`ToolCallResult`] with `isError` set; nothing here
//! turns into a JSON-RPC protocol error.

pub mod commands;
pub mod schema;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub use commands::{Command, CommandSpec};

use crate::mcp::protocol::{ToolCallResult, ToolDefinition};
use crate::relay::{RelayError, RelaySession};

/// Errors produced while executing a catalog command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// No command has the requested name.
    #[error("Unknown tool: {name}")]
    UnknownCommand {
        /// The name that was requested.
        name: String,
    },

    /// The arguments do not match the command's input shape.
    #[error("{message}")]
    Validation {
        /// Description of the first mismatch.
        message: String,
    },

    /// The relay to the plugin failed.
    #[error(transparent)]
    Relay(#[from] RelayError),
}

/// Tool catalog backed by a relay session.
#[derive(Debug, Clone)]
pub struct Catalog {
    session: Arc<RelaySession>,
}

impl Catalog {
    /// Creates a catalog that dispatches through `session`.
    #[must_use]
    pub const fn new(session: Arc<RelaySession>) -> Self {
        Self { session }
    }

    /// Returns the relay session.
    #[must_use]
    pub fn session(&self) -> &RelaySession {
        &self.session
    }

    /// Returns the tool definitions for `tools/list`.
    #[must_use]
    pub fn list_commands() -> Vec<ToolDefinition> {
        Command::ALL
            .iter()
            .map(|command| {
                let spec = command.spec();
                ToolDefinition {
                    name: spec.name.to_string(),
                    description: Some(spec.description.to_string()),
                    input_schema: command.input_shape().to_json_schema(),
                }
            })
            .collect()
    }

    /// Runs a command and returns the plugin's result.
    ///
    /// # Errors
    ///
    /// - [`CommandError::UnknownCommand`] if `name` is not in the catalog
    /// - [`CommandError::Validation`] if the arguments are rejected; nothing
    ///   is sent to the plugin in that case
    /// - [`CommandError::Relay`] if the relay fails
    pub async fn execute(&self, name: &str, arguments: &Value) -> Result<Value, CommandError> {
        let command = Command::from_name(name).ok_or_else(|| CommandError::UnknownCommand {
            name: name.to_string(),
        })?;

        let data = command
            .normalize(arguments)
            .map_err(|message| CommandError::Validation { message })?;

        debug!(tool = command.name(), kind = command.wire_type(), "Dispatching tool call");
        Ok(self.session.send(command.wire_type(), data).await?)
    }

    /// Runs a command and wraps the outcome as a tool result.
    ///
    /// Success yields the pretty-printed result; failure yields an error
    /// result with the text `Error: <message>`.
    pub async fn invoke(&self, name: &str, arguments: &Value) -> ToolCallResult {
        match self.execute(name, arguments).await {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => ToolCallResult::text(text),
                Err(e) => ToolCallResult::error(format!("Error: {e}")),
            },
            Err(e) => {
                debug!(tool = name, error = %e, "Tool call failed");
                ToolCallResult::error(format!("Error: {e}"))
            }
        }
    }
}
