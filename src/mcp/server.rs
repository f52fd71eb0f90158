//! MCP server exposing the Figma command catalog.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: Capability negotiation and version agreement
//! 2. **Operation**: Handling tool calls and other requests
//! 3. **Shutdown**: stdin EOF or a termination signal. Tool calls still in
//!    flight get [`SHUTDOWN_GRACE`] to write their responses.
//!
//! `tools/call` requests are answered from their own task, so a slow plugin
//! round trip never blocks `ping` or other tool calls. Responses may therefore
//! arrive out of order; clients match them by `id`.

use std::io;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, BufReader, Stdin};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::catalog::Catalog;
use crate::mcp::protocol::{
    parse_message, IncomingMessage, JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId, ToolCallParams,
    MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::mcp::transport::{MessageReader, MessageWriter};

/// How long in-flight tool calls may keep running once input has ended.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolCapabilities>,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            tools: Some(ToolCapabilities::default()),
        }
    }
}

/// Tool-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change during the session.
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    pub protocol_version: String,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: Value,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// The MCP server.
#[derive(Debug)]
pub struct McpServer<R> {
    /// Current server state.
    state: ServerState,
    reader: MessageReader<R>,
    writer: MessageWriter,
    catalog: Catalog,
    /// Tool calls that have not written their response yet.
    in_flight: JoinSet<()>,
    /// Negotiated protocol version (set after initialisation).
    protocol_version: Option<String>,
}

impl McpServer<BufReader<Stdin>> {
    /// Creates a server speaking MCP over stdin/stdout.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self::with_transport(MessageReader::stdin(), MessageWriter::stdout(), catalog)
    }
}

impl<R: AsyncBufRead + Unpin> McpServer<R> {
    /// Creates a server over an arbitrary transport.
    #[must_use]
    pub fn with_transport(
        reader: MessageReader<R>,
        writer: MessageWriter,
        catalog: Catalog,
    ) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            reader,
            writer,
            catalog,
            in_flight: JoinSet::new(),
            protocol_version: None,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the negotiated protocol version, once initialised.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Runs the server until EOF or SIGINT/SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    #[cfg(unix)]
    pub async fn run(&mut self) -> io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        let received = tokio::select! {
            result = self.serve() => return result,
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        };

        info!("Received {received}, initiating graceful shutdown");
        self.state = ServerState::ShuttingDown;
        self.drain_in_flight().await;
        Ok(())
    }

    /// Runs the server until EOF or Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    #[cfg(windows)]
    pub async fn run(&mut self) -> io::Result<()> {
        tokio::select! {
            result = self.serve() => return result,
            _ = tokio::signal::ctrl_c() => {}
        }

        info!("Received Ctrl+C, initiating graceful shutdown");
        self.state = ServerState::ShuttingDown;
        self.drain_in_flight().await;
        Ok(())
    }

    /// Handles messages until the input reaches EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn serve(&mut self) -> io::Result<()> {
        while let Some(line) = self.reader.read_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            self.handle_line(&line).await?;
            while self.in_flight.try_join_next().is_some() {}
        }

        debug!("Input closed, shutting down");
        self.state = ServerState::ShuttingDown;
        self.drain_in_flight().await;
        Ok(())
    }

    /// Waits up to [`SHUTDOWN_GRACE`] for in-flight tool calls, then aborts
    /// the rest.
    async fn drain_in_flight(&mut self) {
        if self.in_flight.is_empty() {
            return;
        }

        debug!(in_flight = self.in_flight.len(), "Waiting for in-flight tool calls");
        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while self.in_flight.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(
                abandoned = self.in_flight.len(),
                "Tool calls still running at shutdown were abandoned"
            );
            self.in_flight.shutdown().await;
        }
    }

    /// Handles a single line of input.
    async fn handle_line(&mut self, line: &str) -> io::Result<()> {
        match parse_message(line) {
            Ok(msg) => self.handle_message(msg).await,
            Err(error) => self.writer.write_error(&error).await,
        }
    }

    /// Handles a parsed incoming message.
    async fn handle_message(&mut self, msg: IncomingMessage) -> io::Result<()> {
        match msg {
            IncomingMessage::Request(req) => self.handle_request(req).await,
            IncomingMessage::Notification(ref notif) => {
                self.handle_notification(notif);
                Ok(())
            }
        }
    }

    /// Handles an incoming request.
    async fn handle_request(&mut self, req: JsonRpcRequest) -> io::Result<()> {
        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "tools/list" => self.handle_tools_list(&req),
            "tools/call" => match self.parse_tools_call(&req) {
                Ok(params) => {
                    self.spawn_tools_call(req.id, params);
                    return Ok(());
                }
                Err(error) => Err(error),
            },
            "ping" => Ok(Self::handle_ping(&req)),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        match response {
            Ok(resp) => self.writer.write_response(&resp).await,
            Err(error) => self.writer.write_error(&error).await,
        }
    }

    /// Handles an incoming notification.
    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        if notif.method == "notifications/initialized" && self.state == ServerState::Initialising {
            self.state = ServerState::Running;
            info!("MCP client initialised");
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::invalid_request(
                Some(req.id.clone()),
                "Server already initialised",
            ));
        }

        let params: InitializeParams = req
            .params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| {
                JsonRpcError::invalid_params(
                    req.id.clone(),
                    format!("Invalid initialize params: {e}"),
                )
            })?
            .ok_or_else(|| {
                JsonRpcError::invalid_params(req.id.clone(), "Missing initialize params")
            })?;

        debug!(
            requested = %params.protocol_version,
            client = ?params.client_info.as_ref().map(|c| c.name.as_str()),
            "Initialize request"
        );

        let negotiated_version = MCP_PROTOCOL_VERSION.to_string();

        self.protocol_version = Some(negotiated_version.clone());
        self.state = ServerState::Initialising;

        let result = json!({
            "protocolVersion": negotiated_version,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let result = json!({
            "tools": Catalog::list_commands(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Validates a tools/call request before it is spawned.
    fn parse_tools_call(&self, req: &JsonRpcRequest) -> Result<ToolCallParams, JsonRpcError> {
        self.require_running(&req.id)?;

        req.params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| {
                JsonRpcError::invalid_params(
                    req.id.clone(),
                    format!("Invalid tool call params: {e}"),
                )
            })?
            .ok_or_else(|| JsonRpcError::invalid_params(req.id.clone(), "Missing tool call params"))
    }

    /// Runs a tool call in its own task and writes the response when done.
    fn spawn_tools_call(&mut self, id: RequestId, params: ToolCallParams) {
        let catalog = self.catalog.clone();
        let writer = self.writer.clone();

        self.in_flight.spawn(async move {
            let result = catalog.invoke(&params.name, &params.arguments).await;

            let written = match serde_json::to_value(&result) {
                Ok(value) => {
                    writer
                        .write_response(&JsonRpcResponse::success(id, value))
                        .await
                }
                Err(e) => {
                    error!(error = %e, "Failed to serialise tool call result");
                    writer
                        .write_error(&JsonRpcError::internal_error(
                            id,
                            "Internal error: failed to serialise result",
                        ))
                        .await
                }
            };

            if let Err(e) = written {
                warn!(tool = %params.name, error = %e, "Failed to write tool call response");
            }
        });
    }

    /// Handles the ping request.
    fn handle_ping(req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(req.id.clone(), json!({}))
    }

    /// Ensures the server is in the Running state.
    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state != ServerState::Running {
            return Err(JsonRpcError::invalid_request(
                Some(id.clone()),
                "Server not initialised",
            ));
        }
        Ok(())
    }
}
