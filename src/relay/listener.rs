//! WebSocket listener for the Figma plugin.
//!
//! The plugin UI opens a WebSocket to this listener. Each accepted connection
//! gets two halves:
//!
//! - a **writer task** draining the connection's [`OutboundFrame`] queue onto
//!   the socket
//! - a **read loop** handing every text frame to [`RelaySession::on_message`]
//!
//! When either half ends, the connection is detached from the session. Only
//! the most recent connection is ever active; see [`RelaySession::attach`].

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::relay::error::{RelayError, RelayResult};
use crate::relay::session::{OutboundFrame, RelaySession};

/// Accepts plugin connections and feeds them into a [`RelaySession`].
#[derive(Debug)]
pub struct PluginListener {
    listener: TcpListener,
    session: Arc<RelaySession>,
}

impl PluginListener {
    /// Binds the listener.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Bind`] if the address cannot be bound, typically
    /// because another instance already holds the port.
    pub async fn bind(addr: SocketAddr, session: Arc<RelaySession>) -> RelayResult<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| RelayError::Bind { addr, source })?;

        info!(addr = %addr, "WebSocket server listening, waiting for Figma plugin to connect");

        Ok(Self { listener, session })
    }

    /// Returns the address the listener is bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be queried.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until the task is dropped.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    tokio::spawn(serve_connection(stream, peer, Arc::clone(&self.session)));
                }
                Err(e) => {
                    warn!(error = %e, "Failed to accept plugin connection");
                }
            }
        }
    }
}

/// Runs one plugin connection from handshake to close.
async fn serve_connection(stream: TcpStream, peer: SocketAddr, session: Arc<RelaySession>) {
    let socket = match tokio_tungstenite::accept_async(stream).await {
        Ok(socket) => socket,
        Err(e) => {
            warn!(peer = %peer, error = %e, "WebSocket handshake failed");
            return;
        }
    };

    let (mut sink, mut frames) = socket.split();
    let (outbound, mut queue) = mpsc::unbounded_channel();
    let connection = session.attach(outbound);
    debug!(peer = %peer, connection = %connection, "Plugin connection established");

    let mut writer = tokio::spawn(async move {
        while let Some(frame) = queue.recv().await {
            match frame {
                OutboundFrame::Text(text) => {
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        warn!(error = %e, "Failed to write to plugin connection");
                        break;
                    }
                }
                OutboundFrame::Close => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            message = frames.next() => {
                let Some(message) = message else { break };
                if !handle_frame(&session, message) {
                    break;
                }
            }
            _ = &mut writer => break,
        }
    }

    writer.abort();
    session.detach(connection);
}

/// Handles one inbound frame. Returns `false` when the connection is done.
fn handle_frame(
    session: &RelaySession,
    message: Result<Message, tokio_tungstenite::tungstenite::Error>,
) -> bool {
    match message {
        Ok(Message::Text(text)) => {
            session.on_message(text.as_str());
            true
        }
        Ok(Message::Binary(bytes)) => {
            match std::str::from_utf8(&bytes) {
                Ok(text) => {
                    session.on_message(text);
                }
                Err(_) => warn!(len = bytes.len(), "Ignoring non-UTF-8 binary frame"),
            }
            true
        }
        Ok(Message::Close(_)) => false,
        // Ping/pong are answered by tungstenite itself.
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "Plugin connection error");
            false
        }
    }
}
