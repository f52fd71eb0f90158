//! Error types for the plugin relay.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Errors that can occur while relaying a command to the Figma plugin.
///
/// Every variant except [`RelayError::Bind`] is terminal for a single request
/// and is reported back to the caller as a failed tool result.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No plugin connection is active.
    #[error("Not connected to Figma plugin. Please open the plugin in Figma.")]
    NotConnected,

    /// The plugin did not answer before the request deadline.
    #[error("Request timeout")]
    Timeout,

    /// The plugin connection closed while the request was in flight.
    #[error("Figma plugin disconnected")]
    Disconnected,

    /// The plugin answered with an explicit error.
    #[error("{message}")]
    Remote {
        /// Message reported by the plugin, passed through verbatim.
        message: String,
    },

    /// An outbound envelope could not be serialised.
    #[error("failed to encode envelope")]
    Encode(#[source] serde_json::Error),

    /// The WebSocket listener could not be bound.
    #[error("failed to bind WebSocket listener on {addr}")]
    Bind {
        /// Address the listener tried to bind.
        addr: SocketAddr,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl RelayError {
    /// Returns `true` if binding failed because another process holds the port.
    #[must_use]
    pub fn is_address_in_use(&self) -> bool {
        matches!(self, Self::Bind { source, .. } if source.kind() == io::ErrorKind::AddrInUse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_passes_message_through() {
        let error = RelayError::Remote {
            message: "Node not found: 1:2".to_string(),
        };
        assert_eq!(error.to_string(), "Node not found: 1:2");
    }

    #[test]
    fn not_connected_mentions_plugin() {
        let msg = RelayError::NotConnected.to_string();
        assert!(msg.contains("Not connected"));
        assert!(msg.contains("plugin"));
    }

    #[test]
    fn address_in_use_detection() {
        let error = RelayError::Bind {
            addr: SocketAddr::from(([127, 0, 0, 1], 3055)),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert!(error.is_address_in_use());
        assert!(error.to_string().contains("127.0.0.1:3055"));
        assert!(!RelayError::Timeout.is_address_in_use());
    }
}
