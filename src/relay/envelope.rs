//! Wire envelopes exchanged with the Figma plugin.
//!
//! Every frame on the plugin WebSocket is a single JSON object:
//!
//! - **Outbound** (server to plugin): `{ "requestId", "type", "data" }`
//! - **Inbound success**: `{ "requestId", "type", "data" }`
//! - **Inbound failure**: `{ "requestId", "error": { "message" } }`
//!
//! The `requestId` is the only correlation key; the inbound `type` is
//! informational (e.g. `rectangle-created`) and never inspected by the relay.

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::relay::error::{RelayError, RelayResult};

/// Message used when the plugin reports a failure without a description.
const DEFAULT_REMOTE_ERROR: &str = "Figma operation failed";

/// Correlation token pairing a request with its response.
///
/// Opaque to the plugin, which must echo it back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Creates a request ID from an arbitrary token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Creates the request ID for the `n`th request of a session.
    #[must_use]
    pub fn from_sequence(n: u64) -> Self {
        Self(format!("req_{n}"))
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A command sent to the plugin.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEnvelope {
    /// Correlation token for the response.
    pub request_id: RequestId,
    /// Wire command type, e.g. `create-rectangle`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Command payload.
    pub data: Value,
}

impl OutboundEnvelope {
    /// Serialises the envelope to a single-line JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Encode`] if the payload cannot be serialised.
    pub fn encode(&self) -> RelayResult<String> {
        serde_json::to_string(self).map_err(RelayError::Encode)
    }
}

/// A response received from the plugin.
///
/// All fields are optional on the wire; envelopes without a `requestId` are
/// ignored by the session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEnvelope {
    /// Correlation token echoed by the plugin.
    #[serde(default)]
    pub request_id: Option<RequestId>,
    /// Response type reported by the plugin.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Success payload.
    #[serde(default)]
    pub data: Option<Value>,
    /// Failure description.
    #[serde(default)]
    pub error: Option<Value>,
}

impl InboundEnvelope {
    /// Converts the envelope into the outcome delivered to the waiting caller.
    ///
    /// A non-null `error` always wins over `data`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Remote`] if the plugin reported a failure.
    pub fn into_outcome(self) -> RelayResult<Value> {
        match self.error {
            Some(error) if !error.is_null() => Err(RelayError::Remote {
                message: remote_message(&error),
            }),
            _ => Ok(self.data.unwrap_or(Value::Null)),
        }
    }
}

/// Extracts a human-readable message from a plugin error value.
fn remote_message(error: &Value) -> String {
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .filter(|message| !message.is_empty())
        .unwrap_or(DEFAULT_REMOTE_ERROR)
        .to_string()
}

/// Parses a text frame into an inbound envelope.
///
/// # Errors
///
/// Returns an error if the text is not a JSON object with the expected field
/// types.
pub fn parse_envelope(text: &str) -> Result<InboundEnvelope, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(serde_json::Error::custom("envelope must be a JSON object"));
    }
    serde_json::from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sequence_ids() {
        assert_eq!(RequestId::from_sequence(1).as_str(), "req_1");
        assert_eq!(RequestId::from_sequence(42).to_string(), "req_42");
    }

    #[test]
    fn encode_outbound() {
        let envelope = OutboundEnvelope {
            request_id: RequestId::from_sequence(1),
            kind: "create-rectangle".to_string(),
            data: json!({"width": 100, "height": 50}),
        };
        let encoded: Value = serde_json::from_str(&envelope.encode().unwrap()).unwrap();
        assert_eq!(
            encoded,
            json!({
                "requestId": "req_1",
                "type": "create-rectangle",
                "data": {"width": 100, "height": 50}
            })
        );
    }

    #[test]
    fn parse_success() {
        let envelope = parse_envelope(
            r#"{"requestId":"req_1","type":"rectangle-created","data":{"id":"123:45"}}"#,
        )
        .unwrap();
        assert_eq!(envelope.request_id, Some(RequestId::new("req_1")));
        assert_eq!(envelope.kind.as_deref(), Some("rectangle-created"));
        assert_eq!(envelope.into_outcome().unwrap(), json!({"id": "123:45"}));
    }

    #[test]
    fn parse_failure_with_message() {
        let envelope =
            parse_envelope(r#"{"requestId":"req_2","error":{"message":"Node not found"}}"#)
                .unwrap();
        let err = envelope.into_outcome().unwrap_err();
        assert!(matches!(err, RelayError::Remote { ref message } if message == "Node not found"));
    }

    #[test]
    fn failure_without_message_uses_default() {
        let envelope = parse_envelope(r#"{"requestId":"req_3","error":{}}"#).unwrap();
        let err = envelope.into_outcome().unwrap_err();
        assert_eq!(err.to_string(), DEFAULT_REMOTE_ERROR);
    }

    #[test]
    fn bare_string_error() {
        let envelope = parse_envelope(r#"{"requestId":"req_4","error":"boom"}"#).unwrap();
        assert_eq!(envelope.into_outcome().unwrap_err().to_string(), "boom");
    }

    #[test]
    fn null_error_is_success() {
        let envelope =
            parse_envelope(r#"{"requestId":"req_5","type":"pong","error":null}"#).unwrap();
        assert_eq!(envelope.into_outcome().unwrap(), Value::Null);
    }

    #[test]
    fn missing_request_id() {
        let envelope = parse_envelope(r#"{"type":"status","data":{}}"#).unwrap();
        assert!(envelope.request_id.is_none());
    }

    #[test]
    fn reject_non_object() {
        assert!(parse_envelope("[1, 2, 3]").is_err());
        assert!(parse_envelope("not json").is_err());
    }
}
