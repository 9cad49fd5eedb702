//! WebSocket message types: envelope, commands, and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// A server-originated event with a fresh id.
    #[must_use]
    pub fn event(payload: serde_json::Value) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), WsMessageType::Event, payload)
    }

    /// A response to the command with id `id`.
    #[must_use]
    pub fn response(id: String, payload: serde_json::Value) -> Self {
        Self::new(id, WsMessageType::Response, payload)
    }

    /// An error reply to the command with id `id`.
    #[must_use]
    pub fn error(id: String, code: u32, message: &str) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
    }

    fn new(id: String, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send over WebSocket, carried in the
/// envelope payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to event topics (`state`, `draw`, or `*` for both).
    Subscribe {
        /// Topic names.
        topics: Vec<String>,
    },
    /// Unsubscribe from event topics.
    Unsubscribe {
        /// Topic names.
        topics: Vec<String>,
    },
    /// Get the full current state.
    GetState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_from_payload() {
        let sub: Result<WsCommand, _> =
            serde_json::from_value(serde_json::json!({"command": "subscribe", "topics": ["draw"]}));
        assert!(matches!(sub, Ok(WsCommand::Subscribe { ref topics }) if topics == &["draw"]));

        let get: Result<WsCommand, _> =
            serde_json::from_value(serde_json::json!({"command": "get_state"}));
        assert!(matches!(get, Ok(WsCommand::GetState)));

        let unknown: Result<WsCommand, _> =
            serde_json::from_value(serde_json::json!({"command": "swap"}));
        assert!(unknown.is_err());
    }

    #[test]
    fn error_envelope_shape() {
        let msg = WsMessage::error("7".to_string(), 404, "unknown command");
        let json = serde_json::to_value(&msg).unwrap_or_default();
        assert_eq!(json["type"], "error");
        assert_eq!(json["payload"]["code"], 404);
    }
}
