//! Wire frames and inbound control messages

use std::sync::Arc;

use serde::Deserialize;

use crate::error::{BroadcastError, Result};

/// Frame written to a subscriber
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Serialized `{type, data}` envelope
    Text(Arc<str>),
    /// Keepalive ping
    Ping,
}

/// Frame read from a subscriber
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Text(String),
    Ping,
    Pong,
    Binary,
    Close,
}

/// Control message sent by a subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Add event types to the subscriber's filter
    Subscribe(Vec<String>),
    Unsubscribe(Vec<String>),
    Ping,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl ClientMessage {
    /// Parse `{"type": ..., "data": ...}`
    ///
    /// Topic lists may be an array of strings or a single string.
    pub fn parse(text: &str) -> Result<Self> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(|e| BroadcastError::Malformed(e.to_string()))?;

        match envelope.kind.as_str() {
            "subscribe" => Ok(ClientMessage::Subscribe(topics(envelope.data)?)),
            "unsubscribe" => Ok(ClientMessage::Unsubscribe(topics(envelope.data)?)),
            "ping" => Ok(ClientMessage::Ping),
            other => Err(BroadcastError::Malformed(format!("unknown type '{}'", other))),
        }
    }
}

fn topics(data: serde_json::Value) -> Result<Vec<String>> {
    match data {
        serde_json::Value::String(topic) => Ok(vec![topic]),
        serde_json::Value::Null => Ok(Vec::new()),
        other => serde_json::from_value(other).map_err(|e| BroadcastError::Malformed(e.to_string())),
    }
}
