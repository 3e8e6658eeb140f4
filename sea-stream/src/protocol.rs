//! Phoenix channel wire envelope.
//!
//! Every frame on the socket, in either direction, is a JSON object of the
//! shape `{topic, event, ref, payload}`. Outbound control frames are built with
//! [`ControlFrame`]; inbound frames decode into [`Message`], which keeps the
//! payload as the exact bytes the server sent.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use sea_core::error::SeaResult;

/// Prefix of every collection topic.
pub const COLLECTION_TOPIC_PREFIX: &str = "collection:";

/// Topic used for socket-level heartbeats.
pub const PHOENIX_TOPIC: &str = "phoenix";

/// Control event names.
pub mod control {
    /// Join a channel.
    pub const JOIN: &str = "phx_join";
    /// Leave a channel.
    pub const LEAVE: &str = "phx_leave";
    /// Socket liveness frame.
    pub const HEARTBEAT: &str = "heartbeat";
    /// Server reply to a control frame.
    pub const REPLY: &str = "phx_reply";
    /// Server closed a channel.
    pub const CLOSE: &str = "phx_close";
}

/// Reply status reported for a successful control frame.
pub const STATUS_OK: &str = "ok";

/// Qualified topic name for a collection slug.
pub fn collection_topic(slug: &str) -> String {
    format!("{COLLECTION_TOPIC_PREFIX}{slug}")
}

/// Inverse of [`collection_topic`].
pub fn collection_slug(topic: &str) -> Option<&str> {
    topic.strip_prefix(COLLECTION_TOPIC_PREFIX)
}

/// An inbound frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Topic the frame is addressed to, e.g. `collection:azuki`. Empty when
    /// the server left it out.
    #[serde(default)]
    pub topic: String,
    /// Control or business event name.
    pub event: String,
    /// Correlation token. Echoes the ref of the outbound frame it answers.
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    /// Undecoded payload, byte-for-byte as received.
    #[serde(default)]
    pub payload: Option<Box<RawValue>>,
}

impl Message {
    /// Decode a raw text frame.
    pub fn from_json(text: &str) -> SeaResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Raw payload text; `null` when the frame carried none.
    pub fn payload_str(&self) -> &str {
        self.payload.as_deref().map(RawValue::get).unwrap_or("null")
    }

    /// Correlation ref, or the empty string.
    pub fn reference(&self) -> &str {
        self.reference.as_deref().unwrap_or_default()
    }

    /// Decode the payload into a caller-chosen type.
    pub fn decode<T: DeserializeOwned>(&self) -> SeaResult<T> {
        Ok(serde_json::from_str(self.payload_str())?)
    }

    /// Interpret the payload as a control reply.
    ///
    /// Payloads that do not look like a reply decode to a reply with no status.
    pub fn reply(&self) -> PhxReply {
        self.decode().unwrap_or_default()
    }
}

/// Payload of a `phx_reply` frame.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhxReply {
    /// `ok` on success, `error` otherwise.
    #[serde(default)]
    pub status: Option<String>,
    /// Server response body.
    #[serde(default)]
    pub response: serde_json::Value,
}

impl PhxReply {
    /// Whether the server accepted the frame being answered.
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some(STATUS_OK)
    }
}

/// An outbound control frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlFrame {
    pub topic: String,
    pub event: &'static str,
    #[serde(rename = "ref")]
    pub reference: String,
    pub payload: serde_json::Value,
}

impl ControlFrame {
    fn new(topic: String, event: &'static str, reference: &str) -> Self {
        Self {
            topic,
            event,
            reference: reference.to_string(),
            payload: serde_json::json!({}),
        }
    }

    /// Join the channel of a collection.
    pub fn join(slug: &str) -> Self {
        Self::new(collection_topic(slug), control::JOIN, slug)
    }

    /// Leave the channel of a collection.
    pub fn leave(slug: &str) -> Self {
        Self::new(collection_topic(slug), control::LEAVE, slug)
    }

    /// Heartbeat sent on behalf of a collection.
    pub fn heartbeat(slug: &str) -> Self {
        Self::new(PHOENIX_TOPIC.to_string(), control::HEARTBEAT, slug)
    }

    /// Serialize into a text frame.
    pub fn to_json(&self) -> SeaResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
