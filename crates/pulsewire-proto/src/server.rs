//! Frames pushed from the hub to the client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    ChannelId, MessageWithSender, UserId,
    errors::{ProtocolError, Result},
};

/// Inbound frames.
///
/// Decode with [`ServerFrame::decode`], which separates "not JSON",
/// "unknown type" and "known type with bad fields" so callers can log each
/// appropriately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerFrame {
    /// A message was posted to a channel the client has joined.
    NewMessage {
        /// The persisted message
        message: MessageWithSender,
    },
    /// A user is typing in a channel.
    UserTyping {
        /// Channel being typed in
        channel_id: ChannelId,
        /// Who is typing
        user_id: UserId,
    },
    /// A user came online (or joined a channel).
    UserJoined {
        /// Channel scope, if the hub sends one
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel_id: Option<ChannelId>,
        /// Who joined
        user_id: UserId,
    },
    /// A user went offline (or left a channel).
    UserLeft {
        /// Channel scope, if the hub sends one
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel_id: Option<ChannelId>,
        /// Who left
        user_id: UserId,
    },
    /// User-facing notice such as a rate limit or quiet-hours reminder.
    Warning {
        /// Notice text
        message: String,
    },
}

impl ServerFrame {
    /// Every `type` string this crate decodes.
    pub const KINDS: [&'static str; 5] =
        ["new_message", "user_typing", "user_joined", "user_left", "warning"];

    /// Wire `type` string of this frame.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NewMessage { .. } => "new_message",
            Self::UserTyping { .. } => "user_typing",
            Self::UserJoined { .. } => "user_joined",
            Self::UserLeft { .. } => "user_left",
            Self::Warning { .. } => "warning",
        }
    }

    /// Parse one inbound text frame.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::Json` if `text` is not JSON
    /// - `ProtocolError::UnknownType` if `type` is missing, not a string, or
    ///   not one of [`Self::KINDS`]
    /// - `ProtocolError::InvalidFrame` if required fields are missing or
    ///   mistyped
    pub fn decode(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ProtocolError::Json(e.to_string()))?;

        let kind = match value.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            _ => return Err(ProtocolError::UnknownType(None)),
        };

        if !Self::KINDS.contains(&kind.as_str()) {
            return Err(ProtocolError::UnknownType(Some(kind)));
        }

        serde_json::from_value(value)
            .map_err(|e| ProtocolError::InvalidFrame { kind, reason: e.to_string() })
    }

    /// Serialize to a single JSON text frame. Used by hubs and test harnesses.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}
