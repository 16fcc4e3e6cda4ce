//! Frames sent from the client to the hub.

use serde::{Deserialize, Serialize};

use crate::{
    ChannelId, UserId,
    errors::{ProtocolError, Result},
};

/// Outbound frames.
///
/// Serialized as `{"type": "<snake_case variant>", ...camelCase fields}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientFrame {
    /// Identify the connection. Sent once, right after the socket opens.
    Auth {
        /// Caller's user identity
        user_id: UserId,
    },
    /// Start receiving events scoped to a channel.
    Join {
        /// Channel to join
        channel_id: ChannelId,
    },
    /// Stop receiving events for a channel.
    Leave {
        /// Channel to leave
        channel_id: ChannelId,
    },
    /// Submit a chat message for persistence and broadcast.
    Message {
        /// Target channel
        channel_id: ChannelId,
        /// Message body
        content: String,
    },
    /// Transient typing activity.
    Typing {
        /// Channel being typed in
        channel_id: ChannelId,
    },
}

impl ClientFrame {
    /// Wire `type` string of this frame.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth",
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
            Self::Message { .. } => "message",
            Self::Typing { .. } => "typing",
        }
    }

    /// Channel this frame is scoped to. `None` for `auth`.
    pub fn channel_id(&self) -> Option<&str> {
        match self {
            Self::Auth { .. } => None,
            Self::Join { channel_id }
            | Self::Leave { channel_id }
            | Self::Message { channel_id, .. }
            | Self::Typing { channel_id } => Some(channel_id),
        }
    }

    /// Serialize to a single JSON text frame.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    /// Parse a frame the client would send. Used by hubs and test harnesses.
    pub fn decode(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Json(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_uses_camel_case_user_id() {
        let frame = ClientFrame::Auth { user_id: "u-17".into() };
        insta::assert_snapshot!(frame.encode().unwrap(), @r#"{"type":"auth","userId":"u-17"}"#);
    }

    #[test]
    fn message_carries_channel_and_content() {
        let frame = ClientFrame::Message { channel_id: "ops".into(), content: "on my way".into() };
        insta::assert_snapshot!(
            frame.encode().unwrap(),
            @r#"{"type":"message","channelId":"ops","content":"on my way"}"#
        );
    }

    #[test]
    fn join_leave_typing_shapes() {
        insta::assert_snapshot!(
            ClientFrame::Join { channel_id: "c1".into() }.encode().unwrap(),
            @r#"{"type":"join","channelId":"c1"}"#
        );
        insta::assert_snapshot!(
            ClientFrame::Leave { channel_id: "c1".into() }.encode().unwrap(),
            @r#"{"type":"leave","channelId":"c1"}"#
        );
        insta::assert_snapshot!(
            ClientFrame::Typing { channel_id: "c1".into() }.encode().unwrap(),
            @r#"{"type":"typing","channelId":"c1"}"#
        );
    }

    #[test]
    fn kind_matches_wire_tag() {
        let frames = [
            ClientFrame::Auth { user_id: "u".into() },
            ClientFrame::Join { channel_id: "c".into() },
            ClientFrame::Leave { channel_id: "c".into() },
            ClientFrame::Message { channel_id: "c".into(), content: String::new() },
            ClientFrame::Typing { channel_id: "c".into() },
        ];

        for frame in frames {
            let value: serde_json::Value = serde_json::from_str(&frame.encode().unwrap()).unwrap();
            assert_eq!(value["type"], frame.kind());
        }
    }

    #[test]
    fn channel_id_accessor() {
        assert_eq!(ClientFrame::Auth { user_id: "u".into() }.channel_id(), None);
        assert_eq!(ClientFrame::Typing { channel_id: "c9".into() }.channel_id(), Some("c9"));
    }
}
