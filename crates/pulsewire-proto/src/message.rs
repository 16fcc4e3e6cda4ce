//! Chat message payload carried by `new_message` frames.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ChannelId, UserId};

/// A persisted chat message joined with its sender's profile.
///
/// Fields the hub sends beyond the modelled ones are preserved in `extra`
/// so the UI can read them without a protocol change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageWithSender {
    /// Message identifier
    pub id: String,
    /// Channel the message was posted to
    pub channel_id: ChannelId,
    /// Author
    pub sender_id: UserId,
    /// Message body
    pub content: String,
    /// Server timestamp, passed through as sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Author profile, when the hub joins it in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Sender>,
    /// Unmodelled fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Profile of a message author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sender {
    /// User identifier
    pub id: UserId,
    /// Given name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Contact email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

impl Sender {
    /// Human-readable name: full name, then email, then the raw id.
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => self.email.clone().unwrap_or_else(|| self.id.clone()),
        }
    }
}

impl MessageWithSender {
    /// Display name of the author, falling back to `sender_id`.
    pub fn author(&self) -> String {
        self.sender.as_ref().map_or_else(|| self.sender_id.clone(), Sender::display_name)
    }
}
