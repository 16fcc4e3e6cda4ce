//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Text was not valid JSON.
    #[error("malformed JSON: {0}")]
    Json(String),

    /// JSON was valid but carried no `type`, or one this crate does not know.
    #[error("unrecognized frame type: {}", .0.as_deref().unwrap_or("<missing>"))]
    UnknownType(Option<String>),

    /// Known `type` with missing or mistyped fields.
    #[error("invalid {kind} frame: {reason}")]
    InvalidFrame {
        /// The frame's `type` field
        kind: String,
        /// Why the fields did not match
        reason: String,
    },

    /// Serialization failed.
    #[error("failed to encode frame: {0}")]
    Encode(String),
}

impl ProtocolError {
    /// Returns true if the frame was well-formed but of a type we ignore.
    ///
    /// Unrecognized frames are expected from newer hubs and are dropped
    /// quietly; everything else indicates a broken peer.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Self::UnknownType(_))
    }
}
