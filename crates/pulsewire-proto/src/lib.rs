//! Pulsewire wire protocol.
//!
//! Every frame exchanged with the hub is a single JSON text message whose
//! `type` field discriminates the variant. Outbound frames are
//! [`ClientFrame`]s, inbound frames are [`ServerFrame`]s. Both are closed sum
//! types: a `type` the crate does not know decodes to
//! [`ProtocolError::UnknownType`] rather than to a partially-typed value.
//!
//! # Invariants
//!
//! - Each variant maps to exactly one `type` string (see `kind()`).
//! - Unknown fields on any frame are ignored, so the hub can add fields
//!   without breaking older clients.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod client;
pub mod errors;
pub mod message;
pub mod server;

pub use client::ClientFrame;
pub use errors::{ProtocolError, Result};
pub use message::{MessageWithSender, Sender};
pub use server::ServerFrame;

/// Identifier of a logical channel (a chat room, a dashboard feed).
pub type ChannelId = String;

/// Identifier of a user as known to the hub.
pub type UserId = String;
