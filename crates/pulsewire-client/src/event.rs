//! Client events and actions.

use std::time::Duration;

use pulsewire_proto::{ChannelId, ClientFrame, MessageWithSender, UserId};

use crate::handler::ChannelHandler;

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Reporting transport lifecycle (`Opened`, `Closed`) and inbound frames
/// - Driving time forward via ticks
/// - Forwarding application intents (join, send message, etc.)
///
/// Generic over `I` (Instant type) to support both production
/// (`std::time::Instant`) and simulation (`tokio::time::Instant`)
/// environments.
#[derive(Debug, Clone)]
pub enum ClientEvent<I = std::time::Instant> {
    /// Start connecting.
    Connect,

    /// Physical connection opened.
    Opened,

    /// Physical connection closed, failed to open, or errored.
    Closed {
        /// Human-readable cause, for logs only
        reason: String,
    },

    /// Text frame received from the hub.
    FrameReceived(String),

    /// Time tick for reconnect and typing deadlines.
    ///
    /// The caller should tick at or after [`crate::Client::next_deadline`].
    Tick {
        /// Current time from the environment.
        now: I,
    },

    /// Application wants events for a channel.
    Join {
        /// Channel to join
        channel_id: ChannelId,
    },

    /// Application no longer wants events for a channel.
    Leave {
        /// Channel to leave
        channel_id: ChannelId,
    },

    /// Application wants to post a message.
    SendMessage {
        /// Target channel
        channel_id: ChannelId,
        /// Message body
        content: String,
    },

    /// The local user is typing.
    SendTyping {
        /// Channel being typed in
        channel_id: ChannelId,
    },

    /// Tear down for good.
    Dispose,
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientAction {
    /// Open a new physical connection.
    Open,

    /// Send a frame to the hub.
    Send(ClientFrame),

    /// Close the physical connection.
    CloseTransport {
        /// Reason for closing
        reason: String,
    },

    /// A reconnect is scheduled. The deadline is also reported by
    /// [`crate::Client::next_deadline`], so this is informational.
    ScheduleReconnect {
        /// One-based reconnect number
        attempt: u32,
        /// Wait before opening
        delay: Duration,
    },

    /// Deliver an event to the application's handler.
    Deliver(ChannelEvent),
}

/// Typed event delivered to a [`ChannelHandler`].
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// A message arrived.
    Message(MessageWithSender),

    /// A user started (or kept) typing.
    Typing {
        /// Channel being typed in
        channel_id: ChannelId,
        /// Who is typing
        user_id: UserId,
    },

    /// A typing entry expired.
    TypingStopped {
        /// Channel that was typed in
        channel_id: ChannelId,
        /// Who stopped
        user_id: UserId,
    },

    /// A user came online.
    UserJoined {
        /// Channel scope, if the hub sent one
        channel_id: Option<ChannelId>,
        /// Who joined
        user_id: UserId,
    },

    /// A user went offline.
    UserLeft {
        /// Channel scope, if the hub sent one
        channel_id: Option<ChannelId>,
        /// Who left
        user_id: UserId,
    },

    /// Notice pushed by the hub.
    Warning {
        /// Notice text
        message: String,
    },

    /// The connected flag changed.
    ConnectionChanged {
        /// New value
        connected: bool,
    },

    /// Reconnect budget spent. Delivered once.
    ReconnectExhausted {
        /// Reconnects attempted
        attempts: u32,
    },
}

impl ChannelEvent {
    /// Invoke the matching handler method.
    pub fn dispatch<H: ChannelHandler + ?Sized>(&self, handler: &mut H) {
        match self {
            Self::Message(message) => handler.on_message(message),
            Self::Typing { channel_id, user_id } => handler.on_typing(channel_id, user_id),
            Self::TypingStopped { channel_id, user_id } => {
                handler.on_typing_stopped(channel_id, user_id);
            },
            Self::UserJoined { channel_id, user_id } => {
                handler.on_user_joined(channel_id.as_deref(), user_id);
            },
            Self::UserLeft { channel_id, user_id } => {
                handler.on_user_left(channel_id.as_deref(), user_id);
            },
            Self::Warning { message } => handler.on_warning(message),
            Self::ConnectionChanged { connected } => handler.on_connection_changed(*connected),
            Self::ReconnectExhausted { attempts } => handler.on_reconnect_exhausted(*attempts),
        }
    }
}
