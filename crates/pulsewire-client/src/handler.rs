//! Application callbacks.

use pulsewire_proto::MessageWithSender;

use crate::event::ChannelEvent;

/// Callbacks for inbound channel events.
///
/// Every method defaults to doing nothing, so implementors only override the
/// events they care about. Handlers are passed per call to
/// [`crate::RealtimeChannelClient::poll`], which lets a view swap handlers as
/// the user navigates. `()` is the handler that ignores everything.
pub trait ChannelHandler {
    /// A message was posted to a joined channel.
    fn on_message(&mut self, _message: &MessageWithSender) {}

    /// `user_id` is typing in `channel_id`.
    fn on_typing(&mut self, _channel_id: &str, _user_id: &str) {}

    /// `user_id`'s typing indicator in `channel_id` expired.
    fn on_typing_stopped(&mut self, _channel_id: &str, _user_id: &str) {}

    /// `user_id` came online.
    fn on_user_joined(&mut self, _channel_id: Option<&str>, _user_id: &str) {}

    /// `user_id` went offline.
    fn on_user_left(&mut self, _channel_id: Option<&str>, _user_id: &str) {}

    /// The hub pushed a user-facing notice.
    fn on_warning(&mut self, _message: &str) {}

    /// The connected flag flipped.
    fn on_connection_changed(&mut self, _connected: bool) {}

    /// Reconnects gave up. The client stays disconnected until recreated.
    fn on_reconnect_exhausted(&mut self, _attempts: u32) {}
}

impl ChannelHandler for () {}

/// Records every event in arrival order.
impl ChannelHandler for Vec<ChannelEvent> {
    fn on_message(&mut self, message: &MessageWithSender) {
        self.push(ChannelEvent::Message(message.clone()));
    }

    fn on_typing(&mut self, channel_id: &str, user_id: &str) {
        self.push(ChannelEvent::Typing { channel_id: channel_id.into(), user_id: user_id.into() });
    }

    fn on_typing_stopped(&mut self, channel_id: &str, user_id: &str) {
        self.push(ChannelEvent::TypingStopped {
            channel_id: channel_id.into(),
            user_id: user_id.into(),
        });
    }

    fn on_user_joined(&mut self, channel_id: Option<&str>, user_id: &str) {
        self.push(ChannelEvent::UserJoined {
            channel_id: channel_id.map(Into::into),
            user_id: user_id.into(),
        });
    }

    fn on_user_left(&mut self, channel_id: Option<&str>, user_id: &str) {
        self.push(ChannelEvent::UserLeft {
            channel_id: channel_id.map(Into::into),
            user_id: user_id.into(),
        });
    }

    fn on_warning(&mut self, message: &str) {
        self.push(ChannelEvent::Warning { message: message.into() });
    }

    fn on_connection_changed(&mut self, connected: bool) {
        self.push(ChannelEvent::ConnectionChanged { connected });
    }

    fn on_reconnect_exhausted(&mut self, attempts: u32) {
        self.push(ChannelEvent::ReconnectExhausted { attempts });
    }
}
