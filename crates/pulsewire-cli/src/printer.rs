//! Plain-text rendering of channel events.

use std::io::Write;

use pulsewire_client::{ChannelHandler, MessageWithSender, OnlineUsers};

/// [`ChannelHandler`] that writes one line per event.
///
/// Write errors are ignored; a closed stdout must not stop the client.
pub struct Printer<W: Write> {
    out: W,
}

impl<W: Write> Printer<W> {
    /// Render into `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Local status line, not from the hub.
    pub fn notice(&mut self, text: &str) {
        self.line(format_args!("-- {text}"));
    }

    /// Presence summary for `/who`.
    pub fn who(&mut self, online: &OnlineUsers, channel: Option<&str>, typing: &[String]) {
        if online.is_empty() {
            self.line(format_args!("-- nobody online"));
        } else {
            let names: Vec<&str> = online.iter().collect();
            self.line(format_args!("-- online: {}", names.join(", ")));
        }

        if let Some(channel) = channel.filter(|_| !typing.is_empty()) {
            self.line(format_args!("-- typing in {channel}: {}", typing.join(", ")));
        }
    }

    /// Consume the printer, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        let _ = self.out.write_fmt(args);
        let _ = self.out.write_all(b"\n");
        let _ = self.out.flush();
    }
}

impl<W: Write> ChannelHandler for Printer<W> {
    fn on_message(&mut self, message: &MessageWithSender) {
        self.line(format_args!(
            "[{}] {}: {}",
            message.channel_id,
            message.author(),
            message.content
        ));
    }

    fn on_typing(&mut self, channel_id: &str, user_id: &str) {
        self.line(format_args!("* {user_id} is typing in {channel_id}"));
    }

    fn on_typing_stopped(&mut self, channel_id: &str, user_id: &str) {
        self.line(format_args!("* {user_id} stopped typing in {channel_id}"));
    }

    fn on_user_joined(&mut self, _channel_id: Option<&str>, user_id: &str) {
        self.line(format_args!("+ {user_id} online"));
    }

    fn on_user_left(&mut self, _channel_id: Option<&str>, user_id: &str) {
        self.line(format_args!("- {user_id} offline"));
    }

    fn on_warning(&mut self, message: &str) {
        self.line(format_args!("! {message}"));
    }

    fn on_connection_changed(&mut self, connected: bool) {
        if connected {
            self.line(format_args!("-- connected"));
        } else {
            self.line(format_args!("-- disconnected, reconnecting"));
        }
    }

    fn on_reconnect_exhausted(&mut self, attempts: u32) {
        self.line(format_args!("-- gave up after {attempts} reconnect attempts"));
    }
}

#[cfg(test)]
mod tests {
    use pulsewire_client::ChannelEvent;
    use pulsewire_proto::ServerFrame;

    use super::*;

    fn render(events: &[ChannelEvent]) -> String {
        let mut printer = Printer::new(Vec::new());
        for event in events {
            event.dispatch(&mut printer);
        }
        String::from_utf8(printer.into_inner()).unwrap()
    }

    #[test]
    fn renders_each_event_kind() {
        let ServerFrame::NewMessage { message } = ServerFrame::decode(
            r#"{"type":"new_message","message":{"id":"m1","channelId":"icu","senderId":"u2","content":"bed 4 stable","sender":{"id":"u2","firstName":"Ada","lastName":"Okafor"}}}"#,
        )
        .unwrap() else {
            panic!("expected a message frame");
        };

        let output = render(&[
            ChannelEvent::ConnectionChanged { connected: true },
            ChannelEvent::UserJoined { channel_id: None, user_id: "u2".into() },
            ChannelEvent::Typing { channel_id: "icu".into(), user_id: "u2".into() },
            ChannelEvent::Message(message),
            ChannelEvent::TypingStopped { channel_id: "icu".into(), user_id: "u2".into() },
            ChannelEvent::Warning { message: "Quiet hours".into() },
            ChannelEvent::UserLeft { channel_id: Some("icu".into()), user_id: "u2".into() },
            ChannelEvent::ConnectionChanged { connected: false },
            ChannelEvent::ReconnectExhausted { attempts: 5 },
        ]);

        insta::assert_snapshot!(output, @r"
        -- connected
        + u2 online
        * u2 is typing in icu
        [icu] Ada Okafor: bed 4 stable
        * u2 stopped typing in icu
        ! Quiet hours
        - u2 offline
        -- disconnected, reconnecting
        -- gave up after 5 reconnect attempts
        ");
    }

    #[test]
    fn who_lists_presence_and_typing() {
        let mut online = OnlineUsers::new();
        online.insert("u3");
        online.insert("u1");

        let mut printer = Printer::new(Vec::new());
        printer.who(&online, Some("icu"), &["u3".into()]);
        printer.who(&OnlineUsers::new(), None, &[]);

        insta::assert_snapshot!(String::from_utf8(printer.into_inner()).unwrap(), @r"
        -- online: u1, u3
        -- typing in icu: u3
        -- nobody online
        ");
    }
}
