//! Client state machine.
//!
//! The `Client` is the top-level state machine: it owns the connection
//! lifecycle, channel membership and the derived presence and typing caches,
//! and turns inbound frames into typed [`ChannelEvent`]s.

use std::collections::BTreeSet;

use pulsewire_core::{
    Connection, ConnectionAction, ConnectionState, Environment, OnlineUsers,
    TypingThrottle, TypingTracker,
};
use pulsewire_proto::{ChannelId, ClientFrame, ServerFrame, UserId};

use crate::{
    config::ClientConfig,
    error::ClientError,
    event::{ChannelEvent, ClientAction, ClientEvent},
};

/// Real-time channel client.
///
/// Feed it [`ClientEvent`]s and execute the returned [`ClientAction`]s.
/// Outbound intents (join, leave, message, typing) are silently dropped
/// while not connected.
pub struct Client<E: Environment> {
    /// Environment for time and randomness.
    env: E,

    /// Connection lifecycle and reconnect scheduling.
    connection: Connection<E::Instant>,

    /// Channels whose `join` frame was transmitted.
    channels: BTreeSet<ChannelId>,

    /// Users believed online.
    online: OnlineUsers,

    /// Inbound typing indicators.
    typing: TypingTracker<E::Instant>,

    /// Outbound typing rate limit.
    throttle: TypingThrottle<E::Instant>,

    /// Rejoin channels after reconnecting.
    rejoin_on_reconnect: bool,
}

impl<E: Environment> Client<E> {
    /// Create a disconnected client. Feed [`ClientEvent::Connect`] to start.
    pub fn new(env: E, config: ClientConfig) -> Self {
        Self {
            env,
            connection: Connection::new(config.user_id, config.reconnect),
            channels: BTreeSet::new(),
            online: OnlineUsers::new(),
            typing: TypingTracker::new(config.typing_dwell),
            throttle: TypingThrottle::new(config.typing_throttle),
            rejoin_on_reconnect: config.rejoin_on_reconnect,
        }
    }

    /// Identity announced to the hub.
    pub fn user_id(&self) -> &str {
        self.connection.user_id()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// True only while connected and authenticated.
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Reconnects attempted since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.connection.attempts()
    }

    /// True once reconnects gave up.
    pub fn is_exhausted(&self) -> bool {
        self.connection.is_exhausted()
    }

    /// True once disposed.
    pub fn is_disposed(&self) -> bool {
        self.connection.state() == ConnectionState::Closed
    }

    /// Users believed online.
    pub fn online_users(&self) -> &OnlineUsers {
        &self.online
    }

    /// Users typing in `channel_id`, ascending.
    pub fn typing_users(&self, channel_id: &str) -> Vec<UserId> {
        self.typing.users(channel_id)
    }

    /// Joined channels, ascending.
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(String::as_str)
    }

    /// Earliest pending deadline (reconnect or typing expiry).
    ///
    /// The caller should send a [`ClientEvent::Tick`] at or after this time.
    pub fn next_deadline(&self) -> Option<E::Instant> {
        match (self.connection.reconnect_deadline(), self.typing.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Process an event and return resulting actions.
    ///
    /// # Errors
    ///
    /// - `ClientError::Disposed` for any event after [`ClientEvent::Dispose`]
    /// - `ClientError::Connection` if a lifecycle event does not fit the
    ///   current state (e.g. `Opened` while not connecting)
    pub fn handle(
        &mut self,
        event: ClientEvent<E::Instant>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        if self.is_disposed() {
            return match event {
                ClientEvent::Dispose => Ok(vec![]),
                _ => Err(ClientError::Disposed),
            };
        }

        match event {
            ClientEvent::Connect => self.handle_connect(),
            ClientEvent::Opened => self.handle_opened(),
            ClientEvent::Closed { reason } => Ok(self.handle_closed(&reason)),
            ClientEvent::FrameReceived(text) => Ok(self.handle_frame(&text)),
            ClientEvent::Tick { now } => Ok(self.handle_tick(now)),
            ClientEvent::Join { channel_id } => Ok(self.handle_join(channel_id)),
            ClientEvent::Leave { channel_id } => Ok(self.handle_leave(&channel_id)),
            ClientEvent::SendMessage { channel_id, content } => {
                Ok(self.handle_send_message(channel_id, content))
            },
            ClientEvent::SendTyping { channel_id } => Ok(self.handle_send_typing(channel_id)),
            ClientEvent::Dispose => Ok(self.handle_dispose()),
        }
    }

    fn handle_connect(&mut self) -> Result<Vec<ClientAction>, ClientError> {
        let actions = self.connection.connect()?;
        tracing::info!(user_id = self.connection.user_id(), "connecting");
        Ok(self.map_connection_actions(actions))
    }

    fn handle_opened(&mut self) -> Result<Vec<ClientAction>, ClientError> {
        let actions = self.connection.handle_open()?;
        tracing::info!(user_id = self.connection.user_id(), "connected");

        let mut out = self.map_connection_actions(actions);

        if self.rejoin_on_reconnect {
            for channel_id in &self.channels {
                tracing::debug!(channel_id, "rejoining");
                out.push(ClientAction::Send(ClientFrame::Join { channel_id: channel_id.clone() }));
            }
        } else {
            self.channels.clear();
        }

        out.push(ClientAction::Deliver(ChannelEvent::ConnectionChanged { connected: true }));
        Ok(out)
    }

    fn handle_closed(&mut self, reason: &str) -> Vec<ClientAction> {
        let was_connected = self.connection.is_connected();
        let now = self.env.now();
        let actions = self.connection.handle_close(&self.env, now, reason);

        let mut out = Vec::new();
        if was_connected {
            tracing::info!(reason, "disconnected");
            out.push(ClientAction::Deliver(ChannelEvent::ConnectionChanged { connected: false }));
        }
        out.extend(self.map_connection_actions(actions));
        out
    }

    fn handle_frame(&mut self, text: &str) -> Vec<ClientAction> {
        let frame = match ServerFrame::decode(text) {
            Ok(frame) => frame,
            Err(e) if e.is_unrecognized() => {
                tracing::debug!(error = %e, "ignoring frame");
                return vec![];
            },
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed frame");
                return vec![];
            },
        };

        let event = match frame {
            ServerFrame::NewMessage { message } => ChannelEvent::Message(message),
            ServerFrame::UserTyping { channel_id, user_id } => {
                let now = self.env.now();
                self.typing.record(&channel_id, &user_id, now);
                ChannelEvent::Typing { channel_id, user_id }
            },
            ServerFrame::UserJoined { channel_id, user_id } => {
                self.online.insert(user_id.clone());
                ChannelEvent::UserJoined { channel_id, user_id }
            },
            ServerFrame::UserLeft { channel_id, user_id } => {
                self.online.remove(&user_id);
                ChannelEvent::UserLeft { channel_id, user_id }
            },
            ServerFrame::Warning { message } => {
                tracing::warn!(%message, "hub warning");
                ChannelEvent::Warning { message }
            },
        };

        vec![ClientAction::Deliver(event)]
    }

    fn handle_tick(&mut self, now: E::Instant) -> Vec<ClientAction> {
        let actions = self.connection.tick(now);
        let mut out = self.map_connection_actions(actions);

        for (channel_id, user_id) in self.typing.expire(now) {
            out.push(ClientAction::Deliver(ChannelEvent::TypingStopped { channel_id, user_id }));
        }

        out
    }

    fn handle_join(&mut self, channel_id: ChannelId) -> Vec<ClientAction> {
        if !self.connection.is_connected() {
            tracing::debug!(%channel_id, "join dropped while disconnected");
            return vec![];
        }

        self.channels.insert(channel_id.clone());
        vec![ClientAction::Send(ClientFrame::Join { channel_id })]
    }

    fn handle_leave(&mut self, channel_id: &str) -> Vec<ClientAction> {
        if !self.connection.is_connected() {
            tracing::debug!(channel_id, "leave dropped while disconnected");
            return vec![];
        }

        self.channels.remove(channel_id);
        vec![ClientAction::Send(ClientFrame::Leave { channel_id: channel_id.to_string() })]
    }

    fn handle_send_message(&mut self, channel_id: ChannelId, content: String) -> Vec<ClientAction> {
        if !self.connection.is_connected() {
            tracing::debug!(%channel_id, "message dropped while disconnected");
            return vec![];
        }

        self.throttle.reset(&channel_id);
        vec![ClientAction::Send(ClientFrame::Message { channel_id, content })]
    }

    fn handle_send_typing(&mut self, channel_id: ChannelId) -> Vec<ClientAction> {
        if !self.connection.is_connected() {
            return vec![];
        }

        let now = self.env.now();
        if !self.throttle.should_send(&channel_id, now) {
            return vec![];
        }

        vec![ClientAction::Send(ClientFrame::Typing { channel_id })]
    }

    fn handle_dispose(&mut self) -> Vec<ClientAction> {
        let actions = self.connection.dispose();
        tracing::info!(user_id = self.connection.user_id(), "disposed");

        self.typing.clear();
        self.throttle.clear();
        self.channels.clear();

        self.map_connection_actions(actions)
    }

    fn map_connection_actions(&self, actions: Vec<ConnectionAction>) -> Vec<ClientAction> {
        actions
            .into_iter()
            .map(|action| match action {
                ConnectionAction::Open => ClientAction::Open,
                ConnectionAction::Send(frame) => ClientAction::Send(frame),
                ConnectionAction::ScheduleReconnect { attempt, delay } => {
                    let delay_ms = delay.as_millis() as u64;
                    tracing::info!(attempt, delay_ms, "reconnect scheduled");
                    ClientAction::ScheduleReconnect { attempt, delay }
                },
                ConnectionAction::GiveUp { attempts } => {
                    tracing::warn!(attempts, "reconnect attempts exhausted");
                    ClientAction::Deliver(ChannelEvent::ReconnectExhausted { attempts })
                },
                ConnectionAction::Close { reason } => ClientAction::CloseTransport { reason },
            })
            .collect()
    }
}
