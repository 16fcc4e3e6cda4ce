//! Generic runtime for the real-time channel client.
//!
//! The runtime drives the event loop, coordinating between:
//! - [`Client`]: Sans-IO state machine
//! - [`Driver`]: transport I/O
//! - [`Environment`]: clock and timers
//!
//! It executes the client's actions immediately and hands delivered events to
//! the handler passed to [`RealtimeChannelClient::poll`].

use std::{collections::VecDeque, time::Duration};

use pulsewire_core::{ConnectionState, Environment, OnlineUsers};
use pulsewire_proto::{ClientFrame, UserId};

use crate::{
    Client, ClientAction, ClientConfig, ClientError, ClientEvent, Driver,
    driver::TransportEvent,
    event::ChannelEvent,
    handler::ChannelHandler,
};

/// Owns one logical connection to the hub.
///
/// Construction starts connecting. Call [`poll`](Self::poll) (or
/// [`run`](Self::run)) to make progress; outbound methods never block and
/// never fail visibly.
///
/// # Type Parameters
///
/// - `D`: Transport driver
/// - `E`: Environment for time and randomness
pub struct RealtimeChannelClient<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    env: E,
    client: Client<E>,
    url: String,
    pending: VecDeque<ChannelEvent>,
}

impl<D, E> RealtimeChannelClient<D, E>
where
    D: Driver,
    E: Environment,
{
    /// Create a client and start connecting to `url`.
    pub fn new(driver: D, env: E, url: impl Into<String>, config: ClientConfig) -> Self {
        let client = Client::new(env.clone(), config);
        let mut this = Self { driver, env, client, url: url.into(), pending: VecDeque::new() };
        this.apply(ClientEvent::Connect);
        this
    }

    /// Hub URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// True only while connected and authenticated.
    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.client.state()
    }

    /// Reconnects attempted since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.client.reconnect_attempts()
    }

    /// Users believed online.
    pub fn online_users(&self) -> &OnlineUsers {
        self.client.online_users()
    }

    /// Whether `user_id` is believed online.
    pub fn is_online(&self, user_id: &str) -> bool {
        self.client.online_users().contains(user_id)
    }

    /// Users typing in `channel_id`, ascending.
    pub fn typing_users(&self, channel_id: &str) -> Vec<UserId> {
        self.client.typing_users(channel_id)
    }

    /// Joined channels, ascending.
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.client.channels()
    }

    /// Start receiving events for `channel_id`. No-op unless connected.
    pub fn join(&mut self, channel_id: impl Into<String>) {
        self.apply(ClientEvent::Join { channel_id: channel_id.into() });
    }

    /// Stop receiving events for `channel_id`. No-op unless connected.
    pub fn leave(&mut self, channel_id: impl Into<String>) {
        self.apply(ClientEvent::Leave { channel_id: channel_id.into() });
    }

    /// Post a message. No-op unless connected.
    pub fn send_message(&mut self, channel_id: impl Into<String>, content: impl Into<String>) {
        self.apply(ClientEvent::SendMessage {
            channel_id: channel_id.into(),
            content: content.into(),
        });
    }

    /// Signal typing activity. Throttled per channel; no-op unless connected.
    pub fn send_typing(&mut self, channel_id: impl Into<String>) {
        self.apply(ClientEvent::SendTyping { channel_id: channel_id.into() });
    }

    /// Close the connection and cancel every pending deadline.
    ///
    /// Idempotent. No handler is invoked afterwards.
    pub fn dispose(&mut self) {
        self.apply(ClientEvent::Dispose);
        self.pending.clear();
    }

    /// Wait for the next transport event or deadline and dispatch the
    /// resulting events to `handler`.
    ///
    /// Returns `false` once nothing can happen any more: the client was
    /// disposed, or reconnects gave up and no typing indicator is left to
    /// expire.
    pub async fn poll<H: ChannelHandler + ?Sized>(&mut self, handler: &mut H) -> bool {
        if self.pending.is_empty() {
            if self.client.is_disposed() {
                return false;
            }

            let deadline = self.client.next_deadline();
            if self.client.is_exhausted() && deadline.is_none() {
                return false;
            }

            let sleep = deadline.map(|deadline| {
                let now = self.env.now();
                if deadline > now { deadline - now } else { Duration::ZERO }
            });

            let event = tokio::select! {
                biased;

                event = self.driver.next_event() => Some(event),
                () = self.env.sleep(sleep.unwrap_or_default()), if sleep.is_some() => None,
            };

            match event {
                Some(TransportEvent::Opened) => self.apply(ClientEvent::Opened),
                Some(TransportEvent::Frame(text)) => self.apply(ClientEvent::FrameReceived(text)),
                Some(TransportEvent::Closed { reason }) => {
                    self.apply(ClientEvent::Closed { reason });
                },
                None => {
                    let now = self.env.now();
                    self.apply(ClientEvent::Tick { now });
                },
            }
        }

        while let Some(event) = self.pending.pop_front() {
            event.dispatch(&mut *handler);
        }

        true
    }

    /// Poll until nothing more can happen.
    pub async fn run<H: ChannelHandler + ?Sized>(&mut self, handler: &mut H) {
        while self.poll(&mut *handler).await {}
    }

    /// Feed one event to the client and execute its actions.
    fn apply(&mut self, event: ClientEvent<E::Instant>) {
        match self.client.handle(event) {
            Ok(actions) => self.execute(actions),
            Err(ClientError::Disposed) => tracing::debug!("ignoring event after dispose"),
            Err(e) => tracing::error!(error = %e, "driver contract violation"),
        }
    }

    fn execute(&mut self, actions: Vec<ClientAction>) {
        for action in actions {
            match action {
                ClientAction::Open => {
                    tracing::debug!(url = %self.url, "opening transport");
                    self.driver.open(&self.url);
                },
                ClientAction::Send(frame) => self.send_frame(&frame),
                ClientAction::CloseTransport { reason } => {
                    tracing::debug!(%reason, "closing transport");
                    self.driver.close();
                },
                // Deadline is read back from the client on the next poll
                ClientAction::ScheduleReconnect { .. } => {},
                ClientAction::Deliver(event) => self.pending.push_back(event),
            }
        }
    }

    fn send_frame(&mut self, frame: &ClientFrame) {
        let text = match frame.encode() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, kind = frame.kind(), "failed to encode frame");
                return;
            },
        };

        // The close that follows a failed send drives reconnection
        if let Err(e) = self.driver.send(text) {
            tracing::warn!(error = %e, kind = frame.kind(), "send failed");
        }
    }
}

impl<D, E> Drop for RealtimeChannelClient<D, E>
where
    D: Driver,
    E: Environment,
{
    fn drop(&mut self) {
        if !self.client.is_disposed() {
            self.dispose();
        }
    }
}
