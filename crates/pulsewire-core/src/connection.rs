//! Connection lifecycle state machine.
//!
//! Tracks one logical connection to the hub across any number of physical
//! sockets: authentication on open, exponential-backoff reconnects on close,
//! and teardown. Uses the action pattern: methods take time as input and
//! return actions for the driver to execute. This keeps the state machine pure
//! (no I/O) and makes testing straightforward.
//!
//! # State Machine
//!
//! ```text
//!                  connect / deadline
//! ┌──────────────┐─────────────────────>┌────────────┐
//! │ Disconnected │                      │ Connecting │
//! └──────────────┘<─────────────────────└────────────┘
//!    ^       │         close / error          │
//!    │       │                                │ open (sends auth)
//!    │       │ attempts >= max                ↓
//!    │       └─> stays Disconnected     ┌───────────┐
//!    └──────────────────────────────────│ Connected │
//!                 close / error         └───────────┘
//!
//!  any state ── dispose ──> Closed (terminal)
//! ```
//!
//! # Invariants
//!
//! - At most one reconnect deadline is pending at a time.
//! - The attempt counter resets to zero on every successful open.
//! - Once exhausted or closed, no further `Open` action is ever produced.

use std::time::{Duration, Instant};

use pulsewire_proto::{ClientFrame, UserId};

use crate::{
    backoff::ReconnectPolicy,
    env::{Environment, Timestamp},
    error::ConnectionError,
};

/// Actions returned by the connection state machine.
///
/// The driver (test harness or production runtime) executes these actions:
/// - `Open`: Start a new physical connection
/// - `Send`: Serialize and send the frame over the transport
/// - `ScheduleReconnect`: Informational; the deadline is also exposed via
///   [`Connection::reconnect_deadline`]
/// - `GiveUp`: Reconnect budget spent
/// - `Close`: Tear down the physical connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionAction {
    /// Open a new physical connection
    Open,

    /// Send this frame to the hub
    Send(ClientFrame),

    /// A reconnect was scheduled
    ScheduleReconnect {
        /// One-based number of the upcoming reconnect
        attempt: u32,
        /// Wait before opening
        delay: Duration,
    },

    /// No more reconnects will be attempted
    GiveUp {
        /// Reconnects attempted
        attempts: u32,
    },

    /// Close the physical connection with this reason
    Close {
        /// Reason for closing the connection
        reason: String,
    },
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No physical connection. Initial state, and the state between
    /// reconnect attempts.
    Disconnected,
    /// Physical connection being opened
    Connecting,
    /// Open and authenticated; outbound frames are transmitted
    Connected,
    /// Disposed by the owner (terminal)
    Closed,
}

/// Connection state machine
///
/// Generic over `Instant` to support both real time and virtual time for
/// deterministic testing.
#[derive(Debug, Clone)]
pub struct Connection<I = Instant>
where
    I: Timestamp,
{
    /// Current state
    state: ConnectionState,
    /// Identity announced in the auth frame
    user_id: UserId,
    /// Backoff configuration
    policy: ReconnectPolicy,
    /// Reconnects attempted since the last successful open
    attempts: u32,
    /// When the pending reconnect fires
    reconnect_at: Option<I>,
    /// Reconnect budget spent
    exhausted: bool,
}

impl<I> Connection<I>
where
    I: Timestamp,
{
    /// Create a new connection in [`ConnectionState::Disconnected`] state
    pub fn new(user_id: impl Into<UserId>, policy: ReconnectPolicy) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            user_id: user_id.into(),
            policy,
            attempts: 0,
            reconnect_at: None,
            exhausted: false,
        }
    }

    /// Current connection state
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True only in [`ConnectionState::Connected`].
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Identity sent in the auth frame.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Reconnects attempted since the last successful open.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// True once the reconnect budget is spent.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// When the pending reconnect fires. `None` if none is scheduled.
    #[must_use]
    pub fn reconnect_deadline(&self) -> Option<I> {
        self.reconnect_at
    }

    /// Begin connecting now.
    ///
    /// Cancels any pending reconnect deadline.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::Disposed` if closed
    /// - `ConnectionError::Exhausted` if the reconnect budget is spent
    /// - `ConnectionError::InvalidState` if already connecting or connected
    pub fn connect(&mut self) -> Result<Vec<ConnectionAction>, ConnectionError> {
        match self.state {
            ConnectionState::Closed => Err(ConnectionError::Disposed),
            ConnectionState::Disconnected if self.exhausted => {
                Err(ConnectionError::Exhausted { attempts: self.attempts })
            },
            ConnectionState::Disconnected => {
                self.state = ConnectionState::Connecting;
                self.reconnect_at = None;
                Ok(vec![ConnectionAction::Open])
            },
            state @ (ConnectionState::Connecting | ConnectionState::Connected) => {
                Err(ConnectionError::InvalidState { state, operation: "connect" })
            },
        }
    }

    /// Physical connection opened.
    ///
    /// Transitions to Connected, resets the attempt counter and returns the
    /// auth frame.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::InvalidState` if not in Connecting state
    pub fn handle_open(&mut self) -> Result<Vec<ConnectionAction>, ConnectionError> {
        if self.state != ConnectionState::Connecting {
            return Err(ConnectionError::InvalidState {
                state: self.state,
                operation: "handle_open",
            });
        }

        self.state = ConnectionState::Connected;
        self.attempts = 0;

        let auth = ClientFrame::Auth { user_id: self.user_id.clone() };
        Ok(vec![ConnectionAction::Send(auth)])
    }

    /// Physical connection closed, failed to open, or errored.
    ///
    /// Failures are not distinguished by cause. Schedules the next reconnect
    /// or, once `max_attempts` reconnects have failed, gives up. A close
    /// reported while already disconnected or closed is stale and ignored.
    pub fn handle_close<E>(&mut self, env: &E, now: I, reason: &str) -> Vec<ConnectionAction>
    where
        E: Environment<Instant = I>,
    {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => {},
            ConnectionState::Disconnected | ConnectionState::Closed => return vec![],
        }

        tracing::debug!(reason, attempts = self.attempts, "connection lost");
        self.state = ConnectionState::Disconnected;

        if self.attempts >= self.policy.max_attempts {
            self.exhausted = true;
            self.reconnect_at = None;
            return vec![ConnectionAction::GiveUp { attempts: self.attempts }];
        }

        let delay = self.policy.delay_for(self.attempts, env);
        self.attempts += 1;
        self.reconnect_at = Some(now + delay);

        vec![ConnectionAction::ScheduleReconnect { attempt: self.attempts, delay }]
    }

    /// Process timer expiry.
    ///
    /// Returns `Open` once the reconnect deadline has passed.
    pub fn tick(&mut self, now: I) -> Vec<ConnectionAction> {
        match self.reconnect_at {
            Some(deadline) if self.state == ConnectionState::Disconnected && now >= deadline => {
                self.reconnect_at = None;
                self.state = ConnectionState::Connecting;
                vec![ConnectionAction::Open]
            },
            _ => vec![],
        }
    }

    /// Tear down for good.
    ///
    /// Clears the reconnect deadline and returns `Close` if a physical
    /// connection exists.
    pub fn dispose(&mut self) -> Vec<ConnectionAction> {
        let previous = self.state;
        self.state = ConnectionState::Closed;
        self.reconnect_at = None;

        match previous {
            ConnectionState::Connecting | ConnectionState::Connected => {
                vec![ConnectionAction::Close { reason: "disposed".to_string() }]
            },
            ConnectionState::Disconnected | ConnectionState::Closed => vec![],
        }
    }
}
