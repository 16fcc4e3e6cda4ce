//! Client configuration.

use std::time::Duration;

use pulsewire_core::{
    ReconnectPolicy,
    typing::{DEFAULT_TYPING_DWELL, DEFAULT_TYPING_THROTTLE},
};
use pulsewire_proto::UserId;

/// Configuration for a [`crate::Client`].
///
/// Everything except the user identity has a default. Use the `with_*`
/// methods to override individual settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Identity announced in the auth frame
    pub user_id: UserId,
    /// Reconnect backoff
    pub reconnect: ReconnectPolicy,
    /// How long an inbound typing notification stays visible
    pub typing_dwell: Duration,
    /// Minimum spacing between outbound typing frames per channel. Zero sends
    /// on every call.
    pub typing_throttle: Duration,
    /// Re-send `join` for every joined channel after a reconnect
    pub rejoin_on_reconnect: bool,
}

impl ClientConfig {
    /// Default configuration for `user_id`.
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            reconnect: ReconnectPolicy::default(),
            typing_dwell: DEFAULT_TYPING_DWELL,
            typing_throttle: DEFAULT_TYPING_THROTTLE,
            rejoin_on_reconnect: true,
        }
    }

    /// Override the reconnect policy.
    #[must_use]
    pub fn with_reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// Override the typing dwell time.
    #[must_use]
    pub fn with_typing_dwell(mut self, dwell: Duration) -> Self {
        self.typing_dwell = dwell;
        self
    }

    /// Override the outbound typing throttle.
    #[must_use]
    pub fn with_typing_throttle(mut self, interval: Duration) -> Self {
        self.typing_throttle = interval;
        self
    }

    /// Enable or disable rejoining channels after a reconnect.
    #[must_use]
    pub fn with_rejoin_on_reconnect(mut self, rejoin: bool) -> Self {
        self.rejoin_on_reconnect = rejoin;
        self
    }
}
