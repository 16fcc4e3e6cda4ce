//! Typing indicators.
//!
//! [`TypingTracker`] holds inbound typing state: which users are typing in
//! which channel, each with one expiry deadline. A fresh notification replaces
//! the deadline, so an entry never expires earlier than the dwell time after
//! the most recent notification for that (channel, user) pair.
//!
//! [`TypingThrottle`] rate-limits the outbound typing signal per channel.
//!
//! Both are Sans-IO: callers pass `now` and poll [`TypingTracker::expire`]
//! at or after [`TypingTracker::next_deadline`].

use std::{
    collections::{BTreeMap, btree_map::Entry},
    time::Duration,
};

use pulsewire_proto::{ChannelId, UserId};

use crate::env::Timestamp;

/// How long a typing notification keeps a user marked as typing.
pub const DEFAULT_TYPING_DWELL: Duration = Duration::from_millis(3000);

/// Minimum spacing between outbound typing frames on one channel.
pub const DEFAULT_TYPING_THROTTLE: Duration = Duration::from_millis(2000);

/// Per-channel set of typing users with expiry deadlines.
#[derive(Debug, Clone)]
pub struct TypingTracker<I: Timestamp> {
    dwell: Duration,
    channels: BTreeMap<ChannelId, BTreeMap<UserId, I>>,
}

impl<I: Timestamp> Default for TypingTracker<I> {
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_DWELL)
    }
}

impl<I: Timestamp> TypingTracker<I> {
    /// Create a tracker whose entries live for `dwell`.
    pub fn new(dwell: Duration) -> Self {
        Self { dwell, channels: BTreeMap::new() }
    }

    /// Dwell time applied to each notification.
    pub fn dwell(&self) -> Duration {
        self.dwell
    }

    /// Record that `user_id` is typing in `channel_id` as of `now`.
    ///
    /// Returns `true` if the user was not already marked typing there.
    pub fn record(&mut self, channel_id: &str, user_id: &str, now: I) -> bool {
        let deadline = now + self.dwell;
        let users = self.channels.entry(channel_id.to_string()).or_default();

        match users.entry(user_id.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(deadline);
                false
            },
            Entry::Vacant(entry) => {
                entry.insert(deadline);
                true
            },
        }
    }

    /// Remove every entry whose deadline is at or before `now`.
    ///
    /// Returns the removed (channel, user) pairs in ascending order.
    pub fn expire(&mut self, now: I) -> Vec<(ChannelId, UserId)> {
        let mut expired = Vec::new();

        for (channel, users) in &mut self.channels {
            users.retain(|user, deadline| {
                let live = now < *deadline;
                if !live {
                    expired.push((channel.clone(), user.clone()));
                }
                live
            });
        }
        self.channels.retain(|_, users| !users.is_empty());

        expired
    }

    /// Users currently typing in `channel_id`, ascending.
    pub fn users(&self, channel_id: &str) -> Vec<UserId> {
        self.channels
            .get(channel_id)
            .map(|users| users.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether `user_id` is typing in `channel_id`.
    pub fn is_typing(&self, channel_id: &str, user_id: &str) -> bool {
        self.channels.get(channel_id).is_some_and(|users| users.contains_key(user_id))
    }

    /// Earliest pending expiry, if any.
    pub fn next_deadline(&self) -> Option<I> {
        self.channels.values().flat_map(BTreeMap::values).copied().min()
    }

    /// True if nobody is typing anywhere.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Drop all entries and deadlines.
    pub fn clear(&mut self) {
        self.channels.clear();
    }
}

/// Outbound typing-signal rate limit.
///
/// Allows at most one typing frame per `interval` per channel. A zero
/// interval allows every call.
#[derive(Debug, Clone)]
pub struct TypingThrottle<I: Timestamp> {
    interval: Duration,
    last_sent: BTreeMap<ChannelId, I>,
}

impl<I: Timestamp> Default for TypingThrottle<I> {
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_THROTTLE)
    }
}

impl<I: Timestamp> TypingThrottle<I> {
    /// Create a throttle with the given spacing.
    pub fn new(interval: Duration) -> Self {
        Self { interval, last_sent: BTreeMap::new() }
    }

    /// Configured spacing.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a typing frame for `channel_id` may go out at `now`.
    ///
    /// Records `now` as the last send when it returns `true`.
    pub fn should_send(&mut self, channel_id: &str, now: I) -> bool {
        if self.interval.is_zero() {
            return true;
        }

        match self.last_sent.get(channel_id) {
            Some(last) if now - *last < self.interval => false,
            _ => {
                self.last_sent.insert(channel_id.to_string(), now);
                true
            },
        }
    }

    /// Forget the last send for `channel_id` so the next call goes out.
    pub fn reset(&mut self, channel_id: &str) {
        self.last_sent.remove(channel_id);
    }

    /// Forget every channel.
    pub fn clear(&mut self) {
        self.last_sent.clear();
    }
}
