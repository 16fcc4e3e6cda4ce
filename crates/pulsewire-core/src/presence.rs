//! Online-user tracking.
//!
//! Derived entirely from `user_joined` / `user_left` notifications. The set is
//! eventually consistent with the hub and has plain set semantics: joining
//! twice and leaving once leaves the user absent.

use std::collections::BTreeSet;

use pulsewire_proto::UserId;

/// Users believed to be connected to the hub.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnlineUsers {
    users: BTreeSet<UserId>,
}

impl OnlineUsers {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a user online. Returns `true` if they were not already.
    pub fn insert(&mut self, user_id: impl Into<UserId>) -> bool {
        self.users.insert(user_id.into())
    }

    /// Mark a user offline. Returns `true` if they were online.
    pub fn remove(&mut self, user_id: &str) -> bool {
        self.users.remove(user_id)
    }

    /// Whether the user is believed online.
    pub fn contains(&self, user_id: &str) -> bool {
        self.users.contains(user_id)
    }

    /// Number of online users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// True if nobody is online.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Online users in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(String::as_str)
    }

    /// Forget everyone.
    pub fn clear(&mut self) {
        self.users.clear();
    }
}
