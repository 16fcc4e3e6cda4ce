//! Terminal session state: active channel and the channels the user wants.

use std::{collections::BTreeSet, io::Write};

use pulsewire_client::{ChannelId, Driver, Environment, RealtimeChannelClient};

use crate::{Command, Printer};

/// What the user has asked for, independent of connection state.
///
/// The client only records a join once its frame goes out, so commands typed
/// while disconnected are kept here and replayed by [`Session::reconcile`].
#[derive(Debug, Default)]
pub struct Session {
    active: Option<ChannelId>,
    wanted: BTreeSet<ChannelId>,
}

impl Session {
    /// Start with `channels` wanted; the first becomes active.
    pub fn new(channels: impl IntoIterator<Item = ChannelId>) -> Self {
        let mut session = Self::default();
        for channel in channels {
            if session.active.is_none() {
                session.active = Some(channel.clone());
            }
            session.wanted.insert(channel);
        }
        session
    }

    /// Channel plain text is posted to.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Channels the user wants to be in.
    pub fn wanted(&self) -> impl Iterator<Item = &str> {
        self.wanted.iter().map(String::as_str)
    }

    /// Apply one command. Returns `false` when the user asked to quit.
    pub fn execute<D, E, W>(
        &mut self,
        command: Command,
        client: &mut RealtimeChannelClient<D, E>,
        out: &mut Printer<W>,
    ) -> bool
    where
        D: Driver,
        E: Environment,
        W: Write,
    {
        match command {
            Command::Join(channel) => {
                client.join(channel.clone());
                self.wanted.insert(channel.clone());
                self.active = Some(channel);
            },
            Command::Leave(channel) => {
                let Some(channel) = channel.or_else(|| self.active.clone()) else {
                    out.notice("no active channel");
                    return true;
                };
                client.leave(channel.clone());
                self.wanted.remove(&channel);
                if self.active.as_ref() == Some(&channel) {
                    self.active = None;
                }
            },
            Command::Typing => match &self.active {
                Some(channel) => client.send_typing(channel.clone()),
                None => out.notice("no active channel"),
            },
            Command::Who => {
                let typing = self.active.as_deref().map(|c| client.typing_users(c));
                out.who(client.online_users(), self.active(), typing.as_deref().unwrap_or(&[]));
            },
            Command::Say(text) => match &self.active {
                Some(_) if !client.is_connected() => out.notice("not connected, message dropped"),
                Some(channel) => client.send_message(channel.clone(), text),
                None => out.notice("no active channel, /join one first"),
            },
            Command::Quit => return false,
        }
        true
    }

    /// Bring the client's channel set in line with what the user wants.
    ///
    /// Joins and leaves issued while disconnected are no-ops in the client;
    /// this replays them once the connection is back.
    pub fn reconcile<D, E>(&self, client: &mut RealtimeChannelClient<D, E>)
    where
        D: Driver,
        E: Environment,
    {
        if !client.is_connected() {
            return;
        }

        let current: BTreeSet<ChannelId> = client.channels().map(str::to_string).collect();
        for channel in current.difference(&self.wanted) {
            tracing::debug!(%channel, "leaving unwanted channel");
            client.leave(channel.clone());
        }
        for channel in self.wanted.difference(&current) {
            tracing::debug!(%channel, "joining wanted channel");
            client.join(channel.clone());
        }
    }
}
