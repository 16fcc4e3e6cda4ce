//! Pulsewire terminal client.
//!
//! A line-oriented front end over [`pulsewire_client::RealtimeChannelClient`]:
//! stdin lines become [`Command`]s, a [`Session`] turns them into client
//! calls, and a [`Printer`] renders dispatched events as text.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod command;
mod printer;
mod session;

pub use command::{Command, CommandError};
pub use printer::Printer;
pub use session::Session;
