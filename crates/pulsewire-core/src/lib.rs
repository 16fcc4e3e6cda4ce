//! Pulsewire core
//!
//! Pure state machines behind the real-time channel client. Nothing in this
//! crate performs I/O or reads the clock: methods take the current time as an
//! argument and return actions for a driver to execute. This keeps every
//! transition deterministic and testable without a socket or a timer.
//!
//! # Components
//!
//! - [`connection::Connection`]: lifecycle, authentication and reconnect
//!   scheduling
//! - [`backoff::ReconnectPolicy`]: exponential backoff with optional jitter
//! - [`presence::OnlineUsers`]: set of users believed online
//! - [`typing::TypingTracker`]: per-channel typing users with expiry deadlines
//! - [`typing::TypingThrottle`]: outbound typing-signal rate limit
//! - [`env::Environment`]: time and randomness supplied by the caller

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod backoff;
pub mod connection;
pub mod env;
pub mod error;
pub mod presence;
pub mod typing;

pub use backoff::{Jitter, ReconnectPolicy};
pub use connection::{Connection, ConnectionAction, ConnectionState};
pub use env::{Environment, Timestamp};
pub use error::ConnectionError;
pub use presence::OnlineUsers;
pub use typing::{TypingThrottle, TypingTracker};
