//! Client
//!
//! Client side of the Pulsewire real-time hub: one logical connection that
//! authenticates, joins and leaves channels, dispatches typed inbound frames
//! to caller-supplied handlers, tracks who is online and who is typing, and
//! reconnects with exponential backoff.
//!
//! # Architecture
//!
//! The client follows the same Sans-IO and action-based patterns as
//! [`pulsewire_core`]. [`Client`] receives events ([`ClientEvent`]),
//! processes them through pure state machine logic, and returns actions
//! ([`ClientAction`]) for the caller to execute. [`RealtimeChannelClient`]
//! is the generic runtime that executes those actions against a [`Driver`].
//!
//! # Components
//!
//! - [`Client`]: Sans-IO state machine
//! - [`RealtimeChannelClient`]: async runtime with the public outbound API
//! - [`ChannelHandler`]: per-call callbacks for inbound events
//! - [`Driver`]: transport abstraction
//! - [`websocket_url`]: hub URL from a page origin
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::WebSocketDriver`]: tokio-tungstenite driver
//! - [`SystemEnv`]: real clock and OS randomness

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod config;
mod driver;
mod endpoint;
mod error;
mod event;
mod handler;
mod runtime;

#[cfg(feature = "transport")]
mod system_env;
#[cfg(feature = "transport")]
pub mod transport;

pub use client::Client;
pub use config::ClientConfig;
pub use driver::{Driver, TransportEvent};
pub use endpoint::{DEFAULT_PATH, EndpointError, websocket_url};
pub use error::ClientError;
pub use event::{ChannelEvent, ClientAction, ClientEvent};
pub use handler::ChannelHandler;
pub use pulsewire_core::{
    ConnectionState, Environment, Jitter, OnlineUsers, ReconnectPolicy,
};
pub use pulsewire_proto::{ChannelId, MessageWithSender, Sender, UserId};
pub use runtime::RealtimeChannelClient;
#[cfg(feature = "transport")]
pub use system_env::SystemEnv;
