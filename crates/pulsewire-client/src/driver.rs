//! Driver trait for abstracting transport I/O.
//!
//! The [`Driver`] trait decouples the runtime from a specific socket
//! implementation. Production uses [`crate::transport::WebSocketDriver`]; tests
//! use a scripted in-memory driver. The generic
//! [`crate::RealtimeChannelClient`] handles all orchestration.

use std::future::Future;

/// Something that happened on the physical connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection requested by [`Driver::open`] is up.
    Opened,

    /// One inbound text frame.
    Frame(String),

    /// The connection closed, errored, or failed to open.
    Closed {
        /// Cause, for logs only
        reason: String,
    },
}

/// Abstracts transport operations for the runtime.
///
/// Shaped like a browser WebSocket: opening and sending never block, and
/// every outcome arrives through [`Driver::next_event`].
///
/// # Contract
///
/// - Each `open` yields exactly one of `Opened` or `Closed`, and after
///   `Opened`, frames followed by at most one `Closed`.
/// - After `close`, no further events from that connection are reported.
pub trait Driver: Send {
    /// Send failure.
    type Error: std::error::Error + Send + 'static;

    /// Begin opening a new connection to `url`. Drops any previous one.
    fn open(&mut self, url: &str);

    /// Queue one text frame on the open connection.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is open.
    fn send(&mut self, text: String) -> Result<(), Self::Error>;

    /// Wait for the next transport event.
    ///
    /// Must be cancel-safe: the runtime races it against timers.
    fn next_event(&mut self) -> impl Future<Output = TransportEvent> + Send;

    /// Tear down the current connection, if any.
    fn close(&mut self);
}
