//! Client error types.

use pulsewire_core::ConnectionError;
use thiserror::Error;

/// Errors returned by [`crate::Client::handle`].
///
/// These indicate a driver feeding events that do not fit the current state.
/// The public runtime API never surfaces them; it logs and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Connection state machine rejected the event
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Client was disposed; no further events are accepted
    #[error("client disposed")]
    Disposed,
}
