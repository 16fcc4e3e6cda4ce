//! Error types for the connection state machine.
//!
//! The state machine only fails when a driver feeds it an event that makes no
//! sense for the current state. Transport failures are not errors here: they
//! are ordinary `handle_close` inputs that drive reconnection.

use thiserror::Error;

use crate::connection::ConnectionState;

/// Errors that can occur during connection state machine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Invalid state transition attempted
    #[error("invalid state transition: cannot {operation} from {state:?}")]
    InvalidState {
        /// Current state when error occurred
        state: ConnectionState,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Reconnect budget spent; the connection must be recreated
    #[error("reconnect attempts exhausted after {attempts} tries")]
    Exhausted {
        /// Reconnects attempted before giving up
        attempts: u32,
    },

    /// Connection was disposed by its owner
    #[error("connection disposed")]
    Disposed,
}
