//! Deterministic simulation harness for Pulsewire testing.
//!
//! Virtual-time implementations of the `Environment` and `Driver` traits so
//! the production [`pulsewire_client::RealtimeChannelClient`] runtime can be
//! exercised without sockets or wall-clock waits.
//!
//! Run tests under `#[tokio::test(start_paused = true)]`: timers then fire
//! as soon as every task is idle, at exactly their deadline.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod sim_driver;
pub mod sim_env;

pub use sim_driver::{ConnectOutcome, SimDriver, SimDriverError};
pub use sim_env::SimEnv;
