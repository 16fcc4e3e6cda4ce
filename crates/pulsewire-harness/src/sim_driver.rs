//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` stands in for the WebSocket driver. It implements [`Driver`]
//! so the same [`pulsewire_client::RealtimeChannelClient`] orchestration code
//! runs in both production and simulation. Clones share state: keep one clone
//! in the test to script the hub and inspect what the client sent.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use pulsewire_client::{Driver, TransportEvent};
use pulsewire_proto::{ClientFrame, ServerFrame};
use thiserror::Error;
use tokio::{sync::Notify, time::Instant};

/// Error type for simulation driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimDriverError {
    /// Send attempted without an open connection
    #[error("not connected")]
    NotConnected,
}

/// What happens when the client opens a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The connection opens.
    Accept,
    /// The connection fails with this reason.
    Refuse(String),
}

/// Shared state for scripting and inspection.
///
/// This allows injection from outside async contexts.
struct SharedState {
    /// Outcomes for upcoming opens, in order.
    script: VecDeque<ConnectOutcome>,
    /// Outcome once the script runs out.
    fallback: ConnectOutcome,
    /// Events not yet read by the runtime.
    events: VecDeque<TransportEvent>,
    /// Text frames the client sent.
    sent: Vec<String>,
    /// URL and time of every open.
    opens: Vec<(String, Instant)>,
    /// Client-initiated closes.
    closes: usize,
    /// A connection is currently open.
    open: bool,
}

/// Simulation driver for deterministic testing.
#[derive(Clone)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    wake: Arc<Notify>,
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDriver {
    /// Create a driver that accepts every connection.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SharedState {
                script: VecDeque::new(),
                fallback: ConnectOutcome::Accept,
                events: VecDeque::new(),
                sent: Vec::new(),
                opens: Vec::new(),
                closes: 0,
                open: false,
            })),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Create a driver that refuses every connection.
    pub fn refusing(reason: &str) -> Self {
        let driver = Self::new();
        driver.set_fallback(ConnectOutcome::Refuse(reason.to_string()));
        driver
    }

    fn state(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push_event(&self, event: TransportEvent) {
        self.state().events.push_back(event);
        self.wake.notify_one();
    }

    /// Queue the outcome of an upcoming open.
    pub fn script(&self, outcome: ConnectOutcome) {
        self.state().script.push_back(outcome);
    }

    /// Outcome of opens once the script is used up.
    pub fn set_fallback(&self, outcome: ConnectOutcome) {
        self.state().fallback = outcome;
    }

    /// Deliver a raw text frame to the client.
    pub fn inject_text(&self, text: &str) {
        self.push_event(TransportEvent::Frame(text.to_string()));
    }

    /// Deliver a typed frame to the client.
    pub fn inject_frame(&self, frame: &ServerFrame) {
        match frame.encode() {
            Ok(text) => self.inject_text(&text),
            Err(e) => tracing::error!(error = %e, "failed to encode injected frame"),
        }
    }

    /// Drop the open connection from the hub side.
    pub fn drop_connection(&self, reason: &str) {
        {
            let mut state = self.state();
            if !state.open {
                return;
            }
            state.open = false;
        }
        self.push_event(TransportEvent::Closed { reason: reason.to_string() });
    }

    /// Raw frames the client sent, oldest first.
    pub fn sent_text(&self) -> Vec<String> {
        self.state().sent.clone()
    }

    /// Frames the client sent, decoded. Undecodable frames are skipped.
    pub fn sent_frames(&self) -> Vec<ClientFrame> {
        self.state().sent.iter().filter_map(|text| ClientFrame::decode(text).ok()).collect()
    }

    /// Forget recorded sends.
    pub fn clear_sent(&self) {
        self.state().sent.clear();
    }

    /// Virtual time of every open, oldest first.
    pub fn open_times(&self) -> Vec<Instant> {
        self.state().opens.iter().map(|(_, at)| *at).collect()
    }

    /// URL of every open, oldest first.
    pub fn open_urls(&self) -> Vec<String> {
        self.state().opens.iter().map(|(url, _)| url.clone()).collect()
    }

    /// Number of client-initiated closes.
    pub fn close_count(&self) -> usize {
        self.state().closes
    }

    /// Whether a connection is open.
    pub fn is_open(&self) -> bool {
        self.state().open
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    fn open(&mut self, url: &str) {
        let event = {
            let mut state = self.state();
            state.events.clear();
            state.opens.push((url.to_string(), Instant::now()));

            let outcome = state.script.pop_front().unwrap_or_else(|| state.fallback.clone());
            match outcome {
                ConnectOutcome::Accept => {
                    state.open = true;
                    TransportEvent::Opened
                },
                ConnectOutcome::Refuse(reason) => {
                    state.open = false;
                    TransportEvent::Closed { reason }
                },
            }
        };
        self.push_event(event);
    }

    fn send(&mut self, text: String) -> Result<(), SimDriverError> {
        let mut state = self.state();
        if !state.open {
            return Err(SimDriverError::NotConnected);
        }
        state.sent.push(text);
        Ok(())
    }

    async fn next_event(&mut self) -> TransportEvent {
        loop {
            let event = self.state().events.pop_front();
            if let Some(event) = event {
                return event;
            }
            self.wake.notified().await;
        }
    }

    fn close(&mut self) {
        let mut state = self.state();
        state.open = false;
        state.events.clear();
        state.closes += 1;
    }
}
