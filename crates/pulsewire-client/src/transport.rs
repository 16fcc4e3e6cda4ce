//! WebSocket transport for the client.
//!
//! Provides [`WebSocketDriver`], which handles socket I/O for text frames.
//! This is a thin layer that just sends and receives frames; protocol logic
//! remains in the Sans-IO [`crate::Client`].
//!
//! Each [`Driver::open`] spawns one task for that connection attempt. The
//! task reports `Opened`, inbound frames and a final `Closed` on a shared
//! event channel, tagged with the attempt's generation so events from a
//! superseded socket are dropped.
//!
//! [`Driver::close`] hangs up the outbound queue instead of killing the task:
//! frames already queued are written, then a Close frame goes out. A new
//! [`Driver::open`] aborts the previous attempt outright.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{sync::mpsc, task::AbortHandle};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::driver::{Driver, TransportEvent};

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No connection is open.
    #[error("not connected")]
    NotConnected,

    /// The connection task has already exited.
    #[error("connection closed")]
    Closed,
}

type Tagged = (u64, TransportEvent);

/// [`Driver`] backed by tokio-tungstenite.
///
/// Must be used from within a tokio runtime.
pub struct WebSocketDriver {
    /// Attempt counter; events carrying an older value are stale.
    generation: u64,
    /// Outbound queue of the current connection.
    outbound: Option<mpsc::UnboundedSender<String>>,
    /// Connection task of the current attempt.
    task: Option<AbortHandle>,
    events_tx: mpsc::UnboundedSender<Tagged>,
    events_rx: mpsc::UnboundedReceiver<Tagged>,
}

impl Default for WebSocketDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl WebSocketDriver {
    /// Create a driver with no open connection.
    pub fn new() -> Self {
        // Another component may have installed a provider already
        let _ = rustls::crypto::ring::default_provider().install_default();

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self { generation: 0, outbound: None, task: None, events_tx, events_rx }
    }

    /// Let the current task drain its queue and send Close.
    fn release(&mut self) {
        self.generation += 1;
        self.outbound = None;
        self.task = None;
    }

    /// Kill the current task where it stands.
    fn abort(&mut self) {
        let task = self.task.take();
        self.release();
        if let Some(task) = task {
            task.abort();
        }
    }
}

impl Driver for WebSocketDriver {
    type Error = TransportError;

    fn open(&mut self, url: &str) {
        self.abort();

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_connection(
            url.to_string(),
            self.generation,
            outbound_rx,
            self.events_tx.clone(),
        ));

        self.outbound = Some(outbound_tx);
        self.task = Some(handle.abort_handle());
    }

    fn send(&mut self, text: String) -> Result<(), TransportError> {
        let outbound = self.outbound.as_ref().ok_or(TransportError::NotConnected)?;
        outbound.send(text).map_err(|_| TransportError::Closed)
    }

    async fn next_event(&mut self) -> TransportEvent {
        loop {
            match self.events_rx.recv().await {
                Some((generation, event)) if generation == self.generation => return event,
                Some(_) => {},
                // Unreachable while we hold `events_tx`
                None => std::future::pending::<()>().await,
            }
        }
    }

    fn close(&mut self) {
        self.release();
    }
}

impl Drop for WebSocketDriver {
    fn drop(&mut self) {
        self.release();
    }
}

/// Run one connection attempt, bridging between the channels and the socket.
async fn run_connection(
    url: String,
    generation: u64,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<Tagged>,
) {
    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            let _ = events.send((generation, TransportEvent::Closed { reason: e.to_string() }));
            return;
        },
    };

    if events.send((generation, TransportEvent::Opened)).is_err() {
        return;
    }

    let (mut write, mut read) = stream.split();

    let reason = loop {
        tokio::select! {
            text = outbound.recv() => match text {
                Some(text) => {
                    if let Err(e) = write.send(Message::text(text)).await {
                        break e.to_string();
                    }
                },
                None => {
                    let _ = write.send(Message::Close(None)).await;
                    break "closed by client".to_string();
                },
            },
            message = read.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    let frame = TransportEvent::Frame(text.as_str().to_owned());
                    if events.send((generation, frame)).is_err() {
                        return;
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    break frame.map_or_else(
                        || "closed by server".to_string(),
                        |f| {
                            let code = u16::from(f.code);
                            format!("closed by server ({code}): {}", f.reason.as_str())
                        },
                    );
                },
                // Pings are answered by tungstenite; binary frames are not part
                // of the protocol
                Some(Ok(_)) => {},
                Some(Err(e)) => break e.to_string(),
                None => break "stream ended".to_string(),
            },
        }
    };

    let _ = events.send((generation, TransportEvent::Closed { reason }));
}
