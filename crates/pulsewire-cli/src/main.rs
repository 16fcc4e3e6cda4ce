//! Pulsewire terminal client.
//!
//! # Usage
//!
//! ```bash
//! # Connect as u1 and join two channels
//! pulsewire --user u1 --channel icu-night --channel pharmacy
//!
//! # Different hub, verbose logging
//! pulsewire --origin https://hub.example.org --user u1 --log-level debug
//! ```
//!
//! Lines typed on stdin are posted to the active channel. `/join <channel>`,
//! `/leave [channel]`, `/typing`, `/who` and `/quit` are commands.

use std::time::Duration;

use clap::Parser;
use pulsewire_cli::{Command, Printer, Session};
use pulsewire_client::{
    ClientConfig, Jitter, RealtimeChannelClient, ReconnectPolicy, SystemEnv,
    transport::WebSocketDriver, websocket_url,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Pulsewire real-time channel client
#[derive(Parser, Debug)]
#[command(name = "pulsewire")]
#[command(about = "Terminal client for a Pulsewire real-time hub")]
#[command(version)]
struct Args {
    /// Page origin the hub is served from (http/https/ws/wss)
    #[arg(long, default_value = "http://localhost:5000")]
    origin: String,

    /// WebSocket path on the hub
    #[arg(long, default_value = pulsewire_client::DEFAULT_PATH)]
    path: String,

    /// User id to authenticate as
    #[arg(short, long)]
    user: String,

    /// Channel to join on connect (repeatable; the first is active)
    #[arg(short, long = "channel")]
    channels: Vec<String>,

    /// Minimum gap between typing signals per channel, in milliseconds
    #[arg(long, default_value = "2000")]
    typing_throttle_ms: u64,

    /// Randomize reconnect delays
    #[arg(long)]
    jitter: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

enum Input {
    Polled(bool),
    Line(Option<String>),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // stdout carries the conversation
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let url = websocket_url(&args.origin, Some(&args.path))?;
    tracing::info!(%url, user = %args.user, "connecting");

    let mut policy = ReconnectPolicy::default();
    if args.jitter {
        policy = policy.with_jitter(Jitter::Full);
    }
    let config = ClientConfig::new(args.user)
        .with_reconnect_policy(policy)
        .with_typing_throttle(Duration::from_millis(args.typing_throttle_ms));

    let mut client =
        RealtimeChannelClient::new(WebSocketDriver::new(), SystemEnv::new(), url.as_str(), config);
    let mut session = Session::new(args.channels);
    let mut printer = Printer::new(std::io::stdout());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let input = tokio::select! {
            alive = client.poll(&mut printer) => Input::Polled(alive),
            line = lines.next_line() => Input::Line(line?),
        };

        match input {
            Input::Polled(true) => {},
            Input::Polled(false) | Input::Line(None) => break,
            Input::Line(Some(line)) => match Command::parse(&line) {
                Ok(Some(command)) => {
                    if !session.execute(command, &mut client, &mut printer) {
                        break;
                    }
                },
                Ok(None) => {},
                Err(e) => printer.notice(&e.to_string()),
            },
        }

        session.reconcile(&mut client);
    }

    client.dispose();
    tracing::info!("disconnected");

    Ok(())
}
