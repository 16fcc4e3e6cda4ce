//! Fuzz target for the client state machine
//!
//! Drives `Client::handle` with arbitrary interleavings of transport events,
//! timer ticks, inbound frames and outbound intents.
//!
//! # Invariants
//!
//! - No frame is sent unless the connection is open, except the `auth` and
//!   rejoin frames that `Opened` itself produces
//! - A reconnect is never scheduled past the 5th consecutive failure
//! - Nothing but `Dispose` is accepted after dispose
//! - After a tick at `now`, no deadline at or before `now` is left pending

#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pulsewire_client::{Client, ClientAction, ClientConfig, ClientError, ClientEvent, Environment};
use pulsewire_harness::SimEnv;
use pulsewire_proto::ServerFrame;

#[derive(Debug, Arbitrary)]
struct Scenario {
    seed: u64,
    rejoin: bool,
    ops: Vec<Op>,
}

#[derive(Debug, Arbitrary)]
enum Op {
    Connect,
    Opened,
    Closed,
    TickAfter { millis: u16 },
    TickAtDeadline,
    Typing { channel: u8, user: u8 },
    Joined { user: u8 },
    Left { user: u8 },
    RawFrame(String),
    Join { channel: u8 },
    Leave { channel: u8 },
    Say { channel: u8 },
    Ping { channel: u8 },
    Dispose,
}

fn channel(n: u8) -> String {
    format!("c{}", n % 4)
}

fn user(n: u8) -> String {
    format!("u{}", n % 8)
}

fn frame(frame: &ServerFrame) -> String {
    frame.encode().expect("server frames encode")
}

fuzz_target!(|scenario: Scenario| {
    let env = SimEnv::with_seed(scenario.seed);
    let config = ClientConfig::new("me").with_rejoin_on_reconnect(scenario.rejoin);
    let mut client = Client::new(env.clone(), config);
    let start = env.now();
    let mut elapsed = Duration::ZERO;

    for op in scenario.ops {
        let connected_before = client.is_connected();
        let disposed_before = client.is_disposed();
        let is_opened = matches!(op, Op::Opened);
        let is_dispose = matches!(op, Op::Dispose);
        let mut ticked_at = None;

        let event = match op {
            Op::Connect => ClientEvent::Connect,
            Op::Opened => ClientEvent::Opened,
            Op::Closed => ClientEvent::Closed { reason: "fuzz".into() },
            Op::TickAfter { millis } => {
                elapsed += Duration::from_millis(u64::from(millis));
                ticked_at = Some(start + elapsed);
                ClientEvent::Tick { now: start + elapsed }
            },
            Op::TickAtDeadline => match client.next_deadline() {
                Some(deadline) => {
                    elapsed = elapsed.max(deadline - start);
                    ticked_at = Some(start + elapsed);
                    ClientEvent::Tick { now: start + elapsed }
                },
                None => continue,
            },
            Op::Typing { channel: c, user: u } => ClientEvent::FrameReceived(frame(
                &ServerFrame::UserTyping { channel_id: channel(c), user_id: user(u) },
            )),
            Op::Joined { user: u } => ClientEvent::FrameReceived(frame(
                &ServerFrame::UserJoined { channel_id: None, user_id: user(u) },
            )),
            Op::Left { user: u } => ClientEvent::FrameReceived(frame(
                &ServerFrame::UserLeft { channel_id: None, user_id: user(u) },
            )),
            Op::RawFrame(text) => ClientEvent::FrameReceived(text),
            Op::Join { channel: c } => ClientEvent::Join { channel_id: channel(c) },
            Op::Leave { channel: c } => ClientEvent::Leave { channel_id: channel(c) },
            Op::Say { channel: c } => {
                ClientEvent::SendMessage { channel_id: channel(c), content: "x".into() }
            },
            Op::Ping { channel: c } => ClientEvent::SendTyping { channel_id: channel(c) },
            Op::Dispose => ClientEvent::Dispose,
        };

        let actions = match client.handle(event) {
            Ok(actions) => actions,
            Err(ClientError::Disposed) => {
                assert!(disposed_before, "Disposed error from a live client");
                continue;
            },
            // Out-of-order transport events are contract violations, not panics
            Err(_) => continue,
        };

        if disposed_before {
            assert!(is_dispose && actions.is_empty(), "disposed client produced actions");
        }

        for action in &actions {
            match action {
                ClientAction::Send(_) => {
                    assert!(connected_before || is_opened, "sent while not connected: {action:?}");
                },
                ClientAction::ScheduleReconnect { attempt, .. } => {
                    assert!(*attempt <= 5, "reconnect scheduled past the limit: {attempt}");
                },
                _ => {},
            }
        }

        if let (Some(now), Some(deadline)) = (ticked_at, client.next_deadline()) {
            assert!(deadline > now, "deadline {deadline:?} left pending at {now:?}");
        }
    }
});
