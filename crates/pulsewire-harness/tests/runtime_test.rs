//! End-to-end tests of the runtime over the simulated transport.
//!
//! All tests run on a paused tokio clock, so every timing assertion is exact.

use std::time::Duration;

use pulsewire_client::{
    ChannelEvent, ClientConfig, ConnectionState, Jitter, RealtimeChannelClient, ReconnectPolicy,
};
use pulsewire_harness::{ConnectOutcome, SimDriver, SimEnv};
use pulsewire_proto::{ClientFrame, ServerFrame};

const URL: &str = "ws://hub.test/ws";

type TestClient = RealtimeChannelClient<SimDriver, SimEnv>;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn client(driver: &SimDriver, config: ClientConfig) -> TestClient {
    RealtimeChannelClient::new(driver.clone(), SimEnv::with_seed(42), URL, config)
}

/// Build a client and poll until it reports connected.
async fn connected(driver: &SimDriver) -> TestClient {
    let mut client = client(driver, ClientConfig::new("u1"));
    let mut events = Vec::new();
    assert!(client.poll(&mut events).await);
    assert_eq!(events, vec![ChannelEvent::ConnectionChanged { connected: true }]);
    client
}

fn gaps(times: &[tokio::time::Instant]) -> Vec<u128> {
    times.windows(2).map(|w| (w[1] - w[0]).as_millis()).collect()
}

fn typing(channel: &str, user: &str) -> ServerFrame {
    ServerFrame::UserTyping { channel_id: channel.into(), user_id: user.into() }
}

#[tokio::test(start_paused = true)]
async fn connects_and_authenticates() {
    let driver = SimDriver::new();
    let client = connected(&driver).await;

    assert!(client.is_connected());
    assert_eq!(client.state(), ConnectionState::Connected);
    assert_eq!(driver.open_urls(), vec![URL.to_string()]);
    assert_eq!(driver.sent_frames(), vec![ClientFrame::Auth { user_id: "u1".into() }]);
}

#[tokio::test(start_paused = true)]
async fn consecutive_failures_back_off_then_give_up() {
    let driver = SimDriver::refusing("connection refused");
    let mut client = client(&driver, ClientConfig::new("u1"));
    let mut events = Vec::new();

    client.run(&mut events).await;

    assert_eq!(gaps(&driver.open_times()), vec![1000, 2000, 4000, 8000, 16000]);
    assert_eq!(events, vec![ChannelEvent::ReconnectExhausted { attempts: 5 }]);
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert!(!client.is_connected());
    assert!(driver.sent_text().is_empty());
}

#[tokio::test(start_paused = true)]
async fn success_resets_backoff() {
    let driver = SimDriver::new();
    let mut client = connected(&driver).await;
    let mut events = Vec::new();

    // failure, failure, success
    driver.script(ConnectOutcome::Refuse("refused".into()));
    driver.script(ConnectOutcome::Accept);
    driver.drop_connection("hub restart");
    assert!(client.poll(&mut events).await);
    assert!(!client.is_connected());

    while !client.is_connected() {
        assert!(client.poll(&mut events).await);
    }
    assert_eq!(client.reconnect_attempts(), 0);

    // failure after success starts over at one second
    driver.drop_connection("hub restart");
    assert!(client.poll(&mut events).await);
    assert!(!client.is_connected());
    while !client.is_connected() {
        assert!(client.poll(&mut events).await);
    }

    assert_eq!(gaps(&driver.open_times()), vec![1000, 2000, 1000]);
    assert_eq!(events, vec![
        ChannelEvent::ConnectionChanged { connected: false },
        ChannelEvent::ConnectionChanged { connected: true },
        ChannelEvent::ConnectionChanged { connected: false },
        ChannelEvent::ConnectionChanged { connected: true },
    ]);
}

#[tokio::test(start_paused = true)]
async fn typing_expires_exactly_after_dwell() {
    let driver = SimDriver::new();
    let mut client = connected(&driver).await;
    let mut events = Vec::new();

    let start = tokio::time::Instant::now();
    driver.inject_frame(&typing("c1", "u2"));
    assert!(client.poll(&mut events).await);
    assert_eq!(client.typing_users("c1"), vec!["u2".to_string()]);

    assert!(client.poll(&mut events).await);
    assert_eq!(tokio::time::Instant::now() - start, ms(3000));
    assert!(client.typing_users("c1").is_empty());

    assert_eq!(events, vec![
        ChannelEvent::Typing { channel_id: "c1".into(), user_id: "u2".into() },
        ChannelEvent::TypingStopped { channel_id: "c1".into(), user_id: "u2".into() },
    ]);
}

#[tokio::test(start_paused = true)]
async fn typing_refresh_extends_expiry() {
    let driver = SimDriver::new();
    let mut client = connected(&driver).await;
    let mut events = Vec::new();

    let start = tokio::time::Instant::now();
    driver.inject_frame(&typing("c1", "u2"));
    client.poll(&mut events).await;

    tokio::time::advance(ms(2000)).await;
    driver.inject_frame(&typing("c1", "u2"));
    client.poll(&mut events).await;

    // Earlier deadline must not fire
    client.poll(&mut events).await;
    assert_eq!(tokio::time::Instant::now() - start, ms(5000));
    assert_eq!(events.last(), Some(&ChannelEvent::TypingStopped {
        channel_id: "c1".into(),
        user_id: "u2".into()
    }));
    assert_eq!(events.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn join_then_leave_reach_the_wire_in_order() {
    let driver = SimDriver::new();
    let mut client = connected(&driver).await;
    driver.clear_sent();

    client.join("c1");
    client.leave("c1");

    insta::assert_snapshot!(driver.sent_text().join("\n"), @r#"
    {"type":"join","channelId":"c1"}
    {"type":"leave","channelId":"c1"}
    "#);
}

#[tokio::test(start_paused = true)]
async fn outbound_calls_while_disconnected_send_nothing() {
    let driver = SimDriver::refusing("down");
    let mut client = client(&driver, ClientConfig::new("u1"));

    client.join("c1");
    client.send_message("c1", "hello?");
    client.send_typing("c1");
    client.leave("c1");

    assert!(driver.sent_text().is_empty());
    assert_eq!(client.channels().count(), 0);
}

#[tokio::test(start_paused = true)]
async fn presence_scenario_nets_out() {
    let driver = SimDriver::new();
    let mut client = connected(&driver).await;
    let mut events = Vec::new();

    let joined = ServerFrame::UserJoined { channel_id: None, user_id: "u7".into() };
    driver.inject_frame(&joined);
    driver.inject_frame(&joined);
    driver.inject_frame(&ServerFrame::UserLeft { channel_id: None, user_id: "u7".into() });
    for _ in 0..3 {
        client.poll(&mut events).await;
    }

    assert!(!client.is_online("u7"));
    assert_eq!(events.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn malformed_frames_invoke_no_handler() {
    let driver = SimDriver::new();
    let mut client = connected(&driver).await;
    let mut events = Vec::new();

    for text in ["{not json", r#"{"type":"stats_update"}"#, r#"{"type":"warning"}"#, "null"] {
        driver.inject_text(text);
        assert!(client.poll(&mut events).await);
    }

    assert!(events.is_empty());
    assert!(client.is_connected());
    assert!(client.online_users().is_empty());
}

#[tokio::test(start_paused = true)]
async fn message_and_warning_reach_handler() {
    let driver = SimDriver::new();
    let mut client = connected(&driver).await;
    let mut events = Vec::new();

    driver.inject_text(
        r#"{"type":"new_message","message":{"id":"m1","channelId":"c1","senderId":"u2","content":"on call tonight?"}}"#,
    );
    driver.inject_frame(&ServerFrame::Warning { message: "Quiet hours".into() });
    client.poll(&mut events).await;
    client.poll(&mut events).await;

    let [ChannelEvent::Message(message), ChannelEvent::Warning { message: notice }] =
        events.as_slice()
    else {
        panic!("unexpected events: {events:?}");
    };
    assert_eq!(message.content, "on call tonight?");
    assert_eq!(message.channel_id, "c1");
    assert_eq!(notice, "Quiet hours");
}

#[tokio::test(start_paused = true)]
async fn reconnect_rejoins_after_auth() {
    let driver = SimDriver::new();
    let mut client = connected(&driver).await;
    let mut events = Vec::new();
    client.join("c2");
    client.join("c1");

    driver.drop_connection("hub restart");
    client.poll(&mut events).await;
    assert!(!client.is_connected());
    driver.clear_sent();
    while !client.is_connected() {
        client.poll(&mut events).await;
    }

    assert_eq!(driver.sent_frames(), vec![
        ClientFrame::Auth { user_id: "u1".into() },
        ClientFrame::Join { channel_id: "c1".into() },
        ClientFrame::Join { channel_id: "c2".into() },
    ]);
}

#[tokio::test(start_paused = true)]
async fn join_lost_to_dead_socket_goes_out_on_rejoin() {
    let driver = SimDriver::new();
    let mut client = connected(&driver).await;
    let mut events = Vec::new();
    driver.clear_sent();

    // Socket is gone but the close has not been polled yet
    driver.drop_connection("hub restart");
    client.join("c1");
    assert!(driver.sent_text().is_empty());
    assert_eq!(client.channels().collect::<Vec<_>>(), vec!["c1"]);

    while !client.is_connected() {
        assert!(client.poll(&mut events).await);
    }

    assert_eq!(driver.sent_frames(), vec![
        ClientFrame::Auth { user_id: "u1".into() },
        ClientFrame::Join { channel_id: "c1".into() },
    ]);
}

#[tokio::test(start_paused = true)]
async fn typing_signal_is_throttled() {
    let driver = SimDriver::new();
    let mut client = connected(&driver).await;
    driver.clear_sent();

    client.send_typing("c1");
    client.send_typing("c1");
    tokio::time::advance(ms(2000)).await;
    client.send_typing("c1");

    assert_eq!(driver.sent_frames(), vec![
        ClientFrame::Typing { channel_id: "c1".into() },
        ClientFrame::Typing { channel_id: "c1".into() },
    ]);
}

#[tokio::test(start_paused = true)]
async fn dispose_stops_everything() {
    let driver = SimDriver::new();
    let mut client = connected(&driver).await;
    let mut events = Vec::new();

    driver.inject_frame(&typing("c1", "u2"));
    client.poll(&mut events).await;
    events.clear();

    client.dispose();
    driver.clear_sent();

    assert_eq!(driver.close_count(), 1);
    assert_eq!(client.state(), ConnectionState::Closed);
    assert!(client.typing_users("c1").is_empty());

    client.send_message("c1", "anyone?");
    assert!(!client.poll(&mut events).await);
    assert!(events.is_empty());
    assert!(driver.sent_text().is_empty());

    // idempotent
    client.dispose();
    assert_eq!(driver.close_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn dispose_while_waiting_cancels_reconnect() {
    let driver = SimDriver::new();
    let mut client = connected(&driver).await;
    let mut events = Vec::new();

    driver.drop_connection("drop");
    client.poll(&mut events).await;
    assert_eq!(client.state(), ConnectionState::Disconnected);

    client.dispose();
    tokio::time::advance(ms(60_000)).await;

    assert!(!client.poll(&mut events).await);
    assert_eq!(driver.open_times().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn drop_closes_transport() {
    let driver = SimDriver::new();
    let client = connected(&driver).await;

    drop(client);

    assert_eq!(driver.close_count(), 1);
    assert!(!driver.is_open());
}

#[tokio::test(start_paused = true)]
async fn jittered_backoff_is_bounded_and_reproducible() {
    let config = ClientConfig::new("u1")
        .with_reconnect_policy(ReconnectPolicy::default().with_jitter(Jitter::Full));

    let mut runs = Vec::new();
    for _ in 0..2 {
        let driver = SimDriver::refusing("refused");
        let mut client = client(&driver, config.clone());
        client.run(&mut ()).await;
        runs.push(gaps(&driver.open_times()));
    }

    assert_eq!(runs[0], runs[1]);
    for (attempt, gap) in runs[0].iter().enumerate() {
        assert!(*gap <= 1000 << attempt, "attempt {attempt}: {gap}ms");
    }
}
