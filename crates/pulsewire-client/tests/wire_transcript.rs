//! Exact wire output of a client session.

use pulsewire_client::{Client, ClientAction, ClientConfig, ClientEvent};
use pulsewire_harness::SimEnv;

fn transcript(actions: &[ClientAction]) -> String {
    actions
        .iter()
        .filter_map(|action| match action {
            ClientAction::Send(frame) => Some(frame.encode().unwrap()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn session_frames() {
    let mut client = Client::new(SimEnv::with_seed(3), ClientConfig::new("nurse-12"));
    let mut actions = client.handle(ClientEvent::Connect).unwrap();

    for event in [
        ClientEvent::Opened,
        ClientEvent::Join { channel_id: "icu-night".into() },
        ClientEvent::SendTyping { channel_id: "icu-night".into() },
        ClientEvent::SendMessage { channel_id: "icu-night".into(), content: "bed 4 stable".into() },
        ClientEvent::Leave { channel_id: "icu-night".into() },
    ] {
        actions.extend(client.handle(event).unwrap());
    }

    insta::assert_snapshot!(transcript(&actions), @r#"
    {"type":"auth","userId":"nurse-12"}
    {"type":"join","channelId":"icu-night"}
    {"type":"typing","channelId":"icu-night"}
    {"type":"message","channelId":"icu-night","content":"bed 4 stable"}
    {"type":"leave","channelId":"icu-night"}
    "#);
}

#[test]
fn rejoin_after_reconnect() {
    let env = SimEnv::with_seed(3);
    let mut client = Client::new(env, ClientConfig::new("nurse-12"));
    client.handle(ClientEvent::Connect).unwrap();
    client.handle(ClientEvent::Opened).unwrap();
    client.handle(ClientEvent::Join { channel_id: "pharmacy".into() }).unwrap();
    client.handle(ClientEvent::Join { channel_id: "icu-night".into() }).unwrap();

    client.handle(ClientEvent::Closed { reason: "idle timeout".into() }).unwrap();
    let deadline = client.next_deadline().unwrap();
    client.handle(ClientEvent::Tick { now: deadline }).unwrap();
    let actions = client.handle(ClientEvent::Opened).unwrap();

    insta::assert_snapshot!(transcript(&actions), @r#"
    {"type":"auth","userId":"nurse-12"}
    {"type":"join","channelId":"icu-night"}
    {"type":"join","channelId":"pharmacy"}
    "#);
}
