//! Property-based tests for inbound frame decoding.
//!
//! The client feeds every text frame the hub sends through
//! `ServerFrame::decode`, so decoding must classify arbitrary input without
//! panicking and must never accept a frame whose `type` is unknown.

use pulsewire_proto::{ClientFrame, ProtocolError, ServerFrame};
use proptest::prelude::*;

/// Strategy for identifier-like strings, including awkward characters.
fn ident() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_\\-\"\\\\ é]{0,12}"
}

proptest! {
    #[test]
    fn prop_decode_never_panics(text in any::<String>()) {
        let _ = ServerFrame::decode(&text);
    }

    #[test]
    fn prop_unknown_type_is_rejected(kind in "[a-z_]{1,16}", user in ident()) {
        prop_assume!(!ServerFrame::KINDS.contains(&kind.as_str()));

        let text = serde_json::json!({ "type": kind, "userId": user }).to_string();
        prop_assert_eq!(ServerFrame::decode(&text), Err(ProtocolError::UnknownType(Some(kind))));
    }

    #[test]
    fn prop_typing_frame_preserves_identifiers(channel in ident(), user in ident()) {
        let text = serde_json::json!({
            "type": "user_typing",
            "channelId": channel,
            "userId": user,
            "sentAt": 1_700_000_000u64,
        })
        .to_string();

        let frame = ServerFrame::decode(&text).unwrap();
        prop_assert_eq!(frame, ServerFrame::UserTyping { channel_id: channel, user_id: user });
    }

    #[test]
    fn prop_outbound_frames_are_single_json_objects(
        channel in ident(),
        content in any::<String>(),
    ) {
        let frame = ClientFrame::Message { channel_id: channel, content };
        let text = frame.encode().unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        prop_assert!(value.is_object());
        prop_assert_eq!(value["type"].as_str(), Some("message"));
        prop_assert_eq!(ClientFrame::decode(&text).unwrap(), frame);
    }
}
