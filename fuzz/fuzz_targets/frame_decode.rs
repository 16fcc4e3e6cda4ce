//! Fuzz target for inbound and outbound frame decoding
//!
//! Feeds arbitrary text to both decoders to find:
//! - Parser panics on deeply nested or truncated JSON
//! - Tagged-enum edge cases (missing, duplicated or non-string `type`)
//! - Frames that decode but fail to re-encode
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pulsewire_proto::{ClientFrame, ServerFrame};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    if let Ok(frame) = ServerFrame::decode(&text) {
        let encoded = frame.encode().expect("decoded frame must re-encode");
        assert!(ServerFrame::decode(&encoded).is_ok(), "re-encoded frame must decode: {encoded}");
    }

    let _ = ClientFrame::decode(&text);
});
