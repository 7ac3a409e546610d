//! Integration tests: realistic stage display frames through decode and routing.
//!
//! These tests feed complete JSON frames, shaped like the ones a presentation
//! tool sends on its stage display socket, through the public API in the same
//! order the bridge does:
//!
//! ```text
//! JSON text frame → StageEvent::from_json → select_text_pair → TextPair
//!                                                 ↓
//!                              OscMessage::string(primary, current) → bytes
//! ```

use cue_core::{
    decode_message, encode_message, select_text_pair, AddressGroup, OscArg, OscMessage,
    StageEvent,
};

/// A field-value frame as sent for a layout showing current + next slide and
/// their notes, plus a clock and a message field the bridge ignores.
const FULL_LAYOUT_FRAME: &str = r#"{
    "acn": "fv",
    "uid": "FAB7A1E6-5C65-4E8B-9D0B-2C0C8E0D9C01",
    "ary": [
        {"acn": "cs",  "uid": "F1", "txt": "Amazing grace, how sweet the sound"},
        {"acn": "csn", "uid": "F2", "txt": "  Amazing Grace  "},
        {"acn": "ns",  "uid": "F3", "txt": "That saved a wretch like me"},
        {"acn": "nsn", "uid": "F4", "txt": ""},
        {"acn": "clk", "uid": "F5", "txt": "10:42"},
        {"acn": "msg", "uid": "F6"}
    ]
}"#;

fn field_values(frame: &str) -> Vec<cue_core::FieldValue> {
    match StageEvent::from_json(frame).expect("fixture must decode") {
        StageEvent::FieldValues { ary } => ary,
        other => panic!("expected field values, got {other:?}"),
    }
}

#[test]
fn test_full_layout_prefers_notes_for_current_slide() {
    // Arrange
    let fields = field_values(FULL_LAYOUT_FRAME);

    // Act
    let pair = select_text_pair(&fields).expect("current text present");

    // Assert
    assert_eq!(pair.current, "AMAZING GRACE");
}

#[test]
fn test_full_layout_empty_next_notes_still_win_over_next_slide_text() {
    // The next-slide notes field exists and carries text (the empty string),
    // so it is preferred over the raw next-slide text.
    let fields = field_values(FULL_LAYOUT_FRAME);
    let pair = select_text_pair(&fields).expect("current text present");
    assert_eq!(pair.next.as_deref(), Some(""));
}

#[test]
fn test_clock_only_frame_routes_nothing() {
    let fields = field_values(r#"{"acn":"fv","ary":[{"acn":"clk","txt":"10:42"}]}"#);
    assert!(select_text_pair(&fields).is_none());
}

#[test]
fn test_routed_text_encodes_to_primary_address_datagram() {
    // Arrange
    let fields = field_values(r#"{"acn":"fv","ary":[{"acn":"cs","txt":"Hello"}]}"#);
    let group = AddressGroup::new(["/composition/layers/3/clips/1/video/source/textgenerator/text/params/lines"])
        .expect("valid group");
    let pair = select_text_pair(&fields).expect("current text present");

    // Act
    let bytes = encode_message(&OscMessage::string(group.primary(), pair.current))
        .expect("encodable");

    // Assert: what the receiving application decodes
    let decoded = decode_message(&bytes).expect("decodable");
    assert_eq!(decoded.address, group.primary());
    assert_eq!(decoded.args, vec![OscArg::Str("HELLO".to_string())]);
}

#[test]
fn test_unrelated_frames_decode_without_error() {
    for frame in [
        r#"{"acn":"sys","txt":" 10:42 AM"}"#,
        r#"{"acn":"tmr","uid":"T1","txt":"00:05:00"}"#,
        r#"{"acn":"msg","txt":""}"#,
    ] {
        assert_eq!(StageEvent::from_json(frame).unwrap(), StageEvent::Unrecognized);
    }
}
