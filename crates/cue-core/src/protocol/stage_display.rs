//! JSON message types for the stage display WebSocket protocol.
//!
//! The presentation tool exposes the slides it is showing through a
//! WebSocket endpoint (`ws://host:port/stagedisplay`).  Every frame is a JSON
//! object whose `"acn"` (action code) field identifies the message kind; all
//! other fields sit next to it in the same object:
//!
//! ```json
//! {"acn":"ath","pwd":"secret","ptl":610}
//! {"acn":"fv","ary":[{"acn":"cs","txt":"Amazing grace"}]}
//! ```
//!
//! Serde's `#[serde(tag = "acn")]` attribute handles this automatically.
//!
//! # Message flow
//!
//! ```text
//! Bridge → Tool:  StageRequest  →  JSON text frame
//! Tool   → Bridge: JSON text frame  →  StageEvent
//! ```
//!
//! Two enums keep the directions apart: the bridge never has to decode its
//! own requests, and it never sends a pushed notification.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Protocol version announced in the authentication request.
pub const PROTOCOL_VERSION: u32 = 610;

/// Field-value sub-codes the router cares about.
pub mod field_codes {
    /// Raw text of the current slide.
    pub const CURRENT_SLIDE: &str = "cs";
    /// Annotation (slide notes) of the current slide.
    pub const CURRENT_SLIDE_NOTES: &str = "csn";
    /// Raw text of the next slide.
    pub const NEXT_SLIDE: &str = "ns";
    /// Annotation (slide notes) of the next slide.
    pub const NEXT_SLIDE_NOTES: &str = "nsn";
}

// ── Tool → Bridge messages ────────────────────────────────────────────────────

/// All messages the bridge understands from the presentation tool.
///
/// Any action code not listed here decodes to [`StageEvent::Unrecognized`]
/// so that new protocol messages never break the connection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "acn")]
pub enum StageEvent {
    /// Reply to the authentication request.
    #[serde(rename = "ath")]
    AuthResult {
        /// `true` when the password was accepted.
        #[serde(default)]
        ath: bool,
        /// Optional human-readable reason sent with a rejection.
        #[serde(default)]
        err: Option<String>,
    },

    /// Reply to the active-layout list request.
    #[serde(rename = "asl")]
    ActiveLayouts {
        #[serde(default)]
        ary: Vec<LayoutRef>,
    },

    /// Pushed when the operator switches the stage display layout.
    #[serde(rename = "psl")]
    LayoutPushed {
        #[serde(default)]
        uid: Option<String>,
    },

    /// Current contents of every field in a layout.
    ///
    /// Entries that are not field objects are skipped, so one odd field never
    /// hides the slide text next to it.
    #[serde(rename = "fv")]
    FieldValues {
        #[serde(default, deserialize_with = "lenient_field_values")]
        ary: Vec<FieldValue>,
    },

    /// Any other action code (clock ticks, timers, messages, ...).
    #[serde(other)]
    Unrecognized,
}

impl StageEvent {
    /// Decodes one text frame.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] when the frame is not JSON,
    /// has no `"acn"` field, or a recognised message has fields of the wrong
    /// type.  Inside a field-value array only the array itself must be
    /// well-formed.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// One entry of an active-layout list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayoutRef {
    #[serde(default)]
    pub uid: Option<String>,
}

/// One field of a field-value result.
///
/// `acn` is the field sub-code (see [`field_codes`]) and `txt` its text, which
/// some fields (clocks, images) never carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub acn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txt: Option<String>,
}

impl FieldValue {
    /// Convenience constructor used by tests and fixtures.
    pub fn new(acn: impl Into<String>, txt: impl Into<String>) -> Self {
        Self {
            acn: acn.into(),
            txt: Some(txt.into()),
        }
    }

    /// Reads one array entry.  `None` unless it is an object with a string
    /// `acn`; a `txt` that is not a string counts as absent.
    fn from_value(value: &Value) -> Option<Self> {
        let acn = value.get("acn")?.as_str()?.to_string();
        let txt = value.get("txt").and_then(Value::as_str).map(str::to_string);
        Some(Self { acn, txt })
    }
}

fn lenient_field_values<'de, D>(deserializer: D) -> Result<Vec<FieldValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<Value>::deserialize(deserializer)?;
    Ok(entries.iter().filter_map(FieldValue::from_value).collect())
}

// ── Bridge → Tool messages ────────────────────────────────────────────────────

/// All requests the bridge sends to the presentation tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "acn")]
pub enum StageRequest {
    /// First message after the WebSocket opens.
    #[serde(rename = "ath")]
    Authenticate {
        /// Stage display password configured in the presentation tool.
        pwd: String,
        /// Protocol version, always [`PROTOCOL_VERSION`].
        ptl: u32,
    },

    /// Asks which stage display layout is currently active.
    #[serde(rename = "asl")]
    ActiveLayouts,

    /// Asks for the current field values of a layout.
    #[serde(rename = "fv")]
    FieldValues { uid: String },
}

impl StageRequest {
    /// Builds the authentication request for `password`.
    pub fn authenticate(password: impl Into<String>) -> Self {
        Self::Authenticate {
            pwd: password.into(),
            ptl: PROTOCOL_VERSION,
        }
    }

    /// Returns the action code of this request.
    ///
    /// Used in log lines instead of `Debug` so the password never reaches
    /// the log output.
    pub fn action_code(&self) -> &'static str {
        match self {
            Self::Authenticate { .. } => "ath",
            Self::ActiveLayouts => "asl",
            Self::FieldValues { .. } => "fv",
        }
    }

    /// Encodes the request as a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`]; with the current variants
    /// this cannot happen, but the signature keeps the codec honest.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Outbound encoding ─────────────────────────────────────────────────────

    #[test]
    fn test_authenticate_request_carries_password_and_protocol_version() {
        // Arrange
        let req = StageRequest::authenticate("hunter2");

        // Act
        let json: serde_json::Value = serde_json::from_str(&req.to_json().unwrap()).unwrap();

        // Assert
        assert_eq!(json["acn"], "ath");
        assert_eq!(json["pwd"], "hunter2");
        assert_eq!(json["ptl"], 610);
    }

    #[test]
    fn test_active_layouts_request_is_bare_action_code() {
        let json = StageRequest::ActiveLayouts.to_json().unwrap();
        assert_eq!(json, r#"{"acn":"asl"}"#);
    }

    #[test]
    fn test_field_values_request_carries_uid() {
        let req = StageRequest::FieldValues {
            uid: "4C7B-11".to_string(),
        };
        let json: serde_json::Value = serde_json::from_str(&req.to_json().unwrap()).unwrap();
        assert_eq!(json["acn"], "fv");
        assert_eq!(json["uid"], "4C7B-11");
    }

    #[test]
    fn test_action_code_does_not_expose_password() {
        let req = StageRequest::authenticate("secret!");
        let code = req.action_code();
        assert_eq!(code, "ath");
        assert!(!code.contains("secret"));
    }

    // ── Inbound decoding ──────────────────────────────────────────────────────

    #[test]
    fn test_decode_auth_success() {
        let ev = StageEvent::from_json(r#"{"acn":"ath","ath":true,"err":""}"#).unwrap();
        assert!(matches!(ev, StageEvent::AuthResult { ath: true, .. }));
    }

    #[test]
    fn test_decode_auth_failure_keeps_reason() {
        let ev = StageEvent::from_json(r#"{"acn":"ath","ath":false,"err":"Invalid Password"}"#)
            .unwrap();
        assert_eq!(
            ev,
            StageEvent::AuthResult {
                ath: false,
                err: Some("Invalid Password".to_string()),
            }
        );
    }

    #[test]
    fn test_decode_auth_without_flag_is_failure() {
        let ev = StageEvent::from_json(r#"{"acn":"ath"}"#).unwrap();
        assert!(matches!(ev, StageEvent::AuthResult { ath: false, .. }));
    }

    #[test]
    fn test_decode_active_layouts_list() {
        let ev = StageEvent::from_json(r#"{"acn":"asl","ary":[{"uid":"L1","nme":"Default"},{"uid":"L2"}]}"#)
            .unwrap();
        match ev {
            StageEvent::ActiveLayouts { ary } => {
                assert_eq!(ary.len(), 2);
                assert_eq!(ary[0].uid.as_deref(), Some("L1"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_decode_layout_push_without_uid() {
        let ev = StageEvent::from_json(r#"{"acn":"psl"}"#).unwrap();
        assert_eq!(ev, StageEvent::LayoutPushed { uid: None });
    }

    #[test]
    fn test_decode_field_values_ignores_extra_fields() {
        let ev = StageEvent::from_json(
            r#"{"acn":"fv","uid":"L1","ary":[{"acn":"cs","uid":"x","txt":"Hello"},{"acn":"clk"}]}"#,
        )
        .unwrap();
        match ev {
            StageEvent::FieldValues { ary } => {
                assert_eq!(ary[0], FieldValue::new("cs", "Hello"));
                assert_eq!(ary[1].txt, None);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_decode_unknown_action_code_is_unrecognized() {
        let ev = StageEvent::from_json(r#"{"acn":"sys","txt":"12:00"}"#).unwrap();
        assert_eq!(ev, StageEvent::Unrecognized);
    }

    #[test]
    fn test_decode_missing_action_code_is_error() {
        assert!(StageEvent::from_json(r#"{"ath":true}"#).is_err());
    }

    #[test]
    fn test_decode_invalid_json_is_error() {
        assert!(StageEvent::from_json("not json").is_err());
    }

    #[test]
    fn test_decode_field_values_skips_entries_without_action_code() {
        // Arrange
        let frame = r#"{"acn":"fv","ary":[{"acn":"cs","txt":"Hi"},{"uid":"x"},7,{"acn":3}]}"#;

        // Act
        let ev = StageEvent::from_json(frame).unwrap();

        // Assert
        assert_eq!(
            ev,
            StageEvent::FieldValues {
                ary: vec![FieldValue::new("cs", "Hi")]
            }
        );
    }

    #[test]
    fn test_decode_field_values_non_string_text_counts_as_absent() {
        let ev = StageEvent::from_json(
            r#"{"acn":"fv","ary":[{"acn":"clk","txt":1042},{"acn":"ns","txt":"Next"}]}"#,
        )
        .unwrap();
        match ev {
            StageEvent::FieldValues { ary } => {
                assert_eq!(ary.len(), 2);
                assert_eq!(ary[0].acn, "clk");
                assert_eq!(ary[0].txt, None);
                assert_eq!(ary[1], FieldValue::new("ns", "Next"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_decode_field_values_without_array_is_empty() {
        let ev = StageEvent::from_json(r#"{"acn":"fv"}"#).unwrap();
        assert_eq!(ev, StageEvent::FieldValues { ary: vec![] });
    }

    #[test]
    fn test_decode_field_values_with_wrong_array_type_is_error() {
        assert!(StageEvent::from_json(r#"{"acn":"fv","ary":"oops"}"#).is_err());
    }
}
