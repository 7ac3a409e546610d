//! Text selection rules for field-value updates.
//!
//! A field-value result lists every field of the active stage display layout.
//! Only four of them matter to the bridge:
//!
//! | Sub-code | Meaning                     |
//! |----------|-----------------------------|
//! | `csn`    | notes of the current slide  |
//! | `cs`     | text of the current slide   |
//! | `nsn`    | notes of the next slide     |
//! | `ns`     | text of the next slide      |
//!
//! Operators write the lyric or caption they want published into the slide
//! notes when the slide text itself is unsuitable, so notes always win over
//! slide text.  This choice is made independently for the current and the
//! next slide.

use crate::protocol::stage_display::{field_codes, FieldValue};

/// The text to publish for one field-value update, already normalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPair {
    /// Text of the slide on screen now.
    pub current: String,
    /// Text of the upcoming slide, when the layout carries it.
    pub next: Option<String>,
}

/// Picks the current and next text out of a field-value array.
///
/// Returns `None` when there is no current-slide text to publish: neither `csn`
/// nor `cs` carries text, or the selected text is the empty string.  Both
/// texts go through [`normalize_text`].
///
/// # Examples
///
/// ```rust
/// use cue_core::{select_text_pair, FieldValue};
///
/// let fields = vec![
///     FieldValue::new("cs", "slide text"),
///     FieldValue::new("csn", " Amazing grace "),
/// ];
/// let pair = select_text_pair(&fields).unwrap();
/// assert_eq!(pair.current, "AMAZING GRACE");
/// assert_eq!(pair.next, None);
/// ```
pub fn select_text_pair(fields: &[FieldValue]) -> Option<TextPair> {
    let current = preferred_text(
        fields,
        field_codes::CURRENT_SLIDE_NOTES,
        field_codes::CURRENT_SLIDE,
    );

    let current = match current {
        Some(text) if !text.is_empty() => text,
        _ => {
            tracing::trace!("field values carry no current slide text; nothing to route");
            return None;
        }
    };

    let next = preferred_text(fields, field_codes::NEXT_SLIDE_NOTES, field_codes::NEXT_SLIDE);

    Some(TextPair {
        current: normalize_text(current),
        next: next.map(normalize_text),
    })
}

/// Trims surrounding whitespace and upper-cases the text.
pub fn normalize_text(text: &str) -> String {
    text.trim().to_uppercase()
}

/// Text of the first `preferred` field, else of the first `fallback` field.
fn preferred_text<'a>(fields: &'a [FieldValue], preferred: &str, fallback: &str) -> Option<&'a str> {
    field_text(fields, preferred).or_else(|| field_text(fields, fallback))
}

fn field_text<'a>(fields: &'a [FieldValue], code: &str) -> Option<&'a str> {
    fields
        .iter()
        .filter(|f| f.acn == code)
        .find_map(|f| f.txt.as_deref())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
