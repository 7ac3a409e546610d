//! Binary codec for OSC 1.0 messages.
//!
//! Wire format of one message (every field padded with NULs to a multiple of
//! four bytes):
//! ```text
//! [address: OSC-string][type tags: OSC-string starting with ','][arguments...]
//! ```
//! - `i` – 32-bit big-endian two's complement integer
//! - `f` – 32-bit big-endian IEEE 754 float
//! - `s` – NUL-terminated ASCII/UTF-8 string, padded to 4 bytes
//! - `T` / `F` – boolean, no argument bytes
//!
//! Bundles (`#bundle`) are not produced by the bridge and are rejected on
//! decode.

use thiserror::Error;

/// Errors that can occur during OSC encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum OscError {
    /// The address pattern does not start with `/`.
    #[error("invalid OSC address: {0:?}")]
    InvalidAddress(String),

    /// A string contains an interior NUL byte and cannot be represented.
    #[error("string contains a NUL byte: {0:?}")]
    EmbeddedNul(String),

    /// The packet ended before a complete field could be read.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// A string field is not terminated by a NUL byte.
    #[error("unterminated string at offset {0}")]
    UnterminatedString(usize),

    /// A string field is not valid UTF-8.
    #[error("string at offset {0} is not valid UTF-8")]
    InvalidUtf8(usize),

    /// The type tag string does not start with `,`.
    #[error("missing type tag string")]
    MissingTypeTags,

    /// The type tag is not one this codec understands.
    #[error("unsupported type tag: {0:?}")]
    UnsupportedTypeTag(char),

    /// The packet is an OSC bundle.
    #[error("OSC bundles are not supported")]
    BundleNotSupported,
}

/// One OSC argument.
#[derive(Debug, Clone, PartialEq)]
pub enum OscArg {
    Int(i32),
    Float(f32),
    Str(String),
    Bool(bool),
}

impl OscArg {
    /// The OSC type tag character for this argument.
    pub fn type_tag(&self) -> char {
        match self {
            OscArg::Int(_) => 'i',
            OscArg::Float(_) => 'f',
            OscArg::Str(_) => 's',
            OscArg::Bool(true) => 'T',
            OscArg::Bool(false) => 'F',
        }
    }
}

/// A single OSC message: an address pattern plus its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
    pub address: String,
    pub args: Vec<OscArg>,
}

impl OscMessage {
    /// A message carrying one string argument (used for slide text).
    pub fn string(address: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            args: vec![OscArg::Str(value.into())],
        }
    }

    /// A message carrying one integer argument (used for trigger pulses).
    pub fn int(address: impl Into<String>, value: i32) -> Self {
        Self {
            address: address.into(),
            args: vec![OscArg::Int(value)],
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes an [`OscMessage`] into a datagram payload.
///
/// # Errors
///
/// Returns [`OscError::InvalidAddress`] if the address does not start with
/// `/`, or [`OscError::EmbeddedNul`] if the address or a string argument
/// contains a NUL byte.
///
/// # Examples
///
/// ```rust
/// use cue_core::protocol::osc::{encode_message, OscMessage};
///
/// let bytes = encode_message(&OscMessage::int("/go", 1)).unwrap();
/// assert_eq!(bytes, b"/go\0,i\0\0\0\0\0\x01");
/// ```
pub fn encode_message(msg: &OscMessage) -> Result<Vec<u8>, OscError> {
    if !msg.address.starts_with('/') {
        return Err(OscError::InvalidAddress(msg.address.clone()));
    }

    let mut buf = Vec::with_capacity(64);
    write_padded_str(&mut buf, &msg.address)?;

    let mut tags = String::with_capacity(msg.args.len() + 1);
    tags.push(',');
    tags.extend(msg.args.iter().map(OscArg::type_tag));
    write_padded_str(&mut buf, &tags)?;

    for arg in &msg.args {
        match arg {
            OscArg::Int(v) => buf.extend_from_slice(&v.to_be_bytes()),
            OscArg::Float(v) => buf.extend_from_slice(&v.to_bits().to_be_bytes()),
            OscArg::Str(s) => write_padded_str(&mut buf, s)?,
            OscArg::Bool(_) => {} // encoded in the type tag only
        }
    }
    Ok(buf)
}

/// Decodes one [`OscMessage`] from a complete datagram payload.
///
/// # Errors
///
/// Returns [`OscError`] if the bytes are malformed, are a bundle, or use a
/// type tag other than `i`, `f`, `s`, `T`, `F`.
///
/// # Examples
///
/// ```rust
/// use cue_core::protocol::osc::{decode_message, encode_message, OscMessage};
///
/// let original = OscMessage::string("/layer/1/text", "HELLO");
/// let bytes = encode_message(&original).unwrap();
/// assert_eq!(decode_message(&bytes).unwrap(), original);
/// ```
pub fn decode_message(bytes: &[u8]) -> Result<OscMessage, OscError> {
    if bytes.starts_with(b"#bundle") {
        return Err(OscError::BundleNotSupported);
    }

    let (address, mut offset) = read_padded_str(bytes, 0)?;
    if !address.starts_with('/') {
        return Err(OscError::InvalidAddress(address));
    }

    // A message with no type tag string at all is legal in old OSC senders
    // and means "no arguments".
    if offset == bytes.len() {
        return Ok(OscMessage {
            address,
            args: Vec::new(),
        });
    }

    let (tags, next) = read_padded_str(bytes, offset)?;
    offset = next;
    let tags = tags.strip_prefix(',').ok_or(OscError::MissingTypeTags)?;

    let mut args = Vec::with_capacity(tags.len());
    for tag in tags.chars() {
        let arg = match tag {
            'i' => {
                let raw = read_word(bytes, offset)?;
                offset += 4;
                OscArg::Int(i32::from_be_bytes(raw))
            }
            'f' => {
                let raw = read_word(bytes, offset)?;
                offset += 4;
                OscArg::Float(f32::from_bits(u32::from_be_bytes(raw)))
            }
            's' => {
                let (s, next) = read_padded_str(bytes, offset)?;
                offset = next;
                OscArg::Str(s)
            }
            'T' => OscArg::Bool(true),
            'F' => OscArg::Bool(false),
            other => return Err(OscError::UnsupportedTypeTag(other)),
        };
        args.push(arg);
    }

    Ok(OscMessage { address, args })
}

// ── Field helpers ─────────────────────────────────────────────────────────────

/// Number of NUL bytes that follow a string of `len` bytes (always at least one).
fn padding_after(len: usize) -> usize {
    4 - (len % 4)
}

fn write_padded_str(buf: &mut Vec<u8>, s: &str) -> Result<(), OscError> {
    if s.as_bytes().contains(&0) {
        return Err(OscError::EmbeddedNul(s.to_string()));
    }
    buf.extend_from_slice(s.as_bytes());
    buf.resize(buf.len() + padding_after(s.len()), 0);
    Ok(())
}

fn read_padded_str(bytes: &[u8], offset: usize) -> Result<(String, usize), OscError> {
    let rest = bytes.get(offset..).unwrap_or_default();
    let len = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or(OscError::UnterminatedString(offset))?;

    let end = offset + len + padding_after(len);
    if end > bytes.len() {
        return Err(OscError::InsufficientData {
            needed: end,
            available: bytes.len(),
        });
    }

    let s = std::str::from_utf8(&rest[..len]).map_err(|_| OscError::InvalidUtf8(offset))?;
    Ok((s.to_string(), end))
}

fn read_word(bytes: &[u8], offset: usize) -> Result<[u8; 4], OscError> {
    bytes
        .get(offset..offset + 4)
        .and_then(|w| <[u8; 4]>::try_from(w).ok())
        .ok_or(OscError::InsufficientData {
            needed: offset + 4,
            available: bytes.len(),
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
