//! # RFID Frame Parsing
//!
//! Turns one raw line read from the reader into a [`TagId`], or nothing.
//!
//! ## Frame Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  a5 5a 00 19 83 30 00 e2 00 00 1b 26 0c 02 56 20 50 e0 f8 00 │ c0 01 84 0d 0a
//! │  └───┘                                                       │ └──────┘ └───┘
//! │  marker          stable tag bytes (20 bytes = 40 hex)        │  varies   CRLF
//! │                                                              │  per read
//! │  ◄──────────────────── TagId ───────────────────────────────►│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The bytes after the first twenty change from one read of the same tag to
//! the next, so only the 40-character prefix identifies the tag. Nothing is
//! checksummed; a line that does not start with the marker or is too short is
//! simply "no tag on this line".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;

use crate::error::ValidationError;

/// Start-of-frame marker sent by the reader.
pub const FRAME_MARKER: [u8; 2] = [0xa5, 0x5a];

/// Hex form of [`FRAME_MARKER`].
pub const FRAME_MARKER_HEX: &str = "a55a";

/// Number of raw bytes that make up a tag identifier.
pub const TAG_ID_BYTE_LEN: usize = 20;

/// Number of hex characters in a tag identifier.
pub const TAG_ID_HEX_LEN: usize = TAG_ID_BYTE_LEN * 2;

// =============================================================================
// Tag Identifier
// =============================================================================

/// A stable RFID tag identifier: 40 lowercase hex characters starting `a55a`.
///
/// Equality is exact string comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
pub struct TagId(String);

impl TagId {
    /// Parses a tag ID typed by hand (e.g., into the registration form).
    ///
    /// ## Rules
    /// - Surrounding whitespace ignored, case-insensitive
    /// - Exactly 40 hex digits
    /// - Must start with `a55a`
    ///
    /// ## Example
    /// ```rust
    /// use rentrack_core::TagId;
    ///
    /// let tag = TagId::parse(" A55A0019833000E200001B260C02562050E0F800 ").unwrap();
    /// assert_eq!(tag.as_str(), "a55a0019833000e200001b260c02562050e0f800");
    /// assert!(TagId::parse("a55a00").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(ValidationError::required("tag_id"));
        }

        if normalized.len() != TAG_ID_HEX_LEN {
            return Err(ValidationError::invalid(
                "tag_id",
                format!("must be exactly {} hex characters", TAG_ID_HEX_LEN),
            ));
        }

        if !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::invalid(
                "tag_id",
                "must contain only hex digits",
            ));
        }

        if !normalized.starts_with(FRAME_MARKER_HEX) {
            return Err(ValidationError::invalid(
                "tag_id",
                format!("must start with {}", FRAME_MARKER_HEX),
            ));
        }

        Ok(TagId(normalized))
    }

    /// Returns the identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the tag and returns the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TagId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Parser
// =============================================================================

/// Extracts the tag identifier from one raw serial line.
///
/// Returns `None` when the line does not start with `a5 5a` or is shorter
/// than [`TAG_ID_BYTE_LEN`] bytes. Never panics.
///
/// ## Example
/// ```rust
/// use rentrack_core::frame::parse_frame;
///
/// assert!(parse_frame(b"hello\r\n").is_none());
/// assert!(parse_frame(&[]).is_none());
/// ```
pub fn parse_frame(raw: &[u8]) -> Option<TagId> {
    if !raw.starts_with(&FRAME_MARKER) {
        return None;
    }

    let tag_bytes = raw.get(..TAG_ID_BYTE_LEN)?;
    Some(TagId(encode_hex(tag_bytes)))
}

/// Lowercase hex encoding.
fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Writing to a String cannot fail
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
