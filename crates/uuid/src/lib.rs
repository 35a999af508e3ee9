//! Version-4 UUID utilities.
//!
//! This crate owns a single value type, [`Identifier`], and the handful of operations the rest of
//! the utility collection needs from it: random generation, parsing, canonical rendering,
//! validation, comparison and JSON conversion.
//!
//! ## Canonical form
//! - Length: 36
//! - Layout: `8-4-4-4-12` hexadecimal groups separated by hyphens
//! - Characters: `0-9`, `a-f` and `-` at byte offsets 8, 13, 18 and 23
//! - Example: `550e8400-e29b-41d4-a716-446655440000`
//!
//! Notes:
//! - Rendering always produces lowercase output.
//! - Parsing is case-insensitive on the hex digits but the hyphen positions are fixed.
//! - Braced, URN-prefixed and 32-character "simple" forms are rejected.
//! - Parsing decodes the format only. It does not check the version or variant bits, so any
//!   128-bit value written in canonical form round-trips unchanged.
//!
//! ## Errors
//! Two failure modes exist and they never share a type:
//! - [`ParseError`]: recoverable, returned for any non-canonical input.
//! - [`EntropyError`]: the operating system's secure random source failed. [`Identifier::generate`]
//!   treats this as fatal and aborts the process; [`Identifier::try_generate`] hands it back to
//!   the caller instead.

mod service;

#[cfg(feature = "serde")]
mod json;

// Re-export public types
pub use service::{Identifier, CANONICAL_LEN};

#[cfg(feature = "serde")]
pub use json::{from_json_text, to_json_text};

/// The reason a string was rejected by [`Identifier::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    /// The input is not exactly 36 bytes long.
    #[error("expected 36 characters, got {0}")]
    InvalidLength(usize),

    /// A hyphen is missing from, or present outside of, the fixed group boundaries.
    #[error("expected hyphen-separated groups of 8-4-4-4-12 hex digits")]
    InvalidGroups,

    /// A non-hexadecimal character appears inside a group.
    #[error("invalid hex character {character:?} at index {index}")]
    InvalidCharacter { character: char, index: usize },

    /// A JSON value of some other kind was supplied where a string was required.
    #[error("expected a JSON string, got {0}")]
    NotAString(&'static str),

    /// The JSON text itself could not be read.
    #[error("malformed JSON: {0}")]
    MalformedJson(String),
}

/// Error returned when text is not a canonical UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid UUID: {kind}")]
pub struct ParseError {
    kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind) -> Self {
        Self { kind }
    }

    /// Returns the specific reason the input was rejected.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

/// The secure random source could not produce bytes.
///
/// There is no sound fallback for this, so it is kept apart from [`ParseError`].
#[derive(Debug, thiserror::Error)]
pub enum EntropyError {
    #[error("secure random source failed: {0}")]
    Source(#[source] rand::Error),
}

/// Result type for UUID parsing.
pub type UuidResult<T> = Result<T, ParseError>;
