use thiserror::Error;

use crate::reader::Token;

/// Errors raised while tokenizing or emitting JSON text.
///
/// Offsets are byte positions into the input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonStreamError {
    #[error("malformed JSON at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },
    #[error("unexpected end of input at offset {0}")]
    UnexpectedEof(usize),
    #[error("expected {expected} but was {found} at offset {offset}")]
    UnexpectedToken {
        expected: Token,
        found: Token,
        offset: usize,
    },
    #[error("invalid number `{text}` at offset {offset}")]
    InvalidNumber { text: String, offset: usize },
    #[error("invalid UTF-8 at offset {0}")]
    InvalidUtf8(usize),
    #[error("invalid string escape at offset {0}")]
    InvalidEscape(usize),
    #[error("document was not fully consumed, trailing data at offset {0}")]
    TrailingData(usize),
    #[error("numeric values must be finite, got {0}")]
    NonFinite(String),
    #[error("failed to encode string: {0}")]
    Encode(String),
    #[error("nesting problem: {0}")]
    Nesting(&'static str),
}
