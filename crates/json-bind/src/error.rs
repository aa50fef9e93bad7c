//! Error taxonomy for typed decoding and encoding.

use json_bind_stream::JsonStreamError;
use thiserror::Error;

/// Boxed cause carried by a parse failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum CodecError {
    /// Malformed JSON text, raised by the token stream and passed through
    /// unchanged.
    #[error(transparent)]
    Syntax(#[from] JsonStreamError),
    /// Well-formed JSON that is semantically invalid for the target type.
    #[error("{message}")]
    Parse {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },
    #[error("map entry {index} has {len} elements, expected a [key, value] pair")]
    MalformedMapEntry { index: usize, len: usize },
    #[error("map entry {index} repeats an earlier key")]
    DuplicateMapKey { index: usize },
    #[error("map key type `{type_name}` has no string form; enable complex map key serialization")]
    UnsupportedMapKey { type_name: &'static str },
}

impl CodecError {
    pub fn parse(message: impl Into<String>) -> Self {
        CodecError::Parse {
            message: message.into(),
            cause: None,
        }
    }

    pub fn parse_with_cause(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        CodecError::Parse {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    /// True for every semantic decode failure, including the map-specific
    /// specializations.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            CodecError::Parse { .. }
                | CodecError::MalformedMapEntry { .. }
                | CodecError::DuplicateMapKey { .. }
        )
    }

    pub fn is_syntax_failure(&self) -> bool {
        matches!(self, CodecError::Syntax(_))
    }
}

/// Cause recorded when a post-deserialization hook panics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("post-deserialization hook panicked: {message}")]
pub struct HookPanic {
    pub message: String,
}

impl HookPanic {
    pub(crate) fn from_payload(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_owned()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "<non-string panic payload>".to_owned()
        };
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn categories() {
        assert!(CodecError::parse("x").is_parse_failure());
        assert!(CodecError::MalformedMapEntry { index: 0, len: 3 }.is_parse_failure());
        assert!(CodecError::DuplicateMapKey { index: 1 }.is_parse_failure());
        let syntax = CodecError::from(JsonStreamError::UnexpectedEof(0));
        assert!(syntax.is_syntax_failure());
        assert!(!syntax.is_parse_failure());
        assert!(!CodecError::UnsupportedMapKey { type_name: "K" }.is_parse_failure());
    }

    #[test]
    fn parse_failure_keeps_structured_cause() {
        let err = CodecError::parse_with_cause("rejected", HookPanic { message: "boom".into() });
        let cause = err.source().expect("cause");
        assert_eq!(
            cause.downcast_ref::<HookPanic>(),
            Some(&HookPanic { message: "boom".into() })
        );
        assert_eq!(err.to_string(), "rejected");
    }

    #[test]
    fn panic_payload_messages() {
        assert_eq!(HookPanic::from_payload(Box::new("static")).message, "static");
        assert_eq!(HookPanic::from_payload(Box::new(String::from("owned"))).message, "owned");
        assert_eq!(
            HookPanic::from_payload(Box::new(7u8)).message,
            "<non-string panic payload>"
        );
    }
}
