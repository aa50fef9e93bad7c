//! Registry-wide settings, fixed when the registry is built.

use json_bind_stream::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};

/// What a map decode does when two entries carry equal keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyPolicy {
    /// The later entry replaces the earlier one.
    #[default]
    LastWriteWins,
    /// The decode fails with [`crate::CodecError::DuplicateMapKey`].
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecsConfig {
    /// Encode maps with non-primitive keys as `[[key, value], ...]`.
    pub complex_map_keys: bool,
    pub duplicate_map_keys: DuplicateKeyPolicy,
    /// Keep object members whose value is `null`.
    pub serialize_nulls: bool,
    /// Accept hand-written JSON (unquoted names, single quotes, comments)
    /// and write non-finite floats.
    pub lenient: bool,
    /// Indent string for pretty printing; empty for compact output.
    pub indent: String,
    /// Deepest array/object nesting accepted when reading or writing.
    pub max_depth: usize,
}

impl Default for CodecsConfig {
    fn default() -> Self {
        Self {
            complex_map_keys: false,
            duplicate_map_keys: DuplicateKeyPolicy::default(),
            serialize_nulls: false,
            lenient: false,
            indent: String::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CodecsConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = CodecsConfig::from_json(r#"{"complex_map_keys": true}"#).unwrap();
        assert!(config.complex_map_keys);
        assert_eq!(config.duplicate_map_keys, DuplicateKeyPolicy::LastWriteWins);
        assert!(!config.serialize_nulls);
        assert!(config.indent.is_empty());
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn round_trips_through_serde() {
        let config = CodecsConfig {
            complex_map_keys: true,
            duplicate_map_keys: DuplicateKeyPolicy::Reject,
            serialize_nulls: true,
            lenient: true,
            indent: "  ".into(),
            max_depth: 16,
        };
        let text = serde_json::to_string(&config).unwrap();
        assert!(text.contains(r#""duplicate_map_keys":"reject""#));
        assert_eq!(CodecsConfig::from_json(&text).unwrap(), config);
    }
}
