//! `JsonWriter`: streaming JSON emitter.
//!
//! Member names are deferred until their value arrives. This lets a `null`
//! value drop its member entirely when null serialization is disabled.

use crate::error::JsonStreamError;
use crate::scope::{Scope, DEFAULT_MAX_DEPTH};

pub struct JsonWriter {
    out: String,
    stack: Vec<Scope>,
    deferred_name: Option<String>,
    serialize_nulls: bool,
    lenient: bool,
    indent: Option<String>,
    max_depth: usize,
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonWriter {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            stack: vec![Scope::EmptyDocument],
            deferred_name: None,
            serialize_nulls: true,
            lenient: false,
            indent: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// When disabled, an object member whose value is `null` is omitted.
    pub fn with_serialize_nulls(mut self, serialize_nulls: bool) -> Self {
        self.serialize_nulls = serialize_nulls;
        self
    }

    /// Lenient writers accept several top-level values and non-finite
    /// numbers.
    pub fn with_lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Pretty-prints with one `indent` per nesting level.
    pub fn with_indent(mut self, indent: &str) -> Self {
        self.indent = (!indent.is_empty()).then(|| indent.to_owned());
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn serialize_nulls(&self) -> bool {
        self.serialize_nulls
    }

    pub fn begin_array(&mut self) -> Result<(), JsonStreamError> {
        self.write_deferred_name()?;
        self.open(Scope::EmptyArray, '[')
    }

    pub fn end_array(&mut self) -> Result<(), JsonStreamError> {
        self.close(Scope::EmptyArray, Scope::NonEmptyArray, ']')
    }

    pub fn begin_object(&mut self) -> Result<(), JsonStreamError> {
        self.write_deferred_name()?;
        self.open(Scope::EmptyObject, '{')
    }

    pub fn end_object(&mut self) -> Result<(), JsonStreamError> {
        self.close(Scope::EmptyObject, Scope::NonEmptyObject, '}')
    }

    pub fn name(&mut self, name: &str) -> Result<(), JsonStreamError> {
        if self.deferred_name.is_some() {
            return Err(JsonStreamError::Nesting("member name already pending"));
        }
        match self.top() {
            Scope::EmptyObject | Scope::NonEmptyObject => {
                self.deferred_name = Some(name.to_owned());
                Ok(())
            }
            _ => Err(JsonStreamError::Nesting("member name outside of an object")),
        }
    }

    pub fn string_value(&mut self, value: &str) -> Result<(), JsonStreamError> {
        self.write_deferred_name()?;
        self.before_value()?;
        write_str(&mut self.out, value)
    }

    pub fn bool_value(&mut self, value: bool) -> Result<(), JsonStreamError> {
        self.write_deferred_name()?;
        self.before_value()?;
        self.out.push_str(if value { "true" } else { "false" });
        Ok(())
    }

    pub fn i64_value(&mut self, value: i64) -> Result<(), JsonStreamError> {
        self.write_deferred_name()?;
        self.before_value()?;
        self.out.push_str(&value.to_string());
        Ok(())
    }

    pub fn u64_value(&mut self, value: u64) -> Result<(), JsonStreamError> {
        self.write_deferred_name()?;
        self.before_value()?;
        self.out.push_str(&value.to_string());
        Ok(())
    }

    /// Writes a float. `NaN` and infinities are rejected unless lenient.
    pub fn f64_value(&mut self, value: f64) -> Result<(), JsonStreamError> {
        if !value.is_finite() && !self.lenient {
            return Err(JsonStreamError::NonFinite(value.to_string()));
        }
        self.write_deferred_name()?;
        self.before_value()?;
        self.out.push_str(&format_float(value));
        Ok(())
    }

    pub fn null_value(&mut self) -> Result<(), JsonStreamError> {
        if self.deferred_name.is_some() {
            if !self.serialize_nulls {
                self.deferred_name = None;
                return Ok(());
            }
            self.write_deferred_name()?;
        }
        self.before_value()?;
        self.out.push_str("null");
        Ok(())
    }

    /// Returns the text once exactly one complete document has been written.
    pub fn finish(self) -> Result<String, JsonStreamError> {
        if self.deferred_name.is_some() || self.stack.len() != 1 {
            return Err(JsonStreamError::Nesting("incomplete document"));
        }
        if self.stack[0] != Scope::NonEmptyDocument {
            return Err(JsonStreamError::Nesting("empty document"));
        }
        Ok(self.out)
    }

    fn top(&self) -> Scope {
        self.stack[self.stack.len() - 1]
    }

    fn replace_top(&mut self, scope: Scope) {
        let top = self.stack.len() - 1;
        self.stack[top] = scope;
    }

    fn open(&mut self, scope: Scope, bracket: char) -> Result<(), JsonStreamError> {
        if self.stack.len() > self.max_depth {
            return Err(JsonStreamError::Nesting("maximum nesting depth exceeded"));
        }
        self.before_value()?;
        self.stack.push(scope);
        self.out.push(bracket);
        Ok(())
    }

    fn close(&mut self, empty: Scope, non_empty: Scope, bracket: char) -> Result<(), JsonStreamError> {
        let context = self.top();
        if context != empty && context != non_empty {
            return Err(JsonStreamError::Nesting("unbalanced close"));
        }
        if self.deferred_name.is_some() {
            return Err(JsonStreamError::Nesting("dangling member name"));
        }
        self.stack.pop();
        if context == non_empty {
            self.newline();
        }
        self.out.push(bracket);
        Ok(())
    }

    fn write_deferred_name(&mut self) -> Result<(), JsonStreamError> {
        if let Some(name) = self.deferred_name.take() {
            match self.top() {
                Scope::NonEmptyObject => self.out.push(','),
                Scope::EmptyObject => {}
                _ => return Err(JsonStreamError::Nesting("member name outside of an object")),
            }
            self.newline();
            write_str(&mut self.out, &name)?;
            self.replace_top(Scope::DanglingName);
        }
        Ok(())
    }

    fn before_value(&mut self) -> Result<(), JsonStreamError> {
        match self.top() {
            Scope::NonEmptyDocument if !self.lenient => {
                Err(JsonStreamError::Nesting("JSON must have only one top-level value"))
            }
            Scope::EmptyDocument | Scope::NonEmptyDocument => {
                self.replace_top(Scope::NonEmptyDocument);
                Ok(())
            }
            Scope::EmptyArray => {
                self.replace_top(Scope::NonEmptyArray);
                self.newline();
                Ok(())
            }
            Scope::NonEmptyArray => {
                self.out.push(',');
                self.newline();
                Ok(())
            }
            Scope::DanglingName => {
                self.out.push(':');
                if self.indent.is_some() {
                    self.out.push(' ');
                }
                self.replace_top(Scope::NonEmptyObject);
                Ok(())
            }
            Scope::EmptyObject | Scope::NonEmptyObject => {
                Err(JsonStreamError::Nesting("object member written without a name"))
            }
        }
    }

    fn newline(&mut self) {
        if let Some(indent) = &self.indent {
            self.out.push('\n');
            for _ in 1..self.stack.len() {
                self.out.push_str(indent);
            }
        }
    }
}

/// Writes a JSON-encoded string (with escaping).
fn write_str(out: &mut String, s: &str) -> Result<(), JsonStreamError> {
    // Fast path: printable ASCII without quotes or backslashes
    if s.bytes().all(|b| (32..=126).contains(&b) && b != b'"' && b != b'\\') {
        out.reserve(s.len() + 2);
        out.push('"');
        out.push_str(s);
        out.push('"');
        return Ok(());
    }
    // Fall back to serde_json for proper escaping
    let json_str = serde_json::to_string(s).map_err(|e| JsonStreamError::Encode(e.to_string()))?;
    out.push_str(&json_str);
    Ok(())
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{f:.1}")
    } else {
        // Shortest round-trip representation
        format!("{}", f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_quotes_and_control_characters() {
        let mut out = String::new();
        write_str(&mut out, "a\"b\n\u{1}").unwrap();
        assert_eq!(out, r#""a\"b\n\u0001""#);
    }

    #[test]
    fn float_formatting() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(-2.5), "-2.5");
        assert_eq!(format_float(f64::NAN), "NaN");
        assert_eq!(format_float(f64::NEG_INFINITY), "-Infinity");
    }
}
