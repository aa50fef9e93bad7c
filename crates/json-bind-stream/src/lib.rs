//! Token-level JSON reading and writing.
//!
//! [`JsonReader`] is a pull tokenizer: callers `peek` the next [`Token`] and
//! consume it with the matching `begin_*`/`end_*`/`next_*` call.
//! [`JsonWriter`] is the mirror image and tracks nesting so it can only ever
//! produce well-formed text.
//!
//! Both sides support a lenient mode for hand-written documents: unquoted
//! names, single-quoted strings, comments and non-finite numbers.

mod error;
mod reader;
mod scope;
mod writer;

pub use error::JsonStreamError;
pub use reader::{JsonReader, Token};
pub use scope::DEFAULT_MAX_DEPTH;
pub use writer::JsonWriter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_and_writer_agree_on_nested_document() {
        let mut out = JsonWriter::new();
        out.begin_object().unwrap();
        out.name("a").unwrap();
        out.begin_array().unwrap();
        out.i64_value(1).unwrap();
        out.string_value("two").unwrap();
        out.null_value().unwrap();
        out.end_array().unwrap();
        out.end_object().unwrap();
        let text = out.finish().unwrap();
        assert_eq!(text, r#"{"a":[1,"two",null]}"#);

        let mut input = JsonReader::new(&text);
        input.begin_object().unwrap();
        assert_eq!(input.next_name().unwrap(), "a");
        input.begin_array().unwrap();
        assert_eq!(input.next_number::<i64>().unwrap(), 1);
        assert_eq!(input.next_string().unwrap(), "two");
        input.next_null().unwrap();
        assert!(!input.has_next().unwrap());
        input.end_array().unwrap();
        input.end_object().unwrap();
        input.finish().unwrap();
    }
}
