//! `JsonType` impls for primitives, strings, options, sequences and
//! `serde_json::Value`. Maps live in [`crate::map`].

use json_bind_stream::{JsonReader, JsonWriter, Token};
use serde_json::{Map, Number, Value};

use crate::codec::{JsonType, KeyKind};
use crate::error::CodecError;
use crate::registry::Codecs;

impl JsonType for bool {
    fn write_json(&self, out: &mut JsonWriter, _codecs: &Codecs) -> Result<(), CodecError> {
        Ok(out.bool_value(*self)?)
    }

    /// Also accepts `"true"`/`"false"`, which is how booleans arrive as
    /// object-form map keys.
    fn read_json(input: &mut JsonReader<'_>, _codecs: &Codecs) -> Result<Self, CodecError> {
        if input.peek()? != Token::String {
            return Ok(input.next_bool()?);
        }
        match input.next_string()?.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(CodecError::parse(format!("expected a boolean but was \"{other}\""))),
        }
    }

    fn key_kind() -> KeyKind {
        KeyKind::Simple
    }
}

macro_rules! signed_json_type {
    ($($ty:ty),* $(,)?) => {
        $(
            impl JsonType for $ty {
                fn write_json(&self, out: &mut JsonWriter, _codecs: &Codecs) -> Result<(), CodecError> {
                    Ok(out.i64_value(*self as i64)?)
                }

                fn read_json(input: &mut JsonReader<'_>, _codecs: &Codecs) -> Result<Self, CodecError> {
                    Ok(input.next_number::<$ty>()?)
                }

                fn key_kind() -> KeyKind {
                    KeyKind::Simple
                }
            }
        )*
    };
}

macro_rules! unsigned_json_type {
    ($($ty:ty),* $(,)?) => {
        $(
            impl JsonType for $ty {
                fn write_json(&self, out: &mut JsonWriter, _codecs: &Codecs) -> Result<(), CodecError> {
                    Ok(out.u64_value(*self as u64)?)
                }

                fn read_json(input: &mut JsonReader<'_>, _codecs: &Codecs) -> Result<Self, CodecError> {
                    Ok(input.next_number::<$ty>()?)
                }

                fn key_kind() -> KeyKind {
                    KeyKind::Simple
                }
            }
        )*
    };
}

signed_json_type!(i8, i16, i32, i64, isize);
unsigned_json_type!(u8, u16, u32, u64, usize);

impl JsonType for f64 {
    fn write_json(&self, out: &mut JsonWriter, _codecs: &Codecs) -> Result<(), CodecError> {
        Ok(out.f64_value(*self)?)
    }

    fn read_json(input: &mut JsonReader<'_>, _codecs: &Codecs) -> Result<Self, CodecError> {
        Ok(input.next_number::<f64>()?)
    }

    fn key_kind() -> KeyKind {
        KeyKind::Simple
    }
}

impl JsonType for f32 {
    fn write_json(&self, out: &mut JsonWriter, _codecs: &Codecs) -> Result<(), CodecError> {
        Ok(out.f64_value(f64::from(*self))?)
    }

    fn read_json(input: &mut JsonReader<'_>, _codecs: &Codecs) -> Result<Self, CodecError> {
        Ok(input.next_number::<f32>()?)
    }

    fn key_kind() -> KeyKind {
        KeyKind::Simple
    }
}

impl JsonType for char {
    fn write_json(&self, out: &mut JsonWriter, _codecs: &Codecs) -> Result<(), CodecError> {
        let mut buf = [0u8; 4];
        Ok(out.string_value(self.encode_utf8(&mut buf))?)
    }

    fn read_json(input: &mut JsonReader<'_>, _codecs: &Codecs) -> Result<Self, CodecError> {
        let text = input.next_string()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(CodecError::parse(format!("expected a single character but was \"{text}\""))),
        }
    }

    fn key_kind() -> KeyKind {
        KeyKind::Simple
    }
}

impl JsonType for String {
    fn write_json(&self, out: &mut JsonWriter, _codecs: &Codecs) -> Result<(), CodecError> {
        Ok(out.string_value(self)?)
    }

    fn read_json(input: &mut JsonReader<'_>, _codecs: &Codecs) -> Result<Self, CodecError> {
        if input.peek()? == Token::Bool {
            return Ok(input.next_bool()?.to_string());
        }
        Ok(input.next_string()?)
    }

    fn key_kind() -> KeyKind {
        KeyKind::Simple
    }
}

/// `null` decodes to `None` without consulting `T`'s codec.
impl<T: JsonType> JsonType for Option<T> {
    fn write_json(&self, out: &mut JsonWriter, codecs: &Codecs) -> Result<(), CodecError> {
        match self {
            Some(value) => codecs.write(out, value),
            None => Ok(out.null_value()?),
        }
    }

    fn read_json(input: &mut JsonReader<'_>, codecs: &Codecs) -> Result<Self, CodecError> {
        if input.peek()? == Token::Null {
            input.next_null()?;
            return Ok(None);
        }
        codecs.read(input).map(Some)
    }
}

impl<T: JsonType> JsonType for Box<T> {
    fn write_json(&self, out: &mut JsonWriter, codecs: &Codecs) -> Result<(), CodecError> {
        codecs.write(out, &**self)
    }

    fn read_json(input: &mut JsonReader<'_>, codecs: &Codecs) -> Result<Self, CodecError> {
        codecs.read(input).map(Box::new)
    }

    fn key_kind() -> KeyKind {
        T::key_kind()
    }
}

impl<T: JsonType> JsonType for Vec<T> {
    fn write_json(&self, out: &mut JsonWriter, codecs: &Codecs) -> Result<(), CodecError> {
        out.begin_array()?;
        for item in self {
            codecs.write(out, item)?;
        }
        Ok(out.end_array()?)
    }

    fn read_json(input: &mut JsonReader<'_>, codecs: &Codecs) -> Result<Self, CodecError> {
        let mut items = Vec::new();
        input.begin_array()?;
        while input.has_next()? {
            items.push(codecs.read(input)?);
        }
        input.end_array()?;
        Ok(items)
    }
}

impl JsonType for Value {
    fn write_json(&self, out: &mut JsonWriter, codecs: &Codecs) -> Result<(), CodecError> {
        match self {
            Value::Null => out.null_value()?,
            Value::Bool(b) => out.bool_value(*b)?,
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    out.i64_value(i)?;
                } else if let Some(u) = n.as_u64() {
                    out.u64_value(u)?;
                } else if let Some(f) = n.as_f64() {
                    out.f64_value(f)?;
                }
            }
            Value::String(s) => out.string_value(s)?,
            Value::Array(items) => {
                out.begin_array()?;
                for item in items {
                    codecs.write(out, item)?;
                }
                out.end_array()?;
            }
            Value::Object(members) => {
                out.begin_object()?;
                for (name, item) in members {
                    out.name(name)?;
                    codecs.write(out, item)?;
                }
                out.end_object()?;
            }
        }
        Ok(())
    }

    fn read_json(input: &mut JsonReader<'_>, codecs: &Codecs) -> Result<Self, CodecError> {
        match input.peek()? {
            Token::Null => {
                input.next_null()?;
                Ok(Value::Null)
            }
            Token::Bool => Ok(Value::Bool(input.next_bool()?)),
            Token::Number => {
                let text = input.next_string()?;
                serde_json::from_str::<Number>(&text)
                    .map(Value::Number)
                    .map_err(|e| CodecError::parse_with_cause(format!("invalid number {text}"), e))
            }
            Token::BeginArray => {
                let mut items = Vec::new();
                input.begin_array()?;
                while input.has_next()? {
                    items.push(codecs.read(input)?);
                }
                input.end_array()?;
                Ok(Value::Array(items))
            }
            Token::BeginObject => {
                let mut members = Map::new();
                input.begin_object()?;
                while input.has_next()? {
                    let name = input.next_name()?;
                    members.insert(name, codecs.read(input)?);
                }
                input.end_object()?;
                Ok(Value::Object(members))
            }
            _ => Ok(Value::String(input.next_string()?)),
        }
    }
}
