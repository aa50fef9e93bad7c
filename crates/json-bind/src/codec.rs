//! The typed codec capability the registry is built on.
//!
//! Every decodable type implements [`JsonType`], which is its default codec.
//! A [`Codec`] is the object-safe form stored in the registry: custom codecs
//! registered by callers, and the decorators wrapped around them.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use json_bind_stream::{JsonReader, JsonWriter};

use crate::error::CodecError;
use crate::registry::Codecs;

/// How a type behaves as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Has a natural, unambiguous string form (numbers, strings, booleans,
    /// enums). Maps keyed by it are written as JSON objects.
    Simple,
    /// Needs its full JSON structure. Maps keyed by it are written as
    /// arrays of `[key, value]` pairs.
    Complex,
}

pub trait JsonType: Sized + 'static {
    fn write_json(&self, out: &mut JsonWriter, codecs: &Codecs) -> Result<(), CodecError>;

    fn read_json(input: &mut JsonReader<'_>, codecs: &Codecs) -> Result<Self, CodecError>;

    fn key_kind() -> KeyKind {
        KeyKind::Complex
    }
}

/// A paired encoder/decoder for one type.
///
/// `codecs` is the registry the call came through; nested values are
/// looked up there.
pub trait Codec<T>: Send + Sync {
    fn write(&self, out: &mut JsonWriter, value: &T, codecs: &Codecs) -> Result<(), CodecError>;

    fn read(&self, input: &mut JsonReader<'_>, codecs: &Codecs) -> Result<T, CodecError>;
}

/// Codec backed by the type's own [`JsonType`] impl.
pub struct DefaultCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> DefaultCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for DefaultCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for DefaultCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DefaultCodec<{}>", type_name::<T>())
    }
}

impl<T: JsonType> Codec<T> for DefaultCodec<T> {
    fn write(&self, out: &mut JsonWriter, value: &T, codecs: &Codecs) -> Result<(), CodecError> {
        value.write_json(out, codecs)
    }

    fn read(&self, input: &mut JsonReader<'_>, codecs: &Codecs) -> Result<T, CodecError> {
        T::read_json(input, codecs)
    }
}
