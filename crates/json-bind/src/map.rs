//! Map encoding with support for non-primitive keys.
//!
//! Maps keyed by a [`KeyKind::Simple`] type are written as JSON objects.
//! Maps keyed by anything else are written, when complex map keys are
//! enabled, as an array of `[key, value]` pairs:
//!
//! ```text
//! {"1":"a","2":"b"}                       simple keys
//! [[{"x":1,"y":2},"a"],[{"x":3,"y":4},"b"]]   complex keys
//! ```
//!
//! Decoding accepts either shape, picked by peeking the first token.

use std::any::type_name;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use indexmap::IndexMap;
use json_bind_stream::{JsonReader, JsonWriter, Token};

use crate::codec::{JsonType, KeyKind};
use crate::config::DuplicateKeyPolicy;
use crate::error::CodecError;
use crate::registry::Codecs;

/// Destination of a map decode.
pub trait MapEntries<K, V>: Default {
    /// Inserts an entry and reports whether the key was already present.
    fn insert_entry(&mut self, key: K, value: V) -> bool;
}

impl<K: Eq + Hash, V, S: BuildHasher + Default> MapEntries<K, V> for HashMap<K, V, S> {
    fn insert_entry(&mut self, key: K, value: V) -> bool {
        self.insert(key, value).is_some()
    }
}

impl<K: Ord, V> MapEntries<K, V> for BTreeMap<K, V> {
    fn insert_entry(&mut self, key: K, value: V) -> bool {
        self.insert(key, value).is_some()
    }
}

impl<K: Eq + Hash, V, S: BuildHasher + Default> MapEntries<K, V> for IndexMap<K, V, S> {
    fn insert_entry(&mut self, key: K, value: V) -> bool {
        self.insert(key, value).is_some()
    }
}

/// Shared map codec. One instance lives in each registry and carries its
/// map settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapCodec {
    complex_keys: bool,
    duplicate_keys: DuplicateKeyPolicy,
}

impl MapCodec {
    pub fn new(complex_keys: bool, duplicate_keys: DuplicateKeyPolicy) -> Self {
        Self {
            complex_keys,
            duplicate_keys,
        }
    }

    pub fn complex_keys(&self) -> bool {
        self.complex_keys
    }

    /// Writes entries in iteration order.
    pub fn write<'m, K, V, I>(&self, out: &mut JsonWriter, entries: I, codecs: &Codecs) -> Result<(), CodecError>
    where
        K: JsonType,
        V: JsonType,
        I: IntoIterator<Item = (&'m K, &'m V)>,
    {
        match K::key_kind() {
            KeyKind::Simple => {
                out.begin_object()?;
                for (key, value) in entries {
                    out.name(&key_to_name(key, codecs)?)?;
                    codecs.write(out, value)?;
                }
                out.end_object()?;
            }
            KeyKind::Complex if self.complex_keys => {
                tracing::trace!(key_type = type_name::<K>(), "writing map as array of pairs");
                out.begin_array()?;
                for (key, value) in entries {
                    out.begin_array()?;
                    codecs.write(out, key)?;
                    codecs.write(out, value)?;
                    out.end_array()?;
                }
                out.end_array()?;
            }
            KeyKind::Complex => {
                return Err(CodecError::UnsupportedMapKey {
                    type_name: type_name::<K>(),
                })
            }
        }
        Ok(())
    }

    /// Reads either wire shape into `M`. Nothing is returned unless every
    /// entry decodes.
    pub fn read<K, V, M>(&self, input: &mut JsonReader<'_>, codecs: &Codecs) -> Result<M, CodecError>
    where
        K: JsonType,
        V: JsonType,
        M: MapEntries<K, V>,
    {
        let mut map = M::default();
        match input.peek()? {
            Token::BeginArray => {
                input.begin_array()?;
                let mut index = 0;
                while input.has_next()? {
                    let (key, value) = read_pair::<K, V>(input, codecs, index)?;
                    self.insert(&mut map, key, value, index)?;
                    index += 1;
                }
                input.end_array()?;
            }
            Token::BeginObject => {
                input.begin_object()?;
                let mut index = 0;
                while input.has_next()? {
                    input.promote_name_to_value()?;
                    let key = read_entry_part::<K>(input, codecs, index, "key")?;
                    let value = read_entry_part::<V>(input, codecs, index, "value")?;
                    self.insert(&mut map, key, value, index)?;
                    index += 1;
                }
                input.end_object()?;
            }
            other => {
                return Err(CodecError::parse(format!(
                    "expected a map as an object or an array of pairs but was {other}"
                )))
            }
        }
        Ok(map)
    }

    fn insert<K, V, M>(&self, map: &mut M, key: K, value: V, index: usize) -> Result<(), CodecError>
    where
        M: MapEntries<K, V>,
    {
        let replaced = map.insert_entry(key, value);
        if replaced && self.duplicate_keys == DuplicateKeyPolicy::Reject {
            return Err(CodecError::DuplicateMapKey { index });
        }
        Ok(())
    }
}

/// Reads one `[key, value]` element of the array-of-pairs form.
fn read_pair<K, V>(input: &mut JsonReader<'_>, codecs: &Codecs, index: usize) -> Result<(K, V), CodecError>
where
    K: JsonType,
    V: JsonType,
{
    let token = input.peek()?;
    if token != Token::BeginArray {
        return Err(CodecError::parse(format!(
            "map entry {index} must be a [key, value] array but was {token}"
        )));
    }
    input.begin_array()?;
    if !input.has_next()? {
        return Err(CodecError::MalformedMapEntry { index, len: 0 });
    }
    let key = read_entry_part::<K>(input, codecs, index, "key")?;
    if !input.has_next()? {
        return Err(CodecError::MalformedMapEntry { index, len: 1 });
    }
    let value = read_entry_part::<V>(input, codecs, index, "value")?;
    if input.has_next()? {
        let mut len = 2;
        while input.has_next()? {
            input.skip_value()?;
            len += 1;
        }
        return Err(CodecError::MalformedMapEntry { index, len });
    }
    input.end_array()?;
    Ok((key, value))
}

/// Decodes the key or value of entry `index`. A failure that is not already
/// a parse failure (a type mismatch reported by the token stream, say) is
/// wrapped into one, keeping the original error as its cause.
fn read_entry_part<T: JsonType>(
    input: &mut JsonReader<'_>,
    codecs: &Codecs,
    index: usize,
    part: &str,
) -> Result<T, CodecError> {
    codecs.read::<T>(input).map_err(|err| {
        if err.is_parse_failure() {
            err
        } else {
            CodecError::parse_with_cause(format!("map entry {index} {part} failed to decode"), err)
        }
    })
}

/// The member name for a simple key: its JSON form, unquoted if it is a
/// string.
fn key_to_name<K: JsonType>(key: &K, codecs: &Codecs) -> Result<String, CodecError> {
    let mut scratch = JsonWriter::new()
        .with_lenient(codecs.config().lenient)
        .with_max_depth(codecs.config().max_depth);
    codecs.write(&mut scratch, key)?;
    let text = scratch.finish()?;
    match text.as_bytes().first() {
        Some(b'"') => Ok(serde_json::from_str::<String>(&text)
            .map_err(|e| CodecError::parse_with_cause("invalid map key encoding", e))?),
        Some(b'{' | b'[') | None => Err(CodecError::UnsupportedMapKey {
            type_name: type_name::<K>(),
        }),
        Some(_) => Ok(text),
    }
}

impl<K, V, S> JsonType for HashMap<K, V, S>
where
    K: JsonType + Eq + Hash,
    V: JsonType,
    S: BuildHasher + Default + 'static,
{
    fn write_json(&self, out: &mut JsonWriter, codecs: &Codecs) -> Result<(), CodecError> {
        codecs.map_codec().write(out, self, codecs)
    }

    fn read_json(input: &mut JsonReader<'_>, codecs: &Codecs) -> Result<Self, CodecError> {
        codecs.map_codec().read::<K, V, Self>(input, codecs)
    }
}

impl<K, V> JsonType for BTreeMap<K, V>
where
    K: JsonType + Ord,
    V: JsonType,
{
    fn write_json(&self, out: &mut JsonWriter, codecs: &Codecs) -> Result<(), CodecError> {
        codecs.map_codec().write(out, self, codecs)
    }

    fn read_json(input: &mut JsonReader<'_>, codecs: &Codecs) -> Result<Self, CodecError> {
        codecs.map_codec().read::<K, V, Self>(input, codecs)
    }
}

impl<K, V, S> JsonType for IndexMap<K, V, S>
where
    K: JsonType + Eq + Hash,
    V: JsonType,
    S: BuildHasher + Default + 'static,
{
    fn write_json(&self, out: &mut JsonWriter, codecs: &Codecs) -> Result<(), CodecError> {
        codecs.map_codec().write(out, self, codecs)
    }

    fn read_json(input: &mut JsonReader<'_>, codecs: &Codecs) -> Result<Self, CodecError> {
        codecs.map_codec().read::<K, V, Self>(input, codecs)
    }
}
