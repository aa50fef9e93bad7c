//! Codec registry.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use json_bind_stream::{JsonReader, JsonWriter};

use crate::codec::{Codec, DefaultCodec, JsonType};
use crate::config::{CodecsConfig, DuplicateKeyPolicy};
use crate::error::CodecError;
use crate::intercept::{Intercept, InterceptingCodec, JsonPostDeserializer};
use crate::map::MapCodec;

/// Type-erased `TypeId -> Arc<dyn Codec<T>>` table.
#[derive(Default)]
struct CodecTable {
    entries: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl CodecTable {
    fn insert<T: 'static>(&mut self, codec: Arc<dyn Codec<T>>) -> bool {
        self.entries
            .insert(TypeId::of::<T>(), Box::new(codec))
            .is_some()
    }

    fn get<T: 'static>(&self) -> Option<&Arc<dyn Codec<T>>> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Arc<dyn Codec<T>>>())
    }

    fn remove<T: 'static>(&mut self) -> Option<Arc<dyn Codec<T>>> {
        self.entries
            .remove(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast::<Arc<dyn Codec<T>>>().ok())
            .map(|codec| *codec)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

type Wrapper = Box<dyn FnOnce(&mut CodecTable)>;

/// Immutable set of codecs plus the settings every encode/decode through it
/// shares. Cheap to share across threads behind an `Arc`.
pub struct Codecs {
    table: CodecTable,
    maps: MapCodec,
    config: CodecsConfig,
}

impl Default for Codecs {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Codecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codecs")
            .field("registered", &self.table.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Codecs {
    /// Registry with default settings and no custom codecs.
    pub fn new() -> Self {
        CodecsBuilder::new().build()
    }

    pub fn builder() -> CodecsBuilder {
        CodecsBuilder::new()
    }

    pub fn config(&self) -> &CodecsConfig {
        &self.config
    }

    pub fn map_codec(&self) -> &MapCodec {
        &self.maps
    }

    /// Looks up the codec for `T`: a registered one (possibly wrapped by an
    /// interceptor), or `T`'s own [`JsonType`] impl.
    pub fn codec<T: JsonType>(&self) -> Arc<dyn Codec<T>> {
        match self.table.get::<T>() {
            Some(codec) => Arc::clone(codec),
            None => Arc::new(DefaultCodec::<T>::new()),
        }
    }

    pub fn write<T: JsonType>(&self, out: &mut JsonWriter, value: &T) -> Result<(), CodecError> {
        match self.table.get::<T>() {
            Some(codec) => codec.write(out, value, self),
            None => value.write_json(out, self),
        }
    }

    pub fn read<T: JsonType>(&self, input: &mut JsonReader<'_>) -> Result<T, CodecError> {
        match self.table.get::<T>() {
            Some(codec) => codec.read(input, self),
            None => T::read_json(input, self),
        }
    }

    /// A reader configured from this registry's settings.
    pub fn reader<'a>(&self, json: &'a str) -> JsonReader<'a> {
        JsonReader::new(json)
            .with_lenient(self.config.lenient)
            .with_max_depth(self.config.max_depth)
    }

    /// A writer configured from this registry's settings.
    pub fn writer(&self) -> JsonWriter {
        JsonWriter::new()
            .with_serialize_nulls(self.config.serialize_nulls)
            .with_lenient(self.config.lenient)
            .with_indent(&self.config.indent)
            .with_max_depth(self.config.max_depth)
    }

    pub fn to_json<T: JsonType>(&self, value: &T) -> Result<String, CodecError> {
        let mut out = self.writer();
        self.write(&mut out, value)?;
        Ok(out.finish()?)
    }

    /// Decodes one document. Trailing content after the value is a syntax
    /// failure.
    pub fn from_json<T: JsonType>(&self, json: &str) -> Result<T, CodecError> {
        let mut input = self.reader(json);
        let value = self.read(&mut input)?;
        input.finish()?;
        Ok(value)
    }
}

pub struct CodecsBuilder {
    config: CodecsConfig,
    table: CodecTable,
    wrappers: Vec<Wrapper>,
}

impl Default for CodecsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecsBuilder {
    pub fn new() -> Self {
        Self {
            config: CodecsConfig::default(),
            table: CodecTable::default(),
            wrappers: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: CodecsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn enable_complex_map_key_serialization(mut self) -> Self {
        self.config.complex_map_keys = true;
        self
    }

    pub fn duplicate_map_keys(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.config.duplicate_map_keys = policy;
        self
    }

    pub fn serialize_nulls(mut self) -> Self {
        self.config.serialize_nulls = true;
        self
    }

    pub fn lenient(mut self) -> Self {
        self.config.lenient = true;
        self
    }

    pub fn pretty_printing(mut self) -> Self {
        self.config.indent = "  ".to_owned();
        self
    }

    /// Caps array/object nesting for every reader and writer the registry
    /// hands out.
    pub fn max_nesting_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Uses `codec` for `T` instead of `T`'s own [`JsonType`] impl. A later
    /// registration for the same type replaces an earlier one.
    pub fn register_codec<T, C>(mut self, codec: C) -> Self
    where
        T: JsonType,
        C: Codec<T> + 'static,
    {
        if self.table.insert::<T>(Arc::new(codec)) {
            tracing::debug!(codec_type = type_name::<T>(), "replaced registered codec");
        }
        self
    }

    /// Runs `T`'s declared post-deserializer after every decode of `T`.
    pub fn intercept<T: Intercept>(self) -> Self {
        self.intercept_with::<T, _>(T::PostDeserializer::default())
    }

    /// Runs `hook` after every decode of `T`.
    ///
    /// The base codec is whatever `T` resolves to once all
    /// [`register_codec`](Self::register_codec) calls are in, so the order of
    /// the two calls does not matter.
    pub fn intercept_with<T, H>(mut self, hook: H) -> Self
    where
        T: JsonType,
        H: JsonPostDeserializer<T> + 'static,
    {
        self.wrappers.push(Box::new(move |table: &mut CodecTable| {
            let base = table
                .remove::<T>()
                .unwrap_or_else(|| Arc::new(DefaultCodec::<T>::new()));
            tracing::debug!(
                codec_type = type_name::<T>(),
                "wrapping codec with post-deserialization hook"
            );
            table.insert::<T>(Arc::new(InterceptingCodec::new(base, hook)));
        }));
        self
    }

    pub fn build(self) -> Codecs {
        let CodecsBuilder {
            config,
            mut table,
            wrappers,
        } = self;
        for wrap in wrappers {
            wrap(&mut table);
        }
        tracing::debug!(
            registered = table.len(),
            complex_map_keys = config.complex_map_keys,
            lenient = config.lenient,
            "built codec registry"
        );
        Codecs {
            table,
            maps: MapCodec::new(config.complex_map_keys, config.duplicate_map_keys),
            config,
        }
    }
}
