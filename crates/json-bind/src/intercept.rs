//! Post-deserialization interception.
//!
//! A type opts in either by implementing [`Intercept`], which names its
//! post-deserializer the way an annotation would, or by handing a hook to
//! [`CodecsBuilder::intercept_with`](crate::CodecsBuilder::intercept_with).
//! The registry wraps the type's codec once, at build time, in an
//! [`InterceptingCodec`].

use std::any::type_name;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use json_bind_stream::{JsonReader, JsonWriter};

use crate::codec::{Codec, JsonType};
use crate::error::{BoxError, CodecError, HookPanic};
use crate::registry::Codecs;

/// Validation or normalization run on a fully decoded value.
///
/// The hook may mutate the value, e.g. to fill in defaults for members the
/// document left out.
pub trait JsonPostDeserializer<T>: Send + Sync {
    fn post_deserialize(&self, value: &mut T) -> Result<(), BoxError>;
}

impl<T, F> JsonPostDeserializer<T> for F
where
    F: Fn(&mut T) -> Result<(), BoxError> + Send + Sync,
{
    fn post_deserialize(&self, value: &mut T) -> Result<(), BoxError> {
        self(value)
    }
}

/// Names the post-deserializer for a type.
///
/// Implementing this trait alone does nothing: the hook only runs in
/// registries built with
/// [`CodecsBuilder::intercept::<T>()`](crate::CodecsBuilder::intercept).
/// A registry that never calls it decodes `T` without the hook.
pub trait Intercept: JsonType {
    type PostDeserializer: JsonPostDeserializer<Self> + Default + 'static;
}

/// Wraps a base codec and runs a hook after each successful read.
///
/// Writes are delegated unchanged.
pub struct InterceptingCodec<T, H> {
    base: Arc<dyn Codec<T>>,
    hook: H,
}

impl<T, H> InterceptingCodec<T, H>
where
    T: 'static,
    H: JsonPostDeserializer<T>,
{
    pub fn new(base: Arc<dyn Codec<T>>, hook: H) -> Self {
        Self { base, hook }
    }

    /// Runs the hook. An error or a panic inside it becomes a parse failure
    /// carrying the original cause.
    fn run_hook(&self, value: &mut T) -> Result<(), CodecError> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.hook.post_deserialize(value)));
        let cause: BoxError = match outcome {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(cause)) => cause,
            Err(payload) => Box::new(HookPanic::from_payload(payload)),
        };
        tracing::debug!(
            target_type = type_name::<T>(),
            error = %cause,
            "post-deserialization hook rejected value"
        );
        Err(CodecError::Parse {
            message: format!("post-deserialization of `{}` failed: {cause}", type_name::<T>()),
            cause: Some(cause),
        })
    }
}

impl<T, H> Codec<T> for InterceptingCodec<T, H>
where
    T: 'static,
    H: JsonPostDeserializer<T>,
{
    fn write(&self, out: &mut JsonWriter, value: &T, codecs: &Codecs) -> Result<(), CodecError> {
        self.base.write(out, value, codecs)
    }

    fn read(&self, input: &mut JsonReader<'_>, codecs: &Codecs) -> Result<T, CodecError> {
        let mut value = self.base.read(input, codecs)?;
        self.run_hook(&mut value)?;
        Ok(value)
    }
}
