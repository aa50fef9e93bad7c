//! Typed JSON codecs with post-deserialization hooks and complex map keys.
//!
//! A [`Codecs`] registry maps each Rust type to a codec. On top of the
//! plain typed codecs it adds two behaviours:
//!
//! - **Interception**: types registered with
//!   [`CodecsBuilder::intercept`] or [`CodecsBuilder::intercept_with`] run a
//!   [`JsonPostDeserializer`] on every decoded value, wherever it sits in the
//!   document. Any hook failure, error or panic, surfaces as
//!   [`CodecError::Parse`].
//! - **Complex map keys**: with
//!   [`CodecsBuilder::enable_complex_map_key_serialization`], maps whose key
//!   type has no natural string form are written as `[[key, value], ...]`.
//!
//! ```
//! use json_bind::{json_object, BoxError, Codecs, Intercept, JsonPostDeserializer};
//!
//! #[derive(Debug, Default)]
//! struct Account {
//!     login: String,
//!     plan: String,
//! }
//!
//! json_object!(Account { login, plan });
//!
//! #[derive(Default)]
//! struct AccountValidator;
//!
//! impl JsonPostDeserializer<Account> for AccountValidator {
//!     fn post_deserialize(&self, account: &mut Account) -> Result<(), BoxError> {
//!         if account.login.is_empty() {
//!             return Err("login is required".into());
//!         }
//!         if account.plan.is_empty() {
//!             account.plan = "free".into();
//!         }
//!         Ok(())
//!     }
//! }
//!
//! impl Intercept for Account {
//!     type PostDeserializer = AccountValidator;
//! }
//!
//! let codecs = Codecs::builder().intercept::<Account>().build();
//! let account: Account = codecs.from_json(r#"{"login":"ada"}"#).unwrap();
//! assert_eq!(account.plan, "free");
//! assert!(codecs.from_json::<Account>("{}").unwrap_err().is_parse_failure());
//! ```

mod codec;
mod config;
mod error;
mod intercept;
mod map;
mod object;
mod registry;
mod types;

pub use json_bind_stream as stream;
pub use json_bind_stream::{JsonReader, JsonStreamError, JsonWriter, Token};

pub use codec::{Codec, DefaultCodec, JsonType, KeyKind};
pub use config::{CodecsConfig, DuplicateKeyPolicy};
pub use error::{BoxError, CodecError, HookPanic};
pub use intercept::{Intercept, InterceptingCodec, JsonPostDeserializer};
pub use map::{MapCodec, MapEntries};
pub use registry::{Codecs, CodecsBuilder};
