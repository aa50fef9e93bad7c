//! `json_object!`: `JsonType` for plain structs.
//!
//! ```
//! use json_bind::{json_object, Codecs};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//!     label: Option<String>,
//! }
//!
//! json_object!(Point { x, y, label as "name" });
//!
//! let codecs = Codecs::new();
//! let point: Point = codecs.from_json(r#"{"x":1,"name":"p","extra":[1]}"#).unwrap();
//! assert_eq!(point, Point { x: 1, y: 0, label: Some("p".into()) });
//! assert_eq!(codecs.to_json(&point).unwrap(), r#"{"x":1,"y":0,"name":"p"}"#);
//! ```
//!
//! Members are written in declaration order. On read, the struct starts
//! from `Default::default()`: absent members keep their default and unknown
//! members are skipped. Validation of what must be present belongs in a
//! post-deserialization hook.

#[macro_export]
macro_rules! json_object {
    (@name $field:ident) => {
        stringify!($field)
    };
    (@name $field:ident $name:literal) => {
        $name
    };
    ($ty:ty { $( $field:ident $(as $name:literal)? ),* $(,)? }) => {
        impl $crate::JsonType for $ty {
            fn write_json(
                &self,
                out: &mut $crate::stream::JsonWriter,
                codecs: &$crate::Codecs,
            ) -> ::core::result::Result<(), $crate::CodecError> {
                out.begin_object()?;
                $(
                    out.name($crate::json_object!(@name $field $($name)?))?;
                    codecs.write(out, &self.$field)?;
                )*
                out.end_object()?;
                Ok(())
            }

            fn read_json(
                input: &mut $crate::stream::JsonReader<'_>,
                codecs: &$crate::Codecs,
            ) -> ::core::result::Result<Self, $crate::CodecError> {
                let mut value = <$ty as ::core::default::Default>::default();
                input.begin_object()?;
                while input.has_next()? {
                    let name = input.next_name()?;
                    $(
                        if name == $crate::json_object!(@name $field $($name)?) {
                            value.$field = codecs.read(input)?;
                            continue;
                        }
                    )*
                    input.skip_value()?;
                }
                input.end_object()?;
                Ok(value)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::Codecs;

    #[derive(Debug, Default, PartialEq)]
    struct Inner {
        flag: bool,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Outer {
        id: u32,
        inner: Inner,
        tags: Vec<String>,
    }

    json_object!(Inner { flag });
    json_object!(Outer { id as "ID", inner, tags, });

    #[test]
    fn nested_objects_round_trip() {
        let codecs = Codecs::new();
        let value = Outer {
            id: 7,
            inner: Inner { flag: true },
            tags: vec!["a".into()],
        };
        let text = codecs.to_json(&value).unwrap();
        assert_eq!(text, r#"{"ID":7,"inner":{"flag":true},"tags":["a"]}"#);
        assert_eq!(codecs.from_json::<Outer>(&text).unwrap(), value);
    }

    #[test]
    fn absent_members_keep_defaults() {
        let codecs = Codecs::new();
        assert_eq!(codecs.from_json::<Outer>("{}").unwrap(), Outer::default());
    }

    #[test]
    fn wrong_member_type_is_a_syntax_failure() {
        let codecs = Codecs::new();
        let err = codecs.from_json::<Outer>(r#"{"inner":[]}"#).unwrap_err();
        assert!(err.is_syntax_failure());
    }
}
