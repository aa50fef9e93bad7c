#![allow(dead_code)]

use json_bind::{
    json_object, BoxError, Codec, CodecError, Codecs, Intercept, JsonPostDeserializer, JsonReader,
    JsonWriter,
};

pub const DEFAULT_EMAIL: &str = "invalid@invalid.com";
pub const DEFAULT_FIRST_LINE: &str = "unknown";

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct User {
    pub name: String,
    pub password: String,
    pub email: String,
}

json_object!(User { name, password, email });

#[derive(Default)]
pub struct UserValidator;

impl JsonPostDeserializer<User> for UserValidator {
    fn post_deserialize(&self, user: &mut User) -> Result<(), BoxError> {
        if user.name.is_empty() || user.password.is_empty() {
            return Err("name and password are required fields.".into());
        }
        if user.email.is_empty() {
            user.email = DEFAULT_EMAIL.to_owned();
        }
        Ok(())
    }
}

impl Intercept for User {
    type PostDeserializer = UserValidator;
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub first_line: String,
    pub second_line: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

json_object!(Address {
    first_line as "firstLine",
    second_line as "secondLine",
    city,
    state,
    zip,
});

#[derive(Default)]
pub struct AddressValidator;

impl JsonPostDeserializer<Address> for AddressValidator {
    fn post_deserialize(&self, address: &mut Address) -> Result<(), BoxError> {
        if address.city.is_empty() || address.state.is_empty() || address.zip.is_empty() {
            return Err("Address city, state and zip are required fields.".into());
        }
        if address.first_line.is_empty() {
            address.first_line = DEFAULT_FIRST_LINE.to_owned();
        }
        Ok(())
    }
}

impl Intercept for Address {
    type PostDeserializer = AddressValidator;
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UserGroup {
    pub user: User,
    pub city: String,
}

json_object!(UserGroup { user, city });

/// Hand-written codec for `User` that only knows about name and password.
pub struct UserCodec;

impl Codec<User> for UserCodec {
    fn write(&self, out: &mut JsonWriter, user: &User, _codecs: &Codecs) -> Result<(), CodecError> {
        out.begin_object()?;
        out.name("name")?;
        out.string_value(&user.name)?;
        out.name("password")?;
        out.string_value(&user.password)?;
        out.end_object()?;
        Ok(())
    }

    fn read(&self, input: &mut JsonReader<'_>, _codecs: &Codecs) -> Result<User, CodecError> {
        let mut user = User::default();
        input.begin_object()?;
        while input.has_next()? {
            match input.next_name()?.as_str() {
                "name" => user.name = input.next_string()?,
                "password" => user.password = input.next_string()?,
                _ => input.skip_value()?,
            }
        }
        input.end_object()?;
        Ok(user)
    }
}

/// Lenient registry with both domain types intercepted and complex map
/// keys enabled.
pub fn codecs() -> Codecs {
    Codecs::builder()
        .intercept::<User>()
        .intercept::<Address>()
        .enable_complex_map_key_serialization()
        .lenient()
        .build()
}

pub fn mountain_view() -> Address {
    Address {
        first_line: DEFAULT_FIRST_LINE.to_owned(),
        second_line: String::new(),
        city: "Mountain View".to_owned(),
        state: "CA".to_owned(),
        zip: "94043".to_owned(),
    }
}
