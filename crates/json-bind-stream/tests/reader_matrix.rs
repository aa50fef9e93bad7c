use json_bind_stream::{JsonReader, JsonStreamError, Token};

fn tokens(input: &str, lenient: bool) -> Result<Vec<Token>, JsonStreamError> {
    let mut reader = JsonReader::new(input).with_lenient(lenient);
    let mut out = Vec::new();
    loop {
        let token = reader.peek()?;
        out.push(token);
        match token {
            Token::BeginArray => reader.begin_array()?,
            Token::EndArray => reader.end_array()?,
            Token::BeginObject => reader.begin_object()?,
            Token::EndObject => reader.end_object()?,
            Token::Name => {
                reader.next_name()?;
            }
            Token::String => {
                reader.next_string()?;
            }
            Token::Number => {
                reader.next_number::<f64>()?;
            }
            Token::Bool => {
                reader.next_bool()?;
            }
            Token::Null => reader.next_null()?,
            Token::EndDocument => return Ok(out),
        }
    }
}

#[test]
fn strict_token_sequence_matrix() {
    use Token::*;
    let cases: Vec<(&str, Vec<Token>)> = vec![
        ("null", vec![Null, EndDocument]),
        ("  true ", vec![Bool, EndDocument]),
        ("-1.5e3", vec![Number, EndDocument]),
        (r#""s""#, vec![String, EndDocument]),
        ("[]", vec![BeginArray, EndArray, EndDocument]),
        ("{}", vec![BeginObject, EndObject, EndDocument]),
        (
            r#"{"a":[1,{"b":null}],"c":false}"#,
            vec![
                BeginObject, Name, BeginArray, Number, BeginObject, Name, Null, EndObject,
                EndArray, Name, Bool, EndObject, EndDocument,
            ],
        ),
        (
            "[[1,2],[3]]",
            vec![
                BeginArray, BeginArray, Number, Number, EndArray, BeginArray, Number, EndArray,
                EndArray, EndDocument,
            ],
        ),
    ];
    for (input, expected) in cases {
        assert_eq!(tokens(input, false).expect(input), expected, "{input}");
    }
}

#[test]
fn strict_mode_rejects_malformed_input() {
    for input in [
        "{a:1}",
        "{'a':1}",
        "['x']",
        "[1,]",
        "[1 2]",
        "{\"a\" 1}",
        "{\"a\":1,}",
        "tru",
        "01",
        "[1",
        "// c\n1",
        "1 2",
    ] {
        assert!(tokens(input, false).is_err(), "{input}");
    }
}

#[test]
fn lenient_mode_accepts_hand_written_documents() {
    let mut reader = JsonReader::new(
        "# header\n{name:'bob', 'pass word' = \"pwd\"; n => 3 /* c */, raw: hello}",
    )
    .with_lenient(true);
    reader.begin_object().unwrap();
    assert_eq!(reader.next_name().unwrap(), "name");
    assert_eq!(reader.next_string().unwrap(), "bob");
    assert_eq!(reader.next_name().unwrap(), "pass word");
    assert_eq!(reader.next_string().unwrap(), "pwd");
    assert_eq!(reader.next_name().unwrap(), "n");
    assert_eq!(reader.next_number::<i32>().unwrap(), 3);
    assert_eq!(reader.next_name().unwrap(), "raw");
    assert_eq!(reader.peek().unwrap(), Token::String);
    assert_eq!(reader.next_string().unwrap(), "hello");
    reader.end_object().unwrap();
    reader.finish().unwrap();
}

#[test]
fn lenient_mode_reads_several_top_level_values() {
    let mut reader = JsonReader::new("1 [2] NaN").with_lenient(true);
    assert_eq!(reader.next_number::<i64>().unwrap(), 1);
    reader.begin_array().unwrap();
    assert_eq!(reader.next_number::<i64>().unwrap(), 2);
    reader.end_array().unwrap();
    assert!(reader.next_number::<f64>().unwrap().is_nan());
    assert_eq!(reader.peek().unwrap(), Token::EndDocument);
}

#[test]
fn unexpected_token_reports_both_kinds() {
    let mut reader = JsonReader::new("[1]");
    let err = reader.begin_object().unwrap_err();
    assert!(matches!(
        err,
        JsonStreamError::UnexpectedToken {
            expected: Token::BeginObject,
            found: Token::BeginArray,
            ..
        }
    ));
}

#[test]
fn skip_value_skips_nested_structures() {
    let mut reader = JsonReader::new(r#"{"skip":{"a":[1,{"b":"}"}]},"keep":7}"#);
    reader.begin_object().unwrap();
    assert_eq!(reader.next_name().unwrap(), "skip");
    reader.skip_value().unwrap();
    assert_eq!(reader.next_name().unwrap(), "keep");
    assert_eq!(reader.next_number::<u8>().unwrap(), 7);
    reader.end_object().unwrap();
    reader.finish().unwrap();
}

#[test]
fn promoted_names_read_as_strings_and_numbers() {
    let mut reader = JsonReader::new(r#"{"12":"a","x":"b"}"#);
    reader.begin_object().unwrap();
    reader.promote_name_to_value().unwrap();
    assert_eq!(reader.peek().unwrap(), Token::String);
    assert_eq!(reader.next_number::<u32>().unwrap(), 12);
    assert_eq!(reader.next_string().unwrap(), "a");
    reader.promote_name_to_value().unwrap();
    assert_eq!(reader.next_string().unwrap(), "x");
    assert_eq!(reader.next_string().unwrap(), "b");
    reader.end_object().unwrap();
}

#[test]
fn finish_reports_trailing_data() {
    let mut reader = JsonReader::new("{} x").with_lenient(true);
    reader.begin_object().unwrap();
    reader.end_object().unwrap();
    assert!(matches!(
        reader.finish(),
        Err(JsonStreamError::TrailingData(_))
    ));

    let mut strict = JsonReader::new("{} {}");
    strict.begin_object().unwrap();
    strict.end_object().unwrap();
    assert!(matches!(
        strict.finish(),
        Err(JsonStreamError::TrailingData(3))
    ));
}

#[test]
fn strings_decode_escapes() {
    let mut reader = JsonReader::new(r#"["a\"b", "é\n", "😀"]"#);
    reader.begin_array().unwrap();
    assert_eq!(reader.next_string().unwrap(), "a\"b");
    assert_eq!(reader.next_string().unwrap(), "\u{e9}\n");
    assert_eq!(reader.next_string().unwrap(), "\u{1f600}");
    reader.end_array().unwrap();
}

#[test]
fn number_parse_failure_is_reported() {
    let mut reader = JsonReader::new("1.5");
    assert!(matches!(
        reader.next_number::<i32>(),
        Err(JsonStreamError::InvalidNumber { .. })
    ));
}

#[test]
fn nesting_depth_is_capped() {
    let deep = "[".repeat(100_000);
    assert_eq!(
        tokens(&deep, false),
        Err(JsonStreamError::Nesting("maximum nesting depth exceeded"))
    );

    let limit = json_bind_stream::DEFAULT_MAX_DEPTH;
    let at_limit = "[".repeat(limit) + &"]".repeat(limit);
    assert_eq!(tokens(&at_limit, false).unwrap().len(), 2 * limit + 1);
    let over_limit = "[".repeat(limit + 1) + &"]".repeat(limit + 1);
    assert!(matches!(
        tokens(&over_limit, false),
        Err(JsonStreamError::Nesting(_))
    ));

    let mut shallow = JsonReader::new(r#"{"a":{"b":[]}}"#).with_max_depth(2);
    shallow.begin_object().unwrap();
    shallow.next_name().unwrap();
    shallow.begin_object().unwrap();
    shallow.next_name().unwrap();
    assert!(matches!(
        shallow.begin_array(),
        Err(JsonStreamError::Nesting(_))
    ));
}

#[test]
fn raw_control_characters_are_strict_errors() {
    let mut strict = JsonReader::new("\"a\nb\"");
    assert!(matches!(
        strict.next_string(),
        Err(JsonStreamError::Malformed { offset: 2, .. })
    ));

    let mut lenient = JsonReader::new("['a\tb', \"c\nd\"]").with_lenient(true);
    lenient.begin_array().unwrap();
    assert_eq!(lenient.next_string().unwrap(), "a\tb");
    assert_eq!(lenient.next_string().unwrap(), "c\nd");
    lenient.end_array().unwrap();
}
