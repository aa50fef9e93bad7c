//! `JsonReader`: pull tokenizer over UTF-8 JSON text.
//!
//! The reader never builds a tree. It keeps a nesting stack and the kind of
//! the next token, and decodes scalars only when they are consumed.

use std::fmt;
use std::str::FromStr;

use crate::error::JsonStreamError;
use crate::scope::{Scope, DEFAULT_MAX_DEPTH};

/// Kind of the next token in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    BeginArray,
    EndArray,
    BeginObject,
    EndObject,
    Name,
    String,
    Number,
    Bool,
    Null,
    EndDocument,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::BeginArray => "BEGIN_ARRAY",
            Token::EndArray => "END_ARRAY",
            Token::BeginObject => "BEGIN_OBJECT",
            Token::EndObject => "END_OBJECT",
            Token::Name => "NAME",
            Token::String => "STRING",
            Token::Number => "NUMBER",
            Token::Bool => "BOOLEAN",
            Token::Null => "NULL",
            Token::EndDocument => "END_DOCUMENT",
        };
        f.write_str(text)
    }
}

/// Lexed-but-unconsumed token. Quoted tokens leave the cursor just past the
/// opening quote; literal tokens carry their byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Peeked {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    True,
    False,
    Null,
    Quoted(u8),
    Unquoted(usize, usize),
    Number(usize, usize),
    QuotedName(u8),
    UnquotedName(usize, usize),
    /// A member name promoted to a string value.
    Buffered,
    Eof,
}

impl Peeked {
    fn token(self) -> Token {
        match self {
            Peeked::BeginObject => Token::BeginObject,
            Peeked::EndObject => Token::EndObject,
            Peeked::BeginArray => Token::BeginArray,
            Peeked::EndArray => Token::EndArray,
            Peeked::True | Peeked::False => Token::Bool,
            Peeked::Null => Token::Null,
            Peeked::Quoted(_) | Peeked::Unquoted(..) | Peeked::Buffered => Token::String,
            Peeked::Number(..) => Token::Number,
            Peeked::QuotedName(_) | Peeked::UnquotedName(..) => Token::Name,
            Peeked::Eof => Token::EndDocument,
        }
    }
}

pub struct JsonReader<'a> {
    data: &'a [u8],
    x: usize,
    stack: Vec<Scope>,
    peeked: Option<Peeked>,
    buffered: Option<String>,
    lenient: bool,
    max_depth: usize,
}

impl<'a> JsonReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::from_slice(input.as_bytes())
    }

    pub fn from_slice(input: &'a [u8]) -> Self {
        Self {
            data: input,
            x: 0,
            stack: vec![Scope::EmptyDocument],
            peeked: None,
            buffered: None,
            lenient: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    pub fn set_lenient(&mut self, lenient: bool) {
        self.lenient = lenient;
    }

    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    /// Caps array/object nesting. Opening a container deeper than
    /// `max_depth` fails with [`JsonStreamError::Nesting`].
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Byte offset of the cursor.
    pub fn position(&self) -> usize {
        self.x
    }

    pub fn peek(&mut self) -> Result<Token, JsonStreamError> {
        Ok(self.peeked()?.token())
    }

    pub fn has_next(&mut self) -> Result<bool, JsonStreamError> {
        let p = self.peeked()?;
        Ok(!matches!(p, Peeked::EndObject | Peeked::EndArray | Peeked::Eof))
    }

    pub fn begin_array(&mut self) -> Result<(), JsonStreamError> {
        match self.peeked()? {
            Peeked::BeginArray => {
                self.enter(Scope::EmptyArray)?;
                self.peeked = None;
                Ok(())
            }
            p => Err(self.unexpected(Token::BeginArray, p)),
        }
    }

    pub fn end_array(&mut self) -> Result<(), JsonStreamError> {
        match self.peeked()? {
            Peeked::EndArray => {
                self.stack.pop();
                self.peeked = None;
                Ok(())
            }
            p => Err(self.unexpected(Token::EndArray, p)),
        }
    }

    pub fn begin_object(&mut self) -> Result<(), JsonStreamError> {
        match self.peeked()? {
            Peeked::BeginObject => {
                self.enter(Scope::EmptyObject)?;
                self.peeked = None;
                Ok(())
            }
            p => Err(self.unexpected(Token::BeginObject, p)),
        }
    }

    pub fn end_object(&mut self) -> Result<(), JsonStreamError> {
        match self.peeked()? {
            Peeked::EndObject => {
                self.stack.pop();
                self.peeked = None;
                Ok(())
            }
            p => Err(self.unexpected(Token::EndObject, p)),
        }
    }

    pub fn next_name(&mut self) -> Result<String, JsonStreamError> {
        match self.peeked()? {
            Peeked::QuotedName(quote) => self.read_quoted(quote),
            Peeked::UnquotedName(start, end) => self.take_literal(start, end),
            p => Err(self.unexpected(Token::Name, p)),
        }
    }

    /// Consumes a string value. Numbers and unquoted literals are returned
    /// as their source text.
    pub fn next_string(&mut self) -> Result<String, JsonStreamError> {
        match self.peeked()? {
            Peeked::Quoted(quote) => self.read_quoted(quote),
            Peeked::Unquoted(start, end) | Peeked::Number(start, end) => {
                self.take_literal(start, end)
            }
            Peeked::Buffered => {
                self.peeked = None;
                Ok(self.buffered.take().unwrap_or_default())
            }
            p => Err(self.unexpected(Token::String, p)),
        }
    }

    pub fn next_bool(&mut self) -> Result<bool, JsonStreamError> {
        match self.peeked()? {
            Peeked::True => {
                self.peeked = None;
                Ok(true)
            }
            Peeked::False => {
                self.peeked = None;
                Ok(false)
            }
            p => Err(self.unexpected(Token::Bool, p)),
        }
    }

    pub fn next_null(&mut self) -> Result<(), JsonStreamError> {
        match self.peeked()? {
            Peeked::Null => {
                self.peeked = None;
                Ok(())
            }
            p => Err(self.unexpected(Token::Null, p)),
        }
    }

    /// Consumes a number and parses it as `N`.
    ///
    /// Quoted strings are accepted as well, so a member name promoted with
    /// [`JsonReader::promote_name_to_value`] can be read back as a number.
    pub fn next_number<N: FromStr>(&mut self) -> Result<N, JsonStreamError> {
        let offset = self.x;
        let text = match self.peeked()? {
            Peeked::Number(start, end) | Peeked::Unquoted(start, end) => {
                self.take_literal(start, end)?
            }
            Peeked::Quoted(quote) => self.read_quoted(quote)?,
            Peeked::Buffered => {
                self.peeked = None;
                self.buffered.take().unwrap_or_default()
            }
            p => return Err(self.unexpected(Token::Number, p)),
        };
        text.trim()
            .parse::<N>()
            .map_err(|_| JsonStreamError::InvalidNumber { text, offset })
    }

    /// Skips the next value, including any nested arrays and objects. When
    /// positioned on a member name, only the name is skipped.
    pub fn skip_value(&mut self) -> Result<(), JsonStreamError> {
        let mut depth = 0usize;
        loop {
            match self.peeked()? {
                Peeked::BeginArray => {
                    self.begin_array()?;
                    depth += 1;
                }
                Peeked::BeginObject => {
                    self.begin_object()?;
                    depth += 1;
                }
                Peeked::EndArray if depth > 0 => {
                    self.end_array()?;
                    depth -= 1;
                }
                Peeked::EndObject if depth > 0 => {
                    self.end_object()?;
                    depth -= 1;
                }
                Peeked::Quoted(quote) | Peeked::QuotedName(quote) => {
                    self.x = self.find_closing_quote(quote)? + 1;
                    self.peeked = None;
                }
                Peeked::Buffered => {
                    self.buffered = None;
                    self.peeked = None;
                }
                p @ (Peeked::EndArray | Peeked::EndObject | Peeked::Eof) => {
                    return Err(JsonStreamError::Malformed {
                        offset: self.x,
                        reason: match p {
                            Peeked::Eof => "no value to skip at end of document",
                            _ => "no value to skip at end of container",
                        },
                    });
                }
                _ => self.peeked = None,
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }

    /// Turns the pending member name into a string value, so that a value
    /// codec can decode it.
    pub fn promote_name_to_value(&mut self) -> Result<(), JsonStreamError> {
        let name = self.next_name()?;
        self.buffered = Some(name);
        self.peeked = Some(Peeked::Buffered);
        Ok(())
    }

    /// Asserts that the whole document has been consumed.
    pub fn finish(&mut self) -> Result<(), JsonStreamError> {
        match self.peeked()? {
            Peeked::Eof => Ok(()),
            _ => Err(JsonStreamError::TrailingData(self.x)),
        }
    }

    fn enter(&mut self, scope: Scope) -> Result<(), JsonStreamError> {
        // The bottom of the stack is the document itself.
        if self.stack.len() > self.max_depth {
            return Err(JsonStreamError::Nesting("maximum nesting depth exceeded"));
        }
        self.stack.push(scope);
        Ok(())
    }

    fn peeked(&mut self) -> Result<Peeked, JsonStreamError> {
        match self.peeked {
            Some(p) => Ok(p),
            None => {
                let p = self.do_peek()?;
                self.peeked = Some(p);
                Ok(p)
            }
        }
    }

    fn do_peek(&mut self) -> Result<Peeked, JsonStreamError> {
        let top = self.stack.len() - 1;
        let scope = self.stack[top];
        match scope {
            Scope::EmptyArray => self.stack[top] = Scope::NonEmptyArray,
            Scope::NonEmptyArray => match self.next_non_whitespace()? {
                b']' => return Ok(Peeked::EndArray),
                b',' => {}
                b';' if self.lenient => {}
                _ => return Err(self.malformed("unterminated array")),
            },
            Scope::EmptyObject | Scope::NonEmptyObject => {
                self.stack[top] = Scope::DanglingName;
                if scope == Scope::NonEmptyObject {
                    match self.next_non_whitespace()? {
                        b'}' => return Ok(Peeked::EndObject),
                        b',' => {}
                        b';' if self.lenient => {}
                        _ => return Err(self.malformed("unterminated object")),
                    }
                }
                return match self.next_non_whitespace()? {
                    b'"' => Ok(Peeked::QuotedName(b'"')),
                    b'\'' if self.lenient => Ok(Peeked::QuotedName(b'\'')),
                    b'}' if scope == Scope::EmptyObject => Ok(Peeked::EndObject),
                    c if self.lenient && is_literal(c) => {
                        let start = self.x - 1;
                        let end = self.literal_end(start);
                        self.x = end;
                        Ok(Peeked::UnquotedName(start, end))
                    }
                    _ => Err(self.malformed("expected a member name")),
                };
            }
            Scope::DanglingName => {
                self.stack[top] = Scope::NonEmptyObject;
                match self.next_non_whitespace()? {
                    b':' => {}
                    b'=' if self.lenient => {
                        if self.data.get(self.x) == Some(&b'>') {
                            self.x += 1;
                        }
                    }
                    _ => return Err(self.malformed("expected ':'")),
                }
            }
            Scope::EmptyDocument => self.stack[top] = Scope::NonEmptyDocument,
            Scope::NonEmptyDocument => match self.next_non_whitespace_or_eof() {
                None => return Ok(Peeked::Eof),
                Some(_) if self.lenient => self.x -= 1,
                Some(_) => return Err(JsonStreamError::TrailingData(self.x - 1)),
            },
        }

        match self.next_non_whitespace()? {
            b']' if scope == Scope::EmptyArray => Ok(Peeked::EndArray),
            b'"' => Ok(Peeked::Quoted(b'"')),
            b'\'' if self.lenient => Ok(Peeked::Quoted(b'\'')),
            b'[' => Ok(Peeked::BeginArray),
            b'{' => Ok(Peeked::BeginObject),
            _ => {
                self.x -= 1;
                self.peek_literal()
            }
        }
    }

    fn peek_literal(&mut self) -> Result<Peeked, JsonStreamError> {
        let start = self.x;
        let end = self.literal_end(start);
        let text = &self.data[start..end];
        let peeked = match text {
            b"true" => Peeked::True,
            b"false" => Peeked::False,
            b"null" => Peeked::Null,
            _ if is_json_number(text) => Peeked::Number(start, end),
            _ if self.lenient && !text.is_empty() => Peeked::Unquoted(start, end),
            _ => return Err(self.malformed("expected a value")),
        };
        self.x = end;
        Ok(peeked)
    }

    fn take_literal(&mut self, start: usize, end: usize) -> Result<String, JsonStreamError> {
        self.peeked = None;
        std::str::from_utf8(&self.data[start..end])
            .map(str::to_owned)
            .map_err(|_| JsonStreamError::InvalidUtf8(start))
    }

    fn read_quoted(&mut self, quote: u8) -> Result<String, JsonStreamError> {
        let start = self.x;
        let end = self.find_closing_quote(quote)?;
        self.x = end + 1;
        self.peeked = None;
        decode_string_body(&self.data[start..end], quote, start, self.lenient)
    }

    fn find_closing_quote(&self, quote: u8) -> Result<usize, JsonStreamError> {
        let data = self.data;
        let mut x = self.x;
        while x < data.len() {
            match data[x] {
                b'\\' => x += 2,
                c if c == quote => return Ok(x),
                _ => x += 1,
            }
        }
        Err(JsonStreamError::UnexpectedEof(data.len()))
    }

    fn literal_end(&self, start: usize) -> usize {
        let mut x = start;
        while x < self.data.len() && is_literal(self.data[x]) {
            x += 1;
        }
        x
    }

    fn next_non_whitespace(&mut self) -> Result<u8, JsonStreamError> {
        self.next_non_whitespace_or_eof()
            .ok_or(JsonStreamError::UnexpectedEof(self.data.len()))
    }

    /// Returns the next significant byte and moves the cursor past it.
    fn next_non_whitespace_or_eof(&mut self) -> Option<u8> {
        let data = self.data;
        while self.x < data.len() {
            let c = data[self.x];
            self.x += 1;
            match c {
                b' ' | b'\t' | b'\n' | b'\r' => {}
                b'#' if self.lenient => self.skip_to_line_end(),
                b'/' if self.lenient && data.get(self.x) == Some(&b'/') => self.skip_to_line_end(),
                b'/' if self.lenient && data.get(self.x) == Some(&b'*') => {
                    self.x += 1;
                    match find(&data[self.x..], b"*/") {
                        Some(at) => self.x += at + 2,
                        None => self.x = data.len(),
                    }
                }
                _ => return Some(c),
            }
        }
        None
    }

    fn skip_to_line_end(&mut self) {
        while self.x < self.data.len() {
            let c = self.data[self.x];
            self.x += 1;
            if c == b'\n' || c == b'\r' {
                break;
            }
        }
    }

    fn malformed(&self, reason: &'static str) -> JsonStreamError {
        JsonStreamError::Malformed {
            offset: self.x.saturating_sub(1),
            reason,
        }
    }

    fn unexpected(&self, expected: Token, found: Peeked) -> JsonStreamError {
        JsonStreamError::UnexpectedToken {
            expected,
            found: found.token(),
            offset: self.x,
        }
    }
}

fn is_literal(c: u8) -> bool {
    !matches!(
        c,
        b'/' | b'\\'
            | b';'
            | b'#'
            | b'='
            | b'{'
            | b'}'
            | b'['
            | b']'
            | b':'
            | b','
            | b' '
            | b'\t'
            | b'\x0c'
            | b'\r'
            | b'\n'
            | b'"'
            | b'\''
    )
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`
fn is_json_number(text: &[u8]) -> bool {
    let mut x = 0;
    let len = text.len();
    if x < len && text[x] == b'-' {
        x += 1;
    }
    match text.get(x) {
        Some(b'0') => x += 1,
        Some(b'1'..=b'9') => {
            while x < len && text[x].is_ascii_digit() {
                x += 1;
            }
        }
        _ => return false,
    }
    if x < len && text[x] == b'.' {
        x += 1;
        let digits = x;
        while x < len && text[x].is_ascii_digit() {
            x += 1;
        }
        if x == digits {
            return false;
        }
    }
    if x < len && (text[x] == b'e' || text[x] == b'E') {
        x += 1;
        if x < len && (text[x] == b'+' || text[x] == b'-') {
            x += 1;
        }
        let digits = x;
        while x < len && text[x].is_ascii_digit() {
            x += 1;
        }
        if x == digits {
            return false;
        }
    }
    x == len
}

/// Decodes a string body (between the quotes), handling escapes. Escape
/// handling is delegated to serde_json; single-quoted bodies and raw control
/// characters (lenient only) are rewritten into strict form first.
fn decode_string_body(
    body: &[u8],
    quote: u8,
    offset: usize,
    lenient: bool,
) -> Result<String, JsonStreamError> {
    let control = body.iter().position(|&b| b < 0x20);
    if let (Some(at), false) = (control, lenient) {
        return Err(JsonStreamError::Malformed {
            offset: offset + at,
            reason: "unescaped control character in string",
        });
    }
    if control.is_none() && !body.contains(&b'\\') {
        return std::str::from_utf8(body)
            .map(str::to_owned)
            .map_err(|_| JsonStreamError::InvalidUtf8(offset));
    }
    let mut quoted = Vec::with_capacity(body.len() + 2);
    quoted.push(b'"');
    let mut x = 0;
    while x < body.len() {
        match body[x] {
            b'\\' if quote == b'\'' && body.get(x + 1) == Some(&b'\'') => {
                quoted.push(b'\'');
                x += 2;
                continue;
            }
            b'\\' => {
                quoted.push(b'\\');
                if let Some(&next) = body.get(x + 1) {
                    quoted.push(next);
                }
                x += 2;
                continue;
            }
            b'"' => quoted.extend_from_slice(b"\\\""),
            c if c < 0x20 => quoted.extend_from_slice(format!("\\u{c:04x}").as_bytes()),
            c => quoted.push(c),
        }
        x += 1;
    }
    quoted.push(b'"');
    serde_json::from_slice(&quoted).map_err(|_| JsonStreamError::InvalidEscape(offset))
}
