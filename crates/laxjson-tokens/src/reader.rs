//! `TokenReader`: forward-only pull cursor over UTF-8 JSON text.
//!
//! The reader validates structure (separators, nesting, literals) as it goes
//! but never materializes values: callers inspect the current token and pull
//! the next one. Running out of input is reported as `Ok(false)` from
//! [`TokenReader::read`], even inside an open container, so that container
//! decoders can name the token they were waiting for.

use std::fmt;

use crate::TokenError;

/// Kind of the token under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// No token has been read yet, or the input is exhausted.
    None,
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    PropertyName,
    String,
    Number,
    True,
    False,
    Null,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::None => "None",
            TokenKind::StartObject => "StartObject",
            TokenKind::EndObject => "EndObject",
            TokenKind::StartArray => "StartArray",
            TokenKind::EndArray => "EndArray",
            TokenKind::PropertyName => "PropertyName",
            TokenKind::String => "String",
            TokenKind::Number => "Number",
            TokenKind::True => "True",
            TokenKind::False => "False",
            TokenKind::Null => "Null",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

/// Pull reader over a JSON document.
///
/// # Example
///
/// ```
/// use laxjson_tokens::{TokenKind, TokenReader};
///
/// let mut reader = TokenReader::new(r#"{"a":[1,"x"]}"#);
/// let mut kinds = Vec::new();
/// while reader.read().unwrap() {
///     kinds.push(reader.kind());
/// }
/// assert_eq!(
///     kinds,
///     [
///         TokenKind::StartObject,
///         TokenKind::PropertyName,
///         TokenKind::StartArray,
///         TokenKind::Number,
///         TokenKind::String,
///         TokenKind::EndArray,
///         TokenKind::EndObject,
///     ]
/// );
/// ```
pub struct TokenReader<'a> {
    data: &'a str,
    x: usize,
    kind: TokenKind,
    /// Byte range of the current token in `data`.
    span: (usize, usize),
    /// Unescaped text of the current string or property-name token.
    text: String,
    stack: Vec<Container>,
    /// A member has been completed in the innermost container.
    need_comma: bool,
    /// A property name was read; its value comes next.
    expect_value: bool,
    root_done: bool,
}

impl<'a> TokenReader<'a> {
    pub fn new(data: &'a str) -> Self {
        Self {
            data,
            x: 0,
            kind: TokenKind::None,
            span: (0, 0),
            text: String::new(),
            stack: Vec::new(),
            need_comma: false,
            expect_value: false,
            root_done: false,
        }
    }

    /// Advances to the next token.
    ///
    /// Returns `Ok(false)` once the input is exhausted.
    pub fn read(&mut self) -> Result<bool, TokenError> {
        self.skip_whitespace();
        if self.x >= self.data.len() {
            self.kind = TokenKind::None;
            self.span = (self.x, self.x);
            return Ok(false);
        }
        if self.stack.is_empty() && self.root_done {
            return Err(self.invalid("unexpected data after root value"));
        }
        let ch = self.byte();
        match self.stack.last().copied() {
            Some(Container::Object) if !self.expect_value => {
                if ch == b'}' {
                    self.x += 1;
                    self.end_container(TokenKind::EndObject);
                    return Ok(true);
                }
                if self.need_comma {
                    if ch != b',' {
                        return Err(self.invalid("expected ',' or '}'"));
                    }
                    self.x += 1;
                    self.skip_whitespace();
                    if self.x >= self.data.len() {
                        self.kind = TokenKind::None;
                        return Ok(false);
                    }
                }
                self.read_property_name()?;
                Ok(true)
            }
            Some(Container::Array) if ch == b']' => {
                self.x += 1;
                self.end_container(TokenKind::EndArray);
                Ok(true)
            }
            Some(Container::Array) if self.need_comma => {
                if ch != b',' {
                    return Err(self.invalid("expected ',' or ']'"));
                }
                self.x += 1;
                self.skip_whitespace();
                if self.x >= self.data.len() {
                    self.kind = TokenKind::None;
                    return Ok(false);
                }
                self.read_value()?;
                Ok(true)
            }
            _ => {
                self.expect_value = false;
                self.read_value()?;
                Ok(true)
            }
        }
    }

    /// Skips the value under the cursor.
    ///
    /// On a start token the whole container is consumed and the cursor is
    /// left on its end token. On a property name, the property's value is
    /// skipped.
    pub fn skip(&mut self) -> Result<(), TokenError> {
        if self.kind == TokenKind::PropertyName {
            if !self.read()? {
                return Err(self.unexpected_end());
            }
        }
        if matches!(self.kind, TokenKind::StartObject | TokenKind::StartArray) {
            let depth = self.stack.len();
            while self.stack.len() >= depth {
                if !self.read()? {
                    return Err(self.unexpected_end());
                }
            }
        }
        Ok(())
    }

    /// Verifies that the root value is complete and only whitespace remains.
    pub fn finish(&mut self) -> Result<(), TokenError> {
        self.skip_whitespace();
        if self.x < self.data.len() {
            return Err(self.invalid("unexpected data after root value"));
        }
        if !self.stack.is_empty() || !self.root_done {
            return Err(self.unexpected_end());
        }
        Ok(())
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Nesting depth of the cursor (number of open containers).
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Byte offset just past the current token.
    pub fn position(&self) -> usize {
        self.x
    }

    /// Unescaped text of a `String` or `PropertyName` token.
    pub fn string_value(&self) -> Option<&str> {
        match self.kind {
            TokenKind::String | TokenKind::PropertyName => Some(&self.text),
            _ => None,
        }
    }

    /// Raw text of a `Number` token.
    pub fn number_text(&self) -> Option<&'a str> {
        match self.kind {
            TokenKind::Number => Some(&self.data[self.span.0..self.span.1]),
            _ => None,
        }
    }

    /// Text of the current token as it appeared in the input, with strings
    /// unescaped and unquoted.
    pub fn token_text(&self) -> &str {
        match self.kind {
            TokenKind::String | TokenKind::PropertyName => &self.text,
            _ => &self.data[self.span.0..self.span.1],
        }
    }

    pub fn try_get_i32(&self) -> Option<i32> {
        self.number_text().and_then(|s| s.parse().ok())
    }

    pub fn try_get_i64(&self) -> Option<i64> {
        self.number_text().and_then(|s| s.parse().ok())
    }

    pub fn try_get_f64(&self) -> Option<f64> {
        self.number_text().and_then(|s| s.parse().ok())
    }

    fn byte(&self) -> u8 {
        self.data.as_bytes()[self.x]
    }

    fn skip_whitespace(&mut self) {
        let data = self.data.as_bytes();
        while self.x < data.len() {
            match data[self.x] {
                b' ' | b'\t' | b'\n' | b'\r' => self.x += 1,
                _ => break,
            }
        }
    }

    fn read_property_name(&mut self) -> Result<(), TokenError> {
        if self.byte() != b'"' {
            return Err(self.invalid("expected property name"));
        }
        let start = self.x;
        self.text = self.read_str()?;
        self.span = (start, self.x);
        self.skip_whitespace();
        if self.x >= self.data.len() {
            return Err(self.unexpected_end());
        }
        if self.byte() != b':' {
            return Err(self.invalid("expected ':' after property name"));
        }
        self.x += 1;
        self.kind = TokenKind::PropertyName;
        self.expect_value = true;
        Ok(())
    }

    fn read_value(&mut self) -> Result<(), TokenError> {
        self.expect_value = false;
        let start = self.x;
        match self.byte() {
            b'{' => {
                self.x += 1;
                self.begin_container(Container::Object, TokenKind::StartObject, start);
                return Ok(());
            }
            b'[' => {
                self.x += 1;
                self.begin_container(Container::Array, TokenKind::StartArray, start);
                return Ok(());
            }
            b'"' => {
                self.text = self.read_str()?;
                self.kind = TokenKind::String;
            }
            b't' => self.read_literal("true", TokenKind::True)?,
            b'f' => self.read_literal("false", TokenKind::False)?,
            b'n' => self.read_literal("null", TokenKind::Null)?,
            b'-' | b'0'..=b'9' => self.read_num()?,
            _ => return Err(self.invalid("unexpected character")),
        }
        self.span = (start, self.x);
        self.complete_value();
        Ok(())
    }

    fn read_literal(&mut self, literal: &'static str, kind: TokenKind) -> Result<(), TokenError> {
        let end = self.x + literal.len();
        if end > self.data.len() || &self.data.as_bytes()[self.x..end] != literal.as_bytes() {
            return Err(self.invalid("invalid literal"));
        }
        self.x = end;
        self.kind = kind;
        Ok(())
    }

    fn read_num(&mut self) -> Result<(), TokenError> {
        let data = self.data.as_bytes();
        let len = data.len();
        let mut x = self.x;

        if x < len && data[x] == b'-' {
            x += 1;
        }
        let int_start = x;
        while x < len && data[x].is_ascii_digit() {
            x += 1;
        }
        if x == int_start {
            return Err(self.invalid("expected digit"));
        }
        if data[int_start] == b'0' && x - int_start > 1 {
            return Err(TokenError::Invalid {
                position: int_start,
                reason: "leading zero",
            });
        }
        if x < len && data[x] == b'.' {
            x += 1;
            let frac_start = x;
            while x < len && data[x].is_ascii_digit() {
                x += 1;
            }
            if x == frac_start {
                return Err(self.invalid("expected digit after '.'"));
            }
        }
        if x < len && (data[x] == b'e' || data[x] == b'E') {
            x += 1;
            if x < len && (data[x] == b'+' || data[x] == b'-') {
                x += 1;
            }
            let exp_start = x;
            while x < len && data[x].is_ascii_digit() {
                x += 1;
            }
            if x == exp_start {
                return Err(self.invalid("expected exponent digits"));
            }
        }
        self.x = x;
        self.kind = TokenKind::Number;
        Ok(())
    }

    fn read_str(&mut self) -> Result<String, TokenError> {
        let data = self.data.as_bytes();
        let x0 = self.x + 1;
        let x1 = find_ending_quote(data, x0).ok_or_else(|| TokenError::UnexpectedEnd {
            position: data.len(),
        })?;
        let body = &self.data[x0..x1];
        let s = decode_json_string(body).ok_or_else(|| self.invalid("invalid string"))?;
        self.x = x1 + 1;
        Ok(s)
    }

    fn begin_container(&mut self, container: Container, kind: TokenKind, start: usize) {
        self.stack.push(container);
        self.need_comma = false;
        self.kind = kind;
        self.span = (start, self.x);
    }

    fn end_container(&mut self, kind: TokenKind) {
        self.stack.pop();
        self.kind = kind;
        self.span = (self.x - 1, self.x);
        self.complete_value();
    }

    fn complete_value(&mut self) {
        if self.stack.is_empty() {
            self.root_done = true;
        } else {
            self.need_comma = true;
        }
    }

    fn invalid(&self, reason: &'static str) -> TokenError {
        TokenError::Invalid {
            position: self.x,
            reason,
        }
    }

    fn unexpected_end(&self) -> TokenError {
        TokenError::UnexpectedEnd { position: self.x }
    }
}

/// Index of the closing quote of a string body starting at `x`.
fn find_ending_quote(data: &[u8], mut x: usize) -> Option<usize> {
    while x < data.len() {
        match data[x] {
            b'"' => return Some(x),
            b'\\' => x += 2,
            _ => x += 1,
        }
    }
    None
}

/// Decodes a JSON string body (between the quotes), resolving escapes.
fn decode_json_string(body: &str) -> Option<String> {
    if !body.contains('\\') {
        if body.bytes().any(|b| b < 0x20) {
            return None;
        }
        return Some(body.to_string());
    }
    let mut quoted = String::with_capacity(body.len() + 2);
    quoted.push('"');
    quoted.push_str(body);
    quoted.push('"');
    serde_json::from_str(&quoted).ok()
}
