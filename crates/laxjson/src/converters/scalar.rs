//! String-or-native coercion for the scalar types.
//!
//! Each numeric converter accepts either a JSON number or a JSON string
//! holding the number's text and always writes a bare number. The string
//! converter writes strings but also reads bare numbers, stringifying them.

use std::str::FromStr;

use laxjson_tokens::{format_float, TokenKind, TokenReader, TokenWriter};
use rust_decimal::Decimal;

use crate::error::{CodecError, Result};
use crate::shape::Shape;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Int32,
    Float64,
    Int64,
    Decimal,
}

impl ScalarKind {
    pub fn shape(self) -> Shape {
        match self {
            ScalarKind::String => Shape::String,
            ScalarKind::Int32 => Shape::Int32,
            ScalarKind::Float64 => Shape::Float64,
            ScalarKind::Int64 => Shape::Int64,
            ScalarKind::Decimal => Shape::Decimal,
        }
    }
}

/// Converter bound to one scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarConverter {
    kind: ScalarKind,
}

impl ScalarConverter {
    pub fn new(kind: ScalarKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    pub fn target(&self) -> Shape {
        self.kind.shape()
    }

    pub fn read(&self, reader: &TokenReader<'_>) -> Result<Value> {
        let parsed = match (self.kind, reader.kind()) {
            (ScalarKind::String, TokenKind::String) => {
                return Ok(Value::String(reader.token_text().to_string()));
            }
            (ScalarKind::String, TokenKind::Number) => Some(Value::String(stringify_number(reader))),
            (ScalarKind::String, TokenKind::Null) => return Ok(Value::Null),
            (_, TokenKind::String) => self.parse(reader.token_text()),
            (ScalarKind::Int32, TokenKind::Number) => reader.try_get_i32().map(Value::Int32),
            (ScalarKind::Int64, TokenKind::Number) => reader.try_get_i64().map(Value::Int64),
            (ScalarKind::Float64, TokenKind::Number) => {
                reader.try_get_f64().filter(|f| f.is_finite()).map(Value::Float64)
            }
            (ScalarKind::Decimal, TokenKind::Number) => {
                reader.number_text().and_then(parse_decimal).map(Value::Decimal)
            }
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(reader.token_text()))
    }

    pub fn write(&self, value: &Value, writer: &mut TokenWriter) -> Result<()> {
        match (self.kind, value) {
            (ScalarKind::String, Value::String(s)) => writer.string_value(s),
            (ScalarKind::String, Value::Null) => writer.null_value(),
            (ScalarKind::Int32, Value::Int32(n)) => writer.i64_value(i64::from(*n)),
            (ScalarKind::Int64, Value::Int64(n)) => writer.i64_value(*n),
            (ScalarKind::Float64, Value::Float64(f)) => writer.f64_value(*f)?,
            (ScalarKind::Decimal, Value::Decimal(d)) => writer.raw_number_value(&d.to_string()),
            (_, other) => return Err(other.mismatch(self.target())),
        }
        Ok(())
    }

    fn parse(&self, text: &str) -> Option<Value> {
        match self.kind {
            ScalarKind::String => Some(Value::String(text.to_string())),
            ScalarKind::Int32 => parse_i32(text).map(Value::Int32),
            ScalarKind::Int64 => parse_i64(text).map(Value::Int64),
            ScalarKind::Float64 => parse_f64(text).map(Value::Float64),
            ScalarKind::Decimal => parse_decimal(text).map(Value::Decimal),
        }
    }

    fn invalid(&self, text: &str) -> CodecError {
        CodecError::InvalidScalarRepresentation {
            text: text.to_string(),
            target: self.target().to_string(),
        }
    }
}

/// Text of a number token as the string converter reports it: 32-bit
/// integers verbatim, anything else through the float formatter.
fn stringify_number(reader: &TokenReader<'_>) -> String {
    if let Some(n) = reader.try_get_i32() {
        return n.to_string();
    }
    match reader.try_get_f64() {
        Some(f) if f.is_finite() => format_float(f),
        _ => reader.token_text().to_string(),
    }
}

pub(crate) fn parse_i32(text: &str) -> Option<i32> {
    text.trim().parse().ok()
}

pub(crate) fn parse_i64(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

pub(crate) fn parse_f64(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Plain or scientific notation.
pub(crate) fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(kind: ScalarKind, json: &str) -> Result<Value> {
        let mut reader = TokenReader::new(json);
        reader.read().unwrap();
        ScalarConverter::new(kind).read(&reader)
    }

    fn write(kind: ScalarKind, value: Value) -> Result<String> {
        let mut writer = TokenWriter::new();
        ScalarConverter::new(kind).write(&value, &mut writer)?;
        Ok(writer.finish())
    }

    #[test]
    fn integers_accept_quoted_and_bare_forms() {
        assert_eq!(read(ScalarKind::Int32, "42").unwrap(), Value::Int32(42));
        assert_eq!(read(ScalarKind::Int32, "\" 42 \"").unwrap(), Value::Int32(42));
        assert_eq!(read(ScalarKind::Int64, "\"9000000000\"").unwrap(), Value::Int64(9_000_000_000));
        assert!(read(ScalarKind::Int32, "9000000000").is_err());
        assert!(read(ScalarKind::Int32, "1.5").is_err());
    }

    #[test]
    fn invalid_text_names_target() {
        let err = read(ScalarKind::Int64, "\"abc\"").unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidScalarRepresentation {
                text: "abc".into(),
                target: "Int64".into()
            }
        );
        assert!(read(ScalarKind::Float64, "true").is_err());
    }

    #[test]
    fn string_stringifies_numbers() {
        assert_eq!(read(ScalarKind::String, "12").unwrap(), Value::String("12".into()));
        assert_eq!(read(ScalarKind::String, "1.50").unwrap(), Value::String("1.5".into()));
        assert_eq!(
            read(ScalarKind::String, "9000000000").unwrap(),
            Value::String("9000000000".into())
        );
        assert_eq!(read(ScalarKind::String, "null").unwrap(), Value::Null);
        assert!(read(ScalarKind::String, "false").is_err());
    }

    #[test]
    fn decimal_keeps_scale() {
        let value = read(ScalarKind::Decimal, "\"0.9999999999\"").unwrap();
        assert_eq!(write(ScalarKind::Decimal, value).unwrap(), "0.9999999999");
        assert_eq!(
            read(ScalarKind::Decimal, "1.5e3").unwrap(),
            Value::Decimal(Decimal::new(1500, 0))
        );
    }

    #[test]
    fn writes_native_numbers() {
        assert_eq!(write(ScalarKind::Float64, Value::Float64(2.5)).unwrap(), "2.5");
        assert_eq!(write(ScalarKind::Int32, Value::Int32(-7)).unwrap(), "-7");
        assert_eq!(write(ScalarKind::String, Value::String("7".into())).unwrap(), "\"7\"");
        assert!(write(ScalarKind::Float64, Value::Float64(f64::NAN)).is_err());
        assert!(write(ScalarKind::Int32, Value::Int64(1)).is_err());
    }

    #[test]
    fn bool_text_ignores_case() {
        assert_eq!(parse_bool(" TRUE "), Some(true));
        assert_eq!(parse_bool("no"), None);
    }
}
