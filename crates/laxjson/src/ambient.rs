//! Decoding and encoding through the registry, with structural handling for
//! shapes no converter claims.
//!
//! Options, sequences, string-keyed maps, records and booleans always come
//! through here. Scalars only do when the registry lacks their converter,
//! and then they are read strictly: numbers must be number tokens and
//! strings must be string tokens. Enums fall back to their discriminant.

use chrono::{DateTime, NaiveDateTime};
use indexmap::IndexMap;
use laxjson_tokens::{TokenError, TokenKind, TokenReader, TokenWriter};

use crate::converters::scalar::parse_decimal;
use crate::error::{CodecError, Result};
use crate::options::CodecOptions;
use crate::shape::{FieldDef, RecordDef, Shape};
use crate::value::{MapKey, RecordValue, Value};

const ISO_NAIVE: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Moves to the next token inside a container closed by `closing`. Input
/// that runs out first, even in the middle of a token, leaves the container
/// unterminated.
pub(crate) fn advance(reader: &mut TokenReader<'_>, closing: TokenKind) -> Result<()> {
    match reader.read() {
        Ok(true) => Ok(()),
        Ok(false) | Err(TokenError::UnexpectedEnd { .. }) => {
            Err(CodecError::UnterminatedContainer { expected: closing })
        }
        Err(err) => Err(err.into()),
    }
}

impl CodecOptions {
    /// Reads one value of `shape` starting at the reader's current token.
    ///
    /// The registered converter for `shape` is used when there is one;
    /// otherwise the value is read structurally, recursing back through this
    /// method for nested values.
    pub fn read_value(&self, reader: &mut TokenReader<'_>, shape: &Shape) -> Result<Value> {
        match self.resolve(shape) {
            Some(converter) => converter.read(reader, self),
            None => self.read_structural(reader, shape),
        }
    }

    /// Writes `value` as `shape`, through the registered converter when there
    /// is one.
    pub fn write_value(&self, value: &Value, shape: &Shape, writer: &mut TokenWriter) -> Result<()> {
        if let Shape::Option(inner) = shape {
            return match value {
                Value::Null => {
                    writer.null_value();
                    Ok(())
                }
                value => self.write_value(value, inner, writer),
            };
        }
        match self.resolve(shape) {
            Some(converter) => converter.write(value, writer, self),
            None => self.write_structural(value, shape, writer),
        }
    }

    fn read_structural(&self, reader: &mut TokenReader<'_>, shape: &Shape) -> Result<Value> {
        let kind = reader.kind();
        let unexpected = || CodecError::UnexpectedToken {
            expected: shape.to_string(),
            found: kind,
        };
        match shape {
            Shape::Option(inner) => match kind {
                TokenKind::Null => Ok(Value::Null),
                _ => self.read_value(reader, inner),
            },
            Shape::Bool => match kind {
                TokenKind::True => Ok(Value::Bool(true)),
                TokenKind::False => Ok(Value::Bool(false)),
                _ => Err(unexpected()),
            },
            Shape::Int32 | Shape::Int64 | Shape::Float64 | Shape::Decimal => {
                if kind != TokenKind::Number {
                    return Err(unexpected());
                }
                let value = match shape {
                    Shape::Int32 => reader.try_get_i32().map(Value::Int32),
                    Shape::Int64 => reader.try_get_i64().map(Value::Int64),
                    Shape::Float64 => reader.try_get_f64().filter(|f| f.is_finite()).map(Value::Float64),
                    _ => reader.number_text().and_then(parse_decimal).map(Value::Decimal),
                };
                value.ok_or_else(|| CodecError::InvalidScalarRepresentation {
                    text: reader.token_text().to_string(),
                    target: shape.to_string(),
                })
            }
            Shape::String => match kind {
                TokenKind::String => Ok(Value::String(reader.token_text().to_string())),
                TokenKind::Null => Ok(Value::Null),
                _ => Err(unexpected()),
            },
            Shape::DateTime | Shape::DateTimeOffset => {
                if kind != TokenKind::String {
                    return Err(unexpected());
                }
                let text = reader.token_text();
                parse_iso_date(text, shape).ok_or_else(|| CodecError::InvalidScalarRepresentation {
                    text: text.to_string(),
                    target: shape.to_string(),
                })
            }
            Shape::Enum(def) => {
                let member = reader
                    .try_get_i64()
                    .and_then(|n| def.member_for(n))
                    .map(|member| Value::Enum(member.to_string()));
                match (kind, member) {
                    (TokenKind::Number, Some(member)) => Ok(member),
                    (TokenKind::Number, None) => Err(CodecError::UnknownEnumMember {
                        member: reader.token_text().to_string(),
                        target: def.name.clone(),
                    }),
                    _ => Err(unexpected()),
                }
            }
            Shape::Seq(item) => match kind {
                TokenKind::Null => Ok(Value::Null),
                TokenKind::StartArray => self.read_seq(reader, item),
                found => Err(CodecError::MalformedContainer {
                    expected: TokenKind::StartArray,
                    found,
                }),
            },
            Shape::Map { key, value, .. } => {
                if !key.is_string() {
                    return Err(CodecError::Unsupported {
                        target: shape.to_string(),
                    });
                }
                match kind {
                    TokenKind::Null => Ok(Value::Null),
                    TokenKind::StartObject => self.read_string_map(reader, value),
                    found => Err(CodecError::MalformedContainer {
                        expected: TokenKind::StartObject,
                        found,
                    }),
                }
            }
            Shape::Record(def) => match kind {
                TokenKind::Null => Ok(Value::Null),
                TokenKind::StartObject => self.read_record(reader, def),
                found => Err(CodecError::MalformedContainer {
                    expected: TokenKind::StartObject,
                    found,
                }),
            },
        }
    }

    fn read_seq(&self, reader: &mut TokenReader<'_>, item: &Shape) -> Result<Value> {
        let mut items = Vec::new();
        loop {
            advance(reader, TokenKind::EndArray)?;
            if reader.kind() == TokenKind::EndArray {
                return Ok(Value::Seq(items));
            }
            items.push(self.read_value(reader, item)?);
        }
    }

    /// Iterates the properties of the object under the cursor, leaving the
    /// reader on each property's value before calling `each`.
    fn read_object<F>(&self, reader: &mut TokenReader<'_>, mut each: F) -> Result<()>
    where
        F: FnMut(&mut TokenReader<'_>, String) -> Result<()>,
    {
        loop {
            advance(reader, TokenKind::EndObject)?;
            match reader.kind() {
                TokenKind::EndObject => return Ok(()),
                TokenKind::PropertyName => {}
                found => {
                    return Err(CodecError::MalformedContainer {
                        expected: TokenKind::PropertyName,
                        found,
                    })
                }
            }
            let name = reader.token_text().to_string();
            advance(reader, TokenKind::EndObject)?;
            each(reader, name)?;
        }
    }

    fn read_string_map(&self, reader: &mut TokenReader<'_>, value: &Shape) -> Result<Value> {
        let mut entries = IndexMap::new();
        self.read_object(reader, |reader, name| {
            let item = self.read_value(reader, value)?;
            entries.insert(MapKey::String(name), item);
            Ok(())
        })?;
        Ok(Value::Map(entries))
    }

    fn read_record(&self, reader: &mut TokenReader<'_>, def: &RecordDef) -> Result<Value> {
        let mut record = RecordValue::new();
        self.read_object(reader, |reader, name| {
            match self.find_field(def, &name) {
                Some(field) => {
                    let item = self.read_value(reader, &field.shape)?;
                    record.insert(field.name.clone(), item);
                }
                None => reader.skip()?,
            }
            Ok(())
        })?;
        Ok(Value::Record(record))
    }

    fn find_field<'d>(&self, def: &'d RecordDef, name: &str) -> Option<&'d FieldDef> {
        let policy = self.settings.naming_policy;
        let exact = def.fields.iter().find(|f| policy.apply(&f.name) == name);
        if exact.is_some() || !self.settings.property_name_case_insensitive {
            return exact;
        }
        let name = name.to_lowercase();
        def.fields
            .iter()
            .find(|f| policy.apply(&f.name).to_lowercase() == name)
    }

    fn write_structural(&self, value: &Value, shape: &Shape, writer: &mut TokenWriter) -> Result<()> {
        match (shape, value) {
            (Shape::String | Shape::Seq(_) | Shape::Map { .. } | Shape::Record(_), Value::Null) => {
                writer.null_value()
            }
            (Shape::Bool, Value::Bool(b)) => writer.bool_value(*b),
            (Shape::Int32, Value::Int32(n)) => writer.i64_value(i64::from(*n)),
            (Shape::Int64, Value::Int64(n)) => writer.i64_value(*n),
            (Shape::Float64, Value::Float64(f)) => writer.f64_value(*f)?,
            (Shape::Decimal, Value::Decimal(d)) => writer.raw_number_value(&d.to_string()),
            (Shape::String, Value::String(s)) => writer.string_value(s),
            (Shape::DateTime | Shape::DateTimeOffset, value) => {
                writer.string_value(&render_iso_date(value, shape)?)
            }
            (Shape::Enum(def), Value::Enum(member)) => match def.discriminant(member) {
                Some(n) => writer.i64_value(n),
                None => {
                    return Err(CodecError::UnknownEnumMember {
                        member: member.clone(),
                        target: def.name.clone(),
                    })
                }
            },
            (Shape::Seq(item), Value::Seq(items)) => {
                writer.start_array();
                for value in items {
                    self.write_value(value, item, writer)?;
                }
                writer.end_array();
            }
            (Shape::Map { key, value: item, .. }, Value::Map(entries)) => {
                if !key.is_string() {
                    return Err(CodecError::Unsupported {
                        target: shape.to_string(),
                    });
                }
                writer.start_object();
                for (name, value) in entries {
                    let MapKey::String(name) = name else {
                        return Err(name.mismatch(Shape::String));
                    };
                    writer.property_name(name);
                    self.write_value(value, item, writer)?;
                }
                writer.end_object();
            }
            (Shape::Record(def), Value::Record(record)) => {
                writer.start_object();
                for field in &def.fields {
                    writer.property_name(&self.settings.naming_policy.apply(&field.name));
                    match record.get(&field.name) {
                        Some(value) => self.write_value(value, &field.shape, writer)?,
                        None => writer.null_value(),
                    }
                }
                writer.end_object();
            }
            (shape, value) => return Err(value.mismatch(shape)),
        }
        Ok(())
    }
}

/// ISO 8601 parse used when no date converter is registered.
pub(crate) fn parse_iso_date(text: &str, shape: &Shape) -> Option<Value> {
    let text = text.trim();
    match shape {
        Shape::DateTime => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.naive_local())
            .or_else(|_| NaiveDateTime::parse_from_str(text, ISO_NAIVE))
            .ok()
            .map(Value::DateTime),
        Shape::DateTimeOffset => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(Value::DateTimeOffset),
        _ => None,
    }
}

pub(crate) fn render_iso_date(value: &Value, shape: &Shape) -> Result<String> {
    match (shape, value) {
        (Shape::DateTime, Value::DateTime(dt)) => Ok(dt.format(ISO_NAIVE).to_string()),
        (Shape::DateTimeOffset, Value::DateTimeOffset(dt)) => Ok(dt.to_rfc3339()),
        (shape, value) => Err(value.mismatch(shape)),
    }
}
