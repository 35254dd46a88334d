//! Maps keyed by anything but plain strings.
//!
//! The factory matches map shapes whose key is a number, bool, enum or date
//! and builds one [`MapConverter`] per concrete `(key, value)` pair. Each
//! instance resolves its value converter once, when it is built, and keeps
//! that reference for its lifetime. Value shapes with no dedicated converter
//! go through [`CodecOptions::read_value`] / [`CodecOptions::write_value`] on
//! every call instead.

use std::collections::HashMap;
use std::sync::Arc;

use laxjson_tokens::{format_float, TokenKind, TokenReader, TokenWriter};
use parking_lot::Mutex;
use tracing::debug;

use super::formattable::FormattableConverter;
use super::scalar::{parse_bool, parse_decimal, parse_f64, parse_i32, parse_i64};
use super::ResolvedConverter;
use crate::ambient;
use crate::error::{CodecError, Result};
use crate::options::CodecOptions;
use crate::shape::Shape;
use crate::value::{FloatKey, MapKey, Value};

/// Key shapes the factory knows how to coerce from property-name text.
pub(crate) fn is_coercible_key(shape: &Shape) -> bool {
    matches!(
        shape,
        Shape::Bool
            | Shape::Int32
            | Shape::Int64
            | Shape::Float64
            | Shape::Decimal
            | Shape::DateTime
            | Shape::DateTimeOffset
            | Shape::Enum(_)
    )
}

#[derive(Debug, Default)]
pub struct MapConverterFactory {
    cache: Mutex<HashMap<Shape, Arc<MapConverter>>>,
}

impl MapConverterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handles(&self, shape: &Shape) -> bool {
        match shape {
            Shape::Map { key, .. } => is_coercible_key(key),
            _ => false,
        }
    }

    /// Returns the converter for `shape`, building it against `options` on
    /// first request.
    pub(crate) fn specialize(&self, shape: &Shape, options: &CodecOptions) -> Option<Arc<MapConverter>> {
        if !self.handles(shape) {
            return None;
        }
        let cached = self.cache.lock().get(shape).cloned();
        if let Some(converter) = cached {
            return Some(converter);
        }
        // Built without holding the lock: a nested map value specializes
        // through this same factory.
        let built = Arc::new(MapConverter::build(shape, options)?);
        debug!(
            shape = %shape,
            captured_value_converter = built.value_converter.is_some(),
            "specialized map converter"
        );
        Some(self.cache.lock().entry(shape.clone()).or_insert(built).clone())
    }

    /// Number of map shapes specialized so far.
    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }
}

/// Converter bound to one concrete map shape.
#[derive(Debug)]
pub struct MapConverter {
    shape: Shape,
    key: Shape,
    value: Shape,
    /// Registered date converter for date keys, captured like the value
    /// converter.
    key_dates: Option<Arc<FormattableConverter>>,
    value_converter: Option<ResolvedConverter>,
}

impl MapConverter {
    fn build(shape: &Shape, options: &CodecOptions) -> Option<Self> {
        let Shape::Map { key, value, .. } = shape else {
            return None;
        };
        let key_dates = match options.resolve(key) {
            Some(ResolvedConverter::Formattable(dates)) => Some(dates),
            _ => None,
        };
        Some(Self {
            shape: shape.clone(),
            key: (**key).clone(),
            value: (**value).clone(),
            key_dates,
            value_converter: options.resolve(value),
        })
    }

    pub fn target(&self) -> &Shape {
        &self.shape
    }

    /// Whether a value converter was captured at construction.
    pub fn has_value_converter(&self) -> bool {
        self.value_converter.is_some()
    }

    pub fn read(&self, reader: &mut TokenReader<'_>, options: &CodecOptions) -> Result<Value> {
        if reader.kind() != TokenKind::StartObject {
            return Err(CodecError::MalformedContainer {
                expected: TokenKind::StartObject,
                found: reader.kind(),
            });
        }
        let mut entries = indexmap::IndexMap::new();
        loop {
            ambient::advance(reader, TokenKind::EndObject)?;
            match reader.kind() {
                TokenKind::EndObject => return Ok(Value::Map(entries)),
                TokenKind::PropertyName => {}
                found => {
                    return Err(CodecError::MalformedContainer {
                        expected: TokenKind::PropertyName,
                        found,
                    })
                }
            }
            let key = self.parse_key(reader.token_text())?;
            ambient::advance(reader, TokenKind::EndObject)?;
            let value = match &self.value_converter {
                Some(converter) => converter.read(reader, options)?,
                None => options.read_value(reader, &self.value)?,
            };
            entries.insert(key, value);
        }
    }

    pub fn write(&self, value: &Value, writer: &mut TokenWriter, options: &CodecOptions) -> Result<()> {
        let Value::Map(entries) = value else {
            return Err(value.mismatch(&self.shape));
        };
        writer.start_object();
        for (key, item) in entries {
            writer.property_name(&self.render_key(key)?);
            match &self.value_converter {
                Some(converter) => converter.write(item, writer, options)?,
                None => options.write_value(item, &self.value, writer)?,
            }
        }
        writer.end_object();
        Ok(())
    }

    fn parse_key(&self, text: &str) -> Result<MapKey> {
        let key = match &self.key {
            Shape::Bool => parse_bool(text).map(MapKey::Bool),
            Shape::Int32 => parse_i32(text).map(MapKey::Int32),
            Shape::Int64 => parse_i64(text).map(MapKey::Int64),
            Shape::Float64 => parse_f64(text).map(|f| MapKey::Float64(FloatKey(f))),
            Shape::Decimal => parse_decimal(text).map(MapKey::Decimal),
            Shape::Enum(def) => def
                .parse_member(text, true)
                .map(|member| MapKey::Enum(member.to_string())),
            Shape::DateTime | Shape::DateTimeOffset => self.parse_date_key(text),
            _ => None,
        };
        key.ok_or_else(|| CodecError::UnknownMapKey {
            key: text.to_string(),
            target: self.key.to_string(),
        })
    }

    fn parse_date_key(&self, text: &str) -> Option<MapKey> {
        let parsed = match &self.key_dates {
            Some(dates) => dates.parse_text(text).ok(),
            None => ambient::parse_iso_date(text, &self.key),
        };
        match parsed? {
            Value::DateTime(dt) => Some(MapKey::DateTime(dt)),
            Value::DateTimeOffset(dt) => Some(MapKey::DateTimeOffset(dt)),
            _ => None,
        }
    }

    fn render_key(&self, key: &MapKey) -> Result<String> {
        let text = match (&self.key, key) {
            (Shape::Bool, MapKey::Bool(b)) => b.to_string(),
            (Shape::Int32, MapKey::Int32(n)) => n.to_string(),
            (Shape::Int64, MapKey::Int64(n)) => n.to_string(),
            (Shape::Float64, MapKey::Float64(FloatKey(f))) if f.is_finite() => format_float(*f),
            (Shape::Decimal, MapKey::Decimal(d)) => d.to_string(),
            (Shape::Enum(def), MapKey::Enum(member)) => {
                if def.discriminant(member).is_none() {
                    return Err(CodecError::UnknownEnumMember {
                        member: member.clone(),
                        target: def.name.clone(),
                    });
                }
                member.clone()
            }
            (Shape::DateTime, MapKey::DateTime(dt)) => self.render_date_key(Value::DateTime(*dt))?,
            (Shape::DateTimeOffset, MapKey::DateTimeOffset(dt)) => {
                self.render_date_key(Value::DateTimeOffset(*dt))?
            }
            (_, other) => return Err(other.mismatch(&self.key)),
        };
        Ok(text)
    }

    fn render_date_key(&self, value: Value) -> Result<String> {
        match &self.key_dates {
            Some(dates) => dates.render(&value),
            None => ambient::render_iso_date(&value, &self.key),
        }
    }
}
