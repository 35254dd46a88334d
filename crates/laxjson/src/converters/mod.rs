//! Converter variants and dispatch.
//!
//! A [`Converter`] is what gets registered in [`crate::CodecOptions`]: either
//! a fixed converter for one shape or a factory matching a family of shapes.
//! Resolving a shape against the registry yields a [`ResolvedConverter`],
//! which does the actual reading and writing.

pub mod enums;
pub mod formattable;
pub mod map;
pub mod scalar;

use std::sync::Arc;

use laxjson_tokens::{TokenReader, TokenWriter};

use crate::culture::DateKind;
use crate::error::Result;
use crate::options::CodecOptions;
use crate::shape::Shape;
use crate::value::Value;

use self::enums::{EnumConverter, EnumConverterFactory};
use self::formattable::FormattableConverter;
use self::map::{MapConverter, MapConverterFactory};
use self::scalar::{ScalarConverter, ScalarKind};

/// A registered converter.
///
/// Cloning shares the underlying state: a cloned formattable converter sees
/// format changes made through the original, and a cloned factory shares its
/// specialization cache. Use [`Converter::detached`] for an independent copy.
#[derive(Debug, Clone)]
pub enum Converter {
    Scalar(ScalarConverter),
    Formattable(Arc<FormattableConverter>),
    Enum(Arc<EnumConverterFactory>),
    Map(Arc<MapConverterFactory>),
}

impl Converter {
    pub fn string() -> Self {
        Converter::Scalar(ScalarConverter::new(ScalarKind::String))
    }

    pub fn int32() -> Self {
        Converter::Scalar(ScalarConverter::new(ScalarKind::Int32))
    }

    pub fn float64() -> Self {
        Converter::Scalar(ScalarConverter::new(ScalarKind::Float64))
    }

    pub fn int64() -> Self {
        Converter::Scalar(ScalarConverter::new(ScalarKind::Int64))
    }

    pub fn decimal() -> Self {
        Converter::Scalar(ScalarConverter::new(ScalarKind::Decimal))
    }

    pub fn date_time() -> Self {
        Converter::Formattable(Arc::new(FormattableConverter::new(DateKind::DateTime)))
    }

    pub fn date_time_offset() -> Self {
        Converter::Formattable(Arc::new(FormattableConverter::new(DateKind::DateTimeOffset)))
    }

    pub fn enums() -> Self {
        Converter::Enum(Arc::new(EnumConverterFactory::new()))
    }

    pub fn maps() -> Self {
        Converter::Map(Arc::new(MapConverterFactory::new()))
    }

    pub fn handles(&self, shape: &Shape) -> bool {
        match self {
            Converter::Scalar(c) => c.target() == *shape,
            Converter::Formattable(c) => c.target() == *shape,
            Converter::Enum(f) => f.handles(shape),
            Converter::Map(f) => f.handles(shape),
        }
    }

    /// Target shape of a fixed converter; factories have none.
    pub fn target(&self) -> Option<Shape> {
        match self {
            Converter::Scalar(c) => Some(c.target()),
            Converter::Formattable(c) => Some(c.target()),
            Converter::Enum(_) | Converter::Map(_) => None,
        }
    }

    pub fn as_formattable(&self) -> Option<&Arc<FormattableConverter>> {
        match self {
            Converter::Formattable(c) => Some(c),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Converter::Scalar(_) => "scalar",
            Converter::Formattable(_) => "formattable",
            Converter::Enum(_) => "enum factory",
            Converter::Map(_) => "map factory",
        }
    }

    /// Copy with its own format state and empty specialization caches.
    pub fn detached(&self) -> Self {
        match self {
            Converter::Scalar(c) => Converter::Scalar(*c),
            Converter::Formattable(c) => Converter::Formattable(Arc::new(c.detached())),
            Converter::Enum(_) => Converter::enums(),
            Converter::Map(_) => Converter::maps(),
        }
    }

    /// Binds this converter to `shape`. Factories build (or reuse) their
    /// specialized instance; `None` when the converter does not handle the
    /// shape.
    pub(crate) fn specialize(&self, shape: &Shape, options: &CodecOptions) -> Option<ResolvedConverter> {
        if !self.handles(shape) {
            return None;
        }
        match self {
            Converter::Scalar(c) => Some(ResolvedConverter::Scalar(*c)),
            Converter::Formattable(c) => Some(ResolvedConverter::Formattable(c.clone())),
            Converter::Enum(f) => f.specialize(shape).map(ResolvedConverter::Enum),
            Converter::Map(f) => f.specialize(shape, options).map(ResolvedConverter::Map),
        }
    }
}

/// A converter bound to one concrete shape.
#[derive(Debug, Clone)]
pub enum ResolvedConverter {
    Scalar(ScalarConverter),
    Formattable(Arc<FormattableConverter>),
    Enum(Arc<EnumConverter>),
    Map(Arc<MapConverter>),
}

impl ResolvedConverter {
    /// Reads the value starting at the reader's current token. On return the
    /// cursor rests on the value's last token.
    pub fn read(&self, reader: &mut TokenReader<'_>, options: &CodecOptions) -> Result<Value> {
        match self {
            ResolvedConverter::Scalar(c) => c.read(reader),
            ResolvedConverter::Formattable(c) => c.read(reader),
            ResolvedConverter::Enum(c) => c.read(reader),
            ResolvedConverter::Map(c) => c.read(reader, options),
        }
    }

    pub fn write(&self, value: &Value, writer: &mut TokenWriter, options: &CodecOptions) -> Result<()> {
        match self {
            ResolvedConverter::Scalar(c) => c.write(value, writer),
            ResolvedConverter::Formattable(c) => c.write(value, writer),
            ResolvedConverter::Enum(c) => c.write(value, writer),
            ResolvedConverter::Map(c) => c.write(value, writer, options),
        }
    }
}
