//! Type descriptors.
//!
//! A [`Shape`] names the target type of a decode or encode call. Converters
//! match on shapes the way a reflection-based codec matches on runtime
//! types, and factory converters key their specialization caches by them.

use std::fmt;
use std::sync::Arc;

/// Concrete map container a map shape decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
    /// `std::collections::HashMap`; iteration order is unspecified.
    Hash,
    /// `std::collections::BTreeMap`; iterates in key order.
    Sorted,
    /// `indexmap::IndexMap`; iterates in insertion order.
    Ordered,
}

/// Target type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    Bool,
    Int32,
    Int64,
    Float64,
    Decimal,
    String,
    /// Offset-naive date and time.
    DateTime,
    /// Date and time with a fixed UTC offset.
    DateTimeOffset,
    Enum(Arc<EnumDef>),
    Map {
        kind: MapKind,
        key: Box<Shape>,
        value: Box<Shape>,
    },
    Seq(Box<Shape>),
    /// Nullable wrapper.
    Option(Box<Shape>),
    Record(Arc<RecordDef>),
}

impl Shape {
    pub fn map(kind: MapKind, key: Shape, value: Shape) -> Self {
        Shape::Map {
            kind,
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn seq(item: Shape) -> Self {
        Shape::Seq(Box::new(item))
    }

    pub fn option(inner: Shape) -> Self {
        Shape::Option(Box::new(inner))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Shape::String)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Bool => f.write_str("Bool"),
            Shape::Int32 => f.write_str("Int32"),
            Shape::Int64 => f.write_str("Int64"),
            Shape::Float64 => f.write_str("Float64"),
            Shape::Decimal => f.write_str("Decimal"),
            Shape::String => f.write_str("String"),
            Shape::DateTime => f.write_str("DateTime"),
            Shape::DateTimeOffset => f.write_str("DateTimeOffset"),
            Shape::Enum(def) => f.write_str(&def.name),
            Shape::Map { kind, key, value } => {
                let name = match kind {
                    MapKind::Hash => "HashMap",
                    MapKind::Sorted => "BTreeMap",
                    MapKind::Ordered => "IndexMap",
                };
                write!(f, "{name}<{key}, {value}>")
            }
            Shape::Seq(item) => write!(f, "Vec<{item}>"),
            Shape::Option(inner) => write!(f, "Option<{inner}>"),
            Shape::Record(def) => f.write_str(&def.name),
        }
    }
}

/// Enum type: its name and `(member, discriminant)` pairs in declaration
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumDef {
    pub name: String,
    pub members: Vec<(String, i64)>,
}

impl EnumDef {
    pub fn new<S: Into<String>>(name: impl Into<String>, members: Vec<(S, i64)>) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }

    /// Resolves member text to a member name.
    ///
    /// Tries the exact name first, then a discriminant match when the text
    /// is an integer, then (only with `ignore_case`) a case-insensitive
    /// name match.
    pub fn parse_member(&self, text: &str, ignore_case: bool) -> Option<&str> {
        if let Some((name, _)) = self.members.iter().find(|(name, _)| name == text) {
            return Some(name);
        }
        if let Ok(number) = text.trim().parse::<i64>() {
            if let Some((name, _)) = self.members.iter().find(|(_, v)| *v == number) {
                return Some(name);
            }
        }
        if ignore_case {
            let found = self
                .members
                .iter()
                .find(|(name, _)| name.to_lowercase() == text.to_lowercase());
            if let Some((name, _)) = found {
                return Some(name);
            }
        }
        None
    }

    pub fn discriminant(&self, member: &str) -> Option<i64> {
        self.members
            .iter()
            .find(|(name, _)| name == member)
            .map(|(_, v)| *v)
    }

    pub fn member_for(&self, discriminant: i64) -> Option<&str> {
        self.members
            .iter()
            .find(|(_, v)| *v == discriminant)
            .map(|(name, _)| name.as_str())
    }
}

/// Record (struct) type bound field by field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDef {
    pub name: String,
    pub shape: Shape,
}

impl RecordDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            shape,
        });
        self
    }
}
