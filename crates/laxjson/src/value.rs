//! Dynamic values produced by decoding and consumed by encoding.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::error::{CodecError, Result};
use crate::typed::Typed;

/// A decoded value, mirroring [`crate::Shape`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Decimal(Decimal),
    String(String),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    /// Enum member name.
    Enum(String),
    Seq(Vec<Value>),
    /// Map entries in the order they were decoded or inserted.
    Map(IndexMap<MapKey, Value>),
    Record(RecordValue),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int32(_) => "Int32",
            Value::Int64(_) => "Int64",
            Value::Float64(_) => "Float64",
            Value::Decimal(_) => "Decimal",
            Value::String(_) => "String",
            Value::DateTime(_) => "DateTime",
            Value::DateTimeOffset(_) => "DateTimeOffset",
            Value::Enum(_) => "Enum",
            Value::Seq(_) => "Seq",
            Value::Map(_) => "Map",
            Value::Record(_) => "Record",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub(crate) fn mismatch(&self, expected: impl ToString) -> CodecError {
        CodecError::TypeMismatch {
            expected: expected.to_string(),
            found: self.kind_name(),
        }
    }
}

/// Hashable map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(FloatKey),
    Decimal(Decimal),
    String(String),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    /// Enum member name.
    Enum(String),
}

impl MapKey {
    pub fn kind_name(&self) -> &'static str {
        match self {
            MapKey::Bool(_) => "Bool",
            MapKey::Int32(_) => "Int32",
            MapKey::Int64(_) => "Int64",
            MapKey::Float64(_) => "Float64",
            MapKey::Decimal(_) => "Decimal",
            MapKey::String(_) => "String",
            MapKey::DateTime(_) => "DateTime",
            MapKey::DateTimeOffset(_) => "DateTimeOffset",
            MapKey::Enum(_) => "Enum",
        }
    }

    pub(crate) fn mismatch(&self, expected: impl ToString) -> CodecError {
        CodecError::TypeMismatch {
            expected: expected.to_string(),
            found: self.kind_name(),
        }
    }
}

/// `f64` usable as a map key; equality and hashing go by bit pattern.
#[derive(Debug, Clone, Copy)]
pub struct FloatKey(pub f64);

impl PartialEq for FloatKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatKey {}

impl Hash for FloatKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Field values of a decoded record, keyed by declared field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordValue {
    pub fields: IndexMap<String, Value>,
}

impl RecordValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Typed>(mut self, name: &str, value: &T) -> Self {
        self.fields.insert(name.to_string(), value.to_value());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Removes a field and converts it; an absent field converts from
    /// [`Value::Null`].
    pub fn take<T: Typed>(&mut self, name: &str) -> Result<T> {
        T::from_value(self.fields.shift_remove(name).unwrap_or(Value::Null))
    }

    /// Like [`RecordValue::take`], but an absent or null field yields
    /// `T::default()`.
    pub fn take_or_default<T: Typed + Default>(&mut self, name: &str) -> Result<T> {
        match self.fields.shift_remove(name) {
            None | Some(Value::Null) => Ok(T::default()),
            Some(value) => T::from_value(value),
        }
    }
}
