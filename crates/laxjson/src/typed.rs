//! Static typing over the dynamic [`Value`] model.
//!
//! A `Typed` type knows its [`Shape`] and how to move to and from a
//! [`Value`]. The facade's typed entry points decode through the shape and
//! then convert, so the same converters serve both the static and the
//! runtime-typed API.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::shape::{MapKind, Shape};
use crate::value::{MapKey, Value};

pub trait Typed: Sized {
    fn shape() -> Shape;
    fn to_value(&self) -> Value;
    fn from_value(value: Value) -> Result<Self>;
}

/// Types usable as map keys.
pub trait MapKeyTyped: Typed {
    fn to_key(&self) -> MapKey;
    fn from_key(key: MapKey) -> Result<Self>;
}

macro_rules! scalar_typed {
    ($ty:ty, $variant:ident) => {
        impl Typed for $ty {
            fn shape() -> Shape {
                Shape::$variant
            }

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(other.mismatch(Shape::$variant)),
                }
            }
        }

        impl MapKeyTyped for $ty {
            fn to_key(&self) -> MapKey {
                MapKey::$variant(self.clone())
            }

            fn from_key(key: MapKey) -> Result<Self> {
                match key {
                    MapKey::$variant(v) => Ok(v),
                    other => Err(other.mismatch(Shape::$variant)),
                }
            }
        }
    };
}

scalar_typed!(bool, Bool);
scalar_typed!(i32, Int32);
scalar_typed!(i64, Int64);
scalar_typed!(Decimal, Decimal);
scalar_typed!(String, String);
scalar_typed!(NaiveDateTime, DateTime);
scalar_typed!(DateTime<FixedOffset>, DateTimeOffset);

// `f64` is not `Eq`/`Hash`, so it only appears as a value here. Float keys
// are still available through the dynamic API.
impl Typed for f64 {
    fn shape() -> Shape {
        Shape::Float64
    }

    fn to_value(&self) -> Value {
        Value::Float64(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float64(v) => Ok(v),
            other => Err(other.mismatch(Shape::Float64)),
        }
    }
}

impl<T: Typed> Typed for Option<T> {
    fn shape() -> Shape {
        Shape::option(T::shape())
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn shape() -> Shape {
        Shape::seq(T::shape())
    }

    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(Typed::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Seq(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(other.mismatch(Self::shape())),
        }
    }
}

fn map_entries<K: MapKeyTyped, V: Typed>(value: Value, shape: Shape) -> Result<Vec<(K, V)>> {
    match value {
        Value::Map(entries) => entries
            .into_iter()
            .map(|(k, v)| Ok((K::from_key(k)?, V::from_value(v)?)))
            .collect(),
        other => Err(other.mismatch(shape)),
    }
}

impl<K: MapKeyTyped + Eq + Hash, V: Typed> Typed for HashMap<K, V> {
    fn shape() -> Shape {
        Shape::map(MapKind::Hash, K::shape(), V::shape())
    }

    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_key(), v.to_value())).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        Ok(map_entries(value, Self::shape())?.into_iter().collect())
    }
}

impl<K: MapKeyTyped + Ord, V: Typed> Typed for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::map(MapKind::Sorted, K::shape(), V::shape())
    }

    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_key(), v.to_value())).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        Ok(map_entries(value, Self::shape())?.into_iter().collect())
    }
}

impl<K: MapKeyTyped + Eq + Hash, V: Typed> Typed for IndexMap<K, V> {
    fn shape() -> Shape {
        Shape::map(MapKind::Ordered, K::shape(), V::shape())
    }

    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_key(), v.to_value())).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        Ok(map_entries(value, Self::shape())?.into_iter().collect())
    }
}

/// Declares a fieldless enum together with its [`Typed`] and
/// [`MapKeyTyped`] implementations.
///
/// The enum derives `Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd,
/// Ord`; do not derive those again.
///
/// ```
/// laxjson::json_enum! {
///     pub enum Level {
///         Low = 0,
///         High = 1,
///     }
/// }
///
/// assert_eq!(laxjson::Codec::new().serialize(&Level::High).unwrap(), "\"High\"");
/// ```
#[macro_export]
macro_rules! json_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $($variant = $value),+
        }

        impl $name {
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }

            fn from_member(member: &str) -> ::std::option::Option<Self> {
                match member {
                    $(stringify!($variant) => ::std::option::Option::Some($name::$variant),)+
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl $crate::Typed for $name {
            fn shape() -> $crate::Shape {
                $crate::Shape::Enum(::std::sync::Arc::new($crate::EnumDef::new(
                    stringify!($name),
                    vec![$((stringify!($variant), ($value) as i64)),+],
                )))
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Enum(self.name().to_string())
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                match value {
                    $crate::Value::Enum(member) => {
                        Self::from_member(&member).ok_or_else(|| $crate::CodecError::UnknownEnumMember {
                            member,
                            target: stringify!($name).to_string(),
                        })
                    }
                    other => Err($crate::CodecError::TypeMismatch {
                        expected: stringify!($name).to_string(),
                        found: other.kind_name(),
                    }),
                }
            }
        }

        impl $crate::MapKeyTyped for $name {
            fn to_key(&self) -> $crate::MapKey {
                $crate::MapKey::Enum(self.name().to_string())
            }

            fn from_key(key: $crate::MapKey) -> $crate::Result<Self> {
                match key {
                    $crate::MapKey::Enum(member) => {
                        Self::from_member(&member).ok_or_else(|| $crate::CodecError::UnknownMapKey {
                            key: member,
                            target: stringify!($name).to_string(),
                        })
                    }
                    other => Err($crate::CodecError::TypeMismatch {
                        expected: stringify!($name).to_string(),
                        found: other.kind_name(),
                    }),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    json_enum! {
        enum Fruit {
            Apple = 1,
            Pear = 2,
        }
    }

    #[test]
    fn option_maps_null() {
        assert_eq!(Option::<i32>::from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i32>::from_value(Value::Int32(3)).unwrap(), Some(3));
        assert_eq!(Some(3i64).to_value(), Value::Int64(3));
    }

    #[test]
    fn mismatch_names_expected_shape() {
        let err = i64::from_value(Value::String("x".into())).unwrap_err();
        assert_eq!(err.to_string(), "Expected a Int64 value, found String");
    }

    #[test]
    fn enum_macro_round_trips_through_value() {
        assert_eq!(Fruit::Pear.to_value(), Value::Enum("Pear".into()));
        assert_eq!(Fruit::from_value(Value::Enum("Apple".into())).unwrap(), Fruit::Apple);
        assert!(Fruit::from_value(Value::Enum("Plum".into())).is_err());
        match Fruit::shape() {
            Shape::Enum(def) => assert_eq!(def.discriminant("Pear"), Some(2)),
            other => panic!("unexpected shape {other}"),
        }
    }

    #[test]
    fn hash_map_shape_and_conversion() {
        let mut map = HashMap::new();
        map.insert(Fruit::Apple, vec![1i32, 2]);
        let value = map.to_value();
        let back = HashMap::<Fruit, Vec<i32>>::from_value(value).unwrap();
        assert_eq!(back, map);
        assert_eq!(
            HashMap::<Fruit, Vec<i32>>::shape().to_string(),
            "HashMap<Fruit, Vec<Int32>>"
        );
    }
}
