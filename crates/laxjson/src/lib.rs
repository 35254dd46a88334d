//! laxjson: a lenient JSON codec.
//!
//! Input is accepted generously: numbers may arrive quoted, strings may
//! arrive as bare numbers, enums by name or discriminant, dates in several
//! layouts, and maps may be keyed by numbers, enums, booleans or dates.
//! Output is always canonical, compact JSON.
//!
//! Target types are described at runtime by a [`Shape`]. The typed entry
//! points ([`Codec::serialize`], [`Codec::deserialize`]) derive the shape
//! from the [`Typed`] trait; the dynamic ones take it explicitly and work on
//! [`Value`].
//!
//! Decoding resolves a converter for the requested shape from an ordered
//! registry ([`CodecOptions`]); the first match wins. Factory converters
//! (enums, non-string-keyed maps) build one specialized converter per
//! concrete shape and cache it. Date converters carry a format state that
//! can be changed at runtime with [`Codec::set_format_options`].
//!
//! ```
//! use std::collections::HashMap;
//!
//! let map: HashMap<i64, String> = laxjson::deserialize(r#"{"1":"1","2":2}"#).unwrap();
//! assert_eq!(map[&2], "2");
//! ```

mod ambient;
mod codec;
pub mod converters;
mod culture;
mod error;
mod options;
mod shape;
mod typed;
mod value;

use std::collections::HashMap;
use std::sync::Arc;

pub use codec::Codec;
pub use converters::formattable::FormatOptions;
pub use converters::{Converter, ResolvedConverter};
pub use culture::{Culture, DateKind};
pub use error::{CodecError, Result};
pub use laxjson_tokens::{TokenError, TokenKind, TokenReader, TokenWriter};
pub use options::{CodecOptions, CodecSettings, NamingPolicy};
pub use shape::{EnumDef, FieldDef, MapKind, RecordDef, Shape};
pub use typed::{MapKeyTyped, Typed};
pub use value::{FloatKey, MapKey, RecordValue, Value};

/// [`Codec::serialize`] on the global codec.
pub fn serialize<T: Typed>(value: &T) -> Result<String> {
    Codec::global().serialize(value)
}

/// [`Codec::serialize_dynamic`] on the global codec.
pub fn serialize_dynamic(value: &Value, shape: &Shape) -> Result<String> {
    Codec::global().serialize_dynamic(value, shape)
}

/// [`Codec::deserialize`] on the global codec.
pub fn deserialize<T: Typed>(text: &str) -> Result<T> {
    Codec::global().deserialize(text)
}

/// [`Codec::deserialize_dynamic`] on the global codec.
pub fn deserialize_dynamic(text: &str, shape: &Shape) -> Result<Value> {
    Codec::global().deserialize_dynamic(text, shape)
}

/// [`Codec::set_format_options`] on the global codec.
pub fn set_format_options(shape: &Shape, format: Option<&str>, provider: Option<Culture>) {
    Codec::global().set_format_options(shape, format, provider)
}

/// [`Codec::set_format_options_bulk`] on the global codec.
pub fn set_format_options_bulk(entries: HashMap<Shape, FormatOptions>) {
    Codec::global().set_format_options_bulk(entries)
}

/// [`Codec::set_serializer_options`] on the global codec.
pub fn set_serializer_options(options: CodecOptions) {
    Codec::global().set_serializer_options(options)
}

/// [`Codec::options`] on the global codec.
pub fn options() -> Arc<CodecOptions> {
    Codec::global().options()
}
