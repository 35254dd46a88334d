//! The codec facade.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use laxjson_tokens::{TokenError, TokenReader, TokenWriter};
use parking_lot::RwLock;
use tracing::debug;

use crate::converters::formattable::FormatOptions;
use crate::culture::Culture;
use crate::error::Result;
use crate::options::CodecOptions;
use crate::shape::Shape;
use crate::typed::Typed;
use crate::value::Value;

/// Serializes and deserializes through a swappable [`CodecOptions`].
///
/// Calls take a snapshot of the current options, so replacing them with
/// [`Codec::set_serializer_options`] never affects a call already running.
/// Format changes are different: they mutate converters in place and are
/// seen by every call that has not yet reached the formatting step.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use laxjson::Codec;
///
/// let codec = Codec::new();
/// let map: BTreeMap<i64, String> = codec.deserialize(r#"{"2":"b","1":1}"#).unwrap();
/// assert_eq!(map[&1], "1");
/// assert_eq!(codec.serialize(&map).unwrap(), r#"{"1":"1","2":"b"}"#);
/// ```
#[derive(Debug)]
pub struct Codec {
    options: RwLock<Arc<CodecOptions>>,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec {
    /// A codec with the default converter registry.
    pub fn new() -> Self {
        Self::with_options(CodecOptions::new())
    }

    pub fn with_options(options: CodecOptions) -> Self {
        Self {
            options: RwLock::new(Arc::new(options)),
        }
    }

    /// The process-wide codec, created on first use.
    pub fn global() -> &'static Codec {
        static GLOBAL: OnceLock<Codec> = OnceLock::new();
        GLOBAL.get_or_init(Codec::new)
    }

    /// Current options.
    pub fn options(&self) -> Arc<CodecOptions> {
        self.options.read().clone()
    }

    pub fn serialize<T: Typed>(&self, value: &T) -> Result<String> {
        self.serialize_dynamic(&value.to_value(), &T::shape())
    }

    pub fn serialize_dynamic(&self, value: &Value, shape: &Shape) -> Result<String> {
        let options = self.options();
        let mut writer = TokenWriter::new();
        options.write_value(value, shape, &mut writer)?;
        Ok(writer.finish())
    }

    pub fn deserialize<T: Typed>(&self, text: &str) -> Result<T> {
        T::from_value(self.deserialize_dynamic(text, &T::shape())?)
    }

    /// Decodes `text` as `shape`. The whole input must be one JSON value.
    pub fn deserialize_dynamic(&self, text: &str, shape: &Shape) -> Result<Value> {
        let options = self.options();
        let mut reader = TokenReader::new(text);
        if !reader.read()? {
            return Err(TokenError::UnexpectedEnd {
                position: reader.position(),
            }
            .into());
        }
        let value = options.read_value(&mut reader, shape)?;
        reader.finish()?;
        Ok(value)
    }

    /// Sets the format and provider of the registered formattable converters
    /// targeting `shape`. Nothing happens when there are none.
    pub fn set_format_options(&self, shape: &Shape, format: Option<&str>, provider: Option<Culture>) {
        self.options()
            .set_format_options(shape, FormatOptions::new(format, provider));
    }

    /// Applies every entry as [`Codec::set_format_options`] would; entries
    /// with no matching converter are ignored.
    pub fn set_format_options_bulk(&self, entries: HashMap<Shape, FormatOptions>) {
        self.options().set_format_options_bulk(entries);
    }

    /// Replaces the options wholesale.
    pub fn set_serializer_options(&self, options: CodecOptions) {
        debug!(converters = options.converters.len(), "replaced codec options");
        *self.options.write() = Arc::new(options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    #[test]
    fn empty_input_is_an_error() {
        let err = Codec::new().deserialize::<i32>("  ").unwrap_err();
        assert!(matches!(err, CodecError::Token(TokenError::UnexpectedEnd { .. })));
    }

    #[test]
    fn trailing_data_is_rejected() {
        let err = Codec::new().deserialize::<i32>("1 2").unwrap_err();
        assert!(matches!(err, CodecError::Token(TokenError::Invalid { .. })));
    }

    #[test]
    fn replaced_options_apply_to_later_calls() {
        let codec = Codec::new();
        assert_eq!(codec.deserialize::<i32>("\"7\"").unwrap(), 7);
        codec.set_serializer_options(CodecOptions::empty());
        assert!(codec.deserialize::<i32>("\"7\"").is_err());
        assert_eq!(codec.options().converters.len(), 0);
    }

    #[test]
    fn global_is_a_single_instance() {
        assert!(std::ptr::eq(Codec::global(), Codec::global()));
    }
}
