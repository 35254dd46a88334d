//! Enums as member names on the wire.

use std::collections::HashMap;
use std::sync::Arc;

use laxjson_tokens::{TokenKind, TokenReader, TokenWriter};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{CodecError, Result};
use crate::shape::{EnumDef, Shape};
use crate::value::Value;

/// Matches every enum shape and hands out one converter per enum type.
#[derive(Debug, Default)]
pub struct EnumConverterFactory {
    cache: Mutex<HashMap<Arc<EnumDef>, Arc<EnumConverter>>>,
}

impl EnumConverterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handles(&self, shape: &Shape) -> bool {
        matches!(shape, Shape::Enum(_))
    }

    pub(crate) fn specialize(&self, shape: &Shape) -> Option<Arc<EnumConverter>> {
        let Shape::Enum(def) = shape else {
            return None;
        };
        let converter = self
            .cache
            .lock()
            .entry(def.clone())
            .or_insert_with(|| {
                debug!(enum_type = %def.name, "specialized enum converter");
                Arc::new(EnumConverter { def: def.clone() })
            })
            .clone();
        Some(converter)
    }

    /// Number of enum types specialized so far.
    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }
}

/// Converter bound to one enum type.
#[derive(Debug)]
pub struct EnumConverter {
    def: Arc<EnumDef>,
}

impl EnumConverter {
    pub fn def(&self) -> &EnumDef {
        &self.def
    }

    /// Reads a member name; number tokens are matched by their text, which
    /// resolves through the member discriminants.
    pub fn read(&self, reader: &TokenReader<'_>) -> Result<Value> {
        let text = match reader.kind() {
            TokenKind::String | TokenKind::Number => reader.token_text(),
            found => {
                return Err(CodecError::UnexpectedToken {
                    expected: self.def.name.clone(),
                    found,
                })
            }
        };
        self.def
            .parse_member(text, false)
            .map(|member| Value::Enum(member.to_string()))
            .ok_or_else(|| CodecError::UnknownEnumMember {
                member: text.to_string(),
                target: self.def.name.clone(),
            })
    }

    pub fn write(&self, value: &Value, writer: &mut TokenWriter) -> Result<()> {
        match value {
            Value::Enum(member) if self.def.discriminant(member).is_some() => {
                writer.string_value(member);
                Ok(())
            }
            Value::Enum(member) => Err(CodecError::UnknownEnumMember {
                member: member.clone(),
                target: self.def.name.clone(),
            }),
            other => Err(other.mismatch(&self.def.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter() -> Arc<EnumConverter> {
        let shape = Shape::Enum(Arc::new(EnumDef::new("Mode", vec![("Off", 0), ("On", 1)])));
        EnumConverterFactory::new().specialize(&shape).unwrap()
    }

    fn read(json: &str) -> Result<Value> {
        let mut reader = TokenReader::new(json);
        reader.read().unwrap();
        converter().read(&reader)
    }

    #[test]
    fn reads_names_and_numbers() {
        assert_eq!(read("\"On\"").unwrap(), Value::Enum("On".into()));
        assert_eq!(read("0").unwrap(), Value::Enum("Off".into()));
        assert_eq!(read("\"1\"").unwrap(), Value::Enum("On".into()));
    }

    #[test]
    fn rejects_unknown_and_wrong_case() {
        assert_eq!(
            read("\"on\"").unwrap_err(),
            CodecError::UnknownEnumMember {
                member: "on".into(),
                target: "Mode".into()
            }
        );
        assert!(read("7").is_err());
        assert!(matches!(read("true"), Err(CodecError::UnexpectedToken { .. })));
    }

    #[test]
    fn writes_member_name() {
        let mut writer = TokenWriter::new();
        converter().write(&Value::Enum("Off".into()), &mut writer).unwrap();
        assert_eq!(writer.finish(), "\"Off\"");
        let mut writer = TokenWriter::new();
        assert!(converter().write(&Value::Enum("Dim".into()), &mut writer).is_err());
    }

    #[test]
    fn factory_reuses_specialization() {
        let factory = EnumConverterFactory::new();
        let shape = Shape::Enum(Arc::new(EnumDef::new("Mode", vec![("Off", 0)])));
        let a = factory.specialize(&shape).unwrap();
        let b = factory.specialize(&shape).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(factory.cached(), 1);
        assert!(factory.specialize(&Shape::Int32).is_none());
    }
}
