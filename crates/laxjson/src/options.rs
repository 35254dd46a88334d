//! Codec configuration: the ordered converter registry plus settings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::converters::formattable::FormatOptions;
use crate::converters::{Converter, ResolvedConverter};
use crate::error::{CodecError, Result};
use crate::shape::Shape;

/// How record field names appear on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NamingPolicy {
    /// Field names as declared.
    #[default]
    None,
    /// `FieldName` becomes `fieldName`, `URLValue` becomes `urlValue`.
    CamelCase,
}

impl NamingPolicy {
    pub fn apply(self, name: &str) -> String {
        match self {
            NamingPolicy::None => name.to_string(),
            NamingPolicy::CamelCase => camel_case(name),
        }
    }
}

fn camel_case(name: &str) -> String {
    let mut chars: Vec<char> = name.chars().collect();
    for i in 0..chars.len() {
        if i == 1 && !chars[i].is_uppercase() {
            break;
        }
        let next_is_lower = chars.get(i + 1).is_some_and(|c| !c.is_uppercase());
        if i > 0 && next_is_lower {
            break;
        }
        chars[i] = chars[i].to_lowercase().next().unwrap_or(chars[i]);
    }
    chars.into_iter().collect()
}

/// Settings shared by the structural (non-converter) paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodecSettings {
    /// Match record property names ignoring case when decoding.
    pub property_name_case_insensitive: bool,
    pub naming_policy: NamingPolicy,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            property_name_case_insensitive: true,
            naming_policy: NamingPolicy::None,
        }
    }
}

impl CodecSettings {
    /// Loads settings from JSON configuration text; absent keys keep their
    /// defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| CodecError::Settings(e.to_string()))
    }
}

/// Ordered converter list plus settings. The first converter that handles a
/// shape wins.
#[derive(Debug, Clone)]
pub struct CodecOptions {
    pub converters: Vec<Converter>,
    pub settings: CodecSettings,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecOptions {
    /// The default registry.
    pub fn new() -> Self {
        Self {
            converters: vec![
                Converter::string(),
                Converter::int32(),
                Converter::float64(),
                Converter::int64(),
                Converter::decimal(),
                Converter::date_time(),
                Converter::date_time_offset(),
                Converter::enums(),
                Converter::maps(),
            ],
            settings: CodecSettings::default(),
        }
    }

    /// No converters; everything goes through the structural paths.
    pub fn empty() -> Self {
        Self {
            converters: Vec::new(),
            settings: CodecSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: CodecSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_converter(mut self, converter: Converter) -> Self {
        self.converters.push(converter);
        self
    }

    /// Resolves the converter for `shape`, specializing factories on first
    /// use. `None` means the shape takes the structural path.
    pub fn resolve(&self, shape: &Shape) -> Option<ResolvedConverter> {
        let converter = self.converters.iter().find(|c| c.handles(shape))?;
        trace!(shape = %shape, converter = converter.name(), "resolved converter");
        converter.specialize(shape, self)
    }

    /// Independent copy: each formattable converter gets its own format
    /// state, factories start with empty caches.
    pub fn detached(&self) -> Self {
        Self {
            converters: self.converters.iter().map(Converter::detached).collect(),
            settings: self.settings.clone(),
        }
    }

    /// Replaces the format state of every formattable converter targeting
    /// `shape`. Returns how many converters were updated; zero is not an
    /// error.
    pub fn set_format_options(&self, shape: &Shape, options: FormatOptions) -> usize {
        let mut updated = 0;
        for converter in self.converters.iter().filter_map(Converter::as_formattable) {
            if converter.target() == *shape {
                converter.set_format(options.clone());
                updated += 1;
            }
        }
        debug!(
            shape = %shape,
            format = ?options.format,
            provider = ?options.provider.as_ref().map(|c| c.name.as_str()),
            updated,
            "set format options"
        );
        updated
    }

    /// Applies [`CodecOptions::set_format_options`] for every entry.
    pub fn set_format_options_bulk(&self, entries: HashMap<Shape, FormatOptions>) -> usize {
        entries
            .into_iter()
            .map(|(shape, options)| self.set_format_options(&shape, options))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::culture::Culture;
    use crate::shape::{EnumDef, MapKind};
    use std::sync::Arc;

    #[test]
    fn camel_case_lowers_leading_capitals() {
        assert_eq!(camel_case("Dict"), "dict");
        assert_eq!(camel_case("URLValue"), "urlValue");
        assert_eq!(camel_case("ID"), "id");
        assert_eq!(camel_case("already"), "already");
        assert_eq!(camel_case(""), "");
    }

    #[test]
    fn settings_from_json_keep_defaults() {
        let settings = CodecSettings::from_json(r#"{"namingPolicy":"camelCase"}"#).unwrap();
        assert!(settings.property_name_case_insensitive);
        assert_eq!(settings.naming_policy, NamingPolicy::CamelCase);
        assert!(matches!(
            CodecSettings::from_json("{"),
            Err(CodecError::Settings(_))
        ));
    }

    #[test]
    fn first_registered_converter_wins() {
        let options = CodecOptions::empty()
            .with_converter(Converter::date_time())
            .with_converter(Converter::date_time());
        options.converters[0]
            .as_formattable()
            .unwrap()
            .set_format(FormatOptions::new(Some("s"), None));
        let Some(ResolvedConverter::Formattable(found)) = options.resolve(&Shape::DateTime) else {
            panic!("expected the date converter");
        };
        assert_eq!(found.format_options().format.as_deref(), Some("s"));
    }

    #[test]
    fn unhandled_shapes_resolve_to_none() {
        let options = CodecOptions::new();
        assert!(options.resolve(&Shape::Bool).is_none());
        assert!(options.resolve(&Shape::seq(Shape::Int32)).is_none());
        assert!(options
            .resolve(&Shape::map(MapKind::Hash, Shape::String, Shape::Int32))
            .is_none());
        let mode = Shape::Enum(Arc::new(EnumDef::new("Mode", vec![("A", 0)])));
        assert!(matches!(options.resolve(&mode), Some(ResolvedConverter::Enum(_))));
    }

    #[test]
    fn format_updates_target_matching_converters_only() {
        let options = CodecOptions::new();
        let updated = options.set_format_options(
            &Shape::DateTimeOffset,
            FormatOptions::new(Some("u"), Some(Culture::invariant())),
        );
        assert_eq!(updated, 1);
        assert_eq!(options.set_format_options(&Shape::Int32, FormatOptions::default()), 0);

        let mut bulk = HashMap::new();
        bulk.insert(Shape::DateTime, FormatOptions::new(Some("d"), None));
        bulk.insert(Shape::Bool, FormatOptions::new(Some("d"), None));
        assert_eq!(options.set_format_options_bulk(bulk), 1);
    }

    #[test]
    fn detached_options_do_not_share_state() {
        let options = CodecOptions::new();
        let scoped = options.detached();
        scoped.set_format_options(&Shape::DateTime, FormatOptions::new(Some("s"), None));
        let Some(ResolvedConverter::Formattable(original)) = options.resolve(&Shape::DateTime) else {
            panic!("expected the date converter");
        };
        assert!(original.format_options().is_unset());
    }
}
