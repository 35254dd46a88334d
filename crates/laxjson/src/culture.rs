//! Format providers for date and time converters.
//!
//! A [`Culture`] carries the date and time patterns a locale uses, written
//! as chrono `strftime` patterns. Single-character standard format
//! specifiers (`"d"`, `"G"`, `"s"`, `"u"`, ...) resolve through the culture;
//! any other format string is used as a `strftime` pattern verbatim.

use chrono::format::{Item, StrftimeItems};

use crate::error::{CodecError, Result};

/// Locale-dependent date and time patterns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Culture {
    pub name: String,
    pub short_date: String,
    pub long_date: String,
    pub short_time: String,
    pub long_time: String,
}

impl Culture {
    pub fn invariant() -> Self {
        Self {
            name: String::new(),
            short_date: "%m/%d/%Y".into(),
            long_date: "%A, %d %B %Y".into(),
            short_time: "%H:%M".into(),
            long_time: "%H:%M:%S".into(),
        }
    }

    pub fn en_us() -> Self {
        Self {
            name: "en-US".into(),
            short_date: "%-m/%-d/%Y".into(),
            long_date: "%A, %B %-d, %Y".into(),
            short_time: "%-I:%M %p".into(),
            long_time: "%-I:%M:%S %p".into(),
        }
    }

    pub fn en_gb() -> Self {
        Self {
            name: "en-GB".into(),
            short_date: "%d/%m/%Y".into(),
            long_date: "%-d %B %Y".into(),
            short_time: "%H:%M".into(),
            long_time: "%H:%M:%S".into(),
        }
    }

    /// French layout. Day and month names are not localized.
    pub fn fr_fr() -> Self {
        Self {
            name: "fr-FR".into(),
            short_date: "%d/%m/%Y".into(),
            long_date: "%A %-d %B %Y".into(),
            short_time: "%H:%M".into(),
            long_time: "%H:%M:%S".into(),
        }
    }

    /// Looks up a built-in culture by name, ignoring case. The empty name is
    /// the invariant culture.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "" | "invariant" => Some(Self::invariant()),
            "en-us" => Some(Self::en_us()),
            "en-gb" => Some(Self::en_gb()),
            "fr-fr" => Some(Self::fr_fr()),
            _ => None,
        }
    }

    /// Provider used when none is configured.
    pub fn ambient() -> Self {
        Self::en_us()
    }

    /// Offset-free patterns tried, in order, by the lenient parse. Each
    /// entry is `(pattern, has_time)`.
    pub(crate) fn parse_patterns(&self) -> Vec<(String, bool)> {
        vec![
            (format!("{} {}", self.short_date, self.long_time), true),
            (format!("{} {}", self.short_date, self.short_time), true),
            (format!("{} %H:%M:%S%.f", self.short_date), true),
            (format!("{} %H:%M", self.short_date), true),
            (self.short_date.clone(), false),
            ("%Y-%m-%dT%H:%M:%S%.f".into(), true),
            ("%Y-%m-%d %H:%M:%S%.f".into(), true),
            ("%Y-%m-%d %H:%M:%S%.fZ".into(), true),
            ("%Y-%m-%d %H:%M".into(), true),
            ("%Y-%m-%d".into(), false),
        ]
    }
}

/// Kind of value being formatted; the default pattern differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateKind {
    DateTime,
    DateTimeOffset,
}

/// A format string resolved against a culture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Pattern {
    pub text: String,
    /// Render in UTC (offset values are converted first).
    pub utc: bool,
}

/// Resolves `format` (or the kind's default when `None`) to a `strftime`
/// pattern.
pub(crate) fn resolve_pattern(format: Option<&str>, culture: &Culture, kind: DateKind) -> Result<Pattern> {
    let Some(format) = format else {
        let mut text = format!("{} {}", culture.short_date, culture.long_time);
        if kind == DateKind::DateTimeOffset {
            text.push_str(" %:z");
        }
        return Ok(Pattern { text, utc: false });
    };
    let (text, utc) = match format {
        "d" => (culture.short_date.clone(), false),
        "D" => (culture.long_date.clone(), false),
        "t" => (culture.short_time.clone(), false),
        "T" => (culture.long_time.clone(), false),
        "g" => (format!("{} {}", culture.short_date, culture.short_time), false),
        "G" => (format!("{} {}", culture.short_date, culture.long_time), false),
        "s" => ("%Y-%m-%dT%H:%M:%S".to_string(), false),
        "u" => ("%Y-%m-%d %H:%M:%SZ".to_string(), true),
        "o" | "O" => match kind {
            DateKind::DateTime => ("%Y-%m-%dT%H:%M:%S%.f".to_string(), false),
            DateKind::DateTimeOffset => ("%Y-%m-%dT%H:%M:%S%.f%:z".to_string(), false),
        },
        "r" | "R" => ("%a, %d %b %Y %H:%M:%S GMT".to_string(), true),
        other => {
            if StrftimeItems::new(other).any(|item| matches!(item, Item::Error)) {
                return Err(CodecError::InvalidFormat {
                    format: other.to_string(),
                });
            }
            (other.to_string(), false)
        }
    };
    Ok(Pattern { text, utc })
}
