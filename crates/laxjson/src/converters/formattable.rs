//! Date and time converters with a mutable format state.

use std::fmt::Write as _;

use chrono::format::{Fixed, Item, ParseErrorKind, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use laxjson_tokens::{TokenKind, TokenReader, TokenWriter};
use parking_lot::RwLock;

use crate::culture::{resolve_pattern, Culture, DateKind};
use crate::error::{CodecError, Result};
use crate::shape::Shape;
use crate::value::Value;

impl DateKind {
    pub fn shape(self) -> Shape {
        match self {
            DateKind::DateTime => Shape::DateTime,
            DateKind::DateTimeOffset => Shape::DateTimeOffset,
        }
    }
}

/// A `(format, provider)` pair. Both unset means "default format, ambient
/// culture, lenient parsing".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOptions {
    pub format: Option<String>,
    pub provider: Option<Culture>,
}

impl FormatOptions {
    pub fn new(format: Option<&str>, provider: Option<Culture>) -> Self {
        Self {
            format: format.map(str::to_string),
            provider,
        }
    }

    pub fn is_unset(&self) -> bool {
        self.format.is_none() && self.provider.is_none()
    }
}

/// Converter for one date kind. The format state is shared by every call
/// made through this instance and may be replaced at any time.
#[derive(Debug)]
pub struct FormattableConverter {
    kind: DateKind,
    state: RwLock<FormatOptions>,
}

impl FormattableConverter {
    pub fn new(kind: DateKind) -> Self {
        Self::with_options(kind, FormatOptions::default())
    }

    pub fn with_options(kind: DateKind, options: FormatOptions) -> Self {
        Self {
            kind,
            state: RwLock::new(options),
        }
    }

    pub fn kind(&self) -> DateKind {
        self.kind
    }

    pub fn target(&self) -> Shape {
        self.kind.shape()
    }

    pub fn format_options(&self) -> FormatOptions {
        self.state.read().clone()
    }

    pub fn set_format(&self, options: FormatOptions) {
        *self.state.write() = options;
    }

    /// Independent copy carrying the current format state.
    pub fn detached(&self) -> Self {
        Self::with_options(self.kind, self.format_options())
    }

    pub fn read(&self, reader: &TokenReader<'_>) -> Result<Value> {
        match reader.kind() {
            TokenKind::String => self.parse_text(reader.token_text()),
            found => Err(CodecError::UnexpectedToken {
                expected: self.target().to_string(),
                found,
            }),
        }
    }

    pub fn write(&self, value: &Value, writer: &mut TokenWriter) -> Result<()> {
        let text = self.render(value)?;
        writer.string_value(&text);
        Ok(())
    }

    /// Parses date text under the current format state.
    pub fn parse_text(&self, text: &str) -> Result<Value> {
        let state = self.state.read();
        if state.is_unset() {
            return self.parse_lenient(text);
        }
        let culture = state.provider.clone().unwrap_or_else(Culture::ambient);
        let pattern = resolve_pattern(state.format.as_deref(), &culture, self.kind)?;
        let mismatch = || CodecError::FormatMismatch {
            text: text.to_string(),
            format: state.format.clone().unwrap_or_else(|| pattern.text.clone()),
            target: self.target().to_string(),
        };
        match self.kind {
            DateKind::DateTime => parse_naive_exact(text, &pattern.text)
                .map(Value::DateTime)
                .ok_or_else(mismatch),
            DateKind::DateTimeOffset => {
                let parsed = if has_offset_field(&pattern.text) {
                    DateTime::parse_from_str(text, &pattern.text).ok()
                } else {
                    parse_naive_exact(text, &pattern.text).map(assume_utc)
                };
                parsed.map(Value::DateTimeOffset).ok_or_else(mismatch)
            }
        }
    }

    /// Renders a date value under the current format state.
    pub fn render(&self, value: &Value) -> Result<String> {
        let state = self.state.read();
        let culture = state.provider.clone().unwrap_or_else(Culture::ambient);
        let pattern = resolve_pattern(state.format.as_deref(), &culture, self.kind)?;
        let invalid = || CodecError::InvalidFormat {
            format: state.format.clone().unwrap_or_else(|| pattern.text.clone()),
        };
        let mut out = String::new();
        let written = match (self.kind, value) {
            (DateKind::DateTime, Value::DateTime(dt)) => write!(out, "{}", dt.format(&pattern.text)),
            (DateKind::DateTimeOffset, Value::DateTimeOffset(dt)) if pattern.utc => {
                write!(out, "{}", dt.naive_utc().format(&pattern.text))
            }
            (DateKind::DateTimeOffset, Value::DateTimeOffset(dt)) => {
                write!(out, "{}", dt.format(&pattern.text))
            }
            (_, other) => return Err(other.mismatch(self.target())),
        };
        written.map_err(|_| invalid())?;
        Ok(out)
    }

    fn parse_lenient(&self, text: &str) -> Result<Value> {
        let text = text.trim();
        let parsed = match self.kind {
            DateKind::DateTime => lenient_offset(text)
                .map(|dt| dt.naive_local())
                .or_else(|| lenient_naive(text))
                .map(Value::DateTime),
            DateKind::DateTimeOffset => lenient_offset(text)
                .or_else(|| lenient_naive(text).map(assume_utc))
                .map(Value::DateTimeOffset),
        };
        parsed.ok_or_else(|| CodecError::InvalidScalarRepresentation {
            text: text.to_string(),
            target: self.target().to_string(),
        })
    }
}

fn assume_utc(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    naive.and_utc().fixed_offset()
}

fn has_offset_field(pattern: &str) -> bool {
    StrftimeItems::new(pattern).any(|item| {
        matches!(
            item,
            Item::Fixed(
                Fixed::TimezoneOffset
                    | Fixed::TimezoneOffsetColon
                    | Fixed::TimezoneOffsetDoubleColon
                    | Fixed::TimezoneOffsetTripleColon
                    | Fixed::TimezoneOffsetColonZ
                    | Fixed::TimezoneOffsetZ
                    | Fixed::RFC2822
                    | Fixed::RFC3339
            )
        )
    })
}

/// Naive parse; a date-only pattern yields midnight.
fn parse_naive_exact(text: &str, pattern: &str) -> Option<NaiveDateTime> {
    match NaiveDateTime::parse_from_str(text, pattern) {
        Ok(dt) => Some(dt),
        Err(e) if e.kind() == ParseErrorKind::NotEnough => NaiveDate::parse_from_str(text, pattern)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0)),
        Err(_) => None,
    }
}

/// Offset-bearing forms: RFC 3339, RFC 2822 and the ambient culture's
/// patterns followed by an offset.
fn lenient_offset(text: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt);
    }
    Culture::ambient()
        .parse_patterns()
        .into_iter()
        .filter(|(_, has_time)| *has_time)
        .find_map(|(pattern, _)| DateTime::parse_from_str(text, &format!("{pattern} %:z")).ok())
}

fn lenient_naive(text: &str) -> Option<NaiveDateTime> {
    Culture::ambient()
        .parse_patterns()
        .into_iter()
        .find_map(|(pattern, has_time)| {
            if has_time {
                NaiveDateTime::parse_from_str(text, &pattern).ok()
            } else {
                NaiveDate::parse_from_str(text, &pattern)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            }
        })
}
