//! `TokenWriter`: push-style writer producing compact JSON text.
//!
//! Separators are tracked internally, so callers only announce structure:
//! start/end of containers, property names and literal values.

use crate::TokenError;

#[derive(Debug, Clone, Copy)]
struct Frame {
    has_items: bool,
}

/// Compact JSON writer.
///
/// # Example
///
/// ```
/// use laxjson_tokens::TokenWriter;
///
/// let mut writer = TokenWriter::new();
/// writer.start_object();
/// writer.property_name("1");
/// writer.string_value("one");
/// writer.property_name("2");
/// writer.f64_value(2.5).unwrap();
/// writer.end_object();
/// assert_eq!(writer.finish(), r#"{"1":"one","2":2.5}"#);
/// ```
#[derive(Debug, Default)]
pub struct TokenWriter {
    out: String,
    stack: Vec<Frame>,
    after_name: bool,
}

impl TokenWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_object(&mut self) {
        self.before_value();
        self.out.push('{');
        self.stack.push(Frame { has_items: false });
    }

    pub fn end_object(&mut self) {
        debug_assert!(!self.after_name, "property name without value");
        self.stack.pop();
        self.out.push('}');
    }

    pub fn start_array(&mut self) {
        self.before_value();
        self.out.push('[');
        self.stack.push(Frame { has_items: false });
    }

    pub fn end_array(&mut self) {
        self.stack.pop();
        self.out.push(']');
    }

    pub fn property_name(&mut self, name: &str) {
        self.before_value();
        self.write_str(name);
        self.out.push(':');
        self.after_name = true;
    }

    pub fn string_value(&mut self, value: &str) {
        self.before_value();
        self.write_str(value);
    }

    pub fn i64_value(&mut self, value: i64) {
        self.before_value();
        self.out.push_str(&value.to_string());
    }

    pub fn f64_value(&mut self, value: f64) -> Result<(), TokenError> {
        if !value.is_finite() {
            return Err(TokenError::NonFiniteNumber(value));
        }
        self.before_value();
        self.out.push_str(&format_float(value));
        Ok(())
    }

    /// Writes pre-formatted number text verbatim.
    pub fn raw_number_value(&mut self, text: &str) {
        self.before_value();
        self.out.push_str(text);
    }

    pub fn bool_value(&mut self, value: bool) {
        self.before_value();
        self.out.push_str(if value { "true" } else { "false" });
    }

    pub fn null_value(&mut self) {
        self.before_value();
        self.out.push_str("null");
    }

    /// Returns the JSON written so far.
    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn before_value(&mut self) {
        if self.after_name {
            self.after_name = false;
            return;
        }
        if let Some(top) = self.stack.last_mut() {
            if top.has_items {
                self.out.push(',');
            }
            top.has_items = true;
        }
    }

    fn write_str(&mut self, s: &str) {
        // Fast path: printable ASCII without quotes or backslashes.
        let plain = s
            .bytes()
            .all(|b| (32..=126).contains(&b) && b != b'"' && b != b'\\');
        if plain {
            self.out.reserve(s.len() + 2);
            self.out.push('"');
            self.out.push_str(s);
            self.out.push('"');
            return;
        }
        match serde_json::to_string(s) {
            Ok(escaped) => self.out.push_str(&escaped),
            Err(_) => self.out.push_str("\"\""),
        }
    }
}

/// Shortest round-trip text for a finite float; integral values below 1e15
/// print without a fractional part. Negative zero keeps its sign.
pub fn format_float(f: f64) -> String {
    let negative_zero = f == 0.0 && f.is_sign_negative();
    if f.fract() == 0.0 && f.abs() < 1e15 && !negative_zero {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_containers_get_separators() {
        let mut w = TokenWriter::new();
        w.start_object();
        w.property_name("a");
        w.start_array();
        w.i64_value(1);
        w.null_value();
        w.start_object();
        w.end_object();
        w.end_array();
        w.property_name("b");
        w.bool_value(false);
        w.end_object();
        assert_eq!(w.finish(), r#"{"a":[1,null,{}],"b":false}"#);
    }

    #[test]
    fn escapes_strings() {
        let mut w = TokenWriter::new();
        w.string_value("say \"hi\"\n");
        assert_eq!(w.finish(), r#""say \"hi\"\n""#);
    }

    #[test]
    fn rejects_non_finite_floats() {
        let mut w = TokenWriter::new();
        assert_eq!(
            w.f64_value(f64::NAN).unwrap_err().to_string(),
            "Cannot write non-finite number NaN"
        );
        assert_eq!(w.as_str(), "");
    }

    #[test]
    fn float_formatting() {
        assert_eq!(format_float(1.0), "1");
        assert_eq!(format_float(-0.5), "-0.5");
        assert_eq!(format_float(-0.0), "-0");
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(1.1), "1.1");
        assert_eq!(format_float(0.1 + 0.2), "0.30000000000000004");
    }
}
