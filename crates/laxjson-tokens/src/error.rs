use thiserror::Error;

/// Errors raised by [`crate::TokenReader`] and [`crate::TokenWriter`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenError {
    /// The input violates the JSON grammar at the given byte offset.
    #[error("Invalid JSON at position {position}: {reason}")]
    Invalid { position: usize, reason: &'static str },

    /// The input ended where a value was required.
    #[error("Unexpected end of JSON input at position {position}")]
    UnexpectedEnd { position: usize },

    /// JSON has no representation for NaN or infinities.
    #[error("Cannot write non-finite number {0}")]
    NonFiniteNumber(f64),
}
