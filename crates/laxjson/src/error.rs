use laxjson_tokens::{TokenError, TokenKind};
use thiserror::Error;

/// Errors surfaced by decode and encode calls.
///
/// Decoding never returns partial results: the first failure aborts the
/// whole call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// A container did not start with the expected token.
    #[error("Malformed JSON: expected {expected}, found {found}")]
    MalformedContainer {
        expected: TokenKind,
        found: TokenKind,
    },

    /// Input ended before the container was closed.
    #[error("Malformed JSON: no {expected} token found")]
    UnterminatedContainer { expected: TokenKind },

    /// The token is neither a parseable string nor a native value of the
    /// target scalar type.
    #[error("JSON value \"{text}\" is not a valid {target} or string representation of {target}")]
    InvalidScalarRepresentation { text: String, target: String },

    #[error("Unable to convert \"{key}\" to map key of type {target}")]
    UnknownMapKey { key: String, target: String },

    #[error("Unable to convert \"{member}\" to enum {target}")]
    UnknownEnumMember { member: String, target: String },

    /// An explicit format or provider is configured and the text does not
    /// match it exactly.
    #[error("\"{text}\" does not match format \"{format}\" for {target}")]
    FormatMismatch {
        text: String,
        format: String,
        target: String,
    },

    #[error("Invalid format string \"{format}\"")]
    InvalidFormat { format: String },

    /// A dynamic value does not fit the shape it is being encoded or
    /// converted as.
    #[error("Expected a {expected} value, found {found}")]
    TypeMismatch { expected: String, found: &'static str },

    /// A structural or strict path met a token it cannot start from.
    #[error("Unexpected {found} token while reading {expected}")]
    UnexpectedToken { expected: String, found: TokenKind },

    /// The shape needs a converter and none is registered.
    #[error("{target} cannot be handled without a registered converter")]
    Unsupported { target: String },

    #[error("Invalid codec settings: {0}")]
    Settings(String),

    #[error(transparent)]
    Token(#[from] TokenError),
}

pub type Result<T> = std::result::Result<T, CodecError>;
