//! JSON token primitives: a pull reader and a push writer.
//!
//! These are the grammar-level collaborators of the `laxjson` codec. They
//! know nothing about target types; a decoder asks the [`TokenReader`] for
//! the next token and inspects its kind and text, an encoder announces
//! structure to the [`TokenWriter`] and gets compact JSON back.

mod error;
mod reader;
mod writer;

pub use error::TokenError;
pub use reader::{TokenKind, TokenReader};
pub use writer::{format_float, TokenWriter};
