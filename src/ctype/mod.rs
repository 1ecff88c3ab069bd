//! C type-string model
//!
//! This module turns the type strings of an API description into [`CType`]
//! values:
//! - [`lexer`]: Tokenization (type string → tokens)
//! - [`parser`]: Parsing (tokens → [`CType`])
//! - [`types`]: The [`CType`] sum type
//!
//! # Supported Type Strings
//!
//! - Specifier lists in any order: `unsigned long long int`, `char const`
//! - `const` qualifiers anywhere in the specifier list (ignored)
//! - Struct names, optionally spelled `struct Name`
//! - One suffix: a run of `*`, or a single `[N]`
//!
//! Function pointers, multi-dimensional arrays and varargs are rejected.

pub mod lexer;
pub mod parser;
pub mod types;

pub use lexer::{tokenize, LexError, Token, TokenKind};
pub use parser::{parse, ParseError};
pub use types::{CType, IntWidth};

use std::fmt;

/// Failure to turn a type string into a [`CType`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CTypeError {
    Lex(LexError),
    Parse(ParseError),
}

impl fmt::Display for CTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CTypeError::Lex(err) => write!(f, "{}", err),
            CTypeError::Parse(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CTypeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CTypeError::Lex(err) => Some(err),
            CTypeError::Parse(err) => Some(err),
        }
    }
}

impl From<LexError> for CTypeError {
    fn from(err: LexError) -> Self {
        CTypeError::Lex(err)
    }
}

impl From<ParseError> for CTypeError {
    fn from(err: ParseError) -> Self {
        CTypeError::Parse(err)
    }
}

/// Lex and parse one type string.
pub fn parse_type(text: &str) -> Result<CType, CTypeError> {
    let tokens = tokenize(text)?;
    Ok(parse(tokens)?)
}
