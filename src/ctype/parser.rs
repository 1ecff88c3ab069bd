//! Recursive descent parser for C type strings
//!
//! # Grammar
//!
//! ```text
//! type           ::= specifier_list suffix?
//! specifier_list ::= ( "const" | type_keyword )+
//!                  | "const"* "struct"? identifier
//! suffix         ::= "*"+ | "[" integer "]"
//! ```
//!
//! Specifier keywords may appear in any order; the accumulated
//! [`Specifiers`] set is resolved against the legal C combinations once the
//! list ends. Only one suffix is accepted and the type string must end after
//! it.

use crate::ctype::lexer::{Token, TokenKind};
use crate::ctype::types::{CType, IntWidth};
use std::fmt;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// Character index of the offending token.
    pub index: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error at index {}: {}", self.index, self.message)
    }
}

impl std::error::Error for ParseError {}

/// How often each type keyword appeared in a specifier list.
///
/// `signed` and `unsigned` are flags; everything else is counted so that
/// `long long` stays distinct from `long`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Specifiers {
    pub void: u8,
    pub char: u8,
    pub short: u8,
    pub int: u8,
    pub long: u8,
    pub float: u8,
    pub double: u8,
    pub bool: u8,
    pub signed: bool,
    pub unsigned: bool,
}

impl Specifiers {
    pub fn is_empty(&self) -> bool {
        *self == Specifiers::default()
    }

    /// Record one keyword. Returns false for tokens that are not specifiers.
    pub fn add(&mut self, kind: TokenKind) -> bool {
        let count = match kind {
            TokenKind::Signed => {
                self.signed = true;
                return true;
            }
            TokenKind::Unsigned => {
                self.unsigned = true;
                return true;
            }
            TokenKind::Void => &mut self.void,
            TokenKind::Char => &mut self.char,
            TokenKind::Short => &mut self.short,
            TokenKind::Int => &mut self.int,
            TokenKind::Long => &mut self.long,
            TokenKind::Float => &mut self.float,
            TokenKind::Double => &mut self.double,
            TokenKind::Bool => &mut self.bool,
            _ => return false,
        };
        *count = count.saturating_add(1);
        true
    }

    /// The concrete type for this combination, or `None` when C does not
    /// allow it. `long` is 32 bits and `long long` 64 bits (wasm32).
    pub fn resolve(&self) -> Option<CType> {
        if self.signed && self.unsigned {
            return None;
        }
        let has_sign = self.signed || self.unsigned;
        let signed = !self.unsigned;

        let counts = (
            self.void,
            self.char,
            self.short,
            self.int,
            self.long,
            self.float,
            self.double,
            self.bool,
        );

        match counts {
            (1, 0, 0, 0, 0, 0, 0, 0) if !has_sign => Some(CType::Void),
            (0, 1, 0, 0, 0, 0, 0, 0) => Some(CType::int(IntWidth::W8, signed)),
            (0, 0, 0, 0, 0, 0, 0, 1) if !has_sign => Some(CType::int(IntWidth::W8, true)),
            (0, 0, 1, 0..=1, 0, 0, 0, 0) => Some(CType::int(IntWidth::W16, signed)),
            (0, 0, 0, int, 0, 0, 0, 0) if int == 1 || (int == 0 && has_sign) => {
                Some(CType::int(IntWidth::W32, signed))
            }
            (0, 0, 0, 0..=1, 1, 0, 0, 0) => Some(CType::int(IntWidth::W32, signed)),
            (0, 0, 0, 0..=1, 2, 0, 0, 0) => Some(CType::int(IntWidth::W64, signed)),
            (0, 0, 0, 0, 0, 1, 0, 0) if !has_sign => Some(CType::Float),
            (0, 0, 0, 0, 0, 0, 1, 0) if !has_sign => Some(CType::Double),
            _ => None,
        }
    }
}

/// Parser over the tokens of one type string
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let index = tokens
                .last()
                .map(|t| t.index + t.text.chars().count())
                .unwrap_or(0);
            tokens.push(Token::new(TokenKind::Eof, "", index));
        }
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse the whole token stream into one type.
    pub fn parse(mut self) -> Result<CType, ParseError> {
        let base = self.parse_specifier_qualifier_list()?;
        let ctype = self.parse_pointer_or_array(base)?;

        if !self.check(TokenKind::Eof) {
            return Err(self.error(format!(
                "Unexpected {} after type '{}'",
                self.peek_token(),
                ctype
            )));
        }

        Ok(ctype)
    }

    /// Parse specifiers and qualifiers up to the first non-specifier token
    fn parse_specifier_qualifier_list(&mut self) -> Result<CType, ParseError> {
        let mut specifiers = Specifiers::default();
        let mut spelled: Vec<String> = Vec::new();
        let start = self.peek_token().index;

        loop {
            let kind = self.peek_token().kind;
            match kind {
                TokenKind::Const => {
                    self.advance();
                }
                TokenKind::Struct | TokenKind::Ident => {
                    // struct names never combine with other specifiers
                    if !specifiers.is_empty() {
                        return Err(self.error(format!(
                            "Unexpected {} after '{}'",
                            self.peek_token(),
                            spelled.join(" ")
                        )));
                    }
                    if kind == TokenKind::Struct {
                        self.advance();
                        if !self.check(TokenKind::Ident) {
                            return Err(self.error(format!(
                                "Expected struct name after 'struct', found {}",
                                self.peek_token()
                            )));
                        }
                    }
                    let name = self.advance().text.clone();
                    while self.match_token(TokenKind::Const) {}
                    return Ok(CType::StructRef { name });
                }
                _ if kind.is_type_specifier() => {
                    let token = self.advance();
                    spelled.push(token.text.clone());
                    specifiers.add(kind);
                }
                _ => break,
            }
        }

        if specifiers.is_empty() {
            return Err(self.error(format!(
                "Expected type specifier, found {}",
                self.peek_token()
            )));
        }

        specifiers.resolve().ok_or_else(|| ParseError {
            message: format!("Invalid type specifier combination '{}'", spelled.join(" ")),
            index: start,
        })
    }

    /// Wrap `base` in the optional `*`-run or `[N]` suffix
    fn parse_pointer_or_array(&mut self, base: CType) -> Result<CType, ParseError> {
        if self.check(TokenKind::Star) {
            let mut depth = 0;
            while self.match_token(TokenKind::Star) {
                depth += 1;
            }
            return Ok(base.pointer_to(depth));
        }

        if self.match_token(TokenKind::LBracket) {
            if !self.check(TokenKind::IntLiteral) {
                return Err(self.error(format!(
                    "Expected array length, found {}",
                    self.peek_token()
                )));
            }
            let token = self.advance();
            let index = token.index;
            let length = token.text.parse::<usize>().map_err(|_| ParseError {
                message: format!("Array length {} is too large", token.text),
                index,
            })?;

            if !self.match_token(TokenKind::RBracket) {
                return Err(self.error(format!(
                    "Expected ']' after array length, found {}",
                    self.peek_token()
                )));
            }
            return Ok(base.array_of(length));
        }

        Ok(base)
    }

    // ===== Helper methods =====

    fn peek_token(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_token().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the current token. Never moves past the end-of-stream token.
    fn advance(&mut self) -> &Token {
        let current = self.position;
        if self.tokens[current].kind != TokenKind::Eof {
            self.position += 1;
        }
        &self.tokens[current]
    }

    fn error(&self, message: String) -> ParseError {
        ParseError {
            message,
            index: self.peek_token().index,
        }
    }
}

/// Parse a token stream into a type.
pub fn parse(tokens: Vec<Token>) -> Result<CType, ParseError> {
    Parser::new(tokens).parse()
}
