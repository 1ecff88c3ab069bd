//! Lexer (tokenizer) for C type strings
//!
//! Converts a type string such as `"const unsigned char *"` into a flat
//! [`Token`] stream consumed by the parser. Keywords are recognised after the
//! fact: every word is scanned as an identifier first and re-tagged when its
//! text is a reserved keyword.

use std::fmt;

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Void,
    Char,
    Short,
    Int,
    Long,
    Signed,
    Unsigned,
    Float,
    Double,
    Const,
    Bool,
    Struct,

    // Separators
    Star,     // *
    LBracket, // [
    RBracket, // ]

    IntLiteral,
    Ident,

    // End of stream
    Eof,
}

impl TokenKind {
    /// Keyword kind for a scanned word, if the word is reserved.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "void" => TokenKind::Void,
            "char" => TokenKind::Char,
            "short" => TokenKind::Short,
            "int" => TokenKind::Int,
            "long" => TokenKind::Long,
            "signed" => TokenKind::Signed,
            "unsigned" => TokenKind::Unsigned,
            "float" => TokenKind::Float,
            "double" => TokenKind::Double,
            "const" => TokenKind::Const,
            "bool" => TokenKind::Bool,
            "struct" => TokenKind::Struct,
            _ => return None,
        };
        Some(kind)
    }

    /// True for the keywords that take part in a specifier combination.
    pub fn is_type_specifier(self) -> bool {
        matches!(
            self,
            TokenKind::Void
                | TokenKind::Char
                | TokenKind::Short
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Signed
                | TokenKind::Unsigned
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::Bool
        )
    }
}

/// Separator spellings, searched longest-match first.
const SEPARATORS: &[(&str, TokenKind)] = &[
    ("*", TokenKind::Star),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
];

fn separator_kind(text: &str) -> Option<TokenKind> {
    SEPARATORS
        .iter()
        .find(|(spelling, _)| *spelling == text)
        .map(|(_, kind)| *kind)
}

/// A classified piece of a type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Character index of the first character of the token.
    pub index: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, index: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            index,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::IntLiteral => write!(f, "integer literal {}", self.text),
            TokenKind::Ident => write!(f, "identifier '{}'", self.text),
            TokenKind::Eof => write!(f, "end of type string"),
            _ => write!(f, "'{}'", self.text),
        }
    }
}

/// A character outside the type-string grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub character: char,
    pub index: usize,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lexer error at index {}: unexpected character '{}'",
            self.index,
            self.character.escape_default()
        )
    }
}

impl std::error::Error for LexError {}

/// Lexer for one C type string
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the entire input. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek() {
            let start = self.position;

            if matches!(ch, ' ' | '\t' | '\r' | '\n') {
                self.advance();
            } else if ch.is_ascii_digit() {
                tokens.push(self.integer_literal());
            } else if ch.is_ascii_alphabetic() || ch == '_' {
                let mut token = self.identifier();
                // classify as identifier first, then check the keyword table
                if let Some(kind) = TokenKind::keyword(&token.text) {
                    token.kind = kind;
                }
                tokens.push(token);
            } else if separator_kind(&ch.to_string()).is_some() {
                tokens.push(self.separator());
            } else {
                return Err(LexError {
                    character: ch,
                    index: start,
                });
            }
        }

        tokens.push(Token::new(TokenKind::Eof, "", self.position));
        Ok(tokens)
    }

    fn integer_literal(&mut self) -> Token {
        let start = self.position;
        let mut text = String::new();

        while let Some(ch) = self.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            text.push(ch);
            self.advance();
        }

        Token::new(TokenKind::IntLiteral, text, start)
    }

    fn identifier(&mut self) -> Token {
        let start = self.position;
        let mut text = String::new();

        while let Some(ch) = self.peek() {
            if !(ch.is_ascii_alphanumeric() || ch == '_') {
                break;
            }
            text.push(ch);
            self.advance();
        }

        Token::new(TokenKind::Ident, text, start)
    }

    /// Longest known separator starting at the current position. Extends one
    /// character at a time and backs off when the longer text is unknown.
    fn separator(&mut self) -> Token {
        let start = self.position;
        let mut text = String::new();
        let mut kind = TokenKind::Eof;

        while let Some(ch) = self.peek() {
            text.push(ch);
            match separator_kind(&text) {
                Some(longer) => {
                    kind = longer;
                    self.advance();
                }
                None => {
                    text.pop();
                    break;
                }
            }
        }

        Token::new(kind, text, start)
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        Some(ch)
    }
}

/// Tokenize a type string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).tokenize()
}
