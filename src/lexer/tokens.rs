//! Token definitions for the Brio lexer

use crate::common::Span;
use logos::Logos;
use serde::{Deserialize, Serialize};

/// A token with its kind, exact source text, and byte offset
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub offset: usize,
}

impl Token {
    pub fn span(&self) -> Span {
        Span::new(self.offset, self.offset + self.text.len())
    }
}

/// Token kinds recognized by the lexer
///
/// The set is deliberately small: keywords are identifiers, and every
/// operator shares one kind. The parser disambiguates by text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Serialize, Deserialize)]
#[logos(skip r"[ \t\n\r\x08\x0b\x0c]+")]
pub enum TokenKind {
    #[regex(r"[A-Za-z_][A-Za-z0-9_-]*")]
    Identifier,

    #[regex(r"[+-]?[0-9]+", priority = 3)]
    Integer,

    #[regex(r"[+-]?[0-9]+\.[0-9]+", priority = 4)]
    Decimal,

    #[regex(r#"'([^'\\\n\r]|\\[bnrt'"\\])'"#)]
    Character,

    #[regex(r#""([^"\\\n\r]|\\[bnrt'"\\])*""#)]
    String,

    // Two-character comparison operators win over their one-character
    // prefixes; otherwise any single non-whitespace character is an
    // operator. Quotes are excluded so broken literals fail the lex.
    #[regex(r"[<>!=]=", priority = 3)]
    #[regex(r#"[^ \t\n\r\x08\x0b\x0c'"]"#, priority = 0)]
    Operator,
}

impl TokenKind {
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "an identifier",
            TokenKind::Integer => "an integer literal",
            TokenKind::Decimal => "a decimal literal",
            TokenKind::Character => "a character literal",
            TokenKind::String => "a string literal",
            TokenKind::Operator => "an operator",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}
