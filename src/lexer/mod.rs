//! Lexer for the Brio language
//!
//! Converts raw source text into an ordered token sequence, skipping
//! insignificant whitespace. The token patterns live on [`TokenKind`] as
//! logos rules; this module drives the generated lexer and turns a logos
//! failure into an [`Error::Lex`] whose offset points at the character that
//! cannot start or continue a token.

mod tokens;

pub use tokens::{Token, TokenKind};

use crate::diagnostics::{Error, Result};
use logos::Logos;

const ESCAPES: &[char] = &['b', 'n', 'r', 't', '\'', '"', '\\'];

/// Lex `source` into tokens.
///
/// Total and deterministic: the same input always yields the same tokens or
/// the same error. No partial results are retained across a failure.
pub fn lex(source: &str) -> Result<Vec<Token>> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                text: lexer.slice().to_string(),
                offset: lexer.span().start,
            }),
            Err(()) => return Err(diagnose(source, lexer.span().start)),
        }
    }

    tracing::trace!(count = tokens.len(), "lexed token stream");
    Ok(tokens)
}

/// Pinpoint why the lexer got stuck at `start`.
///
/// The logos failure span is coarse for quoted literals: an unterminated
/// string fails at its opening quote. Re-scan the literal by hand so the
/// reported offset lands on end-of-input, the offending newline, or the
/// malformed escape.
fn diagnose(source: &str, start: usize) -> Error {
    let mut chars = source[start..].char_indices().map(|(i, c)| (start + i, c));

    match chars.next() {
        Some((at, '"')) => diagnose_quoted(chars, at + 1, '"', "string"),
        Some((at, '\'')) => diagnose_quoted(chars, at + 1, '\'', "character"),
        _ => Error::lex("unexpected character", start),
    }
}

fn diagnose_quoted(
    mut chars: impl Iterator<Item = (usize, char)>,
    after_quote: usize,
    quote: char,
    what: &str,
) -> Error {
    let mut contents = 0usize;
    let mut last = after_quote;

    while let Some((at, c)) = chars.next() {
        last = at + c.len_utf8();
        match c {
            c if c == quote => {
                // The literal itself is well formed but logos rejected it:
                // a character literal holding zero or several characters.
                let reason = if contents == 0 {
                    format!("empty {what} literal")
                } else {
                    format!("{what} literal holds more than one character")
                };
                return Error::lex(reason, at);
            }
            '\n' | '\r' => return Error::lex(format!("unterminated {what} literal"), at),
            '\\' => match chars.next() {
                Some((esc, e)) if !ESCAPES.contains(&e) => {
                    return Error::lex("invalid escape sequence", esc);
                }
                Some((esc, e)) => {
                    last = esc + e.len_utf8();
                    contents += 1;
                }
                None => {
                    return Error::lex(format!("unterminated {what} literal"), last);
                }
            },
            _ => contents += 1,
        }
    }

    Error::lex(format!("unterminated {what} literal"), last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(lex("").unwrap().is_empty());
        assert!(lex(" \t\r\n ").unwrap().is_empty());
    }

    #[test]
    fn hyphen_continues_an_identifier() {
        let tokens = lex("x-1").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "x-1");
    }

    #[test]
    fn signed_number_after_number() {
        let tokens = lex("1+1").unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["1", "+1"]);
        assert_eq!(
            kinds("1+1"),
            vec![TokenKind::Integer, TokenKind::Integer]
        );
    }

    #[test]
    fn bare_sign_is_an_operator() {
        let tokens = lex("+ -").unwrap();
        assert_eq!(
            kinds("+ -"),
            vec![TokenKind::Operator, TokenKind::Operator]
        );
        assert_eq!(tokens[1].offset, 2);
    }

    #[test]
    fn compound_operators_prefer_two_characters() {
        let texts: Vec<String> = lex("<= >= == != < =")
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, ["<=", ">=", "==", "!=", "<", "="]);
    }

    #[test]
    fn unterminated_string_points_at_end_of_input() {
        let err = lex("\"abc").unwrap_err();
        assert_eq!(err.offset(), Some(4));
    }

    #[test]
    fn invalid_escape_points_at_the_escape() {
        let err = lex(r#""ab\qcd""#).unwrap_err();
        assert_eq!(err.offset(), Some(4));
    }

    #[test]
    fn newline_terminates_a_string_with_an_error() {
        let err = lex("\"ab\ncd\"").unwrap_err();
        assert_eq!(err.offset(), Some(3));
    }

    #[test]
    fn character_literal_with_escape() {
        let tokens = lex(r"'\n'").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Character);
        assert_eq!(tokens[0].text, r"'\n'");
    }

    #[test]
    fn oversized_character_literal_fails() {
        let err = lex("'ab'").unwrap_err();
        assert!(matches!(err, Error::Lex { .. }));
    }
}
