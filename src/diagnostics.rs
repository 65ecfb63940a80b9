//! Diagnostic reporting with source locations
//!
//! One error kind per pipeline phase, as rich miette diagnostics. Lexer and
//! parser errors carry the byte offset that triggered them; checker and
//! runtime errors carry a human-readable reason.

use crate::common::Span;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Convert our Span to miette's SourceSpan. Point spans widen to one
/// column so the label still marks a position.
impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        let len = if span.is_empty() { 1 } else { span.len() };
        SourceSpan::new(span.start.into(), len)
    }
}

/// Toolchain diagnostic
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum Error {
    /// Malformed character sequence.
    #[error("lex error: {reason}")]
    #[diagnostic(code(lex::invalid_input))]
    Lex {
        reason: String,
        #[label("{reason}")]
        span: SourceSpan,
    },

    /// Malformed token sequence relative to the grammar.
    #[error("parse error: expected {expected}")]
    #[diagnostic(code(parse::unexpected_token))]
    Parse {
        expected: String,
        #[label("expected {expected} here")]
        span: SourceSpan,
    },

    /// Semantically invalid program.
    #[error("type error: {reason}")]
    #[diagnostic(code(check::invalid_program))]
    Type { reason: String },

    /// Dynamic failure during evaluation.
    #[error("runtime error: {reason}")]
    #[diagnostic(code(interp::evaluation_failed))]
    Runtime { reason: String },
}

impl Error {
    pub fn lex(reason: impl Into<String>, offset: usize) -> Self {
        Error::Lex {
            reason: reason.into(),
            span: Span::point(offset).into(),
        }
    }

    pub fn parse(expected: impl Into<String>, span: Span) -> Self {
        Error::Parse {
            expected: expected.into(),
            span: span.into(),
        }
    }

    pub fn type_error(reason: impl Into<String>) -> Self {
        Error::Type {
            reason: reason.into(),
        }
    }

    pub fn runtime(reason: impl Into<String>) -> Self {
        Error::Runtime {
            reason: reason.into(),
        }
    }

    /// Source offset for lexer/parser errors.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Lex { span, .. } | Error::Parse { span, .. } => Some(span.offset()),
            Error::Type { .. } | Error::Runtime { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_carry_their_width() {
        let span = SourceSpan::from(Span::new(2, 5));
        assert_eq!(span.offset(), 2);
        assert_eq!(span.len(), 3);
    }

    #[test]
    fn point_spans_widen_to_one_column() {
        let span = SourceSpan::from(Span::point(7));
        assert_eq!(span.offset(), 7);
        assert_eq!(span.len(), 1);
        assert_eq!(Error::lex("oops", 7).offset(), Some(7));
    }

    #[test]
    fn parse_errors_keep_the_token_span() {
        let err = Error::parse("`;`", Span::new(10, 13));
        assert_eq!(err.offset(), Some(10));
    }
}
