//! Brio language toolchain
//!
//! A small imperative language with top-level fields and methods, static
//! nominal typing, a tree-walking interpreter, and a Java source backend.
//! The pipeline is
//!
//! ```text
//! text -> lexer::lex -> parser::parse -> check::check -> interp | codegen
//! ```
//!
//! Each stage is total over its input and fails with a single
//! [`diagnostics::Error`]. The checker's results live in an
//! [`check::Analysis`] side table keyed by node id; the interpreter and the
//! generator both require a checked program.

pub mod ast;
pub mod check;
pub mod codegen;
pub mod common;
pub mod diagnostics;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod types;

pub use diagnostics::{Error, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lex and parse `text`.
pub fn parse_source(text: &str) -> Result<ast::Source> {
    parser::parse(&lexer::lex(text)?)
}

/// Lex, parse, and check `text`.
pub fn analyze(text: &str) -> Result<(ast::Source, check::Analysis)> {
    let source = parse_source(text)?;
    let analysis = check::check(&source)?;
    Ok((source, analysis))
}

/// Run `text` as a program, writing `print` output to `out`, and return
/// `main()`'s value.
pub fn run(text: &str, out: impl std::io::Write) -> Result<interp::Value> {
    let (source, _analysis) = analyze(text)?;
    interp::Interpreter::new(out).run(&source)
}

/// Translate `text` to Java source.
pub fn transpile(text: &str) -> Result<String> {
    let (source, analysis) = analyze(text)?;
    Ok(codegen::generate(&source, &analysis))
}
