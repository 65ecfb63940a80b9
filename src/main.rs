//! `brioc`, the Brio command line

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Report, WrapErr};
use num_traits::ToPrimitive;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "brioc", version, about = "The Brio language toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check and evaluate a program; the process exits with `main()`'s value
    Run { file: PathBuf },
    /// Analyze a program and report the first error, if any
    Check { file: PathBuf },
    /// Translate a program to Java source
    Gen {
        file: PathBuf,
        /// Write the Java text here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Dump the token stream
    Lex { file: PathBuf },
    /// Dump the syntax tree as JSON
    Ast { file: PathBuf },
}

fn main() -> miette::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match Cli::parse().command {
        Command::Run { file } => {
            let text = load(&file)?;
            let value = report(brio::run(&text, io::stdout().lock()), &text)?;
            if let brio::interp::Value::Integer(code) = &value {
                std::process::exit(code.to_i32().unwrap_or(0));
            }
            Ok(())
        }
        Command::Check { file } => {
            let text = load(&file)?;
            report(brio::analyze(&text), &text)?;
            println!("ok");
            Ok(())
        }
        Command::Gen { file, output } => {
            let text = load(&file)?;
            let java = report(brio::transpile(&text), &text)?;
            match output {
                Some(path) => fs::write(&path, java)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("cannot write {}", path.display())),
                None => {
                    print!("{java}");
                    Ok(())
                }
            }
        }
        Command::Lex { file } => {
            let text = load(&file)?;
            let tokens = report(brio::lexer::lex(&text), &text)?;
            for token in tokens {
                println!("{:>5}  {:<10}  {}", token.offset, format!("{:?}", token.kind), token.text);
            }
            Ok(())
        }
        Command::Ast { file } => {
            let text = load(&file)?;
            let source = report(brio::parse_source(&text), &text)?;
            let json = serde_json::to_string_pretty(&source).into_diagnostic()?;
            println!("{json}");
            Ok(())
        }
    }
}

fn load(path: &Path) -> miette::Result<String> {
    fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot read {}", path.display()))
}

/// Attach the source text so miette can render labeled snippets.
fn report<T>(result: brio::Result<T>, text: &str) -> miette::Result<T> {
    result.map_err(|error| Report::new(error).with_source_code(text.to_string()))
}
