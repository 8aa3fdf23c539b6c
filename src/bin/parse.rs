use clap::Parser;
use cslite::pos::SourceLocator;
use cslite::sexp::ToSExp;
use cslite::{parse_source, ParseOptions};
use std::panic::catch_unwind;
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Error)]
enum CommandError {
    #[error("I/O error")]
    Io(
        #[from]
        #[source]
        std::io::Error,
    ),
    #[error("invalid options file")]
    Options(
        #[from]
        #[source]
        serde_json::Error,
    ),
    #[error("Detected one or more errors")]
    HasError,
}

#[derive(Debug, Parser)]
struct Cli {
    files: Vec<PathBuf>,
    /// JSON file with parse options; missing fields take their defaults.
    #[clap(long)]
    options: Option<PathBuf>,
    /// Treat Spec# keywords as plain identifiers.
    #[clap(long)]
    no_spec_sharp: bool,
    /// Print the syntax tree as an S-expression.
    #[clap(long)]
    sexp: bool,
    /// Print the syntax tree as JSON.
    #[clap(long, conflicts_with = "sexp")]
    json: bool,
    /// Report warnings as well as errors.
    #[clap(long)]
    warnings: bool,
    /// Measure columns in UTF-16 code units instead of bytes.
    #[clap(long)]
    utf16: bool,
}

fn init_tracing() {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> Result<(), CommandError> {
    init_tracing();
    let cli = Cli::parse();
    let mut options = match &cli.options {
        Some(path) => serde_json::from_slice::<ParseOptions>(&std::fs::read(path)?)?,
        None => ParseOptions::default(),
    };
    if cli.no_spec_sharp {
        options.spec_sharp_keywords = false;
    }
    let mut has_error = false;
    for file in &cli.files {
        let source = std::fs::read(file)?;
        let result = catch_unwind(|| parse_source(&source[..], &options));
        let output = match result {
            Ok(output) => output,
            Err(e) => {
                let msg = if let Some(&e) = e.downcast_ref::<&'static str>() {
                    e
                } else if let Some(e) = e.downcast_ref::<String>() {
                    &e[..]
                } else {
                    "Box<Any>"
                };
                has_error = true;
                eprintln!("{}: {}", file.display(), msg);
                continue;
            }
        };
        if cli.sexp {
            println!("{}", output.tree.to_sexp(&output.names));
        } else if cli.json {
            println!("{}", serde_json::to_string_pretty(&output.tree)?);
        }
        let locator = SourceLocator::new(&source);
        for error in &output.errors {
            if !error.is_error() && !cli.warnings {
                continue;
            }
            has_error |= error.is_error();
            let (start, end) = if cli.utf16 {
                (
                    locator.position_utf16(&source, error.range().start()),
                    locator.position_utf16(&source, error.range().end()),
                )
            } else {
                (
                    locator.position_utf8(&source, error.range().start()),
                    locator.position_utf8(&source, error.range().end()),
                )
            };
            eprintln!(
                "{}:{}:{}-{}:{}: {} CS{:04}: {}",
                file.display(),
                start.line + 1,
                start.character,
                end.line + 1,
                end.character,
                if error.is_error() { "error" } else { "warning" },
                error.number(),
                error
            );
        }
    }
    if has_error {
        return Err(CommandError::HasError);
    }
    Ok(())
}
