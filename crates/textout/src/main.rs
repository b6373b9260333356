//! textout CLI - BBCode-like markup translator.
//!
//! Provides commands for:
//! - `translate`: Translate markup files (or stdin) to HTML or Lightscript
//! - `tokens`: Show the units the tokenizer produces for a file

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{TokensArgs, TranslateArgs};
use output::Output;

/// textout - BBCode-like markup translator.
#[derive(Parser)]
#[command(name = "textout", version, about)]
struct Cli {
    /// Enable verbose output (log recovered markup errors).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate markup to HTML or Lightscript.
    Translate(TranslateArgs),
    /// Print the tokenizer units of a document.
    Tokens(TokensArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Translate(args) => args.execute(),
        Commands::Tokens(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
