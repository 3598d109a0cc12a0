// Copyright 2026 Kithare Organization
// SPDX-License-Identifier: MIT

//! Kithare front-end command-line interface.
//!
//! This is the entry point for the `kithare` command. It drives the
//! front-end only: checking syntax, dumping the token stream, and
//! printing the parsed tree.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use miette::Result;

mod commands;
mod diagnostic;

/// Kithare: an easy, codable programming language
#[derive(Debug, Parser)]
#[command(name = "kithare")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a source file for syntax errors without building anything
    Check {
        /// Source file to check
        path: Utf8PathBuf,
    },

    /// Dump the token stream of a source file
    Tokens {
        /// Source file to tokenize
        path: Utf8PathBuf,
    },

    /// Parse a source file and print its tree
    Ast {
        /// Source file to parse
        path: Utf8PathBuf,

        /// Print the reparseable source form instead of the debug tree
        #[arg(long)]
        unparse: bool,
    },
}

fn main() -> Result<()> {
    // Initialize tracing only when RUST_LOG is explicitly set, keeping
    // stderr clean otherwise
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init();
    }

    // Install miette's fancy error handler
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    match cli.command {
        Command::Check { path } => commands::check::run(&path),
        Command::Tokens { path } => commands::tokens::run(&path),
        Command::Ast { path, unparse } => commands::ast::run(&path, unparse),
    }
}
