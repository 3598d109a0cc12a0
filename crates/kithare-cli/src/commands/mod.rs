// Copyright 2026 Kithare Organization
// SPDX-License-Identifier: MIT

//! Subcommand implementations for the `kithare` binary.

pub mod ast;
pub mod check;
pub mod tokens;

use camino::Utf8Path;
use miette::{Context, IntoDiagnostic, Result};

/// Reads a source file, attaching the path to any I/O error.
pub fn read_source(path: &Utf8Path) -> Result<String> {
    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {path}"))
}
