// Copyright 2026 Kithare Organization
// SPDX-License-Identifier: MIT

//! The `kithare check` command: parse a file and report diagnostics.

use camino::Utf8Path;
use kithare_core::source_analysis::parse;
use miette::Result;
use tracing::debug;

use crate::commands::read_source;
use crate::diagnostic::RenderedDiagnostic;

pub fn run(path: &Utf8Path) -> Result<()> {
    let source = read_source(path)?;
    let (statements, diagnostics) = parse(&source);
    debug!(
        statements = statements.len(),
        diagnostics = diagnostics.len(),
        "checked {path}"
    );

    if diagnostics.is_empty() {
        println!(
            "{path}: ok ({} statement{})",
            statements.len(),
            if statements.len() == 1 { "" } else { "s" }
        );
        return Ok(());
    }

    for diagnostic in &diagnostics {
        let report =
            miette::Report::new(RenderedDiagnostic::from_core(diagnostic, path.as_str(), &source));
        eprintln!("{report:?}");
    }
    miette::bail!(
        "{path}: {} error{} found",
        diagnostics.len(),
        if diagnostics.len() == 1 { "" } else { "s" }
    );
}
