// Copyright 2026 Kithare Organization
// SPDX-License-Identifier: MIT

//! The `kithare ast` command: parse a file and print the tree.

use camino::Utf8Path;
use kithare_core::source_analysis::parse;
use kithare_core::unparse::unparse_statements;
use miette::Result;

use crate::commands::read_source;
use crate::diagnostic::RenderedDiagnostic;

pub fn run(path: &Utf8Path, unparse: bool) -> Result<()> {
    let source = read_source(path)?;
    let (statements, diagnostics) = parse(&source);

    if unparse {
        println!("{}", unparse_statements(&statements));
    } else {
        println!("{statements:#?}");
    }

    for diagnostic in &diagnostics {
        let report =
            miette::Report::new(RenderedDiagnostic::from_core(diagnostic, path.as_str(), &source));
        eprintln!("{report:?}");
    }

    Ok(())
}
