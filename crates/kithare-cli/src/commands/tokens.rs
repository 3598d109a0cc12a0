// Copyright 2026 Kithare Organization
// SPDX-License-Identifier: MIT

//! The `kithare tokens` command: dump the token stream.

use camino::Utf8Path;
use kithare_core::source_analysis::lex_with_eof;
use miette::Result;

use crate::commands::read_source;
use crate::diagnostic::RenderedDiagnostic;

pub fn run(path: &Utf8Path) -> Result<()> {
    let source = read_source(path)?;
    let (tokens, diagnostics) = lex_with_eof(&source);

    for token in &tokens {
        let span = token.span();
        println!("{:>5}..{:<5} {:?}", span.start(), span.end(), token.kind());
    }

    for diagnostic in &diagnostics {
        let report =
            miette::Report::new(RenderedDiagnostic::from_core(diagnostic, path.as_str(), &source));
        eprintln!("{report:?}");
    }

    Ok(())
}
