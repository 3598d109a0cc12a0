// Copyright 2026 Kithare Organization
// SPDX-License-Identifier: MIT

//! Rendering core diagnostics with miette.
//!
//! Converts `kithare-core` diagnostics into miette reports with source
//! context and an arrow at the error location. Core spans count code
//! points; miette wants byte offsets, so the conversion walks the
//! original source text.

// The `kind` field is informational for now
#![allow(unused)]

use kithare_core::source_analysis::{Diagnostic as CoreDiagnostic, DiagnosticKind};
use miette::{Diagnostic, SourceSpan};

/// A front-end diagnostic with source context for terminal rendering.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic(code(kithare::syntax))]
pub struct RenderedDiagnostic {
    /// Which stage reported it.
    pub kind: DiagnosticKind,
    /// Human-readable message.
    pub message: String,
    /// Source text for context.
    #[source_code]
    pub src: miette::NamedSource<String>,
    /// Byte-offset location of the error.
    #[label("{label}")]
    pub span: SourceSpan,
    /// Label under the arrow.
    pub label: String,
    /// Fix suggestion, when the core diagnostic carries one.
    #[help]
    pub help: Option<String>,
}

impl RenderedDiagnostic {
    /// Builds a rendered diagnostic from a core diagnostic.
    pub fn from_core(diagnostic: &CoreDiagnostic, source_path: &str, source: &str) -> Self {
        let label = match diagnostic.kind {
            DiagnosticKind::Lexer => "lexical error here",
            DiagnosticKind::Parser => "syntax error here",
        };

        let start = byte_offset(source, diagnostic.span.start());
        let end = byte_offset(source, diagnostic.span.end());

        Self {
            kind: diagnostic.kind,
            message: diagnostic.message.to_string(),
            src: miette::NamedSource::new(source_path, source.to_string()),
            span: (start, end.saturating_sub(start)).into(),
            label: label.to_string(),
            help: diagnostic.hint.as_ref().map(ToString::to_string),
        }
    }
}

/// Maps a code-point offset into a byte offset of `source`.
fn byte_offset(source: &str, code_point: u32) -> usize {
    source
        .char_indices()
        .nth(code_point as usize)
        .map_or(source.len(), |(offset, _)| offset)
}
