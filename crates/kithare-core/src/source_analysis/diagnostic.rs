// Copyright 2026 Kithare Organization
// SPDX-License-Identifier: MIT

//! The diagnostic sink shared by the scanner and the parser.
//!
//! The front-end never aborts: malformed input produces a best-effort
//! token stream and AST plus zero or more [`Diagnostic`] records. A
//! non-empty sink after [`parse`](super::parse) means "the parse had
//! errors" even though a tree was returned.

use ecow::EcoString;

use super::Span;

/// Which stage recorded the diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Malformed literal, unknown character, unterminated string,
    /// numeric overflow, byte-context unicode escape.
    Lexer,
    /// Missing keyword or delimiter, wrong statement head, malformed
    /// for-header arity, specifier where disallowed.
    Parser,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexer => write!(f, "lexer"),
            Self::Parser => write!(f, "parser"),
        }
    }
}

/// A single `{kind, offset, message}` record in the sink.
///
/// # Examples
///
/// ```
/// use kithare_core::source_analysis::{Diagnostic, Span};
///
/// let diagnostic = Diagnostic::parser("expecting a `def` keyword", Span::new(4, 7));
/// assert_eq!(diagnostic.message, "expecting a `def` keyword");
/// assert!(diagnostic.hint.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The stage that recorded this diagnostic.
    pub kind: DiagnosticKind,
    /// What went wrong.
    pub message: EcoString,
    /// Where it went wrong, in code-point offsets.
    pub span: Span,
    /// A concrete fix suggestion, where one exists.
    pub hint: Option<EcoString>,
}

impl Diagnostic {
    /// Creates a scanner diagnostic.
    #[must_use]
    pub fn lexer(message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            kind: DiagnosticKind::Lexer,
            message: message.into(),
            span,
            hint: None,
        }
    }

    /// Creates a parser diagnostic.
    #[must_use]
    pub fn parser(message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            kind: DiagnosticKind::Parser,
            message: message.into(),
            span,
            hint: None,
        }
    }

    /// Attaches a fix suggestion.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<EcoString>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} error at {}: {}",
            self.kind,
            self.span.start(),
            self.message
        )?;
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}
