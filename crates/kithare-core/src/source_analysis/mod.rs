// Copyright 2026 Kithare Organization
// SPDX-License-Identifier: MIT

//! Source analysis for Kithare: scanner, parser, and diagnostics.
//!
//! # Lexical Analysis
//!
//! The [`Lexer`] walks a pre-decoded code-point buffer and produces one
//! [`Token`] per call, with [`lex`] / [`lex_with_eof`] as string-in
//! conveniences:
//!
//! ```
//! use kithare_core::source_analysis::{lex, TokenKind};
//!
//! let (tokens, diagnostics) = lex("x + 1");
//! assert_eq!(tokens.len(), 3);
//! assert!(diagnostics.is_empty());
//! ```
//!
//! # Parsing
//!
//! [`parse`] builds a [`Statement`](crate::ast::Statement) sequence from
//! source text; [`parse_expression`] exposes the expression ladder for
//! test harnesses. Both always return a best-effort tree plus the
//! diagnostic sink.
//!
//! # Error Handling
//!
//! Nothing here aborts. Scanner and parser problems become
//! [`Diagnostic`] records (tagged [`DiagnosticKind::Lexer`] or
//! [`DiagnosticKind::Parser`]) and parsing continues with synthesized
//! placeholder nodes.

mod diagnostic;
mod lexer;
mod parser;
mod span;
mod token;

#[cfg(test)]
mod lexer_property_tests;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use lexer::{Lexer, lex, lex_with_eof};
pub use parser::{parse, parse_expression};
pub use span::Span;
pub use token::{Delimiter, Keyword, Operator, Token, TokenKind};

pub(crate) use token::escape_char;
