// Copyright 2026 Kithare Organization
// SPDX-License-Identifier: MIT

//! Property-based tests for the Kithare scanner.
//!
//! These verify scanner invariants over generated inputs:
//!
//! 1. **Never panics** — arbitrary strings always lex to completion
//! 2. **Spans in bounds** — every token and diagnostic span ends within
//!    the code-point buffer
//! 3. **Monotonic coverage** — token spans never move backwards
//! 4. **Determinism** — the same input lexes identically twice

use proptest::prelude::*;

use crate::source_analysis::{lex, lex_with_eof};

/// Kithare-flavored fragments, valid and deliberately broken, for
/// composing inputs that exercise every scanner path.
const FRAGMENTS: &[&str] = &[
    "x",
    "fib",
    "42",
    "0xFF",
    "0b1010",
    "3.25e2",
    "1p3",
    "2sb",
    "9ul",
    "3.5if",
    "'a'",
    r"'\n'",
    r"'A'",
    "b'x'",
    "\"hello\"",
    "b\"bytes\"",
    "\"\"\"multi\nline\"\"\"",
    "# comment",
    "def",
    "incase",
    "and",
    "not",
    "...",
    "->",
    "<<=",
    ".=",
    "~=",
    "**",
    "( ) { } [ ]",
    // Broken on purpose
    "\"unterminated",
    "'",
    "0x",
    "b'é'",
    "?",
    "\\",
];

const SEPARATORS: &[&str] = &[" ", "\n", "  ", "\t", ";"];

fn fragment() -> impl Strategy<Value = String> {
    prop::sample::select(FRAGMENTS).prop_map(str::to_string)
}

/// One to four fragments joined by whitespace-ish separators.
fn composed_input() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(fragment(), 1..4),
        prop::sample::select(SEPARATORS),
    )
        .prop_map(|(fragments, separator)| fragments.join(separator))
}

proptest! {
    #[test]
    fn lexer_never_panics_on_arbitrary_input(source in any::<String>()) {
        let _ = lex(&source);
    }

    #[test]
    fn lexer_never_panics_on_composed_input(source in composed_input()) {
        let _ = lex(&source);
    }

    #[test]
    fn spans_stay_in_bounds(source in any::<String>()) {
        let length = u32::try_from(source.chars().count()).unwrap_or(u32::MAX);
        let (tokens, diagnostics) = lex_with_eof(&source);

        for token in &tokens {
            prop_assert!(token.span().start() <= token.span().end());
            prop_assert!(token.span().end() <= length);
        }
        for diagnostic in &diagnostics {
            prop_assert!(diagnostic.span.end() <= length);
        }
    }

    #[test]
    fn token_spans_are_monotonic(source in composed_input()) {
        let (tokens, _) = lex_with_eof(&source);

        let mut previous_end = 0;
        for token in &tokens {
            prop_assert!(
                token.span().start() >= previous_end,
                "token {token:?} starts before {previous_end}"
            );
            previous_end = token.span().end();
        }
    }

    #[test]
    fn lexing_is_deterministic(source in composed_input()) {
        let (first_tokens, first_diagnostics) = lex_with_eof(&source);
        let (second_tokens, second_diagnostics) = lex_with_eof(&source);
        prop_assert_eq!(first_tokens, second_tokens);
        prop_assert_eq!(first_diagnostics, second_diagnostics);
    }

    #[test]
    fn stream_always_ends_with_eof(source in any::<String>()) {
        let (tokens, _) = lex_with_eof(&source);
        prop_assert!(tokens.last().is_some_and(|token| token.kind().is_eof()));
    }
}
