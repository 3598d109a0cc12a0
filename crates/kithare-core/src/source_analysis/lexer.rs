// Copyright 2026 Kithare Organization
// SPDX-License-Identifier: MIT

//! Lexical analysis for Kithare source code.
//!
//! The scanner is hand-written and cursor-driven: each [`Lexer::next_token`]
//! call skips inter-token whitespace and produces exactly one token,
//! advancing the cursor past the consumed code points. A bare `\n` is a
//! token of its own (the parser treats it as a statement terminator), and a
//! `#` comment up to and including its newline is a single
//! [`TokenKind::Comment`].
//!
//! # Error Recovery
//!
//! The scanner never fails and never stalls. Unknown characters,
//! unterminated literals, and malformed escapes push a [`Diagnostic`] into
//! the sink, synthesize the best partial value, and keep going — if no
//! recognizable token starts at the cursor, at least one code point is
//! consumed before trying again.
//!
//! # Example
//!
//! ```
//! use kithare_core::source_analysis::{lex, TokenKind};
//!
//! let (tokens, diagnostics) = lex("x + 1");
//! assert_eq!(tokens.len(), 3); // x, +, 1 (EOF excluded)
//! assert!(diagnostics.is_empty());
//! ```

use ecow::EcoString;

use super::{Delimiter, Diagnostic, Keyword, Operator, Span, Token, TokenKind};

/// Maps a code point to its numeric digit value.
///
/// Letters cover the bases above ten (`digit_of('F') == 15`); `0xFF`
/// marks a non-digit, which is out of range for every supported base.
const fn digit_of(c: char) -> u8 {
    match c {
        '0'..='9' => c as u8 - b'0',
        'A'..='Z' => c as u8 - b'A' + 10,
        'a'..='z' => c as u8 - b'a' + 10,
        _ => 0xFF,
    }
}

/// Returns `true` if the code point can begin an identifier.
fn is_word_start(c: char) -> bool {
    c.is_alphabetic()
}

/// Returns `true` if the code point can continue an identifier.
fn is_word_continue(c: char) -> bool {
    c.is_alphanumeric()
}

/// A scanner over a pre-decoded code-point buffer.
///
/// The cursor (a buffer index) is the scanner's sole state besides the
/// diagnostic sink. It implements [`Iterator`], yielding tokens until
/// end of input.
pub struct Lexer<'src> {
    /// The decoded source being scanned.
    source: &'src [char],
    /// Current code-point offset.
    position: usize,
    /// Collected scanner diagnostics.
    diagnostics: Vec<Diagnostic>,
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("position", &self.position)
            .field("remaining", &(self.source.len() - self.position))
            .finish()
    }
}

impl<'src> Lexer<'src> {
    /// Creates a scanner over the given code-point buffer.
    #[must_use]
    pub fn new(source: &'src [char]) -> Self {
        Self {
            source,
            position: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Consumes the scanner and returns its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Peeks at the next code point without consuming it.
    fn peek_char(&self) -> Option<char> {
        self.source.get(self.position).copied()
    }

    /// Peeks `n` code points past the next one (`peek_char_n(0)` is
    /// `peek_char`).
    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.source.get(self.position + n).copied()
    }

    /// Consumes the next code point and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.position += 1;
        Some(c)
    }

    /// Consumes code points while the predicate holds.
    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&predicate) {
            self.advance();
        }
    }

    /// The current cursor offset.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "source buffers beyond u32::MAX code points are not supported"
    )]
    fn current_position(&self) -> u32 {
        self.position as u32
    }

    /// A span from `start` to the cursor.
    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.current_position())
    }

    /// A span covering the single code point at the cursor.
    fn here(&self) -> Span {
        let at = self.current_position();
        if self.position < self.source.len() {
            Span::new(at, at + 1)
        } else {
            Span::new(at, at)
        }
    }

    /// Records a scanner diagnostic.
    fn error(&mut self, message: impl Into<EcoString>, span: Span) {
        self.diagnostics.push(Diagnostic::lexer(message, span));
    }

    /// Records a scanner diagnostic carrying a fix suggestion.
    fn error_with_hint(
        &mut self,
        message: impl Into<EcoString>,
        hint: impl Into<EcoString>,
        span: Span,
    ) {
        self.diagnostics
            .push(Diagnostic::lexer(message, span).with_hint(hint));
    }

    /// The source text between `start` and the cursor.
    fn text_from(&self, start: u32) -> String {
        self.source[start as usize..self.position].iter().collect()
    }

    /// Skips inter-token whitespace, excluding `\n`.
    fn skip_spaces(&mut self) {
        self.advance_while(|c| c.is_whitespace() && c != '\n');
    }

    /// Produces the next token, advancing the cursor past it.
    ///
    /// Guaranteed to make forward progress: an unrecognized code point is
    /// consumed with a diagnostic and scanning resumes at the next one.
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_spaces();
            let start = self.current_position();

            let Some(c) = self.peek_char() else {
                return Token::new(TokenKind::Eof, Span::new(start, start));
            };

            let kind = if c == '\n' {
                self.advance();
                TokenKind::Newline
            } else if c == '#' {
                self.lex_comment()
            } else if is_word_start(c) {
                // `b` or `B` glued to a quote is not an identifier: it
                // introduces a byte character or a byte buffer literal.
                if matches!(c, 'b' | 'B') && self.peek_char_n(1) == Some('\'') {
                    self.advance();
                    let value = self.lex_char(true, true);
                    TokenKind::Byte(value as u8)
                } else if matches!(c, 'b' | 'B') && self.peek_char_n(1) == Some('"') {
                    self.advance();
                    let string = self.lex_string(true);
                    TokenKind::Buffer(string.chars().map(|c| c as u8).collect())
                } else {
                    self.lex_word()
                }
            } else if c.is_ascii_digit() {
                self.lex_number()
            } else if c == '\'' {
                TokenKind::Char(self.lex_char(true, false))
            } else if c == '"' {
                TokenKind::String(self.lex_string(false).into())
            } else {
                match self.lex_symbol() {
                    Some(kind) => kind,
                    // Unknown code point: diagnostic pushed, cursor moved;
                    // try again from the next one.
                    None => continue,
                }
            };

            return Token::new(kind, self.span_from(start));
        }
    }

    /// Lexes a `#` comment through its terminating newline.
    fn lex_comment(&mut self) -> TokenKind {
        self.advance(); // #
        self.advance_while(|c| c != '\n');
        if self.peek_char() == Some('\n') {
            self.advance();
        }
        TokenKind::Comment
    }

    /// Lexes a word and resolves it against the keyword and
    /// logical-operator tables.
    fn lex_word(&mut self) -> TokenKind {
        let start = self.current_position();
        self.advance_while(is_word_continue);
        let word = self.text_from(start);

        if let Some(operator) = Operator::from_word(&word) {
            TokenKind::Operator(operator)
        } else if let Some(keyword) = Keyword::from_word(&word) {
            TokenKind::Keyword(keyword)
        } else {
            TokenKind::Identifier(word.into())
        }
    }

    /// Parses digits in `base` into a 64-bit accumulator.
    ///
    /// Stops at the first out-of-base code point or after `max_length`
    /// digits. The flag reports wrap-around (the accumulator failed to
    /// stay monotonically non-decreasing).
    fn lex_int(&mut self, base: u8, max_length: usize) -> (u64, bool) {
        let mut result: u64 = 0;
        let mut overflowed = false;
        let mut remaining = max_length;

        while remaining > 0 {
            let Some(c) = self.peek_char() else { break };
            let digit = digit_of(c);
            if digit >= base {
                break;
            }

            let previous = result;
            result = result
                .wrapping_mul(u64::from(base))
                .wrapping_add(u64::from(digit));
            if result < previous {
                overflowed = true;
            }

            self.advance();
            remaining -= 1;
        }

        (result, overflowed)
    }

    /// Parses a floating-point number in `base`, including the optional
    /// fractional part and `e`/`p` decimal or binary exponent.
    fn lex_float(&mut self, base: u8) -> f64 {
        let mut result = 0.0_f64;

        // Digit accumulation is redone in floating point rather than
        // reusing `lex_int`, so a long integral part loses precision
        // instead of wrapping.
        while self.peek_char().is_some_and(|c| digit_of(c) < base) {
            result *= f64::from(base);
            result += f64::from(digit_of(self.advance().unwrap_or('0')));
        }

        // Fractional digits contribute base^-k each.
        if self.peek_char() == Some('.') {
            self.advance();
            let mut exponent = 1.0 / f64::from(base);

            while self.peek_char().is_some_and(|c| digit_of(c) < base) {
                result += f64::from(digit_of(self.advance().unwrap_or('0'))) * exponent;
                exponent /= f64::from(base);
            }
        }

        // `e±N` multiplies by 10^±N; `p±N` multiplies by 2^±N.
        let exponent_base = match self.peek_char() {
            Some('e' | 'E') => 10.0_f64,
            Some('p' | 'P') => 2.0_f64,
            _ => return result,
        };
        self.advance();

        let negative = match self.peek_char() {
            Some('-') => {
                self.advance();
                true
            }
            Some('+') => {
                self.advance();
                false
            }
            _ => false,
        };

        let (exponent, overflowed) = self.lex_int(10, usize::MAX);
        if overflowed || exponent > i32::MAX as u64 {
            // Exponent overflow saturates.
            return if negative { 0.0 } else { f64::INFINITY };
        }

        #[expect(
            clippy::cast_possible_truncation,
            reason = "exponent was range-checked above"
        )]
        let exponent = if negative {
            -(exponent as i32)
        } else {
            exponent as i32
        };
        result * exponent_base.powi(exponent)
    }

    /// Lexes a numeric literal: base prefix, digits, and suffix.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap,
        reason = "suffix semantics are a plain machine-width cast"
    )]
    fn lex_number(&mut self) -> TokenKind {
        let mut base: u8 = 10;
        if self.peek_char() == Some('0') {
            match self.peek_char_n(1) {
                Some('b' | 'B') => {
                    base = 2;
                    self.position += 2;
                }
                Some('o' | 'O') => {
                    base = 8;
                    self.position += 2;
                }
                Some('x' | 'X') => {
                    base = 16;
                    self.position += 2;
                }
                _ => {}
            }
        }

        let origin = self.position;
        let (integer, overflowed) = self.lex_int(base, usize::MAX);

        // No digits in the chosen base (e.g. `0x` glued to nothing).
        if self.position == origin {
            let message = match base {
                2 => "expecting a binary number, either 0 or 1",
                8 => "expecting an octal number, from 0 to 7",
                16 => "expecting a hexadecimal number, from 0 to 9 or A to F",
                _ => "expecting a decimal number, from 0 to 9",
            };
            let span = self.here();
            self.error(message, span);
            return TokenKind::Int(0);
        }

        // A fraction, an exponent, or a 64-bit overflow re-lexes the
        // digits as floating-point. In base 16 `e` is a digit, so only
        // `.`/`p` can trigger the float path there.
        if matches!(self.peek_char(), Some('.' | 'e' | 'E' | 'p' | 'P')) || overflowed {
            self.position = origin;
            let floating = self.lex_float(base);

            return match self.peek_char() {
                Some('f' | 'F') => {
                    self.advance();
                    TokenKind::Float(floating as f32)
                }
                Some('d' | 'D') => {
                    self.advance();
                    TokenKind::Double(floating)
                }
                Some('i' | 'I') => {
                    self.advance();
                    match self.peek_char() {
                        Some('f' | 'F') => {
                            self.advance();
                            TokenKind::IFloat(floating as f32)
                        }
                        Some('d' | 'D') => {
                            self.advance();
                            TokenKind::IDouble(floating)
                        }
                        _ => TokenKind::IDouble(floating),
                    }
                }
                _ => TokenKind::Double(floating),
            };
        }

        // Integer suffix disambiguation.
        match self.peek_char() {
            Some('b' | 'B') => {
                self.advance();
                TokenKind::Byte(integer as u8)
            }
            Some('s' | 'S') => {
                self.advance();
                match self.peek_char() {
                    Some('b' | 'B') => {
                        self.advance();
                        TokenKind::SByte(integer as i8)
                    }
                    Some('s' | 'S') => {
                        self.advance();
                        TokenKind::Short(integer as i16)
                    }
                    Some('l' | 'L') => {
                        self.advance();
                        TokenKind::Long(integer as i64)
                    }
                    _ => TokenKind::Short(integer as i16),
                }
            }
            Some('l' | 'L') => {
                self.advance();
                TokenKind::Long(integer as i64)
            }
            Some('u' | 'U') => {
                self.advance();
                match self.peek_char() {
                    Some('b' | 'B') => {
                        self.advance();
                        TokenKind::Byte(integer as u8)
                    }
                    Some('s' | 'S') => {
                        self.advance();
                        TokenKind::UShort(integer as u16)
                    }
                    Some('l' | 'L') => {
                        self.advance();
                        TokenKind::ULong(integer)
                    }
                    _ => TokenKind::UInt(integer as u32),
                }
            }
            Some('f' | 'F') => {
                self.advance();
                TokenKind::Float(integer as f32)
            }
            Some('d' | 'D') => {
                self.advance();
                TokenKind::Double(integer as f64)
            }
            Some('i' | 'I') => {
                self.advance();
                match self.peek_char() {
                    Some('f' | 'F') => {
                        self.advance();
                        TokenKind::IFloat(integer as f32)
                    }
                    Some('d' | 'D') => {
                        self.advance();
                        TokenKind::IDouble(integer as f64)
                    }
                    _ => TokenKind::IDouble(integer as f64),
                }
            }
            _ => TokenKind::Int(integer as i32),
        }
    }

    /// Decodes one character, resolving backslash escapes.
    ///
    /// `with_quotes` demands surrounding single quotes (character
    /// literals); inside strings it is called quote-less per code point.
    /// Byte contexts (`b'…'`, `b"…"`) reject multi-byte escapes and any
    /// code point above 255.
    fn lex_char(&mut self, with_quotes: bool, is_byte: bool) -> char {
        let mut chr = '\0';

        if with_quotes {
            if self.peek_char() == Some('\'') {
                self.advance();
            } else {
                let span = self.here();
                self.error("expecting a single quote opening for a character", span);
            }
        }

        if self.peek_char() == Some('\\') {
            self.advance();

            match self.advance() {
                Some('0') => chr = '\0',
                Some('n') => chr = '\n',
                Some('r') => chr = '\r',
                Some('t') => chr = '\t',
                Some('v') => chr = '\u{0B}',
                Some('b') => chr = '\u{08}',
                Some('a') => chr = '\u{07}',
                Some('f') => chr = '\u{0C}',
                Some('\\') => chr = '\\',
                Some('\'') => chr = '\'',
                Some('"') => chr = '"',

                Some('x') => chr = self.lex_hex_escape(2),
                Some('u') => {
                    if is_byte {
                        let span = self.here();
                        self.error(
                            "only allowing one byte characters, 2 byte unicode escapes are not allowed",
                            span,
                        );
                        // Swallow the digits so scanning resumes cleanly
                        let _ = self.lex_int(16, 4);
                    } else {
                        chr = self.lex_hex_escape(4);
                    }
                }
                Some('U') => {
                    if is_byte {
                        let span = self.here();
                        self.error(
                            "only allowing one byte characters, 4 byte unicode escapes are not allowed",
                            span,
                        );
                        let _ = self.lex_int(16, 8);
                    } else {
                        chr = self.lex_hex_escape(8);
                    }
                }

                None => {
                    let span = self.here();
                    self.error(
                        "expecting a backslash escape character, met with a dead end",
                        span,
                    );
                    return chr;
                }
                Some(_) => {
                    self.position -= 1;
                    let span = self.here();
                    self.error("unknown backslash escape character", span);
                }
            }
        } else {
            match self.peek_char() {
                Some('\'') => {
                    if with_quotes {
                        let span = self.here();
                        self.error_with_hint(
                            "a character cannot be closed empty",
                            "did you mean '\\''",
                            span,
                        );
                    }
                }
                Some('\n') => {
                    let span = self.here();
                    self.error_with_hint(
                        "a newline instead of an inline character",
                        "did you mean '\\n'",
                        span,
                    );
                }
                None => {
                    let span = self.here();
                    self.error("expecting a character, met with a dead end", span);
                    return chr;
                }
                Some(c) => {
                    if is_byte && c as u32 > 255 {
                        let span = self.here();
                        self.error(
                            "only allowing one byte characters, unicode character is forbidden",
                            span,
                        );
                    } else {
                        chr = c;
                    }
                    self.advance();
                }
            }
        }

        if with_quotes {
            if self.peek_char() == Some('\'') {
                self.advance();
            } else {
                let span = self.here();
                self.error("expecting a single quote closing of the character", span);
            }
        }

        chr
    }

    /// Decodes `\xHH`-family escapes with a fixed digit count.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "at most 8 hex digits were consumed"
    )]
    fn lex_hex_escape(&mut self, digits: usize) -> char {
        let origin = self.position;
        let (value, _) = self.lex_int(16, digits);

        if self.position != origin + digits {
            let message = match digits {
                2 => "expecting 2 hexadecimal digits for 1 byte character, from 0 to 9 or A to F",
                4 => "expecting 4 hexadecimal digits for 2 byte unicode character, from 0 to 9 or A to F",
                _ => "expecting 8 hexadecimal digits for 4 byte unicode character, from 0 to 9 or A to F",
            };
            let span = self.here();
            self.error(message, span);
            return '\0';
        }

        // \xHH is always in range; the wider escapes can name invalid
        // scalar values (surrogates, out-of-range points).
        char::from_u32(value as u32).unwrap_or_else(|| {
            let span = self.span_from(origin as u32);
            self.error("escape does not name a valid code point", span);
            '\0'
        })
    }

    /// Lexes a string or buffer body after its introducer.
    ///
    /// `"…"` is single-line; `"""…"""` is multi-line. An unterminated
    /// literal yields the decoded prefix plus a diagnostic.
    fn lex_string(&mut self, is_buffer: bool) -> String {
        let mut string = String::new();
        let mut multiline = false;

        if self.peek_char() == Some('"') {
            self.advance();

            if self.peek_char() == Some('"') && self.peek_char_n(1) == Some('"') {
                self.position += 2;
                multiline = true;
            }
        } else {
            let span = self.here();
            self.error("expecting a double quote for a string", span);
        }

        loop {
            match self.peek_char() {
                Some('"') => {
                    if multiline {
                        if self.peek_char_n(1) == Some('"') && self.peek_char_n(2) == Some('"') {
                            self.position += 3;
                            return string;
                        }
                        self.advance();
                        string.push('"');
                    } else {
                        self.advance();
                        return string;
                    }
                }
                Some('\n') => {
                    if multiline {
                        self.advance();
                        string.push('\n');
                    } else {
                        // The literal ends here; the newline becomes the
                        // next token.
                        let span = self.here();
                        self.error_with_hint(
                            "a newline instead of an inline character",
                            "use '\\n' or a multiline string instead",
                            span,
                        );
                        return string;
                    }
                }
                None => {
                    let span = self.here();
                    self.error("expecting a character, met with a dead end", span);
                    return string;
                }
                Some(_) => {
                    string.push(self.lex_char(false, is_buffer));
                }
            }
        }
    }

    /// Lexes a symbol token with maximal munch.
    ///
    /// Returns `None` for an unrecognized code point, which has then been
    /// consumed and reported.
    fn lex_symbol(&mut self) -> Option<TokenKind> {
        use Delimiter::*;
        use Operator::*;

        let at = self.here();
        let c = self.advance()?;

        let kind = match c {
            ',' => TokenKind::Delimiter(Comma),
            ':' => TokenKind::Delimiter(Colon),
            ';' => TokenKind::Delimiter(Semicolon),
            '(' => TokenKind::Delimiter(ParenOpen),
            ')' => TokenKind::Delimiter(ParenClose),
            '{' => TokenKind::Delimiter(CurlyOpen),
            '}' => TokenKind::Delimiter(CurlyClose),
            '[' => TokenKind::Delimiter(SquareOpen),
            ']' => TokenKind::Delimiter(SquareClose),
            '@' => TokenKind::Delimiter(At),

            '.' => {
                if self.peek_char() == Some('.') && self.peek_char_n(1) == Some('.') {
                    self.position += 2;
                    TokenKind::Delimiter(Ellipsis)
                } else if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(IDot)
                } else {
                    TokenKind::Delimiter(Dot)
                }
            }

            '+' => match self.peek_char() {
                Some('+') => {
                    self.advance();
                    TokenKind::Operator(Increment)
                }
                Some('=') => {
                    self.advance();
                    TokenKind::Operator(IAdd)
                }
                _ => TokenKind::Operator(Add),
            },

            '-' => match self.peek_char() {
                Some('-') => {
                    self.advance();
                    TokenKind::Operator(Decrement)
                }
                Some('=') => {
                    self.advance();
                    TokenKind::Operator(ISub)
                }
                Some('>') => {
                    self.advance();
                    TokenKind::Delimiter(Arrow)
                }
                _ => TokenKind::Operator(Sub),
            },

            '*' => match self.peek_char() {
                Some('=') => {
                    self.advance();
                    TokenKind::Operator(IMul)
                }
                // `**` is an alternate spelling of the power operator
                Some('*') => {
                    self.advance();
                    TokenKind::Operator(Pow)
                }
                _ => TokenKind::Operator(Mul),
            },

            '/' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(IDiv)
                } else {
                    TokenKind::Operator(Div)
                }
            }

            '%' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(IMod)
                } else {
                    TokenKind::Operator(Mod)
                }
            }

            '^' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(IPow)
                } else {
                    TokenKind::Operator(Pow)
                }
            }

            '=' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(Equal)
                } else {
                    TokenKind::Operator(Assign)
                }
            }

            '!' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(NotEqual)
                } else {
                    TokenKind::Delimiter(Exclamation)
                }
            }

            '<' => match self.peek_char() {
                Some('=') => {
                    self.advance();
                    TokenKind::Operator(LessEqual)
                }
                Some('<') => {
                    self.advance();
                    if self.peek_char() == Some('=') {
                        self.advance();
                        TokenKind::Operator(IBitLShift)
                    } else {
                        TokenKind::Operator(BitLShift)
                    }
                }
                _ => TokenKind::Operator(Less),
            },

            '>' => match self.peek_char() {
                Some('=') => {
                    self.advance();
                    TokenKind::Operator(MoreEqual)
                }
                Some('>') => {
                    self.advance();
                    if self.peek_char() == Some('=') {
                        self.advance();
                        TokenKind::Operator(IBitRShift)
                    } else {
                        TokenKind::Operator(BitRShift)
                    }
                }
                _ => TokenKind::Operator(More),
            },

            '~' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(IBitXor)
                } else {
                    TokenKind::Operator(BitXor)
                }
            }

            '&' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(IBitAnd)
                } else {
                    TokenKind::Operator(BitAnd)
                }
            }

            '|' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(IBitOr)
                } else {
                    TokenKind::Operator(BitOr)
                }
            }

            '_' => {
                self.error_with_hint(
                    "unknown character",
                    "identifiers may only contain letters and digits",
                    at,
                );
                return None;
            }

            _ => {
                self.error("unknown character", at);
                return None;
            }
        };

        Some(kind)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind().is_eof() {
            None
        } else {
            Some(token)
        }
    }
}

/// Lexes source text into tokens (excluding EOF) plus scanner diagnostics.
#[must_use]
pub fn lex(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let buffer: Vec<char> = source.chars().collect();
    let mut lexer = Lexer::new(&buffer);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        if token.kind().is_eof() {
            break;
        }
        tokens.push(token);
    }
    (tokens, lexer.into_diagnostics())
}

/// Lexes source text into tokens including the trailing EOF token.
#[must_use]
pub fn lex_with_eof(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let buffer: Vec<char> = source.chars().collect();
    let mut lexer = Lexer::new(&buffer);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let is_eof = token.kind().is_eof();
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    (tokens, lexer.into_diagnostics())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lexes and keeps just the kinds; asserts no diagnostics.
    fn lex_kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, diagnostics) = lex(source);
        assert!(
            diagnostics.is_empty(),
            "expected a clean lex of {source:?}, got: {diagnostics:?}"
        );
        tokens.into_iter().map(Token::into_kind).collect()
    }

    /// Lexes expecting at least one diagnostic.
    fn lex_err(source: &str) -> (Vec<TokenKind>, Vec<Diagnostic>) {
        let (tokens, diagnostics) = lex(source);
        assert!(
            !diagnostics.is_empty(),
            "expected diagnostics lexing {source:?}"
        );
        (
            tokens.into_iter().map(Token::into_kind).collect(),
            diagnostics,
        )
    }

    #[test]
    fn lex_empty() {
        assert!(lex_kinds("").is_empty());
        assert!(lex_kinds("   \t ").is_empty());
    }

    #[test]
    fn lex_newline_and_comment() {
        assert_eq!(lex_kinds("\n"), vec![TokenKind::Newline]);
        assert_eq!(lex_kinds("# note"), vec![TokenKind::Comment]);
        // The comment swallows its own newline
        assert_eq!(
            lex_kinds("x # note\ny"),
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::Comment,
                TokenKind::Identifier("y".into()),
            ]
        );
    }

    #[test]
    fn lex_identifiers() {
        assert_eq!(
            lex_kinds("foo Bar x1 aB2c"),
            vec![
                TokenKind::Identifier("foo".into()),
                TokenKind::Identifier("Bar".into()),
                TokenKind::Identifier("x1".into()),
                TokenKind::Identifier("aB2c".into()),
            ]
        );
    }

    #[test]
    fn lex_underscore_is_not_a_word_character() {
        // Identifiers are runs of alphanumerics; `_` is an unknown
        // character consumed on its own
        let (kinds, diagnostics) = lex_err("my_var");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier("my".into()),
                TokenKind::Identifier("var".into()),
            ]
        );
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("unknown character"));
        assert!(
            diagnostics[0]
                .hint
                .as_deref()
                .is_some_and(|hint| hint.contains("letters and digits"))
        );

        let (kinds, diagnostics) = lex_err("_hidden");
        assert_eq!(kinds, vec![TokenKind::Identifier("hidden".into())]);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn lex_unicode_identifier() {
        assert_eq!(
            lex_kinds("变量"),
            vec![TokenKind::Identifier("变量".into())]
        );
    }

    #[test]
    fn lex_keywords_and_word_operators() {
        assert_eq!(
            lex_kinds("def incase wild in"),
            vec![
                TokenKind::Keyword(Keyword::Def),
                TokenKind::Keyword(Keyword::Incase),
                TokenKind::Keyword(Keyword::Wild),
                TokenKind::Keyword(Keyword::In),
            ]
        );
        assert_eq!(
            lex_kinds("and or xor not"),
            vec![
                TokenKind::Operator(Operator::And),
                TokenKind::Operator(Operator::Or),
                TokenKind::Operator(Operator::Xor),
                TokenKind::Operator(Operator::Not),
            ]
        );
        // Prefixes of keywords stay identifiers
        assert_eq!(
            lex_kinds("define android"),
            vec![
                TokenKind::Identifier("define".into()),
                TokenKind::Identifier("android".into()),
            ]
        );
    }

    #[test]
    fn lex_integers_and_bases() {
        assert_eq!(
            lex_kinds("42 0 0b1010 0o17 0xFF 0Xff"),
            vec![
                TokenKind::Int(42),
                TokenKind::Int(0),
                TokenKind::Int(10),
                TokenKind::Int(15),
                TokenKind::Int(255),
                TokenKind::Int(255),
            ]
        );
    }

    #[test]
    fn lex_integer_suffixes() {
        assert_eq!(
            lex_kinds("1b 2sb 3s 4ss 5us 6u 7l 8sl 9ul"),
            vec![
                TokenKind::Byte(1),
                TokenKind::SByte(2),
                TokenKind::Short(3),
                TokenKind::Short(4),
                TokenKind::UShort(5),
                TokenKind::UInt(6),
                TokenKind::Long(7),
                TokenKind::Long(8),
                TokenKind::ULong(9),
            ]
        );
        assert_eq!(
            lex_kinds("2ub"),
            vec![TokenKind::Byte(2)],
            "ub is the unsigned-byte spelling of byte"
        );
    }

    #[test]
    fn lex_float_suffixes_on_integers() {
        assert_eq!(
            lex_kinds("4f 4d 5if 5id 5i"),
            vec![
                TokenKind::Float(4.0),
                TokenKind::Double(4.0),
                TokenKind::IFloat(5.0),
                TokenKind::IDouble(5.0),
                TokenKind::IDouble(5.0),
            ]
        );
    }

    #[test]
    fn lex_floats() {
        assert_eq!(
            lex_kinds("3.25 0.5 1e3 2e-2 1p3 2.5e3"),
            vec![
                TokenKind::Double(3.25),
                TokenKind::Double(0.5),
                TokenKind::Double(1000.0),
                TokenKind::Double(0.02),
                TokenKind::Double(8.0),
                TokenKind::Double(2500.0),
            ]
        );
        assert_eq!(
            lex_kinds("3.5f 3.5d 3.5if 3.5id 3.5i"),
            vec![
                TokenKind::Float(3.5),
                TokenKind::Double(3.5),
                TokenKind::IFloat(3.5),
                TokenKind::IDouble(3.5),
                TokenKind::IDouble(3.5),
            ]
        );
    }

    #[test]
    fn lex_hex_float_with_binary_exponent() {
        // 0x1.8 = 1.5, p3 scales by 2^3
        assert_eq!(lex_kinds("0x1.8p3"), vec![TokenKind::Double(12.0)]);
    }

    #[test]
    fn lex_integer_overflow_becomes_double() {
        // 2^64 does not fit in the accumulator, so the digits re-lex as
        // floating-point
        let kinds = lex_kinds("18446744073709551616");
        assert_eq!(kinds.len(), 1);
        match kinds[0] {
            TokenKind::Double(v) => assert!((v - 18_446_744_073_709_551_616.0).abs() < 1e4),
            ref other => panic!("expected a double, got {other:?}"),
        }
        // u64::MAX itself still fits
        assert_eq!(
            lex_kinds("18446744073709551615ul"),
            vec![TokenKind::ULong(u64::MAX)]
        );
    }

    #[test]
    fn lex_exponent_overflow_saturates() {
        let kinds = lex_kinds("1e99999999999999999999");
        assert_eq!(kinds, vec![TokenKind::Double(f64::INFINITY)]);
        let kinds = lex_kinds("1e-99999999999999999999");
        assert_eq!(kinds, vec![TokenKind::Double(0.0)]);
    }

    #[test]
    fn lex_empty_base_prefix_is_an_error() {
        let (kinds, diagnostics) = lex_err("0x");
        assert_eq!(kinds, vec![TokenKind::Int(0)]);
        assert!(diagnostics[0].message.contains("hexadecimal"));
    }

    #[test]
    fn lex_characters() {
        assert_eq!(
            lex_kinds(r"'a' '\n' '\t' '\\' '\'' '\x41' 'é' '\U0001F600'"),
            vec![
                TokenKind::Char('a'),
                TokenKind::Char('\n'),
                TokenKind::Char('\t'),
                TokenKind::Char('\\'),
                TokenKind::Char('\''),
                TokenKind::Char('A'),
                TokenKind::Char('é'),
                TokenKind::Char('😀'),
            ]
        );
    }

    #[test]
    fn lex_byte_characters() {
        assert_eq!(
            lex_kinds(r"b'a' b'\xFF' B'z'"),
            vec![
                TokenKind::Byte(b'a'),
                TokenKind::Byte(0xFF),
                TokenKind::Byte(b'z'),
            ]
        );
    }

    #[test]
    fn lex_byte_context_rejects_unicode_escapes() {
        let (kinds, diagnostics) = lex_err(r"b'\u0041'");
        assert_eq!(kinds, vec![TokenKind::Byte(0)]);
        assert!(diagnostics[0].message.contains("unicode escapes are not allowed"));

        let (kinds, diagnostics) = lex_err("b'é'");
        assert_eq!(kinds, vec![TokenKind::Byte(0)]);
        assert!(diagnostics[0].message.contains("unicode character"));
    }

    #[test]
    fn lex_strings() {
        assert_eq!(
            lex_kinds(r#""hello" "" "a\nb" "\x41é""#),
            vec![
                TokenKind::String("hello".into()),
                TokenKind::String("".into()),
                TokenKind::String("a\nb".into()),
                TokenKind::String("Aé".into()),
            ]
        );
    }

    #[test]
    fn lex_buffers() {
        assert_eq!(
            lex_kinds(r#"b"1234" B"ab\xFF""#),
            vec![
                TokenKind::Buffer(vec![b'1', b'2', b'3', b'4']),
                TokenKind::Buffer(vec![b'a', b'b', 0xFF]),
            ]
        );
    }

    #[test]
    fn lex_multiline_strings() {
        assert_eq!(
            lex_kinds("\"\"\"line1\nline2\"\"\""),
            vec![TokenKind::String("line1\nline2".into())]
        );
        // A lone quote inside a multiline string is literal
        assert_eq!(
            lex_kinds("\"\"\"a\"b\"\"\""),
            vec![TokenKind::String("a\"b".into())]
        );
        // Empty multiline string
        assert_eq!(
            lex_kinds("\"\"\"\"\"\""),
            vec![TokenKind::String("".into())]
        );
    }

    #[test]
    fn lex_unterminated_string_recovers_prefix() {
        let (kinds, diagnostics) = lex_err("\"abc");
        assert_eq!(kinds, vec![TokenKind::String("abc".into())]);
        assert!(diagnostics[0].message.contains("dead end"));

        let (kinds, _) = lex_err("\"\"\"partial");
        assert_eq!(kinds, vec![TokenKind::String("partial".into())]);
    }

    #[test]
    fn lex_newline_in_single_line_string() {
        let (kinds, diagnostics) = lex_err("\"ab\ncd\"");
        // The literal ends at the newline; `cd` lexes as an identifier and
        // the trailing quote starts an unterminated string
        assert_eq!(kinds[0], TokenKind::String("ab".into()));
        assert_eq!(kinds[1], TokenKind::Newline);
        assert_eq!(kinds[2], TokenKind::Identifier("cd".into()));
        assert!(diagnostics[0].message.contains("newline"));
    }

    #[test]
    fn lex_delimiters() {
        assert_eq!(
            lex_kinds(", : ; . ... ( ) { } [ ] ! -> @"),
            vec![
                TokenKind::Delimiter(Delimiter::Comma),
                TokenKind::Delimiter(Delimiter::Colon),
                TokenKind::Delimiter(Delimiter::Semicolon),
                TokenKind::Delimiter(Delimiter::Dot),
                TokenKind::Delimiter(Delimiter::Ellipsis),
                TokenKind::Delimiter(Delimiter::ParenOpen),
                TokenKind::Delimiter(Delimiter::ParenClose),
                TokenKind::Delimiter(Delimiter::CurlyOpen),
                TokenKind::Delimiter(Delimiter::CurlyClose),
                TokenKind::Delimiter(Delimiter::SquareOpen),
                TokenKind::Delimiter(Delimiter::SquareClose),
                TokenKind::Delimiter(Delimiter::Exclamation),
                TokenKind::Delimiter(Delimiter::Arrow),
                TokenKind::Delimiter(Delimiter::At),
            ]
        );
    }

    #[test]
    fn lex_operators_maximal_munch() {
        assert_eq!(
            lex_kinds("+ ++ += - -- -= * ** *= / /= % %= ^ ^="),
            vec![
                TokenKind::Operator(Operator::Add),
                TokenKind::Operator(Operator::Increment),
                TokenKind::Operator(Operator::IAdd),
                TokenKind::Operator(Operator::Sub),
                TokenKind::Operator(Operator::Decrement),
                TokenKind::Operator(Operator::ISub),
                TokenKind::Operator(Operator::Mul),
                TokenKind::Operator(Operator::Pow),
                TokenKind::Operator(Operator::IMul),
                TokenKind::Operator(Operator::Div),
                TokenKind::Operator(Operator::IDiv),
                TokenKind::Operator(Operator::Mod),
                TokenKind::Operator(Operator::IMod),
                TokenKind::Operator(Operator::Pow),
                TokenKind::Operator(Operator::IPow),
            ]
        );
        assert_eq!(
            lex_kinds("= == != < <= << <<= > >= >> >>= ~ ~= & &= | |= .="),
            vec![
                TokenKind::Operator(Operator::Assign),
                TokenKind::Operator(Operator::Equal),
                TokenKind::Operator(Operator::NotEqual),
                TokenKind::Operator(Operator::Less),
                TokenKind::Operator(Operator::LessEqual),
                TokenKind::Operator(Operator::BitLShift),
                TokenKind::Operator(Operator::IBitLShift),
                TokenKind::Operator(Operator::More),
                TokenKind::Operator(Operator::MoreEqual),
                TokenKind::Operator(Operator::BitRShift),
                TokenKind::Operator(Operator::IBitRShift),
                TokenKind::Operator(Operator::BitXor),
                TokenKind::Operator(Operator::IBitXor),
                TokenKind::Operator(Operator::BitAnd),
                TokenKind::Operator(Operator::IBitAnd),
                TokenKind::Operator(Operator::BitOr),
                TokenKind::Operator(Operator::IBitOr),
                TokenKind::Operator(Operator::IDot),
            ]
        );
    }

    #[test]
    fn lex_glued_operators() {
        // `<<=` is one token, not `<<` `=`
        assert_eq!(
            lex_kinds("a<<=b"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::Operator(Operator::IBitLShift),
                TokenKind::Identifier("b".into()),
            ]
        );
        // `..` is a dot then a dot, not a partial ellipsis
        assert_eq!(
            lex_kinds(".."),
            vec![
                TokenKind::Delimiter(Delimiter::Dot),
                TokenKind::Delimiter(Delimiter::Dot),
            ]
        );
    }

    #[test]
    fn lex_unknown_character_recovers() {
        let (kinds, diagnostics) = lex_err("x ? y");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::Identifier("y".into()),
            ]
        );
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("unknown character"));
    }

    #[test]
    fn lex_spans_count_code_points() {
        let (tokens, _) = lex("é x");
        assert_eq!(tokens[0].span(), Span::new(0, 1));
        assert_eq!(tokens[1].span(), Span::new(2, 3));
    }

    #[test]
    fn lex_full_coverage_reaches_eof() {
        let (tokens, diagnostics) = lex_with_eof("def main() { return 0 }");
        assert!(diagnostics.is_empty());
        assert!(tokens.last().is_some_and(|t| t.kind().is_eof()));
    }

    #[test]
    fn literal_reprs_relex_to_equal_tokens() {
        let literals = vec![
            TokenKind::Byte(200),
            TokenKind::SByte(-5),
            TokenKind::Short(-300),
            TokenKind::UShort(40_000),
            TokenKind::Int(-123_456),
            TokenKind::UInt(3_000_000_000),
            TokenKind::Long(-1_234_567_890_123),
            TokenKind::ULong(u64::MAX),
            TokenKind::Float(1.5),
            TokenKind::Double(2.25),
            TokenKind::IFloat(0.5),
            TokenKind::IDouble(9.75),
            TokenKind::Char('ß'),
            TokenKind::String("say \"hi\"\n".into()),
            TokenKind::Buffer(vec![0, b'a', 255]),
        ];

        for literal in literals {
            let printed = literal.to_string();
            // Negative literals print a leading unary minus; the sign is
            // not part of the numeric token.
            let (printed, negated) = match printed.strip_prefix('-') {
                Some(rest) => (rest.to_string(), true),
                None => (printed, false),
            };
            let (kinds, diagnostics) = lex(&printed);
            assert!(
                diagnostics.is_empty(),
                "repr {printed:?} did not relex cleanly: {diagnostics:?}"
            );
            assert_eq!(kinds.len(), 1, "repr {printed:?} is not one token");
            if negated {
                match (&literal, kinds[0].kind()) {
                    (TokenKind::SByte(v), TokenKind::SByte(r)) => assert_eq!(*r, -v),
                    (TokenKind::Short(v), TokenKind::Short(r)) => assert_eq!(*r, -v),
                    (TokenKind::Int(v), TokenKind::Int(r)) => assert_eq!(*r, -v),
                    (TokenKind::Long(v), TokenKind::Long(r)) => assert_eq!(*r, -v),
                    (v, r) => panic!("negated {v:?} relexed as {r:?}"),
                }
            } else {
                assert_eq!(kinds[0].kind(), &literal);
            }
        }
    }
}
