// Copyright 2026 Kithare Organization
// SPDX-License-Identifier: MIT

//! Recursive descent parser for Kithare source code.
//!
//! The parser consumes the scanner's token stream and builds an AST. It
//! follows a strict recovery doctrine:
//!
//! - **Error recovery is mandatory** — the parser always produces a tree
//! - **Multiple errors** — all diagnostics are reported, not just the first
//! - **Progress** — every error path consumes at least one token, so no
//!   finite input can loop forever
//! - **Locality** — a failed statement does not corrupt the ones after it
//!
//! Statement dispatch peeks one token (skipping newlines and comments):
//! declaration and control-flow keywords route to their sub-parsers,
//! `incase`/`static` run a tentative specifier scan and re-dispatch, and
//! everything else parses as an expression statement, which must end in a
//! newline, `;`, end of file, or the `}` of the enclosing block. A `#`
//! comment swallows its newline, so it terminates a statement too.
//!
//! Expression parsing lives in [`expressions`]; declaration bodies in
//! [`declarations`]. Both are `impl Parser` extensions of the state
//! defined here.
//!
//! # Usage
//!
//! ```
//! use kithare_core::source_analysis::parse;
//!
//! let (statements, diagnostics) = parse("x: int = 3 + 4");
//! assert!(diagnostics.is_empty());
//! assert_eq!(statements.len(), 1);
//! ```

use ecow::EcoString;

use crate::ast::{
    DoWhileLoop, Expression, ForEachLoop, ForLoop, IfBranch, Return, Statement, WhileLoop,
};
use crate::source_analysis::{
    Delimiter, Diagnostic, Keyword, Span, Token, TokenKind, lex_with_eof,
};

mod declarations;
mod expressions;


pub(super) use expressions::ExprCtx;

/// Parses a source buffer into a statement sequence.
///
/// This is the front-end's only required entry point. It always returns a
/// best-effort tree; a non-empty diagnostic list means the parse had
/// errors.
///
/// # Examples
///
/// ```
/// use kithare_core::source_analysis::parse;
///
/// let (statements, diagnostics) = parse("import a.b.c as z");
/// assert!(diagnostics.is_empty());
/// assert_eq!(statements.len(), 1);
/// ```
#[must_use]
pub fn parse(source: &str) -> (Vec<Statement>, Vec<Diagnostic>) {
    let (tokens, diagnostics) = lex_with_eof(source);
    let mut parser = Parser::new(tokens, diagnostics);
    let statements = parser.parse_statements();
    (statements, parser.diagnostics)
}

/// Parses a single expression; exposed for test harnesses.
///
/// `ignore_newline` lets the expression continue across newlines;
/// `filter_type` restricts the grammar to expressions that can denote a
/// type.
#[must_use]
pub fn parse_expression(
    source: &str,
    ignore_newline: bool,
    filter_type: bool,
) -> (Expression, Vec<Diagnostic>) {
    let (tokens, diagnostics) = lex_with_eof(source);
    let mut parser = Parser::new(tokens, diagnostics);
    let expression = parser.parse_expression(ExprCtx {
        ignore_newline,
        filter_type,
    });
    (expression, parser.diagnostics)
}

/// The parser state: a pre-lexed token stream, a cursor index, and the
/// diagnostic sink (seeded with the scanner's diagnostics).
pub(super) struct Parser {
    /// The token stream, always ending in `Eof`.
    pub(super) tokens: Vec<Token>,
    /// Raw index of the cursor; never moves past the `Eof` token.
    pub(super) current: usize,
    /// Accumulated diagnostics, scanner's first.
    pub(super) diagnostics: Vec<Diagnostic>,
    /// Expression nesting depth, bounded by `MAX_NESTING_DEPTH`.
    pub(super) nesting_depth: usize,
}

impl Parser {
    /// Creates a parser over a token stream, seeding the sink with the
    /// scanner's diagnostics.
    pub(super) fn new(tokens: Vec<Token>, diagnostics: Vec<Diagnostic>) -> Self {
        debug_assert!(
            tokens.last().is_some_and(|token| token.kind().is_eof()),
            "token stream must end with EOF"
        );
        Self {
            tokens,
            current: 0,
            diagnostics,
            nesting_depth: 0,
        }
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Index of the EOF token.
    fn eof_index(&self) -> usize {
        self.tokens.len() - 1
    }

    /// First significant token index at or after `from`.
    ///
    /// Comments are never significant; newlines are skipped only when
    /// `ignore_newline` is set.
    fn significant_from(&self, from: usize, ignore_newline: bool) -> usize {
        let mut index = from.min(self.eof_index());
        loop {
            match self.tokens[index].kind() {
                TokenKind::Comment => index += 1,
                TokenKind::Newline if ignore_newline => index += 1,
                _ => return index,
            }
            if index >= self.eof_index() {
                return self.eof_index();
            }
        }
    }

    /// Index of the current significant token.
    fn peek_index(&self, ignore_newline: bool) -> usize {
        self.significant_from(self.current, ignore_newline)
    }

    /// The current significant token.
    pub(super) fn current_token(&self, ignore_newline: bool) -> &Token {
        &self.tokens[self.peek_index(ignore_newline)]
    }

    /// The significant token after the current one.
    pub(super) fn second_token(&self, ignore_newline: bool) -> &Token {
        let first = self.peek_index(ignore_newline);
        &self.tokens[self.significant_from(first + 1, ignore_newline)]
    }

    /// Consumes the current significant token.
    ///
    /// A no-op at EOF, so callers can skip unconditionally on error paths
    /// without running off the stream.
    pub(super) fn skip_token(&mut self, ignore_newline: bool) {
        let index = self.peek_index(ignore_newline);
        self.current = if index < self.eof_index() {
            index + 1
        } else {
            index
        };
    }

    /// Returns `true` once only EOF remains (ignoring newlines and
    /// comments).
    pub(super) fn is_at_end(&self) -> bool {
        self.current_token(true).kind().is_eof()
    }

    /// End offset of the last consumed token; tracks where the construct
    /// being built currently ends.
    pub(super) fn previous_end(&self) -> u32 {
        if self.current == 0 {
            0
        } else {
            self.tokens[self.current - 1].span().end()
        }
    }

    /// A span from `start` to the last consumed token.
    pub(super) fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.previous_end().max(start))
    }

    // ========================================================================
    // Error Handling & Recovery
    // ========================================================================

    /// Records a parser diagnostic.
    pub(super) fn error(&mut self, message: impl Into<EcoString>, span: Span) {
        self.diagnostics.push(Diagnostic::parser(message, span));
    }

    /// Records a parser diagnostic carrying a fix suggestion.
    pub(super) fn error_with_hint(
        &mut self,
        message: impl Into<EcoString>,
        hint: impl Into<EcoString>,
        span: Span,
    ) {
        self.diagnostics
            .push(Diagnostic::parser(message, span).with_hint(hint));
    }

    /// Requires a statement terminator: newline, semicolon, EOF, or a
    /// comment (which contains its newline). A closing `}` is left for
    /// the enclosing block. Anything else is reported and skipped so the
    /// parser cannot stall.
    pub(super) fn expect_terminator(&mut self) {
        let index = self.current.min(self.eof_index());
        let kind = self.tokens[index].kind().clone();
        let span = self.tokens[index].span();

        match kind {
            TokenKind::Comment => self.current = (index + 1).min(self.eof_index()),
            kind if kind.ends_statement() => self.skip_token(false),
            kind if kind.is_delimiter(Delimiter::CurlyClose) => {}
            _ => {
                self.skip_token(false);
                self.error("expecting a newline or a semicolon", span);
            }
        }
    }

    // ========================================================================
    // Statement Parsing
    // ========================================================================

    /// Parses statements until EOF.
    pub(super) fn parse_statements(&mut self) -> Vec<Statement> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.parse_statement());
        }
        statements
    }

    /// Parses one statement, dispatching on the leading token.
    pub(super) fn parse_statement(&mut self) -> Statement {
        // Commit the skip over leading newlines and comments, so
        // sub-parsers that stop at newlines start from the first real
        // token of the statement
        self.current = self.peek_index(true);
        let token = self.tokens[self.current].clone();
        let origin = token.span();

        if let TokenKind::Keyword(keyword) = token.kind() {
            match keyword {
                Keyword::Import => return Statement::Import(self.parse_import()),
                Keyword::Include => return Statement::Include(self.parse_include()),
                Keyword::Def => return Statement::Function(self.parse_function()),
                Keyword::Class => return Statement::Class(self.parse_class()),
                Keyword::Struct => return Statement::Struct(self.parse_struct()),
                Keyword::Enum => return Statement::Enum(self.parse_enum()),
                Keyword::Alias => return Statement::Alias(self.parse_alias()),

                Keyword::If => return Statement::If(self.parse_if_branch()),
                Keyword::While => return Statement::While(self.parse_while_loop()),
                Keyword::Do => return Statement::DoWhile(self.parse_do_while_loop()),
                Keyword::For => return self.parse_for_loop(),
                Keyword::Break => return self.parse_break(),
                Keyword::Continue => return self.parse_continue(),
                Keyword::Return => return Statement::Return(self.parse_return()),

                Keyword::As => {
                    self.error("unexpected keyword", origin);
                    self.skip_token(true);
                    return Statement::Invalid { span: origin };
                }
                Keyword::Elif => {
                    self.error("no following if statement to have an elif statement", origin);
                    self.skip_token(true);
                    return Statement::Invalid { span: origin };
                }
                Keyword::Else => {
                    self.error("no following if statement to have an else statement", origin);
                    self.skip_token(true);
                    return Statement::Invalid { span: origin };
                }

                // `incase`/`static` prefix: scan tentatively, look at what
                // follows, then rewind and let the right sub-parser
                // re-consume the specifiers.
                Keyword::Incase | Keyword::Static => {
                    let saved = self.current;
                    self.parse_specifiers(true, true, true);
                    let following = self.current_token(true).kind().clone();
                    self.current = saved;

                    match following {
                        TokenKind::Keyword(Keyword::Def) => {
                            return Statement::Function(self.parse_function());
                        }
                        TokenKind::Keyword(Keyword::Class) => {
                            return Statement::Class(self.parse_class());
                        }
                        TokenKind::Keyword(Keyword::Struct) => {
                            return Statement::Struct(self.parse_struct());
                        }
                        TokenKind::Keyword(Keyword::Alias) => {
                            return Statement::Alias(self.parse_alias());
                        }
                        // A variable declaration handles `static` itself
                        _ => {}
                    }
                }

                // `wild`/`ref` open a variable declaration
                Keyword::Wild | Keyword::Ref => {}

                // `try`, `public`, `private` have no statement grammar
                // here; the expression parser reports them
                _ => {}
            }
        } else if token.kind().is_eof() {
            self.error("expecting a statement, met with a dead end", origin);
            return Statement::Invalid { span: origin };
        }

        // Anything else is an expression statement
        let expression = self.parse_expression(ExprCtx {
            ignore_newline: false,
            filter_type: false,
        });
        self.expect_terminator();
        Statement::Expression(expression)
    }

    /// Parses a `{ … }` block of statements.
    ///
    /// EOF inside the block is reported and terminates it, so malformed
    /// input cannot trap the parser.
    pub(super) fn parse_block(&mut self) -> Vec<Statement> {
        let mut block = Vec::new();

        if self
            .current_token(true)
            .kind()
            .is_delimiter(Delimiter::CurlyOpen)
        {
            self.skip_token(true);
        } else {
            let span = self.current_token(true).span();
            self.error("expecting an opening curly bracket", span);
        }

        loop {
            let token = self.current_token(true);
            if token.kind().is_delimiter(Delimiter::CurlyClose) {
                self.skip_token(true);
                break;
            }
            if token.kind().is_eof() {
                let span = token.span();
                self.error("expecting a statement, met with a dead end", span);
                break;
            }
            block.push(self.parse_statement());
        }

        block
    }

    /// Consumes a run of `incase`/`static` specifiers.
    ///
    /// Each occurrence checks that the caller permits it; disallowed
    /// specifiers are reported but still consumed.
    pub(super) fn parse_specifiers(
        &mut self,
        allow_incase: bool,
        allow_static: bool,
        ignore_newline: bool,
    ) -> (bool, bool) {
        let mut is_incase = false;
        let mut is_static = false;

        loop {
            let token = self.current_token(ignore_newline);
            let span = token.span();
            match token.kind() {
                TokenKind::Keyword(Keyword::Incase) => {
                    if allow_incase {
                        is_incase = true;
                    } else {
                        self.error("the `incase` keyword is not allowed here", span);
                    }
                    self.skip_token(ignore_newline);
                }
                TokenKind::Keyword(Keyword::Static) => {
                    if allow_static {
                        is_static = true;
                    } else {
                        self.error("the `static` keyword is not allowed here", span);
                    }
                    self.skip_token(ignore_newline);
                }
                _ => break,
            }
        }

        (is_incase, is_static)
    }

    // ========================================================================
    // Control Flow Statements
    // ========================================================================

    /// Parses `if ⟨cond⟩ ⟨block⟩ (elif ⟨cond⟩ ⟨block⟩)* (else ⟨block⟩)?`.
    fn parse_if_branch(&mut self) -> IfBranch {
        let start = self.current_token(true).span().start();
        let mut branch_conditions = Vec::new();
        let mut branch_contents = Vec::new();

        if self.current_token(true).kind().is_keyword(Keyword::If) {
            self.skip_token(true);
        } else {
            let span = self.current_token(true).span();
            self.error("expecting an `if` keyword", span);
        }

        loop {
            branch_conditions.push(self.parse_expression(ExprCtx {
                ignore_newline: false,
                filter_type: false,
            }));
            branch_contents.push(self.parse_block());

            if self.current_token(true).kind().is_keyword(Keyword::Elif) {
                self.skip_token(true);
            } else {
                break;
            }
        }

        let mut else_content = Vec::new();
        if self.current_token(true).kind().is_keyword(Keyword::Else) {
            self.skip_token(true);
            else_content = self.parse_block();
        }

        IfBranch {
            branch_conditions,
            branch_contents,
            else_content,
            span: self.span_from(start),
        }
    }

    /// Parses `while ⟨cond⟩ ⟨block⟩`.
    fn parse_while_loop(&mut self) -> WhileLoop {
        let start = self.current_token(true).span().start();

        if self.current_token(true).kind().is_keyword(Keyword::While) {
            self.skip_token(true);
        } else {
            let span = self.current_token(true).span();
            self.error("expecting a `while` keyword", span);
        }

        let condition = self.parse_expression(ExprCtx {
            ignore_newline: false,
            filter_type: false,
        });
        let content = self.parse_block();

        WhileLoop {
            condition,
            content,
            span: self.span_from(start),
        }
    }

    /// Parses `do ⟨block⟩ while ⟨cond⟩` plus its terminator.
    fn parse_do_while_loop(&mut self) -> DoWhileLoop {
        let start = self.current_token(true).span().start();

        if self.current_token(true).kind().is_keyword(Keyword::Do) {
            self.skip_token(true);
        } else {
            let span = self.current_token(true).span();
            self.error("expecting a `do` keyword", span);
        }

        let content = self.parse_block();

        if self.current_token(true).kind().is_keyword(Keyword::While) {
            self.skip_token(true);
        } else {
            let span = self.current_token(true).span();
            self.error("expecting a `while` keyword", span);
        }

        let condition = self.parse_expression(ExprCtx {
            ignore_newline: false,
            filter_type: false,
        });
        self.expect_terminator();

        DoWhileLoop {
            condition,
            content,
            span: self.span_from(start),
        }
    }

    /// Parses a `for` head and decides between the C-style and for-each
    /// forms.
    ///
    /// `for a, b in xs { }` is a for-each over `xs`; otherwise the head
    /// must have exactly three expressions (`init, cond, update`). Any
    /// other arity is a diagnostic and yields an invalid statement.
    fn parse_for_loop(&mut self) -> Statement {
        let start = self.current_token(true).span().start();

        if self.current_token(true).kind().is_keyword(Keyword::For) {
            self.skip_token(true);
        } else {
            let span = self.current_token(true).span();
            self.error("expecting a `for` keyword", span);
        }

        let mut expressions = vec![self.parse_expression(ExprCtx {
            ignore_newline: false,
            filter_type: false,
        })];
        while self
            .current_token(true)
            .kind()
            .is_delimiter(Delimiter::Comma)
        {
            self.skip_token(true);
            expressions.push(self.parse_expression(ExprCtx {
                ignore_newline: false,
                filter_type: false,
            }));
        }

        if self.current_token(true).kind().is_keyword(Keyword::In) {
            self.skip_token(true);
            let iteratee = self.parse_expression(ExprCtx {
                ignore_newline: false,
                filter_type: false,
            });
            let content = self.parse_block();

            Statement::ForEach(ForEachLoop {
                iterators: expressions,
                iteratee,
                content,
                span: self.span_from(start),
            })
        } else if expressions.len() == 3 {
            let update_expression = expressions.pop().unwrap_or(Expression::Invalid {
                span: Span::new(start, start),
            });
            let loop_condition = expressions.pop().unwrap_or(Expression::Invalid {
                span: Span::new(start, start),
            });
            let initial_expression = expressions.pop().unwrap_or(Expression::Invalid {
                span: Span::new(start, start),
            });
            let content = self.parse_block();

            Statement::For(ForLoop {
                initial_expression,
                loop_condition,
                update_expression,
                content,
                span: self.span_from(start),
            })
        } else {
            let span = self.current_token(true).span();
            self.error(
                "expecting an `in` keyword or exactly three expressions in the for loop head",
                span,
            );
            Statement::Invalid {
                span: self.span_from(start),
            }
        }
    }

    /// Parses `break` plus its terminator.
    fn parse_break(&mut self) -> Statement {
        let start = self.current_token(true).span().start();

        if self.current_token(true).kind().is_keyword(Keyword::Break) {
            self.skip_token(true);
        } else {
            let span = self.current_token(true).span();
            self.error("expecting a `break` keyword", span);
        }
        self.expect_terminator();

        Statement::Break {
            span: self.span_from(start),
        }
    }

    /// Parses `continue` plus its terminator.
    fn parse_continue(&mut self) -> Statement {
        let start = self.current_token(true).span().start();

        if self
            .current_token(true)
            .kind()
            .is_keyword(Keyword::Continue)
        {
            self.skip_token(true);
        } else {
            let span = self.current_token(true).span();
            self.error("expecting a `continue` keyword", span);
        }
        self.expect_terminator();

        Statement::Continue {
            span: self.span_from(start),
        }
    }

    /// Parses `return` with an optional comma-separated value list.
    fn parse_return(&mut self) -> Return {
        let start = self.current_token(true).span().start();

        if self.current_token(true).kind().is_keyword(Keyword::Return) {
            self.skip_token(true);
        } else {
            let span = self.current_token(true).span();
            self.error("expecting a `return` keyword", span);
        }

        // A bare return in a non-returning function
        let next = self.current_token(false).kind();
        if next.ends_statement() || next.is_delimiter(Delimiter::CurlyClose) {
            self.expect_terminator();
            return Return {
                values: Vec::new(),
                span: self.span_from(start),
            };
        }

        let mut values = vec![self.parse_expression(ExprCtx {
            ignore_newline: false,
            filter_type: false,
        })];
        while self
            .current_token(true)
            .kind()
            .is_delimiter(Delimiter::Comma)
        {
            self.skip_token(true);
            values.push(self.parse_expression(ExprCtx {
                ignore_newline: false,
                filter_type: false,
            }));
        }
        self.expect_terminator();

        Return {
            values,
            span: self.span_from(start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, ComparisonOp, VariableDeclaration};

    /// Parses expecting a clean result.
    fn parse_ok(source: &str) -> Vec<Statement> {
        let (statements, diagnostics) = parse(source);
        assert!(
            diagnostics.is_empty(),
            "expected a clean parse of {source:?}, got: {diagnostics:?}"
        );
        statements
    }

    /// Parses expecting at least one diagnostic.
    fn parse_err(source: &str) -> (Vec<Statement>, Vec<Diagnostic>) {
        let (statements, diagnostics) = parse(source);
        assert!(
            !diagnostics.is_empty(),
            "expected diagnostics parsing {source:?}"
        );
        (statements, diagnostics)
    }

    #[test]
    fn parse_empty_buffer() {
        let (statements, diagnostics) = parse("");
        assert!(statements.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn parse_lone_comment() {
        let (statements, diagnostics) = parse("# just a comment");
        assert!(statements.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn parse_blank_lines() {
        let (statements, diagnostics) = parse("\n\n\n");
        assert!(statements.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn parse_import_with_alias() {
        let statements = parse_ok("import a.b.c as z");
        assert_eq!(statements.len(), 1);
        match &statements[0] {
            Statement::Import(import) => {
                assert_eq!(import.path, vec!["a", "b", "c"]);
                assert!(!import.relative);
                assert_eq!(import.alias.as_deref(), Some("z"));
            }
            other => panic!("expected an import, got {other:?}"),
        }
    }

    #[test]
    fn parse_relative_include() {
        let statements = parse_ok("include .utils");
        match &statements[0] {
            Statement::Include(include) => {
                assert_eq!(include.path, vec!["utils"]);
                assert!(include.relative);
            }
            other => panic!("expected an include, got {other:?}"),
        }
    }

    #[test]
    fn parse_variable_declaration_statement() {
        let statements = parse_ok("x: int = 3 + 4");
        let Statement::Expression(Expression::VariableDeclaration(declaration)) = &statements[0]
        else {
            panic!("expected a variable declaration, got {statements:?}");
        };
        assert_eq!(declaration.name, "x");
        assert!(matches!(
            declaration.ty.as_deref(),
            Some(Expression::Identifier { name, .. }) if name == "int"
        ));
        let Some(Expression::Binary {
            op: BinaryOp::Add,
            left,
            right,
            ..
        }) = declaration.initializer.as_deref()
        else {
            panic!("expected an addition initializer");
        };
        assert!(matches!(**left, Expression::Integer { value: 3, .. }));
        assert!(matches!(**right, Expression::Integer { value: 4, .. }));
    }

    #[test]
    fn parse_if_with_comparison_chain() {
        let statements = parse_ok("if a < b <= c { return 1 } else { return 2 }");
        let Statement::If(if_branch) = &statements[0] else {
            panic!("expected an if, got {statements:?}");
        };
        assert_eq!(if_branch.branch_conditions.len(), 1);
        assert_eq!(if_branch.branch_contents.len(), 1);

        let Expression::Comparison {
            operations,
            operands,
            ..
        } = &if_branch.branch_conditions[0]
        else {
            panic!("expected a comparison chain");
        };
        assert_eq!(
            operations,
            &vec![ComparisonOp::Less, ComparisonOp::LessEqual]
        );
        assert_eq!(operands.len(), 3);

        assert!(matches!(
            if_branch.branch_contents[0][0],
            Statement::Return(_)
        ));
        assert!(matches!(if_branch.else_content[0], Statement::Return(_)));
    }

    #[test]
    fn parse_if_elif_else() {
        let statements = parse_ok("if a { } elif b { } elif c { } else { d() }");
        let Statement::If(if_branch) = &statements[0] else {
            panic!("expected an if");
        };
        assert_eq!(if_branch.branch_conditions.len(), 3);
        assert_eq!(if_branch.branch_contents.len(), 3);
        assert_eq!(if_branch.else_content.len(), 1);
    }

    #[test]
    fn parse_c_style_for() {
        let statements = parse_ok("for i = 0, i < 10, i++ { }");
        let Statement::For(for_loop) = &statements[0] else {
            panic!("expected a for loop, got {statements:?}");
        };
        assert!(matches!(
            for_loop.initial_expression,
            Expression::Binary {
                op: BinaryOp::Assign,
                ..
            }
        ));
        assert!(matches!(
            for_loop.loop_condition,
            Expression::Comparison { .. }
        ));
        assert!(matches!(for_loop.update_expression, Expression::Unary { .. }));
        assert!(for_loop.content.is_empty());
    }

    #[test]
    fn parse_for_each() {
        let statements = parse_ok("for x, y in pairs { }");
        let Statement::ForEach(for_each) = &statements[0] else {
            panic!("expected a for-each loop, got {statements:?}");
        };
        assert_eq!(for_each.iterators.len(), 2);
        assert!(matches!(
            for_each.iteratee,
            Expression::Identifier { ref name, .. } if name == "pairs"
        ));
        assert!(for_each.content.is_empty());
    }

    #[test]
    fn parse_for_bad_arity() {
        let (statements, diagnostics) = parse_err("for a, b { }");
        assert!(statements[0].is_invalid());
        assert!(diagnostics[0].message.contains("for loop head"));
    }

    #[test]
    fn parse_while_and_do_while() {
        let statements = parse_ok("while x < 3 { x += 1 }");
        assert!(matches!(statements[0], Statement::While(_)));

        let statements = parse_ok("do { x += 1 } while x < 3");
        let Statement::DoWhile(do_while) = &statements[0] else {
            panic!("expected a do-while");
        };
        assert!(matches!(do_while.condition, Expression::Comparison { .. }));
        assert_eq!(do_while.content.len(), 1);
    }

    #[test]
    fn parse_break_continue_return() {
        let statements = parse_ok("while a { break; continue }");
        let Statement::While(while_loop) = &statements[0] else {
            panic!("expected a while");
        };
        assert!(matches!(while_loop.content[0], Statement::Break { .. }));
        assert!(matches!(while_loop.content[1], Statement::Continue { .. }));

        let statements = parse_ok("return");
        let Statement::Return(bare) = &statements[0] else {
            panic!("expected a return");
        };
        assert!(bare.values.is_empty());

        let statements = parse_ok("return 1, 2");
        let Statement::Return(pair) = &statements[0] else {
            panic!("expected a return");
        };
        assert_eq!(pair.values.len(), 2);
    }

    #[test]
    fn parse_fib_end_to_end() {
        let statements = parse_ok(concat!(
            "def fib!(T)(n: T) -> T {\n",
            "    if n < 2 { return n }\n",
            "    else { return fib!T(n - 1) + fib!T(n - 2) }\n",
            "}\n",
        ));
        assert_eq!(statements.len(), 1);
        let Statement::Function(function) = &statements[0] else {
            panic!("expected a function, got {statements:?}");
        };

        // Name point is `fib` templatized with `(T)`
        let Expression::Templatize { value, template_arguments, .. } = &function.name_point else {
            panic!("expected a templatized name point, got {:?}", function.name_point);
        };
        assert!(matches!(&**value, Expression::Identifier { name, .. } if name == "fib"));
        assert_eq!(template_arguments.len(), 1);

        assert_eq!(function.arguments.len(), 1);
        assert_eq!(function.arguments[0].name, "n");
        assert!(matches!(
            function.return_type.as_deref(),
            Some(Expression::Identifier { name, .. }) if name == "T"
        ));

        // One if/else inside
        assert_eq!(function.content.len(), 1);
        let Statement::If(if_branch) = &function.content[0] else {
            panic!("expected an if inside the function");
        };
        assert!(matches!(
            if_branch.branch_conditions[0],
            Expression::Comparison { .. }
        ));
        assert_eq!(if_branch.else_content.len(), 1);
    }

    #[test]
    fn specifier_prefix_redispatches() {
        let statements = parse_ok("incase static def f() { }");
        let Statement::Function(function) = &statements[0] else {
            panic!("expected a function");
        };
        assert!(function.is_incase);
        assert!(function.is_static);

        let statements = parse_ok("incase class C { }");
        let Statement::Class(class) = &statements[0] else {
            panic!("expected a class");
        };
        assert!(class.is_incase);

        let statements = parse_ok("static x: int");
        let Statement::Expression(Expression::VariableDeclaration(VariableDeclaration {
            is_static,
            ..
        })) = &statements[0]
        else {
            panic!("expected a static variable declaration");
        };
        assert!(is_static);
    }

    #[test]
    fn statements_separated_by_semicolons_and_newlines() {
        let statements = parse_ok("a = 1; b = 2\nc = 3");
        assert_eq!(statements.len(), 3);
    }

    #[test]
    fn trailing_comment_terminates_statement() {
        let statements = parse_ok("x = 1 # set it\ny = 2");
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn unexpected_keyword_statements() {
        let (statements, diagnostics) = parse_err("as");
        assert!(statements[0].is_invalid());
        assert_eq!(diagnostics[0].message, "unexpected keyword");

        let (_, diagnostics) = parse_err("elif x { }");
        assert!(diagnostics[0].message.contains("elif"));

        let (_, diagnostics) = parse_err("else { }");
        assert!(diagnostics[0].message.contains("else"));
    }

    #[test]
    fn missing_terminator_is_reported_and_skipped() {
        let (statements, diagnostics) = parse_err("a = 1 b = 2");
        // Both statements survive; the gap is reported
        assert_eq!(statements.len(), 2);
        assert!(
            diagnostics
                .iter()
                .any(|d| d.message.contains("newline or a semicolon"))
        );
    }

    #[test]
    fn unclosed_block_reports_dead_end() {
        let (statements, diagnostics) = parse_err("while a { b()");
        assert_eq!(statements.len(), 1);
        assert!(diagnostics[0].message.contains("dead end"));
    }

    #[test]
    fn error_is_local_to_one_statement() {
        let (statements, _) = parse_err("enum { }\nx = 1");
        // The malformed enum does not corrupt the following assignment
        assert!(
            statements
                .iter()
                .any(|s| matches!(s, Statement::Expression(Expression::Binary { .. })))
        );
    }

    #[test]
    fn statement_spans_cover_children() {
        let statements = parse_ok("if a < b { return a }");
        let span = statements[0].span();
        let Statement::If(if_branch) = &statements[0] else {
            panic!("expected an if");
        };
        assert!(span.contains(if_branch.branch_conditions[0].span()));
        assert!(span.contains(if_branch.branch_contents[0][0].span()));
    }

    #[test]
    fn parse_is_deterministic() {
        let source = "def f(x: int) -> int { return x ** 2 }\nfor i = 0, i < 3, i++ { f(i) }";
        let (first_tree, first_diagnostics) = parse(source);
        let (second_tree, second_diagnostics) = parse(source);
        assert_eq!(first_tree, second_tree);
        assert_eq!(first_diagnostics, second_diagnostics);
    }
}
