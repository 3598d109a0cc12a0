// Copyright 2026 Kithare Organization
// SPDX-License-Identifier: MIT

//! Expression parsing for Kithare.
//!
//! One method per precedence level, lowest binding first; each consumes
//! a left-hand side from the next level up and loops while the current
//! token stays at its level. The full ladder:
//!
//! | Level | Construct |
//! |-------|-----------|
//! | 1  | in-place assigns `= += -= *= /= %= ^= .= &= \|= ~= <<= >>=` |
//! | 2  | ternary `value if cond else other` |
//! | 3–5 | `or`, `xor`, `and` |
//! | 6  | prefix `not` |
//! | 7  | comparison chain `== != < > <= >=` (one n-ary node) |
//! | 8–10 | `\|`, binary `~`, `&` |
//! | 11 | `<< >>` |
//! | 12–13 | `+ -`, `* / %` |
//! | 14 | power (right-associative) |
//! | 15 | prefix `+ - ++ -- not ~` |
//! | 16 | postfix call / index / `++` / `--` |
//! | 17 | scope `.name…`, templatize `!T` / `!(T, …)` |
//! | 18 | atoms |
//!
//! # Type-filter mode
//!
//! Every level takes an [`ExprCtx`]; when `filter_type` is set the same
//! code paths accept only the expression subset that can denote a type
//! (identifiers, scope, templatization, indexing and integer literals for
//! static-array sizing, grouping, and function types). Each level returns
//! early when the filter forbids its operators.
//!
//! # Deep nesting
//!
//! `parse_expression` grows the stack on the heap via `stacker` and an
//! explicit depth guard (`MAX_NESTING_DEPTH`) bounds recursion; exceeding
//! it records a diagnostic and yields an invalid node instead of
//! overflowing.

use crate::ast::{
    BinaryOp, ComparisonOp, Expression, FunctionType, Lambda, Statement, UnaryOp,
    VariableDeclaration,
};
use crate::source_analysis::{Delimiter, Keyword, Operator, Span, TokenKind};

use super::Parser;

/// Nesting-depth cap for expression recursion.
const MAX_NESTING_DEPTH: usize = 64;

/// The context threaded through every expression level.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExprCtx {
    /// Continue across newlines (inside bracketed lists) or stop at them
    /// (statement position).
    pub ignore_newline: bool,
    /// Restrict the grammar to type-denoting expressions.
    pub filter_type: bool,
}

/// The parsed tail shared by functions and lambdas: argument list,
/// optional variadic, optional return type, body.
pub(super) struct Signature {
    pub arguments: Vec<VariableDeclaration>,
    pub variadic_argument: Option<Box<VariableDeclaration>>,
    pub is_return_type_ref: bool,
    pub return_type: Option<Box<Expression>>,
    pub content: Vec<Statement>,
}

impl Parser {
    // ========================================================================
    // Entry and Nesting Guard
    // ========================================================================

    /// Parses any expression.
    ///
    /// The stack is grown on the heap when the red zone (32 KiB) runs
    /// low; the depth guard keeps the segment count small.
    pub(crate) fn parse_expression(&mut self, ctx: ExprCtx) -> Expression {
        stacker::maybe_grow(32 * 1024, 256 * 1024, || {
            match self.enter_nesting(ctx) {
                Ok(()) => {}
                Err(invalid) => return invalid,
            }
            let expression = self.parse_in_place(ctx);
            self.leave_nesting();
            expression
        })
    }

    /// Bumps the nesting depth, failing with an invalid node (and one
    /// consumed token, for progress) past `MAX_NESTING_DEPTH`.
    fn enter_nesting(&mut self, ctx: ExprCtx) -> Result<(), Expression> {
        self.nesting_depth += 1;
        if self.nesting_depth > MAX_NESTING_DEPTH {
            self.nesting_depth -= 1;
            let span = self.current_token(ctx.ignore_newline).span();
            self.error("the expression is nested too deeply", span);
            self.skip_token(ctx.ignore_newline);
            Err(Expression::Invalid { span })
        } else {
            Ok(())
        }
    }

    fn leave_nesting(&mut self) {
        self.nesting_depth -= 1;
    }

    // ========================================================================
    // Binary Levels
    // ========================================================================

    /// Shared left-associative loop: `lower (op lower)*`.
    ///
    /// `map` names the operators owned by the level; the loop stops on
    /// anything else. Type-filter mode disables every binary level, so
    /// the left-hand side is returned as-is.
    fn parse_left_assoc(
        &mut self,
        ctx: ExprCtx,
        lower: fn(&mut Self, ExprCtx) -> Expression,
        map: fn(Operator) -> Option<BinaryOp>,
    ) -> Expression {
        let origin = self.current_token(ctx.ignore_newline).span().start();
        let mut expression = lower(self, ctx);

        if ctx.filter_type {
            return expression;
        }

        while let TokenKind::Operator(operator) = self.current_token(ctx.ignore_newline).kind() {
            let Some(op) = map(*operator) else { break };
            self.skip_token(ctx.ignore_newline);

            let right = lower(self, ctx);
            expression = Expression::Binary {
                op,
                left: Box::new(expression),
                right: Box::new(right),
                span: self.span_from(origin),
            };
        }

        expression
    }

    /// Level 1: in-place assignments.
    fn parse_in_place(&mut self, ctx: ExprCtx) -> Expression {
        self.parse_left_assoc(ctx, Self::parse_ternary, |operator| match operator {
            Operator::IAdd => Some(BinaryOp::IAdd),
            Operator::ISub => Some(BinaryOp::ISub),
            Operator::IMul => Some(BinaryOp::IMul),
            Operator::IDiv => Some(BinaryOp::IDiv),
            Operator::IMod => Some(BinaryOp::IMod),
            Operator::IPow => Some(BinaryOp::IPow),
            Operator::IDot => Some(BinaryOp::IDot),
            Operator::Assign => Some(BinaryOp::Assign),
            Operator::IBitAnd => Some(BinaryOp::IBitAnd),
            Operator::IBitOr => Some(BinaryOp::IBitOr),
            Operator::IBitXor => Some(BinaryOp::IBitXor),
            Operator::IBitLShift => Some(BinaryOp::IBitLShift),
            Operator::IBitRShift => Some(BinaryOp::IBitRShift),
            _ => None,
        })
    }

    /// Level 2: `value if condition else otherwise`, stacking on repeat.
    fn parse_ternary(&mut self, ctx: ExprCtx) -> Expression {
        let origin = self.current_token(ctx.ignore_newline).span().start();
        let mut expression = self.parse_logical_or(ctx);

        if ctx.filter_type {
            return expression;
        }

        while self
            .current_token(ctx.ignore_newline)
            .kind()
            .is_keyword(Keyword::If)
        {
            self.skip_token(ctx.ignore_newline);

            let condition = self.parse_logical_or(ctx);

            if self
                .current_token(ctx.ignore_newline)
                .kind()
                .is_keyword(Keyword::Else)
            {
                self.skip_token(ctx.ignore_newline);
            } else {
                let span = self.current_token(ctx.ignore_newline).span();
                self.error_with_hint(
                    "expecting an `else` keyword after the condition",
                    "a ternary reads `value if condition else otherwise`",
                    span,
                );
            }

            let otherwise = self.parse_logical_or(ctx);

            expression = Expression::Ternary {
                value: Box::new(expression),
                condition: Box::new(condition),
                otherwise: Box::new(otherwise),
                span: self.span_from(origin),
            };
        }

        expression
    }

    /// Level 3: `or`.
    fn parse_logical_or(&mut self, ctx: ExprCtx) -> Expression {
        self.parse_left_assoc(ctx, Self::parse_logical_xor, |operator| {
            (operator == Operator::Or).then_some(BinaryOp::Or)
        })
    }

    /// Level 4: `xor`.
    fn parse_logical_xor(&mut self, ctx: ExprCtx) -> Expression {
        self.parse_left_assoc(ctx, Self::parse_logical_and, |operator| {
            (operator == Operator::Xor).then_some(BinaryOp::Xor)
        })
    }

    /// Level 5: `and`.
    fn parse_logical_and(&mut self, ctx: ExprCtx) -> Expression {
        self.parse_left_assoc(ctx, Self::parse_logical_not, |operator| {
            (operator == Operator::And).then_some(BinaryOp::And)
        })
    }

    /// Level 6: prefix `not`.
    fn parse_logical_not(&mut self, ctx: ExprCtx) -> Expression {
        if ctx.filter_type {
            return self.parse_comparison(ctx);
        }

        let token = self.current_token(ctx.ignore_newline);
        let origin = token.span().start();

        if token.kind().is_operator(Operator::Not) {
            self.skip_token(ctx.ignore_newline);

            let operand = match self.enter_nesting(ctx) {
                Ok(()) => {
                    let operand = self.parse_logical_not(ctx);
                    self.leave_nesting();
                    operand
                }
                Err(invalid) => invalid,
            };

            Expression::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                span: self.span_from(origin),
            }
        } else {
            self.parse_comparison(ctx)
        }
    }

    /// Level 7: comparison chains.
    ///
    /// `a < b <= c` collects into one n-ary node with
    /// `operands.len() == operations.len() + 1`, never a nest of
    /// binaries.
    fn parse_comparison(&mut self, ctx: ExprCtx) -> Expression {
        let origin = self.current_token(ctx.ignore_newline).span().start();
        let expression = self.parse_bitwise_or(ctx);

        if ctx.filter_type {
            return expression;
        }

        let comparison_of = |operator: Operator| -> Option<ComparisonOp> {
            match operator {
                Operator::Equal => Some(ComparisonOp::Equal),
                Operator::NotEqual => Some(ComparisonOp::NotEqual),
                Operator::Less => Some(ComparisonOp::Less),
                Operator::More => Some(ComparisonOp::More),
                Operator::LessEqual => Some(ComparisonOp::LessEqual),
                Operator::MoreEqual => Some(ComparisonOp::MoreEqual),
                _ => None,
            }
        };

        let starts_chain = matches!(
            self.current_token(ctx.ignore_newline).kind(),
            TokenKind::Operator(operator) if comparison_of(*operator).is_some()
        );
        if !starts_chain {
            return expression;
        }

        let mut operations = Vec::new();
        let mut operands = vec![expression];

        while let TokenKind::Operator(operator) = self.current_token(ctx.ignore_newline).kind() {
            let Some(operation) = comparison_of(*operator) else {
                break;
            };
            operations.push(operation);
            self.skip_token(ctx.ignore_newline);
            operands.push(self.parse_bitwise_or(ctx));
        }

        Expression::Comparison {
            operations,
            operands,
            span: self.span_from(origin),
        }
    }

    /// Level 8: `|`.
    fn parse_bitwise_or(&mut self, ctx: ExprCtx) -> Expression {
        self.parse_left_assoc(ctx, Self::parse_bitwise_xor, |operator| {
            (operator == Operator::BitOr).then_some(BinaryOp::BitOr)
        })
    }

    /// Level 9: binary `~` (xor).
    fn parse_bitwise_xor(&mut self, ctx: ExprCtx) -> Expression {
        self.parse_left_assoc(ctx, Self::parse_bitwise_and, |operator| {
            (operator == Operator::BitXor).then_some(BinaryOp::BitXor)
        })
    }

    /// Level 10: `&`.
    fn parse_bitwise_and(&mut self, ctx: ExprCtx) -> Expression {
        self.parse_left_assoc(ctx, Self::parse_bitwise_shifts, |operator| {
            (operator == Operator::BitAnd).then_some(BinaryOp::BitAnd)
        })
    }

    /// Level 11: `<<` and `>>`.
    fn parse_bitwise_shifts(&mut self, ctx: ExprCtx) -> Expression {
        self.parse_left_assoc(ctx, Self::parse_add_sub, |operator| match operator {
            Operator::BitLShift => Some(BinaryOp::BitLShift),
            Operator::BitRShift => Some(BinaryOp::BitRShift),
            _ => None,
        })
    }

    /// Level 12: `+` and `-`.
    fn parse_add_sub(&mut self, ctx: ExprCtx) -> Expression {
        self.parse_left_assoc(ctx, Self::parse_mul_div_mod, |operator| match operator {
            Operator::Add => Some(BinaryOp::Add),
            Operator::Sub => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    /// Level 13: `*`, `/`, `%`.
    fn parse_mul_div_mod(&mut self, ctx: ExprCtx) -> Expression {
        self.parse_left_assoc(ctx, Self::parse_pow, |operator| match operator {
            Operator::Mul => Some(BinaryOp::Mul),
            Operator::Div => Some(BinaryOp::Div),
            Operator::Mod => Some(BinaryOp::Mod),
            _ => None,
        })
    }

    /// Level 14: power, right-associative.
    fn parse_pow(&mut self, ctx: ExprCtx) -> Expression {
        let origin = self.current_token(ctx.ignore_newline).span().start();
        let expression = self.parse_unary(ctx);

        if ctx.filter_type {
            return expression;
        }

        if !self
            .current_token(ctx.ignore_newline)
            .kind()
            .is_operator(Operator::Pow)
        {
            return expression;
        }
        self.skip_token(ctx.ignore_newline);

        let right = match self.enter_nesting(ctx) {
            Ok(()) => {
                let right = self.parse_pow(ctx);
                self.leave_nesting();
                right
            }
            Err(invalid) => invalid,
        };

        Expression::Binary {
            op: BinaryOp::Pow,
            left: Box::new(expression),
            right: Box::new(right),
            span: self.span_from(origin),
        }
    }

    // ========================================================================
    // Unary and Postfix Levels
    // ========================================================================

    /// Level 15: prefix `+ - ++ -- not ~`.
    fn parse_unary(&mut self, ctx: ExprCtx) -> Expression {
        if ctx.filter_type {
            return self.parse_postfix(ctx);
        }

        let token = self.current_token(ctx.ignore_newline);
        let origin = token.span().start();

        let op = match token.kind() {
            TokenKind::Operator(Operator::Add) => UnaryOp::Positive,
            TokenKind::Operator(Operator::Sub) => UnaryOp::Negative,
            TokenKind::Operator(Operator::Increment) => UnaryOp::PreIncrement,
            TokenKind::Operator(Operator::Decrement) => UnaryOp::PreDecrement,
            TokenKind::Operator(Operator::Not) => UnaryOp::Not,
            // `~` reads as bitwise-not in prefix position
            TokenKind::Operator(Operator::BitXor) => UnaryOp::BitNot,
            _ => return self.parse_postfix(ctx),
        };
        self.skip_token(ctx.ignore_newline);

        let operand = match self.enter_nesting(ctx) {
            Ok(()) => {
                let operand = self.parse_unary(ctx);
                self.leave_nesting();
                operand
            }
            Err(invalid) => invalid,
        };

        Expression::Unary {
            op,
            operand: Box::new(operand),
            span: self.span_from(origin),
        }
    }

    /// Level 16: postfix call, index, `++`, `--`.
    ///
    /// Calls and postfix increments are value-only; indexing stays legal
    /// under the type filter for static-array sizing.
    fn parse_postfix(&mut self, ctx: ExprCtx) -> Expression {
        let origin = self.current_token(ctx.ignore_newline).span().start();
        let mut expression = self.parse_scope_templatize(ctx);

        loop {
            match self.current_token(ctx.ignore_newline).kind() {
                TokenKind::Delimiter(Delimiter::ParenOpen) => {
                    if ctx.filter_type {
                        break;
                    }
                    let arguments =
                        self.parse_expression_list(Delimiter::ParenOpen, Delimiter::ParenClose, ctx);
                    expression = Expression::Call {
                        callee: Box::new(expression),
                        arguments,
                        span: self.span_from(origin),
                    };
                }
                TokenKind::Delimiter(Delimiter::SquareOpen) => {
                    let arguments = self.parse_expression_list(
                        Delimiter::SquareOpen,
                        Delimiter::SquareClose,
                        ctx,
                    );
                    expression = Expression::Index {
                        indexee: Box::new(expression),
                        arguments,
                        span: self.span_from(origin),
                    };
                }
                TokenKind::Operator(Operator::Increment) => {
                    if ctx.filter_type {
                        break;
                    }
                    self.skip_token(ctx.ignore_newline);
                    expression = Expression::Unary {
                        op: UnaryOp::PostIncrement,
                        operand: Box::new(expression),
                        span: self.span_from(origin),
                    };
                }
                TokenKind::Operator(Operator::Decrement) => {
                    if ctx.filter_type {
                        break;
                    }
                    self.skip_token(ctx.ignore_newline);
                    expression = Expression::Unary {
                        op: UnaryOp::PostDecrement,
                        operand: Box::new(expression),
                        span: self.span_from(origin),
                    };
                }
                _ => break,
            }
        }

        expression
    }

    /// Level 17: scope traversal and templatization.
    ///
    /// Each `.name.name…` run collects into one `Scope` node; `!T` and
    /// `!(T, …)` apply template arguments (always parsed type-filtered).
    fn parse_scope_templatize(&mut self, ctx: ExprCtx) -> Expression {
        let origin = self.current_token(ctx.ignore_newline).span().start();
        let mut expression = self.parse_atom(ctx);

        loop {
            match self.current_token(ctx.ignore_newline).kind() {
                TokenKind::Delimiter(Delimiter::Dot) => {
                    let mut scope_names = Vec::new();

                    while self
                        .current_token(ctx.ignore_newline)
                        .kind()
                        .is_delimiter(Delimiter::Dot)
                    {
                        self.skip_token(ctx.ignore_newline);

                        let token = self.current_token(ctx.ignore_newline).clone();
                        if let TokenKind::Identifier(name) = token.kind() {
                            scope_names.push(name.clone());
                            self.skip_token(ctx.ignore_newline);
                        } else {
                            self.error("expecting an identifier to scope into", token.span());
                        }
                    }

                    expression = Expression::Scope {
                        value: Box::new(expression),
                        scope_names,
                        span: self.span_from(origin),
                    };
                }
                TokenKind::Delimiter(Delimiter::Exclamation) => {
                    self.skip_token(ctx.ignore_newline);

                    let token = self.current_token(ctx.ignore_newline).clone();
                    match token.kind() {
                        // Single template argument: `Type!int`
                        TokenKind::Identifier(name) => {
                            self.skip_token(ctx.ignore_newline);
                            expression = Expression::Templatize {
                                value: Box::new(expression),
                                template_arguments: vec![Expression::Identifier {
                                    name: name.clone(),
                                    span: token.span(),
                                }],
                                span: self.span_from(origin),
                            };
                        }
                        // Multiple template arguments: `Type!(int, float)`
                        TokenKind::Delimiter(Delimiter::ParenOpen) => {
                            let template_arguments = self.parse_expression_list(
                                Delimiter::ParenOpen,
                                Delimiter::ParenClose,
                                ExprCtx {
                                    ignore_newline: ctx.ignore_newline,
                                    filter_type: true,
                                },
                            );
                            expression = Expression::Templatize {
                                value: Box::new(expression),
                                template_arguments,
                                span: self.span_from(origin),
                            };
                        }
                        _ => {
                            self.error("expecting a type argument for templatizing", token.span());
                        }
                    }
                }
                _ => break,
            }
        }

        expression
    }

    // ========================================================================
    // Atoms
    // ========================================================================

    /// Level 18: literals, grouping, tuples, arrays, dicts, lambdas,
    /// function types, and variable declarations.
    fn parse_atom(&mut self, ctx: ExprCtx) -> Expression {
        let token = self.current_token(ctx.ignore_newline).clone();
        let origin = token.span();

        match token.kind() {
            TokenKind::Identifier(name) => {
                // `identifier :` opens a variable declaration, but only
                // where values are legal
                if !ctx.filter_type
                    && self
                        .second_token(ctx.ignore_newline)
                        .kind()
                        .is_delimiter(Delimiter::Colon)
                {
                    return self.parse_variable_declaration(ctx.ignore_newline);
                }
                self.skip_token(ctx.ignore_newline);
                Expression::Identifier {
                    name: name.clone(),
                    span: origin,
                }
            }

            TokenKind::Keyword(Keyword::Def) => {
                // `def !` denotes a function type; a bare `def` opens a
                // lambda
                if self
                    .second_token(ctx.ignore_newline)
                    .kind()
                    .is_delimiter(Delimiter::Exclamation)
                {
                    self.parse_function_type(ctx.ignore_newline)
                } else {
                    if ctx.filter_type {
                        self.error("expecting a type, not a lambda", origin);
                    }
                    self.parse_lambda(ctx.ignore_newline)
                }
            }

            TokenKind::Keyword(Keyword::Static | Keyword::Wild | Keyword::Ref) => {
                if ctx.filter_type {
                    self.error("expecting a type, not a variable declaration", origin);
                }
                self.parse_variable_declaration(ctx.ignore_newline)
            }

            TokenKind::Delimiter(Delimiter::ParenOpen) => {
                let mut values =
                    self.parse_expression_list(Delimiter::ParenOpen, Delimiter::ParenClose, ctx);

                // One element is plain grouping; any other count is a tuple
                if values.len() == 1 {
                    values.pop().unwrap_or(Expression::Invalid { span: origin })
                } else {
                    Expression::Tuple {
                        values,
                        span: self.span_from(origin.start()),
                    }
                }
            }

            TokenKind::Delimiter(Delimiter::SquareOpen) => {
                if ctx.filter_type {
                    self.error("expecting a type, not an array", origin);
                }
                let values =
                    self.parse_expression_list(Delimiter::SquareOpen, Delimiter::SquareClose, ctx);
                Expression::Array {
                    values,
                    span: self.span_from(origin.start()),
                }
            }

            TokenKind::Delimiter(Delimiter::CurlyOpen) => {
                if ctx.filter_type {
                    self.error("expecting a type, not a dict", origin);
                }
                self.parse_dict(ctx.ignore_newline)
            }

            TokenKind::Char(value) => {
                if ctx.filter_type {
                    self.error("expecting a type, not a character", origin);
                }
                let value = *value;
                self.skip_token(ctx.ignore_newline);
                Expression::Char { value, span: origin }
            }

            TokenKind::String(value) => {
                if ctx.filter_type {
                    self.error("expecting a type, not a string", origin);
                }
                let value = value.clone();
                self.skip_token(ctx.ignore_newline);
                Expression::String { value, span: origin }
            }

            TokenKind::Buffer(value) => {
                if ctx.filter_type {
                    self.error("expecting a type, not a buffer", origin);
                }
                let value = value.clone();
                self.skip_token(ctx.ignore_newline);
                Expression::Buffer { value, span: origin }
            }

            TokenKind::Byte(value) => {
                if ctx.filter_type {
                    self.error("expecting a type, not a byte", origin);
                }
                let value = *value;
                self.skip_token(ctx.ignore_newline);
                Expression::Byte { value, span: origin }
            }

            // Integers stay legal under the type filter so static array
            // sizes can be spelled
            TokenKind::SByte(value) => self.integer_atom(ctx, i64::from(*value), origin),
            TokenKind::Short(value) => self.integer_atom(ctx, i64::from(*value), origin),
            TokenKind::Int(value) => self.integer_atom(ctx, i64::from(*value), origin),
            TokenKind::Long(value) => self.integer_atom(ctx, *value, origin),
            TokenKind::UShort(value) => self.uinteger_atom(ctx, u64::from(*value), origin),
            TokenKind::UInt(value) => self.uinteger_atom(ctx, u64::from(*value), origin),
            TokenKind::ULong(value) => self.uinteger_atom(ctx, *value, origin),

            TokenKind::Float(value) => {
                if ctx.filter_type {
                    self.error("expecting a type, not a floating-point number", origin);
                }
                let value = *value;
                self.skip_token(ctx.ignore_newline);
                Expression::Float { value, span: origin }
            }

            TokenKind::Double(value) => {
                if ctx.filter_type {
                    self.error("expecting a type, not a double floating-point number", origin);
                }
                let value = *value;
                self.skip_token(ctx.ignore_newline);
                Expression::Double { value, span: origin }
            }

            TokenKind::IFloat(value) => {
                if ctx.filter_type {
                    self.error("expecting a type, not an imaginary floating-point number", origin);
                }
                let value = *value;
                self.skip_token(ctx.ignore_newline);
                Expression::IFloat { value, span: origin }
            }

            TokenKind::IDouble(value) => {
                if ctx.filter_type {
                    self.error(
                        "expecting a type, not an imaginary double floating-point number",
                        origin,
                    );
                }
                let value = *value;
                self.skip_token(ctx.ignore_newline);
                Expression::IDouble { value, span: origin }
            }

            _ => {
                self.error("unexpected token in an expression", origin);
                self.skip_token(ctx.ignore_newline);
                Expression::Invalid { span: origin }
            }
        }
    }

    fn integer_atom(&mut self, ctx: ExprCtx, value: i64, span: Span) -> Expression {
        self.skip_token(ctx.ignore_newline);
        Expression::Integer { value, span }
    }

    fn uinteger_atom(&mut self, ctx: ExprCtx, value: u64, span: Span) -> Expression {
        self.skip_token(ctx.ignore_newline);
        Expression::UInteger { value, span }
    }

    // ========================================================================
    // Composite Atoms
    // ========================================================================

    /// Parses `(static)? (wild)? (ref)? name : (type)? (= initializer)?`
    /// as a record; used directly by argument lists.
    pub(super) fn parse_variable_declaration_record(
        &mut self,
        ignore_newline: bool,
    ) -> VariableDeclaration {
        let origin = self.current_token(ignore_newline).span().start();

        let (_, is_static) = self.parse_specifiers(false, true, ignore_newline);

        let is_wild = if self
            .current_token(ignore_newline)
            .kind()
            .is_keyword(Keyword::Wild)
        {
            self.skip_token(ignore_newline);
            true
        } else {
            false
        };

        let is_ref = if self
            .current_token(ignore_newline)
            .kind()
            .is_keyword(Keyword::Ref)
        {
            self.skip_token(ignore_newline);
            true
        } else {
            false
        };

        let token = self.current_token(ignore_newline).clone();
        let name = if let TokenKind::Identifier(name) = token.kind() {
            self.skip_token(ignore_newline);
            name.clone()
        } else {
            self.error(
                "expecting a name for the variable in the declaration",
                token.span(),
            );
            "".into()
        };

        if self
            .current_token(ignore_newline)
            .kind()
            .is_delimiter(Delimiter::Colon)
        {
            self.skip_token(ignore_newline);
        } else {
            let span = self.current_token(ignore_newline).span();
            self.error(
                "expecting a colon to separate the name and the type of the variable",
                span,
            );
        }

        // No assign right after the colon means a type follows; a bare
        // `name:` with nothing usable is reported and recovered with
        // both options absent
        let next = self.current_token(ignore_newline).kind().clone();
        let ty = if next.is_operator(Operator::Assign) {
            None
        } else if next.ends_statement()
            || matches!(
                next,
                TokenKind::Delimiter(
                    Delimiter::Comma
                        | Delimiter::ParenClose
                        | Delimiter::SquareClose
                        | Delimiter::CurlyClose
                )
            )
        {
            let span = self.current_token(ignore_newline).span();
            self.error_with_hint(
                "expecting a type or an initializer for the variable declaration",
                "write a type after the colon or initialize with `= value`",
                span,
            );
            None
        } else {
            Some(Box::new(self.parse_expression(ExprCtx {
                ignore_newline,
                filter_type: true,
            })))
        };

        let initializer = if self
            .current_token(ignore_newline)
            .kind()
            .is_operator(Operator::Assign)
        {
            self.skip_token(ignore_newline);
            Some(Box::new(self.parse_expression(ExprCtx {
                ignore_newline,
                filter_type: false,
            })))
        } else {
            None
        };

        VariableDeclaration {
            is_static,
            is_wild,
            is_ref,
            name,
            ty,
            initializer,
            span: self.span_from(origin),
        }
    }

    /// Parses a variable declaration in expression position.
    fn parse_variable_declaration(&mut self, ignore_newline: bool) -> Expression {
        Expression::VariableDeclaration(self.parse_variable_declaration_record(ignore_newline))
    }

    /// Parses the shared function/lambda tail: `(args...)`, an optional
    /// `...`-marked variadic, an optional `-> [ref] Type`, and the body
    /// block.
    pub(super) fn parse_function_signature(&mut self) -> Signature {
        let mut arguments = Vec::new();
        let mut variadic_argument = None;
        let mut is_return_type_ref = false;
        let mut return_type = None;

        if self
            .current_token(false)
            .kind()
            .is_delimiter(Delimiter::ParenOpen)
        {
            self.skip_token(true);
        } else {
            let span = self.current_token(false).span();
            self.error("expecting an opening parenthesis for the arguments", span);
        }

        loop {
            let token = self.current_token(true).clone();

            if token.kind().is_delimiter(Delimiter::ParenClose) {
                break;
            }
            if token.kind().is_eof() {
                self.error(
                    "expecting a comma with another argument or a closing parenthesis, met with a dead end",
                    token.span(),
                );
                break;
            }

            // The `...`-marked variadic must close the list
            if token.kind().is_delimiter(Delimiter::Ellipsis) {
                self.skip_token(true);
                variadic_argument = Some(Box::new(self.parse_variable_declaration_record(true)));

                if !self
                    .current_token(true)
                    .kind()
                    .is_delimiter(Delimiter::ParenClose)
                {
                    let span = self.current_token(true).span();
                    self.error(
                        "expecting a closing parenthesis after the variadic argument",
                        span,
                    );
                }
                break;
            }

            arguments.push(self.parse_variable_declaration_record(true));

            let token = self.current_token(true).clone();
            if token.kind().is_delimiter(Delimiter::Comma) {
                self.skip_token(true);
            } else if token.kind().is_delimiter(Delimiter::ParenClose) {
                // The loop head closes the list
            } else if token.kind().is_eof() {
                self.error(
                    "expecting a comma with another argument or a closing parenthesis, met with a dead end",
                    token.span(),
                );
                break;
            } else {
                self.error(
                    "expecting a comma with another argument or a closing parenthesis",
                    token.span(),
                );
                self.skip_token(true);
            }
        }
        self.skip_token(true); // the `)`

        // Optional return type
        if self
            .current_token(true)
            .kind()
            .is_delimiter(Delimiter::Arrow)
        {
            self.skip_token(true);

            if self.current_token(true).kind().is_keyword(Keyword::Ref) {
                is_return_type_ref = true;
                self.skip_token(true);
            }

            return_type = Some(Box::new(self.parse_expression(ExprCtx {
                ignore_newline: true,
                filter_type: true,
            })));
        }

        let content = self.parse_block();

        Signature {
            arguments,
            variadic_argument,
            is_return_type_ref,
            return_type,
            content,
        }
    }

    /// Parses a lambda: `def (args) -> T { body }`.
    fn parse_lambda(&mut self, ignore_newline: bool) -> Expression {
        let origin = self.current_token(ignore_newline).span().start();

        if self.current_token(ignore_newline).kind().is_keyword(Keyword::Def) {
            self.skip_token(ignore_newline);
        } else {
            let span = self.current_token(ignore_newline).span();
            self.error("expecting a `def` keyword", span);
        }

        let signature = self.parse_function_signature();

        Expression::Lambda(Lambda {
            arguments: signature.arguments,
            variadic_argument: signature.variadic_argument,
            is_return_type_ref: signature.is_return_type_ref,
            return_type: signature.return_type,
            content: signature.content,
            span: self.span_from(origin),
        })
    }

    /// Parses a function type: `def!(T, ref U) -> ref R`.
    fn parse_function_type(&mut self, ignore_newline: bool) -> Expression {
        let origin = self.current_token(ignore_newline).span().start();
        let mut argument_types = Vec::new();
        let mut are_arguments_refs = Vec::new();
        let mut is_return_type_ref = false;
        let mut return_type = None;

        if self.current_token(ignore_newline).kind().is_keyword(Keyword::Def) {
            self.skip_token(ignore_newline);
        } else {
            let span = self.current_token(ignore_newline).span();
            self.error("expecting a `def` keyword", span);
        }

        if self
            .current_token(ignore_newline)
            .kind()
            .is_delimiter(Delimiter::Exclamation)
        {
            self.skip_token(ignore_newline);
        } else {
            let span = self.current_token(ignore_newline).span();
            self.error("expecting an exclamation mark", span);
        }

        if self
            .current_token(ignore_newline)
            .kind()
            .is_delimiter(Delimiter::ParenOpen)
        {
            self.skip_token(true);
        } else {
            let span = self.current_token(ignore_newline).span();
            self.error("expecting an opening parenthesis", span);
        }

        if self
            .current_token(true)
            .kind()
            .is_delimiter(Delimiter::ParenClose)
        {
            self.skip_token(true);
        } else {
            loop {
                // `ref` marks the argument as by-reference
                if self.current_token(true).kind().is_keyword(Keyword::Ref) {
                    are_arguments_refs.push(true);
                    self.skip_token(true);
                } else {
                    are_arguments_refs.push(false);
                }

                argument_types.push(self.parse_expression(ExprCtx {
                    ignore_newline: true,
                    filter_type: true,
                }));

                let token = self.current_token(true).clone();
                if token.kind().is_delimiter(Delimiter::Comma) {
                    self.skip_token(true);
                } else if token.kind().is_delimiter(Delimiter::ParenClose) {
                    self.skip_token(true);
                    break;
                } else if token.kind().is_delimiter(Delimiter::CurlyClose) {
                    self.error_with_hint(
                        "expecting a comma or another argument type after an argument type",
                        "function type argument lists close with `)`",
                        token.span(),
                    );
                    break;
                } else {
                    self.error(
                        "expecting a comma or another argument type after an argument type",
                        token.span(),
                    );
                    break;
                }
            }
        }

        // Optional return type
        if self
            .current_token(ignore_newline)
            .kind()
            .is_delimiter(Delimiter::Arrow)
        {
            self.skip_token(ignore_newline);

            if self.current_token(ignore_newline).kind().is_keyword(Keyword::Ref) {
                is_return_type_ref = true;
                self.skip_token(ignore_newline);
            }

            return_type = Some(Box::new(self.parse_expression(ExprCtx {
                ignore_newline,
                filter_type: true,
            })));
        }

        Expression::FunctionType(FunctionType {
            argument_types,
            are_arguments_refs,
            is_return_type_ref,
            return_type,
            span: self.span_from(origin),
        })
    }

    /// Parses `{key: value, …}`.
    fn parse_dict(&mut self, ignore_newline: bool) -> Expression {
        let origin = self.current_token(ignore_newline).span().start();
        let mut keys = Vec::new();
        let mut values = Vec::new();

        if self
            .current_token(ignore_newline)
            .kind()
            .is_delimiter(Delimiter::CurlyOpen)
        {
            self.skip_token(true);
        } else {
            let span = self.current_token(ignore_newline).span();
            self.error("expecting an opening curly bracket", span);
        }

        if self
            .current_token(true)
            .kind()
            .is_delimiter(Delimiter::CurlyClose)
        {
            self.skip_token(true);
        } else {
            loop {
                keys.push(self.parse_expression(ExprCtx {
                    ignore_newline: true,
                    filter_type: false,
                }));

                if self
                    .current_token(true)
                    .kind()
                    .is_delimiter(Delimiter::Colon)
                {
                    self.skip_token(true);
                } else {
                    let span = self.current_token(true).span();
                    self.error("expecting a colon after the key for its value pair", span);
                }

                values.push(self.parse_expression(ExprCtx {
                    ignore_newline: true,
                    filter_type: false,
                }));

                let token = self.current_token(true).clone();
                if token.kind().is_delimiter(Delimiter::Comma) {
                    self.skip_token(true);
                } else if token.kind().is_delimiter(Delimiter::CurlyClose) {
                    self.skip_token(true);
                    break;
                } else {
                    self.error(
                        "expecting a comma with another pair of key and value or a closing delimiter",
                        token.span(),
                    );
                    break;
                }
            }
        }

        Expression::Dict {
            keys,
            values,
            span: self.span_from(origin),
        }
    }

    /// Parses a comma-separated expression list between delimiters.
    ///
    /// `filter_type` is inherited so call/index/template argument lists
    /// follow their context's grammar.
    pub(super) fn parse_expression_list(
        &mut self,
        opening: Delimiter,
        closing: Delimiter,
        ctx: ExprCtx,
    ) -> Vec<Expression> {
        let mut expressions = Vec::new();

        if self.current_token(ctx.ignore_newline).kind().is_delimiter(opening) {
            self.skip_token(true);
        } else {
            let span = self.current_token(ctx.ignore_newline).span();
            self.error("expecting an opening delimiter", span);
        }

        if self.current_token(true).kind().is_delimiter(closing) {
            self.skip_token(true);
            return expressions;
        }

        loop {
            expressions.push(self.parse_expression(ExprCtx {
                ignore_newline: true,
                filter_type: ctx.filter_type,
            }));

            let token = self.current_token(true).clone();
            if token.kind().is_delimiter(Delimiter::Comma) {
                self.skip_token(true);
            } else if token.kind().is_delimiter(closing) {
                self.skip_token(true);
                break;
            } else {
                self.error(
                    "expecting a comma with another element or a closing delimiter",
                    token.span(),
                );
                break;
            }
        }

        expressions
    }
}
