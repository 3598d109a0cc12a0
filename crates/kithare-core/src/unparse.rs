// Copyright 2026 Kithare Organization
// SPDX-License-Identifier: MIT

//! AST unparser: converts Kithare AST nodes back to source text.
//!
//! The unparser is the inverse of the parser up to whitespace; it is
//! used for diagnostics and round-trip tests. Composite operations are
//! fully parenthesized, so reprinted text parses back to the same tree
//! without re-deriving precedence:
//!
//! ```
//! use kithare_core::source_analysis::parse;
//! use kithare_core::unparse::unparse_statements;
//!
//! let (statements, _) = parse("x = 1 + 2 * 3");
//! assert_eq!(unparse_statements(&statements), "x = (1 + (2 * 3))");
//! ```

use std::fmt::Write;

use crate::ast::{
    Expression, Function, Lambda, Statement, UnaryOp, VariableDeclaration,
};
use crate::source_analysis::escape_char;

/// Unparses a statement sequence, one statement per line.
#[must_use]
pub fn unparse_statements(statements: &[Statement]) -> String {
    let mut out = String::new();
    for (index, statement) in statements.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        write_statement(&mut out, statement, 0);
    }
    out
}

/// Unparses a single statement at the left margin.
#[must_use]
pub fn unparse_statement(statement: &Statement) -> String {
    let mut out = String::new();
    write_statement(&mut out, statement, 0);
    out
}

/// Unparses a single expression.
#[must_use]
pub fn unparse_expression(expression: &Expression) -> String {
    let mut out = String::new();
    write_expression(&mut out, expression);
    out
}

fn write_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("    ");
    }
}

fn write_block(out: &mut String, content: &[Statement], indent: usize) {
    if content.is_empty() {
        out.push_str("{ }");
        return;
    }

    out.push_str("{\n");
    for statement in content {
        write_indent(out, indent + 1);
        write_statement(out, statement, indent + 1);
        out.push('\n');
    }
    write_indent(out, indent);
    out.push('}');
}

fn write_path(out: &mut String, path: &[ecow::EcoString], relative: bool) {
    if relative {
        out.push('.');
    }
    for (index, segment) in path.iter().enumerate() {
        if index > 0 {
            out.push('.');
        }
        out.push_str(segment);
    }
}

fn write_statement(out: &mut String, statement: &Statement, indent: usize) {
    match statement {
        Statement::Invalid { .. } => out.push_str("<invalid>"),

        Statement::Import(import) => {
            out.push_str("import ");
            write_path(out, &import.path, import.relative);
            if let Some(alias) = &import.alias {
                let _ = write!(out, " as {alias}");
            }
        }

        Statement::Include(include) => {
            out.push_str("include ");
            write_path(out, &include.path, include.relative);
        }

        Statement::Function(function) => write_function(out, function, indent),

        Statement::Class(class) => {
            if class.is_incase {
                out.push_str("incase ");
            }
            let _ = write!(out, "class {}", class.name);
            write_template_parameters(out, &class.template_arguments);
            if let Some(base_type) = &class.base_type {
                out.push('(');
                write_expression(out, base_type);
                out.push(')');
            }
            out.push(' ');
            write_block(out, &class.content, indent);
        }

        Statement::Struct(struct_type) => {
            if struct_type.is_incase {
                out.push_str("incase ");
            }
            let _ = write!(out, "struct {}", struct_type.name);
            write_template_parameters(out, &struct_type.template_arguments);
            if let Some(base_type) = &struct_type.base_type {
                out.push('(');
                write_expression(out, base_type);
                out.push(')');
            }
            out.push(' ');
            write_block(out, &struct_type.content, indent);
        }

        Statement::Enum(enum_type) => {
            let _ = write!(out, "enum {} {{ ", enum_type.name);
            for (index, member) in enum_type.members.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                out.push_str(member);
            }
            out.push_str(" }");
        }

        Statement::Alias(alias) => {
            if alias.is_incase {
                out.push_str("incase ");
            }
            let _ = write!(out, "alias {} ", alias.name);
            write_expression_top(out, &alias.expression);
        }

        Statement::If(if_branch) => {
            for (index, condition) in if_branch.branch_conditions.iter().enumerate() {
                out.push_str(if index == 0 { "if " } else { " elif " });
                write_expression_top(out, condition);
                out.push(' ');
                let content = if_branch
                    .branch_contents
                    .get(index)
                    .map_or(&[][..], Vec::as_slice);
                write_block(out, content, indent);
            }
            if !if_branch.else_content.is_empty() {
                out.push_str(" else ");
                write_block(out, &if_branch.else_content, indent);
            }
        }

        Statement::While(while_loop) => {
            out.push_str("while ");
            write_expression_top(out, &while_loop.condition);
            out.push(' ');
            write_block(out, &while_loop.content, indent);
        }

        Statement::DoWhile(do_while_loop) => {
            out.push_str("do ");
            write_block(out, &do_while_loop.content, indent);
            out.push_str(" while ");
            write_expression_top(out, &do_while_loop.condition);
        }

        Statement::For(for_loop) => {
            out.push_str("for ");
            write_expression_top(out, &for_loop.initial_expression);
            out.push_str(", ");
            write_expression_top(out, &for_loop.loop_condition);
            out.push_str(", ");
            write_expression_top(out, &for_loop.update_expression);
            out.push(' ');
            write_block(out, &for_loop.content, indent);
        }

        Statement::ForEach(for_each_loop) => {
            out.push_str("for ");
            for (index, iterator) in for_each_loop.iterators.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_expression_top(out, iterator);
            }
            out.push_str(" in ");
            write_expression_top(out, &for_each_loop.iteratee);
            out.push(' ');
            write_block(out, &for_each_loop.content, indent);
        }

        Statement::Break { .. } => out.push_str("break"),
        Statement::Continue { .. } => out.push_str("continue"),

        Statement::Return(return_statement) => {
            out.push_str("return");
            for (index, value) in return_statement.values.iter().enumerate() {
                out.push_str(if index == 0 { " " } else { ", " });
                write_expression_top(out, value);
            }
        }

        Statement::Expression(expression) => write_expression_top(out, expression),
    }
}

fn write_template_parameters(out: &mut String, template_arguments: &[ecow::EcoString]) {
    if template_arguments.is_empty() {
        return;
    }
    out.push_str("!(");
    for (index, argument) in template_arguments.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        out.push_str(argument);
    }
    out.push(')');
}

fn write_function(out: &mut String, function: &Function, indent: usize) {
    if function.is_incase {
        out.push_str("incase ");
    }
    if function.is_static {
        out.push_str("static ");
    }
    out.push_str("def ");
    write_expression(out, &function.name_point);
    write_signature(
        out,
        &function.arguments,
        function.variadic_argument.as_deref(),
        function.is_return_type_ref,
        function.return_type.as_deref(),
    );
    out.push(' ');
    write_block(out, &function.content, indent);
}

fn write_signature(
    out: &mut String,
    arguments: &[VariableDeclaration],
    variadic_argument: Option<&VariableDeclaration>,
    is_return_type_ref: bool,
    return_type: Option<&Expression>,
) {
    out.push('(');
    for (index, argument) in arguments.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        write_variable_declaration(out, argument);
    }
    if let Some(variadic) = variadic_argument {
        if !arguments.is_empty() {
            out.push_str(", ");
        }
        out.push_str("...");
        write_variable_declaration(out, variadic);
    }
    out.push(')');

    if let Some(return_type) = return_type {
        out.push_str(" -> ");
        if is_return_type_ref {
            out.push_str("ref ");
        }
        write_expression(out, return_type);
    }
}

fn write_variable_declaration(out: &mut String, declaration: &VariableDeclaration) {
    if declaration.is_static {
        out.push_str("static ");
    }
    if declaration.is_wild {
        out.push_str("wild ");
    }
    if declaration.is_ref {
        out.push_str("ref ");
    }
    out.push_str(&declaration.name);
    out.push(':');
    if let Some(ty) = &declaration.ty {
        out.push(' ');
        write_expression(out, ty);
    }
    if let Some(initializer) = &declaration.initializer {
        out.push_str(" = ");
        write_expression_top(out, initializer);
    }
}

fn write_lambda(out: &mut String, lambda: &Lambda) {
    out.push_str("def ");
    write_signature(
        out,
        &lambda.arguments,
        lambda.variadic_argument.as_deref(),
        lambda.is_return_type_ref,
        lambda.return_type.as_deref(),
    );
    out.push(' ');
    write_block(out, &lambda.content, 0);
}

fn write_expression_list(out: &mut String, expressions: &[Expression]) {
    for (index, expression) in expressions.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        write_expression_top(out, expression);
    }
}

/// Writes an expression in a top-precedence position (statement bodies,
/// initializers, conditions, list elements), where the outermost
/// operation needs no grouping parentheses.
fn write_expression_top(out: &mut String, expression: &Expression) {
    match expression {
        Expression::Binary { .. } | Expression::Ternary { .. } | Expression::Comparison { .. } => {
            write_operation(out, expression);
        }
        _ => write_expression(out, expression),
    }
}

/// Writes the bare form of a binary, ternary, or comparison operation.
fn write_operation(out: &mut String, expression: &Expression) {
    match expression {
        Expression::Binary {
            op, left, right, ..
        } => {
            write_expression(out, left);
            let _ = write!(out, " {} ", op.as_str());
            write_expression(out, right);
        }

        Expression::Ternary {
            value,
            condition,
            otherwise,
            ..
        } => {
            write_expression(out, value);
            out.push_str(" if ");
            write_expression(out, condition);
            out.push_str(" else ");
            write_expression(out, otherwise);
        }

        Expression::Comparison {
            operations,
            operands,
            ..
        } => {
            for (index, operand) in operands.iter().enumerate() {
                if index > 0 {
                    let operation = operations
                        .get(index - 1)
                        .map_or("==", |operation| operation.as_str());
                    let _ = write!(out, " {operation} ");
                }
                write_expression(out, operand);
            }
        }

        _ => write_expression(out, expression),
    }
}

fn write_expression(out: &mut String, expression: &Expression) {
    match expression {
        Expression::Invalid { .. } => out.push_str("<invalid>"),

        Expression::Identifier { name, .. } => out.push_str(name),

        Expression::Tuple { values, .. } => {
            out.push('(');
            write_expression_list(out, values);
            out.push(')');
        }

        Expression::Array { values, .. } => {
            out.push('[');
            write_expression_list(out, values);
            out.push(']');
        }

        Expression::Dict { keys, values, .. } => {
            out.push('{');
            for (index, (key, value)) in keys.iter().zip(values).enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                // A bare identifier key would read as a variable
                // declaration; grouping keeps it a key
                if matches!(key, Expression::Identifier { .. }) {
                    out.push('(');
                    write_expression(out, key);
                    out.push(')');
                } else {
                    write_expression(out, key);
                }
                out.push_str(": ");
                write_expression_top(out, value);
            }
            out.push('}');
        }

        Expression::Scope {
            value, scope_names, ..
        } => {
            write_expression(out, value);
            for name in scope_names {
                out.push('.');
                out.push_str(name);
            }
        }

        Expression::Templatize {
            value,
            template_arguments,
            ..
        } => {
            write_expression(out, value);
            out.push_str("!(");
            write_expression_list(out, template_arguments);
            out.push(')');
        }

        Expression::Index {
            indexee, arguments, ..
        } => {
            write_expression(out, indexee);
            out.push('[');
            write_expression_list(out, arguments);
            out.push(']');
        }

        Expression::Call {
            callee, arguments, ..
        } => {
            write_expression(out, callee);
            out.push('(');
            write_expression_list(out, arguments);
            out.push(')');
        }

        Expression::Unary { op, operand, .. } => {
            out.push('(');
            match op {
                UnaryOp::Positive => {
                    out.push('+');
                    write_expression(out, operand);
                }
                UnaryOp::Negative => {
                    out.push('-');
                    write_expression(out, operand);
                }
                UnaryOp::PreIncrement => {
                    out.push_str("++");
                    write_expression(out, operand);
                }
                UnaryOp::PreDecrement => {
                    out.push_str("--");
                    write_expression(out, operand);
                }
                UnaryOp::Not => {
                    out.push_str("not ");
                    write_expression(out, operand);
                }
                UnaryOp::BitNot => {
                    out.push('~');
                    write_expression(out, operand);
                }
                UnaryOp::PostIncrement => {
                    write_expression(out, operand);
                    out.push_str("++");
                }
                UnaryOp::PostDecrement => {
                    write_expression(out, operand);
                    out.push_str("--");
                }
            }
            out.push(')');
        }

        Expression::Binary { .. } | Expression::Ternary { .. } | Expression::Comparison { .. } => {
            out.push('(');
            write_operation(out, expression);
            out.push(')');
        }

        Expression::VariableDeclaration(declaration) => {
            write_variable_declaration(out, declaration);
        }

        Expression::Lambda(lambda) => write_lambda(out, lambda),

        Expression::FunctionType(function_type) => {
            out.push_str("def!(");
            for (index, argument_type) in function_type.argument_types.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                if function_type
                    .are_arguments_refs
                    .get(index)
                    .copied()
                    .unwrap_or(false)
                {
                    out.push_str("ref ");
                }
                write_expression(out, argument_type);
            }
            out.push(')');
            if let Some(return_type) = &function_type.return_type {
                out.push_str(" -> ");
                if function_type.is_return_type_ref {
                    out.push_str("ref ");
                }
                write_expression(out, return_type);
            }
        }

        Expression::Char { value, .. } => {
            let mut escaped = String::new();
            escape_char(*value, &mut escaped);
            let _ = write!(out, "'{escaped}'");
        }

        Expression::String { value, .. } => {
            out.push('"');
            for c in value.chars() {
                escape_char(c, out);
            }
            out.push('"');
        }

        Expression::Buffer { value, .. } => {
            out.push_str("b\"");
            for &byte in value {
                if byte.is_ascii_graphic() || byte == b' ' {
                    escape_char(byte as char, out);
                } else {
                    let _ = write!(out, "\\x{byte:02X}");
                }
            }
            out.push('"');
        }

        Expression::Byte { value, .. } => {
            let _ = write!(out, "{value}b");
        }

        Expression::Integer { value, .. } => {
            if i32::try_from(*value).is_ok() {
                let _ = write!(out, "{value}");
            } else {
                let _ = write!(out, "{value}l");
            }
        }

        Expression::UInteger { value, .. } => {
            let _ = write!(out, "{value}ul");
        }

        Expression::Float { value, .. } => {
            let _ = write!(out, "{value}f");
        }

        Expression::Double { value, .. } => {
            let _ = write!(out, "{value}d");
        }

        Expression::IFloat { value, .. } => {
            let _ = write!(out, "{value}if");
        }

        Expression::IDouble { value, .. } => {
            let _ = write!(out, "{value}id");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::parse;

    /// Parse, print, reparse, reprint: both prints must agree and the
    /// reparse must be clean.
    fn round_trip(source: &str) {
        let (first_tree, diagnostics) = parse(source);
        assert!(
            diagnostics.is_empty(),
            "seed {source:?} did not parse cleanly: {diagnostics:?}"
        );

        let printed = unparse_statements(&first_tree);
        let (second_tree, diagnostics) = parse(&printed);
        assert!(
            diagnostics.is_empty(),
            "repr {printed:?} did not reparse cleanly: {diagnostics:?}"
        );

        let reprinted = unparse_statements(&second_tree);
        assert_eq!(printed, reprinted, "repr of {source:?} is not stable");
    }

    #[test]
    fn round_trip_imports() {
        round_trip("import a.b.c as z");
        round_trip("include .utils");
    }

    #[test]
    fn round_trip_declarations() {
        round_trip("x: int = 3 + 4");
        round_trip("static wild ref y: list!int = [1, 2]");
        round_trip("x: = 5");
    }

    #[test]
    fn round_trip_functions() {
        round_trip("def fib!(T)(n: T) -> T { if n < 2 { return n } else { return fib!T(n - 1) + fib!T(n - 2) } }");
        round_trip("incase static def a.b.f(x: int, ...rest: str) -> ref int { return x }");
        round_trip("f = def (x: int) { return x * 2 }");
    }

    #[test]
    fn round_trip_types() {
        round_trip("t: def!(int, ref float) -> ref double");
        round_trip("alias Matrix list!(list!float)");
        round_trip("buffer: byte[16]");
    }

    #[test]
    fn round_trip_classes() {
        round_trip("incase class Map!(K, V)(Base) { size: int\ndef get(key: K) -> V { } }");
        round_trip("struct Point { x: float\ny: float }");
        round_trip("enum Color { red, green, blue }");
    }

    #[test]
    fn round_trip_control_flow() {
        round_trip("if a < b <= c { return 1 } else { return 2 }");
        round_trip("while x < 10 { x += 1 }");
        round_trip("do { step() } while not done");
        round_trip("for i = 0, i < 10, i++ { f(i) }");
        round_trip("for x, y in pairs { use(x, y) }");
        round_trip("while a { break }");
        round_trip("while a { continue }");
    }

    #[test]
    fn round_trip_expressions() {
        round_trip("x = a + b * c - d / e % f");
        round_trip("x = 2 ^ 3 ^ 4");
        round_trip("x = a and b or not c xor d");
        round_trip("x = a | b ~ c & d << e >> f");
        round_trip("x = value if condition else otherwise");
        round_trip("x = (1, 2, 3)");
        round_trip("x = {\"a\": 1, 2: \"b\"}");
        round_trip("x = xs[0] + a.b.more!int(1, 2)");
        round_trip("x = (y++) + (--z)");
        round_trip("x .= y");
    }

    #[test]
    fn round_trip_literals() {
        round_trip("x = 'é'");
        round_trip("x = \"tab\\tnewline\\n\"");
        round_trip("x = b\"bytes\\xFF\"");
        round_trip("x = 200b + 3 + 4l");
        round_trip("x = 3ul");
        round_trip("x = 2.5f + 2.5d + 3if + 4id");
    }

    #[test]
    fn repr_is_fully_parenthesized() {
        let (statements, _) = parse("x = 1 + 2 * 3");
        assert_eq!(unparse_statements(&statements), "x = (1 + (2 * 3))");
    }

    #[test]
    fn repr_comparison_chain() {
        let (statements, _) = parse("c = a < b <= z");
        assert_eq!(unparse_statements(&statements), "c = (a < b <= z)");
    }

    #[test]
    fn repr_empty_block() {
        let (statements, _) = parse("while a { }");
        assert_eq!(unparse_statements(&statements), "while a { }");
    }
}
