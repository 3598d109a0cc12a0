// Copyright 2026 Kithare Organization
// SPDX-License-Identifier: MIT

//! Declaration parsing for Kithare.
//!
//! Handles the statement forms that introduce names:
//!
//! - `import` / `include` with dot-separated paths and relative `.` prefix
//! - `def` functions (sharing the signature tail with lambdas)
//! - `class` / `struct` with template parameters and an optional base
//! - `enum` member lists
//! - `alias`

use ecow::EcoString;

use crate::ast::{Alias, Class, EnumType, Function, Import, Include, Struct};
use crate::source_analysis::{Delimiter, Keyword, TokenKind};

use super::{ExprCtx, Parser};

impl Parser {
    // ========================================================================
    // Imports and Includes
    // ========================================================================

    /// Parses the common import/include tail: optional `.` for a relative
    /// path, a dot-separated identifier chain, and an optional
    /// `as <identifier>`.
    fn parse_import_path(&mut self, what: &str) -> (Vec<EcoString>, bool, Option<EcoString>) {
        let mut path = Vec::new();
        let mut relative = false;

        if self
            .current_token(false)
            .kind()
            .is_delimiter(Delimiter::Dot)
        {
            relative = true;
            self.skip_token(false);
        }

        // Minimum one identifier
        let token = self.current_token(false).clone();
        if let TokenKind::Identifier(name) = token.kind() {
            path.push(name.clone());
            self.skip_token(false);
        } else {
            self.error(format!("expecting something to {what}"), token.span());
        }

        while self
            .current_token(false)
            .kind()
            .is_delimiter(Delimiter::Dot)
        {
            self.skip_token(false);

            let token = self.current_token(false).clone();
            if let TokenKind::Identifier(name) = token.kind() {
                path.push(name.clone());
                self.skip_token(false);
            } else {
                self.error("expecting another identifier", token.span());
            }
        }

        // `as another` rebinds the module; accepted on both forms, only
        // meaningful for imports
        let mut alias = None;
        if self.current_token(false).kind().is_keyword(Keyword::As) {
            self.skip_token(false);

            let token = self.current_token(false).clone();
            if let TokenKind::Identifier(name) = token.kind() {
                alias = Some(name.clone());
                self.skip_token(false);
            } else {
                self.error(
                    "expecting an identifier to alias the imported module as",
                    token.span(),
                );
            }
        }

        (path, relative, alias)
    }

    /// Parses `import [.]a.b.c [as z]` plus its terminator.
    pub(super) fn parse_import(&mut self) -> Import {
        let start = self.current_token(true).span().start();

        if self.current_token(true).kind().is_keyword(Keyword::Import) {
            self.skip_token(true);
        } else {
            let span = self.current_token(true).span();
            self.error("expecting an `import` keyword", span);
        }

        let (path, relative, alias) = self.parse_import_path("import");
        self.expect_terminator();

        Import {
            path,
            relative,
            alias,
            span: self.span_from(start),
        }
    }

    /// Parses `include [.]a.b.c` plus its terminator.
    pub(super) fn parse_include(&mut self) -> Include {
        let start = self.current_token(true).span().start();

        if self
            .current_token(true)
            .kind()
            .is_keyword(Keyword::Include)
        {
            self.skip_token(true);
        } else {
            let span = self.current_token(true).span();
            self.error("expecting an `include` keyword", span);
        }

        let (path, relative, _alias) = self.parse_import_path("include");
        self.expect_terminator();

        Include {
            path,
            relative,
            span: self.span_from(start),
        }
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// Parses `(incase|static)* def ⟨name point⟩ ⟨signature⟩ ⟨block⟩`.
    ///
    /// The name point is a type-filtered expression, so scoped
    /// (`a.b.f`) and templatized (`f!T`) targets parse naturally.
    pub(super) fn parse_function(&mut self) -> Function {
        let start = self.current_token(true).span().start();

        let (is_incase, is_static) = self.parse_specifiers(true, true, true);

        if self.current_token(true).kind().is_keyword(Keyword::Def) {
            self.skip_token(true);
        } else {
            let span = self.current_token(true).span();
            self.error("expecting a `def` keyword", span);
        }

        let name_point = self.parse_expression(ExprCtx {
            ignore_newline: false,
            filter_type: true,
        });

        let signature = self.parse_function_signature();

        Function {
            is_incase,
            is_static,
            name_point,
            arguments: signature.arguments,
            variadic_argument: signature.variadic_argument,
            is_return_type_ref: signature.is_return_type_ref,
            return_type: signature.return_type,
            content: signature.content,
            span: self.span_from(start),
        }
    }

    // ========================================================================
    // Classes and Structs
    // ========================================================================

    /// Parses the shared class/struct tail: name, optional `!T` or
    /// `!(T, U, …)` template parameters, optional `(Base)`, and the body
    /// block.
    fn parse_class_or_struct(
        &mut self,
    ) -> (
        EcoString,
        Vec<EcoString>,
        Option<Box<crate::ast::Expression>>,
        Vec<crate::ast::Statement>,
    ) {
        let token = self.current_token(false).clone();
        let name = if let TokenKind::Identifier(name) = token.kind() {
            self.skip_token(false);
            name.clone()
        } else {
            self.error("expecting a name for the type", token.span());
            "".into()
        };

        // Template parameters
        let mut template_arguments = Vec::new();
        if self
            .current_token(false)
            .kind()
            .is_delimiter(Delimiter::Exclamation)
        {
            self.skip_token(false);

            let token = self.current_token(false).clone();
            match token.kind() {
                // Single template argument: `class Name!T`
                TokenKind::Identifier(argument) => {
                    template_arguments.push(argument.clone());
                    self.skip_token(false);
                }
                // Multiple template arguments: `class Name!(T, U)`
                TokenKind::Delimiter(Delimiter::ParenOpen) => {
                    loop {
                        self.skip_token(true); // the `(` or a `,`

                        let token = self.current_token(true).clone();
                        if let TokenKind::Identifier(argument) = token.kind() {
                            template_arguments.push(argument.clone());
                        } else {
                            self.error(
                                "expecting the name for a template argument",
                                token.span(),
                            );
                        }
                        self.skip_token(true);

                        if !self
                            .current_token(true)
                            .kind()
                            .is_delimiter(Delimiter::Comma)
                        {
                            break;
                        }
                    }

                    if self
                        .current_token(true)
                        .kind()
                        .is_delimiter(Delimiter::ParenClose)
                    {
                        self.skip_token(true);
                    } else {
                        let span = self.current_token(true).span();
                        self.error("expecting a closing parenthesis", span);
                    }
                }
                _ => {
                    self.error("expecting template argument(s)", token.span());
                }
            }
        }

        // Optional base type: `class Name(Base)`
        let mut base_type = None;
        if self
            .current_token(false)
            .kind()
            .is_delimiter(Delimiter::ParenOpen)
        {
            self.skip_token(true);
            base_type = Some(Box::new(self.parse_expression(ExprCtx {
                ignore_newline: true,
                filter_type: true,
            })));

            if self
                .current_token(true)
                .kind()
                .is_delimiter(Delimiter::ParenClose)
            {
                self.skip_token(true);
            } else {
                let span = self.current_token(true).span();
                self.error("expecting a closing parenthesis", span);
            }
        }

        let content = self.parse_block();

        (name, template_arguments, base_type, content)
    }

    /// Parses `(incase)* class ⟨name⟩ …`.
    pub(super) fn parse_class(&mut self) -> Class {
        let start = self.current_token(true).span().start();

        let (is_incase, _) = self.parse_specifiers(true, false, true);

        if self.current_token(true).kind().is_keyword(Keyword::Class) {
            self.skip_token(true);
        } else {
            let span = self.current_token(true).span();
            self.error("expecting a `class` keyword", span);
        }

        let (name, template_arguments, base_type, content) = self.parse_class_or_struct();

        Class {
            is_incase,
            name,
            template_arguments,
            base_type,
            content,
            span: self.span_from(start),
        }
    }

    /// Parses `(incase)* struct ⟨name⟩ …`.
    pub(super) fn parse_struct(&mut self) -> Struct {
        let start = self.current_token(true).span().start();

        let (is_incase, _) = self.parse_specifiers(true, false, true);

        if self.current_token(true).kind().is_keyword(Keyword::Struct) {
            self.skip_token(true);
        } else {
            let span = self.current_token(true).span();
            self.error("expecting a `struct` keyword", span);
        }

        let (name, template_arguments, base_type, content) = self.parse_class_or_struct();

        Struct {
            is_incase,
            name,
            template_arguments,
            base_type,
            content,
            span: self.span_from(start),
        }
    }

    // ========================================================================
    // Enums
    // ========================================================================

    /// Parses `enum ⟨name⟩ { member (, member)* ,? }`.
    ///
    /// No specifiers are permitted; members are bare identifiers.
    pub(super) fn parse_enum(&mut self) -> EnumType {
        let start = self.current_token(true).span().start();

        self.parse_specifiers(false, false, true);

        if self.current_token(true).kind().is_keyword(Keyword::Enum) {
            self.skip_token(true);
        } else {
            let span = self.current_token(true).span();
            self.error("expecting an `enum` keyword", span);
        }

        let token = self.current_token(false).clone();
        let name = if let TokenKind::Identifier(name) = token.kind() {
            self.skip_token(false);
            name.clone()
        } else {
            self.error("expecting a name for the enum type", token.span());
            "".into()
        };

        let mut members = Vec::new();
        if self
            .current_token(false)
            .kind()
            .is_delimiter(Delimiter::CurlyOpen)
        {
            self.skip_token(true);

            loop {
                let token = self.current_token(true).clone();

                // A close right away is either an empty enum (reported)
                // or a trailing comma (fine)
                if token.kind().is_delimiter(Delimiter::CurlyClose) {
                    if members.is_empty() {
                        self.error("expecting a member name", token.span());
                    }
                    break;
                }

                if let TokenKind::Identifier(member) = token.kind() {
                    members.push(member.clone());
                    self.skip_token(true);
                } else {
                    self.error("expecting a member name", token.span());
                    self.skip_token(true);
                }

                if self
                    .current_token(true)
                    .kind()
                    .is_delimiter(Delimiter::Comma)
                {
                    self.skip_token(true);
                } else {
                    break;
                }
            }

            if self
                .current_token(true)
                .kind()
                .is_delimiter(Delimiter::CurlyClose)
            {
                self.skip_token(true);
            } else {
                let span = self.current_token(true).span();
                self.error(
                    "expecting a comma with another member or a closing curly bracket",
                    span,
                );
            }
        } else {
            let span = self.current_token(false).span();
            self.error("expecting an opening curly bracket", span);
        }

        EnumType {
            name,
            members,
            span: self.span_from(start),
        }
    }

    // ========================================================================
    // Aliases
    // ========================================================================

    /// Parses `(incase)* alias ⟨name⟩ ⟨expression⟩` plus its terminator.
    pub(super) fn parse_alias(&mut self) -> Alias {
        let start = self.current_token(true).span().start();

        let (is_incase, _) = self.parse_specifiers(true, false, true);

        if self.current_token(true).kind().is_keyword(Keyword::Alias) {
            self.skip_token(true);
        } else {
            let span = self.current_token(true).span();
            self.error("expecting an `alias` keyword", span);
        }

        let token = self.current_token(false).clone();
        let name = if let TokenKind::Identifier(name) = token.kind() {
            self.skip_token(true);
            name.clone()
        } else {
            self.error("expecting a name for the alias", token.span());
            "".into()
        };

        let expression = self.parse_expression(ExprCtx {
            ignore_newline: false,
            filter_type: false,
        });
        self.expect_terminator();

        Alias {
            is_incase,
            name,
            expression,
            span: self.span_from(start),
        }
    }
}
