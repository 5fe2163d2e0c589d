use super::scanner::ScanMode;
use super::termination::{PostSkipAction, TerminatorState};
use super::Parser;
use crate::SyntaxKind;

/// Context a type is parsed in; controls which suffixes are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TypeMode {
    Normal,
    /// After `is`/`as` and inside patterns: `?` must not steal a conditional.
    AfterIsOrPattern,
    /// After `new`: array ranks carry sizes and are parsed by the creation expression.
    NewExpression,
}

impl Parser<'_> {
    pub(super) fn at_type_start(&self) -> bool {
        let kind = self.current();
        kind.is_predefined_type()
            || self.at_identifier()
            || matches!(kind, SyntaxKind::LParen | SyntaxKind::RefKw)
    }

    pub(super) fn parse_type(&mut self, mode: TypeMode) {
        if !self.enter() {
            return;
        }
        self.parse_type_core(mode);
        self.leave();
    }

    fn parse_type_core(&mut self, mode: TypeMode) {
        let checkpoint = self.builder.checkpoint();
        let kind = self.current();

        if kind == SyntaxKind::RefKw {
            self.builder.start_node(SyntaxKind::RefType);
            self.bump();
            self.bump_if(SyntaxKind::ReadonlyKw);
            self.parse_type(mode);
            self.builder.finish_node();
            return;
        }

        if kind.is_predefined_type() {
            self.builder.start_node(SyntaxKind::PredefinedType);
            self.bump();
            self.builder.finish_node();
        } else if kind == SyntaxKind::LParen {
            self.parse_tuple_type();
        } else if self.at_identifier() {
            self.parse_name();
        } else {
            self.builder.start_node(SyntaxKind::IdentifierName);
            self.missing(SyntaxKind::Identifier, "expected type");
            self.builder.finish_node();
            return;
        }

        let scan_mode = match mode {
            TypeMode::AfterIsOrPattern => ScanMode::Pattern,
            TypeMode::Normal | TypeMode::NewExpression => ScanMode::Normal,
        };
        if self.at(SyntaxKind::Question) && self.nullable_allowed(scan_mode) {
            self.builder.start_node_at(checkpoint, SyntaxKind::NullableType);
            self.bump();
            self.builder.finish_node();
        }

        if mode == TypeMode::Normal {
            while self.at(SyntaxKind::Star) {
                self.builder.start_node_at(checkpoint, SyntaxKind::PointerType);
                self.bump();
                self.builder.finish_node();
            }
        }

        if mode != TypeMode::NewExpression && self.at_array_rank() {
            self.builder.start_node_at(checkpoint, SyntaxKind::ArrayType);
            while self.at_array_rank() {
                self.parse_array_rank_specifier(false);
            }
            self.builder.finish_node();
        }
    }

    /// `[` followed by `]` or `,`: an unsized rank specifier.
    pub(super) fn at_array_rank(&self) -> bool {
        self.at(SyntaxKind::LBracket)
            && matches!(self.nth(1), SyntaxKind::RBracket | SyntaxKind::Comma)
    }

    /// `[,,]`, or with `sized`, `[expr, expr]` as in `new int[3, n]`.
    pub(super) fn parse_array_rank_specifier(&mut self, sized: bool) {
        self.builder.start_node(SyntaxKind::ArrayRankSpecifier);
        self.bump();
        loop {
            if sized && !matches!(self.current(), SyntaxKind::Comma | SyntaxKind::RBracket) {
                self.parse_expression();
            } else {
                self.builder.start_node(SyntaxKind::OmittedArraySizeExpression);
                self.builder.finish_node();
            }
            if !self.bump_if(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::RBracket, "expected `]`");
        self.builder.finish_node();
    }

    fn parse_tuple_type(&mut self) {
        self.builder.start_node(SyntaxKind::TupleType);
        self.bump();
        loop {
            self.builder.start_node(SyntaxKind::TupleElement);
            self.parse_type(TypeMode::Normal);
            if self.at_identifier() {
                self.bump();
            }
            self.builder.finish_node();
            if !self.bump_if(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::RParen, "expected `)` to close tuple type");
        self.builder.finish_node();
    }

    /// A possibly qualified, possibly generic name in type position.
    pub(super) fn parse_name(&mut self) {
        let checkpoint = self.builder.checkpoint();
        if self.at_identifier() && self.nth_at(1, SyntaxKind::ColonColon) {
            self.builder.start_node(SyntaxKind::IdentifierName);
            self.bump();
            self.builder.finish_node();
            self.bump();
            self.parse_simple_name_in_type();
            self.builder.start_node_at(checkpoint, SyntaxKind::AliasQualifiedName);
            self.builder.finish_node();
        } else {
            self.parse_simple_name_in_type();
        }

        while self.at(SyntaxKind::Dot) && self.nth_is_identifier(1) {
            self.builder.start_node_at(checkpoint, SyntaxKind::QualifiedName);
            self.bump();
            self.parse_simple_name_in_type();
            self.builder.finish_node();
        }
    }

    /// `Name` or `Name<...>`; in type position `<` always opens type arguments.
    pub(super) fn parse_simple_name_in_type(&mut self) {
        if self.nth_at(1, SyntaxKind::Less) && self.at_identifier() {
            self.builder.start_node(SyntaxKind::GenericName);
            self.bump();
            self.parse_type_argument_list();
            self.builder.finish_node();
        } else {
            self.builder.start_node(SyntaxKind::IdentifierName);
            self.expect_identifier("expected name");
            self.builder.finish_node();
        }
    }

    pub(super) fn parse_type_argument_list(&mut self) {
        self.builder.start_node(SyntaxKind::TypeArgumentList);
        self.expect(SyntaxKind::Less, "expected `<`");

        if matches!(self.current(), SyntaxKind::Greater | SyntaxKind::Comma) {
            loop {
                self.builder.start_node(SyntaxKind::OmittedTypeArgument);
                self.builder.finish_node();
                if !self.bump_if(SyntaxKind::Comma) {
                    break;
                }
            }
        } else {
            self.parse_separated_list(SeparatedList {
                close: SyntaxKind::Greater,
                state: TerminatorState::IS_END_OF_TYPE_ARGUMENT_LIST,
                is_element_start: Self::at_type_start,
                parse_element: |p| p.parse_type(TypeMode::Normal),
                expected: "expected type argument",
                allow_trailing: false,
            });
        }

        self.expect(SyntaxKind::Greater, "expected `>` to close type argument list");
        self.builder.finish_node();
    }
}

/// Description of a comma-separated list between a consumed opener and `close`.
pub(super) struct SeparatedList<'a, 't> {
    pub(super) close: SyntaxKind,
    pub(super) state: TerminatorState,
    pub(super) is_element_start: fn(&Parser<'t>) -> bool,
    pub(super) parse_element: fn(&mut Parser<'t>),
    pub(super) expected: &'a str,
    pub(super) allow_trailing: bool,
}

impl<'t> Parser<'t> {
    /// Parses `element (, element)*` up to (not including) `list.close`.
    ///
    /// Missing separators and elements are synthesized; garbage is skipped with
    /// [`Parser::skip_bad_list_tokens`], which aborts the list when an enclosing
    /// construct owns the current token.
    pub(super) fn parse_separated_list(&mut self, list: SeparatedList<'_, 't>) {
        let saved = self.push_termination(list.state);
        let close = list.close;
        let is_element_start = list.is_element_start;
        let is_expected =
            move |p: &Parser<'t>| p.at(SyntaxKind::Comma) || p.at(close) || is_element_start(p);

        loop {
            if self.at(close) || self.at(SyntaxKind::Eof) {
                break;
            }

            if is_element_start(self) {
                let before = self.tokens.position();
                (list.parse_element)(self);
                if self.tokens.position() == before
                    && self.skip_bad_list_tokens(is_expected, list.expected) == PostSkipAction::Abort
                {
                    break;
                }
            } else if self.at(SyntaxKind::Comma) {
                let offset = self.last_token_end();
                self.error_range(offset, offset, list.expected);
            } else if self.skip_bad_list_tokens(is_expected, list.expected) == PostSkipAction::Abort {
                break;
            }

            if self.at(SyntaxKind::Comma) {
                self.bump();
                if self.at(close) {
                    if !list.allow_trailing {
                        let offset = self.last_token_end();
                        self.error_range(offset, offset, list.expected);
                    }
                    break;
                }
            } else if self.at(close) || self.at(SyntaxKind::Eof) {
                break;
            } else if is_element_start(self) {
                self.missing(SyntaxKind::Comma, "expected `,`");
            } else if self.skip_bad_list_tokens(is_expected, list.expected) == PostSkipAction::Abort {
                break;
            }
        }

        self.restore_termination(saved);
    }
}
