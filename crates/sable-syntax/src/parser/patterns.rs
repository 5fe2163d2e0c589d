use super::expressions::Precedence;
use super::scanner::{can_start_expression, ScanMode};
use super::types::TypeMode;
use super::Parser;
use crate::SyntaxKind;

impl Parser<'_> {
    pub(super) fn is_possible_pattern_start(&self) -> bool {
        matches!(
            self.current(),
            SyntaxKind::Less | SyntaxKind::LessEq | SyntaxKind::Greater | SyntaxKind::GreaterEq
        ) || can_start_expression(self.current())
    }

    /// A full pattern: `or` binds loosest, then `and`, then `not`.
    pub(super) fn parse_pattern(&mut self) {
        if !self.enter() {
            return;
        }
        let checkpoint = self.builder.checkpoint();
        self.parse_conjunctive_pattern();
        while self.at(SyntaxKind::OrKw) && self.is_pattern_after_combinator() {
            self.builder.start_node_at(checkpoint, SyntaxKind::BinaryPattern);
            self.bump();
            self.parse_conjunctive_pattern();
            self.builder.finish_node();
        }
        self.leave();
    }

    fn parse_conjunctive_pattern(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.parse_negated_pattern();
        while self.at(SyntaxKind::AndKw) && self.is_pattern_after_combinator() {
            self.builder.start_node_at(checkpoint, SyntaxKind::BinaryPattern);
            self.bump();
            self.parse_negated_pattern();
            self.builder.finish_node();
        }
    }

    /// `and`/`or`/`not` are only combinators when a pattern follows them.
    fn is_pattern_after_combinator(&self) -> bool {
        let next = self.nth(1);
        matches!(
            next,
            SyntaxKind::Less | SyntaxKind::LessEq | SyntaxKind::Greater | SyntaxKind::GreaterEq
        ) || (can_start_expression(next) && !matches!(next, SyntaxKind::WhenKw))
    }

    fn parse_negated_pattern(&mut self) {
        if self.at(SyntaxKind::NotKw) && self.is_pattern_after_combinator() {
            self.builder.start_node(SyntaxKind::UnaryPattern);
            self.bump();
            if self.enter() {
                self.parse_negated_pattern();
                self.leave();
            }
            self.builder.finish_node();
        } else {
            self.parse_primary_pattern();
        }
    }

    fn parse_primary_pattern(&mut self) {
        match self.current() {
            SyntaxKind::LParen => {
                self.builder.start_node(SyntaxKind::ParenthesizedPattern);
                self.bump();
                self.parse_pattern();
                self.expect(SyntaxKind::RParen, "expected `)` to close pattern");
                self.builder.finish_node();
            }
            SyntaxKind::Less | SyntaxKind::LessEq | SyntaxKind::Greater | SyntaxKind::GreaterEq => {
                self.builder.start_node(SyntaxKind::RelationalPattern);
                self.bump();
                self.parse_sub_expression(Precedence::Shift);
                self.builder.finish_node();
            }
            SyntaxKind::VarKw if self.nth_is_identifier(1) => {
                self.builder.start_node(SyntaxKind::VarPattern);
                self.bump();
                self.parse_designation();
                self.builder.finish_node();
            }
            _ if self.at_discard() && !self.continues_as_expression(1) => {
                self.builder.start_node(SyntaxKind::DiscardPattern);
                self.bump();
                self.builder.finish_node();
            }
            _ => self.parse_type_or_constant_pattern(),
        }
    }

    /// Tokens after which a name keeps going as an expression rather than ending
    /// a type pattern.
    fn continues_as_expression(&self, n: usize) -> bool {
        matches!(
            self.nth(n),
            SyntaxKind::Dot
                | SyntaxKind::LParen
                | SyntaxKind::LBracket
                | SyntaxKind::Arrow
                | SyntaxKind::ColonColon
                | SyntaxKind::PlusPlus
                | SyntaxKind::MinusMinus
        )
    }

    fn parse_type_or_constant_pattern(&mut self) {
        let (flags, designation, ends_type) = self.lookahead(|p| {
            let flags = p.scan_type_core(ScanMode::Pattern);
            let designation = (p.at_identifier() || p.at_discard())
                && !matches!(
                    p.current(),
                    SyntaxKind::AndKw | SyntaxKind::OrKw | SyntaxKind::WhenKw
                );
            (flags, designation, !p.continues_as_expression(0))
        });

        if flags.is_type() && designation {
            self.builder.start_node(SyntaxKind::DeclarationPattern);
            self.parse_type(TypeMode::AfterIsOrPattern);
            self.parse_designation();
            self.builder.finish_node();
        } else if flags.is_definite() && ends_type {
            self.builder.start_node(SyntaxKind::TypePattern);
            self.parse_type(TypeMode::AfterIsOrPattern);
            self.builder.finish_node();
        } else {
            self.builder.start_node(SyntaxKind::ConstantPattern);
            self.parse_sub_expression(Precedence::Shift);
            self.builder.finish_node();
        }
    }
}
