use super::types::TypeMode;
use super::Parser;
use crate::SyntaxKind;

impl Parser<'_> {
    /// `from x in` or `from T x in`.
    pub(super) fn is_query_expression_start(&self) -> bool {
        if !self.at(SyntaxKind::FromKw) {
            return false;
        }
        let next = self.nth(1);
        if !(next.is_identifier_like() || next.is_predefined_type()) {
            return false;
        }
        self.nth_at(2, SyntaxKind::InKw)
            || (self.nth(2).is_identifier_like() && self.nth_at(3, SyntaxKind::InKw))
    }

    /// Query keywords stop being identifiers for the whole query, nested clauses
    /// included; a lambda or anonymous method body inside it resets that.
    pub(super) fn parse_query_expression(&mut self) {
        self.builder.start_node(SyntaxKind::QueryExpression);
        self.query_depth += 1;
        self.parse_from_clause();
        self.parse_query_body();
        self.query_depth -= 1;
        self.builder.finish_node();
    }

    fn parse_from_clause(&mut self) {
        self.builder.start_node(SyntaxKind::FromClause);
        self.bump();
        self.parse_range_variable();
        self.expect(SyntaxKind::InKw, "expected `in`");
        self.parse_expression();
        self.builder.finish_node();
    }

    /// `[Type] name` as introduced by `from` and `join`.
    fn parse_range_variable(&mut self) {
        if !(self.at_identifier() && self.nth_at(1, SyntaxKind::InKw)) {
            self.parse_type(TypeMode::Normal);
        }
        self.expect_identifier("expected range variable name");
    }

    fn parse_query_body(&mut self) {
        self.builder.start_node(SyntaxKind::QueryBody);
        loop {
            match self.current() {
                SyntaxKind::FromKw => self.parse_from_clause(),
                SyntaxKind::LetKw => {
                    self.builder.start_node(SyntaxKind::LetClause);
                    self.bump();
                    self.expect_identifier("expected range variable name");
                    self.expect(SyntaxKind::Eq, "expected `=`");
                    self.parse_expression();
                    self.builder.finish_node();
                }
                SyntaxKind::WhereKw => {
                    self.builder.start_node(SyntaxKind::WhereClause);
                    self.bump();
                    self.parse_expression();
                    self.builder.finish_node();
                }
                SyntaxKind::JoinKw => self.parse_join_clause(),
                SyntaxKind::OrderbyKw => self.parse_orderby_clause(),
                _ => break,
            }
        }

        match self.current() {
            SyntaxKind::SelectKw => {
                self.builder.start_node(SyntaxKind::SelectClause);
                self.bump();
                self.parse_expression();
                self.builder.finish_node();
            }
            SyntaxKind::GroupKw => {
                self.builder.start_node(SyntaxKind::GroupClause);
                self.bump();
                self.parse_expression();
                self.expect(SyntaxKind::ByKw, "expected `by`");
                self.parse_expression();
                self.builder.finish_node();
            }
            _ => {
                self.builder.start_node(SyntaxKind::SelectClause);
                self.missing(SyntaxKind::SelectKw, "expected `select` or `group` to end query");
                self.builder.finish_node();
            }
        }

        if self.at(SyntaxKind::IntoKw) && self.enter() {
            self.builder.start_node(SyntaxKind::QueryContinuation);
            self.bump();
            self.expect_identifier("expected identifier after `into`");
            self.parse_query_body();
            self.builder.finish_node();
            self.leave();
        }
        self.builder.finish_node();
    }

    fn parse_join_clause(&mut self) {
        self.builder.start_node(SyntaxKind::JoinClause);
        self.bump();
        self.parse_range_variable();
        self.expect(SyntaxKind::InKw, "expected `in`");
        self.parse_expression();
        self.expect(SyntaxKind::OnKw, "expected `on`");
        self.parse_expression();
        self.expect(SyntaxKind::EqualsKw, "expected `equals`");
        self.parse_expression();
        if self.at(SyntaxKind::IntoKw) {
            self.builder.start_node(SyntaxKind::JoinIntoClause);
            self.bump();
            self.expect_identifier("expected identifier after `into`");
            self.builder.finish_node();
        }
        self.builder.finish_node();
    }

    fn parse_orderby_clause(&mut self) {
        self.builder.start_node(SyntaxKind::OrderByClause);
        self.bump();
        loop {
            self.builder.start_node(SyntaxKind::Ordering);
            self.parse_expression();
            if matches!(
                self.current(),
                SyntaxKind::AscendingKw | SyntaxKind::DescendingKw
            ) {
                self.bump();
            }
            self.builder.finish_node();
            if !self.bump_if(SyntaxKind::Comma) {
                break;
            }
        }
        self.builder.finish_node();
    }
}
