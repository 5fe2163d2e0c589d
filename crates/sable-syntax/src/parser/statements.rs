use rowan::{GreenNodeData, Language, NodeOrToken};

use super::scanner::{can_start_expression, LocalShape, ScanMode};
use super::termination::{PostSkipAction, TerminatorState};
use super::types::TypeMode;
use super::Parser;
use crate::syntax_kind::SableLanguage;
use crate::{SyntaxKind, TextRange};

const NOT_A_STATEMENT: &str = "only assignment, call, increment, decrement, await, and object creation expressions can be used as a statement";

impl Parser<'_> {
    pub(super) fn is_possible_statement(&self) -> bool {
        match self.current() {
            SyntaxKind::LBrace
            | SyntaxKind::Semicolon
            | SyntaxKind::IfKw
            | SyntaxKind::WhileKw
            | SyntaxKind::DoKw
            | SyntaxKind::ForKw
            | SyntaxKind::ForeachKw
            | SyntaxKind::BreakKw
            | SyntaxKind::ContinueKw
            | SyntaxKind::ReturnKw
            | SyntaxKind::GotoKw
            | SyntaxKind::TryKw
            | SyntaxKind::SwitchKw
            | SyntaxKind::UsingKw
            | SyntaxKind::LockKw
            | SyntaxKind::UnsafeKw
            | SyntaxKind::FixedKw
            | SyntaxKind::ConstKw
            | SyntaxKind::StaticKw
            | SyntaxKind::ExternKw => true,
            SyntaxKind::ReadonlyKw => self.nth_at(1, SyntaxKind::RefKw),
            kind => can_start_expression(kind),
        }
    }

    /// Tokens that can begin a local declaration or local function.
    fn at_declaration_start(&self) -> bool {
        let kind = self.current();
        kind.is_identifier_like()
            || kind.is_predefined_type()
            || matches!(
                kind,
                SyntaxKind::LParen
                    | SyntaxKind::RefKw
                    | SyntaxKind::ConstKw
                    | SyntaxKind::ScopedKw
                    | SyntaxKind::StaticKw
                    | SyntaxKind::AsyncKw
                    | SyntaxKind::UnsafeKw
                    | SyntaxKind::ExternKw
            )
    }

    pub(super) fn parse_block(&mut self) {
        if !self.enter() {
            return;
        }
        self.builder.start_node(SyntaxKind::Block);
        self.expect(SyntaxKind::LBrace, "expected `{`");
        self.parse_statement_list();
        self.expect(SyntaxKind::RBrace, "expected `}`");
        self.builder.finish_node();
        self.leave();
    }

    /// Statements up to `}`, a switch label in a switch section, or `catch` /
    /// `finally` inside a try block.
    fn parse_statement_list(&mut self) {
        let saved = self.push_termination(TerminatorState::IS_POSSIBLE_STATEMENT_START_OR_STOP);
        loop {
            match self.current() {
                SyntaxKind::RBrace | SyntaxKind::Eof => break,
                SyntaxKind::CatchKw | SyntaxKind::FinallyKw if self.in_try => break,
                _ => {}
            }
            if self.termination.contains(TerminatorState::IS_SWITCH_SECTION_START)
                && self.is_switch_section_start()
            {
                break;
            }

            let before = self.tokens.position();
            if self.is_possible_statement() {
                self.parse_statement();
            }
            if self.tokens.position() != before {
                continue;
            }
            if self.is_possible_statement() {
                self.skip_tokens_while("expected statement", |_| false);
            } else if self.skip_bad_list_tokens(
                |p| p.at(SyntaxKind::RBrace) || p.is_possible_statement(),
                "expected statement",
            ) == PostSkipAction::Abort
            {
                break;
            }
        }
        self.restore_termination(saved);
    }

    pub(super) fn parse_statement(&mut self) {
        if !self.enter() {
            return;
        }
        self.parse_statement_core();
        self.leave();
    }

    fn parse_statement_core(&mut self) {
        match self.current() {
            SyntaxKind::LBrace => self.parse_block(),
            SyntaxKind::Semicolon => {
                self.builder.start_node(SyntaxKind::EmptyStatement);
                self.bump();
                self.builder.finish_node();
            }
            SyntaxKind::IfKw => self.parse_if_statement(),
            SyntaxKind::WhileKw => self.parse_while_statement(),
            SyntaxKind::DoKw => self.parse_do_statement(),
            SyntaxKind::ForKw => self.parse_for_statement(),
            SyntaxKind::ForeachKw => self.parse_foreach_statement(),
            SyntaxKind::AwaitKw if self.nth_at(1, SyntaxKind::ForeachKw) => {
                self.parse_foreach_statement()
            }
            SyntaxKind::AwaitKw if self.nth_at(1, SyntaxKind::UsingKw) => {
                self.parse_using_statement()
            }
            SyntaxKind::BreakKw => self.parse_keyword_statement(SyntaxKind::BreakStatement),
            SyntaxKind::ContinueKw => self.parse_keyword_statement(SyntaxKind::ContinueStatement),
            SyntaxKind::ReturnKw => self.parse_optional_expression_statement(SyntaxKind::ReturnStatement),
            SyntaxKind::ThrowKw => self.parse_optional_expression_statement(SyntaxKind::ThrowStatement),
            SyntaxKind::YieldKw if self.nth_at(1, SyntaxKind::ReturnKw) => {
                self.builder.start_node(SyntaxKind::YieldReturnStatement);
                self.bump();
                self.bump();
                self.parse_expression();
                self.expect_semicolon();
                self.builder.finish_node();
            }
            SyntaxKind::YieldKw if self.nth_at(1, SyntaxKind::BreakKw) => {
                self.builder.start_node(SyntaxKind::YieldBreakStatement);
                self.bump();
                self.bump();
                self.expect_semicolon();
                self.builder.finish_node();
            }
            SyntaxKind::GotoKw => self.parse_goto_statement(),
            SyntaxKind::TryKw => self.parse_try_statement(),
            SyntaxKind::SwitchKw => self.parse_switch_statement(),
            SyntaxKind::UsingKw => self.parse_using_statement(),
            SyntaxKind::LockKw => {
                self.builder.start_node(SyntaxKind::LockStatement);
                self.bump();
                self.parse_parenthesized_condition();
                self.parse_embedded_statement();
                self.builder.finish_node();
            }
            SyntaxKind::CheckedKw | SyntaxKind::UncheckedKw
                if self.nth_at(1, SyntaxKind::LBrace) =>
            {
                self.builder.start_node(SyntaxKind::CheckedStatement);
                self.bump();
                self.parse_block();
                self.builder.finish_node();
            }
            SyntaxKind::UnsafeKw if self.nth_at(1, SyntaxKind::LBrace) => {
                self.builder.start_node(SyntaxKind::UnsafeStatement);
                self.bump();
                self.parse_block();
                self.builder.finish_node();
            }
            SyntaxKind::FixedKw => self.parse_fixed_statement(),
            _ if self.at_identifier() && self.nth_at(1, SyntaxKind::Colon) => {
                self.builder.start_node(SyntaxKind::LabeledStatement);
                self.bump();
                self.bump();
                self.parse_statement();
                self.builder.finish_node();
            }
            _ => self.parse_local_declaration_or_expression_statement(),
        }
    }

    /// The statement of an `if`, loop, `lock`, `using` or `fixed`. Anything that
    /// cannot start a statement leaves a missing empty statement behind.
    fn parse_embedded_statement(&mut self) {
        if self.is_possible_statement() {
            self.parse_statement();
        } else {
            self.builder.start_node(SyntaxKind::EmptyStatement);
            self.missing(SyntaxKind::Semicolon, "expected statement");
            self.builder.finish_node();
        }
    }

    pub(super) fn expect_semicolon(&mut self) {
        self.expect(SyntaxKind::Semicolon, "expected `;`");
    }

    fn parse_keyword_statement(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind);
        self.bump();
        self.expect_semicolon();
        self.builder.finish_node();
    }

    fn parse_optional_expression_statement(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind);
        self.bump();
        if !self.at(SyntaxKind::Semicolon) && can_start_expression(self.current()) {
            self.parse_expression();
        }
        self.expect_semicolon();
        self.builder.finish_node();
    }

    fn parse_parenthesized_condition(&mut self) {
        self.expect(SyntaxKind::LParen, "expected `(`");
        self.parse_expression();
        self.expect(SyntaxKind::RParen, "expected `)`");
    }

    /// `else if` chains are built iteratively so their length does not count
    /// against the recursion guard.
    fn parse_if_statement(&mut self) {
        let mut open = 0;
        loop {
            self.builder.start_node(SyntaxKind::IfStatement);
            open += 1;
            self.bump();
            self.parse_parenthesized_condition();
            self.parse_embedded_statement();
            if !self.at(SyntaxKind::ElseKw) {
                break;
            }
            self.builder.start_node(SyntaxKind::ElseClause);
            open += 1;
            self.bump();
            if !self.at(SyntaxKind::IfKw) {
                self.parse_embedded_statement();
                break;
            }
        }
        for _ in 0..open {
            self.builder.finish_node();
        }
    }

    fn parse_while_statement(&mut self) {
        self.builder.start_node(SyntaxKind::WhileStatement);
        self.bump();
        self.parse_parenthesized_condition();
        self.parse_embedded_statement();
        self.builder.finish_node();
    }

    fn parse_do_statement(&mut self) {
        self.builder.start_node(SyntaxKind::DoStatement);
        self.bump();
        self.parse_embedded_statement();
        self.expect(SyntaxKind::WhileKw, "expected `while`");
        let saved = self.push_termination(TerminatorState::IS_END_OF_DO_WHILE_EXPRESSION);
        self.parse_parenthesized_condition();
        self.restore_termination(saved);
        self.expect_semicolon();
        self.builder.finish_node();
    }

    fn parse_for_statement(&mut self) {
        self.builder.start_node(SyntaxKind::ForStatement);
        self.bump();
        self.expect(SyntaxKind::LParen, "expected `(`");

        let saved = self.push_termination(TerminatorState::IS_END_OF_FOR_STATEMENT_ARGUMENT);
        if !self.at(SyntaxKind::Semicolon) {
            if self.scan_local_shape() == Some(LocalShape::Declaration) {
                self.parse_variable_declaration();
            } else {
                self.parse_expression_list();
            }
        }
        self.expect(SyntaxKind::Semicolon, "expected `;`");
        if !self.at(SyntaxKind::Semicolon) {
            self.parse_expression();
        }
        self.expect(SyntaxKind::Semicolon, "expected `;`");
        if !self.at(SyntaxKind::RParen) {
            self.parse_expression_list();
        }
        self.restore_termination(saved);

        self.expect(SyntaxKind::RParen, "expected `)`");
        self.parse_embedded_statement();
        self.builder.finish_node();
    }

    fn parse_expression_list(&mut self) {
        loop {
            self.parse_expression();
            if !self.bump_if(SyntaxKind::Comma) {
                break;
            }
        }
    }

    fn parse_foreach_statement(&mut self) {
        self.builder.start_node(SyntaxKind::ForEachStatement);
        self.bump_if(SyntaxKind::AwaitKw);
        self.bump();
        self.expect(SyntaxKind::LParen, "expected `(`");
        self.parse_type(TypeMode::Normal);
        self.expect_identifier("expected loop variable name");
        self.expect(SyntaxKind::InKw, "expected `in`");
        self.parse_expression();
        self.expect(SyntaxKind::RParen, "expected `)`");
        self.parse_embedded_statement();
        self.builder.finish_node();
    }

    fn parse_goto_statement(&mut self) {
        let kind = match self.nth(1) {
            SyntaxKind::CaseKw => SyntaxKind::GotoCaseStatement,
            SyntaxKind::DefaultKw => SyntaxKind::GotoDefaultStatement,
            _ => SyntaxKind::GotoStatement,
        };
        self.builder.start_node(kind);
        self.bump();
        match kind {
            SyntaxKind::GotoCaseStatement => {
                self.bump();
                self.parse_expression();
            }
            SyntaxKind::GotoDefaultStatement => self.bump(),
            _ => {
                self.builder.start_node(SyntaxKind::IdentifierName);
                self.expect_identifier("expected label name");
                self.builder.finish_node();
            }
        }
        self.expect_semicolon();
        self.builder.finish_node();
    }

    fn parse_try_statement(&mut self) {
        self.builder.start_node(SyntaxKind::TryStatement);
        self.bump();

        let saved_in_try = self.in_try;
        self.in_try = true;
        let saved = self.push_termination(TerminatorState::IS_END_OF_TRY_BLOCK);
        self.parse_block();
        self.restore_termination(saved);
        self.in_try = saved_in_try;

        let mut has_handler = false;
        while self.at(SyntaxKind::CatchKw) {
            has_handler = true;
            self.parse_catch_clause();
        }
        if self.at(SyntaxKind::FinallyKw) {
            has_handler = true;
            self.builder.start_node(SyntaxKind::FinallyClause);
            self.bump();
            self.parse_block();
            self.builder.finish_node();
        }
        if !has_handler {
            let offset = self.last_token_end();
            self.error_range(offset, offset, "expected `catch` or `finally`");
        }
        self.builder.finish_node();
    }

    fn parse_catch_clause(&mut self) {
        self.builder.start_node(SyntaxKind::CatchClause);
        self.bump();

        if self.at(SyntaxKind::LParen) {
            self.builder.start_node(SyntaxKind::CatchDeclaration);
            self.bump();
            let saved = self.push_termination(TerminatorState::IS_END_OF_CATCH_CLAUSE);
            self.parse_type(TypeMode::Normal);
            if self.at_identifier() {
                self.bump();
            }
            self.restore_termination(saved);
            self.expect(SyntaxKind::RParen, "expected `)`");
            self.builder.finish_node();
        }

        if self.at(SyntaxKind::WhenKw) {
            self.builder.start_node(SyntaxKind::CatchFilterClause);
            self.bump();
            self.expect(SyntaxKind::LParen, "expected `(`");
            let saved = self.push_termination(TerminatorState::IS_END_OF_FILTER_CLAUSE);
            self.parse_expression();
            self.restore_termination(saved);
            self.expect(SyntaxKind::RParen, "expected `)`");
            self.builder.finish_node();
        }

        let saved = self.push_termination(TerminatorState::IS_END_OF_CATCH_BLOCK);
        self.parse_block();
        self.restore_termination(saved);
        self.builder.finish_node();
    }

    fn parse_switch_statement(&mut self) {
        self.builder.start_node(SyntaxKind::SwitchStatement);
        self.bump();
        self.parse_parenthesized_condition();
        self.expect(SyntaxKind::LBrace, "expected `{`");

        let saved = self.push_termination(TerminatorState::IS_SWITCH_SECTION_START);
        loop {
            if self.at(SyntaxKind::RBrace) || self.at(SyntaxKind::Eof) {
                break;
            }
            if self.is_switch_section_start() {
                self.parse_switch_section();
                continue;
            }
            if self.skip_bad_list_tokens(
                |p| p.at(SyntaxKind::RBrace) || p.is_switch_section_start(),
                "expected `case` or `default`",
            ) == PostSkipAction::Abort
            {
                break;
            }
        }
        self.restore_termination(saved);

        self.expect(SyntaxKind::RBrace, "expected `}`");
        self.builder.finish_node();
    }

    fn parse_switch_section(&mut self) {
        self.builder.start_node(SyntaxKind::SwitchSection);
        while self.is_switch_section_start() {
            if self.at(SyntaxKind::CaseKw) {
                self.builder.start_node(SyntaxKind::CasePatternSwitchLabel);
                self.bump();
                self.parse_pattern();
                if self.at(SyntaxKind::WhenKw) {
                    self.parse_when_clause();
                }
            } else {
                self.builder.start_node(SyntaxKind::DefaultSwitchLabel);
                self.bump();
            }
            self.expect(SyntaxKind::Colon, "expected `:`");
            self.builder.finish_node();
        }
        self.parse_statement_list();
        self.builder.finish_node();
    }

    /// `using (resource) statement`, or a `using` local declaration.
    fn parse_using_statement(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.bump_if(SyntaxKind::AwaitKw);
        self.bump();

        if self.at(SyntaxKind::LParen) {
            self.bump();
            if self.scan_local_shape() == Some(LocalShape::Declaration) {
                self.parse_variable_declaration();
            } else {
                self.parse_expression();
            }
            self.expect(SyntaxKind::RParen, "expected `)`");
            self.parse_embedded_statement();
            self.builder.start_node_at(checkpoint, SyntaxKind::UsingStatement);
        } else {
            self.parse_variable_declaration();
            self.expect_semicolon();
            self.builder.start_node_at(checkpoint, SyntaxKind::LocalDeclarationStatement);
        }
        self.builder.finish_node();
    }

    fn parse_fixed_statement(&mut self) {
        self.builder.start_node(SyntaxKind::FixedStatement);
        self.bump();
        self.expect(SyntaxKind::LParen, "expected `(`");
        let saved = self.push_termination(TerminatorState::IS_END_OF_FIXED_STATEMENT);
        self.parse_variable_declaration();
        self.restore_termination(saved);
        self.expect(SyntaxKind::RParen, "expected `)`");
        self.parse_embedded_statement();
        self.builder.finish_node();
    }

    // --- declarations vs. expressions ---

    fn parse_local_declaration_or_expression_statement(&mut self) {
        if self.is_await_expression() {
            self.parse_checked_expression_statement();
            return;
        }
        if self.scan_local_shape().is_some() {
            self.parse_local_declaration_or_function();
            return;
        }
        if !self.at_declaration_start() || !self.looks_like_declaration_prefix() {
            self.parse_checked_expression_statement();
            return;
        }

        let point = self.checkpoint();
        let errors_before = self.errors.len();
        let invalid = self.parse_expression_statement();
        if self.errors.len() > errors_before && self.halt.is_none() {
            tracing::trace!(
                offset = self.current_range().start,
                "expression statement failed, retrying as declaration"
            );
            self.rewind(&point);
            self.release(point);
            self.parse_local_declaration_or_function();
            return;
        }
        self.release(point);
        if let Some(range) = invalid {
            self.error_range(range.start, range.end, NOT_A_STATEMENT);
        }
    }

    /// `[modifiers] [ref] Type name`: the part both readings share.
    fn looks_like_declaration_prefix(&mut self) -> bool {
        self.lookahead(|p| {
            p.skip_local_modifiers_scan();
            if p.at(SyntaxKind::RefKw) {
                p.advance_scan();
                if p.at(SyntaxKind::ReadonlyKw) {
                    p.advance_scan();
                }
            }
            p.scan_type_core(ScanMode::Normal).is_type() && p.at_identifier()
        })
    }

    fn skip_local_modifiers_scan(&mut self) {
        while self.at_local_modifier() {
            self.advance_scan();
        }
    }

    fn at_local_modifier(&self) -> bool {
        match self.current() {
            SyntaxKind::ConstKw | SyntaxKind::StaticKw | SyntaxKind::ExternKw => true,
            SyntaxKind::UnsafeKw => !self.nth_at(1, SyntaxKind::LBrace),
            SyntaxKind::ReadonlyKw => self.nth_at(1, SyntaxKind::RefKw),
            SyntaxKind::AsyncKw | SyntaxKind::ScopedKw => {
                self.nth_is_identifier(1)
                    || self.nth(1).is_predefined_type()
                    || self.nth_at(1, SyntaxKind::RefKw)
            }
            _ => false,
        }
    }

    fn parse_checked_expression_statement(&mut self) {
        if let Some(range) = self.parse_expression_statement() {
            self.error_range(range.start, range.end, NOT_A_STATEMENT);
        }
    }

    /// Parses `expr ;`. Returns the expression's range when it is not allowed
    /// as a statement; the caller decides whether to report it.
    fn parse_expression_statement(&mut self) -> Option<TextRange> {
        self.builder.start_node(SyntaxKind::ExpressionStatement);
        let start = self.current_range().start;
        self.parse_expression();
        let valid = self
            .builder
            .last_node()
            .map_or(true, |node| is_statement_expression(node));
        let end = self.last_token_end().max(start);
        self.expect_semicolon();
        self.builder.finish_node();
        (!valid).then_some(TextRange { start, end })
    }

    pub(super) fn parse_local_declaration_or_function(&mut self) {
        let checkpoint = self.builder.checkpoint();

        let modifiers = self.builder.checkpoint();
        let mut is_async = false;
        let mut any = false;
        while self.at_local_modifier() {
            is_async |= self.at(SyntaxKind::AsyncKw);
            any = true;
            self.bump();
        }
        if any {
            self.builder.start_node_at(modifiers, SyntaxKind::Modifiers);
            self.builder.finish_node();
        }

        let declaration = self.builder.checkpoint();
        self.parse_type(TypeMode::Normal);

        if self.at_identifier()
            && matches!(self.nth(1), SyntaxKind::LParen | SyntaxKind::Less)
        {
            self.bump();
            if self.at(SyntaxKind::Less) {
                self.parse_type_parameter_list();
            }
            self.parse_parameter_list();
            self.parse_constraint_clauses();
            self.parse_body_or_semicolon(is_async);
            self.builder.start_node_at(checkpoint, SyntaxKind::LocalFunctionStatement);
        } else {
            self.parse_variable_declarators();
            self.builder.start_node_at(declaration, SyntaxKind::VariableDeclaration);
            self.builder.finish_node();
            self.expect_semicolon();
            self.builder.start_node_at(checkpoint, SyntaxKind::LocalDeclarationStatement);
        }
        self.builder.finish_node();
    }

    pub(super) fn parse_variable_declaration(&mut self) {
        self.builder.start_node(SyntaxKind::VariableDeclaration);
        self.parse_type(TypeMode::Normal);
        self.parse_variable_declarators();
        self.builder.finish_node();
    }

    pub(super) fn parse_variable_declarators(&mut self) {
        let saved = self.push_termination(TerminatorState::IS_POSSIBLE_END_OF_VARIABLE_DECLARATION);
        loop {
            self.builder.start_node(SyntaxKind::VariableDeclarator);
            self.expect_identifier("expected variable name");
            if self.at(SyntaxKind::LBracket) {
                self.parse_bracketed_argument_list();
            }
            if self.at(SyntaxKind::Eq) {
                self.parse_equals_value_clause();
            }
            self.builder.finish_node();
            if !self.bump_if(SyntaxKind::Comma) {
                break;
            }
        }
        self.restore_termination(saved);
    }

    pub(super) fn parse_equals_value_clause(&mut self) {
        self.builder.start_node(SyntaxKind::EqualsValueClause);
        self.bump();
        if self.at(SyntaxKind::LBrace) {
            self.parse_initializer_expression();
        } else {
            self.parse_expression();
        }
        self.builder.finish_node();
    }
}

/// Whether `node` may stand alone as an expression statement. Missing
/// expressions pass; they already carry a diagnostic.
fn is_statement_expression(node: &GreenNodeData) -> bool {
    if u32::from(node.text_len()) == 0 {
        return true;
    }
    match SableLanguage::kind_from_raw(node.kind()) {
        SyntaxKind::InvocationExpression
        | SyntaxKind::AssignmentExpression
        | SyntaxKind::AwaitExpression
        | SyntaxKind::ObjectCreationExpression
        | SyntaxKind::ImplicitObjectCreationExpression
        | SyntaxKind::ThrowExpression => true,
        SyntaxKind::PrefixUnaryExpression => {
            matches!(operator_token(node, true), Some(SyntaxKind::PlusPlus | SyntaxKind::MinusMinus))
        }
        SyntaxKind::PostfixUnaryExpression => {
            matches!(operator_token(node, false), Some(SyntaxKind::PlusPlus | SyntaxKind::MinusMinus))
        }
        SyntaxKind::ConditionalAccessExpression => node
            .children()
            .filter_map(NodeOrToken::into_node)
            .last()
            .is_some_and(is_statement_expression),
        _ => false,
    }
}

fn operator_token(node: &GreenNodeData, first: bool) -> Option<SyntaxKind> {
    let mut tokens = node
        .children()
        .filter_map(NodeOrToken::into_token)
        .map(|token| SableLanguage::kind_from_raw(token.kind()))
        .filter(|kind| !kind.is_trivia());
    if first {
        tokens.next()
    } else {
        tokens.last()
    }
}
