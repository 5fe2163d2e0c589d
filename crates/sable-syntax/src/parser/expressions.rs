use super::builder::Checkpoint;
use super::scanner::can_start_expression;
use super::termination::TerminatorState;
use super::types::{SeparatedList, TypeMode};
use super::Parser;
use crate::SyntaxKind;

/// Binding strength of expression operators, lowest first.
///
/// The climbing loop in [`Parser::parse_sub_expression`] only takes an operator
/// whose precedence is at least the one it was entered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Precedence {
    Expression = 0,
    Conditional,
    Coalescing,
    ConditionalOr,
    ConditionalAnd,
    LogicalOr,
    LogicalXor,
    LogicalAnd,
    Equality,
    Relational,
    Shift,
    Range,
    Additive,
    Multiplicative,
    Switch,
    Unary,
    Cast,
    PointerIndirection,
    AddressOf,
    Primary,
}

/// Precedence of a binary operator token, or `None` for anything else.
///
/// `RightShift` only ever appears here after two adjacent `>` have been joined.
pub fn binary_precedence(op: SyntaxKind) -> Option<Precedence> {
    let precedence = match op {
        SyntaxKind::QuestionQuestion => Precedence::Coalescing,
        SyntaxKind::PipePipe => Precedence::ConditionalOr,
        SyntaxKind::AmpAmp => Precedence::ConditionalAnd,
        SyntaxKind::Pipe => Precedence::LogicalOr,
        SyntaxKind::Caret => Precedence::LogicalXor,
        SyntaxKind::Amp => Precedence::LogicalAnd,
        SyntaxKind::EqEq | SyntaxKind::BangEq => Precedence::Equality,
        SyntaxKind::Less
        | SyntaxKind::Greater
        | SyntaxKind::LessEq
        | SyntaxKind::GreaterEq
        | SyntaxKind::IsKw
        | SyntaxKind::AsKw => Precedence::Relational,
        SyntaxKind::LeftShift | SyntaxKind::RightShift => Precedence::Shift,
        SyntaxKind::Plus | SyntaxKind::Minus => Precedence::Additive,
        SyntaxKind::Star | SyntaxKind::Slash | SyntaxKind::Percent => Precedence::Multiplicative,
        _ => return None,
    };
    Some(precedence)
}

/// Assignments and `??` group to the right; every other binary operator to the left.
pub fn is_right_associative(op: SyntaxKind) -> bool {
    op.is_assignment_operator() || op == SyntaxKind::QuestionQuestion
}

/// What [`Parser::parse_term`] left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Term {
    /// A primary expression that postfix operators may extend.
    Primary,
    /// A cast or similar form whose operand already consumed any postfix chain.
    Complete,
}

impl Parser<'_> {
    pub(super) fn parse_expression(&mut self) {
        self.parse_sub_expression(Precedence::Expression);
    }

    pub(super) fn parse_sub_expression(&mut self, precedence: Precedence) {
        if !self.enter() {
            return;
        }
        self.parse_sub_expression_core(precedence);
        self.leave();
    }

    fn parse_sub_expression_core(&mut self, precedence: Precedence) {
        let checkpoint = self.builder.checkpoint();

        if self.is_lambda_start() {
            // A lambda body extends as far right as possible.
            self.parse_lambda_expression();
            return;
        }
        if self.is_query_expression_start() {
            self.parse_query_expression();
        } else {
            self.parse_unary_or_term();
        }
        self.parse_expression_continued(checkpoint, precedence);
    }

    fn parse_unary_or_term(&mut self) {
        let kind = self.current();
        match kind {
            SyntaxKind::Plus
            | SyntaxKind::Minus
            | SyntaxKind::Bang
            | SyntaxKind::Tilde
            | SyntaxKind::PlusPlus
            | SyntaxKind::MinusMinus
            | SyntaxKind::Amp
            | SyntaxKind::Star
            | SyntaxKind::Caret => {
                let operand = match kind {
                    SyntaxKind::Amp => Precedence::AddressOf,
                    SyntaxKind::Star => Precedence::PointerIndirection,
                    _ => Precedence::Unary,
                };
                self.builder.start_node(SyntaxKind::PrefixUnaryExpression);
                self.bump();
                self.parse_sub_expression(operand);
                self.builder.finish_node();
            }
            SyntaxKind::DotDot => {
                self.builder.start_node(SyntaxKind::RangeExpression);
                self.bump();
                if can_start_expression(self.current()) {
                    self.parse_sub_expression(Precedence::Range);
                }
                self.builder.finish_node();
            }
            SyntaxKind::AwaitKw if self.is_await_expression() => {
                let range = self.current_range();
                if !self.in_async {
                    self.error_range(
                        range.start,
                        range.end,
                        "`await` can only be used within an async method or lambda",
                    );
                }
                self.builder.start_node(SyntaxKind::AwaitExpression);
                self.bump();
                self.parse_sub_expression(Precedence::Unary);
                self.builder.finish_node();
            }
            SyntaxKind::ThrowKw => {
                self.builder.start_node(SyntaxKind::ThrowExpression);
                self.bump();
                self.parse_sub_expression(Precedence::Coalescing);
                self.builder.finish_node();
            }
            SyntaxKind::RefKw => {
                self.builder.start_node(SyntaxKind::RefExpression);
                self.bump();
                self.parse_sub_expression(Precedence::Unary);
                self.builder.finish_node();
            }
            _ => self.parse_term(),
        }
    }

    /// `await` reads as an operator inside async code, or outside it when an
    /// operand-looking token follows. Anywhere else it is an identifier.
    pub(super) fn is_await_expression(&self) -> bool {
        if !self.at(SyntaxKind::AwaitKw) {
            return false;
        }
        if self.in_async {
            return true;
        }
        let next = self.nth(1);
        (next.is_identifier_like() && !matches!(next, SyntaxKind::AndKw | SyntaxKind::OrKw))
            || next.is_literal()
            || next.is_predefined_type()
            || matches!(
                next,
                SyntaxKind::NewKw
                    | SyntaxKind::ThisKw
                    | SyntaxKind::BaseKw
                    | SyntaxKind::TypeofKw
                    | SyntaxKind::DefaultKw
            )
    }

    fn parse_expression_continued(&mut self, checkpoint: Checkpoint, precedence: Precedence) {
        loop {
            let (op, width) = self.current_operator();
            let new_precedence = if op.is_assignment_operator() {
                Precedence::Expression
            } else {
                match op {
                    SyntaxKind::SwitchKw | SyntaxKind::WithKw
                        if self.nth_at(width, SyntaxKind::LBrace) =>
                    {
                        Precedence::Switch
                    }
                    SyntaxKind::DotDot => Precedence::Range,
                    _ => match binary_precedence(op) {
                        Some(p) => p,
                        None => break,
                    },
                }
            };

            if new_precedence < precedence {
                break;
            }
            if new_precedence == precedence && !is_right_associative(op) {
                break;
            }

            match op {
                SyntaxKind::SwitchKw => self.parse_switch_expression(checkpoint),
                SyntaxKind::WithKw => {
                    self.builder.start_node_at(checkpoint, SyntaxKind::WithExpression);
                    self.bump();
                    self.parse_initializer_expression();
                    self.builder.finish_node();
                }
                SyntaxKind::IsKw => {
                    self.builder.start_node_at(checkpoint, SyntaxKind::IsPatternExpression);
                    self.bump();
                    self.parse_pattern();
                    self.builder.finish_node();
                }
                SyntaxKind::AsKw => {
                    self.builder.start_node_at(checkpoint, SyntaxKind::BinaryExpression);
                    self.bump();
                    self.parse_type(TypeMode::AfterIsOrPattern);
                    self.builder.finish_node();
                }
                SyntaxKind::DotDot => {
                    self.builder.start_node_at(checkpoint, SyntaxKind::RangeExpression);
                    self.bump();
                    if can_start_expression(self.current()) {
                        self.parse_sub_expression(Precedence::Range);
                    }
                    self.builder.finish_node();
                }
                _ => {
                    let kind = if op.is_assignment_operator() {
                        SyntaxKind::AssignmentExpression
                    } else {
                        SyntaxKind::BinaryExpression
                    };
                    self.builder.start_node_at(checkpoint, kind);
                    if width == 1 {
                        self.bump();
                    } else {
                        self.bump_joined(op, width);
                    }
                    self.parse_sub_expression(new_precedence);
                    self.builder.finish_node();
                }
            }
        }

        if self.at(SyntaxKind::Question) && precedence <= Precedence::Conditional {
            self.builder.start_node_at(checkpoint, SyntaxKind::ConditionalExpression);
            self.bump();
            self.parse_expression();
            self.expect(SyntaxKind::Colon, "expected `:` in conditional expression");
            self.parse_expression();
            self.builder.finish_node();
        }
    }

    /// The operator under the cursor, joining `>` `>` and `>` `>=` when adjacent.
    /// Returns the operator kind and how many tokens it spans.
    fn current_operator(&self) -> (SyntaxKind, usize) {
        match self.current() {
            SyntaxKind::Greater
                if self.nth_at(1, SyntaxKind::Greater) && self.tokens.is_adjacent(0) =>
            {
                (SyntaxKind::RightShift, 2)
            }
            SyntaxKind::Greater
                if self.nth_at(1, SyntaxKind::GreaterEq) && self.tokens.is_adjacent(0) =>
            {
                (SyntaxKind::RightShiftEq, 2)
            }
            kind => (kind, 1),
        }
    }

    // --- terms ---

    fn parse_term(&mut self) {
        let checkpoint = self.builder.checkpoint();
        if self.parse_primary() == Term::Primary {
            self.parse_postfix_expression(checkpoint);
        }
    }

    fn parse_primary(&mut self) -> Term {
        let kind = self.current();
        match kind {
            SyntaxKind::DefaultKw if self.nth_at(1, SyntaxKind::LParen) => {
                self.builder.start_node(SyntaxKind::DefaultExpression);
                self.bump();
                self.bump();
                self.parse_type(TypeMode::Normal);
                self.expect(SyntaxKind::RParen, "expected `)`");
                self.builder.finish_node();
            }
            SyntaxKind::DefaultKw => self.parse_token_node(SyntaxKind::LiteralExpression),
            k if k.is_literal() => self.parse_token_node(SyntaxKind::LiteralExpression),
            SyntaxKind::ThisKw => self.parse_token_node(SyntaxKind::ThisExpression),
            SyntaxKind::BaseKw => self.parse_token_node(SyntaxKind::BaseExpression),
            SyntaxKind::TypeofKw | SyntaxKind::SizeofKw => {
                let node = if kind == SyntaxKind::TypeofKw {
                    SyntaxKind::TypeOfExpression
                } else {
                    SyntaxKind::SizeOfExpression
                };
                self.builder.start_node(node);
                self.bump();
                self.expect(SyntaxKind::LParen, "expected `(`");
                self.parse_type(TypeMode::Normal);
                self.expect(SyntaxKind::RParen, "expected `)`");
                self.builder.finish_node();
            }
            SyntaxKind::CheckedKw | SyntaxKind::UncheckedKw => {
                self.builder.start_node(SyntaxKind::CheckedExpression);
                self.bump();
                self.expect(SyntaxKind::LParen, "expected `(`");
                self.parse_expression();
                self.expect(SyntaxKind::RParen, "expected `)`");
                self.builder.finish_node();
            }
            SyntaxKind::NewKw => self.parse_new_expression(),
            SyntaxKind::DelegateKw => self.parse_anonymous_method(),
            SyntaxKind::LParen => return self.parse_parenthesized_term(),
            k if k.is_predefined_type() => {
                if !self.nth_at(1, SyntaxKind::Dot) {
                    let message = format!(
                        "`{}` is a type and cannot be used as an expression",
                        self.current_text()
                    );
                    self.error_here(&message);
                }
                self.parse_token_node(SyntaxKind::PredefinedType);
            }
            _ if self.at_identifier() && self.nth_at(1, SyntaxKind::ColonColon) => {
                let checkpoint = self.builder.checkpoint();
                self.parse_token_node(SyntaxKind::IdentifierName);
                self.bump();
                self.parse_simple_name_in_expression();
                self.builder.start_node_at(checkpoint, SyntaxKind::AliasQualifiedName);
                self.builder.finish_node();
            }
            _ if self.at_identifier() => self.parse_simple_name_in_expression(),
            _ => {
                self.missing_expression();
                return Term::Complete;
            }
        }
        Term::Primary
    }

    fn parse_token_node(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind);
        self.bump();
        self.builder.finish_node();
    }

    pub(super) fn missing_expression(&mut self) {
        self.builder.start_node(SyntaxKind::IdentifierName);
        self.missing(SyntaxKind::Identifier, "expected expression");
        self.builder.finish_node();
    }

    fn parse_simple_name_in_expression(&mut self) {
        if self.at_identifier() && self.is_generic_name_in_expression() {
            self.builder.start_node(SyntaxKind::GenericName);
            self.bump();
            self.parse_type_argument_list();
            self.builder.finish_node();
        } else {
            self.builder.start_node(SyntaxKind::IdentifierName);
            self.expect_identifier("expected identifier");
            self.builder.finish_node();
        }
    }

    fn parse_postfix_expression(&mut self, checkpoint: Checkpoint) {
        loop {
            match self.current() {
                SyntaxKind::LParen => {
                    self.builder.start_node_at(checkpoint, SyntaxKind::InvocationExpression);
                    self.parse_argument_list();
                    self.builder.finish_node();
                }
                SyntaxKind::LBracket => {
                    self.builder.start_node_at(checkpoint, SyntaxKind::ElementAccessExpression);
                    self.parse_bracketed_argument_list();
                    self.builder.finish_node();
                }
                SyntaxKind::PlusPlus | SyntaxKind::MinusMinus | SyntaxKind::Bang => {
                    self.builder.start_node_at(checkpoint, SyntaxKind::PostfixUnaryExpression);
                    self.bump();
                    self.builder.finish_node();
                }
                SyntaxKind::Dot | SyntaxKind::Arrow | SyntaxKind::ColonColon => {
                    self.builder.start_node_at(checkpoint, SyntaxKind::MemberAccessExpression);
                    self.bump();
                    self.parse_simple_name_in_expression();
                    self.builder.finish_node();
                }
                SyntaxKind::Question
                    if matches!(self.nth(1), SyntaxKind::Dot | SyntaxKind::LBracket)
                        && self.tokens.is_adjacent(0) =>
                {
                    self.parse_conditional_access(checkpoint);
                }
                _ => break,
            }
        }
    }

    /// `a?.b.c` and `a?[i]`: everything after `?` hangs off a binding expression.
    fn parse_conditional_access(&mut self, checkpoint: Checkpoint) {
        self.builder.start_node_at(checkpoint, SyntaxKind::ConditionalAccessExpression);
        self.bump();
        if self.enter() {
            let binding = self.builder.checkpoint();
            if self.at(SyntaxKind::Dot) {
                self.builder.start_node(SyntaxKind::MemberBindingExpression);
                self.bump();
                self.parse_simple_name_in_expression();
                self.builder.finish_node();
            } else {
                self.builder.start_node(SyntaxKind::ElementBindingExpression);
                self.parse_bracketed_argument_list();
                self.builder.finish_node();
            }
            self.parse_postfix_expression(binding);
            self.leave();
        }
        self.builder.finish_node();
    }

    /// Cast, parenthesized expression or tuple; the cursor is on `(` and a
    /// parenthesized lambda has already been ruled out.
    fn parse_parenthesized_term(&mut self) -> Term {
        if self.scan_cast() {
            self.builder.start_node(SyntaxKind::CastExpression);
            self.bump();
            self.parse_type(TypeMode::Normal);
            self.expect(SyntaxKind::RParen, "expected `)`");
            self.parse_sub_expression(Precedence::Cast);
            self.builder.finish_node();
            return Term::Complete;
        }

        let checkpoint = self.builder.checkpoint();
        self.bump();

        let first = self.builder.checkpoint();
        let named = self.parse_name_colon_if_present();
        self.parse_expression_or_declaration();

        if named || self.at(SyntaxKind::Comma) {
            self.builder.start_node_at(first, SyntaxKind::Argument);
            self.builder.finish_node();
            while self.bump_if(SyntaxKind::Comma) {
                self.builder.start_node(SyntaxKind::Argument);
                self.parse_name_colon_if_present();
                self.parse_expression_or_declaration();
                self.builder.finish_node();
            }
            self.expect(SyntaxKind::RParen, "expected `)` to close tuple");
            self.builder.start_node_at(checkpoint, SyntaxKind::TupleExpression);
        } else {
            self.expect(SyntaxKind::RParen, "expected `)`");
            self.builder.start_node_at(checkpoint, SyntaxKind::ParenthesizedExpression);
        }
        self.builder.finish_node();
        Term::Primary
    }

    fn parse_name_colon_if_present(&mut self) -> bool {
        if !self.is_named_argument() {
            return false;
        }
        self.builder.start_node(SyntaxKind::NameColon);
        self.parse_token_node(SyntaxKind::IdentifierName);
        self.bump();
        self.builder.finish_node();
        true
    }

    /// `T name` inside a tuple or an `out` argument (as in `(int a, var b) = t`
    /// or `out var x`), else an ordinary expression.
    fn parse_expression_or_declaration(&mut self) {
        if self.at_type_start() && self.scan_declaration_expression() {
            self.builder.start_node(SyntaxKind::DeclarationExpression);
            self.parse_type(TypeMode::Normal);
            self.parse_designation();
            self.builder.finish_node();
        } else {
            self.parse_expression();
        }
    }

    pub(super) fn parse_designation(&mut self) {
        if self.at_discard() {
            self.parse_token_node(SyntaxKind::DiscardDesignation);
        } else {
            self.builder.start_node(SyntaxKind::SingleVariableDesignation);
            self.expect_identifier("expected variable name");
            self.builder.finish_node();
        }
    }

    // --- lambdas and anonymous methods ---

    fn is_lambda_start(&mut self) -> bool {
        match self.current() {
            _ if self.at_identifier() && self.nth_at(1, SyntaxKind::FatArrow) => true,
            SyntaxKind::AsyncKw => {
                (self.nth_is_identifier(1) && self.nth_at(2, SyntaxKind::FatArrow))
                    || self.nth_at(1, SyntaxKind::DelegateKw)
                    || (self.nth_at(1, SyntaxKind::LParen) && self.scan_parenthesized_lambda())
            }
            SyntaxKind::LParen => self.scan_parenthesized_lambda(),
            _ => false,
        }
    }

    fn parse_lambda_expression(&mut self) {
        if self.at(SyntaxKind::AsyncKw) && self.nth_at(1, SyntaxKind::DelegateKw) {
            let checkpoint = self.builder.checkpoint();
            self.parse_anonymous_method();
            self.parse_postfix_expression(checkpoint);
            return;
        }

        let checkpoint = self.builder.checkpoint();
        let is_async = self.at(SyntaxKind::AsyncKw) && !self.nth_at(1, SyntaxKind::FatArrow);
        if is_async {
            self.bump();
        }

        let kind = if self.at(SyntaxKind::LParen) {
            self.parse_lambda_parameter_list();
            SyntaxKind::ParenthesizedLambdaExpression
        } else {
            self.builder.start_node(SyntaxKind::Parameter);
            self.expect_identifier("expected parameter name");
            self.builder.finish_node();
            SyntaxKind::SimpleLambdaExpression
        };
        self.builder.start_node_at(checkpoint, kind);
        self.expect(SyntaxKind::FatArrow, "expected `=>`");
        self.parse_function_body(is_async, |p| {
            if p.at(SyntaxKind::LBrace) {
                p.parse_block();
            } else {
                p.parse_expression();
            }
        });
        self.builder.finish_node();
    }

    fn parse_anonymous_method(&mut self) {
        self.builder.start_node(SyntaxKind::AnonymousMethodExpression);
        let is_async = self.bump_if(SyntaxKind::AsyncKw);
        self.expect(SyntaxKind::DelegateKw, "expected `delegate`");
        if self.at(SyntaxKind::LParen) {
            self.parse_parameter_list();
        }
        if self.at(SyntaxKind::LBrace) {
            self.parse_function_body(is_async, |p| p.parse_block());
        } else {
            self.builder.start_node(SyntaxKind::Block);
            self.missing(SyntaxKind::LBrace, "expected `{`");
            self.builder.finish_node();
        }
        self.builder.finish_node();
    }

    /// Runs `body` with the flags of a fresh function: `in_async` from its
    /// modifier, no enclosing try block or query.
    pub(super) fn parse_function_body(&mut self, is_async: bool, body: impl FnOnce(&mut Self)) {
        let saved = (self.in_async, self.in_try, self.query_depth);
        self.in_async = is_async;
        self.in_try = false;
        self.query_depth = 0;
        body(self);
        (self.in_async, self.in_try, self.query_depth) = saved;
    }

    // --- object creation and initializers ---

    fn parse_new_expression(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.bump();

        match self.current() {
            SyntaxKind::LBrace => {
                self.parse_anonymous_object_members();
                self.builder
                    .start_node_at(checkpoint, SyntaxKind::AnonymousObjectCreationExpression);
            }
            SyntaxKind::LBracket => {
                self.bump();
                while self.bump_if(SyntaxKind::Comma) {}
                self.expect(SyntaxKind::RBracket, "expected `]`");
                if self.at(SyntaxKind::LBrace) {
                    self.parse_initializer_expression();
                } else {
                    let offset = self.last_token_end();
                    self.error_range(offset, offset, "expected array initializer");
                }
                self.builder
                    .start_node_at(checkpoint, SyntaxKind::ImplicitArrayCreationExpression);
            }
            SyntaxKind::LParen => {
                self.parse_argument_list();
                if self.at(SyntaxKind::LBrace) {
                    self.parse_initializer_expression();
                }
                self.builder
                    .start_node_at(checkpoint, SyntaxKind::ImplicitObjectCreationExpression);
            }
            _ => {
                let type_start = self.builder.checkpoint();
                self.parse_type(TypeMode::NewExpression);
                if self.at(SyntaxKind::LBracket) {
                    while self.at(SyntaxKind::LBracket) {
                        self.parse_array_rank_specifier(true);
                    }
                    self.builder.start_node_at(type_start, SyntaxKind::ArrayType);
                    self.builder.finish_node();
                    if self.at(SyntaxKind::LBrace) {
                        self.parse_initializer_expression();
                    }
                    self.builder.start_node_at(checkpoint, SyntaxKind::ArrayCreationExpression);
                } else {
                    let has_arguments = self.at(SyntaxKind::LParen);
                    if has_arguments {
                        self.parse_argument_list();
                    }
                    if self.at(SyntaxKind::LBrace) {
                        self.parse_initializer_expression();
                    } else if !has_arguments {
                        let offset = self.last_token_end();
                        self.error_range(offset, offset, "expected `(`, `[` or `{` after type");
                    }
                    self.builder.start_node_at(checkpoint, SyntaxKind::ObjectCreationExpression);
                }
            }
        }
        self.builder.finish_node();
    }

    fn parse_anonymous_object_members(&mut self) {
        self.bump();
        self.parse_separated_list(SeparatedList {
            close: SyntaxKind::RBrace,
            state: TerminatorState::empty(),
            is_element_start: |p| can_start_expression(p.current()),
            parse_element: |p| {
                p.builder.start_node(SyntaxKind::AnonymousObjectMemberDeclarator);
                if p.at_identifier() && p.nth_at(1, SyntaxKind::Eq) {
                    p.builder.start_node(SyntaxKind::NameEquals);
                    p.parse_token_node(SyntaxKind::IdentifierName);
                    p.bump();
                    p.builder.finish_node();
                }
                p.parse_expression();
                p.builder.finish_node();
            },
            expected: "expected member declarator",
            allow_trailing: true,
        });
        self.expect(SyntaxKind::RBrace, "expected `}`");
    }

    /// `{ a, b }`, `{ X = 1, Y = { 2 } }` and nested `{ { k, v } }`.
    pub(super) fn parse_initializer_expression(&mut self) {
        self.builder.start_node(SyntaxKind::InitializerExpression);
        self.expect(SyntaxKind::LBrace, "expected `{`");
        self.parse_separated_list(SeparatedList {
            close: SyntaxKind::RBrace,
            state: TerminatorState::empty(),
            is_element_start: |p| p.at(SyntaxKind::LBrace) || can_start_expression(p.current()),
            parse_element: Self::parse_initializer_element,
            expected: "expected initializer element",
            allow_trailing: true,
        });
        self.expect(SyntaxKind::RBrace, "expected `}`");
        self.builder.finish_node();
    }

    fn parse_initializer_element(&mut self) {
        if !self.enter() {
            return;
        }
        if self.at(SyntaxKind::LBrace) {
            self.parse_initializer_expression();
        } else if self.at_identifier()
            && self.nth_at(1, SyntaxKind::Eq)
            && self.nth_at(2, SyntaxKind::LBrace)
        {
            self.builder.start_node(SyntaxKind::AssignmentExpression);
            self.parse_token_node(SyntaxKind::IdentifierName);
            self.bump();
            self.parse_initializer_expression();
            self.builder.finish_node();
        } else {
            self.parse_expression();
        }
        self.leave();
    }

    // --- switch expressions ---

    fn parse_switch_expression(&mut self, checkpoint: Checkpoint) {
        self.builder.start_node_at(checkpoint, SyntaxKind::SwitchExpression);
        self.bump();
        self.expect(SyntaxKind::LBrace, "expected `{`");
        self.parse_separated_list(SeparatedList {
            close: SyntaxKind::RBrace,
            state: TerminatorState::empty(),
            is_element_start: Self::is_possible_pattern_start,
            parse_element: Self::parse_switch_expression_arm,
            expected: "expected switch arm",
            allow_trailing: true,
        });
        self.expect(SyntaxKind::RBrace, "expected `}` to close switch expression");
        self.builder.finish_node();
    }

    fn parse_switch_expression_arm(&mut self) {
        self.builder.start_node(SyntaxKind::SwitchExpressionArm);
        self.parse_pattern();
        if self.at(SyntaxKind::WhenKw) {
            self.parse_when_clause();
        }
        self.expect(SyntaxKind::FatArrow, "expected `=>`");
        self.parse_expression();
        self.builder.finish_node();
    }

    pub(super) fn parse_when_clause(&mut self) {
        self.builder.start_node(SyntaxKind::WhenClause);
        self.bump();
        self.parse_expression();
        self.builder.finish_node();
    }

    // --- argument lists ---

    pub(super) fn parse_argument_list(&mut self) {
        self.builder.start_node(SyntaxKind::ArgumentList);
        self.expect(SyntaxKind::LParen, "expected `(`");
        self.parse_arguments(SyntaxKind::RParen);
        self.expect(SyntaxKind::RParen, "expected `)` to close argument list");
        self.builder.finish_node();
    }

    pub(super) fn parse_bracketed_argument_list(&mut self) {
        self.builder.start_node(SyntaxKind::BracketedArgumentList);
        self.expect(SyntaxKind::LBracket, "expected `[`");
        self.parse_arguments(SyntaxKind::RBracket);
        self.expect(SyntaxKind::RBracket, "expected `]` to close argument list");
        self.builder.finish_node();
    }

    fn parse_arguments(&mut self, close: SyntaxKind) {
        self.parse_separated_list(SeparatedList {
            close,
            state: TerminatorState::IS_END_OF_ARGUMENT_LIST,
            is_element_start: Self::is_possible_argument,
            parse_element: Self::parse_argument,
            expected: "expected argument",
            allow_trailing: false,
        });
    }

    fn is_possible_argument(&self) -> bool {
        matches!(self.current(), SyntaxKind::OutKw | SyntaxKind::InKw)
            || can_start_expression(self.current())
    }

    fn parse_argument(&mut self) {
        self.builder.start_node(SyntaxKind::Argument);
        self.parse_name_colon_if_present();
        let is_out = self.at(SyntaxKind::OutKw);
        if matches!(
            self.current(),
            SyntaxKind::RefKw | SyntaxKind::OutKw | SyntaxKind::InKw
        ) {
            self.bump();
        }
        // Only `out` introduces a declaration; `F(a < b, c > d)` is two comparisons.
        if is_out {
            self.parse_expression_or_declaration();
        } else {
            self.parse_expression();
        }
        self.builder.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_is_ordered_lowest_first() {
        assert!(Precedence::Expression < Precedence::Conditional);
        assert!(Precedence::Shift < Precedence::Range);
        assert!(Precedence::Range < Precedence::Additive);
        assert!(Precedence::Unary < Precedence::Primary);
        assert_eq!(
            binary_precedence(SyntaxKind::Star),
            Some(Precedence::Multiplicative)
        );
        assert_eq!(binary_precedence(SyntaxKind::Question), None);
    }

    #[test]
    fn right_associative_operators() {
        assert!(is_right_associative(SyntaxKind::Eq));
        assert!(is_right_associative(SyntaxKind::QuestionQuestionEq));
        assert!(is_right_associative(SyntaxKind::RightShiftEq));
        assert!(is_right_associative(SyntaxKind::QuestionQuestion));
        assert!(!is_right_associative(SyntaxKind::Minus));
    }
}
