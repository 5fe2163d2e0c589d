use bitflags::bitflags;

use super::Parser;
use crate::SyntaxKind;

bitflags! {
    /// Stop conditions contributed by every construct currently being parsed.
    ///
    /// A list routine that meets a token it cannot use asks [`Parser::is_terminator`]
    /// whether some enclosing construct wants that token. If so, the list gives up
    /// without consuming anything and the outer construct resumes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub(crate) struct TerminatorState: u32 {
        const IS_NAMESPACE_MEMBER_START_OR_STOP = 1 << 0;
        const IS_ATTRIBUTE_DECLARATION_TERMINATOR = 1 << 1;
        const IS_POSSIBLE_AGGREGATE_CLAUSE_START_OR_STOP = 1 << 2;
        const IS_POSSIBLE_MEMBER_START_OR_STOP = 1 << 3;
        const IS_END_OF_RETURN_TYPE = 1 << 4;
        const IS_END_OF_PARAMETER_LIST = 1 << 5;
        const IS_END_OF_FIELD_DECLARATION = 1 << 6;
        const IS_POSSIBLE_END_OF_VARIABLE_DECLARATION = 1 << 7;
        const IS_END_OF_TYPE_ARGUMENT_LIST = 1 << 8;
        const IS_POSSIBLE_STATEMENT_START_OR_STOP = 1 << 9;
        const IS_END_OF_FIXED_STATEMENT = 1 << 10;
        const IS_END_OF_TRY_BLOCK = 1 << 11;
        const IS_END_OF_CATCH_CLAUSE = 1 << 12;
        const IS_END_OF_FILTER_CLAUSE = 1 << 13;
        const IS_END_OF_CATCH_BLOCK = 1 << 14;
        const IS_END_OF_DO_WHILE_EXPRESSION = 1 << 15;
        const IS_END_OF_FOR_STATEMENT_ARGUMENT = 1 << 16;
        const IS_END_OF_DECLARATION_CLAUSE = 1 << 17;
        const IS_END_OF_ARGUMENT_LIST = 1 << 18;
        const IS_SWITCH_SECTION_START = 1 << 19;
        const IS_END_OF_TYPE_PARAMETER_LIST = 1 << 20;
        const IS_END_OF_METHOD_SIGNATURE = 1 << 21;
        const IS_END_OF_NAME_IN_EXPLICIT_INTERFACE = 1 << 22;
        const IS_END_OF_RECORD_SIGNATURE = 1 << 23;
    }
}

/// What a list loop should do after [`Parser::skip_bad_list_tokens`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PostSkipAction {
    /// The current token can continue the list.
    Continue,
    /// An enclosing construct owns the current token; stop the list.
    Abort,
}

impl Parser<'_> {
    /// ORs `state` into the active stop conditions and returns the previous set.
    pub(super) fn push_termination(&mut self, state: TerminatorState) -> TerminatorState {
        let saved = self.termination;
        self.termination |= state;
        saved
    }

    pub(super) fn restore_termination(&mut self, saved: TerminatorState) {
        self.termination = saved;
    }

    pub(super) fn is_terminator(&self) -> bool {
        use TerminatorState as S;

        if self.at(SyntaxKind::Eof) {
            return true;
        }
        let state = self.termination;
        if state.is_empty() {
            return false;
        }
        let kind = self.current();

        (state.contains(S::IS_NAMESPACE_MEMBER_START_OR_STOP)
            && (kind == SyntaxKind::RBrace || self.is_possible_namespace_member_declaration()))
            || (state.contains(S::IS_ATTRIBUTE_DECLARATION_TERMINATOR)
                && (kind == SyntaxKind::RBracket || kind.is_identifier_like()))
            || (state.contains(S::IS_POSSIBLE_AGGREGATE_CLAUSE_START_OR_STOP)
                && matches!(
                    kind,
                    SyntaxKind::Colon
                        | SyntaxKind::LBrace
                        | SyntaxKind::Semicolon
                        | SyntaxKind::WhereKw
                ))
            || (state.contains(S::IS_POSSIBLE_MEMBER_START_OR_STOP)
                && (kind == SyntaxKind::RBrace || self.is_possible_member_start()))
            || (state.contains(S::IS_END_OF_RETURN_TYPE)
                && matches!(
                    kind,
                    SyntaxKind::LParen | SyntaxKind::LBrace | SyntaxKind::Semicolon
                ))
            || (state.contains(S::IS_END_OF_PARAMETER_LIST)
                && matches!(kind, SyntaxKind::RParen | SyntaxKind::RBracket))
            || (state.contains(S::IS_END_OF_FIELD_DECLARATION) && kind == SyntaxKind::Semicolon)
            || (state.contains(S::IS_POSSIBLE_END_OF_VARIABLE_DECLARATION)
                && matches!(kind, SyntaxKind::Comma | SyntaxKind::Semicolon))
            || (state.contains(S::IS_END_OF_TYPE_ARGUMENT_LIST) && kind == SyntaxKind::Greater)
            || (state.contains(S::IS_POSSIBLE_STATEMENT_START_OR_STOP)
                && (kind == SyntaxKind::Semicolon || self.is_possible_statement()))
            || (state.contains(S::IS_END_OF_FIXED_STATEMENT)
                && matches!(
                    kind,
                    SyntaxKind::RParen | SyntaxKind::LBrace | SyntaxKind::Semicolon
                ))
            || (state.contains(S::IS_END_OF_TRY_BLOCK)
                && matches!(
                    kind,
                    SyntaxKind::RBrace | SyntaxKind::CatchKw | SyntaxKind::FinallyKw
                ))
            || (state.contains(S::IS_END_OF_CATCH_CLAUSE)
                && matches!(
                    kind,
                    SyntaxKind::RParen
                        | SyntaxKind::LBrace
                        | SyntaxKind::RBrace
                        | SyntaxKind::CatchKw
                        | SyntaxKind::FinallyKw
                ))
            || (state.contains(S::IS_END_OF_FILTER_CLAUSE)
                && matches!(
                    kind,
                    SyntaxKind::LBrace
                        | SyntaxKind::RBrace
                        | SyntaxKind::CatchKw
                        | SyntaxKind::FinallyKw
                ))
            || (state.contains(S::IS_END_OF_CATCH_BLOCK)
                && matches!(
                    kind,
                    SyntaxKind::RBrace | SyntaxKind::CatchKw | SyntaxKind::FinallyKw
                ))
            || (state.contains(S::IS_END_OF_DO_WHILE_EXPRESSION)
                && matches!(kind, SyntaxKind::RParen | SyntaxKind::Semicolon))
            || (state.contains(S::IS_END_OF_FOR_STATEMENT_ARGUMENT)
                && matches!(
                    kind,
                    SyntaxKind::Semicolon | SyntaxKind::RParen | SyntaxKind::LBrace
                ))
            || (state.contains(S::IS_END_OF_DECLARATION_CLAUSE)
                && matches!(
                    kind,
                    SyntaxKind::Semicolon | SyntaxKind::RParen | SyntaxKind::Colon
                ))
            || (state.contains(S::IS_END_OF_ARGUMENT_LIST)
                && matches!(kind, SyntaxKind::RParen | SyntaxKind::RBracket))
            || (state.contains(S::IS_SWITCH_SECTION_START)
                && (kind == SyntaxKind::RBrace || self.is_switch_section_start()))
            || (state.contains(S::IS_END_OF_TYPE_PARAMETER_LIST)
                && matches!(
                    kind,
                    SyntaxKind::LParen
                        | SyntaxKind::Colon
                        | SyntaxKind::LBrace
                        | SyntaxKind::Semicolon
                        | SyntaxKind::WhereKw
                ))
            || (state.contains(S::IS_END_OF_METHOD_SIGNATURE)
                && matches!(
                    kind,
                    SyntaxKind::Semicolon | SyntaxKind::LBrace | SyntaxKind::FatArrow
                ))
            || (state.contains(S::IS_END_OF_NAME_IN_EXPLICIT_INTERFACE)
                && matches!(kind, SyntaxKind::Dot | SyntaxKind::ColonColon))
            || (state.contains(S::IS_END_OF_RECORD_SIGNATURE)
                && matches!(kind, SyntaxKind::Semicolon | SyntaxKind::LBrace))
    }

    /// Skips tokens a list cannot use.
    ///
    /// Returns `Abort` without consuming anything when an enclosing construct claims
    /// the current token. Otherwise the skipped run is wrapped in one `Error` node
    /// with a single diagnostic, and skipping stops at the first token for which
    /// `is_expected` holds or which is a terminator.
    pub(super) fn skip_bad_list_tokens(
        &mut self,
        is_expected: impl Fn(&Self) -> bool,
        message: &str,
    ) -> PostSkipAction {
        if self.is_terminator() {
            return PostSkipAction::Abort;
        }

        self.skip_tokens_while(message, |p| !is_expected(p) && !p.is_terminator());

        if is_expected(self) {
            PostSkipAction::Continue
        } else {
            PostSkipAction::Abort
        }
    }

    /// Wraps at least one token, then every following token while `more` holds, in an
    /// `Error` node with one diagnostic covering the run.
    pub(super) fn skip_tokens_while(&mut self, message: &str, more: impl Fn(&Self) -> bool) {
        if self.at(SyntaxKind::Eof) {
            return;
        }
        let start = self.current_range().start;
        self.builder.start_node(SyntaxKind::Error);
        loop {
            self.bump();
            if self.at(SyntaxKind::Eof) || !more(self) {
                break;
            }
        }
        self.builder.finish_node();
        let end = self.last_token_end();
        self.error_range(start, end, message);
    }

    pub(super) fn is_switch_section_start(&self) -> bool {
        match self.current() {
            SyntaxKind::CaseKw => true,
            SyntaxKind::DefaultKw => self.nth(1) != SyntaxKind::LParen,
            _ => false,
        }
    }
}
