use super::scanner::{can_start_expression, ScanMode};
use super::termination::{PostSkipAction, TerminatorState};
use super::types::{SeparatedList, TypeMode};
use super::Parser;
use crate::SyntaxKind;

/// Which construct owns a namespace-body loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum NamespaceBody {
    CompilationUnit,
    Block,
    FileScoped,
}

/// Where a member declaration appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MemberParent {
    Namespace,
    Type,
}

/// Sections of a namespace body, in the order they must appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    ExternAliases,
    Usings,
    GlobalAttributes,
    Members,
}

impl Parser<'_> {
    // --- namespace bodies ---

    pub(super) fn parse_namespace_body(&mut self, body: NamespaceBody) {
        let saved = self.push_termination(TerminatorState::IS_NAMESPACE_MEMBER_START_OR_STOP);
        let mut section = Section::ExternAliases;

        loop {
            let before = self.tokens.position();
            match self.current() {
                SyntaxKind::Eof => break,
                SyntaxKind::RBrace if body == NamespaceBody::Block => break,
                SyntaxKind::RBrace => {
                    self.skip_tokens_while("unexpected `}`", |_| false);
                }
                SyntaxKind::ExternKw if self.nth_at(1, SyntaxKind::AliasKw) => {
                    if section > Section::ExternAliases {
                        self.error_here("extern alias directives must precede all other elements");
                    }
                    self.parse_extern_alias_directive();
                }
                SyntaxKind::UsingKw | SyntaxKind::GlobalKw if self.is_using_directive() => {
                    if section == Section::Members {
                        self.error_here("using directives must precede all members");
                    }
                    section = section.max(Section::Usings);
                    self.parse_using_directive();
                }
                SyntaxKind::LBracket if self.at_global_attribute() => {
                    if section == Section::Members {
                        self.error_here("global attributes must precede all members");
                    }
                    section = section.max(Section::GlobalAttributes);
                    self.parse_attribute_list();
                }
                SyntaxKind::NamespaceKw => {
                    section = Section::Members;
                    self.parse_namespace_declaration(body);
                }
                _ => {
                    section = Section::Members;
                    self.parse_namespace_member(body);
                }
            }

            if self.tokens.position() == before && !self.at(SyntaxKind::Eof) {
                if self.at(SyntaxKind::RBrace) && body == NamespaceBody::Block {
                    break;
                }
                self.skip_tokens_while("expected namespace member", |_| false);
            }
            self.mark_resume_point();
        }
        self.restore_termination(saved);
    }

    fn parse_namespace_member(&mut self, body: NamespaceBody) {
        if body == NamespaceBody::CompilationUnit && self.is_global_statement_start() {
            self.builder.start_node(SyntaxKind::GlobalStatement);
            self.parse_function_body(true, |p| p.parse_statement());
            self.builder.finish_node();
            return;
        }
        if self.is_possible_member_start() || self.is_possible_namespace_member_declaration() {
            self.parse_member_declaration(MemberParent::Namespace);
            return;
        }
        let is_statement = body == NamespaceBody::CompilationUnit;
        self.skip_bad_list_tokens(
            move |p| {
                p.at(SyntaxKind::RBrace)
                    || p.is_possible_namespace_member_declaration()
                    || p.is_possible_member_start()
                    || (is_statement && p.is_possible_statement())
            },
            "expected namespace member",
        );
    }

    pub(super) fn is_possible_namespace_member_declaration(&self) -> bool {
        let kind = self.current();
        match kind {
            SyntaxKind::ExternKw
            | SyntaxKind::UsingKw
            | SyntaxKind::NamespaceKw
            | SyntaxKind::LBracket => true,
            SyntaxKind::PartialKw | SyntaxKind::FileKw => {
                let next = self.nth(1);
                next.is_modifier() || next.is_type_declaration_keyword() || next == SyntaxKind::RecordKw
            }
            SyntaxKind::RecordKw => self.at_record_declaration(),
            _ => kind.is_type_declaration_keyword() || (kind.is_modifier() && !kind.is_contextual_keyword()),
        }
    }

    /// Top-level statement classification, done before any modifier dispatch.
    fn is_global_statement_start(&mut self) -> bool {
        match self.current() {
            SyntaxKind::UnsafeKw if self.nth_at(1, SyntaxKind::LBrace) => return true,
            SyntaxKind::FixedKw => return self.nth_at(1, SyntaxKind::LParen),
            SyntaxKind::NewKw => {
                return match self.nth(1) {
                    SyntaxKind::LBrace | SyntaxKind::LBracket | SyntaxKind::LParen => true,
                    _ => self.lookahead(|p| {
                        p.advance_scan();
                        p.scan_type_core(ScanMode::Normal).is_type() && p.at(SyntaxKind::LParen)
                    }),
                };
            }
            SyntaxKind::CheckedKw | SyntaxKind::UncheckedKw
                if self.nth_at(1, SyntaxKind::LBrace) =>
            {
                return true
            }
            SyntaxKind::UsingKw
            | SyntaxKind::AwaitKw
            | SyntaxKind::IfKw
            | SyntaxKind::WhileKw
            | SyntaxKind::DoKw
            | SyntaxKind::ForKw
            | SyntaxKind::ForeachKw
            | SyntaxKind::BreakKw
            | SyntaxKind::ContinueKw
            | SyntaxKind::ReturnKw
            | SyntaxKind::ThrowKw
            | SyntaxKind::GotoKw
            | SyntaxKind::TryKw
            | SyntaxKind::SwitchKw
            | SyntaxKind::LockKw
            | SyntaxKind::LBrace
            | SyntaxKind::Semicolon => return true,
            SyntaxKind::YieldKw
                if matches!(self.nth(1), SyntaxKind::ReturnKw | SyntaxKind::BreakKw) =>
            {
                return true
            }
            SyntaxKind::LBracket => return false,
            _ => {}
        }
        if !self.is_possible_statement() {
            return false;
        }

        self.lookahead(|p| {
            loop {
                let kind = p.current();
                if !kind.is_modifier() {
                    break;
                }
                let next = p.nth(1);
                if kind.is_contextual_keyword()
                    && !(next.is_identifier_like() || next.is_keyword())
                {
                    // `async = 1;` and friends: an identifier, not a modifier.
                    break;
                }
                if !matches!(
                    kind,
                    SyntaxKind::StaticKw
                        | SyntaxKind::AsyncKw
                        | SyntaxKind::UnsafeKw
                        | SyntaxKind::ExternKw
                ) {
                    return false;
                }
                p.advance_scan();
            }
            match p.current() {
                SyntaxKind::DelegateKw => {
                    matches!(p.nth(1), SyntaxKind::LParen | SyntaxKind::LBrace)
                }
                SyntaxKind::RecordKw => !p.at_record_declaration(),
                SyntaxKind::NamespaceKw
                | SyntaxKind::EventKw
                | SyntaxKind::Tilde
                | SyntaxKind::ImplicitKw
                | SyntaxKind::ExplicitKw
                | SyntaxKind::LBracket => false,
                kind => !kind.is_type_declaration_keyword(),
            }
        })
    }

    fn at_global_attribute(&self) -> bool {
        self.nth_at(2, SyntaxKind::Colon)
            && self.nth(1).is_identifier_like()
            && matches!(self.nth_text(1), "assembly" | "module")
    }

    fn parse_extern_alias_directive(&mut self) {
        self.builder.start_node(SyntaxKind::ExternAliasDirective);
        self.bump();
        self.bump();
        self.expect_identifier("expected alias name");
        self.expect_semicolon();
        self.builder.finish_node();
    }

    /// `using` introducing a directive rather than a `using` statement or
    /// declaration.
    fn is_using_directive(&mut self) -> bool {
        let using = if self.at(SyntaxKind::GlobalKw) {
            if !self.nth_at(1, SyntaxKind::UsingKw) {
                return false;
            }
            1
        } else {
            0
        };
        match self.nth(using + 1) {
            SyntaxKind::StaticKw => true,
            SyntaxKind::LParen => false,
            _ if self.nth_is_identifier(using + 1) && self.nth_at(using + 2, SyntaxKind::Eq) => true,
            _ => self.lookahead(|p| {
                for _ in 0..=using {
                    p.advance_scan();
                }
                p.scan_type_core(ScanMode::Normal).is_type() && p.at(SyntaxKind::Semicolon)
            }),
        }
    }

    fn parse_using_directive(&mut self) {
        self.builder.start_node(SyntaxKind::UsingDirective);
        self.bump_if(SyntaxKind::GlobalKw);
        self.bump();
        self.bump_if(SyntaxKind::StaticKw);
        if self.at_identifier() && self.nth_at(1, SyntaxKind::Eq) {
            self.builder.start_node(SyntaxKind::NameEquals);
            self.builder.start_node(SyntaxKind::IdentifierName);
            self.bump();
            self.builder.finish_node();
            self.bump();
            self.builder.finish_node();
        }
        self.parse_type(TypeMode::Normal);
        self.expect_semicolon();
        self.builder.finish_node();
    }

    fn parse_namespace_declaration(&mut self, body: NamespaceBody) {
        if !self.enter() {
            return;
        }
        let checkpoint = self.builder.checkpoint();
        let keyword = self.current_range();
        self.bump();
        self.parse_name();

        // The node stays open while its body is parsed, so a depth-guard
        // fallback inside the body still lands within the namespace.
        if self.at(SyntaxKind::Semicolon) {
            self.builder
                .start_node_at(checkpoint, SyntaxKind::FileScopedNamespaceDeclaration);
            self.bump();
            if body != NamespaceBody::CompilationUnit {
                self.error_range(
                    keyword.start,
                    keyword.end,
                    "file-scoped namespaces must be declared at the top level",
                );
            }
            self.parse_namespace_body(NamespaceBody::FileScoped);
        } else {
            self.builder.start_node_at(checkpoint, SyntaxKind::NamespaceDeclaration);
            self.expect(SyntaxKind::LBrace, "expected `{`");
            self.parse_namespace_body(NamespaceBody::Block);
            self.expect(SyntaxKind::RBrace, "expected `}`");
            self.bump_if(SyntaxKind::Semicolon);
        }
        self.builder.finish_node();
        self.leave();
    }

    // --- members ---

    pub(super) fn is_possible_member_start(&self) -> bool {
        let kind = self.current();
        kind.is_modifier()
            || kind.is_predefined_type()
            || kind.is_type_declaration_keyword()
            || self.at_identifier()
            || matches!(
                kind,
                SyntaxKind::LBracket
                    | SyntaxKind::LParen
                    | SyntaxKind::Tilde
                    | SyntaxKind::EventKw
                    | SyntaxKind::ConstKw
                    | SyntaxKind::ImplicitKw
                    | SyntaxKind::ExplicitKw
                    | SyntaxKind::RefKw
            )
    }

    /// `record Name`, `record class Name` or `record struct Name`, as opposed to
    /// a field whose type is named `record`.
    fn at_record_declaration(&self) -> bool {
        if !self.at(SyntaxKind::RecordKw) {
            return false;
        }
        match self.nth(1) {
            SyntaxKind::ClassKw | SyntaxKind::StructKw => true,
            _ => {
                self.nth_is_identifier(1)
                    && !matches!(
                        self.nth(2),
                        SyntaxKind::Semicolon | SyntaxKind::Eq | SyntaxKind::Comma
                    )
            }
        }
    }

    pub(crate) fn parse_member_declaration(&mut self, parent: MemberParent) {
        if !self.enter() {
            return;
        }
        let start = self.current_range().start;
        let kind = self.parse_member_declaration_core(parent);
        if parent == MemberParent::Namespace
            && !matches!(
                kind,
                None | Some(
                    SyntaxKind::ClassDeclaration
                        | SyntaxKind::StructDeclaration
                        | SyntaxKind::InterfaceDeclaration
                        | SyntaxKind::RecordDeclaration
                        | SyntaxKind::EnumDeclaration
                        | SyntaxKind::DelegateDeclaration
                        | SyntaxKind::NamespaceDeclaration
                        | SyntaxKind::FileScopedNamespaceDeclaration
                        | SyntaxKind::IncompleteMember
                )
            )
        {
            let end = self.last_token_end().max(start);
            self.error_range(start, end, "member declarations are not allowed at namespace scope");
        }
        self.leave();
    }

    /// Returns the kind of node produced, or `None` when nothing was consumed.
    fn parse_member_declaration_core(&mut self, parent: MemberParent) -> Option<SyntaxKind> {
        if parent == MemberParent::Namespace && self.at(SyntaxKind::NamespaceKw) {
            // Only reachable when a single namespace member is parsed on its own.
            self.parse_namespace_declaration(NamespaceBody::Block);
            return Some(SyntaxKind::NamespaceDeclaration);
        }

        let checkpoint = self.builder.checkpoint();
        let before = self.tokens.position();

        self.parse_attribute_lists();
        let is_async = self.parse_modifiers();

        let kind = match self.current() {
            SyntaxKind::ClassKw | SyntaxKind::StructKw | SyntaxKind::InterfaceKw => {
                self.parse_type_declaration_rest()
            }
            SyntaxKind::RecordKw if self.at_record_declaration() => {
                self.parse_type_declaration_rest()
            }
            SyntaxKind::EnumKw => self.parse_enum_declaration_rest(),
            SyntaxKind::DelegateKw => self.parse_delegate_declaration_rest(),
            SyntaxKind::Tilde => self.parse_destructor_rest(),
            SyntaxKind::ConstKw => {
                self.bump();
                self.parse_variable_declaration();
                self.expect_semicolon();
                SyntaxKind::FieldDeclaration
            }
            SyntaxKind::EventKw => self.parse_event_rest(),
            SyntaxKind::ImplicitKw | SyntaxKind::ExplicitKw => self.parse_conversion_operator_rest(),
            _ if self.at_identifier() && self.nth_at(1, SyntaxKind::LParen) => {
                self.parse_constructor_rest(is_async)
            }
            _ if self.at_type_start() => self.parse_typed_member_rest(is_async),
            _ => {
                if self.tokens.position() == before {
                    return None;
                }
                let offset = self.last_token_end();
                self.error_range(offset, offset, "expected member declaration");
                SyntaxKind::IncompleteMember
            }
        };

        self.builder.start_node_at(checkpoint, kind);
        self.builder.finish_node();
        Some(kind)
    }

    /// Collects modifiers into a `Modifiers` node. Returns whether `async` was
    /// among them.
    fn parse_modifiers(&mut self) -> bool {
        let checkpoint = self.builder.checkpoint();
        let mut any = false;
        let mut is_async = false;
        loop {
            let kind = self.current();
            let take = match kind {
                SyntaxKind::AsyncKw
                | SyntaxKind::PartialKw
                | SyntaxKind::RequiredKw
                | SyntaxKind::FileKw => self.is_contextual_modifier(),
                k => k.is_modifier(),
            };
            if !take {
                break;
            }
            is_async |= kind == SyntaxKind::AsyncKw;
            any = true;
            self.bump();
        }
        if any {
            self.builder.start_node_at(checkpoint, SyntaxKind::Modifiers);
            self.builder.finish_node();
        }
        is_async
    }

    /// A contextual modifier is only a modifier when a member follows it.
    fn is_contextual_modifier(&self) -> bool {
        let next = self.nth(1);
        if next.is_modifier() && !next.is_contextual_keyword() {
            return true;
        }
        if next.is_type_declaration_keyword()
            || next.is_predefined_type()
            || matches!(
                next,
                SyntaxKind::RecordKw
                    | SyntaxKind::EventKw
                    | SyntaxKind::ConstKw
                    | SyntaxKind::ImplicitKw
                    | SyntaxKind::ExplicitKw
                    | SyntaxKind::LParen
                    | SyntaxKind::RefKw
            )
        {
            return true;
        }
        if next.is_contextual_keyword()
            && matches!(
                next,
                SyntaxKind::AsyncKw | SyntaxKind::PartialKw | SyntaxKind::RequiredKw | SyntaxKind::FileKw
            )
        {
            return true;
        }
        next.is_identifier_like()
            && (self.nth(2).is_identifier_like()
                || matches!(
                    self.nth(2),
                    SyntaxKind::Less
                        | SyntaxKind::Dot
                        | SyntaxKind::Question
                        | SyntaxKind::LBracket
                        | SyntaxKind::ColonColon
                        | SyntaxKind::ThisKw
                        | SyntaxKind::OperatorKw
                ))
    }

    fn parse_type_declaration_rest(&mut self) -> SyntaxKind {
        let keyword = self.current();
        let kind = match keyword {
            SyntaxKind::ClassKw => SyntaxKind::ClassDeclaration,
            SyntaxKind::StructKw => SyntaxKind::StructDeclaration,
            SyntaxKind::InterfaceKw => SyntaxKind::InterfaceDeclaration,
            _ => SyntaxKind::RecordDeclaration,
        };
        self.bump();
        if keyword == SyntaxKind::RecordKw
            && matches!(self.current(), SyntaxKind::ClassKw | SyntaxKind::StructKw)
        {
            self.bump();
        }
        self.expect_identifier("expected type name");
        if self.at(SyntaxKind::Less) {
            self.parse_type_parameter_list();
        }

        let saved = self.push_termination(TerminatorState::IS_END_OF_RECORD_SIGNATURE);
        if self.at(SyntaxKind::LParen) {
            self.parse_parameter_list();
        }
        self.restore_termination(saved);

        if self.at(SyntaxKind::Colon) {
            self.parse_base_list(keyword != SyntaxKind::InterfaceKw);
        }
        self.parse_constraint_clauses();

        if self.at(SyntaxKind::Semicolon) {
            self.bump();
        } else {
            self.expect(SyntaxKind::LBrace, "expected `{`");
            self.parse_type_members();
            self.expect(SyntaxKind::RBrace, "expected `}`");
            self.bump_if(SyntaxKind::Semicolon);
        }
        kind
    }

    fn parse_type_members(&mut self) {
        let saved = self.push_termination(TerminatorState::IS_POSSIBLE_MEMBER_START_OR_STOP);
        loop {
            if self.at(SyntaxKind::RBrace) || self.at(SyntaxKind::Eof) {
                break;
            }
            let before = self.tokens.position();
            if self.is_possible_member_start() {
                self.parse_member_declaration(MemberParent::Type);
            }
            if self.tokens.position() != before {
                continue;
            }
            if self.is_possible_member_start() {
                self.skip_tokens_while("expected member declaration", |_| false);
            } else if self.skip_bad_list_tokens(
                |p| p.at(SyntaxKind::RBrace) || p.is_possible_member_start(),
                "expected member declaration",
            ) == PostSkipAction::Abort
            {
                break;
            }
        }
        self.restore_termination(saved);
    }

    fn parse_base_list(&mut self, allow_arguments: bool) {
        self.builder.start_node(SyntaxKind::BaseList);
        self.bump();
        let saved = self.push_termination(TerminatorState::IS_POSSIBLE_AGGREGATE_CLAUSE_START_OR_STOP);
        loop {
            let checkpoint = self.builder.checkpoint();
            self.parse_type(TypeMode::Normal);
            let kind = if allow_arguments && self.at(SyntaxKind::LParen) {
                self.parse_argument_list();
                SyntaxKind::PrimaryConstructorBaseType
            } else {
                SyntaxKind::SimpleBaseType
            };
            self.builder.start_node_at(checkpoint, kind);
            self.builder.finish_node();
            if !self.bump_if(SyntaxKind::Comma) {
                break;
            }
        }
        self.restore_termination(saved);
        self.builder.finish_node();
    }

    fn parse_enum_declaration_rest(&mut self) -> SyntaxKind {
        self.bump();
        self.expect_identifier("expected enum name");
        if self.at(SyntaxKind::Colon) {
            self.parse_base_list(false);
        }
        self.expect(SyntaxKind::LBrace, "expected `{`");
        self.parse_separated_list(SeparatedList {
            close: SyntaxKind::RBrace,
            state: TerminatorState::empty(),
            is_element_start: |p| p.at_identifier() || p.at(SyntaxKind::LBracket),
            parse_element: |p| {
                p.builder.start_node(SyntaxKind::EnumMemberDeclaration);
                p.parse_attribute_lists();
                p.expect_identifier("expected enum member name");
                if p.at(SyntaxKind::Eq) {
                    p.parse_equals_value_clause();
                }
                p.builder.finish_node();
            },
            expected: "expected enum member",
            allow_trailing: true,
        });
        self.expect(SyntaxKind::RBrace, "expected `}`");
        self.bump_if(SyntaxKind::Semicolon);
        SyntaxKind::EnumDeclaration
    }

    fn parse_delegate_declaration_rest(&mut self) -> SyntaxKind {
        self.bump();
        self.parse_type(TypeMode::Normal);
        self.expect_identifier("expected delegate name");
        if self.at(SyntaxKind::Less) {
            self.parse_type_parameter_list();
        }
        self.parse_parameter_list();
        self.parse_constraint_clauses();
        self.expect_semicolon();
        SyntaxKind::DelegateDeclaration
    }

    fn parse_destructor_rest(&mut self) -> SyntaxKind {
        self.bump();
        self.expect_identifier("expected class name");
        self.parse_parameter_list();
        self.parse_body_or_semicolon(false);
        SyntaxKind::DestructorDeclaration
    }

    fn parse_constructor_rest(&mut self, is_async: bool) -> SyntaxKind {
        self.bump();
        self.parse_method_signature_parameters();
        if self.at(SyntaxKind::Colon) {
            self.builder.start_node(SyntaxKind::ConstructorInitializer);
            self.bump();
            if matches!(self.current(), SyntaxKind::BaseKw | SyntaxKind::ThisKw) {
                self.bump();
            } else {
                self.missing(SyntaxKind::BaseKw, "expected `base` or `this`");
            }
            self.parse_argument_list();
            self.builder.finish_node();
        }
        self.parse_body_or_semicolon(is_async);
        SyntaxKind::ConstructorDeclaration
    }

    fn parse_method_signature_parameters(&mut self) {
        let saved = self.push_termination(TerminatorState::IS_END_OF_METHOD_SIGNATURE);
        self.parse_parameter_list();
        self.restore_termination(saved);
    }

    fn parse_conversion_operator_rest(&mut self) -> SyntaxKind {
        self.bump();
        self.expect(SyntaxKind::OperatorKw, "expected `operator`");
        self.parse_type(TypeMode::Normal);
        self.parse_method_signature_parameters();
        self.parse_body_or_semicolon(false);
        SyntaxKind::ConversionOperatorDeclaration
    }

    fn parse_event_rest(&mut self) -> SyntaxKind {
        self.bump();
        let declaration = self.builder.checkpoint();
        self.parse_type(TypeMode::Normal);

        let explicit = self.scan_explicit_interface_prefix();
        if explicit || (self.at_identifier() && self.nth_at(1, SyntaxKind::LBrace)) {
            if explicit {
                self.parse_explicit_interface_specifier();
            }
            self.expect_identifier("expected event name");
            self.parse_accessor_list();
            return SyntaxKind::EventDeclaration;
        }

        self.parse_variable_declarators();
        self.builder.start_node_at(declaration, SyntaxKind::VariableDeclaration);
        self.builder.finish_node();
        self.expect_semicolon();
        SyntaxKind::EventFieldDeclaration
    }

    /// Members that start with a type: methods, properties, indexers, operators
    /// and fields.
    fn parse_typed_member_rest(&mut self, is_async: bool) -> SyntaxKind {
        let declaration = self.builder.checkpoint();
        let saved = self.push_termination(TerminatorState::IS_END_OF_RETURN_TYPE);
        self.parse_type(TypeMode::Normal);
        self.restore_termination(saved);

        if self.at(SyntaxKind::OperatorKw) {
            return self.parse_operator_rest();
        }
        if self.at(SyntaxKind::ThisKw) {
            return self.parse_indexer_rest();
        }

        let explicit = self.scan_explicit_interface_prefix();
        if explicit {
            self.parse_explicit_interface_specifier();
            match self.current() {
                SyntaxKind::OperatorKw => return self.parse_operator_rest(),
                SyntaxKind::ThisKw => return self.parse_indexer_rest(),
                _ => {}
            }
        }

        if !self.at_identifier() {
            let offset = self.last_token_end();
            self.error_range(offset, offset, "expected member name");
            return SyntaxKind::IncompleteMember;
        }

        match self.nth(1) {
            SyntaxKind::LParen | SyntaxKind::Less => {
                self.bump();
                if self.at(SyntaxKind::Less) {
                    self.parse_type_parameter_list();
                }
                self.parse_method_signature_parameters();
                self.parse_constraint_clauses();
                self.parse_body_or_semicolon(is_async);
                SyntaxKind::MethodDeclaration
            }
            SyntaxKind::LBrace | SyntaxKind::FatArrow => {
                self.bump();
                if self.at(SyntaxKind::FatArrow) {
                    self.parse_arrow_expression_clause(is_async);
                    self.expect_semicolon();
                } else {
                    self.parse_accessor_list();
                    if self.at(SyntaxKind::Eq) {
                        self.parse_equals_value_clause();
                        self.expect_semicolon();
                    }
                }
                SyntaxKind::PropertyDeclaration
            }
            _ if explicit => {
                self.bump();
                self.missing(SyntaxKind::LParen, "expected `(`, `{` or `=>`");
                SyntaxKind::IncompleteMember
            }
            _ => {
                let saved = self.push_termination(TerminatorState::IS_END_OF_FIELD_DECLARATION);
                self.parse_variable_declarators();
                self.restore_termination(saved);
                self.builder.start_node_at(declaration, SyntaxKind::VariableDeclaration);
                self.builder.finish_node();
                self.expect_semicolon();
                SyntaxKind::FieldDeclaration
            }
        }
    }

    fn parse_indexer_rest(&mut self) -> SyntaxKind {
        self.bump();
        self.parse_bracketed_parameter_list();
        if self.at(SyntaxKind::FatArrow) {
            self.parse_arrow_expression_clause(false);
            self.expect_semicolon();
        } else {
            self.parse_accessor_list();
        }
        SyntaxKind::IndexerDeclaration
    }

    fn parse_operator_rest(&mut self) -> SyntaxKind {
        self.bump();
        let kind = self.current();
        let overloadable = matches!(
            kind,
            SyntaxKind::Plus
                | SyntaxKind::Minus
                | SyntaxKind::Bang
                | SyntaxKind::Tilde
                | SyntaxKind::PlusPlus
                | SyntaxKind::MinusMinus
                | SyntaxKind::Star
                | SyntaxKind::Slash
                | SyntaxKind::Percent
                | SyntaxKind::Amp
                | SyntaxKind::Pipe
                | SyntaxKind::Caret
                | SyntaxKind::LeftShift
                | SyntaxKind::EqEq
                | SyntaxKind::BangEq
                | SyntaxKind::Less
                | SyntaxKind::LessEq
                | SyntaxKind::Greater
                | SyntaxKind::GreaterEq
                | SyntaxKind::TrueKw
                | SyntaxKind::FalseKw
        );
        if kind == SyntaxKind::Greater
            && self.nth_at(1, SyntaxKind::Greater)
            && self.tokens.is_adjacent(0)
        {
            self.bump_joined(SyntaxKind::RightShift, 2);
        } else if overloadable {
            self.bump();
        } else {
            self.missing(SyntaxKind::Plus, "expected overloadable operator");
        }
        self.parse_method_signature_parameters();
        self.parse_body_or_semicolon(false);
        SyntaxKind::OperatorDeclaration
    }

    fn parse_explicit_interface_specifier(&mut self) {
        self.builder.start_node(SyntaxKind::ExplicitInterfaceSpecifier);
        let saved = self.push_termination(TerminatorState::IS_END_OF_NAME_IN_EXPLICIT_INTERFACE);
        let name = self.builder.checkpoint();
        self.parse_simple_name_in_type();
        while self.at(SyntaxKind::Dot) && self.is_interface_segment_after_dot() {
            self.builder.start_node_at(name, SyntaxKind::QualifiedName);
            self.bump();
            self.parse_simple_name_in_type();
            self.builder.finish_node();
        }
        self.restore_termination(saved);
        self.expect(SyntaxKind::Dot, "expected `.`");
        self.builder.finish_node();
    }

    /// After `.`: another name segment followed by `.`, so not the member name yet.
    fn is_interface_segment_after_dot(&mut self) -> bool {
        self.lookahead(|p| {
            p.advance_scan();
            p.at_identifier()
                && p.scan_named_type_part().is_type()
                && p.at(SyntaxKind::Dot)
        })
    }

    fn parse_arrow_expression_clause(&mut self, is_async: bool) {
        self.builder.start_node(SyntaxKind::ArrowExpressionClause);
        self.bump();
        self.parse_function_body(is_async, |p| p.parse_expression());
        self.builder.finish_node();
    }

    /// Block, `=> expr;` or `;`. Anything else leaves a missing `;`.
    pub(super) fn parse_body_or_semicolon(&mut self, is_async: bool) {
        match self.current() {
            SyntaxKind::LBrace => self.parse_function_body(is_async, |p| p.parse_block()),
            SyntaxKind::FatArrow => {
                self.parse_arrow_expression_clause(is_async);
                self.expect_semicolon();
            }
            SyntaxKind::Semicolon => self.bump(),
            _ => self.missing(SyntaxKind::Semicolon, "expected `{`, `=>` or `;`"),
        }
    }

    fn parse_accessor_list(&mut self) {
        self.builder.start_node(SyntaxKind::AccessorList);
        self.expect(SyntaxKind::LBrace, "expected `{`");
        loop {
            if self.at(SyntaxKind::RBrace) || self.at(SyntaxKind::Eof) {
                break;
            }
            let before = self.tokens.position();
            if self.is_possible_accessor() {
                self.parse_accessor_declaration();
            }
            if self.tokens.position() == before
                && self.skip_bad_list_tokens(
                    |p| p.at(SyntaxKind::RBrace) || p.is_possible_accessor(),
                    "expected `get`, `set`, `init`, `add` or `remove`",
                ) == PostSkipAction::Abort
            {
                break;
            }
        }
        self.expect(SyntaxKind::RBrace, "expected `}`");
        self.builder.finish_node();
    }

    fn is_possible_accessor(&self) -> bool {
        let kind = self.current();
        matches!(
            kind,
            SyntaxKind::GetKw
                | SyntaxKind::SetKw
                | SyntaxKind::InitKw
                | SyntaxKind::AddKw
                | SyntaxKind::RemoveKw
                | SyntaxKind::LBracket
        ) || (kind.is_modifier() && !kind.is_contextual_keyword())
    }

    fn parse_accessor_declaration(&mut self) {
        self.builder.start_node(SyntaxKind::AccessorDeclaration);
        self.parse_attribute_lists();
        self.parse_modifiers();
        if matches!(
            self.current(),
            SyntaxKind::GetKw
                | SyntaxKind::SetKw
                | SyntaxKind::InitKw
                | SyntaxKind::AddKw
                | SyntaxKind::RemoveKw
        ) {
            self.bump();
        } else {
            self.missing(SyntaxKind::GetKw, "expected `get`, `set`, `init`, `add` or `remove`");
        }
        self.parse_body_or_semicolon(false);
        self.builder.finish_node();
    }

    // --- type parameters and constraints ---

    pub(super) fn parse_type_parameter_list(&mut self) {
        self.builder.start_node(SyntaxKind::TypeParameterList);
        self.bump();
        self.parse_separated_list(SeparatedList {
            close: SyntaxKind::Greater,
            state: TerminatorState::IS_END_OF_TYPE_PARAMETER_LIST,
            is_element_start: |p| {
                p.at_identifier()
                    || matches!(
                        p.current(),
                        SyntaxKind::LBracket | SyntaxKind::InKw | SyntaxKind::OutKw
                    )
            },
            parse_element: |p| {
                p.builder.start_node(SyntaxKind::TypeParameter);
                p.parse_attribute_lists();
                if matches!(p.current(), SyntaxKind::InKw | SyntaxKind::OutKw) {
                    p.bump();
                }
                p.expect_identifier("expected type parameter name");
                p.builder.finish_node();
            },
            expected: "expected type parameter",
            allow_trailing: false,
        });
        self.expect(SyntaxKind::Greater, "expected `>`");
        self.builder.finish_node();
    }

    pub(super) fn parse_constraint_clauses(&mut self) {
        while self.at(SyntaxKind::WhereKw)
            && self.nth_is_identifier(1)
            && self.nth_at(2, SyntaxKind::Colon)
        {
            self.builder.start_node(SyntaxKind::TypeParameterConstraintClause);
            self.bump();
            self.builder.start_node(SyntaxKind::IdentifierName);
            self.bump();
            self.builder.finish_node();
            self.bump();
            loop {
                self.parse_type_constraint();
                if !self.bump_if(SyntaxKind::Comma) {
                    break;
                }
            }
            self.builder.finish_node();
        }
    }

    fn parse_type_constraint(&mut self) {
        match self.current() {
            SyntaxKind::ClassKw | SyntaxKind::StructKw => {
                self.builder.start_node(SyntaxKind::ClassOrStructConstraint);
                let is_class = self.at(SyntaxKind::ClassKw);
                self.bump();
                if is_class {
                    self.bump_if(SyntaxKind::Question);
                }
                self.builder.finish_node();
            }
            SyntaxKind::NewKw => {
                self.builder.start_node(SyntaxKind::ConstructorConstraint);
                self.bump();
                self.expect(SyntaxKind::LParen, "expected `(`");
                self.expect(SyntaxKind::RParen, "expected `)`");
                self.builder.finish_node();
            }
            SyntaxKind::DefaultKw => {
                self.builder.start_node(SyntaxKind::DefaultConstraint);
                self.bump();
                self.builder.finish_node();
            }
            _ => {
                self.builder.start_node(SyntaxKind::TypeConstraint);
                self.parse_type(TypeMode::Normal);
                self.builder.finish_node();
            }
        }
    }

    // --- parameters ---

    pub(super) fn parse_parameter_list(&mut self) {
        self.parse_parameters(SyntaxKind::ParameterList, SyntaxKind::LParen, SyntaxKind::RParen, false);
    }

    pub(super) fn parse_bracketed_parameter_list(&mut self) {
        self.parse_parameters(
            SyntaxKind::BracketedParameterList,
            SyntaxKind::LBracket,
            SyntaxKind::RBracket,
            false,
        );
    }

    /// Lambda parameters may leave out their types.
    pub(super) fn parse_lambda_parameter_list(&mut self) {
        self.parse_parameters(SyntaxKind::ParameterList, SyntaxKind::LParen, SyntaxKind::RParen, true);
    }

    fn parse_parameters(
        &mut self,
        kind: SyntaxKind,
        open: SyntaxKind,
        close: SyntaxKind,
        allow_untyped: bool,
    ) {
        self.builder.start_node(kind);
        if open == SyntaxKind::LParen {
            self.expect(open, "expected `(`");
        } else {
            self.expect(open, "expected `[`");
        }
        let parse_element: fn(&mut Self) = if allow_untyped {
            |p| p.parse_parameter(true)
        } else {
            |p| p.parse_parameter(false)
        };
        self.parse_separated_list(SeparatedList {
            close,
            state: TerminatorState::IS_END_OF_PARAMETER_LIST,
            is_element_start: Self::is_possible_parameter,
            parse_element,
            expected: "expected parameter",
            allow_trailing: false,
        });
        if close == SyntaxKind::RParen {
            self.expect(close, "expected `)` to close parameter list");
        } else {
            self.expect(close, "expected `]` to close parameter list");
        }
        self.builder.finish_node();
    }

    fn is_possible_parameter(&self) -> bool {
        matches!(
            self.current(),
            SyntaxKind::LBracket
                | SyntaxKind::RefKw
                | SyntaxKind::OutKw
                | SyntaxKind::InKw
                | SyntaxKind::ParamsKw
                | SyntaxKind::ThisKw
                | SyntaxKind::ReadonlyKw
        ) || self.at_type_start()
    }

    fn at_parameter_modifier(&self) -> bool {
        match self.current() {
            SyntaxKind::RefKw
            | SyntaxKind::OutKw
            | SyntaxKind::InKw
            | SyntaxKind::ParamsKw
            | SyntaxKind::ThisKw
            | SyntaxKind::ReadonlyKw => true,
            SyntaxKind::ScopedKw => {
                let next = self.nth(1);
                next.is_identifier_like()
                    || next.is_predefined_type()
                    || matches!(next, SyntaxKind::RefKw | SyntaxKind::InKw | SyntaxKind::OutKw)
            }
            _ => false,
        }
    }

    fn parse_parameter(&mut self, allow_untyped: bool) {
        self.builder.start_node(SyntaxKind::Parameter);
        self.parse_attribute_lists();

        let modifiers = self.builder.checkpoint();
        let mut any = false;
        while self.at_parameter_modifier() {
            self.bump();
            any = true;
        }
        if any {
            self.builder.start_node_at(modifiers, SyntaxKind::Modifiers);
            self.builder.finish_node();
        }

        let untyped = allow_untyped
            && self.at_identifier()
            && matches!(
                self.nth(1),
                SyntaxKind::Comma | SyntaxKind::RParen | SyntaxKind::Eq
            );
        if untyped {
            self.bump();
        } else {
            self.parse_type(TypeMode::Normal);
            self.expect_identifier("expected parameter name");
        }
        if self.at(SyntaxKind::Eq) {
            self.parse_equals_value_clause();
        }
        self.builder.finish_node();
    }

    // --- attributes ---

    pub(super) fn parse_attribute_lists(&mut self) {
        while self.at(SyntaxKind::LBracket) {
            self.parse_attribute_list();
        }
    }

    fn parse_attribute_list(&mut self) {
        self.builder.start_node(SyntaxKind::AttributeList);
        self.bump();
        let target = self.current();
        if (target.is_identifier_like() || target.is_keyword()) && self.nth_at(1, SyntaxKind::Colon) {
            self.builder.start_node(SyntaxKind::AttributeTargetSpecifier);
            self.bump();
            self.bump();
            self.builder.finish_node();
        }
        self.parse_separated_list(SeparatedList {
            close: SyntaxKind::RBracket,
            state: TerminatorState::IS_ATTRIBUTE_DECLARATION_TERMINATOR,
            is_element_start: Self::at_identifier,
            parse_element: Self::parse_attribute,
            expected: "expected attribute",
            allow_trailing: true,
        });
        self.expect(SyntaxKind::RBracket, "expected `]`");
        self.builder.finish_node();
    }

    fn parse_attribute(&mut self) {
        self.builder.start_node(SyntaxKind::Attribute);
        self.parse_name();
        if self.at(SyntaxKind::LParen) {
            self.builder.start_node(SyntaxKind::AttributeArgumentList);
            self.bump();
            self.parse_separated_list(SeparatedList {
                close: SyntaxKind::RParen,
                state: TerminatorState::IS_END_OF_ARGUMENT_LIST,
                is_element_start: |p| can_start_expression(p.current()),
                parse_element: Self::parse_attribute_argument,
                expected: "expected attribute argument",
                allow_trailing: false,
            });
            self.expect(SyntaxKind::RParen, "expected `)`");
            self.builder.finish_node();
        }
        self.builder.finish_node();
    }

    fn parse_attribute_argument(&mut self) {
        self.builder.start_node(SyntaxKind::AttributeArgument);
        if self.at_identifier() && self.nth_at(1, SyntaxKind::Eq) {
            self.builder.start_node(SyntaxKind::NameEquals);
            self.builder.start_node(SyntaxKind::IdentifierName);
            self.bump();
            self.builder.finish_node();
            self.bump();
            self.builder.finish_node();
        } else if self.is_named_argument() {
            self.builder.start_node(SyntaxKind::NameColon);
            self.builder.start_node(SyntaxKind::IdentifierName);
            self.bump();
            self.builder.finish_node();
            self.bump();
            self.builder.finish_node();
        }
        self.parse_expression();
        self.builder.finish_node();
    }
}
