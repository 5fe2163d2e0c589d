//! Recursive-descent parser producing a lossless `rowan` tree.
//!
//! The parser never fails: malformed input yields missing tokens, `Error` nodes
//! wrapping skipped tokens, and a diagnostic for each. Ambiguous constructs are
//! resolved with side-effect-free scans over the buffered token array (see
//! [`scanner`]) and, in one place, with a bounded speculative parse that is rewound
//! through a [`reset::ResetPoint`].

mod builder;
mod declarations;
mod expressions;
mod patterns;
mod queries;
mod reset;
mod scanner;
mod statements;
mod termination;
mod token_source;
mod types;

use rowan::{GreenNode, NodeOrToken};
use text_size::TextSize;

use crate::cancel::{CancellationToken, Cancelled};
use crate::lexer::lex_with_errors;
use crate::syntax_kind::{SableLanguage, SyntaxKind};
use crate::{ParseError, TextRange};

use self::builder::NodeBuilder;
use self::declarations::MemberParent;
use self::reset::ResetPoint;
use self::termination::TerminatorState;
use self::token_source::TokenSource;

pub use self::expressions::{binary_precedence, is_right_associative, Precedence};

pub type SyntaxNode = rowan::SyntaxNode<SableLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<SableLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<SableLanguage>;

/// Guarded entries (expressions, statements, members, types, patterns, blocks)
/// allowed on the stack before the parser gives up on the input.
pub const MAX_RECURSION_DEPTH: u32 = 128;

pub(crate) const TOO_DEEP: &str = "source is too deeply nested to parse";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub green: GreenNode,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn token_at_offset(&self, offset: u32) -> rowan::TokenAtOffset<SyntaxToken> {
        self.syntax().token_at_offset(TextSize::from(offset))
    }

    pub fn covering_element(&self, range: TextRange) -> SyntaxElement {
        self.syntax().covering_element(text_size::TextRange::new(
            TextSize::from(range.start),
            TextSize::from(range.end),
        ))
    }

    /// Diagnostics whose range lies within `node`.
    pub fn errors_in<'a>(&'a self, node: &SyntaxNode) -> impl Iterator<Item = &'a ParseError> + 'a {
        let range = node.text_range();
        let (start, end) = (u32::from(range.start()), u32::from(range.end()));
        self.errors
            .iter()
            .filter(move |error| error.range.start >= start && error.range.end <= end)
    }
}

/// Flags inherited from the surroundings of a fragment that is parsed on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ParserContext {
    pub(crate) in_async: bool,
    pub(crate) in_try: bool,
    pub(crate) in_query: bool,
}

/// Node shapes that can be parsed in isolation for incremental reparse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FragmentKind {
    Block,
    TypeMember,
    NamespaceMember,
    ArgumentList,
    BracketedArgumentList,
    ParameterList,
    BracketedParameterList,
    TypeArgumentList,
}

pub fn parse(text: &str) -> ParseResult {
    tracing::debug!(len = text.len(), "parsing compilation unit");
    let mut parser = Parser::new(text, None);
    parser.parse_compilation_unit();
    parser.finish()
}

pub(crate) fn parse_cancellable(
    text: &str,
    cancellation: &CancellationToken,
) -> Result<ParseResult, Cancelled> {
    tracing::debug!(len = text.len(), "parsing compilation unit (cancellable)");
    let mut parser = Parser::new(text, Some(cancellation));
    parser.parse_compilation_unit();
    if parser.halt == Some(Halt::Cancelled) {
        tracing::debug!("parse cancelled");
        return Err(Cancelled);
    }
    Ok(parser.finish())
}

/// Parses a single statement. The root is a `StatementFragment`.
pub fn parse_statement(text: &str) -> ParseResult {
    tracing::debug!(len = text.len(), "parsing statement fragment");
    let mut parser = Parser::new(text, None);
    parser.parse_standalone_fragment(
        SyntaxKind::StatementFragment,
        Some(SyntaxKind::EmptyStatement),
        "unexpected tokens after statement",
        |p| {
            if p.is_possible_statement() {
                p.parse_statement();
            } else {
                p.builder.start_node(SyntaxKind::EmptyStatement);
                p.missing(SyntaxKind::Semicolon, "expected statement");
                p.builder.finish_node();
            }
        },
    );
    parser.finish()
}

/// Parses a single type member. The root is a `MemberFragment`.
pub fn parse_member(text: &str) -> ParseResult {
    tracing::debug!(len = text.len(), "parsing member fragment");
    let mut parser = Parser::new(text, None);
    parser.parse_standalone_fragment(
        SyntaxKind::MemberFragment,
        Some(SyntaxKind::IncompleteMember),
        "unexpected tokens after member",
        |p| p.parse_member_declaration(MemberParent::Type),
    );
    parser.finish()
}

/// Parses a single expression. The root is an `ExpressionFragment`.
pub fn parse_expression(text: &str) -> ParseResult {
    tracing::debug!(len = text.len(), "parsing expression fragment");
    let mut parser = Parser::new(text, None);
    parser.parse_standalone_fragment(
        SyntaxKind::ExpressionFragment,
        None,
        "unexpected tokens after expression",
        |p| p.parse_expression(),
    );
    parser.finish()
}

/// Parses `text` as a node of shape `kind` under the flags in `context`.
///
/// Returns `None` when the depth guard tripped; callers fall back to a full parse.
pub(crate) fn parse_fragment(
    text: &str,
    kind: FragmentKind,
    context: ParserContext,
) -> Option<ParseResult> {
    let mut p = Parser::new(text, None);
    p.in_async = context.in_async;
    p.in_try = context.in_try;
    p.query_depth = u32::from(context.in_query);

    let root = match kind {
        FragmentKind::Block => SyntaxKind::StatementFragment,
        FragmentKind::TypeMember
        | FragmentKind::NamespaceMember
        | FragmentKind::ParameterList
        | FragmentKind::BracketedParameterList => SyntaxKind::MemberFragment,
        FragmentKind::ArgumentList
        | FragmentKind::BracketedArgumentList
        | FragmentKind::TypeArgumentList => SyntaxKind::ExpressionFragment,
    };

    p.builder.start_node(root);
    match kind {
        FragmentKind::Block => p.parse_block(),
        FragmentKind::TypeMember => p.parse_member_declaration(MemberParent::Type),
        FragmentKind::NamespaceMember => p.parse_member_declaration(MemberParent::Namespace),
        FragmentKind::ArgumentList => p.parse_argument_list(),
        FragmentKind::BracketedArgumentList => p.parse_bracketed_argument_list(),
        FragmentKind::ParameterList => p.parse_parameter_list(),
        FragmentKind::BracketedParameterList => p.parse_bracketed_parameter_list(),
        FragmentKind::TypeArgumentList => p.parse_type_argument_list(),
    }
    if !p.at(SyntaxKind::Eof) {
        p.skip_tokens_while("unexpected tokens after fragment", |p| {
            !p.at(SyntaxKind::Eof)
        });
    }
    p.bump();
    p.builder.finish_node();

    if p.halt.is_some() {
        return None;
    }
    Some(p.finish())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Halt {
    TooDeep,
    Cancelled,
}

pub(crate) struct Parser<'t> {
    tokens: TokenSource<'t>,
    /// Raw index of the next token (trivia included) not yet forwarded to the builder.
    emitted: usize,
    builder: NodeBuilder,
    errors: Vec<ParseError>,
    termination: TerminatorState,
    in_try: bool,
    in_async: bool,
    query_depth: u32,
    recursion_depth: u32,
    halt: Option<Halt>,
    cancellation: Option<&'t CancellationToken>,
    outstanding_resets: u32,
    /// End of the last completed namespace-level element; set only while a
    /// compilation unit is parsed.
    resume: Option<ResetPoint>,
}

impl<'t> Parser<'t> {
    fn new(text: &'t str, cancellation: Option<&'t CancellationToken>) -> Self {
        let (tokens, lex_errors) = lex_with_errors(text);
        let errors = lex_errors
            .into_iter()
            .map(|error| ParseError {
                message: error.message,
                range: error.range,
            })
            .collect();
        Self {
            tokens: TokenSource::new(text, tokens),
            emitted: 0,
            builder: NodeBuilder::new(),
            errors,
            termination: TerminatorState::empty(),
            in_try: false,
            in_async: false,
            query_depth: 0,
            recursion_depth: 0,
            halt: None,
            cancellation,
            outstanding_resets: 0,
            resume: None,
        }
    }

    fn finish(self) -> ParseResult {
        debug_assert_eq!(self.outstanding_resets, 0, "leaked reset point");
        let mut errors = self.errors;
        errors.sort_by_key(|error| (error.range.start, error.range.end));
        ParseResult {
            green: self.builder.finish(),
            errors,
        }
    }

    fn parse_compilation_unit(&mut self) {
        self.builder.start_node(SyntaxKind::CompilationUnit);
        let unit_depth = self.builder.depth();
        self.resume = Some(self.checkpoint());

        self.parse_namespace_body(declarations::NamespaceBody::CompilationUnit);

        let resume = self.resume.take();
        if self.halt == Some(Halt::TooDeep) {
            // Completed members survive; only the remainder is degraded.
            if let Some(point) = &resume {
                self.rewind(point);
            }
            self.halt = None;
            self.degrade(None);
            while self.builder.depth() > unit_depth {
                self.builder.finish_node();
            }
        }
        if let Some(point) = resume {
            self.release(point);
        }
        self.bump();
        self.builder.finish_node();
    }

    /// Moves the compilation unit's resume point to the current position.
    fn mark_resume_point(&mut self) {
        if self.halt.is_some() || self.resume.is_none() {
            return;
        }
        let point = self.checkpoint();
        if let Some(old) = self.resume.replace(point) {
            self.release(old);
        }
    }

    fn parse_standalone_fragment(
        &mut self,
        root: SyntaxKind,
        degraded: Option<SyntaxKind>,
        trailing_message: &str,
        body: impl FnOnce(&mut Self),
    ) {
        let start = self.checkpoint();

        self.builder.start_node(root);
        body(self);
        if !self.at(SyntaxKind::Eof) {
            self.skip_tokens_while(trailing_message, |p| !p.at(SyntaxKind::Eof));
        }
        self.bump();
        self.builder.finish_node();

        if self.halt == Some(Halt::TooDeep) {
            self.rewind(&start);
            self.halt = None;
            self.builder.start_node(root);
            self.degrade(degraded);
            self.bump();
            self.builder.finish_node();
        }
        self.release(start);
    }

    /// Replaces the rest of an over-deep parse: every remaining token goes into
    /// one `Error` node (optionally wrapped in `wrapper`) with a single diagnostic.
    fn degrade(&mut self, wrapper: Option<SyntaxKind>) {
        let start = self.current_range().start;
        if let Some(kind) = wrapper {
            self.builder.start_node(kind);
        }
        if !self.at(SyntaxKind::Eof) {
            self.builder.start_node(SyntaxKind::Error);
            while !self.at(SyntaxKind::Eof) {
                self.bump();
            }
            self.builder.finish_node();
        }
        if wrapper == Some(SyntaxKind::EmptyStatement) {
            // The diagnostic below covers the missing `;` as well.
            self.builder.token(SyntaxKind::Semicolon, "");
        }
        if wrapper.is_some() {
            self.builder.finish_node();
        }
        let end = self.last_token_end().max(start);
        self.error_range(start, end, TOO_DEEP);
    }

    // --- depth guard and cancellation ---

    /// Enters a guarded production. Returns `false` once the parser has halted;
    /// callers then return immediately and let the enclosing loops unwind.
    fn enter(&mut self) -> bool {
        if self.halt.is_some() {
            return false;
        }
        if self.cancellation.is_some_and(CancellationToken::is_cancelled) {
            self.halt = Some(Halt::Cancelled);
            return false;
        }
        if self.recursion_depth >= MAX_RECURSION_DEPTH {
            tracing::debug!(
                depth = self.recursion_depth,
                offset = self.current_range().start,
                "recursion depth exceeded, abandoning parse"
            );
            self.halt = Some(Halt::TooDeep);
            return false;
        }
        self.recursion_depth += 1;
        true
    }

    fn leave(&mut self) {
        debug_assert!(self.recursion_depth > 0);
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    // --- token cursor ---

    fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Kind of the `n`th significant token ahead. Reports `Eof` once halted.
    fn nth(&self, n: usize) -> SyntaxKind {
        if self.halt.is_some() {
            return SyntaxKind::Eof;
        }
        self.tokens.peek(n).kind
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    fn nth_at(&self, n: usize, kind: SyntaxKind) -> bool {
        self.nth(n) == kind
    }

    fn current_text(&self) -> &'t str {
        self.nth_text(0)
    }

    fn nth_text(&self, n: usize) -> &'t str {
        if self.halt.is_some() {
            return "";
        }
        self.tokens.text_of(self.tokens.peek(n))
    }

    /// Whether token `n` can serve as an identifier here. Query keywords are
    /// reserved while a query expression is being parsed.
    fn nth_is_identifier(&self, n: usize) -> bool {
        let kind = self.nth(n);
        kind.is_identifier_like() && !(self.query_depth > 0 && kind.is_query_contextual_keyword())
    }

    fn at_identifier(&self) -> bool {
        self.nth_is_identifier(0)
    }

    /// `_` used as a discard.
    fn at_discard(&self) -> bool {
        self.at(SyntaxKind::Identifier) && self.current_text() == "_"
    }

    fn current_range(&self) -> TextRange {
        self.tokens.current().range
    }

    /// End offset of the last token forwarded to the tree.
    fn last_token_end(&self) -> u32 {
        match self.emitted {
            0 => 0,
            n => self.tokens.raw_token(n - 1).range.end,
        }
    }

    /// Scanner step: moves the cursor without building anything.
    fn advance_scan(&mut self) {
        if self.halt.is_none() {
            self.tokens.advance();
        }
    }

    fn emit_trivia_before(&mut self, raw_index: usize) {
        while self.emitted < raw_index {
            let token = self.tokens.raw_token(self.emitted);
            self.builder.token(token.kind, self.tokens.text_of(token));
            self.emitted += 1;
        }
    }

    /// Forwards the current token, and the trivia before it, to the tree.
    fn bump(&mut self) {
        if self.halt.is_some() {
            return;
        }
        let raw_index = self.tokens.raw_index(0);
        if raw_index < self.emitted {
            return;
        }
        self.emit_trivia_before(raw_index);
        let token = self.tokens.advance();
        self.builder.token(token.kind, self.tokens.text_of(token));
        self.emitted = raw_index + 1;
    }

    /// Emits the next `count` adjacent tokens as a single token of `kind`.
    fn bump_joined(&mut self, kind: SyntaxKind, count: usize) {
        if self.halt.is_some() || count == 0 {
            return;
        }
        let first_raw = self.tokens.raw_index(0);
        let last_raw = self.tokens.raw_index(count - 1);
        let start = self.tokens.current().range.start as usize;
        let end = self.tokens.peek(count - 1).range.end as usize;
        self.emit_trivia_before(first_raw);
        let text = &self.tokens.text()[start..end];
        self.builder.token(kind, text);
        for _ in 0..count {
            self.tokens.advance();
        }
        self.emitted = last_raw + 1;
    }

    fn bump_if(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind, message: &str) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            self.missing(kind, message);
            false
        }
    }

    fn expect_identifier(&mut self, message: &str) -> bool {
        if self.at_identifier() {
            self.bump();
            true
        } else {
            self.missing(SyntaxKind::Identifier, message);
            false
        }
    }

    /// Emits a zero-width token of `kind` right after the previous token.
    fn missing(&mut self, kind: SyntaxKind, message: &str) {
        self.builder.token(kind, "");
        let offset = self.last_token_end();
        self.error_range(offset, offset, message);
    }

    fn error_here(&mut self, message: &str) {
        let range = self.current_range();
        self.error_range(range.start, range.end, message);
    }

    fn error_range(&mut self, start: u32, end: u32, message: &str) {
        self.errors.push(ParseError {
            message: message.to_string(),
            range: TextRange { start, end },
        });
    }
}

/// Whether `token` was synthesized by error recovery.
pub fn is_missing(token: &SyntaxToken) -> bool {
    token.text().is_empty() && token.kind() != SyntaxKind::Eof
}

/// Renders `node` as an indented kind/text listing.
pub fn debug_dump(node: &SyntaxNode) -> String {
    fn go(node: &SyntaxNode, indent: usize, out: &mut String) {
        use std::fmt::Write;
        let _ = writeln!(out, "{:indent$}{:?}", "", node.kind(), indent = indent);
        for child in node.children_with_tokens() {
            match child {
                NodeOrToken::Node(n) => go(&n, indent + 2, out),
                NodeOrToken::Token(t) => {
                    let _ = writeln!(
                        out,
                        "{:indent$}{:?} {:?}",
                        "",
                        t.kind(),
                        t.text(),
                        indent = indent + 2
                    );
                }
            }
        }
    }

    let mut out = String::new();
    go(node, 0, &mut out);
    out
}
