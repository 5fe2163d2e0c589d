use rowan::{NodeOrToken, TokenAtOffset};

use crate::parser::{
    parse, parse_fragment, FragmentKind, ParseResult, ParserContext, SyntaxNode, SyntaxToken,
    TOO_DEEP,
};
use crate::{ParseError, SyntaxKind, TextEdit, TextRange};

#[derive(Debug)]
struct ReparsePlan {
    kind: FragmentKind,
    target: SyntaxNode,
    /// Byte range of the reparsed node in the *old* text.
    old_range: TextRange,
    /// Byte range of the reparsed node in the *new* text.
    new_range: TextRange,
}

/// Incrementally reparse a file after a single text edit.
///
/// The smallest block, member, or delimited list around the edit is parsed on its
/// own (with the context flags its ancestors imply) and spliced into the previous
/// tree; every node off the edited path keeps its green pointer. Whenever the
/// fragment cannot be shown to parse exactly as a full parse would, this falls back
/// to [`parse`].
pub fn reparse(old: &ParseResult, old_text: &str, edit: &TextEdit, new_text: &str) -> ParseResult {
    match try_reparse(old, old_text, edit, new_text) {
        Ok(result) => {
            debug_assert_eq!(
                result.syntax().text().to_string(),
                new_text,
                "incremental reparse must stay lossless"
            );
            result
        }
        Err(reason) => {
            tracing::debug!(reason, "incremental reparse fell back to a full parse");
            parse(new_text)
        }
    }
}

/// Reparse when an old parse and an edit are both available, otherwise parse
/// from scratch.
pub fn parse_incremental(
    old: Option<(&ParseResult, &str)>,
    edit: Option<&TextEdit>,
    new_text: &str,
) -> ParseResult {
    match (old, edit) {
        (Some((old_parse, old_text)), Some(edit)) => reparse(old_parse, old_text, edit, new_text),
        _ => parse(new_text),
    }
}

fn try_reparse(
    old: &ParseResult,
    old_text: &str,
    edit: &TextEdit,
    new_text: &str,
) -> Result<ParseResult, &'static str> {
    if edit.range.start > edit.range.end
        || edit.range.end as usize > old_text.len()
        || old_text.len() as u32 != u32::from(old.syntax().text_range().end())
        || old_text.len() as isize + edit.delta() != new_text.len() as isize
    {
        return Err("edit does not match the old and new text");
    }
    if old.errors.iter().any(|error| error.message == TOO_DEEP) {
        return Err("previous parse hit the depth guard");
    }
    if edit_touches_lexical_literal(old, edit) {
        return Err("edit touches a string, char or comment token");
    }

    let plan = build_reparse_plan(old, edit)?;

    for error in &old.errors {
        let range = error.range;
        if range.is_empty() && (range.start == plan.old_range.start || range.start == plan.old_range.end)
        {
            return Err("diagnostic sits on a reparse boundary");
        }
        let straddles_start = range.start < plan.old_range.start && range.end > plan.old_range.start;
        let straddles_end = range.start < plan.old_range.end && range.end > plan.old_range.end;
        if straddles_start || straddles_end {
            return Err("diagnostic straddles the reparse range");
        }
    }

    let start = plan.new_range.start as usize;
    let end = plan.new_range.end as usize;
    if !new_text.is_char_boundary(start) || !new_text.is_char_boundary(end) {
        return Err("reparse range splits a character");
    }
    let fragment_text = &new_text[start..end];

    let context = context_for(&plan.target);
    let fragment =
        parse_fragment(fragment_text, plan.kind, context).ok_or("fragment hit the depth guard")?;
    let root = fragment.syntax();
    let new_node = single_child_node(&root).ok_or("fragment has unparsed trailing input")?;

    can_reuse(plan.target.kind(), &new_node, fragment_text.len(), &fragment.errors)?;

    let green = plan.target.replace_with(new_node.green().into_owned());

    let delta = edit.delta();
    let mut errors: Vec<ParseError> = Vec::with_capacity(old.errors.len());
    for error in &old.errors {
        if error.range.end <= plan.old_range.start {
            errors.push(error.clone());
        } else if error.range.start >= plan.old_range.end {
            errors.push(ParseError {
                message: error.message.clone(),
                range: shift(error.range, delta),
            });
        }
    }
    errors.sort_by_key(|error| (error.range.start, error.range.end));

    tracing::trace!(
        kind = ?plan.target.kind(),
        start = plan.new_range.start,
        end = plan.new_range.end,
        "spliced reparsed fragment"
    );
    Ok(ParseResult { green, errors })
}

/// Whether a freshly parsed fragment can stand in for `old_kind`.
///
/// Fragments that report diagnostics are refused: their recovery ran without the
/// terminator flags of the enclosing lists, so it may disagree with a full parse.
fn can_reuse(
    old_kind: SyntaxKind,
    new_node: &SyntaxNode,
    text_len: usize,
    errors: &[ParseError],
) -> Result<(), &'static str> {
    if new_node.kind() != old_kind {
        return Err("fragment root kind differs from the old node");
    }
    let range = new_node.text_range();
    if u32::from(range.start()) != 0 || u32::from(range.end()) as usize != text_len {
        return Err("fragment does not cover the edited text");
    }
    if errors.iter().any(|e| e.message.starts_with("unterminated ")) {
        return Err("fragment ends inside an unterminated literal or comment");
    }
    if !errors.is_empty() {
        return Err("fragment has diagnostics");
    }
    Ok(())
}

fn single_child_node(root: &SyntaxNode) -> Option<SyntaxNode> {
    let mut children = root.children();
    let first = children.next()?;
    if children.next().is_some() {
        return None;
    }
    Some(first)
}

fn shift(range: TextRange, delta: isize) -> TextRange {
    TextRange {
        start: (range.start as isize + delta) as u32,
        end: (range.end as isize + delta) as u32,
    }
}

fn build_reparse_plan(old: &ParseResult, edit: &TextEdit) -> Result<ReparsePlan, &'static str> {
    let anchor = anchor_node(old, edit);
    let (target, kind) = select_reparse_node(anchor, edit).ok_or("no reparsable node around the edit")?;

    let old_range = syntax_text_range(&target);
    debug_assert!(old_range.start <= edit.range.start && old_range.end >= edit.range.end);

    let new_end = old_range.end as isize + edit.delta();
    if new_end <= old_range.start as isize {
        return Err("edit empties the reparsed node");
    }

    Ok(ReparsePlan {
        kind,
        target,
        old_range,
        new_range: TextRange {
            start: old_range.start,
            end: new_end as u32,
        },
    })
}

fn anchor_node(old: &ParseResult, edit: &TextEdit) -> SyntaxNode {
    if !edit.range.is_empty() {
        return match old.covering_element(edit.range) {
            NodeOrToken::Node(node) => node,
            NodeOrToken::Token(token) => token.parent().unwrap_or_else(|| old.syntax()),
        };
    }

    match old.token_at_offset(edit.range.start) {
        TokenAtOffset::None => old.syntax(),
        TokenAtOffset::Single(token) => token.parent().unwrap_or_else(|| old.syntax()),
        // Text inserted between two tokens lands before `right`.
        TokenAtOffset::Between(left, right) => {
            let chosen = if !right.kind().is_trivia() || left.kind().is_trivia() {
                right
            } else {
                left
            };
            chosen.parent().unwrap_or_else(|| old.syntax())
        }
    }
}

fn select_reparse_node(anchor: SyntaxNode, edit: &TextEdit) -> Option<(SyntaxNode, FragmentKind)> {
    for node in anchor.ancestors() {
        if edit.range.is_empty() {
            // Insertions must fall strictly inside the node, or the fragment slice
            // would end before the inserted text.
            let range = syntax_text_range(&node);
            if edit.range.start <= range.start || edit.range.start >= range.end {
                continue;
            }
        }
        let Some(kind) = fragment_kind(&node) else {
            continue;
        };
        if edit_overlaps_node_edges(&node, edit) {
            continue;
        }
        return Some((node, kind));
    }
    None
}

fn fragment_kind(node: &SyntaxNode) -> Option<FragmentKind> {
    let parent = node.parent()?;
    let kind = node.kind();
    Some(match kind {
        SyntaxKind::Block => FragmentKind::Block,
        SyntaxKind::ArgumentList => FragmentKind::ArgumentList,
        SyntaxKind::BracketedArgumentList => FragmentKind::BracketedArgumentList,
        SyntaxKind::BracketedParameterList => FragmentKind::BracketedParameterList,
        SyntaxKind::TypeArgumentList => FragmentKind::TypeArgumentList,
        // Lambda parameters may omit their types.
        SyntaxKind::ParameterList if !is_lambda(parent.kind()) => FragmentKind::ParameterList,
        _ if is_member_kind(kind) => match parent.kind() {
            SyntaxKind::ClassDeclaration
            | SyntaxKind::StructDeclaration
            | SyntaxKind::InterfaceDeclaration
            | SyntaxKind::RecordDeclaration => FragmentKind::TypeMember,
            SyntaxKind::NamespaceDeclaration | SyntaxKind::FileScopedNamespaceDeclaration => {
                FragmentKind::NamespaceMember
            }
            // Top-level code is classified as a global statement first; only
            // declarations that never start one are safe to reparse in isolation.
            SyntaxKind::CompilationUnit if is_type_declaration_kind(kind) => {
                FragmentKind::NamespaceMember
            }
            _ => return None,
        },
        _ => return None,
    })
}

fn is_lambda(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::SimpleLambdaExpression | SyntaxKind::ParenthesizedLambdaExpression
    )
}

fn is_type_declaration_kind(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::ClassDeclaration
            | SyntaxKind::StructDeclaration
            | SyntaxKind::InterfaceDeclaration
            | SyntaxKind::RecordDeclaration
            | SyntaxKind::EnumDeclaration
            | SyntaxKind::NamespaceDeclaration
    )
}

fn is_member_kind(kind: SyntaxKind) -> bool {
    is_type_declaration_kind(kind)
        || matches!(
            kind,
            SyntaxKind::DelegateDeclaration
                | SyntaxKind::FieldDeclaration
                | SyntaxKind::EventFieldDeclaration
                | SyntaxKind::MethodDeclaration
                | SyntaxKind::ConstructorDeclaration
                | SyntaxKind::DestructorDeclaration
                | SyntaxKind::PropertyDeclaration
                | SyntaxKind::EventDeclaration
                | SyntaxKind::IndexerDeclaration
                | SyntaxKind::OperatorDeclaration
                | SyntaxKind::ConversionOperatorDeclaration
        )
}

/// Recomputes the flags the full parser had when it reached `node`.
fn context_for(node: &SyntaxNode) -> ParserContext {
    let mut context = ParserContext::default();
    let mut child = node.clone();
    for ancestor in node.ancestors().skip(1) {
        let kind = ancestor.kind();
        match kind {
            SyntaxKind::QueryExpression => context.in_query = true,
            SyntaxKind::TryStatement if child.kind() == SyntaxKind::Block => context.in_try = true,
            SyntaxKind::GlobalStatement => {
                context.in_async = true;
                return context;
            }
            SyntaxKind::CompilationUnit
            | SyntaxKind::NamespaceDeclaration
            | SyntaxKind::FileScopedNamespaceDeclaration
            | SyntaxKind::ClassDeclaration
            | SyntaxKind::StructDeclaration
            | SyntaxKind::InterfaceDeclaration
            | SyntaxKind::RecordDeclaration
            | SyntaxKind::EnumDeclaration => return context,
            _ => {
                if let Some(is_async) = function_body_async(&ancestor, &child) {
                    context.in_async = is_async;
                    return context;
                }
            }
        }
        child = ancestor;
    }
    context
}

/// `Some(is_async)` when `child` is the body of the function-like `node`.
fn function_body_async(node: &SyntaxNode, child: &SyntaxNode) -> Option<bool> {
    let has_async_token = || {
        node.children_with_tokens()
            .any(|element| element.kind() == SyntaxKind::AsyncKw)
    };
    let has_async_modifier = || {
        node.children()
            .filter(|n| n.kind() == SyntaxKind::Modifiers)
            .any(|modifiers| {
                modifiers
                    .children_with_tokens()
                    .any(|element| element.kind() == SyntaxKind::AsyncKw)
            })
    };
    let is_body = matches!(
        child.kind(),
        SyntaxKind::Block | SyntaxKind::ArrowExpressionClause
    );

    match node.kind() {
        SyntaxKind::SimpleLambdaExpression | SyntaxKind::ParenthesizedLambdaExpression => {
            let is_parameters = matches!(
                child.kind(),
                SyntaxKind::Parameter | SyntaxKind::ParameterList
            );
            (!is_parameters).then(has_async_token)
        }
        SyntaxKind::AnonymousMethodExpression => is_body.then(has_async_token),
        SyntaxKind::AccessorDeclaration => is_body.then_some(false),
        SyntaxKind::MethodDeclaration
        | SyntaxKind::LocalFunctionStatement
        | SyntaxKind::ConstructorDeclaration
        | SyntaxKind::DestructorDeclaration
        | SyntaxKind::PropertyDeclaration
        | SyntaxKind::IndexerDeclaration
        | SyntaxKind::OperatorDeclaration
        | SyntaxKind::ConversionOperatorDeclaration => is_body.then(has_async_modifier),
        _ => None,
    }
}

fn edit_intersects(edit: &TextEdit, range: TextRange) -> bool {
    edit.range.start < range.end && range.start < edit.range.end
}

fn edit_touches_lexical_literal(old: &ParseResult, edit: &TextEdit) -> bool {
    if edit.range.is_empty() {
        return match old.token_at_offset(edit.range.start) {
            TokenAtOffset::None => false,
            TokenAtOffset::Single(token) => is_lexically_fragile(&token),
            TokenAtOffset::Between(left, right) => {
                is_lexically_fragile(&left) || is_lexically_fragile(&right)
            }
        };
    }

    let mut token = match old.token_at_offset(edit.range.start) {
        TokenAtOffset::None => None,
        TokenAtOffset::Single(token) => Some(token),
        TokenAtOffset::Between(_, right) => Some(right),
    };
    while let Some(current) = token {
        let range = token_range(&current);
        if range.start >= edit.range.end {
            break;
        }
        if edit_intersects(edit, range) && is_lexically_fragile(&current) {
            return true;
        }
        token = current.next_token();
    }
    false
}

/// Tokens whose extent depends on text beyond the edit.
fn is_lexically_fragile(token: &SyntaxToken) -> bool {
    matches!(
        token.kind(),
        SyntaxKind::StringLiteral
            | SyntaxKind::InterpolatedStringLiteral
            | SyntaxKind::RawStringLiteral
            | SyntaxKind::CharLiteral
            | SyntaxKind::LineComment
            | SyntaxKind::BlockComment
            | SyntaxKind::DocComment
            | SyntaxKind::Error
    )
}

fn edit_overlaps_node_edges(node: &SyntaxNode, edit: &TextEdit) -> bool {
    let first = first_significant_token(node);
    let last = last_significant_token(node);
    [first, last]
        .into_iter()
        .flatten()
        .any(|token| edit_intersects(edit, token_range(&token)))
}

fn first_significant_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| !token.kind().is_trivia())
}

fn last_significant_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    let start = node.text_range().start();
    let mut token = node.last_token()?;
    while token.kind().is_trivia() {
        token = token.prev_token()?;
        if token.text_range().end() <= start {
            return None;
        }
    }
    Some(token)
}

fn token_range(token: &SyntaxToken) -> TextRange {
    let range = token.text_range();
    TextRange {
        start: u32::from(range.start()),
        end: u32::from(range.end()),
    }
}

fn syntax_text_range(node: &SyntaxNode) -> TextRange {
    let range = node.text_range();
    TextRange {
        start: u32::from(range.start()),
        end: u32::from(range.end()),
    }
}
