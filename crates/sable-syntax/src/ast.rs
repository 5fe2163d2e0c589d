//! Typed views over the untyped `rowan` tree.
//!
//! Wrappers are thin: each owns a [`SyntaxNode`] whose kind it checked on cast,
//! and every accessor looks at direct children only. Missing pieces come back as
//! `None`, so the views work unchanged over trees with recovery nodes in them.

use crate::parser::SyntaxNode;
use crate::syntax_kind::SyntaxKind;

pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(syntax: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

pub mod support {
    use crate::ast::AstNode;
    use crate::parser::{SyntaxNode, SyntaxToken};
    use crate::syntax_kind::SyntaxKind;

    pub fn child<N: AstNode>(node: &SyntaxNode) -> Option<N> {
        node.children().find_map(N::cast)
    }

    pub fn children<'a, N: AstNode + 'a>(node: &'a SyntaxNode) -> impl Iterator<Item = N> + 'a {
        node.children().filter_map(N::cast)
    }

    pub fn token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
        node.children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|tok| tok.kind() == kind)
    }

    /// The declared name among the node's direct children.
    ///
    /// Contextual keywords such as `record` are identifier-like and come before the
    /// name, so the last identifier-like token wins. Missing names are skipped.
    pub fn ident_token(node: &SyntaxNode) -> Option<SyntaxToken> {
        node.children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|tok| tok.kind().is_identifier_like() && !tok.text().is_empty())
            .last()
    }

    /// Non-trivia token text of `node`, concatenated.
    pub fn compact_text(node: &SyntaxNode) -> String {
        node.descendants_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|tok| !tok.kind().is_trivia())
            .map(|tok| tok.text().to_string())
            .collect()
    }
}

mod nodes;

pub use nodes::*;

#[cfg(test)]
mod tests;
