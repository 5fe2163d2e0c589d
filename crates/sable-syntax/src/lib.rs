//! Syntax tree and parsing primitives for Sable.
//!
//! The entry points:
//! - [`parse`]: parses a compilation unit into a lossless, error-tolerant
//!   `rowan` tree plus a list of [`ParseError`]s. It never fails.
//! - [`parse_with_options`]: the same, plus feature-gate diagnostics for the
//!   configured [`LanguageVersion`].
//! - [`parse_statement`], [`parse_member`], [`parse_expression`]: parse a single
//!   construct; used by tooling that evaluates snippets.
//! - [`reparse`]: incrementally updates a previous parse after one text edit.

pub mod ast;
mod cancel;
mod feature_gate;
mod incremental;
mod language_level;
mod lexer;
mod parser;
mod syntax_kind;

pub use cancel::{CancellationToken, Cancelled};
pub use incremental::{parse_incremental, reparse};
pub use language_level::{
    Feature, FeatureAvailability, LanguageVersion, ParseLanguageVersionError,
};
pub use lexer::{lex, lex_with_errors, LexError, Lexer, Token};
pub use parser::{
    binary_precedence, debug_dump, is_missing, is_right_associative, parse, parse_expression,
    parse_member, parse_statement, ParseResult, Precedence, SyntaxElement, SyntaxNode,
    SyntaxToken, MAX_RECURSION_DEPTH,
};
pub use syntax_kind::{SableLanguage, SyntaxKind};

use serde::{Deserialize, Serialize};

/// Options that influence parsing diagnostics.
///
/// The parser always accepts the newest grammar. The language version only
/// affects *post-parse* feature-gate diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub language_version: LanguageVersion,
}

#[derive(Debug, Clone)]
pub struct SourceParse {
    pub result: ParseResult,
    pub diagnostics: Vec<sable_types::Diagnostic>,
}

pub fn parse_with_options(text: &str, opts: &ParseOptions) -> SourceParse {
    let result = parser::parse(text);
    let diagnostics =
        feature_gate::feature_gate_diagnostics(&result.syntax(), opts.language_version);
    SourceParse {
        result,
        diagnostics,
    }
}

/// Like [`parse_with_options`], but gives up as soon as `cancellation` fires.
pub fn parse_cancellable(
    text: &str,
    opts: &ParseOptions,
    cancellation: &CancellationToken,
) -> Result<SourceParse, Cancelled> {
    let result = parser::parse_cancellable(text, cancellation)?;
    let diagnostics =
        feature_gate::feature_gate_diagnostics(&result.syntax(), opts.language_version);
    Ok(SourceParse {
        result,
        diagnostics,
    })
}

/// Run the feature gate pass on an already-parsed tree.
pub fn feature_gate_diagnostics(
    root: &SyntaxNode,
    language_version: LanguageVersion,
) -> Vec<sable_types::Diagnostic> {
    feature_gate::feature_gate_diagnostics(root, language_version)
}

/// A half-open byte range within a source file (`start..end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: u32,
    pub end: u32,
}

impl TextRange {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self {
            start: start as u32,
            end: end as u32,
        }
    }

    #[inline]
    pub fn len(self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub message: String,
    pub range: TextRange,
}

/// A single edit to a UTF-8 source buffer.
///
/// The edit uses byte offsets and applies `replacement` over `range` (half-open).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub range: TextRange,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextEditError {
    #[error("edit range {start}..{end} is out of bounds for text of length {len}")]
    OutOfBounds { start: u32, end: u32, len: usize },
    #[error("edit range {start}..{end} does not fall on character boundaries")]
    NotCharBoundary { start: u32, end: u32 },
}

impl TextEdit {
    pub fn new(range: TextRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn insert(offset: u32, text: impl Into<String>) -> Self {
        Self::new(
            TextRange {
                start: offset,
                end: offset,
            },
            text,
        )
    }

    pub fn delete(range: TextRange) -> Self {
        Self::new(range, String::new())
    }

    /// Net byte change produced by this edit (`replacement.len() - range.len()`).
    pub fn delta(&self) -> isize {
        self.replacement.len() as isize - self.range.len() as isize
    }

    /// Returns `text` with this edit applied.
    pub fn apply(&self, text: &str) -> Result<String, TextEditError> {
        let TextRange { start, end } = self.range;
        if start > end || end as usize > text.len() {
            return Err(TextEditError::OutOfBounds {
                start,
                end,
                len: text.len(),
            });
        }
        if !text.is_char_boundary(start as usize) || !text.is_char_boundary(end as usize) {
            return Err(TextEditError::NotCharBoundary { start, end });
        }
        let mut out = String::with_capacity((text.len() as isize + self.delta()).max(0) as usize);
        out.push_str(&text[..start as usize]);
        out.push_str(&self.replacement);
        out.push_str(&text[end as usize..]);
        Ok(out)
    }
}

#[cfg(test)]
mod tests;
