//! Shared types used across Sable crates.
//!
//! This crate stays deliberately small: source spans, diagnostics, and the builtin
//! operator tables consumed by later compiler phases.

use std::fmt;

use serde::Serialize;

pub mod builtin_ops;

pub use builtin_ops::{
    classify_binary_operator, BinaryOperatorKind, BuiltinOperatorSignature, OperandType,
    PrimitiveType,
};

/// A byte-span into a source string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{})", self.start, self.end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span,
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_len_saturates_on_inverted_ranges() {
        assert_eq!(Span::new(4, 2).len(), 0);
        assert!(Span::new(4, 2).is_empty());
        assert_eq!(Span::new(2, 7).len(), 5);
    }

    #[test]
    fn span_debug_uses_range_syntax() {
        assert_eq!(format!("{:?}", Span::new(1, 3)), "Span(1..3)");
    }

    #[test]
    fn diagnostic_serializes_with_lowercase_severity() {
        let diag = Diagnostic::warning("demo", "message", Some(Span::new(0, 4)));
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["code"], "demo");
        assert_eq!(json["span"]["end"], 4);
    }
}
