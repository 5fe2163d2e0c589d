use sable_types::{Diagnostic, Span};

use crate::language_level::{Feature, FeatureAvailability, LanguageVersion};
use crate::{SyntaxKind, SyntaxNode, SyntaxToken};

pub(crate) fn feature_gate_diagnostics(
    root: &SyntaxNode,
    version: LanguageVersion,
) -> Vec<Diagnostic> {
    let mut gate = Gate {
        version,
        out: Vec::new(),
    };

    for node in root.descendants() {
        gate.node(&node);
    }
    for token in root
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
    {
        gate.token(&token);
    }
    if let Some(first) = root
        .children()
        .find(|node| node.kind() == SyntaxKind::GlobalStatement)
    {
        // One report per file is enough for top-level code.
        gate.report_node(Feature::TopLevelStatements, &first);
    }

    let mut diagnostics = gate.out;
    diagnostics.sort_by_key(|diag| diag.span.map(|span| (span.start, span.end)));
    diagnostics
}

struct Gate {
    version: LanguageVersion,
    out: Vec<Diagnostic>,
}

impl Gate {
    fn node(&mut self, node: &SyntaxNode) {
        match node.kind() {
            SyntaxKind::TupleExpression | SyntaxKind::TupleType => {
                self.report_node(Feature::Tuples, node);
            }
            SyntaxKind::SwitchExpression => {
                self.report_child_token(Feature::SwitchExpressions, node, SyntaxKind::SwitchKw);
            }
            SyntaxKind::RangeExpression => self.report_node(Feature::RangesAndIndices, node),
            SyntaxKind::PrefixUnaryExpression => {
                self.report_child_token(Feature::RangesAndIndices, node, SyntaxKind::Caret);
            }
            SyntaxKind::ForEachStatement | SyntaxKind::UsingStatement => {
                self.report_child_token(Feature::AsyncStreams, node, SyntaxKind::AwaitKw);
            }
            SyntaxKind::LocalDeclarationStatement => {
                self.report_child_token(Feature::AsyncStreams, node, SyntaxKind::AwaitKw);
                self.report_child_token(Feature::UsingDeclarations, node, SyntaxKind::UsingKw);
            }
            SyntaxKind::RecordDeclaration => {
                self.report_child_token(Feature::Records, node, SyntaxKind::RecordKw);
                self.report_child_token(Feature::RecordStructs, node, SyntaxKind::StructKw);
            }
            SyntaxKind::ImplicitObjectCreationExpression => {
                self.report_child_token(Feature::TargetTypedNew, node, SyntaxKind::NewKw);
            }
            SyntaxKind::BinaryPattern => {
                self.report_child_token(Feature::PatternCombinators, node, SyntaxKind::AndKw);
                self.report_child_token(Feature::PatternCombinators, node, SyntaxKind::OrKw);
            }
            SyntaxKind::UnaryPattern => {
                self.report_child_token(Feature::PatternCombinators, node, SyntaxKind::NotKw);
            }
            SyntaxKind::RelationalPattern => {
                if let Some(op) = first_significant_token(node) {
                    self.report(Feature::RelationalPatterns, span_of_token(&op));
                }
            }
            SyntaxKind::FileScopedNamespaceDeclaration => {
                self.report_child_token(
                    Feature::FileScopedNamespaces,
                    node,
                    SyntaxKind::NamespaceKw,
                );
            }
            SyntaxKind::UsingDirective => {
                self.report_child_token(Feature::GlobalUsings, node, SyntaxKind::GlobalKw);
            }
            _ => {}
        }
    }

    fn token(&mut self, token: &SyntaxToken) {
        let in_modifiers = || {
            token
                .parent()
                .is_some_and(|parent| parent.kind() == SyntaxKind::Modifiers)
        };
        match token.kind() {
            SyntaxKind::RawStringLiteral => {
                self.report(Feature::RawStringLiterals, span_of_token(token));
            }
            SyntaxKind::QuestionQuestionEq => {
                self.report(Feature::NullCoalescingAssignment, span_of_token(token));
            }
            SyntaxKind::RequiredKw if in_modifiers() => {
                self.report(Feature::RequiredMembers, span_of_token(token));
            }
            SyntaxKind::FileKw if in_modifiers() => {
                self.report(Feature::FileLocalTypes, span_of_token(token));
            }
            _ => {}
        }
    }

    fn report_child_token(&mut self, feature: Feature, node: &SyntaxNode, kind: SyntaxKind) {
        if self.version.is_enabled(feature) {
            return;
        }
        let Some(token) = node
            .children_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| token.kind() == kind && !token.text().is_empty())
        else {
            return;
        };
        self.report(feature, span_of_token(&token));
    }

    fn report_node(&mut self, feature: Feature, node: &SyntaxNode) {
        if self.version.is_enabled(feature) {
            return;
        }
        let (Some(first), Some(last)) = (first_significant_token(node), last_significant_token(node))
        else {
            return;
        };
        let span = Span::new(span_of_token(&first).start, span_of_token(&last).end);
        self.report(feature, span);
    }

    fn report(&mut self, feature: Feature, span: Span) {
        if self.version.is_enabled(feature) {
            return;
        }
        self.out.push(feature_error(self.version, feature, span));
    }
}

fn feature_error(version: LanguageVersion, feature: Feature, span: Span) -> Diagnostic {
    let code = match version.availability(feature) {
        FeatureAvailability::Preview => "feature-preview",
        FeatureAvailability::Stable | FeatureAvailability::Unavailable => "feature-unavailable",
    };
    Diagnostic::error(code, feature_message(version, feature), Some(span))
}

fn feature_message(version: LanguageVersion, feature: Feature) -> String {
    match version.availability(feature) {
        FeatureAvailability::Stable => {
            // Only called for disabled features.
            format!("{} is enabled in this language version", feature.display_name())
        }
        FeatureAvailability::Preview => format!(
            "{} is a preview feature in Sable {} and requires `{}-preview`",
            feature.display_name(),
            version.major,
            version.major
        ),
        FeatureAvailability::Unavailable => format!(
            "{} requires Sable {}+",
            feature.display_name(),
            feature.stable_since()
        ),
    }
}

fn first_significant_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| !token.kind().is_trivia() && !token.text().is_empty())
}

fn last_significant_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| !token.kind().is_trivia() && !token.text().is_empty())
        .last()
}

fn span_of_token(token: &SyntaxToken) -> Span {
    let range = token.text_range();
    Span::new(u32::from(range.start()) as usize, u32::from(range.end()) as usize)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parse;

    fn gate(text: &str, version: LanguageVersion) -> Vec<(&'static str, String)> {
        let result = parse(text);
        feature_gate_diagnostics(&result.syntax(), version)
            .into_iter()
            .map(|diag| {
                let span = diag.span.expect("feature diagnostics carry a span");
                (diag.code, text[span.start..span.end].to_string())
            })
            .collect()
    }

    #[test]
    fn latest_reports_nothing() {
        let text = "global using System;\nnamespace N;\nrecord struct P(int X);\nclass C { required int X { get; init; } }\n";
        assert_eq!(gate(text, LanguageVersion::LATEST), vec![]);
    }

    #[test]
    fn records_and_namespaces_are_gated() {
        let text = "namespace N;\nrecord R(int X);\n";
        assert_eq!(
            gate(text, LanguageVersion::V8),
            vec![
                ("feature-unavailable", "namespace".to_string()),
                ("feature-unavailable", "record".to_string()),
            ]
        );
    }

    #[test]
    fn expression_features_are_gated() {
        let text = "class C { void M() { var t = (1, 2); x ??= y; var s = v switch { _ => 0 }; } }";
        assert_eq!(
            gate(text, LanguageVersion::V7),
            vec![
                ("feature-unavailable", "??=".to_string()),
                ("feature-unavailable", "switch".to_string()),
            ]
        );
    }

    #[test]
    fn top_level_statements_report_once() {
        let text = "Console.WriteLine(1);\nConsole.WriteLine(2);\n";
        let diags = gate(text, LanguageVersion::V8);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].1, "Console.WriteLine(1);");
    }

    #[test]
    fn preview_features_use_the_preview_code() {
        let text = "class C { required int X; }";
        assert_eq!(
            gate(text, LanguageVersion::V10),
            vec![("feature-preview", "required".to_string())]
        );
        assert_eq!(gate(text, LanguageVersion::V10.with_preview(true)), vec![]);
    }
}
