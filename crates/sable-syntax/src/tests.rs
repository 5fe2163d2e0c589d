use pretty_assertions::assert_eq;

use crate::{
    ast::{AstNode, BinaryExpression, ClassDeclaration, CompilationUnit},
    debug_dump, is_missing, lex, lex_with_errors, parse, parse_cancellable, parse_expression,
    parse_member, parse_statement, parse_with_options, CancellationToken, Cancelled,
    LanguageVersion, ParseOptions, ParseResult, SyntaxKind, SyntaxNode, TextEdit, TextRange,
    MAX_RECURSION_DEPTH,
};

fn dump_non_trivia(input: &str) -> Vec<(SyntaxKind, String)> {
    lex(input)
        .into_iter()
        .filter(|t| !t.kind.is_trivia() && t.kind != SyntaxKind::Eof)
        .map(|t| (t.kind, t.text(input).to_string()))
        .collect()
}

fn assert_lossless(text: &str, result: &ParseResult) {
    let root = result.syntax();
    assert_eq!(root.text().to_string(), text);
    assert_eq!(u32::from(root.text_range().len()) as usize, text.len());
}

fn first(root: &SyntaxNode, kind: SyntaxKind) -> SyntaxNode {
    root.descendants()
        .find(|node| node.kind() == kind)
        .unwrap_or_else(|| panic!("no {kind:?} in\n{}", debug_dump(root)))
}

fn count(root: &SyntaxNode, kind: SyntaxKind) -> usize {
    root.descendants().filter(|node| node.kind() == kind).count()
}

/// Kind of the single node under a fragment root.
fn fragment_kind(result: &ParseResult) -> SyntaxKind {
    result
        .syntax()
        .first_child()
        .map(|node| node.kind())
        .unwrap_or(SyntaxKind::Eof)
}

fn messages(result: &ParseResult) -> Vec<&str> {
    result.errors.iter().map(|e| e.message.as_str()).collect()
}

#[test]
fn syntax_kind_raw_roundtrip_is_total_for_valid_range() {
    use rowan::Language;

    for raw in 0..(SyntaxKind::__Last as u16) {
        let kind = <crate::SableLanguage as Language>::kind_from_raw(rowan::SyntaxKind(raw));
        assert_eq!(
            <crate::SableLanguage as Language>::kind_to_raw(kind).0,
            raw,
            "failed roundtrip for raw={raw}"
        );
    }
}

#[test]
fn lexer_splits_shift_operators() {
    assert_eq!(
        dump_non_trivia("a >>= 1 << 2"),
        vec![
            (SyntaxKind::Identifier, "a".to_string()),
            (SyntaxKind::Greater, ">".to_string()),
            (SyntaxKind::GreaterEq, ">=".to_string()),
            (SyntaxKind::IntLiteral, "1".to_string()),
            (SyntaxKind::LeftShift, "<<".to_string()),
            (SyntaxKind::IntLiteral, "2".to_string()),
        ]
    );
}

#[test]
fn lexer_tokens_tile_the_input() {
    let input = "class /* c */ A { string s = \"x\"; } // tail\n";
    let tokens = lex(input);
    let mut offset = 0;
    for token in &tokens {
        assert_eq!(token.range.start, offset);
        offset = token.range.end;
    }
    assert_eq!(offset as usize, input.len());
    assert_eq!(tokens.last().map(|t| t.kind), Some(SyntaxKind::Eof));
}

#[test]
fn lexer_reports_unterminated_comment() {
    let (_, errors) = lex_with_errors("int x; /* open");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "unterminated block comment");
}

#[test]
fn empty_input_is_an_empty_compilation_unit() {
    let result = parse("");
    assert!(result.errors.is_empty());
    assert_eq!(result.syntax().kind(), SyntaxKind::CompilationUnit);
    assert_lossless("", &result);
}

#[test]
fn parses_a_small_program_without_errors() {
    let text = r#"
using System;
using System.Collections.Generic;

namespace Demo
{
    public static class Program
    {
        private static readonly List<int> Values = new() { 1, 2, 3 };

        public static async Task<int> Main(string[] args)
        {
            var total = 0;
            foreach (var value in Values)
            {
                if (value % 2 == 0) total += value; else continue;
            }
            try { await Task.Delay(1); } catch (Exception e) when (e is not null) { throw; } finally { }
            return total > 0 ? total : -1;
        }

        public int this[int index] => index;
        public event EventHandler Changed;
        public static Program operator +(Program a, Program b) => a;
    }
}
"#;
    let result = parse(text);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_lossless(text, &result);

    let root = result.syntax();
    assert_eq!(count(&root, SyntaxKind::UsingDirective), 2);
    assert_eq!(count(&root, SyntaxKind::MethodDeclaration), 1);
    assert_eq!(count(&root, SyntaxKind::IndexerDeclaration), 1);
    assert_eq!(count(&root, SyntaxKind::EventFieldDeclaration), 1);
    assert_eq!(count(&root, SyntaxKind::OperatorDeclaration), 1);
    assert_eq!(count(&root, SyntaxKind::CatchFilterClause), 1);
    assert_eq!(count(&root, SyntaxKind::AwaitExpression), 1);
}

#[test]
fn generic_invocation_versus_comparison() {
    let generic = parse_expression("a<b,c>(d)");
    assert!(generic.errors.is_empty());
    assert_eq!(fragment_kind(&generic), SyntaxKind::InvocationExpression);
    first(&generic.syntax(), SyntaxKind::GenericName);

    let comparison = parse_expression("x < y");
    assert_eq!(fragment_kind(&comparison), SyntaxKind::BinaryExpression);

    // `a < b, c > d` inside an argument list is two comparisons.
    let args = parse_expression("F(a < b, c > d)");
    assert!(args.errors.is_empty());
    let root = args.syntax();
    assert_eq!(count(&root, SyntaxKind::Argument), 2);
    assert_eq!(count(&root, SyntaxKind::BinaryExpression), 2);
    assert_eq!(count(&root, SyntaxKind::GenericName), 0);
}

#[test]
fn only_out_arguments_declare_variables() {
    let juxtaposed = parse_statement("F(x y);");
    assert_eq!(count(&juxtaposed.syntax(), SyntaxKind::DeclarationExpression), 0);
    assert_eq!(count(&juxtaposed.syntax(), SyntaxKind::Argument), 2);
    assert_eq!(messages(&juxtaposed), vec!["expected `,`"]);

    let out = parse_statement("F(out var x, out int y, ref z);");
    assert!(out.errors.is_empty(), "{:?}", out.errors);
    assert_eq!(count(&out.syntax(), SyntaxKind::DeclarationExpression), 2);
}

#[test]
fn parenthesized_forms_are_disambiguated() {
    let cases = [
        ("(a)", SyntaxKind::ParenthesizedExpression),
        ("(a, b)", SyntaxKind::TupleExpression),
        ("(int)a", SyntaxKind::CastExpression),
        ("(T)x", SyntaxKind::CastExpression),
        ("(x) + 1", SyntaxKind::BinaryExpression),
        ("(a, b) => a", SyntaxKind::ParenthesizedLambdaExpression),
        ("(x) => x + 1", SyntaxKind::ParenthesizedLambdaExpression),
        ("x => x + 1", SyntaxKind::SimpleLambdaExpression),
        ("async x => x", SyntaxKind::SimpleLambdaExpression),
    ];
    for (text, expected) in cases {
        let result = parse_expression(text);
        assert!(result.errors.is_empty(), "{text}: {:?}", result.errors);
        assert_eq!(fragment_kind(&result), expected, "{text}");
        assert_lossless(text, &result);
    }
}

#[test]
fn new_expression_forms() {
    let cases = [
        ("new Foo()", SyntaxKind::ObjectCreationExpression),
        ("new Foo { A = 1 }", SyntaxKind::ObjectCreationExpression),
        ("new Foo { }", SyntaxKind::ObjectCreationExpression),
        ("new T[5]", SyntaxKind::ArrayCreationExpression),
        ("new()", SyntaxKind::ImplicitObjectCreationExpression),
        ("new[] { 1, 2 }", SyntaxKind::ImplicitArrayCreationExpression),
        ("new int[3]", SyntaxKind::ArrayCreationExpression),
        ("new { A = 1, b }", SyntaxKind::AnonymousObjectCreationExpression),
    ];
    for (text, expected) in cases {
        let result = parse_expression(text);
        assert!(result.errors.is_empty(), "{text}: {:?}", result.errors);
        assert_eq!(fragment_kind(&result), expected, "{text}");
    }
}

#[test]
fn binary_precedence_and_associativity() {
    let result = parse_expression("a + b * c");
    let top = BinaryExpression::cast(result.syntax().first_child().unwrap()).unwrap();
    assert_eq!(top.op_token().unwrap().kind(), SyntaxKind::Plus);
    assert_eq!(top.rhs().unwrap().kind(), SyntaxKind::BinaryExpression);

    let result = parse_expression("a - b - c");
    let top = BinaryExpression::cast(result.syntax().first_child().unwrap()).unwrap();
    assert_eq!(top.lhs().unwrap().kind(), SyntaxKind::BinaryExpression);

    let result = parse_expression("a ?? b ?? c");
    let top = BinaryExpression::cast(result.syntax().first_child().unwrap()).unwrap();
    assert_eq!(top.rhs().unwrap().kind(), SyntaxKind::BinaryExpression);

    let result = parse_expression("a = b = c");
    let top = result.syntax().first_child().unwrap();
    assert_eq!(top.kind(), SyntaxKind::AssignmentExpression);
    assert_eq!(
        top.children().last().map(|n| n.kind()),
        Some(SyntaxKind::AssignmentExpression)
    );
}

#[test]
fn range_binds_looser_than_additive() {
    let result = parse_expression("a..b + 1");
    assert!(result.errors.is_empty());
    let range = result.syntax().first_child().unwrap();
    assert_eq!(range.kind(), SyntaxKind::RangeExpression);
    assert_eq!(
        range.children().last().map(|n| n.kind()),
        Some(SyntaxKind::BinaryExpression)
    );
}

#[test]
fn adjacent_greater_tokens_join_only_in_expressions() {
    let shift = parse_expression("x >> 1");
    let tokens: Vec<_> = shift
        .syntax()
        .descendants_with_tokens()
        .filter_map(|it| it.into_token())
        .filter(|t| t.kind() == SyntaxKind::RightShift)
        .map(|t| t.text().to_string())
        .collect();
    assert_eq!(tokens, vec![">>".to_string()]);

    let nested = parse_statement("List<List<int>> xs = null;");
    assert!(nested.errors.is_empty());
    assert_eq!(fragment_kind(&nested), SyntaxKind::LocalDeclarationStatement);
    let closers = nested
        .syntax()
        .descendants_with_tokens()
        .filter_map(|it| it.into_token())
        .filter(|t| t.kind() == SyntaxKind::Greater)
        .count();
    assert_eq!(closers, 2);
}

#[test]
fn declarations_versus_expression_statements() {
    let cases = [
        ("int x = 1;", SyntaxKind::LocalDeclarationStatement),
        ("var x = y;", SyntaxKind::LocalDeclarationStatement),
        ("List<int> xs = new();", SyntaxKind::LocalDeclarationStatement),
        ("const int X = 1;", SyntaxKind::LocalDeclarationStatement),
        ("x = 1;", SyntaxKind::ExpressionStatement),
        ("Foo(x);", SyntaxKind::ExpressionStatement),
        ("a.b.c = 1;", SyntaxKind::ExpressionStatement),
        ("static int F() => 1;", SyntaxKind::LocalFunctionStatement),
        ("label: x++;", SyntaxKind::LabeledStatement),
    ];
    for (text, expected) in cases {
        let result = parse_statement(text);
        assert!(result.errors.is_empty(), "{text}: {:?}", result.errors);
        assert_eq!(fragment_kind(&result), expected, "{text}");
    }
}

#[test]
fn switch_labels_are_pattern_labels() {
    let text = "switch (x) { case 1: break; case int y when y > 0: break; default: break; }";
    let result = parse_statement(text);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let root = result.syntax();
    assert_eq!(count(&root, SyntaxKind::SwitchSection), 3);
    assert_eq!(count(&root, SyntaxKind::CasePatternSwitchLabel), 2);
    assert_eq!(count(&root, SyntaxKind::DefaultSwitchLabel), 1);
    assert_eq!(count(&root, SyntaxKind::WhenClause), 1);
}

#[test]
fn query_expressions() {
    let text = "from x in xs where x > 1 orderby x descending select x * 2";
    let result = parse_expression(text);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(fragment_kind(&result), SyntaxKind::QueryExpression);
    let root = result.syntax();
    first(&root, SyntaxKind::WhereClause);
    first(&root, SyntaxKind::OrderByClause);
    first(&root, SyntaxKind::SelectClause);
}

#[test]
fn top_level_statements_allow_await() {
    let text = "await Task.Delay(1);\nclass C { }\n";
    let result = parse(text);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let root = result.syntax();
    first(&root, SyntaxKind::GlobalStatement);
    first(&root, SyntaxKind::AwaitExpression);
    first(&root, SyntaxKind::ClassDeclaration);
}

#[test]
fn missing_expression_recovers_within_the_member() {
    let text = "class C {\n    void M() {\n        int x = ;\n    }\n    void N() { }\n}\n";
    let result = parse(text);
    assert_lossless(text, &result);
    assert_eq!(messages(&result), vec!["expected expression"]);

    let missing = result.errors[0].range;
    assert!(missing.is_empty());
    assert_eq!(&text[..missing.start as usize], "class C {\n    void M() {\n        int x =");

    let unit = CompilationUnit::cast(result.syntax()).unwrap();
    let class = unit
        .members()
        .find_map(|m| ClassDeclaration::cast(m.syntax().clone()))
        .unwrap();
    let names: Vec<_> = class
        .methods()
        .filter_map(|m| m.name())
        .map(|t| t.text().to_string())
        .collect();
    assert_eq!(names, vec!["M".to_string(), "N".to_string()]);

    let placeholder = result
        .syntax()
        .descendants_with_tokens()
        .filter_map(|it| it.into_token())
        .find(is_missing)
        .expect("missing token");
    assert_eq!(placeholder.kind(), SyntaxKind::Identifier);
}

#[test]
fn unclosed_argument_list_stops_at_statement_boundary() {
    let text = "class C {\n    void M() {\n        Foo(;\n        Bar();\n    }\n    void N() { }\n}\n";
    let result = parse(text);
    assert_lossless(text, &result);
    assert!(!result.errors.is_empty());

    let root = result.syntax();
    assert_eq!(count(&root, SyntaxKind::MethodDeclaration), 2);
    assert_eq!(count(&root, SyntaxKind::InvocationExpression), 2);
}

#[test]
fn stray_tokens_become_error_nodes() {
    let text = "class A { } ) class B { }";
    let result = parse(text);
    assert_lossless(text, &result);
    assert_eq!(result.errors.len(), 1);

    let root = result.syntax();
    assert_eq!(count(&root, SyntaxKind::ClassDeclaration), 2);
    let error = first(&root, SyntaxKind::Error);
    assert_eq!(error.text().to_string().trim(), ")");
}

#[test]
fn malformed_parameter_list_stops_at_the_body() {
    let text = "class C { void M(int a, % ^ { return; } }";
    let result = parse(text);
    assert_lossless(text, &result);
    assert!(!result.errors.is_empty());

    let root = result.syntax();
    let method = first(&root, SyntaxKind::MethodDeclaration);
    let parameters = first(&method, SyntaxKind::ParameterList);
    assert!(!parameters.text().to_string().contains('{'));
    let body = method
        .children()
        .find(|node| node.kind() == SyntaxKind::Block)
        .expect("method body");
    assert_eq!(body.text().to_string(), "{ return; }");
    assert_eq!(count(&body, SyntaxKind::ReturnStatement), 1);
}

#[test]
fn errors_in_scopes_diagnostics_to_a_node() {
    let text = "class A { void M() { int x = ; } } class B { }";
    let result = parse(text);
    let classes: Vec<_> = result
        .syntax()
        .children()
        .filter(|n| n.kind() == SyntaxKind::ClassDeclaration)
        .collect();
    assert_eq!(classes.len(), 2);
    assert_eq!(result.errors_in(&classes[0]).count(), 1);
    assert_eq!(result.errors_in(&classes[1]).count(), 0);
}

#[test]
fn token_lookup_by_offset() {
    let text = "class Foo { }";
    let result = parse(text);
    let token = result.token_at_offset(7).right_biased().unwrap();
    assert_eq!(token.text(), "Foo");

    let element = result.covering_element(TextRange::new(6, 9));
    assert_eq!(element.kind(), SyntaxKind::Identifier);
}

#[test]
fn fragment_entry_points() {
    let member = parse_member("public void M() { }");
    assert!(member.errors.is_empty());
    assert_eq!(member.syntax().kind(), SyntaxKind::MemberFragment);
    assert_eq!(fragment_kind(&member), SyntaxKind::MethodDeclaration);

    let empty = parse_statement("");
    assert_eq!(fragment_kind(&empty), SyntaxKind::EmptyStatement);
    assert_eq!(messages(&empty), vec!["expected statement"]);

    let trailing = parse_expression("1 + 2 )");
    assert_eq!(messages(&trailing), vec!["unexpected tokens after expression"]);
    assert_lossless("1 + 2 )", &trailing);
}

fn on_big_stack<F: FnOnce() + Send + 'static>(f: F) {
    std::thread::Builder::new()
        .stack_size(8 * 1024 * 1024)
        .spawn(f)
        .expect("spawn test thread")
        .join()
        .expect("test thread panicked");
}

#[test]
fn deep_nesting_degrades_without_overflowing() {
    on_big_stack(|| {
        let text = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        let result = parse_expression(&text);
        assert_lossless(&text, &result);
        assert_eq!(messages(&result), vec![crate::parser::TOO_DEEP]);
        first(&result.syntax(), SyntaxKind::Error);

        let text = format!("class C {{ int x = {}1; }}", "- ".repeat(10_000));
        let result = parse(&text);
        assert_lossless(&text, &result);
        assert_eq!(messages(&result), vec![crate::parser::TOO_DEEP]);
        assert_eq!(count(&result.syntax(), SyntaxKind::ClassDeclaration), 0);
    });
}

#[test]
fn deep_nesting_keeps_members_completed_before_it() {
    on_big_stack(|| {
        let nested = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        let good = "class Good { void M() { int ok = 1; } }";
        let text = format!("{good}\nclass Deep {{ int x = {nested}; }}\n");
        let result = parse(&text);
        assert_lossless(&text, &result);
        assert_eq!(messages(&result), vec![crate::parser::TOO_DEEP]);
        assert_eq!(result.errors[0].range.start as usize, good.len() + 1);

        let root = result.syntax();
        assert_eq!(count(&root, SyntaxKind::ClassDeclaration), 1);
        assert_eq!(first(&root, SyntaxKind::ClassDeclaration).text().to_string(), good);
        let error = first(&root, SyntaxKind::Error);
        assert_eq!(error.parent().map(|p| p.kind()), Some(SyntaxKind::CompilationUnit));
        assert!(error.text().to_string().trim_start().starts_with("class Deep"));

        let text = format!("namespace N {{ class A {{ }} class B {{ int x = {nested}; }} }}");
        let result = parse(&text);
        assert_lossless(&text, &result);
        assert_eq!(messages(&result), vec![crate::parser::TOO_DEEP]);

        let namespace = first(&result.syntax(), SyntaxKind::NamespaceDeclaration);
        assert_eq!(count(&namespace, SyntaxKind::ClassDeclaration), 1);
        let error = first(&namespace, SyntaxKind::Error);
        assert_eq!(error.parent().map(|p| p.kind()), Some(SyntaxKind::NamespaceDeclaration));
        assert!(error.text().to_string().trim_start().starts_with("class B"));
    });
}

#[test]
fn deep_fragments_degrade_to_their_placeholder_shapes() {
    on_big_stack(|| {
        let nested = format!("{}1{};", "(".repeat(10_000), ")".repeat(10_000));

        let statement = parse_statement(&format!("x = {nested}"));
        assert_eq!(fragment_kind(&statement), SyntaxKind::EmptyStatement);
        assert_eq!(messages(&statement), vec![crate::parser::TOO_DEEP]);

        let member = parse_member(&format!("int x = {nested}"));
        assert_eq!(fragment_kind(&member), SyntaxKind::IncompleteMember);
        assert_eq!(messages(&member), vec![crate::parser::TOO_DEEP]);
        assert_eq!(member.syntax().text().to_string(), format!("int x = {nested}"));
    });
}

#[test]
fn nesting_within_the_limit_parses() {
    on_big_stack(|| {
        let depth = (MAX_RECURSION_DEPTH / 8) as usize;
        let text = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        let result = parse_expression(&text);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(count(&result.syntax(), SyntaxKind::ParenthesizedExpression), depth);
    });
}

#[test]
fn cancelled_parse_returns_cancelled() {
    let token = CancellationToken::new();
    let opts = ParseOptions::default();
    assert!(parse_cancellable("class C { }", &opts, &token).is_ok());

    token.cancel();
    assert_eq!(
        parse_cancellable("class C { void M() { } }", &opts, &token).err(),
        Some(Cancelled)
    );
}

#[test]
fn parse_with_options_reports_feature_gates() {
    let text = "namespace N;\nclass C { }\n";
    let old = parse_with_options(
        text,
        &ParseOptions {
            language_version: LanguageVersion::V9,
        },
    );
    assert!(old.result.errors.is_empty());
    assert_eq!(old.diagnostics.len(), 1);
    assert_eq!(old.diagnostics[0].code, "feature-unavailable");

    let latest = parse_with_options(text, &ParseOptions::default());
    assert!(latest.diagnostics.is_empty());
}

#[test]
fn text_edit_application() {
    let edit = TextEdit::new(TextRange::new(6, 9), "Bar");
    assert_eq!(edit.apply("class Foo { }").unwrap(), "class Bar { }");
    assert_eq!(edit.delta(), 0);

    let insert = TextEdit::insert(0, "public ");
    assert_eq!(insert.delta(), 7);
    assert_eq!(insert.apply("class A {}").unwrap(), "public class A {}");

    let out_of_bounds = TextEdit::delete(TextRange::new(3, 40));
    assert!(out_of_bounds.apply("short").is_err());

    let split_char = TextEdit::delete(TextRange::new(1, 2));
    assert!(split_char.apply("é").is_err());
}
