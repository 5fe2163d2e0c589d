use pretty_assertions::assert_eq;
use proptest::prelude::*;
use proptest::sample::Index;
use sable_syntax::{
    debug_dump, lex, parse, parse_expression, parse_member, parse_statement, reparse, ParseResult,
    SyntaxKind, SyntaxNode, TextEdit, TextRange,
};

const MAX_INPUT_BYTES: usize = 8 * 1024;
const MAX_FRAGMENTS: usize = 512;

const PROGRAM: &str = r#"using System;
using System.Linq;

namespace Shapes
{
    public record Point(int X, int Y);

    public class Canvas
    {
        private readonly List<Point> points = new();

        public int Count => points.Count;

        public void Add(int x, int y)
        {
            if (x < 0 || y < 0) { return; }
            points.Add(new Point(x, y));
        }

        public async Task<int> SumAsync(int limit)
        {
            var total = 0;
            foreach (var point in points)
            {
                total += point.X * limit;
            }
            await Task.Yield();
            return total;
        }

        public IEnumerable<int> Xs() => from p in points where p.X > 1 select p.X;
    }
}
"#;

fn whitespace_fragment() -> impl Strategy<Value = String> {
    const WHITESPACE: &[&str] = &[" ", "  ", "\t", "\n", "\r\n", " \n"];
    proptest::sample::select(WHITESPACE).prop_map(ToString::to_string)
}

fn keyword_fragment() -> impl Strategy<Value = String> {
    const KEYWORDS: &[&str] = &[
        "class", "struct", "record", "namespace", "using", "void", "int", "string", "var",
        "public", "static", "async", "await", "if", "else", "for", "foreach", "in", "while",
        "switch", "case", "default", "break", "return", "new", "try", "catch", "finally",
        "throw", "this", "base", "null", "true", "from", "where", "select", "is", "not", "when",
    ];
    proptest::sample::select(KEYWORDS).prop_map(ToString::to_string)
}

fn identifier_fragment() -> impl Strategy<Value = String> {
    proptest::string::string_regex(r"[A-Za-z_][A-Za-z0-9_]{0,12}").unwrap()
}

fn number_fragment() -> impl Strategy<Value = String> {
    proptest::string::string_regex(r"[0-9]{1,6}").unwrap()
}

fn punctuation_fragment() -> impl Strategy<Value = String> {
    const PUNCTUATION: &[&str] = &[
        "{", "}", "(", ")", "[", "]", ";", ",", ".", ":", "?", "!", "~", "+", "-", "*", "/",
        "%", "=", "<", ">", "&", "|", "^", "==", "!=", "<=", ">=", "&&", "||", "<<", "=>",
        "??", "??=", "?.", "..", "::", "++", "--",
    ];
    proptest::sample::select(PUNCTUATION).prop_map(ToString::to_string)
}

fn literal_body() -> BoxedStrategy<String> {
    proptest::string::string_regex(r"[ a-z0-9]{0,8}")
        .unwrap()
        .boxed()
}

fn literal_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => literal_body().prop_map(|b| format!("\"{b}\"")),
        1 => literal_body().prop_map(|b| format!("\"{b}")),
        1 => literal_body().prop_map(|b| format!("/* {b} */")),
        1 => literal_body().prop_map(|b| format!("// {b}\n")),
    ]
}

fn sableish_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        6 => whitespace_fragment(),
        6 => punctuation_fragment(),
        4 => identifier_fragment(),
        4 => keyword_fragment(),
        2 => number_fragment(),
        2 => literal_fragment(),
    ]
}

fn sableish_source() -> impl Strategy<Value = String> {
    proptest::collection::vec(sableish_fragment(), 0..MAX_FRAGMENTS).prop_map(|fragments| {
        let mut out = String::new();
        for fragment in fragments {
            if out.len() + fragment.len() > MAX_INPUT_BYTES {
                break;
            }
            out.push_str(&fragment);
        }
        out
    })
}

fn check_result(text: &str, result: &ParseResult) -> Result<(), TestCaseError> {
    let root = result.syntax();
    prop_assert_eq!(root.text().to_string(), text);
    check_widths(&root)?;
    for error in &result.errors {
        prop_assert!(error.range.start <= error.range.end);
        prop_assert!(error.range.end as usize <= text.len());
    }
    Ok(())
}

/// Every node is exactly as wide as its children put together.
fn check_widths(root: &SyntaxNode) -> Result<(), TestCaseError> {
    for node in root.descendants() {
        let width = u32::from(node.text_range().len());
        let children: u32 = node
            .children_with_tokens()
            .map(|child| u32::from(child.text_range().len()))
            .sum();
        prop_assert_eq!(width, children, "width mismatch in {:?}", node.kind());
    }
    Ok(())
}

/// Byte ranges of every `Identifier` token in `PROGRAM`.
fn program_identifiers() -> Vec<TextRange> {
    lex(PROGRAM)
        .into_iter()
        .filter(|token| token.kind == SyntaxKind::Identifier)
        .map(|token| token.range)
        .collect()
}

fn program_token_starts() -> Vec<u32> {
    lex(PROGRAM)
        .into_iter()
        .filter(|token| !token.kind.is_trivia())
        .map(|token| token.range.start)
        .collect()
}

fn assert_same_parse(incremental: &ParseResult, full: &ParseResult) {
    assert_eq!(
        debug_dump(&incremental.syntax()),
        debug_dump(&full.syntax())
    );
    assert_eq!(incremental.errors, full.errors);
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn every_entry_point_is_total_and_lossless(input in sableish_source()) {
        check_result(&input, &parse(&input))?;
        check_result(&input, &parse_statement(&input))?;
        check_result(&input, &parse_member(&input))?;
        check_result(&input, &parse_expression(&input))?;
    }

    #[test]
    fn arbitrary_text_is_total_and_lossless(input in any::<String>()) {
        check_result(&input, &parse(&input))?;
        check_result(&input, &parse_statement(&input))?;
        check_result(&input, &parse_member(&input))?;
        check_result(&input, &parse_expression(&input))?;
    }

    #[test]
    fn renaming_an_identifier_matches_a_full_parse(
        which in any::<Index>(),
        name in "v_[a-z0-9]{0,8}",
    ) {
        let old = parse(PROGRAM);
        prop_assert!(old.errors.is_empty());

        let identifiers = program_identifiers();
        let range = identifiers[which.index(identifiers.len())];
        let edit = TextEdit::new(range, name);
        let new_text = edit.apply(PROGRAM).unwrap();

        let incremental = reparse(&old, PROGRAM, &edit, &new_text);
        assert_same_parse(&incremental, &parse(&new_text));
    }

    #[test]
    fn inserting_trivia_between_tokens_matches_a_full_parse(
        which in any::<Index>(),
        trivia in prop_oneof![Just(" "), Just("\n"), Just("/* c */ ")],
    ) {
        let old = parse(PROGRAM);
        let starts = program_token_starts();
        let offset = starts[which.index(starts.len())];
        let edit = TextEdit::insert(offset, trivia);
        let new_text = edit.apply(PROGRAM).unwrap();

        let incremental = reparse(&old, PROGRAM, &edit, &new_text);
        assert_same_parse(&incremental, &parse(&new_text));
    }

    #[test]
    fn arbitrary_edits_keep_reparse_lossless(
        input in sableish_source(),
        start in any::<Index>(),
        len in 0usize..16,
        replacement in sableish_fragment(),
    ) {
        let old = parse(&input);
        let start = if input.is_empty() { 0 } else { start.index(input.len() + 1) };
        let end = (start + len).min(input.len());
        // Generated sources are ASCII, so any byte offset is a char boundary.
        let edit = TextEdit::new(TextRange::new(start, end), replacement);
        let new_text = edit.apply(&input).unwrap();

        let incremental = reparse(&old, &input, &edit, &new_text);
        check_result(&new_text, &incremental)?;
    }
}

#[test]
fn program_fixture_is_error_free() {
    let result = parse(PROGRAM);
    assert_eq!(result.errors, Vec::new());
}
