use pretty_assertions::assert_eq;

use rowan::NodeOrToken;
use sable_syntax::{parse, ParseError, SyntaxNode};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[test]
fn golden_corpus() -> io::Result<()> {
    let bless = std::env::var_os("BLESS").is_some();
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let testdata_dir = manifest_dir.join("testdata");

    run_parser_fixtures(&testdata_dir.join("parser"))?;
    run_recovery_fixtures(&testdata_dir.join("recovery"), bless)?;

    Ok(())
}

/// Well-formed sources: no errors, and the tree reproduces the input.
fn run_parser_fixtures(root: &Path) -> io::Result<()> {
    for path in collect_fixtures(root)? {
        let input = read_normalized(&path)?;
        let parsed = parse(&input);

        if !parsed.errors.is_empty() {
            panic!(
                "expected no parse errors for parser fixture `{}`\n{}",
                path.display(),
                format_errors(&input, &parsed.errors)
            );
        }
        assert_eq!(parsed.syntax().text().to_string(), input);
    }

    Ok(())
}

/// Malformed sources: the recovered tree and the errors must match the
/// `.tree` and `.errors` files next to each fixture.
fn run_recovery_fixtures(root: &Path, bless: bool) -> io::Result<()> {
    for path in collect_fixtures(root)? {
        let input = read_normalized(&path)?;
        let parsed = parse(&input);

        assert!(
            !parsed.errors.is_empty(),
            "recovery fixture `{}` parsed without errors",
            path.display()
        );
        assert_eq!(parsed.syntax().text().to_string(), input);

        let tree_dump = outline(&parsed.syntax());
        let errors_dump = format_errors(&input, &parsed.errors);
        let tree_path = path.with_extension("tree");
        let errors_path = path.with_extension("errors");

        if bless {
            write_if_changed(&tree_path, &tree_dump)?;
            write_if_changed(&errors_path, &errors_dump)?;
        } else {
            assert_eq!(
                tree_dump,
                read_expected(&tree_path)?,
                "tree mismatch for recovery fixture `{}`",
                path.display()
            );
            assert_eq!(
                errors_dump,
                read_expected(&errors_path)?,
                "errors mismatch for recovery fixture `{}`",
                path.display()
            );
        }
    }

    Ok(())
}

/// Indented node kinds and significant tokens; trivia is left out.
fn outline(node: &SyntaxNode) -> String {
    fn go(node: &SyntaxNode, indent: usize, out: &mut String) {
        use std::fmt::Write;
        let _ = writeln!(out, "{:indent$}{:?}", "", node.kind(), indent = indent);
        for child in node.children_with_tokens() {
            match child {
                NodeOrToken::Node(n) => go(&n, indent + 2, out),
                NodeOrToken::Token(t) if t.kind().is_trivia() => {}
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

fn collect_fixtures(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    if !root.exists() {
        return Ok(out);
    }
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if path.extension() == Some(OsStr::new("sb")) {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

fn read_normalized(path: &Path) -> io::Result<String> {
    let raw = fs::read_to_string(path)?;
    Ok(normalize_newlines(&raw))
}

fn read_expected(path: &Path) -> io::Result<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(normalize_newlines(&contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!(
                "missing expected file `{}` (run with `BLESS=1` to generate)",
                path.display()
            ),
        )),
        Err(err) => Err(err),
    }
}

fn write_if_changed(path: &Path, contents: &str) -> io::Result<()> {
    let contents = normalize_newlines(contents);
    if let Ok(existing) = fs::read_to_string(path) {
        if normalize_newlines(&existing) == contents {
            return Ok(());
        }
    }
    fs::write(path, contents)
}

fn normalize_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

fn format_errors(source: &str, errors: &[ParseError]) -> String {
    let mut out = String::new();
    for error in errors {
        let (line, col) = byte_offset_to_line_col(source, error.range.start as usize);
        out.push_str(&format!("{line}:{col}: {}\n", error.message));
    }
    out
}

fn byte_offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1usize;
    let mut col = 1usize;

    for (idx, ch) in source.char_indices() {
        if idx >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}
