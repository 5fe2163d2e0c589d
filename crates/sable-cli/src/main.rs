use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use sable_syntax::{
    debug_dump, parse, parse_with_options, reparse, LanguageVersion, ParseError, ParseOptions,
    TextEdit, TextRange,
};
use sable_types::{Diagnostic, Severity};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sable", version, about = "Sable syntax tools (parse, check, reparse)")]
struct Cli {
    /// Log level or `EnvFilter` directives; `RUST_LOG` takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    /// Raise the log level (`-v` debug, `-vv` trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the syntax tree, parse errors and feature diagnostics for a file
    Parse(ParseArgs),
    /// Report errors for one or more files; exits with 1 if any were found
    Check(CheckArgs),
    /// Apply one edit and compare the incremental reparse with a full parse
    Reparse(ReparseArgs),
}

#[derive(Args)]
struct VersionArgs {
    /// Language version used for feature diagnostics (`10`, `11-preview`, `latest`)
    #[arg(long, env = "SABLE_LANGUAGE_VERSION", default_value = "latest")]
    language_version: LanguageVersion,
}

#[derive(Args)]
struct ParseArgs {
    /// File to parse
    file: PathBuf,
    #[command(flatten)]
    version: VersionArgs,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CheckArgs {
    /// Files to check
    #[arg(required = true)]
    files: Vec<PathBuf>,
    #[command(flatten)]
    version: VersionArgs,
}

#[derive(Args)]
struct ReparseArgs {
    /// File holding the text before the edit
    file: PathBuf,
    /// Byte offset where the edit starts
    #[arg(long)]
    offset: u32,
    /// Number of bytes removed at `offset`
    #[arg(long, default_value_t = 0)]
    delete: u32,
    /// Text inserted at `offset`
    #[arg(long, default_value = "")]
    insert: String,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.verbose);

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_tracing(level: &str, verbose: u8) {
    let directives = match verbose {
        0 => level.to_owned(),
        1 => "debug".to_owned(),
        _ => "trace".to_owned(),
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&directives))
        .unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        });

    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Parse(args) => {
            let text = read_source(&args.file)?;
            let report = parse_report(&text, args.version.language_version);
            let exit = if report.errors.is_empty() { 0 } else { 1 };
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.tree);
                for error in &report.errors {
                    println!("error:{}:{}: {}", error.line, error.column, error.message);
                }
                for diag in &report.diagnostics {
                    println!(
                        "{}:{}:{}: [{}] {}",
                        severity_label(diag.severity),
                        diag.line,
                        diag.column,
                        diag.code,
                        diag.message
                    );
                }
            }
            Ok(exit)
        }
        Command::Check(args) => {
            let mut total = 0usize;
            for file in &args.files {
                let text = read_source(file)?;
                let report = parse_report(&text, args.version.language_version);
                for error in &report.errors {
                    println!(
                        "{}:{}:{}: {}",
                        file.display(),
                        error.line,
                        error.column,
                        error.message
                    );
                }
                for diag in &report.diagnostics {
                    println!(
                        "{}:{}:{}: [{}] {}",
                        file.display(),
                        diag.line,
                        diag.column,
                        diag.code,
                        diag.message
                    );
                }
                total += report.errors.len() + report.diagnostics.len();
            }
            tracing::debug!(files = args.files.len(), errors = total, "check finished");
            Ok(if total > 0 { 1 } else { 0 })
        }
        Command::Reparse(args) => {
            let old_text = read_source(&args.file)?;
            let end = args
                .offset
                .checked_add(args.delete)
                .context("edit range overflows")?;
            let edit = TextEdit::new(
                TextRange {
                    start: args.offset,
                    end,
                },
                args.insert,
            );
            let new_text = edit.apply(&old_text)?;

            let old = parse(&old_text);
            let incremental = reparse(&old, &old_text, &edit, &new_text);
            let full = parse(&new_text);

            let report = ReparseReport {
                agree: incremental == full,
                tree_matches: debug_dump(&incremental.syntax()) == debug_dump(&full.syntax()),
                errors_match: incremental.errors == full.errors,
                errors: located_errors(&new_text, &incremental.errors),
            };
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("incremental and full parse agree: {}", report.agree);
                if !report.tree_matches {
                    println!("trees differ");
                }
                if !report.errors_match {
                    println!("errors differ");
                }
            }
            Ok(if report.agree { 0 } else { 1 })
        }
    }
}

fn read_source(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(_) => bail!("{} is not valid UTF-8", path.display()),
    }
}

#[derive(Serialize)]
struct ParseReport {
    tree: String,
    errors: Vec<LocatedError>,
    diagnostics: Vec<LocatedDiagnostic>,
}

#[derive(Serialize)]
struct LocatedError {
    line: usize,
    column: usize,
    message: String,
}

#[derive(Serialize)]
struct LocatedDiagnostic {
    severity: Severity,
    code: &'static str,
    line: usize,
    column: usize,
    message: String,
}

#[derive(Serialize)]
struct ReparseReport {
    agree: bool,
    tree_matches: bool,
    errors_match: bool,
    errors: Vec<LocatedError>,
}

fn parse_report(text: &str, language_version: LanguageVersion) -> ParseReport {
    let parsed = parse_with_options(text, &ParseOptions { language_version });
    ParseReport {
        tree: debug_dump(&parsed.result.syntax()),
        errors: located_errors(text, &parsed.result.errors),
        diagnostics: parsed
            .diagnostics
            .iter()
            .map(|diag| locate_diagnostic(text, diag))
            .collect(),
    }
}

fn located_errors(text: &str, errors: &[ParseError]) -> Vec<LocatedError> {
    errors
        .iter()
        .map(|error| {
            let (line, column) = line_col(text, error.range.start as usize);
            LocatedError {
                line,
                column,
                message: error.message.clone(),
            }
        })
        .collect()
}

fn locate_diagnostic(text: &str, diag: &Diagnostic) -> LocatedDiagnostic {
    let offset = diag.span.map(|span| span.start).unwrap_or(0);
    let (line, column) = line_col(text, offset);
    LocatedDiagnostic {
        severity: diag.severity,
        code: diag.code,
        line,
        column,
        message: diag.message.clone(),
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "info",
    }
}

/// 1-based line and column (in chars) of a byte offset.
fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let mut line = 1usize;
    let mut col = 1usize;
    for (idx, ch) in text.char_indices() {
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
