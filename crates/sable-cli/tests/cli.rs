use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

fn sable() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("sable"))
}

#[test]
fn help_mentions_core_commands() {
    sable().arg("--help").assert().success().stdout(
        predicate::str::contains("parse")
            .and(predicate::str::contains("check"))
            .and(predicate::str::contains("reparse")),
    );
}

#[test]
fn parse_json_reports_tree_and_no_errors() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("Main.sb");
    file.write_str("class Main { void Run() { var x = 1; } }\n")
        .unwrap();

    let output = sable()
        .arg("parse")
        .arg(file.path())
        .arg("--json")
        .env_remove("SABLE_LANGUAGE_VERSION")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(v["tree"].as_str().unwrap().starts_with("CompilationUnit"));
    assert!(v["errors"].as_array().unwrap().is_empty());
    assert!(v["diagnostics"].as_array().unwrap().is_empty());
}

#[test]
fn check_reports_errors_with_locations() {
    let temp = TempDir::new().unwrap();
    let good = temp.child("Good.sb");
    good.write_str("class Good { }\n").unwrap();
    let bad = temp.child("Bad.sb");
    bad.write_str("class Bad {\n    int x = ;\n}\n").unwrap();

    sable()
        .arg("check")
        .arg(good.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    sable()
        .arg("check")
        .arg(good.path())
        .arg(bad.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Bad.sb:2:12: expected expression"));
}

#[test]
fn language_version_comes_from_the_environment() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("Ns.sb");
    file.write_str("namespace N;\nclass C { }\n").unwrap();

    sable()
        .arg("check")
        .arg(file.path())
        .env("SABLE_LANGUAGE_VERSION", "9")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[feature-unavailable]"));

    sable()
        .arg("check")
        .arg(file.path())
        .env("SABLE_LANGUAGE_VERSION", "10")
        .assert()
        .success();
}

#[test]
fn reparse_agrees_with_full_parse() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("Edit.sb");
    let text = "class C { void M() { Foo(1); } void N() { } }";
    file.write_str(text).unwrap();
    let offset = text.find("1)").unwrap();

    sable()
        .arg("reparse")
        .arg(file.path())
        .arg("--offset")
        .arg(offset.to_string())
        .arg("--delete")
        .arg("1")
        .arg("--insert")
        .arg("42")
        .assert()
        .success()
        .stdout(predicate::str::contains("agree: true"));
}

#[test]
fn missing_file_is_a_usage_error() {
    sable()
        .arg("parse")
        .arg("/definitely/not/here.sb")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to read"));
}
