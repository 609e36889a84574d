// tests/cli_dispatch_test.rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn main_command() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

#[test]
fn help_lists_subcommands() {
    main_command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("udemy"))
        .stdout(predicate::str::contains("youtube"))
        .stdout(predicate::str::contains("skill"))
        .stdout(predicate::str::contains("adr"))
        .stdout(predicate::str::contains("research"));
}

#[test]
fn no_arguments_shows_usage() {
    main_command()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn cookies_help_prints_guide_without_network() {
    main_command()
        .args(["udemy", "some-course", "--cookies-help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cookies.json"));
}

#[test]
fn skill_validate_rejects_missing_path() {
    main_command()
        .args(["skill", "validate", "/nonexistent/skill-dir"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Path does not exist"));
}

#[test]
fn skill_validate_flags_missing_skill_md() {
    let dir = tempdir().unwrap();
    main_command()
        .args(["skill", "validate"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("SS001"))
        .stdout(predicate::str::contains("SKILL.md not found"));
}

#[test]
fn skill_validate_passes_a_clean_skill() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("SKILL.md"),
        "---\nname: extracting-courses\ndescription: Extracts course content. Use when a course URL needs processing.\n---\nRun the extraction script.\n",
    )
    .unwrap();

    main_command()
        .args(["skill", "validate"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found!"));
}

#[test]
fn skill_validate_json_output_is_parseable() {
    let dir = tempdir().unwrap();
    let output = main_command()
        .args(["skill", "validate", "--format", "json"])
        .arg(dir.path())
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["passed"], serde_json::json!(false));
    assert_eq!(report["summary"]["critical"], serde_json::json!(1));
}

#[test]
fn adr_create_then_index() {
    let dir = tempdir().unwrap();
    let adr_dir = dir.path().join("docs/adr");

    main_command()
        .args(["adr", "create", "-t", "Use PostgreSQL for persistence", "--create-dir", "-d"])
        .arg(&adr_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("0001-use-postgresql-for-persistence.md"));

    assert!(adr_dir.join("0001-use-postgresql-for-persistence.md").exists());

    main_command()
        .args(["adr", "index", "--dry-run", "-d"])
        .arg(&adr_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Use PostgreSQL for persistence"));
}

#[test]
fn tutorial_validate_reports_structure_errors() {
    let dir = tempdir().unwrap();
    let article = dir.path().join("article.md");
    fs::write(&article, "# Bare title\n\nNo sections here.\n").unwrap();

    main_command()
        .args(["tutorial", "validate"])
        .arg(&article)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Missing required section"))
        .stdout(predicate::str::contains("Validation failed"));
}

#[test]
fn tutorial_validate_checks_chapters_file() {
    let dir = tempdir().unwrap();
    let article = dir.path().join("article.md");
    fs::write(&article, "# Bare title\n").unwrap();
    let chapters = dir.path().join("chapters.json");
    fs::write(&chapters, r#"[{"time": "00:00"}]"#).unwrap();

    main_command()
        .args(["tutorial", "validate"])
        .arg(&article)
        .arg(dir.path().join("script.md"))
        .arg(&chapters)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Cannot read"))
        .stdout(predicate::str::contains("missing the 'title' field"));
}

#[test]
fn research_put_get_and_miss() {
    let dir = tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    let note = dir.path().join("note.md");
    fs::write(&note, "# React Hooks\n\nNotes body.\n").unwrap();

    main_command()
        .env("RESEARCH_CACHE_DIR", &cache_dir)
        .args(["research", "put", "react-hooks", "-t", "React Hooks", "-f"])
        .arg(&note)
        .assert()
        .success();

    main_command()
        .env("RESEARCH_CACHE_DIR", &cache_dir)
        .args(["research", "get", "react-hooks"])
        .assert()
        .success()
        .stdout(predicate::str::contains("React Hooks"));

    main_command()
        .env("RESEARCH_CACHE_DIR", &cache_dir)
        .args(["research", "get", "unknown-topic"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("not_found"));
}
