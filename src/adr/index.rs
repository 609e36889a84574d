// src/adr/index.rs

use super::{file_number, is_special_file, markdown_files};
use crate::{error::*, symbols};
use regex::Regex;
use std::{fs, path::Path, sync::LazyLock};

const INDEX_HEADER: &str = r#"# Architecture Decision Records

This directory contains Architecture Decision Records (ADRs) for this project.

## What is an ADR?

An Architecture Decision Record captures an important architectural decision made along with its context and consequences. ADRs help us:

- Document the "why" behind technical decisions
- Onboard new team members quickly
- Avoid revisiting settled decisions
- Track the evolution of the architecture

## ADR Index

| Number | Title | Status | Date |
|--------|-------|--------|------|
"#;

const INDEX_FOOTER: &str = r#"

## ADR Lifecycle

| Status | Meaning |
|--------|---------|
| **Proposed** | Under discussion, not yet accepted |
| **Accepted** | Decision has been made and is in effect |
| **Deprecated** | No longer relevant but kept for historical reference |
| **Superseded** | Replaced by a newer ADR (link to replacement) |

## References

- [MADR Template](https://adr.github.io/madr/)
- [ADR GitHub Organization](https://adr.github.io/)
"#;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+(?:ADR-\d+:\s*)?(.+)$").unwrap());
static STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^##\s+Status\s*\n+([^\n#]+)").unwrap());
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^##\s+Date\s*\n+(\d{4}-\d{2}-\d{2})").unwrap());

#[derive(Debug)]
struct AdrRecord {
    number: u32,
    title: String,
    status: String,
    date: String,
    filename: String,
}

fn parse_adr_file(path: &Path) -> Option<AdrRecord> {
    let content = fs::read_to_string(path).ok()?;
    let filename = path.file_name()?.to_str()?.to_string();
    let number = file_number(&filename)?;

    let title = TITLE_RE
        .captures(&content)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| filename.trim_end_matches(".md").to_string());

    let status_raw = STATUS_RE
        .captures(&content)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    // Flatten markdown links such as "Superseded by [ADR-12](...)"
    let status = LINK_RE.replace_all(&status_raw, "$1").into_owned();

    let date = DATE_RE
        .captures(&content)
        .map(|c| c[1].to_string())
        .unwrap_or_default();

    Some(AdrRecord {
        number,
        title,
        status,
        date,
        filename,
    })
}

pub fn generate_index(adr_dir: &Path) -> String {
    let mut adrs: Vec<AdrRecord> = markdown_files(adr_dir)
        .iter()
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| !is_special_file(n))
        })
        .filter_map(|p| parse_adr_file(p))
        .collect();
    adrs.sort_by_key(|a| a.number);

    let max_digits = adrs
        .iter()
        .map(|a| a.number.to_string().len())
        .max()
        .unwrap_or(0);
    let padding = if max_digits >= 3 { max_digits } else { 4 };

    let rows: Vec<String> = adrs
        .iter()
        .map(|adr| {
            format!(
                "| {:0padding$} | [{}]({}) | {} | {} |",
                adr.number, adr.title, adr.filename, adr.status, adr.date
            )
        })
        .collect();

    format!("{}{}{}", INDEX_HEADER, rows.join("\n"), INDEX_FOOTER)
}

pub fn index(adr_dir: &Path, dry_run: bool) -> AppResult<()> {
    if !adr_dir.is_dir() {
        return Err(AppError::UserInputError(format!(
            "Directory does not exist: {}",
            adr_dir.display()
        )));
    }
    let content = generate_index(adr_dir);
    if dry_run {
        println!("=== DRY RUN - Would write to README.md ===\n");
        println!("{content}");
        return Ok(());
    }
    fs::write(adr_dir.join("README.md"), content)?;
    println!("{} Updated {}", *symbols::OK, adr_dir.join("README.md").display());
    Ok(())
}
