// src/skill/report.rs

use super::{Issue, Severity};
use crate::error::*;
use serde::Serialize;
use std::path::Path;

const SEVERITY_ORDER: [Severity; 4] = [
    Severity::Critical,
    Severity::Error,
    Severity::Warning,
    Severity::Suggestion,
];

fn count(issues: &[Issue], severity: Severity) -> usize {
    issues.iter().filter(|i| i.severity == severity).count()
}

pub fn text_report(skill_name: &str, skill_path: &Path, issues: &[Issue]) -> String {
    let mut lines = Vec::new();

    lines.push(format!("=== Skill Validation Report: {skill_name} ==="));
    lines.push(format!("Path: {}", skill_path.display()));
    lines.push(String::new());

    let summary_parts: Vec<String> = SEVERITY_ORDER
        .iter()
        .filter_map(|&s| {
            let n = count(issues, s);
            (n > 0).then(|| format!("{n} {}", s.name().to_lowercase()))
        })
        .collect();
    if summary_parts.is_empty() {
        lines.push("Summary: No issues found!".to_string());
    } else {
        lines.push(format!("Summary: {}", summary_parts.join(", ")));
    }
    lines.push(String::new());
    lines.push("─".repeat(70));

    for issue in issues {
        lines.push(String::new());
        lines.push(format!(
            "[{}] {}: {}",
            issue.severity.name(),
            issue.rule_id,
            issue.message
        ));
        lines.push(format!("  Location: {}", issue.location));
        if let Some(value) = &issue.current_value {
            lines.push(format!("  Found: {value}"));
        }
        if !issue.fix_suggestion.is_empty() {
            lines.push(format!("  Fix: {}", issue.fix_suggestion));
        }
        lines.push(String::new());
        lines.push("─".repeat(70));
    }

    if !issues.is_empty() {
        lines.push(String::new());
        lines.push("Use --ignore RULE1,RULE2 to suppress specific rules.".to_string());
    }

    lines.join("\n")
}

#[derive(Serialize)]
struct Summary {
    critical: usize,
    error: usize,
    warning: usize,
    suggestion: usize,
    total: usize,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    skill_name: &'a str,
    skill_path: String,
    summary: Summary,
    issues: &'a [Issue],
    passed: bool,
}

pub fn json_report(skill_name: &str, skill_path: &Path, issues: &[Issue]) -> AppResult<String> {
    let summary = Summary {
        critical: count(issues, Severity::Critical),
        error: count(issues, Severity::Error),
        warning: count(issues, Severity::Warning),
        suggestion: count(issues, Severity::Suggestion),
        total: issues.len(),
    };
    let passed = summary.critical == 0 && summary.error == 0;
    let report = JsonReport {
        skill_name,
        skill_path: skill_path.display().to_string(),
        summary,
        issues,
        passed,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
