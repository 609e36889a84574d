// src/skill/mod.rs

pub mod frontmatter;
pub mod report;
pub mod rules;

use crate::{
    cli::{ReportFormat, SeverityArg},
    error::*,
};
use serde::Serialize;
use std::{collections::HashSet, fs, path::Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Suggestion = 1,
    Warning = 2,
    Error = 3,
    Critical = 4,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Suggestion => "SUGGESTION",
        }
    }
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Critical => Severity::Critical,
            SeverityArg::Error => Severity::Error,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Suggestion => Severity::Suggestion,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub rule_id: &'static str,
    pub severity: Severity,
    pub message: String,
    pub location: String,
    pub current_value: Option<String>,
    pub fix_suggestion: String,
}

impl Issue {
    pub fn new(
        rule_id: &'static str,
        severity: Severity,
        message: impl Into<String>,
        location: impl Into<String>,
        fix_suggestion: impl Into<String>,
    ) -> Self {
        Self {
            rule_id,
            severity,
            message: message.into(),
            location: location.into(),
            current_value: None,
            fix_suggestion: fix_suggestion.into(),
        }
    }

    pub fn found(mut self, value: impl Into<String>) -> Self {
        self.current_value = Some(value.into());
        self
    }
}

/// Runs every rule group against a skill directory. A missing SKILL.md or
/// unreadable frontmatter short-circuits: nothing else is worth checking.
pub fn validate_skill(skill_path: &Path, ignored_rules: &HashSet<String>) -> AppResult<Vec<Issue>> {
    let mut issues = Vec::new();

    let skill_md = skill_path.join("SKILL.md");
    if !skill_md.exists() {
        issues.push(Issue::new(
            "SS001",
            Severity::Critical,
            "SKILL.md not found",
            skill_path.display().to_string(),
            "Create SKILL.md with YAML frontmatter",
        ));
        return Ok(issues);
    }

    let content = fs::read_to_string(&skill_md)?;
    let parsed = frontmatter::parse_frontmatter(&content);

    if let Some(error) = parsed.error {
        issues.push(Issue::new(
            "FM000",
            Severity::Critical,
            error,
            "SKILL.md",
            "Fix YAML frontmatter syntax",
        ));
        return Ok(issues);
    }

    if let Some(fm) = &parsed.frontmatter {
        issues.extend(rules::validate_frontmatter(fm, &parsed.body));
    }
    issues.extend(rules::validate_structure(skill_path, &content, &parsed.body));
    issues.extend(rules::validate_content(&parsed.body));
    issues.extend(rules::validate_files(skill_path));
    issues.extend(rules::validate_references(skill_path, &parsed.body));
    issues.extend(rules::validate_security(skill_path));

    issues.retain(|i| !ignored_rules.contains(i.rule_id));
    issues.sort_by(|a, b| b.severity.cmp(&a.severity));

    Ok(issues)
}

/// CLI glue; exit code 1 when critical or error issues remain or the
/// input path is unusable.
pub fn run_validate(
    skill_path: &Path,
    min_severity: SeverityArg,
    format: ReportFormat,
    ignore: &str,
) -> AppResult<i32> {
    if !skill_path.exists() {
        eprintln!("Error: Path does not exist: {}", skill_path.display());
        return Ok(1);
    }
    if !skill_path.is_dir() {
        eprintln!("Error: Path is not a directory: {}", skill_path.display());
        return Ok(1);
    }

    let ignored_rules: HashSet<String> = ignore
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();

    let min: Severity = min_severity.into();
    let mut issues = validate_skill(skill_path, &ignored_rules)?;
    issues.retain(|i| i.severity >= min);

    let skill_name = skill_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| skill_path.display().to_string());

    match format {
        ReportFormat::Json => println!("{}", report::json_report(&skill_name, skill_path, &issues)?),
        ReportFormat::Text => println!("{}", report::text_report(&skill_name, skill_path, &issues)),
    }

    let failed = issues
        .iter()
        .any(|i| matches!(i.severity, Severity::Critical | Severity::Error));
    Ok(if failed { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_skill(dir: &Path, content: &str) {
        fs::write(dir.join("SKILL.md"), content).unwrap();
    }

    #[test]
    fn missing_name_is_critical_and_stops_frontmatter_checks() {
        let dir = TempDir::new().unwrap();
        write_skill(
            dir.path(),
            "---\ndescription: UPPERCASE name WITH problems that would trip other rules\n---\nbody\n",
        );
        let issues = validate_skill(dir.path(), &HashSet::new()).unwrap();
        let fm_issues: Vec<_> = issues.iter().filter(|i| i.rule_id.starts_with("FM")).collect();
        assert_eq!(fm_issues.len(), 1);
        assert_eq!(fm_issues[0].rule_id, "FM001");
        assert_eq!(fm_issues[0].severity, Severity::Critical);
    }

    #[test]
    fn missing_skill_md_reports_ss001_only() {
        let dir = TempDir::new().unwrap();
        let issues = validate_skill(dir.path(), &HashSet::new()).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, "SS001");
        assert_eq!(issues[0].severity, Severity::Critical);
    }

    #[test]
    fn broken_frontmatter_reports_fm000() {
        let dir = TempDir::new().unwrap();
        write_skill(dir.path(), "---\nname: [unclosed\n---\nbody\n");
        let issues = validate_skill(dir.path(), &HashSet::new()).unwrap();
        assert_eq!(issues[0].rule_id, "FM000");
    }

    #[test]
    fn clean_skill_passes() {
        let dir = TempDir::new().unwrap();
        write_skill(
            dir.path(),
            "---\nname: extracting-courses\ndescription: Extracts course content. Use when a course URL needs processing.\n---\nRun the extraction script.\n",
        );
        let issues = validate_skill(dir.path(), &HashSet::new()).unwrap();
        assert!(
            !issues
                .iter()
                .any(|i| matches!(i.severity, Severity::Critical | Severity::Error)),
            "unexpected issues: {:?}",
            issues
        );
    }

    #[test]
    fn ignored_rules_are_filtered() {
        let dir = TempDir::new().unwrap();
        write_skill(
            dir.path(),
            "---\nname: My_Skill\ndescription: Extracts things. Use when needed.\n---\nbody\n",
        );
        let all = validate_skill(dir.path(), &HashSet::new()).unwrap();
        assert!(all.iter().any(|i| i.rule_id == "FM003"));

        let ignored: HashSet<String> = ["FM003".to_string()].into();
        let filtered = validate_skill(dir.path(), &ignored).unwrap();
        assert!(!filtered.iter().any(|i| i.rule_id == "FM003"));
    }

    #[test]
    fn issues_sort_most_severe_first() {
        let dir = TempDir::new().unwrap();
        // FM003 (error) + FM010 (warning) + second person body (CW001 warning)
        write_skill(
            dir.path(),
            "---\nname: Bad_Name\ndescription: A long enough description of behaviour that lacks any activation phrasing at all.\n---\nYou should run it.\n",
        );
        let issues = validate_skill(dir.path(), &HashSet::new()).unwrap();
        let severities: Vec<Severity> = issues.iter().map(|i| i.severity).collect();
        let mut sorted = severities.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(severities, sorted);
    }
}
