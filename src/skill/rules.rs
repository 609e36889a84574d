// src/skill/rules.rs
//
// Rule groups: FM (frontmatter), SS (structure and sizing), CW (content and
// writing), FO (file organization), RI (reference integrity), SC (script
// security).

use super::{Issue, Severity};
use crate::skill::frontmatter::{bool_field, has_field, str_field};
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

const ALLOWED_FRONTMATTER_KEYS: [&str; 12] = [
    "name",
    "description",
    "license",
    "allowed-tools",
    "metadata",
    "model",
    "context",
    "agent",
    "hooks",
    "user-invocable",
    "disable-model-invocation",
    "argument-hint",
];

const RESERVED_WORDS: [&str; 2] = ["anthropic", "claude"];

static SECOND_PERSON_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\byou\s+should\b",
        r"(?i)\byou\s+can\b",
        r"(?i)\byou\s+will\b",
        r"(?i)\byou\s+need\b",
        r"(?i)\byou'll\b",
        r"(?i)\byour\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static FIRST_PERSON_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bI\s+can\b",
        r"(?i)\bI\s+will\b",
        r"(?i)\bI'll\b",
        r"(?i)\bI\s+am\b",
        r"(?i)\bI'm\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static TRIGGER_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\buse when\b",
        r"(?i)\bwhen user\b",
        r"(?i)\btrigger",
        r"(?i)\bactivate",
        r"(?i)\binvoke",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());
static NAME_FIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9-]").unwrap());
static BRACKET_HINT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.+?\]").unwrap());
static CODE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static TABLE_ROW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\|.*\|$").unwrap());
static INLINE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`]+`").unwrap());
static ARGS_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$ARGUMENTS|\$\d+|\$\{CLAUDE_SESSION_ID\}").unwrap());

pub fn validate_frontmatter(fm: &Mapping, body: &str) -> Vec<Issue> {
    let mut issues = Vec::new();

    let name_value = fm.get(Value::String("name".to_string()));
    let Some(name_value) = name_value else {
        issues.push(Issue::new(
            "FM001",
            Severity::Critical,
            "Required field 'name' missing from frontmatter",
            "SKILL.md frontmatter",
            "Add 'name: your-skill-name' to frontmatter",
        ));
        return issues;
    };
    let Some(name) = name_value.as_str() else {
        issues.push(Issue::new(
            "FM001",
            Severity::Critical,
            "Name must be a string",
            "SKILL.md frontmatter",
            "Ensure name is a plain string value",
        ));
        return issues;
    };
    let name = name.trim();

    if !has_field(fm, "description") {
        issues.push(Issue::new(
            "FM002",
            Severity::Critical,
            "Required field 'description' missing from frontmatter",
            "SKILL.md frontmatter",
            "Add 'description: What it does. Use when [triggers].' to frontmatter",
        ));
    }

    if !name.is_empty() && !NAME_RE.is_match(name) {
        let fixed = NAME_FIX_RE
            .replace_all(&name.to_lowercase(), "-")
            .trim_matches('-')
            .to_string();
        issues.push(
            Issue::new(
                "FM003",
                Severity::Error,
                "Name must be lowercase letters, digits, and hyphens only",
                "SKILL.md frontmatter",
                format!("Rename to: {fixed}"),
            )
            .found(name),
        );
    }

    if name.len() > 64 {
        issues.push(
            Issue::new(
                "FM004",
                Severity::Error,
                format!("Name exceeds 64 character limit ({} characters)", name.len()),
                "SKILL.md frontmatter",
                "Shorten name to 64 characters or less",
            )
            .found(name),
        );
    }

    let name_lower = name.to_lowercase();
    for reserved in RESERVED_WORDS {
        if name_lower.contains(reserved) {
            issues.push(
                Issue::new(
                    "FM005",
                    Severity::Error,
                    format!("Name cannot contain reserved word '{reserved}'"),
                    "SKILL.md frontmatter",
                    format!("Remove '{reserved}' from the name"),
                )
                .found(name),
            );
        }
    }

    if name.starts_with('-') || name.ends_with('-') || name.contains("--") {
        issues.push(
            Issue::new(
                "FM006",
                Severity::Error,
                "Name cannot start/end with hyphen or contain consecutive hyphens",
                "SKILL.md frontmatter",
                "Fix hyphen placement in the name",
            )
            .found(name),
        );
    }

    if let Some(description) = str_field(fm, "description") {
        let description = description.trim();

        if description.len() > 1024 {
            issues.push(Issue::new(
                "FM007",
                Severity::Error,
                format!(
                    "Description exceeds 1024 character limit ({} characters)",
                    description.len()
                ),
                "SKILL.md frontmatter",
                "Shorten description to 1024 characters or less",
            ));
        }

        if description.contains('<') || description.contains('>') {
            issues.push(Issue::new(
                "FM008",
                Severity::Error,
                "Description cannot contain angle brackets (< or >)",
                "SKILL.md frontmatter",
                "Remove angle brackets from description",
            ));
        }

        let has_triggers = TRIGGER_RES.iter().any(|re| re.is_match(description));
        if !has_triggers && description.len() > 50 {
            issues.push(Issue::new(
                "FM010",
                Severity::Warning,
                "Description should include trigger scenarios",
                "SKILL.md frontmatter",
                "Add 'Use when [scenario]' to description to clarify when to invoke",
            ));
        }

        if let Some(m) = FIRST_PERSON_RES.iter().find_map(|re| re.find(description)) {
            issues.push(
                Issue::new(
                    "FM012",
                    Severity::Warning,
                    "Description uses first person",
                    "SKILL.md frontmatter",
                    "Use third person: 'This skill extracts...' not 'I can extract...'",
                )
                .found(m.as_str()),
            );
        }

        // Only the two most common second-person patterns apply here.
        if let Some(m) = SECOND_PERSON_RES[..2].iter().find_map(|re| re.find(description)) {
            issues.push(
                Issue::new(
                    "FM012",
                    Severity::Warning,
                    "Description uses second person",
                    "SKILL.md frontmatter",
                    "Use third person: 'Extracts data from...' not 'You can extract...'",
                )
                .found(m.as_str()),
            );
        }
    }

    let mut unexpected: Vec<String> = fm
        .keys()
        .filter_map(Value::as_str)
        .filter(|k| !ALLOWED_FRONTMATTER_KEYS.contains(k))
        .map(str::to_string)
        .collect();
    if !unexpected.is_empty() {
        unexpected.sort();
        issues.push(Issue::new(
            "FM009",
            Severity::Warning,
            format!("Unknown frontmatter key(s): {}", unexpected.join(", ")),
            "SKILL.md frontmatter",
            format!(
                "Remove or use allowed keys: {}",
                ALLOWED_FRONTMATTER_KEYS.join(", ")
            ),
        ));
    }

    if !name.is_empty() && !name.ends_with("ing") && name.contains('-') {
        let parts: Vec<&str> = name.split('-').collect();
        if parts.len() >= 2 && !parts.iter().any(|p| p.ends_with("ing")) {
            issues.push(
                Issue::new(
                    "FM011",
                    Severity::Suggestion,
                    "Consider using gerund naming convention (verb+ing)",
                    "SKILL.md frontmatter",
                    "Example: 'processing-pdfs' instead of 'pdf-processor'",
                )
                .found(name),
            );
        }
    }

    if let Some(hint_value) = fm.get(Value::String("argument-hint".to_string())) {
        match hint_value.as_str() {
            Some(hint) if !hint.is_empty() => {
                if !BRACKET_HINT_RE.is_match(hint) {
                    issues.push(
                        Issue::new(
                            "FM013",
                            Severity::Suggestion,
                            "argument-hint should use bracket notation",
                            "SKILL.md frontmatter",
                            "Use format like '[issue-number]' or '[filename] [format]'",
                        )
                        .found(hint),
                    );
                }
            }
            Some(_) => {}
            None => {
                issues.push(Issue::new(
                    "FM013",
                    Severity::Error,
                    "argument-hint must be a string",
                    "SKILL.md frontmatter",
                    "Ensure argument-hint is a plain string value",
                ));
            }
        }
    }

    // FM014: $ARGUMENTS in instruction text only, so strip code and tables
    let disable_model = bool_field(fm, "disable-model-invocation");
    let stripped = CODE_BLOCK_RE.replace_all(body, "");
    let stripped = TABLE_ROW_RE.replace_all(&stripped, "");
    let stripped = INLINE_CODE_RE.replace_all(&stripped, "");
    if ARGS_VAR_RE.is_match(&stripped) && !disable_model {
        issues.push(Issue::new(
            "FM014",
            Severity::Suggestion,
            "Skill uses $ARGUMENTS but allows model invocation",
            "SKILL.md",
            "Consider adding 'disable-model-invocation: true' for skills that require arguments",
        ));
    }

    issues
}

static TOC_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)## table of contents",
        r"(?i)## contents",
        r"(?i)## toc",
        r"(?i)\* \[.*\]\(#",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});
static MD_LINK_TARGET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]\(([^)]+\.md)\)").unwrap());

pub fn validate_structure(skill_path: &Path, content: &str, body: &str) -> Vec<Issue> {
    let mut issues = Vec::new();
    let line_count = content.split('\n').count();

    if line_count > 500 {
        issues.push(Issue::new(
            "SS002",
            Severity::Error,
            format!("SKILL.md exceeds 500 line limit ({line_count} lines)"),
            "SKILL.md",
            "Split content into WORKFLOW.md, EXAMPLES.md, TROUBLESHOOTING.md",
        ));
    } else if line_count > 300 {
        issues.push(Issue::new(
            "SS003",
            Severity::Warning,
            format!("SKILL.md approaching line limit ({line_count} lines, max 500)"),
            "SKILL.md",
            "Consider extracting detailed content to supporting files",
        ));
    }

    if line_count > 200 {
        let has_docs = ["WORKFLOW.md", "EXAMPLES.md", "TROUBLESHOOTING.md"]
            .iter()
            .any(|d| skill_path.join(d).exists());
        if !has_docs {
            issues.push(Issue::new(
                "SS004",
                Severity::Warning,
                "Large SKILL.md without supporting documentation files",
                "SKILL.md",
                "Create EXAMPLES.md or TROUBLESHOOTING.md to reduce SKILL.md size",
            ));
        }
    }

    let refs_dir = skill_path.join("references");
    if refs_dir.is_dir() {
        for ref_file in sorted_entries(&refs_dir) {
            if ref_file.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let Ok(ref_content) = fs::read_to_string(&ref_file) else {
                continue;
            };
            if ref_content.split('\n').count() > 100
                && !TOC_RES.iter().any(|re| re.is_match(&ref_content))
            {
                issues.push(Issue::new(
                    "SS005",
                    Severity::Suggestion,
                    "Reference file >100 lines without table of contents",
                    format!(
                        "references/{}",
                        ref_file.file_name().and_then(|n| n.to_str()).unwrap_or("")
                    ),
                    "Add table of contents at top for easier navigation",
                ));
            }
        }
    }

    // SS006: references should stay one hop from SKILL.md
    for cap in MD_LINK_TARGET_RE.captures_iter(body) {
        let link = &cap[1];
        let link_path = skill_path.join(link);
        let Ok(linked_content) = fs::read_to_string(&link_path) else {
            continue;
        };
        let nested: Vec<String> = MD_LINK_TARGET_RE
            .captures_iter(&linked_content)
            .map(|c| c[1].to_string())
            .filter(|l| !l.starts_with("http") && l != link)
            .collect();
        if let Some(first) = nested.first() {
            issues.push(Issue::new(
                "SS006",
                Severity::Warning,
                "Deeply nested reference detected",
                format!("{link} -> {first}"),
                "Keep references one level deep from SKILL.md",
            ));
        }
    }

    issues
}

static ALTERNATIVES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:use|try|choose)\s+(?:\w+,\s*)+(?:or|and)\s+\w+").unwrap()
});
static DEFAULT_MARK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\((?:default|recommended|preferred)\)").unwrap());
static MCP_TOOL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(mcp_\w+)\b").unwrap());

// One hit per line, code fences skipped
fn scan_person(
    lines: &[&str],
    patterns: &[Regex],
    rule_id: &'static str,
    message: &'static str,
    fix: &'static str,
    issues: &mut Vec<Issue>,
) {
    let mut in_code_block = false;
    for (i, line) in lines.iter().enumerate() {
        if line.trim().starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            continue;
        }
        if let Some(m) = patterns.iter().find_map(|re| re.find(line)) {
            issues.push(
                Issue::new(
                    rule_id,
                    Severity::Warning,
                    message,
                    format!("SKILL.md:{}", i + 1),
                    fix,
                )
                .found(m.as_str()),
            );
        }
    }
}

fn colon_near(line: &str, start: usize, end: usize) -> bool {
    let bytes = line.as_bytes();
    let lo = start.saturating_sub(20);
    let hi = (end + 20).min(bytes.len());
    bytes[lo..hi].contains(&b':')
}

pub fn validate_content(body: &str) -> Vec<Issue> {
    let mut issues = Vec::new();
    let lines: Vec<&str> = body.split('\n').collect();

    scan_person(
        &lines,
        &SECOND_PERSON_RES,
        "CW001",
        "Second-person language detected",
        "Use imperative form: 'Create...' not 'You should create...'",
        &mut issues,
    );
    scan_person(
        &lines,
        &FIRST_PERSON_RES,
        "CW002",
        "First-person language detected",
        "Use third person or imperative: 'This skill provides' not 'I can help'",
        &mut issues,
    );

    for (i, line) in lines.iter().enumerate() {
        if ALTERNATIVES_RE.is_match(line) && !DEFAULT_MARK_RE.is_match(line) {
            issues.push(Issue::new(
                "CW003",
                Severity::Suggestion,
                "Multiple options listed without default",
                format!("SKILL.md:{}", i + 1),
                "Provide one default with escape hatch: 'Use X (or another if preferred)'",
            ));
        }
    }

    for (i, line) in lines.iter().enumerate() {
        if let Some(m) = MCP_TOOL_RE.find(line) {
            if !colon_near(line, m.start(), m.end()) {
                issues.push(
                    Issue::new(
                        "CW004",
                        Severity::Warning,
                        "MCP tool may not use fully qualified name",
                        format!("SKILL.md:{}", i + 1),
                        "Use 'ServerName:tool_name' format for MCP tools",
                    )
                    .found(m.as_str()),
                );
            }
        }
    }

    issues
}

const FORBIDDEN_FILES: [&str; 9] = [
    "README.md",
    "readme.md",
    "INSTALLATION_GUIDE.md",
    "INSTALL.md",
    "CHANGELOG.md",
    "HISTORY.md",
    "QUICK_REFERENCE.md",
    "CONTRIBUTING.md",
    "LICENSE.md",
];

static UPPERCASE_DOC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_-]*\.md$").unwrap());
static LOWERCASE_SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*\.py$").unwrap());
static SCRIPT_FIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_.]").unwrap());
static WINDOWS_PATH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-zA-Z]:\\").unwrap());

fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map(|rd| rd.flatten().map(|e| e.path()).collect())
        .unwrap_or_default();
    entries.sort();
    entries
}

fn walk_files(dir: &Path, out: &mut Vec<PathBuf>) {
    for entry in sorted_entries(dir) {
        if entry.is_dir() {
            walk_files(&entry, out);
        } else if entry.is_file() {
            out.push(entry);
        }
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).is_ok_and(|m| m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}

pub fn validate_files(skill_path: &Path) -> Vec<Issue> {
    let mut issues = Vec::new();

    for forbidden in FORBIDDEN_FILES {
        if skill_path.join(forbidden).exists() {
            issues.push(Issue::new(
                "FO001",
                Severity::Warning,
                format!("Forbidden file detected: {forbidden}"),
                forbidden,
                "Remove this file; skills should not include auxiliary documentation",
            ));
        }
    }

    let mut all_files = Vec::new();
    walk_files(skill_path, &mut all_files);

    for file_path in &all_files {
        let Ok(relative) = file_path.strip_prefix(skill_path) else {
            continue;
        };
        let Some(filename) = file_path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let parent = relative
            .parent()
            .and_then(|p| p.to_str())
            .unwrap_or_default();

        if filename.ends_with(".md")
            && (parent.is_empty() || parent == "references")
            && filename != "SKILL.md"
            && !UPPERCASE_DOC_RE.is_match(filename)
        {
            issues.push(Issue::new(
                "FO002",
                Severity::Warning,
                "Documentation file not UPPERCASE",
                relative.display().to_string(),
                format!("Rename to {}", filename.to_uppercase()),
            ));
        }

        if parent.starts_with("scripts") && filename.ends_with(".py") {
            if !LOWERCASE_SCRIPT_RE.is_match(filename) {
                let lowered = filename.to_lowercase();
                let fixed = SCRIPT_FIX_RE.replace_all(&lowered, "_");
                issues.push(Issue::new(
                    "FO003",
                    Severity::Warning,
                    "Script file not lowercase_with_underscores",
                    relative.display().to_string(),
                    format!("Rename to {fixed}"),
                ));
            }

            if !is_executable(file_path) {
                issues.push(Issue::new(
                    "FO004",
                    Severity::Error,
                    "Script not executable",
                    relative.display().to_string(),
                    format!("Run: chmod +x {}", relative.display()),
                ));
            }

            if let Ok(content) = fs::read_to_string(file_path) {
                let first_line = content.split('\n').next().unwrap_or_default();
                if !first_line.starts_with("#!") {
                    issues.push(Issue::new(
                        "FO005",
                        Severity::Error,
                        "Python script missing shebang",
                        relative.display().to_string(),
                        "Add '#!/usr/bin/env python3' as first line",
                    ));
                }
            }
        }
    }

    for dir_name in ["scripts", "references", "assets"] {
        let dir_path = skill_path.join(dir_name);
        if dir_path.is_dir() {
            let mut files = Vec::new();
            walk_files(&dir_path, &mut files);
            if files.is_empty() {
                issues.push(Issue::new(
                    "FO006",
                    Severity::Suggestion,
                    "Empty resource directory",
                    format!("{dir_name}/"),
                    format!("Remove unused {dir_name}/ directory"),
                ));
            }
        }
    }

    if let Ok(content) = fs::read_to_string(skill_path.join("SKILL.md")) {
        if content.contains('\\') && WINDOWS_PATH_RE.is_match(&content) {
            issues.push(Issue::new(
                "FO007",
                Severity::Warning,
                "Windows-style path separator detected",
                "SKILL.md",
                "Use Unix-style '/' in all paths",
            ));
        }
    }

    issues
}

static MD_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static BACKTICK_MD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+\.md)`").unwrap());

pub fn validate_references(skill_path: &Path, body: &str) -> Vec<Issue> {
    let mut issues = Vec::new();

    // Example links inside code blocks do not count
    let body_without_code = CODE_BLOCK_RE.replace_all(body, "");

    let mut referenced: HashSet<String> = HashSet::new();

    for cap in MD_LINK_RE.captures_iter(&body_without_code) {
        let mut target = cap[2].to_string();
        if target.starts_with("http://") || target.starts_with("https://") {
            continue;
        }
        if let Some((file_part, _anchor)) = target.split_once('#') {
            if file_part.is_empty() {
                continue;
            }
            target = file_part.to_string();
        }
        referenced.insert(target.clone());

        if !skill_path.join(&target).exists() {
            issues.push(Issue::new(
                "RI001",
                Severity::Error,
                "Broken reference: file not found",
                format!("SKILL.md -> {target}"),
                format!("Fix path or create missing file: {target}"),
            ));
        }
    }

    for cap in BACKTICK_MD_RE.captures_iter(&body_without_code) {
        referenced.insert(cap[1].to_string());
    }

    let mut all_files = Vec::new();
    walk_files(skill_path, &mut all_files);
    for file_path in &all_files {
        let Some(filename) = file_path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !filename.ends_with(".md") || filename == "SKILL.md" {
            continue;
        }
        let Ok(relative) = file_path.strip_prefix(skill_path) else {
            continue;
        };
        let relative = relative.display().to_string();
        let bare = relative.trim_start_matches("./");
        if !referenced.contains(&relative)
            && !referenced.contains(filename)
            && !referenced.contains(bare)
        {
            issues.push(Issue::new(
                "RI002",
                Severity::Warning,
                "File not referenced from SKILL.md",
                relative,
                "Add reference in SKILL.md or remove if unused",
            ));
        }
    }

    issues
}

static IGNORE_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\s*skill-validator:\s*ignore\s+(\w+)").unwrap());
static EVAL_EXEC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(eval|exec)\s*\(").unwrap());
static MAGIC_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"=\s*(\d{2,})\s*$").unwrap());
static HEX_STRING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["'][0-9a-fA-F]{32,}["']"#).unwrap());
static BASE64_DECODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"base64\.(b64decode|decode)").unwrap());

pub fn validate_security(skill_path: &Path) -> Vec<Issue> {
    let mut issues = Vec::new();

    let scripts_dir = skill_path.join("scripts");
    if !scripts_dir.is_dir() {
        return issues;
    }

    let mut scripts = Vec::new();
    walk_files(&scripts_dir, &mut scripts);

    for script_path in &scripts {
        if script_path.extension().and_then(|e| e.to_str()) != Some("py") {
            continue;
        }
        let relative = script_path
            .strip_prefix(skill_path)
            .unwrap_or(script_path)
            .display()
            .to_string();

        let content = match fs::read_to_string(script_path) {
            Ok(c) => c,
            Err(e) => {
                issues.push(Issue::new(
                    "SC000",
                    Severity::Error,
                    format!("Failed to analyze script: {e}"),
                    relative,
                    "Check file encoding and syntax",
                ));
                continue;
            }
        };
        let lines: Vec<&str> = content.split('\n').collect();

        let ignored: HashSet<String> = lines
            .iter()
            .filter_map(|line| IGNORE_COMMENT_RE.captures(line))
            .map(|c| c[1].to_string())
            .collect();

        if !ignored.contains("SC001") {
            for (i, line) in lines.iter().enumerate() {
                if EVAL_EXEC_RE.is_match(line) {
                    issues.push(Issue::new(
                        "SC001",
                        Severity::Critical,
                        "Dynamic code execution detected (eval/exec)",
                        format!("{relative}:{}", i + 1),
                        "Remove eval/exec or add '# skill-validator: ignore SC001' with justification",
                    ));
                }
            }
        }

        if !ignored.contains("SC002") {
            for (i, line) in lines.iter().enumerate() {
                let Some(cap) = MAGIC_NUMBER_RE.captures(line) else {
                    continue;
                };
                let mut has_comment = line.contains('#');
                if i > 0 {
                    has_comment = has_comment || lines[i - 1].trim().starts_with('#');
                }
                if !has_comment {
                    issues.push(Issue::new(
                        "SC002",
                        Severity::Warning,
                        format!("Undocumented numeric constant: {}", &cap[1]),
                        format!("{relative}:{}", i + 1),
                        "Add comment explaining the constant's purpose",
                    ));
                }
            }
        }

        if !ignored.contains("SC004") {
            for (i, line) in lines.iter().enumerate() {
                if HEX_STRING_RE.is_match(line) {
                    issues.push(Issue::new(
                        "SC004",
                        Severity::Warning,
                        "Long hex-encoded string detected",
                        format!("{relative}:{}", i + 1),
                        "Explain purpose or remove obfuscated code",
                    ));
                }
                if BASE64_DECODE_RE.is_match(line) {
                    issues.push(Issue::new(
                        "SC004",
                        Severity::Warning,
                        "Base64 decoding detected",
                        format!("{relative}:{}", i + 1),
                        "Document the purpose of encoded content",
                    ));
                }
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::frontmatter::parse_frontmatter;
    use tempfile::TempDir;

    fn fm(yaml_body: &str) -> Mapping {
        let content = format!("---\n{yaml_body}\n---\nbody\n");
        parse_frontmatter(&content).frontmatter.unwrap()
    }

    #[test]
    fn name_format_rules() {
        let issues = validate_frontmatter(&fm("name: Bad_Name\ndescription: x"), "");
        assert!(issues.iter().any(|i| i.rule_id == "FM003"));

        let issues = validate_frontmatter(&fm("name: -edge-\ndescription: x"), "");
        assert!(issues.iter().any(|i| i.rule_id == "FM006"));

        let issues = validate_frontmatter(&fm("name: claude-helper\ndescription: x"), "");
        assert!(issues.iter().any(|i| i.rule_id == "FM005"));
    }

    #[test]
    fn description_trigger_warning_only_past_fifty_chars() {
        let short = validate_frontmatter(&fm("name: doing-things\ndescription: Short."), "");
        assert!(!short.iter().any(|i| i.rule_id == "FM010"));

        let long = validate_frontmatter(
            &fm("name: doing-things\ndescription: A much longer description of behaviour that never says the magic words."),
            "",
        );
        assert!(long.iter().any(|i| i.rule_id == "FM010"));

        let triggered = validate_frontmatter(
            &fm("name: doing-things\ndescription: A much longer description of behaviour. Use when a user asks for it."),
            "",
        );
        assert!(!triggered.iter().any(|i| i.rule_id == "FM010"));
    }

    #[test]
    fn unknown_keys_and_gerund() {
        let issues = validate_frontmatter(
            &fm("name: pdf-processor\ndescription: x\ncustom-key: y"),
            "",
        );
        assert!(issues.iter().any(|i| i.rule_id == "FM009"));
        assert!(issues.iter().any(|i| i.rule_id == "FM011"));
    }

    #[test]
    fn arguments_var_in_code_blocks_is_ignored() {
        let map = fm("name: doing-things\ndescription: x");
        let flagged = validate_frontmatter(&map, "Pass $ARGUMENTS to the tool.\n");
        assert!(flagged.iter().any(|i| i.rule_id == "FM014"));

        let in_code = validate_frontmatter(&map, "```\necho $ARGUMENTS\n```\n");
        assert!(!in_code.iter().any(|i| i.rule_id == "FM014"));
    }

    #[test]
    fn second_person_flagged_once_per_line_outside_code() {
        let body = "You should do this. You can also do that.\n```\nyou should not match here\n```\nYour call.\n";
        let issues = validate_content(body);
        let cw1: Vec<_> = issues.iter().filter(|i| i.rule_id == "CW001").collect();
        assert_eq!(cw1.len(), 2);
        assert_eq!(cw1[0].location, "SKILL.md:1");
        assert_eq!(cw1[1].location, "SKILL.md:5");
    }

    #[test]
    fn alternatives_without_default_is_a_suggestion() {
        let issues = validate_content("Use yaml, toml, or json for the config.\n");
        assert!(issues.iter().any(|i| i.rule_id == "CW003"));

        let issues = validate_content("Use yaml, toml, or json (default) for the config.\n");
        assert!(!issues.iter().any(|i| i.rule_id == "CW003"));
    }

    #[test]
    fn mcp_tool_without_server_prefix() {
        let issues = validate_content("Call mcp_fetch_page to load it.\n");
        assert!(issues.iter().any(|i| i.rule_id == "CW004"));

        let issues = validate_content("Call Browser:mcp_fetch_page to load it.\n");
        assert!(!issues.iter().any(|i| i.rule_id == "CW004"));
    }

    #[test]
    fn forbidden_and_lowercase_docs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("SKILL.md"), "body").unwrap();
        fs::write(dir.path().join("README.md"), "x").unwrap();
        fs::write(dir.path().join("notes.md"), "x").unwrap();

        let issues = validate_files(dir.path());
        assert!(issues.iter().any(|i| i.rule_id == "FO001"));
        assert!(issues
            .iter()
            .any(|i| i.rule_id == "FO002" && i.location == "notes.md"));
    }

    #[cfg(unix)]
    #[test]
    fn script_checks() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let scripts = dir.path().join("scripts");
        fs::create_dir(&scripts).unwrap();
        let script = scripts.join("Run-Me.py");
        fs::write(&script, "print('no shebang')\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();

        let issues = validate_files(dir.path());
        assert!(issues.iter().any(|i| i.rule_id == "FO003"));
        assert!(issues.iter().any(|i| i.rule_id == "FO004"));
        assert!(issues.iter().any(|i| i.rule_id == "FO005"));
    }

    #[test]
    fn empty_resource_dir_is_a_suggestion() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("assets")).unwrap();
        let issues = validate_files(dir.path());
        assert!(issues
            .iter()
            .any(|i| i.rule_id == "FO006" && i.location == "assets/"));
    }

    #[test]
    fn broken_and_orphan_references() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("EXAMPLES.md"), "examples").unwrap();
        fs::write(dir.path().join("ORPHAN.md"), "nobody links me").unwrap();

        let body = "See [examples](EXAMPLES.md) and [missing](GONE.md).\n";
        let issues = validate_references(dir.path(), body);
        assert!(issues
            .iter()
            .any(|i| i.rule_id == "RI001" && i.location.contains("GONE.md")));
        assert!(issues
            .iter()
            .any(|i| i.rule_id == "RI002" && i.location == "ORPHAN.md"));
        assert!(!issues.iter().any(|i| i.location == "EXAMPLES.md"));
    }

    #[test]
    fn backtick_mention_counts_as_reference() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("WORKFLOW.md"), "steps").unwrap();
        let issues = validate_references(dir.path(), "Read `WORKFLOW.md` first.\n");
        assert!(!issues.iter().any(|i| i.rule_id == "RI002"));
    }

    #[test]
    fn eval_is_critical_unless_ignored() {
        let dir = TempDir::new().unwrap();
        let scripts = dir.path().join("scripts");
        fs::create_dir(&scripts).unwrap();
        fs::write(
            scripts.join("bad.py"),
            "#!/usr/bin/env python3\nresult = eval(user_input)\n",
        )
        .unwrap();

        let issues = validate_security(dir.path());
        assert!(issues
            .iter()
            .any(|i| i.rule_id == "SC001" && i.severity == Severity::Critical));

        fs::write(
            scripts.join("bad.py"),
            "#!/usr/bin/env python3\n# skill-validator: ignore SC001\nresult = eval(user_input)\n",
        )
        .unwrap();
        let issues = validate_security(dir.path());
        assert!(!issues.iter().any(|i| i.rule_id == "SC001"));
    }

    #[test]
    fn magic_numbers_need_a_comment() {
        let dir = TempDir::new().unwrap();
        let scripts = dir.path().join("scripts");
        fs::create_dir(&scripts).unwrap();
        fs::write(
            scripts.join("calc.py"),
            "#!/usr/bin/env python3\n\nlimit = 500\n# page size\nsize = 100\nretries = 3\n",
        )
        .unwrap();

        let issues = validate_security(dir.path());
        let sc2: Vec<_> = issues.iter().filter(|i| i.rule_id == "SC002").collect();
        assert_eq!(sc2.len(), 1);
        assert!(sc2[0].message.contains("500"));
    }
}
