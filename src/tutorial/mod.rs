// src/tutorial/mod.rs
//
// Validates generated tutorial files: the blog article, an optional
// video script, chapter markers (JSON) and SEO metadata (YAML).
// Exit code 0 clean, 1 warnings only, 2 errors.

use crate::{error::*, symbols, ui};
use regex::Regex;
use serde_json::Value as Json;
use serde_yaml::Value as Yaml;
use std::{fs, path::Path, sync::LazyLock};

static ARTICLE_REQUIRED: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?m)^#\s+.+", "H1 title"),
        (r"(?m)^\*\*Audience:\*\*", "Audience metadata"),
        (r"(?m)^\*\*Language", "Language/stack metadata"),
        (
            r"(?m)^##\s+\d+\.\s+What You'll (Build|Learn)",
            "Section 1: What You'll Build/Learn",
        ),
        (r"(?m)^##\s+\d+\.\s+Concept Overview", "Section 2: Concept Overview"),
        (
            r"(?m)^##\s+\d+\.\s+Minimal (Runnable )?Example",
            "Section 3: Minimal Example",
        ),
        (r"(?m)^##\s+\d+\.\s+Guided Steps", "Section 4: Guided Steps"),
        (r"(?m)^##\s+\d+\.\s+Challenge", "Challenge section"),
        (r"(?m)^##\s+\d+\.\s+Troubleshooting", "Troubleshooting section"),
        (r"(?m)^##\s+\d+\.\s+Summary", "Summary section"),
    ]
    .into_iter()
    .map(|(p, d)| (Regex::new(p).unwrap(), d))
    .collect()
});

static ARTICLE_RECOMMENDED: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"```\w+", "Code blocks with language tags"),
        (r">\s+💡", "Tips (💡)"),
        (r">\s+⚠️", "Warnings (⚠️)"),
        (r"---\s+Progress Check\s+---", "Progress checkpoints"),
        (r"<details><summary>", "Collapsible solutions"),
        (r"\*\*Expected Output:\*\*|\*\*Output:\*\*", "Expected outputs"),
    ]
    .into_iter()
    .map(|(p, d)| (Regex::new(p).unwrap(), d))
    .collect()
});

static SCRIPT_REQUIRED: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)(hook|opening)", "Hook/Opening"),
        (r"(?i)agenda", "Agenda"),
        (r"(?i)(sections?|content)", "Main sections"),
        (r"(?i)(cta|call to action|subscribe)", "Call to Action"),
    ]
    .into_iter()
    .map(|(p, d)| (Regex::new(p).unwrap(), d))
    .collect()
});

static SCRIPT_RECOMMENDED: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\[\d{2}:\d{2}", "Timing estimates [MM:SS]"),
        (r"(?i)(visual|screen|b-roll)", "Visual/stage directions"),
        (r"(?i)on-screen", "On-screen text cues"),
    ]
    .into_iter()
    .map(|(p, d)| (Regex::new(p).unwrap(), d))
    .collect()
});

static MICRO_REQUIRED: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?m)^##\s1\)\sHook", "1) Hook"),
        (r"(?m)^##\s2\)\sCore Concept", "2) Core Concept"),
        (r"(?m)^##\s3\)\sShow It", "3) Show It"),
        (r"(?m)^##\s4\)\sTakeaway", "4) Takeaway"),
        (r"(?m)^##\s5\)\sCTA", "5) CTA"),
    ]
    .into_iter()
    .map(|(p, d)| (Regex::new(p).unwrap(), d))
    .collect()
});

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").unwrap());

const MICRO_WORD_LIMIT: usize = 250;

const SEO_REQUIRED_FIELDS: [&str; 8] = [
    "title",
    "slug",
    "description",
    "keywords",
    "tags",
    "reading_time_min",
    "target_audience",
    "difficulty",
];

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#+\s+(.+)$").unwrap());
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static NUMBERED_SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^##\s+(\d+)\.").unwrap());
static TIMING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(\d{1,2}:\d{2})").unwrap());
static CHAPTER_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{2}$").unwrap());
static SEO_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

#[derive(Debug, Default)]
pub struct Findings {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Findings {
    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    fn merge(&mut self, other: Findings) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

pub fn validate_article(content: &str) -> Findings {
    let mut findings = Findings::default();

    for (re, what) in ARTICLE_REQUIRED.iter() {
        if !re.is_match(content) {
            findings.error(format!("Missing required section: {what}"));
        }
    }
    for (re, what) in ARTICLE_RECOMMENDED.iter() {
        if !re.is_match(content) {
            findings.warn(format!("Missing recommended element: {what}"));
        }
    }

    let untagged = untagged_fence_count(content);
    if untagged > 0 {
        findings.warn(format!("Found {untagged} code blocks without language tags"));
    }

    // Anchor form mirrors how markdown renderers derive heading ids.
    let anchors: Vec<String> = HEADER_RE
        .captures_iter(content)
        .map(|c| c[1].to_lowercase().replace(' ', "-").replace('.', ""))
        .collect();
    for caps in LINK_RE.captures_iter(content) {
        let url = &caps[2];
        if let Some(anchor) = url.strip_prefix('#') {
            if !anchors.contains(&anchor.to_lowercase()) {
                findings.warn(format!("Potentially broken internal link: {url}"));
            }
        }
    }

    let numbers: Vec<usize> = NUMBERED_SECTION_RE
        .captures_iter(content)
        .filter_map(|c| c[1].parse().ok())
        .collect();
    if !numbers.is_empty() {
        let expected: Vec<usize> = (1..=numbers.len()).collect();
        if numbers != expected {
            findings.warn(format!("Section numbering is non-sequential: {numbers:?}"));
        }
    }

    let words = content.split_whitespace().count();
    if words < 500 {
        findings.warn(format!("Article is quite short ({words} words). Expected 500+."));
    } else if words > 5000 {
        findings.warn(format!(
            "Article is very long ({words} words). Consider splitting it into a series."
        ));
    }

    findings
}

fn untagged_fence_count(content: &str) -> usize {
    let mut in_block = false;
    let mut untagged = 0;
    for line in content.lines() {
        if let Some(rest) = line.trim_end().strip_prefix("```") {
            if !in_block && rest.trim().is_empty() {
                untagged += 1;
            }
            in_block = !in_block;
        }
    }
    untagged
}

pub fn validate_video_script(content: &str) -> Findings {
    let mut findings = Findings::default();

    for (re, what) in SCRIPT_REQUIRED.iter() {
        if !re.is_match(content) {
            findings.error(format!("Missing required section: {what}"));
        }
    }
    for (re, what) in SCRIPT_RECOMMENDED.iter() {
        if !re.is_match(content) {
            findings.warn(format!("Missing recommended element: {what}"));
        }
    }

    let timings: Vec<(String, u32)> = TIMING_RE
        .captures_iter(content)
        .filter_map(|c| timing_to_seconds(&c[1]).map(|s| (c[1].to_string(), s)))
        .collect();
    for pair in timings.windows(2) {
        if pair[0].1 >= pair[1].1 {
            findings.warn(format!("Non-sequential timing: {} -> {}", pair[0].0, pair[1].0));
        }
    }

    findings
}

fn timing_to_seconds(timing: &str) -> Option<u32> {
    let parts: Vec<&str> = timing.split(':').collect();
    match parts.as_slice() {
        [m, s] => Some(m.parse::<u32>().ok()? * 60 + s.parse::<u32>().ok()?),
        [h, m, s] => Some(
            h.parse::<u32>().ok()? * 3600 + m.parse::<u32>().ok()? * 60 + s.parse::<u32>().ok()?,
        ),
        _ => None,
    }
}

pub fn validate_chapters(content: &str) -> Findings {
    let mut findings = Findings::default();

    let data: Json = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(e) => {
            findings.error(format!("Invalid JSON: {e}"));
            return findings;
        }
    };
    let Some(chapters) = data.as_array() else {
        findings.error("Chapters must be a JSON array");
        return findings;
    };
    if chapters.is_empty() {
        findings.error("Chapters array is empty");
        return findings;
    }

    let mut times: Vec<(String, u32)> = Vec::new();
    for (i, chapter) in chapters.iter().enumerate() {
        let Some(obj) = chapter.as_object() else {
            findings.error(format!("Chapter {i} is not an object"));
            continue;
        };

        match obj.get("time") {
            None => findings.error(format!("Chapter {i} is missing the 'time' field")),
            Some(value) => {
                let time = value.as_str().unwrap_or_default();
                if !CHAPTER_TIME_RE.is_match(time) {
                    findings.error(format!(
                        "Chapter {i} has an invalid time format: {value} (expected MM:SS)"
                    ));
                } else if let Some(seconds) = timing_to_seconds(time) {
                    times.push((time.to_string(), seconds));
                }
            }
        }

        match obj.get("title").and_then(Json::as_str) {
            None => findings.error(format!("Chapter {i} is missing the 'title' field")),
            Some(title) if title.chars().count() > 100 => findings.warn(format!(
                "Chapter {i} title is very long ({} chars)",
                title.chars().count()
            )),
            _ => {}
        }
    }

    for (i, pair) in times.windows(2).enumerate() {
        if pair[0].1 >= pair[1].1 {
            findings.warn(format!(
                "Non-sequential chapter times at index {i}: {} -> {}",
                pair[0].0, pair[1].0
            ));
        }
    }
    if let Some((first, seconds)) = times.first() {
        if *seconds != 0 {
            findings.warn(format!("First chapter should start at 00:00, but starts at {first}"));
        }
    }

    findings
}

pub fn validate_seo(content: &str) -> Findings {
    let mut findings = Findings::default();

    let data: Yaml = match serde_yaml::from_str(content) {
        Ok(v) => v,
        Err(e) => {
            findings.error(format!("Invalid YAML: {e}"));
            return findings;
        }
    };
    if data.as_mapping().is_none() {
        findings.error("SEO file must be a YAML object");
        return findings;
    }

    for field in SEO_REQUIRED_FIELDS {
        if data.get(field).is_none() {
            findings.error(format!("Missing required field: {field}"));
        }
    }

    if let Some(title) = data.get("title").and_then(Yaml::as_str) {
        let len = title.chars().count();
        if len > 60 {
            findings.warn(format!("Title is too long ({len} chars). Recommended: under 60 chars."));
        } else if len < 10 {
            findings.warn(format!("Title is very short ({len} chars)."));
        }
    }

    if let Some(description) = data.get("description").and_then(Yaml::as_str) {
        let len = description.chars().count();
        if !(50..=160).contains(&len) {
            findings.warn(format!(
                "Description length ({len} chars) is outside the optimal 50-160 range."
            ));
        }
    }

    if let Some(slug) = data.get("slug").and_then(Yaml::as_str) {
        if !SEO_SLUG_RE.is_match(slug) {
            findings.warn(format!("Slug contains non-URL-friendly characters: {slug}"));
        }
    }

    if let Some(keywords) = data.get("keywords") {
        match keywords.as_sequence() {
            None => findings.error("Keywords must be an array"),
            Some(seq) if seq.len() < 3 => {
                findings.warn(format!("Only {} keywords. Recommended: 3-5.", seq.len()));
            }
            Some(seq) if seq.len() > 10 => {
                findings.warn(format!("Too many keywords ({}). Recommended: 3-5.", seq.len()));
            }
            _ => {}
        }
    }

    if let Some(tags) = data.get("tags") {
        match tags.as_sequence() {
            None => findings.error("Tags must be an array"),
            Some(seq) if seq.len() < 5 => {
                findings.warn(format!("Only {} tags. Recommended: 8-12.", seq.len()));
            }
            Some(seq) if seq.len() > 20 => {
                findings.warn(format!("Too many tags ({}). Recommended: 8-12.", seq.len()));
            }
            _ => {}
        }
    }

    if let Some(reading_time) = data.get("reading_time_min") {
        if reading_time.as_f64().is_none() && reading_time.as_i64().is_none() {
            findings.error("reading_time_min must be a number");
        }
    }

    findings
}

fn micro_sections(content: &str, findings: &mut Findings) {
    for (re, what) in MICRO_REQUIRED.iter() {
        if !re.is_match(content) {
            findings.error(format!("Missing section: {what}"));
        }
    }
}

pub fn validate_microlesson(content: &str) -> Findings {
    let mut findings = Findings::default();
    let words = WORD_RE.find_iter(content).count();
    if words > MICRO_WORD_LIMIT {
        findings.error(format!("{words} words (limit {MICRO_WORD_LIMIT})"));
    }
    micro_sections(content, &mut findings);
    findings
}

pub fn validate_micro_script(content: &str) -> Findings {
    let mut findings = Findings::default();
    for cue in ["Hook", "Takeaway", "CTA"] {
        if !content.contains(cue) {
            findings.error(format!("Missing '{cue}' cue"));
        }
    }
    micro_sections(content, &mut findings);
    findings
}

fn check_file(
    label: &str,
    path: &Path,
    validate: fn(&str) -> Findings,
    total: &mut Findings,
) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    ui::print_sub_header(&format!("Validating {label}: {name}"));

    let findings = match fs::read_to_string(path) {
        Ok(content) => validate(&content),
        Err(e) => {
            let mut f = Findings::default();
            f.error(format!("Cannot read {}: {e}", path.display()));
            f
        }
    };

    for error in &findings.errors {
        println!("  {} {error}", *symbols::ERROR);
    }
    for warning in &findings.warnings {
        println!("  {} {warning}", *symbols::WARN);
    }
    if findings.clean() {
        println!("  {} Validation passed", *symbols::OK);
    }
    total.merge(findings);
}

pub fn run_validate(
    article: &Path,
    video_script: Option<&Path>,
    chapters: Option<&Path>,
    seo: Option<&Path>,
) -> AppResult<i32> {
    ui::print_header("Tutorial Validation");

    let mut total = Findings::default();
    let mut files_checked = 1;
    check_file("article", article, validate_article, &mut total);
    if let Some(path) = video_script {
        check_file("video script", path, validate_video_script, &mut total);
        files_checked += 1;
    }
    if let Some(path) = chapters {
        check_file("chapters", path, validate_chapters, &mut total);
        files_checked += 1;
    }
    if let Some(path) = seo {
        check_file("SEO metadata", path, validate_seo, &mut total);
        files_checked += 1;
    }

    ui::print_sub_header("Validation Summary");
    println!("  Files checked: {files_checked}");
    println!("  Errors:   {}", total.errors.len());
    println!("  Warnings: {}", total.warnings.len());

    if !total.errors.is_empty() {
        println!("\n  {} Validation failed. Fix the errors before publishing.", *symbols::ERROR);
        Ok(2)
    } else if !total.warnings.is_empty() {
        println!(
            "\n  {} Validation passed with warnings. Consider addressing them.",
            *symbols::WARN
        );
        Ok(1)
    } else {
        println!("\n  {} All validations passed. The files are ready to use.", *symbols::OK);
        Ok(0)
    }
}

pub fn run_validate_micro(micro_blog: &Path, video_script: Option<&Path>) -> AppResult<i32> {
    ui::print_header("Microlesson Validation");

    let mut total = Findings::default();
    check_file("micro blog", micro_blog, validate_microlesson, &mut total);
    if let Some(path) = video_script {
        check_file("video script", path, validate_micro_script, &mut total);
    }

    if total.errors.is_empty() {
        println!("\n  {} Validation passed.", *symbols::OK);
        Ok(0)
    } else {
        println!("\n  {} Validation failed.", *symbols::ERROR);
        Ok(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_article() -> String {
        let filler = "word ".repeat(500);
        format!(
            "# Build a CLI in Rust\n\n\
             **Audience:** Intermediate developers\n\
             **Language/Stack:** Rust\n\n\
             ## 1. What You'll Build\n\nA CLI.\n\n\
             ## 2. Concept Overview\n\nConcepts. {filler}\n\n\
             ## 3. Minimal Runnable Example\n\n```rust\nfn main() {{}}\n```\n\n\
             **Expected Output:**\n\n\
             ## 4. Guided Steps\n\n> 💡 Tip here.\n\n> ⚠️ Watch out.\n\n\
             --- Progress Check ---\n\n\
             ## 5. Challenge\n\n<details><summary>Solution</summary></details>\n\n\
             ## 6. Troubleshooting\n\nSee [overview](#2-concept-overview).\n\n\
             ## 7. Summary\n\nDone.\n"
        )
    }

    #[test]
    fn complete_article_is_clean() {
        let findings = validate_article(&complete_article());
        assert!(findings.errors.is_empty(), "errors: {:?}", findings.errors);
        assert!(findings.warnings.is_empty(), "warnings: {:?}", findings.warnings);
    }

    #[test]
    fn missing_sections_are_errors() {
        let findings = validate_article("# Title only\n");
        assert!(findings
            .errors
            .iter()
            .any(|e| e.contains("Concept Overview")));
        assert!(findings.errors.iter().any(|e| e.contains("Guided Steps")));
    }

    #[test]
    fn untagged_code_blocks_are_flagged() {
        let mut article = complete_article();
        article.push_str("\n```\nno language tag\n```\n");
        let findings = validate_article(&article);
        assert!(findings
            .warnings
            .iter()
            .any(|w| w.contains("1 code blocks without language tags")));
    }

    #[test]
    fn broken_anchor_links_are_warned() {
        let mut article = complete_article();
        article.push_str("\nSee [missing](#nowhere-to-be-found).\n");
        let findings = validate_article(&article);
        assert!(findings
            .warnings
            .iter()
            .any(|w| w.contains("#nowhere-to-be-found")));
    }

    #[test]
    fn script_checks_sections_and_timing_order() {
        let script = "Hook: grab attention [00:00]\nAgenda [01:30]\nSections [01:00]\n\
                      Visual: screen recording\nOn-screen text\nCTA: subscribe\n";
        let findings = validate_video_script(script);
        assert!(findings.errors.is_empty());
        assert!(findings
            .warnings
            .iter()
            .any(|w| w.contains("Non-sequential timing: 01:30 -> 01:00")));
    }

    #[test]
    fn chapters_require_time_and_title() {
        let findings = validate_chapters(
            r#"[{"time": "00:00", "title": "Intro"}, {"time": "bogus"}, {"title": "No time"}]"#,
        );
        assert!(findings
            .errors
            .iter()
            .any(|e| e.contains("invalid time format")));
        assert!(findings
            .errors
            .iter()
            .any(|e| e.contains("missing the 'time' field")));
        assert!(findings
            .errors
            .iter()
            .any(|e| e.contains("missing the 'title' field")));
    }

    #[test]
    fn chapters_must_start_at_zero_and_ascend() {
        let findings = validate_chapters(
            r#"[{"time": "00:30", "title": "A"}, {"time": "00:10", "title": "B"}]"#,
        );
        assert!(findings
            .warnings
            .iter()
            .any(|w| w.contains("First chapter should start at 00:00")));
        assert!(findings
            .warnings
            .iter()
            .any(|w| w.contains("Non-sequential chapter times")));
    }

    #[test]
    fn chapters_reject_non_array_json() {
        let findings = validate_chapters(r#"{"time": "00:00"}"#);
        assert!(findings.errors.iter().any(|e| e.contains("JSON array")));
    }

    #[test]
    fn seo_requires_all_fields() {
        let findings = validate_seo("title: Build a CLI in Rust\n");
        assert!(findings.errors.iter().any(|e| e.contains("slug")));
        assert!(findings.errors.iter().any(|e| e.contains("reading_time_min")));
    }

    #[test]
    fn seo_complete_file_passes() {
        let seo = "title: Build a Command Line Tool in Rust\n\
                   slug: build-cli-rust\n\
                   description: Learn how to build a production-grade command line tool in Rust from scratch.\n\
                   keywords: [rust, cli, clap]\n\
                   tags: [rust, cli, clap, tutorial, beginner]\n\
                   reading_time_min: 12\n\
                   target_audience: intermediate\n\
                   difficulty: medium\n";
        let findings = validate_seo(seo);
        assert!(findings.errors.is_empty(), "errors: {:?}", findings.errors);
        assert!(findings.warnings.is_empty(), "warnings: {:?}", findings.warnings);
    }

    #[test]
    fn seo_flags_bad_shapes() {
        let seo = "title: Short\n\
                   slug: Bad Slug!\n\
                   description: too short\n\
                   keywords: not-a-list\n\
                   tags: [a, b]\n\
                   reading_time_min: soon\n\
                   target_audience: x\n\
                   difficulty: easy\n";
        let findings = validate_seo(seo);
        assert!(findings.errors.iter().any(|e| e.contains("Keywords must be an array")));
        assert!(findings.errors.iter().any(|e| e.contains("reading_time_min must be a number")));
        assert!(findings.warnings.iter().any(|w| w.contains("non-URL-friendly")));
        assert!(findings.warnings.iter().any(|w| w.contains("Description length")));
        assert!(findings.warnings.iter().any(|w| w.contains("Title is very short")));
        assert!(findings.warnings.iter().any(|w| w.contains("Only 2 tags")));
    }

    #[test]
    fn microlesson_enforces_word_limit_and_sections() {
        let long_body = "word ".repeat(300);
        let findings = validate_microlesson(&format!("## 1) Hook\n{long_body}"));
        assert!(findings.errors.iter().any(|e| e.contains("limit 250")));
        assert!(findings.errors.iter().any(|e| e.contains("2) Core Concept")));
        assert!(findings.errors.iter().any(|e| e.contains("5) CTA")));
    }

    #[test]
    fn complete_microlesson_is_clean() {
        let lesson = "## 1) Hook\nGrab attention.\n\
                      ## 2) Core Concept\nOne idea.\n\
                      ## 3) Show It\nExample.\n\
                      ## 4) Takeaway\nRemember this.\n\
                      ## 5) CTA\nTry it now.\n";
        assert!(validate_microlesson(lesson).errors.is_empty());
    }

    #[test]
    fn micro_script_requires_cues() {
        let findings = validate_micro_script("## 1) Hook\njust a hook\n");
        assert!(findings.errors.iter().any(|e| e.contains("'Takeaway' cue")));
        assert!(findings.errors.iter().any(|e| e.contains("'CTA' cue")));
    }

    #[test]
    fn timing_conversion_handles_both_shapes() {
        assert_eq!(timing_to_seconds("01:30"), Some(90));
        assert_eq!(timing_to_seconds("1:02:03"), Some(3723));
        assert_eq!(timing_to_seconds("bogus"), None);
    }
}
