// src/utils.rs

use crate::{constants, error::*};
use regex::Regex;
use serde::Serialize;
use std::{
    ffi::OsStr,
    path::Path,
    sync::LazyLock,
};
use tempfile::NamedTempFile;

static ILLEGAL_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SLUG_DROP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SLUG_COLLAPSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());

/// Lowercase kebab slug for content filenames, capped at 100 chars.
pub fn kebab_slug(title: &str, fallback: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = SLUG_DROP_RE.replace_all(&lowered, "");
    let mut slug = SLUG_COLLAPSE_RE
        .replace_all(&stripped, "-")
        .trim_matches('-')
        .to_string();
    if slug.chars().count() > constants::SLUG_MAX_CHARS {
        slug = slug
            .chars()
            .take(constants::SLUG_MAX_CHARS)
            .collect::<String>()
            .trim_end_matches('-')
            .to_string();
    }
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

/// `001-introduction-to-react.txt` style names.
pub fn numbered_filename(number: usize, title: &str, fallback: &str, ext: &str) -> String {
    format!("{:03}-{}.{}", number, kebab_slug(title, fallback), ext)
}

pub fn sanitize_filename(name: &str) -> String {
    let original_name = name.trim();
    if original_name.is_empty() {
        return "unknown".to_string();
    }

    let stem = Path::new(original_name)
        .file_stem()
        .unwrap_or_else(|| OsStr::new(original_name))
        .to_string_lossy()
        .to_uppercase();
    let windows_reserved = [
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
        "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];

    let mut name = if windows_reserved.contains(&stem.as_ref()) {
        format!("_{}", original_name)
    } else {
        original_name.to_string()
    };

    name = ILLEGAL_CHARS_RE.replace_all(&name, " ").into_owned();
    name = WHITESPACE_RE.replace_all(&name, " ").trim().to_string();
    name = name
        .trim_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string();
    if name.is_empty() {
        return "unnamed".to_string();
    }

    if name.as_bytes().len() > constants::MAX_FILENAME_BYTES {
        if let (Some(stem_part), Some(ext)) =
            (Path::new(&name).file_stem(), Path::new(&name).extension())
        {
            let stem_part_str = stem_part.to_string_lossy();
            let ext_str = format!(".{}", ext.to_string_lossy());
            let max_stem_bytes =
                constants::MAX_FILENAME_BYTES.saturating_sub(ext_str.as_bytes().len());
            let truncated_stem = safe_truncate_utf8(&stem_part_str, max_stem_bytes);
            name = format!("{}{}", truncated_stem, ext_str);
        } else {
            name = safe_truncate_utf8(&name, constants::MAX_FILENAME_BYTES).to_string();
        }
    }
    name
}

fn safe_truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut i = max_bytes;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    &s[..i]
}

pub fn truncate_text(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut end_pos = 0;
    for (i, c) in text.char_indices() {
        width += if c.is_ascii() { 1 } else { 2 };
        if width > max_width.saturating_sub(3) {
            end_pos = i;
            break;
        }
    }
    if end_pos == 0 {
        text.to_string()
    } else {
        format!("{}...", &text[..end_pos])
    }
}

/// `[MM:SS]` below an hour, `[HH:MM:SS]` above.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    let b = bytes as f64;
    if b >= GB {
        format!("{:.2} GB", b / GB)
    } else if b >= MB {
        format!("{:.2} MB", b / MB)
    } else if b >= KB {
        format!("{:.2} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// Writes JSON through a temp file in the same directory and persists it,
/// so readers never observe a half-written file.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&tmp, value)?;
    tmp.persist(path)?;
    Ok(())
}

/// "topic" -> "topic", "C# async/await" -> "csharp-async-await". Idempotent.
pub fn normalize_slug(topic: &str) -> String {
    static NON_ALNUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());
    static HYPHENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

    let slug = topic.to_lowercase().replace("c#", "csharp").replace("c++", "cpp");
    let slug = NON_ALNUM_RE.replace_all(&slug, "-");
    HYPHENS_RE
        .replace_all(&slug, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_slug() {
        assert_eq!(kebab_slug("Introduction to React!", "lecture"), "introduction-to-react");
        assert_eq!(kebab_slug("  What's New?  ", "lecture"), "whats-new");
        assert_eq!(kebab_slug("???", "lecture"), "lecture");

        let long = "a ".repeat(200);
        let slug = kebab_slug(&long, "lecture");
        assert!(slug.chars().count() <= 100);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_numbered_filename() {
        assert_eq!(
            numbered_filename(7, "Setup & Install", "lecture", "txt"),
            "007-setup-install.txt"
        );
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a\\b/c:d*e?f\"g<h>i|j"), "a b c d e f g h i j");
        assert_eq!(sanitize_filename(" . my file. "), "my file");
        assert_eq!(sanitize_filename("a  b   c"), "a b c");
        // Windows reserved names, case-insensitive
        assert_eq!(sanitize_filename("CON.txt"), "_CON.txt");
        assert_eq!(sanitize_filename("aux"), "_aux");
        assert_eq!(sanitize_filename(""), "unknown");
        assert_eq!(sanitize_filename("<>|"), "unnamed");

        // Truncation keeps the extension and valid UTF-8
        let very_long_name = format!("{}.txt", "ő".repeat(300));
        let truncated = sanitize_filename(&very_long_name);
        assert!(truncated.as_bytes().len() <= constants::MAX_FILENAME_BYTES);
        assert!(truncated.ends_with(".txt"));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(75.4), "01:15");
        assert_eq!(format_timestamp(3600.0), "01:00:00");
        assert_eq!(format_timestamp(3725.0), "01:02:05");
    }

    #[test]
    fn test_normalize_slug() {
        assert_eq!(normalize_slug("Domain-Driven Design"), "domain-driven-design");
        assert_eq!(normalize_slug("C# async/await"), "csharp-async-await");
        assert_eq!(normalize_slug("C++ templates"), "cpp-templates");
        assert_eq!(normalize_slug("  React   Hooks!  "), "react-hooks");
        // Idempotent
        let once = normalize_slug("Event Sourcing & CQRS");
        assert_eq!(normalize_slug(&once), once);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }
}
