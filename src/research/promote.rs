// src/research/promote.rs

use crate::{
    error::*,
    research::cache::CacheStore,
};
use chrono::{SecondsFormat, Utc};
use regex::Regex;
use std::{fs, path::Path, sync::LazyLock};

pub const AUTO_START: &str = "<!-- AUTO-GENERATED: Start -->";
pub const AUTO_END: &str = "<!-- AUTO-GENERATED: End -->";
pub const TEAM_START: &str = "<!-- TEAM-NOTES: Start -->";
pub const TEAM_END: &str = "<!-- TEAM-NOTES: End -->";

const TEAM_NOTES_TEMPLATE: &str = "\n## Team Context\n\n_Add project-specific notes, implementation references, and team knowledge here._\n\n";

static TEAM_NOTES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!-- TEAM-NOTES: Start -->(.*?)<!-- TEAM-NOTES: End -->").unwrap()
});

pub fn extract_team_notes(content: &str) -> Option<String> {
    TEAM_NOTES_RE
        .captures(content)
        .map(|c| c[1].to_string())
}

/// Non-empty team notes beyond the untouched template.
pub fn has_team_notes(content: &str) -> bool {
    match extract_team_notes(content) {
        Some(notes) => {
            let notes = notes.trim();
            !notes.is_empty() && !notes.contains("_Add project-specific notes")
        }
        None => false,
    }
}

fn build_promoted_content(
    metadata: &crate::research::cache::EntryMetadata,
    auto_content: &str,
    team_notes: Option<&str>,
) -> String {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let last_refreshed = if metadata.researched_at.is_empty() {
        now.clone()
    } else {
        metadata.researched_at.clone()
    };

    let frontmatter = format!(
        "---\nslug: {}\ntitle: {}\naliases: {}\ntags: {}\npromoted_at: {}\nlast_refreshed: {}\nsources: {}\n---\n\n",
        metadata.slug,
        metadata.title,
        serde_json::to_string(&metadata.aliases).unwrap_or_else(|_| "[]".into()),
        serde_json::to_string(&metadata.tags).unwrap_or_else(|_| "[]".into()),
        now,
        last_refreshed,
        serde_json::to_string(&metadata.sources).unwrap_or_else(|_| "[]".into()),
    );

    let notes = team_notes.unwrap_or(TEAM_NOTES_TEMPLATE);

    format!(
        "{frontmatter}{AUTO_START}\n{}\n{AUTO_END}\n\n{TEAM_START}{notes}{TEAM_END}\n",
        auto_content.trim()
    )
}

fn update_readme_index(docs_dir: &Path, slug: &str, title: &str) -> AppResult<()> {
    let readme_path = docs_dir.join("README.md");
    let now = Utc::now().format("%Y-%m-%d").to_string();

    let mut readme_content = if readme_path.exists() {
        fs::read_to_string(&readme_path)?
    } else {
        "# Research Index\n\nCurated technical research for this project.\n\n| Topic | Promoted | Last Refreshed | Team Notes |\n|-------|----------|----------------|------------|\n".to_string()
    };

    let escaped = regex::escape(slug);
    let row_probe = Regex::new(&format!(r"\|\s*\[.*?\]\({escaped}\.md\)"))
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let new_entry = format!("| [{title}]({slug}.md) | {now} | {now} | No |");

    if row_probe.is_match(&readme_content) {
        let row_re = Regex::new(&format!(
            r"\|\s*\[.*?\]\({escaped}\.md\)\s*\|[^|]*\|[^|]*\|[^|]*\|"
        ))
        .map_err(|e| AppError::Validation(e.to_string()))?;
        readme_content = row_re.replace(&readme_content, new_entry.as_str()).into_owned();
    } else if let Some(table_end) = readme_content.rfind('|') {
        let line_end = readme_content[table_end..]
            .find('\n')
            .map(|i| table_end + i)
            .unwrap_or(readme_content.len());
        readme_content.insert_str(line_end, &format!("\n{new_entry}"));
    } else {
        readme_content.push_str(&format!("{new_entry}\n"));
    }

    fs::write(readme_path, readme_content)?;
    Ok(())
}

pub struct PromoteOutcome {
    pub path: std::path::PathBuf,
    pub refreshed: bool,
    pub notes_preserved: bool,
}

pub fn promote(
    cache: &CacheStore,
    slug: &str,
    docs_dir: &Path,
    refresh: bool,
) -> AppResult<PromoteOutcome> {
    let entry = cache
        .get(slug)
        .ok_or_else(|| AppError::NotFound(format!("cache entry '{}'", slug)))?;

    fs::create_dir_all(docs_dir)?;
    let output_file = docs_dir.join(format!("{slug}.md"));

    let mut team_notes = None;
    if refresh && output_file.exists() {
        let existing = fs::read_to_string(&output_file)?;
        team_notes = extract_team_notes(&existing);
    }

    let notes_preserved = team_notes.is_some();
    let content = build_promoted_content(&entry.metadata, &entry.content, team_notes.as_deref());
    fs::write(&output_file, content)?;

    update_readme_index(docs_dir, slug, &entry.metadata.title)?;

    Ok(PromoteOutcome {
        path: output_file,
        refreshed: refresh,
        notes_preserved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn promote_wraps_content_in_markers() {
        let dir = TempDir::new().unwrap();
        let cache = CacheStore::new(dir.path().join("cache"), 30);
        cache.put("topic", "Topic", "# Research body", vec![], vec![]).unwrap();
        let docs = dir.path().join("docs");

        let outcome = promote(&cache, "topic", &docs, false).unwrap();
        let written = std::fs::read_to_string(&outcome.path).unwrap();
        assert!(written.contains(AUTO_START));
        assert!(written.contains("# Research body"));
        assert!(written.contains(TEAM_START));
        assert!(docs.join("README.md").exists());
    }

    #[test]
    fn refresh_preserves_edited_team_notes() {
        let dir = TempDir::new().unwrap();
        let cache = CacheStore::new(dir.path().join("cache"), 30);
        cache.put("topic", "Topic", "v1", vec![], vec![]).unwrap();
        let docs = dir.path().join("docs");

        let outcome = promote(&cache, "topic", &docs, false).unwrap();
        let original = std::fs::read_to_string(&outcome.path).unwrap();
        let edited = original.replace(
            "_Add project-specific notes, implementation references, and team knowledge here._",
            "We use this in the billing service.",
        );
        std::fs::write(&outcome.path, edited).unwrap();

        cache.put("topic", "Topic", "v2", vec![], vec![]).unwrap();
        let outcome = promote(&cache, "topic", &docs, true).unwrap();
        assert!(outcome.notes_preserved);

        let refreshed = std::fs::read_to_string(&outcome.path).unwrap();
        assert!(refreshed.contains("v2"));
        assert!(refreshed.contains("We use this in the billing service."));
    }

    #[test]
    fn team_notes_detection_ignores_untouched_template() {
        let with_template = format!("{TEAM_START}{}{TEAM_END}", "\n_Add project-specific notes here_\n");
        assert!(!has_team_notes(&with_template));
        let with_notes = format!("{TEAM_START}\nReal knowledge.\n{TEAM_END}");
        assert!(has_team_notes(&with_notes));
    }
}
