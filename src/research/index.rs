// src/research/index.rs

use crate::research::{cache::CacheStore, promote};
use std::{fs, path::Path};

// Frontmatter stamps come from user-editable files, so the cut must
// respect char boundaries instead of byte-slicing.
fn format_date(iso: &str) -> &str {
    iso.get(..10).unwrap_or("N/A")
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() > 35 {
        let cut: String = title.chars().take(32).collect();
        format!("{cut}...")
    } else {
        title.to_string()
    }
}

pub fn generate_cache_readme(cache: &CacheStore) -> String {
    let entries = cache.list();
    if entries.is_empty() {
        return "# Research Cache\n\nNo cached research yet.\n".to_string();
    }

    let mut lines = vec![
        "# Research Cache".to_string(),
        String::new(),
        "User-level cache for cross-project research reuse.".to_string(),
        String::new(),
        format!("**Location:** `{}`", cache.root().display()),
        format!("**Entries:** {}", entries.len()),
        String::new(),
        "## Index".to_string(),
        String::new(),
        "| Slug | Title | Researched | Expires | Status |".to_string(),
        "|------|-------|------------|---------|--------|".to_string(),
    ];

    let mut valid_count = 0;
    let mut expired_count = 0;
    for entry in &entries {
        let (icon, status) = if entry.expired {
            expired_count += 1;
            ("⚠️", "Expired")
        } else {
            valid_count += 1;
            ("✅", "Valid")
        };
        lines.push(format!(
            "| {} | {} | {} | {} | {} {} |",
            entry.slug,
            truncate_title(&entry.title),
            format_date(&entry.researched_at),
            entry.expires_at.as_deref().map(format_date).unwrap_or("N/A"),
            icon,
            status
        ));
    }

    lines.extend([
        String::new(),
        "## Summary".to_string(),
        String::new(),
        format!("- **Valid:** {}", valid_count),
        format!("- **Expired:** {}", expired_count),
        String::new(),
    ]);

    lines.join("\n")
}

struct DocsRow {
    slug: String,
    title: String,
    promoted_at: String,
    last_refreshed: String,
    has_team_notes: bool,
}

fn frontmatter_field(content: &str, key: &str) -> Option<String> {
    if !content.starts_with("---") {
        return None;
    }
    let end = content[3..].find("---")? + 3;
    content[3..end]
        .lines()
        .find_map(|line| {
            let (k, v) = line.split_once(':')?;
            (k.trim() == key).then(|| v.trim().to_string())
        })
}

pub fn generate_docs_readme(docs_dir: &Path) -> String {
    let Ok(read_dir) = fs::read_dir(docs_dir) else {
        return "# Research Index\n\nNo promoted research yet.\n".to_string();
    };

    let mut entries: Vec<DocsRow> = Vec::new();
    for item in read_dir.flatten() {
        let path = item.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(".md") || name.eq_ignore_ascii_case("readme.md") {
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let slug = name.trim_end_matches(".md").to_string();
        entries.push(DocsRow {
            title: frontmatter_field(&content, "title").unwrap_or_else(|| slug.clone()),
            promoted_at: frontmatter_field(&content, "promoted_at").unwrap_or_default(),
            last_refreshed: frontmatter_field(&content, "last_refreshed").unwrap_or_default(),
            has_team_notes: promote::has_team_notes(&content),
            slug,
        });
    }

    entries.sort_by(|a, b| b.promoted_at.cmp(&a.promoted_at));

    let mut lines = vec![
        "# Research Index".to_string(),
        String::new(),
        "Curated technical research for this project.".to_string(),
        String::new(),
        "## Topics".to_string(),
        String::new(),
        "| Topic | Promoted | Last Refreshed | Team Notes |".to_string(),
        "|-------|----------|----------------|------------|".to_string(),
    ];

    let mut with_notes = 0;
    for entry in &entries {
        let notes_icon = if entry.has_team_notes {
            with_notes += 1;
            "✅ Yes"
        } else {
            "—"
        };
        lines.push(format!(
            "| [{}]({}.md) | {} | {} | {} |",
            truncate_title(&entry.title),
            entry.slug,
            format_date(&entry.promoted_at),
            format_date(&entry.last_refreshed),
            notes_icon
        ));
    }

    lines.extend([
        String::new(),
        "## Summary".to_string(),
        String::new(),
        format!("- **Total:** {}", entries.len()),
        format!("- **With team notes:** {}", with_notes),
        format!("- **Without team notes:** {}", entries.len() - with_notes),
        String::new(),
    ]);

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::cache::CacheStore;
    use tempfile::TempDir;

    #[test]
    fn cache_readme_lists_entries_with_status() {
        let dir = TempDir::new().unwrap();
        let cache = CacheStore::new(dir.path().to_path_buf(), 30);
        cache.put("react-hooks", "React Hooks", "notes", vec![], vec![]).unwrap();

        let readme = generate_cache_readme(&cache);
        assert!(readme.contains("| react-hooks |"));
        assert!(readme.contains("✅ Valid"));
        assert!(readme.contains("**Entries:** 1"));
    }

    #[test]
    fn docs_readme_reads_promoted_frontmatter() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("topic.md"),
            "---\ntitle: My Topic\npromoted_at: 2026-08-01T00:00:00Z\nlast_refreshed: 2026-08-01T00:00:00Z\n---\nbody",
        )
        .unwrap();

        let readme = generate_docs_readme(dir.path());
        assert!(readme.contains("[My Topic](topic.md)"));
        assert!(readme.contains("2026-08-01"));
    }

    #[test]
    fn docs_readme_tolerates_hand_edited_date_stamps() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("topic.md"),
            "---\ntitle: Edited Topic\npromoted_at: 2026-08-0ûx\n---\nbody",
        )
        .unwrap();

        let readme = generate_docs_readme(dir.path());
        assert!(readme.contains("[Edited Topic](topic.md)"));
        assert!(readme.contains("N/A"));
    }

    #[test]
    fn empty_docs_dir_yields_placeholder() {
        let readme = generate_docs_readme(Path::new("/nonexistent/docs"));
        assert!(readme.contains("No promoted research yet"));
    }
}
