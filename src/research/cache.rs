// src/research/cache.rs

use crate::{error::*, utils};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub researched_at: String,
    #[serde(default)]
    pub expires_at: String,
}

/// Row kept in the flat index.json; a subset of the entry metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRow {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub researched_at: String,
    #[serde(default)]
    pub expires_at: String,
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub metadata: EntryMetadata,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryStatus {
    pub slug: String,
    pub title: String,
    pub aliases: Vec<String>,
    pub researched_at: String,
    pub expires_at: Option<String>,
    pub expired: bool,
}

/// A missing or unparsable timestamp counts as expired.
pub fn is_expired(expires_at: &str) -> bool {
    if expires_at.is_empty() {
        return true;
    }
    match DateTime::parse_from_rfc3339(expires_at) {
        Ok(expires) => Utc::now() > expires,
        Err(_) => true,
    }
}

pub struct CacheStore {
    root: PathBuf,
    ttl_days: i64,
}

impl CacheStore {
    pub fn new(root: PathBuf, ttl_days: i64) -> Self {
        Self { root, ttl_days }
    }

    pub fn from_env() -> Self {
        Self::new(
            crate::config::research_cache_dir(),
            crate::config::research_ttl_days(),
        )
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn entry_dir(&self, slug: &str) -> PathBuf {
        self.root.join("entries").join(slug)
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    fn ensure(&self) -> AppResult<()> {
        fs::create_dir_all(self.root.join("entries"))?;
        let index = self.index_path();
        if !index.exists() {
            fs::write(&index, "{}")?;
        }
        Ok(())
    }

    /// Garbled or missing index files read as empty rather than failing,
    /// so a corrupt index never blocks cache writes.
    pub fn index(&self) -> BTreeMap<String, IndexRow> {
        let Ok(raw) = fs::read_to_string(self.index_path()) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }

    fn save_index(&self, index: &BTreeMap<String, IndexRow>) -> AppResult<()> {
        self.ensure()?;
        utils::write_json_atomic(&self.index_path(), index)
    }

    /// Resolves a topic to a canonical slug: direct index hit first, then a
    /// scan of normalized aliases.
    pub fn find_by_alias(&self, topic: &str) -> Option<String> {
        let normalized = utils::normalize_slug(topic);
        let index = self.index();
        if index.contains_key(&normalized) {
            return Some(normalized);
        }
        for (slug, row) in &index {
            if row
                .aliases
                .iter()
                .any(|a| utils::normalize_slug(a) == normalized)
            {
                return Some(slug.clone());
            }
        }
        None
    }

    pub fn resolve_slug(&self, topic: &str) -> String {
        self.find_by_alias(topic)
            .unwrap_or_else(|| utils::normalize_slug(topic))
    }

    pub fn get(&self, slug: &str) -> Option<Entry> {
        let entry_dir = self.entry_dir(slug);
        let metadata_raw = fs::read_to_string(entry_dir.join("metadata.json")).ok()?;
        let content = fs::read_to_string(entry_dir.join("content.md")).ok()?;
        let metadata = serde_json::from_str(&metadata_raw).ok()?;
        Some(Entry { metadata, content })
    }

    pub fn put(
        &self,
        slug: &str,
        title: &str,
        content: &str,
        aliases: Vec<String>,
        tags: Vec<String>,
    ) -> AppResult<EntryMetadata> {
        self.ensure()?;
        let entry_dir = self.entry_dir(slug);
        fs::create_dir_all(&entry_dir)?;

        let now = Utc::now();
        let expires = now + Duration::days(self.ttl_days);
        let metadata = EntryMetadata {
            slug: slug.to_string(),
            title: title.to_string(),
            aliases,
            tags,
            sources: Vec::new(),
            researched_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            expires_at: expires.to_rfc3339_opts(SecondsFormat::Secs, true),
        };

        utils::write_json_atomic(&entry_dir.join("metadata.json"), &metadata)?;
        fs::write(entry_dir.join("content.md"), content)?;

        let mut index = self.index();
        index.insert(
            slug.to_string(),
            IndexRow {
                slug: metadata.slug.clone(),
                title: metadata.title.clone(),
                aliases: metadata.aliases.clone(),
                researched_at: metadata.researched_at.clone(),
                expires_at: metadata.expires_at.clone(),
            },
        );
        self.save_index(&index)?;

        Ok(metadata)
    }

    pub fn delete(&self, slug: &str) -> AppResult<bool> {
        let entry_dir = self.entry_dir(slug);
        if !entry_dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&entry_dir)?;

        let mut index = self.index();
        if index.remove(slug).is_some() {
            self.save_index(&index)?;
        }
        Ok(true)
    }

    /// All entries, newest research first.
    pub fn list(&self) -> Vec<EntryStatus> {
        let mut entries: Vec<EntryStatus> = self
            .index()
            .into_values()
            .map(|row| {
                let expired = is_expired(&row.expires_at);
                EntryStatus {
                    slug: row.slug.clone(),
                    title: if row.title.is_empty() {
                        row.slug
                    } else {
                        row.title
                    },
                    aliases: row.aliases,
                    researched_at: row.researched_at,
                    expires_at: if row.expires_at.is_empty() {
                        None
                    } else {
                        Some(row.expires_at)
                    },
                    expired,
                }
            })
            .collect();
        entries.sort_by(|a, b| b.researched_at.cmp(&a.researched_at));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir, ttl_days: i64) -> CacheStore {
        CacheStore::new(dir.path().to_path_buf(), ttl_days)
    }

    #[test]
    fn put_then_get_round_trips() {
        let dir = TempDir::new().unwrap();
        let cache = store(&dir, 30);
        cache
            .put("react-hooks", "React Hooks", "# Notes", vec!["hooks".into()], vec![])
            .unwrap();

        let entry = cache.get("react-hooks").unwrap();
        assert_eq!(entry.metadata.title, "React Hooks");
        assert_eq!(entry.content, "# Notes");
        assert!(!is_expired(&entry.metadata.expires_at));
    }

    #[test]
    fn alias_lookup_resolves_canonical_slug() {
        let dir = TempDir::new().unwrap();
        let cache = store(&dir, 30);
        cache
            .put("domain-driven-design", "DDD", "notes", vec!["DDD Basics".into()], vec![])
            .unwrap();

        assert_eq!(
            cache.find_by_alias("ddd basics").as_deref(),
            Some("domain-driven-design")
        );
        assert!(cache.find_by_alias("unrelated").is_none());
    }

    #[test]
    fn zero_ttl_entries_expire_immediately() {
        let dir = TempDir::new().unwrap();
        let cache = store(&dir, 0);
        let meta = cache.put("old", "Old", "stale", vec![], vec![]).unwrap();
        // expires_at == now, and expiry is strict: now > expires_at
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert!(is_expired(&meta.expires_at));
    }

    #[test]
    fn missing_or_garbled_timestamps_count_as_expired() {
        assert!(is_expired(""));
        assert!(is_expired("not-a-date"));
        assert!(!is_expired("2999-01-01T00:00:00Z"));
    }

    #[test]
    fn delete_removes_entry_and_index_row() {
        let dir = TempDir::new().unwrap();
        let cache = store(&dir, 30);
        cache.put("tmp", "Tmp", "x", vec![], vec![]).unwrap();
        assert!(cache.delete("tmp").unwrap());
        assert!(cache.get("tmp").is_none());
        assert!(cache.index().is_empty());
        assert!(!cache.delete("tmp").unwrap());
    }
}
