// src/research/mod.rs

pub mod cache;
pub mod index;
pub mod promote;

use crate::{
    cli::{ListFormat, ResearchCommand},
    config,
    error::*,
    utils,
};
use cache::CacheStore;
use serde_json::json;
use std::{fs, io::Read};

/// Command output is JSON on stdout so callers can script against it,
/// matching the table/JSON split of `list`.
pub fn run(command: &ResearchCommand) -> AppResult<i32> {
    let store = CacheStore::from_env();

    match command {
        ResearchCommand::Get { slug } => {
            let resolved = store.resolve_slug(slug);
            match store.get(&resolved) {
                Some(entry) => {
                    let status = if cache::is_expired(&entry.metadata.expires_at) {
                        "expired"
                    } else {
                        "valid"
                    };
                    let out = json!({
                        "slug": resolved,
                        "metadata": entry.metadata,
                        "content": entry.content,
                        "cache_status": status,
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                    Ok(0)
                }
                None => {
                    println!("{}", json!({"error": "not_found", "slug": resolved}));
                    Ok(1)
                }
            }
        }
        ResearchCommand::Put {
            slug,
            title,
            content_file,
            aliases,
            tags,
        } => {
            let slug = utils::normalize_slug(slug);
            let content = match content_file {
                Some(path) => fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let split = |s: &str| -> Vec<String> {
                s.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            };
            let metadata = store.put(
                &slug,
                title.as_deref().unwrap_or(&slug),
                &content,
                split(aliases),
                split(tags),
            )?;
            let out = json!({
                "status": "cached",
                "slug": slug,
                "path": store.entry_dir(&slug),
                "expires_at": metadata.expires_at,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(0)
        }
        ResearchCommand::Check { slug } => {
            let resolved = store.resolve_slug(slug);
            match store.get(&resolved) {
                Some(entry) => {
                    let out = json!({
                        "exists": true,
                        "slug": resolved,
                        "title": entry.metadata.title,
                        "expired": cache::is_expired(&entry.metadata.expires_at),
                        "expires_at": entry.metadata.expires_at,
                        "researched_at": entry.metadata.researched_at,
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
                None => {
                    println!("{}", json!({"exists": false, "slug": resolved}));
                }
            }
            Ok(0)
        }
        ResearchCommand::List { format } => {
            let entries = store.list();
            match format {
                ListFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                }
                ListFormat::Table => {
                    println!(
                        "{:<30} {:<30} {:<10} {:<12}",
                        "Slug", "Title", "Status", "Expires"
                    );
                    println!("{}", "-".repeat(85));
                    for e in &entries {
                        let status = if e.expired { "Expired" } else { "Valid" };
                        let expires = e
                            .expires_at
                            .as_deref()
                            .map(|s| s.get(..10).unwrap_or(s))
                            .unwrap_or("N/A");
                        println!(
                            "{:<30} {:<30} {:<10} {:<12}",
                            e.slug,
                            utils::truncate_text(&e.title, 30),
                            status,
                            expires
                        );
                    }
                }
            }
            Ok(0)
        }
        ResearchCommand::Delete { slug } => {
            let slug = utils::normalize_slug(slug);
            if store.delete(&slug)? {
                println!("{}", json!({"status": "deleted", "slug": slug}));
                Ok(0)
            } else {
                println!("{}", json!({"error": "not_found", "slug": slug}));
                Ok(1)
            }
        }
        ResearchCommand::Promote {
            slug,
            output_dir,
            refresh,
        } => {
            let slug = store.resolve_slug(slug);
            let docs_dir = output_dir
                .clone()
                .unwrap_or_else(config::research_docs_dir);
            match promote::promote(&store, &slug, &docs_dir, *refresh) {
                Ok(outcome) => {
                    let action = if outcome.refreshed { "updated" } else { "promoted" };
                    let out = json!({
                        "success": true,
                        "action": action,
                        "slug": slug,
                        "path": outcome.path,
                        "team_notes_preserved": outcome.notes_preserved,
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                    Ok(0)
                }
                Err(AppError::NotFound(what)) => {
                    println!(
                        "{}",
                        json!({"success": false, "message": format!("{} not found", what)})
                    );
                    Ok(1)
                }
                Err(e) => Err(e),
            }
        }
        ResearchCommand::Index {
            cache: cache_only,
            docs: docs_only,
            docs_dir,
            dry_run,
        } => {
            // Neither flag means both tiers.
            let both = !cache_only && !docs_only;
            let docs_path = docs_dir.clone().unwrap_or_else(config::research_docs_dir);
            let mut results = Vec::new();

            if *cache_only || both {
                let readme = index::generate_cache_readme(&store);
                if *dry_run {
                    println!("=== CACHE README ===\n{readme}");
                    results.push(json!({"tier": "cache", "status": "dry_run"}));
                } else {
                    fs::create_dir_all(store.root())?;
                    let path = store.root().join("README.md");
                    fs::write(&path, readme)?;
                    results.push(json!({"tier": "cache", "path": path, "status": "updated"}));
                }
            }
            if *docs_only || both {
                let readme = index::generate_docs_readme(&docs_path);
                if *dry_run {
                    println!("=== DOCS README ===\n{readme}");
                    results.push(json!({"tier": "docs", "status": "dry_run"}));
                } else {
                    fs::create_dir_all(&docs_path)?;
                    let path = docs_path.join("README.md");
                    fs::write(&path, readme)?;
                    results.push(json!({"tier": "docs", "path": path, "status": "updated"}));
                }
            }

            if !dry_run {
                println!("{}", serde_json::to_string_pretty(&json!({"results": results}))?);
            }
            Ok(0)
        }
    }
}
