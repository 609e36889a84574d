// src/config.rs

use crate::constants;
use std::{
    env,
    path::PathBuf,
    time::Duration,
};

/// Shared HTTP knobs. Everything else is resolved per-command from the
/// environment via the free functions below.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub max_retries: u32,
    pub min_request_interval: Duration,
    pub max_workers: usize,
}

impl AppConfig {
    pub fn new(max_retries: u32, workers: usize) -> Self {
        Self {
            user_agent: constants::USER_AGENT.into(),
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(60),
            max_retries,
            min_request_interval: Duration::from_millis(
                constants::DEFAULT_MIN_REQUEST_INTERVAL_MS,
            ),
            max_workers: workers.clamp(1, constants::MAX_PARALLEL_WORKERS),
        }
    }
}

#[cfg(feature = "testing")]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: "test-agent/1.0".to_string(),
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(15),
            max_retries: 3,
            min_request_interval: Duration::from_millis(0),
            max_workers: 2,
        }
    }
}

/// Tier 1 cache location: RESEARCH_CACHE_DIR, else ~/.skolakit/research.
pub fn research_cache_dir() -> PathBuf {
    if let Ok(dir) = env::var("RESEARCH_CACHE_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    match dirs::home_dir() {
        Some(home) => home.join(constants::CONFIG_DIR_NAME).join("research"),
        None => env::temp_dir().join("skolakit-research"),
    }
}

/// RESEARCH_TTL_DAYS, else 30. Unparsable values fall back to the default.
pub fn research_ttl_days() -> i64 {
    env::var("RESEARCH_TTL_DAYS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(constants::DEFAULT_TTL_DAYS)
}

/// Tier 2 docs location: RESEARCH_DOCS_DIR, else docs/research under cwd.
pub fn research_docs_dir() -> PathBuf {
    if let Ok(dir) = env::var("RESEARCH_DOCS_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    PathBuf::from(constants::DEFAULT_DOCS_DIR)
}

/// Root for extraction output, with a per-source subdirectory.
///
/// Priority: SKOLA_RESEARCH_DIR, then an upward search for a
/// `skola-research` directory, then `./skola-research`.
pub fn extraction_root(source: &str) -> PathBuf {
    if let Ok(base) = env::var("SKOLA_RESEARCH_DIR") {
        if !base.is_empty() {
            return PathBuf::from(base).join(source);
        }
    }

    if let Ok(cwd) = env::current_dir() {
        let mut current = cwd.as_path();
        loop {
            let candidate = current.join("skola-research");
            if candidate.is_dir() {
                return candidate.join(source);
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        return cwd.join("skola-research").join(source);
    }

    PathBuf::from("skola-research").join(source)
}

pub fn gemini_api_key() -> Option<String> {
    env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty())
}
