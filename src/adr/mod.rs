// src/adr/mod.rs

mod create;
mod index;
mod supersede;

pub use create::create;
pub use index::{generate_index, index};
pub use supersede::supersede;

use regex::Regex;
use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

pub const SEARCH_PATHS: [&str; 4] = ["docs/adr", "doc/adr", "architecture/decisions", ".adr"];

static NUMBERED_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:ADR-)?(\d+)-.*\.md$").unwrap());
static PREFIXED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^ADR-(\d+)-").unwrap());
static PLAIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)-").unwrap());

fn is_special_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower == "readme.md" || lower == "template.md"
}

pub(crate) fn markdown_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .into_iter()
        .flatten()
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
        .collect();
    files.sort();
    files
}

/// First existing conventional directory under the base path.
pub fn find_adr_directory(base: &Path) -> Option<PathBuf> {
    SEARCH_PATHS
        .iter()
        .map(|p| base.join(p))
        .find(|dir| dir.is_dir())
}

/// Number parsed from `0001-title.md` or `ADR-0001-title.md`.
pub(crate) fn file_number(name: &str) -> Option<u32> {
    NUMBERED_FILE_RE
        .captures(name)
        .and_then(|c| c[1].parse().ok())
}

/// Padding width and ADR- prefix presence, inferred from the first
/// numbered file. Defaults to width 4 without prefix.
pub(crate) fn detect_numbering_style(dir: &Path) -> (usize, bool) {
    for path in markdown_files(dir) {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if is_special_file(name) {
            continue;
        }
        if let Some(c) = PREFIXED_RE.captures(name) {
            return (c[1].len(), true);
        }
        if let Some(c) = PLAIN_RE.captures(name) {
            return (c[1].len(), false);
        }
    }
    (4, false)
}

pub(crate) fn next_number(dir: &Path) -> u32 {
    markdown_files(dir)
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .filter_map(file_number)
        .max()
        .unwrap_or(0)
        + 1
}

/// Locates a record by number, whatever the zero padding.
pub(crate) fn find_by_number(dir: &Path, number: u32) -> Option<PathBuf> {
    markdown_files(dir).into_iter().find(|p| {
        p.file_name()
            .and_then(|n| n.to_str())
            .and_then(file_number)
            == Some(number)
    })
}

/// `ADR-0005` style reference preserving the file's own padding.
pub(crate) fn adr_reference(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if let Some(c) = NUMBERED_FILE_RE.captures(name) {
        let digits = &c[1];
        if let Ok(num) = digits.parse::<u32>() {
            return format!("ADR-{:0width$}", num, width = digits.len());
        }
    }
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "# stub").unwrap();
    }

    #[test]
    fn numbering_is_max_plus_one() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "0001-first.md");
        touch(dir.path(), "0005-gap.md");
        touch(dir.path(), "README.md");
        assert_eq!(next_number(dir.path()), 6);
    }

    #[test]
    fn empty_directory_starts_at_one() {
        let dir = TempDir::new().unwrap();
        assert_eq!(next_number(dir.path()), 1);
    }

    #[test]
    fn padding_and_prefix_round_trip() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "ADR-001-first.md");
        let (padding, prefixed) = detect_numbering_style(dir.path());
        assert_eq!((padding, prefixed), (3, true));

        let generated = create::generate_filename(2, "Second decision", padding, prefixed);
        assert_eq!(generated, "ADR-002-second-decision.md");
        // The generated name feeds back into the same detector
        touch(dir.path(), &generated);
        assert_eq!(file_number(&generated), Some(2));
    }

    #[test]
    fn find_by_number_ignores_padding() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "007-lucky.md");
        let found = find_by_number(dir.path(), 7).unwrap();
        assert_eq!(found.file_name().unwrap(), "007-lucky.md");
        assert!(find_by_number(dir.path(), 8).is_none());
    }

    #[test]
    fn reference_preserves_padding() {
        assert_eq!(adr_reference(Path::new("0005-old.md")), "ADR-0005");
        assert_eq!(adr_reference(Path::new("ADR-12-new.md")), "ADR-12");
    }
}
