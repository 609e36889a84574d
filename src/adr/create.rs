// src/adr/create.rs

use super::{detect_numbering_style, find_adr_directory, next_number};
use crate::{cli::AdrTemplate, error::*, symbols};
use chrono::Local;
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

const MINIMAL_TEMPLATE: &str = r#"# ADR-{number}: {title}

## Status
Proposed

## Date
{date}

## Context and Problem Statement
[Describe the context and problem that led to this decision]

## Decision
[State the decision that was made and the justification]

## Consequences

**Positive:**
- [Positive consequence 1]

**Negative:**
- [Negative consequence 1]
"#;

const MADR_TEMPLATE: &str = r#"# ADR-{number}: {title}

## Status
Proposed

## Date
{date}

## Decision Makers
- [List decision makers]

## Technical Story
[Optional: Link to issue or spec, e.g., #123]

## Context and Problem Statement
[Describe the context and problem in 2-3 sentences. You may articulate the problem as a question.]

## Decision Drivers
- [Driver 1, e.g., a force, facing concern, ...]
- [Driver 2, e.g., a force, facing concern, ...]

## Considered Options
1. [Option 1]
2. [Option 2]
3. [Option 3]

## Decision Outcome
Chosen option: "[Option N]", because [justification].

### Consequences

**Positive:**
- [Positive consequence 1]
- [Positive consequence 2]

**Negative:**
- [Negative consequence 1]

## Pros and Cons of the Options

### [Option 1]

[Description or link to more information]

- Good, because [argument]
- Bad, because [argument]

### [Option 2]

[Description or link to more information]

- Good, because [argument]
- Bad, because [argument]

## More Information
[Optional: Links to related documentation, discussions, or prior art]
"#;

static TITLE_DROP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").unwrap());
static TITLE_SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s-]+").unwrap());

pub(super) fn generate_filename(
    number: u32,
    title: &str,
    padding: usize,
    with_prefix: bool,
) -> String {
    let lowered = title.to_lowercase();
    let stripped = TITLE_DROP_RE.replace_all(&lowered, "");
    let slug = TITLE_SPACE_RE
        .replace_all(&stripped, "-")
        .trim_matches('-')
        .to_string();
    if with_prefix {
        format!("ADR-{number:0padding$}-{slug}.md")
    } else {
        format!("{number:0padding$}-{slug}.md")
    }
}

pub fn create(
    title: &str,
    dir: Option<&Path>,
    template: AdrTemplate,
    create_dir: bool,
) -> AppResult<()> {
    let adr_dir: PathBuf = match dir {
        Some(d) => d.to_path_buf(),
        None => match find_adr_directory(Path::new(".")) {
            Some(found) => found,
            None if create_dir => {
                let fallback = Path::new("docs").join("adr");
                fs::create_dir_all(&fallback)?;
                println!("{} Created ADR directory: {}", *symbols::OK, fallback.display());
                fallback
            }
            None => {
                return Err(AppError::UserInputError(format!(
                    "No ADR directory found (searched {}). Pass --dir or --create-dir.",
                    super::SEARCH_PATHS.join(", ")
                )));
            }
        },
    };
    if !adr_dir.is_dir() {
        if create_dir {
            fs::create_dir_all(&adr_dir)?;
        } else {
            return Err(AppError::UserInputError(format!(
                "ADR directory does not exist: {}",
                adr_dir.display()
            )));
        }
    }

    let number = next_number(&adr_dir);
    let (padding, has_prefix) = detect_numbering_style(&adr_dir);
    let filename = generate_filename(number, title, padding, has_prefix);
    let filepath = adr_dir.join(&filename);

    let body = match template {
        AdrTemplate::Madr => MADR_TEMPLATE,
        AdrTemplate::Minimal => MINIMAL_TEMPLATE,
    };
    let content = body
        .replace("{number}", &format!("{:04}", number))
        .replace("{title}", title)
        .replace("{date}", &Local::now().format("%Y-%m-%d").to_string());

    fs::write(&filepath, content)?;
    println!("{} Created {}", *symbols::OK, filepath.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_is_kebab_with_padding() {
        assert_eq!(
            generate_filename(3, "Use PostgreSQL for persistence!", 4, false),
            "0003-use-postgresql-for-persistence.md"
        );
        assert_eq!(
            generate_filename(12, "HTTP/2 only", 2, true),
            "ADR-12-http2-only.md"
        );
    }
}
