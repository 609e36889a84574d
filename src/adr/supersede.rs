// src/adr/supersede.rs

use super::{adr_reference, find_by_number};
use crate::{error::*, symbols};
use regex::Regex;
use std::{fs, path::Path, sync::LazyLock};

static STATUS_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)(^##\s+Status\s*\n+)([^\n#]+)").unwrap());
static STATUS_SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)(^##\s+Status\s*\n+[^\n#]+\n)").unwrap());

fn rewrite_status(path: &Path, new_status: &str, link_ref: &str, link_file: &str) -> AppResult<bool> {
    let content = fs::read_to_string(path)?;
    let replacement = format!("${{1}}{new_status} by [{link_ref}]({link_file})");
    let new_content = STATUS_VALUE_RE.replace(&content, replacement.as_str());
    if new_content == content {
        return Ok(false);
    }
    fs::write(path, new_content.as_ref())?;
    Ok(true)
}

fn add_supersedes_reference(path: &Path, old_ref: &str, old_file: &str) -> AppResult<bool> {
    let content = fs::read_to_string(path)?;
    let replacement = format!("${{1}}\nSupersedes: [{old_ref}]({old_file})\n");
    let new_content = STATUS_SECTION_RE.replace(&content, replacement.as_str());
    if new_content == content {
        return Ok(false);
    }
    fs::write(path, new_content.as_ref())?;
    Ok(true)
}

pub fn supersede(old_number: u32, new_number: u32, adr_dir: &Path) -> AppResult<()> {
    if !adr_dir.is_dir() {
        return Err(AppError::UserInputError(format!(
            "Directory does not exist: {}",
            adr_dir.display()
        )));
    }

    let old_adr = find_by_number(adr_dir, old_number).ok_or_else(|| {
        AppError::NotFound(format!("ADR-{:04} in {}", old_number, adr_dir.display()))
    })?;
    let new_adr = find_by_number(adr_dir, new_number).ok_or_else(|| {
        AppError::NotFound(format!("ADR-{:04} in {}", new_number, adr_dir.display()))
    })?;

    let old_ref = adr_reference(&old_adr);
    let new_ref = adr_reference(&new_adr);
    let old_name = old_adr.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
    let new_name = new_adr.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();

    println!("Superseding {old_ref} with {new_ref}...\n");

    if !rewrite_status(&old_adr, "Superseded", &new_ref, &new_name)? {
        return Err(AppError::Validation(format!(
            "could not update the Status section in {} (non-standard format?)",
            old_name
        )));
    }
    println!("  {} Updated: {}", *symbols::OK, old_name);
    println!("    Status: Superseded by [{new_ref}]({new_name})");

    if add_supersedes_reference(&new_adr, &old_ref, &old_name)? {
        println!("  {} Updated: {}", *symbols::OK, new_name);
        println!("    Added: Supersedes: [{old_ref}]({old_name})");
    } else {
        println!(
            "  {} Could not add a Supersedes reference to {}; add it manually.",
            *symbols::WARN, new_name
        );
    }

    println!("\nSupersession complete. Run `adr index --dir {}` to refresh the README.", adr_dir.display());
    Ok(())
}
