// src/udemy/progress.rs
//
// Resume support. Completed lecture ids are persisted after every
// lecture so an interrupted run can pick up where it stopped.

use crate::{constants, error::*, utils};
use chrono::Local;
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProgressFile {
    #[serde(default)]
    completed_lectures: Vec<u64>,
    #[serde(default)]
    last_updated: String,
}

#[derive(Debug)]
pub struct ProgressTracker {
    path: PathBuf,
    completed: HashSet<u64>,
}

impl ProgressTracker {
    /// Loads any existing progress file in `course_dir`. An unreadable
    /// file starts a fresh run instead of aborting.
    pub fn load(course_dir: &Path) -> Self {
        let path = course_dir.join(constants::PROGRESS_FILE_NAME);
        let completed = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<ProgressFile>(&raw) {
                Ok(file) => file.completed_lectures.into_iter().collect(),
                Err(e) => {
                    warn!("ignoring corrupt progress file {}: {e}", path.display());
                    HashSet::new()
                }
            },
            Err(_) => HashSet::new(),
        };
        Self { path, completed }
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn is_complete(&self, lecture_id: u64) -> bool {
        self.completed.contains(&lecture_id)
    }

    pub fn mark_complete(&mut self, lecture_id: u64) -> AppResult<()> {
        self.completed.insert(lecture_id);
        let mut completed_lectures: Vec<u64> = self.completed.iter().copied().collect();
        completed_lectures.sort_unstable();
        utils::write_json_atomic(
            &self.path,
            &ProgressFile {
                completed_lectures,
                last_updated: Local::now().to_rfc3339(),
            },
        )
    }

    /// Removes the progress file after a run finishes cleanly.
    pub fn clear(&mut self) -> AppResult<()> {
        self.completed.clear();
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn progress_survives_a_reload() {
        let dir = tempdir().unwrap();
        let mut tracker = ProgressTracker::load(dir.path());
        assert_eq!(tracker.completed_count(), 0);

        tracker.mark_complete(101).unwrap();
        tracker.mark_complete(102).unwrap();

        let reloaded = ProgressTracker::load(dir.path());
        assert_eq!(reloaded.completed_count(), 2);
        assert!(reloaded.is_complete(101));
        assert!(!reloaded.is_complete(999));
    }

    #[test]
    fn clear_removes_the_file() {
        let dir = tempdir().unwrap();
        let mut tracker = ProgressTracker::load(dir.path());
        tracker.mark_complete(7).unwrap();
        assert!(dir.path().join(constants::PROGRESS_FILE_NAME).exists());

        tracker.clear().unwrap();
        assert!(!dir.path().join(constants::PROGRESS_FILE_NAME).exists());
        assert_eq!(ProgressTracker::load(dir.path()).completed_count(), 0);
    }

    #[test]
    fn corrupt_file_starts_fresh() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(constants::PROGRESS_FILE_NAME), "{not json").unwrap();
        let tracker = ProgressTracker::load(dir.path());
        assert_eq!(tracker.completed_count(), 0);
    }
}
