//! Per-course completion tracking.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::persistence::{load_json, save_json, KeyValueStore, StorageKeys, PROGRESS_KEY_PREFIX};

/// Rounded completion percentage; 0 for a course without modules.
pub fn completion_percent(completed: usize, total_modules: usize) -> u8 {
    if total_modules == 0 {
        return 0;
    }
    let percent = (100.0 * completed as f64 / total_modules as f64).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Result of toggling one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ProgressUpdate {
    pub course_id: String,
    /// Completed module IDs after the toggle
    pub completed: BTreeSet<String>,
    pub total_modules: usize,
    /// Every module of the course is now complete
    pub course_completed: bool,
}

impl ProgressUpdate {
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn percent(&self) -> u8 {
        completion_percent(self.completed.len(), self.total_modules)
    }
}

/// Tracks which modules a learner has marked complete, per course.
pub struct ProgressTracker {
    storage: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
}

impl ProgressTracker {
    pub fn new(storage: Arc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self { storage, keys }
    }

    /// Completed module IDs for a course; empty when nothing was recorded.
    pub fn load(&self, course_id: &str) -> BTreeSet<String> {
        load_json(self.storage.as_ref(), &self.keys.progress(course_id)).unwrap_or_default()
    }

    /// Flip `module_id` in the course's completed set and persist it.
    pub fn toggle(&self, course_id: &str, module_id: &str, total_modules: usize) -> ProgressUpdate {
        let mut completed = self.load(course_id);
        if !completed.remove(module_id) {
            completed.insert(module_id.to_string());
        }

        save_json(self.storage.as_ref(), &self.keys.progress(course_id), &completed);

        let course_completed = total_modules > 0 && completed.len() == total_modules;

        debug!(
            course_id = %course_id,
            module_id = %module_id,
            completed = completed.len(),
            total_modules,
            "Toggled module completion"
        );

        ProgressUpdate {
            course_id: course_id.to_string(),
            completed,
            total_modules,
            course_completed,
        }
    }

    /// Completion percentage for a course.
    pub fn percent(&self, course_id: &str, total_modules: usize) -> u8 {
        completion_percent(self.load(course_id).len(), total_modules)
    }

    /// Completed modules summed over every recorded course.
    pub fn total_completed(&self) -> usize {
        let keys = match self.storage.keys(PROGRESS_KEY_PREFIX) {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Could not enumerate progress records");
                return 0;
            }
        };

        keys.iter()
            .filter_map(|key| load_json::<BTreeSet<String>>(self.storage.as_ref(), key))
            .map(|set| set.len())
            .sum()
    }
}
