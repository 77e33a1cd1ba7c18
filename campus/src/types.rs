//! Core types for campus sessions.

use serde::{Deserialize, Serialize};

use curriculum::{Badge, MaterializeError, PersistenceError};
use pathfinder_agent::{GenerationError, LlmError};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Notification pushed to session subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CampusEvent {
    /// A badge was unlocked for the first time
    BadgeUnlocked { badge: Badge },
    /// Every module of a course is complete
    CourseCompleted { course_id: String },
    /// A path node became available
    PathAdvanced { path_id: String, node_id: String },
}

/// Error type for campus operations.
#[derive(Debug, thiserror::Error)]
pub enum CampusError {
    #[error("Course not found: {0}")]
    CourseNotFound(String),

    #[error("Learning path not found: {0}")]
    PathNotFound(String),

    #[error("Path node not found: {0}")]
    NodeNotFound(String),

    #[error("Module {module_id} not found in course {course_id}")]
    ModuleNotFound { course_id: String, module_id: String },

    /// Node operations need an active path
    #[error("No active learning path")]
    NoActivePath,

    #[error("Path node is locked: {0}")]
    NodeLocked(String),

    /// Generation error
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Generated roadmap could not be read
    #[error("Materialize error: {0}")]
    Materialize(#[from] MaterializeError),

    /// Storage could not be opened
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<LlmError> for CampusError {
    fn from(e: LlmError) -> Self {
        CampusError::Generation(GenerationError::Backend(e))
    }
}

pub type Result<T> = std::result::Result<T, CampusError>;
