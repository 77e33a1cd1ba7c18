//! Generation request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use curriculum::DifficultyLevel;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// What a generation request produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    /// Markdown syllabus for a single course
    Course,
    /// JSON roadmap of courses
    Path,
}

impl GenerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationKind::Course => "course",
            GenerationKind::Path => "path",
        }
    }
}

/// One call to the curriculum generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct GenerationRequest {
    /// Unique request identifier, used to correlate log lines
    pub request_id: String,
    pub kind: GenerationKind,
    /// Course topic or career goal
    pub topic: String,
    pub level: DifficultyLevel,
    pub requested_at: DateTime<Utc>,
}

impl GenerationRequest {
    pub fn new(kind: GenerationKind, topic: impl Into<String>, level: DifficultyLevel) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            kind,
            topic: topic.into(),
            level,
            requested_at: Utc::now(),
        }
    }

    pub fn course(topic: impl Into<String>, level: DifficultyLevel) -> Self {
        Self::new(GenerationKind::Course, topic, level)
    }

    pub fn path(goal: impl Into<String>, level: DifficultyLevel) -> Self {
        Self::new(GenerationKind::Path, goal, level)
    }

    /// Milliseconds since the request was created.
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.requested_at).num_milliseconds()
    }
}
