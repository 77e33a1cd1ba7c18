//! Core data types for courses, learning paths and their building blocks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::segmenter;

/// Proficiency level a course or path is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum DifficultyLevel {
    /// Undergraduate-style scaffolding
    #[default]
    Beginner,
    /// Graduate-style applied engineering
    Intermediate,
    /// Doctoral-style research depth
    Advanced,
}

impl DifficultyLevel {
    /// All levels, easiest first.
    pub fn all() -> [DifficultyLevel; 3] {
        [
            DifficultyLevel::Beginner,
            DifficultyLevel::Intermediate,
            DifficultyLevel::Advanced,
        ]
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "Beginner",
            DifficultyLevel::Intermediate => "Intermediate",
            DifficultyLevel::Advanced => "Advanced",
        }
    }

    /// Label of the academic track a path at this level belongs to.
    pub fn track_label(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "Comprehensive Academic Track",
            DifficultyLevel::Intermediate => "Accelerated Graduate Track",
            DifficultyLevel::Advanced => "Doctoral Research Track",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a difficulty level name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown difficulty level: {0}")]
pub struct UnknownLevel(pub String);

impl FromStr for DifficultyLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(DifficultyLevel::Beginner),
            "intermediate" => Ok(DifficultyLevel::Intermediate),
            "advanced" => Ok(DifficultyLevel::Advanced),
            _ => Err(UnknownLevel(s.to_string())),
        }
    }
}

/// A reference cited by the generator while producing a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Source {
    pub title: String,
    pub uri: String,
}

impl Source {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
        }
    }
}

/// Drop sources whose URI was already seen, keeping the first occurrence.
pub fn dedupe_sources(sources: impl IntoIterator<Item = Source>) -> Vec<Source> {
    let mut seen = HashSet::new();
    sources
        .into_iter()
        .filter(|source| seen.insert(source.uri.clone()))
        .collect()
}

/// One addressable section of a generated course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CourseModule {
    /// Unique within the owning course
    pub id: String,
    /// Heading text, or a fixed title for implicit modules
    pub title: String,
    /// Markdown fragment, heading line included
    pub content: String,
}

impl CourseModule {
    /// Whether this is the implicit section preceding the first heading.
    pub fn is_introduction(&self) -> bool {
        self.id == segmenter::INTRO_MODULE_ID
    }
}

/// A generated course: the raw document plus its segmented modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Course {
    pub id: String,
    pub topic: String,
    pub level: DifficultyLevel,
    /// Full generated text, kept for auditing
    pub raw_content: String,
    pub modules: Vec<CourseModule>,
    /// Deduplicated by URI
    pub sources: Vec<Source>,
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Assemble a course from a freshly generated document.
    pub fn from_generation(
        topic: impl Into<String>,
        level: DifficultyLevel,
        markdown: impl Into<String>,
        sources: impl IntoIterator<Item = Source>,
    ) -> Self {
        let raw_content = markdown.into();
        let modules = segmenter::segment(&raw_content);

        Self {
            id: generate_id("course"),
            topic: topic.into(),
            level,
            raw_content,
            modules,
            sources: dedupe_sources(sources),
            created_at: Utc::now(),
        }
    }

    /// Number of modules a learner can complete.
    pub fn total_modules(&self) -> usize {
        self.modules.len()
    }

    /// Look up a module by ID.
    pub fn module(&self, module_id: &str) -> Option<&CourseModule> {
        self.modules.iter().find(|m| m.id == module_id)
    }
}

/// Lock state of a node in a learning path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Predecessor not yet completed
    Locked,
    /// Ready to start
    Unlocked,
    /// Linked course fully completed
    Completed,
}

/// Coarse grouping of path nodes by their course code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum PathPhase {
    Undergraduate,
    Graduate,
    Doctoral,
    CareerPlacement,
    Core,
}

impl PathPhase {
    pub fn label(&self) -> &'static str {
        match self {
            PathPhase::Undergraduate => "Undergraduate Phase",
            PathPhase::Graduate => "Graduate School Phase",
            PathPhase::Doctoral => "Doctoral Research Phase",
            PathPhase::CareerPlacement => "Career Placement Phase",
            PathPhase::Core => "Core Curriculum",
        }
    }
}

/// One step in a learning roadmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct PathNode {
    pub id: String,
    /// Conventionally "CODE: Description"
    pub title: String,
    pub description: String,
    pub status: NodeStatus,
    /// Course generated for this node, once there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
}

impl PathNode {
    /// Phase this node belongs to, derived from its course code prefix.
    pub fn phase(&self) -> PathPhase {
        let lower = self.title.to_lowercase();
        if self.title.starts_with("BS") {
            PathPhase::Undergraduate
        } else if self.title.starts_with("MS") {
            PathPhase::Graduate
        } else if self.title.starts_with("PHD") {
            PathPhase::Doctoral
        } else if self.title.starts_with("JOB")
            || lower.contains("job")
            || lower.contains("interview")
        {
            PathPhase::CareerPlacement
        } else {
            PathPhase::Core
        }
    }

    pub fn is_locked(&self) -> bool {
        self.status == NodeStatus::Locked
    }
}

/// A multi-course roadmap produced by one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct LearningPath {
    pub id: String,
    pub topic: String,
    pub level: DifficultyLevel,
    pub nodes: Vec<PathNode>,
    pub created_at: DateTime<Utc>,
}

impl LearningPath {
    pub fn node(&self, node_id: &str) -> Option<&PathNode> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn node_mut(&mut self, node_id: &str) -> Option<&mut PathNode> {
        self.nodes.iter_mut().find(|n| n.id == node_id)
    }

    /// Link a generated course to a node. Returns false if the node is unknown.
    pub fn link_course(&mut self, node_id: &str, course_id: impl Into<String>) -> bool {
        match self.node_mut(node_id) {
            Some(node) => {
                node.course_id = Some(course_id.into());
                true
            }
            None => false,
        }
    }

    /// Completed and total node counts.
    pub fn progress(&self) -> (usize, usize) {
        let completed = self
            .nodes
            .iter()
            .filter(|n| n.status == NodeStatus::Completed)
            .count();
        (completed, self.nodes.len())
    }
}

/// `<prefix>-<millis>-<random suffix>`
pub(crate) fn generate_id(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, Utc::now().timestamp_millis(), &suffix[..9])
}
