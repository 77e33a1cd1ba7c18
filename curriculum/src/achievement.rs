//! Badges and the rules that unlock them.
//!
//! Badge derivation is pure: [`evaluate_progress`] maps a progress event
//! onto the badges it earns, and [`BadgeSet::unlock`] is idempotent. Full
//! course completion is reported separately as a [`CourseCompleted`] event
//! which [`advance_path`] applies to a learning path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::progress::ProgressUpdate;
use crate::types::{LearningPath, NodeStatus};

/// Completed modules needed for the bookworm badge.
pub const BOOKWORM_THRESHOLD: usize = 5;

/// Identifier of a badge in the fixed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum BadgeId {
    /// First module completed
    FirstStep,
    /// Five modules completed in one course
    Bookworm,
    /// A full course completed
    Scholar,
    /// A learning path was started
    Pathfinder,
}

impl BadgeId {
    /// Every badge, in display order.
    pub fn catalog() -> [BadgeId; 4] {
        [
            BadgeId::FirstStep,
            BadgeId::Bookworm,
            BadgeId::Scholar,
            BadgeId::Pathfinder,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeId::FirstStep => "first_step",
            BadgeId::Bookworm => "bookworm",
            BadgeId::Scholar => "scholar",
            BadgeId::Pathfinder => "pathfinder",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BadgeId::FirstStep => "First Step",
            BadgeId::Bookworm => "Bookworm",
            BadgeId::Scholar => "Scholar",
            BadgeId::Pathfinder => "Pathfinder",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BadgeId::FirstStep => "Complete your first module",
            BadgeId::Bookworm => "Complete 5 modules",
            BadgeId::Scholar => "Complete a full course",
            BadgeId::Pathfinder => "Start a learning path",
        }
    }

    /// Icon identifier understood by the presentation layer.
    pub fn icon(&self) -> &'static str {
        match self {
            BadgeId::FirstStep => "zap",
            BadgeId::Bookworm => "book",
            BadgeId::Scholar => "award",
            BadgeId::Pathfinder => "star",
        }
    }

    /// Badge descriptor, not yet unlocked.
    pub fn badge(&self) -> Badge {
        Badge {
            id: *self,
            name: self.name().to_string(),
            description: self.description().to_string(),
            icon: self.icon().to_string(),
            unlocked_at: None,
        }
    }
}

/// A static achievement descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Badge {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Progress counters reported after a module toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub course_id: String,
    pub completed_count: usize,
    pub total_modules: usize,
}

impl ProgressEvent {
    pub fn is_course_complete(&self) -> bool {
        self.total_modules > 0 && self.completed_count == self.total_modules
    }

    /// The completion event this progress implies, if any.
    pub fn course_completed(&self) -> Option<CourseCompleted> {
        self.is_course_complete().then(|| CourseCompleted {
            course_id: self.course_id.clone(),
        })
    }
}

impl From<&ProgressUpdate> for ProgressEvent {
    fn from(update: &ProgressUpdate) -> Self {
        Self {
            course_id: update.course_id.clone(),
            completed_count: update.completed.len(),
            total_modules: update.total_modules,
        }
    }
}

/// Every module of a course has been completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseCompleted {
    pub course_id: String,
}

/// Badges earned by a progress event, regardless of what is already unlocked.
pub fn evaluate_progress(event: &ProgressEvent) -> Vec<BadgeId> {
    let mut earned = Vec::new();
    if event.completed_count >= 1 {
        earned.push(BadgeId::FirstStep);
    }
    if event.completed_count >= BOOKWORM_THRESHOLD {
        earned.push(BadgeId::Bookworm);
    }
    if event.is_course_complete() {
        earned.push(BadgeId::Scholar);
    }
    earned
}

/// Monotonically growing set of unlocked badges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BadgeSet {
    badges: Vec<Badge>,
}

impl BadgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted badges, dropping duplicate IDs.
    pub fn from_badges(badges: impl IntoIterator<Item = Badge>) -> Self {
        let mut set = Self::new();
        for badge in badges {
            if !set.contains(badge.id) {
                set.badges.push(badge);
            }
        }
        set
    }

    pub fn contains(&self, id: BadgeId) -> bool {
        self.badges.iter().any(|b| b.id == id)
    }

    /// Unlock a badge. Returns the badge only if it was newly unlocked.
    pub fn unlock(&mut self, id: BadgeId) -> Option<Badge> {
        if self.contains(id) {
            return None;
        }
        let mut badge = id.badge();
        badge.unlocked_at = Some(Utc::now());
        self.badges.push(badge.clone());
        info!(badge = id.as_str(), "Badge unlocked");
        Some(badge)
    }

    /// Unlock several badges, returning the newly unlocked ones.
    pub fn unlock_all(&mut self, ids: impl IntoIterator<Item = BadgeId>) -> Vec<Badge> {
        ids.into_iter().filter_map(|id| self.unlock(id)).collect()
    }

    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    pub fn len(&self) -> usize {
        self.badges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }
}

/// Apply a course completion to a learning path.
///
/// Nodes linked to the course become completed, and the node after the
/// first linked one moves from locked to unlocked. Returns the ID of the
/// node that was unlocked, if any. Paths without a linked node are left
/// untouched.
pub fn advance_path(path: &mut LearningPath, event: &CourseCompleted) -> Option<String> {
    let linked = path
        .nodes
        .iter()
        .position(|n| n.course_id.as_deref() == Some(event.course_id.as_str()))?;

    for node in path
        .nodes
        .iter_mut()
        .filter(|n| n.course_id.as_deref() == Some(event.course_id.as_str()))
    {
        node.status = NodeStatus::Completed;
    }

    let successor = path.nodes.get_mut(linked + 1)?;
    if successor.status != NodeStatus::Locked {
        return None;
    }
    successor.status = NodeStatus::Unlocked;

    debug!(
        path_id = %path.id,
        node_id = %successor.id,
        course_id = %event.course_id,
        "Unlocked next path node"
    );
    Some(successor.id.clone())
}
