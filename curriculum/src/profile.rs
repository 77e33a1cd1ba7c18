//! Learner profile summary.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::achievement::{Badge, BadgeId, BadgeSet};

/// One catalog badge and whether the learner holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct BadgeStatus {
    pub badge: Badge,
    pub unlocked: bool,
}

/// Aggregated achievements for the profile screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct LearnerProfile {
    /// Modules completed across every course
    pub completed_modules: usize,
    pub badges_unlocked: usize,
    /// Full catalog in display order
    pub catalog: Vec<BadgeStatus>,
}

impl LearnerProfile {
    pub fn build(completed_modules: usize, unlocked: &BadgeSet) -> Self {
        let catalog = BadgeId::catalog()
            .into_iter()
            .map(|id| {
                let held = unlocked.badges().iter().find(|b| b.id == id);
                BadgeStatus {
                    badge: held.cloned().unwrap_or_else(|| id.badge()),
                    unlocked: held.is_some(),
                }
            })
            .collect();

        Self {
            completed_modules,
            badges_unlocked: unlocked.len(),
            catalog,
        }
    }
}
