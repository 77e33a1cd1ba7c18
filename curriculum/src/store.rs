//! Persisted collections of generated courses, learning paths and badges.

use std::sync::Arc;
use tracing::{debug, info};

use crate::achievement::{Badge, BadgeId, BadgeSet};
use crate::persistence::{load_json, save_json, KeyValueStore, StorageKeys};
use crate::types::{Course, LearningPath};

/// Write-through store for everything the learner has generated.
///
/// Collections are listed most recent first. Every mutation is written to
/// the persistence port immediately after the in-memory update.
pub struct ContentStore {
    storage: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
    courses: Vec<Course>,
    paths: Vec<LearningPath>,
    badges: BadgeSet,
}

impl ContentStore {
    /// Rebuild the store from persistence. Unreadable collections start empty.
    pub fn open(storage: Arc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        let courses: Vec<Course> = load_json(storage.as_ref(), &keys.courses()).unwrap_or_default();
        let paths: Vec<LearningPath> = load_json(storage.as_ref(), &keys.paths()).unwrap_or_default();
        let badges: Vec<Badge> = load_json(storage.as_ref(), &keys.badges()).unwrap_or_default();

        info!(
            courses = courses.len(),
            paths = paths.len(),
            badges = badges.len(),
            "Opened content store"
        );

        Self {
            storage,
            keys,
            courses,
            paths,
            badges: BadgeSet::from_badges(badges),
        }
    }

    /// Storage this store writes through to.
    pub fn storage(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.storage)
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Insert a course unless one with the same ID exists.
    ///
    /// Returns whether the course was inserted.
    pub fn insert_course(&mut self, course: Course) -> bool {
        if self.course(&course.id).is_some() {
            debug!(course_id = %course.id, "Course already stored, keeping first copy");
            return false;
        }

        debug!(course_id = %course.id, topic = %course.topic, "Storing course");
        self.courses.insert(0, course);
        save_json(self.storage.as_ref(), &self.keys.courses(), &self.courses);
        true
    }

    /// Insert or replace a path, moving it to the front of the listing.
    pub fn upsert_path(&mut self, path: LearningPath) {
        self.paths.retain(|p| p.id != path.id);
        debug!(path_id = %path.id, topic = %path.topic, "Storing learning path");
        self.paths.insert(0, path);
        save_json(self.storage.as_ref(), &self.keys.paths(), &self.paths);
    }

    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == course_id)
    }

    pub fn path(&self, path_id: &str) -> Option<&LearningPath> {
        self.paths.iter().find(|p| p.id == path_id)
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn paths(&self) -> &[LearningPath] {
        &self.paths
    }

    pub fn badges(&self) -> &BadgeSet {
        &self.badges
    }

    /// Unlock badges, persisting only when something changed.
    pub fn unlock_badges(&mut self, ids: impl IntoIterator<Item = BadgeId>) -> Vec<Badge> {
        let unlocked = self.badges.unlock_all(ids);
        if !unlocked.is_empty() {
            save_json(self.storage.as_ref(), &self.keys.badges(), &self.badges);
        }
        unlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use crate::types::DifficultyLevel;
    use crate::materializer::materialize;

    fn open(storage: &Arc<MemoryStorage>) -> ContentStore {
        ContentStore::open(storage.clone(), StorageKeys::default())
    }

    fn course(id: &str, markdown: &str) -> Course {
        let mut course = Course::from_generation("Rust", DifficultyLevel::Beginner, markdown, vec![]);
        course.id = id.to_string();
        course
    }

    #[test]
    fn test_course_insert_first_write_wins() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = open(&storage);

        assert!(store.insert_course(course("c1", "first")));
        assert!(!store.insert_course(course("c1", "second")));

        assert_eq!(store.courses().len(), 1);
        assert_eq!(store.course("c1").unwrap().raw_content, "first");
    }

    #[test]
    fn test_courses_listed_newest_first() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = open(&storage);

        store.insert_course(course("c1", "a"));
        store.insert_course(course("c2", "b"));

        let ids: Vec<_> = store.courses().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);
    }

    #[test]
    fn test_path_upsert_replaces_and_promotes() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = open(&storage);

        let first = materialize(r#"{"steps":[{"title":"BS-101"}]}"#, DifficultyLevel::Beginner, "A").unwrap();
        let second = materialize("{}", DifficultyLevel::Beginner, "B").unwrap();
        store.upsert_path(first.clone());
        store.upsert_path(second.clone());

        let mut updated = first.clone();
        updated.link_course(&first.nodes[0].id, "c1");
        store.upsert_path(updated);

        assert_eq!(store.paths().len(), 2);
        assert_eq!(store.paths()[0].id, first.id);
        assert_eq!(store.paths()[1].id, second.id);
        assert_eq!(store.paths()[0].nodes[0].course_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_write_through_and_reload() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let mut store = open(&storage);
            store.insert_course(course("c1", "## Lab 1\nbody"));
            store.upsert_path(materialize("{}", DifficultyLevel::Advanced, "Rust").unwrap());
            store.unlock_badges([BadgeId::Pathfinder]);
        }

        let store = open(&storage);
        assert_eq!(store.courses().len(), 1);
        assert_eq!(store.course("c1").unwrap().modules.len(), 1);
        assert_eq!(store.paths().len(), 1);
        assert!(store.badges().contains(BadgeId::Pathfinder));
    }

    #[test]
    fn test_malformed_collections_degrade_to_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set("pathfinder_courses", "not json").unwrap();
        storage.set("pathfinder_paths", "{\"oops\": true}").unwrap();
        storage.set("pathfinder_badges", "[{\"id\": \"unknown_badge\"}]").unwrap();

        let store = open(&storage);
        assert!(store.courses().is_empty());
        assert!(store.paths().is_empty());
        assert!(store.badges().is_empty());
    }

    #[test]
    fn test_unlock_badges_persists_once() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = open(&storage);

        assert_eq!(store.unlock_badges([BadgeId::FirstStep]).len(), 1);
        assert!(store.unlock_badges([BadgeId::FirstStep]).is_empty());
        assert_eq!(store.badges().len(), 1);
    }
}
