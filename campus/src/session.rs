//! Campus - the learner's session.
//!
//! Ties generation, the content store, progress tracking and achievements
//! together. Operations run on a single writer (`&mut self`); the only
//! suspension point is the generation call. A generation that finishes
//! after the learner moved on still applies to whatever path is active
//! at that moment.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use curriculum::{
    advance_path, evaluate_progress, materialize, Badge, BadgeId, BadgeSet, ContentStore, Course,
    CourseCompleted, DifficultyLevel, ForumBoard, KeyValueStore, LearnerProfile, LearningPath,
    ProgressEvent, ProgressTracker, ProgressUpdate,
};
use pathfinder_agent::{CurriculumGenerator, LlmBackend, PromptBuilder};

use crate::config::CampusConfig;
use crate::types::{CampusError, CampusEvent, Result};

/// A learner's campus session.
pub struct Campus {
    config: CampusConfig,
    generator: CurriculumGenerator,
    store: ContentStore,
    tracker: ProgressTracker,
    forum: ForumBoard,
    active_path: Option<String>,
    subscribers: Vec<mpsc::UnboundedSender<CampusEvent>>,
}

impl Campus {
    /// Open a session over explicit storage and backends.
    pub fn open(
        config: CampusConfig,
        storage: Arc<dyn KeyValueStore>,
        backends: Vec<Arc<dyn LlmBackend>>,
    ) -> Self {
        let keys = config.storage.keys();
        let generator =
            CurriculumGenerator::new(backends).with_config(config.generation.generator_config());
        let store = ContentStore::open(Arc::clone(&storage), keys.clone());
        let tracker = ProgressTracker::new(Arc::clone(&storage), keys.clone());
        let forum = ForumBoard::open(storage, &keys);

        info!(
            namespace = %config.storage.namespace,
            courses = store.courses().len(),
            paths = store.paths().len(),
            "Campus opened"
        );

        Self {
            config,
            generator,
            store,
            tracker,
            forum,
            active_path: None,
            subscribers: Vec::new(),
        }
    }

    /// Open a session with the storage and backend named in `config`.
    pub fn from_config(config: CampusConfig) -> Result<Self> {
        let storage = config.storage.open()?;
        let backend = config.generation.build_backend()?;
        Ok(Self::open(config, storage, vec![backend]))
    }

    pub fn config(&self) -> &CampusConfig {
        &self.config
    }

    /// Receive session events. Dropped receivers are pruned on the next send.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<CampusEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Generate a learning path toward `goal` and make it active.
    ///
    /// Nothing is stored when generation or materialization fails.
    pub async fn enroll(&mut self, goal: &str, level: DifficultyLevel) -> Result<LearningPath> {
        let raw = self.generator.generate_path_text(goal, level).await?;
        let path = materialize(&raw, level, goal)?;

        info!(
            path_id = %path.id,
            topic = %path.topic,
            nodes = path.nodes.len(),
            "Enrolled in learning path"
        );

        self.store.upsert_path(path.clone());
        self.active_path = Some(path.id.clone());

        let unlocked = self.store.unlock_badges([BadgeId::Pathfinder]);
        self.notify_badges(unlocked);

        Ok(path)
    }

    /// Make a stored path the active one.
    pub fn open_path(&mut self, path_id: &str) -> Result<&LearningPath> {
        let path = self
            .store
            .path(path_id)
            .ok_or_else(|| CampusError::PathNotFound(path_id.to_string()))?;
        debug!(path_id = %path_id, "Opened learning path");
        self.active_path = Some(path_id.to_string());
        Ok(path)
    }

    pub fn active_path(&self) -> Option<&LearningPath> {
        self.active_path.as_deref().and_then(|id| self.store.path(id))
    }

    pub fn open_course(&self, course_id: &str) -> Result<&Course> {
        self.store
            .course(course_id)
            .ok_or_else(|| CampusError::CourseNotFound(course_id.to_string()))
    }

    /// Open the course behind a node of the active path.
    ///
    /// A course already linked and stored is returned as is. Otherwise one
    /// is generated, stored and linked to the node. Locked nodes are refused.
    pub async fn open_node(&mut self, node_id: &str) -> Result<Course> {
        let path = self.active_path().ok_or(CampusError::NoActivePath)?;
        let node = path
            .node(node_id)
            .ok_or_else(|| CampusError::NodeNotFound(node_id.to_string()))?;

        if node.is_locked() {
            return Err(CampusError::NodeLocked(node_id.to_string()));
        }

        if let Some(course) = node.course_id.as_deref().and_then(|id| self.store.course(id)) {
            debug!(node_id = %node_id, course_id = %course.id, "Node course already generated");
            return Ok(course.clone());
        }

        let path_id = path.id.clone();
        let level = path.level;
        let topic = PromptBuilder::node_course_topic(&node.title, &path.topic);

        let generated = self.generator.generate_course_text(&topic, level).await?;
        let course = Course::from_generation(topic, level, generated.markdown, generated.sources);

        // The active path may have changed while generating.
        let mut path = self
            .active_path()
            .cloned()
            .ok_or(CampusError::NoActivePath)?;
        if path.id != path_id {
            warn!(
                requested_path = %path_id,
                active_path = %path.id,
                "Active path changed during generation"
            );
        }
        if path.link_course(node_id, &course.id) {
            self.store.upsert_path(path);
        } else {
            warn!(node_id = %node_id, path_id = %path.id, "Node missing from active path, course left unlinked");
        }

        info!(node_id = %node_id, course_id = %course.id, modules = course.total_modules(), "Generated node course");
        self.store.insert_course(course.clone());
        Ok(course)
    }

    /// Level used when the caller does not pick one.
    pub fn default_level(&self) -> DifficultyLevel {
        self.config.general.default_level
    }

    /// [`Campus::enroll`] at the configured default level.
    pub async fn enroll_default(&mut self, goal: &str) -> Result<LearningPath> {
        let level = self.default_level();
        self.enroll(goal, level).await
    }

    /// [`Campus::study`] at the configured default level.
    pub async fn study_default(&mut self, topic: &str) -> Result<Course> {
        let level = self.default_level();
        self.study(topic, level).await
    }

    /// Generate and store a standalone course.
    pub async fn study(&mut self, topic: &str, level: DifficultyLevel) -> Result<Course> {
        let generated = self.generator.generate_course_text(topic, level).await?;
        let course = Course::from_generation(topic, level, generated.markdown, generated.sources);

        info!(course_id = %course.id, modules = course.total_modules(), "Generated course");
        self.store.insert_course(course.clone());
        Ok(course)
    }

    /// Flip a module's completion, then award badges and advance the active path.
    pub fn toggle_module(&mut self, course_id: &str, module_id: &str) -> Result<ProgressUpdate> {
        let course = self.open_course(course_id)?;
        if course.module(module_id).is_none() {
            return Err(CampusError::ModuleNotFound {
                course_id: course_id.to_string(),
                module_id: module_id.to_string(),
            });
        }
        let total_modules = course.total_modules();

        let update = self.tracker.toggle(course_id, module_id, total_modules);
        let event = ProgressEvent::from(&update);

        let unlocked = self.store.unlock_badges(evaluate_progress(&event));
        self.notify_badges(unlocked);

        if let Some(completed) = event.course_completed() {
            info!(course_id = %course_id, "Course completed");
            self.emit(CampusEvent::CourseCompleted {
                course_id: completed.course_id.clone(),
            });
            self.complete_in_active_path(&completed);
        }

        Ok(update)
    }

    /// Completion percentage of a stored course.
    pub fn course_percent(&self, course_id: &str) -> Result<u8> {
        let course = self.open_course(course_id)?;
        Ok(self.tracker.percent(course_id, course.total_modules()))
    }

    pub fn profile(&self) -> LearnerProfile {
        LearnerProfile::build(self.tracker.total_completed(), self.store.badges())
    }

    pub fn courses(&self) -> &[Course] {
        self.store.courses()
    }

    pub fn paths(&self) -> &[LearningPath] {
        self.store.paths()
    }

    pub fn badges(&self) -> &BadgeSet {
        self.store.badges()
    }

    pub fn forum(&self) -> &ForumBoard {
        &self.forum
    }

    pub fn forum_mut(&mut self) -> &mut ForumBoard {
        &mut self.forum
    }

    fn complete_in_active_path(&mut self, completed: &CourseCompleted) {
        let Some(mut path) = self.active_path().cloned() else {
            return;
        };
        let linked = path
            .nodes
            .iter()
            .any(|n| n.course_id.as_deref() == Some(completed.course_id.as_str()));
        if !linked {
            return;
        }

        let advanced = advance_path(&mut path, completed);
        let path_id = path.id.clone();
        self.store.upsert_path(path);

        if let Some(node_id) = advanced {
            info!(path_id = %path_id, node_id = %node_id, "Path advanced");
            self.emit(CampusEvent::PathAdvanced { path_id, node_id });
        }
    }

    fn notify_badges(&mut self, badges: Vec<Badge>) {
        if !self.config.general.notifications {
            return;
        }
        for badge in badges {
            self.emit(CampusEvent::BadgeUnlocked { badge });
        }
    }

    fn emit(&mut self, event: CampusEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curriculum::{MemoryStorage, NodeStatus};
    use pathfinder_agent::MockBackend;

    const ROADMAP: &str = r#"{"pathTitle":"B.S. in Systems","steps":[
        {"title":"BS-101: Rust","description":"Ownership"},
        {"title":"MS-500: Distributed","description":"Consensus"}
    ]}"#;

    fn campus(backend: MockBackend) -> Campus {
        Campus::open(
            CampusConfig::default(),
            Arc::new(MemoryStorage::new()),
            vec![Arc::new(backend)],
        )
    }

    #[tokio::test]
    async fn test_locked_node_is_refused() {
        let mut campus = campus(MockBackend::default().with_response(ROADMAP));
        let path = campus.enroll("Systems", DifficultyLevel::Beginner).await.unwrap();

        let result = campus.open_node(&path.nodes[1].id).await;
        assert!(matches!(result, Err(CampusError::NodeLocked(_))));
    }

    #[tokio::test]
    async fn test_failed_enroll_stores_nothing() {
        let mut campus = campus(MockBackend::default().with_response("not json"));

        let result = campus.enroll("Systems", DifficultyLevel::Beginner).await;

        assert!(matches!(result, Err(CampusError::Materialize(_))));
        assert!(campus.paths().is_empty());
        assert!(campus.active_path().is_none());
        assert!(!campus.badges().contains(BadgeId::Pathfinder));
    }

    #[tokio::test]
    async fn test_open_node_reuses_linked_course() {
        let backend = Arc::new(
            MockBackend::default()
                .with_scripted(ROADMAP)
                .with_response("## Lab 101: Setup\nInstall"),
        );
        let mut campus = Campus::open(
            CampusConfig::default(),
            Arc::new(MemoryStorage::new()),
            vec![backend.clone() as Arc<dyn LlmBackend>],
        );
        let path = campus.enroll("Systems", DifficultyLevel::Beginner).await.unwrap();

        let first = campus.open_node(&path.nodes[0].id).await.unwrap();
        let second = campus.open_node(&path.nodes[0].id).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.topic, "BS-101: Rust (Part of B.S. in Systems degree)");
        assert_eq!(backend.call_count(), 2);
        assert_eq!(
            campus.active_path().unwrap().nodes[0].course_id.as_deref(),
            Some(first.id.as_str())
        );
        assert_eq!(campus.active_path().unwrap().nodes[1].status, NodeStatus::Locked);
    }

    #[tokio::test]
    async fn test_unknown_module_is_rejected() {
        let mut campus = campus(MockBackend::default().with_response("## Lab 101: Setup\nInstall"));
        let course = campus.study("Rust", DifficultyLevel::Beginner).await.unwrap();

        let result = campus.toggle_module(&course.id, "missing");
        assert!(matches!(result, Err(CampusError::ModuleNotFound { .. })));

        let result = campus.toggle_module("course-missing", "intro");
        assert!(matches!(result, Err(CampusError::CourseNotFound(_))));
    }

    #[test]
    fn test_node_operations_need_active_path() {
        let mut campus = campus(MockBackend::default());
        let result = tokio_test::block_on(campus.open_node("node-1-0"));
        assert!(matches!(result, Err(CampusError::NoActivePath)));
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_pruned() {
        let mut campus = campus(MockBackend::default().with_response(ROADMAP));
        drop(campus.subscribe());
        let mut live = campus.subscribe();

        campus.enroll("Systems", DifficultyLevel::Beginner).await.unwrap();

        assert_eq!(campus.subscribers.len(), 1);
        assert!(matches!(
            live.try_recv(),
            Ok(CampusEvent::BadgeUnlocked { badge }) if badge.id == BadgeId::Pathfinder
        ));
    }

    #[tokio::test]
    async fn test_default_level_comes_from_config() {
        let mut config = CampusConfig::default();
        config.general.default_level = DifficultyLevel::Advanced;
        let backend = MockBackend::default()
            .with_scripted(ROADMAP)
            .with_response("## Lab 1: Parsing\nRecursive descent");
        let mut campus = Campus::open(config, Arc::new(MemoryStorage::new()), vec![Arc::new(backend)]);

        assert_eq!(campus.default_level(), DifficultyLevel::Advanced);
        let path = campus.enroll_default("Compilers").await.unwrap();
        assert_eq!(path.level, DifficultyLevel::Advanced);
        let course = campus.study_default("Parsers").await.unwrap();
        assert_eq!(course.level, DifficultyLevel::Advanced);
    }
}
