//! End-to-end session flows over in-memory and sled storage.

use std::sync::Arc;

use campus::{Campus, CampusConfig, CampusEvent, StorageConfig};
use curriculum::{BadgeId, DifficultyLevel, KeyValueStore, MemoryStorage, NodeStatus, Source};
use pathfinder_agent::{LlmBackend, MockBackend};

const ROADMAP: &str = "```json\n{\"pathTitle\":\"B.S. to Ph.D. in Systems\",\"steps\":[\
    {\"title\":\"BS-101: Intro to Rust\",\"description\":\"Ownership and borrowing\"},\
    {\"title\":\"MS-500: Distributed Systems\",\"description\":\"Raft and Paxos\"},\
    {\"title\":\"JOB-900: Interview Prep\",\"description\":\"System design\"}\
]}\n```";

const COURSE: &str = "Why this matters\n\
## Lab 101: Toolchain\n\
Install rustup\n\
## Lab 102: Ownership\n\
Borrow checker drills\n";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("campus=debug,curriculum=debug")
        .with_test_writer()
        .try_init();
}

fn mock() -> Arc<MockBackend> {
    Arc::new(
        MockBackend::new("mock-gemini")
            .with_scripted(ROADMAP)
            .with_response(COURSE)
            .with_citations(vec![
                Source::new("The Rust Book", "https://doc.rust-lang.org/book/"),
                Source::new("Rust Book (dup)", "https://doc.rust-lang.org/book/"),
            ]),
    )
}

fn open(storage: Arc<dyn KeyValueStore>, backend: Arc<MockBackend>) -> Campus {
    Campus::open(CampusConfig::default(), storage, vec![backend as Arc<dyn LlmBackend>])
}

#[tokio::test]
async fn enroll_study_and_complete_a_node() {
    init_tracing();
    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
    let mut campus = open(storage, mock());
    let mut events = campus.subscribe();

    let path = campus
        .enroll("Systems Engineer", DifficultyLevel::Intermediate)
        .await
        .unwrap();
    assert_eq!(path.topic, "B.S. to Ph.D. in Systems");
    assert_eq!(path.nodes.len(), 3);
    assert!(campus.badges().contains(BadgeId::Pathfinder));

    let course = campus.open_node(&path.nodes[0].id).await.unwrap();
    assert_eq!(course.level, DifficultyLevel::Intermediate);
    assert_eq!(course.modules.len(), 3);
    assert_eq!(course.sources.len(), 1);
    assert!(course.modules[0].is_introduction());

    let module_ids: Vec<String> = course.modules.iter().map(|m| m.id.clone()).collect();
    let mut last = None;
    for id in &module_ids {
        last = Some(campus.toggle_module(&course.id, id).unwrap());
    }
    let last = last.unwrap();
    assert!(last.course_completed);
    assert_eq!(last.percent(), 100);

    let active = campus.active_path().unwrap();
    assert_eq!(active.nodes[0].status, NodeStatus::Completed);
    assert_eq!(active.nodes[1].status, NodeStatus::Unlocked);
    assert_eq!(active.nodes[2].status, NodeStatus::Locked);
    assert_eq!(active.progress(), (1, 3));

    assert!(campus.badges().contains(BadgeId::FirstStep));
    assert!(campus.badges().contains(BadgeId::Scholar));
    assert!(!campus.badges().contains(BadgeId::Bookworm));

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    let unlocked: Vec<BadgeId> = received
        .iter()
        .filter_map(|e| match e {
            CampusEvent::BadgeUnlocked { badge } => Some(badge.id),
            _ => None,
        })
        .collect();
    assert_eq!(
        unlocked,
        vec![BadgeId::Pathfinder, BadgeId::FirstStep, BadgeId::Scholar]
    );
    assert!(received.contains(&CampusEvent::CourseCompleted {
        course_id: course.id.clone()
    }));
    assert!(received.contains(&CampusEvent::PathAdvanced {
        path_id: path.id.clone(),
        node_id: path.nodes[1].id.clone(),
    }));

    let profile = campus.profile();
    assert_eq!(profile.completed_modules, 3);
    assert_eq!(profile.badges_unlocked, 3);
}

#[tokio::test]
async fn untoggle_keeps_badges_and_path_state() {
    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
    let mut campus = open(storage, mock());

    let path = campus.enroll("Compilers", DifficultyLevel::Advanced).await.unwrap();
    let course = campus.study("Compilers", DifficultyLevel::Advanced).await.unwrap();
    assert_eq!(course.modules.len(), 3);
    let first = course.modules[0].id.clone();

    let update = campus.toggle_module(&course.id, &first).unwrap();
    assert!(!update.course_completed);
    let update = campus.toggle_module(&course.id, &first).unwrap();

    assert!(update.completed.is_empty());
    assert_eq!(campus.course_percent(&course.id).unwrap(), 0);
    assert!(campus.badges().contains(BadgeId::FirstStep));
    assert!(!campus.badges().contains(BadgeId::Scholar));
    assert_eq!(campus.badges().len(), 2);
    assert_eq!(campus.active_path().unwrap(), &path);
}

#[tokio::test]
async fn completing_an_unlinked_course_leaves_path_untouched() {
    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
    let mut campus = open(storage, mock());

    let path = campus.enroll("Systems", DifficultyLevel::Beginner).await.unwrap();
    let course = campus.study("Side quest", DifficultyLevel::Beginner).await.unwrap();
    for module in &course.modules {
        campus.toggle_module(&course.id, &module.id).unwrap();
    }

    assert!(campus.badges().contains(BadgeId::Scholar));
    assert_eq!(campus.active_path().unwrap(), &path);
}

#[tokio::test]
async fn session_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = CampusConfig {
        storage: StorageConfig {
            namespace: "reopen".to_string(),
            data_dir: Some(dir.path().join("campus.db")),
        },
        ..Default::default()
    };

    let (path_id, course_id) = {
        let storage = config.storage.open().unwrap();
        let mut campus = Campus::open(config.clone(), storage, vec![mock() as Arc<dyn LlmBackend>]);

        let path = campus.enroll("Systems", DifficultyLevel::Beginner).await.unwrap();
        let course = campus.open_node(&path.nodes[0].id).await.unwrap();
        campus.toggle_module(&course.id, &course.modules[1].id).unwrap();
        campus
            .forum_mut()
            .create_post("Study group", "Anyone on BS-101?", "Dana")
            .unwrap();
        (path.id, course.id)
    };

    let storage = config.storage.open().unwrap();
    let mut campus = Campus::open(config, storage, vec![mock() as Arc<dyn LlmBackend>]);

    assert_eq!(campus.courses().len(), 1);
    assert_eq!(campus.course_percent(&course_id).unwrap(), 33);
    assert!(campus.badges().contains(BadgeId::FirstStep));
    assert_eq!(campus.forum().posts().len(), 3);
    assert_eq!(campus.forum().posts()[0].title, "Study group");

    let path = campus.open_path(&path_id).unwrap();
    assert_eq!(path.nodes[0].course_id.as_deref(), Some(course_id.as_str()));
}

#[tokio::test]
async fn unavailable_backend_fails_without_storing() {
    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
    let backend = Arc::new(MockBackend::default().with_available(false));
    let mut campus = open(storage, backend);

    assert!(campus.study("Rust", DifficultyLevel::Beginner).await.is_err());
    assert!(campus.enroll("Rust", DifficultyLevel::Beginner).await.is_err());
    assert!(campus.courses().is_empty());
    assert!(campus.paths().is_empty());
    assert!(campus.badges().is_empty());
}
