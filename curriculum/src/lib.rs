//! Course and Learning-Path Ingestion for Pathfinder
//!
//! This crate turns generated curriculum text into a navigable model and
//! derives the learner's progress and achievements from it:
//!
//! - **Segmenter**: splits a generated markdown course into modules
//! - **Materializer**: turns a generated JSON roadmap into a learning path
//! - **Progress**: per-course completion sets and percentages
//! - **Achievements**: badge rules and path progression on course completion
//! - **Store**: write-through collections over a key-value persistence port
//!
//! # Data Flow
//!
//! ```text
//! generator output ──▶ segment / materialize ──▶ ContentStore
//!                                                    │
//!          ProgressTracker ◀── module toggles ◀──────┘
//!                 │
//!                 ▼
//!     evaluate_progress ──▶ BadgeSet
//!     CourseCompleted  ──▶ advance_path ──▶ ContentStore
//! ```
//!
//! # Example
//!
//! ```
//! use curriculum::{materialize, segment, DifficultyLevel, NodeStatus};
//!
//! let modules = segment("Welcome\n## Lab 101: Setup\nInstall the toolchain");
//! assert_eq!(modules.len(), 2);
//!
//! let path = materialize(
//!     r#"{"pathTitle":"Systems","steps":[{"title":"BS-101: Rust","description":"Ownership"}]}"#,
//!     DifficultyLevel::Beginner,
//!     "Systems programming",
//! )
//! .unwrap();
//! assert_eq!(path.nodes[0].status, NodeStatus::Unlocked);
//! ```

pub mod achievement;
pub mod forum;
pub mod materializer;
pub mod persistence;
pub mod profile;
pub mod progress;
pub mod segmenter;
pub mod store;
pub mod types;

// Re-export main types
pub use achievement::{
    advance_path, evaluate_progress, Badge, BadgeId, BadgeSet, CourseCompleted, ProgressEvent,
};
pub use forum::{ForumBoard, ForumPost, ForumReply};
pub use materializer::{materialize, MaterializeError};
pub use persistence::{KeyValueStore, MemoryStorage, PersistenceError, SledStorage, StorageKeys};
pub use profile::{BadgeStatus, LearnerProfile};
pub use progress::{completion_percent, ProgressTracker, ProgressUpdate};
pub use segmenter::segment;
pub use store::ContentStore;
pub use types::*;
