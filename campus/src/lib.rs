//! Campus - Pathfinder Session Orchestration
//!
//! Drives a learner's session end to end:
//!
//! - **Enrollment**: generate a career roadmap and make it the active path
//! - **Study**: generate courses for path nodes or standalone topics
//! - **Progress**: module toggles feed badges and path progression
//! - **Events**: badge, completion and progression notifications
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Campus                             │
//! │                                                             │
//! │  ┌───────────┐  ┌──────────────┐  ┌─────────────────┐       │
//! │  │ Generator │──│ ContentStore │──│ ProgressTracker │       │
//! │  └───────────┘  └──────────────┘  └─────────────────┘       │
//! │                         │                  │                │
//! │                 ┌───────▼──────────────────▼──┐             │
//! │                 │ Achievements / advance_path │──▶ events   │
//! │                 └─────────────────────────────┘             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod session;
pub mod types;

// Re-export main types
pub use config::{CampusConfig, GeneralConfig, GenerationConfig, Provider, StorageConfig};
pub use session::Campus;
pub use types::*;
