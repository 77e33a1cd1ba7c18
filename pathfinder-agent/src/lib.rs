//! Pathfinder Agent - Curriculum Generation
//!
//! Provides the generation side of Pathfinder:
//! - Trait-based LLM backends (Gemini with search grounding, OpenAI-compatible)
//! - Prompt assembly for courses and career roadmaps
//! - A generator service with backend fallback and timeouts
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         CurriculumGenerator             │
//! │  (course markdown / roadmap JSON)       │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐
//! │ LlmBackend  │       │ Prompt      │
//! │ (Gemini/    │       │ Builder     │
//! │  OpenAI)    │       │             │
//! └─────────────┘       └─────────────┘
//! ```

pub mod backend;
pub mod prompt;
pub mod request;
pub mod service;

// Re-export main types for convenience
pub use backend::traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};
pub use backend::{GeminiBackend, MockBackend, OpenAiBackend};
pub use prompt::PromptBuilder;
pub use request::{GenerationKind, GenerationRequest};
pub use service::{CurriculumGenerator, GeneratedCourse, GenerationError, GeneratorConfig};
