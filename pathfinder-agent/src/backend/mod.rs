//! LLM Backend abstraction layer.
//!
//! Provides a trait-based interface over the inference providers that
//! write courses and roadmaps:
//! - Google Gemini with search grounding
//! - OpenAI-compatible (OpenAI, vLLM, Ollama, etc.)
//! - Mock backend for testing

pub mod gemini;
pub mod mock;
pub mod openai;
pub mod traits;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;
pub use openai::OpenAiBackend;
pub use traits::{
    CompletionRequest, CompletionResponse, FinishReason, LlmBackend, LlmError, Message,
    MessageRole, ModelCapabilities, ResponseFormatType, Usage,
};
