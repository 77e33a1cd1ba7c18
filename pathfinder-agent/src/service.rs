//! CurriculumGenerator - main entry point for content generation.
//!
//! Turns a topic or goal into raw generated text: a markdown course with
//! its grounding sources, or a JSON roadmap. Segmenting and materializing
//! that text is the caller's job.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use curriculum::{dedupe_sources, DifficultyLevel, Source};

use crate::backend::traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};
use crate::prompt::PromptBuilder;
use crate::request::GenerationRequest;

/// Error types for generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Provider answered but produced nothing usable
    #[error("Generation failed: {0}")]
    GenerationFailure(String),

    /// No backend available
    #[error("No LLM backend available")]
    NoBackendAvailable,

    /// Provider did not answer in time
    #[error("Generation timed out after {0}ms")]
    Timeout(u64),

    /// Backend error
    #[error("Backend error: {0}")]
    Backend(#[from] LlmError),
}

/// Configuration for the CurriculumGenerator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Timeout for one generation call (ms)
    pub timeout_ms: u64,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Ask providers to ground answers with web search
    pub grounded_search: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 120_000,
            temperature: None,
            max_tokens: None,
            grounded_search: true,
        }
    }
}

/// Raw output of a course generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedCourse {
    /// Markdown document, not yet segmented
    pub markdown: String,
    /// Deduplicated grounding sources
    pub sources: Vec<Source>,
}

/// Main entry point for curriculum generation.
///
/// Holds an ordered list of backends and uses the first available one.
pub struct CurriculumGenerator {
    config: GeneratorConfig,
    backends: Vec<Arc<dyn LlmBackend>>,
}

impl CurriculumGenerator {
    /// Create a new generator with the given backends.
    pub fn new(backends: Vec<Arc<dyn LlmBackend>>) -> Self {
        Self {
            config: GeneratorConfig::default(),
            backends,
        }
    }

    /// Create with configuration.
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a markdown course on `topic`.
    pub async fn generate_course_text(
        &self,
        topic: &str,
        level: DifficultyLevel,
    ) -> Result<GeneratedCourse, GenerationError> {
        let request = GenerationRequest::course(topic, level);
        let prompt = PromptBuilder::course_prompt(topic, level);

        let response = self.run(&request, self.completion(prompt)).await?;

        Ok(GeneratedCourse {
            markdown: response.content,
            sources: dedupe_sources(response.citations),
        })
    }

    /// Generate the raw JSON roadmap toward `goal`.
    pub async fn generate_path_text(
        &self,
        goal: &str,
        level: DifficultyLevel,
    ) -> Result<String, GenerationError> {
        let request = GenerationRequest::path(goal, level);
        let prompt = PromptBuilder::path_prompt(goal, level);

        // No JSON mode: providers refuse it alongside search grounding.
        let response = self.run(&request, self.completion(prompt)).await?;
        Ok(response.content)
    }

    fn completion(&self, prompt: String) -> CompletionRequest {
        let mut request = CompletionRequest::user(prompt)
            .with_system(PromptBuilder::system_prompt())
            .with_grounded_search(self.config.grounded_search);
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        completion: CompletionRequest,
    ) -> Result<CompletionResponse, GenerationError> {
        let backend = self.select_backend().await?;

        info!(
            request_id = %request.request_id,
            kind = request.kind.as_str(),
            topic = %request.topic,
            level = %request.level,
            backend = backend.id(),
            "Starting generation"
        );

        let timeout = Duration::from_millis(self.config.timeout_ms);
        let response = match tokio::time::timeout(timeout, backend.complete(completion)).await {
            Ok(result) => result.map_err(|e| {
                warn!(request_id = %request.request_id, error = %e, "Generation failed");
                e
            })?,
            Err(_) => {
                warn!(
                    request_id = %request.request_id,
                    timeout_ms = self.config.timeout_ms,
                    "Generation timed out"
                );
                return Err(GenerationError::Timeout(self.config.timeout_ms));
            }
        };

        if response.content.trim().is_empty() {
            return Err(GenerationError::GenerationFailure(format!(
                "empty {} response from {}",
                request.kind.as_str(),
                backend.id()
            )));
        }

        debug!(
            request_id = %request.request_id,
            elapsed_ms = request.elapsed_ms(),
            tokens = response.usage.total(),
            citations = response.citations.len(),
            "Generation complete"
        );

        Ok(response)
    }

    /// Select the first available backend.
    async fn select_backend(&self) -> Result<Arc<dyn LlmBackend>, GenerationError> {
        for backend in &self.backends {
            if backend.is_available().await {
                return Ok(Arc::clone(backend));
            }
            debug!(backend = backend.id(), "Backend unavailable, trying next");
        }
        Err(GenerationError::NoBackendAvailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;

    fn generator(backend: MockBackend) -> CurriculumGenerator {
        CurriculumGenerator::new(vec![Arc::new(backend)])
    }

    #[tokio::test]
    async fn test_course_text_carries_deduped_sources() {
        let backend = MockBackend::default()
            .with_response("Intro\n## Lab 101: Setup\nsteps")
            .with_citations(vec![
                Source::new("A", "https://a.dev"),
                Source::new("A mirror", "https://a.dev"),
                Source::new("B", "https://b.dev"),
            ]);

        let course = generator(backend)
            .generate_course_text("Rust", DifficultyLevel::Beginner)
            .await
            .unwrap();

        assert!(course.markdown.contains("## Lab 101"));
        assert_eq!(course.sources.len(), 2);
        assert_eq!(course.sources[0].title, "A");
    }

    #[tokio::test]
    async fn test_path_text_passes_through() {
        let raw = r#"{"pathTitle":"Data","steps":[]}"#;
        let text = generator(MockBackend::default().with_response(raw))
            .generate_path_text("Data Engineer", DifficultyLevel::Advanced)
            .await
            .unwrap();

        assert_eq!(text, raw);
    }

    #[tokio::test]
    async fn test_empty_response_is_failure() {
        let result = generator(MockBackend::default().with_response("   "))
            .generate_course_text("Rust", DifficultyLevel::Beginner)
            .await;

        assert!(matches!(result, Err(GenerationError::GenerationFailure(_))));
    }

    #[tokio::test]
    async fn test_skips_unavailable_backend() {
        let down = Arc::new(MockBackend::new("down").with_available(false));
        let up = Arc::new(MockBackend::new("up").with_response("## Lab"));
        let generator = CurriculumGenerator::new(vec![
            down.clone() as Arc<dyn LlmBackend>,
            up.clone() as Arc<dyn LlmBackend>,
        ]);

        generator
            .generate_course_text("Rust", DifficultyLevel::Beginner)
            .await
            .unwrap();

        assert_eq!(down.call_count(), 0);
        assert_eq!(up.call_count(), 1);
    }

    #[tokio::test]
    async fn test_no_backend_available() {
        let result = generator(MockBackend::default().with_available(false))
            .generate_path_text("x", DifficultyLevel::Beginner)
            .await;

        assert!(matches!(result, Err(GenerationError::NoBackendAvailable)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let backend = MockBackend::default().with_latency(Duration::from_millis(200));
        let generator = generator(backend).with_config(GeneratorConfig {
            timeout_ms: 10,
            ..Default::default()
        });

        let result = generator.generate_course_text("Rust", DifficultyLevel::Beginner).await;

        assert!(matches!(result, Err(GenerationError::Timeout(10))));
    }

    #[tokio::test]
    async fn test_request_settings_reach_backend() {
        let backend = Arc::new(MockBackend::default().with_response("## Lab"));
        let generator = CurriculumGenerator::new(vec![backend.clone() as Arc<dyn LlmBackend>]).with_config(GeneratorConfig {
            temperature: Some(0.4),
            max_tokens: Some(2048),
            grounded_search: false,
            ..Default::default()
        });

        generator
            .generate_course_text("Compilers", DifficultyLevel::Advanced)
            .await
            .unwrap();

        let seen = backend.last_request().unwrap();
        assert_eq!(seen.temperature, Some(0.4));
        assert_eq!(seen.max_tokens, Some(2048));
        assert!(!seen.grounded_search);
        assert!(seen.system_prompt.is_some());
        assert!(seen.user_text().contains("Compilers"));
    }
}
