//! Mock LLM backend for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use curriculum::Source;

use super::traits::*;

/// Mock backend for testing.
///
/// Replays scripted responses in order, then falls back to a fixed
/// default. Optional latency lets callers exercise timeouts.
pub struct MockBackend {
    model_id: String,
    available: AtomicBool,
    capabilities: ModelCapabilities,
    default_response: String,
    scripted: Mutex<VecDeque<String>>,
    citations: Vec<Source>,
    latency: Option<Duration>,
    call_count: AtomicU32,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            available: AtomicBool::new(true),
            capabilities: ModelCapabilities::default(),
            default_response: "Mock response".to_string(),
            scripted: Mutex::new(VecDeque::new()),
            citations: Vec::new(),
            latency: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Set the response returned once the script is exhausted.
    pub fn with_response(mut self, content: impl Into<String>) -> Self {
        self.default_response = content.into();
        self
    }

    /// Queue a response to be returned before the default one.
    pub fn with_scripted(self, content: impl Into<String>) -> Self {
        if let Ok(mut queue) = self.scripted.lock() {
            queue.push_back(content.into());
        }
        self
    }

    /// Attach grounding citations to every response.
    pub fn with_citations(mut self, citations: Vec<Source>) -> Self {
        self.citations = citations;
        self
    }

    /// Delay every completion.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Set availability.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Set capabilities.
    pub fn with_capabilities(mut self, capabilities: ModelCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Get the number of times complete was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The most recent request seen by the backend.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }

    fn next_response(&self) -> String {
        self.scripted
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_else(|| self.default_response.clone())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("mock-model")
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    fn id(&self) -> &str {
        &self.model_id
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if !self.available.load(Ordering::SeqCst) {
            return Err(LlmError::Unavailable("Mock backend disabled".to_string()));
        }

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        // Rough token estimate
        let prompt_tokens = request.user_text().len() as u32 / 4;
        let content = self.next_response();
        let completion_tokens = content.len() as u32 / 4;

        let citations = if request.grounded_search {
            self.citations.clone()
        } else {
            Vec::new()
        };

        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request);
        }

        Ok(CompletionResponse {
            content,
            finish_reason: FinishReason::Stop,
            usage: Usage {
                prompt_tokens,
                completion_tokens,
            },
            citations,
        })
    }

    fn capabilities(&self) -> &ModelCapabilities {
        &self.capabilities
    }
}
