//! Configuration for a campus session.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use curriculum::persistence::DEFAULT_NAMESPACE;
use curriculum::{DifficultyLevel, KeyValueStore, MemoryStorage, SledStorage, StorageKeys};
use pathfinder_agent::backend::gemini::{GEMINI_BASE_URL, GEMINI_DEFAULT_MODEL};
use pathfinder_agent::{GeminiBackend, GeneratorConfig, LlmBackend, OpenAiBackend};

use crate::types::{CampusError, Result};

/// Configuration for a Pathfinder campus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CampusConfig {
    /// Generation provider settings
    pub generation: GenerationConfig,
    /// Persistence settings
    pub storage: StorageConfig,
    /// General settings
    pub general: GeneralConfig,
}

impl CampusConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Which inference provider writes the curriculum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    /// Any OpenAI-compatible chat completions server
    OpenAi,
}

/// Generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub provider: Provider,
    pub model: String,
    /// Override the provider's default endpoint
    pub base_url: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Ground answers with web search where the provider supports it
    pub grounded_search: bool,
    /// Timeout for one generation call (ms)
    pub timeout_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Gemini,
            model: GEMINI_DEFAULT_MODEL.to_string(),
            base_url: None,
            api_key_env: "API_KEY".to_string(),
            temperature: None,
            max_tokens: None,
            grounded_search: true,
            timeout_ms: 120_000,
        }
    }
}

impl GenerationConfig {
    /// Settings handed to the curriculum generator.
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            timeout_ms: self.timeout_ms,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            grounded_search: self.grounded_search,
        }
    }

    /// Build the configured backend, reading the API key from the environment.
    pub fn build_backend(&self) -> Result<Arc<dyn LlmBackend>> {
        let api_key = std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty());

        let backend: Arc<dyn LlmBackend> = match self.provider {
            Provider::Gemini => {
                let api_key = api_key.ok_or_else(|| {
                    CampusError::Config(format!("{} is not set", self.api_key_env))
                })?;
                let base_url = self.base_url.as_deref().unwrap_or(GEMINI_BASE_URL);
                Arc::new(GeminiBackend::new(base_url, &self.model, api_key)?)
            }
            Provider::OpenAi => {
                let base_url = self
                    .base_url
                    .as_deref()
                    .unwrap_or("https://api.openai.com/v1");
                Arc::new(OpenAiBackend::new(base_url, &self.model, api_key)?)
            }
        };
        Ok(backend)
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Prefix of the collection keys
    pub namespace: String,
    /// Sled database directory; in-memory when unset
    pub data_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            data_dir: None,
        }
    }
}

impl StorageConfig {
    pub fn keys(&self) -> StorageKeys {
        StorageKeys::new(&self.namespace)
    }

    /// Open the configured key-value store.
    pub fn open(&self) -> Result<Arc<dyn KeyValueStore>> {
        match &self.data_dir {
            Some(dir) => Ok(Arc::new(SledStorage::open(dir)?)),
            None => Ok(Arc::new(MemoryStorage::new())),
        }
    }
}

/// General configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Level preselected for new requests
    pub default_level: DifficultyLevel,
    /// Emit badge notifications to subscribers
    pub notifications: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_level: DifficultyLevel::Beginner,
            notifications: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CampusConfig::default();
        assert_eq!(config.generation.provider, Provider::Gemini);
        assert_eq!(config.generation.model, "gemini-2.5-flash");
        assert!(config.generation.grounded_search);
        assert_eq!(config.storage.namespace, "pathfinder");
        assert!(config.general.notifications);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = CampusConfig::default();
        config.storage.namespace = "campus-test".to_string();
        config.general.default_level = DifficultyLevel::Advanced;

        let yaml = config.to_yaml().unwrap();
        let parsed = CampusConfig::from_yaml(&yaml).unwrap();

        assert_eq!(parsed.storage.namespace, "campus-test");
        assert_eq!(parsed.general.default_level, DifficultyLevel::Advanced);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "generation:\n  provider: openai\n  model: llama3.2\n  base_url: http://localhost:11434/v1\n";
        let config = CampusConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.generation.provider, Provider::OpenAi);
        assert_eq!(config.generation.timeout_ms, 120_000);
        assert_eq!(config.storage.keys().courses(), "pathfinder_courses");
    }

    #[test]
    fn test_openai_backend_without_key() {
        let config = GenerationConfig {
            provider: Provider::OpenAi,
            model: "llama3.2".to_string(),
            base_url: Some("http://localhost:11434/v1".to_string()),
            api_key_env: "PATHFINDER_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };

        let backend = config.build_backend().unwrap();
        assert_eq!(backend.id(), "llama3.2");
    }

    #[test]
    fn test_gemini_requires_key() {
        let config = GenerationConfig {
            api_key_env: "PATHFINDER_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };

        assert!(matches!(config.build_backend(), Err(CampusError::Config(_))));
    }

    #[test]
    fn test_sled_storage_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_dir: Some(dir.path().join("db")),
            ..Default::default()
        };

        let storage = config.open().unwrap();
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    }
}
