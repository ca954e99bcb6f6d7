//! Configuration settings for Speider.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub sources: SourceSettings,
    pub fetch: FetchSettings,
    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
    pub rag: RagSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Provider credentials and per-source quotas.
///
/// A missing credential does not prevent a run; the affected fetcher
/// falls back to placeholder data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// YouTube Data API v3 key.
    pub youtube_api_key: Option<String>,
    /// NewsAPI key.
    pub news_api_key: Option<String>,
    /// Twitter API v2 bearer token.
    pub social_bearer_token: Option<String>,
    /// Maximum items requested from each provider per query.
    pub per_source_limit: usize,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            youtube_api_key: None,
            news_api_key: None,
            social_bearer_token: None,
            per_source_limit: 5,
        }
    }
}

/// Fetch orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Per-fetcher timeout enforced by the orchestrator, in seconds.
    pub timeout_seconds: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Concurrent embedding chunks during indexing.
    pub chunk_workers: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 384,
            chunk_workers: 4,
        }
    }
}

/// LLM settings for summaries, insights, and answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Chat model for generation.
    pub model: String,
    /// Token budget shared across the generation prompts.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 2000,
            temperature: 0.3,
        }
    }
}

/// RAG settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Number of context documents retrieved per question.
    pub context_limit: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self { context_limit: 5 }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or the default location if None.
    ///
    /// Credentials may also be supplied through `YOUTUBE_API_KEY`,
    /// `NEWS_API_KEY`, and `SOCIAL_BEARER_TOKEN`; the environment wins
    /// over the file.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Settings>(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SpeiderError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("speider")
            .join("config.toml")
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("YOUTUBE_API_KEY") {
            self.sources.youtube_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("NEWS_API_KEY") {
            self.sources.news_api_key = Some(key);
        }
        if let Ok(token) = std::env::var("SOCIAL_BEARER_TOKEN") {
            self.sources.social_bearer_token = Some(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.embedding.dimensions, 384);
        assert_eq!(settings.sources.per_source_limit, 5);
        assert_eq!(settings.fetch.timeout_seconds, 30);
        assert_eq!(settings.rag.context_limit, 5);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [embedding]
            dimensions = 128

            [sources]
            per_source_limit = 3
        "#,
        )
        .unwrap();
        assert_eq!(settings.embedding.dimensions, 128);
        assert_eq!(settings.sources.per_source_limit, 3);
        assert_eq!(settings.llm.model, "gpt-4o-mini");
    }
}
