//! Text generation behind a narrow trait.
//!
//! The analyzer and RAG engine only need `prompt -> text`; everything
//! OpenAI-specific stays in this module.

use crate::error::{Result, SpeiderError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;

/// Trait for the external answer/insight generator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a prompt. May fail; callers are expected to fall
    /// back to deterministic templated output.
    async fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String>;
}

/// Chat-completions-backed generator.
pub struct OpenAiGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(model: &str) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| SpeiderError::Generator(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .max_tokens(max_tokens)
            .temperature(temperature)
            .build()
            .map_err(|e| SpeiderError::Generator(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SpeiderError::OpenAI(format!("Chat API error: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| SpeiderError::Generator("Empty response from model".to_string()))
    }
}
