//! OpenAI embeddings implementation.

use super::Embedder;
use crate::error::{Result, SpeiderError};
use crate::openai::create_client;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::debug;

/// Per-request batch cap for the embeddings endpoint.
const BATCH_SIZE: usize = 64;

/// OpenAI-based embedder with a fixed output dimension.
pub struct OpenAiEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
    /// Create an embedder for the given model and dimension.
    pub fn new(model: &str, dimensions: usize) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            dimensions,
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(std::slice::from_ref(&text.to_string()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SpeiderError::Embedding("Empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all = Vec::with_capacity(texts.len());

        for batch in texts.chunks(BATCH_SIZE) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(batch.to_vec()))
                .dimensions(self.dimensions as u32)
                .build()
                .map_err(|e| SpeiderError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| SpeiderError::OpenAI(format!("Embedding API error: {}", e)))?;

            // The API does not guarantee response order; restore it by index.
            let mut data: Vec<_> = response.data.into_iter().collect();
            data.sort_by_key(|e| e.index);
            all.extend(data.into_iter().map(|e| e.embedding));
        }

        debug!("Generated {} embeddings", all.len());
        Ok(all)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedder_reports_configured_dimension() {
        let embedder = OpenAiEmbedder::new("text-embedding-3-small", 384);
        assert_eq!(embedder.dimensions(), 384);
    }
}
