//! Shared document model for all fetched content.
//!
//! Every provider normalizes its payload into [`Document`] so the rest of
//! the pipeline (indexing, sentiment, RAG) never sees provider-specific
//! shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Provider category a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Video,
    News,
    Social,
}

impl SourceKind {
    /// All kinds, in the stable order fetchers are registered.
    pub const ALL: [SourceKind; 3] = [SourceKind::Video, SourceKind::News, SourceKind::Social];
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Video => write!(f, "video"),
            SourceKind::News => write!(f, "news"),
            SourceKind::Social => write!(f, "social"),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "video" | "youtube" => Ok(SourceKind::Video),
            "news" => Ok(SourceKind::News),
            "social" | "twitter" => Ok(SourceKind::Social),
            _ => Err(format!("Unknown source kind: {}", s)),
        }
    }
}

/// A normalized unit of fetched content.
///
/// Metadata is an open string map; fetchers document the keys they set:
/// video uses `channel`/`video_id`, news uses `source`/`author`, social
/// uses `author_id`/`retweet_count`/`like_count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Item title.
    pub title: String,
    /// Body text (description, article lede, post text).
    pub content: String,
    /// Canonical URL of the item.
    pub url: String,
    /// Provider category.
    pub source: SourceKind,
    /// Publication instant, when the provider reports one.
    pub timestamp: Option<DateTime<Utc>>,
    /// Provider-specific metadata.
    pub metadata: HashMap<String, String>,
    /// Embedding vector, attached by the vector store on insertion.
    pub embedding: Option<Vec<f32>>,
}

impl Document {
    /// Create a document without an embedding.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        url: impl Into<String>,
        source: SourceKind,
        timestamp: Option<DateTime<Utc>>,
        metadata: HashMap<String, String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            url: url.into(),
            source,
            timestamp,
            metadata,
            embedding: None,
        }
    }

    /// The text that gets embedded for this document.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }
}
