//! Twitter API v2 recent-search fetcher.

use super::{http_client, SourceFetcher, PLACEHOLDER_COUNT, REQUEST_TIMEOUT_SECS};
use crate::document::{Document, SourceKind};
use crate::error::{Result, SpeiderError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;

const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

/// The recent-search endpoint rejects `max_results` below 10.
const PROVIDER_MIN_PAGE: usize = 10;

/// Fetches recent posts matching a query.
///
/// Metadata keys: `author_id`, `retweet_count`, `like_count`.
pub struct SocialFetcher {
    client: reqwest::Client,
    bearer_token: Option<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RecentSearchResponse {
    #[serde(default)]
    data: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: String,
    text: String,
    created_at: Option<DateTime<Utc>>,
    author_id: Option<String>,
    public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Deserialize)]
struct PublicMetrics {
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    like_count: u64,
}

impl SocialFetcher {
    pub fn new(bearer_token: Option<String>) -> Self {
        Self {
            client: http_client(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS)),
            bearer_token,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the fetcher at a different endpoint (for tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the request timeout (for tests).
    pub fn with_request_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.client = http_client(timeout);
        self
    }
}

#[async_trait]
impl SourceFetcher for SocialFetcher {
    fn kind(&self) -> SourceKind {
        SourceKind::Social
    }

    async fn try_fetch(&self, query: &str, limit: usize) -> Result<Vec<Document>> {
        let token = self
            .bearer_token
            .as_deref()
            .ok_or_else(|| SpeiderError::source(self.kind(), "no bearer token configured"))?;

        let page_size = limit.max(PROVIDER_MIN_PAGE).min(100);
        let response = self
            .client
            .get(format!("{}/2/tweets/search/recent", self.base_url))
            .bearer_auth(token)
            .query(&[
                ("query", query),
                ("max_results", &page_size.to_string()),
                ("tweet.fields", "created_at,author_id,public_metrics"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SpeiderError::source(
                self.kind(),
                format!("HTTP {}", response.status()),
            ));
        }

        let payload: RecentSearchResponse = response.json().await?;
        Ok(payload
            .data
            .into_iter()
            .take(limit)
            .map(|post| {
                let author = post.author_id.unwrap_or_else(|| "unknown".to_string());
                let mut metadata = HashMap::new();
                metadata.insert("author_id".to_string(), author.clone());
                if let Some(metrics) = &post.public_metrics {
                    metadata.insert(
                        "retweet_count".to_string(),
                        metrics.retweet_count.to_string(),
                    );
                    metadata.insert("like_count".to_string(), metrics.like_count.to_string());
                }
                Document::new(
                    format!("Post by {}", author),
                    post.text,
                    format!("https://twitter.com/user/status/{}", post.id),
                    SourceKind::Social,
                    post.created_at,
                    metadata,
                )
            })
            .collect())
    }

    fn placeholder(&self, query: &str) -> Vec<Document> {
        (1..=PLACEHOLDER_COUNT)
            .map(|i| {
                let mut metadata = HashMap::new();
                metadata.insert("author_id".to_string(), format!("user_{}", i));
                metadata.insert("retweet_count".to_string(), (i * 5).to_string());
                metadata.insert("like_count".to_string(), (i * 10).to_string());
                Document::new(
                    format!("Post {} about {}", i, query),
                    format!(
                        "Placeholder post {} discussing {}. \
                         Live provider data was unavailable for this item.",
                        i, query
                    ),
                    format!("https://twitter.com/user/status/{}", 1000 + i),
                    SourceKind::Social,
                    Some(Utc::now() - Duration::minutes(10 * i as i64)),
                    metadata,
                )
            })
            .collect()
    }
}
