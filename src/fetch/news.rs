//! NewsAPI article fetcher.

use super::{http_client, SourceFetcher, PLACEHOLDER_COUNT, REQUEST_TIMEOUT_SECS};
use crate::document::{Document, SourceKind};
use crate::error::{Result, SpeiderError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;

const DEFAULT_BASE_URL: &str = "https://newsapi.org";

/// Fetches relevant English-language articles via NewsAPI `everything`.
///
/// Metadata keys: `source`, `author`.
pub struct NewsFetcher {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    title: String,
    description: Option<String>,
    content: Option<String>,
    url: String,
    published_at: Option<DateTime<Utc>>,
    source: ArticleSource,
    author: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

impl NewsFetcher {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: http_client(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS)),
            api_key,
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
impl SourceFetcher for NewsFetcher {
    fn kind(&self) -> SourceKind {
        SourceKind::News
    }

    async fn try_fetch(&self, query: &str, limit: usize) -> Result<Vec<Document>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SpeiderError::source(self.kind(), "no API key configured"))?;

        let response = self
            .client
            .get(format!("{}/v2/everything", self.base_url))
            .query(&[
                ("q", query),
                ("sortBy", "relevancy"),
                ("pageSize", &limit.to_string()),
                ("language", "en"),
                ("apiKey", api_key),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SpeiderError::source(
                self.kind(),
                format!("HTTP {}", response.status()),
            ));
        }

        let payload: EverythingResponse = response.json().await?;
        Ok(payload
            .articles
            .into_iter()
            .map(|article| {
                // Prefer the description; fall back to the body excerpt.
                let content = article
                    .description
                    .or(article.content)
                    .unwrap_or_default();
                let mut metadata = HashMap::new();
                if let Some(name) = article.source.name {
                    metadata.insert("source".to_string(), name);
                }
                if let Some(author) = article.author {
                    metadata.insert("author".to_string(), author);
                }
                Document::new(
                    article.title,
                    content,
                    article.url,
                    SourceKind::News,
                    article.published_at,
                    metadata,
                )
            })
            .collect())
    }

    fn placeholder(&self, query: &str) -> Vec<Document> {
        (1..=PLACEHOLDER_COUNT)
            .map(|i| {
                let mut metadata = HashMap::new();
                metadata.insert("source".to_string(), format!("News Source {}", i));
                metadata.insert("author".to_string(), format!("Reporter {}", i));
                Document::new(
                    format!("News Article {}: {} Analysis", i, query),
                    format!(
                        "Placeholder news article {} about {}. \
                         Live provider data was unavailable for this item.",
                        i, query
                    ),
                    format!("https://example-news.com/articles/{}/{}", query, i),
                    SourceKind::News,
                    Some(Utc::now() - Duration::hours(i as i64)),
                    metadata,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn maps_articles_and_prefers_description() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param("language", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "articles": [
                    {
                        "title": "Launch day",
                        "description": "The short lede",
                        "content": "The long body",
                        "url": "https://news.example/launch",
                        "publishedAt": "2024-05-01T08:00:00Z",
                        "source": { "name": "Example Daily" },
                        "author": "A. Writer"
                    },
                    {
                        "title": "No description",
                        "description": null,
                        "content": "Body only",
                        "url": "https://news.example/other",
                        "publishedAt": null,
                        "source": { "name": null },
                        "author": null
                    }
                ]
            })))
            .mount(&server)
            .await;

        let fetcher = NewsFetcher::new(Some("key".to_string())).with_base_url(server.uri());
        let docs = fetcher.try_fetch("launch", 5).await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].content, "The short lede");
        assert_eq!(docs[0].metadata["source"], "Example Daily");
        assert_eq!(docs[1].content, "Body only");
        assert!(docs[1].metadata.is_empty());
    }

    #[tokio::test]
    async fn rate_limit_falls_back_to_placeholders() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let fetcher = NewsFetcher::new(Some("key".to_string())).with_base_url(server.uri());
        let docs = fetcher.fetch("launch", 5).await;
        assert_eq!(docs.len(), PLACEHOLDER_COUNT);
        assert!(docs.iter().all(|d| d.source == SourceKind::News));
    }

    #[tokio::test]
    async fn slow_provider_hits_client_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "articles": [] }))
                    .set_delay(std::time::Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let fetcher = NewsFetcher::new(Some("key".to_string()))
            .with_base_url(server.uri())
            .with_request_timeout(std::time::Duration::from_millis(50));
        assert!(fetcher.try_fetch("launch", 5).await.is_err());
        assert_eq!(fetcher.fetch("launch", 5).await.len(), PLACEHOLDER_COUNT);
    }

    #[tokio::test]
    async fn malformed_payload_is_a_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("not json at all"),
            )
            .mount(&server)
            .await;

        let fetcher = NewsFetcher::new(Some("key".to_string())).with_base_url(server.uri());
        assert!(fetcher.try_fetch("launch", 5).await.is_err());
        assert_eq!(fetcher.fetch("launch", 5).await.len(), PLACEHOLDER_COUNT);
    }
}
