//! YouTube Data API v3 video fetcher.

use super::{http_client, SourceFetcher, PLACEHOLDER_COUNT, REQUEST_TIMEOUT_SECS};
use crate::document::{Document, SourceKind};
use crate::error::{Result, SpeiderError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Fetches top videos for a query via the YouTube search endpoint.
///
/// Metadata keys: `channel`, `video_id`.
pub struct VideoFetcher {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: VideoId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct VideoId {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    published_at: Option<DateTime<Utc>>,
    channel_title: Option<String>,
}

impl VideoFetcher {
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
impl SourceFetcher for VideoFetcher {
    fn kind(&self) -> SourceKind {
        SourceKind::Video
    }

    async fn try_fetch(&self, query: &str, limit: usize) -> Result<Vec<Document>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SpeiderError::source(self.kind(), "no API key configured"))?;

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("maxResults", &limit.to_string()),
                ("order", "relevance"),
                ("key", api_key),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SpeiderError::source(
                self.kind(),
                format!("HTTP {}", response.status()),
            ));
        }

        let payload: SearchResponse = response.json().await?;
        Ok(payload
            .items
            .into_iter()
            .map(|item| {
                let url = format!("https://www.youtube.com/watch?v={}", item.id.video_id);
                let mut metadata = HashMap::new();
                metadata.insert("video_id".to_string(), item.id.video_id);
                if let Some(channel) = &item.snippet.channel_title {
                    metadata.insert("channel".to_string(), channel.clone());
                }
                Document::new(
                    item.snippet.title,
                    item.snippet.description,
                    url,
                    SourceKind::Video,
                    item.snippet.published_at,
                    metadata,
                )
            })
            .collect())
    }

    fn placeholder(&self, query: &str) -> Vec<Document> {
        (1..=PLACEHOLDER_COUNT)
            .map(|i| {
                let mut metadata = HashMap::new();
                metadata.insert("channel".to_string(), format!("Channel {}", i));
                metadata.insert("video_id".to_string(), format!("placeholder{}", i));
                Document::new(
                    format!("Video {} about {}", i, query),
                    format!(
                        "Placeholder description for video {} discussing {}. \
                         Live provider data was unavailable for this item.",
                        i, query
                    ),
                    format!("https://www.youtube.com/watch?v=placeholder{}", i),
                    SourceKind::Video,
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
    async fn maps_provider_payload_into_documents() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "rust"))
            .and(query_param("type", "video"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": { "videoId": "abc123" },
                    "snippet": {
                        "title": "Rust explained",
                        "description": "A talk about rust",
                        "publishedAt": "2024-03-01T12:00:00Z",
                        "channelTitle": "RustConf"
                    }
                }]
            })))
            .mount(&server)
            .await;

        let fetcher =
            VideoFetcher::new(Some("key".to_string())).with_base_url(server.uri());
        let docs = fetcher.try_fetch("rust", 5).await.unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "Rust explained");
        assert_eq!(docs[0].url, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(docs[0].source, SourceKind::Video);
        assert_eq!(docs[0].metadata["channel"], "RustConf");
        assert!(docs[0].timestamp.is_some());
    }

    #[tokio::test]
    async fn server_error_falls_back_to_placeholders() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher =
            VideoFetcher::new(Some("key".to_string())).with_base_url(server.uri());
        assert!(fetcher.try_fetch("rust", 5).await.is_err());

        let docs = fetcher.fetch("rust", 5).await;
        assert_eq!(docs.len(), PLACEHOLDER_COUNT);
        assert!(docs.iter().all(|d| d.source == SourceKind::Video));
        assert!(docs[0].title.contains("rust"));
    }

    #[tokio::test]
    async fn missing_credential_yields_placeholders() {
        let fetcher = VideoFetcher::new(None);
        let docs = fetcher.fetch("rust", 5).await;
        assert_eq!(docs.len(), PLACEHOLDER_COUNT);
    }
}
