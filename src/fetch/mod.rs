//! Multi-source fetching: provider clients and the concurrent orchestrator.
//!
//! Every provider failure is contained at the fetcher boundary and turned
//! into deterministic placeholder documents, so downstream stages always
//! have data to operate on.

mod news;
mod social;
mod video;

pub use news::NewsFetcher;
pub use social::SocialFetcher;
pub use video::VideoFetcher;

use crate::config::Settings;
use crate::document::{Document, SourceKind};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Number of synthetic documents substituted when a provider fails.
pub(crate) const PLACEHOLDER_COUNT: usize = 3;

/// Request timeout for provider HTTP calls.
///
/// The orchestrator's own timeout stops the wait, but not the underlying
/// request; this bound makes the abandoned connection itself give up.
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Build the HTTP client used by provider fetchers.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create HTTP client")
}

/// One content provider.
///
/// `try_fetch` is the fallible provider call; `fetch` is the boundary the
/// rest of the system uses and never fails: any error is logged and
/// replaced with the fetcher's placeholder set. A successful call that
/// happens to return zero items passes through unchanged.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// The source kind this fetcher produces.
    fn kind(&self) -> SourceKind;

    /// Call the provider. Network, auth, rate-limit, and shape mismatches
    /// all surface as errors here.
    async fn try_fetch(&self, query: &str, limit: usize) -> Result<Vec<Document>>;

    /// Deterministic synthetic documents for this source.
    fn placeholder(&self, query: &str) -> Vec<Document>;

    /// Infallible fetch: provider errors become placeholder data.
    async fn fetch(&self, query: &str, limit: usize) -> Vec<Document> {
        match self.try_fetch(query, limit).await {
            Ok(docs) => {
                debug!(source = %self.kind(), count = docs.len(), "fetched documents");
                docs
            }
            Err(e) => {
                warn!(
                    source = %self.kind(),
                    error = %e,
                    "fetch failed, substituting placeholder data"
                );
                self.placeholder(query)
            }
        }
    }
}

/// Runs all configured fetchers concurrently with per-fetcher timeouts.
pub struct FetchOrchestrator {
    fetchers: Vec<Arc<dyn SourceFetcher>>,
    timeout: Duration,
    per_source_limit: usize,
}

impl FetchOrchestrator {
    /// Build an orchestrator over an explicit fetcher list.
    pub fn new(
        fetchers: Vec<Arc<dyn SourceFetcher>>,
        timeout: Duration,
        per_source_limit: usize,
    ) -> Self {
        Self {
            fetchers,
            timeout,
            per_source_limit,
        }
    }

    /// Build the standard video/news/social fetcher set from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![
            Arc::new(VideoFetcher::new(settings.sources.youtube_api_key.clone())),
            Arc::new(NewsFetcher::new(settings.sources.news_api_key.clone())),
            Arc::new(SocialFetcher::new(
                settings.sources.social_bearer_token.clone(),
            )),
        ];
        Self::new(
            fetchers,
            Duration::from_secs(settings.fetch.timeout_seconds),
            settings.sources.per_source_limit,
        )
    }

    /// Fetch from all sources in parallel.
    ///
    /// Each fetcher runs in its own task with an individual timeout; a
    /// slow or panicking fetcher gets its placeholder set substituted and
    /// never delays the others' results. Output order is fetcher
    /// registration order, not completion order.
    pub async fn fetch_all(&self, query: &str) -> Vec<Document> {
        let tasks: Vec<_> = self
            .fetchers
            .iter()
            .map(|fetcher| {
                let fetcher = Arc::clone(fetcher);
                let query = query.to_string();
                let limit = self.per_source_limit;
                let timeout = self.timeout;
                tokio::spawn(async move {
                    match tokio::time::timeout(timeout, fetcher.fetch(&query, limit)).await {
                        Ok(docs) => docs,
                        Err(_) => {
                            warn!(
                                source = %fetcher.kind(),
                                timeout_secs = timeout.as_secs(),
                                "fetch timed out, substituting placeholder data"
                            );
                            fetcher.placeholder(&query)
                        }
                    }
                })
            })
            .collect();

        let mut documents = Vec::new();
        for (task, fetcher) in tasks.into_iter().zip(&self.fetchers) {
            match task.await {
                Ok(docs) => documents.extend(docs),
                Err(e) => {
                    warn!(source = %fetcher.kind(), error = %e, "fetch task panicked");
                    documents.extend(fetcher.placeholder(query));
                }
            }
        }

        debug!(total = documents.len(), "fetch cycle complete");
        documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpeiderError;
    use std::collections::HashMap;

    struct StubFetcher {
        kind: SourceKind,
        behavior: Behavior,
    }

    enum Behavior {
        Ok(usize),
        Fail,
        Hang,
    }

    fn doc(kind: SourceKind, title: &str) -> Document {
        Document::new(
            title,
            "content",
            "https://example.com",
            kind,
            None,
            HashMap::new(),
        )
    }

    #[async_trait]
    impl SourceFetcher for StubFetcher {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        async fn try_fetch(&self, _query: &str, _limit: usize) -> Result<Vec<Document>> {
            match self.behavior {
                Behavior::Ok(n) => Ok((0..n)
                    .map(|i| doc(self.kind, &format!("{}-{}", self.kind, i)))
                    .collect()),
                Behavior::Fail => Err(SpeiderError::source(self.kind, "stub outage")),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(Vec::new())
                }
            }
        }

        fn placeholder(&self, _query: &str) -> Vec<Document> {
            (0..PLACEHOLDER_COUNT)
                .map(|i| doc(self.kind, &format!("{}-placeholder-{}", self.kind, i)))
                .collect()
        }
    }

    fn orchestrator(fetchers: Vec<Arc<dyn SourceFetcher>>) -> FetchOrchestrator {
        FetchOrchestrator::new(fetchers, Duration::from_millis(100), 5)
    }

    #[tokio::test]
    async fn results_follow_registration_order() {
        let orch = orchestrator(vec![
            Arc::new(StubFetcher {
                kind: SourceKind::Video,
                behavior: Behavior::Ok(2),
            }),
            Arc::new(StubFetcher {
                kind: SourceKind::News,
                behavior: Behavior::Ok(2),
            }),
            Arc::new(StubFetcher {
                kind: SourceKind::Social,
                behavior: Behavior::Ok(2),
            }),
        ]);

        let docs = orch.fetch_all("q").await;
        let kinds: Vec<SourceKind> = docs.iter().map(|d| d.source).collect();
        assert_eq!(
            kinds,
            vec![
                SourceKind::Video,
                SourceKind::Video,
                SourceKind::News,
                SourceKind::News,
                SourceKind::Social,
                SourceKind::Social,
            ]
        );
    }

    #[tokio::test]
    async fn all_failing_fetchers_still_yield_documents() {
        let orch = orchestrator(vec![
            Arc::new(StubFetcher {
                kind: SourceKind::Video,
                behavior: Behavior::Fail,
            }),
            Arc::new(StubFetcher {
                kind: SourceKind::News,
                behavior: Behavior::Fail,
            }),
            Arc::new(StubFetcher {
                kind: SourceKind::Social,
                behavior: Behavior::Fail,
            }),
        ]);

        let docs = orch.fetch_all("q").await;
        assert_eq!(docs.len(), 3 * PLACEHOLDER_COUNT);
        assert!(docs.iter().all(|d| d.title.contains("placeholder")));
    }

    #[tokio::test]
    async fn slow_fetcher_is_timed_out_without_blocking_others() {
        let orch = orchestrator(vec![
            Arc::new(StubFetcher {
                kind: SourceKind::Video,
                behavior: Behavior::Hang,
            }),
            Arc::new(StubFetcher {
                kind: SourceKind::News,
                behavior: Behavior::Ok(1),
            }),
        ]);

        let docs = orch.fetch_all("q").await;
        // Timed-out video fetcher contributes placeholders, news is live.
        assert_eq!(docs.len(), PLACEHOLDER_COUNT + 1);
        assert!(docs[0].title.contains("placeholder"));
        assert_eq!(docs[PLACEHOLDER_COUNT].source, SourceKind::News);
    }

    #[tokio::test]
    async fn empty_success_passes_through() {
        let orch = orchestrator(vec![Arc::new(StubFetcher {
            kind: SourceKind::News,
            behavior: Behavior::Ok(0),
        })]);
        let docs = orch.fetch_all("q").await;
        assert!(docs.is_empty());
    }
}
