//! Pipeline coordinator: fetch, index, score, synthesize, publish.
//!
//! Owns the two shared cells the presentation layer polls: the processing
//! status and the latest [`AnalysisSnapshot`]. Each cell has its own lock;
//! on success the snapshot is written before the status flips to
//! `Complete`, so readers never see `Complete` without results. A failed
//! run publishes the `Error` status and leaves any previous snapshot in
//! place.

use crate::analysis::{Analyzer, AnalysisSnapshot};
use crate::config::Settings;
use crate::embedding::OpenAiEmbedder;
use crate::error::{Result, SpeiderError};
use crate::fetch::FetchOrchestrator;
use crate::generator::OpenAiGenerator;
use crate::sentiment::SentimentScorer;
use crate::vector_store::VectorStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{error, info};

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Ready,
    Fetching,
    Indexing,
    Scoring,
    Synthesizing,
    Complete,
    Error,
}

/// Published processing status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStatus {
    pub state: PipelineState,
    pub is_processing: bool,
    /// Monotonically non-decreasing within one run, 0-100.
    pub progress: u8,
    pub message: String,
}

impl Default for PipelineStatus {
    fn default() -> Self {
        Self {
            state: PipelineState::Ready,
            is_processing: false,
            progress: 0,
            message: "Ready".to_string(),
        }
    }
}

/// Coordinates one analysis run at a time.
pub struct Pipeline {
    orchestrator: FetchOrchestrator,
    store: Arc<VectorStore>,
    scorer: SentimentScorer,
    analyzer: Arc<Analyzer>,
    status: RwLock<PipelineStatus>,
    snapshot: RwLock<Option<AnalysisSnapshot>>,
    running: AtomicBool,
}

impl Pipeline {
    /// Build a pipeline from explicit components.
    pub fn new(
        orchestrator: FetchOrchestrator,
        store: Arc<VectorStore>,
        scorer: SentimentScorer,
        analyzer: Arc<Analyzer>,
    ) -> Self {
        Self {
            orchestrator,
            store,
            scorer,
            analyzer,
            status: RwLock::new(PipelineStatus::default()),
            snapshot: RwLock::new(None),
            running: AtomicBool::new(false),
        }
    }

    /// Build the standard pipeline from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let embedder = Arc::new(OpenAiEmbedder::new(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));
        let store = Arc::new(VectorStore::new(embedder, settings.embedding.chunk_workers));
        let generator = Arc::new(OpenAiGenerator::new(&settings.llm.model));
        let analyzer = Arc::new(Analyzer::new(
            generator,
            settings.llm.max_tokens,
            settings.llm.temperature,
        ));
        Self::new(
            FetchOrchestrator::from_settings(settings),
            store,
            SentimentScorer::new(),
            analyzer,
        )
    }

    /// The vector store backing this pipeline.
    pub fn store(&self) -> Arc<VectorStore> {
        Arc::clone(&self.store)
    }

    /// The analyzer backing this pipeline.
    pub fn analyzer(&self) -> Arc<Analyzer> {
        Arc::clone(&self.analyzer)
    }

    /// Current status (cloned).
    pub fn status(&self) -> PipelineStatus {
        self.status.read().unwrap().clone()
    }

    /// Latest published snapshot, if any run has completed (cloned).
    pub fn snapshot(&self) -> Option<AnalysisSnapshot> {
        self.snapshot.read().unwrap().clone()
    }

    /// Run an analysis for `query` on the current task.
    ///
    /// Rejects immediately with a `Pipeline` error if a run is already in
    /// flight.
    pub async fn run(&self, query: &str) -> Result<()> {
        self.try_begin(query)?;
        self.run_to_completion(query).await
    }

    /// Run an analysis in a background task, returning its handle.
    ///
    /// The busy rejection happens before spawning, so callers learn about
    /// an overlapping run synchronously.
    pub fn start(
        self: &Arc<Self>,
        query: &str,
    ) -> Result<tokio::task::JoinHandle<Result<()>>> {
        self.try_begin(query)?;
        let pipeline = Arc::clone(self);
        let query = query.to_string();
        Ok(tokio::spawn(async move {
            pipeline.run_to_completion(&query).await
        }))
    }

    /// Acquire the single-flight guard and publish the queued status.
    fn try_begin(&self, query: &str) -> Result<()> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SpeiderError::Pipeline(
                "analysis already in progress".to_string(),
            ));
        }
        info!(query, "starting analysis run");
        self.publish_status(
            PipelineState::Ready,
            true,
            0,
            "Queued - starting processing...",
        );
        Ok(())
    }

    async fn run_to_completion(&self, query: &str) -> Result<()> {
        // Released on drop, so even a panicking stage cannot leave the
        // guard held and wedge every later run.
        let _guard = RunGuard {
            running: &self.running,
        };
        let result = self.run_stages(query).await;
        if let Err(e) = &result {
            error!(query, error = %e, "pipeline run failed");
            self.publish_status(PipelineState::Error, false, 0, &format!("Error: {}", e));
        }
        result
    }

    async fn run_stages(&self, query: &str) -> Result<()> {
        self.publish_status(
            PipelineState::Fetching,
            true,
            10,
            "Fetching data from sources...",
        );
        let documents = self.orchestrator.fetch_all(query).await;
        info!(count = documents.len(), "fetched documents");

        self.publish_status(
            PipelineState::Indexing,
            true,
            40,
            "Processing and storing data...",
        );
        // Each run replaces the previous cycle's documents wholesale.
        self.store.clear();
        self.store.add(documents.clone()).await?;

        self.publish_status(PipelineState::Scoring, true, 60, "Analyzing sentiment...");
        let analyses = self.scorer.analyze_documents(&documents);
        let distribution = self.scorer.overall_distribution(&analyses);

        self.publish_status(
            PipelineState::Synthesizing,
            true,
            80,
            "Generating AI insights...",
        );
        let context = Analyzer::build_context(query, &documents, &analyses);
        let summary = self
            .analyzer
            .generate_summary(query, &context, &analyses)
            .await;
        let insights = self.analyzer.generate_insights(query, &context).await;

        self.publish_status(PipelineState::Synthesizing, true, 90, "Finalizing results...");
        let snapshot = AnalysisSnapshot {
            query: query.to_string(),
            summary,
            insights,
            sources: analyses,
            sentiment_distribution: distribution,
            total_documents: documents.len(),
            created_at: Utc::now(),
        };

        // Snapshot first, then status: `Complete` must never be visible
        // without results.
        *self.snapshot.write().unwrap() = Some(snapshot);
        self.publish_status(PipelineState::Complete, false, 100, "Analysis complete");
        info!(query, "analysis run complete");
        Ok(())
    }

    fn publish_status(
        &self,
        state: PipelineState,
        is_processing: bool,
        progress: u8,
        message: &str,
    ) {
        let mut status = self.status.write().unwrap();
        *status = PipelineStatus {
            state,
            is_processing,
            progress,
            message: message.to_string(),
        };
    }
}

/// Releases the single-flight guard when the run ends, however it ends.
struct RunGuard<'a> {
    running: &'a AtomicBool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}
