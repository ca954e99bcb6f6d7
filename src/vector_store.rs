//! In-memory embedding index over fetched documents.
//!
//! Owns the embedding invocation, a flat Euclidean nearest-neighbor index,
//! and the canonical document list. The document list and the vector list
//! always have the same length and per-element order; both are guarded by
//! one exclusive lock. Embedding computation happens outside that lock so
//! slow encode calls never block readers.

use crate::document::{Document, SourceKind};
use crate::embedding::Embedder;
use crate::error::{Result, SpeiderError};
use futures::stream::{self, StreamExt};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Index state mutated only under the store lock.
#[derive(Default)]
struct Inner {
    documents: Vec<Document>,
    vectors: Vec<Vec<f32>>,
}

/// Thread-safe vector store with exact Euclidean search.
pub struct VectorStore {
    embedder: Arc<dyn Embedder>,
    dimension: usize,
    chunk_workers: usize,
    inner: Mutex<Inner>,
}

impl VectorStore {
    /// Create a store around an embedder.
    ///
    /// `chunk_workers` bounds how many embedding batches run concurrently
    /// during [`VectorStore::add`].
    pub fn new(embedder: Arc<dyn Embedder>, chunk_workers: usize) -> Self {
        let dimension = embedder.dimensions();
        Self {
            embedder,
            dimension,
            chunk_workers: chunk_workers.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// The configured embedding dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().documents.len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embed and index a batch of documents.
    ///
    /// Documents are split into chunks embedded concurrently; chunks may
    /// finish in any order, so the stored order can differ from the input
    /// order. Each document is appended together with its own vector in a
    /// single critical section, so concurrent readers never observe a
    /// document without an index entry or a half-applied batch.
    pub async fn add(&self, documents: Vec<Document>) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let total = documents.len();
        let chunk_size = total.div_ceil(self.chunk_workers);
        let chunks: Vec<Vec<Document>> = {
            let mut docs = documents;
            let mut out = Vec::new();
            while !docs.is_empty() {
                let rest = docs.split_off(chunk_size.min(docs.len()));
                out.push(docs);
                docs = rest;
            }
            out
        };

        // Embed chunks outside the lock, in parallel, collecting in
        // completion order.
        let embedder = &self.embedder;
        let embedded: Vec<Result<(Vec<Document>, Vec<Vec<f32>>)>> = stream::iter(chunks)
            .map(|chunk| async move {
                let texts: Vec<String> = chunk.iter().map(Document::embedding_text).collect();
                let embeddings = embedder.embed_batch(&texts).await?;
                Ok((chunk, embeddings))
            })
            .buffer_unordered(self.chunk_workers)
            .collect()
            .await;

        let mut pairs: Vec<(Document, Vec<f32>)> = Vec::with_capacity(total);
        for result in embedded {
            let (chunk, embeddings) = result?;
            if chunk.len() != embeddings.len() {
                return Err(SpeiderError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    chunk.len(),
                    embeddings.len()
                )));
            }
            for (doc, embedding) in chunk.into_iter().zip(embeddings) {
                if embedding.len() != self.dimension {
                    return Err(SpeiderError::Embedding(format!(
                        "Embedding dimension {} does not match store dimension {}",
                        embedding.len(),
                        self.dimension
                    )));
                }
                pairs.push((doc, embedding));
            }
        }

        let mut inner = self.inner.lock().unwrap();
        for (mut doc, embedding) in pairs {
            doc.embedding = Some(embedding.clone());
            inner.documents.push(doc);
            inner.vectors.push(embedding);
        }
        debug!("Indexed {} documents ({} total)", total, inner.documents.len());
        Ok(())
    }

    /// Return up to `k` nearest documents with their distances, best first.
    ///
    /// The query is embedded outside the lock. An empty store yields an
    /// empty result without calling the embedder.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<(Document, f32)>> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query).await?;
        if query_vector.len() != self.dimension {
            return Err(SpeiderError::Embedding(format!(
                "Query embedding dimension {} does not match store dimension {}",
                query_vector.len(),
                self.dimension
            )));
        }

        let inner = self.inner.lock().unwrap();
        let mut scored: Vec<(usize, f32)> = inner
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, euclidean_distance(&query_vector, v)))
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k.min(inner.documents.len()));

        Ok(scored
            .into_iter()
            .map(|(i, distance)| (inner.documents[i].clone(), distance))
            .collect())
    }

    /// Atomically discard all documents and index entries.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.documents.clear();
        inner.vectors.clear();
    }

    /// Cloned snapshot of all indexed documents.
    pub fn get_all(&self) -> Vec<Document> {
        self.inner.lock().unwrap().documents.clone()
    }

    /// Cloned snapshot of the documents from one source kind.
    pub fn get_by_source(&self, kind: SourceKind) -> Vec<Document> {
        self.inner
            .lock()
            .unwrap()
            .documents
            .iter()
            .filter(|d| d.source == kind)
            .cloned()
            .collect()
    }

    /// Source kinds currently present in the store.
    pub fn present_sources(&self) -> Vec<SourceKind> {
        let inner = self.inner.lock().unwrap();
        SourceKind::ALL
            .into_iter()
            .filter(|kind| inner.documents.iter().any(|d| d.source == *kind))
            .collect()
    }
}

/// Euclidean (L2) distance between two vectors of equal length.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
