//! Speider - Multi-Source Content Analysis
//!
//! A CLI tool that aggregates content about a topic from video, news, and
//! social providers, scores sentiment, indexes everything in an in-memory
//! vector store, and answers follow-up questions with citations.
//!
//! The name "Speider" comes from the Norwegian word for "scout."
//!
//! # Overview
//!
//! Speider allows you to:
//! - Fetch content about a topic from multiple providers in parallel
//! - Score per-source sentiment and extract recurring themes
//! - Generate AI summaries and key insights
//! - Ask follow-up questions answered from the indexed documents
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `document` - The normalized content document and source kinds
//! - `fetch` - Provider fetchers and the concurrent orchestrator
//! - `embedding` - Embedding generation
//! - `vector_store` - In-memory vector index
//! - `sentiment` - Lexicon sentiment scoring and theme extraction
//! - `analysis` - AI summaries, insights, and answers
//! - `rag` - Question answering with citations
//! - `pipeline` - Run coordination and status publication
//!
//! # Example
//!
//! ```rust,no_run
//! use speider::config::Settings;
//! use speider::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::from_settings(&settings);
//!
//!     pipeline.run("rust language").await?;
//!     let snapshot = pipeline.snapshot().expect("run completed");
//!     println!("Analyzed {} documents", snapshot.total_documents);
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod fetch;
pub mod generator;
pub mod openai;
pub mod pipeline;
pub mod rag;
pub mod sentiment;
pub mod vector_store;

pub use error::{Result, SpeiderError};
