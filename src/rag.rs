//! Retrieval-augmented question answering over the vector store.

use crate::analysis::Analyzer;
use crate::document::SourceKind;
use crate::error::Result;
use crate::vector_store::VectorStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

/// Fixed answer for questions asked against an empty store.
pub const INSUFFICIENT_INFO_ANSWER: &str =
    "I don't have enough information to answer that question based on the current search results.";

/// Maximum snippet length in a citation, in characters.
const SNIPPET_MAX_CHARS: usize = 200;

/// A cited supporting document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCitation {
    pub title: String,
    pub url: String,
    pub source: SourceKind,
    pub relevance_score: f32,
    pub snippet: String,
}

/// Answer with supporting citations and aggregate confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    pub answer: String,
    pub sources: Vec<SourceCitation>,
    pub confidence: f32,
    pub total_sources_found: usize,
}

/// One question/answer exchange in the conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

/// RAG engine: retrieval, answer generation, and conversation state.
///
/// The conversation log has its own lock, independent of the vector
/// store's; appending a turn never blocks index readers.
pub struct RagEngine {
    store: Arc<VectorStore>,
    analyzer: Arc<Analyzer>,
    context_limit: usize,
    history: Mutex<Vec<ConversationTurn>>,
}

impl RagEngine {
    pub fn new(store: Arc<VectorStore>, analyzer: Arc<Analyzer>, context_limit: usize) -> Self {
        Self {
            store,
            analyzer,
            context_limit: context_limit.max(1),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Ask a question against the current index.
    ///
    /// An empty index is a terminal case, not an error: the fixed
    /// insufficient-information answer comes back with no sources and
    /// confidence 0.0, and nothing is appended to the log.
    pub async fn ask(&self, question: &str) -> Result<RagAnswer> {
        info!(question, "processing question");
        let hits = self.store.search(question, self.context_limit).await?;

        if hits.is_empty() {
            debug!("no documents indexed, returning terminal answer");
            return Ok(RagAnswer {
                answer: INSUFFICIENT_INFO_ANSWER.to_string(),
                sources: Vec::new(),
                confidence: 0.0,
                total_sources_found: 0,
            });
        }

        let documents: Vec<_> = hits.iter().map(|(doc, _)| doc.clone()).collect();
        let relevance: Vec<f32> = hits
            .iter()
            .map(|(_, distance)| relevance_from_distance(*distance))
            .collect();

        let answer = self.analyzer.answer_question(question, &documents).await;

        let sources: Vec<SourceCitation> = documents
            .iter()
            .zip(&relevance)
            .map(|(doc, &score)| SourceCitation {
                title: doc.title.clone(),
                url: doc.url.clone(),
                source: doc.source,
                relevance_score: score,
                snippet: snippet(&doc.content),
            })
            .collect();

        let confidence =
            (relevance.iter().sum::<f32>() / relevance.len() as f32).min(1.0);

        {
            let mut history = self.history.lock().unwrap();
            history.push(ConversationTurn {
                id: Uuid::new_v4(),
                question: question.to_string(),
                answer: answer.clone(),
                asked_at: Utc::now(),
            });
        }

        Ok(RagAnswer {
            total_sources_found: sources.len(),
            answer,
            sources,
            confidence,
        })
    }

    /// Suggested follow-up questions for the current index contents.
    ///
    /// At most 6 entries: source-specific templates for whichever kinds
    /// are present (news, then social, then video), padded with generic
    /// analytical questions. Purely derived from the store; no external
    /// calls.
    pub fn suggestions(&self, query: &str) -> Vec<String> {
        let present = self.store.present_sources();
        let mut suggestions = Vec::new();

        if present.contains(&SourceKind::News) {
            suggestions.push(format!("What do news sources say about {}?", query));
            suggestions.push(format!(
                "What are the latest developments regarding {}?",
                query
            ));
        }
        if present.contains(&SourceKind::Social) {
            suggestions.push(format!("What is the public opinion on {}?", query));
            suggestions.push(format!(
                "How are people reacting to {} on social media?",
                query
            ));
        }
        if present.contains(&SourceKind::Video) {
            suggestions.push(format!("Are there any educational videos about {}?", query));
            suggestions.push(format!("What explanations are available for {}?", query));
        }

        suggestions.push(format!("What are the main controversies around {}?", query));
        suggestions.push(format!(
            "How has the perception of {} changed over time?",
            query
        ));
        suggestions.push(format!("What are the different perspectives on {}?", query));

        suggestions.truncate(6);
        suggestions
    }

    /// Snapshot copy of the conversation log.
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.history.lock().unwrap().clone()
    }

    /// Clear the conversation log.
    pub fn clear_history(&self) {
        self.history.lock().unwrap().clear();
    }
}

/// Convert a retrieval distance to a relevance score in `(0, 1]`.
///
/// Monotonically decreasing: closer documents score higher; distance 0
/// maps to exactly 1.
pub fn relevance_from_distance(distance: f32) -> f32 {
    1.0 / (1.0 + distance)
}

fn snippet(content: &str) -> String {
    if content.chars().count() > SNIPPET_MAX_CHARS {
        let truncated: String = content.chars().take(SNIPPET_MAX_CHARS).collect();
        format!("{}...", truncated)
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::embedding::stub::StubEmbedder;
    use crate::generator::stub::StubGenerator;
    use std::collections::HashMap;

    fn doc(title: &str, content: &str, source: SourceKind) -> Document {
        Document::new(
            title,
            content,
            format!("https://example.com/{}", title),
            source,
            None,
            HashMap::new(),
        )
    }

    fn engine_with(generator: StubGenerator) -> (Arc<VectorStore>, RagEngine) {
        let store = Arc::new(VectorStore::new(Arc::new(StubEmbedder::new(32)), 2));
        let analyzer = Arc::new(Analyzer::new(Arc::new(generator), 2000, 0.3));
        let engine = RagEngine::new(Arc::clone(&store), analyzer, 5);
        (store, engine)
    }

    #[test]
    fn relevance_is_monotone_and_bounded() {
        assert_eq!(relevance_from_distance(0.0), 1.0);
        let (d1, d2) = (0.5, 2.0);
        let (r1, r2) = (relevance_from_distance(d1), relevance_from_distance(d2));
        assert!(r1 > r2);
        for d in [0.0, 0.1, 1.0, 10.0, 1000.0] {
            let r = relevance_from_distance(d);
            assert!(r > 0.0 && r <= 1.0, "r({}) = {} out of range", d, r);
        }
    }

    #[tokio::test]
    async fn empty_store_returns_terminal_answer() {
        let (_store, engine) = engine_with(StubGenerator::with_response("unused"));
        let result = engine.ask("anything?").await.unwrap();
        assert_eq!(result.answer, INSUFFICIENT_INFO_ANSWER);
        assert!(result.sources.is_empty());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.total_sources_found, 0);
        assert!(engine.history().is_empty());
    }

    #[tokio::test]
    async fn ask_returns_citations_and_logs_turn() {
        let (store, engine) = engine_with(StubGenerator::with_response("Grounded answer."));
        store
            .add(vec![
                doc("launch", "the launch coverage was detailed", SourceKind::News),
                doc("reaction", "social reaction to the launch", SourceKind::Social),
            ])
            .await
            .unwrap();

        let result = engine.ask("what about the launch?").await.unwrap();
        assert_eq!(result.answer, "Grounded answer.");
        assert_eq!(result.total_sources_found, 2);
        assert!(result.confidence > 0.0 && result.confidence <= 1.0);
        for citation in &result.sources {
            assert!(citation.relevance_score > 0.0 && citation.relevance_score <= 1.0);
            assert!(!citation.snippet.is_empty());
        }

        let history = engine.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].question, "what about the launch?");
        assert_eq!(history[0].answer, "Grounded answer.");
    }

    #[tokio::test]
    async fn long_content_is_truncated_with_ellipsis() {
        let (store, engine) = engine_with(StubGenerator::with_response("ok"));
        let long = "word ".repeat(100);
        store
            .add(vec![doc("long", &long, SourceKind::News)])
            .await
            .unwrap();

        let result = engine.ask("word").await.unwrap();
        let snippet = &result.sources[0].snippet;
        assert!(snippet.ends_with("..."));
        assert_eq!(snippet.chars().count(), SNIPPET_MAX_CHARS + 3);
    }

    #[tokio::test]
    async fn generator_outage_still_answers_with_fallback() {
        let (store, engine) = engine_with(StubGenerator::failing());
        store
            .add(vec![doc("a", "some content", SourceKind::News)])
            .await
            .unwrap();

        let result = engine.ask("what?").await.unwrap();
        assert!(result.answer.starts_with("Unable to process the question"));
        assert_eq!(result.total_sources_found, 1);
    }

    #[tokio::test]
    async fn suggestions_prioritize_present_sources() {
        let (store, engine) = engine_with(StubGenerator::with_response("unused"));
        store
            .add(vec![
                doc("n1", "news one", SourceKind::News),
                doc("n2", "news two", SourceKind::News),
                doc("n3", "news three", SourceKind::News),
                doc("s1", "social one", SourceKind::Social),
                doc("s2", "social two", SourceKind::Social),
            ])
            .await
            .unwrap();

        let suggestions = engine.suggestions("topic");
        assert_eq!(suggestions.len(), 6);
        assert!(suggestions[0].contains("news sources"));
        assert!(suggestions[2].contains("public opinion"));
        // Generic questions come after the source-specific ones.
        let generic_pos = suggestions
            .iter()
            .position(|s| s.contains("controversies"))
            .unwrap();
        assert!(generic_pos >= 4);
    }

    #[tokio::test]
    async fn suggestions_on_empty_store_are_generic_only() {
        let (_store, engine) = engine_with(StubGenerator::with_response("unused"));
        let suggestions = engine.suggestions("topic");
        assert_eq!(suggestions.len(), 3);
        assert!(suggestions[0].contains("controversies"));
    }

    #[tokio::test]
    async fn clear_history_empties_log() {
        let (store, engine) = engine_with(StubGenerator::with_response("a"));
        store
            .add(vec![doc("d", "content", SourceKind::News)])
            .await
            .unwrap();
        engine.ask("q1").await.unwrap();
        engine.ask("q2").await.unwrap();
        assert_eq!(engine.history().len(), 2);

        engine.clear_history();
        assert!(engine.history().is_empty());
    }
}
