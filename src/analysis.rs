//! AI analysis: summaries, key insights, and follow-up answers.
//!
//! All generator failures are contained here; every public method returns
//! deterministic templated output when the external model is unavailable.

use crate::document::{Document, SourceKind};
use crate::generator::TextGenerator;
use crate::sentiment::{SentimentDistribution, SourceAnalysis};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// The externally visible result of one pipeline run.
///
/// Replaced atomically at the end of a run; partial snapshots are never
/// published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub query: String,
    pub summary: String,
    pub insights: Vec<String>,
    pub sources: HashMap<SourceKind, SourceAnalysis>,
    pub sentiment_distribution: SentimentDistribution,
    pub total_documents: usize,
    pub created_at: DateTime<Utc>,
}

/// Prompt composition and fallback handling around a [`TextGenerator`].
pub struct Analyzer {
    generator: Arc<dyn TextGenerator>,
    max_tokens: u32,
    temperature: f32,
}

impl Analyzer {
    pub fn new(generator: Arc<dyn TextGenerator>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            generator,
            max_tokens,
            temperature,
        }
    }

    /// Build the context block shared by the summary and insight prompts.
    pub fn build_context(
        query: &str,
        documents: &[Document],
        analyses: &HashMap<SourceKind, SourceAnalysis>,
    ) -> String {
        let mut parts = vec![
            format!("Search Query: {}", query),
            format!("Total Documents Analyzed: {}", documents.len()),
            String::new(),
        ];

        // Stable section order, independent of map iteration.
        for kind in SourceKind::ALL {
            let Some(analysis) = analyses.get(&kind) else {
                continue;
            };
            parts.push(format!("{} Analysis:", kind.to_string().to_uppercase()));
            parts.push(format!("- Total results: {}", analysis.total_results));
            parts.push(format!(
                "- Sentiment: Positive: {:.2}, Negative: {:.2}, Neutral: {:.2}",
                analysis.sentiment.positive, analysis.sentiment.negative, analysis.sentiment.neutral
            ));
            parts.push(format!("- Key themes: {}", analysis.key_themes.join(", ")));
            parts.push(format!(
                "- Sample content: {}",
                analysis
                    .sample_content
                    .first()
                    .map(String::as_str)
                    .unwrap_or("N/A")
            ));
            parts.push(String::new());
        }

        parts.join("\n")
    }

    /// Generate the overall summary, falling back to a templated one.
    pub async fn generate_summary(
        &self,
        query: &str,
        context: &str,
        analyses: &HashMap<SourceKind, SourceAnalysis>,
    ) -> String {
        let prompt = format!(
            "Based on the following search results for \"{}\", provide a comprehensive summary:\n\n{}\n\nInclude main topics, sentiment, differences between sources, and notable trends. (2-3 paragraphs)",
            query, context
        );

        match self
            .generator
            .generate(&prompt, self.max_tokens / 2, self.temperature)
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "summary generation failed, using fallback");
                fallback_summary(query, analyses)
            }
        }
    }

    /// Generate 3-5 key insights, falling back to templated ones.
    pub async fn generate_insights(&self, query: &str, context: &str) -> Vec<String> {
        let prompt = format!(
            "Based on the search results for \"{}\", identify 3-5 key insights:\n\n{}\n\nFormat as a numbered list.",
            query, context
        );

        match self
            .generator
            .generate(&prompt, self.max_tokens / 2, self.temperature)
            .await
        {
            Ok(text) => {
                let insights = parse_insight_lines(&text);
                if insights.is_empty() {
                    fallback_insights(query)
                } else {
                    insights
                }
            }
            Err(e) => {
                warn!(error = %e, "insight generation failed, using fallback");
                fallback_insights(query)
            }
        }
    }

    /// Answer a follow-up question grounded in retrieved documents.
    pub async fn answer_question(&self, question: &str, documents: &[Document]) -> String {
        let context: Vec<String> = documents
            .iter()
            .take(5)
            .map(|doc| {
                format!(
                    "Source: {} - {}\nContent: {}...",
                    doc.source,
                    doc.title,
                    doc.content.chars().take(300).collect::<String>()
                )
            })
            .collect();

        let prompt = format!(
            "Based on the following search results, answer this question: {}\n\nContext:\n{}\n\nProvide a comprehensive answer and cite sources (video, news, social).",
            question,
            context.join("\n\n")
        );

        match self
            .generator
            .generate(&prompt, self.max_tokens / 3, self.temperature)
            .await
        {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "answer generation failed, using fallback");
                format!("Unable to process the question '{}' at the moment.", question)
            }
        }
    }
}

/// Parse a numbered or bulleted list into insight strings, max 5.
fn parse_insight_lines(text: &str) -> Vec<String> {
    let mut insights = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        let starts_like_item = line
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '*' || c == '\u{2022}');
        if !starts_like_item {
            continue;
        }
        let insight = line
            .trim_start_matches(|c: char| {
                c.is_ascii_digit() || c == '.' || c == ')' || c == '-' || c == '*' || c == '\u{2022}' || c == ' '
            })
            .trim();
        if !insight.is_empty() {
            insights.push(insight.to_string());
        }
        if insights.len() == 5 {
            break;
        }
    }
    insights
}

fn fallback_summary(query: &str, analyses: &HashMap<SourceKind, SourceAnalysis>) -> String {
    let total: usize = analyses.values().map(|a| a.total_results).sum();
    let mut lines = vec![format!(
        "Automated summary for \"{}\" across {} documents from {} source kinds.",
        query,
        total,
        analyses.len()
    )];
    for kind in SourceKind::ALL {
        if let Some(analysis) = analyses.get(&kind) {
            let leaning = if analysis.sentiment.compound > 0.05 {
                "positive"
            } else if analysis.sentiment.compound < -0.05 {
                "negative"
            } else {
                "neutral"
            };
            lines.push(format!(
                "{} sources contributed {} items with overall {} sentiment; recurring themes: {}.",
                kind,
                analysis.total_results,
                leaning,
                if analysis.key_themes.is_empty() {
                    "none".to_string()
                } else {
                    analysis.key_themes.join(", ")
                }
            ));
        }
    }
    lines.join(" ")
}

fn fallback_insights(query: &str) -> Vec<String> {
    vec![
        format!("Coverage of {} varies noticeably between source kinds.", query),
        format!("Sentiment around {} is mixed across the collected documents.", query),
        format!("Recent items suggest continued public interest in {}.", query),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::stub::StubGenerator;
    use crate::sentiment::SentimentScore;

    fn analyses() -> HashMap<SourceKind, SourceAnalysis> {
        let mut map = HashMap::new();
        map.insert(
            SourceKind::News,
            SourceAnalysis {
                source: SourceKind::News,
                total_results: 2,
                sentiment: SentimentScore::neutral(),
                key_themes: vec!["launch".to_string()],
                sample_content: vec!["sample text".to_string()],
            },
        );
        map
    }

    fn analyzer(generator: StubGenerator) -> Analyzer {
        Analyzer::new(Arc::new(generator), 2000, 0.3)
    }

    #[test]
    fn context_includes_per_source_sections() {
        let context = Analyzer::build_context("rust", &[], &analyses());
        assert!(context.contains("Search Query: rust"));
        assert!(context.contains("NEWS Analysis:"));
        assert!(context.contains("- Key themes: launch"));
    }

    #[test]
    fn insight_lines_are_parsed_from_numbered_list() {
        let text = "Intro line\n1. First insight\n2) Second insight\n- Third insight\nplain text";
        let insights = parse_insight_lines(text);
        assert_eq!(
            insights,
            vec!["First insight", "Second insight", "Third insight"]
        );
    }

    #[test]
    fn insights_cap_at_five() {
        let text = "1. a\n2. b\n3. c\n4. d\n5. e\n6. f";
        assert_eq!(parse_insight_lines(text).len(), 5);
    }

    #[tokio::test]
    async fn summary_uses_generator_output() {
        let a = analyzer(StubGenerator::with_response("A fine summary."));
        let summary = a.generate_summary("rust", "ctx", &analyses()).await;
        assert_eq!(summary, "A fine summary.");
    }

    #[tokio::test]
    async fn summary_falls_back_when_generator_fails() {
        let a = analyzer(StubGenerator::failing());
        let summary = a.generate_summary("rust", "ctx", &analyses()).await;
        assert!(summary.contains("Automated summary for \"rust\""));
        assert!(summary.contains("news sources contributed 2 items"));
    }

    #[tokio::test]
    async fn insights_fall_back_when_generator_fails() {
        let a = analyzer(StubGenerator::failing());
        let insights = a.generate_insights("rust", "ctx").await;
        assert_eq!(insights.len(), 3);
        assert!(insights[0].contains("rust"));
    }

    #[tokio::test]
    async fn answer_falls_back_when_generator_fails() {
        let a = analyzer(StubGenerator::failing());
        let answer = a.answer_question("what happened?", &[]).await;
        assert_eq!(
            answer,
            "Unable to process the question 'what happened?' at the moment."
        );
    }
}
