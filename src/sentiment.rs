//! Lexicon-based sentiment scoring and per-source aggregation.
//!
//! The scorer is a small weighted word list, not a learned model. It is
//! always available and fast, which is all the pipeline requires of it.

use crate::document::{Document, SourceKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Word weights. Positive values in `(0, 1]`, negative in `[-1, 0)`.
const LEXICON: &[(&str, f32)] = &[
    ("great", 0.4),
    ("good", 0.3),
    ("excellent", 0.5),
    ("amazing", 0.5),
    ("positive", 0.4),
    ("success", 0.4),
    ("successful", 0.4),
    ("love", 0.5),
    ("loved", 0.5),
    ("best", 0.5),
    ("recommend", 0.4),
    ("popular", 0.3),
    ("growth", 0.3),
    ("growing", 0.3),
    ("improved", 0.4),
    ("breakthrough", 0.5),
    ("win", 0.4),
    ("victory", 0.5),
    ("promising", 0.4),
    ("innovative", 0.4),
    ("bad", -0.4),
    ("terrible", -0.6),
    ("worst", -0.6),
    ("failed", -0.4),
    ("failure", -0.4),
    ("problem", -0.3),
    ("concern", -0.3),
    ("warning", -0.4),
    ("crisis", -0.6),
    ("scandal", -0.6),
    ("lawsuit", -0.5),
    ("dangerous", -0.6),
    ("harmful", -0.6),
    ("decline", -0.4),
    ("losses", -0.4),
    ("fraud", -0.7),
    ("banned", -0.6),
    ("controversy", -0.4),
    ("criticism", -0.4),
    ("risk", -0.3),
];

/// Common words excluded from theme extraction.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "this", "that", "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "about", "from", "what", "when", "where",
];

/// Bounded sentiment components for a text.
///
/// `positive`, `negative`, and `neutral` are proportions in `[0, 1]`
/// summing to 1; `compound` is the net weighted score in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub positive: f32,
    pub negative: f32,
    pub neutral: f32,
    pub compound: f32,
}

impl SentimentScore {
    /// A fully neutral score.
    pub fn neutral() -> Self {
        Self {
            positive: 0.0,
            negative: 0.0,
            neutral: 1.0,
            compound: 0.0,
        }
    }
}

/// Per-source sentiment and theme summary, created once per fetch cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceAnalysis {
    pub source: SourceKind,
    pub total_results: usize,
    pub sentiment: SentimentScore,
    /// Up to 5 extracted theme tokens.
    pub key_themes: Vec<String>,
    /// Up to 3 content samples, 200 chars each.
    pub sample_content: Vec<String>,
}

/// Document-count-weighted sentiment mix across all sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: f32,
    pub negative: f32,
    pub neutral: f32,
}

/// Lexicon sentiment scorer.
#[derive(Debug, Clone, Default)]
pub struct SentimentScorer;

impl SentimentScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score a single text.
    pub fn score(&self, text: &str) -> SentimentScore {
        let mut token_count = 0usize;
        let mut positive_hits = 0usize;
        let mut negative_hits = 0usize;
        let mut net = 0.0f32;

        for word in text.split_whitespace() {
            let w = word
                .trim_matches(|c: char| !c.is_alphabetic())
                .to_lowercase();
            if w.is_empty() {
                continue;
            }
            token_count += 1;
            if let Some(&(_, weight)) = LEXICON.iter().find(|(lex, _)| *lex == w) {
                net += weight;
                if weight > 0.0 {
                    positive_hits += 1;
                } else {
                    negative_hits += 1;
                }
            }
        }

        if token_count == 0 {
            return SentimentScore::neutral();
        }

        let positive = (positive_hits as f32 / token_count as f32).clamp(0.0, 1.0);
        let negative = (negative_hits as f32 / token_count as f32).clamp(0.0, 1.0);
        SentimentScore {
            positive,
            negative,
            neutral: (1.0 - positive - negative).clamp(0.0, 1.0),
            compound: net.clamp(-1.0, 1.0),
        }
    }

    /// Score documents grouped by source kind.
    pub fn analyze_documents(&self, documents: &[Document]) -> HashMap<SourceKind, SourceAnalysis> {
        let mut groups: HashMap<SourceKind, Vec<&Document>> = HashMap::new();
        for doc in documents {
            groups.entry(doc.source).or_default().push(doc);
        }

        groups
            .into_iter()
            .map(|(source, docs)| {
                let scores: Vec<SentimentScore> = docs
                    .iter()
                    .map(|d| self.score(&d.embedding_text()))
                    .collect();
                let sentiment = mean_score(&scores);
                let key_themes = extract_key_themes(&docs);
                let sample_content = docs
                    .iter()
                    .take(3)
                    .map(|d| truncate_chars(&d.content, 200))
                    .collect();

                (
                    source,
                    SourceAnalysis {
                        source,
                        total_results: docs.len(),
                        sentiment,
                        key_themes,
                        sample_content,
                    },
                )
            })
            .collect()
    }

    /// Overall sentiment mix weighted by each source's document count.
    pub fn overall_distribution(
        &self,
        analyses: &HashMap<SourceKind, SourceAnalysis>,
    ) -> SentimentDistribution {
        let total: usize = analyses.values().map(|a| a.total_results).sum();
        if total == 0 {
            return SentimentDistribution {
                positive: 0.0,
                negative: 0.0,
                neutral: 1.0,
            };
        }

        let mut dist = SentimentDistribution {
            positive: 0.0,
            negative: 0.0,
            neutral: 0.0,
        };
        for analysis in analyses.values() {
            let weight = analysis.total_results as f32 / total as f32;
            dist.positive += analysis.sentiment.positive * weight;
            dist.negative += analysis.sentiment.negative * weight;
            dist.neutral += analysis.sentiment.neutral * weight;
        }
        dist
    }
}

fn mean_score(scores: &[SentimentScore]) -> SentimentScore {
    if scores.is_empty() {
        return SentimentScore::neutral();
    }
    let n = scores.len() as f32;
    SentimentScore {
        positive: scores.iter().map(|s| s.positive).sum::<f32>() / n,
        negative: scores.iter().map(|s| s.negative).sum::<f32>() / n,
        neutral: scores.iter().map(|s| s.neutral).sum::<f32>() / n,
        compound: scores.iter().map(|s| s.compound).sum::<f32>() / n,
    }
}

/// Top-5 frequent tokens (len > 3, stop words removed) across documents.
fn extract_key_themes(documents: &[&Document]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for doc in documents {
        for word in doc.embedding_text().to_lowercase().split_whitespace() {
            let clean: String = word.chars().filter(|c| c.is_alphabetic()).collect();
            if clean.len() > 3 && !STOP_WORDS.contains(&clean.as_str()) {
                *counts.entry(clean).or_insert(0) += 1;
            }
        }
    }

    let mut themes: Vec<(String, usize)> = counts.into_iter().collect();
    // Alphabetical tiebreak keeps the output deterministic.
    themes.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    themes.truncate(5);
    themes.into_iter().map(|(word, _)| word).collect()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str, content: &str, source: SourceKind) -> Document {
        Document::new(title, content, "https://example.com", source, None, HashMap::new())
    }

    #[test]
    fn empty_text_is_neutral() {
        let score = SentimentScorer::new().score("");
        assert_eq!(score, SentimentScore::neutral());
    }

    #[test]
    fn unknown_words_are_neutral() {
        let score = SentimentScorer::new().score("the quick brown fox");
        assert_eq!(score.positive, 0.0);
        assert_eq!(score.negative, 0.0);
        assert_eq!(score.neutral, 1.0);
        assert_eq!(score.compound, 0.0);
    }

    #[test]
    fn positive_and_negative_words_move_compound() {
        let scorer = SentimentScorer::new();
        assert!(scorer.score("a great success").compound > 0.0);
        assert!(scorer.score("a terrible failure").compound < 0.0);
    }

    #[test]
    fn components_stay_bounded_and_sum_to_one() {
        let scorer = SentimentScorer::new();
        for text in [
            "great excellent best love win victory amazing breakthrough",
            "terrible worst crisis scandal fraud dangerous harmful",
            "mixed great terrible words here",
        ] {
            let s = scorer.score(text);
            assert!((0.0..=1.0).contains(&s.positive));
            assert!((0.0..=1.0).contains(&s.negative));
            assert!((0.0..=1.0).contains(&s.neutral));
            assert!((-1.0..=1.0).contains(&s.compound));
            assert!((s.positive + s.negative + s.neutral - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn punctuation_is_stripped_before_matching() {
        assert!(SentimentScorer::new().score("great!").compound > 0.0);
    }

    #[test]
    fn analyze_documents_groups_by_source() {
        let docs = vec![
            doc("n1", "great launch coverage", SourceKind::News),
            doc("n2", "terrible rollout coverage", SourceKind::News),
            doc("s1", "people love this", SourceKind::Social),
        ];
        let analyses = SentimentScorer::new().analyze_documents(&docs);

        assert_eq!(analyses.len(), 2);
        let news = &analyses[&SourceKind::News];
        assert_eq!(news.total_results, 2);
        assert_eq!(news.sample_content.len(), 2);
        assert!(news.key_themes.len() <= 5);
        // "coverage" appears in both news documents.
        assert_eq!(news.key_themes[0], "coverage");
        assert_eq!(analyses[&SourceKind::Social].total_results, 1);
    }

    #[test]
    fn sample_content_is_capped_at_200_chars() {
        let long = "x".repeat(500);
        let docs = vec![doc("t", &long, SourceKind::News)];
        let analyses = SentimentScorer::new().analyze_documents(&docs);
        assert_eq!(analyses[&SourceKind::News].sample_content[0].len(), 200);
    }

    #[test]
    fn distribution_weights_by_document_count() {
        let scorer = SentimentScorer::new();
        let mut analyses = HashMap::new();
        analyses.insert(
            SourceKind::News,
            SourceAnalysis {
                source: SourceKind::News,
                total_results: 3,
                sentiment: SentimentScore {
                    positive: 1.0,
                    negative: 0.0,
                    neutral: 0.0,
                    compound: 1.0,
                },
                key_themes: vec![],
                sample_content: vec![],
            },
        );
        analyses.insert(
            SourceKind::Social,
            SourceAnalysis {
                source: SourceKind::Social,
                total_results: 1,
                sentiment: SentimentScore {
                    positive: 0.0,
                    negative: 1.0,
                    neutral: 0.0,
                    compound: -1.0,
                },
                key_themes: vec![],
                sample_content: vec![],
            },
        );

        let dist = scorer.overall_distribution(&analyses);
        assert!((dist.positive - 0.75).abs() < 1e-5);
        assert!((dist.negative - 0.25).abs() < 1e-5);
    }

    #[test]
    fn empty_distribution_is_neutral() {
        let dist = SentimentScorer::new().overall_distribution(&HashMap::new());
        assert_eq!(dist.neutral, 1.0);
        assert_eq!(dist.positive, 0.0);
    }
}
