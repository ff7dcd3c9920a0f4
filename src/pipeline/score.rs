//! Relevance scoring: one weighted path, two weight profiles.
//!
//! Both the semantic-enhanced and the lexical-only configurations share the
//! same sub-score computations; the profile only changes the weight table
//! ([`crate::config::ScoringWeights`]). That keeps the scorer a single code
//! path and makes the degrade rule trivial: when no embedder is available
//! the semantic weight is folded into keyword overlap and everything else
//! is untouched.
//!
//! Every sub-score is pre-normalized to [0,1] and total on any input — an
//! empty query, empty section text, or a zero-norm embedding produces 0,
//! never NaN.

use crate::config::{AnalysisConfig, ScoringWeights};
use crate::embed::{cosine_similarity, EmbeddingProvider};
use crate::pipeline::detect::{is_title_case, Section};
use crate::query::{tokenize, token_iter, Query};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::warn;

/// Per-sub-score components of one relevance score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub keyword: f64,
    pub jaccard: f64,
    pub quality: f64,
    pub richness: f64,
    pub length: f64,
    /// Present only when the semantic path ran for this section.
    pub semantic: Option<f64>,
}

/// A section paired with its relevance score; transient ranking state.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSection {
    pub section: Section,
    /// Weighted total in [0,1].
    pub relevance_score: f64,
    pub breakdown: ScoreBreakdown,
}

// ── Sub-scores ───────────────────────────────────────────────────────────

/// Keyword overlap: whole-word matches count double, substring matches single.
///
/// `(2·direct + partial) / (2·total)`, clamped to [0,1]; 0 when the keyword
/// set is empty. `text` must already be lowercased.
pub fn keyword_overlap(text: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let tokens = tokenize(text);
    let mut direct = 0usize;
    let mut partial = 0usize;
    for keyword in keywords {
        if tokens.contains(keyword.as_str()) {
            direct += 1;
        } else if text.contains(keyword.as_str()) {
            partial += 1;
        }
    }
    ((2 * direct + partial) as f64 / (2 * keywords.len()) as f64).clamp(0.0, 1.0)
}

/// Jaccard similarity over token sets; 0 when either set is empty.
pub fn jaccard_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// 1.0 inside `[lo, hi]`, tapering linearly below and hyperbolically above.
fn band(value: f64, lo: f64, hi: f64) -> f64 {
    if value <= 0.0 {
        0.0
    } else if value < lo {
        value / lo
    } else if value <= hi {
        1.0
    } else {
        hi / value
    }
}

/// Titles recognized as carrying structural signal.
const STRUCTURAL_KEYWORDS: &[&str] = &[
    "methodology",
    "results",
    "analysis",
    "findings",
    "evaluation",
    "overview",
    "guide",
    "recommendations",
];

// Generic boilerplate titles: penalized, never rewarded.
static RE_FILLER_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(introduction|conclusion|abstract|references|contents|index|appendix)\b")
        .unwrap()
});

/// Structural quality of a section: title length band, body length band,
/// title-case conformity, structural-keyword bonus, boilerplate penalty.
///
/// Monotonic in each direction: longer-toward-band titles and bodies score
/// higher, a structural keyword never lowers the score, a filler title never
/// raises it.
pub fn quality_score(title: &str, body_word_count: usize) -> f64 {
    let lower = title.to_lowercase();
    let title_band = band(title.chars().count() as f64, 15.0, 80.0);
    let body_band = band(body_word_count as f64, 50.0, 500.0);
    let case = if is_title_case(title) {
        1.0
    } else if title.chars().next().is_some_and(char::is_uppercase) {
        0.5
    } else {
        0.0
    };

    let mut score = (title_band + body_band + case) / 3.0;
    if STRUCTURAL_KEYWORDS.iter().any(|k| lower.contains(k)) {
        score += 0.15;
    }
    if RE_FILLER_TITLE.is_match(&lower) {
        score *= 0.6;
    }
    score.clamp(0.0, 1.0)
}

/// Vocabulary richness: unique tokens over total tokens; 0 for empty text.
pub fn content_richness(text: &str) -> f64 {
    let mut total = 0usize;
    let mut unique = BTreeSet::new();
    for token in token_iter(text) {
        total += 1;
        unique.insert(token.to_lowercase());
    }
    if total == 0 {
        0.0
    } else {
        unique.len() as f64 / total as f64
    }
}

/// Length optimization: full marks for 50–500 words, tapering outside.
pub fn length_score(word_count: usize) -> f64 {
    band(word_count as f64, 50.0, 500.0)
}

// ── Scorer ───────────────────────────────────────────────────────────────

/// Scores sections against one query under the active weight profile.
///
/// Resolves the profile, weight overrides, and embedder availability once at
/// construction; scoring itself is then per-section arithmetic.
pub struct Scorer<'a> {
    query: &'a Query,
    weights: ScoringWeights,
    embedder: Option<&'a dyn EmbeddingProvider>,
    query_embedding: Option<Vec<f32>>,
    warned_embed_failure: bool,
}

impl<'a> Scorer<'a> {
    pub fn new(query: &'a Query, config: &'a AnalysisConfig) -> Self {
        let mut weights = config.resolved_weights();
        let mut embedder = None;
        let mut query_embedding = None;

        if weights.semantic > 0.0 {
            match config.embedder.as_deref() {
                Some(provider) => match provider.embed(&query.combined) {
                    Ok(vector) => {
                        query_embedding = Some(vector);
                        embedder = Some(provider);
                    }
                    Err(e) => {
                        warn!("query embedding failed ({e}); falling back to lexical weighting");
                        weights = weights.without_semantic();
                    }
                },
                None => {
                    warn!(
                        "semantic profile selected but no embedding provider configured; \
                         falling back to lexical weighting"
                    );
                    weights = weights.without_semantic();
                }
            }
        }

        Self {
            query,
            weights,
            embedder,
            query_embedding,
            warned_embed_failure: false,
        }
    }

    /// The weight table actually in effect after any degrade.
    pub fn effective_weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Score one section. Consumes the section and returns it paired with
    /// its score and component breakdown.
    pub fn score_section(&mut self, section: Section) -> ScoredSection {
        let text = format!("{} {}", section.section_title, section.content).to_lowercase();

        let keyword = keyword_overlap(&text, &self.query.keywords);
        let jaccard = jaccard_similarity(self.query.tokens(), &tokenize(&text));
        let quality = quality_score(&section.section_title, section.word_count);
        let richness = content_richness(&text);
        let length = length_score(section.word_count);
        let (semantic, weights) = self.semantic_similarity(&text);

        let total = weights.semantic * semantic.unwrap_or(0.0)
            + weights.keyword * keyword
            + weights.jaccard * jaccard
            + weights.quality * quality
            + weights.richness * richness
            + weights.length * length;

        ScoredSection {
            section,
            relevance_score: total.clamp(0.0, 1.0),
            breakdown: ScoreBreakdown {
                keyword,
                jaccard,
                quality,
                richness,
                length,
                semantic,
            },
        }
    }

    /// Cosine similarity against the query embedding, clamped to [0,1].
    ///
    /// Returns the weight table to apply for this section: the configured
    /// one when the semantic path ran, the degraded one when this section's
    /// embedding call failed.
    fn semantic_similarity(&mut self, text: &str) -> (Option<f64>, ScoringWeights) {
        let (Some(provider), Some(query_vector)) = (self.embedder, self.query_embedding.as_ref())
        else {
            return (None, self.weights);
        };
        match provider.embed(text) {
            Ok(section_vector) => {
                let cos = cosine_similarity(query_vector, &section_vector).clamp(0.0, 1.0);
                (Some(cos), self.weights)
            }
            Err(e) => {
                if !self.warned_embed_failure {
                    warn!("section embedding failed ({e}); affected sections scored lexically");
                    self.warned_embed_failure = true;
                }
                (None, self.weights.without_semantic())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalysisConfig, ScoringProfile};
    use crate::embed::EmbedError;
    use crate::query::default_stopwords;
    use std::sync::Arc;

    fn section(title: &str, content: &str) -> Section {
        Section {
            document: "doc.pdf".into(),
            page_number: 1,
            section_title: title.into(),
            content: content.into(),
            word_count: content.split_whitespace().count(),
        }
    }

    // ── Sub-scores ───────────────────────────────────────────────────────

    #[test]
    fn keyword_overlap_counts_whole_words_double() {
        // 3 of 5 keywords present exactly once each, whole-word: (2·3+0)/(2·5).
        let keywords: Vec<String> = ["travel", "planner", "plan", "trip", "friends"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let text = "this trip is for friends who plan everything ahead";
        let score = keyword_overlap(text, &keywords);
        assert!((score - 0.6).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn keyword_overlap_counts_substrings_half() {
        let keywords = vec!["plan".to_string()];
        // "planning" contains "plan" but is not a whole-word match.
        let score = keyword_overlap("careful planning wins", &keywords);
        assert!((score - 0.5).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn keyword_overlap_empty_keywords_is_zero() {
        assert_eq!(keyword_overlap("anything at all", &[]), 0.0);
    }

    #[test]
    fn jaccard_basics() {
        let a = tokenize("the quick brown fox");
        let b = tokenize("the slow brown bear");
        // intersection {the, brown} = 2, union = 6.
        let score = jaccard_similarity(&a, &b);
        assert!((score - 2.0 / 6.0).abs() < 1e-9, "got {score}");
        assert_eq!(jaccard_similarity(&a, &tokenize("")), 0.0);
    }

    #[test]
    fn quality_rewards_band_and_penalizes_filler() {
        let good = quality_score("Regional Highlights Guide", 120);
        let filler = quality_score("Introduction", 120);
        assert!(good > filler, "good={good} filler={filler}");
        assert!((0.0..=1.0).contains(&good));
        assert!((0.0..=1.0).contains(&filler));
    }

    #[test]
    fn quality_monotonic_in_body_length() {
        let short = quality_score("Regional Highlights Guide", 10);
        let banded = quality_score("Regional Highlights Guide", 100);
        let long = quality_score("Regional Highlights Guide", 5000);
        assert!(banded > short);
        assert!(banded > long);
    }

    #[test]
    fn richness_and_length_degenerate_to_zero() {
        assert_eq!(content_richness(""), 0.0);
        assert_eq!(length_score(0), 0.0);
        let half = content_richness("one two one two");
        assert!((half - 0.5).abs() < 1e-9);
    }

    // ── Scorer ───────────────────────────────────────────────────────────

    #[test]
    fn lexical_scores_stay_in_unit_interval() {
        let cfg = AnalysisConfig::default();
        let query = Query::new(
            "Travel Planner",
            "Plan a 4-day trip for 10 friends",
            &default_stopwords(),
        );
        let mut scorer = Scorer::new(&query, &cfg);
        for (title, content) in [
            ("Coastal Adventures", "beaches coves and cliff walks for groups"),
            ("X", ""),
            (
                "Nightlife and Entertainment",
                "bars music venues and late night food markets for friends on a trip",
            ),
        ] {
            let scored = scorer.score_section(section(title, content));
            assert!(
                (0.0..=1.0).contains(&scored.relevance_score),
                "{title}: {}",
                scored.relevance_score
            );
            assert!(scored.relevance_score.is_finite());
        }
    }

    #[test]
    fn empty_query_scores_zero_keyword_and_jaccard() {
        let cfg = AnalysisConfig::default();
        let query = Query::new("", "", &default_stopwords());
        let mut scorer = Scorer::new(&query, &cfg);
        let scored = scorer.score_section(section("Coastal Adventures", "some content here"));
        assert_eq!(scored.breakdown.keyword, 0.0);
        assert_eq!(scored.breakdown.jaccard, 0.0);
        assert!(scored.relevance_score.is_finite());
    }

    #[test]
    fn semantic_profile_without_embedder_degrades() {
        let cfg = AnalysisConfig::builder()
            .profile(ScoringProfile::Semantic)
            .build()
            .unwrap();
        let query = Query::new("Researcher", "Survey methodology papers", &default_stopwords());
        let scorer = Scorer::new(&query, &cfg);
        let w = scorer.effective_weights();
        assert_eq!(w.semantic, 0.0);
        // Semantic weight folded into keyword: 0.30 + 0.50.
        assert!((w.keyword - 0.8).abs() < 1e-9, "got {}", w.keyword);
    }

    struct UnitEmbedder;
    impl EmbeddingProvider for UnitEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            // Deterministic toy embedding: letter histogram.
            let mut v = vec![0.0f32; 26];
            for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
                v[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
            }
            Ok(v)
        }
    }

    #[test]
    fn semantic_profile_with_embedder_scores_semantic_component() {
        let cfg = AnalysisConfig::builder()
            .profile(ScoringProfile::Semantic)
            .embedder(Arc::new(UnitEmbedder))
            .build()
            .unwrap();
        let query = Query::new("Travel Planner", "Plan a trip", &default_stopwords());
        let mut scorer = Scorer::new(&query, &cfg);
        assert!(scorer.effective_weights().semantic > 0.0);
        let scored = scorer.score_section(section("Trip Planning Guide", "plan a trip with friends"));
        let semantic = scored.breakdown.semantic.expect("semantic path must run");
        assert!((0.0..=1.0).contains(&semantic));
    }

    struct FailingEmbedder;
    impl EmbeddingProvider for FailingEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
            Err(EmbedError::Unavailable("model not loaded".into()))
        }
    }

    #[test]
    fn failing_embedder_degrades_at_construction() {
        let cfg = AnalysisConfig::builder()
            .profile(ScoringProfile::Semantic)
            .embedder(Arc::new(FailingEmbedder))
            .build()
            .unwrap();
        let query = Query::new("Analyst", "Compare quarterly metrics", &default_stopwords());
        let mut scorer = Scorer::new(&query, &cfg);
        assert_eq!(scorer.effective_weights().semantic, 0.0);
        let scored = scorer.score_section(section("Metrics Overview", "trends and comparisons"));
        assert!(scored.breakdown.semantic.is_none());
    }
}
