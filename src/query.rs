//! Query derivation: turn a persona role and task into scoring inputs.
//!
//! The persona ("Travel Planner") and job-to-be-done ("Plan a 4-day trip for
//! 10 friends") are combined once, up front, into three read-only views used
//! by every scoring call:
//!
//! 1. a keyword list (lowercased, stopword-filtered, deduplicated) for the
//!    keyword-overlap sub-score,
//! 2. a token set for Jaccard similarity,
//! 3. the combined `"role: task"` string handed to the optional embedder.
//!
//! The [`Query`] is immutable for the duration of a run; stages share it by
//! reference and never mutate it.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Words excluded from the derived keyword set.
///
/// Injected through [`crate::config::AnalysisConfig::stopwords`] so tests can
/// substitute a minimal fixture; this is only the default.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "an", "the", "of", "for", "with", "from", "into", "and", "or", "to", "in", "on", "by",
    "at", "as", "is", "are", "be", "was", "were", "this", "that", "those", "these", "it", "they",
    "them", "you", "your", "his", "her", "he", "she", "we", "our", "us",
];

/// Build the default stopword set.
pub fn default_stopwords() -> BTreeSet<String> {
    DEFAULT_STOPWORDS.iter().map(|w| (*w).to_string()).collect()
}

// Keywords are alphabetic runs of 4+ letters; shorter words carry too little
// signal to be worth matching ("a 4-day trip" should contribute "trip", not
// "day").
static RE_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]{4,}").unwrap());

static RE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9]+").unwrap());

/// Iterate the raw alphanumeric tokens of `text`, in order, case preserved.
pub(crate) fn token_iter(text: &str) -> impl Iterator<Item = &str> {
    RE_TOKEN.find_iter(text).map(|m| m.as_str())
}

/// The lowercased token set of `text`, for set-based similarity.
pub(crate) fn tokenize(text: &str) -> BTreeSet<String> {
    token_iter(text).map(|t| t.to_lowercase()).collect()
}

/// Extract the query keyword list: lowercased, stopword-filtered,
/// deduplicated, first-occurrence order.
pub fn extract_keywords(text: &str, stopwords: &BTreeSet<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut keywords = Vec::new();
    for m in RE_KEYWORD.find_iter(text) {
        let word = m.as_str().to_lowercase();
        if stopwords.contains(&word) {
            continue;
        }
        if seen.insert(word.clone()) {
            keywords.push(word);
        }
    }
    keywords
}

/// The persona + task pair, with its derived scoring views.
///
/// Immutable once built; the only cross-cutting state of a run.
#[derive(Debug, Clone)]
pub struct Query {
    /// Role description biasing relevance, e.g. "Travel Planner".
    pub persona_role: String,
    /// The job-to-be-done text.
    pub task: String,
    /// `"role: task"`, the text embedded for semantic scoring.
    pub combined: String,
    /// Stopword-filtered keywords for the overlap sub-score.
    pub keywords: Vec<String>,
    tokens: BTreeSet<String>,
}

impl Query {
    pub fn new(persona_role: &str, task: &str, stopwords: &BTreeSet<String>) -> Self {
        let combined = format!("{persona_role}: {task}");
        let keywords = extract_keywords(&combined, stopwords);
        let tokens = tokenize(&combined);
        Self {
            persona_role: persona_role.to_string(),
            task: task.to_string(),
            combined,
            keywords,
            tokens,
        }
    }

    /// Lowercased token set of the combined query, for Jaccard similarity.
    pub fn tokens(&self) -> &BTreeSet<String> {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_planner_keywords() {
        let q = Query::new(
            "Travel Planner",
            "Plan a 4-day trip for 10 friends",
            &default_stopwords(),
        );
        for expected in ["travel", "planner", "plan", "trip", "friends"] {
            assert!(
                q.keywords.iter().any(|k| k == expected),
                "missing keyword {expected:?} in {:?}",
                q.keywords
            );
        }
        // "day" (3 letters) and stopwords must not survive.
        assert!(!q.keywords.iter().any(|k| k == "day"));
        assert!(!q.keywords.iter().any(|k| k == "for"));
        assert_eq!(q.keywords.len(), 5);
    }

    #[test]
    fn keywords_deduplicated_in_first_occurrence_order() {
        let kws = extract_keywords("Budget budget BUDGET hotels budget", &default_stopwords());
        assert_eq!(kws, vec!["budget", "hotels"]);
    }

    #[test]
    fn empty_query_has_no_keywords() {
        let q = Query::new("", "", &default_stopwords());
        assert!(q.keywords.is_empty());
        assert!(q.tokens().is_empty());
    }

    #[test]
    fn tokenize_lowercases_and_splits_on_punctuation() {
        let tokens = tokenize("Plan: a 4-day trip!");
        assert!(tokens.contains("plan"));
        assert!(tokens.contains("4"));
        assert!(tokens.contains("day"));
        assert!(tokens.contains("trip"));
        assert!(!tokens.contains("Plan"));
    }
}
