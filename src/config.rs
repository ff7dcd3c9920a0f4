//! Configuration types for persona-driven section analysis.
//!
//! All analysis behaviour is controlled through [`AnalysisConfig`], built
//! via its [`AnalysisConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share a config across a run, log it, and diff two runs to
//! understand why their rankings differ.
//!
//! The detector's pattern lists and word sets live in
//! [`crate::pipeline::detect::DetectorRules`], carried *inside* the config
//! rather than as module constants, so tests can substitute minimal
//! fixtures and deployments can tune the empirically derived defaults.

use crate::embed::EmbeddingProvider;
use crate::error::SiftError;
use crate::pipeline::detect::DetectorRules;
use crate::query::default_stopwords;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Which weight profile drives the relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScoringProfile {
    /// Semantic similarity 50%, keyword 30%, structural 15%, length 5%.
    /// Requires an embedder; degrades to lexical weighting without one.
    Semantic,
    /// Keyword 40%, Jaccard 30%, quality 20%, richness 10%. (default)
    #[default]
    Lexical,
}

/// Weight table applied to the scorer's sub-scores.
///
/// Each profile is a preset of this table; callers can also override the
/// table wholesale via [`AnalysisConfigBuilder::weights`]. Weights are
/// expected to sum to roughly 1.0 since the final score is clamped to
/// [0,1], but any non-negative table with a positive sum is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub semantic: f64,
    pub keyword: f64,
    pub jaccard: f64,
    pub quality: f64,
    pub richness: f64,
    pub length: f64,
}

impl ScoringWeights {
    /// Preset for [`ScoringProfile::Semantic`].
    pub fn semantic_profile() -> Self {
        Self {
            semantic: 0.50,
            keyword: 0.30,
            jaccard: 0.0,
            quality: 0.15,
            richness: 0.0,
            length: 0.05,
        }
    }

    /// Preset for [`ScoringProfile::Lexical`].
    pub fn lexical_profile() -> Self {
        Self {
            semantic: 0.0,
            keyword: 0.40,
            jaccard: 0.30,
            quality: 0.20,
            richness: 0.10,
            length: 0.0,
        }
    }

    /// Fold the semantic weight into keyword overlap (the degrade rule).
    pub fn without_semantic(mut self) -> Self {
        self.keyword += self.semantic;
        self.semantic = 0.0;
        self
    }

    fn validate(&self) -> Result<(), String> {
        let all = [
            self.semantic,
            self.keyword,
            self.jaccard,
            self.quality,
            self.richness,
            self.length,
        ];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("weights must be finite and non-negative".into());
        }
        if all.iter().sum::<f64>() <= 0.0 {
            return Err("at least one weight must be positive".into());
        }
        Ok(())
    }
}

/// Configuration for one analysis run.
///
/// Built via [`AnalysisConfig::builder()`] or [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use docsift::{AnalysisConfig, ScoringProfile};
///
/// let config = AnalysisConfig::builder()
///     .max_sections(10)
///     .profile(ScoringProfile::Lexical)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Minimum cleaned content length (characters) for a section to be
    /// emitted. Default: 50.
    ///
    /// Anything shorter is almost always a false-positive header (a stray
    /// short line that happened to be followed by a little text). Dropping
    /// these silently is expected detector noise, not an error.
    pub min_content_length: usize,

    /// Content-scan budget per section, in characters. Default: 200.
    ///
    /// The forward scan stops once accumulated content passes this cap, so
    /// a section body is the first ~200 characters of prose after its
    /// header. The subsection refiner works within the same order of
    /// magnitude, so scanning further would only be discarded later.
    pub max_section_chars: usize,

    /// Maximum sections in the final ranking. Default: 15.
    pub max_sections: usize,

    /// Maximum subsection excerpts derived from the ranking. Default: 10.
    pub max_subsections: usize,

    /// Active weight profile. Default: [`ScoringProfile::Lexical`].
    pub profile: ScoringProfile,

    /// Explicit weight table overriding the profile preset.
    pub weights: Option<ScoringWeights>,

    /// Detector pattern lists, word sets, and thresholds.
    pub rules: DetectorRules,

    /// Stopwords excluded from query keyword extraction.
    pub stopwords: BTreeSet<String>,

    /// Optional embedding provider for the semantic profile.
    pub embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_content_length: 50,
            max_section_chars: 200,
            max_sections: 15,
            max_subsections: 10,
            profile: ScoringProfile::default(),
            weights: None,
            rules: DetectorRules::default(),
            stopwords: default_stopwords(),
            embedder: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("min_content_length", &self.min_content_length)
            .field("max_section_chars", &self.max_section_chars)
            .field("max_sections", &self.max_sections)
            .field("max_subsections", &self.max_subsections)
            .field("profile", &self.profile)
            .field("weights", &self.weights)
            .field("stopwords", &self.stopwords.len())
            .field(
                "embedder",
                &self.embedder.as_ref().map(|_| "<dyn EmbeddingProvider>"),
            )
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }

    /// The weight table in effect: explicit override, else profile preset.
    pub fn resolved_weights(&self) -> ScoringWeights {
        self.weights.unwrap_or_else(|| match self.profile {
            ScoringProfile::Semantic => ScoringWeights::semantic_profile(),
            ScoringProfile::Lexical => ScoringWeights::lexical_profile(),
        })
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn min_content_length(mut self, chars: usize) -> Self {
        self.config.min_content_length = chars.max(1);
        self
    }

    pub fn max_section_chars(mut self, chars: usize) -> Self {
        self.config.max_section_chars = chars.max(1);
        self
    }

    pub fn max_sections(mut self, n: usize) -> Self {
        self.config.max_sections = n.max(1);
        self
    }

    pub fn max_subsections(mut self, n: usize) -> Self {
        self.config.max_subsections = n.max(1);
        self
    }

    pub fn profile(mut self, profile: ScoringProfile) -> Self {
        self.config.profile = profile;
        self
    }

    pub fn weights(mut self, weights: ScoringWeights) -> Self {
        self.config.weights = Some(weights);
        self
    }

    pub fn rules(mut self, rules: DetectorRules) -> Self {
        self.config.rules = rules;
        self
    }

    pub fn stopwords(mut self, stopwords: impl IntoIterator<Item = String>) -> Self {
        self.config.stopwords = stopwords.into_iter().collect();
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.config.embedder = Some(embedder);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, SiftError> {
        let c = &self.config;
        if c.max_sections == 0 {
            return Err(SiftError::InvalidConfig("max_sections must be ≥ 1".into()));
        }
        if c.min_content_length == 0 {
            return Err(SiftError::InvalidConfig(
                "min_content_length must be ≥ 1".into(),
            ));
        }
        if let Some(weights) = &c.weights {
            weights.validate().map_err(SiftError::InvalidConfig)?;
        }
        Ok(self.config)
    }
}

// ── Run specification (input JSON) ───────────────────────────────────────

/// A named input document in a [`RunSpec`]. Advisory metadata only; the
/// loader reads whatever PDFs the folder actually contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// The persona block of a run-spec file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaSpec {
    pub role: String,
}

/// The job-to-be-done block of a run-spec file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub task: String,
}

/// A JSON run specification:
///
/// ```json
/// {
///   "documents": [{"filename": "guide.pdf", "title": "City Guide"}],
///   "persona": {"role": "Travel Planner"},
///   "job_to_be_done": {"task": "Plan a 4-day trip for 10 friends"}
/// }
/// ```
///
/// Unknown fields are ignored, so annotated collection files parse as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSpec {
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
    #[serde(default)]
    pub persona: Option<PersonaSpec>,
    #[serde(default)]
    pub job_to_be_done: Option<JobSpec>,
}

impl RunSpec {
    pub fn persona_role(&self) -> Option<&str> {
        self.persona.as_ref().map(|p| p.role.as_str())
    }

    pub fn task(&self) -> Option<&str> {
        self.job_to_be_done.as_ref().map(|j| j.task.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AnalysisConfig::builder().build().unwrap();
        assert_eq!(config.min_content_length, 50);
        assert_eq!(config.max_sections, 15);
        assert_eq!(config.max_subsections, 10);
        assert_eq!(config.profile, ScoringProfile::Lexical);
    }

    #[test]
    fn builder_clamps_to_minimums() {
        let config = AnalysisConfig::builder()
            .max_sections(0)
            .min_content_length(0)
            .build()
            .unwrap();
        assert_eq!(config.max_sections, 1);
        assert_eq!(config.min_content_length, 1);
    }

    #[test]
    fn negative_weight_overrides_are_rejected() {
        let err = AnalysisConfig::builder()
            .weights(ScoringWeights {
                keyword: -1.0,
                ..ScoringWeights::lexical_profile()
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, SiftError::InvalidConfig(_)));
    }

    #[test]
    fn all_zero_weights_are_rejected() {
        let zero = ScoringWeights {
            semantic: 0.0,
            keyword: 0.0,
            jaccard: 0.0,
            quality: 0.0,
            richness: 0.0,
            length: 0.0,
        };
        assert!(AnalysisConfig::builder().weights(zero).build().is_err());
    }

    #[test]
    fn profile_presets_resolve() {
        let lexical = AnalysisConfig::default().resolved_weights();
        assert_eq!(lexical, ScoringWeights::lexical_profile());

        let semantic = AnalysisConfig::builder()
            .profile(ScoringProfile::Semantic)
            .build()
            .unwrap()
            .resolved_weights();
        assert_eq!(semantic, ScoringWeights::semantic_profile());
    }

    #[test]
    fn degrade_folds_semantic_into_keyword() {
        let w = ScoringWeights::semantic_profile().without_semantic();
        assert_eq!(w.semantic, 0.0);
        assert!((w.keyword - 0.8).abs() < 1e-9);
    }

    #[test]
    fn run_spec_parses_full_input() {
        let json = r#"{
            "collection_info": {"name": "coastal trip"},
            "documents": [{"filename": "south.pdf", "title": "South of France"}],
            "persona": {"role": "Travel Planner"},
            "job_to_be_done": {"task": "Plan a 4-day trip for 10 friends"}
        }"#;
        let spec: RunSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.persona_role(), Some("Travel Planner"));
        assert_eq!(spec.task(), Some("Plan a 4-day trip for 10 friends"));
        assert_eq!(spec.documents.len(), 1);
        assert_eq!(spec.documents[0].title.as_deref(), Some("South of France"));
    }

    #[test]
    fn run_spec_tolerates_missing_blocks() {
        let spec: RunSpec = serde_json::from_str("{}").unwrap();
        assert!(spec.persona_role().is_none());
        assert!(spec.task().is_none());
        assert!(spec.documents.is_empty());
    }
}
