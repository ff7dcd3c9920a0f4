//! Output model: the serialized result of one analysis run.
//!
//! Everything here derives `Serialize`/`Deserialize` so callers can write
//! the result as JSON (the CLI does), feed it to downstream tooling, or
//! round-trip it in tests. Field names follow the established result shape:
//! `metadata` / `extracted_sections` / `subsection_analysis`, plus a `stats`
//! block for run accounting.

use serde::{Deserialize, Serialize};

/// Run-level metadata echoed into the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Filenames of the documents that contributed to this run.
    pub input_documents: Vec<String>,
    /// The persona role string as given.
    pub persona: String,
    /// The job-to-be-done text as given.
    pub job_to_be_done: String,
    /// RFC 3339 timestamp taken when the run completed.
    pub processing_timestamp: String,
}

/// One selected section with its final rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSection {
    pub document: String,
    pub page_number: u32,
    pub section_title: String,
    /// 1-based position in the final ranking.
    pub importance_rank: u32,
    pub relevance_score: f64,
}

/// A refined excerpt derived from one top-ranked section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub page_number: u32,
    pub refined_text: String,
    /// Title of the section the excerpt was taken from.
    pub source_section: String,
}

/// Counters and score statistics for one run.
///
/// Score statistics cover the *selected* sections; all three are 0.0 when
/// nothing was selected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub documents: usize,
    pub pages: usize,
    pub sections_detected: usize,
    pub sections_selected: usize,
    pub subsections: usize,
    pub score_min: f64,
    pub score_max: f64,
    pub score_mean: f64,
    pub duration_ms: u64,
}

/// The complete result of [`crate::analyze::analyze`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub metadata: RunMetadata,
    pub extracted_sections: Vec<RankedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
    pub stats: AnalysisStats,
}
