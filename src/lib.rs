//! # docsift
//!
//! Extract and rank the most relevant sections of a PDF collection for a
//! persona and a job-to-be-done.
//!
//! ## Why this crate?
//!
//! A folder of PDFs is a terrible interface for a person with a concrete
//! task. "Plan a 4-day trip for 10 friends" should surface the itinerary
//! and logistics sections of a travel guide, not its typography credits.
//! docsift reads the plain text of every page, detects structurally
//! plausible section headers with a chain of cheap heuristics, scores each
//! section against the persona+task query with a weighted blend of lexical
//! and structural signals, and returns a deterministic, diversity-capped
//! ranking plus sentence-bounded excerpts of the winners.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF folder
//!  │
//!  ├─ 1. Load    per-page plain text via pdfium (bad files skipped)
//!  ├─ 2. Detect  header heuristics → Section records per document
//!  ├─ 3. Score   keyword / Jaccard / structural (+ optional embeddings)
//!  ├─ 4. Rank    sort, per-document diversity cap, top-N selection
//!  ├─ 5. Refine  sentence-bounded excerpts of the top sections
//!  └─ 6. Output  ranked sections + subsection analysis + run stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docsift::{analyze_folder, AnalysisConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AnalysisConfig::default();
//!     let output = analyze_folder(
//!         "guides/".as_ref(),
//!         "Travel Planner",
//!         "Plan a 4-day trip for 10 friends",
//!         &config,
//!     )?;
//!     for section in &output.extracted_sections {
//!         println!("{:>2}. {} (p.{}, {})",
//!             section.importance_rank,
//!             section.section_title,
//!             section.page_number,
//!             section.document);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! No PDFs are required to use the core: [`analyze`] consumes plain
//! [`Document`] values, so callers with their own text extraction (or test
//! fixtures) can skip the loader entirely.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docsift` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! docsift = { version = "0.3", default-features = false }
//! ```
//!
//! ## Scoring Profiles
//!
//! | Profile | Weights | Needs embedder |
//! |---------|---------|----------------|
//! | `Lexical` (default) | keyword 40% / Jaccard 30% / quality 20% / richness 10% | no |
//! | `Semantic` | semantic 50% / keyword 30% / structural 15% / length 5% | yes (degrades to lexical weighting otherwise) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod embed;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod query;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze, analyze_folder, write_output_file};
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, RunSpec, ScoringProfile, ScoringWeights,
};
pub use embed::{cosine_similarity, EmbedError, EmbeddingProvider};
pub use error::{DocumentError, SiftError};
pub use output::{AnalysisOutput, AnalysisStats, RankedSection, RunMetadata, SubsectionAnalysis};
pub use pipeline::detect::{DetectorRules, Section};
pub use pipeline::load::{load_documents, Document, Page};
pub use pipeline::score::{ScoreBreakdown, ScoredSection};
pub use query::Query;
