//! Top-level analysis entry points.
//!
//! [`analyze`] is the core operation: pure over already-loaded documents,
//! and total — it has no error path. A run where nothing is detected
//! returns an output with zero sections and zeroed score statistics; the
//! caller decides whether that constitutes failure. [`analyze_folder`]
//! composes the PDF loader in front of it, and [`write_output_file`]
//! persists the result as JSON with an atomic temp-file + rename.

use crate::config::AnalysisConfig;
use crate::error::SiftError;
use crate::output::{AnalysisOutput, AnalysisStats, RankedSection, RunMetadata};
use crate::pipeline::{detect, load, rank, refine, score};
use crate::query::Query;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Analyze a set of loaded documents against a persona and task.
///
/// Returns the ranked sections, derived subsections, run metadata, and
/// statistics. Deterministic: identical inputs and configuration produce
/// identical rankings (only the timestamp differs).
pub fn analyze(
    documents: &[load::Document],
    persona_role: &str,
    task: &str,
    config: &AnalysisConfig,
) -> AnalysisOutput {
    let start = Instant::now();

    // ── Step 1: Detect sections per document ─────────────────────────────
    let mut sections = Vec::new();
    for document in documents {
        let detected = detect::detect_sections(document, config);
        debug!("{}: {} sections", document.filename, detected.len());
        sections.extend(detected);
    }
    let sections_detected = sections.len();
    info!(
        "Detected {} sections across {} documents",
        sections_detected,
        documents.len()
    );

    // ── Step 2: Build the query ──────────────────────────────────────────
    let query = Query::new(persona_role, task, &config.stopwords);
    debug!("Query keywords: {:?}", query.keywords);

    // ── Step 3: Score every section ──────────────────────────────────────
    let mut scorer = score::Scorer::new(&query, config);
    let scored: Vec<score::ScoredSection> = sections
        .into_iter()
        .map(|section| scorer.score_section(section))
        .collect();

    // ── Step 4: Rank and select ──────────────────────────────────────────
    let selected = rank::rank_sections(scored, config.max_sections);

    // ── Step 5: Derive subsections ───────────────────────────────────────
    let subsections = refine::derive_subsections(&selected, config.max_subsections);

    // ── Step 6: Assemble output and stats ────────────────────────────────
    let extracted_sections: Vec<RankedSection> = selected
        .iter()
        .enumerate()
        .map(|(i, scored)| RankedSection {
            document: scored.section.document.clone(),
            page_number: scored.section.page_number,
            section_title: scored.section.section_title.clone(),
            importance_rank: i as u32 + 1,
            relevance_score: scored.relevance_score,
        })
        .collect();

    let scores: Vec<f64> = selected.iter().map(|s| s.relevance_score).collect();
    let (score_min, score_max, score_mean) = if scores.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        (
            scores.iter().copied().fold(f64::INFINITY, f64::min),
            scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            scores.iter().sum::<f64>() / scores.len() as f64,
        )
    };
    let stats = AnalysisStats {
        documents: documents.len(),
        pages: documents.iter().map(|d| d.pages.len()).sum(),
        sections_detected,
        sections_selected: selected.len(),
        subsections: subsections.len(),
        score_min,
        score_max,
        score_mean,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Selected {}/{} sections in {}ms",
        stats.sections_selected, stats.sections_detected, stats.duration_ms
    );

    AnalysisOutput {
        metadata: RunMetadata {
            input_documents: documents.iter().map(|d| d.filename.clone()).collect(),
            persona: persona_role.to_string(),
            job_to_be_done: task.to_string(),
            processing_timestamp: chrono::Utc::now().to_rfc3339(),
        },
        extracted_sections,
        subsection_analysis: subsections,
        stats,
    }
}

/// Load every readable PDF in `folder`, then [`analyze`] the collection.
///
/// # Errors
/// Fatal only when the folder itself is missing or unlistable; individual
/// bad documents are skipped by the loader.
pub fn analyze_folder(
    folder: &Path,
    persona_role: &str,
    task: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, SiftError> {
    info!("Analyzing PDFs in {}", folder.display());
    let documents = load::load_documents(folder)?;
    Ok(analyze(&documents, persona_role, task, config))
}

/// Serialize an analysis result to pretty JSON at `path`.
///
/// Uses atomic write (temp file + rename) so a crash mid-write never leaves
/// a truncated output file behind.
pub fn write_output_file(output: &AnalysisOutput, path: &Path) -> Result<(), SiftError> {
    let write_err = |source: std::io::Error| SiftError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(output)
        .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json).map_err(write_err)?;
    std::fs::rename(&tmp_path, path).map_err(write_err)?;
    Ok(())
}
