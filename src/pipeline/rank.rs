//! Ranking and selection: deterministic order, document diversity, top-N.
//!
//! Ordering is fully specified so reruns are byte-identical: score
//! descending, then earlier page number, then original insertion order
//! (documents are scored in load order and `sort_by` is stable).
//!
//! The diversity cap keeps one verbose document from monopolizing the
//! output: with `d` contributing documents and a budget of `m` sections, no
//! document may place more than `max(1, m / d)` sections. Quota-exceeded
//! sections are skipped, not discarded — a later, lower-scored section from
//! an under-represented document can still fill the budget.

use crate::pipeline::score::ScoredSection;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Sort all scored sections and select the top `max_sections` under the
/// per-document diversity cap. Returns the selection in final rank order.
pub fn rank_sections(mut scored: Vec<ScoredSection>, max_sections: usize) -> Vec<ScoredSection> {
    scored.sort_by(|a, b| {
        b.relevance_score
            .total_cmp(&a.relevance_score)
            .then_with(|| a.section.page_number.cmp(&b.section.page_number))
    });

    let unique_docs: BTreeSet<&str> = scored
        .iter()
        .map(|s| s.section.document.as_str())
        .collect();
    if unique_docs.is_empty() {
        return Vec::new();
    }
    let per_doc_limit = (max_sections / unique_docs.len()).max(1);
    debug!(
        "Selecting up to {} sections from {} documents ({} per document)",
        max_sections,
        unique_docs.len(),
        per_doc_limit
    );

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut selected = Vec::with_capacity(max_sections.min(scored.len()));

    for item in scored {
        if selected.len() == max_sections {
            break;
        }
        let used = counts.entry(item.section.document.clone()).or_insert(0);
        if *used >= per_doc_limit {
            continue;
        }
        *used += 1;
        selected.push(item);
    }

    selected
}
