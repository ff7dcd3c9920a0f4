//! Subsection refinement: sentence-bounded excerpts of top sections.
//!
//! Short content passes through verbatim; longer content is cut at sentence
//! boundaries so the excerpt reads as prose, with a word-safe truncation
//! fallback when the text has no usable sentence structure (tables of
//! fragments, bullet dumps). The function is pure: the same section always
//! yields byte-identical refined text.

use crate::output::SubsectionAnalysis;
use crate::pipeline::score::ScoredSection;

/// Content at or under this length is used verbatim.
const VERBATIM_MAX_CHARS: usize = 300;
/// Target excerpt length when selecting sentences or truncating.
const EXCERPT_TARGET_CHARS: usize = 200;
/// Sentence budget for the greedy selection.
const MAX_SENTENCES: usize = 3;
/// Hard cap applied to the serialized refined text.
const REFINED_TEXT_MAX_CHARS: usize = 500;

/// Split at whitespace that follows `.`, `!` or `?`. Keeps the terminator
/// with its sentence; trims each piece; drops empties.
pub(crate) fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut prev_terminal = false;
    for (i, ch) in text.char_indices() {
        if prev_terminal && ch.is_whitespace() {
            let piece = text[start..i].trim();
            if !piece.is_empty() {
                sentences.push(piece);
            }
            start = i;
        }
        prev_terminal = matches!(ch, '.' | '!' | '?');
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Cut `text` to at most `max_chars` characters, backing up to the last
/// whitespace so no word is split mid-token.
fn truncate_at_word(text: &str, max_chars: usize) -> String {
    let mut end = text.len();
    for (count, (idx, _)) in text.char_indices().enumerate() {
        if count == max_chars {
            end = idx;
            break;
        }
    }
    if end == text.len() {
        return text.trim_end().to_string();
    }
    let slice = &text[..end];
    match slice.rfind(char::is_whitespace) {
        Some(pos) => slice[..pos].trim_end().to_string(),
        None => slice.to_string(),
    }
}

/// Produce the refined excerpt for one section's content.
pub fn refine_content(content: &str) -> String {
    let content = content.trim();
    if content.chars().count() <= VERBATIM_MAX_CHARS {
        return content.to_string();
    }

    let sentences = split_sentences(content);
    if sentences.len() < 2 {
        return truncate_at_word(content, EXCERPT_TARGET_CHARS);
    }

    let mut excerpt = String::new();
    for (taken, sentence) in sentences.iter().enumerate() {
        if !excerpt.is_empty() {
            excerpt.push(' ');
        }
        excerpt.push_str(sentence);
        if taken + 1 == MAX_SENTENCES || excerpt.chars().count() > EXCERPT_TARGET_CHARS {
            break;
        }
    }
    excerpt
}

/// Derive subsection records from the selected sections, in rank order.
pub fn derive_subsections(
    selected: &[ScoredSection],
    max_subsections: usize,
) -> Vec<SubsectionAnalysis> {
    selected
        .iter()
        .take(max_subsections)
        .map(|scored| SubsectionAnalysis {
            document: scored.section.document.clone(),
            page_number: scored.section.page_number,
            refined_text: truncate_at_word(
                &refine_content(&scored.section.content),
                REFINED_TEXT_MAX_CHARS,
            ),
            source_section: scored.section.section_title.clone(),
        })
        .collect()
}
