//! Section detection: find structurally plausible headers in raw page text.
//!
//! Page text from pdfium is a loose stack of lines with no markup, so header
//! detection is a chain of cheap rejection/acceptance rules rather than a
//! grammar. The rules run short-circuit, in a fixed order, and each one is a
//! standalone function with its own tests:
//!
//! 1. reject lines outside the 3–100 character band
//! 2. reject lines starting with a continuation word ("to ", "and ", …)
//! 3. reject lines ending with a dangling connective ("… and", "… with", …)
//! 4. reject lines whose first character is not uppercase
//! 5. accept lines matching one of the fixed header patterns
//! 6. otherwise accept via the token fallback (short / title-cased /
//!    marker-keyword lines)
//!
//! A candidate is only *confirmed* when it is followed by enough prose and
//! the next line does not itself look like a header. False positives that
//! slip through are expected noise: their content is short and the final
//! length gate drops them silently.
//!
//! Every pattern list, word set, and threshold lives in [`DetectorRules`]
//! rather than module constants, so tests can substitute minimal fixtures
//! and deployments can tune the empirically derived defaults.

use crate::config::AnalysisConfig;
use crate::pipeline::load::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// A contiguous block of document text introduced by a detected header line.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Filename of the source document.
    pub document: String,
    /// 1-based page the header appears on.
    pub page_number: u32,
    /// The confirmed header line, trimmed.
    pub section_title: String,
    /// Cleaned body text following the header.
    pub content: String,
    /// Whitespace-delimited word count of `content`.
    pub word_count: usize,
}

/// All tunable data consumed by the detector.
///
/// The defaults are inherited from empirical tuning on real document
/// collections; they are starting points, not correctness requirements.
#[derive(Debug, Clone)]
pub struct DetectorRules {
    /// Minimum header line length in characters.
    pub min_line_chars: usize,
    /// Maximum header line length in characters.
    pub max_line_chars: usize,
    /// Lowercased prefixes (with trailing space) marking mid-sentence fragments.
    pub continuation_prefixes: Vec<String>,
    /// Lowercased suffixes (with leading space) marking trailing fragments.
    pub dangling_suffixes: Vec<String>,
    /// Full-line header shapes, tried before the token fallback.
    pub header_patterns: Vec<Regex>,
    /// Lowercased nouns that flag short lines as probable headers.
    pub marker_keywords: Vec<String>,
    /// Lowercased prefixes that let a capitalized next line still count as prose.
    pub determiner_prefixes: Vec<String>,
    /// Lowercased prefixes that stop the header-like test during content scans.
    pub content_stop_prefixes: Vec<String>,
    /// Token-fallback: max words for the title-cased acceptance.
    pub title_fallback_max_words: usize,
    /// Token-fallback: max words for the bare short-line acceptance.
    pub short_line_max_words: usize,
    /// Token-fallback: max words for the marker-keyword acceptance.
    pub marker_max_words: usize,
    /// Confirmation: minimum words of following prose.
    pub confirm_min_words: usize,
    /// Confirmation: how many lines of following prose to inspect.
    pub confirm_lookahead_lines: usize,
    /// Content scan: how many lines after the header to consider.
    pub content_scan_lines: usize,
    /// A line longer than this that is title-cased/all-caps looks like a header.
    pub header_like_min_chars: usize,
}

impl Default for DetectorRules {
    fn default() -> Self {
        let header_patterns = [
            // Capitalized title case.
            r"^[A-Z][A-Za-z\s]{15,80}$",
            // All caps.
            r"^[A-Z][A-Z\s]{8,60}$",
            // Qualified title.
            r"^(Comprehensive|Complete|Ultimate|General|Essential)\s+[A-Za-z\s]{10,50}$",
            // Chapter/Section/Part N: Title.
            r"^(Chapter|Section|Part)\s+\d+:?\s*[A-Z][A-Za-z\s]{5,50}$",
            // Numbered outline.
            r"^\d+(\.\d+)*\s+[A-Z][A-Za-z\s]{10,60}$",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("built-in header pattern must compile"))
        .collect();

        Self {
            min_line_chars: 3,
            max_line_chars: 100,
            continuation_prefixes: to_strings(&[
                "to ", "for ", "with ", "during ", "whether ", "and ", "or ", "but ",
            ]),
            dangling_suffixes: to_strings(&[
                " and", " or", " with", " to", " for", " of", " in", " on",
            ]),
            header_patterns,
            marker_keywords: to_strings(&[
                "guide",
                "tips",
                "adventures",
                "experiences",
                "highlights",
                "delights",
            ]),
            determiner_prefixes: to_strings(&["the ", "this ", "it ", "you "]),
            content_stop_prefixes: to_strings(&["the ", "this ", "it ", "you ", "a ", "an "]),
            title_fallback_max_words: 20,
            short_line_max_words: 15,
            marker_max_words: 12,
            confirm_min_words: 15,
            confirm_lookahead_lines: 4,
            content_scan_lines: 14,
            header_like_min_chars: 15,
        }
    }
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

// ── Character-class helpers ──────────────────────────────────────────────

/// Every alphabetic word starts uppercase and continues lowercase.
pub(crate) fn is_title_case(s: &str) -> bool {
    let mut has_word = false;
    for word in s.split(|c: char| !c.is_alphabetic()) {
        if word.is_empty() {
            continue;
        }
        has_word = true;
        let mut chars = word.chars();
        match chars.next() {
            Some(first) if first.is_uppercase() => {}
            _ => return false,
        }
        if chars.any(|c| c.is_uppercase()) {
            return false;
        }
    }
    has_word
}

/// At least one letter and no lowercase letters.
pub(crate) fn is_all_caps(s: &str) -> bool {
    let mut has_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            has_alpha = true;
            if c.is_lowercase() {
                return false;
            }
        }
    }
    has_alpha
}

fn starts_with_any(lower: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|p| lower.starts_with(p.as_str()))
}

fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

// ── Rule 1: length band ──────────────────────────────────────────────────

fn rejects_length(line: &str, rules: &DetectorRules) -> bool {
    let chars = line.chars().count();
    chars < rules.min_line_chars || chars > rules.max_line_chars
}

// ── Rule 2: continuation-word start ──────────────────────────────────────

fn rejects_continuation_start(line: &str, rules: &DetectorRules) -> bool {
    starts_with_any(&line.to_lowercase(), &rules.continuation_prefixes)
}

// ── Rule 3: dangling-connective end ──────────────────────────────────────

fn rejects_dangling_end(line: &str, rules: &DetectorRules) -> bool {
    let lower = line.to_lowercase();
    rules
        .dangling_suffixes
        .iter()
        .any(|s| lower.ends_with(s.as_str()))
}

// ── Rule 4: capitalized start ────────────────────────────────────────────

fn rejects_lowercase_start(line: &str) -> bool {
    !line.chars().next().is_some_and(char::is_uppercase)
}

// ── Rule 5: fixed header patterns ────────────────────────────────────────

fn matches_header_pattern(line: &str, rules: &DetectorRules) -> bool {
    rules.header_patterns.iter().any(|re| re.is_match(line))
}

// ── Rule 6: token fallback ───────────────────────────────────────────────

fn matches_token_fallback(line: &str, rules: &DetectorRules) -> bool {
    let words = word_count(line);

    if words <= rules.title_fallback_max_words
        && is_title_case(line)
        && !line.ends_with('.')
        && !line.starts_with(['•', '-', '*'])
    {
        return true;
    }

    if words <= rules.short_line_max_words {
        return true;
    }

    // Reachable when short_line_max_words is tuned below marker_max_words.
    if words <= rules.marker_max_words {
        let lower = line.to_lowercase();
        if rules
            .marker_keywords
            .iter()
            .any(|k| lower.contains(k.as_str()))
        {
            return true;
        }
    }

    false
}

/// Run the ordered candidate rules over a trimmed, non-empty line.
pub fn is_header_candidate(line: &str, rules: &DetectorRules) -> bool {
    if rejects_length(line, rules) {
        return false;
    }
    if rejects_continuation_start(line, rules) {
        return false;
    }
    if rejects_dangling_end(line, rules) {
        return false;
    }
    if rejects_lowercase_start(line) {
        return false;
    }
    matches_header_pattern(line, rules) || matches_token_fallback(line, rules)
}

// ── Confirmation ─────────────────────────────────────────────────────────

/// A candidate is confirmed only when followed by prose: enough words in the
/// next lines, and no second header stacked directly underneath.
pub fn confirm_header(lines: &[&str], index: usize, rules: &DetectorRules) -> bool {
    let mut following = String::new();
    for line in lines.iter().skip(index + 1).take(rules.confirm_lookahead_lines) {
        if !following.is_empty() {
            following.push(' ');
        }
        following.push_str(line.trim());
    }
    if word_count(&following) < rules.confirm_min_words {
        return false;
    }

    if let Some(next) = lines.get(index + 1).map(|l| l.trim()) {
        if !next.is_empty()
            && next.chars().count() > rules.header_like_min_chars
            && (is_title_case(next) || is_all_caps(next))
            && !starts_with_any(&next.to_lowercase(), &rules.determiner_prefixes)
        {
            return false;
        }
    }

    true
}

/// The stop test used while scanning content: does this line look like the
/// *next* section's header?
fn is_header_like(line: &str, rules: &DetectorRules) -> bool {
    line.chars().count() > rules.header_like_min_chars
        && (is_title_case(line) || is_all_caps(line))
        && !starts_with_any(&line.to_lowercase(), &rules.content_stop_prefixes)
}

// ── Content extraction ───────────────────────────────────────────────────

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_LEADING_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[•\-\*]\s*").unwrap());

/// Collapse whitespace runs, trim, and strip one leading bullet marker.
pub(crate) fn clean_text(text: &str) -> String {
    let collapsed = RE_WHITESPACE.replace_all(text, " ");
    RE_LEADING_BULLET
        .replace(collapsed.trim(), "")
        .into_owned()
}

/// Gather the body following a confirmed header: forward scan, skipping
/// blanks, stopping at the next header-like line or once the accumulated
/// text passes `max_chars`.
fn extract_content(
    lines: &[&str],
    header_index: usize,
    rules: &DetectorRules,
    max_chars: usize,
) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let mut accumulated = 0usize;

    for line in lines
        .iter()
        .skip(header_index + 1)
        .take(rules.content_scan_lines)
    {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_header_like(line, rules) {
            break;
        }
        accumulated += line.chars().count() + usize::from(!parts.is_empty());
        parts.push(line);
        if accumulated > max_chars {
            break;
        }
    }

    clean_text(&parts.join(" "))
}

// ── Entry point ──────────────────────────────────────────────────────────

/// Detect the sections of one document.
///
/// Candidates that fail confirmation, and confirmed headers whose cleaned
/// content is shorter than `min_content_length`, are dropped silently.
/// Documents with no pages or entirely blank pages yield an empty Vec.
pub fn detect_sections(document: &Document, config: &AnalysisConfig) -> Vec<Section> {
    let rules = &config.rules;
    let mut sections = Vec::new();

    for page in &document.pages {
        if page.text.trim().is_empty() {
            continue;
        }
        let lines: Vec<&str> = page.text.lines().collect();

        for (index, raw) in lines.iter().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if !is_header_candidate(line, rules) {
                continue;
            }
            if !confirm_header(&lines, index, rules) {
                continue;
            }

            let content = extract_content(&lines, index, rules, config.max_section_chars);
            if content.chars().count() < config.min_content_length {
                continue;
            }

            let word_count = word_count(&content);
            sections.push(Section {
                document: document.filename.clone(),
                page_number: page.page_number,
                section_title: line.to_string(),
                content,
                word_count,
            });
        }
    }

    debug!(
        "{}: {} sections detected",
        document.filename,
        sections.len()
    );
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::load::Page;

    fn rules() -> DetectorRules {
        DetectorRules::default()
    }

    // ── Individual rules ─────────────────────────────────────────────────

    #[test]
    fn length_band_rejects_extremes() {
        assert!(rejects_length("ab", &rules()));
        assert!(rejects_length(&"x".repeat(101), &rules()));
        assert!(!rejects_length("Packing Tips", &rules()));
    }

    #[test]
    fn continuation_words_reject() {
        assert!(rejects_continuation_start("to the south of the city", &rules()));
        assert!(rejects_continuation_start("And Then Some More", &rules()));
        assert!(!rejects_continuation_start("Torino Highlights", &rules()));
    }

    #[test]
    fn dangling_connectives_reject() {
        assert!(rejects_dangling_end("Pack light clothes and", &rules()));
        assert!(rejects_dangling_end("A Day Trip To", &rules()));
        assert!(!rejects_dangling_end("Coastal Adventures", &rules()));
    }

    #[test]
    fn lowercase_start_rejects() {
        assert!(rejects_lowercase_start("introduction to hiking"));
        assert!(rejects_lowercase_start("4 Days in Nice"));
        assert!(!rejects_lowercase_start("Introduction"));
    }

    #[test]
    fn fixed_patterns_match_expected_shapes() {
        let r = rules();
        assert!(matches_header_pattern(
            "Comprehensive Guide to Coastal Towns",
            &r
        ));
        assert!(matches_header_pattern("REGIONAL FOOD AND WINE", &r));
        assert!(matches_header_pattern("Chapter 3: Getting Around", &r));
        assert!(!matches_header_pattern("plain lowercase line", &r));
    }

    #[test]
    fn token_fallback_accepts_short_titles() {
        let r = rules();
        assert!(matches_token_fallback("Nightlife and Entertainment", &r));
        assert!(matches_token_fallback("Packing Tips", &r));
        // 16+ words, not title case: no fallback applies.
        let long = "this line keeps going on and on with many words that never form a header shape";
        assert!(!matches_token_fallback(long, &r));
    }

    #[test]
    fn candidate_chain_short_circuits() {
        let r = rules();
        assert!(is_header_candidate("Coastal Adventures", &r));
        assert!(!is_header_candidate("to the beach we went", &r));
        assert!(!is_header_candidate("x", &r));
    }

    // ── Confirmation ─────────────────────────────────────────────────────

    #[test]
    fn confirmation_needs_following_prose() {
        let lines = vec!["Introduction", "This is filler text that is short."];
        assert!(!confirm_header(&lines, 0, &rules()));

        let lines = vec![
            "Coastal Adventures",
            "The coastline offers a wide range of activities for groups, from sailing trips to",
            "cliff walks and beach days with plenty of local food along the way.",
        ];
        assert!(confirm_header(&lines, 0, &rules()));
    }

    #[test]
    fn stacked_headers_are_rejected() {
        let lines = vec![
            "Coastal Adventures",
            "Regional Food And Wine Highlights",
            "prose prose prose prose prose prose prose prose prose prose prose prose prose prose prose",
        ];
        assert!(!confirm_header(&lines, 0, &rules()));
    }

    #[test]
    fn determiner_next_line_still_confirms() {
        let lines = vec![
            "Coastal Adventures",
            "The Best Beaches Are Further South Of Town",
            "and they reward an early start with quiet sand and warm water for everyone involved.",
        ];
        assert!(confirm_header(&lines, 0, &rules()));
    }

    // ── Content extraction and cleaning ──────────────────────────────────

    #[test]
    fn clean_text_collapses_and_strips_bullets() {
        assert_eq!(clean_text("  • some   spaced\t text  "), "some spaced text");
        assert_eq!(clean_text("- dashed item"), "dashed item");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn content_stops_at_next_header_like_line() {
        let lines = vec![
            "First Section Title Line",
            "some prose follows here",
            "Second Section Title Line",
            "more prose",
        ];
        let content = extract_content(&lines, 0, &rules(), 200);
        assert_eq!(content, "some prose follows here");
    }

    #[test]
    fn content_respects_char_cap() {
        let body = "word ".repeat(100);
        let lines: Vec<&str> = std::iter::once("Header Line")
            .chain(std::iter::repeat_n(body.as_str(), 5))
            .collect();
        let content = extract_content(&lines, 0, &rules(), 200);
        // One over-cap line is kept, then the scan stops.
        assert!(content.chars().count() <= body.trim_end().chars().count());
        assert!(!content.is_empty());
    }

    // ── End to end on a document ─────────────────────────────────────────

    fn config() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    #[test]
    fn two_page_travel_document_yields_one_section() {
        let doc = Document::new(
            "south_of_france.pdf",
            vec![
                Page::new(1, "Introduction\n\nThis is filler text that is short."),
                Page::new(
                    2,
                    "Comprehensive Travel Guide\n\nThis guide covers detailed itineraries, \
                     regional highlights, and logistics for groups of friends traveling \
                     together for four days across multiple cities and regions with budget \
                     considerations.",
                ),
            ],
        );
        let sections = detect_sections(&doc, &config());
        assert_eq!(sections.len(), 1, "got: {sections:#?}");
        assert_eq!(sections[0].section_title, "Comprehensive Travel Guide");
        assert_eq!(sections[0].page_number, 2);
        assert!(sections[0].word_count > 0);
    }

    #[test]
    fn empty_document_yields_no_sections() {
        let doc = Document::new("blank.pdf", vec![Page::new(1, "   \n\n  ")]);
        assert!(detect_sections(&doc, &config()).is_empty());
        let doc = Document::new("empty.pdf", vec![]);
        assert!(detect_sections(&doc, &config()).is_empty());
    }

    #[test]
    fn emitted_sections_satisfy_content_invariant() {
        let cfg = config();
        let doc = Document::new(
            "guide.pdf",
            vec![Page::new(
                1,
                "Nightlife and Entertainment\n\
                 The city offers bars, live music venues, and late night food markets \
                 that stay open until the early hours, with districts that suit groups \
                 looking for either a quiet evening or a full night out.\n\
                 \n\
                 Tip\n\
                 Short.",
            )],
        );
        let sections = detect_sections(&doc, &cfg);
        assert!(!sections.is_empty());
        for s in &sections {
            assert!(s.content.chars().count() >= cfg.min_content_length);
            assert!(is_header_candidate(&s.section_title, &cfg.rules));
        }
    }
}
