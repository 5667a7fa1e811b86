//! Span location: mapping text matches back to page geometry.
//!
//! A page's runs are concatenated into one search buffer with a single-space
//! separator between runs, while the byte range each run contributed is
//! recorded. Literal and pattern matches against the buffer come back as
//! `[start, end)` ranges; every run whose range overlaps the match
//! contributes its box, and the boxes are unioned into ONE rectangle per
//! match. A match that spills across a run boundary therefore yields a
//! single region spanning both fragments, never two disjoint ones and never
//! just the first fragment.
//!
//! The separator keeps distinct runs from falsely joining, but real PDFs
//! split words mid-token ("CONF" + "IDENTIAL"), so every search also runs
//! against a collapsed view of the page with the separators removed. Only
//! collapsed matches that actually cross a run boundary are kept; anything
//! inside a single run was already found in the separated buffer. A
//! collapsed match may join fragments from different lines; for a
//! destruction tool that over-reach is the safe direction.
//!
//! Matches from separate invocations are independent; no deduplication
//! happens here.

use serde::{Deserialize, Serialize};

use crate::domain::{matcher, RuleKind, RuleSet};
use crate::geometry::Rect;
use crate::layout::TextRun;

/// Separator inserted between adjacent runs in the search buffer.
const RUN_SEPARATOR: char = ' ';

/// One match in a page's concatenated text, with the unioned bounding box of
/// every run it touches. Coordinates are page points; any scaling to a
/// render surface is the consumer's explicit responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextMatch {
    pub page_index: usize,
    pub text: String,
    pub bounds: Rect,
    pub rule: Option<RuleKind>,
}

/// A page's searchable text with per-run offset bookkeeping.
#[derive(Debug, Clone)]
pub struct PageText {
    page_index: usize,
    /// Runs joined by [`RUN_SEPARATOR`], with each run's byte range.
    buffer: String,
    ranges: Vec<(usize, usize)>,
    /// Runs joined with no separator, with each run's byte range.
    collapsed: String,
    collapsed_ranges: Vec<(usize, usize)>,
    runs: Vec<TextRun>,
}

impl PageText {
    /// Flattens a page's ordered runs into the two search buffers.
    pub fn from_runs(page_index: usize, runs: &[TextRun]) -> Self {
        let mut buffer = String::new();
        let mut ranges = Vec::with_capacity(runs.len());
        let mut collapsed = String::new();
        let mut collapsed_ranges = Vec::with_capacity(runs.len());

        for run in runs {
            if !buffer.is_empty() {
                buffer.push(RUN_SEPARATOR);
            }
            let start = buffer.len();
            buffer.push_str(&run.text);
            ranges.push((start, buffer.len()));

            let collapsed_start = collapsed.len();
            collapsed.push_str(&run.text);
            collapsed_ranges.push((collapsed_start, collapsed.len()));
        }

        Self {
            page_index,
            buffer,
            ranges,
            collapsed,
            collapsed_ranges,
            runs: runs.to_vec(),
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Indices of the runs whose range overlaps `[start, end)`.
    fn runs_in(&self, ranges: &[(usize, usize)], start: usize, end: usize) -> Vec<usize> {
        ranges
            .iter()
            .enumerate()
            .filter(|(_, (run_start, run_end))| *run_start < end && *run_end > start)
            .map(|(index, _)| index)
            .collect()
    }

    /// Union of the boxes of the given runs. `None` when the match touched
    /// no run (a separator-only match).
    fn union_bounds(&self, run_indices: &[usize]) -> Option<Rect> {
        let mut union: Option<Rect> = None;
        for &index in run_indices {
            let bounds = self.runs[index].bounds();
            union = Some(match union {
                Some(u) => u.union(&bounds),
                None => bounds,
            });
        }
        union
    }

    fn separated_match(&self, start: usize, end: usize, rule: Option<RuleKind>) -> Option<TextMatch> {
        let touched = self.runs_in(&self.ranges, start, end);
        let bounds = self.union_bounds(&touched)?;
        Some(TextMatch {
            page_index: self.page_index,
            text: self.buffer[start..end].to_string(),
            bounds,
            rule,
        })
    }

    /// A collapsed-buffer match, kept only when it crosses a run boundary;
    /// single-run matches are the separated search's job.
    fn collapsed_match(&self, start: usize, end: usize, rule: Option<RuleKind>) -> Option<TextMatch> {
        let touched = self.runs_in(&self.collapsed_ranges, start, end);
        if touched.len() < 2 {
            return None;
        }
        let bounds = self.union_bounds(&touched)?;
        Some(TextMatch {
            page_index: self.page_index,
            text: self.collapsed[start..end].to_string(),
            bounds,
            rule,
        })
    }
}

/// Finds every occurrence of a literal term on the page, including
/// occurrences split across adjacent runs.
pub fn find_literal(page: &PageText, term: &str, case_sensitive: bool) -> Vec<TextMatch> {
    if term.is_empty() {
        return Vec::new();
    }
    let mut matches: Vec<TextMatch> = literal_positions(&page.buffer, term, case_sensitive)
        .into_iter()
        .filter_map(|start| page.separated_match(start, start + term.len(), None))
        .collect();
    matches.extend(
        literal_positions(&page.collapsed, term, case_sensitive)
            .into_iter()
            .filter_map(|start| page.collapsed_match(start, start + term.len(), None)),
    );
    matches
}

/// Finds every enabled pattern-rule match on the page, in rule order.
pub fn find_rules(page: &PageText, rules: &RuleSet) -> Vec<TextMatch> {
    let mut matches = Vec::new();
    for kind in rules.enabled_kinds() {
        let m = matcher(kind);
        for (start, end) in m.find_spans(&page.buffer) {
            if let Some(found) = page.separated_match(start, end, Some(kind)) {
                matches.push(found);
            }
        }
        for (start, end) in m.find_spans(&page.collapsed) {
            if let Some(found) = page.collapsed_match(start, end, Some(kind)) {
                matches.push(found);
            }
        }
    }
    log::debug!(
        "page {}: {} pattern matches across {} enabled rules",
        page.page_index,
        matches.len(),
        rules.enabled_kinds().len()
    );
    matches
}

/// Byte offsets of every occurrence of `needle` in `haystack`.
///
/// The case-insensitive path compares ASCII case-folded slices in place so
/// the returned offsets stay valid for the original buffer.
fn literal_positions(haystack: &str, needle: &str, case_sensitive: bool) -> Vec<usize> {
    let mut positions = Vec::new();
    if needle.is_empty() || needle.len() > haystack.len() {
        return positions;
    }
    if case_sensitive {
        let mut from = 0;
        while let Some(found) = haystack[from..].find(needle) {
            positions.push(from + found);
            from += found + 1;
        }
    } else {
        for start in 0..=(haystack.len() - needle.len()) {
            if !haystack.is_char_boundary(start) || !haystack.is_char_boundary(start + needle.len())
            {
                continue;
            }
            if haystack[start..start + needle.len()].eq_ignore_ascii_case(needle) {
                positions.push(start);
            }
        }
    }
    positions
}
