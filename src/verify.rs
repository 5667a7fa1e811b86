//! Post-redaction verification.
//!
//! Re-extracts the text layout of every redacted output page through the
//! same extractor the pipeline used on the input, and checks each run's box
//! against the region geometry that was redacted. The report is the
//! user-facing proof of destruction: on failure it carries the literal
//! fragments still extractable inside redacted zones, and the fragment list
//! is never discarded on success either: an empty list IS the proof.

use lopdf::Document as LopdfDocument;
use serde::{Deserialize, Serialize};

use crate::error::ScrubResult;
use crate::layout;
use crate::region::RegionSet;

/// Outcome of the verification pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True iff no extractable run overlaps any redacted region.
    pub success: bool,
    /// Literal text of every run found inside a redacted zone.
    pub residual_fragments: Vec<String>,
}

impl VerificationReport {
    /// A trivially successful report for a pipeline with no regions.
    pub fn clean() -> Self {
        Self {
            success: true,
            residual_fragments: Vec::new(),
        }
    }
}

/// Verifies that `doc` (the renderer's output) carries no extractable text
/// overlapping any region in `regions`.
///
/// Verification failure is not an error: the report comes back with
/// `success == false` and the caller decides whether to retry with wider
/// margins or surface the warning.
pub fn verify_regions(doc: &LopdfDocument, regions: &RegionSet) -> ScrubResult<VerificationReport> {
    let mut residual_fragments = Vec::new();

    for page_index in regions.pages() {
        let runs = layout::extract_page_runs(doc, page_index)?;
        let page_regions = regions.for_page(page_index);
        for run in &runs {
            let bounds = run.bounds();
            if page_regions
                .iter()
                .any(|region| bounds.intersects(&region.rect))
            {
                log::warn!(
                    "residual text on page {} at ({}, {}): {:?}",
                    page_index,
                    run.x,
                    run.y,
                    run.text
                );
                residual_fragments.push(run.text.clone());
            }
        }
    }

    Ok(VerificationReport {
        success: residual_fragments.is_empty(),
        residual_fragments,
    })
}
