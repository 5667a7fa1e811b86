//! The five-stage sanitization pipeline.
//!
//! Extract → locate → destructively render → sanitize metadata → verify,
//! as one unit of work per document. All state is owned by the invocation;
//! nothing is shared between concurrent pipelines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lopdf::Document as LopdfDocument;
use serde::Serialize;

use crate::error::{ScrubError, ScrubResult};
use crate::layout;
use crate::locate::{find_literal, find_rules, PageText};
use crate::region::{RedactionRegion, RegionSet, RegionSource};
use crate::render::{DestructiveRenderer, PageRasterizer, DEFAULT_RENDER_SCALE};
use crate::domain::RuleSet;
use crate::sanitize::Sanitizer;
use crate::verify::{verify_regions, VerificationReport};

/// Margin added around every region for the one corrective re-render after
/// a failed verification.
pub const RETRY_MARGIN_PT: f32 = 4.0;

/// Cooperative cancellation flag, checked between page boundaries. On
/// cancellation the pipeline returns [`ScrubError::Cancelled`] and no output
/// bytes are produced.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What to find and destroy in one invocation.
#[derive(Debug, Clone, Default)]
pub struct RedactionRequest {
    /// Literal terms to search for.
    pub terms: Vec<String>,
    /// Case sensitivity of the literal search.
    pub case_sensitive: bool,
    /// Enabled pattern categories.
    pub rules: RuleSet,
    /// Caller-drawn regions, admitted alongside search results.
    pub manual_regions: Vec<RedactionRegion>,
}

impl RedactionRequest {
    /// A metadata-only pass: nothing searched, nothing flattened.
    pub fn sanitize_only() -> Self {
        Self {
            rules: RuleSet::none(),
            ..Self::default()
        }
    }
}

/// Pipeline tuning knobs.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Render-quality scale factor (≥ 1).
    pub scale: f32,
    /// Re-render once with padded regions if verification fails.
    pub margin_retry: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_RENDER_SCALE,
            margin_retry: true,
        }
    }
}

/// Counters describing one pipeline run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScrubStats {
    pub pages_processed: usize,
    pub pages_flattened: usize,
    pub matches_found: usize,
    pub regions_applied: usize,
    pub degenerate_dropped: usize,
    pub retried: bool,
}

/// Everything a pipeline run produces.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// The complete sanitized document.
    pub bytes: Vec<u8>,
    /// Proof (or disproof) that redacted zones are empty.
    pub report: VerificationReport,
    pub stats: ScrubStats,
}

/// The sanitization pipeline, generic over the raster backend.
pub struct Pipeline<'a> {
    rasterizer: &'a dyn PageRasterizer,
    options: PipelineOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(rasterizer: &'a dyn PageRasterizer, options: PipelineOptions) -> Self {
        Self {
            rasterizer,
            options,
        }
    }

    /// Runs all five stages on `input` and returns the sanitized document
    /// with its verification report.
    ///
    /// Decode and page-render failures abort with no output. A failed
    /// verification does NOT abort: the document and the non-success report
    /// are both returned, and the caller decides.
    pub fn run(
        &self,
        input: &[u8],
        request: &RedactionRequest,
        cancel: &CancellationToken,
    ) -> ScrubResult<PipelineOutcome> {
        let mut doc =
            LopdfDocument::load_mem(input).map_err(|e| ScrubError::Decode(e.to_string()))?;
        if doc.is_encrypted() {
            return Err(ScrubError::Decode("document is encrypted".to_string()));
        }
        let page_count = layout::page_count(&doc);
        let page_sizes = collect_page_sizes(&doc, page_count)?;

        let (regions, matches_found) = self.locate_regions(&doc, page_count, request, cancel)?;

        let renderer = DestructiveRenderer::new(self.rasterizer, self.options.scale);
        let flatten = renderer.flatten(&mut doc, input, &regions, cancel)?;

        let sanitizer = Sanitizer::new();
        sanitizer.apply(&mut doc)?;

        let mut report = verify_regions(&doc, &regions)?;
        let mut retried = false;

        if !report.success && self.options.margin_retry {
            log::warn!(
                "verification found {} residual fragments, re-rendering with {} pt margin",
                report.residual_fragments.len(),
                RETRY_MARGIN_PT
            );
            retried = true;
            let padded = regions.padded(RETRY_MARGIN_PT, &page_sizes);
            let mut retry_doc =
                LopdfDocument::load_mem(input).map_err(|e| ScrubError::Decode(e.to_string()))?;
            renderer.flatten(&mut retry_doc, input, &padded, cancel)?;
            sanitizer.apply(&mut retry_doc)?;
            // The proof is still measured against the original geometry.
            report = verify_regions(&retry_doc, &regions)?;
            doc = retry_doc;
        }

        if cancel.is_cancelled() {
            return Err(ScrubError::Cancelled);
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| ScrubError::Decode(format!("failed to serialize output: {}", e)))?;

        if !report.success {
            log::warn!(
                "document returned with failed verification: {} residual fragments",
                report.residual_fragments.len()
            );
        }

        Ok(PipelineOutcome {
            bytes,
            report,
            stats: ScrubStats {
                pages_processed: page_count,
                pages_flattened: flatten.pages_flattened,
                matches_found,
                regions_applied: regions.len(),
                degenerate_dropped: regions.dropped_degenerate(),
                retried,
            },
        })
    }

    /// Stages 1 and 2: extract every page's layout and map the requested
    /// terms, rules and manual boxes to a normalized region set.
    fn locate_regions(
        &self,
        doc: &LopdfDocument,
        page_count: usize,
        request: &RedactionRequest,
        cancel: &CancellationToken,
    ) -> ScrubResult<(RegionSet, usize)> {
        for region in &request.manual_regions {
            if region.page_index >= page_count {
                return Err(ScrubError::Decode(format!(
                    "region references page {} but document has {} pages",
                    region.page_index, page_count
                )));
            }
        }

        let mut regions = RegionSet::new();
        regions.admit_all(request.manual_regions.iter().cloned());

        let mut matches_found = 0;
        for page_index in 0..page_count {
            if cancel.is_cancelled() {
                return Err(ScrubError::Cancelled);
            }
            let runs = layout::extract_page_runs(doc, page_index)?;
            if runs.is_empty() {
                continue;
            }
            let page_text = PageText::from_runs(page_index, &runs);

            for term in &request.terms {
                for found in find_literal(&page_text, term, request.case_sensitive) {
                    matches_found += 1;
                    regions.admit(
                        RedactionRegion::new(page_index, found.bounds, RegionSource::LiteralSearch)
                            .with_label(found.text),
                    );
                }
            }

            for found in find_rules(&page_text, &request.rules) {
                matches_found += 1;
                let mut region =
                    RedactionRegion::new(page_index, found.bounds, RegionSource::PatternMatch);
                if let Some(kind) = found.rule {
                    region = region.with_label(kind.name());
                }
                regions.admit(region);
            }
        }

        log::info!(
            "{} matches mapped to {} regions across {} pages",
            matches_found,
            regions.len(),
            regions.pages().len()
        );
        Ok((regions, matches_found))
    }
}

fn collect_page_sizes(doc: &LopdfDocument, page_count: usize) -> ScrubResult<Vec<(f32, f32)>> {
    (0..page_count)
        .map(|i| layout::page_object_id(doc, i).and_then(|id| layout::page_size(doc, id)))
        .collect()
}
