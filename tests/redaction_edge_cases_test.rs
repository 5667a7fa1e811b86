//! Edge case tests: boundary conditions, error paths, and unusual inputs.

use anyhow::Result;

use pdfscrub::{
    CancellationToken, Pipeline, PipelineOptions, Rect, RedactionRegion, RedactionRequest,
    RegionSource, ScrubError,
};

mod common;
use common::*;

// ============================================================================
// Input validation
// ============================================================================

#[test]
fn test_garbage_input_is_a_decode_failure() {
    let rasterizer = StubRasterizer;
    let pipeline = Pipeline::new(&rasterizer, PipelineOptions::default());
    let result = pipeline.run(
        b"definitely not a pdf",
        &RedactionRequest::sanitize_only(),
        &CancellationToken::new(),
    );
    assert!(matches!(result, Err(ScrubError::Decode(_))));
}

#[test]
fn test_region_on_missing_page_is_rejected() -> Result<()> {
    let input = TestPdfBuilder::new().line("only one page").build_bytes()?;

    let rasterizer = StubRasterizer;
    let pipeline = Pipeline::new(&rasterizer, PipelineOptions::default());
    let request = RedactionRequest {
        manual_regions: vec![RedactionRegion::new(
            5,
            Rect::new(10.0, 10.0, 100.0, 20.0),
            RegionSource::Manual,
        )],
        ..RedactionRequest::sanitize_only()
    };

    let result = pipeline.run(&input, &request, &CancellationToken::new());
    match result {
        Err(ScrubError::Decode(message)) => {
            assert!(message.contains("page 5"), "unexpected message: {}", message)
        }
        other => panic!("expected a decode failure, got {:?}", other.map(|_| ())),
    }
    Ok(())
}

// ============================================================================
// Degenerate regions
// ============================================================================

/// Regions at or below the minimum practical size are dropped silently and
/// never reach the renderer.
#[test]
fn test_degenerate_regions_are_dropped_not_fatal() -> Result<()> {
    let input = TestPdfBuilder::new()
        .line("text that stays extractable")
        .build_bytes()?;

    let rasterizer = StubRasterizer;
    let pipeline = Pipeline::new(&rasterizer, PipelineOptions::default());
    let request = RedactionRequest {
        manual_regions: vec![
            RedactionRegion::new(0, Rect::new(10.0, 10.0, 0.5, 30.0), RegionSource::Manual),
            RedactionRegion::new(0, Rect::new(10.0, 10.0, 30.0, 1.0), RegionSource::Manual),
        ],
        ..RedactionRequest::sanitize_only()
    };

    let outcome = pipeline.run(&input, &request, &CancellationToken::new())?;
    assert_eq!(outcome.stats.degenerate_dropped, 2);
    assert_eq!(outcome.stats.regions_applied, 0);
    assert_eq!(outcome.stats.pages_flattened, 0);
    assert!(outcome.report.success);
    assert_preserved(&outcome.bytes, 0, "text that stays extractable");
    Ok(())
}

// ============================================================================
// Page-level failures
// ============================================================================

/// A page that cannot be rasterized fails the whole document: a partially
/// redacted output with no signal would be a security hazard.
#[test]
fn test_page_render_failure_aborts_document() -> Result<()> {
    let input = TestPdfBuilder::new()
        .line("page zero")
        .page()
        .line("page one")
        .build_bytes()?;

    let rasterizer = FailingRasterizer { fail_on_page: 1 };
    let pipeline = Pipeline::new(&rasterizer, PipelineOptions::default());
    let request = RedactionRequest {
        manual_regions: vec![
            RedactionRegion::new(0, Rect::new(10.0, 10.0, 100.0, 20.0), RegionSource::Manual),
            RedactionRegion::new(1, Rect::new(10.0, 10.0, 100.0, 20.0), RegionSource::Manual),
        ],
        ..RedactionRequest::sanitize_only()
    };

    let result = pipeline.run(&input, &request, &CancellationToken::new());
    match result {
        Err(ScrubError::PageRender { page, .. }) => assert_eq!(page, 1),
        other => panic!("expected PageRender failure, got {:?}", other.map(|_| ())),
    }
    Ok(())
}

// ============================================================================
// Blank and image-only pages
// ============================================================================

/// A page with no text runs still flattens cleanly when a region lands on
/// it, and extraction of a blank page is an empty sequence, not an error.
#[test]
fn test_blank_page_tolerated() -> Result<()> {
    let input = TestPdfBuilder::new()
        .line("first page has text")
        .page()
        .build_bytes()?;

    let runs = runs_of(&input);
    assert_eq!(runs.len(), 2);
    assert!(runs[1].is_empty(), "blank page extracts to zero runs");

    let rasterizer = StubRasterizer;
    let pipeline = Pipeline::new(&rasterizer, PipelineOptions::default());
    let request = RedactionRequest {
        manual_regions: vec![RedactionRegion::new(
            1,
            Rect::new(10.0, 10.0, 100.0, 20.0),
            RegionSource::Manual,
        )],
        ..RedactionRequest::sanitize_only()
    };

    let outcome = pipeline.run(&input, &request, &CancellationToken::new())?;
    assert!(outcome.report.success);
    assert_eq!(outcome.stats.pages_flattened, 1);
    assert_preserved(&outcome.bytes, 0, "first page has text");
    Ok(())
}

// ============================================================================
// Verification reporting
// ============================================================================

/// The verifier reports the literal leaked fragments when text overlaps a
/// region, exercised here by verifying an unredacted document, the way a
/// broken renderer would present.
#[test]
fn test_verifier_reports_residual_fragments() -> Result<()> {
    let input = TestPdfBuilder::new()
        .line_at("LEAKED-SECRET", 20.0, 270.0, 12.0)
        .build_bytes()?;

    let doc = load(&input);
    let runs = pdfscrub::layout::extract_page_runs(&doc, 0)?;
    assert_eq!(runs.len(), 1);

    let mut regions = pdfscrub::RegionSet::new();
    regions.admit(RedactionRegion::new(
        0,
        runs[0].bounds(),
        RegionSource::LiteralSearch,
    ));

    let report = pdfscrub::verify::verify_regions(&doc, &regions)?;
    assert!(!report.success);
    assert_eq!(report.residual_fragments, vec!["LEAKED-SECRET".to_string()]);
    Ok(())
}

/// A region that does not overlap any text verifies clean even on an
/// unmodified document.
#[test]
fn test_verifier_passes_empty_corner() -> Result<()> {
    let input = TestPdfBuilder::new()
        .line_at("text near the top", 20.0, 270.0, 12.0)
        .build_bytes()?;

    let doc = load(&input);
    let mut regions = pdfscrub::RegionSet::new();
    regions.admit(RedactionRegion::new(
        0,
        Rect::new(400.0, 700.0, 100.0, 50.0),
        RegionSource::Manual,
    ));

    let report = pdfscrub::verify::verify_regions(&doc, &regions)?;
    assert!(report.success);
    Ok(())
}
