//! Property-style tests for the destruction pipeline.
//!
//! Uses deterministic pseudo-random inputs to verify the load-bearing
//! invariants across many region layouts, not just hand-picked examples.

use anyhow::Result;

use pdfscrub::geometry::{to_bottom_left_y, to_top_left_y};
use pdfscrub::{
    CancellationToken, Pipeline, PipelineOptions, Rect, RedactionRegion, RedactionRequest,
    RegionSource,
};

mod common;
use common::*;

/// Small deterministic generator so failures reproduce exactly.
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    fn in_range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (self.next_u32() as f32 / u32::MAX as f32) * (hi - lo)
    }
}

/// Destruction invariant: whatever rectangles are applied, re-extracting the
/// redacted pages restricted to those rectangles yields nothing. Exercised
/// over many random region layouts on a multi-run document.
#[test]
fn test_destruction_invariant_for_random_regions() -> Result<()> {
    let input = TestPdfBuilder::new()
        .line("First run with account 4111-1111-1111-1111")
        .line("Second run, phone (555) 234-5678")
        .line("Third run of plain text")
        .page()
        .line("Second page run one")
        .line("Second page run two")
        .build_bytes()?;

    let rasterizer = StubRasterizer;
    let pipeline = Pipeline::new(&rasterizer, PipelineOptions::default());
    let mut rng = Lcg::new(0x5eed);

    for round in 0..25 {
        let mut manual_regions = Vec::new();
        let region_count = 1 + (rng.next_u32() % 3) as usize;
        for _ in 0..region_count {
            let page_index = (rng.next_u32() % 2) as usize;
            let x = rng.in_range(0.0, 500.0);
            let y = rng.in_range(0.0, 750.0);
            let width = rng.in_range(2.0, 200.0);
            let height = rng.in_range(2.0, 80.0);
            manual_regions.push(RedactionRegion::new(
                page_index,
                Rect::new(x, y, width, height),
                RegionSource::Manual,
            ));
        }

        let region_pages: std::collections::BTreeSet<usize> =
            manual_regions.iter().map(|r| r.page_index).collect();
        let request = RedactionRequest {
            manual_regions,
            ..RedactionRequest::sanitize_only()
        };
        let outcome = pipeline.run(&input, &request, &CancellationToken::new())?;

        assert!(
            outcome.report.success,
            "round {}: verification failed with fragments {:?}",
            round, outcome.report.residual_fragments
        );
        for &page_index in &region_pages {
            assert_page_flattened(&outcome.bytes, page_index);
        }
    }
    Ok(())
}

/// Coordinate conversion must round-trip exactly for arbitrary y values and
/// page heights.
#[test]
fn test_coordinate_round_trip_random_sweep() {
    let mut rng = Lcg::new(42);
    for _ in 0..1000 {
        let page_height = rng.in_range(100.0, 2000.0);
        let y = rng.in_range(0.0, page_height);
        let back = to_bottom_left_y(to_top_left_y(y, page_height), page_height);
        assert!(
            (back - y).abs() < 1e-3,
            "round trip drifted: y={} height={} back={}",
            y,
            page_height,
            back
        );
    }
}

/// Decoding arbitrary junk must fail cleanly, never panic.
#[test]
fn test_junk_input_fails_cleanly() {
    let rasterizer = StubRasterizer;
    let pipeline = Pipeline::new(&rasterizer, PipelineOptions::default());
    let mut rng = Lcg::new(7);

    let mut junk_inputs: Vec<Vec<u8>> = vec![
        Vec::new(),
        b"not a pdf at all".to_vec(),
        b"%PDF-1.5\n%%EOF".to_vec(),
    ];
    for _ in 0..10 {
        let len = 16 + (rng.next_u32() % 512) as usize;
        junk_inputs.push((0..len).map(|_| (rng.next_u32() & 0xFF) as u8).collect());
    }

    for junk in junk_inputs {
        let result = pipeline.run(
            &junk,
            &RedactionRequest::sanitize_only(),
            &CancellationToken::new(),
        );
        assert!(
            matches!(result, Err(pdfscrub::ScrubError::Decode(_))),
            "junk input must surface as a decode failure"
        );
    }
}
