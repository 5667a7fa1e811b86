//! Redaction region set.
//!
//! Regions are the normalized unit of destruction: page-relative rectangles
//! in top-left page space, independent of how they were sourced. The
//! renderer treats every admitted region identically; source and label are
//! advisory metadata for reporting only.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Regions with width or height at or below this threshold (in points) are
/// rejected at admission: a sub-point mask destroys nothing legible and
/// pollutes verification geometry.
pub const MIN_REGION_DIMENSION: f32 = 1.0;

/// How a region entered the set. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegionSource {
    Manual,
    LiteralSearch,
    PatternMatch,
}

/// One page-relative rectangle marked for destruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionRegion {
    pub page_index: usize,
    pub rect: Rect,
    pub source: RegionSource,
    pub label: Option<String>,
}

impl RedactionRegion {
    pub fn new(page_index: usize, rect: Rect, source: RegionSource) -> Self {
        Self {
            page_index,
            rect,
            source,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// The normalized collection of regions for one pipeline invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegionSet {
    regions: Vec<RedactionRegion>,
    dropped_degenerate: usize,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a region, rejecting degenerate sizes. Returns whether the
    /// region was kept. Rejection is logged, never fatal.
    pub fn admit(&mut self, region: RedactionRegion) -> bool {
        if region.rect.width <= MIN_REGION_DIMENSION || region.rect.height <= MIN_REGION_DIMENSION {
            log::warn!(
                "dropping degenerate region on page {}: {}x{} pt",
                region.page_index,
                region.rect.width,
                region.rect.height
            );
            self.dropped_degenerate += 1;
            return false;
        }
        self.regions.push(region);
        true
    }

    pub fn admit_all(&mut self, regions: impl IntoIterator<Item = RedactionRegion>) {
        for region in regions {
            self.admit(region);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Number of regions rejected at admission for degenerate size.
    pub fn dropped_degenerate(&self) -> usize {
        self.dropped_degenerate
    }

    pub fn iter(&self) -> impl Iterator<Item = &RedactionRegion> {
        self.regions.iter()
    }

    /// Pages owning at least one region, ascending.
    pub fn pages(&self) -> BTreeSet<usize> {
        self.regions.iter().map(|r| r.page_index).collect()
    }

    /// Regions on one page, in admission order.
    pub fn for_page(&self, page_index: usize) -> Vec<&RedactionRegion> {
        self.regions
            .iter()
            .filter(|r| r.page_index == page_index)
            .collect()
    }

    /// A copy of this set with every rectangle grown by `margin` points,
    /// clamped to its page. `page_sizes` is indexed by page.
    pub fn padded(&self, margin: f32, page_sizes: &[(f32, f32)]) -> RegionSet {
        let mut out = RegionSet::new();
        for region in &self.regions {
            let (pw, ph) = page_sizes
                .get(region.page_index)
                .copied()
                .unwrap_or((f32::MAX, f32::MAX));
            let mut padded = region.clone();
            padded.rect = region.rect.padded(margin, pw, ph);
            out.admit(padded);
        }
        out
    }
}
