//! Destructive PDF sanitization library.
//!
//! This library permanently destroys sensitive content in PDF documents
//! instead of obscuring it. Marked regions are eliminated by rasterizing the
//! owning page, painting opaque masks, and replacing the page's entire
//! content with the raster; the original text operators are removed from
//! the document, not hidden behind an image. A verification pass then
//! re-extracts the output and proves that nothing readable remains under
//! any redacted region.
//!
//! # Features
//!
//! - **Irreversible removal**: redacted pages carry only pixels, never the
//!   original drawing instructions
//! - **Text search**: literal terms with case control, mapped back to page
//!   geometry across fragmented text runs
//! - **Pattern rules**: SSN-shaped identifiers, email addresses, NANP phone
//!   numbers and payment card numbers, each independently toggleable
//! - **Metadata sanitization**: identifying Info fields and XMP stream
//!   cleared, timestamps reset
//! - **Verified output**: every run carries a [`verify::VerificationReport`]
//!   proving (or disproving) destruction
//!
//! Note the granularity trade-off: redacting any region flattens that whole
//! page, so all text on a redacted page stops being extractable, not just
//! the marked span. Pages without regions are preserved untouched.
//!
//! # Architecture
//!
//! - [`layout`]: positioned text-run extraction from page content streams
//! - [`locate`]: mapping matches in concatenated page text back to geometry
//! - [`domain`]: the built-in sensitive-pattern categories
//! - [`region`]: the normalized redaction region set
//! - [`render`]: rasterize-mask-replace destructive renderer
//! - [`sanitize`]: document metadata clearing
//! - [`verify`]: post-redaction proof of emptiness
//! - [`pipeline`]: the five stages wired together
//! - [`error`]: typed failure taxonomy
//!
//! # Quick Start
//!
//! ```no_run
//! use pdfscrub::{
//!     CancellationToken, PdfiumRasterizer, Pipeline, PipelineOptions, RedactionRequest,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = std::fs::read("statement.pdf")?;
//!
//! let rasterizer = PdfiumRasterizer::new()?;
//! let pipeline = Pipeline::new(&rasterizer, PipelineOptions::default());
//!
//! let mut request = RedactionRequest::default();
//! request.terms.push("123-45-6789".to_string());
//!
//! let outcome = pipeline.run(&input, &request, &CancellationToken::new())?;
//! assert!(outcome.report.success);
//! std::fs::write("statement.scrubbed.pdf", &outcome.bytes)?;
//! # Ok(())
//! # }
//! ```

pub mod domain;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod locate;
pub mod pipeline;
pub mod region;
pub mod render;
pub mod sanitize;
pub mod verify;

// Re-exports for convenient access
pub use domain::{PatternMatcher, RuleKind, RuleSet};
pub use error::{ScrubError, ScrubResult};
pub use geometry::Rect;
pub use layout::TextRun;
pub use locate::TextMatch;
pub use pipeline::{
    CancellationToken, Pipeline, PipelineOptions, PipelineOutcome, RedactionRequest, ScrubStats,
};
pub use region::{RedactionRegion, RegionSet, RegionSource};
pub use render::{DestructiveRenderer, PageRasterizer, PageSurface, PdfiumRasterizer};
pub use sanitize::Sanitizer;
pub use verify::VerificationReport;
