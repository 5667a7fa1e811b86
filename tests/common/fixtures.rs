//! Test fixtures and PDF builders.
//!
//! Provides a builder for creating test PDFs with positioned content,
//! following the Builder pattern for clean test setup, plus the stub raster
//! backend the suite uses so tests never need a pdfium shared library.

use anyhow::Result;
use printpdf::*;
use std::fs;
use std::io::BufWriter;
use std::path::Path;

use pdfscrub::{PageRasterizer, PageSurface, ScrubResult};

/// A4 in millimetres, matching the builder's default page size.
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// One positioned line of text on a builder page.
#[derive(Debug, Clone)]
struct Line {
    text: String,
    x_mm: f32,
    y_mm: f32,
    size: f32,
}

/// Builder for creating test PDFs with positioned text lines.
///
/// Each line becomes its own text run in the produced document, which is
/// what makes match geometry assertable in tests.
///
/// # Example
///
/// ```no_run
/// # use anyhow::Result;
/// # fn main() -> Result<()> {
/// let bytes = TestPdfBuilder::new()
///     .with_title("Statement")
///     .line("Account: 12345")
///     .page()
///     .line("Nothing sensitive here")
///     .build_bytes()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TestPdfBuilder {
    title: String,
    pages: Vec<Vec<Line>>,
    next_y_mm: f32,
}

impl TestPdfBuilder {
    pub fn new() -> Self {
        Self {
            title: "Test Document".to_string(),
            pages: vec![Vec::new()],
            next_y_mm: 270.0,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Adds a line at the next automatic position on the current page.
    pub fn line(mut self, text: &str) -> Self {
        let y = self.next_y_mm;
        self.next_y_mm -= 10.0;
        self.line_at(text, 20.0, y, 12.0)
    }

    /// Adds a line at an explicit position (millimetres from bottom-left,
    /// the coordinate system printpdf exposes).
    pub fn line_at(mut self, text: &str, x_mm: f32, y_mm: f32, size: f32) -> Self {
        self.pages
            .last_mut()
            .expect("builder always has a page")
            .push(Line {
                text: text.to_string(),
                x_mm,
                y_mm,
                size,
            });
        self
    }

    /// Starts a new page.
    pub fn page(mut self) -> Self {
        self.pages.push(Vec::new());
        self.next_y_mm = 270.0;
        self
    }

    /// Builds the PDF and returns it as bytes.
    pub fn build_bytes(self) -> Result<Vec<u8>> {
        let (doc, page1, layer1) = PdfDocument::new(
            &self.title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

        let mut page_refs = vec![(page1, layer1)];
        for _ in 1..self.pages.len() {
            page_refs.push(doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1"));
        }

        for (lines, (page_idx, layer_idx)) in self.pages.iter().zip(page_refs) {
            let layer = doc.get_page(page_idx).get_layer(layer_idx);
            for line in lines {
                layer.use_text(
                    line.text.clone(),
                    line.size,
                    Mm(line.x_mm),
                    Mm(line.y_mm),
                    &font,
                );
            }
        }

        let mut bytes = Vec::new();
        doc.save(&mut BufWriter::new(&mut bytes))?;
        Ok(bytes)
    }

    /// Builds the PDF and writes it to `path`.
    pub fn build(self, path: &Path) -> Result<()> {
        let bytes = self.build_bytes()?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

impl Default for TestPdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Raster backend producing blank white surfaces with the page's real
/// geometry. The destruction invariant does not depend on what the pixels
/// show, so the suite runs without a pdfium shared library; mask painting
/// and page replacement still exercise the real code paths.
pub struct StubRasterizer;

impl PageRasterizer for StubRasterizer {
    fn rasterize(&self, document: &[u8], page_index: usize, scale: f32) -> ScrubResult<PageSurface> {
        let doc = ::lopdf::Document::load_mem(document)
            .map_err(|e| pdfscrub::ScrubError::Decode(e.to_string()))?;
        let page_id = pdfscrub::layout::page_object_id(&doc, page_index)?;
        let (width, height) = pdfscrub::layout::page_size(&doc, page_id)?;
        Ok(PageSurface::blank(width, height, scale))
    }
}

/// Raster backend that fails on a chosen page, for hard-failure tests.
pub struct FailingRasterizer {
    pub fail_on_page: usize,
}

impl PageRasterizer for FailingRasterizer {
    fn rasterize(&self, document: &[u8], page_index: usize, scale: f32) -> ScrubResult<PageSurface> {
        if page_index == self.fail_on_page {
            return Err(pdfscrub::ScrubError::PageRender {
                page: page_index,
                message: "synthetic rasterization failure".to_string(),
            });
        }
        StubRasterizer.rasterize(document, page_index, scale)
    }
}
