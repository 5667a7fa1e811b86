//! Page rasterization seam.
//!
//! The pipeline talks to a [`PageRasterizer`] trait rather than a concrete
//! renderer, so the destructive stages and their tests are independent of
//! which engine supplies the pixels. The production implementation binds
//! pdfium at runtime.

use std::path::PathBuf;

use pdfium_render::prelude::*;

use super::surface::PageSurface;
use crate::error::{ScrubError, ScrubResult};

/// Renders one page of a document to a pixel surface.
pub trait PageRasterizer {
    /// Rasterizes page `page_index` (0-based) of `document` at
    /// `scale` × its native size.
    fn rasterize(&self, document: &[u8], page_index: usize, scale: f32) -> ScrubResult<PageSurface>;
}

/// pdfium-backed rasterizer.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
}

impl PdfiumRasterizer {
    /// Binds the pdfium library, preferring a copy next to the executable
    /// over the system library.
    pub fn new() -> ScrubResult<Self> {
        let bindings = Self::bind()?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    fn bind() -> ScrubResult<Box<dyn PdfiumLibraryBindings>> {
        for path in Self::search_paths() {
            let lib_path = Pdfium::pdfium_platform_library_name_at_path(&path);
            if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                log::info!("bound pdfium from {:?}", path);
                return Ok(bindings);
            }
        }
        Pdfium::bind_to_system_library().map_err(|e| {
            ScrubError::Raster(format!(
                "pdfium library not available ({}); install libpdfium or place it next to the executable",
                e
            ))
        })
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                paths.push(exe_dir.join("libs"));
                paths.push(exe_dir.to_path_buf());
            }
        }
        paths.push(PathBuf::from("./"));
        paths
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, document: &[u8], page_index: usize, scale: f32) -> ScrubResult<PageSurface> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(document, None)
            .map_err(|e| ScrubError::Decode(format!("pdfium failed to open document: {}", e)))?;

        let page = document
            .pages()
            .get(page_index as u16)
            .map_err(|e| ScrubError::PageRender {
                page: page_index,
                message: format!("failed to load page: {}", e),
            })?;

        let page_width = page.width().value;
        let page_height = page.height().value;
        let target_width = (page_width * scale).round() as i32;
        let target_height = (page_height * scale).round() as i32;

        log::debug!(
            "rasterizing page {}: {}x{} pt -> {}x{} px",
            page_index,
            page_width,
            page_height,
            target_width,
            target_height
        );

        let render_config = PdfRenderConfig::new()
            .set_target_width(target_width)
            .set_target_height(target_height);

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| ScrubError::PageRender {
                    page: page_index,
                    message: format!("rasterization failed: {}", e),
                })?;

        let image = bitmap.as_image().to_rgba8();
        Ok(PageSurface::new(image, page_width, page_height, scale))
    }
}
