//! Rasterized page surfaces and mask painting.

use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect as PixelRect;

use crate::error::{ScrubError, ScrubResult};
use crate::geometry::Rect;

/// Extra coverage painted around each mask, in points. Swallows antialiasing
/// fringe at the raster edge and glyph parts that extend past the reported
/// run box (ascenders, descenders).
pub const MASK_BLEED_PT: f32 = 2.0;

/// A page rendered to pixels at `scale` × its native point size.
///
/// The surface owns the only remaining representation of the page once the
/// renderer is done with it; masks are painted here, before the pixels
/// become the page.
pub struct PageSurface {
    image: RgbaImage,
    page_width: f32,
    page_height: f32,
    scale: f32,
}

impl PageSurface {
    pub fn new(image: RgbaImage, page_width: f32, page_height: f32, scale: f32) -> Self {
        Self {
            image,
            page_width,
            page_height,
            scale,
        }
    }

    /// A blank white surface with the same geometry a rendered page would
    /// have. Useful for rasterizer implementations that have nothing to
    /// draw.
    pub fn blank(page_width: f32, page_height: f32, scale: f32) -> Self {
        let px_w = (page_width * scale).round().max(1.0) as u32;
        let px_h = (page_height * scale).round().max(1.0) as u32;
        let image = RgbaImage::from_pixel(px_w, px_h, Rgba([255, 255, 255, 255]));
        Self::new(image, page_width, page_height, scale)
    }

    pub fn page_width(&self) -> f32 {
        self.page_width
    }

    pub fn page_height(&self) -> f32 {
        self.page_height
    }

    pub fn pixel_width(&self) -> u32 {
        self.image.width()
    }

    pub fn pixel_height(&self) -> u32 {
        self.image.height()
    }

    /// Reads one pixel as RGBA. Intended for inspection in tests.
    pub fn pixel_at(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Paints a fully opaque black mask over `rect` (page points, top-left
    /// origin), grown by [`MASK_BLEED_PT`] and clamped to the surface.
    pub fn paint_mask(&mut self, rect: Rect) {
        let left = ((rect.x - MASK_BLEED_PT) * self.scale).floor().max(0.0) as u32;
        let top = ((rect.y - MASK_BLEED_PT) * self.scale).floor().max(0.0) as u32;
        let right = ((rect.right() + MASK_BLEED_PT) * self.scale)
            .ceil()
            .min(self.image.width() as f32) as u32;
        let bottom = ((rect.bottom() + MASK_BLEED_PT) * self.scale)
            .ceil()
            .min(self.image.height() as f32) as u32;

        if right <= left || bottom <= top {
            return;
        }

        let mask = PixelRect::at(left as i32, top as i32).of_size(right - left, bottom - top);
        draw_filled_rect_mut(&mut self.image, mask, Rgba([0, 0, 0, 255]));
        log::debug!(
            "painted mask {}x{} px at ({}, {})",
            right - left,
            bottom - top,
            left,
            top
        );
    }

    /// Encodes the surface as JPEG (RGB, no alpha) for embedding as the
    /// page's sole content.
    pub fn encode_jpeg(&self) -> ScrubResult<Vec<u8>> {
        let rgb = image::DynamicImage::ImageRgba8(self.image.clone()).to_rgb8();
        let mut bytes = Vec::new();
        rgb.write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .map_err(|e| ScrubError::Raster(format!("JPEG encoding failed: {}", e)))?;
        Ok(bytes)
    }
}
