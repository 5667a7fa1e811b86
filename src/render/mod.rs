//! Destructive page flattening.
//!
//! For every page that owns at least one redaction region the renderer
//! rasterizes the full page, paints opaque masks over the regions, and
//! replaces the page's entire content with the resulting image. The page's
//! original drawing instructions, text operators included, are removed
//! from the document outright, not layered under the raster. Pages without
//! regions are not touched at all.
//!
//! Redacting any region therefore destroys that whole page's extractable
//! text, not just the marked span. That granularity is deliberate: masking
//! a single span would leave coordinate-adjacent tokens extractable.

pub mod raster;
pub mod surface;

pub use raster::{PageRasterizer, PdfiumRasterizer};
pub use surface::{PageSurface, MASK_BLEED_PT};

use std::collections::BTreeSet;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{ScrubError, ScrubResult};
use crate::layout;
use crate::pipeline::CancellationToken;
use crate::region::RegionSet;

/// Default render-quality scale factor.
pub const DEFAULT_RENDER_SCALE: f32 = 2.0;

/// Counters for one flatten pass.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FlattenStats {
    pub pages_flattened: usize,
    pub masks_painted: usize,
}

struct EncodedPage {
    page_index: usize,
    jpeg: Vec<u8>,
    pixel_width: u32,
    pixel_height: u32,
    page_width: f32,
    page_height: f32,
    masks_painted: usize,
}

/// The irreversible-removal engine.
pub struct DestructiveRenderer<'a> {
    rasterizer: &'a dyn PageRasterizer,
    scale: f32,
}

impl<'a> DestructiveRenderer<'a> {
    /// Creates a renderer with the given quality scale. Scales below 1.0
    /// are clamped up: downsampling the page would degrade the untouched
    /// parts of its content for no security benefit.
    pub fn new(rasterizer: &'a dyn PageRasterizer, scale: f32) -> Self {
        let scale = if scale < 1.0 {
            log::warn!("render scale {} below 1.0, clamping", scale);
            1.0
        } else {
            scale
        };
        Self { rasterizer, scale }
    }

    /// Flattens every page of `doc` that owns regions. `original` is the
    /// byte form of the same document, handed to the raster backend. An
    /// empty region set is a no-op. Any page failure aborts the whole
    /// document.
    pub fn flatten(
        &self,
        doc: &mut LopdfDocument,
        original: &[u8],
        regions: &RegionSet,
        cancel: &CancellationToken,
    ) -> ScrubResult<FlattenStats> {
        let pages = regions.pages();
        if pages.is_empty() {
            return Ok(FlattenStats::default());
        }

        // Rasterization is serial: the pdfium binding is effectively
        // single-threaded. Mask painting and JPEG encoding below are not.
        let mut rastered = Vec::with_capacity(pages.len());
        for &page_index in &pages {
            if cancel.is_cancelled() {
                return Err(ScrubError::Cancelled);
            }
            let surface = self.rasterizer.rasterize(original, page_index, self.scale)?;
            rastered.push((page_index, surface));
        }

        let encoded: Vec<ScrubResult<EncodedPage>> = rastered
            .into_par_iter()
            .map(|(page_index, mut surface)| {
                let mut masks_painted = 0;
                for region in regions.for_page(page_index) {
                    surface.paint_mask(region.rect);
                    masks_painted += 1;
                }
                let jpeg = surface.encode_jpeg().map_err(|e| ScrubError::PageRender {
                    page: page_index,
                    message: e.to_string(),
                })?;
                Ok(EncodedPage {
                    page_index,
                    jpeg,
                    pixel_width: surface.pixel_width(),
                    pixel_height: surface.pixel_height(),
                    page_width: surface.page_width(),
                    page_height: surface.page_height(),
                    masks_painted,
                })
            })
            .collect();

        if cancel.is_cancelled() {
            return Err(ScrubError::Cancelled);
        }

        // Content streams referenced by pages we are NOT flattening must
        // survive, even when shared with a flattened page.
        let keep: BTreeSet<ObjectId> = (0..layout::page_count(doc))
            .filter(|i| !pages.contains(i))
            .filter_map(|i| layout::page_object_id(doc, i).ok())
            .flat_map(|id| content_stream_ids(doc, id))
            .collect();

        let mut stats = FlattenStats::default();
        let mut orphaned: Vec<ObjectId> = Vec::new();
        for page in encoded {
            let page = page?;
            let old_contents = self.replace_page_content(doc, &page)?;
            orphaned.extend(old_contents);
            stats.pages_flattened += 1;
            stats.masks_painted += page.masks_painted;
        }

        // Drop the replaced content streams from the object table so the
        // original operators do not survive as unreferenced objects in the
        // saved file.
        for id in orphaned {
            if !keep.contains(&id) {
                doc.objects.remove(&id);
            }
        }

        log::info!(
            "flattened {} pages, {} masks painted",
            stats.pages_flattened,
            stats.masks_painted
        );
        Ok(stats)
    }

    /// Rebuilds one page as a bare raster image sized to the original page
    /// dimensions. Returns the object ids of the replaced content streams.
    fn replace_page_content(
        &self,
        doc: &mut LopdfDocument,
        page: &EncodedPage,
    ) -> ScrubResult<Vec<ObjectId>> {
        let page_id = layout::page_object_id(doc, page.page_index)?;
        let old_contents = content_stream_ids(doc, page_id);

        let mut image_dict = Dictionary::new();
        image_dict.set("Type", Object::Name(b"XObject".to_vec()));
        image_dict.set("Subtype", Object::Name(b"Image".to_vec()));
        image_dict.set("Width", Object::Integer(page.pixel_width as i64));
        image_dict.set("Height", Object::Integer(page.pixel_height as i64));
        image_dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
        image_dict.set("BitsPerComponent", Object::Integer(8));
        image_dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
        let image_id = doc.add_object(Object::Stream(Stream::new(image_dict, page.jpeg.clone())));

        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(page.page_width),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page.page_height),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ];
        let content = Content { operations };
        let content_bytes = content.encode().map_err(|e| ScrubError::PageRender {
            page: page.page_index,
            message: format!("failed to encode content stream: {}", e),
        })?;
        let content_id = doc.add_object(Object::Stream(Stream::new(
            Dictionary::new(),
            content_bytes,
        )));

        let mut xobjects = Dictionary::new();
        xobjects.set("Im0", Object::Reference(image_id));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let page_obj = doc
            .get_object_mut(page_id)
            .map_err(|e| ScrubError::Decode(e.to_string()))?;
        if let Object::Dictionary(ref mut page_dict) = page_obj {
            page_dict.set("Contents", Object::Reference(content_id));
            page_dict.set("Resources", Object::Dictionary(resources));
            page_dict.remove(b"Annots");
        } else {
            return Err(ScrubError::PageRender {
                page: page.page_index,
                message: "page object is not a dictionary".to_string(),
            });
        }

        Ok(old_contents)
    }
}

/// Object ids of the content stream(s) a page references.
fn content_stream_ids(doc: &LopdfDocument, page_id: ObjectId) -> Vec<ObjectId> {
    let mut ids = Vec::new();
    if let Ok(page_dict) = doc.get_dictionary(page_id) {
        match page_dict.get(b"Contents") {
            Ok(Object::Reference(r)) => ids.push(*r),
            Ok(Object::Array(arr)) => {
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        ids.push(*r);
                    }
                }
            }
            _ => {}
        }
    }
    ids
}
