//! Text layout extraction.
//!
//! Decodes a page's content stream into positioned [`TextRun`]s by walking
//! the text-showing operators with a text-matrix cursor. This is a pure read:
//! runs are recomputed on every scan and never outlive it, which is what lets
//! the verifier re-run the same extraction against the sanitized output.
//!
//! Pages without any text operators (blank, image-only, or already
//! flattened) produce an empty sequence, not an error.

use std::collections::BTreeMap;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::error::{ScrubError, ScrubResult};
use crate::geometry::to_top_left_y;

/// Glyph-box height used when a run's effective font size is unknown.
pub const FALLBACK_RUN_HEIGHT: f32 = 12.0;

/// Average glyph advance as a fraction of the font size, used to estimate
/// run width when no width table is consulted.
const WIDTH_PER_CHAR_EM: f32 = 0.5;

/// One positioned fragment of decoded text on a page.
///
/// `y` is measured from the page top (converted from the PDF's bottom-left
/// origin); the run's box extends downward to `y + height`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub page_index: usize,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl TextRun {
    pub fn bounds(&self) -> crate::geometry::Rect {
        crate::geometry::Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Text matrix cursor tracking Td/TD/Tm/T* positioning.
#[derive(Debug, Clone, Copy)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            leading: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    /// Applies a Td displacement relative to the current line matrix.
    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        let leading = self.leading;
        self.translate(0.0, -leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    /// Vertical scale applied to the nominal font size.
    fn scale(&self) -> f32 {
        let s = self.d.abs();
        if s > 0.0 {
            s
        } else {
            1.0
        }
    }
}

/// Number of pages in the document.
pub fn page_count(doc: &LopdfDocument) -> usize {
    doc.get_pages().len()
}

/// Resolves a 0-based page index to the page's object id.
pub fn page_object_id(doc: &LopdfDocument, page_index: usize) -> ScrubResult<ObjectId> {
    let pages = doc.get_pages();
    pages
        .get(&((page_index + 1) as u32))
        .copied()
        .ok_or_else(|| {
            ScrubError::Decode(format!(
                "page {} out of range (document has {} pages)",
                page_index,
                pages.len()
            ))
        })
}

/// Returns the page's (width, height) in points, resolving an inherited
/// MediaBox through the page tree when the page dictionary lacks its own.
pub fn page_size(doc: &LopdfDocument, page_id: ObjectId) -> ScrubResult<(f32, f32)> {
    let mut current = page_id;
    for _ in 0..16 {
        let dict = doc.get_dictionary(current)?;
        if let Ok(Object::Array(arr)) = dict.get(b"MediaBox") {
            if arr.len() == 4 {
                let nums: Vec<f32> = arr.iter().filter_map(operand_number).collect();
                if nums.len() == 4 {
                    return Ok((nums[2] - nums[0], nums[3] - nums[1]));
                }
            }
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => current = *parent,
            _ => break,
        }
    }
    Err(ScrubError::Decode(
        "page has no resolvable MediaBox".to_string(),
    ))
}

/// Extracts the ordered text runs of one page (0-based index).
pub fn extract_page_runs(doc: &LopdfDocument, page_index: usize) -> ScrubResult<Vec<TextRun>> {
    let page_id = page_object_id(doc, page_index)?;
    let (_, page_height) = page_size(doc, page_id)?;

    let content = match page_content(doc, page_id)? {
        Some(bytes) => bytes,
        None => return Ok(Vec::new()),
    };

    let fonts = doc.get_page_fonts(page_id).unwrap_or_default();
    walk_content(doc, &content, &fonts, page_index, page_height)
}

/// Extracts runs for every page, in page order.
pub fn extract_all_runs(doc: &LopdfDocument) -> ScrubResult<Vec<Vec<TextRun>>> {
    (0..page_count(doc))
        .map(|i| extract_page_runs(doc, i))
        .collect()
}

/// Collects a page's content stream bytes. Returns `None` for pages without
/// a Contents entry.
fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> ScrubResult<Option<Vec<u8>>> {
    let page_dict = doc.get_dictionary(page_id)?;
    let contents = match page_dict.get(b"Contents") {
        Ok(obj) => obj,
        Err(_) => return Ok(None),
    };

    match contents {
        Object::Reference(r) => {
            if let Ok(Object::Stream(s)) = doc.get_object(*r) {
                let data = s
                    .decompressed_content()
                    .map_err(|e| ScrubError::Decode(e.to_string()))?;
                Ok(Some(data))
            } else {
                Err(ScrubError::Decode("invalid content stream".to_string()))
            }
        }
        Object::Array(arr) => {
            let mut content = Vec::new();
            for obj in arr {
                if let Object::Reference(r) = obj {
                    if let Ok(Object::Stream(s)) = doc.get_object(*r) {
                        if let Ok(data) = s.decompressed_content() {
                            content.extend_from_slice(&data);
                            content.push(b' ');
                        }
                    }
                }
            }
            Ok(Some(content))
        }
        Object::Stream(s) => {
            let data = s
                .decompressed_content()
                .map_err(|e| ScrubError::Decode(e.to_string()))?;
            Ok(Some(data))
        }
        _ => Err(ScrubError::Decode("invalid content stream".to_string())),
    }
}

fn walk_content(
    doc: &LopdfDocument,
    content: &[u8],
    fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
    page_index: usize,
    page_height: f32,
) -> ScrubResult<Vec<TextRun>> {
    let content =
        lopdf::content::Content::decode(content).map_err(|e| ScrubError::Decode(e.to_string()))?;

    let mut runs = Vec::new();
    let mut current_font_name: Vec<u8> = Vec::new();
    let mut current_font_size: f32 = 0.0;
    let mut matrix = TextMatrix::default();
    let mut in_text_block = false;

    for op in content.operations {
        match op.operator.as_str() {
            "BT" => {
                in_text_block = true;
                matrix = TextMatrix::default();
            }
            "ET" => {
                in_text_block = false;
            }
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Object::Name(font_name) = &op.operands[0] {
                        current_font_name = font_name.clone();
                    }
                    current_font_size = operand_number(&op.operands[1]).unwrap_or(0.0);
                }
            }
            "TL" => {
                if let Some(leading) = op.operands.first().and_then(operand_number) {
                    matrix.leading = leading;
                }
            }
            "Td" => {
                if op.operands.len() >= 2 {
                    let tx = operand_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = operand_number(&op.operands[1]).unwrap_or(0.0);
                    matrix.translate(tx, ty);
                }
            }
            "TD" => {
                if op.operands.len() >= 2 {
                    let tx = operand_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = operand_number(&op.operands[1]).unwrap_or(0.0);
                    matrix.leading = -ty;
                    matrix.translate(tx, ty);
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    matrix.set(
                        operand_number(&op.operands[0]).unwrap_or(1.0),
                        operand_number(&op.operands[1]).unwrap_or(0.0),
                        operand_number(&op.operands[2]).unwrap_or(0.0),
                        operand_number(&op.operands[3]).unwrap_or(1.0),
                        operand_number(&op.operands[4]).unwrap_or(0.0),
                        operand_number(&op.operands[5]).unwrap_or(0.0),
                    );
                }
            }
            "T*" => {
                matrix.next_line();
            }
            "Tj" | "TJ" => {
                if in_text_block {
                    let text = decode_show_text(doc, &op, fonts, &current_font_name);
                    push_run(
                        &mut runs,
                        text,
                        &matrix,
                        current_font_size,
                        page_index,
                        page_height,
                    );
                }
            }
            "'" | "\"" => {
                matrix.next_line();
                if in_text_block {
                    let text_idx = if op.operator == "\"" { 2 } else { 0 };
                    let text = op
                        .operands
                        .get(text_idx)
                        .map(|operand| decode_string_operand(doc, operand, fonts, &current_font_name))
                        .unwrap_or_default();
                    push_run(
                        &mut runs,
                        text,
                        &matrix,
                        current_font_size,
                        page_index,
                        page_height,
                    );
                }
            }
            _ => {}
        }
    }

    log::debug!("page {}: extracted {} text runs", page_index, runs.len());
    Ok(runs)
}

fn push_run(
    runs: &mut Vec<TextRun>,
    text: String,
    matrix: &TextMatrix,
    font_size: f32,
    page_index: usize,
    page_height: f32,
) {
    if text.trim().is_empty() {
        return;
    }
    let (x, native_y) = matrix.position();
    let effective_size = font_size * matrix.scale();
    let height = if effective_size > 0.0 {
        effective_size
    } else {
        FALLBACK_RUN_HEIGHT
    };
    let width = text.chars().count() as f32 * height * WIDTH_PER_CHAR_EM;
    runs.push(TextRun {
        page_index,
        text,
        x,
        y: to_top_left_y(native_y, page_height),
        width,
        height,
    });
}

/// Decodes the string payload of a Tj or TJ operation.
fn decode_show_text(
    doc: &LopdfDocument,
    op: &lopdf::content::Operation,
    fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
    font_name: &[u8],
) -> String {
    if op.operator == "TJ" {
        // TJ interleaves strings with kerning adjustments in thousandths of
        // the em; a large negative adjustment is a de-facto word space.
        let space_threshold = 200.0;
        let mut combined = String::new();
        if let Some(Object::Array(arr)) = op.operands.first() {
            for item in arr {
                match item {
                    Object::String(..) => {
                        combined.push_str(&decode_string_operand(doc, item, fonts, font_name));
                    }
                    Object::Integer(n) => {
                        if -(*n as f32) > space_threshold && !combined.ends_with(' ') {
                            combined.push(' ');
                        }
                    }
                    Object::Real(n) => {
                        if -n > space_threshold && !combined.ends_with(' ') {
                            combined.push(' ');
                        }
                    }
                    _ => {}
                }
            }
        }
        combined
    } else {
        op.operands
            .first()
            .map(|operand| decode_string_operand(doc, operand, fonts, font_name))
            .unwrap_or_default()
    }
}

fn decode_string_operand(
    doc: &LopdfDocument,
    operand: &Object,
    fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
    font_name: &[u8],
) -> String {
    let bytes = match operand {
        Object::String(bytes, _) => bytes,
        _ => return String::new(),
    };
    let encoding = fonts
        .get(font_name)
        .and_then(|f| f.get_font_encoding(doc).ok());
    if let Some(ref enc) = encoding {
        if let Ok(decoded) = LopdfDocument::decode_text(enc, bytes) {
            return decoded;
        }
    }
    decode_text_simple(bytes)
}

/// Latin-1 fallback for fonts without a resolvable encoding.
fn decode_text_simple(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn operand_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
