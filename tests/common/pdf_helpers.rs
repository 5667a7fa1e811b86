//! PDF inspection helpers for tests.

use anyhow::Result;
use lopdf::{Document, Object};

use pdfscrub::TextRun;

/// Loads a document from bytes, failing the test on parse errors.
pub fn load(bytes: &[u8]) -> Document {
    Document::load_mem(bytes).expect("output should be a loadable PDF")
}

/// Extracts every page's runs from a byte document.
pub fn runs_of(bytes: &[u8]) -> Vec<Vec<TextRun>> {
    let doc = load(bytes);
    pdfscrub::layout::extract_all_runs(&doc).expect("extraction should succeed")
}

/// Concatenated text of one page.
pub fn page_text(bytes: &[u8], page_index: usize) -> String {
    runs_of(bytes)[page_index]
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reads a string field from the Info dictionary, if present.
pub fn info_field(doc: &Document, key: &[u8]) -> Option<String> {
    let info_id = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => *id,
        _ => return None,
    };
    match doc.get_object(info_id) {
        Ok(Object::Dictionary(info)) => info
            .get(key)
            .ok()
            .and_then(|o| o.as_str().ok())
            .map(|bytes| String::from_utf8_lossy(bytes).to_string()),
        _ => None,
    }
}

/// Returns a result when the bytes parse as a PDF.
pub fn is_valid_pdf(bytes: &[u8]) -> bool {
    Document::load_mem(bytes).is_ok()
}

/// True when the raw file bytes contain `needle` anywhere, including inside
/// uncompressed streams. Used to prove destroyed text is gone from the file
/// itself, not merely unreferenced.
pub fn raw_bytes_contain(bytes: &[u8], needle: &str) -> bool {
    bytes
        .windows(needle.len())
        .any(|window| window == needle.as_bytes())
}
