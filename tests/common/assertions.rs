//! Custom assertions for sanitization testing.
//!
//! Domain-specific assertions that make tests more readable and give better
//! failure messages.

use super::pdf_helpers;

/// Asserts that a term is no longer extractable anywhere in the document.
///
/// # Panics
/// Panics if any page's extracted text still contains the term.
pub fn assert_destroyed(bytes: &[u8], term: &str) {
    for (page_index, runs) in pdf_helpers::runs_of(bytes).iter().enumerate() {
        let text = runs
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert!(
            !text.contains(term),
            "'{}' should be destroyed but is still extractable on page {}: {:?}",
            term,
            page_index,
            text
        );
    }
}

/// Asserts that a term survived the pipeline on the given page.
///
/// # Panics
/// Panics if the page's extracted text does not contain the term.
pub fn assert_preserved(bytes: &[u8], page_index: usize, term: &str) {
    let text = pdf_helpers::page_text(bytes, page_index);
    assert!(
        text.contains(term),
        "'{}' should be preserved on page {} but extraction found: {:?}",
        term,
        page_index,
        text
    );
}

/// Asserts that a page has been flattened: zero extractable runs.
///
/// # Panics
/// Panics if the page still carries text runs.
pub fn assert_page_flattened(bytes: &[u8], page_index: usize) {
    let runs = &pdf_helpers::runs_of(bytes)[page_index];
    assert!(
        runs.is_empty(),
        "page {} should be flattened but still carries {} runs: {:?}",
        page_index,
        runs.len(),
        runs.iter().map(|r| &r.text).collect::<Vec<_>>()
    );
}

/// Asserts that the output is a loadable PDF with the expected page count.
///
/// # Panics
/// Panics on parse failure or page count mismatch.
pub fn assert_valid_output(bytes: &[u8], expected_pages: usize) {
    assert!(
        pdf_helpers::is_valid_pdf(bytes),
        "output should be independently openable"
    );
    let pages = pdf_helpers::runs_of(bytes).len();
    assert_eq!(
        pages, expected_pages,
        "output should keep the original page count"
    );
}
