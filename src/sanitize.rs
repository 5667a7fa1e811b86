//! Document metadata sanitization.
//!
//! Clears the identifying Info-dictionary fields, removes the XMP metadata
//! stream, and stamps the fixed tool tag plus the sanitization timestamp.
//! The timestamp is captured when the [`Sanitizer`] is constructed, so
//! applying the same sanitizer again rewrites the same values: the second
//! pass is a byte-stable no-op.
//!
//! This stage always runs, even for a document with zero redaction regions;
//! a metadata-only pass is a legitimate use of the pipeline.

use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::ScrubResult;

/// Producer/creator tag written into sanitized documents.
pub const PRODUCER_TAG: &str = "pdfscrub";

/// Info-dictionary fields that are cleared outright.
const CLEARED_FIELDS: [&[u8]; 4] = [b"Title", b"Author", b"Subject", b"Keywords"];

/// Metadata sanitizer with a fixed timestamp.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    timestamp: String,
}

impl Sanitizer {
    /// A sanitizer stamping the current time.
    pub fn new() -> Self {
        Self::with_timestamp(Utc::now())
    }

    /// A sanitizer stamping a caller-chosen time. The original document
    /// timestamps are never preserved; they are metadata too.
    pub fn with_timestamp(at: DateTime<Utc>) -> Self {
        Self {
            timestamp: format!("D:{}Z", at.format("%Y%m%d%H%M%S")),
        }
    }

    /// Clears and restamps the document's metadata in place.
    pub fn apply(&self, doc: &mut LopdfDocument) -> ScrubResult<()> {
        self.scrub_info_dict(doc);
        self.remove_xmp_stream(doc);
        Ok(())
    }

    fn scrub_info_dict(&self, doc: &mut LopdfDocument) {
        let mut info = Dictionary::new();
        if let Ok(Object::Reference(info_id)) = doc.trailer.get(b"Info") {
            let info_id = *info_id;
            if let Ok(Object::Dictionary(existing)) = doc.get_object(info_id) {
                info = existing.clone();
            }
        }

        for field in CLEARED_FIELDS {
            if info.has(field) {
                info.remove(field);
                log::debug!("cleared Info/{}", String::from_utf8_lossy(field));
            }
        }
        info.set(
            "Producer",
            Object::string_literal(PRODUCER_TAG.as_bytes().to_vec()),
        );
        info.set(
            "Creator",
            Object::string_literal(PRODUCER_TAG.as_bytes().to_vec()),
        );
        info.set(
            "CreationDate",
            Object::string_literal(self.timestamp.as_bytes().to_vec()),
        );
        info.set(
            "ModDate",
            Object::string_literal(self.timestamp.as_bytes().to_vec()),
        );

        match doc.trailer.get(b"Info") {
            Ok(Object::Reference(info_id)) => {
                let info_id = *info_id;
                doc.objects.insert(info_id, Object::Dictionary(info));
            }
            _ => {
                let info_id = doc.add_object(Object::Dictionary(info));
                doc.trailer.set("Info", Object::Reference(info_id));
            }
        }
    }

    /// Removes the catalog's XMP metadata stream, which duplicates the Info
    /// fields in XML form.
    fn remove_xmp_stream(&self, doc: &mut LopdfDocument) {
        let catalog_id = match self.catalog_id(doc) {
            Some(id) => id,
            None => return,
        };

        let metadata_id = match doc.get_object(catalog_id) {
            Ok(Object::Dictionary(catalog)) => match catalog.get(b"Metadata") {
                Ok(Object::Reference(id)) => Some(*id),
                _ => None,
            },
            _ => None,
        };

        if let Some(metadata_id) = metadata_id {
            doc.objects.remove(&metadata_id);
            if let Ok(Object::Dictionary(ref mut catalog)) = doc.get_object_mut(catalog_id) {
                catalog.remove(b"Metadata");
            }
            log::debug!("removed XMP metadata stream {:?}", metadata_id);
        }
    }

    fn catalog_id(&self, doc: &LopdfDocument) -> Option<ObjectId> {
        match doc.trailer.get(b"Root") {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        }
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}
