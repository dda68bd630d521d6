//! Metadata rewrite of the re-rendered PDF via `lopdf`.
//!
//! Replaces the Info dictionary's Producer and Creator with ours, stamps
//! both dates with the current time, drops the catalog's XMP stream and
//! re-saves with compressed streams.

use crate::config::DocumentInfo;
use crate::error::DocShiftError;
use crate::pipeline::pdf_writer::{pdf_date, save};
use chrono::Utc;
use lopdf::{Dictionary, Document, Object};
use tracing::debug;

/// Rewrites document-level metadata of a finished PDF.
pub trait MetadataRewriter: Send + Sync {
    fn rewrite(&self, pdf: &[u8]) -> Result<Vec<u8>, DocShiftError>;
}

/// [`MetadataRewriter`] on top of `lopdf`.
#[derive(Debug, Clone, Default)]
pub struct LopdfMetadataRewriter {
    info: DocumentInfo,
}

impl LopdfMetadataRewriter {
    pub fn new(info: DocumentInfo) -> Self {
        Self { info }
    }
}

impl MetadataRewriter for LopdfMetadataRewriter {
    fn rewrite(&self, pdf: &[u8]) -> Result<Vec<u8>, DocShiftError> {
        let mut doc = Document::load_mem(pdf).map_err(|e| DocShiftError::CorruptPdf {
            detail: e.to_string(),
        })?;

        let existing = match doc.trailer.get(b"Info") {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        };
        let info_id = match existing {
            Some(id) if doc.get_dictionary(id).is_ok() => id,
            _ => {
                let id = doc.add_object(Dictionary::new());
                doc.trailer.set("Info", id);
                id
            }
        };

        let now = pdf_date(Utc::now());
        let info = doc
            .get_object_mut(info_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| DocShiftError::CorruptPdf {
                detail: e.to_string(),
            })?;
        info.set("Producer", Object::string_literal(self.info.producer.as_str()));
        info.set("Creator", Object::string_literal(self.info.creator.as_str()));
        info.set("CreationDate", now.clone());
        info.set("ModDate", now);

        if let Ok(catalog) = doc.catalog_mut() {
            catalog.remove(b"Metadata");
        }
        let pruned = doc.prune_objects();

        doc.compress();
        let bytes = save(&mut doc).map_err(|e| DocShiftError::CorruptPdf {
            detail: e.to_string(),
        })?;
        debug!(
            "Rewrote metadata: {} → {} bytes, {} objects pruned",
            pdf.len(),
            bytes.len(),
            pruned.len()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageLayout;
    use crate::pipeline::fonts::StandardFonts;
    use crate::pipeline::layout::LayoutEngine;
    use crate::pipeline::pdf_writer::write_pdf;

    fn sample_pdf() -> Vec<u8> {
        let page = PageLayout::default();
        let layout = LayoutEngine::new(page, &StandardFonts).layout("HELLO\nworld");
        let info = DocumentInfo {
            title: "t".into(),
            creator: "Some Browser".into(),
            producer: "Skia/PDF".into(),
        };
        write_pdf(&layout, &page, &info).unwrap()
    }

    fn info_of(bytes: &[u8]) -> Dictionary {
        let doc = Document::load_mem(bytes).unwrap();
        let id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        doc.get_dictionary(id).unwrap().clone()
    }

    #[test]
    fn replaces_producer_and_creator() {
        let out = LopdfMetadataRewriter::default().rewrite(&sample_pdf()).unwrap();
        let info = info_of(&out);
        assert_eq!(info.get(b"Producer").unwrap().as_str().unwrap(), b"md-to-converter");
        assert_eq!(info.get(b"Creator").unwrap().as_str().unwrap(), b"MD-to Converter");
        let date = info.get(b"ModDate").unwrap().as_str().unwrap();
        assert!(date.starts_with(b"D:"));
    }

    #[test]
    fn keeps_pages() {
        let out = LopdfMetadataRewriter::default().rewrite(&sample_pdf()).unwrap();
        assert_eq!(Document::load_mem(&out).unwrap().get_pages().len(), 1);
    }

    #[test]
    fn garbage_is_corrupt() {
        let err = LopdfMetadataRewriter::default()
            .rewrite(b"not a pdf at all")
            .unwrap_err();
        assert!(matches!(err, DocShiftError::CorruptPdf { .. }));
    }
}
