//! Raw document bytes to plain text.
//!
//! The format is chosen from the declared MIME type; when that is missing or
//! generic (`application/octet-stream`) the file extension decides.
mod docx;
mod format;
mod pdf;
mod text;

pub use format::{mime_for_path, DocumentFormat};

use docqa_core::error::{Error, Result};
use docqa_core::types::SourceDocument;

/// Extract the text of `bytes` declared as `mime_type`.
pub fn extract(bytes: &[u8], mime_type: &str) -> Result<String> {
    let format = DocumentFormat::from_mime(mime_type)
        .ok_or_else(|| Error::UnsupportedFormat { mime_type: mime_type.to_string() })?;
    extract_as(bytes, format)
}

pub fn extract_as(bytes: &[u8], format: DocumentFormat) -> Result<String> {
    let text = match format {
        DocumentFormat::Pdf => pdf::extract(bytes)?,
        DocumentFormat::PlainText => text::decode(bytes),
        DocumentFormat::Docx => docx::extract(bytes)?,
    };
    tracing::debug!(format = format.as_str(), bytes = bytes.len(), chars = text.len(), "extracted text");
    Ok(text)
}

/// Extract a [`SourceDocument`], falling back to its file extension when the
/// declared type is absent or generic.
pub fn extract_document(doc: &SourceDocument) -> Result<String> {
    let format = DocumentFormat::from_mime(&doc.mime_type)
        .or_else(|| {
            if format::is_generic(&doc.mime_type) {
                DocumentFormat::from_path(&doc.source_name)
            } else {
                None
            }
        })
        .ok_or_else(|| Error::UnsupportedFormat { mime_type: doc.mime_type.clone() })?;
    extract_as(&doc.bytes, format)
}
