use std::panic::{self, AssertUnwindSafe};

use docqa_core::error::{Error, Result};

/// Pages are concatenated in order. Malformed input can panic inside the
/// parser, so that is caught and reported like any other parse failure.
pub(crate) fn extract(bytes: &[u8]) -> Result<String> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)));
    match outcome {
        Ok(Ok(text)) if text.trim().is_empty() => {
            Err(Error::Extraction("Error reading PDF: no extractable text (scanned or encrypted?)".into()))
        }
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(Error::Extraction(format!("Error reading PDF: {e}"))),
        Err(_) => Err(Error::Extraction("Error reading PDF: parser aborted on malformed input".into())),
    }
}
