use std::path::Path;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    PlainText,
    Docx,
}

impl DocumentFormat {
    /// Parameters such as `; charset=utf-8` are ignored.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let essence = mime_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match essence.as_str() {
            MIME_PDF => Some(Self::Pdf),
            MIME_TEXT => Some(Self::PlainText),
            MIME_DOCX => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::PlainText),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref().extension().and_then(|e| e.to_str()).and_then(Self::from_extension)
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => MIME_PDF,
            Self::PlainText => MIME_TEXT,
            Self::Docx => MIME_DOCX,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::PlainText => "txt",
            Self::Docx => "docx",
        }
    }
}

/// Declared types that carry no format information.
pub(crate) fn is_generic(mime_type: &str) -> bool {
    let m = mime_type.trim();
    m.is_empty() || m.eq_ignore_ascii_case("application/octet-stream")
}

/// MIME type implied by a path's extension, or `application/octet-stream`.
pub fn mime_for_path<P: AsRef<Path>>(path: P) -> &'static str {
    DocumentFormat::from_path(path).map_or("application/octet-stream", DocumentFormat::mime_type)
}
