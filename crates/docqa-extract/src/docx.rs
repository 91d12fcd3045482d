use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use docqa_core::error::{Error, Result};

const DOCUMENT_PART: &str = "word/document.xml";

/// Paragraph text in document order, one paragraph per line. Table cells are
/// separated by spaces and each table row ends with a newline.
pub(crate) fn extract(bytes: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::Extraction(format!("Error reading DOCX file: {e}")))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| Error::Extraction(format!("Error reading DOCX file: {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| Error::Extraction(format!("Error reading DOCX file: {e}")))?;
    document_text(&xml)
}

fn document_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut out = String::new();
    let mut in_text = false;
    let mut table_depth = 0usize;
    let mut run_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"r" => run_depth += 1,
                b"tbl" => table_depth += 1,
                _ => {}
            },
            // Tab stops in paragraph properties share the `tab` name; only runs carry content.
            Ok(Event::Empty(ref e)) if run_depth > 0 => match e.local_name().as_ref() {
                b"br" | b"cr" => out.push('\n'),
                b"tab" => out.push('\t'),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => run_depth = run_depth.saturating_sub(1),
                // Paragraphs inside a table cell are joined by the cell separator.
                b"p" if table_depth == 0 => out.push('\n'),
                b"p" => out.push(' '),
                b"tc" => out.push(' '),
                b"tr" => out.push('\n'),
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|err| Error::Extraction(format!("Error reading DOCX file: {err}")))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Extraction(format!(
                    "Error reading DOCX file at position {}: {e}",
                    reader.error_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}
