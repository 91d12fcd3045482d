const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// UTF-8 (BOM stripped) when valid, otherwise Latin-1, which maps every byte.
pub(crate) fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            tracing::debug!("text is not valid UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}
