use encoding_rs::{UTF_16BE, UTF_16LE, WINDOWS_1252};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decode an exported battle-result file into text.
///
/// The game's exporter and the various community converters don't agree on an
/// encoding, so:
/// 1. A UTF-8 BOM is stripped.
/// 2. UTF-16 LE/BE files are detected by their BOM and transcoded.
/// 3. Plain UTF-8 is used as-is.
/// 4. Anything else is decoded as Windows-1252 so the JSON parser at least
///    sees the structural characters intact.
pub fn decode_document_bytes(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        return String::from_utf8_lossy(rest).into_owned();
    }

    if bytes.starts_with(&[0xFF, 0xFE]) {
        let (cow, _, _) = UTF_16LE.decode(bytes);
        return cow.into_owned();
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let (cow, _, _) = UTF_16BE.decode(bytes);
        return cow.into_owned();
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            log::debug!("Document is not valid UTF-8, decoding as Windows-1252");
            let (cow, _, _) = WINDOWS_1252.decode(bytes);
            cow.into_owned()
        }
    }
}
