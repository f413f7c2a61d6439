//! Charset handling for fetched and persisted pages.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode page as {encoding}")]
    DecodeFailure { encoding: String },
}

/// Decode raw page bytes into UTF-8 text.
///
/// Encoding resolution order: BOM, then the `Content-Type` charset
/// parameter, then chardetng detection over the full body.
pub fn decode_page(bytes: &[u8], content_type: Option<&str>) -> Result<String, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(charset_label) {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, encoding);
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').find_map(|part| {
        let part = part.trim();
        if part.len() > 8 && part[..8].eq_ignore_ascii_case("charset=") {
            Some(part[8..].trim_matches(['"', '\''].as_ref()))
        } else {
            None
        }
    })
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> Result<String, DecodeError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: encoding.name().to_string(),
        });
    }
    Ok(text.into_owned())
}
