//! Byte/text codec: base64 payloads and content-type plumbing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Content types probed, in order, when hunting for a raw image stream
/// among the clipboard representations.
pub const IMAGE_TYPE_PRIORITY: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/bmp",
    "image/tiff",
];

/// Decoded image payload plus its inferred content type.
pub(crate) struct DecodedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Decode a `data:image/...;base64,...` reference.
///
/// Returns `None` for non-image data URLs, missing base64 markers, and
/// undecodable payloads; the caller treats all of those as "not found".
pub(crate) fn decode_data_url(url: &str) -> Option<DecodedImage> {
    let rest = strip_prefix_ignore_case(url, "data:")?;
    let (header, payload) = rest.split_once(',')?;

    let mut parts = header.split(';');
    let content_type = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
    if !content_type.starts_with("image/") {
        return None;
    }
    if !parts.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return None;
    }

    let bytes = decode_base64_forgiving(payload)?;
    Some(DecodedImage { bytes, content_type })
}

/// Base64 decode tolerating embedded whitespace and URL-escaped padding,
/// both of which show up in clipboard HTML.
pub(crate) fn decode_base64_forgiving(payload: &str) -> Option<Vec<u8>> {
    let cleaned: String = payload
        .replace("%3D", "=")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    STANDARD.decode(cleaned).ok()
}

/// File extension for a content type; unknown image types fall back to the
/// subtype text itself.
pub(crate) fn extension_for(content_type: &str) -> &str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        "image/tiff" => "tif",
        "image/svg+xml" => "svg",
        other => other.rsplit('/').next().unwrap_or("bin"),
    }
}

/// True when the reference is a data URL rather than a location.
pub(crate) fn is_data_url(url: &str) -> bool {
    strip_prefix_ignore_case(url, "data:").is_some()
}

/// True when the reference points at a local temporary file, the telltale
/// that the source application kept the bytes out of the HTML itself.
pub(crate) fn is_local_file_url(url: &str) -> bool {
    strip_prefix_ignore_case(url, "file:").is_some()
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    // Byte-wise so a multi-byte character at the cut point cannot panic;
    // an ASCII-case-equal prefix guarantees the boundary is valid.
    let (text_bytes, prefix_bytes) = (text.as_bytes(), prefix.as_bytes());
    if text_bytes.len() >= prefix_bytes.len() && text_bytes[..prefix_bytes.len()].eq_ignore_ascii_case(prefix_bytes) {
        Some(&text[prefix_bytes.len()..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_data_url() {
        let decoded = decode_data_url("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(decoded.content_type, "image/png");
        assert_eq!(decoded.bytes, b"hello");
    }

    #[test]
    fn rejects_non_image_and_non_base64() {
        assert!(decode_data_url("data:text/plain;base64,aGVsbG8=").is_none());
        assert!(decode_data_url("data:image/png,rawdata").is_none());
        assert!(decode_data_url("https://example.com/x.png").is_none());
    }

    #[test]
    fn tolerates_whitespace_in_payload() {
        let decoded = decode_data_url("data:image/gif;base64,aGVs\nbG8=").unwrap();
        assert_eq!(decoded.bytes, b"hello");
    }

    #[test]
    fn maps_extensions() {
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/x-emf"), "x-emf");
    }

    #[test]
    fn classifies_references() {
        assert!(is_data_url("DATA:image/png;base64,xx"));
        assert!(is_local_file_url("file:///C:/Users/x/clip_image001.png"));
        assert!(!is_local_file_url("https://example.com/a.png"));
    }
}
