//! Image resolution, upload, and transclusion rendering.
//!
//! The actual bytes behind an `<img>` can live in several places
//! depending on which application filled the clipboard; a short strategy
//! chain tries them in priority order, first success wins. All failure is
//! captured in-band: the node degrades to a comment fragment and sibling
//! conversion continues.

use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::codec::{self, IMAGE_TYPE_PRIORITY};
use crate::dom::MarkupNode;

use super::main::Engine;

static MARKUP_DATA_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"data:image/[A-Za-z0-9.+-]+;base64,[A-Za-z0-9+/=]+").unwrap());

// Word wraps embedded drawings in VML shapes whose `o:gfxdata` attribute
// carries the PNG bytes, base64 with folded lines.
static VENDOR_DRAWING: Lazy<Regex> = Lazy::new(|| Regex::new(r#"o:gfxdata="([^"]+)""#).unwrap());

/// Resolved image bytes plus metadata; consumed once by the upload step.
struct ImageSource {
    bytes: Vec<u8>,
    content_type: String,
    file_name: String,
}

/// One candidate method for locating an image's bytes.
///
/// The first three only apply when the `src` points at a local temporary
/// file, the signal that the source application parked the bytes outside
/// the node itself; a document-wide scan for a data-URL `src` would hand
/// every such image the bytes of the first one.
#[derive(Debug, Clone, Copy)]
enum Strategy {
    /// Raw image stream among the clipboard representations.
    ClipboardStream,
    /// First `data:image/…;base64,` reference embedded anywhere in the
    /// raw markup representation text.
    MarkupDataUrl,
    /// Vendor embedded-drawing payload in the same raw text, assumed PNG.
    VendorDrawing,
    /// The node's own `src` attribute as a data URL.
    SourceDataUrl,
}

const RESOLUTION_ORDER: [Strategy; 4] = [
    Strategy::ClipboardStream,
    Strategy::MarkupDataUrl,
    Strategy::VendorDrawing,
    Strategy::SourceDataUrl,
];

/// Render one `<img>` node. Never fails outward.
pub(crate) async fn convert_image(engine: &Engine<'_>, node: &MarkupNode) -> String {
    let Some(source) = resolve(engine, node).await else {
        warn!(src = node.attr("src").unwrap_or(""), "no byte source found for image");
        return comment("image could not be resolved from the clipboard");
    };

    let ImageSource {
        bytes,
        content_type,
        file_name,
    } = source;

    match engine.uploader.upload(&file_name, &content_type, bytes).await {
        Ok(()) => format!("\n{}\n", transclusion(node, &file_name)),
        Err(err) => {
            warn!(file_name, error = %err, "image upload failed");
            comment(&format!("image upload failed: {err}"))
        }
    }
}

async fn resolve(engine: &Engine<'_>, node: &MarkupNode) -> Option<ImageSource> {
    let src = node.attr("src");

    for strategy in RESOLUTION_ORDER {
        let found = match strategy {
            Strategy::ClipboardStream => from_clipboard_stream(engine, src).await,
            Strategy::MarkupDataUrl => from_markup_data_url(engine, src),
            Strategy::VendorDrawing => from_vendor_drawing(engine, src),
            Strategy::SourceDataUrl => from_source_data_url(src),
        };
        if let Some((bytes, content_type)) = found {
            debug!(?strategy, content_type, size = bytes.len(), "image bytes resolved");
            let file_name = synthesize_file_name(&content_type);
            return Some(ImageSource {
                bytes,
                content_type,
                file_name,
            });
        }
    }
    None
}

async fn from_clipboard_stream(engine: &Engine<'_>, src: Option<&str>) -> Option<(Vec<u8>, String)> {
    // A local temp-file src is the strong signal that the source
    // application parked the bytes in a separate representation.
    if !src.is_some_and(codec::is_local_file_url) {
        return None;
    }
    let item = engine.clipboard?;
    let available = item.types();

    for content_type in IMAGE_TYPE_PRIORITY {
        if !available.iter().any(|ty| ty == content_type) {
            continue;
        }
        // A failed read of one representation is contained; keep probing.
        match item.read(content_type).await {
            Ok(bytes) => return Some((bytes, (*content_type).to_string())),
            Err(err) => debug!(content_type, error = %err, "clipboard representation unreadable"),
        }
    }
    None
}

fn from_markup_data_url(engine: &Engine<'_>, src: Option<&str>) -> Option<(Vec<u8>, String)> {
    if !src.is_some_and(codec::is_local_file_url) {
        return None;
    }
    let m = MARKUP_DATA_URL.find(engine.html)?;
    let decoded = codec::decode_data_url(m.as_str())?;
    Some((decoded.bytes, decoded.content_type))
}

fn from_vendor_drawing(engine: &Engine<'_>, src: Option<&str>) -> Option<(Vec<u8>, String)> {
    if !src.is_some_and(codec::is_local_file_url) {
        return None;
    }
    let captures = VENDOR_DRAWING.captures(engine.html)?;
    let bytes = codec::decode_base64_forgiving(&captures[1])?;
    Some((bytes, "image/png".to_string()))
}

fn from_source_data_url(src: Option<&str>) -> Option<(Vec<u8>, String)> {
    let src = src.filter(|s| codec::is_data_url(s))?;
    let decoded = codec::decode_data_url(src)?;
    Some((decoded.bytes, decoded.content_type))
}

/// File name from the current time and a content-type-derived extension.
fn synthesize_file_name(content_type: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("pasted_image_{millis}.{}", codec::extension_for(content_type))
}

/// `{{file[?WxH]|title|alt}}`; the `x` and height vanish together, title
/// and alt fall back to the `name` attribute.
fn transclusion(node: &MarkupNode, file_name: &str) -> String {
    let width = node.attr("width");
    let height = node.attr("height");
    let dimensions = match (width, height) {
        (None, None) => String::new(),
        (w, Some(h)) => format!("?{}x{h}", w.unwrap_or("")),
        (Some(w), None) => format!("?{w}"),
    };

    let title = node.attr("title").or_else(|| node.attr("name")).unwrap_or("");
    let alt = node.attr("alt").or_else(|| node.attr("name")).unwrap_or("");

    format!("{{{{{file_name}{dimensions}|{title}|{alt}}}}}")
}

fn comment(reason: &str) -> String {
    format!("<!-- {reason} -->")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_fragment;

    #[test]
    fn transclusion_dimension_forms() {
        let node = |html: &str| parse_fragment(html).unwrap().remove(0);

        let plain = node(r#"<img src="x">"#);
        assert_eq!(transclusion(&plain, "f.png"), "{{f.png||}}");

        let both = node(r#"<img src="x" width="200" height="100">"#);
        assert_eq!(transclusion(&both, "f.png"), "{{f.png?200x100||}}");

        let width_only = node(r#"<img src="x" width="200">"#);
        assert_eq!(transclusion(&width_only, "f.png"), "{{f.png?200||}}");

        let height_only = node(r#"<img src="x" height="100">"#);
        assert_eq!(transclusion(&height_only, "f.png"), "{{f.png?x100||}}");
    }

    #[test]
    fn transclusion_title_alt_fallback() {
        let node = parse_fragment(r#"<img src="x" name="shape1">"#).unwrap().remove(0);
        assert_eq!(transclusion(&node, "f.png"), "{{f.png|shape1|shape1}}");

        let node = parse_fragment(r#"<img src="x" alt="chart" title="Q3">"#).unwrap().remove(0);
        assert_eq!(transclusion(&node, "f.png"), "{{f.png|Q3|chart}}");
    }

    #[test]
    fn file_name_uses_extension() {
        let name = synthesize_file_name("image/jpeg");
        assert!(name.starts_with("pasted_image_"));
        assert!(name.ends_with(".jpg"));
    }
}
