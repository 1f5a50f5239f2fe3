//! Convert clipboard-flavoured HTML into DokuWiki markup.
//!
//! Word processors put rich text on the clipboard as messy, vendor-heavy
//! HTML. This crate parses that payload into an immutable markup tree and
//! runs a recursive tree-to-text walker over it, producing the small
//! DokuWiki grammar: `====` headings, `**bold**`, `[[link|text]]`,
//! indented `*`/`-` list items, `^`/`|` table rows, and `{{…}}` image
//! transclusions.
//!
//! Conversion is a pure function of the input tree with one exception:
//! image nodes. Their bytes may hide in any of several clipboard
//! representations, so the resolver searches them in priority order and
//! hands whatever it finds to a [`MediaUploader`] before splicing the
//! transclusion reference into the output. An image that cannot be
//! resolved or uploaded degrades to a comment fragment; only a clipboard
//! without any `text/html` representation fails the whole operation.
//!
//! ```no_run
//! # async fn demo() -> html_to_dokuwiki_rs::Result<()> {
//! let markup = html_to_dokuwiki_rs::convert_html("<h2>Notes</h2><p><b>bold</b></p>").await?;
//! assert_eq!(markup, "===== Notes =====\n\n**bold**");
//! # Ok(())
//! # }
//! ```

pub mod clipboard;
mod codec;
mod converter;
mod dom;
mod error;
mod text;
pub mod upload;

pub use clipboard::{ClipboardItem, MemoryItem, HTML_TYPE};
pub use codec::IMAGE_TYPE_PRIORITY;
pub use converter::{convert_clipboard, convert_html, Converter};
pub use dom::{MarkupNode, NodeKind};
pub use error::{ConversionError, Result, UploadError};
pub use upload::{HttpUploader, MediaUploader, NoUploader};
