//! Entry points and the recursive tree walker.

use futures::future::{join_all, LocalBoxFuture};
use futures::FutureExt;

use crate::clipboard::{self, ClipboardItem};
use crate::dom::{self, MarkupNode, NodeKind};
use crate::error::Result;
use crate::text;
use crate::upload::{MediaUploader, NoUploader};

use super::{image, list, table};

static NO_UPLOADER: NoUploader = NoUploader;

/// Convert an HTML string to DokuWiki markup without any clipboard or
/// upload context.
///
/// Images that would need an upload degrade to comment fragments; the
/// conversion itself is a pure function of the input.
pub async fn convert_html(html: &str) -> Result<String> {
    Converter::new().convert(html).await
}

/// Convert the first clipboard item carrying a `text/html` representation.
///
/// The same item's other representations are searched when an image's
/// bytes are not embedded in the HTML itself; resolved bytes go through
/// `uploader` before the transclusion reference is rendered.
pub async fn convert_clipboard(items: &[&dyn ClipboardItem], uploader: &dyn MediaUploader) -> Result<String> {
    let (item, html) = clipboard::find_html(items).await?;
    Converter::new()
        .with_clipboard(item)
        .with_uploader(uploader)
        .convert(&html)
        .await
}

/// Configurable conversion surface.
///
/// A bare `Converter` is the pure `convert(html) -> markup` capability;
/// clipboard and uploader collaborators are optional extras for the image
/// path.
pub struct Converter<'a> {
    clipboard: Option<&'a dyn ClipboardItem>,
    uploader: &'a dyn MediaUploader,
}

impl Default for Converter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Converter<'a> {
    /// Converter with no upload endpoint and no clipboard context.
    pub fn new() -> Self {
        Self {
            clipboard: None,
            uploader: &NO_UPLOADER,
        }
    }

    /// Attach the clipboard item whose representations may hold image
    /// bytes the HTML only points at.
    #[must_use]
    pub fn with_clipboard(mut self, item: &'a dyn ClipboardItem) -> Self {
        self.clipboard = Some(item);
        self
    }

    /// Attach the media upload collaborator.
    #[must_use]
    pub fn with_uploader(mut self, uploader: &'a dyn MediaUploader) -> Self {
        self.uploader = uploader;
        self
    }

    /// Run one conversion: parse, walk, squeeze blank lines, trim.
    pub async fn convert(&self, html: &str) -> Result<String> {
        let roots = dom::parse_fragment(html)?;
        let engine = Engine {
            html,
            clipboard: self.clipboard,
            uploader: self.uploader,
        };
        let body = engine.convert_children(&roots, 0).await;
        Ok(text::squeeze_blank_lines(&body).trim().to_string())
    }
}

/// Per-conversion state shared by all handlers.
///
/// `html` is the raw markup representation text, kept around because two
/// of the image resolver strategies scan it for embedded base64 payloads.
pub(crate) struct Engine<'a> {
    pub(crate) html: &'a str,
    pub(crate) clipboard: Option<&'a dyn ClipboardItem>,
    pub(crate) uploader: &'a dyn MediaUploader,
}

impl Engine<'_> {
    /// The tree walker: dispatch one node to its handler.
    ///
    /// Boxed because the recursion suspends at image I/O; everything else
    /// completes without yielding.
    pub(crate) fn convert_node<'b>(&'b self, node: &'b MarkupNode, depth: usize) -> LocalBoxFuture<'b, String> {
        async move {
            let tag = match node {
                // No escaping of wiki metacharacters in text content; a
                // documented limitation of the dialect, not an oversight.
                MarkupNode::Text(raw) => return text::collapse_whitespace(raw).into_owned(),
                MarkupNode::Element { tag, .. } => tag,
            };

            match NodeKind::from_tag(tag) {
                NodeKind::Heading(level) => {
                    let markers = "=".repeat(7 - usize::from(level));
                    let content = self.render_inline(node).await;
                    format!("\n{markers} {content} {markers}\n")
                }
                NodeKind::Paragraph => {
                    let content = self.render_inline(node).await;
                    if content.is_empty() {
                        "\n".to_string()
                    } else {
                        format!("\n{content}\n")
                    }
                }
                NodeKind::LineBreak => "\n".to_string(),
                NodeKind::Strong => format!("**{}**", self.render_inline(node).await),
                NodeKind::Emphasis => format!("//{}//", self.render_inline(node).await),
                NodeKind::Underline => format!("__{}__", self.render_inline(node).await),
                NodeKind::InlineTag(name) => {
                    format!("<{name}>{}</{name}>", self.render_inline(node).await)
                }
                NodeKind::Link => {
                    let label = self.render_inline(node).await;
                    match node.attr("href") {
                        Some(href) => format!("[[{href}|{label}]]"),
                        None => label,
                    }
                }
                NodeKind::Code => {
                    // Whitespace inside code blocks survives verbatim.
                    format!("\n<code>\n{}\n</code>\n", preformatted_text(node))
                }
                NodeKind::HorizontalRule => "\n----\n".to_string(),
                NodeKind::DefinitionList => self.convert_definition_list(node).await,
                NodeKind::Blockquote => {
                    // Single-line quote; nested multi-paragraph quoting is
                    // not attempted.
                    format!("\n> {}\n", self.render_inline(node).await)
                }
                NodeKind::BulletList => list::format_list(self, node, '*', depth).await,
                NodeKind::OrderedList => list::format_list(self, node, '-', depth).await,
                NodeKind::Table => table::convert_table(self, node).await,
                NodeKind::Image => image::convert_image(self, node).await,
                // The transparent arm: recurse into children at the same
                // depth with no wrapping markup, block-level or not.
                NodeKind::Other => self.convert_children(node.children(), depth).await,
            }
        }
        .boxed_local()
    }

    /// Convert sibling nodes: issue every conversion first, then join in
    /// original document order. Output never depends on which suspension
    /// resolves first.
    pub(crate) async fn convert_children(&self, nodes: &[MarkupNode], depth: usize) -> String {
        join_all(nodes.iter().map(|node| self.convert_node(node, depth)))
            .await
            .concat()
    }

    /// Rendered content of a node's children with surrounding whitespace
    /// trimmed; the building block of every block-level handler.
    pub(crate) async fn render_inline(&self, node: &MarkupNode) -> String {
        self.convert_children(node.children(), 0).await.trim().to_string()
    }

    /// `dl`: terms on their own lines, descriptions prefixed `: `, other
    /// children ignored.
    async fn convert_definition_list(&self, node: &MarkupNode) -> String {
        let entries: Vec<&MarkupNode> = node
            .children()
            .iter()
            .filter(|child| child.is_element("dt") || child.is_element("dd"))
            .collect();

        let rendered = join_all(entries.iter().map(|entry| self.render_inline(entry))).await;

        entries
            .iter()
            .zip(rendered)
            .map(|(entry, content)| {
                if entry.is_element("dt") {
                    format!("\n{content}")
                } else {
                    format!(": {content}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Concatenated text content of a subtree, whitespace preserved.
fn preformatted_text(node: &MarkupNode) -> String {
    fn collect(node: &MarkupNode, out: &mut String) {
        match node {
            MarkupNode::Text(raw) => out.push_str(raw),
            MarkupNode::Element { children, .. } => {
                for child in children {
                    collect(child, out);
                }
            }
        }
    }

    let mut out = String::new();
    collect(node, &mut out);
    out.trim().to_string()
}
