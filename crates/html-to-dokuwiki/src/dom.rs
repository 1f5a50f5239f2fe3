//! Owned markup tree built from the parsed clipboard payload.
//!
//! The `tl` DOM borrows from the input string, which does not mix well with
//! a suspension-heavy walker. The payload is therefore parsed once and
//! lifted into an owned [`MarkupNode`] tree that stays immutable for the
//! duration of the conversion.

use std::borrow::Cow;

use crate::error::{ConversionError, Result};
use crate::text;

/// One node of the parsed clipboard payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    /// A text run, entities already decoded, whitespace untouched.
    Text(String),
    /// An element with its tag name (lowercased), attributes in document
    /// order, and children in document order.
    Element {
        /// Lowercased tag name.
        tag: String,
        /// Attribute key/value pairs; valueless attributes carry `""`.
        attrs: Vec<(String, String)>,
        /// Child nodes in document order.
        children: Vec<MarkupNode>,
    },
}

impl MarkupNode {
    /// Children of an element; empty slice for text nodes.
    pub fn children(&self) -> &[MarkupNode] {
        match self {
            Self::Text(_) => &[],
            Self::Element { children, .. } => children,
        }
    }

    /// First value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
        }
    }

    /// Tag name for elements, `None` for text nodes.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Element { tag, .. } => Some(tag.as_str()),
        }
    }

    /// True for elements whose tag matches (ASCII case-insensitive).
    pub fn is_element(&self, name: &str) -> bool {
        self.tag().is_some_and(|tag| tag.eq_ignore_ascii_case(name))
    }

    /// All elements with the given tag anywhere in this subtree, document
    /// order.
    pub fn descendants_named<'a>(&'a self, name: &str, found: &mut Vec<&'a MarkupNode>) {
        for child in self.children() {
            if child.is_element(name) {
                found.push(child);
            }
            child.descendants_named(name, found);
        }
    }
}

/// The closed dispatch enumeration the tree walker matches on.
///
/// Derived from the tag name alone; everything the converter does not give
/// dedicated treatment lands in the explicit [`NodeKind::Other`] arm, which
/// recurses transparently into children. That arm deliberately makes no
/// block-versus-inline distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// `h1`..`h6`, with the level.
    Heading(u8),
    /// `p`.
    Paragraph,
    /// `br`.
    LineBreak,
    /// `strong` / `b`.
    Strong,
    /// `em` / `i`.
    Emphasis,
    /// `u`.
    Underline,
    /// Inline marks DokuWiki spells as literal paired tags: `del`, `sub`,
    /// `sup`, `kbd`.
    InlineTag(&'static str),
    /// `a`.
    Link,
    /// `pre` / `code`.
    Code,
    /// `hr`.
    HorizontalRule,
    /// `dl`.
    DefinitionList,
    /// `blockquote`.
    Blockquote,
    /// `ul`.
    BulletList,
    /// `ol`.
    OrderedList,
    /// `table`.
    Table,
    /// `img`.
    Image,
    /// Anything else: transparent recursion, no wrapping markup.
    Other,
}

impl NodeKind {
    /// Classify a lowercased tag name.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "p" => Self::Paragraph,
            "br" => Self::LineBreak,
            "strong" | "b" => Self::Strong,
            "em" | "i" => Self::Emphasis,
            "u" => Self::Underline,
            "del" | "s" | "strike" => Self::InlineTag("del"),
            "sub" => Self::InlineTag("sub"),
            "sup" => Self::InlineTag("sup"),
            "kbd" => Self::InlineTag("kbd"),
            "a" => Self::Link,
            "pre" | "code" => Self::Code,
            "hr" => Self::HorizontalRule,
            "dl" => Self::DefinitionList,
            "blockquote" => Self::Blockquote,
            "ul" => Self::BulletList,
            "ol" => Self::OrderedList,
            "table" => Self::Table,
            "img" => Self::Image,
            _ => Self::Other,
        }
    }
}

/// Parse an HTML fragment into the root nodes of an owned markup tree.
pub fn parse_fragment(html: &str) -> Result<Vec<MarkupNode>> {
    let dom = tl::parse(html, tl::ParserOptions::default())
        .map_err(|err| ConversionError::Parse(err.to_string()))?;
    let parser = dom.parser();

    let mut roots = Vec::new();
    for handle in dom.children() {
        if let Some(node) = lift_node(*handle, parser) {
            roots.push(node);
        }
    }
    Ok(roots)
}

fn lift_node(handle: tl::NodeHandle, parser: &tl::Parser) -> Option<MarkupNode> {
    match handle.get(parser)? {
        tl::Node::Raw(bytes) => {
            let raw = bytes.as_utf8_str();
            if raw.is_empty() {
                return None;
            }
            Some(MarkupNode::Text(text::decode_entities(raw.as_ref()).into_owned()))
        }
        tl::Node::Tag(tag) => {
            let name = normalized_tag_name(tag.name().as_utf8_str()).into_owned();

            let attrs = tag
                .attributes()
                .iter()
                .map(|(key, value)| {
                    let value = value.map(|v| text::decode_entities(v.as_ref()).into_owned());
                    (key.to_string().to_ascii_lowercase(), value.unwrap_or_default())
                })
                .collect();

            let children = tag
                .children()
                .top()
                .iter()
                .filter_map(|child| lift_node(*child, parser))
                .collect();

            Some(MarkupNode::Element {
                tag: name,
                attrs,
                children,
            })
        }
        tl::Node::Comment(_) => None,
    }
}

/// Lowercase a tag name, borrowing when it already is lowercase.
fn normalized_tag_name(name: Cow<'_, str>) -> Cow<'_, str> {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        name
    }
}
