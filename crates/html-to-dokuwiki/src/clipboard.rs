//! Boundary to the platform clipboard.
//!
//! The engine never talks to a real clipboard itself; callers hand it
//! something that looks like one. An item is a bag of alternative
//! representations of the same payload, keyed by content type, each
//! readable on demand (reading is a suspension point on real platforms).

use async_trait::async_trait;

use crate::error::{ConversionError, Result};

/// The content type the whole conversion hinges on.
pub const HTML_TYPE: &str = "text/html";

/// One clipboard item: a set of content types and an accessor per type.
#[async_trait(?Send)]
pub trait ClipboardItem {
    /// Content types this item can produce.
    fn types(&self) -> Vec<String>;

    /// Read the representation for one content type.
    ///
    /// Asking for a type not in [`ClipboardItem::types`] is an access
    /// error, not a panic.
    async fn read(&self, content_type: &str) -> Result<Vec<u8>>;
}

/// In-memory clipboard item, used by the CLI adapter and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryItem {
    representations: Vec<(String, Vec<u8>)>,
}

impl MemoryItem {
    /// Empty item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one representation.
    #[must_use]
    pub fn with(mut self, content_type: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.representations.push((content_type.to_string(), bytes.into()));
        self
    }
}

#[async_trait(?Send)]
impl ClipboardItem for MemoryItem {
    fn types(&self) -> Vec<String> {
        self.representations.iter().map(|(ty, _)| ty.clone()).collect()
    }

    async fn read(&self, content_type: &str) -> Result<Vec<u8>> {
        self.representations
            .iter()
            .find(|(ty, _)| ty == content_type)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| ConversionError::ClipboardAccess(format!("no {content_type} representation")))
    }
}

/// Find the first item carrying `text/html` and return it with its decoded
/// text. Absence is the terminal no-markup-representation failure.
pub(crate) async fn find_html<'a>(items: &[&'a dyn ClipboardItem]) -> Result<(&'a dyn ClipboardItem, String)> {
    for item in items {
        if item.types().iter().any(|ty| ty == HTML_TYPE) {
            let bytes = item.read(HTML_TYPE).await?;
            return Ok((*item, String::from_utf8_lossy(&bytes).into_owned()));
        }
    }
    Err(ConversionError::NoHtmlRepresentation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_html_representation() {
        let text_only = MemoryItem::new().with("text/plain", "plain");
        let with_html = MemoryItem::new().with("text/plain", "plain").with(HTML_TYPE, "<p>hi</p>");
        let items: Vec<&dyn ClipboardItem> = vec![&text_only, &with_html];

        let (_, html) = find_html(&items).await.unwrap();
        assert_eq!(html, "<p>hi</p>");
    }

    #[tokio::test]
    async fn missing_html_is_terminal() {
        let text_only = MemoryItem::new().with("text/plain", "plain");
        let items: Vec<&dyn ClipboardItem> = vec![&text_only];

        assert!(matches!(
            find_html(&items).await,
            Err(ConversionError::NoHtmlRepresentation)
        ));
    }
}
