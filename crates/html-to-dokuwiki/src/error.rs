//! Error types for clipboard-to-wiki conversion.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConversionError>;

/// Terminal failures of a conversion.
///
/// Failures scoped to a single image node are never surfaced here; they are
/// rendered in-band as comment fragments so the rest of the document still
/// converts.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The clipboard exposes no `text/html` representation at all.
    #[error("no HTML representation found in the clipboard")]
    NoHtmlRepresentation,

    /// The platform refused to hand over a clipboard representation.
    #[error("clipboard access failed: {0}")]
    ClipboardAccess(String),

    /// The HTML payload could not be parsed into a markup tree.
    #[error("failed to parse HTML: {0}")]
    Parse(String),
}

/// Failure reported by the media upload collaborator.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The store answered but refused the file (truthy `error` field or a
    /// non-success HTTP status).
    #[error("upload rejected: {0}")]
    Rejected(String),

    /// The request never produced a usable answer.
    #[error("upload transport error: {0}")]
    Transport(String),
}
