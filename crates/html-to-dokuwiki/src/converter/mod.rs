//! The HTML-to-DokuWiki conversion engine.
//!
//! One mutually-recursive engine, not a pipeline: every block handler
//! recurses back into the tree walker for its child content.

mod image;
mod list;
mod main;
mod table;

pub use main::{convert_clipboard, convert_html, Converter};
