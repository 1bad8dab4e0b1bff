//! Document access: the page-level capability the engine reads from
//!
//! A [`DocumentOpener`] turns a path into a [`PageSource`]. The engine and workers
//! only talk to these traits; [`PdfOpener`] is the lopdf-backed implementation.

mod layout;
mod normalize;
mod pdf;

use std::path::Path;

use crate::error::Result;
use crate::types::Table;

pub use layout::{detect_tables, TextFragment};
pub use normalize::clean_page_text;
pub use pdf::{PdfDocument, PdfOpener};

/// An open, paginated document
pub trait PageSource {
    /// Number of pages in the document
    fn page_count(&self) -> usize;

    /// Text of the 0-based page `index`, `None` when the page has no text
    fn page_text(&self, index: usize) -> Result<Option<String>>;

    /// Tables found on the 0-based page `index`, in page order
    fn page_tables(&self, index: usize) -> Result<Vec<Table>>;
}

/// Opens documents for extraction.
///
/// Openers are shared between the submitting context and job tasks, so they must be
/// `Send + Sync`. Each call returns an independent source scoped to one document.
pub trait DocumentOpener: Send + Sync + 'static {
    type Source: PageSource;

    fn open(&self, path: &Path) -> Result<Self::Source>;
}
