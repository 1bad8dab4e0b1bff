//! Extraction engine: page results in, rendered content out
//!
//! Nothing in here spawns tasks or touches the filesystem; the workers wrap these
//! functions with threading, events and persistence.

mod extract;
mod render;

pub use extract::{extract_document, extract_page, progress_percent};
pub use render::{render, render_page, render_table, CELL_DELIMITER};
