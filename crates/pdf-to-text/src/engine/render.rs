//! Rendering of page results into the plain-text output format

use std::fmt::Write;

use crate::types::{ExtractionMode, PageResult, Table};

/// Separator between the cells of a rendered table row
pub const CELL_DELIMITER: &str = ",";

/// Render page results in page order.
///
/// Each page contributes its text block (when the mode wants text and the page has
/// any) followed by one block per table (when the mode wants tables).
pub fn render(pages: &[PageResult], mode: ExtractionMode) -> String {
    let mut out = String::new();
    for page in pages {
        render_page(&mut out, page, mode);
    }
    out
}

/// Append one page's blocks to `out`
pub fn render_page(out: &mut String, page: &PageResult, mode: ExtractionMode) {
    let number = page.page_number();

    if mode.wants_text() {
        if let Some(text) = page.rendered_text() {
            let _ = writeln!(out, "--- Page {} Text ---", number);
            out.push_str(text);
            out.push('\n');
        }
    }

    if mode.wants_tables() {
        for (index, table) in page.tables.iter().enumerate() {
            let _ = writeln!(out, "Page {} - Table {}:", number, index + 1);
            render_table(out, table);
            out.push('\n');
        }
    }
}

/// Append a table's rows, one line each, absent cells as empty strings
pub fn render_table(out: &mut String, table: &Table) {
    for row in &table.rows {
        let line = row
            .iter()
            .map(|cell| cell.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(CELL_DELIMITER);
        out.push_str(&line);
        out.push('\n');
    }
}
