//! Per-page extraction results

use serde::{Deserialize, Serialize};

/// A table cell; `None` when the table has no value at that position
pub type Cell = Option<String>;

/// One table row, cells ordered left to right
pub type Row = Vec<Cell>;

/// A table extracted from a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Rows ordered top to bottom
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Build a table where every cell is present
    pub fn from_strings<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|cell| Some(cell.into())).collect())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest row length
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Everything extracted from a single page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// 0-based page index within the document
    pub index: usize,
    /// Extracted text, `None` if the page yields none
    pub text: Option<String>,
    /// Tables in page order
    pub tables: Vec<Table>,
}

impl PageResult {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            text: None,
            tables: Vec::new(),
        }
    }

    /// 1-based page number used in rendered headers
    pub fn page_number(&self) -> usize {
        self.index + 1
    }

    /// Text to render, skipping pages whose text is empty
    pub fn rendered_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }
}
