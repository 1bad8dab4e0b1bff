//! Scripted documents for worker tests.
//!
//! A scripted document is a plain file: each line is one page. A line of `!` fails
//! that page, an empty line is a page without text, and `|` splits a line into the
//! cells of a one-row table (`~` for an absent cell). A file whose first line is
//! `#corrupt` fails to open.

use std::path::Path;

use crate::error::{Error, Result};
use crate::source::{DocumentOpener, PageSource};
use crate::types::Table;

pub(crate) struct ScriptedOpener;

pub(crate) struct ScriptedDocument {
    pages: Vec<String>,
}

impl DocumentOpener for ScriptedOpener {
    type Source = ScriptedDocument;

    fn open(&self, path: &Path) -> Result<ScriptedDocument> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::open(path, e.to_string()))?;
        if content.starts_with("#corrupt") {
            return Err(Error::open(path, "not a document"));
        }
        Ok(ScriptedDocument {
            pages: content.lines().map(String::from).collect(),
        })
    }
}

impl ScriptedDocument {
    fn line(&self, index: usize) -> Result<&str> {
        let line = self
            .pages
            .get(index)
            .ok_or_else(|| Error::page(index, "out of range"))?;
        if line == "!" {
            return Err(Error::page(index, "scripted failure"));
        }
        Ok(line)
    }
}

impl PageSource for ScriptedDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<Option<String>> {
        let line = self.line(index)?;
        Ok((!line.is_empty() && !line.contains('|')).then(|| line.to_string()))
    }

    fn page_tables(&self, index: usize) -> Result<Vec<Table>> {
        let line = self.line(index)?;
        if !line.contains('|') {
            return Ok(Vec::new());
        }
        let row = line
            .split('|')
            .map(|cell| (cell != "~").then(|| cell.to_string()))
            .collect();
        Ok(vec![Table::new(vec![row])])
    }
}

/// Write a scripted document with the given pages
pub(crate) fn write_document(path: &Path, pages: &[&str]) {
    std::fs::write(path, pages.join("\n")).unwrap();
}
