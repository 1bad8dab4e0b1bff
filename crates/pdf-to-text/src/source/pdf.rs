//! PDF page source backed by lopdf

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};
use std::path::{Path, PathBuf};

use super::layout::{detect_tables, TextFragment};
use super::normalize::{clean_page_text, normalize_glyphs};
use super::{DocumentOpener, PageSource};
use crate::config::TableConfig;
use crate::error::{Error, Result};
use crate::types::Table;

/// Average glyph advance as a fraction of the font size, used when estimating
/// fragment widths without font metrics
const AVERAGE_GLYPH_WIDTH: f32 = 0.5;

/// Opens PDF files from disk
#[derive(Debug, Clone, Default)]
pub struct PdfOpener {
    tables: TableConfig,
}

impl PdfOpener {
    pub fn new(tables: TableConfig) -> Self {
        Self { tables }
    }
}

impl DocumentOpener for PdfOpener {
    type Source = PdfDocument;

    fn open(&self, path: &Path) -> Result<PdfDocument> {
        PdfDocument::open(path, self.tables.clone())
    }
}

/// A loaded PDF document
pub struct PdfDocument {
    path: PathBuf,
    doc: Document,
    /// Page numbers (1-based, as lopdf numbers them) and object ids in page order
    pages: Vec<(u32, ObjectId)>,
    tables: TableConfig,
}

impl PdfDocument {
    pub fn open(path: &Path, tables: TableConfig) -> Result<Self> {
        let doc = Document::load(path).map_err(|e| Error::open(path, e.to_string()))?;

        if doc.trailer.has(b"Encrypt") {
            return Err(Error::open(path, "encrypted documents are not supported"));
        }

        let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();
        tracing::debug!("Opened {} ({} pages)", path.display(), pages.len());

        Ok(Self {
            path: path.to_path_buf(),
            doc,
            pages,
            tables,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn page_entry(&self, index: usize) -> Result<(u32, ObjectId)> {
        self.pages
            .get(index)
            .copied()
            .ok_or_else(|| Error::page(index, format!("document has {} pages", self.pages.len())))
    }

    /// Positioned text fragments shown by the page's content stream
    pub fn page_fragments(&self, index: usize) -> Result<Vec<TextFragment>> {
        let (_, page_id) = self.page_entry(index)?;
        let data = self
            .doc
            .get_page_content(page_id)
            .map_err(|e| Error::page(index, format!("failed to read content stream: {}", e)))?;
        let content = Content::decode(&data)
            .map_err(|e| Error::page(index, format!("failed to decode content stream: {}", e)))?;

        let mut state = TextState {
            split_gap: self.tables.cell_gap,
            ..TextState::default()
        };
        for operation in &content.operations {
            state.apply(operation);
        }
        Ok(state.fragments)
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<Option<String>> {
        let (page_number, _) = self.page_entry(index)?;
        let raw = self
            .doc
            .extract_text(&[page_number])
            .map_err(|e| Error::page(index, e.to_string()))?;
        Ok(clean_page_text(&raw))
    }

    fn page_tables(&self, index: usize) -> Result<Vec<Table>> {
        let fragments = self.page_fragments(index)?;
        Ok(detect_tables(&fragments, &self.tables))
    }
}

type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Text-object state needed to place shown strings on the page
struct TextState {
    text_matrix: Matrix,
    line_matrix: Matrix,
    font_size: f32,
    leading: f32,
    /// Gap (in points) inside a TJ array that starts a new fragment
    split_gap: f32,
    fragments: Vec<TextFragment>,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            font_size: 12.0,
            leading: 0.0,
            split_gap: TableConfig::default().cell_gap,
            fragments: Vec::new(),
        }
    }
}

impl TextState {
    fn apply(&mut self, op: &Operation) {
        let operands = &op.operands;
        match op.operator.as_str() {
            "BT" => {
                self.text_matrix = IDENTITY;
                self.line_matrix = IDENTITY;
            }
            "Tf" => {
                if let Some(size) = operands.get(1).and_then(number) {
                    self.font_size = size.abs();
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(number) {
                    self.leading = leading;
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (
                    operands.first().and_then(number),
                    operands.get(1).and_then(number),
                ) {
                    if op.operator == "TD" {
                        self.leading = -ty;
                    }
                    self.next_line(tx, ty);
                }
            }
            "Tm" => {
                let values: Vec<f32> = operands.iter().filter_map(number).collect();
                if let [a, b, c, d, e, f] = values[..] {
                    self.text_matrix = [a, b, c, d, e, f];
                    self.line_matrix = self.text_matrix;
                }
            }
            "T*" => self.next_line(0.0, -self.leading),
            "Tj" => {
                if let Some(bytes) = operands.first().and_then(string_bytes) {
                    self.show(&decode_pdf_string(bytes));
                }
            }
            "'" => {
                self.next_line(0.0, -self.leading);
                if let Some(bytes) = operands.first().and_then(string_bytes) {
                    self.show(&decode_pdf_string(bytes));
                }
            }
            "\"" => {
                self.next_line(0.0, -self.leading);
                if let Some(bytes) = operands.get(2).and_then(string_bytes) {
                    self.show(&decode_pdf_string(bytes));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    self.show_array(items);
                }
            }
            _ => {}
        }
    }

    fn next_line(&mut self, tx: f32, ty: f32) {
        let [a, b, c, d, e, f] = self.line_matrix;
        self.line_matrix = [a, b, c, d, tx * a + ty * c + e, tx * b + ty * d + f];
        self.text_matrix = self.line_matrix;
    }

    fn scale(&self) -> f32 {
        let [a, b, ..] = self.text_matrix;
        let scale = (a * a + b * b).sqrt();
        if scale > 0.0 {
            scale
        } else {
            1.0
        }
    }

    fn advance(&mut self, distance: f32) {
        self.text_matrix[4] += distance;
    }

    fn show(&mut self, text: &str) {
        let width = estimate_width(text, self.font_size * self.scale());
        self.push_fragment(text, width);
        self.advance(width);
    }

    fn show_array(&mut self, items: &[Object]) {
        let mut pending = String::new();
        let mut start = self.text_matrix[4];
        let size = self.font_size * self.scale();

        for item in items {
            if let Some(bytes) = string_bytes(item) {
                let text = decode_pdf_string(bytes);
                self.advance(estimate_width(&text, size));
                pending.push_str(&text);
            } else if let Some(adjust) = number(item) {
                // Adjustments are in thousandths of text space; negative moves right
                let distance = -adjust / 1000.0 * size;
                if distance >= self.split_gap {
                    let end = self.text_matrix[4];
                    self.push_fragment_at(start, &pending, end - start);
                    pending.clear();
                    self.advance(distance);
                    start = self.text_matrix[4];
                } else {
                    if distance > size * 0.2 {
                        pending.push(' ');
                    }
                    self.advance(distance);
                }
            }
        }

        let end = self.text_matrix[4];
        self.push_fragment_at(start, &pending, end - start);
    }

    fn push_fragment(&mut self, text: &str, width: f32) {
        let x = self.text_matrix[4];
        self.push_fragment_at(x, text, width);
    }

    fn push_fragment_at(&mut self, x: f32, text: &str, width: f32) {
        let text = normalize_glyphs(text);
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.fragments.push(TextFragment::new(
            x,
            self.text_matrix[5],
            width.max(0.0),
            text,
        ));
    }
}

fn estimate_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVERAGE_GLYPH_WIDTH
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

fn string_bytes(object: &Object) -> Option<&[u8]> {
    match object {
        Object::String(bytes, _) => Some(bytes.as_slice()),
        _ => None,
    }
}

/// Decode a shown string: UTF-16BE when it carries a byte order mark, otherwise
/// one byte per character
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE_u8, 0xFF][..]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}
