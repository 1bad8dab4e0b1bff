//! Positional table detection
//!
//! Works on positioned text fragments (what a content stream shows and where) rather
//! than ruling lines. Fragments are grouped into rows by baseline, split into cells
//! by horizontal gaps, and runs of consecutive multi-cell rows whose cells line up
//! in shared columns become tables. A row that has nothing in some column gets an
//! absent cell there.

use crate::config::TableConfig;
use crate::types::{Row, Table};

/// A run of text placed at a position on the page
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    /// Left edge in user space
    pub x: f32,
    /// Baseline in user space (grows upward)
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
    pub text: String,
}

impl TextFragment {
    pub fn new(x: f32, y: f32, width: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            width,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct CellSpan {
    x0: f32,
    x1: f32,
    text: String,
}

/// Detect tables among the fragments of one page, top to bottom
pub fn detect_tables(fragments: &[TextFragment], config: &TableConfig) -> Vec<Table> {
    let lines = group_lines(fragments, config.row_tolerance);
    let rows: Vec<Vec<CellSpan>> = lines
        .into_iter()
        .map(|line| split_cells(line, config.cell_gap))
        .collect();

    let mut tables = Vec::new();
    let mut start = 0;
    while start < rows.len() {
        if rows[start].len() < 2 {
            start += 1;
            continue;
        }

        let mut end = start;
        while end < rows.len() && rows[end].len() >= 2 {
            end += 1;
        }

        if end - start >= config.min_rows {
            if let Some(table) = build_table(&rows[start..end], config) {
                tables.push(table);
            }
        }
        start = end;
    }

    tables
}

/// Group fragments into lines, top of the page first
fn group_lines(fragments: &[TextFragment], tolerance: f32) -> Vec<Vec<&TextFragment>> {
    let mut sorted: Vec<&TextFragment> = fragments
        .iter()
        .filter(|f| !f.text.trim().is_empty())
        .collect();
    sorted.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<Vec<&TextFragment>> = Vec::new();
    let mut line_y = f32::NAN;
    for fragment in sorted {
        match lines.last_mut() {
            Some(line) if (line_y - fragment.y).abs() <= tolerance => line.push(fragment),
            _ => {
                line_y = fragment.y;
                lines.push(vec![fragment]);
            }
        }
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    lines
}

/// Merge fragments that sit close together into cells
fn split_cells(line: Vec<&TextFragment>, gap: f32) -> Vec<CellSpan> {
    let mut cells: Vec<CellSpan> = Vec::new();
    for fragment in line {
        let text = fragment.text.trim();
        let x1 = fragment.x + fragment.width.max(0.0);
        match cells.last_mut() {
            Some(cell) if fragment.x - cell.x1 <= gap => {
                if fragment.x - cell.x1 > 0.5 {
                    cell.text.push(' ');
                }
                cell.text.push_str(text);
                cell.x1 = cell.x1.max(x1);
            }
            _ => cells.push(CellSpan {
                x0: fragment.x,
                x1,
                text: text.to_string(),
            }),
        }
    }
    cells
}

fn build_table(rows: &[Vec<CellSpan>], config: &TableConfig) -> Option<Table> {
    let mut starts: Vec<f32> = rows.iter().flatten().map(|cell| cell.x0).collect();
    starts.sort_by(f32::total_cmp);

    // Column anchors: left edges clustered within the tolerance
    let mut anchors: Vec<f32> = Vec::new();
    let mut cluster_end = f32::NEG_INFINITY;
    for x in starts {
        if x - cluster_end > config.column_tolerance {
            anchors.push(x);
        }
        cluster_end = x;
    }

    if anchors.len() < config.min_columns {
        return None;
    }

    let table_rows: Vec<Row> = rows
        .iter()
        .map(|cells| {
            let mut row: Row = vec![None; anchors.len()];
            for cell in cells {
                let column = nearest_anchor(&anchors, cell.x0);
                if let Some(existing) = row[column].as_mut() {
                    existing.push(' ');
                    existing.push_str(&cell.text);
                } else {
                    row[column] = Some(cell.text.clone());
                }
            }
            row
        })
        .collect();

    Some(Table::new(table_rows))
}

fn nearest_anchor(anchors: &[f32], x: f32) -> usize {
    anchors
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (x - **a).abs().total_cmp(&(x - **b).abs()))
        .map(|(index, _)| index)
        .unwrap_or(0)
}
