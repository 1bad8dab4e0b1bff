//! Page-by-page extraction

use crate::error::{Error, Result};
use crate::processing::CancellationFlag;
use crate::source::PageSource;
use crate::types::{ExtractionMode, PageResult};

/// Extract one page, asking the source only for what the mode needs
pub fn extract_page<S>(source: &S, index: usize, mode: ExtractionMode) -> Result<PageResult>
where
    S: PageSource + ?Sized,
{
    let mut page = PageResult::new(index);

    if mode.wants_text() {
        page.text = source.page_text(index).map_err(|e| as_page_error(index, e))?;
    }
    if mode.wants_tables() {
        page.tables = source.page_tables(index).map_err(|e| as_page_error(index, e))?;
    }

    Ok(page)
}

/// Any failure while reading a page is reported as a page failure
fn as_page_error(index: usize, err: Error) -> Error {
    match err {
        Error::Page { .. } | Error::Cancelled => err,
        other => Error::page(index, other.to_string()),
    }
}

/// Extract every page in order.
///
/// `on_page(done, total)` runs after each page. The cancellation flag is checked
/// before each page. The first error discards everything extracted so far.
pub fn extract_document<S, F>(
    source: &S,
    mode: ExtractionMode,
    cancel: &CancellationFlag,
    mut on_page: F,
) -> Result<Vec<PageResult>>
where
    S: PageSource + ?Sized,
    F: FnMut(usize, usize),
{
    let total = source.page_count();
    let mut pages = Vec::with_capacity(total);

    for index in 0..total {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let page = extract_page(source, index, mode)?;
        tracing::debug!(
            "Page {}/{}: {} chars, {} tables",
            index + 1,
            total,
            page.text.as_ref().map_or(0, String::len),
            page.tables.len()
        );
        pages.push(page);
        on_page(index + 1, total);
    }

    Ok(pages)
}

/// `floor(done / total * 100)`, clamped to 100; an empty total counts as complete
pub fn progress_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (done.min(total) as u128 * 100) / total as u128;
    percent as u8
}
