use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.row").unwrap());

/// Every `div.row` in document order, nested ones included.
pub fn segment_rows(doc: &Html) -> Vec<ElementRef<'_>> {
    doc.select(&ROW_SEL).collect()
}
