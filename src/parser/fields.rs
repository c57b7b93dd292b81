use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

static SPAN_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());
static DIV_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").unwrap());
static TRAIN_NO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// The delay cell's whole class attribute; extra classes disqualify it.
const DELAY_CLASS: &str = "col-12 col-lg-3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFields {
    pub train_id: String,
    pub delay_text: String,
}

/// Pull the train number and raw delay annotation out of one row.
/// `None` means the row is not a train entry.
pub fn parse_fragment(row: ElementRef<'_>) -> Option<ParsedFields> {
    let train_id = row
        .select(&SPAN_SEL)
        .map(stripped_text)
        .find(|t| TRAIN_NO_RE.is_match(t))?;

    let delay_text = row
        .select(&DIV_SEL)
        .find(is_delay_cell)
        .map(stripped_text)
        .unwrap_or_default();

    Some(ParsedFields { train_id, delay_text })
}

fn is_delay_cell(el: &ElementRef<'_>) -> bool {
    el.value()
        .attr("class")
        .is_some_and(|c| c.split_whitespace().collect::<Vec<_>>().join(" ") == DELAY_CLASS)
}

/// Text nodes trimmed one by one and glued together.
fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect()
}
