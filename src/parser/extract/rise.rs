use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

use crate::parser::{embedded, text, Cx};
use crate::record::{assemble, Listing};

static ITEM_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".listing-item, .unit-card, .floorplan, .property-card").unwrap()
});
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3, .title, .name").unwrap());
static BEDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:bed|beds|br|bd)\b").unwrap());
static BATHS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:bath|baths|ba)\b").unwrap());

/// RISE's availability markup has shifted between releases; try every
/// container shape it has used.
pub fn items(cx: &Cx) -> Vec<Listing> {
    let mut out = Vec::new();
    for item in cx.doc.select(&ITEM_SEL) {
        let txt = text::visible_text(item);
        let Some(price) = text::scan_prices(&txt).into_iter().next() else {
            continue;
        };
        let beds = BEDS_RE.captures(&txt).and_then(|c| c[1].parse().ok());
        let baths = BATHS_RE.captures(&txt).and_then(|c| c[1].parse().ok());
        let title = item
            .select(&TITLE_SEL)
            .next()
            .map(text::visible_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| cx.default_title());
        let address = embedded::extract_address(item, cx.fallback_address);
        out.extend(assemble(
            cx.url, cx.company, &title, Some(price), beds, baths, &address,
        ));
    }
    out
}
