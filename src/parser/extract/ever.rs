use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

use crate::parser::{embedded, text, Cx};
use crate::record::{assemble, Listing};

// EVER's floor-plan grid is built by JavaScript with generated class
// names, so the match is fuzzy and bounded by text length instead.
static UNIT_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[class*='floor'], [class*='plan'], [class*='unit'], .js-filter > div").unwrap()
});
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3, [class*='title'], [class*='name']").unwrap());
static ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*bed[^$]*?(\d+(?:\.\d+)?)\s*bath[^$]*?\$\s*([\d,]+)").unwrap()
});

pub fn units(cx: &Cx) -> Vec<Listing> {
    let address = embedded::extract_address(cx.doc.root_element(), cx.fallback_address);
    let mut out = Vec::new();
    for item in cx.doc.select(&UNIT_SEL) {
        let txt = text::visible_text(item);
        let chars = txt.chars().count();
        if !(20..=1000).contains(&chars) {
            continue;
        }
        let prices = text::scan_prices(&txt);
        if prices.is_empty() {
            continue;
        }

        let mut beds = text::find_beds(&txt).unwrap_or(0);
        let mut baths = text::parse_baths(&txt);
        if txt.to_lowercase().contains("studio") {
            beds = 0;
            if baths == 0.0 {
                baths = 1.0;
            }
        }
        // Without at least one bed or bath count this is not a unit row.
        if beds == 0 && baths == 0.0 {
            continue;
        }

        let title = item
            .select(&TITLE_SEL)
            .next()
            .map(text::visible_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| cx.default_title());

        for price in prices {
            out.extend(assemble(
                cx.url,
                cx.company,
                &title,
                Some(price),
                Some(beds),
                Some(baths),
                &address,
            ));
        }
    }
    out
}

/// Site-specific full-text sweep: the rendered page reads as repeated
/// "N Bed N Bath $X" rows even when no container matches.
pub fn text_rows(cx: &Cx) -> Vec<Listing> {
    let full = text::visible_text(cx.doc.root_element());
    let address = embedded::extract_address(cx.doc.root_element(), cx.fallback_address);
    let title = cx.default_title();
    let mut out = Vec::new();
    for c in ROW_RE.captures_iter(&full) {
        let beds: i64 = c[1].parse().unwrap_or(0);
        let baths: f64 = c[2].parse().unwrap_or(0.0);
        let price: Option<i64> = c[3].replace(',', "").parse().ok();
        out.extend(assemble(
            cx.url,
            cx.company,
            &title,
            price,
            Some(beds),
            Some(baths),
            &address,
        ));
    }
    out
}
