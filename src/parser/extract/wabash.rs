use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

use crate::parser::{embedded, text, Cx};
use crate::record::{assemble, Listing};

static UNIT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".floorp-unit-container, .floor-plan-box").unwrap());
static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".floor-title, .floorplan-block-info-name, [class*='title']").unwrap()
});
// Entrata renders "beds | baths" columns, e.g. "2 | 2".
static PIPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*\|\s*(\d+(?:\.\d+)?)").unwrap());

/// Wabash Landing's Entrata floor plans.
pub fn units(cx: &Cx) -> Vec<Listing> {
    let address = embedded::extract_address(cx.doc.root_element(), cx.fallback_address);
    let mut out = Vec::new();
    for unit in cx.doc.select(&UNIT_SEL) {
        let txt = text::visible_text(unit);
        let prices = text::scan_prices(&txt);
        if prices.is_empty() {
            continue;
        }
        let title = unit
            .select(&TITLE_SEL)
            .next()
            .map(text::visible_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| cx.default_title());

        let (mut beds, mut baths) = match PIPE_RE.captures(&txt) {
            Some(c) => (
                c[1].parse().unwrap_or(0),
                c[2].parse().unwrap_or(0.0),
            ),
            None => (text::find_beds(&txt).unwrap_or(0), text::parse_baths(&txt)),
        };
        if txt.to_lowercase().contains("studio") || title.to_lowercase().contains("studio") {
            beds = 0;
            if baths == 0.0 {
                baths = 1.0;
            }
        }

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
