use std::sync::LazyLock;

use scraper::Selector;

use crate::normalize::{normalize_baths, normalize_beds};
use crate::parser::{text, Cx};
use crate::record::{assemble, Listing};

static ITEM_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".listing-item").unwrap());
static RENT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3.rent").unwrap());
static ADDR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2.address, .address").unwrap());
static BEDS_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".feature.beds").unwrap());
static BATHS_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".feature.baths").unwrap());

/// AppFolio-hosted availability pages (Weida, Muinzer, BK Management,
/// Fairway) share one widget: a rent heading plus bed/bath feature chips
/// per listing item, titled by the unit's street address.
pub fn items(cx: &Cx) -> Vec<Listing> {
    let mut out = Vec::new();
    for item in cx.doc.select(&ITEM_SEL) {
        let Some(rent_el) = item.select(&RENT_SEL).next() else {
            continue;
        };
        let rent_text = text::visible_text(rent_el);
        let Some(price) = text::scan_prices(&rent_text).into_iter().next() else {
            continue;
        };

        let unit_label = item
            .select(&ADDR_SEL)
            .next()
            .map(text::visible_text)
            .filter(|t| !t.is_empty());
        let title = unit_label.clone().unwrap_or_else(|| cx.default_title());
        let address = unit_label.unwrap_or_else(|| cx.fallback_address.to_string());

        let beds = item
            .select(&BEDS_SEL)
            .next()
            .map(text::visible_text)
            .and_then(|t| normalize_beds(&t));
        let baths = item
            .select(&BATHS_SEL)
            .next()
            .map(text::visible_text)
            .and_then(|t| normalize_baths(&t));

        out.extend(assemble(
            cx.url, cx.company, &title, Some(price), beds, baths, &address,
        ));
    }
    out
}
