use std::sync::LazyLock;

use scraper::Selector;

use crate::parser::{embedded, text, Cx};
use crate::record::{assemble, Listing};

static PLAN_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".floorplan").unwrap());
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3, .title, .name").unwrap());

/// Floor-plan grids used by Redpoint and Alight. One block may quote
/// several lease-term prices; each becomes its own unit record.
pub fn blocks(cx: &Cx) -> Vec<Listing> {
    let address = embedded::extract_address(cx.doc.root_element(), cx.fallback_address);
    let mut out = Vec::new();
    for plan in cx.doc.select(&PLAN_SEL) {
        let txt = text::visible_text(plan);
        let prices = text::scan_prices(&txt);
        if prices.is_empty() {
            continue;
        }
        let title = plan
            .select(&TITLE_SEL)
            .next()
            .map(text::visible_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| cx.default_title());
        let (beds, baths) = text::beds_baths(&txt, &title);
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
