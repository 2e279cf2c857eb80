use std::sync::LazyLock;

use scraper::Selector;

use crate::parser::{embedded, text, Cx};
use crate::record::{assemble, Listing};

static PROPERTY_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".property").unwrap());
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3, h4, .title, .name").unwrap());

/// American Campus floor-plan cards quote rent as "$1,499 - $1,549"
/// ranges; `scan_prices` resolves them to the mean.
pub fn properties(cx: &Cx) -> Vec<Listing> {
    let address = embedded::extract_address(cx.doc.root_element(), cx.fallback_address);
    let mut out = Vec::new();
    for prop in cx.doc.select(&PROPERTY_SEL) {
        let txt = text::visible_text(prop);
        let Some(price) = text::scan_prices(&txt).into_iter().next() else {
            continue;
        };
        let beds = text::find_beds(&txt).unwrap_or(0);
        let baths = text::parse_baths(&txt);
        let title = prop
            .select(&TITLE_SEL)
            .next()
            .map(text::visible_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| cx.default_title());
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
    out
}
