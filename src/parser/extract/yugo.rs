use std::sync::LazyLock;

use scraper::Selector;

use crate::parser::{embedded, text, Cx};
use crate::record::{assemble, Listing};

static ARTICLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("article").unwrap());
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3, .title, .name, .room-name").unwrap());

/// Yugo renders each room type as an article; studios are common and
/// frequently omit a bath count.
pub fn articles(cx: &Cx) -> Vec<Listing> {
    let address = embedded::extract_address(cx.doc.root_element(), cx.fallback_address);
    let mut out = Vec::new();
    for article in cx.doc.select(&ARTICLE_SEL) {
        let txt = text::visible_text(article);
        let prices = text::scan_prices(&txt);
        if prices.is_empty() {
            continue;
        }
        let title = article
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
