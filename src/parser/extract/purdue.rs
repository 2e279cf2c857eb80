use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

use crate::parser::{embedded, text, Cx};
use crate::record::{assemble, Listing};

static CARD_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".listing-card, article.listing-card").unwrap());
static ARTICLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("article").unwrap());
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3, [class*='title'], [class*='name']").unwrap());
// Property-level aggregates span a bed range ("Studio - 2 Beds",
// "1-2 Beds") and do not describe a single rentable unit.
static BED_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:studio|bed|\d+)\s*-\s*\d+\s*bed").unwrap());

/// Listing cards on the university's off-campus housing portal.
pub fn cards(cx: &Cx) -> Vec<Listing> {
    let mut out = Vec::new();
    for card in cx.doc.select(&CARD_SEL) {
        let txt = text::visible_text(card);
        let prices = text::scan_prices(&txt);
        if prices.is_empty() || BED_RANGE_RE.is_match(&txt) {
            continue;
        }

        let mut beds = text::find_beds(&txt).unwrap_or(0);
        if txt.to_lowercase().contains("studio") {
            beds = 0;
        }
        let mut baths = text::parse_baths(&txt);
        if baths == 0.0 && beds > 0 {
            baths = 1.0;
        }

        let title = card
            .select(&TITLE_SEL)
            .next()
            .map(text::visible_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| cx.default_title());
        let address = embedded::extract_address(card, cx.fallback_address);

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

/// Looser sweep over article tags when no listing card matched.
pub fn articles(cx: &Cx) -> Vec<Listing> {
    let mut out = Vec::new();
    for article in cx.doc.select(&ARTICLE_SEL) {
        let txt = text::visible_text(article);
        let prices = text::scan_prices(&txt);
        // A block quoting many prices is a comparison table, not a unit.
        if prices.is_empty() || prices.len() > 5 || BED_RANGE_RE.is_match(&txt) {
            continue;
        }

        let beds = text::find_beds(&txt).unwrap_or(0);
        let mut baths = text::parse_baths(&txt);
        if baths == 0.0 && beds > 0 {
            baths = 1.0;
        }

        let title = text::title_or(cx.doc, &cx.default_title());
        let address = embedded::extract_address(article, cx.fallback_address);

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
