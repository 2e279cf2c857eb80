use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

use crate::parser::{embedded, text, Cx};
use crate::record::{assemble, Listing};

static CARD_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.listings-list__item").unwrap());
// Delimited so "Unit 8" never reads as a bed count.
static BEDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|[,\s])(\d+)\s*beds?(?:[,\s]|$)").unwrap());
static MONTHLY_PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s*([\d,]+)\s*/\s*month").unwrap());

/// Granite lists each unit as an anchor card. Price is always quoted as
/// "$X / month"; unreleased units carry "Not Available" plus an "Early
/// Inquiry" tag and have no firm price yet.
pub fn cards(cx: &Cx) -> Vec<Listing> {
    let address = embedded::extract_address(cx.doc.root_element(), cx.fallback_address);
    let mut out = Vec::new();
    for item in cx.doc.select(&CARD_SEL) {
        let txt = text::visible_text(item);
        let lower = txt.to_lowercase();
        if lower.contains("not available") && lower.contains("early inquiry") {
            continue;
        }
        let Some(price) = MONTHLY_PRICE_RE
            .captures(&txt)
            .and_then(|c| c[1].replace(',', "").parse::<i64>().ok())
        else {
            continue;
        };
        let beds = if lower.contains("studio") {
            0
        } else {
            BEDS_RE
                .captures(&txt)
                .and_then(|c| c[1].parse().ok())
                .unwrap_or(0)
        };
        let baths = text::parse_baths(&txt);
        out.extend(assemble(
            cx.url,
            cx.company,
            &txt,
            Some(price),
            Some(beds),
            Some(baths),
            &address,
        ));
    }
    out
}
