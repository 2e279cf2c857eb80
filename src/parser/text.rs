use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{embedded, Cx};
use crate::normalize::normalize_price;
use crate::record::{assemble, plausible_rent, Listing};

/// "$1,499" or "$1,499 - $1,549".
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s*\d[\d,]*(?:\s*-\s*\$\s*\d[\d,]*)?").unwrap());
static BED_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:beds?|br|bedrooms?)\b").unwrap());
static BATH_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:bath|ba|bathroom)").unwrap());
static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

/// How far around a price match the full-text tier looks for bed/bath
/// keywords.
const CONTEXT_WINDOW: usize = 80;

/// Visible text of an element subtree: script/style/noscript stripped,
/// text nodes joined by single spaces.
pub fn visible_text(el: ElementRef) -> String {
    let mut out = String::new();
    push_visible(el, &mut out);
    out
}

fn push_visible(el: ElementRef, out: &mut String) {
    if matches!(el.value().name(), "script" | "style" | "noscript") {
        return;
    }
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            for word in text.split_whitespace() {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(word);
            }
        } else if let Some(child_el) = ElementRef::wrap(child) {
            push_visible(child_el, out);
        }
    }
}

/// Every plausible price in a text blob, in order of appearance. Range
/// matches resolve to the rounded mean of their bounds.
pub fn scan_prices(text: &str) -> Vec<i64> {
    PRICE_RE
        .find_iter(text)
        .filter_map(|m| normalize_price(m.as_str()))
        .filter(|v| plausible_rent(*v))
        .collect()
}

/// First bed count introduced by a bed/BR/bedroom keyword.
pub fn find_beds(text: &str) -> Option<i64> {
    BED_WORD_RE.captures(text).and_then(|c| c[1].parse().ok())
}

/// Bath count with fraction glyphs (½ ¼ ¾) converted to decimals first;
/// 0.0 when no count is present.
pub fn parse_baths(text: &str) -> f64 {
    let t = text.replace('½', ".5").replace('¼', ".25").replace('¾', ".75");
    BATH_WORD_RE
        .captures(&t)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0.0)
}

/// Bed/bath counts from a container's text, applying the studio rules:
/// studios are zero-bed and default to one bath when no count is present.
pub fn beds_baths(text: &str, title: &str) -> (i64, f64) {
    let studio =
        text.to_lowercase().contains("studio") || title.to_lowercase().contains("studio");
    let mut baths = parse_baths(text);
    let beds = if studio {
        if baths == 0.0 {
            baths = 1.0;
        }
        0
    } else {
        find_beds(text).unwrap_or(0)
    };
    (beds, baths)
}

/// The page `<title>` text, or a default when absent.
pub fn title_or(doc: &Html, default: &str) -> String {
    doc.select(&TITLE_SEL)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Tier 3: sweep the page's visible text for price patterns; each match
/// becomes a candidate record with best-effort beds/baths pulled from the
/// text around it.
pub fn records(cx: &Cx) -> Vec<Listing> {
    let txt = visible_text(cx.doc.root_element());
    let title = title_or(cx.doc, &cx.default_title());
    let address = embedded::extract_address(cx.doc.root_element(), cx.fallback_address);

    let mut out = Vec::new();
    for m in PRICE_RE.find_iter(&txt) {
        let Some(price) = normalize_price(m.as_str()) else { continue };
        let near = context_window(&txt, m.start(), m.end());
        let (beds, baths) = beds_baths_near(near);
        out.extend(assemble(
            cx.url,
            cx.company,
            &title,
            Some(price),
            beds,
            baths,
            &address,
        ));
    }
    out
}

/// Best-effort bed/bath counts adjacent to a price match. Unlike the
/// container tiers, absence stays None so the assembler records zeros.
fn beds_baths_near(near: &str) -> (Option<i64>, Option<f64>) {
    if near.to_lowercase().contains("studio") {
        let baths = parse_baths(near);
        let baths = if baths == 0.0 { 1.0 } else { baths };
        return (Some(0), Some(baths));
    }
    let beds = find_beds(near);
    let baths = Some(parse_baths(near)).filter(|b| *b > 0.0);
    (beds, baths)
}

fn context_window(text: &str, start: usize, end: usize) -> &str {
    let mut s = start.saturating_sub(CONTEXT_WINDOW);
    while s > 0 && !text.is_char_boundary(s) {
        s -= 1;
    }
    let mut e = (end + CONTEXT_WINDOW).min(text.len());
    while e < text.len() && !text.is_char_boundary(e) {
        e += 1;
    }
    &text[s..e]
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_text_skips_scripts() {
        let doc = Html::parse_document(
            "<body><p>Rent from  $900</p><script>var x = {price: 1};</script><style>.a{}</style></body>",
        );
        assert_eq!(visible_text(doc.root_element()), "Rent from $900");
    }

    #[test]
    fn scan_prices_handles_ranges_and_noise() {
        assert_eq!(scan_prices("$1,499 - $1,549 then $825"), vec![1524, 825]);
        // Implausible matches are dropped: unit numbers, purchase prices.
        assert_eq!(scan_prices("$99 deposit, $125,000 to buy"), Vec::<i64>::new());
        assert_eq!(scan_prices("no dollars here"), Vec::<i64>::new());
    }

    #[test]
    fn fraction_glyph_baths() {
        assert_eq!(parse_baths("2½ Bath"), 2.5);
        assert_eq!(parse_baths("1¾ BA"), 1.75);
        assert_eq!(parse_baths("no count"), 0.0);
    }

    #[test]
    fn studio_defaults() {
        assert_eq!(beds_baths("Studio apartment, $900", "S1"), (0, 1.0));
        assert_eq!(beds_baths("Studio, 1.5 Bath", "S2"), (0, 1.5));
        assert_eq!(beds_baths("4 Bed, 2 Bath", "D4"), (4, 2.0));
    }
}
