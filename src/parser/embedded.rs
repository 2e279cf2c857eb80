use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use super::{text, Cx};
use crate::record::{assemble, Listing};

static NEXT_DATA_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script#__NEXT_DATA__").unwrap());
static JSON_SCRIPT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/json"]"#).unwrap());
static SCRIPT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("script").unwrap());
static LD_JSON_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static ADDRESS_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[itemprop="address"], .address, address, .location"#).unwrap()
});
static META_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("meta").unwrap());

static ADDRESS_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)address|location").unwrap());
static STREET_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\s+\w+").unwrap());

/// Tier 2: prices pulled out of an embedded JSON payload, attributed to
/// the page title. Useful on JS-heavy sites whose rendered DOM carries a
/// state blob but no stable markup.
pub fn records(cx: &Cx) -> Vec<Listing> {
    let Some(data) = json_in_script(cx.doc) else {
        return Vec::new();
    };
    let blob = data.to_string();
    let title = text::title_or(cx.doc, &cx.default_title());
    let address = extract_address(cx.doc.root_element(), cx.fallback_address);
    text::scan_prices(&blob)
        .into_iter()
        .filter_map(|p| assemble(cx.url, cx.company, &title, Some(p), None, None, &address))
        .collect()
}

/// First machine-readable JSON payload on the page: a `__NEXT_DATA__`
/// block, an `application/json` script, or the outermost braced blob of
/// any other script. Malformed blocks are skipped, never fatal.
pub fn json_in_script(doc: &Html) -> Option<Value> {
    if let Some(tag) = doc.select(&NEXT_DATA_SEL).next() {
        if let Ok(v) = serde_json::from_str::<Value>(script_text(tag).trim()) {
            return Some(v);
        }
    }
    for tag in doc.select(&JSON_SCRIPT_SEL) {
        if let Ok(v) = serde_json::from_str::<Value>(script_text(tag).trim()) {
            if v.is_object() || v.is_array() {
                return Some(v);
            }
        }
    }
    for tag in doc.select(&SCRIPT_SEL) {
        let txt = script_text(tag);
        let (Some(start), Some(end)) = (txt.find('{'), txt.rfind('}')) else {
            continue;
        };
        if start >= end {
            continue;
        }
        if let Ok(v) = serde_json::from_str::<Value>(&txt[start..=end]) {
            if v.is_object() || v.is_array() {
                return Some(v);
            }
        }
    }
    None
}

/// Shared address resolution, in priority order: JSON-LD address object,
/// labeled address element, address-ish meta tag, per-site fallback.
pub fn extract_address(scope: ElementRef, fallback: &str) -> String {
    for tag in scope.select(&LD_JSON_SEL) {
        let txt: String = tag.text().collect();
        let Ok(data) = serde_json::from_str::<Value>(txt.trim()) else {
            continue;
        };
        let Some(addr) = data.get("address") else {
            continue;
        };
        if let Some(full) = format_ld_address(addr) {
            return full;
        }
    }

    for el in scope.select(&ADDRESS_SEL) {
        let candidate = text::visible_text(el);
        // A usable address has a street number or a known city name, and
        // is short enough to not be a paragraph.
        if candidate.chars().count() < 200
            && (STREET_NUMBER_RE.is_match(&candidate) || candidate.contains("West Lafayette"))
        {
            return candidate;
        }
    }

    for meta in scope.select(&META_SEL) {
        let Some(prop) = meta.value().attr("property") else {
            continue;
        };
        if !ADDRESS_ATTR_RE.is_match(prop) {
            continue;
        }
        if let Some(content) = meta.value().attr("content") {
            let content = content.trim();
            if !content.is_empty() && content.chars().count() < 200 {
                return content.to_string();
            }
        }
    }

    fallback.to_string()
}

fn script_text(tag: ElementRef) -> String {
    tag.text().collect()
}

fn format_ld_address(addr: &Value) -> Option<String> {
    let get = |key: &str| {
        addr.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };
    let mut parts: Vec<String> = [get("streetAddress"), get("addressLocality"), get("addressRegion")]
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    if let Some(zip) = get("postalCode") {
        match parts.last_mut() {
            Some(last) => *last = format!("{} {}", last, zip),
            None => parts.push(zip.to_string()),
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_from_next_data_block() {
        let doc = Html::parse_document(
            r#"<script id="__NEXT_DATA__" type="application/json">{"props":{"rent":900}}</script>"#,
        );
        let v = json_in_script(&doc).unwrap();
        assert_eq!(v["props"]["rent"], 900);
    }

    #[test]
    fn json_from_inline_state_blob() {
        let doc = Html::parse_document(
            r#"<script>window.__STATE__ = {"units": [1, 2]};</script>"#,
        );
        let v = json_in_script(&doc).unwrap();
        assert_eq!(v["units"][0], 1);
    }

    #[test]
    fn malformed_json_is_skipped() {
        let doc = Html::parse_document("<script>var a = {broken;</script>");
        assert!(json_in_script(&doc).is_none());
    }

    #[test]
    fn ld_json_address_wins() {
        let doc = Html::parse_document(
            r#"<script type="application/ld+json">
               {"address":{"streetAddress":"320 Brown St","addressLocality":"West Lafayette","addressRegion":"IN","postalCode":"47906"}}
               </script>
               <div class="address">overridden</div>"#,
        );
        assert_eq!(
            extract_address(doc.root_element(), "fallback"),
            "320 Brown St, West Lafayette, IN 47906"
        );
    }

    #[test]
    fn labeled_element_requires_street_number_or_city() {
        let doc = Html::parse_document(
            r#"<div class="address">Contact our leasing office</div>
               <div class="location">134 Pierce St</div>"#,
        );
        assert_eq!(extract_address(doc.root_element(), "fallback"), "134 Pierce St");
    }

    #[test]
    fn meta_then_fallback() {
        let doc = Html::parse_document(
            r#"<meta property="og:location" content="504 Northwestern Ave">"#,
        );
        assert_eq!(
            extract_address(doc.root_element(), "fallback"),
            "504 Northwestern Ave"
        );

        let bare = Html::parse_document("<p>nothing here</p>");
        assert_eq!(extract_address(bare.root_element(), "fallback"), "fallback");
    }
}
