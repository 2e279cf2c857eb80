use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::normalize::{normalize_baths, normalize_beds};
use crate::parser::{text, Cx};
use crate::record::{assemble, Listing};

// SmartDigs ships its inventory as JSON arrays inside HTML comments,
// e.g. <!-- Query Data ... [{"bedrooms": "3", ...}] -->.
static QUERY_DATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--\s*Query Data.*?\[(.*?)\]\s*-->").unwrap());

pub fn comment_listings(cx: &Cx) -> Vec<Listing> {
    let mut out = Vec::new();
    for m in QUERY_DATA_RE.captures_iter(cx.raw) {
        let json_text = format!("[{}]", &m[1]);
        let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&json_text) else {
            continue;
        };
        for item in items {
            let Some(obj) = item.as_object() else {
                continue;
            };
            let Some(price) = field(obj, "marketrent")
                .and_then(|s| text::scan_prices(&s).into_iter().next())
            else {
                continue;
            };
            let beds = field(obj, "bedrooms").and_then(|s| normalize_beds(&s));
            let baths = field(obj, "bathrooms").and_then(|s| normalize_baths(&s));

            let street = field(obj, "street1").unwrap_or_default();
            let city = field(obj, "city").unwrap_or_else(|| "Lafayette".into());
            let state = field(obj, "state").unwrap_or_else(|| "IN".into());
            let zip = field(obj, "zip").unwrap_or_default();
            let address = if street.is_empty() {
                cx.fallback_address.to_string()
            } else {
                format!("{}, {}, {} {}", street, city, state, zip)
                    .trim()
                    .to_string()
            };

            let title = field(obj, "unit")
                .filter(|t| !t.trim().is_empty())
                .or_else(|| (!street.is_empty()).then(|| street.clone()))
                .unwrap_or_else(|| "SmartDigs Property".into());

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
    }
    out
}

fn field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
