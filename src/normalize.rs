use std::sync::LazyLock;

use regex::Regex;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());
static INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Prices like "$1,499", "$1,499 - $1,549", "1499-1549". A range resolves
/// to the rounded mean of every number found.
pub fn normalize_price(text: &str) -> Option<i64> {
    let stripped = text.replace(',', "");
    let vals: Vec<f64> = NUMBER_RE
        .find_iter(&stripped)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect();
    if vals.is_empty() {
        return None;
    }
    let avg = vals.iter().sum::<f64>() / vals.len() as f64;
    Some(avg.round() as i64)
}

/// Beds like "2", "2 Bed", "2BR", "Studio".
pub fn normalize_beds(text: &str) -> Option<i64> {
    let t = text.trim().to_lowercase();
    if t.contains("studio") {
        return Some(0);
    }
    INT_RE.find(&t).and_then(|m| m.as_str().parse().ok())
}

/// Baths like "1", "1.5", "1 bath", "1.5ba".
pub fn normalize_baths(text: &str) -> Option<f64> {
    let t = text.trim().to_lowercase();
    NUMBER_RE.find(&t).and_then(|m| m.as_str().parse().ok())
}

/// Collapse non-breaking spaces and whitespace runs into single spaces.
pub fn normalize_address(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let s = text.replace('\u{a0}', " ");
    WS_RE.replace_all(&s, " ").trim().to_string()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_without_digits_is_none() {
        assert_eq!(normalize_price(""), None);
        assert_eq!(normalize_price("Call for pricing"), None);
        assert_eq!(normalize_price("$ - "), None);
    }

    #[test]
    fn price_range_resolves_to_mean() {
        assert_eq!(normalize_price("$1,499 - $1,549"), Some(1524));
        assert_eq!(normalize_price("1499-1549"), Some(1524));
        assert_eq!(normalize_price("$825"), Some(825));
    }

    #[test]
    fn price_rounds_to_nearest() {
        // 700 and 725 average to 712.5
        assert_eq!(normalize_price("$700 - $725"), Some(713));
    }

    #[test]
    fn beds_studio_is_zero() {
        assert_eq!(normalize_beds("Studio"), Some(0));
        assert_eq!(normalize_beds("STUDIO apartment"), Some(0));
    }

    #[test]
    fn beds_first_integer() {
        assert_eq!(normalize_beds("2 Bed"), Some(2));
        assert_eq!(normalize_beds("4BR"), Some(4));
        assert_eq!(normalize_beds("loft"), None);
    }

    #[test]
    fn baths_first_number() {
        assert_eq!(normalize_baths("1.5 ba"), Some(1.5));
        assert_eq!(normalize_baths("2 Baths"), Some(2.0));
        assert_eq!(normalize_baths("shared"), None);
    }

    #[test]
    fn address_collapses_whitespace() {
        assert_eq!(
            normalize_address("612\u{a0}N Salisbury   St,\n West Lafayette"),
            "612 N Salisbury St, West Lafayette"
        );
        assert_eq!(normalize_address(""), "");
    }
}
