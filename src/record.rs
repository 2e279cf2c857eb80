use chrono::Local;
use serde::Serialize;

use crate::normalize::normalize_address;

pub const MIN_RENT: i64 = 300;
pub const MAX_RENT: i64 = 6000;

const TITLE_MAX: usize = 200;

/// Canonical listing record, keyed by `url` in storage. The URL may carry
/// a synthetic `#unit-…` fragment when several units share one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub url: String,
    pub company: String,
    pub title: String,
    pub price: i64,
    pub beds: i64,
    pub baths: f64,
    pub address: String,
    pub last_scraped_at: String,
}

/// Monthly rents outside this window are extraction noise (phone numbers,
/// unit numbers, purchase prices).
pub fn plausible_rent(v: i64) -> bool {
    (MIN_RENT..=MAX_RENT).contains(&v)
}

/// Build a listing from normalized fields. Every extraction strategy
/// funnels through here; a missing or implausible price kills the record.
pub fn assemble(
    url: &str,
    company: &str,
    title: &str,
    price: Option<i64>,
    beds: Option<i64>,
    baths: Option<f64>,
    address: &str,
) -> Option<Listing> {
    let price = price.filter(|p| plausible_rent(*p))?;
    let title = title.trim();
    let title = if title.is_empty() { company } else { title };
    Some(Listing {
        url: url.to_string(),
        company: company.to_string(),
        title: title.chars().take(TITLE_MAX).collect(),
        price,
        beds: beds.unwrap_or(0),
        baths: baths.unwrap_or(0.0),
        address: normalize_address(address),
        last_scraped_at: Local::now().format("%m-%d-%Y").to_string(),
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_price_rejected() {
        assert!(assemble("https://x.com/a", "Test Co", "A1", None, None, None, "").is_none());
    }

    #[test]
    fn implausible_price_rejected() {
        for price in [250, 7000, 299, 6001] {
            assert!(
                assemble("https://x.com/a", "Test Co", "A1", Some(price), None, None, "").is_none(),
                "price {} should be rejected",
                price
            );
        }
        assert!(assemble("https://x.com/a", "Test Co", "A1", Some(300), None, None, "").is_some());
        assert!(assemble("https://x.com/a", "Test Co", "A1", Some(6000), None, None, "").is_some());
    }

    #[test]
    fn blank_title_falls_back_to_company() {
        let rec = assemble("https://x.com/a", "Test Co", "  ", Some(900), None, None, "").unwrap();
        assert_eq!(rec.title, "Test Co");
    }

    #[test]
    fn long_title_truncated() {
        let long = "x".repeat(500);
        let rec = assemble("https://x.com/a", "Test Co", &long, Some(900), None, None, "").unwrap();
        assert_eq!(rec.title.chars().count(), 200);
    }

    #[test]
    fn beds_baths_default_to_zero() {
        let rec = assemble("https://x.com/a", "Test Co", "A1", Some(900), None, None, "").unwrap();
        assert_eq!(rec.beds, 0);
        assert_eq!(rec.baths, 0.0);
    }

    #[test]
    fn address_is_normalized() {
        let rec = assemble(
            "https://x.com/a",
            "Test Co",
            "A1",
            Some(900),
            Some(2),
            Some(1.5),
            "134\u{a0}Pierce  St",
        )
        .unwrap();
        assert_eq!(rec.address, "134 Pierce St");
        assert_eq!(rec.beds, 2);
        assert_eq!(rec.baths, 1.5);
    }
}
