pub mod embedded;
pub mod extract;
pub mod text;

use rayon::prelude::*;
use scraper::Html;
use tracing::debug;

use crate::record::Listing;
use crate::sites::{SiteTable, Strategy};

pub const UNKNOWN_COMPANY: &str = "Unknown";

const GENERIC_FALLBACK_ADDRESS: &str = "West Lafayette, IN";

/// Per-page context handed to every extraction tier.
pub struct Cx<'a> {
    pub url: &'a str,
    pub raw: &'a str,
    pub doc: &'a Html,
    pub company: &'a str,
    pub fallback_address: &'a str,
}

impl Cx<'_> {
    /// Default unit label when a container has no usable heading.
    pub(crate) fn default_title(&self) -> String {
        if self.company == UNKNOWN_COMPANY {
            "Listing".to_string()
        } else {
            format!("{} Unit", self.company)
        }
    }
}

type Tier = fn(&Cx) -> Vec<Listing>;

/// Ordered fallback cascade per strategy: structured containers first,
/// then embedded JSON payloads, then a full-text sweep. The engine stops
/// at the first tier that yields records.
fn cascade(strategy: Strategy) -> &'static [Tier] {
    match strategy {
        Strategy::Granite => &[extract::granite::cards, embedded::records, text::records],
        Strategy::AppFolio => &[extract::appfolio::items, embedded::records, text::records],
        Strategy::AmericanCampus => {
            &[extract::campus::properties, embedded::records, text::records]
        }
        Strategy::Floorplan => &[extract::floorplan::blocks, embedded::records, text::records],
        Strategy::Yugo => &[extract::yugo::articles, embedded::records, text::records],
        Strategy::SmartDigs => &[
            extract::smartdigs::comment_listings,
            embedded::records,
            text::records,
        ],
        Strategy::Wabash => &[extract::wabash::units, embedded::records, text::records],
        Strategy::Ever => &[extract::ever::units, embedded::records, extract::ever::text_rows],
        Strategy::Purdue => &[
            extract::purdue::cards,
            extract::purdue::articles,
            embedded::records,
            text::records,
        ],
        Strategy::Rise => &[extract::rise::items, embedded::records, text::records],
        Strategy::Generic => &[text::records],
    }
}

/// Extract every listing from one rendered page. Unknown hosts fall back
/// to the generic full-text strategy attributed to company "Unknown"; a
/// bad container or tier never aborts the page, and a page with nothing
/// extractable yields an empty vec rather than an error.
pub fn extract(url: &str, html: &str, table: &SiteTable) -> Vec<Listing> {
    let rule = table.rule_for_url(url);
    let (strategy, company, fallback_address) = match rule {
        Some(r) => (r.strategy, r.company, r.fallback_address),
        None => (Strategy::Generic, UNKNOWN_COMPANY, GENERIC_FALLBACK_ADDRESS),
    };

    let doc = Html::parse_document(html);
    let cx = Cx {
        url,
        raw: html,
        doc: &doc,
        company,
        fallback_address,
    };

    for (i, tier) in cascade(strategy).iter().enumerate() {
        let records = tier(&cx);
        if !records.is_empty() {
            debug!("{} records from {} (tier {})", records.len(), url, i + 1);
            return records;
        }
        debug!("tier {} empty for {}", i + 1, url);
    }
    Vec::new()
}

/// Batch entry point: extract across many (url, content) pairs in
/// parallel and flatten the results. A page that yields nothing is
/// skipped, never an error.
pub fn extract_many(pages: &[(String, String)], table: &SiteTable) -> Vec<Listing> {
    pages
        .par_iter()
        .flat_map(|(url, html)| extract(url, html, table))
        .collect()
}

// ── Tests ──
