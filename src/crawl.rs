use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::db;
use crate::discover::{self, DiscoverOpts};
use crate::fetch;
use crate::parser;
use crate::sites::SiteTable;

pub const MAX_LINKS_PER_SITE: usize = 120;

// Polite delay between page fetches on one site.
const PAGE_DELAY: Duration = Duration::from_millis(1500);

/// Per-site crawl summary.
pub struct SiteOutcome {
    pub pages: usize,
    pub listings: usize,
}

/// Crawl one seeded site: discover candidate pages, then fetch, extract
/// and persist each. A failed page is skipped, never fatal; an empty
/// frontier degrades to extracting the seed page itself.
pub async fn crawl_site(
    client: &Client,
    conn: &Connection,
    table: &SiteTable,
    seed: &str,
    max_links: usize,
) -> Result<SiteOutcome> {
    info!("crawling {}", seed);
    let mut candidates =
        discover::discover_links(client, table, seed, DiscoverOpts::default()).await;
    if candidates.is_empty() {
        candidates = vec![seed.to_string()];
    }
    candidates.truncate(max_links.min(MAX_LINKS_PER_SITE));

    let pb = ProgressBar::new(candidates.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec})")?
            .progress_chars("=> "),
    );

    let mut outcome = SiteOutcome {
        pages: 0,
        listings: 0,
    };
    for link in &candidates {
        let html = match fetch::get(client, link).await {
            Ok(h) => h,
            Err(e) => {
                warn!("fetch failed for {}: {}", link, e);
                pb.inc(1);
                continue;
            }
        };
        outcome.pages += 1;

        let records = parser::extract(link, &html, table);
        if records.is_empty() {
            info!("no units parsed from {}", link);
        } else {
            let written = db::persist(conn, &records)?;
            outcome.listings += written;
            info!("{} -> {} listings", link, written);
        }

        pb.inc(1);
        tokio::time::sleep(PAGE_DELAY).await;
    }
    pb.finish_and_clear();

    info!(
        "done with {}: {} listings from {} pages",
        seed, outcome.listings, outcome.pages
    );
    Ok(outcome)
}
