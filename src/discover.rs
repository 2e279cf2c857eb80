use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

use crate::fetch;
use crate::sites::SiteTable;

pub const MAX_RESULTS: usize = 200;

const ASSET_EXTENSIONS: &[&str] = &[".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg"];

static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static UNIT_FRAGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)unit_|floorplan|detail").unwrap());

/// Frontier options. `allow`/`deny` override the site table when set;
/// otherwise rules are resolved by host and unknown hosts go unfiltered.
pub struct DiscoverOpts<'a> {
    pub same_domain: bool,
    pub allow: Option<&'a [Regex]>,
    pub deny: Option<&'a [Regex]>,
    pub max_results: usize,
}

impl Default for DiscoverOpts<'_> {
    fn default() -> Self {
        Self {
            same_domain: true,
            allow: None,
            deny: None,
            max_results: MAX_RESULTS,
        }
    }
}

/// Fetch a seed page and return the candidate detail links found on it.
/// A fetch failure is non-fatal and yields an empty frontier.
pub async fn discover_links(
    client: &Client,
    table: &SiteTable,
    seed: &str,
    opts: DiscoverOpts<'_>,
) -> Vec<String> {
    let seed_url = match Url::parse(seed) {
        Ok(u) => u,
        Err(e) => {
            warn!("bad seed url {}: {}", seed, e);
            return Vec::new();
        }
    };
    let body = match fetch::get(client, seed).await {
        Ok(b) => b,
        Err(e) => {
            warn!("discovery fetch failed for {}: {}", seed, e);
            return Vec::new();
        }
    };

    let doc = Html::parse_document(&body);
    let hrefs: Vec<String> = doc
        .select(&ANCHOR_SEL)
        .filter_map(|a| a.value().attr("href"))
        .map(|h| h.trim().to_string())
        .collect();

    let links = filter_links(&seed_url, hrefs.iter().map(String::as_str), table, &opts);
    info!("discovered {} links from {}", links.len(), seed);
    links
}

/// Pure filtering pass over raw hrefs, factored out of the fetch so the
/// frontier rules are testable without a network.
pub fn filter_links<'a>(
    seed: &Url,
    hrefs: impl Iterator<Item = &'a str>,
    table: &SiteTable,
    opts: &DiscoverOpts<'_>,
) -> Vec<String> {
    let rule = seed.host_str().and_then(|h| table.rule_for(h));
    let allow = opts.allow.or_else(|| rule.map(|r| r.allow.as_slice()));
    let deny = opts.deny.or_else(|| rule.map(|r| r.deny.as_slice()));

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for href in hrefs {
        if href.is_empty() || href.starts_with("mailto:") || href.starts_with("tel:") {
            continue;
        }
        let Ok(link) = seed.join(href) else { continue };
        if opts.same_domain && link.host_str() != seed.host_str() {
            continue;
        }
        let lower = link.as_str().to_lowercase();
        if ASSET_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            continue;
        }
        // Fragment-only variations are duplicates of the page, except
        // anchors that address a specific unit or floor plan.
        if let Some(frag) = link.fragment() {
            if !frag.is_empty() && !UNIT_FRAGMENT_RE.is_match(frag) {
                continue;
            }
        }
        let path_q = match link.query() {
            Some(q) => format!("{}?{}", link.path(), q),
            None => link.path().to_string(),
        };
        if let Some(deny) = deny {
            if deny.iter().any(|re| re.is_match(&path_q)) {
                continue;
            }
        }
        if let Some(allow) = allow {
            if !allow.is_empty() && !allow.iter().any(|re| re.is_match(&path_q)) {
                continue;
            }
        }
        let canonical = link.as_str().to_string();
        if seen.insert(canonical.clone()) {
            out.push(canonical);
        }
        if out.len() >= opts.max_results {
            break;
        }
    }
    out
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn run(seed: &str, hrefs: &[&str], opts: DiscoverOpts<'_>) -> Vec<String> {
        let table = SiteTable::builtin();
        let seed = Url::parse(seed).unwrap();
        filter_links(&seed, hrefs.iter().copied(), &table, &opts)
    }

    #[test]
    fn deny_short_circuits_allow() {
        // Granite allows /listings but denies /blog; deny wins.
        let links = run(
            "https://granitestudentliving.com/",
            &["/blog/listings/foo", "/listings/salisbury-court"],
            DiscoverOpts::default(),
        );
        assert_eq!(
            links,
            vec!["https://granitestudentliving.com/listings/salisbury-court"]
        );
    }

    #[test]
    fn same_domain_and_scheme_noise() {
        let links = run(
            "https://granitestudentliving.com/listings/",
            &[
                "mailto:leasing@granitestudentliving.com",
                "tel:+17654200000",
                "https://facebook.com/granite",
                "/listings/tour.pdf",
                "/listings/a",
            ],
            DiscoverOpts::default(),
        );
        assert_eq!(links, vec!["https://granitestudentliving.com/listings/a"]);
    }

    #[test]
    fn fragment_heuristic() {
        let links = run(
            "https://www.americancampus.com/student-apartments/in/west-lafayette/chauncey-square/floor-plans",
            &["#gallery", "#floorplan-a2", "/detail/a2#unit_12"],
            DiscoverOpts::default(),
        );
        assert_eq!(links.len(), 2);
        assert!(links[0].ends_with("#floorplan-a2"));
        assert!(links[1].ends_with("/detail/a2#unit_12"));
    }

    #[test]
    fn unregistered_host_is_unfiltered() {
        let links = run(
            "https://example.com/",
            &["/blog/post", "/apartments/1"],
            DiscoverOpts::default(),
        );
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn explicit_patterns_override_table() {
        let allow = vec![Regex::new(r"/blog").unwrap()];
        let links = run(
            "https://granitestudentliving.com/",
            &["/blog/post", "/listings/a"],
            DiscoverOpts {
                allow: Some(&allow),
                deny: Some(&[]),
                ..Default::default()
            },
        );
        assert_eq!(links, vec!["https://granitestudentliving.com/blog/post"]);
    }

    #[test]
    fn dedup_preserves_first_seen_and_caps() {
        let links = run(
            "https://example.com/",
            &["/a", "/b", "/a", "/c"],
            DiscoverOpts {
                max_results: 2,
                ..Default::default()
            },
        );
        assert_eq!(
            links,
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }
}
