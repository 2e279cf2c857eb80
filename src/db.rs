use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use rusqlite::Connection;

use crate::record::{plausible_rent, Listing};

pub const DB_PATH: &str = "data/listings.sqlite";

const SLUG_MAX: usize = 60;

static NON_ALNUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

pub fn connect() -> Result<Connection> {
    if let Some(dir) = std::path::Path::new(DB_PATH).parent() {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(DB_PATH)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS listings (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            url             TEXT UNIQUE,
            company         TEXT,
            title           TEXT,
            price           INTEGER,
            beds            INTEGER,
            baths           REAL,
            address         TEXT,
            last_scraped_at TEXT
        );
        ",
    )?;
    Ok(())
}

/// Upsert a batch of listings, returning how many rows were written.
/// Records failing the plausible-rent check are dropped defensively, and
/// units sharing one page URL get synthetic fragment keys first so they
/// can coexist under the UNIQUE(url) constraint.
pub fn persist(conn: &Connection, records: &[Listing]) -> Result<usize> {
    let valid: Vec<Listing> = records
        .iter()
        .filter(|r| plausible_rent(r.price))
        .cloned()
        .collect();
    if valid.is_empty() {
        return Ok(0);
    }
    let rows = stabilize_unit_urls(valid);

    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO listings
               (url, company, title, price, beds, baths, address, last_scraped_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(url) DO UPDATE SET
                 company = excluded.company,
                 title = excluded.title,
                 price = excluded.price,
                 beds = excluded.beds,
                 baths = excluded.baths,
                 address = excluded.address,
                 last_scraped_at = excluded.last_scraped_at",
        )?;
        for r in &rows {
            stmt.execute(rusqlite::params![
                r.url,
                r.company,
                r.title,
                r.price,
                r.beds,
                r.baths,
                r.address,
                r.last_scraped_at,
            ])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

/// When several units share one page URL, append a stable
/// `#unit-<slug>-<price>` fragment so each gets its own row; collisions
/// between synthesized keys get an incrementing suffix.
fn stabilize_unit_urls(mut rows: Vec<Listing>) -> Vec<Listing> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for r in &rows {
        *counts.entry(r.url.clone()).or_insert(0) += 1;
    }

    let mut seen: HashSet<String> = HashSet::new();
    for r in &mut rows {
        if counts[&r.url] < 2 {
            continue;
        }
        let base = format!("{}#unit-{}-{}", r.url, slug(&r.title), r.price);
        let mut unique = base.clone();
        let mut i = 1;
        while !seen.insert(unique.clone()) {
            i += 1;
            unique = format!("{}-{}", base, i);
        }
        r.url = unique;
    }
    rows
}

fn slug(s: &str) -> String {
    let lowered = s.to_lowercase();
    let replaced = NON_ALNUM_RE.replace_all(&lowered, "-");
    let trimmed: String = replaced.trim_matches('-').chars().take(SLUG_MAX).collect();
    if trimmed.is_empty() {
        "unit".to_string()
    } else {
        trimmed
    }
}

// ── Stats ──

pub struct Stats {
    pub total: usize,
    pub companies: Vec<(String, usize)>,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let total: usize = conn.query_row("SELECT COUNT(*) FROM listings", [], |r| r.get(0))?;
    let mut stmt = conn.prepare(
        "SELECT company, COUNT(*) FROM listings
         GROUP BY company ORDER BY COUNT(*) DESC, company",
    )?;
    let companies = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Stats { total, companies })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn listing(url: &str, title: &str, price: i64) -> Listing {
        Listing {
            url: url.to_string(),
            company: "Test Co".to_string(),
            title: title.to_string(),
            price,
            beds: 2,
            baths: 1.0,
            address: "West Lafayette, IN".to_string(),
            last_scraped_at: "08-04-2026".to_string(),
        }
    }

    fn all_urls(conn: &Connection) -> Vec<String> {
        let mut stmt = conn.prepare("SELECT url FROM listings ORDER BY url").unwrap();
        stmt.query_map([], |r| r.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap()
    }

    #[test]
    fn persist_is_idempotent_and_last_write_wins() {
        let conn = test_conn();
        let first = listing("https://x.com/a", "A1", 1200);
        assert_eq!(persist(&conn, &[first.clone()]).unwrap(), 1);

        let mut second = first;
        second.price = 1300;
        assert_eq!(persist(&conn, &[second]).unwrap(), 1);

        let (count, price): (usize, i64) = conn
            .query_row("SELECT COUNT(*), MAX(price) FROM listings", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(price, 1300);
    }

    #[test]
    fn co_located_units_get_distinct_keys() {
        let conn = test_conn();
        let records = vec![
            listing("https://x.com/plans", "A1", 1200),
            listing("https://x.com/plans", "B2", 1300),
        ];
        assert_eq!(persist(&conn, &records).unwrap(), 2);
        assert_eq!(
            all_urls(&conn),
            vec![
                "https://x.com/plans#unit-a1-1200",
                "https://x.com/plans#unit-b2-1300",
            ]
        );
    }

    #[test]
    fn synthetic_key_collisions_get_suffixes() {
        let conn = test_conn();
        let records = vec![
            listing("https://x.com/plans", "A1", 1200),
            listing("https://x.com/plans", "A1", 1200),
            listing("https://x.com/plans", "A1", 1200),
        ];
        assert_eq!(persist(&conn, &records).unwrap(), 3);
        assert_eq!(
            all_urls(&conn),
            vec![
                "https://x.com/plans#unit-a1-1200",
                "https://x.com/plans#unit-a1-1200-2",
                "https://x.com/plans#unit-a1-1200-3",
            ]
        );
    }

    #[test]
    fn single_record_keeps_its_url() {
        let conn = test_conn();
        persist(&conn, &[listing("https://x.com/unit/7", "Unit 7", 900)]).unwrap();
        assert_eq!(all_urls(&conn), vec!["https://x.com/unit/7"]);
    }

    #[test]
    fn implausible_rows_are_filtered() {
        let conn = test_conn();
        let records = vec![
            listing("https://x.com/a", "A", 250),
            listing("https://x.com/b", "B", 7000),
            listing("https://x.com/c", "C", 950),
        ];
        assert_eq!(persist(&conn, &records).unwrap(), 1);
        assert_eq!(all_urls(&conn), vec!["https://x.com/c"]);
    }

    #[test]
    fn slug_collapses_and_truncates() {
        assert_eq!(slug("A1 -- Deluxe  Suite!"), "a1-deluxe-suite");
        assert_eq!(slug("***"), "unit");
        assert_eq!(slug(&"x".repeat(100)).len(), SLUG_MAX);
    }

    #[test]
    fn stats_counts_by_company() {
        let conn = test_conn();
        let mut other = listing("https://y.com/a", "Y1", 800);
        other.company = "Other Co".to_string();
        persist(
            &conn,
            &[
                listing("https://x.com/a", "A1", 1200),
                listing("https://x.com/b", "B1", 1250),
                other,
            ],
        )
        .unwrap();
        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.companies[0], ("Test Co".to_string(), 2));
        assert_eq!(stats.companies[1], ("Other Co".to_string(), 1));
    }
}
