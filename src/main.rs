mod crawl;
mod db;
mod discover;
mod fetch;
mod normalize;
mod parser;
mod record;
mod sites;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rent_scraper", about = "Rental listing scraper for Purdue-area housing sites")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the listings database
    Init,
    /// Discover candidate listing pages from a seed URL (default: all seeds)
    Discover {
        /// Seed URL to scan
        url: Option<String>,
        /// Max candidate links per seed
        #[arg(short = 'n', long, default_value = "200")]
        limit: usize,
    },
    /// Crawl the seeded sites: discover, fetch, extract, persist
    Run {
        /// Only crawl sites whose host contains this substring
        #[arg(short, long)]
        site: Option<String>,
        /// Max pages fetched per site
        #[arg(short = 'n', long, default_value = "120")]
        limit: usize,
    },
    /// Extract listings from a saved HTML file and print them as JSON
    Extract {
        /// URL the content was rendered from (drives strategy dispatch)
        url: String,
        /// Path to the rendered HTML
        path: PathBuf,
    },
    /// Show stored listing counts
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let table = sites::SiteTable::builtin();

    let result = match cli.command {
        Commands::Init => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            println!("Database ready at {}", db::DB_PATH);
            Ok(())
        }
        Commands::Discover { url, limit } => {
            let client = fetch::client()?;
            let seeds: Vec<String> = match url {
                Some(u) => vec![u],
                None => table
                    .rules()
                    .iter()
                    .flat_map(|r| r.seeds.iter().map(|s| s.to_string()))
                    .collect(),
            };
            for seed in seeds {
                let opts = discover::DiscoverOpts {
                    max_results: limit,
                    ..Default::default()
                };
                let links = discover::discover_links(&client, &table, &seed, opts).await;
                println!("{} -> {} candidates", seed, links.len());
                for link in links {
                    println!("  {}", link);
                }
            }
            Ok(())
        }
        Commands::Run { site, limit } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let client = fetch::client()?;

            let mut pages = 0usize;
            let mut listings = 0usize;
            for rule in table.rules() {
                if let Some(filter) = &site {
                    if !rule.host.contains(filter.as_str()) {
                        continue;
                    }
                }
                for &seed in rule.seeds {
                    let outcome = crawl::crawl_site(&client, &conn, &table, seed, limit).await?;
                    pages += outcome.pages;
                    listings += outcome.listings;
                }
            }
            println!("Crawl complete: {} pages fetched, {} listings written.", pages, listings);
            Ok(())
        }
        Commands::Extract { url, path } => {
            let html = std::fs::read_to_string(&path)?;
            let records = parser::extract(&url, &html, &table);
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let stats = db::get_stats(&conn)?;
            println!("Listings: {}", stats.total);
            for (company, count) in &stats.companies {
                println!("{:>6}  {}", count, company);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
