use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use searchflickr::{FeedConfig, FeedItemDetail, FeedRecord, FeedSource, FlickrClient, SearchCoordinator};

#[derive(Parser)]
#[command(name = "searchflickr")]
#[command(about = "Search Flickr's public photo feed", long_about = None)]
struct Cli {
    /// Feed endpoint, overrides SEARCHFLICKR_FEED_URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List photos matching a query (recent uploads when empty)
    Search {
        query: Option<String>,
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Show the detail view of one photo
    Detail {
        query: String,
        #[arg(short, long, default_value_t = 0)]
        index: usize,
    },
    /// Read queries from stdin and print results as they change
    Watch {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = FeedConfig::from_env()?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    let client = FlickrClient::new(&config).context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Search { query, limit, json } => {
            let query = query.unwrap_or_default();
            let page = client
                .fetch_items(&query)
                .await
                .with_context(|| format!("Failed to search for '{}'", query))?;

            match page {
                Some(page) if json => println!("{}", serde_json::to_string_pretty(&page)?),
                Some(page) => print_results(&page.items, limit),
                None => println!("No photos found"),
            }
        }
        Commands::Detail { query, index } => {
            let page = client
                .fetch_items(&query)
                .await
                .with_context(|| format!("Failed to search for '{}'", query))?
                .ok_or_else(|| anyhow!("No photos found for '{}'", query))?;
            let record = page
                .items
                .get(index)
                .ok_or_else(|| anyhow!("Only {} photos found, no index {}", page.items.len(), index))?;
            print_detail(&FeedItemDetail::from_record(record));
        }
        Commands::Watch { limit } => watch(client, limit).await?,
    }

    Ok(())
}

async fn watch(client: FlickrClient, limit: usize) -> Result<()> {
    let mut coordinator = SearchCoordinator::new(Arc::new(client));

    let mut results_rx = coordinator.subscribe();
    let printer = tokio::spawn(async move {
        while results_rx.changed().await.is_ok() {
            let records = results_rx.borrow_and_update().clone();
            println!();
            print_results(&records, limit);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read query from stdin")? {
                    Some(line) => coordinator.set_query(line.trim()),
                    None => break,
                }
            }
            Some(_) = coordinator.next_update(), if coordinator.in_flight() > 0 => {
                if let Some(err) = coordinator.last_error() {
                    eprintln!("  ✗ Failed: {}", err);
                }
            }
        }
    }

    while coordinator.next_update().await.is_some() {}
    drop(coordinator);
    printer.await?;
    Ok(())
}

fn print_results(records: &[FeedRecord], limit: usize) {
    if records.is_empty() {
        println!("No photos found");
        return;
    }
    for (i, record) in records.iter().take(limit).enumerate() {
        let author = searchflickr::formatter::extract_author_name(&record.author);
        println!("{:>3}. {} - {}", i, record.title, author);
    }
    if records.len() > limit {
        println!("     ... {} more", records.len() - limit);
    }
}

fn print_detail(detail: &FeedItemDetail) {
    println!("{}", detail.title);
    println!("────────────────────────────────────────");
    println!("Author: {} ({})", detail.author_name, detail.author_id);
    if let Some(ref published) = detail.published {
        println!("Published: {}", published);
    }
    if let Some(ref taken) = detail.date_taken {
        println!("Taken: {}", taken);
    }
    println!("Image: {}", detail.image_url);
    println!("Link: {}", detail.link);
    if !detail.tags.is_empty() {
        println!("Tags: {}", detail.tags.join(", "));
    }
    if !detail.description.is_empty() {
        println!();
        for line in textwrap::wrap(&detail.description, 80) {
            println!("{}", line);
        }
    }
}
