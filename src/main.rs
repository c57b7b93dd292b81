mod fetch;
mod parser;
mod record;
mod settings;
mod sink;
#[cfg(test)]
mod test_support;

use std::time::Instant;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use record::Batch;
use settings::{Overrides, Settings, SinkKind};

#[derive(Parser)]
#[command(name = "bdz_delays", about = "Record train arrival delays from the BDZ live board")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the arrivals page once and append the delays to the store
    Run {
        /// Where to append (default: csv, or BDZ_SINK)
        #[arg(short, long, value_enum)]
        sink: Option<SinkKind>,
        /// File path for csv/sqlite, spreadsheet id for sheets
        #[arg(short, long)]
        dest: Option<String>,
        /// Arrivals page to scrape
        #[arg(long)]
        url: Option<String>,
    },
    /// Parse a saved arrivals page and print the delays (nothing is stored)
    Extract {
        /// HTML file saved from the arrivals page
        file: std::path::PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = dispatch(cli.command) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn dispatch(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Run { sink, dest, url } => {
            let settings = Settings::load(Overrides { url, sink, dest })?;
            info!(settings = ?settings, "Starting run");
            run_once(&settings)
        }
        Commands::Extract { file } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let batch = parser::extract_batch(&html, Utc::now())
                .with_context(|| format!("Failed to extract trains from {}", file.display()))?;
            print_batch(&batch);
            Ok(())
        }
    }
}

/// Fetch → extract → append. Nothing is written unless extraction succeeds.
fn run_once(settings: &Settings) -> anyhow::Result<()> {
    let t0 = Instant::now();
    let captured_at = Utc::now();

    let sink = sink::from_settings(settings).context("Failed to set up sink")?;
    let html = fetch::fetch_page(settings).context("Failed to fetch arrivals page")?;
    let batch = parser::extract_batch(&html, captured_at).context("Extraction failed")?;
    sink.append(&batch)
        .with_context(|| format!("Failed to append batch to {}", sink.name()))?;

    info!(
        "Run complete: {} trains -> {} in {:.1}s",
        batch.len(),
        sink.name(),
        t0.elapsed().as_secs_f64()
    );
    print_batch(&batch);
    Ok(())
}

fn print_batch(batch: &Batch) {
    if batch.is_empty() {
        println!("No trains found.");
        return;
    }

    println!("{:>3} | {:<8} | {:>9} | {:<20}", "#", "Train", "Delay min", "Scraped at");
    println!("{}", "-".repeat(50));
    for (i, r) in batch.iter().enumerate() {
        println!(
            "{:>3} | {:<8} | {:>9} | {:<20}",
            i + 1,
            r.train_id(),
            r.delay_minutes(),
            r.captured_at_text()
        );
    }

    let late = batch.iter().filter(|r| r.delay_minutes() > 0).count();
    println!("\n{} trains | {} late", batch.len(), late);
}
