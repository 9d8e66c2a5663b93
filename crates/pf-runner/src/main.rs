//! # pf-runner
//!
//! Command-line front end for the portfolio-flow helpers.
//!
//! Loads an optional JSON configuration, applies the `EXTRA_FINAL_STATUSES`
//! and `FLOW_TRUST_NONFINAL` environment overrides, builds the final-status
//! table once and runs the requested command.
//!
//! # Usage
//!
//! ```bash
//! pf-runner is-final binance withdraw 6
//! pf-runner dedupe pages.json
//! pf-runner --config flows.json funding pages.json --exchange okx
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pf_core::config::{AppConfig, load_config};
use pf_core::{EventDeduplicator, FundingEvent, FundingFilter, StatusTable};
use tracing::info;

/// Portfolio funding-flow helpers.
#[derive(Parser)]
#[command(name = "pf-runner", about = "Final-status checks and event deduplication for exchange funding flows")]
struct Cli {
    /// Configuration file path (JSON).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(short, long)]
    log_level: Option<String>,

    /// Optional log directory for file output. Overrides the config file.
    #[arg(long)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print whether a status is final for an exchange and direction.
    IsFinal {
        exchange: String,
        /// `deposit` or `withdraw`.
        direction: String,
        status: String,
    },
    /// Deduplicate events from a JSON file (array of pages or array of events).
    Dedupe { events: PathBuf },
    /// Deduplicate events and keep only final ones, sorted by timestamp.
    Funding {
        events: PathBuf,
        #[arg(short, long)]
        exchange: String,
    },
}

/// Parse event file contents: an array of pages in fetch order, or one flat
/// array of events.
///
/// The error comes from the shape the input looks like, so it points at the
/// offending event instead of a generic "no variant matched".
fn parse_pages(content: &str) -> serde_json::Result<Vec<Vec<FundingEvent>>> {
    match serde_json::from_str::<Vec<Vec<FundingEvent>>>(content) {
        Ok(pages) => Ok(pages),
        Err(e) if looks_paged(content) => Err(e),
        Err(_) => serde_json::from_str::<Vec<FundingEvent>>(content).map(|events| vec![events]),
    }
}

fn looks_paged(content: &str) -> bool {
    content
        .trim_start()
        .strip_prefix('[')
        .is_some_and(|rest| rest.trim_start().starts_with('['))
}

fn read_pages(path: &Path) -> Result<Vec<Vec<FundingEvent>>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading events from {}", path.display()))?;
    parse_pages(&content).with_context(|| format!("parsing events from {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration (no logging yet)
    let mut config = match &cli.config {
        Some(path) => load_config(path).with_context(|| format!("loading config {}", path.display()))?,
        None => AppConfig::default(),
    };

    // 2. Initialize logging
    let log_level = cli.log_level.as_deref().unwrap_or(config.logging.level());
    let log_dir = cli.log_dir.as_deref().or(config.logging.log_dir.as_deref());
    pf_core::logging::init_logging(log_level, log_dir, config.logging.module_name());

    // 3. Apply environment overrides; malformed entries are warned about here
    config.apply_overrides(
        std::env::var("EXTRA_FINAL_STATUSES").ok().as_deref(),
        std::env::var("FLOW_TRUST_NONFINAL").ok().as_deref(),
    );

    // 4. Build the status table once
    let table = StatusTable::new(&config.final_status);
    info!("status table ready ({} extra scope(s))", config.final_status.extra_statuses.len());

    // 5. Run the command
    match cli.command {
        Command::IsFinal { exchange, direction, status } => {
            println!("{}", table.is_final(&exchange, &direction, status.as_str()));
        }
        Command::Dedupe { events } => {
            let out = EventDeduplicator::new().dedupe_pages(read_pages(&events)?);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Funding { events, exchange } => {
            let out = FundingFilter::new(&table)
                .trust_nonfinal(config.trust_nonfinal)
                .collect_final(&exchange, read_pages(&events)?);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}
