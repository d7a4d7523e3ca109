//! moon-day - print lunar day start times around today for a location
//!
//! Each day is looked up in the local cache first and fetched from the
//! lunar calendar site only when missing (or when `--skip-cache` is given).
//! Rows are printed tab-separated once the whole window has been collected.

use std::io::{self, BufWriter};
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use moon_day::cache::CacheStore;
use moon_day::cli::{Cli, Config};
use moon_day::data::MoonDayClient;
use moon_day::{output, range};

/// Logs go to stderr so stdout carries only the rows.
/// `RUST_LOG` wins over `-v`; otherwise 0 = warn, 1 = info, 2+ = debug.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("moon_day=warn"),
        1 => EnvFilter::new("moon_day=info"),
        _ => EnvFilter::new("moon_day=debug"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_cli(&cli)?;
    debug!(?config, "Starting");

    let client = MoonDayClient::with_base_url(config.base_url.clone())?;
    let store = CacheStore::open(&config.cache_path, client)?;
    let entries = store.entry_count()?;
    debug!(entries, "Cache ready");

    let rows = range::collect(
        &store,
        config.location_id,
        config.days_before,
        config.days_after,
        config.skip_cache,
    )
    .await?;

    let stdout = io::stdout().lock();
    output::write_rows(BufWriter::new(stdout), &rows)?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
