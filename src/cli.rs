//! Command-line interface parsing for moon-day
//!
//! Flags mirror the long-standing `--city-id/--days-before/--days-after/--skip-cache`
//! interface; the cache location and endpoint can be overridden for testing
//! or mirrors.

use std::path::PathBuf;

use clap::Parser;
use directories::ProjectDirs;
use thiserror::Error;

use crate::data::DEFAULT_BASE_URL;

/// Location used when none is given (the original default city)
pub const DEFAULT_LOCATION_ID: i64 = 31;

/// Error types for turning CLI arguments into a configuration
#[derive(Debug, Error)]
pub enum CliError {
    /// No home/cache directory could be determined and no path was given
    #[error("Could not determine a cache directory; pass --cache-path or set MOON_DAY_CACHE")]
    NoCacheDir,
}

/// moon-day - lunar day start times for a location, cached per day
#[derive(Parser, Debug)]
#[command(name = "moon-day")]
#[command(about = "Print lunar day start times around today for a location")]
#[command(version)]
pub struct Cli {
    /// Location (city) identifier used by the lunar calendar site
    #[arg(long, alias = "city-id", default_value_t = DEFAULT_LOCATION_ID, allow_negative_numbers = true)]
    pub location_id: i64,

    /// Number of days before today to include
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub days_before: i64,

    /// Number of days after today to include
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub days_after: i64,

    /// Fetch every day again and overwrite the cached entries
    #[arg(long)]
    pub skip_cache: bool,

    /// Path of the cache file (defaults to the user cache directory)
    #[arg(long, env = "MOON_DAY_CACHE", value_name = "PATH")]
    pub cache_path: Option<PathBuf>,

    /// Base URL of the lunar day pages
    #[arg(long, env = "MOON_DAY_BASE_URL", value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Settings for one run, resolved from the CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub location_id: i64,
    pub days_before: i64,
    pub days_after: i64,
    pub skip_cache: bool,
    pub cache_path: PathBuf,
    pub base_url: String,
}

/// Default cache file: `~/.cache/moon-day/cache` on Linux, or the platform equivalent
///
/// Returns `None` if no home directory can be determined.
pub fn default_cache_path() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "moon-day")?;
    Some(project_dirs.cache_dir().join("cache"))
}

impl Config {
    /// Resolves a configuration from parsed CLI arguments.
    ///
    /// Window bounds are passed through as given; the range collector decides
    /// what to do with negative values.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let cache_path = match &cli.cache_path {
            Some(path) => path.clone(),
            None => default_cache_path().ok_or(CliError::NoCacheDir)?,
        };

        Ok(Config {
            location_id: cli.location_id,
            days_before: cli.days_before,
            days_after: cli.days_after,
            skip_cache: cli.skip_cache,
            cache_path,
            base_url: cli.base_url.clone(),
        })
    }
}
