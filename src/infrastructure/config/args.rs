use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Command-line flags. Anything set here wins over the config file.
#[derive(Debug, Parser)]
#[command(
    name = "movie-browser",
    version,
    about = "Search The Movie Database from the terminal",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// TMDB API key.
    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Write the given API key into the config file.
    #[arg(long)]
    pub save_api_key: bool,

    /// Catalog API root.
    #[arg(long, value_name = "URL")]
    pub api_base_url: Option<String>,

    /// Print results for this search and exit.
    #[arg(short, long, value_name = "TERM")]
    pub query: Option<String>,

    /// Number of pages to fetch with `--query`.
    #[arg(long, default_value_t = 1, requires = "query", value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,
}
