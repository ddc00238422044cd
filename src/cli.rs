use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::models::Attribute;

fn parse_interval(s: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .map_err(|_| "Invalid interval".to_string())
        .and_then(|v| {
            if v > 0.0 && v.is_finite() {
                Ok(v)
            } else {
                Err("Interval must be a positive number of seconds".to_string())
            }
        })
}

#[derive(Parser, Debug)]
#[command(name = "plotwatch")]
#[command(about = "Live histogram dashboard for spreadsheet-backed field inventory data")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch once and print the histogram
    #[command(visible_alias = "stats")]
    Show {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Show summary statistics
        #[arg(long)]
        summary: bool,
    },

    /// Launch the live dashboard
    #[command(visible_aliases = &["dash", "d"])]
    Dashboard {
        #[command(flatten)]
        source: SourceArgs,

        /// Redraw interval in seconds (supports decimals, e.g. 0.5)
        #[arg(short, long, value_parser = parse_interval)]
        interval: Option<f64>,

        /// How long a fetched table is reused, in seconds (defaults to the interval)
        #[arg(long, value_parser = parse_interval)]
        cache_ttl: Option<f64>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// CSV file path or spreadsheet URL
    #[arg(short, long)]
    pub source: Option<String>,

    /// Attribute to plot
    #[arg(short, long, value_enum, conflicts_with = "column")]
    pub attribute: Option<Attribute>,

    /// Plot an arbitrary column instead of one of the standard attributes
    #[arg(long)]
    pub column: Option<String>,

    /// Number of histogram bins
    #[arg(short, long)]
    pub bins: Option<usize>,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, ValueEnum, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}
