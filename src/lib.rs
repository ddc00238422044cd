pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod formatters;
pub mod histogram;
pub mod logging;
pub mod models;
pub mod refresh;
pub mod render;
pub mod slot;
pub mod source;

use anyhow::{Context, Result};
use cli::{Cli, Commands, OutputFormat};
use config::{Config, Settings};
use indicatif::{ProgressBar, ProgressStyle};
use logging::LogTarget;
use render::{HistogramRenderer, RenderSink};
use slot::DisplaySlot;
use source::{AnySource, DataSource};
use std::time::Duration;
use tracing::info;

pub use error::{FetchError, RefreshError};
pub use models::{Attribute, AttributeSelection, Dataset};
pub use refresh::{LoopState, RefreshLoop, RunSummary, StopHandle};

pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Show {
            source,
            format,
            summary,
        } => {
            let settings = Settings::resolve(config, &source, None, None)?;
            logging::init(&settings.log_level, LogTarget::Stderr)?;
            show_histogram(&settings, &format, summary).await
        }
        Commands::Dashboard {
            source,
            interval,
            cache_ttl,
        } => {
            let settings = Settings::resolve(config, &source, interval, cache_ttl)?;
            logging::init(
                &settings.log_level,
                LogTarget::FileOrDiscard(settings.log_file.as_deref()),
            )?;
            dashboard::run_dashboard(settings).await
        }
    }
}

/// Fetch once, render once and print the result.
pub async fn show_histogram(
    settings: &Settings,
    format: &OutputFormat,
    summary: bool,
) -> Result<()> {
    let mut source = AnySource::open(&settings.source).context("Failed to open data source")?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Invalid spinner template")?,
    );
    pb.set_message(format!("Fetching {}", source.describe()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let fetched = source.fetch().await;
    pb.finish_and_clear();
    source.release();
    let dataset = fetched.map_err(RefreshError::from)?;

    info!(rows = dataset.row_count(), "Fetched dataset");

    let mut renderer = HistogramRenderer::new(settings.bins);
    let mut slot = DisplaySlot::new();
    renderer.render(dataset, &settings.attribute, &mut slot)?;
    let Some(artifact) = slot.current() else {
        anyhow::bail!("Renderer produced no output");
    };

    if artifact.histogram.is_empty() {
        println!("Column '{}' has no numeric values.", settings.attribute);
        return Ok(());
    }

    match format {
        OutputFormat::Table => {
            println!("{}", formatters::format_table(artifact, summary));
        }
        OutputFormat::Csv => {
            print!("{}", formatters::format_csv(artifact));
        }
        OutputFormat::Json => {
            println!("{}", formatters::format_json(artifact)?);
        }
        OutputFormat::Markdown => {
            print!("{}", formatters::format_markdown(artifact, summary));
        }
    }

    // Print summary if requested
    if summary {
        formatters::print_summary(artifact);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn settings(source: String, column: &str) -> Settings {
        let args = cli::SourceArgs {
            source: Some(source),
            column: Some(column.to_string()),
            ..Default::default()
        };
        Settings::resolve(Config::default(), &args, None, None).unwrap()
    }

    #[tokio::test]
    async fn test_show_histogram_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plots.csv");
        fs::write(&path, "height,dbh\n1,10\n2,20\n3,30\n").unwrap();

        let settings = settings(path.display().to_string(), "dbh");
        show_histogram(&settings, &OutputFormat::Csv, false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_show_histogram_missing_column() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plots.csv");
        fs::write(&path, "height,dbh\n1,10\n").unwrap();

        let settings = settings(path.display().to_string(), "count");
        let err = show_histogram(&settings, &OutputFormat::Table, false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("'count' not found"));
    }
}
