use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::SourceArgs;
use crate::histogram::DEFAULT_BINS;
use crate::models::AttributeSelection;

pub const DEFAULT_INTERVAL_SECS: f64 = 15.0;
pub const DEFAULT_ATTRIBUTE: &str = "height";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source: Option<String>,
    pub attribute: Option<String>,
    pub bins: Option<usize>,
    pub interval_secs: Option<f64>,
    pub cache_ttl_secs: Option<f64>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("plotwatch").join("config.toml"))
    }

    /// Load an explicit config file, or the default one if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Effective settings after layering CLI flags over the config file over
/// built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub source: String,
    pub attribute: AttributeSelection,
    pub bins: usize,
    pub interval: Duration,
    pub cache_ttl: Duration,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(
        config: Config,
        args: &SourceArgs,
        interval_secs: Option<f64>,
        cache_ttl_secs: Option<f64>,
    ) -> Result<Self> {
        let Some(source) = args.source.clone().or(config.source) else {
            bail!("No data source given; pass --source or set `source` in the config file");
        };

        let attribute = match (&args.attribute, &args.column) {
            (Some(attribute), _) => AttributeSelection::from(*attribute),
            (None, Some(column)) => AttributeSelection::new(column.as_str()),
            (None, None) => AttributeSelection::new(
                config.attribute.as_deref().unwrap_or(DEFAULT_ATTRIBUTE),
            ),
        };

        let interval_secs = interval_secs
            .or(config.interval_secs)
            .unwrap_or(DEFAULT_INTERVAL_SECS);
        let interval = seconds(interval_secs, "interval")?;

        // The fetch cache and the redraw share one cadence unless told otherwise.
        let cache_ttl = match cache_ttl_secs.or(config.cache_ttl_secs) {
            Some(ttl) => seconds(ttl, "cache ttl")?,
            None => interval,
        };

        let log_file = args.log_file.clone().or_else(|| {
            config
                .logging
                .file
                .map(|f| PathBuf::from(shellexpand::tilde(&f).into_owned()))
        });

        Ok(Self {
            source,
            attribute,
            bins: args.bins.or(config.bins).unwrap_or(DEFAULT_BINS),
            interval,
            cache_ttl,
            log_level: args
                .log_level
                .clone()
                .or(config.logging.level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_file,
        })
    }
}

fn seconds(value: f64, what: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .with_context(|| format!("Invalid {} of {} seconds", what, value))
}
