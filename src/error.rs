use thiserror::Error;

/// Failure to obtain a dataset from a data source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Source responded with HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to read source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Source returned a table without a header row")]
    NoHeader,
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Column '{attribute}' not found in fetched data (available: {})", available.join(", "))]
    MissingAttribute {
        attribute: String,
        available: Vec<String>,
    },

    #[error("Fetch failed: {0}")]
    FetchFailed(#[from] FetchError),

    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

impl RefreshError {
    /// Returns true if the loop should skip the current cycle and keep going
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RefreshError::MissingAttribute { .. })
    }

    /// Short label used in log fields
    pub fn category(&self) -> &'static str {
        match self {
            RefreshError::InvalidConfig(_) => "invalid_config",
            RefreshError::MissingAttribute { .. } => "missing_attribute",
            RefreshError::FetchFailed(_) => "fetch_failed",
            RefreshError::Terminal(_) => "terminal",
        }
    }
}
