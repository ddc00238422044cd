use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::models::Dataset;

/// Where each refresh cycle gets its data from.
///
/// A source is opened once by the caller and then owned by the refresh loop,
/// which calls [`DataSource::release`] when it stops.
#[allow(async_fn_in_trait)]
pub trait DataSource {
    async fn fetch(&mut self) -> Result<Dataset, FetchError>;

    /// Human readable location, shown in the dashboard header
    fn describe(&self) -> String;

    fn release(&mut self) {}
}

/// Reads a CSV file from disk on every fetch.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: &str) -> Self {
        let expanded = shellexpand::tilde(path).into_owned();
        Self {
            path: PathBuf::from(expanded),
        }
    }
}

impl DataSource for CsvFileSource {
    async fn fetch(&mut self) -> Result<Dataset, FetchError> {
        let bytes = tokio::fs::read(&self.path).await?;
        Dataset::from_csv_reader(bytes.as_slice())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fetches the CSV export of a spreadsheet over HTTP.
///
/// The HTTP client is created once and reused across fetches until the
/// source is released.
#[derive(Debug)]
pub struct SheetSource {
    url: String,
    client: Option<reqwest::Client>,
}

impl SheetSource {
    pub fn new(url: &str) -> Result<Self, FetchError> {
        let url = sheet_export_url(url);
        let client = build_client()?;
        info!(%url, "Opened spreadsheet source");
        Ok(Self {
            url,
            client: Some(client),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn build_client() -> Result<reqwest::Client, FetchError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("plotwatch/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

impl DataSource for SheetSource {
    async fn fetch(&mut self) -> Result<Dataset, FetchError> {
        let client = match self.client.take() {
            Some(client) => client,
            None => build_client()?,
        };
        let client = self.client.insert(client);

        let response = client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Downloaded spreadsheet export");
        Dataset::from_csv_reader(body.as_ref())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }

    fn release(&mut self) {
        if self.client.take().is_some() {
            debug!(url = %self.url, "Released spreadsheet client");
        }
    }
}

/// Turn a Google Sheets edit or share link into its CSV export link. Other
/// URLs are returned unchanged.
pub fn sheet_export_url(url: &str) -> String {
    const MARKER: &str = "docs.google.com/spreadsheets/d/";

    let Some(start) = url.find(MARKER) else {
        return url.to_string();
    };
    let rest = &url[start + MARKER.len()..];
    let id = rest.split(['/', '?', '#']).next().unwrap_or("");
    if id.is_empty() || rest.contains("/export?") {
        return url.to_string();
    }

    let gid = url
        .split(['#', '?', '&'])
        .find_map(|part| part.strip_prefix("gid="))
        .unwrap_or("0");

    format!("{}{}{}/export?format=csv&gid={}", &url[..start], MARKER, id, gid)
}

/// Reuses the last fetched dataset for `ttl` before asking the inner source
/// again.
#[derive(Debug)]
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    cached: Option<(Instant, Dataset)>,
}

impl<S: DataSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: None,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: DataSource> DataSource for CachedSource<S> {
    async fn fetch(&mut self) -> Result<Dataset, FetchError> {
        if let Some((fetched_at, dataset)) = &self.cached {
            if fetched_at.elapsed() < self.ttl {
                debug!(age_ms = fetched_at.elapsed().as_millis() as u64, "Serving cached dataset");
                return Ok(dataset.clone());
            }
        }

        let dataset = self.inner.fetch().await?;
        self.cached = Some((Instant::now(), dataset.clone()));
        Ok(dataset)
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }

    fn release(&mut self) {
        self.cached = None;
        self.inner.release();
    }
}

/// A source chosen at runtime from a path or URL.
#[derive(Debug)]
pub enum AnySource {
    File(CsvFileSource),
    Sheet(SheetSource),
}

impl AnySource {
    pub fn open(location: &str) -> Result<Self, FetchError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            Ok(AnySource::Sheet(SheetSource::new(location)?))
        } else {
            Ok(AnySource::File(CsvFileSource::new(location)))
        }
    }
}

impl DataSource for AnySource {
    async fn fetch(&mut self) -> Result<Dataset, FetchError> {
        match self {
            AnySource::File(source) => source.fetch().await,
            AnySource::Sheet(source) => source.fetch().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            AnySource::File(source) => source.describe(),
            AnySource::Sheet(source) => source.describe(),
        }
    }

    fn release(&mut self) {
        match self {
            AnySource::File(source) => source.release(),
            AnySource::Sheet(source) => source.release(),
        }
    }
}
