//! Periodic fetch → render → wait cycle driving a single display slot.
//!
//! The loop is sequential: a cycle fetches from its [`DataSource`], checks the
//! selected column is present, hands the dataset to its [`RenderSink`] and
//! then sleeps for the configured interval. The sleep does not compensate for
//! the time spent fetching and rendering.
//!
//! Cancellation is cooperative. [`RefreshLoop::stop`] (or a cloned
//! [`StopHandle`]) is observed at the wait boundary, never in the middle of a
//! fetch or render.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::RefreshError;
use crate::models::AttributeSelection;
use crate::render::RenderSink;
use crate::slot::DisplaySlot;
use crate::source::DataSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Cloneable handle that requests the loop to stop.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// What happened during a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub renders: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleOutcome {
    Rendered,
    Skipped,
}

pub struct RefreshLoop<S, R: RenderSink> {
    interval: Duration,
    attribute: AttributeSelection,
    source: S,
    renderer: R,
    slot: DisplaySlot<R::Artifact>,
    state: LoopState,
    stop: StopHandle,
    summary: RunSummary,
}

impl<S: DataSource, R: RenderSink> RefreshLoop<S, R> {
    pub fn configure(
        interval: Duration,
        attribute: AttributeSelection,
        source: S,
        renderer: R,
    ) -> Result<Self, RefreshError> {
        if interval.is_zero() {
            return Err(RefreshError::InvalidConfig(
                "refresh interval must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            interval,
            attribute,
            source,
            renderer,
            slot: DisplaySlot::new(),
            state: LoopState::Stopped,
            stop: StopHandle::default(),
            summary: RunSummary::default(),
        })
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Request termination. Takes effect at the next wait boundary.
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn slot(&self) -> &DisplaySlot<R::Artifact> {
        &self.slot
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn attribute(&self) -> &AttributeSelection {
        &self.attribute
    }

    /// Run cycles until stopped or until a fetch or render fails. The loop
    /// stays stopped afterwards either way.
    pub async fn run(&mut self) -> Result<RunSummary, RefreshError> {
        if self.stop.is_stopped() {
            info!("Refresh loop stopped before start");
            return Ok(self.summary.clone());
        }

        self.state = LoopState::Running;
        info!(
            interval_ms = self.interval.as_millis() as u64,
            attribute = %self.attribute,
            source = %self.source.describe(),
            "Refresh loop started"
        );

        let result = self.drive().await;

        // Any exit is final, including a failure.
        self.stop.stop();
        self.state = LoopState::Stopped;
        self.source.release();

        match &result {
            Ok(summary) => info!(
                cycles = summary.cycles,
                renders = summary.renders,
                skipped = summary.skipped,
                "Refresh loop stopped"
            ),
            Err(e) => error!(
                error = %e,
                category = e.category(),
                cycles = self.summary.cycles,
                "Refresh loop terminated"
            ),
        }

        result
    }

    async fn drive(&mut self) -> Result<RunSummary, RefreshError> {
        loop {
            self.summary.cycles += 1;

            match self.cycle().await {
                Ok(CycleOutcome::Rendered) => self.summary.renders += 1,
                Ok(CycleOutcome::Skipped) => self.summary.skipped += 1,
                Err(e) => return Err(e),
            }

            debug!(interval_ms = self.interval.as_millis() as u64, "Waiting for next cycle");
            tokio::select! {
                biased;
                _ = self.stop.token.cancelled() => {
                    info!("Stop requested, ending refresh loop");
                    return Ok(self.summary.clone());
                }
                _ = sleep(self.interval) => {}
            }
        }
    }

    async fn cycle(&mut self) -> Result<CycleOutcome, RefreshError> {
        let started = Instant::now();
        let dataset = self.source.fetch().await?;
        debug!(
            rows = dataset.row_count(),
            columns = dataset.column_names().len(),
            fetch_ms = started.elapsed().as_millis() as u64,
            "Fetched dataset"
        );

        if !dataset.has_column(self.attribute.as_str()) {
            let err = RefreshError::MissingAttribute {
                attribute: self.attribute.to_string(),
                available: dataset.column_names(),
            };
            warn!(error = %err, "Skipping render for this cycle");
            return Ok(CycleOutcome::Skipped);
        }

        match self.renderer.render(dataset, &self.attribute, &mut self.slot) {
            Ok(()) => {
                debug!(generation = self.slot.generation(), "Rendered");
                Ok(CycleOutcome::Rendered)
            }
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "Renderer skipped this cycle");
                Ok(CycleOutcome::Skipped)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::Dataset;
    use crate::render::{HistogramArtifact, HistogramRenderer};
    use std::collections::VecDeque;

    /// Replays a fixed script of fetch results, then keeps returning the last
    /// dataset it produced.
    struct ScriptedSource {
        script: VecDeque<Result<Dataset, FetchError>>,
        last: Option<Dataset>,
        fetches: usize,
        released: usize,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Dataset, FetchError>>) -> Self {
            Self {
                script: script.into(),
                last: None,
                fetches: 0,
                released: 0,
            }
        }

        fn repeating(dataset: Dataset) -> Self {
            Self::new(vec![Ok(dataset)])
        }
    }

    impl DataSource for ScriptedSource {
        async fn fetch(&mut self) -> Result<Dataset, FetchError> {
            self.fetches += 1;
            match self.script.pop_front() {
                Some(Ok(dataset)) => {
                    self.last = Some(dataset.clone());
                    Ok(dataset)
                }
                Some(Err(e)) => Err(e),
                None => self.last.clone().ok_or(FetchError::NoHeader),
            }
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }

        fn release(&mut self) {
            self.released += 1;
        }
    }

    /// Wraps the histogram renderer, counting calls and optionally issuing a
    /// stop while a render is in progress.
    struct CountingRenderer {
        inner: HistogramRenderer,
        renders: usize,
        stop_during_render: Option<StopHandle>,
    }

    impl CountingRenderer {
        fn new() -> Self {
            Self {
                inner: HistogramRenderer::default(),
                renders: 0,
                stop_during_render: None,
            }
        }
    }

    impl RenderSink for CountingRenderer {
        type Artifact = HistogramArtifact;

        fn render(
            &mut self,
            dataset: Dataset,
            attribute: &AttributeSelection,
            slot: &mut DisplaySlot<HistogramArtifact>,
        ) -> Result<(), RefreshError> {
            self.renders += 1;
            if let Some(handle) = &self.stop_during_render {
                handle.stop();
            }
            self.inner.render(dataset, attribute, slot)
        }
    }

    fn plots() -> Dataset {
        Dataset::from_columns([
            ("height", vec![1.0, 2.0, 3.0]),
            ("dbh", vec![10.0, 20.0, 30.0]),
        ])
    }

    fn network_down() -> FetchError {
        FetchError::Status {
            status: 503,
            url: "https://example.com/sheet.csv".to_string(),
        }
    }

    fn configure(
        source: ScriptedSource,
    ) -> RefreshLoop<ScriptedSource, CountingRenderer> {
        RefreshLoop::configure(
            Duration::from_secs(5),
            AttributeSelection::new("height"),
            source,
            CountingRenderer::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_zero_interval_is_invalid() {
        let result = RefreshLoop::configure(
            Duration::ZERO,
            AttributeSelection::new("height"),
            ScriptedSource::repeating(plots()),
            CountingRenderer::new(),
        );
        assert!(matches!(result, Err(RefreshError::InvalidConfig(_))));
    }

    #[test]
    fn test_initial_state_is_stopped() {
        let refresh = configure(ScriptedSource::repeating(plots()));
        assert_eq!(refresh.state(), LoopState::Stopped);
        assert!(refresh.slot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_cycle_fetches_once_before_waiting() {
        let mut refresh = configure(ScriptedSource::repeating(plots()));
        let handle = refresh.stop_handle();

        let stopper = async {
            sleep(Duration::from_secs(1)).await;
            handle.stop();
        };
        let (result, _) = tokio::join!(refresh.run(), stopper);

        let summary = result.unwrap();
        assert_eq!(summary.cycles, 1);
        assert_eq!(refresh.source().fetches, 1);
        assert_eq!(refresh.renderer().renders, 1);
        assert_eq!(refresh.state(), LoopState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_attribute_keeps_prior_artifact() {
        let no_height = Dataset::from_columns([("dbh", vec![10.0, 20.0])]);
        let source = ScriptedSource::new(vec![Ok(plots()), Ok(no_height), Err(network_down())]);
        let mut refresh = configure(source);

        let result = refresh.run().await;

        assert!(matches!(result, Err(RefreshError::FetchFailed(_))));
        assert_eq!(refresh.source().fetches, 3);
        assert_eq!(refresh.renderer().renders, 1);
        assert_eq!(refresh.slot().generation(), 1);
        let artifact = refresh.slot().current().unwrap();
        assert_eq!(artifact.histogram.samples, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_stops_loop() {
        let source = ScriptedSource::new(vec![Err(network_down())]);
        let mut refresh = configure(source);

        let result = refresh.run().await;

        assert!(matches!(result, Err(RefreshError::FetchFailed(_))));
        assert_eq!(refresh.state(), LoopState::Stopped);
        assert_eq!(refresh.renderer().renders, 0);
        assert!(refresh.slot().is_empty());
        assert_eq!(refresh.source().released, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_wait_prevents_next_cycle() {
        let mut refresh = configure(ScriptedSource::repeating(plots()));
        let handle = refresh.stop_handle();

        // Cycles start at t=0s and t=5s; the stop lands in the second wait.
        let stopper = async {
            sleep(Duration::from_secs(7)).await;
            handle.stop();
        };
        let (result, _) = tokio::join!(refresh.run(), stopper);

        let summary = result.unwrap();
        assert_eq!(summary.cycles, 2);
        assert_eq!(refresh.source().fetches, 2);
        assert_eq!(refresh.renderer().renders, 2);
        assert_eq!(refresh.source().released, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_render_finishes_render() {
        let mut refresh = configure(ScriptedSource::repeating(plots()));
        refresh.renderer.stop_during_render = Some(refresh.stop_handle());

        let summary = refresh.run().await.unwrap();

        assert_eq!(summary.renders, 1);
        assert_eq!(refresh.source().fetches, 1);
        assert_eq!(refresh.slot().len(), 1);
        assert_eq!(refresh.state(), LoopState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_run_does_nothing() {
        let mut refresh = configure(ScriptedSource::repeating(plots()));
        refresh.stop();

        let summary = refresh.run().await.unwrap();

        assert_eq!(summary.cycles, 0);
        assert_eq!(refresh.source().fetches, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_after_failure_does_not_restart() {
        let source = ScriptedSource::new(vec![Err(network_down()), Ok(plots())]);
        let mut refresh = configure(source);

        assert!(refresh.run().await.is_err());
        let summary = refresh.run().await.unwrap();

        assert_eq!(summary.renders, 0);
        assert_eq!(refresh.source().fetches, 1);
        assert_eq!(refresh.source().released, 1);
        assert_eq!(refresh.state(), LoopState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attribute_checked_only_on_fetch() {
        // An unnamed header cell yields a column called "".
        let dataset = Dataset::from_csv_reader("height,,dbh\n1,5,10\n2,6,20\n".as_bytes()).unwrap();
        let mut refresh = RefreshLoop::configure(
            Duration::from_secs(5),
            AttributeSelection::new(""),
            ScriptedSource::new(vec![Ok(dataset), Err(network_down())]),
            CountingRenderer::new(),
        )
        .unwrap();

        assert!(refresh.run().await.is_err());
        assert_eq!(refresh.renderer().renders, 1);
        assert_eq!(refresh.slot().current().unwrap().histogram.samples, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_datasets_replace_single_artifact() {
        let mut refresh = configure(ScriptedSource::repeating(plots()));
        let handle = refresh.stop_handle();

        let stopper = async {
            sleep(Duration::from_secs(22)).await;
            handle.stop();
        };
        let (result, _) = tokio::join!(refresh.run(), stopper);

        let summary = result.unwrap();
        assert_eq!(summary.renders, 5);
        assert_eq!(refresh.slot().generation(), 5);
        assert_eq!(refresh.slot().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_render_then_fetch_failure() {
        let source = ScriptedSource::new(vec![Ok(plots()), Err(network_down())]);
        let mut refresh = configure(source);
        let started = Instant::now();

        let result = refresh.run().await;

        assert!(matches!(result, Err(RefreshError::FetchFailed(_))));
        assert_eq!(refresh.state(), LoopState::Stopped);
        assert_eq!(refresh.renderer().renders, 1);
        // One wait between the two cycles, and none after the failure.
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert!(started.elapsed() < Duration::from_secs(10));

        let artifact = refresh.slot().current().unwrap();
        assert_eq!(artifact.attribute.as_str(), "height");
        assert_eq!(artifact.histogram.samples, 3);
        assert_eq!(artifact.histogram.min, Some(1.0));
        assert_eq!(artifact.histogram.max, Some(3.0));
    }
}
