use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use tracing::{info, warn};

use super::app::App;
use super::events::spawn_key_listener;
use super::renderer::TerminalRenderer;
use crate::config::Settings;
use crate::refresh::{RefreshLoop, RunSummary};
use crate::source::{AnySource, CachedSource, DataSource};

pub async fn run_dashboard(settings: Settings) -> Result<()> {
    let source = AnySource::open(&settings.source).context("Failed to open data source")?;

    if settings.cache_ttl > settings.interval {
        warn!(
            cache_ttl_ms = settings.cache_ttl.as_millis() as u64,
            interval_ms = settings.interval.as_millis() as u64,
            "Cache ttl is longer than the refresh interval; some redraws will reuse stale data"
        );
    }
    let source = CachedSource::new(source, settings.cache_ttl);

    let app = App::new(
        source.describe(),
        settings.attribute.clone(),
        settings.interval,
        settings.bins,
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;

    let res = run_loop(terminal, app, source, &settings).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)?;

    let summary = res?;
    info!(
        cycles = summary.cycles,
        renders = summary.renders,
        "Dashboard closed"
    );
    Ok(())
}

async fn run_loop<B: Backend, S: DataSource>(
    terminal: Terminal<B>,
    app: App,
    source: S,
    settings: &Settings,
) -> Result<RunSummary> {
    let mut renderer = TerminalRenderer::new(terminal, app);
    renderer.draw_waiting()?;

    let mut refresh = RefreshLoop::configure(
        settings.interval,
        settings.attribute.clone(),
        source,
        renderer,
    )?;

    let listener = spawn_key_listener(refresh.stop_handle());
    let res = refresh.run().await;

    // Release the key listener whether the loop stopped or failed
    refresh.stop();
    listener
        .await
        .context("Key listener panicked")?
        .context("Failed to read terminal events")?;

    Ok(res?)
}
