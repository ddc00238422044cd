use ratatui::{backend::Backend, Terminal};

use super::app::App;
use super::ui;
use crate::error::RefreshError;
use crate::models::{AttributeSelection, Dataset};
use crate::render::{HistogramArtifact, RenderSink};
use crate::slot::DisplaySlot;

/// Installs each new histogram in the slot and redraws the whole frame from
/// it.
pub struct TerminalRenderer<B: Backend> {
    terminal: Terminal<B>,
    app: App,
}

impl<B: Backend> TerminalRenderer<B> {
    pub fn new(terminal: Terminal<B>, app: App) -> Self {
        Self { terminal, app }
    }

    /// Draw the frame before any data has arrived.
    pub fn draw_waiting(&mut self) -> Result<(), RefreshError> {
        let empty = DisplaySlot::new();
        let app = &self.app;
        self.terminal.draw(|f| ui::draw(f, app, &empty))?;
        Ok(())
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

impl<B: Backend> RenderSink for TerminalRenderer<B> {
    type Artifact = HistogramArtifact;

    fn render(
        &mut self,
        dataset: Dataset,
        attribute: &AttributeSelection,
        slot: &mut DisplaySlot<HistogramArtifact>,
    ) -> Result<(), RefreshError> {
        let artifact = HistogramArtifact::build(&dataset, attribute, self.app.bins)?;
        slot.replace(artifact);

        let app = &self.app;
        self.terminal.draw(|f| ui::draw(f, app, slot))?;
        Ok(())
    }
}
