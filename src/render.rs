use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::RefreshError;
use crate::histogram::{Histogram, DEFAULT_BINS};
use crate::models::{AttributeSelection, Dataset};
use crate::slot::DisplaySlot;

/// Receives each fetched dataset and commits a rendering into the slot.
pub trait RenderSink {
    type Artifact;

    fn render(
        &mut self,
        dataset: Dataset,
        attribute: &AttributeSelection,
        slot: &mut DisplaySlot<Self::Artifact>,
    ) -> Result<(), RefreshError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramArtifact {
    pub attribute: AttributeSelection,
    pub histogram: Histogram,
    pub rows: usize,
    pub missing: usize,
    pub rendered_at: DateTime<Utc>,
}

impl HistogramArtifact {
    /// Build the histogram of `attribute` from `dataset`.
    pub fn build(
        dataset: &Dataset,
        attribute: &AttributeSelection,
        bins: usize,
    ) -> Result<Self, RefreshError> {
        let column = dataset
            .column(attribute.as_str())
            .ok_or_else(|| RefreshError::MissingAttribute {
                attribute: attribute.to_string(),
                available: dataset.column_names(),
            })?;

        Ok(Self {
            attribute: attribute.clone(),
            histogram: Histogram::from_values(column.numeric_values(), bins),
            rows: dataset.row_count(),
            missing: column.missing_count(),
            rendered_at: Utc::now(),
        })
    }
}

/// Renders into the slot only, without any output device.
#[derive(Debug, Clone)]
pub struct HistogramRenderer {
    bins: usize,
}

impl Default for HistogramRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_BINS)
    }
}

impl HistogramRenderer {
    pub fn new(bins: usize) -> Self {
        Self { bins }
    }
}

impl RenderSink for HistogramRenderer {
    type Artifact = HistogramArtifact;

    fn render(
        &mut self,
        dataset: Dataset,
        attribute: &AttributeSelection,
        slot: &mut DisplaySlot<HistogramArtifact>,
    ) -> Result<(), RefreshError> {
        let artifact = HistogramArtifact::build(&dataset, attribute, self.bins)?;
        slot.replace(artifact);
        Ok(())
    }
}
