use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{BarChart, Block, Borders, Paragraph},
    Frame,
};

use crate::dashboard::app::App;
use crate::render::HistogramArtifact;

pub fn draw_histogram_chart(f: &mut Frame, area: Rect, app: &App, artifact: Option<&HistogramArtifact>) {
    let Some(artifact) = artifact else {
        let waiting = Paragraph::new("Waiting for data…")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(format!(" Distribution of {} ", app.attribute))
                    .borders(Borders::ALL),
            );
        f.render_widget(waiting, area);
        return;
    };

    let hist = &artifact.histogram;

    // Label each bar with its lower edge
    let labels: Vec<String> = hist.bins.iter().map(|b| format!("{:.1}", b.lower)).collect();
    let bar_data: Vec<(&str, u64)> = labels
        .iter()
        .zip(&hist.bins)
        .map(|(label, bin)| (label.as_str(), bin.count))
        .collect();

    let bar_gap = 1u16;
    let bar_width = bar_width(area.width.saturating_sub(2), bar_data.len(), bar_gap);

    let bar_chart = BarChart::default()
        .block(
            Block::default()
                .title(format!(
                    " Distribution of {} ({} samples) ",
                    artifact.attribute, hist.samples
                ))
                .borders(Borders::ALL),
        )
        .data(bar_data.as_slice())
        .max(hist.max_count().max(1))
        .bar_width(bar_width)
        .bar_gap(bar_gap)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(bar_chart, area);
}

/// Widest bars that still fit `bars` bars and their gaps in `inner_width`.
fn bar_width(inner_width: u16, bars: usize, gap: u16) -> u16 {
    if bars == 0 {
        return 1;
    }
    let bars = u16::try_from(bars).unwrap_or(u16::MAX);
    let gaps = gap.saturating_mul(bars.saturating_sub(1));
    (inner_width.saturating_sub(gaps) / bars).max(1)
}
