use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::render::HistogramArtifact;

pub fn draw_summary_bar(f: &mut Frame, area: Rect, artifact: Option<&HistogramArtifact>) {
    let spans = match artifact {
        Some(artifact) => summary_spans(artifact),
        None => vec![Span::styled("No data yet", Style::default().fg(Color::DarkGray))],
    };

    let summary = Paragraph::new(Line::from(spans))
        .block(Block::default().title(" Summary ").borders(Borders::ALL))
        .alignment(Alignment::Center);

    f.render_widget(summary, area);
}

fn summary_spans(artifact: &HistogramArtifact) -> Vec<Span<'static>> {
    let hist = &artifact.histogram;
    let value_style = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);

    let mut spans = vec![
        Span::raw("Rows: "),
        Span::styled(artifact.rows.to_string(), value_style),
        Span::raw(" │ Samples: "),
        Span::styled(hist.samples.to_string(), value_style),
    ];

    if let (Some(min), Some(max), Some(mean)) = (hist.min, hist.max, hist.mean) {
        spans.push(Span::raw(" │ Min: "));
        spans.push(Span::styled(format!("{:.2}", min), value_style));
        spans.push(Span::raw(" │ Max: "));
        spans.push(Span::styled(format!("{:.2}", max), value_style));
        spans.push(Span::raw(" │ Mean: "));
        spans.push(Span::styled(format!("{:.2}", mean), value_style));
    }

    if artifact.missing > 0 {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("{} missing", artifact.missing),
            Style::default().fg(Color::Red),
        ));
    }

    spans
}
