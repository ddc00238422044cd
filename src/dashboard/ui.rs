use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::app::App;
use super::widgets::{histogram_chart::draw_histogram_chart, summary_bar::draw_summary_bar};
use crate::render::HistogramArtifact;
use crate::slot::DisplaySlot;

pub fn draw(f: &mut Frame, app: &App, slot: &DisplaySlot<HistogramArtifact>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3), // Header
                Constraint::Min(8),    // Histogram
                Constraint::Length(3), // Summary
                Constraint::Length(2), // Help
            ]
            .as_ref(),
        )
        .split(f.size());

    draw_header(f, chunks[0], app, slot.current());
    draw_histogram_chart(f, chunks[1], app, slot.current());
    draw_summary_bar(f, chunks[2], slot.current());
    draw_help(f, chunks[3]);
}

fn draw_header(f: &mut Frame, area: Rect, app: &App, artifact: Option<&HistogramArtifact>) {
    let last_update = artifact
        .map(|a| a.rendered_at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());

    let fixed = format!(
        "Attribute: {} | Source:  | Last Update: {} | Refresh: {}",
        app.attribute,
        last_update,
        app.interval_label()
    );
    let room = (area.width as usize).saturating_sub(fixed.width() + 4);

    let header_text = vec![
        Span::raw("Attribute: "),
        Span::styled(
            app.attribute.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Source: "),
        Span::raw(truncate_to_width(&app.source, room)),
        Span::raw(" | Last Update: "),
        Span::raw(last_update),
        Span::raw(format!(" | Refresh: {}", app.interval_label())),
    ];

    let header = Paragraph::new(Line::from(header_text))
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .title(" Live Dashboard ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );

    f.render_widget(header, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help_text = vec![
        Span::raw("["),
        Span::styled("q", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw("]uit ["),
        Span::styled("Esc", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw("] stop"),
    ];

    let help = Paragraph::new(Line::from(help_text))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::TOP))
        .alignment(Alignment::Center);

    f.render_widget(help, area);
}

/// Shorten `s` to at most `max` display columns, ending with an ellipsis
/// when cut.
pub fn truncate_to_width(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}
