//! Gain scope widget

use std::collections::VecDeque;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use super::state::ScopeFrame;

/// Render the last `window` seconds of envelope gain
pub fn render_scope(frame: &mut Frame, area: Rect, history: &VecDeque<ScopeFrame>, window: f64) {
    let block = Block::default().title(" Gain ").borders(Borders::ALL);

    let end = history.back().map_or(window, |f| f.time.max(window));
    let start = end - window;

    let data: Vec<(f64, f64)> = history
        .iter()
        .map(|f| (f.time, f.gain as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([start, end])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .labels(["0", "0.5", "1"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
