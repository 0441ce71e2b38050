//! Status widget - stage, gain, gate and the unit's settings

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use patch_adsr::dsp::Stage;

use super::state::{ScopeFrame, UnitView};

fn stage_color(stage: Stage) -> Color {
    match stage {
        Stage::Attack => Color::Green,
        Stage::Decay => Color::Yellow,
        Stage::Sustain => Color::Cyan,
        Stage::Release => Color::Magenta,
    }
}

/// Render the status block
pub fn render_status(frame: &mut Frame, area: Rect, view: &UnitView, latest: Option<&ScopeFrame>) {
    let block = Block::default().title(" patch-adsr ").borders(Borders::ALL);

    let (stage, gain) = latest.map_or((Stage::Release, 0.0), |f| (f.stage, f.gain));
    let gate = if view.gate_open { "● open" } else { "○ closed" };

    let live = Line::from(vec![
        Span::styled(
            format!(" {:<8}", stage.name()),
            Style::default().fg(stage_color(stage)),
        ),
        Span::styled(format!("gain {:.3}  ", gain), Style::default().fg(Color::White)),
        Span::styled(
            format!("gate {}  ", gate),
            Style::default().fg(if view.gate_open {
                Color::Green
            } else {
                Color::DarkGray
            }),
        ),
        Span::styled(
            format!("{:.1}kHz", view.sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let p = &view.params;
    let settings = Line::from(vec![
        Span::styled(
            format!(
                " A {:.2}s  D {:.2}s  S {:.2}  R {:.2}s  ",
                p.attack, p.decay, p.sustain, p.release
            ),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!(
                "curve {}  hold {}",
                view.config.curve,
                if view.config.sustain_hold { "on" } else { "off" }
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(vec![live, settings]).block(block), area);
}
