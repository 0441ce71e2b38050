//! TUI module for patch-adsr
//!
//! Shows the envelope's live gain and lets the keyboard play the gate and
//! tweak the unit while it runs.

mod scope;
mod state;
mod status;

use std::{collections::VecDeque, time::Duration};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;

use patch_adsr::{
    dsp::{EnvelopeConfig, EnvelopeParams},
    graph::{EnvelopeHandle, GateHandle},
    registry::EnvParam,
};

pub use state::ScopeFrame;

use scope::render_scope;
use state::UnitView;
use status::render_status;

/// Seconds of gain history kept for the scope
const SCOPE_WINDOW: f64 = 4.0;

/// Step applied by the parameter nudge keys
const TIME_STEP: f32 = 0.05;
const LEVEL_STEP: f32 = 0.05;

/// UI application state
pub struct UiApp {
    /// What the UI believes the unit is configured with
    view: UnitView,
    gate_handle: GateHandle,
    env_handle: EnvelopeHandle,
    /// Ring buffer receiver for per-block gain frames
    scope_rx: Consumer<ScopeFrame>,
    /// Gain history, oldest first
    history: VecDeque<ScopeFrame>,
    /// Whether the app should quit
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        config: EnvelopeConfig,
        params: EnvelopeParams,
        sample_rate: f32,
        gate_handle: GateHandle,
        env_handle: EnvelopeHandle,
        scope_rx: Consumer<ScopeFrame>,
    ) -> Self {
        Self {
            view: UnitView::new(config, params, sample_rate),
            gate_handle,
            env_handle,
            scope_rx,
            history: VecDeque::new(),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_scope();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Pull new frames and trim history to the scope window
    fn poll_scope(&mut self) {
        while let Ok(frame) = self.scope_rx.pop() {
            self.history.push_back(frame);
        }

        if let Some(latest) = self.history.back().map(|f| f.time) {
            while self
                .history
                .front()
                .is_some_and(|f| f.time < latest - SCOPE_WINDOW)
            {
                self.history.pop_front();
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                self.view.gate_open = !self.view.gate_open;
                self.gate_handle.set(self.view.gate_open);
            }
            KeyCode::Char('c') => {
                self.view.config.curve = self.view.config.curve.next();
                self.env_handle.set_curve(self.view.config.curve);
            }
            KeyCode::Char('h') => {
                self.view.config.sustain_hold = !self.view.config.sustain_hold;
                self.env_handle.set_sustain_hold(self.view.config.sustain_hold);
            }
            KeyCode::Char('a') => self.nudge(EnvParam::Attack, -TIME_STEP),
            KeyCode::Char('A') => self.nudge(EnvParam::Attack, TIME_STEP),
            KeyCode::Char('d') => self.nudge(EnvParam::Decay, -TIME_STEP),
            KeyCode::Char('D') => self.nudge(EnvParam::Decay, TIME_STEP),
            KeyCode::Char('s') => self.nudge(EnvParam::Sustain, -LEVEL_STEP),
            KeyCode::Char('S') => self.nudge(EnvParam::Sustain, LEVEL_STEP),
            KeyCode::Char('r') => self.nudge(EnvParam::Release, -TIME_STEP),
            KeyCode::Char('R') => self.nudge(EnvParam::Release, TIME_STEP),
            _ => {}
        }
    }

    fn nudge(&mut self, param: EnvParam, delta: f32) {
        let value = self.view.nudge(param, delta);
        self.env_handle.set_param(param, value);
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Status
                Constraint::Min(8),    // Scope
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        render_status(frame, chunks[0], &self.view, self.history.back());
        render_scope(frame, chunks[1], &self.history, SCOPE_WINDOW);

        let help = Paragraph::new(
            " [Space] Gate  [C] Curve  [H] Hold  [a/A d/D s/S r/R] Adjust  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[2]);
    }
}
