//! patch-adsr - play the envelope unit live from the terminal
//!
//! Run with: cargo run -- [linear|exponential|logarithmic] [--no-sustain]

mod app;
mod ui;

use std::sync::Mutex;

use app::App;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use patch_adsr::{dsp::EnvelopeParams, registry::UnitOptions};

const LOG_FILE: &str = "patch-adsr.log";

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_tracing()?;

    let mut options = UnitOptions::default();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--no-sustain" => options.sustain_on = Some(false),
            mode => options.mode = Some(mode.to_string()),
        }
    }
    let config = options.into_config()?;

    App::new(config)
        .params(EnvelopeParams::adsr(0.05, 0.3, 0.6, 0.8))
        .tone(220.0)
        .run()
}

/// Log to a file so the TUI owns the terminal.
fn init_tracing() -> EyreResult<()> {
    let file = std::fs::File::create(LOG_FILE)
        .wrap_err_with(|| format!("failed to create {LOG_FILE}"))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    Ok(())
}
