//! App - audio stream setup and the realtime render callback

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use rtrb::RingBuffer;

use patch_adsr::{
    dsp::{EnvelopeConfig, EnvelopeParams},
    graph::{EnvNode, GateNode, GraphNode},
    runtime::Transport,
    RENDER_QUANTUM,
};

use super::ui::{ScopeFrame, UiApp};

/// Scope frames buffered between the audio and UI threads
const SCOPE_QUEUE_SIZE: usize = 4096;

/// Output level of the test tone before the envelope
const TONE_LEVEL: f32 = 0.3;

/// Application builder
pub struct App {
    config: EnvelopeConfig,
    params: EnvelopeParams,
    tone_hz: f32,
}

impl App {
    pub fn new(config: EnvelopeConfig) -> Self {
        Self {
            config,
            params: EnvelopeParams::default(),
            tone_hz: 220.0,
        }
    }

    pub fn params(mut self, params: EnvelopeParams) -> Self {
        self.params = params;
        self
    }

    /// Frequency of the sine tone shaped by the envelope
    pub fn tone(mut self, hz: f32) -> Self {
        self.tone_hz = hz;
        self
    }

    /// Open the audio device and run the UI until the user quits
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        tracing::info!(sample_rate, channels, "opened output device");

        // Gate source -> envelope, both controlled from the UI thread
        let (gate, gate_handle) = GateNode::closed().into_shared();
        let (mut env, env_handle) = EnvNode::new(gate, self.config)
            .with_params(self.params)
            .into_shared();
        let (mut scope_tx, scope_rx) = RingBuffer::<ScopeFrame>::new(SCOPE_QUEUE_SIZE);

        let mut transport = Transport::new(sample_rate, RENDER_QUANTUM)?;
        let mut gain_buf = [0.0f32; RENDER_QUANTUM];
        let phase_step = self.tone_hz / sample_rate;
        let mut phase = 0.0f32;

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(RENDER_QUANTUM);
                    let gains = &mut gain_buf[..frames_to_render];

                    let ctx = transport.ctx();
                    env.render_block(gains, &ctx);
                    transport.advance(frames_to_render);

                    // UI can fall behind; drop frames rather than block
                    let _ = scope_tx.push(ScopeFrame {
                        time: ctx.time,
                        gain: gains[0],
                        stage: env.stage(),
                    });

                    // Tone through the envelope, mono to all channels
                    let out_off = frames_written * channels;
                    for (i, &gain) in gains.iter().enumerate() {
                        let sample = (phase * std::f32::consts::TAU).sin() * gain * TONE_LEVEL;
                        phase = (phase + phase_step).fract();

                        let frame = &mut data[out_off + i * channels..out_off + (i + 1) * channels];
                        frame.fill(sample);
                    }

                    frames_written += frames_to_render;
                }
            },
            |err| tracing::error!(%err, "audio stream error"),
            None,
        )?;

        stream.play()?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(
            self.config,
            self.params,
            sample_rate,
            gate_handle,
            env_handle,
            scope_rx,
        )
        .run(&mut terminal);
        ratatui::restore();

        result
    }
}
