use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{info, warn};

use crate::audio_api::{AudioCommand, AudioDevice};
use crate::error::{Result, SonifyError};

mod effect;
mod engine;
mod frame;
mod voice;

use engine::Engine;

// Pitch ramps arrive once per sample and are the only thing allowed to be
// lost: a fresh one follows within a tick. Everything else goes down a
// queue that never drops, so a pause always silences the synth.
const RAMP_QUEUE: usize = 1024;

pub struct CommandSender {
    control_tx: Sender<AudioCommand>,
    ramp_tx: Sender<AudioCommand>,
}

impl CommandSender {
    pub fn send(&self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RampTone { .. } => {
                let _ = self.ramp_tx.try_send(cmd);
            }
            // only fails once the stream is gone
            _ => {
                let _ = self.control_tx.send(cmd);
            }
        }
    }
}

// Audio-thread end of the command queues
pub struct CommandInbox {
    control_rx: Receiver<AudioCommand>,
    ramp_rx: Receiver<AudioCommand>,
}

impl CommandInbox {
    /// Apply every pending control command in order, then only the newest
    /// ramp. Older ramps would be overwritten within the same block anyway.
    pub fn drain_into(&self, engine: &mut Engine) {
        while let Ok(cmd) = self.control_rx.try_recv() {
            engine.handle_cmd(cmd);
        }
        if let Some(ramp) = self.ramp_rx.try_iter().last() {
            engine.handle_cmd(ramp);
        }
    }
}

pub fn command_queues() -> (CommandSender, CommandInbox) {
    let (control_tx, control_rx) = crossbeam_channel::unbounded();
    let (ramp_tx, ramp_rx) = crossbeam_channel::bounded(RAMP_QUEUE);
    (
        CommandSender { control_tx, ramp_tx },
        CommandInbox { control_rx, ramp_rx },
    )
}

pub struct AudioHandle {
    tx: CommandSender,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    pub fn send(&self, cmd: AudioCommand) {
        self.tx.send(cmd);
    }
}

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, inbox) = command_queues();

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate = config.sample_rate() as f32;
    let channels = config.channels() as usize;

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let output_stream =
                build_output_stream_f32(&device, &config.into(), inbox, sample_rate, channels)?;
            output_stream.play().context("failed to play output stream")?;
            info!(sample_rate, channels, "audio output started");
            Ok(AudioHandle {
                tx,
                _output_stream: output_stream,
            })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported for now)"),
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    inbox: CommandInbox,
    sample_rate: f32,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new(sample_rate);

    let err_fn = |err| warn!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            inbox.drain_into(&mut engine);
            engine.fill_interleaved(data, channels);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

/// The sound card, opened on first use. Mirrors the "first play unlocks
/// audio" handshake: nothing touches the device until `init`.
#[derive(Default)]
pub struct LazyAudio {
    handle: Option<AudioHandle>,
    // last gain asked for before the stream existed
    pending_gain: Option<f32>,
}

impl LazyAudio {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioDevice for LazyAudio {
    fn init(&mut self) -> Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }
        let handle = start_audio().map_err(|e| SonifyError::AudioInit(format!("{e:#}")))?;
        if let Some(db) = self.pending_gain.take() {
            handle.send(AudioCommand::SetGain { db });
        }
        self.handle = Some(handle);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.handle.is_some()
    }

    fn send(&mut self, cmd: AudioCommand) {
        match (&self.handle, cmd) {
            (Some(handle), cmd) => handle.send(cmd),
            (None, AudioCommand::SetGain { db }) => self.pending_gain = Some(db),
            // no stream yet, nothing to shape
            (None, _) => {}
        }
    }
}
