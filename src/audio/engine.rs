use crate::audio_api::AudioCommand;

use super::effect::{Effect, Reverb};
use super::frame::StereoFrame;
use super::voice::{Adsr, ToneVoice};

const SCRATCH_FRAMES: usize = 1024; // preallocated so the callback never mallocs
const GAIN_SMOOTH_MS: f32 = 5.0;
const REVERB_DECAY_S: f32 = 2.0;
const REVERB_WET: f32 = 0.2;
const HEADROOM: f32 = 0.5;

pub fn db_to_linear(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

pub struct Engine {
    voice: ToneVoice,
    reverb: Reverb,
    gain: f32,
    gain_target: f32,
    gain_coeff: f32,
    scratch: Vec<StereoFrame>,
}

impl Engine {
    pub fn new(sample_rate: f32) -> Self {
        let smooth_samples = (GAIN_SMOOTH_MS / 1000.0 * sample_rate).max(1.0);
        Self {
            voice: ToneVoice::new(sample_rate, Adsr::default()),
            reverb: Reverb::new(sample_rate, REVERB_DECAY_S, REVERB_WET),
            gain: db_to_linear(-12.0),
            gain_target: db_to_linear(-12.0),
            gain_coeff: 1.0 - (-1.0 / smooth_samples).exp(),
            scratch: vec![StereoFrame::zero(); SCRATCH_FRAMES],
        }
    }

    #[cfg(test)]
    pub fn voice(&self) -> &ToneVoice {
        &self.voice
    }

    #[cfg(test)]
    pub fn gain_target(&self) -> f32 {
        self.gain_target
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::OpenTone { freq_hz } => self.voice.attack(freq_hz),
            AudioCommand::RampTone { freq_hz, ramp_ms } => self.voice.ramp_to(freq_hz, ramp_ms),
            AudioCommand::CloseTone => self.voice.release(),
            AudioCommand::SetGain { db } => self.gain_target = db_to_linear(db),
        }
    }

    pub fn render_block(&mut self, frames: &mut [StereoFrame]) {
        for frame in frames.iter_mut() {
            self.gain += (self.gain_target - self.gain) * self.gain_coeff;
            let s = self.voice.next_sample() * self.gain * HEADROOM;
            *frame = StereoFrame::mono(s);
        }
        self.reverb.process(frames);
    }

    // cpal hands us interleaved floats with however many channels the device
    // has; mono gets the left side, anything past stereo repeats it
    pub fn fill_interleaved(&mut self, data: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let mut scratch = std::mem::take(&mut self.scratch);
        for chunk in data.chunks_mut(channels * SCRATCH_FRAMES) {
            let n = chunk.len() / channels;
            let frames = &mut scratch[..n];
            self.render_block(frames);
            for (out, f) in chunk.chunks_mut(channels).zip(frames.iter()) {
                for (ch, sample) in out.iter_mut().enumerate() {
                    *sample = if ch % 2 == 0 { f.left } else { f.right };
                }
            }
        }
        self.scratch = scratch;
    }
}
