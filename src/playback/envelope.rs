//! Open/ramp/close state machine sitting in front of the audio device.
//!
//! The synth underneath can't take a second attack before the previous one
//! has resolved, so the only way into `Sounding` is an explicit `start`.
//! Pitch changes while sounding are always glides.

use tracing::debug;

use super::mapper::voltage_to_frequency;
use crate::audio_api::AudioDevice;

pub const TONE_RAMP_MS: f32 = 10.0;
pub const MIN_VOLUME_DB: f32 = -60.0;
pub const MAX_VOLUME_DB: f32 = 0.0;
pub const DEFAULT_VOLUME_DB: f32 = -12.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EnvelopeState {
    Idle,
    Sounding,
}

#[derive(Debug)]
pub struct EnvelopeController {
    state: EnvelopeState,
    volume_db: f32,
}

impl Default for EnvelopeController {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME_DB)
    }
}

impl EnvelopeController {
    pub fn new(volume_db: f32) -> Self {
        Self {
            state: EnvelopeState::Idle,
            volume_db: clamp_db(volume_db, DEFAULT_VOLUME_DB),
        }
    }

    #[cfg(test)]
    pub fn is_sounding(&self) -> bool {
        self.state == EnvelopeState::Sounding
    }

    pub fn volume_db(&self) -> f32 {
        self.volume_db
    }

    /// Idle -> Sounding. Always opens on the 0 V reference pitch, whatever
    /// sample happens to be current. No-op when already sounding.
    pub fn start(&mut self, dev: &mut impl AudioDevice) {
        if self.state == EnvelopeState::Sounding {
            return;
        }
        let freq = voltage_to_frequency(0.0);
        dev.open_tone(freq);
        self.state = EnvelopeState::Sounding;
        debug!(freq, "envelope opened");
    }

    /// Glide to `freq_hz`. Ignored while idle.
    pub fn update(&mut self, freq_hz: f32, dev: &mut impl AudioDevice) {
        if self.state == EnvelopeState::Sounding {
            dev.ramp_tone(freq_hz, TONE_RAMP_MS);
        }
    }

    /// Sounding -> Idle. No-op when already idle.
    pub fn stop(&mut self, dev: &mut impl AudioDevice) {
        if self.state == EnvelopeState::Idle {
            return;
        }
        dev.close_tone();
        self.state = EnvelopeState::Idle;
        debug!("envelope released");
    }

    /// Independent of open/closed; goes straight to the device.
    pub fn set_volume(&mut self, db: f32, dev: &mut impl AudioDevice) -> f32 {
        self.volume_db = clamp_db(db, self.volume_db);
        dev.set_gain(self.volume_db);
        self.volume_db
    }
}

fn clamp_db(db: f32, fallback: f32) -> f32 {
    if db.is_nan() {
        fallback
    } else {
        db.clamp(MIN_VOLUME_DB, MAX_VOLUME_DB)
    }
}
