use std::f32::consts::TAU;

// Envelope timings, "FAST" on the panel
#[derive(Clone, Copy, Debug)]
pub struct Adsr {
    pub attack_s: f32,
    pub decay_s: f32,
    pub sustain: f32,
    pub release_s: f32,
}

impl Default for Adsr {
    fn default() -> Self {
        Self {
            attack_s: 0.1,
            decay_s: 0.2,
            sustain: 1.0,
            release_s: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Off,
    Attack,
    Decay,
    Sustain,
    Release,
}

// A single sine oscillator with an ADSR on its amplitude and a linear glide
// on its pitch. Lives entirely on the audio thread.
#[derive(Clone, Debug)]
pub struct ToneVoice {
    sample_rate: f32,
    adsr: Adsr,
    stage: Stage,
    level: f32,
    release_step: f32,
    phase: f32,
    freq: f32,
    target_freq: f32,
    freq_step: f32,
    ramp_left: u32,
}

impl ToneVoice {
    pub fn new(sample_rate: f32, adsr: Adsr) -> Self {
        Self {
            sample_rate: sample_rate.max(1.0),
            adsr,
            stage: Stage::Off,
            level: 0.0,
            release_step: 0.0,
            phase: 0.0,
            freq: 0.0,
            target_freq: 0.0,
            freq_step: 0.0,
            ramp_left: 0,
        }
    }

    #[cfg(test)]
    pub fn stage(&self) -> Stage { self.stage }
    #[cfg(test)]
    pub fn level(&self) -> f32 { self.level }
    #[cfg(test)]
    pub fn freq(&self) -> f32 { self.freq }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.stage != Stage::Off
    }

    // attack starts from whatever level we're at so a quick re-open
    // after a release doesn't snap to zero
    pub fn attack(&mut self, freq: f32) {
        self.freq = freq;
        self.target_freq = freq;
        self.ramp_left = 0;
        self.stage = Stage::Attack;
    }

    pub fn ramp_to(&mut self, freq: f32, ramp_ms: f32) {
        let n = ((ramp_ms / 1000.0) * self.sample_rate).round().max(1.0) as u32;
        self.target_freq = freq;
        self.freq_step = (freq - self.freq) / n as f32;
        self.ramp_left = n;
    }

    pub fn release(&mut self) {
        if self.stage == Stage::Off || self.stage == Stage::Release {
            return;
        }
        let samples = (self.adsr.release_s * self.sample_rate).max(1.0);
        self.release_step = self.level / samples;
        self.stage = Stage::Release;
    }

    fn step_envelope(&mut self) {
        let sr = self.sample_rate;
        match self.stage {
            Stage::Off => self.level = 0.0,
            Stage::Attack => {
                self.level += 1.0 / (self.adsr.attack_s * sr).max(1.0);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = Stage::Decay;
                }
            }
            Stage::Decay => {
                let sustain = self.adsr.sustain;
                self.level -= (1.0 - sustain) / (self.adsr.decay_s * sr).max(1.0);
                if self.level <= sustain {
                    self.level = sustain;
                    self.stage = Stage::Sustain;
                }
            }
            Stage::Sustain => self.level = self.adsr.sustain,
            Stage::Release => {
                self.level -= self.release_step;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = Stage::Off;
                }
            }
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        if self.stage == Stage::Off {
            return 0.0;
        }
        if self.ramp_left > 0 {
            self.freq += self.freq_step;
            self.ramp_left -= 1;
            if self.ramp_left == 0 {
                self.freq = self.target_freq;
            }
        }
        self.step_envelope();

        let out = self.phase.sin() * self.level;
        self.phase += TAU * self.freq / self.sample_rate;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        out
    }
}
