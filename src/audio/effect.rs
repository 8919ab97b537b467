use super::frame::StereoFrame;

pub trait Effect: Send {
    fn process(&mut self, buf: &mut [StereoFrame]);
}

// Schroeder-style room: parallel feedback combs into two allpasses. Just
// enough tail to take the edge off a bare sine.
const COMB_MS: [f32; 4] = [29.7, 37.1, 41.1, 43.7];
const ALLPASS_MS: [f32; 2] = [5.0, 1.7];
const ALLPASS_GAIN: f32 = 0.7;

struct DelayLine {
    buf: Vec<f32>,
    pos: usize,
}

impl DelayLine {
    fn new(ms: f32, sample_rate: f32) -> Self {
        let len = ((ms / 1000.0) * sample_rate).round().max(1.0) as usize;
        Self { buf: vec![0.0; len], pos: 0 }
    }

    #[inline]
    fn read(&self) -> f32 {
        self.buf[self.pos]
    }

    #[inline]
    fn write_advance(&mut self, x: f32) {
        self.buf[self.pos] = x;
        self.pos = (self.pos + 1) % self.buf.len();
    }
}

pub struct Reverb {
    combs: Vec<(DelayLine, f32)>, // (line, feedback)
    allpasses: Vec<DelayLine>,
    wet: f32,
}

impl Reverb {
    // `decay_s` is the time for the tail to drop 60 dB
    pub fn new(sample_rate: f32, decay_s: f32, wet: f32) -> Self {
        let decay_s = decay_s.max(0.01);
        let combs = COMB_MS
            .iter()
            .map(|&ms| {
                let feedback = 10f32.powf(-3.0 * (ms / 1000.0) / decay_s);
                (DelayLine::new(ms, sample_rate), feedback)
            })
            .collect();
        let allpasses = ALLPASS_MS
            .iter()
            .map(|&ms| DelayLine::new(ms, sample_rate))
            .collect();
        Self {
            combs,
            allpasses,
            wet: wet.clamp(0.0, 1.0),
        }
    }
}

impl Effect for Reverb {
    fn process(&mut self, buf: &mut [StereoFrame]) {
        let scale = 1.0 / self.combs.len() as f32;
        for f in buf.iter_mut() {
            let input = 0.5 * (f.left + f.right);

            let mut acc = 0.0;
            for (line, feedback) in self.combs.iter_mut() {
                let y = line.read();
                line.write_advance(input + y * *feedback);
                acc += y;
            }
            let mut y = acc * scale;

            for ap in self.allpasses.iter_mut() {
                let delayed = ap.read();
                let v = y + delayed * ALLPASS_GAIN;
                ap.write_advance(v);
                y = delayed - v * ALLPASS_GAIN;
            }

            f.left += y * self.wet;
            f.right += y * self.wet;
        }
    }
}
