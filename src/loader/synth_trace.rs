// Built-in traces for when no recorded file is around. Each beat is a sum of
// gaussian bumps (P, Q, R, S, T); the rhythm decides beat spacing, whether
// there's a P wave, and what the baseline does between beats.

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::playback::WaveformDataset;

use super::catalog::RhythmInfo;

pub const SAMPLE_RATE: u32 = 250;
pub const NUM_SAMPLES: usize = 1000; // four seconds

// (offset from beat onset in seconds, amplitude in mV, width in seconds)
const P_WAVE: (f32, f32, f32) = (0.00, 0.15, 0.025);
const QRS_T: [(f32, f32, f32); 4] = [
    (0.16, -0.10, 0.010), // Q
    (0.18, 1.20, 0.012),  // R
    (0.20, -0.25, 0.010), // S
    (0.42, 0.30, 0.045),  // T
];

#[derive(Clone, Copy)]
enum Baseline {
    Flat,
    Fibrillation,
    Flutter,
}

struct BeatPlan {
    onsets: Vec<f32>,
    p_waves: bool,
    baseline: Baseline,
}

fn gaussian(t: f32, center: f32, amp: f32, width: f32) -> f32 {
    let d = (t - center) / width;
    amp * (-0.5 * d * d).exp()
}

fn plan(info: &RhythmInfo, duration: f32) -> BeatPlan {
    let rr = 60.0 / info.bpm.max(1) as f32;
    let mut onsets = vec![];
    match info.id {
        "afib" => {
            // fixed seed so the "random" trace is the same every run
            let mut rng = StdRng::seed_from_u64(0xA71B);
            let mut t = 0.05;
            while t < duration {
                onsets.push(t);
                t += rr * rng.gen_range(0.6..1.4);
            }
            BeatPlan { onsets, p_waves: false, baseline: Baseline::Fibrillation }
        }
        "flutter" => {
            let mut t = 0.05;
            while t < duration {
                onsets.push(t);
                t += rr;
            }
            BeatPlan { onsets, p_waves: false, baseline: Baseline::Flutter }
        }
        _ => {
            let mut t = 0.05;
            while t < duration {
                onsets.push(t);
                t += rr;
            }
            BeatPlan { onsets, p_waves: true, baseline: Baseline::Flat }
        }
    }
}

fn baseline_at(baseline: Baseline, t: f32) -> f32 {
    match baseline {
        Baseline::Flat => 0.0,
        Baseline::Fibrillation => {
            0.04 * (TAU * 5.3 * t).sin() + 0.03 * (TAU * 7.1 * t + 1.3).sin()
                + 0.02 * (TAU * 9.7 * t + 0.4).sin()
        }
        // 300 per minute sawtooth, slow rise then a sharp drop
        Baseline::Flutter => {
            let phase = (t * 5.0).fract();
            0.15 * (0.5 - phase)
        }
    }
}

pub fn synthesize(info: &RhythmInfo) -> Result<WaveformDataset> {
    let duration = NUM_SAMPLES as f32 / SAMPLE_RATE as f32;
    let plan = plan(info, duration);

    let samples = (0..NUM_SAMPLES)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let mut v = baseline_at(plan.baseline, t);
            for &onset in &plan.onsets {
                let local = t - onset;
                if !(-0.2..=0.8).contains(&local) {
                    continue;
                }
                if plan.p_waves {
                    v += gaussian(local, P_WAVE.0, P_WAVE.1, P_WAVE.2);
                }
                for &(center, amp, width) in &QRS_T {
                    v += gaussian(local, center, amp, width);
                }
            }
            v
        })
        .collect();

    WaveformDataset::new(info.id, info.name, info.description, SAMPLE_RATE, samples)
}
