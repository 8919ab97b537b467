// The rhythms the selector offers, in menu order. The heart rate shown next
// to the trace is a fixed label per rhythm, not measured from the samples.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RhythmInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub bpm: u32,
}

pub const DEFAULT_RHYTHM: &str = "sinus_normal";

pub const RHYTHMS: [RhythmInfo; 5] = [
    RhythmInfo {
        id: "sinus_normal",
        name: "Normal Sinus Rhythm",
        description: "Regular P-QRS-T complexes at a resting rate",
        bpm: 72,
    },
    RhythmInfo {
        id: "afib",
        name: "Atrial Fibrillation",
        description: "Irregularly irregular QRS, no P waves, fibrillatory baseline",
        bpm: 110,
    },
    RhythmInfo {
        id: "bradycardia",
        name: "Sinus Bradycardia",
        description: "Normal morphology below 60 beats per minute",
        bpm: 48,
    },
    RhythmInfo {
        id: "tachycardia",
        name: "Sinus Tachycardia",
        description: "Normal morphology above 100 beats per minute",
        bpm: 135,
    },
    RhythmInfo {
        id: "flutter",
        name: "Atrial Flutter",
        description: "Sawtooth flutter waves with 2:1 conduction",
        bpm: 150,
    },
];

pub fn find(id: &str) -> Option<&'static RhythmInfo> {
    RHYTHMS.iter().find(|r| r.id == id)
}

pub fn index_of(id: &str) -> Option<usize> {
    RHYTHMS.iter().position(|r| r.id == id)
}

// wraps in both directions
pub fn cycle(id: &str, step: isize) -> &'static str {
    let n = RHYTHMS.len() as isize;
    let cur = index_of(id).unwrap_or(0) as isize;
    RHYTHMS[(cur + step).rem_euclid(n) as usize].id
}

pub fn heart_rate_label(id: &str) -> String {
    match find(id) {
        Some(r) => r.bpm.to_string(),
        None => "--".to_string(),
    }
}
