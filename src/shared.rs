// Types that cross between the terminal layer and the middle layer.
//
// Keys (tui/input.rs resolves them into the semantic events below):
//   Space         //  Play / Pause, depending on what's going on
//   s             //  Stop (rewind to the first sample)
//   + / -         //  Volume up / down by VOLUME_STEP_DB
//   Left / Right  //  Previous / next rhythm
//   1 .. 5        //  Pick a rhythm directly
//   Esc / q       //  Quit
//
// The TUI never decides anything about playback. Each frame it asks the
// middle layer for a `DisplayState` and draws exactly that.

use std::sync::Arc;

use crate::playback::{PlaybackState, Tick, WaveformDataset};

pub const VOLUME_STEP_DB: f32 = 3.0;

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    Play,
    Pause,
    Stop,
    AdjustVolume(f32), // dB delta
    SelectRhythm(&'static str),
    Quit,
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub rhythm_id: String,
    pub dataset: Option<Arc<WaveformDataset>>, // None while loading failed
    pub playback: PlaybackState,
    pub last_tick: Option<Tick>, // what the tone is playing right now
    pub audio_ready: bool,
    pub heart_rate: String, // "72", or "--" when unknown
    pub status: Option<String>, // last error worth showing
}

impl DisplayState {
    pub fn can_play(&self) -> bool {
        self.dataset.is_some()
    }
}
