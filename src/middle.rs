// The middle layer: owns the playback clock, the audio device and the
// dataset source, and turns UI events into transport commands. The TUI only
// ever sees the `DisplayState` this hands back.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::audio_api::AudioDevice;
use crate::loader::catalog;
use crate::loader::dataset_loader::DatasetSource;
use crate::playback::{PlaybackClock, Tick};
use crate::shared::{DisplayState, InputEvent};

pub struct Middle<A: AudioDevice> {
    audio: A,
    clock: PlaybackClock,
    source: DatasetSource,
    rhythm_id: String,
    last_tick: Option<Tick>,
    status: Option<String>,
}

impl<A: AudioDevice> Middle<A> {
    pub fn new(mut audio: A, source: DatasetSource, volume_db: f32) -> Self {
        let mut clock = PlaybackClock::new(volume_db);
        // the device remembers this until it's actually opened
        clock.set_volume(volume_db, &mut audio);
        Self {
            audio,
            clock,
            source,
            rhythm_id: String::new(),
            last_tick: None,
            status: None,
        }
    }

    #[cfg(test)]
    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Play => self.play(),
            InputEvent::Pause => self.pause(),
            InputEvent::Stop => self.stop(),
            InputEvent::AdjustVolume(delta) => {
                let db = self.clock.state().volume_db + delta;
                self.set_volume(db);
            }
            InputEvent::SelectRhythm(id) => self.select_rhythm(id),
            InputEvent::Quit => self.shutdown(),
        }
    }

    pub fn play(&mut self) {
        if self.clock.dataset().is_none() {
            self.status = Some(format!("nothing to play: '{}' is not loaded", self.rhythm_id));
            return;
        }
        match self.clock.start(&mut self.audio) {
            Ok(()) => self.status = None,
            Err(e) => {
                warn!("play failed: {e}");
                self.status = Some(e.to_string());
            }
        }
    }

    pub fn pause(&mut self) {
        self.clock.pause(&mut self.audio);
    }

    pub fn stop(&mut self) {
        self.clock.stop(&mut self.audio);
        self.last_tick = None;
    }

    pub fn set_volume(&mut self, db: f32) -> f32 {
        self.clock.set_volume(db, &mut self.audio)
    }

    /// Stops whatever is playing, then swaps in the new rhythm. If it fails
    /// to load, the engine is left with no dataset and play is disabled.
    pub fn select_rhythm(&mut self, id: &str) {
        self.stop();
        self.rhythm_id = id.to_string();
        match self.source.load(id) {
            Ok(ds) => {
                self.clock.load(Some(Arc::new(ds)), &mut self.audio);
                self.status = None;
            }
            Err(e) => {
                warn!(id, "could not load rhythm: {e}");
                self.clock.load(None, &mut self.audio);
                self.status = Some(e.to_string());
            }
        }
    }

    // called once per UI frame with the measured frame time
    pub fn tick(&mut self, elapsed: Duration) -> Option<Tick> {
        let tick = self.clock.advance(elapsed, &mut self.audio);
        if tick.is_some() {
            self.last_tick = tick;
        }
        tick
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            rhythm_id: self.rhythm_id.clone(),
            dataset: self.clock.dataset().cloned(),
            playback: self.clock.state(),
            last_tick: self.last_tick,
            audio_ready: self.audio.is_ready(),
            heart_rate: catalog::heart_rate_label(&self.rhythm_id),
            status: self.status.clone(),
        }
    }

    // releases the tone before the stream goes away
    pub fn shutdown(&mut self) {
        if self.clock.state().is_playing {
            info!("shutting down playback");
        }
        self.clock.stop(&mut self.audio);
    }
}

impl<A: AudioDevice> Drop for Middle<A> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
