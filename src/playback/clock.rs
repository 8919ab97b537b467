//! The playback clock: walks the sample buffer at the recording's own rate
//! and fans each sample out to the tone and the playhead.
//!
//! Time comes in from outside through a [`TickTimer`], so the clock never
//! looks at a wall clock itself. The UI loop feeds it measured frame times;
//! tests feed it exact durations.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::dataset::WaveformDataset;
use super::envelope::EnvelopeController;
use super::mapper::voltage_to_frequency;
use crate::audio_api::AudioDevice;
use crate::error::Result;

// How far behind a single `advance` will catch up, on top of the tick that's
// due. A longer stall is dropped rather than replayed in a burst, whatever
// the sample rate.
pub const MAX_CATCH_UP: Duration = Duration::from_millis(250);

/// Deadline-based scheduling, injected into the clock.
pub trait TickTimer {
    /// Start firing every `interval`, first deadline one interval from now.
    fn arm(&mut self, interval: Duration);

    /// Drop the pending deadline. Nothing fires until the next `arm`.
    fn cancel(&mut self);

    fn is_armed(&self) -> bool;

    /// Let `elapsed` pass and return how many deadlines it crossed.
    fn due(&mut self, elapsed: Duration) -> u32;
}

// Accumulates elapsed time and pays it out one interval at a time. Sample
// rates that don't divide a second evenly drift by a fraction of a tick,
// exact timing is the audio clock's job.
#[derive(Clone, Debug, Default)]
pub struct DeadlineTimer {
    interval: Option<Duration>,
    pending: Duration,
}

impl TickTimer for DeadlineTimer {
    fn arm(&mut self, interval: Duration) {
        self.interval = Some(interval.max(Duration::from_nanos(1)));
        self.pending = Duration::ZERO;
    }

    fn cancel(&mut self) {
        self.interval = None;
        self.pending = Duration::ZERO;
    }

    fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    fn due(&mut self, elapsed: Duration) -> u32 {
        let Some(interval) = self.interval else {
            return 0;
        };
        self.pending = (self.pending + elapsed).min(MAX_CATCH_UP + interval);
        let fired = (self.pending.as_nanos() / interval.as_nanos()) as u32;
        self.pending -= interval * fired;
        fired
    }
}

/// Snapshot of the transport, handed to the UI by value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    // halted mid-run, as opposed to stopped; the index alone can't tell
    // (a pause right after a wrap sits on 0)
    pub is_paused: bool,
    pub current_index: usize,
    pub volume_db: f32,
}

/// What one tick produced. Audio and playhead both come from this one value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    pub index: usize,
    pub voltage: f32,
    pub freq_hz: f32,
}

pub struct PlaybackClock<T: TickTimer = DeadlineTimer> {
    dataset: Option<Arc<WaveformDataset>>,
    state: PlaybackState,
    envelope: EnvelopeController,
    timer: T,
}

impl PlaybackClock<DeadlineTimer> {
    pub fn new(volume_db: f32) -> Self {
        Self::with_timer(DeadlineTimer::default(), volume_db)
    }
}

impl<T: TickTimer> PlaybackClock<T> {
    pub fn with_timer(timer: T, volume_db: f32) -> Self {
        let envelope = EnvelopeController::new(volume_db);
        Self {
            dataset: None,
            state: PlaybackState {
                is_playing: false,
                is_paused: false,
                current_index: 0,
                volume_db: envelope.volume_db(),
            },
            envelope,
            timer,
        }
    }

    pub fn dataset(&self) -> Option<&Arc<WaveformDataset>> {
        self.dataset.as_ref()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[cfg(test)]
    pub fn is_sounding(&self) -> bool {
        self.envelope.is_sounding()
    }

    // true while a next tick is pending
    #[cfg(test)]
    pub fn is_scheduled(&self) -> bool {
        self.timer.is_armed()
    }

    /// Swap the active dataset. Always stops first so the index can never
    /// point past the end of a shorter buffer.
    pub fn load(&mut self, dataset: Option<Arc<WaveformDataset>>, dev: &mut impl AudioDevice) {
        self.stop(dev);
        if let Some(ds) = &dataset {
            info!(id = ds.id(), rate = ds.sample_rate(), samples = ds.len(), "dataset loaded");
        }
        self.dataset = dataset;
    }

    /// Begin (or resume) ticking. Without a dataset this does nothing. An
    /// audio init failure is returned and leaves the clock stopped.
    pub fn start(&mut self, dev: &mut impl AudioDevice) -> Result<()> {
        let Some(ds) = self.dataset.as_ref() else {
            return Ok(());
        };
        if self.state.is_playing {
            return Ok(());
        }
        let interval = ds.tick_interval();
        dev.init()?;
        self.envelope.start(dev);
        self.state.is_playing = true;
        self.state.is_paused = false;
        self.timer.arm(interval);
        info!(index = self.state.current_index, ?interval, "playback started");
        Ok(())
    }

    /// Stop ticking and release the tone, keeping the position.
    pub fn pause(&mut self, dev: &mut impl AudioDevice) {
        self.timer.cancel();
        if self.state.is_playing {
            debug!(index = self.state.current_index, "playback paused");
            self.state.is_paused = true;
        }
        self.state.is_playing = false;
        self.envelope.stop(dev);
    }

    /// Pause and rewind to the first sample.
    pub fn stop(&mut self, dev: &mut impl AudioDevice) {
        self.pause(dev);
        self.state.is_paused = false;
        self.state.current_index = 0;
    }

    pub fn set_volume(&mut self, db: f32, dev: &mut impl AudioDevice) -> f32 {
        self.state.volume_db = self.envelope.set_volume(db, dev);
        self.state.volume_db
    }

    /// Let `elapsed` pass. Fires every tick that fell due, in order, and
    /// returns the last one so the caller can move the playhead.
    pub fn advance(&mut self, elapsed: Duration, dev: &mut impl AudioDevice) -> Option<Tick> {
        if !self.state.is_playing {
            return None;
        }
        let ds = self.dataset.clone()?;
        let due = self.timer.due(elapsed);
        let mut last = None;
        for _ in 0..due {
            last = Some(self.tick(&ds, dev));
        }
        last
    }

    fn tick(&mut self, ds: &WaveformDataset, dev: &mut impl AudioDevice) -> Tick {
        let index = (self.state.current_index + 1) % ds.len();
        let voltage = ds.sample(index);
        self.state.current_index = index;
        let freq_hz = voltage_to_frequency(voltage);
        self.envelope.update(freq_hz, dev);
        Tick { index, voltage, freq_hz }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_api::AudioCommand;
    use crate::audio_api::testing::RecordingDevice;
    use crate::error::SonifyError;

    const QUARTER: Duration = Duration::from_millis(250);

    fn scenario_a() -> Arc<WaveformDataset> {
        Arc::new(WaveformDataset::new("a", "A", "", 4, vec![0.0, 1.0, -1.0, 0.0]).unwrap())
    }

    fn loaded_clock(dev: &mut RecordingDevice) -> PlaybackClock {
        let mut clock = PlaybackClock::new(-12.0);
        clock.load(Some(scenario_a()), dev);
        clock
    }

    #[test]
    fn timer_pays_out_whole_intervals() {
        let mut t = DeadlineTimer::default();
        assert_eq!(t.due(Duration::from_secs(1)), 0);
        t.arm(QUARTER);
        assert_eq!(t.due(Duration::from_millis(100)), 0);
        assert_eq!(t.due(Duration::from_millis(160)), 1);
        assert_eq!(t.due(Duration::from_millis(500)), 2);
        t.cancel();
        assert_eq!(t.due(Duration::from_secs(5)), 0);
    }

    #[test]
    fn timer_caps_catch_up() {
        let mut t = DeadlineTimer::default();
        t.arm(Duration::from_millis(1));
        assert_eq!(t.due(Duration::from_secs(10)), 251);
        assert_eq!(t.due(Duration::ZERO), 0);
    }

    #[test]
    fn high_rate_keeps_native_speed() {
        let mut dev = RecordingDevice::default();
        let mut clock = PlaybackClock::new(-12.0);
        let ds = WaveformDataset::new("hi", "Hi", "", 20_000, vec![0.0; 4096]).unwrap();
        clock.load(Some(Arc::new(ds)), &mut dev);
        clock.start(&mut dev).unwrap();
        // one second of 60 fps frames
        for _ in 0..60 {
            clock.advance(Duration::from_micros(16_667), &mut dev);
        }
        let played = dev.ramp_freqs().len();
        assert!((19_990..=20_010).contains(&played), "played {played}");
    }

    #[test]
    fn scenario_a_index_and_pitch_sequence() {
        let mut dev = RecordingDevice::default();
        let mut clock = loaded_clock(&mut dev);
        clock.start(&mut dev).unwrap();

        let mut indices = vec![];
        for _ in 0..4 {
            let tick = clock.advance(QUARTER, &mut dev).unwrap();
            assert_eq!(tick.index, clock.state().current_index);
            indices.push(tick.index);
        }
        assert_eq!(indices, vec![1, 2, 3, 0]);
        assert_eq!(dev.ramp_freqs(), vec![300.0, 50.0, 100.0, 100.0]);
    }

    #[test]
    fn start_without_dataset_is_noop() {
        let mut dev = RecordingDevice::default();
        let mut clock = PlaybackClock::new(-12.0);
        clock.start(&mut dev).unwrap();
        assert!(!clock.state().is_playing);
        assert_eq!(dev.init_calls, 0);
        assert!(clock.advance(QUARTER, &mut dev).is_none());
    }

    #[test]
    fn nothing_ticks_before_start() {
        let mut dev = RecordingDevice::default();
        let mut clock = loaded_clock(&mut dev);
        assert!(clock.advance(Duration::from_secs(3), &mut dev).is_none());
        assert_eq!(clock.state().current_index, 0);
        assert!(dev.log.is_empty());
    }

    #[test]
    fn pause_freezes_and_stop_rewinds() {
        let mut dev = RecordingDevice::default();
        let mut clock = loaded_clock(&mut dev);
        clock.start(&mut dev).unwrap();
        clock.advance(QUARTER * 2, &mut dev);
        clock.pause(&mut dev);
        let paused = clock.state();
        assert_eq!(paused.current_index, 2);
        assert!(!paused.is_playing);
        assert!(paused.is_paused);
        assert!(!clock.is_scheduled());

        clock.pause(&mut dev);
        assert_eq!(clock.state(), paused);
        assert!(clock.advance(QUARTER * 4, &mut dev).is_none());
        assert_eq!(clock.state().current_index, 2);

        clock.stop(&mut dev);
        let stopped = clock.state();
        clock.stop(&mut dev);
        assert_eq!(clock.state(), stopped);
        assert_eq!(stopped.current_index, 0);
        assert!(!stopped.is_paused);
        assert_eq!(dev.releases(), 1);
    }

    #[test]
    fn pause_on_wrapped_index_is_still_paused() {
        let mut dev = RecordingDevice::default();
        let mut clock = loaded_clock(&mut dev);
        clock.start(&mut dev).unwrap();
        clock.advance(QUARTER * 4, &mut dev);
        clock.pause(&mut dev);
        let state = clock.state();
        assert_eq!(state.current_index, 0);
        assert!(state.is_paused);

        clock.start(&mut dev).unwrap();
        assert!(!clock.state().is_paused);
    }

    #[test]
    fn pause_while_stopped_stays_stopped() {
        let mut dev = RecordingDevice::default();
        let mut clock = loaded_clock(&mut dev);
        clock.pause(&mut dev);
        assert!(!clock.state().is_paused);
    }

    #[test]
    fn resume_after_pause_continues_from_same_sample() {
        let mut dev = RecordingDevice::default();
        let mut clock = loaded_clock(&mut dev);
        clock.start(&mut dev).unwrap();
        clock.advance(QUARTER, &mut dev);
        clock.pause(&mut dev);
        clock.start(&mut dev).unwrap();
        let tick = clock.advance(QUARTER, &mut dev).unwrap();
        assert_eq!(tick.index, 2);
        assert_eq!(dev.attacks(), 2);
    }

    #[test]
    fn stop_then_start_replays_fresh_sequence() {
        let run = |clock: &mut PlaybackClock, dev: &mut RecordingDevice| {
            dev.log.clear();
            clock.start(dev).unwrap();
            for _ in 0..6 {
                clock.advance(QUARTER, dev);
            }
            clock.stop(dev);
            dev.log.clone()
        };
        let mut dev = RecordingDevice::default();
        let mut clock = loaded_clock(&mut dev);
        let first = run(&mut clock, &mut dev);
        // a partial interval left over must not leak into the next run
        clock.start(&mut dev).unwrap();
        clock.advance(Duration::from_millis(200), &mut dev);
        clock.stop(&mut dev);
        let second = run(&mut clock, &mut dev);
        assert_eq!(first, second);
    }

    #[test]
    fn volume_set_while_stopped_precedes_first_tone() {
        let mut dev = RecordingDevice::default();
        let mut clock = loaded_clock(&mut dev);
        clock.set_volume(-30.0, &mut dev);
        clock.start(&mut dev).unwrap();
        assert_eq!(
            dev.log,
            vec![
                AudioCommand::SetGain { db: -30.0 },
                AudioCommand::OpenTone { freq_hz: 100.0 },
            ]
        );
        assert_eq!(clock.state().volume_db, -30.0);
    }

    #[test]
    fn one_attack_however_fast_it_ticks() {
        let mut dev = RecordingDevice::default();
        let mut clock = PlaybackClock::new(-12.0);
        let samples: Vec<f32> = (0..500).map(|i| (i as f32 * 0.1).sin()).collect();
        let ds = WaveformDataset::new("fast", "Fast", "", 10_000, samples).unwrap();
        clock.load(Some(Arc::new(ds)), &mut dev);
        clock.start(&mut dev).unwrap();
        for _ in 0..100 {
            clock.advance(Duration::from_millis(16), &mut dev);
        }
        clock.stop(&mut dev);
        assert_eq!(dev.attacks(), 1);
        assert_eq!(dev.releases(), 1);
        assert!(dev.ramp_freqs().len() > 1000);
    }

    #[test]
    fn single_sample_dataset_stays_on_zero() {
        let mut dev = RecordingDevice::default();
        let mut clock = PlaybackClock::new(-12.0);
        let ds = WaveformDataset::new("one", "One", "", 10, vec![0.5]).unwrap();
        clock.load(Some(Arc::new(ds)), &mut dev);
        clock.start(&mut dev).unwrap();
        for _ in 0..5 {
            let tick = clock.advance(Duration::from_millis(100), &mut dev).unwrap();
            assert_eq!(tick.index, 0);
            assert_eq!(tick.freq_hz, 200.0);
        }
    }

    #[test]
    fn index_stays_in_bounds() {
        let mut dev = RecordingDevice::default();
        let mut clock = loaded_clock(&mut dev);
        clock.start(&mut dev).unwrap();
        for step in [7u64, 250, 1, 999, 3, 500] {
            clock.advance(Duration::from_millis(step), &mut dev);
            assert!(clock.state().current_index < 4);
        }
    }

    #[test]
    fn loading_while_playing_stops_first() {
        let mut dev = RecordingDevice::default();
        let mut clock = loaded_clock(&mut dev);
        clock.start(&mut dev).unwrap();
        clock.advance(QUARTER * 3, &mut dev);
        assert_eq!(clock.state().current_index, 3);

        let short = WaveformDataset::new("b", "B", "", 4, vec![0.2, 0.4]).unwrap();
        clock.load(Some(Arc::new(short)), &mut dev);
        let state = clock.state();
        assert!(!state.is_playing);
        assert_eq!(state.current_index, 0);
        assert!(!clock.is_sounding());
        assert_eq!(dev.log.last(), Some(&AudioCommand::CloseTone));
    }

    #[test]
    fn failed_audio_init_stays_stopped_and_retries_on_next_start() {
        let mut dev = RecordingDevice::failing();
        let mut clock = loaded_clock(&mut dev);
        let err = clock.start(&mut dev).unwrap_err();
        assert!(matches!(err, SonifyError::AudioInit(_)));
        assert!(!clock.state().is_playing);
        assert!(dev.log.is_empty());
        assert!(clock.advance(QUARTER, &mut dev).is_none());

        dev.fail_init = false;
        clock.start(&mut dev).unwrap();
        assert!(clock.state().is_playing);
        assert_eq!(dev.init_calls, 2);
    }

    #[test]
    fn double_start_initializes_once() {
        let mut dev = RecordingDevice::default();
        let mut clock = loaded_clock(&mut dev);
        clock.start(&mut dev).unwrap();
        clock.start(&mut dev).unwrap();
        assert_eq!(dev.init_calls, 1);
        assert_eq!(dev.attacks(), 1);
    }
}
