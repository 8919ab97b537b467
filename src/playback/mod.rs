// The real-time core: dataset, pitch mapping, envelope state machine and
// the clock that drives them.

mod clock;
mod dataset;
mod envelope;
mod mapper;

pub use clock::{PlaybackClock, PlaybackState, Tick};
pub use dataset::{DatasetRecord, WaveformDataset};
pub use envelope::{DEFAULT_VOLUME_DB, MAX_VOLUME_DB, MIN_VOLUME_DB};
pub use mapper::voltage_to_frequency;
