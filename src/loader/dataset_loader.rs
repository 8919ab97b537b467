use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SonifyError};
use crate::playback::{DatasetRecord, WaveformDataset};

use super::catalog;
use super::synth_trace;

// Read one `{ id, name, description, sampleRate, samples }` record from disk
// and validate it
pub fn load_json(path: &Path) -> Result<WaveformDataset> {
    let data = std::fs::read_to_string(path)?;
    let record: DatasetRecord = serde_json::from_str(&data)?;
    WaveformDataset::try_from(record)
}

// Where rhythms come from: `<data_dir>/<id>.json` when present, otherwise
// the built-in trace for catalog rhythms
#[derive(Clone, Debug, Default)]
pub struct DatasetSource {
    data_dir: Option<PathBuf>,
}

impl DatasetSource {
    pub fn new(data_dir: Option<PathBuf>) -> Self {
        Self { data_dir }
    }

    fn file_for(&self, id: &str) -> Option<PathBuf> {
        let path = self.data_dir.as_ref()?.join(format!("{id}.json"));
        path.is_file().then_some(path)
    }

    pub fn load(&self, id: &str) -> Result<WaveformDataset> {
        if let Some(path) = self.file_for(id) {
            debug!(path = %path.display(), "loading rhythm from file");
            return load_json(&path);
        }
        let info = catalog::find(id).ok_or_else(|| SonifyError::UnknownRhythm(id.to_string()))?;
        debug!(id, "using built-in trace");
        synth_trace::synthesize(info)
    }
}
