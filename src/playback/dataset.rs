use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, SonifyError};

// What the JSON record looks like on disk, before validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub sample_rate: i64,
    pub samples: Vec<f32>,
}

/// A recorded trace, validated once and never mutated afterwards.
/// Selecting another rhythm swaps the whole thing out.
#[derive(Clone, Debug)]
pub struct WaveformDataset {
    id: String,
    name: String,
    description: String,
    sample_rate: u32,
    samples: Vec<f32>,
}

impl TryFrom<DatasetRecord> for WaveformDataset {
    type Error = SonifyError;

    fn try_from(raw: DatasetRecord) -> Result<Self> {
        let sample_rate = u32::try_from(raw.sample_rate).unwrap_or(0);
        Self::new(raw.id, raw.name, raw.description, sample_rate, raw.samples)
    }
}

impl WaveformDataset {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        sample_rate: u32,
        samples: Vec<f32>,
    ) -> Result<Self> {
        let id = id.into();
        if sample_rate == 0 {
            return Err(SonifyError::DatasetInvalid {
                id,
                reason: "sample rate must be positive".into(),
            });
        }
        if samples.is_empty() {
            return Err(SonifyError::DatasetInvalid {
                id,
                reason: "no samples".into(),
            });
        }
        Ok(Self {
            id,
            name: name.into(),
            description: description.into(),
            sample_rate,
            samples,
        })
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn description(&self) -> &str { &self.description }
    pub fn sample_rate(&self) -> u32 { self.sample_rate }
    pub fn samples(&self) -> &[f32] { &self.samples }

    // never zero, the constructor guarantees it
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn sample(&self, index: usize) -> f32 {
        self.samples[index % self.samples.len()]
    }

    /// One tick per recorded sample: 1000 / sample_rate milliseconds.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.sample_rate as u64)
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_samples() {
        let err = WaveformDataset::new("x", "X", "", 250, vec![]).unwrap_err();
        assert!(matches!(err, SonifyError::DatasetInvalid { .. }));
    }

    #[test]
    fn rejects_zero_rate() {
        let err = WaveformDataset::new("x", "X", "", 0, vec![0.0]).unwrap_err();
        assert!(matches!(err, SonifyError::DatasetInvalid { .. }));
    }

    fn parse(json: &str) -> Result<WaveformDataset> {
        let record: DatasetRecord = serde_json::from_str(json)?;
        WaveformDataset::try_from(record)
    }

    #[test]
    fn deserializes_camel_case_record() {
        let json = r#"{"id":"afib","name":"Atrial Fibrillation","description":"irregular",
                      "sampleRate":4,"samples":[0,1,-1,0]}"#;
        let ds = parse(json).unwrap();
        assert_eq!(ds.id(), "afib");
        assert_eq!(ds.sample_rate(), 4);
        assert_eq!(ds.len(), 4);
        assert_eq!(ds.tick_interval(), Duration::from_millis(250));
        assert_eq!(ds.duration_secs(), 1.0);
    }

    #[test]
    fn negative_rate_in_json_is_invalid() {
        let json = r#"{"id":"bad","sampleRate":-5,"samples":[0.0]}"#;
        let err = parse(json).unwrap_err();
        assert!(matches!(err, SonifyError::DatasetInvalid { .. }));
        assert!(err.to_string().contains("sample rate"));
    }
}
