// Every failure here is local and recoverable by the user (retry play, pick
// another rhythm); none of them should take the process down.

#[derive(thiserror::Error, Debug)]
pub enum SonifyError {
    /// Empty sample buffer or zero sample rate
    #[error("invalid dataset '{id}': {reason}")]
    DatasetInvalid { id: String, reason: String },

    /// Audio output could not be opened or started
    #[error("audio init failed: {0}")]
    AudioInit(String),

    /// Drawing area is missing or too small to draw into
    #[error("render surface unavailable: {0}")]
    RenderSurfaceUnavailable(String),

    #[error("unknown rhythm '{0}'")]
    UnknownRhythm(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SonifyError>;
