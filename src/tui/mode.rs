use crate::loader::catalog::DEFAULT_RHYTHM;

// state local to tui, just enough to resolve keys into semantic events;
// synced from DisplayState every loop
#[derive(Clone, Debug)]
pub struct TuiState {
    pub playing: bool,
    pub rhythm_id: String,
}

impl Default for TuiState {
    fn default() -> Self {
        Self {
            playing: false,
            rhythm_id: DEFAULT_RHYTHM.to_string(),
        }
    }
}
