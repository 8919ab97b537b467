use std::time::Duration;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::loader::catalog::{self, RHYTHMS};
use crate::shared::{InputEvent, VOLUME_STEP_DB};
use super::mode::TuiState;

// poll for a key within `timeout`, resolve it into semantic events
pub fn poll_input(timeout: Duration, ts: &TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code, ts));
    }
    Ok(vec![])
}

pub fn handle_key(code: KeyCode, ts: &TuiState) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => vec![InputEvent::Quit],

        // one button for both, like the panel
        KeyCode::Char(' ') if ts.playing => vec![InputEvent::Pause],
        KeyCode::Char(' ') => vec![InputEvent::Play],
        KeyCode::Char('s') => vec![InputEvent::Stop],

        KeyCode::Char('+' | '=') => vec![InputEvent::AdjustVolume(VOLUME_STEP_DB)],
        KeyCode::Char('-' | '_') => vec![InputEvent::AdjustVolume(-VOLUME_STEP_DB)],

        KeyCode::Left => vec![InputEvent::SelectRhythm(catalog::cycle(&ts.rhythm_id, -1))],
        KeyCode::Right => vec![InputEvent::SelectRhythm(catalog::cycle(&ts.rhythm_id, 1))],
        KeyCode::Char(c @ '1'..='9') => {
            let idx = c as usize - '1' as usize;
            match RHYTHMS.get(idx) {
                Some(r) => vec![InputEvent::SelectRhythm(r.id)],
                None => vec![],
            }
        }

        _ => vec![],
    }
}
