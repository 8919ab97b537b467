mod audio;
mod audio_api;
mod config;
mod error;
mod loader;
mod middle;
mod playback;
mod shared;
mod tui;

use std::fs::File;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::Context;
use crossterm::terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use audio::LazyAudio;
use config::Config;
use loader::dataset_loader::DatasetSource;
use middle::Middle;
use shared::InputEvent;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// Logs only go somewhere when asked: the terminal belongs to the UI
fn init_logging(config: &Config) -> anyhow::Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("cannot open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let config = Config::from_args();
    init_logging(&config)?;
    info!(?config, "starting");

    // nothing opens the sound card until the first play
    let source = DatasetSource::new(config.data_dir.clone());
    let mut middle = Middle::new(LazyAudio::new(), source, config.volume_db);
    middle.select_rhythm(&config.rhythm);

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope
    crossterm::execute!(std::io::stdout(), terminal::EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let mut tui_state = tui::mode::TuiState::default();
    let mut last_tick = Instant::now();
    let mut render_failing = false;

    loop {
        let ds = middle.display_state();
        tui_state.playing = ds.playback.is_playing;
        tui_state.rhythm_id = ds.rhythm_id.clone();

        // a lost picture must never stall the clock, so draw errors are
        // logged and the loop keeps going
        let mut scope_result = Ok(());
        let drawn = term.draw(|frame| {
            let area = frame.area();
            scope_result = tui::view::render(frame, area, &ds);
        });
        let render_result = drawn.map_err(anyhow::Error::from).and(scope_result.map_err(anyhow::Error::from));
        match render_result {
            Err(e) if !render_failing => {
                warn!("render failed, audio keeps going: {e:#}");
                render_failing = true;
            }
            Err(_) => {}
            Ok(()) if render_failing => {
                info!("render recovered");
                render_failing = false;
            }
            Ok(()) => {}
        }

        let events = tui::input::poll_input(config.frame_time, &tui_state)?;
        for event in events {
            if event == InputEvent::Quit {
                middle.shutdown();
                drop(term);
                drop(middle);
                return Ok(());
            }
            middle.handle_input(event);
        }

        let elapsed = last_tick.elapsed();
        last_tick = Instant::now();
        middle.tick(elapsed);
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(std::io::stdout(), terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
