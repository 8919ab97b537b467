use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Tabs};
use ratatui::Frame;

use crate::error::Result;
use crate::loader::catalog::{self, RHYTHMS};
use crate::playback::{voltage_to_frequency, MAX_VOLUME_DB, MIN_VOLUME_DB};
use crate::shared::DisplayState;

use super::scope;

const ACCENT: Color = Color::Rgb(168, 85, 247);
const LINE: Color = Color::Rgb(0, 255, 65);

// Everything but the scope always draws; a scope failure comes back as the
// error so the caller can log it
pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState) -> Result<()> {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title + rhythm tabs
            Constraint::Length(2), // name, description, heart rate
            Constraint::Min(8),    // scope + side panel
            Constraint::Length(3), // transport + volume
            Constraint::Length(1), // status / key help
        ])
        .split(area);

    draw_header(frame, sections[0], state);
    draw_meta(frame, sections[1], state);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
        .split(sections[2]);
    draw_side_panel(frame, body[1], state);
    draw_transport(frame, sections[3], state);
    draw_status(frame, sections[4], state);

    let ds = state.dataset.as_deref();
    scope::draw_scope(frame, body[0], ds, state.playback.current_index)
}

fn draw_header(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let titles: Vec<&str> = RHYTHMS.iter().map(|r| r.name).collect();
    let mut tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .title(Line::from(vec![
                    Span::styled(" BIO-RHYTHMS ", Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled("physiological sonification ", Style::default().fg(LINE)),
                ])),
        )
        .highlight_style(Style::default().fg(Color::Black).bg(LINE));
    if let Some(i) = catalog::index_of(&state.rhythm_id) {
        tabs = tabs.select(i);
    }
    frame.render_widget(tabs, area);
}

fn draw_meta(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(16)])
        .split(area);

    let (name, description) = match &state.dataset {
        Some(ds) => (ds.name().to_string(), ds.description().to_string()),
        None => ("Loading...".to_string(), String::new()),
    };
    let left = Paragraph::new(vec![
        Line::from(Span::styled(name, Style::default().fg(Color::White))),
        Line::from(Span::styled(description, Style::default().fg(Color::Gray))),
    ]);
    frame.render_widget(left, cols[0]);

    let right = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(state.heart_rate.clone(), Style::default().fg(LINE).add_modifier(Modifier::BOLD)),
            Span::raw(" BPM"),
        ]),
        Line::from(Span::styled("HR EST.", Style::default().fg(ACCENT))),
    ])
    .alignment(ratatui::layout::Alignment::Right);
    frame.render_widget(right, cols[1]);
}

fn row(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<10}"), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn draw_side_panel(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let heading = |s: &'static str| Line::from(Span::styled(s, Style::default().fg(ACCENT)));
    let pb = &state.playback;

    let mut lines = vec![heading("SIGNAL DATA")];
    match &state.dataset {
        Some(ds) => {
            // the tick carries exactly what went to the synth; before the
            // first one, read the sample under the playhead
            let (index, v, hz) = match state.last_tick {
                Some(t) => (t.index, t.voltage, t.freq_hz),
                None => {
                    let v = ds.sample(pb.current_index);
                    (pb.current_index, v, voltage_to_frequency(v))
                }
            };
            lines.push(row("RATE:", format!("{} Hz", ds.sample_rate())));
            lines.push(row("SAMPLES:", ds.len().to_string()));
            lines.push(row("DURATION:", format!("{:.1}s", ds.duration_secs())));
            lines.push(row("INDEX:", index.to_string()));
            lines.push(row("VOLTAGE:", format!("{v:+.2} mV")));
            lines.push(row("TONE:", format!("{hz:.0} Hz")));
        }
        None => lines.push(row("RATE:", "--".into())),
    }

    lines.push(Line::default());
    lines.push(heading("AUDIO ENGINE"));
    let (status, color) = if pb.is_playing {
        ("ACTIVE", LINE)
    } else {
        ("STANDBY", Color::Yellow)
    };
    lines.push(Line::from(vec![
        Span::styled(format!("{:<10}", "STATUS:"), Style::default().fg(Color::Gray)),
        Span::styled(status, Style::default().fg(color)),
    ]));
    lines.push(row("WAVE:", "SINE".into()));
    lines.push(row("ENV:", "FAST".into()));
    lines.push(row("OUTPUT:", if state.audio_ready { "OPEN" } else { "CLOSED" }.into()));

    let panel = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn draw_transport(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(18), Constraint::Min(10)])
        .split(area);

    let pb = &state.playback;
    let (label, color) = if pb.is_playing {
        ("▶ PLAYING", LINE)
    } else if pb.is_paused {
        ("❚❚ PAUSED", Color::Yellow)
    } else if state.can_play() {
        ("■ STOPPED", Color::Gray)
    } else {
        ("× NO DATA", Color::Red)
    };
    let transport = Paragraph::new(Span::styled(label, Style::default().fg(color)))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(transport, cols[0]);

    let span = (MAX_VOLUME_DB - MIN_VOLUME_DB) as f64;
    let ratio = ((pb.volume_db - MIN_VOLUME_DB) as f64 / span).clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" VOL "))
        .gauge_style(Style::default().fg(LINE).bg(Color::Black))
        .ratio(ratio)
        .label(format!("{:.0} dB", pb.volume_db));
    frame.render_widget(gauge, cols[1]);
}

fn draw_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let line = match &state.status {
        Some(msg) => Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Red))),
        None => Line::from(Span::styled(
            "space play/pause  s stop  +/- volume  ←/→ or 1-5 rhythm  q quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}
