//! Oscilloscope: grid, the whole trace, and a playhead at the current sample.
//!
//! Geometry is worked out on a fixed 800 x 256 surface and handed to a
//! Ratatui canvas with those bounds, so the terminal size only changes the
//! resolution, never the shape. Volts map to height with a fixed factor
//! instead of the trace's own min/max, so a tall R wave on one rhythm
//! looks tall next to another.

use ratatui::{
    Frame,
    prelude::*,
    style::Color,
    symbols::Marker,
    widgets::{
        Block, Borders,
        canvas::{Canvas, Line as CanvasLine},
    },
};

use crate::error::{Result, SonifyError};
use crate::playback::WaveformDataset;

pub const SURFACE_WIDTH: f64 = 800.0;
pub const SURFACE_HEIGHT: f64 = 256.0;
pub const GRID_SPACING: f64 = 50.0;
/// Surface units per volt
pub const VOLT_SCALE: f64 = SURFACE_HEIGHT / 3.0;

const GRID_COLOR: Color = Color::Rgb(40, 40, 40);
const TRACE_COLOR: Color = Color::Rgb(0, 255, 65);
const PLAYHEAD_COLOR: Color = Color::Red;

// smallest area (borders included) that still shows a trace
const MIN_WIDTH: u16 = 8;
const MIN_HEIGHT: u16 = 4;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScopeGeometry {
    pub grid_x: Vec<f64>,
    pub grid_y: Vec<f64>,
    pub trace: Vec<(f64, f64)>,
    pub playhead_x: Option<f64>,
}

fn grid_lines(extent: f64) -> Vec<f64> {
    (0..)
        .map(|i| i as f64 * GRID_SPACING)
        .take_while(|&v| v < extent)
        .collect()
}

/// Everything the scope draws, as a function of the dataset and the
/// current index alone. No dataset gives just the grid.
pub fn scope_geometry(dataset: Option<&WaveformDataset>, current_index: usize) -> ScopeGeometry {
    let mut geo = ScopeGeometry {
        grid_x: grid_lines(SURFACE_WIDTH),
        grid_y: grid_lines(SURFACE_HEIGHT),
        ..Default::default()
    };
    let Some(ds) = dataset else {
        return geo;
    };

    let step = SURFACE_WIDTH / ds.len() as f64;
    let center = SURFACE_HEIGHT / 2.0;
    // canvas y grows upwards, so no flip
    geo.trace = ds
        .samples()
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64 * step, center + v as f64 * VOLT_SCALE))
        .collect();
    geo.playhead_x = Some((current_index % ds.len()) as f64 * step);
    geo
}

pub fn draw_scope(
    f: &mut Frame,
    area: Rect,
    dataset: Option<&WaveformDataset>,
    current_index: usize,
) -> Result<()> {
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        return Err(SonifyError::RenderSurfaceUnavailable(format!(
            "scope area {}x{} is too small",
            area.width, area.height
        )));
    }

    let geo = scope_geometry(dataset, current_index);
    let has_signal = dataset.is_some();

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(" LEAD II "))
        .marker(Marker::Braille)
        .x_bounds([0.0, SURFACE_WIDTH])
        .y_bounds([0.0, SURFACE_HEIGHT])
        .paint(|ctx| {
            for &x in &geo.grid_x {
                ctx.draw(&CanvasLine { x1: x, y1: 0.0, x2: x, y2: SURFACE_HEIGHT, color: GRID_COLOR });
            }
            for &y in &geo.grid_y {
                ctx.draw(&CanvasLine { x1: 0.0, y1: y, x2: SURFACE_WIDTH, y2: y, color: GRID_COLOR });
            }
            ctx.layer();

            for pair in geo.trace.windows(2) {
                let ((x1, y1), (x2, y2)) = (pair[0], pair[1]);
                ctx.draw(&CanvasLine { x1, y1, x2, y2, color: TRACE_COLOR });
            }
            if let Some(x) = geo.playhead_x {
                ctx.layer();
                ctx.draw(&CanvasLine { x1: x, y1: 0.0, x2: x, y2: SURFACE_HEIGHT, color: PLAYHEAD_COLOR });
            }

            if !has_signal {
                ctx.print(
                    SURFACE_WIDTH / 2.0 - 40.0,
                    SURFACE_HEIGHT / 2.0,
                    Line::styled("NO SIGNAL", Style::default().fg(Color::DarkGray)),
                );
            }
        });

    f.render_widget(canvas, area);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ds(samples: Vec<f32>) -> WaveformDataset {
        WaveformDataset::new("t", "T", "", 250, samples).unwrap()
    }

    #[test]
    fn placeholder_without_dataset() {
        let geo = scope_geometry(None, 0);
        assert!(geo.trace.is_empty());
        assert!(geo.playhead_x.is_none());
        assert_eq!(geo.grid_x.len(), 16);
        assert_eq!(geo.grid_y.len(), 6);
    }

    #[test]
    fn trace_spans_width_and_playhead_follows_index() {
        let data = ds(vec![0.0; 400]);
        let geo = scope_geometry(Some(&data), 100);
        assert_eq!(geo.trace.len(), 400);
        assert_relative_eq!(geo.trace[1].0, 2.0);
        assert_relative_eq!(geo.playhead_x.unwrap(), 200.0);
        assert!(geo.trace.iter().all(|&(_, y)| y == SURFACE_HEIGHT / 2.0));
    }

    #[test]
    fn vertical_scale_is_fixed_not_fitted() {
        let small = ds(vec![0.0, 0.1]);
        let big = ds(vec![0.0, 1.0]);
        let gs = scope_geometry(Some(&small), 0);
        let gb = scope_geometry(Some(&big), 0);
        let center = SURFACE_HEIGHT / 2.0;
        assert_relative_eq!(gs.trace[1].1 - center, 0.1 * VOLT_SCALE, epsilon = 1e-4);
        assert_relative_eq!(gb.trace[1].1 - center, VOLT_SCALE);
    }

    #[test]
    fn same_inputs_same_picture() {
        let data = ds(vec![0.3, -0.2, 1.1, 0.0]);
        assert_eq!(scope_geometry(Some(&data), 2), scope_geometry(Some(&data), 2));
    }
}
