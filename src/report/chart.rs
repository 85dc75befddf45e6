//! Line-chart PNGs for the workbook.
//!
//! We keep Plotters' minimal feature set (no font backend), so the images
//! carry the line, a light frame and the marked latest point; series names
//! are written as worksheet text next to each image instead of in-image
//! captions. 2000×800 px reads as 10×4 in at 200 dpi when placed in the
//! workbook.

use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::domain::{MasterTable, TimeSeries};
use crate::error::DashError;

pub const CHART_WIDTH: u32 = 2000;
pub const CHART_HEIGHT: u32 = 800;

/// Render one series as a PNG at `path`. The latest point is marked with a
/// filled circle.
pub fn render_series_png(path: &Path, series: &TimeSeries) -> Result<(), DashError> {
    let points = series.points();
    let Some(&(_, last_value)) = points.last() else {
        return Err(DashError::Export("cannot chart an empty series".to_string()));
    };

    let n = points.len();
    let lo = points.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let hi = points.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
    let pad = if hi > lo { (hi - lo) * 0.08 } else { lo.abs().max(1.0) * 0.1 };

    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(40)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), (lo - pad)..(hi + pad))
        .map_err(draw_err)?;

    chart
        .draw_series(LineSeries::new(
            points.iter().enumerate().map(|(i, (_, v))| (i as f64, *v)),
            BLUE.stroke_width(3),
        ))
        .map_err(draw_err)?;
    chart
        .draw_series(std::iter::once(Circle::new(
            ((n - 1) as f64, last_value),
            8,
            RED.filled(),
        )))
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}

/// Render one chart per non-empty master column into the temp directory.
/// Returns (series name, image path) pairs in column order.
pub fn render_chart_set(master: &MasterTable) -> Result<Vec<(String, PathBuf)>, DashError> {
    let mut charts = Vec::new();
    for column in master.columns() {
        let Some(series) = master.column_series(&column.name) else {
            continue;
        };
        if series.is_empty() {
            continue;
        }
        let path = std::env::temp_dir().join(format!(
            "costdash_chart_{}_{}.png",
            std::process::id(),
            column.name
        ));
        render_series_png(&path, &series)?;
        charts.push((column.name.clone(), path));
    }
    Ok(charts)
}

fn draw_err<E: std::fmt::Display>(e: E) -> DashError {
    DashError::Export(format!("chart rendering failed: {e}"))
}
