//! Metric-group line charts
//!
//! One SVG per metric group. Every signal of the group is drawn against its
//! own timestamps; the y axis is labelled with the unit of the first signal.

use anyhow::{Context, Result};
use mf4_analyzer_core::MetricGroup;
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};

const CHART_SIZE: (u32, u32) = (1000, 300);

/// `<base>_<metric>.svg`, metric lowercased with spaces replaced by `_`
pub fn plot_filename(out_dir: &Path, base_name: &str, metric: &str) -> PathBuf {
    out_dir.join(format!(
        "{}_{}.svg",
        base_name,
        metric.to_lowercase().replace(' ', "_")
    ))
}

/// Padded range covering all finite values; None if there are none
fn axis_range<'a>(values: impl Iterator<Item = &'a f64>, pad_ratio: f64) -> Option<Range<f64>> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })?;

    if hi > lo {
        let pad = (hi - lo) * pad_ratio;
        Some(lo - pad..hi + pad)
    } else {
        Some(lo - 1.0..hi + 1.0)
    }
}

/// Draw one metric group into `path`
pub fn draw_group(path: &Path, group: &MetricGroup<'_>) -> Result<()> {
    let x_range = axis_range(group.signals.iter().flat_map(|s| s.timestamps.iter()), 0.0);
    let y_range = axis_range(group.signals.iter().flat_map(|s| s.samples.iter()), 0.05);
    let (x_range, y_range) = match (x_range, y_range) {
        (Some(x), Some(y)) => (x, y),
        _ => anyhow::bail!("Metric group '{}' has no finite samples", group.metric),
    };
    let y_label = group.signals.first().map(|s| s.unit.as_str()).unwrap_or_default();

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(group.metric, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc(y_label)
        .draw()?;

    for (index, signal) in group.signals.iter().enumerate() {
        let color = Palette99::pick(index).to_rgba();
        let points = signal
            .timestamps
            .iter()
            .copied()
            .zip(signal.samples.iter().copied())
            .filter(|(t, v)| t.is_finite() && v.is_finite());

        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))?
            .label(format!("{} ({})", signal.name, signal.unit))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Write one chart per metric group. A group that cannot be drawn is
/// logged and left out.
pub fn export_plots<'a>(
    out_dir: &Path,
    base_name: &str,
    groups: impl IntoIterator<Item = MetricGroup<'a>>,
) -> Vec<PathBuf> {
    let mut written = Vec::new();
    for group in groups {
        if group.signals.is_empty() {
            continue;
        }
        let path = plot_filename(out_dir, base_name, group.metric);
        match draw_group(&path, &group).with_context(|| format!("Failed to plot {:?}", path)) {
            Ok(()) => {
                log::info!("Plot exported: {:?}", path);
                written.push(path);
            }
            Err(e) => log::warn!("{:#}", e),
        }
    }
    written
}
