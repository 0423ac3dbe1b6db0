//! Report generation
//!
//! Renders the analysis of one log as a TXT or HTML document: header,
//! summary bullets, metrics table, skipped definitions and plot references.

pub mod html;
pub mod txt;

use crate::config::OutputFormat;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use mf4_analyzer_core::{Analysis, LogFileInfo};
use std::path::{Path, PathBuf};

/// Everything a report renderer needs
pub struct ReportContext<'a> {
    pub log: &'a LogFileInfo,
    pub analysis: &'a Analysis,
    pub generated: DateTime<Local>,
    /// Plot files written for this log, in metric-group order
    pub plots: &'a [PathBuf],
}

impl<'a> ReportContext<'a> {
    pub fn new(log: &'a LogFileInfo, analysis: &'a Analysis, plots: &'a [PathBuf]) -> Self {
        Self {
            log,
            analysis,
            generated: Local::now(),
            plots,
        }
    }

    pub fn generated_at(&self) -> String {
        self.generated.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Table rows `[metric, signal, unit, min, max]` in definition order
    pub fn table_rows(&self) -> Vec<[String; 5]> {
        self.analysis
            .signals()
            .iter()
            .map(|s| {
                [
                    s.metric.clone(),
                    s.name.clone(),
                    s.unit.clone(),
                    format!("{:.2}", s.stats.min),
                    format!("{:.2}", s.stats.max),
                ]
            })
            .collect()
    }

    /// Plot paths as written relative to the report file
    pub fn plot_refs(&self) -> Vec<String> {
        self.plots
            .iter()
            .map(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| p.display().to_string())
            })
            .collect()
    }
}

pub const TABLE_HEADERS: [&str; 5] = ["Metric", "Signal", "Unit", "Min", "Max"];

/// Render the report in `format`
pub fn render(format: OutputFormat, ctx: &ReportContext<'_>) -> Option<String> {
    match format {
        OutputFormat::Txt => Some(txt::render(ctx)),
        OutputFormat::Html => Some(html::render(ctx)),
        OutputFormat::Off => None,
    }
}

/// Write `<base>_analysis_report.<ext>`; returns None when reports are off
pub fn write_report(
    out_dir: &Path,
    format: OutputFormat,
    ctx: &ReportContext<'_>,
) -> Result<Option<PathBuf>> {
    let (Some(extension), Some(content)) = (format.extension(), render(format, ctx)) else {
        log::debug!("Report disabled");
        return Ok(None);
    };

    let path = out_dir.join(format!("{}_analysis_report.{}", ctx.log.base_name, extension));
    std::fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;

    log::info!("Report exported: {:?}", path);
    Ok(Some(path))
}

#[cfg(test)]
pub(crate) mod test_support {
    use mf4_analyzer_core::{analyze, Analysis, AnalyzerConfig, LogFileInfo, MemorySource};
    use std::path::PathBuf;

    pub fn charging_analysis() -> Analysis {
        let ts = vec![0.0, 10.0, 20.0, 30.0];
        let source = MemorySource::new()
            .with_channel("StateOfCharge", ts.clone(), vec![40.0, 45.0, 50.0, 55.0], "%")
            .with_channel("PackVoltage", ts.clone(), vec![400.0, 401.0, 402.0, 403.0], "V")
            .with_channel("PackCurrent", ts.clone(), vec![-50.0, -50.0, -50.0, -50.0], "A")
            .with_channel("CellTempMax", ts, vec![30.0, 31.0, 32.0, 33.0], "degC");
        analyze(&AnalyzerConfig::default(), &source)
    }

    pub fn log_info() -> LogFileInfo {
        LogFileInfo {
            path: PathBuf::from("logs/R&D_charge.csv"),
            file_name: "R&D_charge.csv".to_string(),
            base_name: "R&D_charge".to_string(),
            modified: chrono::Utc::now(),
        }
    }
}
