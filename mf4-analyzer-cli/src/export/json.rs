//! Signal summary as JSON (no sample arrays)

use anyhow::{Context, Result};
use mf4_analyzer_core::EntryRecord;
use std::path::{Path, PathBuf};

pub fn export_json(out_dir: &Path, base_name: &str, records: &[EntryRecord]) -> Result<PathBuf> {
    let path = out_dir.join(format!("{}_signal_summary.json", base_name));
    let content = serde_json::to_string_pretty(records)?;
    std::fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;

    log::info!("JSON summary exported: {:?}", path);
    Ok(path)
}
