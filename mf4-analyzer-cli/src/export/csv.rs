//! Flat result list as CSV
//!
//! One row per entry: signal rows carry min/max/delta, KPI rows carry
//! value. Blank cells stay blank on re-read.

use anyhow::{Context, Result};
use mf4_analyzer_core::EntryRecord;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvRow {
    pub file_key: String,
    pub name: String,
    pub unit: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub delta: Option<f64>,
    pub value: Option<f64>,
}

impl CsvRow {
    pub fn from_record(file_key: &str, record: &EntryRecord) -> Self {
        Self {
            file_key: file_key.to_string(),
            name: record.name.clone(),
            unit: record.unit.clone(),
            min: record.min,
            max: record.max,
            delta: record.delta,
            value: record.value,
        }
    }
}

const HEADER: [&str; 7] = ["file_key", "name", "unit", "min", "max", "delta", "value"];

/// Write rows with a header line, even when there are no rows
pub fn write_csv<W: Write>(writer: W, file_key: &str, records: &[EntryRecord]) -> Result<()> {
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(HEADER)?;
    for record in records {
        writer.serialize(CsvRow::from_record(file_key, record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `<base>.csv` into `out_dir`
pub fn export_csv(out_dir: &Path, base_name: &str, records: &[EntryRecord]) -> Result<PathBuf> {
    let path = out_dir.join(format!("{}.csv", base_name));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {:?}", path))?;
    write_csv(file, base_name, records).with_context(|| format!("Failed to write {:?}", path))?;

    log::info!("CSV exported: {:?}", path);
    Ok(path)
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<CsvRow>> {
    let mut reader = ::csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf4_analyzer_core::{analyze, AnalyzerConfig, MemorySource};

    #[test]
    fn test_csv_round_trip_keeps_signal_stats() {
        let source = MemorySource::new()
            .with_channel("PackVoltage", vec![0.0, 1.0, 2.0], vec![398.5, 401.0, 400.25], "V")
            .with_channel("PackCurrent", vec![0.0, 1.0, 2.0], vec![20.0, 25.0, -10.0], "A");
        let analysis = analyze(&AnalyzerConfig::default(), &source);
        let records = analysis.records();

        let mut buffer = Vec::new();
        write_csv(&mut buffer, "session_01", &records).unwrap();
        let rows = read_csv(buffer.as_slice()).unwrap();

        assert_eq!(rows.len(), records.len());
        for (row, record) in rows.iter().zip(&records) {
            assert_eq!(row.file_key, "session_01");
            assert_eq!(row.name, record.name);
            assert_eq!(row.unit, record.unit);
            assert_eq!(row.min, record.min);
            assert_eq!(row.max, record.max);
            assert_eq!(row.delta, record.delta);
            assert_eq!(row.value, record.value);
        }
        let current = rows.iter().find(|r| r.name == "PackCurrent").unwrap();
        assert_eq!(current.value, None);
        assert_eq!(current.min, Some(-10.0));
        assert_eq!(current.delta, Some(35.0));
    }

    #[test]
    fn test_csv_header_and_blank_cells() {
        let records = vec![EntryRecord {
            metric: None,
            name: "Power RMS".into(),
            unit: "kW".into(),
            min: None,
            max: None,
            delta: None,
            value: Some(10.0),
        }];

        let mut buffer = Vec::new();
        write_csv(&mut buffer, "log", &records).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("file_key,name,unit,min,max,delta,value"));
        assert_eq!(lines.next(), Some("log,Power RMS,kW,,,,10.0"));
    }

    #[test]
    fn test_export_csv_names_file_after_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_csv(dir.path(), "drive_2024", &[]).unwrap();
        assert_eq!(path, dir.path().join("drive_2024.csv"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), "file_key,name,unit,min,max,delta,value");
        assert!(read_csv(text.as_bytes()).unwrap().is_empty());
    }
}
