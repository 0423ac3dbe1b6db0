//! Decoded channel tables in CSV form
//!
//! Measurement tooling can export a decoded log either as a long table
//! (`channel,unit,timestamp,value`, one row per sample, each channel on its
//! own time base) or as a wide table (a `timestamps` column plus one column
//! per channel, headers optionally carrying the unit as `Name [unit]`).
//! Both layouts are recognised from the header row.

use crate::source::ChannelSource;
use crate::types::{AnalyzerError, RawChannel, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Table layout detected from the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvLayout {
    Long,
    Wide,
}

/// Column indices of the long layout
struct LongColumns {
    channel: usize,
    unit: Option<usize>,
    timestamp: usize,
    value: usize,
}

/// Fully decoded CSV log, held in memory for the run
#[derive(Debug, Clone)]
pub struct CsvLogReader {
    layout: CsvLayout,
    channels: HashMap<String, RawChannel>,
}

impl CsvLogReader {
    /// Open and decode a CSV log file
    pub fn open(path: &Path) -> Result<Self> {
        log::info!("Parsing CSV log: {:?}", path);

        if !path.exists() {
            return Err(AnalyzerError::LogParseError(format!(
                "CSV log not found: {:?}",
                path
            )));
        }

        let reader = Self::from_reader(File::open(path)?)?;
        log::info!(
            "CSV log parsed: {} channels ({:?} layout)",
            reader.channels.len(),
            reader.layout
        );
        Ok(reader)
    }

    /// Decode a CSV log from any reader
    pub fn from_reader<R: Read>(input: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(input);

        let headers = csv_reader.headers()?.clone();
        let channels = if let Some(columns) = long_columns(&headers) {
            (CsvLayout::Long, read_long(&mut csv_reader, &columns)?)
        } else if is_time_column(headers.get(0).unwrap_or("")) {
            (CsvLayout::Wide, read_wide(&mut csv_reader, &headers)?)
        } else {
            return Err(AnalyzerError::LogParseError(format!(
                "Unrecognised CSV header: {:?}",
                headers.iter().collect::<Vec<_>>()
            )));
        };

        let (layout, channels) = channels;
        if channels.is_empty() {
            return Err(AnalyzerError::LogParseError(
                "CSV log contains no channel data".to_string(),
            ));
        }

        Ok(Self { layout, channels })
    }

    pub fn layout(&self) -> CsvLayout {
        self.layout
    }
}

impl ChannelSource for CsvLogReader {
    fn get(&self, channel: &str) -> Result<RawChannel> {
        self.channels
            .get(channel)
            .cloned()
            .ok_or_else(|| AnalyzerError::ChannelNotFound(channel.to_string()))
    }

    fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.keys().cloned().collect();
        names.sort();
        names
    }
}

fn is_time_column(header: &str) -> bool {
    matches!(
        header.to_ascii_lowercase().as_str(),
        "timestamps" | "timestamp" | "time" | "t"
    )
}

fn long_columns(headers: &csv::StringRecord) -> Option<LongColumns> {
    let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    Some(LongColumns {
        channel: find("channel")?,
        unit: find("unit"),
        timestamp: find("timestamp")?,
        value: find("value")?,
    })
}

/// Split `Name [unit]` into its parts
fn split_header(header: &str) -> (String, String) {
    if let (Some(open), true) = (header.rfind('['), header.ends_with(']')) {
        let name = header[..open].trim();
        if !name.is_empty() {
            return (name.to_string(), header[open + 1..header.len() - 1].trim().to_string());
        }
    }
    (header.to_string(), String::new())
}

fn parse_number(cell: &str, record: &csv::StringRecord) -> Result<f64> {
    cell.parse::<f64>().map_err(|_| {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        AnalyzerError::InvalidData(format!("line {}: '{}' is not a number", line, cell))
    })
}

fn read_long<R: Read>(
    csv_reader: &mut csv::Reader<R>,
    columns: &LongColumns,
) -> Result<HashMap<String, RawChannel>> {
    let mut channels: HashMap<String, RawChannel> = HashMap::new();

    for record in csv_reader.records() {
        let record = record?;
        let name = record.get(columns.channel).unwrap_or("");
        let timestamp = record.get(columns.timestamp).unwrap_or("");
        let value = record.get(columns.value).unwrap_or("");
        if name.is_empty() || timestamp.is_empty() || value.is_empty() {
            continue;
        }

        let timestamp = parse_number(timestamp, &record)?;
        let value = parse_number(value, &record)?;
        let channel = channels.entry(name.to_string()).or_default();
        if channel.unit.is_empty() {
            if let Some(unit) = columns.unit.and_then(|i| record.get(i)) {
                channel.unit = unit.to_string();
            }
        }
        channel.timestamps.push(timestamp);
        channel.samples.push(value);
    }

    Ok(channels)
}

fn read_wide<R: Read>(
    csv_reader: &mut csv::Reader<R>,
    headers: &csv::StringRecord,
) -> Result<HashMap<String, RawChannel>> {
    let columns: Vec<(String, String)> = headers.iter().skip(1).map(split_header).collect();
    let mut channels: Vec<RawChannel> = columns
        .iter()
        .map(|(_, unit)| RawChannel::new(Vec::new(), Vec::new(), unit.as_str()))
        .collect();

    for record in csv_reader.records() {
        let record = record?;
        let time = record.get(0).unwrap_or("");
        if time.is_empty() {
            continue;
        }
        let time = parse_number(time, &record)?;

        for (i, channel) in channels.iter_mut().enumerate() {
            match record.get(i + 1) {
                Some(cell) if !cell.is_empty() => {
                    channel.samples.push(parse_number(cell, &record)?);
                    channel.timestamps.push(time);
                }
                _ => {}
            }
        }
    }

    Ok(columns
        .into_iter()
        .zip(channels)
        .filter(|(_, channel)| !channel.is_empty())
        .map(|((name, _), channel)| (name, channel))
        .collect())
}
