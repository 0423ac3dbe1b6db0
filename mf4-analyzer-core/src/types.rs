//! Core types for the log analyzer library
//!
//! This module defines the data model shared by every stage of the pipeline:
//! raw channels as handed over by a log reader, evaluated signals with their
//! statistics, the operating mode, KPI entries, and the flat record shape the
//! exporters consume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wall-clock timestamp type used for file metadata and reports
pub type Timestamp = DateTime<Utc>;

/// Result type for analyzer operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Errors that can occur while reading logs or configuring the analyzer
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("Failed to parse log file: {0}")]
    LogParseError(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("No valid log file found in {0}")]
    NoLogFile(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// A channel exactly as decoded from the log file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawChannel {
    /// Sample times in seconds, monotonic
    pub timestamps: Vec<f64>,
    /// Physical values, one per timestamp
    pub samples: Vec<f64>,
    /// Engineering unit (may be empty)
    pub unit: String,
}

impl RawChannel {
    pub fn new(timestamps: Vec<f64>, samples: Vec<f64>, unit: impl Into<String>) -> Self {
        Self {
            timestamps,
            samples,
            unit: unit.into(),
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Min/max/delta summary of a sample series, rounded to two decimals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalStats {
    pub min: f64,
    pub max: f64,
    pub delta: f64,
}

impl SignalStats {
    /// Compute statistics, or `None` for an empty series
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let (min, max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Some(Self {
            min: round2(min),
            max: round2(max),
            delta: round2(max - min),
        })
    }
}

/// An evaluated signal: the result of one signal definition
///
/// Signals are never mutated after evaluation; derived signals are always
/// new instances.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Metric group label (presentation only)
    pub metric: String,
    /// Display name, also the key later expressions refer to
    pub name: String,
    /// Engineering unit after overrides
    pub unit: String,
    pub timestamps: Vec<f64>,
    pub samples: Vec<f64>,
    pub stats: SignalStats,
}

impl Signal {
    /// Borrow the signal as an expression operand
    pub fn as_operand(&self) -> Operand<'_> {
        Operand {
            timestamps: &self.timestamps,
            samples: &self.samples,
            unit: &self.unit,
        }
    }

    /// Duration covered by the timestamps, 0 for fewer than two samples
    pub fn duration(&self) -> f64 {
        match (self.timestamps.first(), self.timestamps.last()) {
            (Some(first), Some(last)) if self.timestamps.len() > 1 => last - first,
            _ => 0.0,
        }
    }
}

impl RawChannel {
    /// Borrow the channel as an expression operand
    pub fn as_operand(&self) -> Operand<'_> {
        Operand {
            timestamps: &self.timestamps,
            samples: &self.samples,
            unit: &self.unit,
        }
    }
}

/// Borrowed view of either a raw channel or a derived signal
#[derive(Debug, Clone, Copy)]
pub struct Operand<'a> {
    pub timestamps: &'a [f64],
    pub samples: &'a [f64],
    pub unit: &'a str,
}

/// Session-level operating mode, detected from the state of charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Charging,
    Discharging,
    Idle,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Charging => write!(f, "Charging"),
            Mode::Discharging => write!(f, "Discharging"),
            Mode::Idle => write!(f, "Idle"),
        }
    }
}

/// A scalar performance indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiEntry {
    pub name: String,
    pub value: f64,
    pub unit: String,
}

impl KpiEntry {
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
        }
    }
}

/// One entry of the flat result list handed to the exporters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlatEntry<'a> {
    Signal(&'a Signal),
    Kpi(&'a KpiEntry),
}

impl FlatEntry<'_> {
    /// Flatten into the export record (no sample arrays)
    pub fn record(&self) -> EntryRecord {
        match self {
            FlatEntry::Signal(signal) => EntryRecord {
                metric: Some(signal.metric.clone()),
                name: signal.name.clone(),
                unit: signal.unit.clone(),
                min: Some(signal.stats.min),
                max: Some(signal.stats.max),
                delta: Some(signal.stats.delta),
                value: None,
            },
            FlatEntry::Kpi(kpi) => EntryRecord {
                metric: None,
                name: kpi.name.clone(),
                unit: kpi.unit.clone(),
                min: None,
                max: None,
                delta: None,
                value: Some(kpi.value),
            },
        }
    }
}

/// Export shape of a flat entry: signal rows fill min/max/delta, KPI rows
/// fill value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    pub name: String,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Round to two decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_from_samples() {
        let stats = SignalStats::from_samples(&[1.0, 2.5, -0.456]).unwrap();
        assert_eq!(stats.min, -0.46);
        assert_eq!(stats.max, 2.5);
        assert_eq!(stats.delta, 2.96);
        assert!(SignalStats::from_samples(&[]).is_none());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(format!("{}", Mode::Charging), "Charging");
        assert_eq!(format!("{}", Mode::Discharging), "Discharging");
        assert_eq!(format!("{}", Mode::Idle), "Idle");
    }

    #[test]
    fn test_flat_entry_records() {
        let kpi = KpiEntry::new("Power RMS", 12.5, "kW");
        let record = FlatEntry::Kpi(&kpi).record();
        assert_eq!(record.value, Some(12.5));
        assert!(record.min.is_none() && record.metric.is_none());

        let signal = Signal {
            metric: "Current".into(),
            name: "PackCurrent".into(),
            unit: "A".into(),
            timestamps: vec![0.0, 1.0],
            samples: vec![-3.0, 4.0],
            stats: SignalStats::from_samples(&[-3.0, 4.0]).unwrap(),
        };
        let record = FlatEntry::Signal(&signal).record();
        assert_eq!(record.metric.as_deref(), Some("Current"));
        assert_eq!(record.delta, Some(7.0));
        assert!(record.value.is_none());
    }

    #[test]
    fn test_signal_duration() {
        let mut signal = Signal {
            metric: "SoC".into(),
            name: "StateOfCharge".into(),
            unit: "%".into(),
            timestamps: vec![2.0, 3.5, 10.0],
            samples: vec![1.0, 2.0, 3.0],
            stats: SignalStats::from_samples(&[1.0, 2.0, 3.0]).unwrap(),
        };
        assert_eq!(signal.duration(), 8.0);
        signal.timestamps.truncate(1);
        assert_eq!(signal.duration(), 0.0);
    }
}
