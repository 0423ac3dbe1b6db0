//! Human-readable run summary
//!
//! Headline fields are looked up by exact display name in the flat result
//! list and formatted with their units. KPI entries are overlaid last, keyed
//! by KPI name, so a later entry replaces an earlier one with the same key.

use crate::config::SignalRoles;
use crate::types::{KpiEntry, Mode, Signal};

pub const NOT_AVAILABLE: &str = "N/A";

/// Ordered `label -> formatted value` mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    entries: Vec<(String, String)>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing an existing value in place
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overlay KPI entries as `"<value> <unit>"`
    pub fn overlay_kpis(&mut self, kpis: &[KpiEntry]) {
        for kpi in kpis {
            self.insert(kpi.name.clone(), with_unit(format!("{:.2}", kpi.value), &kpi.unit));
        }
    }
}

fn with_unit(value: String, unit: &str) -> String {
    if unit.is_empty() {
        value
    } else {
        format!("{} {}", value, unit)
    }
}

fn find<'a>(signals: &'a [Signal], name: &str) -> Option<&'a Signal> {
    signals.iter().find(|s| s.name == name)
}

/// RMS of the finite samples
fn rms(samples: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    Some((finite.iter().map(|v| v * v).sum::<f64>() / finite.len() as f64).sqrt())
}

/// Finite sample with the largest magnitude, sign preserved
fn peak(samples: &[f64]) -> Option<f64> {
    samples
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |best: Option<f64>, v| match best {
            Some(b) if b.abs() >= v.abs() => Some(b),
            _ => Some(v),
        })
}

/// Assemble the summary for one run
pub fn generate_summary(
    signals: &[Signal],
    kpis: &[KpiEntry],
    mode: Mode,
    roles: &SignalRoles,
) -> Summary {
    let mut summary = Summary::new();
    let soc = find(signals, &roles.state_of_charge).filter(|s| !s.samples.is_empty());

    summary.insert("Mode", mode.to_string());

    summary.insert(
        "Log Duration",
        soc.map(|s| format!("{:.2} s", s.duration()))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    );

    summary.insert(
        "SoC Range",
        soc.map(|s| {
            format!(
                "{:.2} -> {:.2}",
                s.samples[0],
                s.samples[s.samples.len() - 1]
            )
        })
        .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    );

    summary.insert(
        "Peak Power",
        find(signals, &roles.power)
            .and_then(|s| peak(&s.samples).map(|p| with_unit(format!("{:.2}", p), &s.unit)))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    );

    summary.insert(
        "Current RMS",
        find(signals, &roles.current)
            .and_then(|s| rms(&s.samples).map(|r| with_unit(format!("{:.2}", r), &s.unit)))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    );

    summary.insert(
        "Max Cell Temperature",
        find(signals, &roles.cell_temp_max)
            .map(|s| with_unit(format!("{:.2}", s.stats.max), &s.unit))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    );

    summary.insert(
        "Max delta Cell Voltage",
        find(signals, &roles.cell_voltage_delta)
            .map(|s| with_unit(format!("{:.0}", s.stats.max), &s.unit))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    );

    summary.insert(
        "Max delta SoC",
        find(signals, &roles.soc_delta)
            .map(|s| with_unit(format!("{:.2}", s.stats.max), &s.unit))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    );

    summary.overlay_kpis(kpis);
    summary
}
