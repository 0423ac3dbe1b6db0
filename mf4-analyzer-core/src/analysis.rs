//! One-call analysis pipeline
//!
//! raw channels -> mode detection -> evaluation -> KPIs -> summary.
//! All state lives in the returned [`Analysis`] and is discarded with it.

use crate::config::AnalyzerConfig;
use crate::evaluator::{evaluate, SkippedDefinition};
use crate::kpi::compute_kpis;
use crate::mode::detect_mode;
use crate::registry::{DerivedRegistry, MetricGroup};
use crate::source::{ChannelSource, RawChannels};
use crate::summary::{generate_summary, Summary};
use crate::types::{EntryRecord, FlatEntry, KpiEntry, Mode, Signal};

/// Everything computed for one log file
#[derive(Debug, Clone)]
pub struct Analysis {
    pub mode: Mode,
    pub registry: DerivedRegistry,
    pub skipped: Vec<SkippedDefinition>,
    pub kpis: Vec<KpiEntry>,
    pub summary: Summary,
}

impl Analysis {
    /// Evaluated signals in definition order
    pub fn signals(&self) -> &[Signal] {
        self.registry.signals()
    }

    pub fn groups(&self) -> impl Iterator<Item = MetricGroup<'_>> {
        self.registry.groups()
    }

    /// Flat result list: signals first, then KPIs
    pub fn flat_entries(&self) -> Vec<FlatEntry<'_>> {
        self.registry
            .signals()
            .iter()
            .map(FlatEntry::Signal)
            .chain(self.kpis.iter().map(FlatEntry::Kpi))
            .collect()
    }

    /// Flat result list without sample arrays
    pub fn records(&self) -> Vec<EntryRecord> {
        self.flat_entries().iter().map(FlatEntry::record).collect()
    }
}

/// Detect the mode from the raw state-of-charge channel
pub fn detect_session_mode(raw: &RawChannels, config: &AnalyzerConfig) -> Mode {
    match raw.get(&config.roles.state_of_charge) {
        Some(soc) => detect_mode(&soc.samples),
        None => {
            log::warn!(
                "State of charge channel '{}' not available, assuming Idle",
                config.roles.state_of_charge
            );
            Mode::Idle
        }
    }
}

/// Run the full pipeline over one log
pub fn analyze(config: &AnalyzerConfig, source: &dyn ChannelSource) -> Analysis {
    let raw = RawChannels::load(&config.signals, &config.channels, source);
    log::debug!("Loaded {} raw channels", raw.len());

    let mode = detect_session_mode(&raw, config);
    log::info!("Detected mode: {}", mode);

    let evaluation = evaluate(&config.signals, &raw, mode, &config.gating);
    let kpis = compute_kpis(&evaluation.registry, mode, config);
    for kpi in &kpis {
        log::debug!("KPI {} = {} {}", kpi.name, kpi.value, kpi.unit);
    }

    let summary = generate_summary(evaluation.registry.signals(), &kpis, mode, &config.roles);

    Analysis {
        mode,
        registry: evaluation.registry,
        skipped: evaluation.skipped,
        kpis,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    #[test]
    fn test_missing_soc_defaults_to_idle() {
        let config = AnalyzerConfig::default();
        let source = MemorySource::new().with_channel("PackCurrent", vec![0.0], vec![1.0], "A");
        let analysis = analyze(&config, &source);

        assert_eq!(analysis.mode, Mode::Idle);
        assert_eq!(analysis.signals().len(), 1);
        assert!(analysis.kpis.is_empty());
    }

    #[test]
    fn test_records_put_kpis_last() {
        let config = AnalyzerConfig::default();
        let source = MemorySource::new()
            .with_channel("PackVoltage", vec![0.0, 1.0], vec![400.0, 400.0], "V")
            .with_channel("PackCurrent", vec![0.0, 1.0], vec![25.0, 25.0], "A");
        let analysis = analyze(&config, &source);

        let records = analysis.records();
        let last = records.last().unwrap();
        assert_eq!(last.name, "Power RMS");
        assert_eq!(last.value, Some(10.0));
        assert!(records[..records.len() - 1].iter().all(|r| r.value.is_none()));
    }
}
