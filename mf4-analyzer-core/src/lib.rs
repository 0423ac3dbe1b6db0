//! MF4 Analyzer Core Library
//!
//! Turns decoded battery test logs into derived signals, operating mode and
//! KPIs.
//!
//! # Architecture
//!
//! The library covers the computational part of the analyzer:
//! - Reads decoded channel tables and serves raw channels by name
//! - Evaluates an ordered list of declarative signal definitions (raw
//!   aliases or single-operator expressions) with time-base alignment
//! - Detects the session mode (Charging / Discharging / Idle)
//! - Computes mode-gated KPIs and a headline summary
//!
//! The library does NOT:
//! - Decode the binary measurement format itself
//! - Render plots or reports
//! - Write export files
//!
//! Those live in the application layer (mf4-analyzer-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use mf4_analyzer_core::{analyze, find_latest_log, AnalyzerConfig};
//! use std::path::Path;
//!
//! let config = AnalyzerConfig::new();
//! let (source, info) = find_latest_log(Path::new("mf4_logfiles"), &["csv".to_string()]).unwrap();
//!
//! let analysis = analyze(&config, source.as_ref());
//! println!("{}: {}", info.file_name, analysis.mode);
//! for (label, value) in analysis.summary.iter() {
//!     println!("{:<25}: {}", label, value);
//! }
//! ```

// Public modules
pub mod align;
pub mod analysis;
pub mod config;
pub mod evaluator;
pub mod expression;
pub mod formats;
pub mod kpi;
pub mod mode;
pub mod reader;
pub mod registry;
pub mod source;
pub mod summary;
pub mod types;

// Re-export main types for convenience
pub use align::{align_and_combine, try_align_and_combine, AlignError, BinaryOp};
pub use analysis::{analyze, Analysis};
pub use config::{
    required_mode, AnalyzerConfig, GatingRule, KpiThresholds, SignalDefinition, SignalRoles,
};
pub use evaluator::{evaluate, DefinitionOutcome, Evaluation, Evaluator, SkipReason, SkippedDefinition};
pub use expression::Expr;
pub use formats::CsvLogReader;
pub use kpi::{compute_charging_metrics, compute_charging_time, compute_discharge_metrics, compute_rms_power};
pub use mode::detect_mode;
pub use reader::{find_latest_log, open_log, LogFileInfo};
pub use registry::{DerivedRegistry, MetricGroup};
pub use source::{ChannelSource, MemorySource, RawChannels};
pub use summary::Summary;
pub use types::{
    AnalyzerError, EntryRecord, FlatEntry, KpiEntry, Mode, RawChannel, Result, Signal,
    SignalStats, Timestamp,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
