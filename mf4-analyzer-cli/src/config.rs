//! Configuration loading and parsing

use anyhow::{Context, Result};
use mf4_analyzer_core::AnalyzerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub analysis: AnalyzerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    /// Directory searched for the newest log
    #[serde(default = "default_input_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Explicit log file; skips directory discovery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: default_input_dir(),
            extensions: default_extensions(),
            file: None,
        }
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("./mf4_logfiles")
}

fn default_extensions() -> Vec<String> {
    vec!["csv".to_string()]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_report")]
    pub report: OutputFormat,
    #[serde(default = "default_true")]
    pub csv: bool,
    #[serde(default = "default_true")]
    pub json: bool,
    #[serde(default = "default_true")]
    pub plots: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            report: default_report(),
            csv: true,
            json: true,
            plots: true,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./mf4_exports")
}

fn default_report() -> OutputFormat {
    OutputFormat::Html
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Txt,
    Html,
    /// No report
    Off,
}

impl OutputFormat {
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Txt => Some("txt"),
            OutputFormat::Html => Some("html"),
            OutputFormat::Off => None,
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    for definition in &config.analysis.signals {
        if let Err(e) = mf4_analyzer_core::Expr::parse(&definition.signal) {
            log::warn!("Signal '{}' will be skipped: {}", definition.display_name(), e);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf4_analyzer_core::config::required_mode;
    use mf4_analyzer_core::Mode;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [input]
            dir = "logs"

            [output]
            report = "txt"
            plots = false

            [[analysis.signals]]
            metric = "Power"
            name = "Actual Power"
            signal = "U * I"
            unit_override = "kW"
            scaling_factor = 0.001

            [[analysis.signals]]
            metric = "SoC"
            signal = "Soc"

            [analysis.channels]
            U = "BMS_PackVoltage"
            I = "BMS_PackCurrent"
            Soc = "BMS_SOC"

            [[analysis.gating]]
            signal = "Actual Power"
            mode = "Discharging"

            [analysis.roles]
            state_of_charge = "Soc"

            [analysis.kpi]
            discharge_power_kw = 2.5
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.dir, PathBuf::from("logs"));
        assert_eq!(config.input.extensions, vec!["csv"]);
        assert_eq!(config.output.report, OutputFormat::Txt);
        assert!(!config.output.plots);
        assert!(config.output.csv);

        let analysis = &config.analysis;
        assert_eq!(analysis.signals.len(), 2);
        assert_eq!(analysis.signals[0].scaling_factor, Some(0.001));
        assert_eq!(analysis.channels.len(), 3);
        assert_eq!(
            required_mode(&analysis.gating, "Actual Power"),
            Some(Mode::Discharging)
        );
        assert_eq!(analysis.roles.state_of_charge, "Soc");
        // Unset roles and thresholds keep their defaults
        assert_eq!(analysis.roles.power, "Actual Power");
        assert_eq!(analysis.kpi.discharge_power_kw, 2.5);
        assert_eq!(analysis.kpi.charge_power_kw, -5.0);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.input.dir, PathBuf::from("./mf4_logfiles"));
        assert_eq!(config.output.dir, PathBuf::from("./mf4_exports"));
        assert_eq!(config.output.report, OutputFormat::Html);
        assert_eq!(config.analysis, AnalyzerConfig::default());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.analysis, config.analysis);
    }

    #[test]
    fn test_report_can_be_disabled() {
        let config: AppConfig = toml::from_str("[output]\nreport = \"off\"").unwrap();
        assert_eq!(config.output.report, OutputFormat::Off);
        assert_eq!(config.output.report.extension(), None);
    }

    #[test]
    fn test_load_config_errors_carry_path() {
        let err = load_config(Path::new("missing-config.toml")).unwrap_err();
        assert!(err.to_string().contains("missing-config.toml"));
    }
}
