//! Analyzer configuration types
//!
//! This module defines the declarative inputs of the analyzer: the ordered
//! signal definition list, the raw channel alias table, the mode gating
//! policy, the signal roles used by KPIs and the summary, and the KPI
//! thresholds. Everything is owned by the caller and never mutated by the
//! engine.

use crate::types::Mode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One declarative entry of the signal list
///
/// `signal` is either a raw channel alias or a single-operator expression
/// over earlier display names and raw aliases (`"PackVoltage * PackCurrent"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDefinition {
    /// Metric group label
    pub metric: String,
    /// Raw channel alias or expression
    pub signal: String,
    /// Display name (defaults to `signal`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_override: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling_factor: Option<f64>,
}

impl SignalDefinition {
    /// Create a definition that displays under its own expression string
    pub fn new(metric: impl Into<String>, signal: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            signal: signal.into(),
            name: None,
            unit_override: None,
            scaling_factor: None,
        }
    }

    /// Builder method: set the display name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder method: override the unit
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit_override = Some(unit.into());
        self
    }

    /// Builder method: set the scaling factor
    pub fn scaled(mut self, factor: f64) -> Self {
        self.scaling_factor = Some(factor);
        self
    }

    /// The name results are stored under
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.signal)
    }

    /// Multiplier applied to every sample (default 1)
    pub fn scale(&self) -> f64 {
        self.scaling_factor.unwrap_or(1.0)
    }
}

/// A definition that only applies in one operating mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatingRule {
    /// Display name of the gated definition
    pub signal: String,
    /// Mode the definition requires
    pub mode: Mode,
}

impl GatingRule {
    pub fn new(signal: impl Into<String>, mode: Mode) -> Self {
        Self {
            signal: signal.into(),
            mode,
        }
    }
}

/// Display names of the signals that play fixed roles downstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalRoles {
    /// State of charge, drives mode detection and charging time
    pub state_of_charge: String,
    /// Pack power in kW (negative = charging)
    pub power: String,
    pub current: String,
    pub cell_temp_max: String,
    pub cell_voltage_delta: String,
    pub soc_delta: String,
}

impl Default for SignalRoles {
    fn default() -> Self {
        Self {
            state_of_charge: "StateOfCharge".to_string(),
            power: "Actual Power".to_string(),
            current: "PackCurrent".to_string(),
            cell_temp_max: "CellTempMax".to_string(),
            cell_voltage_delta: "Delta Cell Voltage".to_string(),
            soc_delta: "Delta SoC".to_string(),
        }
    }
}

/// Thresholds of the KPI computations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiThresholds {
    /// Power below this counts as charging (kW)
    pub charge_power_kw: f64,
    /// Power above this counts as active discharge (kW)
    pub discharge_power_kw: f64,
    /// SoC rise rate above this counts as charging (%-pts/s)
    pub soc_derivative: f64,
}

impl Default for KpiThresholds {
    fn default() -> Self {
        Self {
            charge_power_kw: -5.0,
            discharge_power_kw: 5.0,
            soc_derivative: 1e-3,
        }
    }
}

/// Complete configuration for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Ordered definitions; list order is dependency order
    #[serde(default = "default_signals")]
    pub signals: Vec<SignalDefinition>,

    /// Raw channel alias -> channel name in the log file
    #[serde(default = "default_channels")]
    pub channels: HashMap<String, String>,

    /// Mode gating policy
    #[serde(default = "default_gating")]
    pub gating: Vec<GatingRule>,

    #[serde(default)]
    pub roles: SignalRoles,

    #[serde(default)]
    pub kpi: KpiThresholds,
}

const BATTERY_CHANNELS: &[&str] = &[
    "PackCurrent",
    "PackVoltage",
    "ChargeCurrentLimit",
    "DischargePowerLimit",
    "ChargePowerLimit",
    "CellTempMax",
    "CellTempMin",
    "CoolantInletTemp",
    "CellVoltageMax",
    "CellVoltageMin",
    "StateOfCharge",
    "CellSocMin",
    "CellSocMax",
    "SystemFaultIndicator",
];

fn default_signals() -> Vec<SignalDefinition> {
    vec![
        SignalDefinition::new("Current", "PackCurrent"),
        SignalDefinition::new("Current", "ChargeCurrentLimit").scaled(-1.0),
        SignalDefinition::new("Power", "PackVoltage * PackCurrent")
            .named("Actual Power")
            .with_unit("kW")
            .scaled(1e-3),
        SignalDefinition::new("Power", "DischargePowerLimit"),
        SignalDefinition::new("Power", "ChargePowerLimit").scaled(-1.0),
        SignalDefinition::new("Temperature", "CellTempMax"),
        SignalDefinition::new("Temperature", "CellTempMin"),
        SignalDefinition::new("Temperature", "CoolantInletTemp"),
        SignalDefinition::new("Temperature Delta", "CellTempMax - CellTempMin")
            .named("Delta Cell Temperature"),
        SignalDefinition::new("Temperature Delta", "CellTempMax - CoolantInletTemp")
            .named("Cell-Coolant DeltaT"),
        SignalDefinition::new("Cell Voltage", "CellVoltageMax"),
        SignalDefinition::new("Cell Voltage", "CellVoltageMin"),
        SignalDefinition::new("Delta Cell Voltage", "CellVoltageMax - CellVoltageMin")
            .named("Delta Cell Voltage")
            .with_unit("mV")
            .scaled(1e3),
        SignalDefinition::new("SoC", "StateOfCharge"),
        SignalDefinition::new("SoC", "CellSocMin"),
        SignalDefinition::new("SoC", "CellSocMax"),
        SignalDefinition::new("Delta SoC", "CellSocMax - CellSocMin").named("Delta SoC"),
        SignalDefinition::new("Fault Flags", "SystemFaultIndicator"),
    ]
}

fn default_channels() -> HashMap<String, String> {
    BATTERY_CHANNELS
        .iter()
        .map(|name| (name.to_string(), name.to_string()))
        .collect()
}

fn default_gating() -> Vec<GatingRule> {
    vec![
        GatingRule::new("ChargeCurrentLimit", Mode::Charging),
        GatingRule::new("ChargePowerLimit", Mode::Charging),
    ]
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            signals: default_signals(),
            channels: default_channels(),
            gating: default_gating(),
            roles: SignalRoles::default(),
            kpi: KpiThresholds::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Create a configuration with the built-in battery signal list
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: replace the signal definition list
    pub fn with_signals(mut self, signals: Vec<SignalDefinition>) -> Self {
        self.signals = signals;
        self
    }

    /// Builder method: register a raw channel alias
    pub fn add_channel(mut self, alias: impl Into<String>, channel: impl Into<String>) -> Self {
        self.channels.insert(alias.into(), channel.into());
        self
    }

    /// Builder method: replace the alias table
    pub fn with_channels(mut self, channels: HashMap<String, String>) -> Self {
        self.channels = channels;
        self
    }

    /// Builder method: replace the gating policy
    pub fn with_gating(mut self, gating: Vec<GatingRule>) -> Self {
        self.gating = gating;
        self
    }

    /// Builder method: replace the signal roles
    pub fn with_roles(mut self, roles: SignalRoles) -> Self {
        self.roles = roles;
        self
    }

    /// Builder method: replace the KPI thresholds
    pub fn with_kpi_thresholds(mut self, kpi: KpiThresholds) -> Self {
        self.kpi = kpi;
        self
    }
}

/// Mode a definition requires under `rules`, if it is gated
pub fn required_mode(rules: &[GatingRule], display_name: &str) -> Option<Mode> {
    rules
        .iter()
        .find(|rule| rule.signal == display_name)
        .map(|rule| rule.mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_builder() {
        let def = SignalDefinition::new("Power", "PackVoltage * PackCurrent")
            .named("Actual Power")
            .with_unit("kW")
            .scaled(1e-3);

        assert_eq!(def.display_name(), "Actual Power");
        assert_eq!(def.unit_override.as_deref(), Some("kW"));
        assert_eq!(def.scale(), 1e-3);

        let plain = SignalDefinition::new("Current", "PackCurrent");
        assert_eq!(plain.display_name(), "PackCurrent");
        assert_eq!(plain.scale(), 1.0);
    }

    #[test]
    fn test_default_config() {
        let config = AnalyzerConfig::new();
        assert_eq!(config.signals.len(), 18);
        assert_eq!(config.channels.get("PackVoltage").map(String::as_str), Some("PackVoltage"));
        assert_eq!(config.roles.power, "Actual Power");
        assert_eq!(config.kpi.charge_power_kw, -5.0);
    }

    #[test]
    fn test_gating_logic() {
        let config = AnalyzerConfig::new();

        assert_eq!(required_mode(&config.gating, "ChargePowerLimit"), Some(Mode::Charging));
        assert_eq!(required_mode(&config.gating, "ChargeCurrentLimit"), Some(Mode::Charging));
        // Ungated signals apply everywhere
        assert_eq!(required_mode(&config.gating, "PackCurrent"), None);
    }

    #[test]
    fn test_builder_overrides() {
        let config = AnalyzerConfig::new()
            .with_channels(HashMap::new())
            .add_channel("Soc", "BMS_SOC_Disp")
            .with_gating(vec![GatingRule::new("Regen", Mode::Discharging)]);

        assert_eq!(config.channels.len(), 1);
        assert_eq!(required_mode(&config.gating, "Regen"), Some(Mode::Discharging));
        assert_eq!(required_mode(&config.gating, "ChargePowerLimit"), None);
    }
}
