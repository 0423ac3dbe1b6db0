//! Signal definition evaluation
//!
//! Definitions are evaluated strictly in list order; that order is the only
//! dependency resolution. An expression can therefore only see raw channels
//! and the display names of earlier definitions. A definition that cannot be
//! evaluated is recorded as skipped and the run continues.

use crate::align::align_and_combine;
use crate::config::{required_mode, GatingRule, SignalDefinition};
use crate::expression::Expr;
use crate::registry::DerivedRegistry;
use crate::source::RawChannels;
use crate::types::{Mode, Operand, Signal, SignalStats};
use std::fmt;

/// Why a definition produced no signal
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The definition only applies in another mode
    ModeGated { required: Mode, detected: Mode },
    /// An operand is neither a derived signal nor a loaded raw channel
    MissingSignal(String),
    InvalidExpression(String),
    /// Alignment or arithmetic produced no usable samples
    NumericFailure(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ModeGated { required, detected } => {
                write!(f, "requires mode {}, detected {}", required, detected)
            }
            SkipReason::MissingSignal(name) => write!(f, "missing signal: {}", name),
            SkipReason::InvalidExpression(msg) => write!(f, "invalid expression: {}", msg),
            SkipReason::NumericFailure(msg) => write!(f, "numeric failure: {}", msg),
        }
    }
}

/// Result of evaluating one definition
#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionOutcome {
    Evaluated(Signal),
    Skipped(SkipReason),
}

/// A definition that was skipped, kept for reporting
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedDefinition {
    pub metric: String,
    pub name: String,
    pub reason: SkipReason,
}

/// Everything one evaluation run produced
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub mode: Mode,
    pub registry: DerivedRegistry,
    pub skipped: Vec<SkippedDefinition>,
}

/// Evaluates definitions against the raw channels of one log
pub struct Evaluator<'a> {
    raw: &'a RawChannels,
    gating: &'a [GatingRule],
    mode: Mode,
}

impl<'a> Evaluator<'a> {
    pub fn new(raw: &'a RawChannels, mode: Mode) -> Self {
        Self {
            raw,
            gating: &[],
            mode,
        }
    }

    /// Builder method: apply a mode gating policy
    pub fn with_gating(mut self, gating: &'a [GatingRule]) -> Self {
        self.gating = gating;
        self
    }

    /// Evaluate all definitions in order
    pub fn evaluate(&self, definitions: &[SignalDefinition]) -> Evaluation {
        let mut registry = DerivedRegistry::new();
        let mut skipped = Vec::new();

        for definition in definitions {
            let name = definition.display_name();
            match self.evaluate_definition(definition, &registry) {
                DefinitionOutcome::Evaluated(signal) => {
                    log::debug!(
                        "Evaluated {} [{}]: min={} max={} delta={}",
                        signal.name,
                        signal.unit,
                        signal.stats.min,
                        signal.stats.max,
                        signal.stats.delta
                    );
                    registry.insert(signal);
                }
                DefinitionOutcome::Skipped(reason) => {
                    match &reason {
                        SkipReason::ModeGated { .. } => log::debug!("Skipping {}: {}", name, reason),
                        _ => log::warn!("Failed to evaluate {}: {}", name, reason),
                    }
                    skipped.push(SkippedDefinition {
                        metric: definition.metric.clone(),
                        name: name.to_string(),
                        reason,
                    });
                }
            }
        }

        log::info!(
            "Evaluated {} of {} signal definitions",
            registry.len(),
            definitions.len()
        );

        Evaluation {
            mode: self.mode,
            registry,
            skipped,
        }
    }

    /// Evaluate a single definition against the signals resolved so far
    pub fn evaluate_definition(
        &self,
        definition: &SignalDefinition,
        registry: &DerivedRegistry,
    ) -> DefinitionOutcome {
        let name = definition.display_name();

        if let Some(required) = required_mode(self.gating, name) {
            if required != self.mode {
                return DefinitionOutcome::Skipped(SkipReason::ModeGated {
                    required,
                    detected: self.mode,
                });
            }
        }

        let expr = match Expr::parse(&definition.signal) {
            Ok(expr) => expr,
            Err(e) => return DefinitionOutcome::Skipped(SkipReason::InvalidExpression(e.to_string())),
        };

        let (samples, timestamps, inherited_unit) = match &expr {
            Expr::Ident(ident) => {
                let Some(src) = self.lookup(ident, registry) else {
                    return DefinitionOutcome::Skipped(SkipReason::MissingSignal(ident.clone()));
                };
                (src.samples.to_vec(), src.timestamps.to_vec(), src.unit.to_string())
            }
            Expr::Binary { op, left, right } => {
                let (Some(lhs), Some(rhs)) = (self.lookup(left, registry), self.lookup(right, registry))
                else {
                    let missing = if self.lookup(left, registry).is_none() { left } else { right };
                    return DefinitionOutcome::Skipped(SkipReason::MissingSignal(missing.clone()));
                };
                let (samples, timestamps) =
                    align_and_combine(lhs.samples, lhs.timestamps, rhs.samples, rhs.timestamps, *op);
                if samples.is_empty() {
                    return DefinitionOutcome::Skipped(SkipReason::NumericFailure(format!(
                        "'{}' produced no samples",
                        expr
                    )));
                }
                (samples, timestamps, lhs.unit.to_string())
            }
        };

        let scale = definition.scale();
        let samples: Vec<f64> = if scale == 1.0 {
            samples
        } else {
            samples.into_iter().map(|v| v * scale).collect()
        };

        let Some(stats) = SignalStats::from_samples(&samples) else {
            return DefinitionOutcome::Skipped(SkipReason::NumericFailure("no samples".to_string()));
        };
        if !(stats.min.is_finite() && stats.max.is_finite()) {
            return DefinitionOutcome::Skipped(SkipReason::NumericFailure(
                "non-finite samples".to_string(),
            ));
        }

        DefinitionOutcome::Evaluated(Signal {
            metric: definition.metric.clone(),
            name: name.to_string(),
            unit: definition.unit_override.clone().unwrap_or(inherited_unit),
            timestamps,
            samples,
            stats,
        })
    }

    /// Derived signals first, then raw channels
    fn lookup<'r>(&'r self, name: &str, registry: &'r DerivedRegistry) -> Option<Operand<'r>> {
        registry
            .get(name)
            .map(Signal::as_operand)
            .or_else(|| self.raw.get(name).map(|raw| raw.as_operand()))
    }
}

/// Evaluate `definitions` in list order
pub fn evaluate(
    definitions: &[SignalDefinition],
    raw: &RawChannels,
    mode: Mode,
    gating: &[GatingRule],
) -> Evaluation {
    Evaluator::new(raw, mode).with_gating(gating).evaluate(definitions)
}
