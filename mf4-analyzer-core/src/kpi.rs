//! Mode-gated KPI computation
//!
//! Each function returns a list of [`KpiEntry`] values and is safe to call
//! regardless of mode: a function whose mode does not match, or whose input
//! signals are absent or too short, returns an empty list.

use crate::config::AnalyzerConfig;
use crate::registry::DerivedRegistry;
use crate::types::{round2, KpiEntry, Mode};

pub const CHARGING_TIME: &str = "Charging Time";
pub const CHARGING_POWER_AVG: &str = "Charging Power Avg";
pub const DISCHARGE_ACTIVE_DURATION: &str = "DischargeActive Duration";
pub const DISCHARGE_ACTIVE_POWER_AVG: &str = "DischargeActive Power Avg";
pub const POWER_RMS: &str = "Power RMS";

/// Discrete derivative of `ys` over `xs`
///
/// Central differences inside, one-sided differences at both ends. A zero
/// time step yields a zero derivative.
pub fn gradient(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = ys.len().min(xs.len());
    if n < 2 {
        return vec![0.0; n];
    }
    let slope = |i: usize, j: usize| {
        let dx = xs[j] - xs[i];
        if dx == 0.0 {
            0.0
        } else {
            (ys[j] - ys[i]) / dx
        }
    };
    (0..n)
        .map(|i| match i {
            0 => slope(0, 1),
            i if i == n - 1 => slope(n - 2, n - 1),
            i => slope(i - 1, i + 1),
        })
        .collect()
}

/// Charging duration from the state-of-charge rise
///
/// Time between the first and the last sample whose SoC derivative exceeds
/// `threshold`. Zero for fewer than three samples or fewer than two rising
/// samples.
pub fn compute_charging_time(timestamps: &[f64], soc: &[f64], threshold: f64) -> f64 {
    if soc.len() < 3 || timestamps.len() < soc.len() {
        return 0.0;
    }
    let rising: Vec<usize> = gradient(timestamps, soc)
        .iter()
        .enumerate()
        .filter(|(_, d)| **d > threshold)
        .map(|(i, _)| i)
        .collect();

    match (rising.first(), rising.last()) {
        (Some(&start), Some(&end)) if rising.len() >= 2 => timestamps[end] - timestamps[start],
        _ => 0.0,
    }
}

/// Drop non-finite pairs and order by time
fn sanitize(timestamps: &[f64], samples: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut pairs: Vec<(f64, f64)> = timestamps
        .iter()
        .zip(samples)
        .filter(|(t, v)| t.is_finite() && v.is_finite())
        .map(|(&t, &v)| (t, v))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    pairs.into_iter().unzip()
}

/// Time-weighted statistics over the intervals whose starting sample
/// satisfies `active`: `(total duration, weighted mean)`
fn weighted_active(
    timestamps: &[f64],
    samples: &[f64],
    active: impl Fn(f64) -> bool,
) -> Option<(f64, f64)> {
    let mut duration = 0.0;
    let mut weighted = 0.0;
    let mut any = false;

    for (i, window) in timestamps.windows(2).enumerate() {
        let value = samples[i];
        if active(value) {
            let dt = window[1] - window[0];
            duration += dt;
            weighted += value * dt;
            any = true;
        }
    }

    if !any || duration <= 0.0 {
        return None;
    }
    Some((duration, weighted / duration))
}

/// Charging time and average charging power; empty unless charging
pub fn compute_charging_metrics(
    registry: &DerivedRegistry,
    mode: Mode,
    config: &AnalyzerConfig,
) -> Vec<KpiEntry> {
    if mode != Mode::Charging {
        return Vec::new();
    }
    let Some(soc) = registry.get(&config.roles.state_of_charge) else {
        return Vec::new();
    };
    if soc.samples.len() < 3 || soc.timestamps.len() < 3 {
        return Vec::new();
    }

    let (ts, soc) = sanitize(&soc.timestamps, &soc.samples);
    if ts.len() < 3 {
        return Vec::new();
    }

    let charge_time = compute_charging_time(&ts, &soc, config.kpi.soc_derivative);
    let mut out = vec![KpiEntry::new(CHARGING_TIME, round2(charge_time), "s")];

    if let Some(power) = registry.get(&config.roles.power) {
        let (tp, p) = sanitize(&power.timestamps, &power.samples);
        let threshold = config.kpi.charge_power_kw;
        if tp.len() >= 2 {
            if let Some((_, avg)) = weighted_active(&tp, &p, |v| v < threshold) {
                out.push(KpiEntry::new(CHARGING_POWER_AVG, round2(avg), "kW"));
            }
        }
    }

    out
}

/// Active discharge duration and average power; empty unless discharging
pub fn compute_discharge_metrics(
    registry: &DerivedRegistry,
    mode: Mode,
    config: &AnalyzerConfig,
) -> Vec<KpiEntry> {
    if mode != Mode::Discharging {
        return Vec::new();
    }
    let Some(power) = registry.get(&config.roles.power) else {
        return Vec::new();
    };
    let (t, p) = sanitize(&power.timestamps, &power.samples);
    if t.len() < 2 {
        return Vec::new();
    }

    let threshold = config.kpi.discharge_power_kw;
    match weighted_active(&t, &p, |v| v > threshold) {
        Some((active_time, avg_power)) => vec![
            KpiEntry::new(DISCHARGE_ACTIVE_DURATION, round2(active_time), "s"),
            KpiEntry::new(DISCHARGE_ACTIVE_POWER_AVG, round2(avg_power), "kW"),
        ],
        None => Vec::new(),
    }
}

/// Root-mean-square of all finite power samples, in any mode
pub fn compute_rms_power(registry: &DerivedRegistry, config: &AnalyzerConfig) -> Vec<KpiEntry> {
    let Some(power) = registry.get(&config.roles.power) else {
        return Vec::new();
    };
    let finite: Vec<f64> = power.samples.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Vec::new();
    }
    let mean_square = finite.iter().map(|v| v * v).sum::<f64>() / finite.len() as f64;
    vec![KpiEntry::new(POWER_RMS, round2(mean_square.sqrt()), "kW")]
}

/// All KPIs for a run: RMS first, then the mode-specific ones
pub fn compute_kpis(registry: &DerivedRegistry, mode: Mode, config: &AnalyzerConfig) -> Vec<KpiEntry> {
    let mut kpis = compute_rms_power(registry, config);
    kpis.extend(compute_charging_metrics(registry, mode, config));
    kpis.extend(compute_discharge_metrics(registry, mode, config));
    kpis
}
