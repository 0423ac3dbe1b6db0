//! Derived-signal registry
//!
//! Accumulates evaluated signals for one run. The registry is at once the
//! flat result list (definition order), the name lookup table for later
//! expressions, and the metric-group map used for presentation.

use crate::types::Signal;
use std::collections::HashMap;

/// Signals of one metric group, in definition order
#[derive(Debug, Clone)]
pub struct MetricGroup<'a> {
    pub metric: &'a str,
    pub signals: Vec<&'a Signal>,
}

#[derive(Debug, Clone, Default)]
pub struct DerivedRegistry {
    signals: Vec<Signal>,
    by_name: HashMap<String, usize>,
    /// Metric label -> indices into `signals`, in first-seen order
    groups: Vec<(String, Vec<usize>)>,
}

impl DerivedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a signal. A later signal with the same name shadows the
    /// earlier one for lookups; both stay in the flat list.
    pub fn insert(&mut self, signal: Signal) {
        let index = self.signals.len();
        self.by_name.insert(signal.name.clone(), index);

        match self.groups.iter_mut().find(|(metric, _)| *metric == signal.metric) {
            Some((_, members)) => members.push(index),
            None => self.groups.push((signal.metric.clone(), vec![index])),
        }

        self.signals.push(signal);
    }

    /// Look up a signal by display name
    pub fn get(&self, name: &str) -> Option<&Signal> {
        self.by_name.get(name).map(|&i| &self.signals[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Flat result list in definition order
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Metric groups in first-seen order
    pub fn groups(&self) -> impl Iterator<Item = MetricGroup<'_>> {
        self.groups.iter().map(move |(metric, members)| MetricGroup {
            metric,
            signals: members.iter().map(|&i| &self.signals[i]).collect(),
        })
    }

    /// One metric group by label
    pub fn group(&self, metric: &str) -> Option<MetricGroup<'_>> {
        self.groups().find(|group| group.metric == metric)
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SignalStats;

    fn signal(metric: &str, name: &str, value: f64) -> Signal {
        Signal {
            metric: metric.into(),
            name: name.into(),
            unit: String::new(),
            timestamps: vec![0.0],
            samples: vec![value],
            stats: SignalStats::from_samples(&[value]).unwrap(),
        }
    }

    #[test]
    fn test_groups_keep_definition_order() {
        let mut registry = DerivedRegistry::new();
        registry.insert(signal("Temperature", "CellTempMax", 30.0));
        registry.insert(signal("Current", "PackCurrent", 10.0));
        registry.insert(signal("Temperature", "CellTempMin", 20.0));

        let groups: Vec<(String, Vec<String>)> = registry
            .groups()
            .map(|g| {
                (
                    g.metric.to_string(),
                    g.signals.iter().map(|s| s.name.clone()).collect(),
                )
            })
            .collect();
        assert_eq!(
            groups,
            vec![
                ("Temperature".to_string(), vec!["CellTempMax".to_string(), "CellTempMin".to_string()]),
                ("Current".to_string(), vec!["PackCurrent".to_string()]),
            ]
        );
        assert_eq!(registry.group("Current").unwrap().signals.len(), 1);
        assert!(registry.group("Power").is_none());
    }

    #[test]
    fn test_later_name_shadows_earlier() {
        let mut registry = DerivedRegistry::new();
        registry.insert(signal("A", "X", 1.0));
        registry.insert(signal("B", "X", 2.0));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("X").unwrap().samples, vec![2.0]);
        assert!(registry.contains("X"));
        assert!(!registry.contains("Y"));
    }
}
