//! Operating mode detection
//!
//! The mode compares the first and last state-of-charge samples only;
//! intermediate excursions are ignored.

use crate::types::Mode;

/// Classify a session from its state-of-charge samples
pub fn detect_mode(state_of_charge: &[f64]) -> Mode {
    let (first, last) = match (state_of_charge.first(), state_of_charge.last()) {
        (Some(first), Some(last)) if state_of_charge.len() >= 2 => (*first, *last),
        _ => return Mode::Idle,
    };

    if first > last {
        Mode::Discharging
    } else if last > first {
        Mode::Charging
    } else {
        Mode::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_classification() {
        assert_eq!(detect_mode(&[50.0, 80.0]), Mode::Charging);
        assert_eq!(detect_mode(&[80.0, 50.0]), Mode::Discharging);
        assert_eq!(detect_mode(&[50.0]), Mode::Idle);
        assert_eq!(detect_mode(&[50.0, 50.0]), Mode::Idle);
        assert_eq!(detect_mode(&[]), Mode::Idle);
    }

    #[test]
    fn test_intermediate_samples_ignored() {
        // Dips to 10% but ends higher than it started
        assert_eq!(detect_mode(&[40.0, 10.0, 90.0, 41.0]), Mode::Charging);
        assert_eq!(detect_mode(&[40.0, 95.0, 40.0]), Mode::Idle);
    }
}
