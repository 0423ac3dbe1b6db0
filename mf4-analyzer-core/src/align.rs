//! Time-base alignment of two signals
//!
//! Two channels recorded by different ECUs rarely share a time base. Before
//! an elementwise operation the series with more samples is linearly
//! interpolated onto the timestamps of the one with fewer samples. With equal
//! sample counts the right operand's timestamps are the base.
//!
//! NaN samples pass through to the result; only infinite results fail.

use std::fmt;

/// Smallest denominator magnitude used by division
pub const DIVISION_EPSILON: f64 = 1e-6;

/// Elementwise binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    /// Operator symbol as written in expressions
    pub fn symbol(&self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }

    fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / clamp_denominator(b),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Errors raised while aligning two series
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlignError {
    #[error("empty input series")]
    Empty,

    #[error("sample/timestamp length mismatch ({samples} samples, {timestamps} timestamps)")]
    LengthMismatch { samples: usize, timestamps: usize },

    #[error("at least two points are needed to interpolate, got {0}")]
    TooFewPoints(usize),

    #[error("timestamps are not monotonic at index {0}")]
    NotMonotonic(usize),

    #[error("infinite result at index {0}")]
    Infinite(usize),
}

/// Output of a successful alignment
#[derive(Debug, Clone, PartialEq)]
pub struct Aligned {
    pub samples: Vec<f64>,
    pub timestamps: Vec<f64>,
}

fn clamp_denominator(b: f64) -> f64 {
    if b.abs() >= DIVISION_EPSILON {
        b
    } else if b < 0.0 {
        -DIVISION_EPSILON
    } else {
        DIVISION_EPSILON
    }
}

fn check_series(samples: &[f64], timestamps: &[f64]) -> Result<(), AlignError> {
    if samples.is_empty() || timestamps.is_empty() {
        return Err(AlignError::Empty);
    }
    if samples.len() != timestamps.len() {
        return Err(AlignError::LengthMismatch {
            samples: samples.len(),
            timestamps: timestamps.len(),
        });
    }
    Ok(())
}

/// Linear interpolation of `(xs, ys)` at `x`, extrapolating past both ends
fn interpolate_at(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len();
    // Segment index: first point whose x exceeds the query, clamped to an
    // interior segment so the end segments extrapolate.
    let upper = xs.partition_point(|&xi| xi <= x).clamp(1, n - 1);
    let (x0, x1) = (xs[upper - 1], xs[upper]);
    let (y0, y1) = (ys[upper - 1], ys[upper]);
    if x1 == x0 {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Resample `(timestamps, samples)` onto `base`
pub fn interpolate_onto(
    timestamps: &[f64],
    samples: &[f64],
    base: &[f64],
) -> Result<Vec<f64>, AlignError> {
    check_series(samples, timestamps)?;
    if timestamps.len() < 2 {
        return Err(AlignError::TooFewPoints(timestamps.len()));
    }
    if let Some(i) = timestamps.windows(2).position(|w| !(w[1] >= w[0])) {
        return Err(AlignError::NotMonotonic(i + 1));
    }
    Ok(base
        .iter()
        .map(|&x| interpolate_at(timestamps, samples, x))
        .collect())
}

/// Align two series onto the shorter time base and combine them
pub fn try_align_and_combine(
    a_samples: &[f64],
    a_timestamps: &[f64],
    b_samples: &[f64],
    b_timestamps: &[f64],
    op: BinaryOp,
) -> Result<Aligned, AlignError> {
    check_series(a_samples, a_timestamps)?;
    check_series(b_samples, b_timestamps)?;

    let (a, b, base) = if a_timestamps == b_timestamps {
        (a_samples.to_vec(), b_samples.to_vec(), b_timestamps)
    } else if a_timestamps.len() < b_timestamps.len() {
        let b_resampled = interpolate_onto(b_timestamps, b_samples, a_timestamps)?;
        (a_samples.to_vec(), b_resampled, a_timestamps)
    } else {
        let a_resampled = interpolate_onto(a_timestamps, a_samples, b_timestamps)?;
        (a_resampled, b_samples.to_vec(), b_timestamps)
    };

    let samples = a
        .iter()
        .zip(&b)
        .map(|(&x, &y)| op.apply(x, y))
        .collect::<Vec<_>>();

    if let Some(i) = samples.iter().position(|v| v.is_infinite()) {
        return Err(AlignError::Infinite(i));
    }

    Ok(Aligned {
        samples,
        timestamps: base.to_vec(),
    })
}

/// Soft-failing alignment: logs the failure and returns two empty vectors
///
/// Returns `(samples, timestamps)`. An empty result tells the caller the
/// operation could not be carried out.
pub fn align_and_combine(
    a_samples: &[f64],
    a_timestamps: &[f64],
    b_samples: &[f64],
    b_timestamps: &[f64],
    op: BinaryOp,
) -> (Vec<f64>, Vec<f64>) {
    match try_align_and_combine(a_samples, a_timestamps, b_samples, b_timestamps, op) {
        Ok(aligned) => (aligned.samples, aligned.timestamps),
        Err(e) => {
            log::error!("Alignment failed for op '{}': {}", op, e);
            (Vec::new(), Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{} != {}", a, e);
        }
    }

    #[test]
    fn test_shared_time_base() {
        let ts = [0.0, 1.0, 2.0];
        let (samples, timestamps) =
            align_and_combine(&[5.0, 6.0, 7.0], &ts, &[1.0, 2.0, 3.0], &ts, BinaryOp::Sub);
        assert_eq!(samples, vec![4.0, 4.0, 4.0]);
        assert_eq!(timestamps, ts.to_vec());
    }

    #[test]
    fn test_shorter_series_is_the_base() {
        // B has fewer samples, so A is resampled onto B's timestamps
        let a_ts = [0.0, 1.0, 2.0, 3.0, 4.0];
        let a = [0.0, 10.0, 20.0, 30.0, 40.0];
        let b_ts = [0.5, 2.5];
        let b = [1.0, 1.0];

        let (samples, timestamps) = align_and_combine(&a, &a_ts, &b, &b_ts, BinaryOp::Add);
        assert_eq!(timestamps, b_ts.to_vec());
        assert_close(&samples, &[6.0, 26.0]);

        // Symmetric case: A is the short one
        let (samples, timestamps) = align_and_combine(&b, &b_ts, &a, &a_ts, BinaryOp::Mul);
        assert_eq!(timestamps.len(), 2);
        assert_close(&samples, &[5.0, 25.0]);
    }

    #[test]
    fn test_equal_lengths_use_right_time_base() {
        // Same sample count, offset phase: A is resampled onto B's timestamps
        let a_ts = [0.0, 1.0, 2.0];
        let a = [0.0, 10.0, 20.0];
        let b_ts = [0.5, 1.5, 2.5];
        let b = [1.0, 1.0, 1.0];

        let (samples, timestamps) = align_and_combine(&a, &a_ts, &b, &b_ts, BinaryOp::Sub);
        assert_eq!(timestamps, b_ts.to_vec());
        assert_close(&samples, &[4.0, 14.0, 24.0]);
    }

    #[test]
    fn test_nan_samples_pass_through() {
        let ts = [0.0, 1.0, 2.0, 3.0];
        let (samples, timestamps) =
            align_and_combine(&[400.0, f64::NAN, 400.0, 400.0], &ts, &[10.0; 4], &ts, BinaryOp::Mul);
        assert_eq!(timestamps, ts.to_vec());
        assert_eq!(samples.len(), 4);
        assert!(samples[1].is_nan());
        assert_eq!(samples[0], 4000.0);
        assert_eq!(samples[3], 4000.0);

        // A NaN in the resampled series only affects the segments touching it
        let (samples, _) = align_and_combine(
            &[1.0, 1.0],
            &[0.5, 2.5],
            &[0.0, f64::NAN, 2.0, 3.0],
            &[0.0, 1.0, 2.0, 3.0],
            BinaryOp::Add,
        );
        assert!(samples[0].is_nan());
        assert_close(&samples[1..], &[3.5]);
    }

    #[test]
    fn test_infinite_result_fails() {
        let ts = [0.0, 1.0];
        let err = try_align_and_combine(&[f64::INFINITY, 1.0], &ts, &[1.0, 1.0], &ts, BinaryOp::Mul);
        assert_eq!(err, Err(AlignError::Infinite(0)));
    }

    #[test]
    fn test_output_length_is_min_length() {
        let a_ts: Vec<f64> = (0..7).map(|i| i as f64 * 0.3).collect();
        let a: Vec<f64> = a_ts.iter().map(|t| t * 2.0).collect();
        let b_ts: Vec<f64> = (0..4).map(|i| i as f64 * 0.7).collect();
        let b = vec![1.0; 4];

        for op in [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::Div] {
            let (samples, timestamps) = align_and_combine(&a, &a_ts, &b, &b_ts, op);
            assert_eq!(timestamps.len(), 4);
            assert_eq!(samples.len(), 4);
        }
    }

    #[test]
    fn test_extrapolation_at_boundaries() {
        let long_ts = [1.0, 2.0, 3.0];
        let long = [10.0, 20.0, 30.0];
        let short_ts = [0.0, 4.0];
        let zeros = [0.0, 0.0];

        let (samples, _) = align_and_combine(&zeros, &short_ts, &long, &long_ts, BinaryOp::Add);
        assert_close(&samples, &[0.0, 40.0]);
    }

    #[test]
    fn test_division_by_zero_is_clamped() {
        let ts = [0.0, 1.0, 2.0];
        let (samples, _) =
            align_and_combine(&[1.0, 2.0, -3.0], &ts, &[0.0, 2.0, -0.0], &ts, BinaryOp::Div);
        assert_eq!(samples.len(), 3);
        assert!(samples.iter().all(|v| v.is_finite()));
        assert_eq!(samples[0], 1.0 / DIVISION_EPSILON);
        assert_eq!(samples[1], 1.0);

        // Negative denominators keep their sign
        let (samples, _) = align_and_combine(&[1.0], &[0.0], &[-1e-9], &[0.0], BinaryOp::Div);
        assert_eq!(samples, vec![-1.0 / DIVISION_EPSILON]);
    }

    #[test]
    fn test_failures_return_empty() {
        // Empty input
        let (samples, timestamps) = align_and_combine(&[], &[], &[1.0], &[0.0], BinaryOp::Add);
        assert!(samples.is_empty() && timestamps.is_empty());

        // A single-point series still works as the base
        let (samples, timestamps) =
            align_and_combine(&[1.0, 2.0], &[0.0, 1.0], &[5.0], &[0.5], BinaryOp::Add);
        assert_eq!(samples, vec![6.5]);
        assert_eq!(timestamps, vec![0.5]);

        let (samples, _) =
            align_and_combine(&[5.0], &[0.5], &[1.0, 2.0, 3.0], &[0.0, 1.0, 2.0], BinaryOp::Sub);
        assert_eq!(samples, vec![3.5]);

        // Mismatched lengths
        let err = try_align_and_combine(&[1.0, 2.0], &[0.0], &[1.0], &[0.0], BinaryOp::Add);
        assert!(matches!(err, Err(AlignError::LengthMismatch { .. })));
    }

    #[test]
    fn test_non_monotonic_timestamps_fail() {
        let err = try_align_and_combine(
            &[1.0],
            &[0.0],
            &[1.0, 2.0, 3.0],
            &[0.0, 2.0, 1.0],
            BinaryOp::Add,
        );
        assert_eq!(err, Err(AlignError::NotMonotonic(2)));
    }
}
