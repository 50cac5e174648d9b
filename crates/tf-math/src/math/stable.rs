//! Numerically stable summation and missing-aware means.
//!
//! NaN is the "missing" marker throughout: sums and means skip it, and a
//! mean with no defined contributions is `None` rather than NaN.

use serde::{Deserialize, Serialize};

/// Compensated (Neumaier) running sum.
///
/// Keeps a separate compensation term so that adding many values of
/// different magnitudes does not lose the small ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NeumaierSum {
    sum: f64,
    compensation: f64,
}

impl NeumaierSum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value. NaN inputs are ignored.
    pub fn add(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        let t = self.sum + value;
        if !t.is_finite() {
            self.sum = t;
            return;
        }
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    pub fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Compensated sum of all non-NaN values. Returns 0.0 for empty input.
pub fn neumaier_sum(values: &[f64]) -> f64 {
    let mut acc = NeumaierSum::new();
    for v in values {
        acc.add(*v);
    }
    acc.value()
}

/// Running arithmetic mean over non-NaN values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeanAccumulator {
    sum: NeumaierSum,
    count: u64,
}

impl MeanAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value. NaN counts as missing and is skipped.
    pub fn push(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.sum.add(value);
        self.count += 1;
    }

    /// Number of defined values seen.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean of the defined values, or `None` when there are none.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum.value() / self.count as f64)
    }
}

/// Mean over non-NaN values; `None` for empty or all-NaN input.
pub fn nan_mean(values: &[f64]) -> Option<f64> {
    let mut acc = MeanAccumulator::new();
    for v in values {
        acc.push(*v);
    }
    acc.mean()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn neumaier_sum_basic() {
        assert!(approx_eq(neumaier_sum(&[1.0, 2.0, 3.5]), 6.5, 1e-12));
    }

    #[test]
    fn neumaier_sum_empty_is_zero() {
        assert_eq!(neumaier_sum(&[]), 0.0);
    }

    #[test]
    fn neumaier_sum_recovers_small_terms() {
        // Naive summation returns 0.0 here.
        let out = neumaier_sum(&[1.0, 1e100, 1.0, -1e100]);
        assert_eq!(out, 2.0);
    }

    #[test]
    fn neumaier_sum_skips_nan() {
        assert!(approx_eq(neumaier_sum(&[1.0, f64::NAN, 2.0]), 3.0, 1e-12));
    }

    #[test]
    fn nan_mean_basic() {
        assert_eq!(nan_mean(&[2.0, 4.0]), Some(3.0));
    }

    #[test]
    fn nan_mean_missing() {
        assert_eq!(nan_mean(&[]), None);
        assert_eq!(nan_mean(&[f64::NAN, f64::NAN]), None);
    }

    #[test]
    fn nan_mean_ignores_nan_in_denominator() {
        assert_eq!(nan_mean(&[f64::NAN, 6.0, 2.0]), Some(4.0));
    }

    #[test]
    fn mean_accumulator_counts_defined_values() {
        let mut acc = MeanAccumulator::new();
        acc.push(1.0);
        acc.push(f64::NAN);
        acc.push(-3.0);
        assert_eq!(acc.count(), 2);
        assert_eq!(acc.mean(), Some(-1.0));
    }

    #[test]
    fn infinities_propagate() {
        assert_eq!(neumaier_sum(&[1.0, f64::INFINITY]), f64::INFINITY);
    }
}
