//! Error collection and estimation.
//!
//! Two distinct concerns, kept as separate traits per `spec.md` §4.4/4.5:
//! an [`ErrorCollector`] reduces a level's pointwise reconstruction errors
//! down to one number (max or mean-squared); an [`ErrorEstimator`] then
//! combines those per-level numbers into a single global error figure the
//! Size Interpreter can compare against the caller's tolerance.

use crate::types::Float;

/// Reduces pointwise errors for one level down to a single scalar.
pub trait ErrorCollector: Send + Sync {
  fn accumulate(&self, diff: f64) -> f64;
  fn combine(&self, accumulated: &[f64]) -> f64;

  /// Convenience: collects directly from an original/reconstructed pair.
  fn collect<F: Float>(&self, original: &[F], reconstructed: &[F]) -> f64 {
    let accumulated: Vec<f64> = original
      .iter()
      .zip(reconstructed)
      .map(|(a, b)| self.accumulate(a.to_f64() - b.to_f64()))
      .collect();
    self.combine(&accumulated)
  }
}

/// `max |a - b|` over a level's coefficients.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaxErrorCollector;

impl ErrorCollector for MaxErrorCollector {
  fn accumulate(&self, diff: f64) -> f64 {
    diff.abs()
  }

  fn combine(&self, accumulated: &[f64]) -> f64 {
    accumulated.iter().copied().fold(0.0, f64::max)
  }
}

/// `sum (a - b)^2` over a level's coefficients (unnormalized squared
/// error; normalizing by count is left to the caller, since the Size
/// Interpreter sums across levels before normalizing once at the end).
#[derive(Clone, Copy, Debug, Default)]
pub struct SquaredErrorCollector;

impl ErrorCollector for SquaredErrorCollector {
  fn accumulate(&self, diff: f64) -> f64 {
    diff * diff
  }

  fn combine(&self, accumulated: &[f64]) -> f64 {
    accumulated.iter().sum()
  }
}

/// Combines per-level error contributions into one global figure that can
/// be compared directly against a caller-supplied tolerance.
pub trait ErrorEstimator: Send + Sync {
  /// Relative weight given to level `level` (0 = coarsest) out of
  /// `total_levels` total levels.
  fn weight(&self, level: usize, total_levels: usize) -> f64;

  /// Combines already-weighted per-level contributions (`weight(level) *
  /// level_error[level]`) into the final global error estimate.
  fn combine(&self, weighted_level_errors: &[f64]) -> f64;

  fn estimate(&self, level_errors: &[f64]) -> f64 {
    let total_levels = level_errors.len();
    let weighted: Vec<f64> = level_errors
      .iter()
      .enumerate()
      .map(|(level, &err)| self.weight(level, total_levels) * err)
      .collect();
    self.combine(&weighted)
  }
}

/// `L-infinity`: the global error is simply the worst per-level max-error,
/// every level weighted equally.
#[derive(Clone, Copy, Debug, Default)]
pub struct LInfEstimator;

impl ErrorEstimator for LInfEstimator {
  fn weight(&self, _level: usize, _total_levels: usize) -> f64 {
    1.0
  }

  fn combine(&self, weighted_level_errors: &[f64]) -> f64 {
    weighted_level_errors.iter().copied().fold(0.0, f64::max)
  }
}

/// A Sobolev-`s` (negative) norm: per-level squared errors are weighted by
/// `2^(2*s*level)` before being summed and square-rooted, so the estimator
/// penalizes error at finer levels (higher apparent frequency) more
/// heavily as `s` grows, per `spec.md` §4.5.
#[derive(Clone, Copy, Debug)]
pub struct SobolevEstimator {
  pub s: f64,
}

impl Default for SobolevEstimator {
  fn default() -> Self {
    Self { s: 0.0 }
  }
}

impl ErrorEstimator for SobolevEstimator {
  fn weight(&self, level: usize, _total_levels: usize) -> f64 {
    2f64.powf(2.0 * self.s * level as f64)
  }

  fn combine(&self, weighted_level_errors: &[f64]) -> f64 {
    weighted_level_errors.iter().sum::<f64>().sqrt()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_max_error_collector() {
    let original = [1.0f64, 2.0, 3.0];
    let reconstructed = [1.1f64, 1.8, 3.0];
    let err = MaxErrorCollector.collect(&original, &reconstructed);
    assert!((err - 0.2).abs() < 1e-12);
  }

  #[test]
  fn test_squared_error_collector() {
    let original = [0.0f64, 0.0];
    let reconstructed = [1.0f64, 2.0];
    let err = SquaredErrorCollector.collect(&original, &reconstructed);
    assert!((err - 5.0).abs() < 1e-12);
  }

  #[test]
  fn test_linf_estimator_takes_worst_level() {
    let errors = [0.1, 0.5, 0.2];
    assert!((LInfEstimator.estimate(&errors) - 0.5).abs() < 1e-12);
  }

  #[test]
  fn test_sobolev_zero_s_is_plain_l2() {
    let estimator = SobolevEstimator { s: 0.0 };
    let errors = [1.0, 4.0];
    // weight = 1 for every level when s = 0
    assert!((estimator.estimate(&errors) - 5f64.sqrt()).abs() < 1e-12);
  }

  #[test]
  fn test_sobolev_positive_s_penalizes_finer_levels() {
    let estimator = SobolevEstimator { s: 1.0 };
    let same_error_each_level = [1.0, 1.0, 1.0];
    let weighted_level2 = estimator.weight(2, 3);
    let weighted_level0 = estimator.weight(0, 3);
    assert!(weighted_level2 > weighted_level0);
    assert!(estimator.estimate(&same_error_each_level) > LInfEstimator.estimate(&same_error_each_level));
  }
}
