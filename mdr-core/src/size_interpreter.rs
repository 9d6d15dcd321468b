//! Chooses, for each level, how many bit-planes to retrieve so the
//! reconstructed tensor meets a caller's error tolerance at minimum byte
//! cost. `spec.md` §4.6 names three retrieval-order variants; all three
//! implement the same [`SizeInterpreter`] trait so the Reconstructor can
//! swap between them without caring which one ran.
//!
//! Layout convention for `sizes`/`errors` (see `DESIGN.md` for why): index
//! `0` is the level's fixed side-data/header cost and its error with zero
//! planes retrieved; indices `1..=p_i` are the individual bit-plane costs
//! and the level's error after retrieving that many planes. Retrieving a
//! level's *first* plane therefore always pays `sizes[i][0] +
//! sizes[i][1]`, since no plane is usable without its side data.
//!
//! `spec.md` §4.6: "for negabinary, advance two bit-planes at a time" —
//! a negabinary digit only resolves to a definite sign/magnitude once its
//! paired digit is also known, so every retrieval step here advances a
//! level by [`plane_step`] planes at once rather than always by one.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::config::CodecKind;
use crate::error_est::ErrorEstimator;

#[derive(Clone, Debug, PartialEq)]
pub struct SizeSelection {
  /// Number of bit-planes retrieved per level (not counting the header).
  pub planes: Vec<usize>,
  pub total_bytes: usize,
  pub achieved_error: f64,
  pub tolerance_reached: bool,
}

/// Number of planes a single retrieval step advances a level by: one for
/// sign-magnitude, two for negabinary (`spec.md` §4.6).
pub fn plane_step(codec: CodecKind) -> usize {
  match codec {
    CodecKind::SignMagnitude => 1,
    CodecKind::Negabinary => 2,
  }
}

pub trait SizeInterpreter: Send + Sync {
  /// `step` is the number of planes one retrieval increment advances a
  /// level by; see [`plane_step`].
  fn select(
    &self,
    sizes: &[Vec<usize>],
    errors: &[Vec<f64>],
    estimator: &dyn ErrorEstimator,
    tolerance: f64,
    step: usize,
  ) -> SizeSelection;
}

fn global_error(errors: &[Vec<f64>], planes: &[usize], estimator: &dyn ErrorEstimator) -> f64 {
  let level_errors: Vec<f64> = errors
    .iter()
    .zip(planes)
    .map(|(level_errors, &p)| level_errors[p])
    .collect();
  estimator.estimate(&level_errors)
}

/// Cost of advancing level `i` from `from` planes to `to` planes, paying
/// the header alongside the first plane ever retrieved.
fn step_cost(sizes: &[Vec<usize>], i: usize, from: usize, to: usize) -> usize {
  if from == 0 {
    sizes[i][0] + sizes[i][1..=to].iter().sum::<usize>()
  } else {
    sizes[i][from + 1..=to].iter().sum::<usize>()
  }
}

fn finish(sizes: &[Vec<usize>], errors: &[Vec<f64>], planes: Vec<usize>, estimator: &dyn ErrorEstimator, tolerance: f64) -> SizeSelection {
  let achieved_error = global_error(errors, &planes, estimator);
  let total_bytes = planes
    .iter()
    .enumerate()
    .map(|(i, &p)| if p == 0 { 0 } else { step_cost(sizes, i, 0, p) })
    .sum();
  SizeSelection {
    planes,
    total_bytes,
    achieved_error,
    tolerance_reached: achieved_error <= tolerance,
  }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
  ratio: f64,
  level: usize,
}

impl Eq for Candidate {}
impl PartialOrd for Candidate {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}
impl Ord for Candidate {
  fn cmp(&self, other: &Self) -> Ordering {
    self.ratio.partial_cmp(&other.ratio).unwrap_or(Ordering::Equal)
  }
}

/// Greedily retrieves whichever level's next bit-plane yields the largest
/// per-level error reduction per byte, until the globally combined error
/// meets `tolerance` or every level is exhausted.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyInterpreter;

impl SizeInterpreter for GreedyInterpreter {
  fn select(
    &self,
    sizes: &[Vec<usize>],
    errors: &[Vec<f64>],
    estimator: &dyn ErrorEstimator,
    tolerance: f64,
    step: usize,
  ) -> SizeSelection {
    let step = step.max(1);
    let n_levels = sizes.len();
    let mut planes = vec![0usize; n_levels];
    let max_planes: Vec<usize> = sizes.iter().map(|s| s.len() - 1).collect();

    let step_ratio = |i: usize, from: usize| -> f64 {
      let to = from + step;
      let delta_err = errors[i][from] - errors[i][to];
      let cost = step_cost(sizes, i, from, to) as f64;
      if cost <= 0.0 {
        0.0
      } else {
        delta_err / cost
      }
    };

    let mut heap: BinaryHeap<Candidate> = BinaryHeap::new();
    for i in 0..n_levels {
      if max_planes[i] >= step {
        heap.push(Candidate { ratio: step_ratio(i, 0), level: i });
      }
    }

    if global_error(errors, &planes, estimator) <= tolerance {
      return finish(sizes, errors, planes, estimator, tolerance);
    }

    while let Some(Candidate { level: i, .. }) = heap.pop() {
      planes[i] += step;
      if global_error(errors, &planes, estimator) <= tolerance {
        break;
      }
      if planes[i] + step <= max_planes[i] {
        heap.push(Candidate { ratio: step_ratio(i, planes[i]), level: i });
      }
    }

    finish(sizes, errors, planes, estimator, tolerance)
  }
}

/// Advances every not-yet-exhausted level by exactly one plane per round.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoundRobinInterpreter;

impl SizeInterpreter for RoundRobinInterpreter {
  fn select(
    &self,
    sizes: &[Vec<usize>],
    errors: &[Vec<f64>],
    estimator: &dyn ErrorEstimator,
    tolerance: f64,
    step: usize,
  ) -> SizeSelection {
    let step = step.max(1);
    let n_levels = sizes.len();
    let mut planes = vec![0usize; n_levels];
    let max_planes: Vec<usize> = sizes.iter().map(|s| s.len() - 1).collect();

    loop {
      if global_error(errors, &planes, estimator) <= tolerance {
        break;
      }
      let mut advanced_any = false;
      for i in 0..n_levels {
        if planes[i] + step <= max_planes[i] {
          planes[i] += step;
          advanced_any = true;
          if global_error(errors, &planes, estimator) <= tolerance {
            break;
          }
        }
      }
      if !advanced_any {
        break;
      }
    }

    finish(sizes, errors, planes, estimator, tolerance)
  }
}

/// Exhausts level 0's bit-planes before touching level 1, and so on —
/// the simplest possible retrieval order, used as a baseline to compare
/// [`GreedyInterpreter`] against.
#[derive(Clone, Copy, Debug, Default)]
pub struct InOrderInterpreter;

impl SizeInterpreter for InOrderInterpreter {
  fn select(
    &self,
    sizes: &[Vec<usize>],
    errors: &[Vec<f64>],
    estimator: &dyn ErrorEstimator,
    tolerance: f64,
    step: usize,
  ) -> SizeSelection {
    let step = step.max(1);
    let n_levels = sizes.len();
    let mut planes = vec![0usize; n_levels];
    let max_planes: Vec<usize> = sizes.iter().map(|s| s.len() - 1).collect();

    'outer: for i in 0..n_levels {
      while planes[i] + step <= max_planes[i] {
        if global_error(errors, &planes, estimator) <= tolerance {
          break 'outer;
        }
        planes[i] += step;
      }
      if global_error(errors, &planes, estimator) <= tolerance {
        break;
      }
    }

    finish(sizes, errors, planes, estimator, tolerance)
  }
}
