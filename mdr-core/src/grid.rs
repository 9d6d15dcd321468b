use crate::errors::{MdrError, MdrResult};
use crate::types::{num_elements, Dims};

/// Computes the monotonically growing sequence of level grids
/// `G0 subset G1 subset ... subset GL = D`, per `spec.md` §3:
/// `Gi[j] = ((D[j]-1) >> (L-i)) + 1`.
pub fn level_grids(dims: Dims, target_level: usize) -> Vec<Dims> {
  (0..=target_level)
    .map(|i| {
      let shift = target_level - i;
      [
        ((dims[0] - 1) >> shift) + 1,
        ((dims[1] - 1) >> shift) + 1,
        ((dims[2] - 1) >> shift) + 1,
      ]
    })
    .collect()
}

/// Number of coefficients newly introduced at level `i`: `|Gi| - |Gi-1|`,
/// with `G-1` taken to be empty (`n0 = |G0|`).
pub fn level_counts(level_grids: &[Dims]) -> Vec<usize> {
  let mut counts = Vec::with_capacity(level_grids.len());
  let mut prev = 0usize;
  for g in level_grids {
    let n = num_elements(*g);
    counts.push(n - prev);
    prev = n;
  }
  counts
}

/// The maximum level such that `2^level` does not exceed the smallest
/// input dimension, mirroring the original refactorer's
/// `max_level = log2(min(dims))` clamp.
pub fn max_supported_level(dims: Dims) -> usize {
  let min_dim = *dims.iter().min().unwrap();
  if min_dim <= 1 {
    0
  } else {
    (usize::BITS - 1 - min_dim.leading_zeros()) as usize
  }
}

pub fn validate_dims(dims: Dims) -> MdrResult<()> {
  if dims.iter().any(|&d| d == 0) {
    return Err(MdrError::precondition(format!(
      "dims must be non-zero in every axis, got {:?}",
      dims
    )));
  }
  Ok(())
}
