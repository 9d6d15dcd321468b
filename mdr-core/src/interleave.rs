//! The level interleaver: separates coefficients introduced at a level from
//! those already present in the coarser grid, and scatters them back.
//!
//! Grounded in `examples/original_source/include/Interleaver/DirectInterleaver.hpp`:
//! a cell of the fine box is skipped only when *every* one of its
//! coordinates already falls inside the coarse box.

use crate::types::{Dims, Float};

/// A variant of level interleaving. Both variants traverse the fine box and
/// skip cells fully contained in the coarse box; they differ only in
/// traversal order, which must be identical between `interleave` and
/// `reposition`.
pub trait Interleaver<F: Float>: Send + Sync {
  /// Gathers the `n_fine - n_coarse` coefficients of `data` (laid out with
  /// the strides implied by `dims`) that lie in `fine` but not fully
  /// inside `coarse`, into `out`, in this variant's fixed traversal order.
  fn interleave(&self, data: &[F], dims: Dims, fine: Dims, coarse: Dims, out: &mut [F]);

  /// The exact inverse of `interleave`: scatters `buf` back into `data` at
  /// the positions it was gathered from. Cells not visited are left
  /// untouched.
  fn reposition(&self, buf: &[F], dims: Dims, fine: Dims, coarse: Dims, data: &mut [F]);
}

#[inline]
fn in_coarse_box(i: usize, j: usize, k: usize, coarse: Dims) -> bool {
  i < coarse[0] && j < coarse[1] && k < coarse[2]
}

#[inline]
fn strides(dims: Dims) -> (usize, usize) {
  (dims[1] * dims[2], dims[2])
}

/// Direct (row-major) traversal of the fine box.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectInterleaver;

impl<F: Float> Interleaver<F> for DirectInterleaver {
  fn interleave(&self, data: &[F], dims: Dims, fine: Dims, coarse: Dims, out: &mut [F]) {
    let (s0, s1) = strides(dims);
    let mut count = 0;
    for i in 0..fine[0] {
      for j in 0..fine[1] {
        for k in 0..fine[2] {
          if in_coarse_box(i, j, k, coarse) {
            continue;
          }
          out[count] = data[i * s0 + j * s1 + k];
          count += 1;
        }
      }
    }
  }

  fn reposition(&self, buf: &[F], dims: Dims, fine: Dims, coarse: Dims, data: &mut [F]) {
    let (s0, s1) = strides(dims);
    let mut count = 0;
    for i in 0..fine[0] {
      for j in 0..fine[1] {
        for k in 0..fine[2] {
          if in_coarse_box(i, j, k, coarse) {
            continue;
          }
          data[i * s0 + j * s1 + k] = buf[count];
          count += 1;
        }
      }
    }
  }
}

/// Morton (Z-order) traversal of the fine box, visiting the same set of
/// cells as [`DirectInterleaver`] but in bit-interleaved coordinate order.
#[derive(Clone, Copy, Debug, Default)]
pub struct SfcInterleaver;

impl SfcInterleaver {
  /// Morton codes, in increasing order, of every cell inside `fine` but
  /// not fully inside `coarse`.
  fn visiting_order(fine: Dims) -> Vec<[usize; 3]> {
    let mut cells = Vec::with_capacity(fine[0] * fine[1] * fine[2]);
    for i in 0..fine[0] {
      for j in 0..fine[1] {
        for k in 0..fine[2] {
          cells.push([i, j, k]);
        }
      }
    }
    cells.sort_by_key(|&[i, j, k]| morton_code(i, j, k));
    cells
  }
}

fn morton_code(i: usize, j: usize, k: usize) -> u128 {
  fn spread(mut x: u128) -> u128 {
    let mut result = 0u128;
    for bit in 0..42 {
      result |= (x & 1) << (bit * 3);
      x >>= 1;
    }
    result
  }
  spread(i as u128) | (spread(j as u128) << 1) | (spread(k as u128) << 2)
}

impl<F: Float> Interleaver<F> for SfcInterleaver {
  fn interleave(&self, data: &[F], dims: Dims, fine: Dims, coarse: Dims, out: &mut [F]) {
    let (s0, s1) = strides(dims);
    let mut count = 0;
    for [i, j, k] in Self::visiting_order(fine) {
      if in_coarse_box(i, j, k, coarse) {
        continue;
      }
      out[count] = data[i * s0 + j * s1 + k];
      count += 1;
    }
  }

  fn reposition(&self, buf: &[F], dims: Dims, fine: Dims, coarse: Dims, data: &mut [F]) {
    let (s0, s1) = strides(dims);
    let mut count = 0;
    for [i, j, k] in Self::visiting_order(fine) {
      if in_coarse_box(i, j, k, coarse) {
        continue;
      }
      data[i * s0 + j * s1 + k] = buf[count];
      count += 1;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn roundtrip<I: Interleaver<f64>>(interleaver: I, dims: Dims, fine: Dims, coarse: Dims) {
    let n: usize = dims[0] * dims[1] * dims[2];
    let original: Vec<f64> = (0..n).map(|x| x as f64).collect();
    let n_fine = fine[0] * fine[1] * fine[2];
    let n_coarse = coarse[0] * coarse[1] * coarse[2];
    let mut buf = vec![0.0; n_fine - n_coarse];
    interleaver.interleave(&original, dims, fine, coarse, &mut buf);

    let mut restored = vec![f64::NAN; n];
    // seed the coarse-box cells (untouched by reposition) with their
    // original values so we can assert the full array round-trips.
    for i in 0..coarse[0] {
      for j in 0..coarse[1] {
        for k in 0..coarse[2] {
          let idx = i * dims[1] * dims[2] + j * dims[2] + k;
          restored[idx] = original[idx];
        }
      }
    }
    interleaver.reposition(&buf, dims, fine, coarse, &mut restored);
    assert_eq!(restored, original);
  }

  #[test]
  fn test_direct_interleaver_roundtrip() {
    roundtrip(DirectInterleaver, [8, 8, 8], [8, 8, 8], [4, 4, 4]);
  }

  #[test]
  fn test_direct_interleaver_empty_coarse() {
    roundtrip(DirectInterleaver, [4, 4, 4], [4, 4, 4], [0, 0, 0]);
  }

  #[test]
  fn test_direct_interleaver_equal_boxes_writes_nothing() {
    let dims = [4, 4, 4];
    let mut out: Vec<f64> = vec![];
    let data: Vec<f64> = (0..64).map(|x| x as f64).collect();
    DirectInterleaver.interleave(&data, dims, dims, dims, &mut out);
    assert!(out.is_empty());
  }

  #[test]
  fn test_sfc_interleaver_roundtrip() {
    roundtrip(SfcInterleaver, [8, 8, 8], [8, 8, 8], [4, 4, 4]);
  }

  #[test]
  fn test_sfc_interleaver_visits_same_cell_count_as_direct() {
    let fine = [6, 5, 7];
    let coarse = [3, 2, 4];
    let visited = SfcInterleaver::visiting_order(fine)
      .into_iter()
      .filter(|&[i, j, k]| !in_coarse_box(i, j, k, coarse))
      .count();
    let expected = fine[0] * fine[1] * fine[2] - coarse[0] * coarse[1] * coarse[2];
    assert_eq!(visited, expected);
  }
}
