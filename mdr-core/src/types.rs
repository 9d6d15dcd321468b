use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

/// A floating-point element type this crate can refactor/reconstruct.
///
/// Implemented only for `f32` and `f64`. Kept as a trait (rather than
/// hard-coding one type) so the rest of the crate is written once and
/// monomorphized for both precisions.
pub trait Float:
  Copy + Clone + Debug + Default + PartialEq + PartialOrd + Send + Sync + 'static
  + Add<Output = Self>
  + Sub<Output = Self>
  + Mul<Output = Self>
  + Neg<Output = Self>
{
  /// Total bit width of the in-memory representation (32 or 64).
  const BITS: u32;
  const ZERO: Self;
  const HALF: Self;

  fn abs(self) -> Self;
  fn is_finite(self) -> bool;
  fn from_f64(x: f64) -> Self;
  fn to_f64(self) -> f64;
  fn max(self, other: Self) -> Self;
}

macro_rules! impl_float {
  ($t:ty, $bits:expr) => {
    impl Float for $t {
      const BITS: u32 = $bits;
      const ZERO: Self = 0.0;
      const HALF: Self = 0.5;

      #[inline]
      fn abs(self) -> Self {
        <$t>::abs(self)
      }

      #[inline]
      fn is_finite(self) -> bool {
        <$t>::is_finite(self)
      }

      #[inline]
      fn from_f64(x: f64) -> Self {
        x as $t
      }

      #[inline]
      fn to_f64(self) -> f64 {
        self as f64
      }

      #[inline]
      fn max(self, other: Self) -> Self {
        <$t>::max(self, other)
      }
    }
  };
}

impl_float!(f32, 32);
impl_float!(f64, 64);

/// Dimensions of the (always 3-D) array this crate operates on.
///
/// Row-major: the stride of axis 0 is `dims[1] * dims[2]`, axis 1 is
/// `dims[2]`, axis 2 is 1.
pub type Dims = [usize; 3];

pub fn num_elements(dims: Dims) -> usize {
  dims[0] * dims[1] * dims[2]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_float_bits() {
    assert_eq!(f32::BITS, 32);
    assert_eq!(f64::BITS, 64);
  }

  #[test]
  fn test_num_elements() {
    assert_eq!(num_elements([2, 3, 4]), 24);
  }
}
