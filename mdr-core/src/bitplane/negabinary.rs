//! Negabinary (base `-2`) bit-plane encoding.
//!
//! Unlike [`super::sign_magnitude::SignMagnitudeCodec`], negabinary folds
//! sign into the digit representation itself — no separate sign bit or
//! `starting_bitplane` side data is needed. The coefficient is first
//! quantized onto an integer scale (`round(v * 2^(planes - e))`), then
//! expanded into `planes` base-`-2` digits via the standard
//! divide-by-`-2` recurrence. `planes` must be even, per `spec.md` §4.3.

use super::{pack_bits_into_words, read_packed_bit, BitplaneCodec, EncodedLevel};
use crate::types::Float;

#[derive(Clone, Copy, Debug, Default)]
pub struct NegabinaryCodec;

/// MSB-first negabinary digits of `value`, exactly `digits` of them.
fn to_negabinary(value: i64, digits: usize) -> Vec<bool> {
  let mut bits = Vec::with_capacity(digits);
  let mut v = value;
  for _ in 0..digits {
    let bit = (v & 1) != 0;
    bits.push(bit);
    v = ((bit as i64) - v) / 2;
  }
  bits.reverse();
  bits
}

/// Horner evaluation of MSB-first negabinary digits back to an integer.
fn from_negabinary(bits: &[bool]) -> i64 {
  let mut value = 0i64;
  for &bit in bits {
    value = -2 * value + bit as i64;
  }
  value
}

impl<F: Float> BitplaneCodec<F> for NegabinaryCodec {
  fn encode(&self, coeffs: &[F], e: i32, planes: usize) -> EncodedLevel {
    debug_assert!(planes % 2 == 0, "negabinary requires an even plane count");
    let n = coeffs.len();
    let scale = 2f64.powi(planes as i32 - e);
    let scaled: Vec<i64> = coeffs
      .iter()
      .map(|c| (c.to_f64() * scale).round() as i64)
      .collect();
    let digit_rows: Vec<Vec<bool>> = scaled.iter().map(|&v| to_negabinary(v, planes)).collect();

    let mut planes_bytes = Vec::with_capacity(planes);
    for j in 0..planes {
      let plane_bits = digit_rows.iter().map(|row| row[j]);
      planes_bytes.push(pack_bits_into_words(plane_bits, n));
    }

    EncodedLevel {
      planes: planes_bytes,
      side_data: Vec::new(),
    }
  }

  fn decode(
    &self,
    streams: &[Vec<u8>],
    _side_data: &[u8],
    n: usize,
    e: i32,
    planes: usize,
    planes_available: usize,
  ) -> Vec<F> {
    let mut out = Vec::with_capacity(n);
    for m in 0..n {
      let bits: Vec<bool> = (0..planes_available)
        .map(|j| read_packed_bit(&streams[j], m))
        .collect();
      let h = from_negabinary(&bits);
      let shift = (planes as i32 - planes_available as i32) as f64;
      let value_int = h as f64 * (-2f64).powf(shift);
      let value = value_int * 2f64.powi(e - planes as i32);
      out.push(F::from_f64(value));
    }
    out
  }

  fn error_bound(&self, e: i32, _planes: usize, planes_available: usize) -> f64 {
    2f64.powi(e - planes_available as i32 + 1) / 3.0
  }
}
