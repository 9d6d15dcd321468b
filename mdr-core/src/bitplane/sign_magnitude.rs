//! Grouped sign-magnitude bit-plane encoding.
//!
//! Each coefficient's magnitude is extracted one plane at a time by greedy
//! threshold subtraction against the shared level exponent `e`, exactly as
//! `spec.md` §4.3 describes: plane `j` (0-indexed, MSB first) carries bit
//! `(remaining >= 2^(e-1-j))`. Because extraction operates on the
//! unquantized magnitude directly (no upfront rounding to an integer
//! scale), retrieving every plane reconstructs the coefficient bit-exactly.
//!
//! Side data: a packed sign bit per coefficient, followed by a
//! `starting_bitplane` byte per coefficient (the index, clamped to
//! `planes`, of the first plane with a set bit — `0xFF`-free, since
//! `planes` never exceeds `u8::MAX` in this crate).

use super::{pack_bits_into_words, read_packed_bit, BitplaneCodec, EncodedLevel};
use crate::types::Float;

#[derive(Clone, Copy, Debug, Default)]
pub struct SignMagnitudeCodec;

fn pack_flags(flags: &[bool]) -> Vec<u8> {
  let mut out = vec![0u8; flags.len().div_ceil(8)];
  for (i, &f) in flags.iter().enumerate() {
    if f {
      out[i / 8] |= 1 << (7 - (i % 8));
    }
  }
  out
}

fn unpack_flag(bytes: &[u8], i: usize) -> bool {
  (bytes[i / 8] >> (7 - (i % 8))) & 1 == 1
}

impl<F: Float> BitplaneCodec<F> for SignMagnitudeCodec {
  fn encode(&self, coeffs: &[F], e: i32, planes: usize) -> EncodedLevel {
    let n = coeffs.len();
    let mut remaining: Vec<f64> = coeffs.iter().map(|c| c.to_f64().abs()).collect();
    let signs: Vec<bool> = coeffs.iter().map(|c| c.to_f64() < 0.0).collect();
    let mut starting_bitplane = vec![planes.min(u8::MAX as usize) as u8; n];
    let mut bit_matrix: Vec<Vec<bool>> = Vec::with_capacity(planes);

    for j in 0..planes {
      let threshold = 2f64.powi(e - 1 - j as i32);
      let mut plane_bits = Vec::with_capacity(n);
      for m in 0..n {
        let bit = remaining[m] >= threshold;
        if bit {
          remaining[m] -= threshold;
          if starting_bitplane[m] as usize == planes {
            starting_bitplane[m] = j as u8;
          }
        }
        plane_bits.push(bit);
      }
      bit_matrix.push(plane_bits);
    }

    let planes_bytes = bit_matrix
      .into_iter()
      .map(|bits| pack_bits_into_words(bits.into_iter(), n))
      .collect();

    let mut side_data = pack_flags(&signs);
    side_data.extend_from_slice(&starting_bitplane);

    EncodedLevel {
      planes: planes_bytes,
      side_data,
    }
  }

  fn decode(
    &self,
    streams: &[Vec<u8>],
    side_data: &[u8],
    n: usize,
    e: i32,
    _planes: usize,
    planes_available: usize,
  ) -> Vec<F> {
    let sign_bytes = n.div_ceil(8);
    let signs = &side_data[..sign_bytes];
    let mut out = Vec::with_capacity(n);
    for m in 0..n {
      let mut magnitude = 0f64;
      for (j, stream) in streams.iter().enumerate().take(planes_available) {
        if read_packed_bit(stream, m) {
          magnitude += 2f64.powi(e - 1 - j as i32);
        }
      }
      let value = if unpack_flag(signs, m) { -magnitude } else { magnitude };
      out.push(F::from_f64(value));
    }
    out
  }

  fn error_bound(&self, e: i32, planes: usize, planes_available: usize) -> f64 {
    if planes_available >= planes {
      0.0
    } else {
      2f64.powi(e - planes_available as i32)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_roundtrip_full_planes_is_exact() {
    let codec = SignMagnitudeCodec;
    let coeffs: Vec<f64> = vec![3.25, -1.5, 0.0, 7.875, -0.125];
    let e = 4; // max_abs 7.875 < 2^3, e = floor(log2(7.875))+1 = 3
    let planes = 16;
    let encoded = BitplaneCodec::<f64>::encode(&codec, &coeffs, e, planes);
    let decoded: Vec<f64> =
      codec.decode(&encoded.planes, &encoded.side_data, coeffs.len(), e, planes, planes);
    for (a, b) in coeffs.iter().zip(decoded.iter()) {
      assert!((a - b).abs() < 1e-9, "{} vs {}", a, b);
    }
  }

  #[test]
  fn test_truncated_planes_within_error_bound() {
    let codec = SignMagnitudeCodec;
    let coeffs: Vec<f64> = vec![1.23456, -9.87, 4.0001];
    let e = 5;
    let planes = 20;
    let encoded = BitplaneCodec::<f64>::encode(&codec, &coeffs, e, planes);
    for pa in [0usize, 1, 5, 10] {
      let decoded: Vec<f64> =
        codec.decode(&encoded.planes, &encoded.side_data, coeffs.len(), e, planes, pa);
      let bound = BitplaneCodec::<f64>::error_bound(&codec, e, planes, pa);
      for (a, b) in coeffs.iter().zip(decoded.iter()) {
        assert!((a - b).abs() <= bound + 1e-12, "pa={pa} {} vs {} bound {}", a, b, bound);
      }
    }
  }

  #[test]
  fn test_sign_preserved_for_zero_and_negative() {
    let codec = SignMagnitudeCodec;
    let coeffs: Vec<f64> = vec![0.0, -0.0, -2.0];
    let e = 2;
    let planes = 8;
    let encoded = BitplaneCodec::<f64>::encode(&codec, &coeffs, e, planes);
    let decoded: Vec<f64> =
      codec.decode(&encoded.planes, &encoded.side_data, coeffs.len(), e, planes, planes);
    assert_eq!(decoded[2], -2.0);
  }
}
