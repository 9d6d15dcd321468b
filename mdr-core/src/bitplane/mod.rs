//! Bit-plane encoding of a level's coefficients.
//!
//! `spec.md` §4.3: each level buffer `Bi` (a flat slice of `n` coefficients
//! with shared exponent `e`) is encoded into `P` independently-truncatable
//! bit-plane streams, most-significant plane first, packed MSB-first into
//! 64-bit words (`spec.md` §9: "bit-plane words are packed big-endian within
//! the word, matching the original refactorer's `uint64_t` packing").

pub mod negabinary;
pub mod sign_magnitude;

use crate::types::Float;

/// A bit-plane encoding variant.
pub trait BitplaneCodec<F: Float>: Send + Sync {
  /// Encodes `coeffs` (sharing exponent `e`) into `planes` bit-plane
  /// streams plus any side data the variant needs to decode (e.g.
  /// per-coefficient starting planes, or sign bits). Returns the side
  /// data and the number of bits actually written to each of the
  /// returned plane streams (so callers can size level-compressor input
  /// without re-scanning).
  fn encode(&self, coeffs: &[F], e: i32, planes: usize) -> EncodedLevel;

  /// Reconstructs coefficients from the first `planes_available` plane
  /// streams (a prefix of the `planes` total streams `encode` produced)
  /// plus the side data. `n` is the coefficient count, `e` the shared
  /// exponent.
  fn decode(
    &self,
    streams: &[Vec<u8>],
    side_data: &[u8],
    n: usize,
    e: i32,
    planes: usize,
    planes_available: usize,
  ) -> Vec<F>;

  /// The maximum error `|B[j] - B'[j]|` guaranteed when only
  /// `planes_available` of `planes` total planes are retrieved, per
  /// `spec.md` §4.3's per-variant error bound table.
  fn error_bound(&self, e: i32, planes: usize, planes_available: usize) -> f64;
}

/// Output of [`BitplaneCodec::encode`].
pub struct EncodedLevel {
  pub planes: Vec<Vec<u8>>,
  pub side_data: Vec<u8>,
}

/// Packs bit `j` of coefficient `m` into `words`, MSB-first within each
/// 64-bit word: bit `j` of coefficient `m` lives at word `m / 64`, bit
/// position `63 - (m % 64)`.
pub(crate) fn pack_bits_into_words(bits: impl Iterator<Item = bool>, n: usize) -> Vec<u8> {
  let n_words = n.div_ceil(64);
  let mut words = vec![0u64; n_words];
  for (m, bit) in bits.enumerate() {
    if bit {
      words[m / 64] |= 1u64 << (63 - (m % 64));
    }
  }
  let mut bytes = Vec::with_capacity(n_words * 8);
  for w in words {
    bytes.extend_from_slice(&w.to_be_bytes());
  }
  bytes
}

/// Reads bit `m` back out of a `pack_bits_into_words`-packed byte stream.
pub(crate) fn read_packed_bit(bytes: &[u8], m: usize) -> bool {
  let word_idx = m / 64;
  let byte_off = word_idx * 8;
  let word = u64::from_be_bytes(bytes[byte_off..byte_off + 8].try_into().unwrap());
  (word >> (63 - (m % 64))) & 1 == 1
}
