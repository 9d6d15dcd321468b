//! IEEE-754 exponent extraction.
//!
//! `spec.md` §9 requires that the integer-magnitude extraction driving
//! bit-plane assignment use "the standard IEEE-754 exponent extraction, not
//! compiler intrinsics" (i.e. not `frexp`), so that the same bit-planes are
//! produced bit-for-bit across platforms. We always widen to `f64` first:
//! widening `f32 -> f64` is exact (no precision is lost), so computing the
//! exponent from the `f64` bit pattern gives the same answer as computing it
//! from the narrower type directly, with a single code path for both.

const F64_MANTISSA_BITS: u32 = 52;
const F64_EXPONENT_BIAS: i32 = 1023;
const F64_EXPONENT_MASK: u64 = 0x7FF;
const F64_MANTISSA_MASK: u64 = (1u64 << F64_MANTISSA_BITS) - 1;

/// `floor(log2(x))` for a finite, strictly positive `x`, computed directly
/// from the IEEE-754 bit pattern.
pub fn floor_log2(x: f64) -> i32 {
  debug_assert!(x.is_finite() && x > 0.0);
  let bits = x.to_bits();
  let exp_field = ((bits >> F64_MANTISSA_BITS) & F64_EXPONENT_MASK) as i32;
  if exp_field != 0 {
    exp_field - F64_EXPONENT_BIAS
  } else {
    // subnormal: value = mantissa * 2^(1 - bias - mantissa_bits)
    let mantissa = bits & F64_MANTISSA_MASK;
    let floor_log2_mantissa = 63 - mantissa.leading_zeros() as i32;
    floor_log2_mantissa + (1 - F64_EXPONENT_BIAS - F64_MANTISSA_BITS as i32)
  }
}

/// `e = floor(log2(max_abs)) + 1`, the exponent of the most significant
/// bit-plane for a level whose largest-magnitude coefficient is
/// `max_abs`, per `spec.md` §3. `max_abs == 0.0` (an all-zero level) is a
/// degenerate case with no information to encode; we define its exponent
/// as 0 so bit-plane extraction trivially yields all-zero planes.
pub fn level_exponent(max_abs: f64) -> i32 {
  if max_abs == 0.0 {
    0
  } else {
    floor_log2(max_abs) + 1
  }
}
