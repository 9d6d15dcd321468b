//! The `metadata.bin` codec: a fixed, little-endian, hand-rolled binary
//! layout (no `serde`) exactly as `spec.md` §6 tables it, grounded in
//! `examples/original_source/include/refactor.hpp`'s `Metadata::serialize`/
//! `deserialize`.
//!
//! `level_error_bounds` and `max_val`/`min_val` are typed `F` in `spec.md`
//! §6's table, not a fixed `f64` — they round-trip at the refactored
//! array's own element width (4 bytes for `f32`, 8 for `f64`), passed in
//! as `float_bits` by the caller, which already knows `F::BITS`.

use crate::errors::{MdrError, MdrResult};

/// A `level-vector<X>` repeated once per level: `u64` count followed by
/// that many values of `X`.
pub type LevelVecU64 = Vec<Vec<u64>>;
pub type LevelVecU8 = Vec<Vec<u8>>;
pub type LevelVecF64 = Vec<Vec<f64>>;

#[derive(Clone, Debug, PartialEq)]
pub struct Metadata {
  pub option: i32,
  pub encoded_bitplanes: i32,
  pub level_elements: Vec<u64>,
  pub level_error_bounds: Vec<f64>,
  pub dims: Vec<u64>,
  pub order: Vec<i32>,
  pub mode: i32,
  pub data_reorganization: i32,
  pub max_val: f64,
  pub min_val: f64,
  pub total_encoded_size: u64,
  pub component_sizes: LevelVecU64,
  pub bitplane_indicators: LevelVecU8,
  pub lossless_indicators: LevelVecU8,
  pub max_e: Option<LevelVecF64>,
  pub mse: Option<LevelVecF64>,
}

fn write_u8(buf: &mut Vec<u8>, v: u8) {
  buf.push(v);
}
fn write_i32(buf: &mut Vec<u8>, v: i32) {
  buf.extend_from_slice(&v.to_le_bytes());
}
fn write_u64(buf: &mut Vec<u8>, v: u64) {
  buf.extend_from_slice(&v.to_le_bytes());
}
fn write_f64(buf: &mut Vec<u8>, v: f64) {
  buf.extend_from_slice(&v.to_le_bytes());
}
/// Writes `v` at `float_bits` bits (32 or 64), the width `spec.md` §6
/// tables as `F` rather than a fixed `f64`.
fn write_f_native(buf: &mut Vec<u8>, v: f64, float_bits: u32) {
  if float_bits == 32 {
    buf.extend_from_slice(&(v as f32).to_le_bytes());
  } else {
    buf.extend_from_slice(&v.to_le_bytes());
  }
}

fn write_level_vec_u64(buf: &mut Vec<u8>, levels: &[Vec<u64>]) {
  for level in levels {
    write_u64(buf, level.len() as u64);
    for &v in level {
      write_u64(buf, v);
    }
  }
}
fn write_level_vec_u8(buf: &mut Vec<u8>, levels: &[Vec<u8>]) {
  for level in levels {
    write_u64(buf, level.len() as u64);
    for &v in level {
      write_u8(buf, v);
    }
  }
}
fn write_level_vec_f64(buf: &mut Vec<u8>, levels: &[Vec<f64>]) {
  for level in levels {
    write_u64(buf, level.len() as u64);
    for &v in level {
      write_f64(buf, v);
    }
  }
}

struct Reader<'a> {
  bytes: &'a [u8],
  pos: usize,
}

impl<'a> Reader<'a> {
  fn new(bytes: &'a [u8]) -> Self {
    Self { bytes, pos: 0 }
  }

  fn take(&mut self, n: usize) -> MdrResult<&'a [u8]> {
    if self.pos + n > self.bytes.len() {
      return Err(MdrError::corruption("metadata.bin truncated"));
    }
    let slice = &self.bytes[self.pos..self.pos + n];
    self.pos += n;
    Ok(slice)
  }

  fn read_u8(&mut self) -> MdrResult<u8> {
    Ok(self.take(1)?[0])
  }
  fn read_i32(&mut self) -> MdrResult<i32> {
    Ok(i32::from_le_bytes(self.take(4)?.try_into().unwrap()))
  }
  fn read_u64(&mut self) -> MdrResult<u64> {
    Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
  }
  fn read_f64(&mut self) -> MdrResult<f64> {
    Ok(f64::from_le_bytes(self.take(8)?.try_into().unwrap()))
  }
  fn read_f_native(&mut self, float_bits: u32) -> MdrResult<f64> {
    if float_bits == 32 {
      Ok(f32::from_le_bytes(self.take(4)?.try_into().unwrap()) as f64)
    } else {
      self.read_f64()
    }
  }

  fn read_level_vec_u64(&mut self, num_levels: usize) -> MdrResult<LevelVecU64> {
    (0..num_levels)
      .map(|_| {
        let count = self.read_u64()? as usize;
        (0..count).map(|_| self.read_u64()).collect()
      })
      .collect()
  }
  fn read_level_vec_u8(&mut self, num_levels: usize) -> MdrResult<LevelVecU8> {
    (0..num_levels)
      .map(|_| {
        let count = self.read_u64()? as usize;
        (0..count).map(|_| self.read_u8()).collect()
      })
      .collect()
  }
  fn read_level_vec_f64(&mut self, num_levels: usize) -> MdrResult<LevelVecF64> {
    (0..num_levels)
      .map(|_| {
        let count = self.read_u64()? as usize;
        (0..count).map(|_| self.read_f64()).collect()
      })
      .collect()
  }
}

impl Metadata {
  /// `float_bits` (32 or 64) must match the width `F` the refactored
  /// array was stored at; it governs `level_error_bounds` and
  /// `max_val`/`min_val`'s on-wire width only.
  pub fn serialize(&self, float_bits: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    write_i32(&mut buf, self.option);
    write_i32(&mut buf, self.encoded_bitplanes);
    write_u64(&mut buf, self.level_elements.len() as u64);
    for &n in &self.level_elements {
      write_u64(&mut buf, n);
    }
    for &m in &self.level_error_bounds {
      write_f_native(&mut buf, m, float_bits);
    }
    write_u64(&mut buf, self.dims.len() as u64);
    for &d in &self.dims {
      write_u64(&mut buf, d);
    }
    write_u64(&mut buf, self.order.len() as u64);
    for &c in &self.order {
      write_i32(&mut buf, c);
    }
    write_i32(&mut buf, self.mode);
    write_i32(&mut buf, self.data_reorganization);
    write_f_native(&mut buf, self.max_val, float_bits);
    write_f_native(&mut buf, self.min_val, float_bits);
    write_u64(&mut buf, self.total_encoded_size);
    write_u8(&mut buf, self.mse.is_some() as u8);
    write_u8(&mut buf, self.max_e.is_some() as u8);
    write_level_vec_u64(&mut buf, &self.component_sizes);
    write_level_vec_u8(&mut buf, &self.bitplane_indicators);
    write_level_vec_u8(&mut buf, &self.lossless_indicators);
    if let Some(max_e) = &self.max_e {
      write_level_vec_f64(&mut buf, max_e);
    }
    if let Some(mse) = &self.mse {
      write_level_vec_f64(&mut buf, mse);
    }
    buf
  }

  /// `float_bits` must be the same value passed to [`Metadata::serialize`]
  /// when this file was written.
  pub fn deserialize(bytes: &[u8], float_bits: u32) -> MdrResult<Self> {
    let mut r = Reader::new(bytes);
    let option = r.read_i32()?;
    let encoded_bitplanes = r.read_i32()?;
    let num_levels = r.read_u64()? as usize;
    let level_elements: Vec<u64> = (0..num_levels).map(|_| r.read_u64()).collect::<MdrResult<_>>()?;
    let level_error_bounds: Vec<f64> = (0..num_levels)
      .map(|_| r.read_f_native(float_bits))
      .collect::<MdrResult<_>>()?;
    let num_dims = r.read_u64()? as usize;
    let dims: Vec<u64> = (0..num_dims).map(|_| r.read_u64()).collect::<MdrResult<_>>()?;
    let order_size = r.read_u64()? as usize;
    let order: Vec<i32> = (0..order_size).map(|_| r.read_i32()).collect::<MdrResult<_>>()?;
    let mode = r.read_i32()?;
    let data_reorganization = r.read_i32()?;
    let max_val = r.read_f_native(float_bits)?;
    let min_val = r.read_f_native(float_bits)?;
    let total_encoded_size = r.read_u64()?;
    let mse_flag = r.read_u8()?;
    let max_e_flag = r.read_u8()?;
    let component_sizes = r.read_level_vec_u64(num_levels)?;
    let bitplane_indicators = r.read_level_vec_u8(num_levels)?;
    let lossless_indicators = r.read_level_vec_u8(num_levels)?;
    let max_e = if max_e_flag != 0 {
      Some(r.read_level_vec_f64(num_levels)?)
    } else {
      None
    };
    let mse = if mse_flag != 0 {
      Some(r.read_level_vec_f64(num_levels)?)
    } else {
      None
    };

    Ok(Metadata {
      option,
      encoded_bitplanes,
      level_elements,
      level_error_bounds,
      dims,
      order,
      mode,
      data_reorganization,
      max_val,
      min_val,
      total_encoded_size,
      component_sizes,
      bitplane_indicators,
      lossless_indicators,
      max_e,
      mse,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> Metadata {
    Metadata {
      option: 0,
      encoded_bitplanes: 16,
      level_elements: vec![8, 56, 448],
      level_error_bounds: vec![1.0, 0.5, 0.25],
      dims: vec![8, 8, 8],
      order: vec![0, 1, 2, 3, 4, 5],
      mode: 0,
      data_reorganization: 0,
      max_val: 9.5,
      min_val: -9.5,
      total_encoded_size: 12345,
      component_sizes: vec![vec![4, 100], vec![4, 200], vec![4, 300]],
      bitplane_indicators: vec![vec![0, 0], vec![0, 0], vec![0, 0]],
      lossless_indicators: vec![vec![0, 1], vec![1, 1], vec![1, 1]],
      max_e: Some(vec![vec![1.0, 0.5, 0.25], vec![0.5, 0.25, 0.1], vec![0.25, 0.1, 0.0]]),
      mse: None,
    }
  }

  #[test]
  fn test_roundtrip() {
    let meta = sample();
    let bytes = meta.serialize(64);
    let back = Metadata::deserialize(&bytes, 64).unwrap();
    assert_eq!(meta, back);
  }

  #[test]
  fn test_roundtrip_without_optional_tables() {
    let mut meta = sample();
    meta.max_e = None;
    meta.mse = None;
    let bytes = meta.serialize(64);
    let back = Metadata::deserialize(&bytes, 64).unwrap();
    assert_eq!(meta, back);
  }

  #[test]
  fn test_truncated_metadata_is_corruption_error() {
    let meta = sample();
    let mut bytes = meta.serialize(64);
    bytes.truncate(bytes.len() - 10);
    assert!(Metadata::deserialize(&bytes, 64).is_err());
  }

  #[test]
  fn test_f32_width_roundtrips_at_four_bytes_per_field() {
    let meta = sample();
    let bytes32 = meta.serialize(32);
    let bytes64 = meta.serialize(64);
    // level_error_bounds (3 values) + max_val + min_val: 5 fields shrink
    // from 8 to 4 bytes each when float_bits is 32.
    assert_eq!(bytes64.len() - bytes32.len(), 5 * 4);

    let back = Metadata::deserialize(&bytes32, 32).unwrap();
    for (a, b) in meta.level_error_bounds.iter().zip(&back.level_error_bounds) {
      assert!((*a as f32 as f64 - b).abs() < 1e-12);
    }
    assert_eq!(meta.max_val as f32 as f64, back.max_val);
    assert_eq!(meta.min_val as f32 as f64, back.min_val);
  }
}
