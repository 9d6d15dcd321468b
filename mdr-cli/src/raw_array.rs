//! Minimal raw binary array I/O: a flat, little-endian, row-major dump of
//! `f32` or `f64` elements with no header — the array's shape is supplied
//! separately on the command line via `--dims`.

use std::fs;
use std::path::Path;

use anyhow::{bail, Result};
use clap::ValueEnum;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Dtype {
  F32,
  F64,
}

pub fn read_f64(path: &Path, expected_len: usize) -> Result<Vec<f64>> {
  let bytes = fs::read(path)?;
  if bytes.len() != expected_len * 8 {
    bail!(
      "{} holds {} bytes, expected {} ({} f64 elements)",
      path.display(),
      bytes.len(),
      expected_len * 8,
      expected_len
    );
  }
  Ok(bytes.chunks_exact(8).map(|c| f64::from_le_bytes(c.try_into().unwrap())).collect())
}

pub fn read_f32(path: &Path, expected_len: usize) -> Result<Vec<f32>> {
  let bytes = fs::read(path)?;
  if bytes.len() != expected_len * 4 {
    bail!(
      "{} holds {} bytes, expected {} ({} f32 elements)",
      path.display(),
      bytes.len(),
      expected_len * 4,
      expected_len
    );
  }
  Ok(bytes.chunks_exact(4).map(|c| f32::from_le_bytes(c.try_into().unwrap())).collect())
}

pub fn write_f64(path: &Path, data: &[f64]) -> Result<()> {
  let mut bytes = Vec::with_capacity(data.len() * 8);
  for &v in data {
    bytes.extend_from_slice(&v.to_le_bytes());
  }
  fs::write(path, bytes)?;
  Ok(())
}

pub fn write_f32(path: &Path, data: &[f32]) -> Result<()> {
  let mut bytes = Vec::with_capacity(data.len() * 4);
  for &v in data {
    bytes.extend_from_slice(&v.to_le_bytes());
  }
  fs::write(path, bytes)?;
  Ok(())
}

/// Parses a `D0,D1,D2` flag value into the fixed-rank dims this crate
/// operates on.
pub fn parse_dims(s: &str) -> Result<[usize; 3]> {
  let parts: Vec<&str> = s.split(',').collect();
  if parts.len() != 3 {
    bail!("--dims must have exactly 3 comma-separated components, got {:?}", parts);
  }
  let mut dims = [0usize; 3];
  for (i, p) in parts.iter().enumerate() {
    dims[i] = p.trim().parse()?;
  }
  Ok(dims)
}
