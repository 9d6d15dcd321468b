use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use mdr_core::config::{CodecKind, InterleaverKind};
use mdr_core::io::FsComponentIo;
use mdr_core::types::num_elements;
use mdr_core::{Refactor, RefactorConfig};

use crate::raw_array::{self, Dtype};

/// Decompose a raw binary array into a progressive, bit-plane encoded
/// session directory.
#[derive(Clone, Debug, Parser)]
pub struct RefactorOpt {
  /// Path to a flat, little-endian raw binary array (no header).
  pub input: PathBuf,

  /// `D0,D1,D2` element counts of the input array, row-major.
  #[arg(long)]
  pub dims: String,

  /// Element type of the input array.
  #[arg(long, value_enum, default_value_t = Dtype::F64)]
  pub dtype: Dtype,

  /// Finest multigrid level to decompose to; 0 keeps the array whole.
  #[arg(long, default_value_t = 0)]
  pub level: usize,

  /// Number of bit-planes encoded per level.
  #[arg(long, default_value_t = 32)]
  pub bitplanes: usize,

  /// Level-interleaver traversal order.
  #[arg(long, value_enum, default_value_t = InterleaverArg::Direct)]
  pub interleaver: InterleaverArg,

  /// Bit-plane encoding variant.
  #[arg(long, value_enum, default_value_t = CodecArg::SignMagnitude)]
  pub mode: CodecArg,

  /// Disables the adaptive zstd pass over each bit-plane stream.
  #[arg(long)]
  pub no_lossless: bool,

  /// Directory to write `metadata.bin` and `level_*.bin` into.
  #[arg(long)]
  pub out: PathBuf,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum InterleaverArg {
  Direct,
  Sfc,
}

impl From<InterleaverArg> for InterleaverKind {
  fn from(a: InterleaverArg) -> Self {
    match a {
      InterleaverArg::Direct => InterleaverKind::Direct,
      InterleaverArg::Sfc => InterleaverKind::Sfc,
    }
  }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum CodecArg {
  SignMagnitude,
  Negabinary,
}

impl From<CodecArg> for CodecKind {
  fn from(a: CodecArg) -> Self {
    match a {
      CodecArg::SignMagnitude => CodecKind::SignMagnitude,
      CodecArg::Negabinary => CodecKind::Negabinary,
    }
  }
}

pub fn refactor(opt: RefactorOpt) -> Result<()> {
  let dims = raw_array::parse_dims(&opt.dims)?;
  let codec: CodecKind = opt.mode.into();
  // spec contract: bit-plane count is rounded up to even for negabinary.
  let bitplanes = if codec == CodecKind::Negabinary {
    opt.bitplanes + (opt.bitplanes % 2)
  } else {
    opt.bitplanes
  };
  let config = RefactorConfig::default()
    .with_target_level(opt.level)
    .with_bitplanes(bitplanes)
    .with_interleaver(opt.interleaver.into())
    .with_codec(codec)
    .with_lossless(!opt.no_lossless);

  let mut io = FsComponentIo::new(&opt.out);
  let report = match opt.dtype {
    Dtype::F64 => {
      let data = raw_array::read_f64(&opt.input, num_elements(dims))?;
      Refactor.run(&data, dims, &config, &mut io)?
    }
    Dtype::F32 => {
      let data = raw_array::read_f32(&opt.input, num_elements(dims))?;
      Refactor.run(&data, dims, &config, &mut io)?
    }
  };

  println!(
    "wrote {} levels, {} bytes total ({:?} bytes per level) to {}",
    report.num_levels,
    report.total_bytes,
    report.bytes_per_level,
    opt.out.display(),
  );
  Ok(())
}
