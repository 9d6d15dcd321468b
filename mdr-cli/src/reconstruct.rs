use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use mdr_core::config::{ErrorMode, RetrievalOrder};
use mdr_core::io::FsComponentIo;
use mdr_core::{Reconstructor, ReconstructConfig};

use crate::raw_array::{self, Dtype};

/// Retrieve as many bit-planes as needed from a refactored session to meet
/// one or more error tolerances, and write the reconstructed array(s).
#[derive(Clone, Debug, Parser)]
pub struct ReconstructOpt {
  /// Session directory written by `mdr refactor`.
  pub dir: PathBuf,

  /// One or more comma-separated error tolerances. A single tolerance
  /// writes directly to `--out`; multiple tolerances append
  /// `.tol<value>` to `--out` for each.
  #[arg(long, default_value = "0.0")]
  pub tolerance: String,

  /// Global error estimator.
  #[arg(long, value_enum, default_value_t = ModeArg::Linf)]
  pub mode: ModeArg,

  /// Sobolev negative-order exponent (only used with `--mode sobolev`).
  #[arg(long, default_value_t = 0.0)]
  pub sobolev_s: f64,

  /// Comma-separated per-level weights, overriding the chosen mode's
  /// default weighting.
  #[arg(long)]
  pub weights: Option<String>,

  /// Bit-plane retrieval order.
  #[arg(long, value_enum, default_value_t = RetrievalOrderArg::Greedy)]
  pub retrieval_order: RetrievalOrderArg,

  /// Element type to write the reconstructed array as.
  #[arg(long, value_enum, default_value_t = Dtype::F64)]
  pub dtype: Dtype,

  /// Output path (or path prefix, with multiple tolerances).
  #[arg(long)]
  pub out: PathBuf,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ModeArg {
  Linf,
  Sobolev,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum RetrievalOrderArg {
  Greedy,
  RoundRobin,
  InOrder,
}

impl From<RetrievalOrderArg> for RetrievalOrder {
  fn from(a: RetrievalOrderArg) -> Self {
    match a {
      RetrievalOrderArg::Greedy => RetrievalOrder::Greedy,
      RetrievalOrderArg::RoundRobin => RetrievalOrder::RoundRobin,
      RetrievalOrderArg::InOrder => RetrievalOrder::InOrder,
    }
  }
}

fn parse_tolerances(s: &str) -> Result<Vec<f64>> {
  s.split(',')
    .map(|t| t.trim().parse::<f64>().map_err(anyhow::Error::from))
    .collect()
}

fn parse_weights(s: &str) -> Result<Vec<f64>> {
  s.split(',')
    .map(|w| w.trim().parse::<f64>().map_err(anyhow::Error::from))
    .collect()
}

pub fn reconstruct(opt: ReconstructOpt) -> Result<()> {
  let tolerances = parse_tolerances(&opt.tolerance)?;
  if tolerances.is_empty() {
    bail!("--tolerance must name at least one value");
  }
  let weights = opt.weights.as_deref().map(parse_weights).transpose()?;

  let mode = match opt.mode {
    ModeArg::Linf => ErrorMode::LInf,
    ModeArg::Sobolev => ErrorMode::Sobolev { s: opt.sobolev_s },
  };

  let io = FsComponentIo::new(&opt.dir);

  for &tolerance in &tolerances {
    let mut config = ReconstructConfig::default()
      .with_tolerance(tolerance)
      .with_mode(mode)
      .with_retrieval_order(opt.retrieval_order.into());
    if let Some(weights) = &weights {
      config = config.with_level_weights(weights.clone());
    }

    let out_path = if tolerances.len() == 1 {
      opt.out.clone()
    } else {
      let mut name = opt.out.clone().into_os_string();
      name.push(format!(".tol{tolerance}"));
      PathBuf::from(name)
    };

    match opt.dtype {
      Dtype::F64 => {
        let (data, _dims, report) = Reconstructor.run::<f64>(&io, &config)?;
        raw_array::write_f64(&out_path, &data)?;
        print_report(tolerance, &out_path, &report);
      }
      Dtype::F32 => {
        let (data, _dims, report) = Reconstructor.run::<f32>(&io, &config)?;
        raw_array::write_f32(&out_path, &data)?;
        print_report(tolerance, &out_path, &report);
      }
    }
  }
  Ok(())
}

fn print_report(tolerance: f64, out_path: &std::path::Path, report: &mdr_core::ReconstructReport) {
  println!(
    "tolerance {tolerance}: wrote {} (achieved error {:.6e}, {} bytes read, tolerance_reached={})",
    out_path.display(),
    report.achieved_error,
    report.bytes_read,
    report.tolerance_reached,
  );
}
