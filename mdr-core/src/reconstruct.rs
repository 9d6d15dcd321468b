//! The Reconstruct façade: `load metadata -> ask the Size Interpreter for
//! {p_i} and N -> read N bytes -> decompress/decode/reposition per level ->
//! recompose -> return`, per `spec.md` §4.8. Grounded in
//! `examples/original_source/test/test_reconstructor.cpp`'s composition of
//! a decomposer, interleaver, bit-plane decoder, level decompressor, size
//! interpreter and error estimator behind one entry point.

use crate::bitplane::negabinary::NegabinaryCodec;
use crate::bitplane::sign_magnitude::SignMagnitudeCodec;
use crate::bitplane::BitplaneCodec;
use crate::compressor::{CompressedBlock, LevelCompressor, ZstdLevelCompressor};
use crate::config::{CodecKind, ErrorMode, ReconstructConfig, RetrievalOrder};
use crate::decompose::{LevelDecomposer, LinearLevelDecomposer};
use crate::error_est::{ErrorEstimator, LInfEstimator, SobolevEstimator};
use crate::errors::{MdrError, MdrResult};
use crate::exponent::level_exponent;
use crate::grid::level_grids;
use crate::interleave::{DirectInterleaver, Interleaver, SfcInterleaver};
use crate::io::ComponentIO;
use crate::metadata::Metadata;
use crate::size_interpreter::{plane_step, GreedyInterpreter, InOrderInterpreter, RoundRobinInterpreter, SizeInterpreter};
use crate::types::{num_elements, Dims, Float};

#[derive(Clone, Debug, PartialEq)]
pub struct ReconstructReport {
  pub tolerance_reached: bool,
  pub achieved_error: f64,
  pub planes_retrieved: Vec<usize>,
  pub bytes_read: usize,
}

struct WeightedEstimator {
  weights: Vec<f64>,
  l2: bool,
}

impl ErrorEstimator for WeightedEstimator {
  fn weight(&self, level: usize, _total_levels: usize) -> f64 {
    self.weights[level]
  }

  fn combine(&self, weighted_level_errors: &[f64]) -> f64 {
    if self.l2 {
      weighted_level_errors.iter().sum::<f64>().sqrt()
    } else {
      weighted_level_errors.iter().copied().fold(0.0, f64::max)
    }
  }
}

fn build_estimator(config: &ReconstructConfig, num_levels: usize) -> MdrResult<Box<dyn ErrorEstimator>> {
  if let Some(weights) = &config.level_weights {
    if weights.len() != num_levels {
      return Err(MdrError::precondition(format!(
        "level_weights has {} entries, expected {num_levels}",
        weights.len()
      )));
    }
    let l2 = matches!(config.mode, ErrorMode::Sobolev { .. });
    return Ok(Box::new(WeightedEstimator {
      weights: weights.clone(),
      l2,
    }));
  }
  Ok(match config.mode {
    ErrorMode::LInf => Box::new(LInfEstimator),
    ErrorMode::Sobolev { s } => Box::new(SobolevEstimator { s }),
  })
}

fn build_interpreter(order: RetrievalOrder) -> Box<dyn SizeInterpreter> {
  match order {
    RetrievalOrder::Greedy => Box::new(GreedyInterpreter),
    RetrievalOrder::RoundRobin => Box::new(RoundRobinInterpreter),
    RetrievalOrder::InOrder => Box::new(InOrderInterpreter),
  }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Reconstructor;

impl Reconstructor {
  pub fn run<F: Float>(
    &self,
    io: &dyn ComponentIO,
    config: &ReconstructConfig,
  ) -> MdrResult<(Vec<F>, Dims, ReconstructReport)> {
    let metadata_bytes = io.read_metadata()?;
    let metadata = Metadata::deserialize(&metadata_bytes, F::BITS)?;

    if metadata.dims.len() != 3 {
      return Err(MdrError::precondition(format!(
        "unsupported dimensionality {} (only 3-D arrays are supported)",
        metadata.dims.len()
      )));
    }
    let dims: Dims = [
      metadata.dims[0] as usize,
      metadata.dims[1] as usize,
      metadata.dims[2] as usize,
    ];
    let num_levels = metadata.level_elements.len();
    let target_level = num_levels - 1;
    let p = metadata.encoded_bitplanes as usize;
    let use_negabinary = metadata.option & 1 != 0;
    let use_sfc = metadata.option & 2 != 0;

    let error_table = match config.mode {
      ErrorMode::LInf => metadata
        .max_e
        .as_ref()
        .ok_or_else(|| MdrError::corruption("metadata missing max_e table required for L-infinity mode"))?,
      ErrorMode::Sobolev { .. } => metadata
        .mse
        .as_ref()
        .ok_or_else(|| MdrError::corruption("metadata missing mse table required for Sobolev mode"))?,
    };
    let sizes: Vec<Vec<usize>> = metadata
      .component_sizes
      .iter()
      .map(|level| level.iter().map(|&b| b as usize).collect())
      .collect();

    let estimator = build_estimator(config, num_levels)?;
    let interpreter = build_interpreter(config.retrieval_order);
    let codec = if use_negabinary { CodecKind::Negabinary } else { CodecKind::SignMagnitude };
    let selection = interpreter.select(&sizes, error_table, estimator.as_ref(), config.tolerance, plane_step(codec));

    let grids = level_grids(dims, target_level);
    let mut output = vec![F::ZERO; num_elements(dims)];
    let decompressor = ZstdLevelCompressor::default();
    let mut bytes_read = 0usize;

    for (i, &fine) in grids.iter().enumerate() {
      let planes_available = selection.planes[i];
      if planes_available == 0 {
        continue;
      }
      let coarse = if i == 0 { [0, 0, 0] } else { grids[i - 1] };
      let n_i = metadata.level_elements[i] as usize;
      let e_i = level_exponent(metadata.level_error_bounds[i]);

      let component_sizes = &metadata.component_sizes[i];
      let lossless_flags = &metadata.lossless_indicators[i];
      let prefix_len: usize = component_sizes[0..=planes_available]
        .iter()
        .map(|&b| b as usize)
        .sum();
      let raw = io.read_level_prefix(i, prefix_len)?;
      bytes_read += raw.len();

      let mut offset = 0usize;
      let side_len = component_sizes[0] as usize;
      let side_block = CompressedBlock {
        is_compressed: lossless_flags[0] != 0,
        bytes: raw[offset..offset + side_len].to_vec(),
      };
      offset += side_len;
      let side_data = decompressor.decompress(&side_block)?;

      let mut plane_streams = Vec::with_capacity(planes_available);
      for k in 1..=planes_available {
        let len = component_sizes[k] as usize;
        let block = CompressedBlock {
          is_compressed: lossless_flags[k] != 0,
          bytes: raw[offset..offset + len].to_vec(),
        };
        offset += len;
        plane_streams.push(decompressor.decompress(&block)?);
      }

      let bi: Vec<F> = if use_negabinary {
        NegabinaryCodec.decode(&plane_streams, &side_data, n_i, e_i, p, planes_available)
      } else {
        SignMagnitudeCodec.decode(&plane_streams, &side_data, n_i, e_i, p, planes_available)
      };

      if use_sfc {
        SfcInterleaver.reposition(&bi, dims, fine, coarse, &mut output);
      } else {
        DirectInterleaver.reposition(&bi, dims, fine, coarse, &mut output);
      }
    }

    LinearLevelDecomposer.recompose(&mut output, dims, target_level);

    let report = ReconstructReport {
      tolerance_reached: selection.tolerance_reached,
      achieved_error: selection.achieved_error,
      planes_retrieved: selection.planes,
      bytes_read,
    };
    Ok((output, dims, report))
  }
}
