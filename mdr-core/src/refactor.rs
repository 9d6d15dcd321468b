//! The Refactor façade: `decompose -> {interleave, encode, compress} per
//! level -> write`, per `spec.md` §4.8. Grounded in
//! `examples/original_source/test/test_refactor.cpp`'s composition of a
//! decomposer, interleaver, bit-plane encoder, level compressor and error
//! collector behind one entry point.

use crate::bitplane::negabinary::NegabinaryCodec;
use crate::bitplane::sign_magnitude::SignMagnitudeCodec;
use crate::bitplane::BitplaneCodec;
use crate::compressor::{LevelCompressor, NullLevelCompressor, ZstdLevelCompressor};
use crate::config::{CodecKind, InterleaverKind, RefactorConfig};
use crate::decompose::{LevelDecomposer, LinearLevelDecomposer};
use crate::error_est::{ErrorCollector, MaxErrorCollector, SquaredErrorCollector};
use crate::errors::{MdrError, MdrResult};
use crate::exponent::level_exponent;
use crate::grid::{level_counts, level_grids, max_supported_level, validate_dims};
use crate::interleave::{DirectInterleaver, Interleaver, SfcInterleaver};
use crate::io::ComponentIO;
use crate::metadata::Metadata;
use crate::types::{num_elements, Dims, Float};

/// Summary of one `Refactor::run` call, in the spirit of the teacher's
/// `Progress` struct: observability data returned to the caller rather
/// than logged.
#[derive(Clone, Debug, PartialEq)]
pub struct RefactorReport {
  pub num_levels: usize,
  pub total_bytes: usize,
  pub bytes_per_level: Vec<usize>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Refactor;

impl Refactor {
  pub fn run<F: Float>(
    &self,
    data: &[F],
    dims: Dims,
    config: &RefactorConfig,
    io: &mut dyn ComponentIO,
  ) -> MdrResult<RefactorReport> {
    validate_dims(dims)?;
    if data.len() != num_elements(dims) {
      return Err(MdrError::precondition(format!(
        "data length {} does not match dims {:?} ({} elements)",
        data.len(),
        dims,
        num_elements(dims)
      )));
    }
    if config.target_level > max_supported_level(dims) {
      return Err(MdrError::precondition(format!(
        "target_level {} exceeds max supported level {} for dims {:?}",
        config.target_level,
        max_supported_level(dims),
        dims
      )));
    }
    if config.codec == CodecKind::Negabinary && config.bitplanes % 2 != 0 {
      return Err(MdrError::precondition(
        "negabinary encoding requires an even bit-plane count",
      ));
    }
    if !data.iter().all(|x| x.is_finite()) {
      return Err(MdrError::precondition("input contains non-finite values"));
    }

    let mut buf: Vec<F> = data.to_vec();
    LinearLevelDecomposer.decompose(&mut buf, dims, config.target_level);

    let grids = level_grids(dims, config.target_level);
    let counts = level_counts(&grids);
    let p = config.bitplanes;

    let mut level_elements = Vec::with_capacity(grids.len());
    let mut level_error_bounds = Vec::with_capacity(grids.len());
    let mut component_sizes = Vec::with_capacity(grids.len());
    let mut bitplane_indicators = Vec::with_capacity(grids.len());
    let mut lossless_indicators = Vec::with_capacity(grids.len());
    let mut max_e = Vec::with_capacity(grids.len());
    let mut mse = Vec::with_capacity(grids.len());
    let mut bytes_per_level = Vec::with_capacity(grids.len());
    let min_val = data.iter().fold(f64::INFINITY, |acc, x| acc.min(x.to_f64()));
    let max_val = data.iter().fold(f64::NEG_INFINITY, |acc, x| acc.max(x.to_f64()));

    for (i, &fine) in grids.iter().enumerate() {
      let coarse = if i == 0 { [0, 0, 0] } else { grids[i - 1] };
      let n_i = counts[i];

      let mut bi = vec![F::ZERO; n_i];
      match config.interleaver {
        InterleaverKind::Direct => DirectInterleaver.interleave(&buf, dims, fine, coarse, &mut bi),
        InterleaverKind::Sfc => SfcInterleaver.interleave(&buf, dims, fine, coarse, &mut bi),
      }

      let max_abs = bi.iter().fold(0f64, |acc, x| acc.max(x.to_f64().abs()));
      let e_i = level_exponent(max_abs);

      let encoded = match config.codec {
        CodecKind::SignMagnitude => BitplaneCodec::<F>::encode(&SignMagnitudeCodec, &bi, e_i, p),
        CodecKind::Negabinary => BitplaneCodec::<F>::encode(&NegabinaryCodec, &bi, e_i, p),
      };

      let compress = |raw: &[u8]| -> crate::compressor::CompressedBlock {
        if config.lossless {
          ZstdLevelCompressor {
            threshold: config.lossless_threshold,
            level: config.zstd_level,
          }
          .compress(raw)
        } else {
          NullLevelCompressor.compress(raw)
        }
      };

      let side_block = compress(&encoded.side_data);
      let plane_blocks: Vec<_> = encoded.planes.iter().map(|raw| compress(raw)).collect();

      let mut payload = Vec::new();
      payload.extend_from_slice(&side_block.bytes);
      for block in &plane_blocks {
        payload.extend_from_slice(&block.bytes);
      }
      io.write_level(i, &payload)?;
      bytes_per_level.push(payload.len());

      let mut sizes_i = Vec::with_capacity(p + 1);
      sizes_i.push(side_block.bytes.len() as u64);
      sizes_i.extend(plane_blocks.iter().map(|b| b.bytes.len() as u64));

      let mut lossless_i = Vec::with_capacity(p + 1);
      lossless_i.push(side_block.is_compressed as u8);
      lossless_i.extend(plane_blocks.iter().map(|b| b.is_compressed as u8));

      let mut max_e_i = Vec::with_capacity(p + 1);
      let mut mse_i = Vec::with_capacity(p + 1);
      for planes_available in 0..=p {
        let decoded: Vec<F> = match config.codec {
          CodecKind::SignMagnitude => {
            SignMagnitudeCodec.decode(&encoded.planes, &encoded.side_data, n_i, e_i, p, planes_available)
          }
          CodecKind::Negabinary => {
            NegabinaryCodec.decode(&encoded.planes, &encoded.side_data, n_i, e_i, p, planes_available)
          }
        };
        max_e_i.push(MaxErrorCollector.collect(&bi, &decoded));
        let sq = SquaredErrorCollector.collect(&bi, &decoded);
        mse_i.push(if n_i == 0 { 0.0 } else { sq / n_i as f64 });
      }

      level_elements.push(n_i as u64);
      level_error_bounds.push(max_abs);
      component_sizes.push(sizes_i);
      bitplane_indicators.push(vec![0u8; p + 1]);
      lossless_indicators.push(lossless_i);
      max_e.push(max_e_i);
      mse.push(mse_i);
    }

    let total_encoded_size: u64 = bytes_per_level.iter().map(|&b| b as u64).sum();

    // flat (level, component) enumeration in storage order; see
    // DESIGN.md for why reconstruction is driven directly from
    // `component_sizes` rather than by replaying this sequence.
    let order: Vec<i32> = (0..grids.len() as i32 * (p as i32 + 1)).collect();

    let metadata = Metadata {
      // `option` packs both variant choices the Reconstructor needs to
      // replay the same traversal/encoding: bit 0 selects the bit-plane
      // codec, bit 1 the interleaver. There is no separate metadata field
      // for interleaver kind in spec.md §6's table, so it rides along here.
      option: {
        let codec_bit = match config.codec {
          CodecKind::SignMagnitude => 0,
          CodecKind::Negabinary => 1,
        };
        let interleaver_bit = match config.interleaver {
          InterleaverKind::Direct => 0,
          InterleaverKind::Sfc => 1,
        };
        codec_bit | (interleaver_bit << 1)
      },
      encoded_bitplanes: p as i32,
      level_elements,
      level_error_bounds,
      dims: dims.iter().map(|&d| d as u64).collect(),
      order,
      mode: 0,
      data_reorganization: 2,
      max_val,
      min_val,
      total_encoded_size,
      component_sizes,
      bitplane_indicators,
      lossless_indicators,
      max_e: Some(max_e),
      mse: Some(mse),
    };
    io.write_metadata(&metadata.serialize(F::BITS))?;

    Ok(RefactorReport {
      num_levels: grids.len(),
      total_bytes: total_encoded_size as usize,
      bytes_per_level,
    })
  }
}
