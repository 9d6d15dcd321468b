//! End-to-end refactor/reconstruct scenarios, covering spec scenarios
//! S1-S3 and universal properties 1, 4 and 5.

use mdr_core::config::{CodecKind, ErrorMode, InterleaverKind};
use mdr_core::io::MemComponentIo;
use mdr_core::{Reconstructor, ReconstructConfig, Refactor, RefactorConfig};

fn sin_field(dims: [usize; 3]) -> Vec<f64> {
  let mut data = vec![0.0f64; dims[0] * dims[1] * dims[2]];
  for i in 0..dims[0] {
    for j in 0..dims[1] {
      for k in 0..dims[2] {
        data[i * dims[1] * dims[2] + j * dims[2] + k] = ((i + j + k) as f64).sin();
      }
    }
  }
  data
}

fn linspace_field(dims: [usize; 3]) -> Vec<f64> {
  let n = dims[0] * dims[1] * dims[2];
  (0..n).map(|x| x as f64 / (n - 1) as f64).collect()
}

#[test]
fn s1_all_zero_array_reconstructs_to_all_zeros() {
  let dims = [8, 8, 8];
  let data = vec![0.0f64; dims[0] * dims[1] * dims[2]];
  let config = RefactorConfig::default().with_target_level(2).with_bitplanes(32);

  let mut io = MemComponentIo::new();
  let report = Refactor.run(&data, dims, &config, &mut io).unwrap();
  assert!(report.total_bytes > 0); // metadata alone is non-empty

  let reconstruct_config = ReconstructConfig::default().with_tolerance(0.0);
  let (reconstructed, _dims, report) = Reconstructor.run::<f64>(&io, &reconstruct_config).unwrap();
  assert!(reconstructed.iter().all(|&x| x == 0.0));
  assert_eq!(report.achieved_error, 0.0);
}

#[test]
fn s2_smooth_field_meets_tolerance_and_improves_with_tighter_tolerance() {
  let dims = [16, 16, 16];
  let data = sin_field(dims);
  let config = RefactorConfig::default().with_target_level(3).with_bitplanes(32);

  let mut io = MemComponentIo::new();
  Refactor.run(&data, dims, &config, &mut io).unwrap();

  let loose = ReconstructConfig::default().with_tolerance(1e-2);
  let (loose_out, _, loose_report) = Reconstructor.run::<f64>(&io, &loose).unwrap();
  assert!(loose_report.tolerance_reached);
  let loose_max_err = data
    .iter()
    .zip(&loose_out)
    .fold(0.0f64, |acc, (a, b)| acc.max((a - b).abs()));
  assert!(loose_max_err <= 1e-2);

  let tight = ReconstructConfig::default().with_tolerance(1e-4);
  let (tight_out, _, tight_report) = Reconstructor.run::<f64>(&io, &tight).unwrap();
  let tight_max_err = data
    .iter()
    .zip(&tight_out)
    .fold(0.0f64, |acc, (a, b)| acc.max((a - b).abs()));
  assert!(tight_max_err <= loose_max_err);
  assert!(tight_report.bytes_read >= loose_report.bytes_read);
}

#[test]
fn s3_direct_and_sfc_interleaver_agree_at_full_fidelity() {
  let dims = [32, 32, 32];
  let data = linspace_field(dims);

  for interleaver in [InterleaverKind::Direct, InterleaverKind::Sfc] {
    let config = RefactorConfig::default()
      .with_target_level(0)
      .with_bitplanes(32)
      .with_interleaver(interleaver);
    let mut io = MemComponentIo::new();
    Refactor.run(&data, dims, &config, &mut io).unwrap();

    let reconstruct_config = ReconstructConfig::default().with_tolerance(0.0);
    let (out, _, _) = Reconstructor.run::<f64>(&io, &reconstruct_config).unwrap();
    for (a, b) in data.iter().zip(&out) {
      assert!((a - b).abs() <= 2f64.powi(-23), "{interleaver:?}: {a} vs {b}");
    }
  }
}

#[test]
fn property_1_lossless_roundtrip_at_full_bitplanes() {
  let dims = [8, 8, 8];
  let data = sin_field(dims);
  for codec in [CodecKind::SignMagnitude, CodecKind::Negabinary] {
    let config = RefactorConfig::default()
      .with_target_level(1)
      .with_bitplanes(64)
      .with_codec(codec);
    let mut io = MemComponentIo::new();
    Refactor.run(&data, dims, &config, &mut io).unwrap();

    let reconstruct_config = ReconstructConfig::default().with_tolerance(0.0);
    let (out, _, report) = Reconstructor.run::<f64>(&io, &reconstruct_config).unwrap();
    assert!(report.tolerance_reached);
    for (a, b) in data.iter().zip(&out) {
      assert!((a - b).abs() <= 2f64.powi(-40), "{codec:?}: {a} vs {b}");
    }
  }
}

#[test]
fn f32_end_to_end_roundtrip_meets_relative_tolerance() {
  let dims = [16, 16, 16];
  let data: Vec<f32> = sin_field(dims).iter().map(|&x| x as f32).collect();
  let config = RefactorConfig::default().with_target_level(3).with_bitplanes(32);

  let mut io = MemComponentIo::new();
  Refactor.run(&data, dims, &config, &mut io).unwrap();

  let reconstruct_config = ReconstructConfig::default().with_tolerance(1e-2);
  let (out, out_dims, report) = Reconstructor.run::<f32>(&io, &reconstruct_config).unwrap();
  assert_eq!(out_dims, dims);
  assert!(report.tolerance_reached);
  let max_err = data.iter().zip(&out).fold(0.0f32, |acc, (a, b)| acc.max((a - b).abs()));
  assert!(max_err <= 1e-2);

  let lossless = ReconstructConfig::default().with_tolerance(0.0);
  let (exact, _, exact_report) = Reconstructor.run::<f32>(&io, &lossless).unwrap();
  assert!(exact_report.tolerance_reached);
  for (a, b) in data.iter().zip(&exact) {
    assert!((a - b).abs() <= 2f32.powi(-23), "f32 full-fidelity bound violated: {a} vs {b}");
  }
}

#[test]
fn property_5_sobolev_mode_respects_or_reports_error_bound() {
  let dims = [16, 16, 16];
  let data = sin_field(dims);
  let config = RefactorConfig::default().with_target_level(3).with_bitplanes(32);
  let mut io = MemComponentIo::new();
  Refactor.run(&data, dims, &config, &mut io).unwrap();

  let reconstruct_config = ReconstructConfig::default()
    .with_tolerance(1e-3)
    .with_mode(ErrorMode::Sobolev { s: 1.0 });
  let (_, _, report) = Reconstructor.run::<f64>(&io, &reconstruct_config).unwrap();
  assert!(report.tolerance_reached || report.achieved_error > 1e-3);
}
