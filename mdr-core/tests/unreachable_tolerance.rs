//! S5: an unreachably tight tolerance must not error. The reconstructor
//! retrieves every available bit-plane, reports that the tolerance was
//! not reached, and still returns a full-size tensor.

use mdr_core::io::MemComponentIo;
use mdr_core::{Reconstructor, ReconstructConfig, Refactor, RefactorConfig};

#[test]
fn impossible_tolerance_exhausts_planes_without_failing() {
  let dims = [8, 8, 8];
  let data: Vec<f64> = (0..dims[0] * dims[1] * dims[2])
    .map(|i| (i as f64).sin() * 1e3)
    .collect();
  let config = RefactorConfig::default().with_target_level(2).with_bitplanes(16);

  let mut io = MemComponentIo::new();
  Refactor.run(&data, dims, &config, &mut io).unwrap();

  let reconstruct_config = ReconstructConfig::default().with_tolerance(1e-20);
  let (out, out_dims, report) = Reconstructor.run::<f64>(&io, &reconstruct_config).unwrap();

  assert_eq!(out.len(), data.len());
  assert_eq!(out_dims, dims);
  assert!(!report.tolerance_reached);
  assert!(report.planes_retrieved.iter().all(|&p| p == 16));
}
