//! S6: the bit-plane retrieval order is purely a reconstruct-time choice
//! — the component-size table written by a refactor session supports any
//! [`RetrievalOrder`], not just the one a particular reconstruction
//! happens to use.

use mdr_core::config::RetrievalOrder;
use mdr_core::io::MemComponentIo;
use mdr_core::{Reconstructor, ReconstructConfig, Refactor, RefactorConfig};

#[test]
fn swapping_retrieval_order_still_reconstructs_successfully() {
  let dims = [16, 16, 16];
  let data: Vec<f64> = (0..dims[0] * dims[1] * dims[2])
    .map(|i| ((i as f64) * 0.3).cos())
    .collect();
  let config = RefactorConfig::default().with_target_level(3).with_bitplanes(32);

  let mut io = MemComponentIo::new();
  Refactor.run(&data, dims, &config, &mut io).unwrap();

  for order in [RetrievalOrder::Greedy, RetrievalOrder::RoundRobin, RetrievalOrder::InOrder] {
    let reconstruct_config = ReconstructConfig::default()
      .with_tolerance(5e-2)
      .with_retrieval_order(order);
    let (out, out_dims, report) = Reconstructor.run::<f64>(&io, &reconstruct_config).unwrap();
    assert_eq!(out.len(), data.len());
    assert_eq!(out_dims, dims);
    assert!(report.tolerance_reached, "{order:?} failed to reach tolerance");
  }
}
