use clap::{Parser, Subcommand};

use crate::reconstruct::ReconstructOpt;
use crate::refactor::RefactorOpt;

#[derive(Clone, Debug, Parser)]
#[command(about = "refactor and reconstruct multidimensional floating-point arrays")]
pub struct OptWrapper {
  #[command(subcommand)]
  pub opt: Opt,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Opt {
  Refactor(RefactorOpt),
  Reconstruct(ReconstructOpt),
}
