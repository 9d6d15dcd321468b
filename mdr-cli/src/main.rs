use anyhow::Result;
use clap::Parser;

use crate::opt::{Opt, OptWrapper};

mod opt;
mod raw_array;
mod reconstruct;
mod refactor;

fn main() -> Result<()> {
  let opt = OptWrapper::parse().opt;
  match opt {
    Opt::Refactor(refactor_opt) => refactor::refactor(refactor_opt),
    Opt::Reconstruct(reconstruct_opt) => reconstruct::reconstruct(reconstruct_opt),
  }
}
