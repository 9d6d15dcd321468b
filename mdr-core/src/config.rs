//! Refactor/Reconstruct configuration, builder-style like the teacher's
//! `ChunkConfig`: a `Default` base plus chained `with_*` setters.

use crate::constants::{DEFAULT_LOSSLESS_THRESHOLD, DEFAULT_ZSTD_LEVEL};

/// Which [`crate::interleave::Interleaver`] a refactor session uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum InterleaverKind {
  Direct,
  Sfc,
}

/// Which [`crate::bitplane::BitplaneCodec`] a refactor session uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodecKind {
  SignMagnitude,
  Negabinary,
}

/// Which global [`crate::error_est::ErrorEstimator`] a reconstruct session
/// uses.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum ErrorMode {
  LInf,
  Sobolev { s: f64 },
}

/// Which [`crate::size_interpreter::SizeInterpreter`] a reconstruct
/// session uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum RetrievalOrder {
  Greedy,
  RoundRobin,
  InOrder,
}

/// Configuration for [`crate::refactor::Refactor`].
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct RefactorConfig {
  pub target_level: usize,
  pub bitplanes: usize,
  pub interleaver: InterleaverKind,
  pub codec: CodecKind,
  pub lossless: bool,
  pub lossless_threshold: usize,
  pub zstd_level: i32,
}

impl Default for RefactorConfig {
  fn default() -> Self {
    Self {
      target_level: 0,
      bitplanes: 32,
      interleaver: InterleaverKind::Direct,
      codec: CodecKind::SignMagnitude,
      lossless: true,
      lossless_threshold: DEFAULT_LOSSLESS_THRESHOLD,
      zstd_level: DEFAULT_ZSTD_LEVEL,
    }
  }
}

impl RefactorConfig {
  pub fn with_target_level(mut self, target_level: usize) -> Self {
    self.target_level = target_level;
    self
  }

  pub fn with_bitplanes(mut self, bitplanes: usize) -> Self {
    self.bitplanes = bitplanes;
    self
  }

  pub fn with_interleaver(mut self, interleaver: InterleaverKind) -> Self {
    self.interleaver = interleaver;
    self
  }

  pub fn with_codec(mut self, codec: CodecKind) -> Self {
    self.codec = codec;
    self
  }

  pub fn with_lossless(mut self, lossless: bool) -> Self {
    self.lossless = lossless;
    self
  }

  pub fn with_lossless_threshold(mut self, threshold: usize) -> Self {
    self.lossless_threshold = threshold;
    self
  }

  pub fn with_zstd_level(mut self, level: i32) -> Self {
    self.zstd_level = level;
    self
  }
}

/// Configuration for [`crate::reconstruct::Reconstructor`].
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct ReconstructConfig {
  pub tolerance: f64,
  pub mode: ErrorMode,
  pub retrieval_order: RetrievalOrder,
  pub level_weights: Option<Vec<f64>>,
}

impl Default for ReconstructConfig {
  fn default() -> Self {
    Self {
      tolerance: 0.0,
      mode: ErrorMode::LInf,
      retrieval_order: RetrievalOrder::Greedy,
      level_weights: None,
    }
  }
}

impl ReconstructConfig {
  pub fn with_tolerance(mut self, tolerance: f64) -> Self {
    self.tolerance = tolerance;
    self
  }

  pub fn with_mode(mut self, mode: ErrorMode) -> Self {
    self.mode = mode;
    self
  }

  pub fn with_retrieval_order(mut self, retrieval_order: RetrievalOrder) -> Self {
    self.retrieval_order = retrieval_order;
    self
  }

  pub fn with_level_weights(mut self, weights: Vec<f64>) -> Self {
    self.level_weights = Some(weights);
    self
  }
}
