//! Progressive, error-bounded lossy refactoring and reconstruction of
//! dense 3-D floating-point arrays.
//!
//! A [`refactor::Refactor`] decomposes an array into a pyramid of
//! successively finer correction levels, bit-plane encodes each level's
//! coefficients, and writes them through a [`io::ComponentIO`] backend
//! alongside a [`metadata::Metadata`] sidecar. A [`reconstruct::Reconstructor`]
//! later reads back only as many bit-planes per level as a chosen
//! [`error_est::ErrorEstimator`]/[`size_interpreter::SizeInterpreter`] pair
//! decide are needed to meet a caller's error tolerance, and recomposes a
//! full-size array from whatever was retrieved.
//!
//! # API notes
//!
//! * Only 3-D arrays of `f32`/`f64` are supported; see [`types::Dims`].
//! * Every fallible operation returns [`errors::MdrResult`].
//! * [`config::RefactorConfig`] and [`config::ReconstructConfig`] are
//!   builder-style: start from `::default()` and chain `with_*` calls.

#![deny(clippy::unused_unit)]

pub use config::{CodecKind, ErrorMode, InterleaverKind, ReconstructConfig, RefactorConfig, RetrievalOrder};
pub use errors::{ErrorKind, MdrError, MdrResult};
pub use reconstruct::{Reconstructor, ReconstructReport};
pub use refactor::{Refactor, RefactorReport};
pub use types::{Dims, Float};

/// bit-plane encoding variants: [`bitplane::sign_magnitude`] and [`bitplane::negabinary`]
pub mod bitplane;
/// lossless compression of an encoded bit-plane stream
pub mod compressor;
pub mod config;
/// the multigrid decomposer/recomposer
pub mod decompose;
/// error collection and global error estimation
pub mod error_est;
pub mod errors;
/// storage backends for refactored sessions: real files or in-memory
pub mod io;
/// the level interleaver
pub mod interleave;
/// `metadata.bin` binary layout
pub mod metadata;
pub mod reconstruct;
pub mod refactor;
/// per-level bit-plane retrieval policy
pub mod size_interpreter;
pub mod types;

mod constants;
mod exponent;
mod grid;
