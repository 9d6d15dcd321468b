//! Adaptive lossless compression of an encoded bit-plane stream.
//!
//! Grounded in `examples/original_source/include/refactor.hpp`'s
//! `AdaptiveLevelCompressor`: a stream is passed through the lossless
//! backend only when doing so is likely to help; tiny streams are stored
//! raw to avoid paying zstd's frame overhead on a handful of bytes.

use crate::constants::{DEFAULT_LOSSLESS_THRESHOLD, DEFAULT_ZSTD_LEVEL};
use crate::errors::{MdrError, MdrResult};

/// A lossless byte-stream compressor applied on top of a bit-plane stream.
pub trait LevelCompressor: Send + Sync {
  /// Returns the possibly-compressed bytes, tagged so `decompress` knows
  /// whether compression was actually applied.
  fn compress(&self, raw: &[u8]) -> CompressedBlock;

  fn decompress(&self, block: &CompressedBlock) -> MdrResult<Vec<u8>>;
}

/// A single `u8` tag precedes the payload on disk: `0` raw, `1` zstd.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressedBlock {
  pub is_compressed: bool,
  pub bytes: Vec<u8>,
}

/// Compresses with zstd whenever `raw.len()` is at least `threshold`
/// bytes *and* compression actually shrinks the stream; otherwise stores
/// the stream raw. Mirrors the original refactorer's `seg_size` special
/// case for small levels, generalized to an arbitrary threshold.
#[derive(Clone, Debug)]
pub struct ZstdLevelCompressor {
  pub threshold: usize,
  pub level: i32,
}

impl Default for ZstdLevelCompressor {
  fn default() -> Self {
    Self {
      threshold: DEFAULT_LOSSLESS_THRESHOLD,
      level: DEFAULT_ZSTD_LEVEL,
    }
  }
}

impl LevelCompressor for ZstdLevelCompressor {
  fn compress(&self, raw: &[u8]) -> CompressedBlock {
    if raw.len() <= self.threshold {
      return CompressedBlock {
        is_compressed: false,
        bytes: raw.to_vec(),
      };
    }
    match zstd::bulk::compress(raw, self.level) {
      Ok(compressed) if compressed.len() < raw.len() => CompressedBlock {
        is_compressed: true,
        bytes: compressed,
      },
      _ => CompressedBlock {
        is_compressed: false,
        bytes: raw.to_vec(),
      },
    }
  }

  fn decompress(&self, block: &CompressedBlock) -> MdrResult<Vec<u8>> {
    if !block.is_compressed {
      return Ok(block.bytes.clone());
    }
    // The original stream is never larger than a handful of megabytes
    // (one bit-plane of one refactor level); cap generously.
    zstd::bulk::decompress(&block.bytes, 256 * 1024 * 1024)
      .map_err(|e| MdrError::corruption(format!("zstd decompression failed: {e}")))
  }
}

/// Stores every stream raw; used when the caller has disabled lossless
/// compression (`--no-lossless`) or in tests where zstd's nondeterministic
/// framing would complicate byte-for-byte assertions.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLevelCompressor;

impl LevelCompressor for NullLevelCompressor {
  fn compress(&self, raw: &[u8]) -> CompressedBlock {
    CompressedBlock {
      is_compressed: false,
      bytes: raw.to_vec(),
    }
  }

  fn decompress(&self, block: &CompressedBlock) -> MdrResult<Vec<u8>> {
    Ok(block.bytes.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_zstd_roundtrip_above_threshold() {
    let compressor = ZstdLevelCompressor {
      threshold: 16,
      level: 3,
    };
    let raw = vec![0u8; 4096];
    let block = compressor.compress(&raw);
    assert!(block.is_compressed);
    assert!(block.bytes.len() < raw.len());
    let decompressed = compressor.decompress(&block).unwrap();
    assert_eq!(decompressed, raw);
  }

  #[test]
  fn test_small_stream_stored_raw() {
    let compressor = ZstdLevelCompressor {
      threshold: 2000,
      level: 3,
    };
    let raw = vec![1u8, 2, 3, 4, 5];
    let block = compressor.compress(&raw);
    assert!(!block.is_compressed);
    assert_eq!(block.bytes, raw);
  }

  #[test]
  fn test_incompressible_stream_falls_back_to_raw() {
    let compressor = ZstdLevelCompressor {
      threshold: 4,
      level: 3,
    };
    // high-entropy stream: zstd typically cannot shrink it
    let raw: Vec<u8> = (0..256u32).flat_map(|x| x.wrapping_mul(2654435761).to_le_bytes()).collect();
    let block = compressor.compress(&raw);
    let decompressed = compressor.decompress(&block).unwrap();
    assert_eq!(decompressed, raw);
  }

  #[test]
  fn test_null_compressor_is_identity() {
    let compressor = NullLevelCompressor;
    let raw = vec![9u8; 1000];
    let block = compressor.compress(&raw);
    assert!(!block.is_compressed);
    assert_eq!(compressor.decompress(&block).unwrap(), raw);
  }
}
