//! Writer/Retriever storage backend, per `spec.md` §4.7: `metadata.bin`
//! plus one `level_{i}.bin` per level, concatenating that level's
//! components in index order.

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

use crate::errors::{MdrError, MdrResult};

/// Durable storage for a refactored session's metadata and level payload
/// files. Implementations need not be seekable byte streams — the
/// Reconstructor only ever reads a bounded prefix of a level file.
pub trait ComponentIO: Send + Sync {
  fn write_metadata(&mut self, bytes: &[u8]) -> MdrResult<()>;
  fn read_metadata(&self) -> MdrResult<Vec<u8>>;

  fn write_level(&mut self, level: usize, bytes: &[u8]) -> MdrResult<()>;

  /// Reads the first `n` bytes of level `level`'s payload file. Returns
  /// fewer than `n` bytes only if the file itself is shorter (a
  /// corruption condition the caller should reject).
  fn read_level_prefix(&self, level: usize, n: usize) -> MdrResult<Vec<u8>>;
}

/// Real file-backed storage: `metadata.bin` and `level_{i}.bin` inside a
/// directory.
pub struct FsComponentIo {
  dir: PathBuf,
}

impl FsComponentIo {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  fn metadata_path(&self) -> PathBuf {
    self.dir.join("metadata.bin")
  }

  fn level_path(&self, level: usize) -> PathBuf {
    self.dir.join(format!("level_{level}.bin"))
  }
}

impl ComponentIO for FsComponentIo {
  fn write_metadata(&mut self, bytes: &[u8]) -> MdrResult<()> {
    fs::create_dir_all(&self.dir)?;
    fs::write(self.metadata_path(), bytes)?;
    Ok(())
  }

  fn read_metadata(&self) -> MdrResult<Vec<u8>> {
    Ok(fs::read(self.metadata_path())?)
  }

  fn write_level(&mut self, level: usize, bytes: &[u8]) -> MdrResult<()> {
    fs::create_dir_all(&self.dir)?;
    fs::write(self.level_path(level), bytes)?;
    Ok(())
  }

  fn read_level_prefix(&self, level: usize, n: usize) -> MdrResult<Vec<u8>> {
    let mut file = fs::File::open(self.level_path(level))?;
    let mut buf = vec![0u8; n];
    let mut filled = 0;
    loop {
      let read = file.read(&mut buf[filled..])?;
      if read == 0 {
        break;
      }
      filled += read;
      if filled == n {
        break;
      }
    }
    buf.truncate(filled);
    if filled < n {
      return Err(MdrError::corruption(format!(
        "level {level} payload shorter than requested prefix ({filled} < {n})"
      )));
    }
    Ok(buf)
  }
}

/// In-memory storage, used by unit and integration tests so they don't
/// need a tempdir per case.
#[derive(Default)]
pub struct MemComponentIo {
  metadata: Vec<u8>,
  levels: HashMap<usize, Vec<u8>>,
}

impl MemComponentIo {
  pub fn new() -> Self {
    Self::default()
  }
}

impl ComponentIO for MemComponentIo {
  fn write_metadata(&mut self, bytes: &[u8]) -> MdrResult<()> {
    self.metadata = bytes.to_vec();
    Ok(())
  }

  fn read_metadata(&self) -> MdrResult<Vec<u8>> {
    Ok(self.metadata.clone())
  }

  fn write_level(&mut self, level: usize, bytes: &[u8]) -> MdrResult<()> {
    self.levels.insert(level, bytes.to_vec());
    Ok(())
  }

  fn read_level_prefix(&self, level: usize, n: usize) -> MdrResult<Vec<u8>> {
    let bytes = self
      .levels
      .get(&level)
      .ok_or_else(|| MdrError::corruption(format!("no level {level} payload written")))?;
    if bytes.len() < n {
      return Err(MdrError::corruption(format!(
        "level {level} payload shorter than requested prefix ({} < {n})",
        bytes.len()
      )));
    }
    Ok(bytes[..n].to_vec())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mem_component_io_roundtrip() {
    let mut io = MemComponentIo::new();
    io.write_metadata(b"meta").unwrap();
    io.write_level(0, b"level0payload").unwrap();
    assert_eq!(io.read_metadata().unwrap(), b"meta");
    assert_eq!(io.read_level_prefix(0, 5).unwrap(), b"level");
  }

  #[test]
  fn test_mem_component_io_short_prefix_is_corruption() {
    let mut io = MemComponentIo::new();
    io.write_level(0, b"ab").unwrap();
    assert!(io.read_level_prefix(0, 10).is_err());
  }

  #[test]
  fn test_fs_component_io_roundtrip() {
    let dir = std::env::temp_dir().join(format!("mdr-test-{}", std::process::id()));
    let mut io = FsComponentIo::new(&dir);
    io.write_metadata(b"hello").unwrap();
    io.write_level(2, b"level2bytes").unwrap();
    assert_eq!(io.read_metadata().unwrap(), b"hello");
    assert_eq!(io.read_level_prefix(2, 6).unwrap(), b"level2");
    let _ = fs::remove_dir_all(&dir);
  }
}
