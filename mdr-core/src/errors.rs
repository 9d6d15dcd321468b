use std::error::Error;
use std::fmt::{Display, Formatter};
use std::{fmt, io};

/// The different kinds of errors this crate can return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
  /// The caller's arguments violate a precondition: mismatched dims,
  /// unsupported dimensionality, an oversized or odd bit-plane count, or
  /// an unknown mode/reorganization id.
  Precondition,
  /// The on-disk metadata or a component file is missing, short, or
  /// otherwise fails to decode consistently with its declared lengths.
  Corruption,
  /// `Io` errors are propagated from `Read`/`Write` implementations
  /// passed to this crate.
  Io(io::ErrorKind),
  /// Reserved for a future on-disk format revision; unused by the current
  /// single format version.
  Compatibility,
}

/// The error type used for all fallible operations in this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MdrError {
  pub kind: ErrorKind,
  pub message: String,
}

impl MdrError {
  pub(crate) fn new<S: AsRef<str>>(kind: ErrorKind, message: S) -> Self {
    MdrError {
      kind,
      message: message.as_ref().to_string(),
    }
  }

  pub(crate) fn precondition<S: AsRef<str>>(message: S) -> Self {
    Self::new(ErrorKind::Precondition, message)
  }

  pub(crate) fn corruption<S: AsRef<str>>(message: S) -> Self {
    Self::new(ErrorKind::Corruption, message)
  }
}

impl Display for MdrError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "mdr {:?} error: {}", self.kind, &self.message)
  }
}

impl From<io::Error> for MdrError {
  fn from(err: io::Error) -> Self {
    MdrError {
      kind: ErrorKind::Io(err.kind()),
      message: format!("{}", err),
    }
  }
}

impl Error for MdrError {}

pub type MdrResult<T> = Result<T, MdrError>;
