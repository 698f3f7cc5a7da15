//! Error type shared by every fallible operation in the crate.
//!
//! Only caller mistakes surface here. Degenerate input that the engine can
//! absorb (non-RGB data in a channel-only paint mode, odd crossing counts
//! during scan conversion, a collapsed transform) degrades to a sensible
//! default instead and at most logs a diagnostic.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by pixel, region and transform operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Shapes, kernel parameters or bytes-per-pixel values that do not fit
    /// together.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A slice is shorter than the geometry laid over it requires.
    #[error("buffer too short: need {needed} bytes, have {available}")]
    OutOfBounds { needed: usize, available: usize },

    /// A matrix with zero determinant was asked for its inverse.
    #[error("matrix is singular (determinant is zero)")]
    SingularMatrix,
}

/// Fieldless discriminant of [`Error`], handy for matching in callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    OutOfBounds,
    SingularMatrix,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::OutOfBounds { .. } => ErrorKind::OutOfBounds,
            Error::SingularMatrix => ErrorKind::SingularMatrix,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

/// Fail with [`Error::OutOfBounds`] unless `available >= needed`.
#[inline]
pub(crate) fn ensure_len(needed: usize, available: usize) -> Result<()> {
    if available < needed {
        return Err(Error::OutOfBounds { needed, available });
    }
    Ok(())
}
