//! Error types for the interpolation engine.

use thiserror::Error;

pub use diag_common::DiagError;

/// Why a single column could not be interpolated.
///
/// Column faults are recoverable: the caller marks the column missing and
/// carries on with the rest of the grid.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFault {
    /// Vertical coordinate not strictly monotonic (or contains missing values).
    #[error("vertical coordinate is not strictly monotonic")]
    NonMonotonic,

    /// Column has no levels.
    #[error("column has no levels")]
    Empty,

    /// Coordinate and value profiles differ in length.
    #[error("coordinate profile has {coord} levels, value profile has {values}")]
    LengthMismatch { coord: usize, values: usize },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, DiagError>;
