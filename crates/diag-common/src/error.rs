//! Error types for diagnostic interpolation.

use thiserror::Error;

/// Result type alias using DiagError.
pub type DiagResult<T> = Result<T, DiagError>;

/// Errors raised by the interpolation engine.
///
/// `ShapeMismatch`, `ConfigurationConflict`, `InvalidLevel` and
/// `InvalidTimeIndex` are structural and abort a call before any output is
/// produced. `OutOfDomain`, `NonMonotonicColumn` and `DegenerateLine`
/// describe per-point conditions; the engine records the first two as
/// missing values and only surfaces them when a caller asks for a single
/// point explicitly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagError {
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("configuration conflict: {0}")]
    ConfigurationConflict(String),

    #[error("degenerate line: start and end points are identical")]
    DegenerateLine,

    #[error("point ({lat:.4}, {lon:.4}) is outside the grid at time index {time}")]
    OutOfDomain { lat: f64, lon: f64, time: usize },

    #[error("vertical coordinate is not monotonic at x={x}, y={y}")]
    NonMonotonicColumn { x: f64, y: f64 },

    #[error("invalid level specification: {0}")]
    InvalidLevel(String),

    #[error("time index {index} out of range ({available} time steps)")]
    InvalidTimeIndex { index: usize, available: usize },

    #[error("projection error: {0}")]
    Projection(String),
}

impl DiagError {
    /// Create a ShapeMismatch error from anything printable.
    pub fn shape_mismatch(expected: impl std::fmt::Debug, actual: impl std::fmt::Debug) -> Self {
        Self::ShapeMismatch {
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }

    /// Create a ConfigurationConflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::ConfigurationConflict(msg.into())
    }

    /// Whether the error aborts a whole call rather than a single column.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DiagError::ShapeMismatch { .. }
                | DiagError::ConfigurationConflict(_)
                | DiagError::InvalidLevel(_)
                | DiagError::InvalidTimeIndex { .. }
                | DiagError::Projection(_)
        )
    }
}

impl From<serde_json::Error> for DiagError {
    fn from(err: serde_json::Error) -> Self {
        DiagError::ConfigurationConflict(format!("JSON error: {}", err))
    }
}
