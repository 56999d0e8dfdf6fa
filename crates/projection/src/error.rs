//! Error types for projection operations.

use diag_common::DiagError;
use thiserror::Error;

/// Errors that can occur while building or evaluating a projection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// A projection parameter is missing or out of range.
    #[error("invalid projection parameter: {0}")]
    InvalidParameter(String),

    /// Unsupported WRF MAP_PROJ code.
    #[error("unsupported map projection code {0}")]
    UnsupportedMapProj(i32),

    /// A geographic point maps outside the grid.
    #[error("point ({lat:.4}, {lon:.4}) maps outside the grid at time index {time}")]
    OutOfDomain { lat: f64, lon: f64, time: usize },

    /// A projection needs at least one time step.
    #[error("grid projection has no time steps")]
    NoTimeSteps,

    /// Time index beyond the available steps.
    #[error("time index {index} out of range ({available} time steps)")]
    InvalidTimeIndex { index: usize, available: usize },
}

impl ProjectionError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

impl From<ProjectionError> for DiagError {
    fn from(err: ProjectionError) -> Self {
        match err {
            ProjectionError::OutOfDomain { lat, lon, time } => {
                DiagError::OutOfDomain { lat, lon, time }
            }
            ProjectionError::InvalidTimeIndex { index, available } => {
                DiagError::InvalidTimeIndex { index, available }
            }
            other => DiagError::Projection(other.to_string()),
        }
    }
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
