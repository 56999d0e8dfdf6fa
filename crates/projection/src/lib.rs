//! Coordinate reference system transformations.
//!
//! Implements the WRF map projections from scratch on a spherical Earth,
//! plus [`GridProjection`], which holds one projection per time step so a
//! moving nest can be resolved at any time index.

pub mod error;
pub mod lambert;
pub mod latlon;
pub mod mercator;
pub mod nest;
pub mod params;
pub mod polar;
pub mod transform;

pub use error::{ProjectionError, Result};
pub use lambert::LambertConformal;
pub use latlon::{LatLonGrid, RotatedLatLon};
pub use mercator::Mercator;
pub use nest::{GridProjection, IndexMode, IndexResult};
pub use params::{GridProjectionParams, ProjectionKind};
pub use polar::PolarStereographic;
pub use transform::{MapProjection, Projection};

/// Radius of the WRF spherical Earth in meters.
pub const EARTH_RADIUS_M: f64 = 6_370_000.0;

/// Wrap a longitude difference (degrees) into [-180, 180).
pub(crate) fn wrap_degrees(d: f64) -> f64 {
    (d + 180.0).rem_euclid(360.0) - 180.0
}
