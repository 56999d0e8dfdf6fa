//! Common interface over the supported projections.

use crate::error::Result;
use crate::lambert::LambertConformal;
use crate::latlon::{LatLonGrid, RotatedLatLon};
use crate::mercator::Mercator;
use crate::params::{GridProjectionParams, ProjectionKind};
use crate::polar::PolarStereographic;

/// A projection between geographic coordinates and fractional grid indices.
pub trait MapProjection {
    /// Convert latitude/longitude (degrees) to grid indices `(i, j)`.
    ///
    /// `i` is the west-east index, `j` the south-north index. Results are
    /// fractional and may fall outside the grid.
    fn geo_to_grid(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64);

    /// Convert grid indices to `(lat, lon)` in degrees.
    fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64);

    /// Grid dimensions `(nx, ny)`.
    fn dimensions(&self) -> (usize, usize);

    /// Check if a geographic point falls inside `[0, nx-1] x [0, ny-1]`.
    fn contains(&self, lat_deg: f64, lon_deg: f64) -> bool {
        let (i, j) = self.geo_to_grid(lat_deg, lon_deg);
        let (nx, ny) = self.dimensions();
        let eps = 1e-6;
        i >= -eps && j >= -eps && i <= nx as f64 - 1.0 + eps && j <= ny as f64 - 1.0 + eps
    }
}

/// A concrete projection built from [`GridProjectionParams`].
#[derive(Debug, Clone)]
pub enum Projection {
    Lambert(LambertConformal),
    Polar(PolarStereographic),
    Mercator(Mercator),
    LatLon(LatLonGrid),
    Rotated(RotatedLatLon),
}

impl Projection {
    /// Validate the parameters and build the matching projection.
    pub fn from_params(params: &GridProjectionParams) -> Result<Self> {
        params.validate()?;
        Ok(match params.kind {
            ProjectionKind::LambertConformal => Self::Lambert(LambertConformal::new(params)),
            ProjectionKind::PolarStereographic => Self::Polar(PolarStereographic::new(params)),
            ProjectionKind::Mercator => Self::Mercator(Mercator::new(params)),
            ProjectionKind::LatLon => Self::LatLon(LatLonGrid::new(params)),
            ProjectionKind::RotatedLatLon => Self::Rotated(RotatedLatLon::new(params)),
        })
    }

    fn inner(&self) -> &dyn MapProjection {
        match self {
            Self::Lambert(p) => p,
            Self::Polar(p) => p,
            Self::Mercator(p) => p,
            Self::LatLon(p) => p,
            Self::Rotated(p) => p,
        }
    }
}

impl MapProjection for Projection {
    fn geo_to_grid(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        self.inner().geo_to_grid(lat_deg, lon_deg)
    }

    fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64) {
        self.inner().grid_to_geo(i, j)
    }

    fn dimensions(&self) -> (usize, usize) {
        self.inner().dimensions()
    }
}
