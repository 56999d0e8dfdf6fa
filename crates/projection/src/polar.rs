//! Polar stereographic projection (WRF `MAP_PROJ = 2`).
//!
//! The hemisphere follows the sign of `truelat1`. Projected coordinates are
//! measured from the pole with `+y` pointing away from `stand_lon` in the
//! northern hemisphere, matching the usual WRF orientation where the
//! standard longitude runs up the middle of the grid.

use std::f64::consts::PI;

use crate::params::GridProjectionParams;
use crate::transform::MapProjection;
use crate::{wrap_degrees, EARTH_RADIUS_M};

#[derive(Debug, Clone)]
pub struct PolarStereographic {
    pub stand_lon: f64,
    pub dx: f64,
    pub dy: f64,
    pub nx: usize,
    pub ny: usize,
    /// +1 north, -1 south
    hemi: f64,
    /// R * (1 + sin|truelat1|)
    scale: f64,
    known: (f64, f64),
    origin: (f64, f64),
}

impl PolarStereographic {
    pub fn new(params: &GridProjectionParams) -> Self {
        let hemi = if params.truelat1 < 0.0 { -1.0 } else { 1.0 };
        let mut proj = Self {
            stand_lon: params.stand_lon,
            dx: params.dx,
            dy: params.dy,
            nx: params.nx,
            ny: params.ny,
            hemi,
            scale: EARTH_RADIUS_M * (1.0 + (hemi * params.truelat1).to_radians().sin()),
            known: (params.known_x, params.known_y),
            origin: (0.0, 0.0),
        };
        proj.origin = proj.project(params.ref_lat, params.ref_lon);
        proj
    }

    fn project(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let lat = (self.hemi * lat_deg).to_radians();
        let dlon = wrap_degrees(lon_deg - self.stand_lon).to_radians();
        let rho = self.scale * (PI / 4.0 - lat / 2.0).tan();
        (rho * dlon.sin(), -self.hemi * rho * dlon.cos())
    }
}

impl MapProjection for PolarStereographic {
    fn geo_to_grid(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let (x, y) = self.project(lat_deg, lon_deg);
        (
            self.known.0 + (x - self.origin.0) / self.dx,
            self.known.1 + (y - self.origin.1) / self.dy,
        )
    }

    fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64) {
        let x = self.origin.0 + (i - self.known.0) * self.dx;
        let y = self.origin.1 + (j - self.known.1) * self.dy;
        let rho = x.hypot(y);
        let lat = PI / 2.0 - 2.0 * (rho / self.scale).atan();
        let dlon = if rho == 0.0 { 0.0 } else { x.atan2(-self.hemi * y) };
        (
            self.hemi * lat.to_degrees(),
            wrap_degrees(self.stand_lon + dlon.to_degrees()),
        )
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }
}
