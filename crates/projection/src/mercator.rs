//! Mercator projection (WRF `MAP_PROJ = 3`).

use std::f64::consts::PI;

use crate::params::GridProjectionParams;
use crate::transform::MapProjection;
use crate::{wrap_degrees, EARTH_RADIUS_M};

/// Mercator projection true at `truelat1`.
#[derive(Debug, Clone)]
pub struct Mercator {
    /// Central meridian (degrees)
    pub stand_lon: f64,
    pub dx: f64,
    pub dy: f64,
    pub nx: usize,
    pub ny: usize,
    /// Earth radius scaled by cos(truelat1)
    scaled_radius: f64,
    known: (f64, f64),
    origin: (f64, f64),
}

impl Mercator {
    pub fn new(params: &GridProjectionParams) -> Self {
        let mut proj = Self {
            stand_lon: params.stand_lon,
            dx: params.dx,
            dy: params.dy,
            nx: params.nx,
            ny: params.ny,
            scaled_radius: EARTH_RADIUS_M * params.truelat1.to_radians().cos(),
            known: (params.known_x, params.known_y),
            origin: (0.0, 0.0),
        };
        proj.origin = proj.project(params.ref_lat, params.ref_lon);
        proj
    }

    fn project(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let x = self.scaled_radius * wrap_degrees(lon_deg - self.stand_lon).to_radians();
        let y = self.scaled_radius * (PI / 4.0 + lat_deg.to_radians() / 2.0).tan().ln();
        (x, y)
    }
}

impl MapProjection for Mercator {
    fn geo_to_grid(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let (x, y) = self.project(lat_deg, lon_deg);
        // Keep x continuous across the dateline relative to the reference
        let span = 2.0 * PI * self.scaled_radius;
        let mut dx = x - self.origin.0;
        if dx < -span / 2.0 {
            dx += span;
        } else if dx >= span / 2.0 {
            dx -= span;
        }
        (
            self.known.0 + dx / self.dx,
            self.known.1 + (y - self.origin.1) / self.dy,
        )
    }

    fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64) {
        let x = self.origin.0 + (i - self.known.0) * self.dx;
        let y = self.origin.1 + (j - self.known.1) * self.dy;
        let lat = 2.0 * (y / self.scaled_radius).exp().atan() - PI / 2.0;
        let lon = self.stand_lon + (x / self.scaled_radius).to_degrees();
        (lat.to_degrees(), wrap_degrees(lon))
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }
}
