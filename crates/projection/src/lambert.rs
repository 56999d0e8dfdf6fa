//! Lambert Conformal Conic projection (WRF `MAP_PROJ = 1`).
//!
//! Maps a cone tangent or secant to the Earth's surface onto a flat plane.
//! Projected coordinates are measured from the cone apex; grid indices are
//! anchored at the reference point so any grid point can serve as the
//! known location, which is how a moving nest is re-anchored per time step.
//!
//! The projection parameters include:
//! - Standard parallel(s): truelat1 and truelat2 (equal for a tangent cone)
//! - Standard longitude: the central meridian
//! - Reference point: lat/lon of grid index (known_x, known_y)
//! - Grid spacing: dx, dy in meters

use std::f64::consts::PI;

use crate::params::GridProjectionParams;
use crate::transform::MapProjection;
use crate::{wrap_degrees, EARTH_RADIUS_M};

/// Lambert Conformal Conic projection parameters.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian in radians
    pub lon0: f64,
    /// First standard parallel in radians
    pub latin1: f64,
    /// Second standard parallel in radians
    pub latin2: f64,
    /// Grid spacing in X direction (meters)
    pub dx: f64,
    /// Grid spacing in Y direction (meters)
    pub dy: f64,
    /// Number of grid points in X (i) direction
    pub nx: usize,
    /// Number of grid points in Y (j) direction
    pub ny: usize,
    /// Earth radius (meters)
    pub earth_radius: f64,
    /// Grid index of the reference point
    known: (f64, f64),
    /// Cone constant (n); negative in the southern hemisphere
    n: f64,
    /// F constant
    f: f64,
    /// Projected coordinates of the reference point
    origin: (f64, f64),
}

impl LambertConformal {
    /// Build from WRF-style parameters on the WRF sphere.
    pub fn new(params: &GridProjectionParams) -> Self {
        Self::with_radius(params, EARTH_RADIUS_M)
    }

    /// Build with an explicit Earth radius.
    pub fn with_radius(params: &GridProjectionParams, earth_radius: f64) -> Self {
        let latin1 = params.truelat1.to_radians();
        let latin2 = params.truelat2.to_radians();

        // Cone constant
        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;

        let mut proj = Self {
            lon0: params.stand_lon.to_radians(),
            latin1,
            latin2,
            dx: params.dx,
            dy: params.dy,
            nx: params.nx,
            ny: params.ny,
            earth_radius,
            known: (params.known_x, params.known_y),
            n,
            f,
            origin: (0.0, 0.0),
        };
        proj.origin = proj.project(params.ref_lat, params.ref_lon);
        proj
    }

    /// HRRR CONUS grid with the GRIB2 sphere radius.
    ///
    /// - First point: 21.138123°N, -122.719528°E
    /// - Standard longitude: -97.5°
    /// - Standard parallels: 38.5°N (both)
    /// - Grid: 1799 x 1059, 3km spacing
    pub fn hrrr() -> Self {
        let params = GridProjectionParams::lambert(
            38.5, 38.5, -97.5, 21.138123, -122.719528, 3000.0, 3000.0, 1799, 1059,
        );
        Self::with_radius(&params, 6371229.0)
    }

    fn rho(&self, lat: f64) -> f64 {
        self.earth_radius * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n)
    }

    /// Projected coordinates (meters from the cone apex).
    fn project(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let lat = lat_deg.to_radians();
        let dlon = wrap_degrees(lon_deg - self.lon0.to_degrees()).to_radians();
        let rho = self.rho(lat);
        let theta = self.n * dlon;
        (rho * theta.sin(), -rho * theta.cos())
    }

    /// Get the geographic bounding box of the grid.
    ///
    /// Returns (min_lon, min_lat, max_lon, max_lat) in degrees. The edges of
    /// a Lambert grid are curved in geographic space, so this samples the
    /// grid perimeter.
    pub fn geographic_bounds(&self) -> (f64, f64, f64, f64) {
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lon = f64::MAX;
        let mut max_lon = f64::MIN;

        let last_i = self.nx as f64 - 1.0;
        let last_j = self.ny as f64 - 1.0;

        for t in 0..=20 {
            let frac = t as f64 / 20.0;
            for (i, j) in [
                (frac * last_i, 0.0),
                (frac * last_i, last_j),
                (0.0, frac * last_j),
                (last_i, frac * last_j),
            ] {
                let (lat, lon) = self.grid_to_geo(i, j);
                min_lat = min_lat.min(lat);
                max_lat = max_lat.max(lat);
                min_lon = min_lon.min(lon);
                max_lon = max_lon.max(lon);
            }
        }

        (min_lon, min_lat, max_lon, max_lat)
    }
}

impl MapProjection for LambertConformal {
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

        let sign = self.n.signum();
        let rho = sign * x.hypot(y);
        let theta = (sign * x).atan2(-sign * y);

        let lat = 2.0 * (self.earth_radius * self.f / rho).powf(1.0 / self.n).atan() - PI / 2.0;
        let lon = self.lon0 + theta / self.n;

        (lat.to_degrees(), wrap_degrees(lon.to_degrees()))
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }
}
