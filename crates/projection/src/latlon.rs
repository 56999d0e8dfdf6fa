//! Cylindrical equidistant grids (WRF `MAP_PROJ = 6`), plain and rotated.
//!
//! Grid spacing is in degrees. A rotated grid is an equidistant grid laid out
//! in a rotated frame whose north pole sits at (`pole_lat`, `pole_lon`) in
//! geographic coordinates.

use nalgebra::{Rotation3, Vector3};
use std::f64::consts::FRAC_PI_2;

use crate::params::GridProjectionParams;
use crate::transform::MapProjection;
use crate::wrap_degrees;

/// Unrotated lat-lon grid.
#[derive(Debug, Clone)]
pub struct LatLonGrid {
    pub ref_lat: f64,
    pub ref_lon: f64,
    /// Longitude increment (degrees)
    pub dlon: f64,
    /// Latitude increment (degrees)
    pub dlat: f64,
    pub nx: usize,
    pub ny: usize,
    known: (f64, f64),
}

impl LatLonGrid {
    pub fn new(params: &GridProjectionParams) -> Self {
        Self {
            ref_lat: params.ref_lat,
            ref_lon: params.ref_lon,
            dlon: params.dx,
            dlat: params.dy,
            nx: params.nx,
            ny: params.ny,
            known: (params.known_x, params.known_y),
        }
    }

    /// Column index for a longitude, choosing the 360° branch that lands in
    /// (or nearest to) the grid so global grids indexed from any meridian
    /// resolve correctly.
    fn column(&self, lon: f64) -> f64 {
        let east = (lon - self.ref_lon).rem_euclid(360.0);
        let candidates = [east, east - 360.0].map(|d| self.known.0 + d / self.dlon);
        let last = self.nx as f64 - 1.0;
        let outside = |i: f64| {
            if i < 0.0 {
                -i
            } else if i > last {
                i - last
            } else {
                0.0
            }
        };
        if outside(candidates[1]) < outside(candidates[0]) {
            candidates[1]
        } else {
            candidates[0]
        }
    }
}

impl MapProjection for LatLonGrid {
    fn geo_to_grid(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        (
            self.column(lon_deg),
            self.known.1 + (lat_deg - self.ref_lat) / self.dlat,
        )
    }

    fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64) {
        (
            self.ref_lat + (j - self.known.1) * self.dlat,
            wrap_degrees(self.ref_lon + (i - self.known.0) * self.dlon),
        )
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }
}

/// Lat-lon grid in a rotated pole frame.
#[derive(Debug, Clone)]
pub struct RotatedLatLon {
    /// Geographic -> rotated frame
    rotation: Rotation3<f64>,
    /// Equidistant grid expressed in rotated coordinates
    grid: LatLonGrid,
}

impl RotatedLatLon {
    pub fn new(params: &GridProjectionParams) -> Self {
        let pole_lat = params.pole_lat.to_radians();
        let pole_lon = params.pole_lon.to_radians();
        // Bring the rotated pole onto the z axis: spin it to lon 0, then tilt.
        let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), -(FRAC_PI_2 - pole_lat))
            * Rotation3::from_axis_angle(&Vector3::z_axis(), -pole_lon);

        let (rlat, rlon) = rotate(&rotation, params.ref_lat, params.ref_lon);
        let grid = LatLonGrid {
            ref_lat: rlat,
            ref_lon: rlon,
            dlon: params.dx,
            dlat: params.dy,
            nx: params.nx,
            ny: params.ny,
            known: (params.known_x, params.known_y),
        };
        Self { rotation, grid }
    }

    /// Geographic to rotated-frame (lat, lon) in degrees.
    pub fn to_rotated(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        rotate(&self.rotation, lat_deg, lon_deg)
    }

    /// Rotated-frame to geographic (lat, lon) in degrees.
    pub fn to_geographic(&self, rlat_deg: f64, rlon_deg: f64) -> (f64, f64) {
        rotate(&self.rotation.inverse(), rlat_deg, rlon_deg)
    }
}

fn rotate(rotation: &Rotation3<f64>, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
    let (lat, lon) = (lat_deg.to_radians(), lon_deg.to_radians());
    let v = Vector3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin());
    let r = rotation * v;
    let z = r.z.clamp(-1.0, 1.0);
    (z.asin().to_degrees(), r.y.atan2(r.x).to_degrees())
}

impl MapProjection for RotatedLatLon {
    fn geo_to_grid(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let (rlat, rlon) = self.to_rotated(lat_deg, lon_deg);
        self.grid.geo_to_grid(rlat, rlon)
    }

    fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64) {
        let (rlat, rlon) = self.grid.grid_to_geo(i, j);
        self.to_geographic(rlat, rlon)
    }

    fn dimensions(&self) -> (usize, usize) {
        self.grid.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ProjectionKind;

    #[test]
    fn test_latlon_indices() {
        let params = GridProjectionParams::latlon(20.0, -130.0, 0.25, 0.25, 241, 121);
        let proj = LatLonGrid::new(&params);
        let (i, j) = proj.geo_to_grid(30.0, -100.0);
        assert!((i - 120.0).abs() < 1e-9);
        assert!((j - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_global_grid_wraps_dateline() {
        let params = GridProjectionParams::latlon(-90.0, 0.0, 1.0, 1.0, 360, 181);
        let proj = LatLonGrid::new(&params);
        let (i, _) = proj.geo_to_grid(0.0, -10.0);
        assert!((i - 350.0).abs() < 1e-9);
        let (_, lon) = proj.grid_to_geo(350.0, 90.0);
        assert!((lon - (-10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_point_west_of_regional_grid_is_negative() {
        let params = GridProjectionParams::latlon(20.0, -130.0, 0.25, 0.25, 241, 121);
        let proj = LatLonGrid::new(&params);
        let (i, _) = proj.geo_to_grid(30.0, -131.0);
        assert!((i + 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_unrotated_pole_matches_latlon() {
        let mut params = GridProjectionParams::latlon(20.0, -130.0, 0.25, 0.25, 241, 121);
        params.kind = ProjectionKind::RotatedLatLon;
        let rotated = RotatedLatLon::new(&params);
        let plain = LatLonGrid::new(&params);

        let (i1, j1) = rotated.geo_to_grid(31.0, -101.5);
        let (i2, j2) = plain.geo_to_grid(31.0, -101.5);
        assert!((i1 - i2).abs() < 1e-6);
        assert!((j1 - j2).abs() < 1e-6);
    }

    #[test]
    fn test_rotated_roundtrip() {
        let mut params = GridProjectionParams::latlon(-10.0, -15.0, 0.1, 0.1, 300, 200);
        params.kind = ProjectionKind::RotatedLatLon;
        params.pole_lat = 39.25;
        params.pole_lon = -162.0;
        let proj = RotatedLatLon::new(&params);

        let (i, j) = proj.geo_to_grid(params.ref_lat, params.ref_lon);
        assert!(i.abs() < 1e-9 && j.abs() < 1e-9);

        let (lat, lon) = proj.grid_to_geo(150.0, 100.0);
        let (i, j) = proj.geo_to_grid(lat, lon);
        assert!((i - 150.0).abs() < 1e-6, "i={}", i);
        assert!((j - 100.0).abs() < 1e-6, "j={}", j);
    }

    #[test]
    fn test_rotated_pole_maps_to_rotated_north() {
        let mut params = GridProjectionParams::latlon(0.0, 0.0, 0.1, 0.1, 10, 10);
        params.kind = ProjectionKind::RotatedLatLon;
        params.pole_lat = 40.0;
        params.pole_lon = 10.0;
        let proj = RotatedLatLon::new(&params);
        let (rlat, _) = proj.to_rotated(40.0, 10.0);
        assert!((rlat - 90.0).abs() < 1e-5);
    }
}
