//! Per-time-step map projection parameters.
//!
//! Field names follow the WRF global attributes (`TRUELAT1`, `STAND_LON`,
//! `DX`, ...). The reference point (`ref_lat`, `ref_lon`) is the location of
//! grid index (`known_x`, `known_y`); for WRF output this is normally the
//! lower-left mass point, `XLAT[0,0]` / `XLONG[0,0]`, which changes between
//! time steps for a moving nest.

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

/// Supported map projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    LambertConformal,
    PolarStereographic,
    Mercator,
    LatLon,
    RotatedLatLon,
}

impl ProjectionKind {
    /// Resolve a WRF `MAP_PROJ` code.
    ///
    /// Code 6 (and 0) is a cylindrical equidistant grid; it is rotated unless
    /// the pole sits at the geographic north pole.
    pub fn from_map_proj(code: i32, pole_lat: f64, pole_lon: f64) -> Result<Self> {
        match code {
            1 => Ok(Self::LambertConformal),
            2 => Ok(Self::PolarStereographic),
            3 => Ok(Self::Mercator),
            0 | 6 => {
                if (pole_lat - 90.0).abs() < 1e-9 && pole_lon.abs() < 1e-9 {
                    Ok(Self::LatLon)
                } else {
                    Ok(Self::RotatedLatLon)
                }
            }
            other => Err(ProjectionError::UnsupportedMapProj(other)),
        }
    }

    /// Whether `dx`/`dy` are expressed in degrees rather than meters.
    pub fn spacing_in_degrees(&self) -> bool {
        matches!(self, Self::LatLon | Self::RotatedLatLon)
    }
}

/// Projection parameters plus grid extent for one time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridProjectionParams {
    pub kind: ProjectionKind,
    /// First true latitude (degrees)
    #[serde(default)]
    pub truelat1: f64,
    /// Second true latitude (degrees); equal to `truelat1` for a tangent cone
    #[serde(default)]
    pub truelat2: f64,
    /// Standard longitude (degrees)
    #[serde(default)]
    pub stand_lon: f64,
    /// Latitude of the reference grid point (degrees)
    pub ref_lat: f64,
    /// Longitude of the reference grid point (degrees)
    pub ref_lon: f64,
    /// Grid x index of the reference point
    #[serde(default)]
    pub known_x: f64,
    /// Grid y index of the reference point
    #[serde(default)]
    pub known_y: f64,
    /// Grid spacing in x (meters, or degrees for lat-lon grids)
    pub dx: f64,
    /// Grid spacing in y (meters, or degrees for lat-lon grids)
    pub dy: f64,
    /// Geographic latitude of the rotated north pole (rotated grids)
    #[serde(default = "default_pole_lat")]
    pub pole_lat: f64,
    /// Geographic longitude of the rotated north pole (rotated grids)
    #[serde(default)]
    pub pole_lon: f64,
    /// Number of grid points west-east
    pub nx: usize,
    /// Number of grid points south-north
    pub ny: usize,
}

fn default_pole_lat() -> f64 {
    90.0
}

impl GridProjectionParams {
    /// Lambert conformal parameters anchored at the lower-left grid point.
    #[allow(clippy::too_many_arguments)]
    pub fn lambert(
        truelat1: f64,
        truelat2: f64,
        stand_lon: f64,
        ref_lat: f64,
        ref_lon: f64,
        dx: f64,
        dy: f64,
        nx: usize,
        ny: usize,
    ) -> Self {
        Self {
            kind: ProjectionKind::LambertConformal,
            truelat1,
            truelat2,
            stand_lon,
            ref_lat,
            ref_lon,
            known_x: 0.0,
            known_y: 0.0,
            dx,
            dy,
            pole_lat: 90.0,
            pole_lon: 0.0,
            nx,
            ny,
        }
    }

    /// Unrotated lat-lon parameters; spacing in degrees.
    pub fn latlon(ref_lat: f64, ref_lon: f64, dlat: f64, dlon: f64, nx: usize, ny: usize) -> Self {
        Self {
            kind: ProjectionKind::LatLon,
            truelat1: 0.0,
            truelat2: 0.0,
            stand_lon: 0.0,
            ref_lat,
            ref_lon,
            known_x: 0.0,
            known_y: 0.0,
            dx: dlon,
            dy: dlat,
            pole_lat: 90.0,
            pole_lon: 0.0,
            nx,
            ny,
        }
    }

    /// Same projection, reference point moved (moving nest step).
    pub fn moved_to(&self, ref_lat: f64, ref_lon: f64) -> Self {
        Self {
            ref_lat,
            ref_lon,
            ..self.clone()
        }
    }

    /// Check parameter ranges for the selected projection.
    pub fn validate(&self) -> Result<()> {
        if self.nx == 0 || self.ny == 0 {
            return Err(ProjectionError::invalid(format!(
                "grid extent must be non-zero, got {}x{}",
                self.nx, self.ny
            )));
        }
        if !(self.dx > 0.0 && self.dy > 0.0) {
            return Err(ProjectionError::invalid(format!(
                "grid spacing must be positive, got dx={} dy={}",
                self.dx, self.dy
            )));
        }
        if !(-90.0..=90.0).contains(&self.ref_lat) {
            return Err(ProjectionError::invalid(format!(
                "ref_lat {} outside [-90, 90]",
                self.ref_lat
            )));
        }
        match self.kind {
            ProjectionKind::LambertConformal => {
                for lat in [self.truelat1, self.truelat2] {
                    if lat.abs() >= 90.0 || lat.abs() < 1e-6 {
                        return Err(ProjectionError::invalid(format!(
                            "Lambert true latitude {} must be strictly between the equator and a pole",
                            lat
                        )));
                    }
                }
                if self.truelat1.signum() != self.truelat2.signum() {
                    return Err(ProjectionError::invalid(
                        "Lambert true latitudes must lie in the same hemisphere",
                    ));
                }
            }
            ProjectionKind::PolarStereographic => {
                if self.truelat1.abs() > 90.0 || self.truelat1.abs() < 1e-6 {
                    return Err(ProjectionError::invalid(format!(
                        "polar stereographic true latitude {} must be non-zero",
                        self.truelat1
                    )));
                }
            }
            ProjectionKind::Mercator => {
                if self.truelat1.abs() >= 90.0 {
                    return Err(ProjectionError::invalid(format!(
                        "Mercator true latitude {} must be off the poles",
                        self.truelat1
                    )));
                }
                if self.ref_lat.abs() >= 90.0 {
                    return Err(ProjectionError::invalid("Mercator reference point at a pole"));
                }
            }
            ProjectionKind::LatLon => {}
            ProjectionKind::RotatedLatLon => {
                if !(-90.0..=90.0).contains(&self.pole_lat) {
                    return Err(ProjectionError::invalid(format!(
                        "pole_lat {} outside [-90, 90]",
                        self.pole_lat
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_map_proj() {
        assert_eq!(ProjectionKind::from_map_proj(1, 90.0, 0.0).unwrap(), ProjectionKind::LambertConformal);
        assert_eq!(ProjectionKind::from_map_proj(6, 90.0, 0.0).unwrap(), ProjectionKind::LatLon);
        assert_eq!(ProjectionKind::from_map_proj(6, 40.0, -160.0).unwrap(), ProjectionKind::RotatedLatLon);
        assert_eq!(
            ProjectionKind::from_map_proj(5, 90.0, 0.0),
            Err(ProjectionError::UnsupportedMapProj(5))
        );
    }

    #[test]
    fn test_validate_rejects_bad_spacing() {
        let mut params = GridProjectionParams::lambert(30.0, 60.0, -98.0, 25.0, -120.0, 3000.0, 3000.0, 100, 80);
        assert!(params.validate().is_ok());
        params.dx = 0.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_mixed_hemispheres() {
        let params = GridProjectionParams::lambert(-30.0, 60.0, -98.0, 25.0, -120.0, 3000.0, 3000.0, 100, 80);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_params_deserialize_defaults() {
        let json = r#"{"kind":"lat_lon","ref_lat":10.0,"ref_lon":20.0,"dx":0.5,"dy":0.5,"nx":10,"ny":10}"#;
        let params: GridProjectionParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.kind, ProjectionKind::LatLon);
        assert_eq!(params.pole_lat, 90.0);
        assert_eq!(params.known_x, 0.0);
    }
}
