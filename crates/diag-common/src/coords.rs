//! Grid-index and geographic coordinate pairs.

use serde::{Deserialize, Serialize};

/// A fractional horizontal grid position.
///
/// `x` runs west to east (column), `y` runs south to north (row).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
}

impl GridPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in grid cells.
    pub fn distance(&self, other: &GridPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Round both components to the nearest integer index.
    pub fn rounded(&self) -> Self {
        Self {
            x: self.x.round(),
            y: self.y.round(),
        }
    }

    /// Check whether the point lies inside `[0, nx-1] x [0, ny-1]`.
    pub fn within(&self, nx: usize, ny: usize) -> bool {
        let eps = 1e-9;
        self.x >= -eps
            && self.y >= -eps
            && self.x <= (nx as f64 - 1.0) + eps
            && self.y <= (ny as f64 - 1.0) + eps
    }
}

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A line point with its grid position and, when requested, its
/// geographic location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordPair {
    pub point: GridPoint,
    pub latlon: Option<LatLon>,
}

impl CoordPair {
    pub fn grid(point: GridPoint) -> Self {
        Self {
            point,
            latlon: None,
        }
    }

    pub fn with_latlon(point: GridPoint, latlon: LatLon) -> Self {
        Self {
            point,
            latlon: Some(latlon),
        }
    }
}

impl std::fmt::Display for CoordPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.latlon {
            Some(ll) => write!(
                f,
                "x={:.4}, y={:.4}, lat={:.4}, lon={:.4}",
                self.point.x, self.point.y, ll.lat, ll.lon
            ),
            None => write!(f, "x={:.4}, y={:.4}", self.point.x, self.point.y),
        }
    }
}
