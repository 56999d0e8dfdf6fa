//! Per-time-step projections for possibly moving grids.
//!
//! A static domain uses the same parameters at every time step; a moving
//! nest supplies one [`GridProjectionParams`] per step (typically the same
//! projection re-anchored at that step's lower-left corner). Every lookup
//! names the time step it resolves against, or [`TimeIndex::All`] to get one
//! result per step stacked on a leading time axis.

use diag_common::{GridPoint, LatLon, TimeIndex};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};
use crate::params::GridProjectionParams;
use crate::transform::{MapProjection, Projection};

/// How geographic lookups report grid indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexMode {
    /// Sub-grid-cell precision
    #[default]
    Fractional,
    /// Rounded to the nearest integer index
    Nearest,
}

impl IndexMode {
    pub fn from_return_int(return_int: bool) -> Self {
        if return_int {
            IndexMode::Nearest
        } else {
            IndexMode::Fractional
        }
    }
}

/// Grid index for a geographic point, flagged when outside the domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexResult {
    pub point: GridPoint,
    /// The geographic point that was looked up
    pub latlon: LatLon,
    pub time: usize,
    /// Set when the point maps outside `[0, nx-1] x [0, ny-1]`
    pub out_of_domain: bool,
}

impl IndexResult {
    /// Turn a flagged result into an `OutOfDomain` error.
    pub fn require_in_domain(self) -> Result<GridPoint> {
        if self.out_of_domain {
            return Err(ProjectionError::OutOfDomain {
                lat: self.latlon.lat,
                lon: self.latlon.lon,
                time: self.time,
            });
        }
        Ok(self.point)
    }
}

/// One projection per time step.
#[derive(Debug, Clone)]
pub struct GridProjection {
    params: Vec<GridProjectionParams>,
    steps: Vec<Projection>,
}

impl GridProjection {
    /// Build from one parameter set per time step.
    pub fn new(params: Vec<GridProjectionParams>) -> Result<Self> {
        if params.is_empty() {
            return Err(ProjectionError::NoTimeSteps);
        }
        let steps = params
            .iter()
            .map(Projection::from_params)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { params, steps })
    }

    /// A domain that does not move: the same parameters for `nt` steps.
    pub fn fixed(params: GridProjectionParams, nt: usize) -> Result<Self> {
        Self::new(vec![params; nt])
    }

    pub fn num_times(&self) -> usize {
        self.steps.len()
    }

    pub fn params(&self, time: usize) -> Result<&GridProjectionParams> {
        self.params.get(time).ok_or(ProjectionError::InvalidTimeIndex {
            index: time,
            available: self.params.len(),
        })
    }

    /// The projection in effect at a time step.
    pub fn at(&self, time: usize) -> Result<&Projection> {
        self.steps.get(time).ok_or(ProjectionError::InvalidTimeIndex {
            index: time,
            available: self.steps.len(),
        })
    }

    /// Grid dimensions `(nx, ny)` at a time step.
    pub fn dimensions(&self, time: usize) -> Result<(usize, usize)> {
        Ok(self.at(time)?.dimensions())
    }

    /// Whether any time step differs from the first.
    pub fn is_moving(&self) -> bool {
        self.params.windows(2).any(|w| w[0] != w[1])
    }

    fn resolve_times(&self, time: TimeIndex) -> Result<Vec<usize>> {
        time.resolve(self.steps.len()).map_err(|_| match time {
            TimeIndex::Single(index) => ProjectionError::InvalidTimeIndex {
                index,
                available: self.steps.len(),
            },
            TimeIndex::All => ProjectionError::NoTimeSteps,
        })
    }

    /// Geographic point to grid index at one time step.
    ///
    /// Points outside the grid are returned with `out_of_domain` set; they
    /// are never clamped. The flag is decided on the fractional position, so
    /// a point just past the edge stays flagged after `Nearest` rounding.
    pub fn to_index(&self, lat: f64, lon: f64, time: usize, mode: IndexMode) -> Result<IndexResult> {
        let proj = self.at(time)?;
        let (nx, ny) = proj.dimensions();
        let (i, j) = proj.geo_to_grid(lat, lon);
        let point = GridPoint::new(i, j);
        let out_of_domain = !(i.is_finite() && j.is_finite() && point.within(nx, ny));
        if out_of_domain {
            tracing::debug!(lat, lon, time, i, j, "point outside grid");
        }
        let point = match mode {
            IndexMode::Fractional => point,
            IndexMode::Nearest => point.rounded(),
        };
        Ok(IndexResult {
            point,
            latlon: LatLon::new(lat, lon),
            time,
            out_of_domain,
        })
    }

    /// Batched geographic lookup; one inner vector per selected time step.
    pub fn to_index_batch(
        &self,
        points: &[LatLon],
        time: TimeIndex,
        mode: IndexMode,
    ) -> Result<Vec<Vec<IndexResult>>> {
        let times = self.resolve_times(time)?;
        times
            .par_iter()
            .map(|&t| {
                points
                    .iter()
                    .map(|p| self.to_index(p.lat, p.lon, t, mode))
                    .collect::<Result<Vec<_>>>()
            })
            .collect()
    }

    /// Grid index to geographic point at one time step.
    pub fn to_latlon(&self, x: f64, y: f64, time: usize) -> Result<LatLon> {
        let (lat, lon) = self.at(time)?.grid_to_geo(x, y);
        Ok(LatLon::new(lat, lon))
    }

    /// Batched reverse lookup; one inner vector per selected time step.
    pub fn to_latlon_batch(&self, points: &[GridPoint], time: TimeIndex) -> Result<Vec<Vec<LatLon>>> {
        let times = self.resolve_times(time)?;
        times
            .par_iter()
            .map(|&t| {
                points
                    .iter()
                    .map(|p| self.to_latlon(p.x, p.y, t))
                    .collect::<Result<Vec<_>>>()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conus() -> GridProjectionParams {
        GridProjectionParams::lambert(33.0, 45.0, -97.0, 30.0, -105.0, 3000.0, 3000.0, 200, 150)
    }

    #[test]
    fn test_requires_time_steps() {
        assert_eq!(GridProjection::new(vec![]).unwrap_err(), ProjectionError::NoTimeSteps);
    }

    #[test]
    fn test_reference_point_is_origin() {
        let proj = GridProjection::fixed(conus(), 2).unwrap();
        let result = proj.to_index(30.0, -105.0, 1, IndexMode::Fractional).unwrap();
        assert!(result.point.x.abs() < 1e-9);
        assert!(result.point.y.abs() < 1e-9);
        assert!(!result.out_of_domain);
    }

    #[test]
    fn test_out_of_domain_is_flagged_not_clamped() {
        let proj = GridProjection::fixed(conus(), 1).unwrap();
        let result = proj.to_index(-40.0, 60.0, 0, IndexMode::Fractional).unwrap();
        assert!(result.out_of_domain);
        assert!(!result.point.within(200, 150));
        assert!(matches!(
            result.require_in_domain(),
            Err(ProjectionError::OutOfDomain { time: 0, .. })
        ));
    }

    #[test]
    fn test_nearest_mode_rounds() {
        let proj = GridProjection::fixed(conus(), 1).unwrap();
        let ll = proj.to_latlon(10.4, 20.6, 0).unwrap();
        let result = proj.to_index(ll.lat, ll.lon, 0, IndexMode::Nearest).unwrap();
        assert_eq!(result.point, GridPoint::new(10.0, 21.0));
    }

    #[test]
    fn test_invalid_time_index() {
        let proj = GridProjection::fixed(conus(), 2).unwrap();
        assert!(matches!(
            proj.to_index(30.0, -105.0, 2, IndexMode::Fractional),
            Err(ProjectionError::InvalidTimeIndex { index: 2, available: 2 })
        ));
    }

    #[test]
    fn test_moving_nest_batch() {
        let base = conus();
        let moved = base.moved_to(31.0, -104.0);
        let proj = GridProjection::new(vec![base, moved]).unwrap();
        assert!(proj.is_moving());

        let results = proj
            .to_index_batch(&[LatLon::new(31.0, -104.0)], TimeIndex::All, IndexMode::Fractional)
            .unwrap();
        assert_eq!(results.len(), 2);
        // The second step is anchored at the query point
        assert!(results[1][0].point.x.abs() < 1e-9);
        assert!(results[0][0].point.x > 1.0);
    }
}
