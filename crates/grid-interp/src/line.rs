//! Horizontal lines through the grid.
//!
//! A line is given either as a pivot point and an angle, in which case it
//! spans the whole domain through the pivot, or as two endpoints in grid or
//! geographic coordinates. Geographic endpoints are resolved per time step
//! so a moving nest yields a different path at each step.

use diag_common::{Axis, CoordPair, DiagError, GridPoint, LatLon};
use projection::{GridProjection, IndexMode};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Direction components smaller than this are treated as exactly zero.
const DIRECTION_EPS: f64 = 1e-12;

/// Lines shorter than this (in grid cells) are degenerate.
const MIN_LENGTH: f64 = 1e-9;

/// One end of a line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineEnd {
    Grid(GridPoint),
    Geo(LatLon),
}

/// How a line is described.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSpec {
    /// Full domain diameter through `pivot` at `angle` degrees clockwise
    /// from north, sampled at unit grid spacing.
    Pivot { pivot: GridPoint, angle: f64 },
    /// Evenly spaced points from `start` to `end`, both included.
    Endpoints {
        start: LineEnd,
        end: LineEnd,
        /// Point count; about one point per grid cell when absent
        num_points: Option<usize>,
    },
}

/// Resolved sample positions along a line at one time step.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePath {
    pub points: Vec<GridPoint>,
    /// Whether each point lies inside the grid
    pub in_bounds: Vec<bool>,
    /// Geographic location of each point, when requested
    pub latlons: Option<Vec<LatLon>>,
    pub time: usize,
}

impl LinePath {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn out_of_bounds(&self) -> usize {
        self.in_bounds.iter().filter(|b| !**b).count()
    }

    pub fn coord_pairs(&self) -> Vec<CoordPair> {
        match &self.latlons {
            Some(latlons) => self
                .points
                .iter()
                .zip(latlons)
                .map(|(p, ll)| CoordPair::with_latlon(*p, *ll))
                .collect(),
            None => self.points.iter().map(|p| CoordPair::grid(*p)).collect(),
        }
    }

    /// The line-position axis, labelled with this path's coordinates.
    pub fn axis(&self) -> Axis {
        Axis::with_line(self.coord_pairs())
    }
}

/// Resolves [`LineSpec`]s into [`LinePath`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineSampler<'a> {
    projection: Option<&'a GridProjection>,
    linecoords: bool,
    mode: IndexMode,
}

impl<'a> LineSampler<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `projection` for geographic endpoints and point coordinates.
    pub fn with_projection(mut self, projection: &'a GridProjection) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Attach lat/lon to every resolved point.
    pub fn with_linecoords(mut self, linecoords: bool) -> Self {
        self.linecoords = linecoords;
        self
    }

    /// How geographic endpoints are converted to grid indices.
    pub fn with_index_mode(mut self, mode: IndexMode) -> Self {
        self.mode = mode;
        self
    }

    /// Resolve a line on an `nx x ny` grid at time step `time`.
    pub fn resolve(&self, spec: &LineSpec, nx: usize, ny: usize, time: usize) -> Result<LinePath> {
        if nx == 0 || ny == 0 {
            return Err(DiagError::shape_mismatch("non-empty grid", (nx, ny)));
        }
        let (points, flagged) = match *spec {
            LineSpec::Pivot { pivot, angle } => (pivot_line(pivot, angle, nx, ny)?, (false, false)),
            LineSpec::Endpoints {
                start,
                end,
                num_points,
            } => {
                let (start, start_out) = self.endpoint(start, time)?;
                let (end, end_out) = self.endpoint(end, time)?;
                (endpoint_line(start, end, num_points)?, (start_out, end_out))
            }
        };

        // Endpoints the projection flagged stay out even if rounding pulled them in
        let mut in_bounds: Vec<bool> = points.iter().map(|p| p.within(nx, ny)).collect();
        let last = in_bounds.len() - 1;
        in_bounds[0] &= !flagged.0;
        in_bounds[last] &= !flagged.1;
        let latlons = if self.linecoords {
            let proj = self
                .projection
                .ok_or_else(|| DiagError::conflict("linecoords requires a grid projection"))?;
            Some(
                points
                    .iter()
                    .map(|p| proj.to_latlon(p.x, p.y, time))
                    .collect::<projection::Result<Vec<_>>>()?,
            )
        } else {
            None
        };

        Ok(LinePath {
            points,
            in_bounds,
            latlons,
            time,
        })
    }

    /// Resolve one path per time step, in the order given.
    pub fn resolve_all(
        &self,
        spec: &LineSpec,
        nx: usize,
        ny: usize,
        times: &[usize],
    ) -> Result<Vec<LinePath>> {
        times
            .par_iter()
            .map(|&t| self.resolve(spec, nx, ny, t))
            .collect()
    }

    /// Grid position of a line end and whether the projection flagged it.
    fn endpoint(&self, end: LineEnd, time: usize) -> Result<(GridPoint, bool)> {
        match end {
            LineEnd::Grid(point) => Ok((point, false)),
            LineEnd::Geo(ll) => {
                let proj = self.projection.ok_or_else(|| {
                    DiagError::conflict("geographic endpoints require a grid projection")
                })?;
                let index = proj.to_index(ll.lat, ll.lon, time, self.mode)?;
                if index.out_of_domain {
                    tracing::debug!(
                        lat = ll.lat,
                        lon = ll.lon,
                        time,
                        "line endpoint outside the domain"
                    );
                }
                Ok((index.point, index.out_of_domain))
            }
        }
    }
}

/// The longest segment through `pivot` along `angle` that stays in the grid.
fn pivot_line(pivot: GridPoint, angle: f64, nx: usize, ny: usize) -> Result<Vec<GridPoint>> {
    if !angle.is_finite() {
        return Err(DiagError::conflict(format!("angle must be finite, got {}", angle)));
    }
    if !pivot.within(nx, ny) {
        return Err(DiagError::conflict(format!(
            "pivot ({}, {}) is outside the {}x{} grid",
            pivot.x, pivot.y, nx, ny
        )));
    }

    let snap = |v: f64| if v.abs() < DIRECTION_EPS { 0.0 } else { v };
    let rad = angle.to_radians();
    let (dx, dy) = (snap(rad.sin()), snap(rad.cos()));

    // Parametric range of pivot + s * (dx, dy) inside [0, n-1] on each axis
    let (mut lo, mut hi) = (f64::NEG_INFINITY, f64::INFINITY);
    for (p, d, n) in [(pivot.x, dx, nx), (pivot.y, dy, ny)] {
        if d == 0.0 {
            continue;
        }
        let a = (0.0 - p) / d;
        let b = (n as f64 - 1.0 - p) / d;
        lo = lo.max(a.min(b));
        hi = hi.min(a.max(b));
    }
    let length = hi - lo;
    if !(length.is_finite() && length > MIN_LENGTH) {
        return Err(DiagError::DegenerateLine);
    }

    // One grid unit between points, starting at the clipped entry point
    let (max_x, max_y) = ((nx - 1) as f64, (ny - 1) as f64);
    let steps = (length + MIN_LENGTH).floor() as usize;
    Ok((0..=steps)
        .map(|step| {
            let s = lo + step as f64;
            GridPoint::new(
                (pivot.x + s * dx).clamp(0.0, max_x),
                (pivot.y + s * dy).clamp(0.0, max_y),
            )
        })
        .collect())
}

fn endpoint_line(start: GridPoint, end: GridPoint, num_points: Option<usize>) -> Result<Vec<GridPoint>> {
    if ![start.x, start.y, end.x, end.y].iter().all(|v| v.is_finite()) {
        return Err(DiagError::conflict("line endpoints must be finite"));
    }
    let length = start.distance(&end);
    if length <= MIN_LENGTH {
        return Err(DiagError::DegenerateLine);
    }
    let n = match num_points {
        Some(n) if n < 2 => {
            return Err(DiagError::conflict(format!(
                "a line needs at least 2 points, got {}",
                n
            )))
        }
        Some(n) => n,
        None => ((length + MIN_LENGTH).floor() as usize + 1).max(2),
    };
    Ok(spaced(start, end, n))
}

/// `n >= 2` evenly spaced points including both ends.
fn spaced(start: GridPoint, end: GridPoint, n: usize) -> Vec<GridPoint> {
    let last = (n - 1) as f64;
    (0..n)
        .map(|i| {
            let i = i as f64;
            GridPoint::new(
                start.x + (end.x - start.x) * i / last,
                start.y + (end.y - start.y) * i / last,
            )
        })
        .collect()
}
