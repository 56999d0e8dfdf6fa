//! Vertical cross sections and line interpolation.
//!
//! The engine resolves a [`LinePath`] per time step, samples the target and
//! coordinate columns at every line point, and either copies the columns at
//! native resolution or interpolates them onto a set of levels. Output axes
//! are `(Time?, BottomTop | Level, LineIdx)` for 3D input and
//! `(Time?, LineIdx)` for 2D input.

use diag_common::{
    Axis, AxisName, DiagError, Field2D, Field3D, InterpolationResult, MISSING,
};
use projection::GridProjection;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::InterpOptions;
use crate::error::Result;
use crate::horizontal::{sample_column, sample_plane};
use crate::levels::time_axis;
use crate::line::{LinePath, LineSampler, LineSpec};
use crate::profile::interpolate_column;

/// Vertical extent of a cross section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSpec {
    /// Copy every model level; the coordinate becomes the vertical label
    WholeColumn,
    /// Interpolate onto these coordinate values
    Levels(Vec<f64>),
    /// `autolevels` evenly spaced levels spanning the coordinate along the line
    Auto,
}

/// Counts of degraded output for one call.
#[derive(Debug, Clone, Copy, Default)]
struct Degraded {
    faults: usize,
    out_of_bounds: usize,
}

impl std::ops::Add for Degraded {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            faults: self.faults + other.faults,
            out_of_bounds: self.out_of_bounds + other.out_of_bounds,
        }
    }
}

/// Extracts fields along horizontal lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossSectionEngine<'a> {
    projection: Option<&'a GridProjection>,
}

impl<'a> CrossSectionEngine<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the grid projection used for geographic lines and `linecoords`.
    pub fn with_projection(projection: &'a GridProjection) -> Self {
        Self {
            projection: Some(projection),
        }
    }

    fn sampler(&self, options: &InterpOptions) -> LineSampler<'a> {
        let sampler = LineSampler::new()
            .with_linecoords(options.linecoords)
            .with_index_mode(options.index_mode());
        match self.projection {
            Some(p) => sampler.with_projection(p),
            None => sampler,
        }
    }

    /// Fail unless the projection covers every requested step at this extent.
    fn check_projection(&self, nx: usize, ny: usize, times: &[usize]) -> Result<()> {
        let Some(projection) = self.projection else {
            return Ok(());
        };
        for &t in times {
            let dims = projection.dimensions(t)?;
            if dims != (nx, ny) {
                return Err(DiagError::shape_mismatch((nx, ny), dims));
            }
        }
        Ok(())
    }

    /// Cross section of `field` along the line given in `options`.
    pub fn sample_configured(
        &self,
        field: &Field3D,
        coord: &Field3D,
        levels: &LevelSpec,
        options: &InterpOptions,
    ) -> Result<InterpolationResult> {
        let line = options
            .line_spec()?
            .ok_or_else(|| DiagError::conflict("no line specified"))?;
        self.sample(field, coord, &line, levels, options)
    }

    /// Cross section of a 3D field.
    pub fn sample(
        &self,
        field: &Field3D,
        coord: &Field3D,
        line: &LineSpec,
        levels: &LevelSpec,
        options: &InterpOptions,
    ) -> Result<InterpolationResult> {
        options.validate()?;
        field.ensure_same_shape(coord)?;
        if let LevelSpec::Levels(values) = levels {
            check_levels(values)?;
        }

        let shape = field.shape();
        let times = options.time_index.resolve(shape.nt)?;
        self.check_projection(shape.nx, shape.ny, &times)?;
        let sampler = self.sampler(options);

        debug!(
            nz = shape.nz,
            ny = shape.ny,
            nx = shape.nx,
            times = times.len(),
            levels = ?levels,
            "Extracting cross section"
        );

        let steps = times
            .par_iter()
            .map(|&t| {
                let path = sampler.resolve(line, shape.nx, shape.ny, t)?;
                section_step(field, coord, &path, levels, options)
            })
            .collect::<Result<Vec<_>>>()?;

        self.assemble(steps, options, field.times())
    }

    /// Values of a 2D field along a line; no vertical interpolation.
    pub fn sample_2d(
        &self,
        field: &Field2D,
        line: &LineSpec,
        options: &InterpOptions,
    ) -> Result<InterpolationResult> {
        options.validate()?;
        let shape = field.shape();
        let times = options.time_index.resolve(shape.nt)?;
        self.check_projection(shape.nx, shape.ny, &times)?;
        let sampler = self.sampler(options);

        debug!(ny = shape.ny, nx = shape.nx, times = times.len(), "Sampling 2D field along line");

        let steps = times
            .par_iter()
            .map(|&t| {
                let path = sampler.resolve(line, shape.nx, shape.ny, t)?;
                let data: Vec<f32> = path
                    .points
                    .par_iter()
                    .zip(path.in_bounds.par_iter())
                    .map(|(p, inside)| if *inside { sample_plane(field, t, *p) } else { MISSING })
                    .collect();
                let degraded = Degraded {
                    faults: 0,
                    out_of_bounds: path.out_of_bounds(),
                };
                Ok((InterpolationResult::new(data, vec![path.axis()])?, degraded))
            })
            .collect::<Result<Vec<_>>>()?;

        self.assemble(steps, options, field.times())
    }

    fn assemble(
        &self,
        steps: Vec<(InterpolationResult, Degraded)>,
        options: &InterpOptions,
        times: &[chrono::DateTime<chrono::Utc>],
    ) -> Result<InterpolationResult> {
        let total = steps
            .iter()
            .fold(Degraded::default(), |acc, (_, d)| acc + *d);
        if total.faults > 0 {
            warn!(
                columns = total.faults,
                "Vertical coordinate not monotonic; columns set to missing"
            );
        }
        if total.out_of_bounds > 0 {
            warn!(
                points = total.out_of_bounds,
                "Line points outside the grid set to missing"
            );
        }

        let mut parts: Vec<InterpolationResult> = steps.into_iter().map(|(r, _)| r).collect();
        if !options.time_index.is_all() {
            return parts
                .pop()
                .ok_or_else(|| DiagError::shape_mismatch("one time step", 0));
        }
        let len = parts.len();
        InterpolationResult::stack_time(parts, time_axis(times, len))
    }
}

fn check_levels(levels: &[f64]) -> Result<()> {
    if levels.is_empty() {
        return Err(DiagError::InvalidLevel("level set is empty".to_string()));
    }
    if let Some(v) = levels.iter().find(|v| !v.is_finite()) {
        return Err(DiagError::InvalidLevel(format!("level must be finite, got {}", v)));
    }
    Ok(())
}

/// `n` evenly spaced levels over the finite coordinate range of `columns`.
fn auto_levels(columns: &[(Vec<f64>, Vec<f64>)], n: usize) -> Result<Vec<f64>> {
    let (lo, hi) = columns
        .iter()
        .flat_map(|(c, _)| c.iter().copied())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return Err(DiagError::InvalidLevel(
            "no valid vertical coordinate along the line".to_string(),
        ));
    }
    if n == 1 {
        return Ok(vec![lo]);
    }
    let last = (n - 1) as f64;
    Ok((0..n).map(|i| lo + (hi - lo) * i as f64 / last).collect())
}

/// One time step of a 3D cross section.
fn section_step(
    field: &Field3D,
    coord: &Field3D,
    path: &LinePath,
    levels: &LevelSpec,
    options: &InterpOptions,
) -> Result<(InterpolationResult, Degraded)> {
    let t = path.time;
    let nz = field.shape().nz;
    let npts = path.len();

    // (coordinate column, value column) at every line point
    let columns: Vec<(Vec<f64>, Vec<f64>)> = path
        .points
        .par_iter()
        .zip(path.in_bounds.par_iter())
        .map(|(p, inside)| {
            if *inside {
                (sample_column(coord, t, *p), sample_column(field, t, *p))
            } else {
                (vec![f64::NAN; nz], vec![f64::NAN; nz])
            }
        })
        .collect();

    let mut degraded = Degraded {
        faults: 0,
        out_of_bounds: path.out_of_bounds(),
    };

    let targets = match levels {
        LevelSpec::WholeColumn => {
            let mut data = vec![MISSING; nz * npts];
            let mut vertical = vec![MISSING; nz * npts];
            for (p, (c, v)) in columns.iter().enumerate() {
                for k in 0..nz {
                    data[k * npts + p] = v[k] as f32;
                    vertical[k * npts + p] = c[k] as f32;
                }
            }
            let axes = vec![Axis::new(AxisName::BottomTop, nz), path.axis()];
            let result = InterpolationResult::new(data, axes)?.with_vertical_coord(vertical)?;
            return Ok((result, degraded));
        }
        LevelSpec::Levels(values) => values.clone(),
        LevelSpec::Auto => auto_levels(&columns, options.autolevels)?,
    };

    let profile = options.profile_options();
    let order = coord.order();
    let interpolated: Vec<(Vec<f64>, bool)> = columns
        .par_iter()
        .zip(path.in_bounds.par_iter())
        .map(|((c, v), inside)| {
            if !*inside {
                return (vec![f64::NAN; targets.len()], false);
            }
            let (out, fault) = interpolate_column(c, v, order, &targets, profile);
            (out, fault.is_some())
        })
        .collect();

    let nlev = targets.len();
    let mut data = vec![MISSING; nlev * npts];
    for (p, (values, fault)) in interpolated.into_iter().enumerate() {
        degraded.faults += fault as usize;
        for (lev, v) in values.into_iter().enumerate() {
            data[lev * npts + p] = v as f32;
        }
    }
    let axes = vec![Axis::with_values(AxisName::Level, targets), path.axis()];
    Ok((InterpolationResult::new(data, axes)?, degraded))
}
