//! Horizontal slices of a 3D field at requested vertical levels.

use diag_common::{
    Axis, AxisCoords, AxisName, DiagError, Field2D, Field3D, InterpolationResult, MISSING,
};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::InterpOptions;
use crate::error::Result;
use crate::profile::{interpolate_column, ProfileOptions};

/// Target levels for [`interp_levels`].
#[derive(Debug, Clone, PartialEq)]
pub enum LevelSet {
    /// One level; the output has no level axis
    Scalar(f64),
    /// Several levels, in the order given
    Values(Vec<f64>),
    /// A level surface that varies per grid point (`inc2dlevs`)
    PerPoint(Field2D),
}

impl LevelSet {
    fn check(&self, field: &Field3D, options: &InterpOptions) -> Result<()> {
        match (self, options.inc2dlevs) {
            (LevelSet::PerPoint(_), false) => {
                return Err(DiagError::conflict("per-point levels require inc2dlevs"))
            }
            (LevelSet::Scalar(_) | LevelSet::Values(_), true) => {
                return Err(DiagError::conflict("inc2dlevs requires per-point levels"))
            }
            _ => {}
        }
        match self {
            LevelSet::Scalar(v) => check_finite(&[*v]),
            LevelSet::Values(v) if v.is_empty() => {
                Err(DiagError::InvalidLevel("level set is empty".to_string()))
            }
            LevelSet::Values(v) => check_finite(v),
            LevelSet::PerPoint(surface) => {
                let shape = field.shape();
                let s = surface.shape();
                if !s.broadcasts_over(&shape) {
                    return Err(DiagError::shape_mismatch(
                        format!("levels over 1 or {} times on {}x{}", shape.nt, shape.ny, shape.nx),
                        s,
                    ));
                }
                Ok(())
            }
        }
    }

    fn num_levels(&self) -> usize {
        match self {
            LevelSet::Values(v) => v.len(),
            LevelSet::Scalar(_) | LevelSet::PerPoint(_) => 1,
        }
    }

    /// Target level(s) at one column.
    fn at(&self, t: usize, column: usize) -> Vec<f64> {
        match self {
            LevelSet::Scalar(v) => vec![*v],
            LevelSet::Values(v) => v.clone(),
            LevelSet::PerPoint(surface) => {
                let t = if surface.shape().nt == 1 { 0 } else { t };
                vec![surface.plane(t)[column] as f64]
            }
        }
    }
}

fn check_finite(levels: &[f64]) -> Result<()> {
    match levels.iter().find(|v| !v.is_finite()) {
        Some(v) => Err(DiagError::InvalidLevel(format!("level must be finite, got {}", v))),
        None => Ok(()),
    }
}

/// Interpolate `field` onto levels of the co-located vertical coordinate.
///
/// Output axes are `(Time?, Level?, SouthNorth, WestEast)`: the time axis
/// appears for [`TimeIndex::All`](diag_common::TimeIndex::All), the level
/// axis for [`LevelSet::Values`]. Non-monotonic columns are written as
/// missing values.
pub fn interp_levels(
    field: &Field3D,
    coord: &Field3D,
    levels: &LevelSet,
    options: &InterpOptions,
) -> Result<InterpolationResult> {
    options.validate()?;
    field.ensure_same_shape(coord)?;
    levels.check(field, options)?;

    let shape = field.shape();
    let times = options.time_index.resolve(shape.nt)?;
    let profile = options.profile_options();

    debug!(
        nz = shape.nz,
        ny = shape.ny,
        nx = shape.nx,
        levels = levels.num_levels(),
        times = times.len(),
        "Interpolating to levels"
    );

    let steps: Vec<(Vec<f32>, usize)> = times
        .par_iter()
        .map(|&t| slice_step(field, coord, levels, t, profile))
        .collect();

    let faults: usize = steps.iter().map(|(_, f)| *f).sum();
    if faults > 0 {
        warn!(columns = faults, "Vertical coordinate not monotonic; columns set to missing");
    }

    let mut axes = Vec::with_capacity(3);
    if let LevelSet::Values(v) = levels {
        axes.push(Axis::with_values(AxisName::Level, v.clone()));
    }
    axes.push(Axis::new(AxisName::SouthNorth, shape.ny));
    axes.push(Axis::new(AxisName::WestEast, shape.nx));

    if !options.time_index.is_all() {
        let (data, _) = steps.into_iter().next().unwrap_or_default();
        return InterpolationResult::new(data, axes);
    }

    let parts = steps
        .into_iter()
        .map(|(data, _)| InterpolationResult::new(data, axes.clone()))
        .collect::<Result<Vec<_>>>()?;
    InterpolationResult::stack_time(parts, time_axis(field.times(), times.len()))
}

/// One time step, laid out `(level, south_north, west_east)`.
fn slice_step(
    field: &Field3D,
    coord: &Field3D,
    levels: &LevelSet,
    t: usize,
    profile: ProfileOptions,
) -> (Vec<f32>, usize) {
    let shape = field.shape();
    let plane = shape.plane_len();
    let nlev = levels.num_levels();
    let order = coord.order();

    let columns: Vec<(Vec<f64>, bool)> = (0..plane)
        .into_par_iter()
        .map(|idx| {
            let (j, i) = (idx / shape.nx, idx % shape.nx);
            let (values, fault) = interpolate_column(
                &coord.column(t, j, i),
                &field.column(t, j, i),
                order,
                &levels.at(t, idx),
                profile,
            );
            (values, fault.is_some())
        })
        .collect();

    let mut data = vec![MISSING; nlev * plane];
    let mut faults = 0;
    for (idx, (values, fault)) in columns.into_iter().enumerate() {
        faults += fault as usize;
        for (lev, v) in values.into_iter().enumerate() {
            data[lev * plane + idx] = v as f32;
        }
    }
    (data, faults)
}

/// Leading time axis, labelled with valid times when the field has them.
pub(crate) fn time_axis(all_times: &[chrono::DateTime<chrono::Utc>], len: usize) -> Axis {
    if all_times.len() == len {
        Axis {
            name: AxisName::Time,
            len,
            coords: AxisCoords::Times(all_times.to_vec()),
        }
    } else {
        Axis::new(AxisName::Time, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diag_common::{FieldShape, TimeIndex, VerticalOrder};
    use test_utils::assert_approx_eq;

    fn pressure_and_values() -> (Field3D, Field3D) {
        let shape = FieldShape::new(2, 4, 2, 3);
        let p = [1000.0, 850.0, 700.0, 500.0];
        let v = [10.0, 8.0, 5.0, 2.0];
        let coord = Field3D::from_fn(shape, VerticalOrder::Descending, |_, k, _, _| p[k]).unwrap();
        let field =
            Field3D::from_fn(shape, VerticalOrder::Unknown, |t, k, _, i| v[k] + (t + i) as f32)
                .unwrap();
        (field, coord)
    }

    #[test]
    fn test_scalar_level_drops_axis() {
        let (field, coord) = pressure_and_values();
        let result =
            interp_levels(&field, &coord, &LevelSet::Scalar(775.0), &InterpOptions::default())
                .unwrap();
        assert_eq!(result.shape(), vec![2, 3]);
        assert_approx_eq!(result.get(&[0, 0]).unwrap(), 6.5, 1e-6);
        assert_approx_eq!(result.get(&[1, 2]).unwrap(), 8.5, 1e-6);
        assert_eq!(result.missing_count, 0);
    }

    #[test]
    fn test_level_values_keep_order() {
        let (field, coord) = pressure_and_values();
        let levels = LevelSet::Values(vec![500.0, 1000.0, 1050.0]);
        let result = interp_levels(&field, &coord, &levels, &InterpOptions::default()).unwrap();
        assert_eq!(result.shape(), vec![3, 2, 3]);
        assert_eq!(result.get(&[0, 0, 0]), Some(2.0));
        assert_eq!(result.get(&[1, 0, 0]), Some(10.0));
        assert!(result.get(&[2, 0, 0]).unwrap().is_nan());
        assert_eq!(result.missing_count, 6);
    }

    #[test]
    fn test_all_times_adds_leading_axis() {
        let (field, coord) = pressure_and_values();
        let options = InterpOptions {
            time_index: TimeIndex::All,
            ..Default::default()
        };
        let result = interp_levels(&field, &coord, &LevelSet::Scalar(850.0), &options).unwrap();
        assert_eq!(result.shape(), vec![2, 2, 3]);
        assert_eq!(result.axes[0].name, AxisName::Time);
        assert_eq!(result.get(&[1, 0, 0]), Some(9.0));
    }

    #[test]
    fn test_per_point_levels_require_flag() {
        let (field, coord) = pressure_and_values();
        let surface = Field2D::from_fn(1, 2, 3, |_, _, i| 1000.0 - 150.0 * i as f32).unwrap();
        let levels = LevelSet::PerPoint(surface);

        let err = interp_levels(&field, &coord, &levels, &InterpOptions::default()).unwrap_err();
        assert!(matches!(err, DiagError::ConfigurationConflict(_)));

        let options = InterpOptions {
            inc2dlevs: true,
            ..Default::default()
        };
        let result = interp_levels(&field, &coord, &levels, &options).unwrap();
        assert_eq!(result.shape(), vec![2, 3]);
        assert_eq!(result.get(&[0, 0]), Some(10.0));
        assert_eq!(result.get(&[0, 1]), Some(9.0));
        assert_eq!(result.get(&[0, 2]), Some(7.0));
    }

    #[test]
    fn test_log_p_leaves_height_levels_linear() {
        let shape = FieldShape::new(1, 2, 1, 2);
        let z = [100.0, 1000.0];
        let coord = Field3D::from_fn(shape, VerticalOrder::Ascending, |_, k, _, _| z[k]).unwrap();
        let field = Field3D::from_fn(shape, VerticalOrder::Unknown, |_, k, _, _| 10.0 * k as f32)
            .unwrap();
        let options = InterpOptions {
            log_p: true,
            ..Default::default()
        };
        let result = interp_levels(&field, &coord, &LevelSet::Scalar(550.0), &options).unwrap();
        assert_eq!(result.get(&[0, 1]), Some(5.0));
    }

    #[test]
    fn test_shape_mismatch_is_fatal() {
        let (field, _) = pressure_and_values();
        let coord = Field3D::from_fn(FieldShape::new(2, 3, 2, 3), VerticalOrder::Descending, |_, k, _, _| {
            1000.0 - k as f32
        })
        .unwrap();
        let err = interp_levels(&field, &coord, &LevelSet::Scalar(850.0), &InterpOptions::default())
            .unwrap_err();
        assert!(matches!(err, DiagError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_non_monotonic_column_is_missing() {
        let shape = FieldShape::new(1, 3, 1, 2);
        let coord = Field3D::from_fn(shape, VerticalOrder::Unknown, |_, k, _, i| {
            if i == 1 && k == 1 {
                1000.0
            } else {
                1000.0 - 100.0 * k as f32
            }
        })
        .unwrap();
        let field = Field3D::from_fn(shape, VerticalOrder::Unknown, |_, k, _, _| k as f32).unwrap();
        let result =
            interp_levels(&field, &coord, &LevelSet::Scalar(850.0), &InterpOptions::default())
                .unwrap();
        assert_approx_eq!(result.get(&[0, 0]).unwrap(), 1.5, 1e-6);
        assert!(result.get(&[0, 1]).unwrap().is_nan());
        assert_eq!(result.missing_count, 1);
    }
}
