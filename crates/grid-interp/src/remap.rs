//! Remapping fields onto a different vertical coordinate.
//!
//! The target coordinate is derived per column from the
//! [`AtmosphereState`]; the field is then interpolated onto the requested
//! levels of that coordinate. Below the lowest model level, extrapolation
//! follows the standard-atmosphere lapse rate and depends on the field's
//! [`FieldType`], which the caller must name explicitly.

use diag_common::{
    Axis, AxisName, DiagError, Field3D, FieldType, InterpolationResult, VerticalCoordinate,
    MISSING,
};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::atmosphere::{AtmosphereState, Surface, CELKEL, EXPON, KAPPA, USSALR};
use crate::config::InterpOptions;
use crate::error::Result;
use crate::levels::time_axis;
use crate::profile::{Bracket, ProfileOptions, VerticalProfileInterpolator};

/// Field-to-field vertical coordinate transform.
#[derive(Debug, Clone, Copy)]
pub struct VerticalCoordinateTransform<'a> {
    state: AtmosphereState<'a>,
}

impl<'a> VerticalCoordinateTransform<'a> {
    pub fn new(state: AtmosphereState<'a>) -> Self {
        Self { state }
    }

    /// Interpolate `field` onto `levels` of `target`.
    ///
    /// Levels are in hPa for pressure, km for heights and K for θ and θe.
    /// Output axes are `(Time?, Level, SouthNorth, WestEast)`.
    pub fn remap(
        &self,
        field: &Field3D,
        target: VerticalCoordinate,
        levels: &[f64],
        options: &InterpOptions,
    ) -> Result<InterpolationResult> {
        options.validate_for_remap()?;
        field.ensure_same_shape(self.state.pressure())?;
        self.state.supports(target)?;
        if levels.is_empty() {
            return Err(DiagError::InvalidLevel("level set is empty".to_string()));
        }
        if let Some(v) = levels.iter().find(|v| !v.is_finite()) {
            return Err(DiagError::InvalidLevel(format!("level must be finite, got {}", v)));
        }

        let shape = field.shape();
        let times = options.time_index.resolve(shape.nt)?;
        // extrapolate is validated to come with a field type
        let extrapolation = if options.extrapolate {
            options.field_type
        } else {
            None
        };

        debug!(
            target = %target,
            levels = levels.len(),
            units = target.level_units(),
            times = times.len(),
            field_type = ?options.field_type,
            extrapolate = options.extrapolate,
            "Remapping vertical coordinate"
        );

        let profile = ProfileOptions {
            log_coord: options.log_p && target == VerticalCoordinate::Pressure,
            extrapolate: false,
        };

        let steps: Vec<(Vec<f32>, usize)> = times
            .par_iter()
            .map(|&t| self.remap_step(field, target, levels, t, profile, extrapolation))
            .collect();

        let faults: usize = steps.iter().map(|(_, f)| *f).sum();
        if faults > 0 {
            warn!(
                columns = faults,
                target = %target,
                "Target coordinate not monotonic; columns set to missing"
            );
        }

        let axes = vec![
            Axis::with_values(AxisName::Level, levels.to_vec()),
            Axis::new(AxisName::SouthNorth, shape.ny),
            Axis::new(AxisName::WestEast, shape.nx),
        ];
        let mut parts = steps
            .into_iter()
            .map(|(data, _)| InterpolationResult::new(data, axes.clone()))
            .collect::<Result<Vec<_>>>()?;
        if !options.time_index.is_all() {
            return parts
                .pop()
                .ok_or_else(|| DiagError::shape_mismatch("one time step", 0));
        }
        let len = parts.len();
        InterpolationResult::stack_time(parts, time_axis(field.times(), len))
    }

    fn remap_step(
        &self,
        field: &Field3D,
        target: VerticalCoordinate,
        levels: &[f64],
        t: usize,
        profile: ProfileOptions,
        extrapolation: Option<FieldType>,
    ) -> (Vec<f32>, usize) {
        let shape = field.shape();
        let plane = shape.plane_len();

        let columns: Vec<Option<Vec<f64>>> = (0..plane)
            .into_par_iter()
            .map(|idx| {
                let (j, i) = (idx / shape.nx, idx % shape.nx);
                let coord = self.state.coordinate_column(target, t, j, i);
                let values = field.column(t, j, i);
                let interp =
                    VerticalProfileInterpolator::new(&coord, &values, target.order(), profile)
                        .ok()?;
                let surface = self.state.surface(t, j, i);
                Some(
                    levels
                        .iter()
                        .map(|&level| remap_value(&interp, level, target, surface, extrapolation))
                        .collect(),
                )
            })
            .collect();

        let mut data = vec![MISSING; levels.len() * plane];
        let mut faults = 0;
        for (idx, column) in columns.into_iter().enumerate() {
            match column {
                Some(values) => {
                    for (lev, v) in values.into_iter().enumerate() {
                        data[lev * plane + idx] = v as f32;
                    }
                }
                None => faults += 1,
            }
        }
        (data, faults)
    }
}

fn remap_value(
    interp: &VerticalProfileInterpolator<'_>,
    level: f64,
    target: VerticalCoordinate,
    surface: Surface,
    extrapolation: Option<FieldType>,
) -> f64 {
    match (interp.locate(level), extrapolation) {
        (Bracket::Within { .. }, _) => interp.interpolate(level),
        (Bracket::AboveTop, Some(_)) => interp.top().1,
        (Bracket::BelowBottom, Some(field_type)) => {
            let coord0 = interp.bottom().0;
            let p = target_pressure(level, coord0, target, surface);
            below_ground(field_type, interp.bottom().1, p, surface)
        }
        _ => f64::NAN,
    }
}

/// Pressure (hPa) of a target level below the lowest model level.
///
/// `coord0` is the target coordinate at the lowest level.
fn target_pressure(level: f64, coord0: f64, target: VerticalCoordinate, surface: Surface) -> f64 {
    match target {
        VerticalCoordinate::Pressure => level,
        VerticalCoordinate::GhtMsl => surface.pressure_at_height(level * 1000.0),
        VerticalCoordinate::GhtAgl => surface.pressure_at_height(surface.terrain + level * 1000.0),
        VerticalCoordinate::Theta => surface.pressure_at_theta(level),
        // Treat θe like θ scaled by the lowest-level ratio
        VerticalCoordinate::ThetaE => surface.pressure_at_theta(level * surface.theta() / coord0),
    }
}

/// Value of a field at pressure `p` below the lowest model level, whose
/// value there is `v0`.
fn below_ground(field_type: FieldType, v0: f64, p: f64, surface: Surface) -> f64 {
    let ratio = p / surface.pressure;
    match field_type {
        FieldType::None => v0,
        FieldType::Pressure => v0 * ratio,
        FieldType::Height => v0 + surface.temperature / USSALR * (1.0 - ratio.powf(EXPON)),
        FieldType::TemperatureK => v0 * ratio.powf(EXPON),
        FieldType::TemperatureC => (v0 + CELKEL) * ratio.powf(EXPON) - CELKEL,
        FieldType::Theta | FieldType::ThetaE => v0 * ratio.powf(EXPON - KAPPA),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{
        assert_approx_eq, create_standard_atmosphere, standard_height, standard_temperature,
    };

    #[test]
    fn test_below_ground_height_follows_lapse_rate() {
        let z0 = 300.0;
        let surface = Surface {
            pressure: test_utils::standard_pressure(z0, 0),
            temperature: standard_temperature(z0, 0),
            height: z0,
            terrain: 250.0,
        };
        let z = below_ground(FieldType::Height, z0, 1000.0, surface);
        assert_approx_eq!(z, standard_height(1000.0, 0), 1e-6);

        let t = below_ground(FieldType::TemperatureK, surface.temperature, 1000.0, surface);
        assert_approx_eq!(t, standard_temperature(standard_height(1000.0, 0), 0), 1e-6);

        let c = below_ground(FieldType::TemperatureC, surface.temperature - CELKEL, 1000.0, surface);
        assert_approx_eq!(c + CELKEL, t, 1e-9);

        assert_eq!(below_ground(FieldType::None, 7.0, 1000.0, surface), 7.0);
    }

    #[test]
    fn test_without_extrapolation_outside_is_missing() {
        let atm = create_standard_atmosphere(1, 6, 2, 2);
        let state =
            AtmosphereState::new(&atm.pressure, &atm.temperature, &atm.height, &atm.terrain)
                .unwrap();
        let result = VerticalCoordinateTransform::new(state)
            .remap(
                &atm.temperature,
                VerticalCoordinate::Pressure,
                &[1050.0, 850.0, 100.0],
                &InterpOptions::default(),
            )
            .unwrap();
        assert_eq!(result.shape(), vec![3, 2, 2]);
        assert!(result.get(&[0, 0, 0]).unwrap().is_nan());
        assert!(!result.get(&[1, 0, 0]).unwrap().is_nan());
        assert!(result.get(&[2, 0, 0]).unwrap().is_nan());
        assert_eq!(result.missing_count, 8);
    }

    #[test]
    fn test_extrapolation_requires_field_type() {
        let atm = create_standard_atmosphere(1, 6, 2, 2);
        let state =
            AtmosphereState::new(&atm.pressure, &atm.temperature, &atm.height, &atm.terrain)
                .unwrap();
        let options = InterpOptions {
            extrapolate: true,
            ..Default::default()
        };
        let err = VerticalCoordinateTransform::new(state)
            .remap(&atm.temperature, VerticalCoordinate::Pressure, &[850.0], &options)
            .unwrap_err();
        assert!(matches!(err, DiagError::ConfigurationConflict(_)));
    }

    #[test]
    fn test_theta_e_needs_moisture() {
        let atm = create_standard_atmosphere(1, 6, 2, 2);
        let state =
            AtmosphereState::new(&atm.pressure, &atm.temperature, &atm.height, &atm.terrain)
                .unwrap();
        let err = VerticalCoordinateTransform::new(state)
            .remap(&atm.temperature, VerticalCoordinate::ThetaE, &[300.0], &InterpOptions::default())
            .unwrap_err();
        assert!(matches!(err, DiagError::ConfigurationConflict(_)));
    }
}
