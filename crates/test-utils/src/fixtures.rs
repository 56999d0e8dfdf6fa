//! Common test fixtures for wrf-diag tests.
//!
//! This module provides pre-defined projections that represent common
//! model domain setups.

use projection::{GridProjection, GridProjectionParams};

/// Common domain definitions for testing.
pub mod domain {
    use super::GridProjectionParams;

    /// A 12 km Lambert conformal domain over the central United States.
    pub fn central_us_lambert(nx: usize, ny: usize) -> GridProjectionParams {
        GridProjectionParams::lambert(30.0, 60.0, -98.0, 34.0, -104.0, 12000.0, 12000.0, nx, ny)
    }

    /// A quarter-degree regional lat-lon domain.
    pub fn regional_latlon(nx: usize, ny: usize) -> GridProjectionParams {
        GridProjectionParams::latlon(30.0, -105.0, 0.25, 0.25, nx, ny)
    }
}

/// A static projection repeated over `nt` time steps.
pub fn fixed_projection(params: GridProjectionParams, nt: usize) -> GridProjection {
    GridProjection::fixed(params, nt).expect("fixture projection parameters are valid")
}

/// A Lambert nest that drifts north-east by `step_deg` degrees per time step.
pub fn moving_nest(nx: usize, ny: usize, nt: usize, step_deg: f64) -> GridProjection {
    let base = domain::central_us_lambert(nx, ny);
    let steps = (0..nt)
        .map(|t| {
            let shift = step_deg * t as f64;
            base.moved_to(base.ref_lat + shift, base.ref_lon + shift)
        })
        .collect();
    GridProjection::new(steps).expect("fixture projection parameters are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_nest_moves() {
        let nest = moving_nest(40, 30, 3, 0.5);
        assert_eq!(nest.num_times(), 3);
        assert!(nest.is_moving());
        assert!(!fixed_projection(domain::central_us_lambert(40, 30), 3).is_moving());
    }
}
