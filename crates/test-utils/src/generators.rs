//! Test data generators for creating synthetic atmosphere-like data.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use diag_common::{Field2D, Field3D, FieldShape, VerticalOrder};

/// Sea-level pressure of the synthetic atmosphere (hPa).
pub const SEA_LEVEL_PRESSURE: f64 = 1013.25;

/// Sea-level temperature at time step 0 (K).
pub const SEA_LEVEL_TEMPERATURE: f64 = 288.15;

/// Temperature lapse rate of the synthetic atmosphere (K/m).
pub const LAPSE_RATE: f64 = 0.0065;

const G: f64 = 9.81;
const RD: f64 = 287.04;

/// A complete synthetic model state on a terrain-following grid.
#[derive(Debug, Clone)]
pub struct SyntheticAtmosphere {
    /// Pressure (hPa)
    pub pressure: Field3D,
    /// Temperature (K)
    pub temperature: Field3D,
    /// Height above sea level (m)
    pub height: Field3D,
    /// Terrain height (m)
    pub terrain: Field2D,
    /// Water vapour mixing ratio (kg/kg)
    pub qvapor: Field3D,
}

/// Terrain height at a column: rises 10 m per grid column from 100 m.
pub fn terrain_height(i: usize) -> f64 {
    100.0 + 10.0 * i as f64
}

/// Height above ground of model level `k` (m), stretched upward.
pub fn level_height_agl(k: usize) -> f64 {
    let k = k as f64;
    30.0 + 400.0 * k + 50.0 * k * k
}

/// Temperature of the constant-lapse-rate atmosphere at height `z` (m MSL).
pub fn standard_temperature(z: f64, t: usize) -> f64 {
    SEA_LEVEL_TEMPERATURE + t as f64 - LAPSE_RATE * z
}

/// Hydrostatic pressure (hPa) of the constant-lapse-rate atmosphere.
pub fn standard_pressure(z: f64, t: usize) -> f64 {
    let t_sl = SEA_LEVEL_TEMPERATURE + t as f64;
    SEA_LEVEL_PRESSURE * (1.0 - LAPSE_RATE * z / t_sl).powf(G / (RD * LAPSE_RATE))
}

/// Height (m MSL) at which the constant-lapse-rate atmosphere has pressure `p`.
pub fn standard_height(p: f64, t: usize) -> f64 {
    let t_sl = SEA_LEVEL_TEMPERATURE + t as f64;
    t_sl / LAPSE_RATE * (1.0 - (p / SEA_LEVEL_PRESSURE).powf(RD * LAPSE_RATE / G))
}

/// Creates a hydrostatically consistent atmosphere.
///
/// Temperature falls at 6.5 K/km from a sea-level value that warms by 1 K
/// per time step, terrain rises eastward, and moisture decays with height.
///
/// # Example
///
/// ```
/// use test_utils::create_standard_atmosphere;
///
/// let atm = create_standard_atmosphere(1, 5, 3, 4);
/// assert_eq!(atm.pressure.shape().nz, 5);
/// assert!(atm.pressure.get(0, 0, 0, 0).unwrap() > atm.pressure.get(0, 4, 0, 0).unwrap());
/// ```
pub fn create_standard_atmosphere(nt: usize, nz: usize, ny: usize, nx: usize) -> SyntheticAtmosphere {
    let shape = FieldShape::new(nt, nz, ny, nx);
    let z = |k: usize, i: usize| terrain_height(i) + level_height_agl(k);

    let build = |order: VerticalOrder, f: &dyn Fn(usize, usize, usize) -> f64| {
        Field3D::from_fn(shape, order, |t, k, _, i| f(t, k, i) as f32)
            .expect("synthetic grid dimensions are non-zero")
    };

    SyntheticAtmosphere {
        pressure: build(VerticalOrder::Descending, &|t, k, i| standard_pressure(z(k, i), t)),
        temperature: build(VerticalOrder::Unknown, &|t, k, i| standard_temperature(z(k, i), t)),
        height: build(VerticalOrder::Ascending, &|_, k, i| z(k, i)),
        terrain: Field2D::from_fn(nt, ny, nx, |_, _, i| terrain_height(i) as f32)
            .expect("synthetic grid dimensions are non-zero"),
        qvapor: build(VerticalOrder::Unknown, &|_, k, _| {
            0.004 * (-level_height_agl(k) / 8000.0).exp()
        }),
    }
}

/// Creates a field whose value encodes its own indices.
///
/// Each cell value is `1000 * k + 100 * j + i`, plus `10000 * t`, so tests
/// can verify which cell a sampled value came from.
pub fn create_index_field(nt: usize, nz: usize, ny: usize, nx: usize) -> Field3D {
    Field3D::from_fn(FieldShape::new(nt, nz, ny, nx), VerticalOrder::Unknown, |t, k, j, i| {
        (10000 * t + 1000 * k + 100 * j + i) as f32
    })
    .expect("index field dimensions are non-zero")
}

/// Creates a vertical coordinate equal to the level index at every column.
pub fn create_level_index_coord(nt: usize, nz: usize, ny: usize, nx: usize) -> Field3D {
    Field3D::from_fn(FieldShape::new(nt, nz, ny, nx), VerticalOrder::Ascending, |_, k, _, _| {
        k as f32
    })
    .expect("coordinate dimensions are non-zero")
}

/// Creates a grid with NaN values at specified positions.
///
/// Useful for testing missing data handling.
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
/// * `nan_positions` - List of (col, row) positions that should be NaN
///
/// # Returns
///
/// A `Vec<f32>` with NaN at specified positions, zeros elsewhere.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}
