//! Thermodynamic state of the model columns and the vertical coordinates
//! derived from it.

use diag_common::{DiagError, Field2D, Field3D, VerticalCoordinate};

use crate::error::Result;

/// Gas constant for dry air (J/kg/K)
pub const RD: f64 = 287.04;
/// Gravitational acceleration (m/s^2)
pub const G: f64 = 9.81;
/// Standard atmosphere lapse rate (K/m)
pub const USSALR: f64 = 0.0065;
/// Poisson constant Rd/cp
pub const KAPPA: f64 = 2.0 / 7.0;
/// Exponent linking pressure and temperature at a constant lapse rate
pub const EXPON: f64 = RD * USSALR / G;
pub const CELKEL: f64 = 273.15;
/// Ratio of the gas constants of dry air and water vapour
pub const EPS: f64 = 0.622;
/// Reference pressure for potential temperature (hPa)
pub const P1000: f64 = 1000.0;

/// Potential temperature (K) from pressure (hPa) and temperature (K).
pub fn potential_temperature(p: f64, t: f64) -> f64 {
    t * (P1000 / p).powf(KAPPA)
}

/// Equivalent potential temperature (K), Bolton (1980).
///
/// `q` is the water vapour mixing ratio in kg/kg. Dry air reduces to the
/// potential temperature.
pub fn equivalent_potential_temperature(p: f64, t: f64, q: f64) -> f64 {
    let q = q.max(0.0);
    if q == 0.0 {
        return potential_temperature(p, t);
    }
    let e = q * p / (EPS + q);
    let tlcl = 2840.0 / (3.5 * t.ln() - e.ln() - 4.805) + 55.0;
    t * (P1000 / p).powf(0.2854 * (1.0 - 0.28 * q))
        * ((3.376 / tlcl - 0.00254) * 1000.0 * q * (1.0 + 0.81 * q)).exp()
}

/// The model state a vertical coordinate transform works from.
///
/// Pressure is in hPa, temperature in K, heights in m above sea level and
/// the mixing ratio in kg/kg.
#[derive(Debug, Clone, Copy)]
pub struct AtmosphereState<'a> {
    pressure: &'a Field3D,
    temperature: &'a Field3D,
    height: &'a Field3D,
    terrain: &'a Field2D,
    qvapor: Option<&'a Field3D>,
}

impl<'a> AtmosphereState<'a> {
    pub fn new(
        pressure: &'a Field3D,
        temperature: &'a Field3D,
        height: &'a Field3D,
        terrain: &'a Field2D,
    ) -> Result<Self> {
        pressure.ensure_same_shape(temperature)?;
        pressure.ensure_same_shape(height)?;
        let shape = pressure.shape();
        let ter = terrain.shape();
        if !ter.broadcasts_over(&shape) {
            return Err(DiagError::shape_mismatch(
                format!("terrain over 1 or {} times on {}x{}", shape.nt, shape.ny, shape.nx),
                ter,
            ));
        }
        Ok(Self {
            pressure,
            temperature,
            height,
            terrain,
            qvapor: None,
        })
    }

    /// Add the water vapour mixing ratio, needed for θe.
    pub fn with_qvapor(mut self, qvapor: &'a Field3D) -> Result<Self> {
        self.pressure.ensure_same_shape(qvapor)?;
        self.qvapor = Some(qvapor);
        Ok(self)
    }

    pub fn pressure(&self) -> &Field3D {
        self.pressure
    }

    pub fn has_qvapor(&self) -> bool {
        self.qvapor.is_some()
    }

    /// Terrain height (m) under a column.
    pub fn terrain_at(&self, t: usize, j: usize, i: usize) -> f64 {
        let t = if self.terrain.shape().nt == 1 { 0 } else { t };
        self.terrain.get(t, j, i).map_or(f64::NAN, f64::from)
    }

    /// Lowest model level of a column.
    pub fn surface(&self, t: usize, j: usize, i: usize) -> Surface {
        let get = |f: &Field3D| f.get(t, 0, j, i).map_or(f64::NAN, f64::from);
        Surface {
            pressure: get(self.pressure),
            temperature: get(self.temperature),
            height: get(self.height),
            terrain: self.terrain_at(t, j, i),
        }
    }

    /// Fail unless the state can provide `target`.
    pub fn supports(&self, target: VerticalCoordinate) -> Result<()> {
        if target == VerticalCoordinate::ThetaE && !self.has_qvapor() {
            return Err(DiagError::conflict(
                "theta_e coordinate requires a water vapour mixing ratio",
            ));
        }
        Ok(())
    }

    /// The column of `target` at `(j, i)`, in the units levels are given in.
    pub fn coordinate_column(
        &self,
        target: VerticalCoordinate,
        t: usize,
        j: usize,
        i: usize,
    ) -> Vec<f64> {
        let p = || self.pressure.column(t, j, i);
        let tk = || self.temperature.column(t, j, i);
        match target {
            VerticalCoordinate::Pressure => p(),
            VerticalCoordinate::Theta => p()
                .into_iter()
                .zip(tk())
                .map(|(p, t)| potential_temperature(p, t))
                .collect(),
            VerticalCoordinate::ThetaE => {
                let q = match self.qvapor {
                    Some(q) => q.column(t, j, i),
                    None => return vec![f64::NAN; self.pressure.shape().nz],
                };
                p().into_iter()
                    .zip(tk())
                    .zip(q)
                    .map(|((p, t), q)| equivalent_potential_temperature(p, t, q))
                    .collect()
            }
            VerticalCoordinate::GhtMsl => self
                .height
                .column(t, j, i)
                .into_iter()
                .map(|z| z / 1000.0)
                .collect(),
            VerticalCoordinate::GhtAgl => {
                let ter = self.terrain_at(t, j, i);
                self.height
                    .column(t, j, i)
                    .into_iter()
                    .map(|z| (z - ter) / 1000.0)
                    .collect()
            }
        }
    }

    /// A whole coordinate field, one column per grid point.
    pub fn coordinate_field(&self, target: VerticalCoordinate) -> Result<Field3D> {
        self.supports(target)?;
        let shape = self.pressure.shape();
        let mut data = vec![0.0f32; shape.len()];
        for t in 0..shape.nt {
            for j in 0..shape.ny {
                for i in 0..shape.nx {
                    for (k, v) in self.coordinate_column(target, t, j, i).into_iter().enumerate() {
                        data[((t * shape.nz + k) * shape.ny + j) * shape.nx + i] = v as f32;
                    }
                }
            }
        }
        let field = Field3D::new(data, shape, target.order())?;
        if self.pressure.times().len() == shape.nt {
            return field.with_times(self.pressure.times().to_vec());
        }
        Ok(field)
    }
}

/// Lowest-model-level state of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    /// hPa
    pub pressure: f64,
    /// K
    pub temperature: f64,
    /// m MSL
    pub height: f64,
    /// m MSL
    pub terrain: f64,
}

impl Surface {
    /// Pressure (hPa) at `z` m MSL below the lowest level.
    pub fn pressure_at_height(&self, z: f64) -> f64 {
        let t = self.temperature + USSALR * (self.height - z);
        self.pressure * (t / self.temperature).powf(1.0 / EXPON)
    }

    /// Pressure (hPa) at which the dry adiabat through the lowest level's
    /// lapse-rate extension reaches potential temperature `theta`.
    pub fn pressure_at_theta(&self, theta: f64) -> f64 {
        // θ(p) = T0 (p/p0)^E (1000/p)^κ, solved for p
        let scale = self.temperature * self.pressure.powf(-EXPON) * P1000.powf(KAPPA);
        (theta / scale).powf(1.0 / (EXPON - KAPPA))
    }

    pub fn theta(&self) -> f64 {
        potential_temperature(self.pressure, self.temperature)
    }
}
