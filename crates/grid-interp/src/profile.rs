//! Interpolation of a single vertical profile.
//!
//! A profile is a pair of co-located columns, bottom level first: the
//! vertical coordinate and the value being interpolated. The coordinate must
//! be strictly monotonic; its direction comes from the field's
//! [`VerticalOrder`] or, when that is unknown, from the column itself.

use diag_common::VerticalOrder;
use serde::{Deserialize, Serialize};

use crate::error::ColumnFault;

/// Per-call interpolation policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileOptions {
    /// Interpolate linearly in ln(coord) on columns that decrease upward
    /// (pressure); ascending columns such as height keep linear weights
    pub log_coord: bool,
    /// Extend the nearest interval outside the column instead of returning NaN
    pub extrapolate: bool,
}

/// Where a target coordinate falls relative to a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bracket {
    /// Between levels `k` and `k + 1`, `weight` of the way to `k + 1`
    Within { k: usize, weight: f64 },
    /// Beyond the first (lowest) level
    BelowBottom,
    /// Beyond the last (highest) level
    AboveTop,
}

/// Interpolator over one column.
#[derive(Debug, Clone, Copy)]
pub struct VerticalProfileInterpolator<'a> {
    coord: &'a [f64],
    values: &'a [f64],
    /// +1 for ascending coordinates, -1 for descending
    sign: f64,
    options: ProfileOptions,
}

impl<'a> VerticalProfileInterpolator<'a> {
    /// Check the column and fix its direction.
    pub fn new(
        coord: &'a [f64],
        values: &'a [f64],
        order: VerticalOrder,
        options: ProfileOptions,
    ) -> Result<Self, ColumnFault> {
        if coord.len() != values.len() {
            return Err(ColumnFault::LengthMismatch {
                coord: coord.len(),
                values: values.len(),
            });
        }
        if coord.is_empty() {
            return Err(ColumnFault::Empty);
        }

        let order = match (order, coord.len()) {
            (_, 1) => VerticalOrder::Ascending,
            (VerticalOrder::Unknown, _) => VerticalOrder::infer(coord),
            (order, _) => order,
        };
        if !order.is_strictly_monotonic(coord) {
            return Err(ColumnFault::NonMonotonic);
        }

        Ok(Self {
            coord,
            values,
            sign: if order == VerticalOrder::Descending { -1.0 } else { 1.0 },
            options,
        })
    }

    pub fn len(&self) -> usize {
        self.coord.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coord.is_empty()
    }

    /// Lowest-level coordinate and value.
    pub fn bottom(&self) -> (f64, f64) {
        (self.coord[0], self.values[0])
    }

    /// Highest-level coordinate and value.
    pub fn top(&self) -> (f64, f64) {
        let last = self.coord.len() - 1;
        (self.coord[last], self.values[last])
    }

    /// Locate `target` with a single scan in the column's direction.
    pub fn locate(&self, target: f64) -> Bracket {
        let n = self.coord.len();
        let t = self.sign * target;
        if t < self.sign * self.coord[0] {
            return Bracket::BelowBottom;
        }
        if t > self.sign * self.coord[n - 1] {
            return Bracket::AboveTop;
        }
        if n == 1 {
            return Bracket::Within { k: 0, weight: 0.0 };
        }
        for k in 0..n - 1 {
            let upper = self.sign * self.coord[k + 1];
            if t <= upper {
                return Bracket::Within {
                    k,
                    weight: self.weight(k, target),
                };
            }
        }
        Bracket::Within {
            k: n - 2,
            weight: 1.0,
        }
    }

    /// Fractional position of `target` from level `k` towards `k + 1`.
    ///
    /// Not clamped, so it also serves for extrapolation.
    fn weight(&self, k: usize, target: f64) -> f64 {
        let (c0, c1) = (self.coord[k], self.coord[k + 1]);
        let pressure_like = self.sign < 0.0;
        if self.options.log_coord && pressure_like && c0 > 0.0 && c1 > 0.0 && target > 0.0 {
            (target.ln() - c0.ln()) / (c1.ln() - c0.ln())
        } else {
            (target - c0) / (c1 - c0)
        }
    }

    fn blend(&self, k: usize, weight: f64) -> f64 {
        if weight == 0.0 {
            return self.values[k];
        }
        if weight == 1.0 {
            return self.values[k + 1];
        }
        (1.0 - weight) * self.values[k] + weight * self.values[k + 1]
    }

    /// Value at `target`, or NaN outside the column unless extrapolating.
    pub fn interpolate(&self, target: f64) -> f64 {
        if !target.is_finite() {
            return f64::NAN;
        }
        match self.locate(target) {
            Bracket::Within { k, weight } => self.blend(k, weight),
            _ if !self.options.extrapolate => f64::NAN,
            _ if self.coord.len() == 1 => self.values[0],
            Bracket::BelowBottom => self.blend(0, self.weight(0, target)),
            Bracket::AboveTop => {
                let k = self.coord.len() - 2;
                self.blend(k, self.weight(k, target))
            }
        }
    }

    /// Values at several targets; each target is independent.
    pub fn interpolate_many(&self, targets: &[f64]) -> Vec<f64> {
        targets.iter().map(|&t| self.interpolate(t)).collect()
    }
}

/// Interpolate one column at several targets.
///
/// A faulty column yields all-NaN output together with the fault.
pub fn interpolate_column(
    coord: &[f64],
    values: &[f64],
    order: VerticalOrder,
    targets: &[f64],
    options: ProfileOptions,
) -> (Vec<f64>, Option<ColumnFault>) {
    match VerticalProfileInterpolator::new(coord, values, order, options) {
        Ok(interp) => (interp.interpolate_many(targets), None),
        Err(fault) => (vec![f64::NAN; targets.len()], Some(fault)),
    }
}
