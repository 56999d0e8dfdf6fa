//! Gridded model fields.
//!
//! Fields are stored row-major in a single flat `Vec<f32>`:
//! `time × bottom_top × south_north × west_east` for [`Field3D`] and
//! `time × south_north × west_east` for [`Field2D`]. Level 0 is the lowest
//! model level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DiagError, DiagResult};

/// Dimensions of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldShape {
    /// Number of time steps
    pub nt: usize,
    /// Number of vertical levels (1 for a 2D field)
    pub nz: usize,
    /// Number of rows (south_north)
    pub ny: usize,
    /// Number of columns (west_east)
    pub nx: usize,
}

impl FieldShape {
    pub fn new(nt: usize, nz: usize, ny: usize, nx: usize) -> Self {
        Self { nt, nz, ny, nx }
    }

    /// Shape of a horizontal 2D field.
    pub fn horizontal(nt: usize, ny: usize, nx: usize) -> Self {
        Self { nt, nz: 1, ny, nx }
    }

    /// Total number of values.
    pub fn len(&self) -> usize {
        self.nt * self.nz * self.ny * self.nx
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of points in one horizontal plane.
    pub fn plane_len(&self) -> usize {
        self.ny * self.nx
    }

    /// Number of values in one time step.
    pub fn step_len(&self) -> usize {
        self.nz * self.plane_len()
    }

    /// Same horizontal extent, ignoring the vertical and time axes.
    pub fn same_horizontal(&self, other: &FieldShape) -> bool {
        self.ny == other.ny && self.nx == other.nx
    }

    /// Whether a 2D surface over `self` can be read at every step of `other`:
    /// same horizontal extent and either one time step or `other.nt`.
    pub fn broadcasts_over(&self, other: &FieldShape) -> bool {
        self.same_horizontal(other) && (self.nt == 1 || self.nt == other.nt)
    }
}

/// Direction in which a vertical coordinate changes with increasing level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalOrder {
    /// Values increase upward (height, potential temperature)
    Ascending,
    /// Values decrease upward (pressure)
    Descending,
    /// Not known in advance; inferred per column
    #[default]
    Unknown,
}

impl VerticalOrder {
    /// Infer the order from the first and last finite values of a column.
    pub fn infer(column: &[f64]) -> Self {
        let first = column.iter().copied().find(|v| v.is_finite());
        let last = column.iter().rev().copied().find(|v| v.is_finite());
        match (first, last) {
            (Some(a), Some(b)) if b > a => VerticalOrder::Ascending,
            (Some(a), Some(b)) if b < a => VerticalOrder::Descending,
            _ => VerticalOrder::Unknown,
        }
    }

    /// Check that `column` is strictly monotonic in this direction.
    ///
    /// Non-finite values fail the check.
    pub fn is_strictly_monotonic(&self, column: &[f64]) -> bool {
        if column.iter().any(|v| !v.is_finite()) {
            return false;
        }
        match self {
            VerticalOrder::Ascending => column.windows(2).all(|w| w[1] > w[0]),
            VerticalOrder::Descending => column.windows(2).all(|w| w[1] < w[0]),
            VerticalOrder::Unknown => false,
        }
    }
}

/// A 3D field over time: `time × level × south_north × west_east`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field3D {
    data: Vec<f32>,
    shape: FieldShape,
    order: VerticalOrder,
    times: Vec<DateTime<Utc>>,
}

impl Field3D {
    /// Wrap a flat buffer. Fails if the buffer length does not match `shape`.
    pub fn new(data: Vec<f32>, shape: FieldShape, order: VerticalOrder) -> DiagResult<Self> {
        if data.len() != shape.len() {
            return Err(DiagError::shape_mismatch(shape.len(), data.len()));
        }
        if shape.is_empty() {
            return Err(DiagError::shape_mismatch("non-empty field", shape));
        }
        Ok(Self {
            data,
            shape,
            order,
            times: Vec::new(),
        })
    }

    /// Build a field by evaluating `f(t, k, j, i)` at every cell.
    pub fn from_fn<F>(shape: FieldShape, order: VerticalOrder, mut f: F) -> DiagResult<Self>
    where
        F: FnMut(usize, usize, usize, usize) -> f32,
    {
        let mut data = Vec::with_capacity(shape.len());
        for t in 0..shape.nt {
            for k in 0..shape.nz {
                for j in 0..shape.ny {
                    for i in 0..shape.nx {
                        data.push(f(t, k, j, i));
                    }
                }
            }
        }
        Self::new(data, shape, order)
    }

    /// Attach valid times (one per time step).
    pub fn with_times(mut self, times: Vec<DateTime<Utc>>) -> DiagResult<Self> {
        if times.len() != self.shape.nt {
            return Err(DiagError::shape_mismatch(self.shape.nt, times.len()));
        }
        self.times = times;
        Ok(self)
    }

    pub fn shape(&self) -> FieldShape {
        self.shape
    }

    pub fn order(&self) -> VerticalOrder {
        self.order
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    fn offset(&self, t: usize, k: usize, j: usize, i: usize) -> usize {
        ((t * self.shape.nz + k) * self.shape.ny + j) * self.shape.nx + i
    }

    /// Value at a cell, or `None` outside the field.
    pub fn get(&self, t: usize, k: usize, j: usize, i: usize) -> Option<f32> {
        if t >= self.shape.nt || k >= self.shape.nz || j >= self.shape.ny || i >= self.shape.nx {
            return None;
        }
        self.data.get(self.offset(t, k, j, i)).copied()
    }

    /// One horizontal plane (`ny * nx` values, row-major).
    pub fn level(&self, t: usize, k: usize) -> &[f32] {
        let start = self.offset(t, k, 0, 0);
        &self.data[start..start + self.shape.plane_len()]
    }

    /// The vertical column at `(j, i)`, bottom first, widened to f64.
    pub fn column(&self, t: usize, j: usize, i: usize) -> Vec<f64> {
        (0..self.shape.nz)
            .map(|k| self.data[self.offset(t, k, j, i)] as f64)
            .collect()
    }

    /// Fail with `ShapeMismatch` unless `other` has the same shape.
    pub fn ensure_same_shape(&self, other: &Field3D) -> DiagResult<()> {
        if self.shape != other.shape {
            return Err(DiagError::shape_mismatch(self.shape, other.shape));
        }
        Ok(())
    }
}

/// A horizontal field over time: `time × south_north × west_east`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field2D {
    data: Vec<f32>,
    shape: FieldShape,
    times: Vec<DateTime<Utc>>,
}

impl Field2D {
    pub fn new(data: Vec<f32>, nt: usize, ny: usize, nx: usize) -> DiagResult<Self> {
        let shape = FieldShape::horizontal(nt, ny, nx);
        if data.len() != shape.len() {
            return Err(DiagError::shape_mismatch(shape.len(), data.len()));
        }
        if shape.is_empty() {
            return Err(DiagError::shape_mismatch("non-empty field", shape));
        }
        Ok(Self {
            data,
            shape,
            times: Vec::new(),
        })
    }

    /// Build a field by evaluating `f(t, j, i)` at every cell.
    pub fn from_fn<F>(nt: usize, ny: usize, nx: usize, mut f: F) -> DiagResult<Self>
    where
        F: FnMut(usize, usize, usize) -> f32,
    {
        let mut data = Vec::with_capacity(nt * ny * nx);
        for t in 0..nt {
            for j in 0..ny {
                for i in 0..nx {
                    data.push(f(t, j, i));
                }
            }
        }
        Self::new(data, nt, ny, nx)
    }

    /// A field holding the same value everywhere.
    pub fn constant(value: f32, nt: usize, ny: usize, nx: usize) -> DiagResult<Self> {
        Self::new(vec![value; nt * ny * nx], nt, ny, nx)
    }

    pub fn with_times(mut self, times: Vec<DateTime<Utc>>) -> DiagResult<Self> {
        if times.len() != self.shape.nt {
            return Err(DiagError::shape_mismatch(self.shape.nt, times.len()));
        }
        self.times = times;
        Ok(self)
    }

    pub fn shape(&self) -> FieldShape {
        self.shape
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn get(&self, t: usize, j: usize, i: usize) -> Option<f32> {
        if t >= self.shape.nt || j >= self.shape.ny || i >= self.shape.nx {
            return None;
        }
        self.data
            .get((t * self.shape.ny + j) * self.shape.nx + i)
            .copied()
    }

    /// The horizontal plane for one time step.
    pub fn plane(&self, t: usize) -> &[f32] {
        let n = self.shape.plane_len();
        &self.data[t * n..(t + 1) * n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_rejects_wrong_length() {
        let shape = FieldShape::new(1, 2, 3, 4);
        let err = Field3D::new(vec![0.0; 23], shape, VerticalOrder::Ascending).unwrap_err();
        assert!(matches!(err, DiagError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_field_indexing() {
        let shape = FieldShape::new(2, 3, 4, 5);
        let field = Field3D::from_fn(shape, VerticalOrder::Ascending, |t, k, j, i| {
            (t * 1000 + k * 100 + j * 10 + i) as f32
        })
        .unwrap();

        assert_eq!(field.get(1, 2, 3, 4), Some(1234.0));
        assert_eq!(field.get(2, 0, 0, 0), None);
        assert_eq!(field.column(1, 2, 3), vec![1023.0, 1123.0, 1223.0]);
        assert_eq!(field.level(0, 1)[0], 100.0);
        assert_eq!(field.level(0, 1).len(), 20);
    }

    #[test]
    fn test_static_surface_broadcasts_over_time() {
        let field = FieldShape::new(3, 5, 2, 4);
        assert!(FieldShape::horizontal(1, 2, 4).broadcasts_over(&field));
        assert!(FieldShape::horizontal(3, 2, 4).broadcasts_over(&field));
        assert!(!FieldShape::horizontal(2, 2, 4).broadcasts_over(&field));
        assert!(!FieldShape::horizontal(1, 4, 2).broadcasts_over(&field));
    }

    #[test]
    fn test_infer_order() {
        assert_eq!(VerticalOrder::infer(&[1000.0, 850.0, 500.0]), VerticalOrder::Descending);
        assert_eq!(VerticalOrder::infer(&[f64::NAN, 10.0, 20.0]), VerticalOrder::Ascending);
        assert_eq!(VerticalOrder::infer(&[5.0, 5.0]), VerticalOrder::Unknown);
    }

    #[test]
    fn test_strict_monotonic() {
        assert!(VerticalOrder::Ascending.is_strictly_monotonic(&[1.0, 2.0, 3.0]));
        assert!(!VerticalOrder::Ascending.is_strictly_monotonic(&[1.0, 3.0, 2.0]));
        assert!(!VerticalOrder::Ascending.is_strictly_monotonic(&[1.0, 1.0, 2.0]));
        assert!(VerticalOrder::Descending.is_strictly_monotonic(&[3.0, 2.0, 1.0]));
        assert!(!VerticalOrder::Descending.is_strictly_monotonic(&[3.0, f64::NAN, 1.0]));
    }

    #[test]
    fn test_field2d_plane() {
        let field = Field2D::from_fn(2, 2, 3, |t, j, i| (t * 100 + j * 10 + i) as f32).unwrap();
        assert_eq!(field.plane(1), &[100.0, 101.0, 102.0, 110.0, 111.0, 112.0]);
        assert_eq!(field.get(0, 1, 2), Some(12.0));
    }
}
