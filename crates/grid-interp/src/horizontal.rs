//! Horizontal sampling at fractional grid positions.

use diag_common::{Field2D, Field3D, GridPoint};

/// Bilinear interpolation on a row-major `ny x nx` plane.
///
/// Positions outside `[0, nx-1] x [0, ny-1]` and cells with a NaN corner
/// return NaN. Integer positions return the grid value unchanged.
pub fn bilinear_interpolate(data: &[f32], nx: usize, ny: usize, x: f64, y: f64) -> f32 {
    match Weights::new(nx, ny, x, y) {
        Some(w) => w.apply(data),
        None => f32::NAN,
    }
}

/// Corner offsets and weights for one fractional position.
///
/// Computed once per line point and reused for every level of a column.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Weights {
    corners: [usize; 4],
    xf: f64,
    yf: f64,
}

impl Weights {
    pub(crate) fn new(nx: usize, ny: usize, x: f64, y: f64) -> Option<Self> {
        if nx == 0 || ny == 0 || !(x.is_finite() && y.is_finite()) {
            return None;
        }
        if !GridPoint::new(x, y).within(nx, ny) {
            return None;
        }
        let x = x.clamp(0.0, nx as f64 - 1.0);
        let y = y.clamp(0.0, ny as f64 - 1.0);

        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(nx - 1);
        let y1 = (y0 + 1).min(ny - 1);

        Some(Self {
            corners: [y0 * nx + x0, y0 * nx + x1, y1 * nx + x0, y1 * nx + x1],
            xf: x - x0 as f64,
            yf: y - y0 as f64,
        })
    }

    pub(crate) fn apply(&self, plane: &[f32]) -> f32 {
        let [v00, v10, v01, v11] = self.corners.map(|c| plane[c] as f64);

        // Only corners that carry weight take part, so exact grid positions
        // return the grid value even when a neighbour is missing.
        let on_x = self.xf == 0.0;
        let on_y = self.yf == 0.0;
        let value = match (on_x, on_y) {
            (true, true) => v00,
            (true, false) => v00 * (1.0 - self.yf) + v01 * self.yf,
            (false, true) => v00 * (1.0 - self.xf) + v10 * self.xf,
            (false, false) => {
                let bottom = v00 * (1.0 - self.xf) + v10 * self.xf;
                let top = v01 * (1.0 - self.xf) + v11 * self.xf;
                bottom * (1.0 - self.yf) + top * self.yf
            }
        };
        value as f32
    }
}

/// The vertical column of a 3D field at a fractional position, bottom first.
///
/// Every level is NaN when the position is outside the grid.
pub fn sample_column(field: &Field3D, t: usize, point: GridPoint) -> Vec<f64> {
    let shape = field.shape();
    match Weights::new(shape.nx, shape.ny, point.x, point.y) {
        Some(w) => (0..shape.nz)
            .map(|k| w.apply(field.level(t, k)) as f64)
            .collect(),
        None => vec![f64::NAN; shape.nz],
    }
}

/// Value of a 2D field at a fractional position.
pub fn sample_plane(field: &Field2D, t: usize, point: GridPoint) -> f32 {
    let shape = field.shape();
    bilinear_interpolate(field.plane(t), shape.nx, shape.ny, point.x, point.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diag_common::{FieldShape, VerticalOrder};

    #[test]
    fn test_bilinear_interpolate() {
        let data = vec![0.0, 1.0, 2.0, 3.0];
        assert_eq!(bilinear_interpolate(&data, 2, 2, 0.0, 0.0), 0.0);
        assert_eq!(bilinear_interpolate(&data, 2, 2, 1.0, 1.0), 3.0);
        assert!((bilinear_interpolate(&data, 2, 2, 0.5, 0.5) - 1.5).abs() < 1e-6);
        assert!((bilinear_interpolate(&data, 2, 2, 0.25, 0.0) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_bilinear_with_nan() {
        let data = vec![0.0, f32::NAN, 2.0, 3.0];
        assert!(bilinear_interpolate(&data, 2, 2, 0.5, 0.5).is_nan());
        // The missing corner carries no weight on the first column
        assert_eq!(bilinear_interpolate(&data, 2, 2, 0.0, 1.0), 2.0);
    }

    #[test]
    fn test_bilinear_outside_grid() {
        let data = vec![0.0, 1.0, 2.0, 3.0];
        assert!(bilinear_interpolate(&data, 2, 2, -0.5, 0.0).is_nan());
        assert!(bilinear_interpolate(&data, 2, 2, 0.0, 1.5).is_nan());
        assert!(bilinear_interpolate(&data, 2, 2, f64::NAN, 0.0).is_nan());
    }

    #[test]
    fn test_last_row_and_column() {
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        assert_eq!(bilinear_interpolate(&data, 4, 3, 3.0, 2.0), 11.0);
        assert!((bilinear_interpolate(&data, 4, 3, 3.0, 1.5) - 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_sample_column() {
        let shape = FieldShape::new(1, 3, 2, 2);
        let field = Field3D::from_fn(shape, VerticalOrder::Ascending, |_, k, j, i| {
            (100 * k + 10 * j + i) as f32
        })
        .unwrap();

        let column = sample_column(&field, 0, GridPoint::new(1.0, 0.0));
        assert_eq!(column, vec![1.0, 101.0, 201.0]);

        let column = sample_column(&field, 0, GridPoint::new(0.5, 0.5));
        assert!((column[2] - 205.5).abs() < 1e-4);

        let outside = sample_column(&field, 0, GridPoint::new(5.0, 0.0));
        assert!(outside.iter().all(|v| v.is_nan()));
    }
}
