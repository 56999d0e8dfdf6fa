//! Common types shared by the projection and interpolation crates.
//!
//! Everything here is plain data: fields arrive from an external provider,
//! results leave for an external sink, and nothing in this crate performs
//! I/O.

pub mod coords;
pub mod error;
pub mod field;
pub mod kinds;
pub mod result;
pub mod time;

pub use coords::{CoordPair, GridPoint, LatLon};
pub use error::{DiagError, DiagResult};
pub use field::{Field2D, Field3D, FieldShape, VerticalOrder};
pub use kinds::{FieldType, VerticalCoordinate};
pub use result::{Axis, AxisCoords, AxisName, InterpolationResult};
pub use time::TimeIndex;

/// Missing-value marker written into every output array.
pub const MISSING: f32 = f32::NAN;

/// True if `value` is the missing marker (or otherwise not finite).
pub fn is_missing<T: num_traits::Float>(value: T) -> bool {
    !value.is_finite()
}
