//! Interpolation engine for atmospheric model output.
//!
//! This crate works on in-memory fields laid out `time × level ×
//! south_north × west_east`:
//! - [`interp_levels`]: horizontal slices at levels of a vertical coordinate
//! - [`CrossSectionEngine`]: vertical cross sections and 2D line sampling
//! - [`VerticalCoordinateTransform`]: remapping onto pressure, θ, θe or height
//!
//! All operations are pure functions of their inputs. Per-column failures
//! become NaN in the output; structural problems are returned as
//! [`DiagError`].

pub mod atmosphere;
pub mod config;
pub mod cross_section;
pub mod error;
pub mod horizontal;
pub mod levels;
pub mod line;
pub mod profile;
pub mod remap;

pub use atmosphere::{AtmosphereState, Surface};
pub use config::InterpOptions;
pub use cross_section::{CrossSectionEngine, LevelSpec};
pub use error::{ColumnFault, DiagError, Result};
pub use horizontal::bilinear_interpolate;
pub use levels::{interp_levels, LevelSet};
pub use line::{LineEnd, LinePath, LineSampler, LineSpec};
pub use profile::{Bracket, ProfileOptions, VerticalProfileInterpolator};
pub use remap::VerticalCoordinateTransform;
