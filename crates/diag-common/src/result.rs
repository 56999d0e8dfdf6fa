//! Labeled output arrays.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coords::CoordPair;
use crate::error::{DiagError, DiagResult};
use crate::MISSING;

/// Logical name of an output dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisName {
    Time,
    /// Requested interpolation levels
    Level,
    /// Native model levels (whole-column cross sections)
    BottomTop,
    /// Points along a horizontal line
    LineIdx,
    SouthNorth,
    WestEast,
}

impl AxisName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "Time",
            Self::Level => "vertical",
            Self::BottomTop => "bottom_top",
            Self::LineIdx => "line_idx",
            Self::SouthNorth => "south_north",
            Self::WestEast => "west_east",
        }
    }
}

/// Coordinate labels attached to an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AxisCoords {
    None,
    Values(Vec<f64>),
    Times(Vec<DateTime<Utc>>),
    Line(Vec<CoordPair>),
    /// Labels that differ per time step (moving nests)
    PerTime(Vec<AxisCoords>),
}

/// One dimension of an [`InterpolationResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub name: AxisName,
    pub len: usize,
    pub coords: AxisCoords,
}

impl Axis {
    pub fn new(name: AxisName, len: usize) -> Self {
        Self {
            name,
            len,
            coords: AxisCoords::None,
        }
    }

    pub fn with_values(name: AxisName, values: Vec<f64>) -> Self {
        Self {
            name,
            len: values.len(),
            coords: AxisCoords::Values(values),
        }
    }

    pub fn with_line(points: Vec<CoordPair>) -> Self {
        Self {
            name: AxisName::LineIdx,
            len: points.len(),
            coords: AxisCoords::Line(points),
        }
    }
}

/// A freshly allocated, labeled output array (row-major over `axes`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolationResult {
    pub data: Vec<f32>,
    pub axes: Vec<Axis>,
    /// Vertical coordinate of every output cell, same layout as `data`.
    /// Only set for whole-column cross sections.
    pub vertical_coord: Option<Vec<f32>>,
    /// Number of cells set to the missing marker.
    pub missing_count: usize,
}

impl InterpolationResult {
    /// Create a result, checking that `data` matches the axis lengths.
    pub fn new(data: Vec<f32>, axes: Vec<Axis>) -> DiagResult<Self> {
        let expected: usize = axes.iter().map(|a| a.len).product();
        if data.len() != expected {
            return Err(DiagError::shape_mismatch(expected, data.len()));
        }
        let missing_count = data.iter().filter(|v| crate::is_missing(**v)).count();
        Ok(Self {
            data,
            axes,
            vertical_coord: None,
            missing_count,
        })
    }

    pub fn with_vertical_coord(mut self, coord: Vec<f32>) -> DiagResult<Self> {
        if coord.len() != self.data.len() {
            return Err(DiagError::shape_mismatch(self.data.len(), coord.len()));
        }
        self.vertical_coord = Some(coord);
        Ok(self)
    }

    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.len).collect()
    }

    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    pub fn axis(&self, name: AxisName) -> Option<&Axis> {
        self.axes.iter().find(|a| a.name == name)
    }

    fn flat_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.axes.len() {
            return None;
        }
        let mut flat = 0;
        for (axis, &i) in self.axes.iter().zip(index) {
            if i >= axis.len {
                return None;
            }
            flat = flat * axis.len + i;
        }
        Some(flat)
    }

    /// Value at a multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Option<f32> {
        self.flat_index(index).map(|i| self.data[i])
    }

    /// Stack per-time results on a new leading time axis.
    ///
    /// Parts must have the same number of axes with the same names. Axes of
    /// unequal length (a moving nest can give a different line length per
    /// step) are padded with missing values up to the longest part; axis
    /// labels that differ between parts are kept per time step.
    pub fn stack_time(parts: Vec<InterpolationResult>, time_axis: Axis) -> DiagResult<Self> {
        let first = parts
            .first()
            .ok_or_else(|| DiagError::shape_mismatch("at least one time step", 0))?;
        if time_axis.len != parts.len() {
            return Err(DiagError::shape_mismatch(parts.len(), time_axis.len));
        }
        let names: Vec<AxisName> = first.axes.iter().map(|a| a.name).collect();
        for part in &parts {
            let part_names: Vec<AxisName> = part.axes.iter().map(|a| a.name).collect();
            if part_names != names {
                return Err(DiagError::shape_mismatch(&names, part_names));
            }
        }

        let lens: Vec<usize> = (0..names.len())
            .map(|d| parts.iter().map(|p| p.axes[d].len).max().unwrap_or(0))
            .collect();
        let step_len: usize = lens.iter().product();
        let has_vertical = parts.iter().all(|p| p.vertical_coord.is_some());

        let mut data = vec![MISSING; step_len * parts.len()];
        let mut vertical = has_vertical.then(|| vec![MISSING; step_len * parts.len()]);

        for (t, part) in parts.iter().enumerate() {
            let part_lens = part.shape();
            for (src, value) in part.data.iter().enumerate() {
                let dst = t * step_len + remap_index(src, &part_lens, &lens);
                data[dst] = *value;
                if let (Some(out), Some(v)) = (vertical.as_mut(), part.vertical_coord.as_ref()) {
                    out[dst] = v[src];
                }
            }
        }

        let mut axes = Vec::with_capacity(names.len() + 1);
        axes.push(time_axis);
        for (d, name) in names.iter().enumerate() {
            let coords: Vec<&AxisCoords> = parts.iter().map(|p| &p.axes[d].coords).collect();
            let shared = coords.windows(2).all(|w| w[0] == w[1]);
            axes.push(Axis {
                name: *name,
                len: lens[d],
                coords: if shared {
                    coords[0].clone()
                } else {
                    AxisCoords::PerTime(coords.into_iter().cloned().collect())
                },
            });
        }

        let mut result = Self::new(data, axes)?;
        result.vertical_coord = vertical;
        Ok(result)
    }
}

/// Map a row-major offset in `from` dims onto the same cell in `to` dims.
fn remap_index(mut src: usize, from: &[usize], to: &[usize]) -> usize {
    let mut idx = vec![0usize; from.len()];
    for d in (0..from.len()).rev() {
        idx[d] = src % from[d];
        src /= from[d];
    }
    idx.iter().zip(to).fold(0, |acc, (&i, &n)| acc * n + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        let axes = vec![Axis::new(AxisName::Level, 2), Axis::new(AxisName::LineIdx, 3)];
        assert!(InterpolationResult::new(vec![0.0; 5], axes.clone()).is_err());
        let result = InterpolationResult::new(vec![0.0, 1.0, 2.0, 3.0, f32::NAN, 5.0], axes).unwrap();
        assert_eq!(result.shape(), vec![2, 3]);
        assert_eq!(result.get(&[1, 0]), Some(3.0));
        assert_eq!(result.missing_count, 1);
    }

    #[test]
    fn test_stack_time_pads_short_parts() {
        let a = InterpolationResult::new(vec![1.0, 2.0, 3.0], vec![Axis::new(AxisName::LineIdx, 3)]).unwrap();
        let b = InterpolationResult::new(vec![4.0, 5.0], vec![Axis::new(AxisName::LineIdx, 2)]).unwrap();
        let stacked = InterpolationResult::stack_time(vec![a, b], Axis::new(AxisName::Time, 2)).unwrap();

        assert_eq!(stacked.shape(), vec![2, 3]);
        assert_eq!(stacked.get(&[1, 1]), Some(5.0));
        assert!(stacked.get(&[1, 2]).unwrap().is_nan());
        assert_eq!(stacked.missing_count, 1);
    }

    #[test]
    fn test_stack_time_keeps_per_time_labels() {
        let a = InterpolationResult::new(vec![1.0], vec![Axis::with_values(AxisName::Level, vec![500.0])]).unwrap();
        let b = InterpolationResult::new(vec![2.0], vec![Axis::with_values(AxisName::Level, vec![700.0])]).unwrap();
        let stacked = InterpolationResult::stack_time(vec![a, b], Axis::new(AxisName::Time, 2)).unwrap();
        assert!(matches!(
            stacked.axis(AxisName::Level).unwrap().coords,
            AxisCoords::PerTime(_)
        ));
    }
}
