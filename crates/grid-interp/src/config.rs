//! Options accepted by the interpolation engine.
//!
//! Every recognised option is a named field; unknown keys are rejected when
//! deserializing and conflicting combinations are rejected by
//! [`InterpOptions::validate`]. An options value is immutable once built and
//! is passed explicitly into each call.

use diag_common::{DiagError, FieldType, GridPoint, LatLon, TimeIndex};
use projection::IndexMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::line::{LineEnd, LineSpec};
use crate::profile::ProfileOptions;

/// Default number of automatically generated vertical levels.
pub const DEFAULT_AUTOLEVELS: usize = 100;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterpOptions {
    /// Describe the line by a pivot point and an angle
    pub use_pivot: bool,

    /// Line angle in degrees clockwise from north (pivot mode)
    pub angle: Option<f64>,

    /// Line endpoints are (lat, lon) rather than grid (x, y)
    pub latlon: bool,

    /// Pivot point as grid (x, y)
    pub pivot_point: Option<[f64; 2]>,

    /// Line start as (x, y), or (lat, lon) when `latlon` is set
    pub start_point: Option<[f64; 2]>,

    /// Line end as (x, y), or (lat, lon) when `latlon` is set
    pub end_point: Option<[f64; 2]>,

    /// Number of line points; derived from the line length when absent
    pub num_points: Option<usize>,

    /// Number of levels generated for automatic cross-section levels
    pub autolevels: usize,

    /// Extrapolate outside the column instead of writing missing values
    pub extrapolate: bool,

    /// Physical type of the field, required for physical extrapolation
    pub field_type: Option<FieldType>,

    /// Interpolate linearly in ln(p) for pressure coordinates
    pub log_p: bool,

    /// Levels are supplied as a per-point 2D field
    pub inc2dlevs: bool,

    /// Round geographic lookups to integer grid indices
    pub return_int: bool,

    /// Time step(s) to process
    pub time_index: TimeIndex,

    /// Attach lat/lon to every line point
    pub linecoords: bool,
}

impl Default for InterpOptions {
    fn default() -> Self {
        Self {
            use_pivot: false,
            angle: None,
            latlon: false,
            pivot_point: None,
            start_point: None,
            end_point: None,
            num_points: None,
            autolevels: DEFAULT_AUTOLEVELS,
            extrapolate: false,
            field_type: None,
            log_p: false,
            inc2dlevs: false,
            return_int: false,
            time_index: TimeIndex::default(),
            linecoords: false,
        }
    }
}

impl InterpOptions {
    /// Parse from a YAML document and validate.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let options: Self = serde_yaml::from_str(s)
            .map_err(|e| DiagError::conflict(format!("YAML error: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Parse from a JSON document and validate.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(s)?;
        options.validate()?;
        Ok(options)
    }

    /// Load from a YAML file and validate.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DiagError::conflict(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load from `INTERP_*` environment variables over the defaults.
    ///
    /// Unparsable values are an error rather than silently ignored.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();

        if let Some(v) = env_parse::<bool>("INTERP_USE_PIVOT")? {
            options.use_pivot = v;
        }
        if let Some(v) = env_parse::<f64>("INTERP_ANGLE")? {
            options.angle = Some(v);
        }
        if let Some(v) = env_parse::<bool>("INTERP_LATLON")? {
            options.latlon = v;
        }
        if let Some(v) = env_parse::<usize>("INTERP_NUM_POINTS")? {
            options.num_points = Some(v);
        }
        if let Some(v) = env_parse::<usize>("INTERP_AUTOLEVELS")? {
            options.autolevels = v;
        }
        if let Some(v) = env_parse::<bool>("INTERP_EXTRAPOLATE")? {
            options.extrapolate = v;
        }
        if let Ok(v) = std::env::var("INTERP_FIELD_TYPE") {
            options.field_type = Some(v.parse()?);
        }
        if let Some(v) = env_parse::<bool>("INTERP_LOG_P")? {
            options.log_p = v;
        }
        if let Some(v) = env_parse::<bool>("INTERP_INC2DLEVS")? {
            options.inc2dlevs = v;
        }
        if let Some(v) = env_parse::<bool>("INTERP_RETURN_INT")? {
            options.return_int = v;
        }
        if let Ok(v) = std::env::var("INTERP_TIME_INDEX") {
            options.time_index = if v.eq_ignore_ascii_case("all") {
                TimeIndex::All
            } else {
                TimeIndex::Single(v.parse().map_err(|_| {
                    DiagError::conflict(format!("INTERP_TIME_INDEX: invalid value '{}'", v))
                })?)
            };
        }
        if let Some(v) = env_parse::<bool>("INTERP_LINECOORDS")? {
            options.linecoords = v;
        }

        options.validate()?;
        Ok(options)
    }

    /// Reject conflicting or incomplete option combinations.
    pub fn validate(&self) -> Result<()> {
        if self.use_pivot && self.latlon {
            return Err(DiagError::conflict(
                "use_pivot and latlon are mutually exclusive",
            ));
        }
        if self.use_pivot {
            match self.angle {
                None => return Err(DiagError::conflict("use_pivot requires angle")),
                Some(a) if !a.is_finite() => {
                    return Err(DiagError::conflict(format!("angle must be finite, got {}", a)))
                }
                Some(_) => {}
            }
            if self.pivot_point.is_none() {
                return Err(DiagError::conflict("use_pivot requires pivot_point"));
            }
            if self.start_point.is_some() || self.end_point.is_some() {
                return Err(DiagError::conflict(
                    "start_point/end_point cannot be combined with use_pivot",
                ));
            }
        } else {
            if self.angle.is_some() || self.pivot_point.is_some() {
                return Err(DiagError::conflict("angle and pivot_point require use_pivot"));
            }
            if self.start_point.is_some() != self.end_point.is_some() {
                return Err(DiagError::conflict(
                    "start_point and end_point must be given together",
                ));
            }
        }
        if let Some(n) = self.num_points {
            if n < 2 {
                return Err(DiagError::conflict(format!(
                    "num_points must be at least 2, got {}",
                    n
                )));
            }
            if self.use_pivot {
                return Err(DiagError::conflict(
                    "num_points is derived from the domain in pivot mode",
                ));
            }
        }
        if self.autolevels == 0 {
            return Err(DiagError::conflict("autolevels must be > 0"));
        }
        for point in [self.pivot_point, self.start_point, self.end_point].into_iter().flatten() {
            if !point.iter().all(|v| v.is_finite()) {
                return Err(DiagError::conflict(format!(
                    "line point must be finite, got {:?}",
                    point
                )));
            }
        }
        Ok(())
    }

    /// Extra checks for vertical coordinate remapping.
    ///
    /// Physical extrapolation depends on the field's type, which cannot be
    /// inferred from its values, so it must be named explicitly.
    pub fn validate_for_remap(&self) -> Result<()> {
        self.validate()?;
        if self.extrapolate && self.field_type.is_none() {
            return Err(DiagError::conflict(
                "extrapolate requires an explicit field_type",
            ));
        }
        if self.inc2dlevs {
            return Err(DiagError::conflict(
                "inc2dlevs is not supported for vertical coordinate remapping",
            ));
        }
        Ok(())
    }

    /// Build the line specification described by these options, if any.
    pub fn line_spec(&self) -> Result<Option<LineSpec>> {
        self.validate()?;
        if self.use_pivot {
            // validate() guarantees both are present in pivot mode
            let (Some([x, y]), Some(angle)) = (self.pivot_point, self.angle) else {
                return Err(DiagError::conflict("use_pivot requires pivot_point and angle"));
            };
            return Ok(Some(LineSpec::Pivot {
                pivot: GridPoint::new(x, y),
                angle,
            }));
        }
        let (Some(start), Some(end)) = (self.start_point, self.end_point) else {
            return Ok(None);
        };
        let to_end = |p: [f64; 2]| {
            if self.latlon {
                LineEnd::Geo(LatLon::new(p[0], p[1]))
            } else {
                LineEnd::Grid(GridPoint::new(p[0], p[1]))
            }
        };
        Ok(Some(LineSpec::Endpoints {
            start: to_end(start),
            end: to_end(end),
            num_points: self.num_points,
        }))
    }

    /// Options for the per-column profile interpolator.
    pub fn profile_options(&self) -> ProfileOptions {
        ProfileOptions {
            log_coord: self.log_p,
            extrapolate: self.extrapolate,
        }
    }

    pub fn index_mode(&self) -> IndexMode {
        IndexMode::from_return_int(self.return_int)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .to_lowercase()
            .parse::<T>()
            .map(Some)
            .map_err(|_| DiagError::conflict(format!("{}: invalid value '{}'", key, val))),
        Err(_) => Ok(None),
    }
}
