//! Closed sets of field and vertical-coordinate kinds.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DiagError;
use crate::field::VerticalOrder;

/// Physical category of a field being remapped.
///
/// Governs the extrapolation formula used below the lowest model level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// No physical extrapolation; the lowest model level value is used
    None,
    /// Pressure in hPa
    #[serde(alias = "pres", alias = "p")]
    Pressure,
    /// Geopotential height in m
    #[serde(alias = "z", alias = "ght")]
    Height,
    /// Temperature in K
    #[serde(rename = "tk")]
    TemperatureK,
    /// Temperature in degrees C
    #[serde(rename = "tc")]
    TemperatureC,
    /// Potential temperature in K
    #[serde(alias = "th")]
    Theta,
    /// Equivalent potential temperature in K
    #[serde(rename = "theta_e", alias = "theta-e", alias = "thetae", alias = "eth")]
    ThetaE,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pressure => "pressure",
            Self::Height => "height",
            Self::TemperatureK => "tk",
            Self::TemperatureC => "tc",
            Self::Theta => "theta",
            Self::ThetaE => "theta_e",
        }
    }
}

impl FromStr for FieldType {
    type Err = DiagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "pressure" | "pres" | "p" => Ok(Self::Pressure),
            "height" | "z" | "ght" => Ok(Self::Height),
            "tk" => Ok(Self::TemperatureK),
            "tc" => Ok(Self::TemperatureC),
            "theta" | "th" => Ok(Self::Theta),
            "theta_e" | "theta-e" | "thetae" | "eth" => Ok(Self::ThetaE),
            other => Err(DiagError::conflict(format!("unknown field type '{}'", other))),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Target vertical coordinate for a remap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalCoordinate {
    /// Pressure, levels in hPa
    #[serde(alias = "p")]
    Pressure,
    /// Potential temperature, levels in K
    #[serde(alias = "th")]
    Theta,
    /// Equivalent potential temperature, levels in K
    #[serde(rename = "theta_e", alias = "theta-e", alias = "thetae", alias = "eth")]
    ThetaE,
    /// Geopotential height above mean sea level, levels in km
    GhtMsl,
    /// Geopotential height above ground level, levels in km
    GhtAgl,
}

impl VerticalCoordinate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pressure => "pressure",
            Self::Theta => "theta",
            Self::ThetaE => "theta_e",
            Self::GhtMsl => "ght_msl",
            Self::GhtAgl => "ght_agl",
        }
    }

    /// How the coordinate changes upward in a stable atmosphere.
    pub fn order(&self) -> VerticalOrder {
        match self {
            Self::Pressure => VerticalOrder::Descending,
            _ => VerticalOrder::Ascending,
        }
    }

    /// Unit of the requested level values.
    pub fn level_units(&self) -> &'static str {
        match self {
            Self::Pressure => "hPa",
            Self::Theta | Self::ThetaE => "K",
            Self::GhtMsl | Self::GhtAgl => "km",
        }
    }
}

impl FromStr for VerticalCoordinate {
    type Err = DiagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pressure" | "p" => Ok(Self::Pressure),
            "theta" | "th" => Ok(Self::Theta),
            "theta_e" | "theta-e" | "thetae" | "eth" => Ok(Self::ThetaE),
            "ght_msl" => Ok(Self::GhtMsl),
            "ght_agl" => Ok(Self::GhtAgl),
            other => Err(DiagError::conflict(format!(
                "unknown vertical coordinate '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for VerticalCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_units() {
        assert_eq!(VerticalCoordinate::Pressure.level_units(), "hPa");
        assert_eq!(VerticalCoordinate::ThetaE.level_units(), "K");
        assert_eq!(VerticalCoordinate::GhtAgl.level_units(), "km");
    }

    #[test]
    fn test_field_type_aliases() {
        assert_eq!("ght".parse::<FieldType>().unwrap(), FieldType::Height);
        assert_eq!("Z".parse::<FieldType>().unwrap(), FieldType::Height);
        assert_eq!("pres".parse::<FieldType>().unwrap(), FieldType::Pressure);
        assert_eq!("eth".parse::<FieldType>().unwrap(), FieldType::ThetaE);
        assert!("dbz".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_field_type_serde() {
        let ft: FieldType = serde_json::from_str("\"theta-e\"").unwrap();
        assert_eq!(ft, FieldType::ThetaE);
        let ft: FieldType = serde_json::from_str("\"tk\"").unwrap();
        assert_eq!(ft, FieldType::TemperatureK);
        assert_eq!(serde_json::to_string(&FieldType::Height).unwrap(), "\"height\"");
    }

    #[test]
    fn test_vertical_coordinate_order() {
        assert_eq!(VerticalCoordinate::Pressure.order(), VerticalOrder::Descending);
        assert_eq!(VerticalCoordinate::GhtAgl.order(), VerticalOrder::Ascending);
        assert_eq!("ght_msl".parse::<VerticalCoordinate>().unwrap(), VerticalCoordinate::GhtMsl);
        assert!("sigma".parse::<VerticalCoordinate>().is_err());
    }
}
