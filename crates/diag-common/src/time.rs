//! Time-step selection.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{DiagError, DiagResult};

/// Which time steps a call operates on.
///
/// Serialized as an integer index or the string `"all"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeIndex {
    Single(usize),
    All,
}

impl Default for TimeIndex {
    fn default() -> Self {
        TimeIndex::Single(0)
    }
}

impl TimeIndex {
    pub fn is_all(&self) -> bool {
        matches!(self, TimeIndex::All)
    }

    /// Expand to the concrete list of time indices for `nt` available steps.
    pub fn resolve(&self, nt: usize) -> DiagResult<Vec<usize>> {
        match *self {
            TimeIndex::All => Ok((0..nt).collect()),
            TimeIndex::Single(index) if index < nt => Ok(vec![index]),
            TimeIndex::Single(index) => Err(DiagError::InvalidTimeIndex {
                index,
                available: nt,
            }),
        }
    }
}

impl Serialize for TimeIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TimeIndex::Single(index) => serializer.serialize_u64(*index as u64),
            TimeIndex::All => serializer.serialize_str("all"),
        }
    }
}

impl<'de> Deserialize<'de> for TimeIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TimeIndexVisitor;

        impl<'de> Visitor<'de> for TimeIndexVisitor {
            type Value = TimeIndex;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a non-negative time index or \"all\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<TimeIndex, E> {
                Ok(TimeIndex::Single(v as usize))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<TimeIndex, E> {
                if v < 0 {
                    return Err(E::custom(format!("negative time index {}", v)));
                }
                Ok(TimeIndex::Single(v as usize))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<TimeIndex, E> {
                if v.eq_ignore_ascii_case("all") {
                    Ok(TimeIndex::All)
                } else {
                    v.parse::<usize>()
                        .map(TimeIndex::Single)
                        .map_err(|_| E::custom(format!("invalid time index '{}'", v)))
                }
            }
        }

        deserializer.deserialize_any(TimeIndexVisitor)
    }
}
