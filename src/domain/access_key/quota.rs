//! Data limit units and quota normalization
//!
//! Units scale by powers of 1024. Stored access keys were written with this
//! scaling, so switching to 1000-based units would change the meaning of
//! every existing quota.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest magnitude accepted in any unit, checked before unit conversion
pub const MAX_DATA_LIMIT: u64 = 1_000_000_000_000_000;

/// Errors raised by quota range checks
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuotaRangeError {
    #[error("Data limit cannot be negative (got {0})")]
    Negative(i64),

    #[error("Data limit {magnitude} exceeds maximum of {max}")]
    ExceedsMaximum { magnitude: u64, max: u64 },
}

/// Error returned when a unit label is not one of the supported units
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown data limit unit: '{0}'")]
pub struct UnknownUnitError(pub String);

/// Unit a data limit magnitude is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum DataLimitUnit {
    #[default]
    Bytes,
    #[serde(rename = "KB")]
    Kb,
    #[serde(rename = "MB")]
    Mb,
    #[serde(rename = "GB")]
    Gb,
}

impl DataLimitUnit {
    /// All units, smallest first
    pub const ALL: [DataLimitUnit; 4] = [Self::Bytes, Self::Kb, Self::Mb, Self::Gb];

    /// Number of bytes in one of this unit
    pub fn multiplier(self) -> u64 {
        match self {
            Self::Bytes => 1,
            Self::Kb => 1024,
            Self::Mb => 1024 * 1024,
            Self::Gb => 1024 * 1024 * 1024,
        }
    }

    /// Label shown to users and stored alongside the magnitude
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bytes => "Bytes",
            Self::Kb => "KB",
            Self::Mb => "MB",
            Self::Gb => "GB",
        }
    }
}

impl fmt::Display for DataLimitUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataLimitUnit {
    type Err = UnknownUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.as_str() == s)
            .ok_or_else(|| UnknownUnitError(s.to_string()))
    }
}

/// A validated magnitude together with the unit it was entered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataLimit {
    magnitude: u64,
    unit: DataLimitUnit,
}

impl DataLimit {
    /// Create a data limit, checking the magnitude bound
    pub fn new(magnitude: u64, unit: DataLimitUnit) -> Result<Self, QuotaRangeError> {
        check_magnitude(magnitude)?;
        Ok(Self { magnitude, unit })
    }

    pub fn magnitude(&self) -> u64 {
        self.magnitude
    }

    pub fn unit(&self) -> DataLimitUnit {
        self.unit
    }

    /// Size of the limit in bytes
    pub fn to_bytes(&self) -> u128 {
        u128::from(self.magnitude) * u128::from(self.unit.multiplier())
    }
}

impl fmt::Display for DataLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit)
    }
}

/// Bytes per unit
pub fn unit_multiplier(unit: DataLimitUnit) -> u64 {
    unit.multiplier()
}

fn check_magnitude(magnitude: u64) -> Result<(), QuotaRangeError> {
    if magnitude > MAX_DATA_LIMIT {
        return Err(QuotaRangeError::ExceedsMaximum {
            magnitude,
            max: MAX_DATA_LIMIT,
        });
    }

    Ok(())
}

/// Check a signed user-entered magnitude against `[0, MAX_DATA_LIMIT]`
pub fn validate_magnitude(magnitude: i64) -> Result<u64, QuotaRangeError> {
    let magnitude = u64::try_from(magnitude).map_err(|_| QuotaRangeError::Negative(magnitude))?;
    check_magnitude(magnitude)?;
    Ok(magnitude)
}

/// Convert a magnitude in `unit` to bytes
///
/// The bound applies to the magnitude in its own unit, so the byte count of
/// an accepted limit can exceed `MAX_DATA_LIMIT`.
pub fn to_canonical_bytes(magnitude: u64, unit: DataLimitUnit) -> Result<u128, QuotaRangeError> {
    Ok(DataLimit::new(magnitude, unit)?.to_bytes())
}

/// Express a byte count in the largest unit that divides it exactly
pub fn from_canonical_bytes(bytes: u128) -> Result<DataLimit, QuotaRangeError> {
    let unit = DataLimitUnit::ALL
        .into_iter()
        .rev()
        .find(|unit| bytes % u128::from(unit.multiplier()) == 0)
        .unwrap_or_default();

    let magnitude = bytes / u128::from(unit.multiplier());
    let magnitude = u64::try_from(magnitude).map_err(|_| QuotaRangeError::ExceedsMaximum {
        magnitude: u64::MAX,
        max: MAX_DATA_LIMIT,
    })?;

    DataLimit::new(magnitude, unit)
}

/// Seed an editor from a persisted magnitude/unit pair
///
/// The stored unit is kept as-is; no auto-scaling to a "nicer" unit.
pub fn seed_unit_and_magnitude(
    magnitude: Option<u64>,
    unit: Option<DataLimitUnit>,
) -> (Option<u64>, DataLimitUnit) {
    (magnitude, unit.unwrap_or_default())
}
