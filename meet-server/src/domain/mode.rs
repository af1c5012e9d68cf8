//! Travel modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown travel mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown travel mode: {0}")]
pub struct InvalidTravelMode(String);

/// How a party gets to the meeting point.
///
/// This is a closed set: the strategy dispatcher matches exhaustively on
/// pairs of modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelMode {
    Driving,
    Transit,
    Walking,
}

impl TravelMode {
    /// All modes, in a fixed order.
    pub const ALL: [TravelMode; 3] = [TravelMode::Driving, TravelMode::Transit, TravelMode::Walking];

    /// Lowercase name used on the oracle wire (`mode=driving`).
    pub fn as_api_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Transit => "transit",
            TravelMode::Walking => "walking",
        }
    }

    /// Uppercase name, as used in oracle step descriptions.
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "DRIVING",
            TravelMode::Transit => "TRANSIT",
            TravelMode::Walking => "WALKING",
        }
    }
}

impl FromStr for TravelMode {
    type Err = InvalidTravelMode;

    /// Parse a mode, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DRIVING" => Ok(TravelMode::Driving),
            "TRANSIT" => Ok(TravelMode::Transit),
            "WALKING" => Ok(TravelMode::Walking),
            _ => Err(InvalidTravelMode(s.to_string())),
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
