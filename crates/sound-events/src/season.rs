//! Season of the year.
//!
//! Terrain attenuation depends on the season: bare autumn forests carry sound
//! further, and winter snow cover soaks it up everywhere.
//!
//! # Example
//!
//! ```
//! use sound_events::Season;
//!
//! let season: Season = "winter".parse().unwrap();
//! assert_eq!(season.next(), Season::Spring);
//! assert_eq!(season.to_string(), "winter");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Season of the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Returns the next season in order.
    pub fn next(self) -> Self {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Autumn,
            Season::Autumn => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }

    /// Returns true if this is the last season of the year.
    pub fn is_year_end(self) -> bool {
        matches!(self, Season::Winter)
    }

    /// Returns true when ground snow cover is assumed.
    pub fn has_snow_cover(self) -> bool {
        matches!(self, Season::Winter)
    }

    /// Returns all seasons in calendar order.
    pub fn all() -> &'static [Season] {
        &[Season::Spring, Season::Summer, Season::Autumn, Season::Winter]
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Spring => write!(f, "spring"),
            Season::Summer => write!(f, "summer"),
            Season::Autumn => write!(f, "autumn"),
            Season::Winter => write!(f, "winter"),
        }
    }
}

/// Error type for parsing a [`Season`] from a string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid season: '{0}'")]
pub struct ParseSeasonError(pub String);

impl FromStr for Season {
    type Err = ParseSeasonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" | "fall" => Ok(Season::Autumn),
            "winter" => Ok(Season::Winter),
            _ => Err(ParseSeasonError(s.to_string())),
        }
    }
}
