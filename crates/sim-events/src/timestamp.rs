//! Simulation Timestamp Types
//!
//! Handles simulation time with both tick-based and human-readable date formats.
//! A simulated year is a fixed number of ticks; the date is derived from the tick.
//!
//! # Example
//!
//! ```
//! use sim_events::{SimTimestamp, SimDate};
//!
//! let ts = SimTimestamp::from_tick(27);
//! assert_eq!(ts.tick, 27);
//! assert_eq!(ts.date.to_string(), "year_3.tick_2");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of ticks in one simulated year.
pub const TICKS_PER_YEAR: u64 = 13;

/// A human-readable point in the simulated calendar.
///
/// Both fields are 1-based: tick 0 is `year_1.tick_1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimDate {
    pub year: u64,
    pub tick_of_year: u64,
}

impl SimDate {
    /// Creates a new SimDate.
    pub fn new(year: u64, tick_of_year: u64) -> Self {
        Self { year, tick_of_year }
    }

    /// The first date of the simulation.
    pub fn start() -> Self {
        Self::new(1, 1)
    }

    /// Derives the date for an absolute tick given the length of a year.
    ///
    /// A zero-length year is treated as one tick long.
    pub fn from_tick(tick: u64, ticks_per_year: u64) -> Self {
        let per_year = ticks_per_year.max(1);
        Self {
            year: tick / per_year + 1,
            tick_of_year: tick % per_year + 1,
        }
    }
}

impl fmt::Display for SimDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "year_{}.tick_{}", self.year, self.tick_of_year)
    }
}

/// Error type for parsing SimDate from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseDateError {
    InvalidFormat(String),
    InvalidYear(String),
    InvalidTick(String),
}

impl fmt::Display for ParseDateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseDateError::InvalidFormat(s) => {
                write!(f, "invalid date format: '{}', expected 'year_N.tick_M'", s)
            }
            ParseDateError::InvalidYear(s) => write!(f, "invalid year: '{}'", s),
            ParseDateError::InvalidTick(s) => write!(f, "invalid tick of year: '{}'", s),
        }
    }
}

impl std::error::Error for ParseDateError {}

impl FromStr for SimDate {
    type Err = ParseDateError;

    /// Parses a SimDate from a string like "year_3.tick_12".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year_part, tick_part) = s
            .split_once('.')
            .ok_or_else(|| ParseDateError::InvalidFormat(s.to_string()))?;

        let year = year_part
            .strip_prefix("year_")
            .ok_or_else(|| ParseDateError::InvalidFormat(s.to_string()))?
            .parse::<u64>()
            .map_err(|_| ParseDateError::InvalidYear(year_part.to_string()))?;

        let tick_of_year = tick_part
            .strip_prefix("tick_")
            .ok_or_else(|| ParseDateError::InvalidFormat(s.to_string()))?
            .parse::<u64>()
            .map_err(|_| ParseDateError::InvalidTick(tick_part.to_string()))?;

        if year == 0 {
            return Err(ParseDateError::InvalidYear(year_part.to_string()));
        }
        if tick_of_year == 0 {
            return Err(ParseDateError::InvalidTick(tick_part.to_string()));
        }

        Ok(SimDate { year, tick_of_year })
    }
}

// Serialized as a string so event logs stay readable
impl Serialize for SimDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SimDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A point in simulation time.
///
/// Contains both the monotonic tick counter and the derived calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimTimestamp {
    /// Monotonically increasing simulation tick.
    pub tick: u64,
    /// Human-readable date.
    pub date: SimDate,
}

impl SimTimestamp {
    /// Creates a timestamp for a tick with a custom year length.
    pub fn new(tick: u64, ticks_per_year: u64) -> Self {
        Self {
            tick,
            date: SimDate::from_tick(tick, ticks_per_year),
        }
    }

    /// Creates a timestamp for a tick using the standard year length.
    pub fn from_tick(tick: u64) -> Self {
        Self::new(tick, TICKS_PER_YEAR)
    }

    /// Creates a timestamp for the start of the simulation.
    pub fn start() -> Self {
        Self {
            tick: 0,
            date: SimDate::start(),
        }
    }

    /// Returns the current year.
    pub fn year(&self) -> u64 {
        self.date.year
    }
}

impl Default for SimTimestamp {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for SimTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick {} ({})", self.tick, self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_from_tick() {
        assert_eq!(SimDate::from_tick(0, 13), SimDate::new(1, 1));
        assert_eq!(SimDate::from_tick(12, 13), SimDate::new(1, 13));
        assert_eq!(SimDate::from_tick(13, 13), SimDate::new(2, 1));
        assert_eq!(SimDate::from_tick(27, 13), SimDate::new(3, 2));
    }

    #[test]
    fn test_zero_year_length_is_clamped() {
        assert_eq!(SimDate::from_tick(5, 0), SimDate::new(6, 1));
    }

    #[test]
    fn test_date_display() {
        assert_eq!(SimDate::new(3, 12).to_string(), "year_3.tick_12");
    }

    #[test]
    fn test_date_parse() {
        let date: SimDate = "year_4.tick_7".parse().unwrap();
        assert_eq!(date, SimDate::new(4, 7));
    }

    #[test]
    fn test_date_parse_errors() {
        assert!(matches!(
            "year_4".parse::<SimDate>(),
            Err(ParseDateError::InvalidFormat(_))
        ));
        assert!(matches!(
            "year_x.tick_1".parse::<SimDate>(),
            Err(ParseDateError::InvalidYear(_))
        ));
        assert!(matches!(
            "year_1.tick_0".parse::<SimDate>(),
            Err(ParseDateError::InvalidTick(_))
        ));
        assert!(matches!(
            "age_1.tick_1".parse::<SimDate>(),
            Err(ParseDateError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_date_serializes_as_string() {
        let json = serde_json::to_string(&SimDate::new(2, 5)).unwrap();
        assert_eq!(json, "\"year_2.tick_5\"");
        let back: SimDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SimDate::new(2, 5));
    }

    #[test]
    fn test_timestamp_rolls_year() {
        assert_eq!(SimTimestamp::new(12, 13).year(), 1);
        let ts = SimTimestamp::new(13, 13);
        assert_eq!(ts.year(), 2);
        assert_eq!(ts.date, SimDate::new(2, 1));
    }

    #[test]
    fn test_timestamp_start() {
        let ts = SimTimestamp::start();
        assert_eq!(ts.tick, 0);
        assert_eq!(ts, SimTimestamp::from_tick(0));
    }
}
