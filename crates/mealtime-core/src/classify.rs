//! Temperature-band and time-of-day classification.
//!
//! Pure functions: a raw temperature maps to a band, a clock hour maps to a
//! period. Both are total -- every input produces exactly one variant.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ambient temperature classification used to pick a catalog cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TempBand {
    Hot,
    Cold,
    Moderate,
}

impl TempBand {
    /// Classify a temperature in Celsius.
    ///
    /// Boundaries are inclusive: exactly 35 is `Hot`, exactly 20 is `Cold`.
    /// The three bands partition the real line with no gap.
    pub fn from_celsius(temp: f64) -> Self {
        if temp >= 35.0 {
            TempBand::Hot
        } else if temp <= 20.0 {
            TempBand::Cold
        } else {
            TempBand::Moderate
        }
    }

    /// Parse a stored band string, deriving from the temperature when the
    /// string is unrecognized (legacy rows).
    pub fn parse_or_derive(s: &str, temp: f64) -> Self {
        match s {
            "hot" => TempBand::Hot,
            "cold" => TempBand::Cold,
            "moderate" => TempBand::Moderate,
            _ => TempBand::from_celsius(temp),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TempBand::Hot => "hot",
            TempBand::Cold => "cold",
            TempBand::Moderate => "moderate",
        }
    }
}

impl fmt::Display for TempBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time-of-day period: both a content key and a scheduling key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    Morning,
    Afternoon,
    Evening,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 3] = [
        TimePeriod::Morning,
        TimePeriod::Afternoon,
        TimePeriod::Evening,
    ];

    /// Classify a clock hour (0-23).
    ///
    /// Morning covers 5-11, afternoon 12-16, evening 17-23. Hours 0-4 have
    /// no defined band and fall back to morning so callers always get a
    /// valid period.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimePeriod::Morning,
            12..=16 => TimePeriod::Afternoon,
            17..=23 => TimePeriod::Evening,
            _ => TimePeriod::Morning,
        }
    }

    /// Parse a stored period string, deriving from the hour when the string
    /// is unrecognized or absent (rows written before the period column).
    pub fn parse_or_derive(s: &str, hour: u32) -> Self {
        match s {
            "morning" => TimePeriod::Morning,
            "afternoon" => TimePeriod::Afternoon,
            "evening" => TimePeriod::Evening,
            _ => TimePeriod::from_hour(hour),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimePeriod::Morning => "morning",
            TimePeriod::Afternoon => "afternoon",
            TimePeriod::Evening => "evening",
        }
    }

    /// Capitalized name for titles ("Morning Food Suggestion").
    pub fn title(&self) -> &'static str {
        match self {
            TimePeriod::Morning => "Morning",
            TimePeriod::Afternoon => "Afternoon",
            TimePeriod::Evening => "Evening",
        }
    }

    /// Greeting used in outbound message bodies.
    pub fn greeting(&self) -> &'static str {
        match self {
            TimePeriod::Morning => "Good morning",
            TimePeriod::Afternoon => "Good afternoon",
            TimePeriod::Evening => "Good evening",
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(TempBand::from_celsius(35.0), TempBand::Hot);
        assert_eq!(TempBand::from_celsius(34.9), TempBand::Moderate);
        assert_eq!(TempBand::from_celsius(20.0), TempBand::Cold);
        assert_eq!(TempBand::from_celsius(20.1), TempBand::Moderate);
        assert_eq!(TempBand::from_celsius(27.0), TempBand::Moderate);
        assert_eq!(TempBand::from_celsius(-5.0), TempBand::Cold);
        assert_eq!(TempBand::from_celsius(48.0), TempBand::Hot);
    }

    #[test]
    fn period_boundaries() {
        assert_eq!(TimePeriod::from_hour(5), TimePeriod::Morning);
        assert_eq!(TimePeriod::from_hour(11), TimePeriod::Morning);
        assert_eq!(TimePeriod::from_hour(12), TimePeriod::Afternoon);
        assert_eq!(TimePeriod::from_hour(16), TimePeriod::Afternoon);
        assert_eq!(TimePeriod::from_hour(17), TimePeriod::Evening);
        assert_eq!(TimePeriod::from_hour(23), TimePeriod::Evening);
    }

    #[test]
    fn small_hours_default_to_morning() {
        for h in 0..5 {
            assert_eq!(TimePeriod::from_hour(h), TimePeriod::Morning);
        }
    }

    #[test]
    fn parse_or_derive_prefers_stored_value() {
        assert_eq!(
            TimePeriod::parse_or_derive("evening", 8),
            TimePeriod::Evening
        );
        assert_eq!(TimePeriod::parse_or_derive("", 8), TimePeriod::Morning);
        assert_eq!(TempBand::parse_or_derive("hot", 10.0), TempBand::Hot);
        assert_eq!(TempBand::parse_or_derive("??", 10.0), TempBand::Cold);
    }

    proptest! {
        #[test]
        fn bands_partition_the_line(t in -100.0f64..100.0) {
            // Every temperature lands in exactly one band, and each band
            // only covers its own range.
            match TempBand::from_celsius(t) {
                TempBand::Hot => prop_assert!(t >= 35.0),
                TempBand::Cold => prop_assert!(t <= 20.0),
                TempBand::Moderate => prop_assert!(t > 20.0 && t < 35.0),
            }
        }

        #[test]
        fn every_hour_has_a_period(h in 0u32..24) {
            // Totality: no hour panics, and the result round-trips its name.
            let p = TimePeriod::from_hour(h);
            prop_assert_eq!(TimePeriod::parse_or_derive(p.as_str(), h), p);
        }
    }
}
