//! Celestial body identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bodies the aspect catalog can reference.
///
/// Rahu and Ketu are the mean lunar nodes. Ketu is a derived body: it always
/// sits exactly 180° from Rahu and is never supplied by an ephemeris source
/// directly (see [`PositionSnapshot`](super::PositionSnapshot)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CelestialBody {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Rahu,
    Ketu,
}

impl CelestialBody {
    /// All bodies, in traditional order.
    pub const ALL: [CelestialBody; 9] = [
        CelestialBody::Sun,
        CelestialBody::Moon,
        CelestialBody::Mercury,
        CelestialBody::Venus,
        CelestialBody::Mars,
        CelestialBody::Jupiter,
        CelestialBody::Saturn,
        CelestialBody::Rahu,
        CelestialBody::Ketu,
    ];

    /// The body this one is derived from, if any.
    #[must_use]
    pub const fn derived_from(self) -> Option<CelestialBody> {
        match self {
            CelestialBody::Ketu => Some(CelestialBody::Rahu),
            _ => None,
        }
    }

    /// Canonical name used in configuration, datasets, and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            CelestialBody::Sun => "Sun",
            CelestialBody::Moon => "Moon",
            CelestialBody::Mercury => "Mercury",
            CelestialBody::Venus => "Venus",
            CelestialBody::Mars => "Mars",
            CelestialBody::Jupiter => "Jupiter",
            CelestialBody::Saturn => "Saturn",
            CelestialBody::Rahu => "Rahu",
            CelestialBody::Ketu => "Ketu",
        }
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a body name cannot be recognized.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown celestial body: {0}")]
pub struct ParseBodyError(pub String);

impl FromStr for CelestialBody {
    type Err = ParseBodyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .find(|body| body.name().eq_ignore_ascii_case(trimmed))
            .copied()
            .ok_or_else(|| ParseBodyError(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("jupiter".parse::<CelestialBody>(), Ok(CelestialBody::Jupiter));
        assert_eq!(" Rahu ".parse::<CelestialBody>(), Ok(CelestialBody::Rahu));
    }

    #[test]
    fn test_parse_unknown() {
        let err = "Pluto".parse::<CelestialBody>().unwrap_err();
        assert_eq!(err, ParseBodyError("Pluto".to_string()));
    }

    #[test]
    fn test_ketu_is_derived() {
        assert_eq!(
            CelestialBody::Ketu.derived_from(),
            Some(CelestialBody::Rahu)
        );
        assert_eq!(CelestialBody::Sun.derived_from(), None);
    }
}
