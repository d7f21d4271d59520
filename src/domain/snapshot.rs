//! Immutable planetary position snapshots.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::body::CelestialBody;

/// Ecliptic longitudes for one evaluation instant.
///
/// Built fresh per tick, immutable afterwards. Longitudes are normalized
/// into `[0, 360)`. Ketu is never taken from the input: whenever Rahu is
/// present, Ketu is derived as Rahu + 180° (mod 360), and a supplied Ketu
/// value is ignored.
#[derive(Debug, Clone)]
pub struct PositionSnapshot {
    at: DateTime<Utc>,
    longitudes: BTreeMap<CelestialBody, f64>,
}

impl PositionSnapshot {
    /// Build a snapshot from raw `(body, longitude)` pairs.
    #[must_use]
    pub fn new(
        at: DateTime<Utc>,
        raw: impl IntoIterator<Item = (CelestialBody, f64)>,
    ) -> Self {
        let mut longitudes = BTreeMap::new();
        for (body, longitude) in raw {
            if body.derived_from().is_some() {
                continue;
            }
            longitudes.insert(body, normalize_degrees(longitude));
        }
        if let Some(&rahu) = longitudes.get(&CelestialBody::Rahu) {
            longitudes.insert(CelestialBody::Ketu, normalize_degrees(rahu + 180.0));
        }
        Self { at, longitudes }
    }

    /// The instant this snapshot describes.
    #[must_use]
    pub const fn at(&self) -> DateTime<Utc> {
        self.at
    }

    /// Longitude of a body, if the source supplied it.
    #[must_use]
    pub fn longitude(&self, body: CelestialBody) -> Option<f64> {
        self.longitudes.get(&body).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.longitudes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.longitudes.len()
    }

    /// Bodies and longitudes in stable (declaration-order) iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (CelestialBody, f64)> + '_ {
        self.longitudes.iter().map(|(body, lon)| (*body, *lon))
    }
}

/// Wrap a longitude into `[0, 360)`.
pub(crate) fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_ketu_derived_from_rahu() {
        let snapshot = PositionSnapshot::new(at(), [(CelestialBody::Rahu, 10.0)]);
        assert_eq!(snapshot.longitude(CelestialBody::Ketu), Some(190.0));
    }

    #[test]
    fn test_ketu_derivation_wraps() {
        let snapshot = PositionSnapshot::new(at(), [(CelestialBody::Rahu, 270.0)]);
        assert_eq!(snapshot.longitude(CelestialBody::Ketu), Some(90.0));
    }

    #[test]
    fn test_supplied_ketu_is_ignored() {
        let snapshot = PositionSnapshot::new(
            at(),
            [(CelestialBody::Rahu, 10.0), (CelestialBody::Ketu, 55.0)],
        );
        assert_eq!(snapshot.longitude(CelestialBody::Ketu), Some(190.0));
    }

    #[test]
    fn test_ketu_absent_without_rahu() {
        let snapshot = PositionSnapshot::new(at(), [(CelestialBody::Ketu, 55.0)]);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.longitude(CelestialBody::Ketu), None);
    }

    #[test]
    fn test_longitudes_normalized() {
        let snapshot = PositionSnapshot::new(
            at(),
            [(CelestialBody::Sun, -30.0), (CelestialBody::Moon, 370.0)],
        );
        assert_eq!(snapshot.longitude(CelestialBody::Sun), Some(330.0));
        assert_eq!(snapshot.longitude(CelestialBody::Moon), Some(10.0));
    }

    #[test]
    fn test_normalize_degrees_boundary() {
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(-360.0), 0.0);
    }
}
