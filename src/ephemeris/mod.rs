//! Position sources.
//!
//! Computing ecliptic longitudes belongs to an external ephemeris; the
//! pipeline only consumes snapshots through the [`PositionSource`] port.
//! A source that cannot supply a body simply leaves it out of the snapshot,
//! and the matcher skips the affected definitions downstream.

use chrono::{DateTime, Utc};

use crate::dataset::TransitRow;
use crate::domain::{CelestialBody, PositionSnapshot};

/// Port for whatever supplies planetary longitudes.
pub trait PositionSource: Send + Sync {
    /// Positions for the given instant. Never fails; missing bodies are
    /// simply absent from the snapshot.
    fn positions(&self, at: DateTime<Utc>) -> PositionSnapshot;
}

/// Fixed longitudes from configuration.
///
/// Useful for dry runs and tests; every snapshot carries the same table.
#[derive(Debug, Clone)]
pub struct StaticPositions {
    longitudes: Vec<(CelestialBody, f64)>,
}

impl StaticPositions {
    #[must_use]
    pub fn new(longitudes: Vec<(CelestialBody, f64)>) -> Self {
        Self { longitudes }
    }
}

impl PositionSource for StaticPositions {
    fn positions(&self, at: DateTime<Utc>) -> PositionSnapshot {
        PositionSnapshot::new(at, self.longitudes.iter().copied())
    }
}

/// Positions read from a transit dataset.
///
/// For each body, the most recent row at or before the requested instant
/// wins; bodies with no such row are absent from the snapshot.
#[derive(Debug, Clone)]
pub struct DatasetPositions {
    rows: Vec<TransitRow>,
}

impl DatasetPositions {
    #[must_use]
    pub fn new(mut rows: Vec<TransitRow>) -> Self {
        rows.sort_by_key(|row| row.at);
        Self { rows }
    }
}

impl PositionSource for DatasetPositions {
    fn positions(&self, at: DateTime<Utc>) -> PositionSnapshot {
        let mut latest: Vec<(CelestialBody, f64)> = Vec::new();
        for row in self.rows.iter().take_while(|row| row.at <= at) {
            match latest.iter_mut().find(|(body, _)| *body == row.body) {
                Some(entry) => entry.1 = row.longitude,
                None => latest.push((row.body, row.longitude)),
            }
        }
        PositionSnapshot::new(at, latest)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::dataset::Motion;

    fn row(body: CelestialBody, hour: u32, longitude: f64) -> TransitRow {
        TransitRow {
            body,
            at: Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap(),
            motion: Motion::Direct,
            sign_lord: "Mars".to_string(),
            star_lord: "Venus".to_string(),
            sub_lord: "Saturn".to_string(),
            sign: "Aries".to_string(),
            nakshatra: "Bharani".to_string(),
            pada: 1,
            longitude,
            declination: 0.0,
        }
    }

    #[test]
    fn test_static_source_snapshots_carry_instant() {
        let source = StaticPositions::new(vec![(CelestialBody::Sun, 10.0)]);
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 4, 0, 0).unwrap();

        let snapshot = source.positions(at);
        assert_eq!(snapshot.at(), at);
        assert_eq!(snapshot.longitude(CelestialBody::Sun), Some(10.0));
    }

    #[test]
    fn test_dataset_source_picks_latest_row_before_instant() {
        let source = DatasetPositions::new(vec![
            row(CelestialBody::Sun, 2, 100.0),
            row(CelestialBody::Sun, 6, 110.0),
            row(CelestialBody::Moon, 3, 42.0),
        ]);
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 4, 0, 0).unwrap();

        let snapshot = source.positions(at);
        assert_eq!(snapshot.longitude(CelestialBody::Sun), Some(100.0));
        assert_eq!(snapshot.longitude(CelestialBody::Moon), Some(42.0));
    }

    #[test]
    fn test_dataset_source_omits_future_only_bodies() {
        let source = DatasetPositions::new(vec![row(CelestialBody::Sun, 6, 110.0)]);
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 4, 0, 0).unwrap();

        let snapshot = source.positions(at);
        assert!(snapshot.is_empty());
    }
}
