//! Aspect definitions and the matching pass.
//!
//! An aspect is an angular relationship between two bodies that counts as
//! significant while the observed separation stays within an orb (tolerance)
//! of the target angle. The catalog is loaded once at startup and never
//! mutated; matching is a pure function over a snapshot.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::body::CelestialBody;
use super::snapshot::PositionSnapshot;

/// One configured angular relationship.
#[derive(Debug, Clone, PartialEq)]
pub struct AspectDefinition {
    pub from: CelestialBody,
    pub to: CelestialBody,
    /// Target separation in degrees, within `[0, 180]`.
    pub angle: f64,
    /// Base tolerance in degrees, strictly positive.
    pub orb: f64,
    /// Display label, e.g. "Strong Bullish".
    pub label: String,
}

impl AspectDefinition {
    #[must_use]
    pub fn new(
        from: CelestialBody,
        to: CelestialBody,
        angle: f64,
        orb: f64,
        label: impl Into<String>,
    ) -> Self {
        Self {
            from,
            to,
            angle,
            orb,
            label: label.into(),
        }
    }
}

/// Ordered, immutable list of aspect definitions.
///
/// Declaration order is meaningful: it breaks ties between equally-exact
/// matches and therefore shapes report ordering downstream.
#[derive(Debug, Clone)]
pub struct AspectCatalog {
    definitions: Vec<AspectDefinition>,
}

impl AspectCatalog {
    #[must_use]
    pub fn new(definitions: Vec<AspectDefinition>) -> Self {
        Self { definitions }
    }

    pub fn iter(&self) -> impl Iterator<Item = &AspectDefinition> {
        self.definitions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// An aspect currently within tolerance.
///
/// Invariant: `deviation <= orb_used` and `orb_used >= 0`; this is the
/// membership condition, not just bookkeeping.
#[derive(Debug, Clone)]
pub struct ActiveAspect {
    pub definition: AspectDefinition,
    /// Observed separation in `[0, 180]`.
    pub separation: f64,
    /// Distance from exact, `|separation - angle|`.
    pub deviation: f64,
    /// Effective orb after contextual tightening.
    pub orb_used: f64,
    /// Instant of the snapshot that produced this match.
    pub at: DateTime<Utc>,
}

/// Minimum arc between two longitudes, always in `[0, 180]`.
#[must_use]
pub fn separation(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    diff.min(360.0 - diff)
}

/// Detect which catalog aspects are active for a snapshot.
///
/// `orb_reduction` tightens every base orb; the effective orb is clamped so
/// it never goes negative. Definitions referencing a body absent from the
/// snapshot are skipped: partial data is expected when an upstream source
/// fails for one body. An empty snapshot yields an empty result.
///
/// The result is ordered by deviation ascending (closest to exact first),
/// catalog declaration order breaking ties.
#[must_use]
pub fn match_aspects(
    snapshot: &PositionSnapshot,
    catalog: &AspectCatalog,
    orb_reduction: f64,
) -> Vec<ActiveAspect> {
    let reduction = orb_reduction.max(0.0);
    let mut active = Vec::new();

    for definition in catalog.iter() {
        let (Some(from), Some(to)) = (
            snapshot.longitude(definition.from),
            snapshot.longitude(definition.to),
        ) else {
            continue;
        };

        let separation = separation(from, to);
        let orb_used = (definition.orb - reduction).max(0.0);
        let deviation = (separation - definition.angle).abs();

        if deviation <= orb_used {
            active.push(ActiveAspect {
                definition: definition.clone(),
                separation,
                deviation,
                orb_used,
                at: snapshot.at(),
            });
        }
    }

    // Stable sort keeps catalog order for equal deviations.
    active.sort_by(|a, b| {
        a.deviation
            .partial_cmp(&b.deviation)
            .unwrap_or(Ordering::Equal)
    });
    active
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn catalog() -> AspectCatalog {
        AspectCatalog::new(vec![AspectDefinition::new(
            CelestialBody::Jupiter,
            CelestialBody::Sun,
            120.0,
            1.5,
            "Strong Bullish",
        )])
    }

    #[test]
    fn test_separation_symmetric_and_bounded() {
        let pairs = [
            (0.0, 0.0),
            (10.0, 130.0),
            (350.0, 10.0),
            (0.0, 180.0),
            (0.0, 359.0),
            (270.0, 90.0),
        ];
        for (a, b) in pairs {
            assert_eq!(separation(a, b), separation(b, a));
            assert!(separation(a, b) >= 0.0);
            assert!(separation(a, b) <= 180.0);
        }
        assert_eq!(separation(350.0, 10.0), 20.0);
        assert_eq!(separation(0.0, 180.0), 180.0);
    }

    #[test]
    fn test_exact_trine_is_active() {
        let snapshot = PositionSnapshot::new(
            at(),
            [(CelestialBody::Jupiter, 10.0), (CelestialBody::Sun, 130.0)],
        );

        let active = match_aspects(&snapshot, &catalog(), 0.0);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].separation, 120.0);
        assert_eq!(active[0].deviation, 0.0);
        assert_eq!(active[0].orb_used, 1.5);
    }

    #[test]
    fn test_reduction_tightens_orb() {
        // Deviation 1.3: active with full orb, inactive once tightened to 1.2.
        let snapshot = PositionSnapshot::new(
            at(),
            [(CelestialBody::Jupiter, 10.0), (CelestialBody::Sun, 131.3)],
        );

        let relaxed = match_aspects(&snapshot, &catalog(), 0.0);
        assert_eq!(relaxed.len(), 1);

        let tightened = match_aspects(&snapshot, &catalog(), 0.3);
        assert!(tightened.is_empty());
    }

    #[test]
    fn test_zero_reduction_never_yields_fewer_matches() {
        let snapshot = PositionSnapshot::new(
            at(),
            [
                (CelestialBody::Jupiter, 10.0),
                (CelestialBody::Sun, 130.9),
                (CelestialBody::Saturn, 200.0),
                (CelestialBody::Mars, 110.4),
            ],
        );
        let catalog = AspectCatalog::new(vec![
            AspectDefinition::new(
                CelestialBody::Jupiter,
                CelestialBody::Sun,
                120.0,
                1.5,
                "Strong Bullish",
            ),
            AspectDefinition::new(
                CelestialBody::Saturn,
                CelestialBody::Mars,
                90.0,
                1.5,
                "Strong Bearish",
            ),
        ]);

        for reduction in [0.1, 0.5, 1.0, 5.0] {
            let relaxed = match_aspects(&snapshot, &catalog, 0.0);
            let tightened = match_aspects(&snapshot, &catalog, reduction);
            assert!(relaxed.len() >= tightened.len());
        }
    }

    #[test]
    fn test_orb_never_negative() {
        let snapshot = PositionSnapshot::new(
            at(),
            [(CelestialBody::Jupiter, 10.0), (CelestialBody::Sun, 130.0)],
        );

        // Reduction larger than the base orb clamps to zero; an exact match
        // still passes with deviation 0.
        let active = match_aspects(&snapshot, &catalog(), 10.0);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].orb_used, 0.0);
    }

    #[test]
    fn test_membership_invariant() {
        let snapshot = PositionSnapshot::new(
            at(),
            [
                (CelestialBody::Jupiter, 10.0),
                (CelestialBody::Sun, 130.8),
                (CelestialBody::Venus, 42.0),
                (CelestialBody::Moon, 42.9),
            ],
        );
        let catalog = AspectCatalog::new(vec![
            AspectDefinition::new(
                CelestialBody::Jupiter,
                CelestialBody::Sun,
                120.0,
                1.5,
                "Strong Bullish",
            ),
            AspectDefinition::new(
                CelestialBody::Venus,
                CelestialBody::Moon,
                0.0,
                1.2,
                "Bullish",
            ),
        ]);

        for aspect in match_aspects(&snapshot, &catalog, 0.2) {
            assert!(aspect.orb_used >= 0.0);
            assert!(aspect.deviation <= aspect.orb_used);
        }
    }

    #[test]
    fn test_missing_body_skips_definition() {
        let snapshot = PositionSnapshot::new(at(), [(CelestialBody::Jupiter, 10.0)]);
        let active = match_aspects(&snapshot, &catalog(), 0.0);
        assert!(active.is_empty());
    }

    #[test]
    fn test_empty_snapshot_yields_empty_set() {
        let snapshot = PositionSnapshot::new(at(), []);
        let active = match_aspects(&snapshot, &catalog(), 0.0);
        assert!(active.is_empty());
    }

    #[test]
    fn test_ordered_by_deviation_then_catalog_order() {
        let snapshot = PositionSnapshot::new(
            at(),
            [
                (CelestialBody::Jupiter, 10.0),
                (CelestialBody::Sun, 130.8),
                (CelestialBody::Saturn, 200.0),
                (CelestialBody::Mars, 110.2),
                (CelestialBody::Venus, 40.0),
                (CelestialBody::Moon, 40.8),
            ],
        );
        let catalog = AspectCatalog::new(vec![
            AspectDefinition::new(
                CelestialBody::Jupiter,
                CelestialBody::Sun,
                120.0,
                1.5,
                "Strong Bullish",
            ),
            AspectDefinition::new(
                CelestialBody::Saturn,
                CelestialBody::Mars,
                90.0,
                1.5,
                "Strong Bearish",
            ),
            AspectDefinition::new(
                CelestialBody::Venus,
                CelestialBody::Moon,
                0.0,
                1.2,
                "Bullish",
            ),
        ]);

        let active = match_aspects(&snapshot, &catalog, 0.0);
        assert_eq!(active.len(), 3);
        // Saturn-Mars deviation 0.2, then the two 0.8 deviations in catalog order.
        assert_eq!(active[0].definition.from, CelestialBody::Saturn);
        assert_eq!(active[1].definition.from, CelestialBody::Jupiter);
        assert_eq!(active[2].definition.from, CelestialBody::Venus);
    }
}
