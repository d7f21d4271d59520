//! Per-instrument classification profiles.

use std::collections::{BTreeMap, BTreeSet};

use super::body::CelestialBody;

/// Unordered pair of bodies, the lookup key for profile rule sets.
///
/// Construction normalizes the order, so `(Sun, Jupiter)` and
/// `(Jupiter, Sun)` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyPair {
    a: CelestialBody,
    b: CelestialBody,
}

impl BodyPair {
    #[must_use]
    pub fn new(x: CelestialBody, y: CelestialBody) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    #[must_use]
    pub fn contains(self, body: CelestialBody) -> bool {
        self.a == body || self.b == body
    }
}

/// Classification rules and weighting for one instrument.
///
/// Static configuration, immutable after startup. A pair may appear in at
/// most one of the three rule sets; configuration loading enforces this.
#[derive(Debug, Clone)]
pub struct InstrumentProfile {
    pub instrument: String,
    pub bullish: BTreeSet<BodyPair>,
    pub bearish: BTreeSet<BodyPair>,
    pub neutral: BTreeSet<BodyPair>,
    /// Score multiplier, strictly positive.
    pub strength: f64,
    /// Body whose involvement strengthens a signal the most.
    pub primary_ruler: Option<CelestialBody>,
    pub secondary_ruler: Option<CelestialBody>,
    /// Bodies that drag a signal bearish when they are the aspected-to side.
    pub bearish_influences: BTreeSet<CelestialBody>,
}

impl InstrumentProfile {
    /// The built-in fallback used for instruments without a profile entry.
    ///
    /// Directions mirror the default aspect catalog: trines and conjunctions
    /// of benefics are bullish, squares and node oppositions bearish.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            instrument: "DEFAULT".to_string(),
            bullish: BTreeSet::from([
                BodyPair::new(CelestialBody::Jupiter, CelestialBody::Sun),
                BodyPair::new(CelestialBody::Venus, CelestialBody::Moon),
            ]),
            bearish: BTreeSet::from([
                BodyPair::new(CelestialBody::Saturn, CelestialBody::Mars),
                BodyPair::new(CelestialBody::Rahu, CelestialBody::Sun),
            ]),
            neutral: BTreeSet::from([
                BodyPair::new(CelestialBody::Mars, CelestialBody::Mercury),
                BodyPair::new(CelestialBody::Rahu, CelestialBody::Ketu),
            ]),
            strength: 1.0,
            primary_ruler: None,
            secondary_ruler: None,
            bearish_influences: BTreeSet::new(),
        }
    }
}

/// Lookup table of instrument profiles with a guaranteed fallback.
///
/// Read-only after initialization; an unknown instrument resolves to the
/// fallback rather than erroring.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    profiles: BTreeMap<String, InstrumentProfile>,
    fallback: InstrumentProfile,
}

impl ProfileTable {
    #[must_use]
    pub fn new(
        profiles: BTreeMap<String, InstrumentProfile>,
        fallback: InstrumentProfile,
    ) -> Self {
        Self { profiles, fallback }
    }

    /// Profile for an instrument, case-insensitively, or the fallback.
    #[must_use]
    pub fn resolve(&self, instrument: &str) -> &InstrumentProfile {
        self.profiles
            .get(&instrument.to_uppercase())
            .unwrap_or(&self.fallback)
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::new(BTreeMap::new(), InstrumentProfile::fallback())
    }
}
