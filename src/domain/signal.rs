//! Sentiment classification and scoring.
//!
//! A single scoring function combines the two rule mechanisms: pair-set
//! membership seeds a directional base, ruler weighting shifts it, and the
//! sentiment is read off the final score against fixed thresholds. The score
//! therefore always agrees in sign with the sentiment.

use super::aspect::ActiveAspect;
use super::profile::{BodyPair, InstrumentProfile, ProfileTable};

/// Directional classification of an active aspect for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Sentiment::Bullish => "Bullish",
            Sentiment::Bearish => "Bearish",
            Sentiment::Neutral => "Neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// An active aspect with its per-instrument classification.
#[derive(Debug, Clone)]
pub struct ClassifiedAspect {
    pub aspect: ActiveAspect,
    pub sentiment: Sentiment,
    pub score: f64,
}

/// Directional base contributed by pair-set membership.
const MEMBERSHIP_WEIGHT: f64 = 2.0;
/// Bonus when the profile's primary ruler participates in the aspect.
const PRIMARY_RULER_WEIGHT: f64 = 3.0;
/// Bonus when the secondary ruler participates.
const SECONDARY_RULER_WEIGHT: f64 = 2.0;
/// Penalty when the aspected-to body is a configured bearish influence.
const BEARISH_INFLUENCE_WEIGHT: f64 = 2.0;

/// Scores above this are Bullish.
const BULLISH_THRESHOLD: f64 = 1.0;
/// Scores below this are Bearish.
const BEARISH_THRESHOLD: f64 = -1.0;

/// Classifies active aspects per instrument.
///
/// Classification is pure and deterministic: identical inputs produce an
/// identical, identically-ordered output. Input order (deviation ascending)
/// is preserved, and no aspect is ever dropped.
pub struct RuleEngine<'a> {
    profiles: &'a ProfileTable,
}

impl<'a> RuleEngine<'a> {
    #[must_use]
    pub const fn new(profiles: &'a ProfileTable) -> Self {
        Self { profiles }
    }

    #[must_use]
    pub fn classify(&self, instrument: &str, active: &[ActiveAspect]) -> Vec<ClassifiedAspect> {
        let profile = self.profiles.resolve(instrument);
        active
            .iter()
            .map(|aspect| classify_one(profile, aspect))
            .collect()
    }
}

fn classify_one(profile: &InstrumentProfile, aspect: &ActiveAspect) -> ClassifiedAspect {
    let pair = BodyPair::new(aspect.definition.from, aspect.definition.to);

    // Membership seeds the direction; unmatched pairs start neutral.
    let mut raw = if profile.bullish.contains(&pair) {
        MEMBERSHIP_WEIGHT
    } else if profile.bearish.contains(&pair) {
        -MEMBERSHIP_WEIGHT
    } else {
        0.0
    };

    if ruler_participates(profile.primary_ruler, &pair) {
        raw += PRIMARY_RULER_WEIGHT;
    }
    if ruler_participates(profile.secondary_ruler, &pair) {
        raw += SECONDARY_RULER_WEIGHT;
    }
    if profile.bearish_influences.contains(&aspect.definition.to) {
        raw -= BEARISH_INFLUENCE_WEIGHT;
    }

    let score = raw * profile.strength;
    let sentiment = if score > BULLISH_THRESHOLD {
        Sentiment::Bullish
    } else if score < BEARISH_THRESHOLD {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    };

    ClassifiedAspect {
        aspect: aspect.clone(),
        sentiment,
        score,
    }
}

fn ruler_participates(ruler: Option<super::body::CelestialBody>, pair: &BodyPair) -> bool {
    ruler.is_some_and(|body| pair.contains(body))
}
