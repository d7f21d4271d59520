//! Instrument profile configuration.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::domain::{BodyPair, CelestialBody, InstrumentProfile, ProfileTable};
use crate::error::ConfigError;

/// The `[instruments]` table: which instruments to evaluate and their
/// profile overrides. Instruments without an entry use the built-in
/// fallback profile.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentsConfig {
    #[serde(default = "default_tracked")]
    pub tracked: Vec<String>,

    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileEntry>,
}

fn default_tracked() -> Vec<String> {
    vec![
        "NIFTY".to_string(),
        "BANKNIFTY".to_string(),
        "GOLD".to_string(),
    ]
}

impl Default for InstrumentsConfig {
    fn default() -> Self {
        Self {
            tracked: default_tracked(),
            profiles: BTreeMap::new(),
        }
    }
}

/// One `[instruments.profiles.<NAME>]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileEntry {
    #[serde(default)]
    pub bullish_pairs: Vec<(CelestialBody, CelestialBody)>,

    #[serde(default)]
    pub bearish_pairs: Vec<(CelestialBody, CelestialBody)>,

    #[serde(default)]
    pub neutral_pairs: Vec<(CelestialBody, CelestialBody)>,

    #[serde(default = "default_strength")]
    pub strength: f64,

    #[serde(default)]
    pub primary_ruler: Option<CelestialBody>,

    #[serde(default)]
    pub secondary_ruler: Option<CelestialBody>,

    #[serde(default)]
    pub bearish_influences: Vec<CelestialBody>,
}

fn default_strength() -> f64 {
    1.0
}

pub(crate) fn validate(config: &InstrumentsConfig) -> Result<(), ConfigError> {
    for (name, entry) in &config.profiles {
        if entry.strength <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "instruments.profiles.strength",
                reason: format!("{name}: {} is not positive", entry.strength),
            });
        }

        // A pair may appear in at most one of the three rule sets.
        let mut seen: BTreeSet<BodyPair> = BTreeSet::new();
        for (from, to) in entry
            .bullish_pairs
            .iter()
            .chain(&entry.bearish_pairs)
            .chain(&entry.neutral_pairs)
        {
            let pair = BodyPair::new(*from, *to);
            if !seen.insert(pair) {
                return Err(ConfigError::InvalidValue {
                    field: "instruments.profiles",
                    reason: format!("{name}: pair {from}-{to} appears in more than one set"),
                });
            }
        }
    }
    Ok(())
}

pub(crate) fn build_table(config: &InstrumentsConfig) -> ProfileTable {
    let mut profiles = BTreeMap::new();
    let mut fallback = InstrumentProfile::fallback();

    for (name, entry) in &config.profiles {
        let name = name.to_uppercase();
        let profile = build_profile(&name, entry);
        if name == "DEFAULT" {
            fallback = profile;
        } else {
            profiles.insert(name, profile);
        }
    }

    ProfileTable::new(profiles, fallback)
}

fn build_profile(name: &str, entry: &ProfileEntry) -> InstrumentProfile {
    let to_pairs = |pairs: &[(CelestialBody, CelestialBody)]| {
        pairs
            .iter()
            .map(|(from, to)| BodyPair::new(*from, *to))
            .collect::<BTreeSet<_>>()
    };

    InstrumentProfile {
        instrument: name.to_string(),
        bullish: to_pairs(&entry.bullish_pairs),
        bearish: to_pairs(&entry.bearish_pairs),
        neutral: to_pairs(&entry.neutral_pairs),
        strength: entry.strength,
        primary_ruler: entry.primary_ruler,
        secondary_ruler: entry.secondary_ruler,
        bearish_influences: entry.bearish_influences.iter().copied().collect(),
    }
}
