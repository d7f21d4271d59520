//! Aspect catalog configuration.

use serde::Deserialize;

use crate::domain::{AspectCatalog, AspectDefinition, CelestialBody};
use crate::error::ConfigError;

/// One `[[aspects]]` table entry.
#[derive(Debug, Clone, Deserialize)]
pub struct AspectEntry {
    pub from: CelestialBody,
    pub to: CelestialBody,
    pub angle: f64,
    pub orb: f64,
    pub label: String,
}

/// The stock catalog used when the config file defines no `[[aspects]]`.
pub(crate) fn default_entries() -> Vec<AspectEntry> {
    [
        (CelestialBody::Jupiter, CelestialBody::Sun, 120.0, 1.5, "Strong Bullish"),
        (CelestialBody::Venus, CelestialBody::Moon, 0.0, 1.2, "Bullish"),
        (CelestialBody::Saturn, CelestialBody::Mars, 90.0, 1.5, "Strong Bearish"),
        (CelestialBody::Rahu, CelestialBody::Sun, 180.0, 1.8, "Bearish"),
        (CelestialBody::Mars, CelestialBody::Mercury, 90.0, 1.5, "Volatile"),
        (CelestialBody::Rahu, CelestialBody::Ketu, 180.0, 0.5, "Market Turning Point"),
    ]
    .into_iter()
    .map(|(from, to, angle, orb, label)| AspectEntry {
        from,
        to,
        angle,
        orb,
        label: label.to_string(),
    })
    .collect()
}

pub(crate) fn validate(entries: &[AspectEntry]) -> Result<(), ConfigError> {
    for entry in entries {
        if entry.from == entry.to {
            return Err(ConfigError::InvalidValue {
                field: "aspects.from",
                reason: format!("{} aspects itself", entry.from),
            });
        }
        if !(0.0..=180.0).contains(&entry.angle) {
            return Err(ConfigError::InvalidValue {
                field: "aspects.angle",
                reason: format!("{} is outside [0, 180]", entry.angle),
            });
        }
        if entry.orb <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "aspects.orb",
                reason: format!("{} is not positive", entry.orb),
            });
        }
    }
    Ok(())
}

pub(crate) fn build(entries: &[AspectEntry]) -> AspectCatalog {
    AspectCatalog::new(
        entries
            .iter()
            .map(|entry| {
                AspectDefinition::new(
                    entry.from,
                    entry.to,
                    entry.angle,
                    entry.orb,
                    entry.label.clone(),
                )
            })
            .collect(),
    )
}
