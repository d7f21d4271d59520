//! Instrument-agnostic pipeline core.
//!
//! Snapshot + catalog in, classified report out. Every stage here is pure:
//! malformed or partial input shrinks the output, it never errors.

mod aspect;
mod body;
mod profile;
mod report;
mod signal;
mod snapshot;

// Core types
pub use aspect::{match_aspects, separation, ActiveAspect, AspectCatalog, AspectDefinition};
pub use body::{CelestialBody, ParseBodyError};
pub use profile::{BodyPair, InstrumentProfile, ProfileTable};
pub use snapshot::PositionSnapshot;

// Classification
pub use signal::{ClassifiedAspect, RuleEngine, Sentiment};

// Composition
pub use report::{Composer, Report, Section};
