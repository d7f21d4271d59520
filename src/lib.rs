//! Astroalert - planetary aspect detection and trading signal alerts.
//!
//! The pipeline is a single sequential pass per evaluation tick:
//!
//! position snapshot + aspect catalog -> active aspects -> per-instrument
//! sentiment classification -> plain-text report -> chunked, retried
//! delivery to a Telegram chat.
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with validated, immutable tables
//! - [`domain`] - the pipeline core: bodies, snapshots, aspects, profiles,
//!   classification, and report composition
//! - [`session`] - market session window and orb tightening
//! - [`ephemeris`] - position source port and adapters
//! - [`dataset`] - transit table collaborator
//! - [`market`] - optional quote collaborator
//! - [`delivery`] - chunking, bounded retry, and the Telegram adapter
//! - [`app`] - tick orchestration and the evaluation loop
//! - [`error`] - error types for the crate
//!
//! # Example
//!
//! ```
//! use astroalert::domain::{
//!     match_aspects, AspectCatalog, AspectDefinition, CelestialBody, PositionSnapshot,
//! };
//!
//! let catalog = AspectCatalog::new(vec![AspectDefinition::new(
//!     CelestialBody::Jupiter,
//!     CelestialBody::Sun,
//!     120.0,
//!     1.5,
//!     "Strong Bullish",
//! )]);
//! let snapshot = PositionSnapshot::new(
//!     chrono::Utc::now(),
//!     [(CelestialBody::Jupiter, 10.0), (CelestialBody::Sun, 130.0)],
//! );
//!
//! let active = match_aspects(&snapshot, &catalog, 0.0);
//! assert_eq!(active.len(), 1);
//! assert_eq!(active[0].deviation, 0.0);
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod delivery;
pub mod domain;
pub mod ephemeris;
pub mod error;
pub mod market;
pub mod session;
