//! Application orchestration.
//!
//! One tick is a single sequential pass: snapshot, match, then per
//! instrument classify, compose, deliver. Catalog and profiles are read-only
//! after startup, so ticks share nothing mutable.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::config::{Config, EphemerisConfig};
use crate::dataset;
use crate::delivery::{DeliveryOutcome, DeliverySink, Spool, TelegramDelivery};
use crate::domain::{
    match_aspects, ActiveAspect, AspectCatalog, Composer, PositionSnapshot, ProfileTable, Report,
    RuleEngine, Section,
};
use crate::ephemeris::{DatasetPositions, PositionSource, StaticPositions};
use crate::error::Result;
use crate::market::{self, HttpQuotes, QuoteProvider};
use crate::session::SessionWindow;

pub struct App {
    catalog: AspectCatalog,
    profiles: ProfileTable,
    session: SessionWindow,
    composer: Composer,
    tracked: Vec<String>,
    source: Box<dyn PositionSource>,
    quotes: Option<QuoteFetcher>,
    sink: Box<dyn DeliverySink>,
    spool: Spool,
    interval: Duration,
}

struct QuoteFetcher {
    provider: Box<dyn QuoteProvider>,
    /// Instrument id to vendor symbol.
    symbols: BTreeMap<String, String>,
}

impl App {
    pub fn from_config(config: &Config) -> Result<Self> {
        let session = config.session.window()?;
        let offset = session.offset();

        let source: Box<dyn PositionSource> = match &config.ephemeris {
            EphemerisConfig::Static { positions } => Box::new(StaticPositions::new(
                positions.iter().map(|(body, lon)| (*body, *lon)).collect(),
            )),
            EphemerisConfig::Dataset { path } => {
                let rows = dataset::load_transits(path, offset)?;
                info!(rows = rows.len(), path = %path.display(), "Loaded transit dataset");
                Box::new(DatasetPositions::new(rows))
            }
        };

        let token = config.telegram.token()?;
        let sink: Box<dyn DeliverySink> =
            Box::new(TelegramDelivery::new(&config.telegram, &token)?);

        let quotes = match &config.market {
            Some(market_config) => match std::env::var(&market_config.api_key_env) {
                Ok(key) => Some(QuoteFetcher {
                    provider: Box::new(HttpQuotes::new(
                        market_config.api_url.clone(),
                        key,
                        Duration::from_secs(market_config.timeout_secs),
                    )?),
                    symbols: market_config.symbols.clone(),
                }),
                Err(_) => {
                    warn!(
                        env = %market_config.api_key_env,
                        "Quote API key not set, market data disabled"
                    );
                    None
                }
            },
            None => None,
        };

        if config.instruments.tracked.is_empty() {
            warn!("No instruments tracked; every tick will be quiet");
        }

        Ok(Self {
            catalog: config.catalog(),
            profiles: config.profile_table(),
            session,
            composer: Composer::new(config.report.include_positions, offset),
            tracked: config.instruments.tracked.clone(),
            source,
            quotes,
            sink,
            spool: Spool::new(config.scheduler.spool_dir.clone()),
            interval: Duration::from_secs(config.scheduler.check_interval_secs),
        })
    }

    /// Run the evaluation loop until the surrounding task is cancelled.
    pub async fn run(&self) -> Result<()> {
        info!(
            interval_secs = self.interval.as_secs(),
            instruments = self.tracked.len(),
            "Evaluation loop started"
        );
        loop {
            self.tick(Utc::now()).await;
            let pause = align_to_interval(self.interval, Utc::now());
            tokio::time::sleep(pause).await;
        }
    }

    /// One evaluation pass. Quiet ticks deliver nothing.
    pub async fn tick(&self, now: DateTime<Utc>) {
        let reduction = self.session.reduction_at(now);
        let snapshot = self.source.positions(now);
        if snapshot.is_empty() {
            warn!("Position source returned no bodies, skipping tick");
            return;
        }

        let active = match_aspects(&snapshot, &self.catalog, reduction);
        if active.is_empty() {
            debug!("No active aspects");
            return;
        }
        info!(active = active.len(), reduction, "Active aspects detected");

        let market_section = self.market_section(now).await;
        for instrument in &self.tracked {
            let report =
                self.compose_report(instrument, &snapshot, &active, market_section.clone());
            let text = report.render();

            match self.sink.deliver(&text).await {
                DeliveryOutcome::Success { chunks, .. } => {
                    info!(instrument = %instrument, chunks, "Alert delivered");
                }
                DeliveryOutcome::Failed {
                    chunk_index,
                    chunks,
                    error,
                    ..
                } => {
                    error!(
                        instrument = %instrument,
                        chunk = chunk_index + 1,
                        total = chunks,
                        error = %error,
                        "Alert delivery failed"
                    );
                    // The computed report must stay inspectable after a
                    // failed delivery.
                    match self.spool.store(instrument, now, &text) {
                        Ok(path) => warn!(path = %path.display(), "Report spooled"),
                        Err(io) => error!(error = %io, "Failed to spool report"),
                    }
                }
            }
        }
    }

    /// Render every tracked instrument's report without delivering.
    ///
    /// Unlike [`tick`](Self::tick), quiet states still render, as a
    /// "no significant aspects" report.
    pub async fn preview(&self, now: DateTime<Utc>) -> Vec<(String, String)> {
        let reduction = self.session.reduction_at(now);
        let snapshot = self.source.positions(now);
        let active = match_aspects(&snapshot, &self.catalog, reduction);
        let market_section = self.market_section(now).await;

        self.tracked
            .iter()
            .map(|instrument| {
                let report =
                    self.compose_report(instrument, &snapshot, &active, market_section.clone());
                (instrument.clone(), report.render())
            })
            .collect()
    }

    /// Send a connectivity probe through the delivery sink.
    pub async fn check(&self) -> DeliveryOutcome {
        self.sink.deliver("astroalert connectivity check").await
    }

    fn compose_report(
        &self,
        instrument: &str,
        snapshot: &PositionSnapshot,
        active: &[ActiveAspect],
        market: Option<Section>,
    ) -> Report {
        let engine = RuleEngine::new(&self.profiles);
        let classified = engine.classify(instrument, active);
        let profile = self.profiles.resolve(instrument);
        let date_label = snapshot
            .at()
            .with_timezone(&self.composer.offset)
            .format("%d %b %Y %H:%M")
            .to_string();

        self.composer.compose(
            instrument,
            &date_label,
            profile,
            &classified,
            Some(snapshot),
            market,
        )
    }

    async fn market_section(&self, now: DateTime<Utc>) -> Option<Section> {
        let fetcher = self.quotes.as_ref()?;
        if !self.session.is_open(now) {
            return None;
        }

        let mut quotes = Vec::new();
        for (instrument, symbol) in &fetcher.symbols {
            match fetcher.provider.quote(symbol).await {
                Ok(quote) => quotes.push((instrument.clone(), quote)),
                Err(error) => {
                    warn!(instrument = %instrument, error = %error, "Quote fetch failed");
                }
            }
        }
        market::quote_section(&quotes)
    }
}

/// Sleep duration that lands the next tick on an interval boundary.
fn align_to_interval(interval: Duration, now: DateTime<Utc>) -> Duration {
    let secs = interval.as_secs().max(1);
    let rem = now.timestamp().rem_euclid(secs as i64) as u64;
    Duration::from_secs(secs - rem)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{NaiveTime, TimeZone};

    use super::*;
    use crate::domain::{AspectDefinition, CelestialBody};

    struct RecordingSink {
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl DeliverySink for RecordingSink {
        async fn deliver(&self, text: &str) -> DeliveryOutcome {
            self.sent.lock().unwrap().push(text.to_string());
            DeliveryOutcome::Success {
                chunks: 1,
                attempts: vec![],
            }
        }
    }

    fn test_session() -> SessionWindow {
        SessionWindow::new(
            NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
            NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
            vec![
                chrono::Weekday::Mon,
                chrono::Weekday::Tue,
                chrono::Weekday::Wed,
                chrono::Weekday::Thu,
                chrono::Weekday::Fri,
            ],
            chrono::FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap(),
            0.3,
        )
    }

    fn test_app(
        positions: Vec<(CelestialBody, f64)>,
        sent: Arc<Mutex<Vec<String>>>,
    ) -> (App, tempfile::TempDir) {
        let spool_dir = tempfile::tempdir().unwrap();
        let session = test_session();
        let offset = session.offset();
        let app = App {
            catalog: AspectCatalog::new(vec![AspectDefinition::new(
                CelestialBody::Jupiter,
                CelestialBody::Sun,
                120.0,
                1.5,
                "Strong Bullish",
            )]),
            profiles: ProfileTable::default(),
            session,
            composer: Composer::new(true, offset),
            tracked: vec!["NIFTY".to_string(), "GOLD".to_string()],
            source: Box::new(StaticPositions::new(positions)),
            quotes: None,
            sink: Box::new(RecordingSink { sent }),
            spool: Spool::new(spool_dir.path()),
            interval: Duration::from_secs(60),
        };
        (app, spool_dir)
    }

    #[tokio::test]
    async fn test_tick_delivers_one_report_per_instrument() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let (app, _spool) = test_app(
            vec![(CelestialBody::Jupiter, 10.0), (CelestialBody::Sun, 130.0)],
            Arc::clone(&sent),
        );

        let now = Utc.with_ymd_and_hms(2026, 3, 2, 5, 0, 0).unwrap();
        app.tick(now).await;

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("NIFTY ASTRO SIGNAL"));
        assert!(sent[1].contains("GOLD ASTRO SIGNAL"));
        assert!(sent[0].contains("Jupiter->Sun"));
    }

    #[tokio::test]
    async fn test_quiet_tick_delivers_nothing() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        // Separation 90°, nowhere near the 120° trine.
        let (app, _spool) = test_app(
            vec![(CelestialBody::Jupiter, 10.0), (CelestialBody::Sun, 100.0)],
            Arc::clone(&sent),
        );

        let now = Utc.with_ymd_and_hms(2026, 3, 2, 5, 0, 0).unwrap();
        app.tick(now).await;

        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_preview_renders_quiet_reports() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let (app, _spool) = test_app(
            vec![(CelestialBody::Jupiter, 10.0), (CelestialBody::Sun, 100.0)],
            Arc::clone(&sent),
        );

        let now = Utc.with_ymd_and_hms(2026, 3, 2, 5, 0, 0).unwrap();
        let previews = app.preview(now).await;

        assert_eq!(previews.len(), 2);
        assert!(previews[0].1.contains("no significant aspects"));
        // Preview never delivers.
        assert!(sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_align_to_interval_lands_on_boundary() {
        let interval = Duration::from_secs(60);
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 5, 0, 42).unwrap();
        assert_eq!(align_to_interval(interval, now), Duration::from_secs(18));

        let on_boundary = Utc.with_ymd_and_hms(2026, 3, 2, 5, 1, 0).unwrap();
        assert_eq!(
            align_to_interval(interval, on_boundary),
            Duration::from_secs(60)
        );
    }
}
