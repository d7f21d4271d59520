//! Report composition.
//!
//! The composer renders classified aspects into an ordered, plain-text
//! report. Plain text is the single canonical rendering; any markup mode is
//! negotiated by the delivery adapter, never patched in here.

use chrono::{DateTime, FixedOffset, Utc};

use super::profile::InstrumentProfile;
use super::signal::{ClassifiedAspect, Sentiment};
use super::snapshot::PositionSnapshot;

/// Strength multiplier at or above which risk is annotated HIGH.
const HIGH_RISK_STRENGTH: f64 = 1.5;

/// How many earliest entries feed a strategy window line.
const STRATEGY_WINDOW_ENTRIES: usize = 2;

/// One titled block of report lines.
///
/// A section with an empty heading renders its lines without a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub lines: Vec<String>,
}

impl Section {
    #[must_use]
    pub fn new(heading: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            heading: heading.into(),
            lines,
        }
    }

    #[must_use]
    pub fn unlabeled(lines: Vec<String>) -> Self {
        Self {
            heading: String::new(),
            lines,
        }
    }
}

/// A composed report: title plus ordered sections.
///
/// Built once per instrument per tick, immutable afterwards; the delivery
/// layer decides whether it ships whole or chunked.
#[derive(Debug, Clone)]
pub struct Report {
    pub title: String,
    sections: Vec<Section>,
}

impl Report {
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Render the canonical plain-text payload.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = self.title.clone();
        for section in &self.sections {
            out.push_str("\n\n");
            if !section.heading.is_empty() {
                out.push_str(&section.heading);
                out.push('\n');
            }
            out.push_str(&section.lines.join("\n"));
        }
        out
    }
}

/// Renders classified aspects into a [`Report`].
#[derive(Debug, Clone)]
pub struct Composer {
    /// Include the planetary-positions section when a snapshot is supplied.
    pub include_positions: bool,
    /// Offset used to display times (the market's timezone).
    pub offset: FixedOffset,
}

impl Composer {
    #[must_use]
    pub const fn new(include_positions: bool, offset: FixedOffset) -> Self {
        Self {
            include_positions,
            offset,
        }
    }

    /// Compose the report for one instrument.
    ///
    /// Sentiment lists are ordered chronologically (by the originating
    /// instant), not by score. Empty category lists are omitted entirely; a
    /// fully quiet input still yields a well-formed report.
    #[must_use]
    pub fn compose(
        &self,
        instrument: &str,
        date_label: &str,
        profile: &InstrumentProfile,
        classified: &[ClassifiedAspect],
        snapshot: Option<&PositionSnapshot>,
        market: Option<Section>,
    ) -> Report {
        let title = format!("{} ASTRO SIGNAL - {}", instrument.to_uppercase(), date_label);
        let mut sections = Vec::new();

        if let Some(section) = market {
            if !section.lines.is_empty() {
                sections.push(section);
            }
        }

        if self.include_positions {
            if let Some(snapshot) = snapshot {
                if !snapshot.is_empty() {
                    sections.push(self.positions_section(snapshot));
                }
            }
        }

        let bullish = self.sorted_by_time(classified, Sentiment::Bullish);
        let bearish = self.sorted_by_time(classified, Sentiment::Bearish);
        let neutral = self.sorted_by_time(classified, Sentiment::Neutral);

        if classified.is_empty() {
            sections.push(Section::unlabeled(vec![
                "no significant aspects".to_string(),
            ]));
        } else {
            for (heading, list) in [
                ("Bullish Aspects", &bullish),
                ("Bearish Aspects", &bearish),
                ("Neutral Aspects", &neutral),
            ] {
                if !list.is_empty() {
                    let lines = list.iter().map(|c| self.aspect_line(c)).collect();
                    sections.push(Section::new(heading, lines));
                }
            }
        }

        let strategy = self.strategy_lines(&bullish, &bearish);
        if !strategy.is_empty() {
            sections.push(Section::new("Strategy", strategy));
        }

        sections.push(risk_section(profile));

        Report { title, sections }
    }

    fn positions_section(&self, snapshot: &PositionSnapshot) -> Section {
        let lines = snapshot
            .iter()
            .map(|(body, longitude)| format!("{:<8} {:>7.2}\u{b0}", body.name(), longitude))
            .collect();
        Section::new("Planetary Positions", lines)
    }

    fn sorted_by_time(
        &self,
        classified: &[ClassifiedAspect],
        sentiment: Sentiment,
    ) -> Vec<ClassifiedAspect> {
        let mut list: Vec<ClassifiedAspect> = classified
            .iter()
            .filter(|c| c.sentiment == sentiment)
            .cloned()
            .collect();
        // Stable: equal times keep the deviation-ascending input order.
        list.sort_by_key(|c| c.aspect.at);
        list
    }

    fn aspect_line(&self, classified: &ClassifiedAspect) -> String {
        let def = &classified.aspect.definition;
        format!(
            "{}  {}->{} {:.0}\u{b0}  dev {:.2}\u{b0}  score {:+.2}  [{}]",
            self.format_time(classified.aspect.at),
            def.from,
            def.to,
            def.angle,
            classified.aspect.deviation,
            classified.score,
            def.label,
        )
    }

    fn strategy_lines(
        &self,
        bullish: &[ClassifiedAspect],
        bearish: &[ClassifiedAspect],
    ) -> Vec<String> {
        let mut lines = Vec::new();
        let accumulation = self.window_times(bullish);
        if !accumulation.is_empty() {
            lines.push(format!("Accumulation window: {}", accumulation.join(", ")));
        }
        let distribution = self.window_times(bearish);
        if !distribution.is_empty() {
            lines.push(format!("Distribution window: {}", distribution.join(", ")));
        }
        lines
    }

    fn window_times(&self, list: &[ClassifiedAspect]) -> Vec<String> {
        list.iter()
            .take(STRATEGY_WINDOW_ENTRIES)
            .map(|c| self.format_time(c.aspect.at))
            .collect()
    }

    fn format_time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).format("%H:%M").to_string()
    }
}

fn risk_section(profile: &InstrumentProfile) -> Section {
    let label = if profile.strength >= HIGH_RISK_STRENGTH {
        "HIGH"
    } else {
        "MODERATE"
    };
    Section::new(
        "Risk",
        vec![format!(
            "Risk level: {} (strength x{:.1})",
            label, profile.strength
        )],
    )
}
