//! Market session window and the orb-tightening context.
//!
//! Orbs are tightened while the market session is open, so only
//! closer-to-exact aspects alert during trading hours.

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, Utc, Weekday};

/// Trading-session window in a fixed market timezone.
#[derive(Debug, Clone)]
pub struct SessionWindow {
    open: NaiveTime,
    close: NaiveTime,
    trading_days: Vec<Weekday>,
    offset: FixedOffset,
    orb_reduction: f64,
}

impl SessionWindow {
    #[must_use]
    pub fn new(
        open: NaiveTime,
        close: NaiveTime,
        trading_days: Vec<Weekday>,
        offset: FixedOffset,
        orb_reduction: f64,
    ) -> Self {
        Self {
            open,
            close,
            trading_days,
            offset,
            orb_reduction,
        }
    }

    /// Whether the market session is open at the given instant.
    #[must_use]
    pub fn is_open(&self, at: DateTime<Utc>) -> bool {
        let local = at.with_timezone(&self.offset);
        if !self.trading_days.contains(&local.weekday()) {
            return false;
        }
        let time = local.time();
        time >= self.open && time <= self.close
    }

    /// Orb reduction in effect at the given instant; zero outside the session.
    #[must_use]
    pub fn reduction_at(&self, at: DateTime<Utc>) -> f64 {
        if self.is_open(at) {
            self.orb_reduction
        } else {
            0.0
        }
    }

    /// The market timezone offset, for display formatting.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }
}
