use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::domain::payment::{Direction, PaymentType};
use crate::error::PaywatchError;

/// Inclusive bound on record creation time. Either end may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn since(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn until(end: DateTime<Utc>) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        if let Some(start) = self.start
            && at < start
        {
            return false;
        }
        if let Some(end) = self.end
            && at > end
        {
            return false;
        }
        true
    }
}

/// Named trailing windows offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeWindow {
    LastHour,
    Last24Hours,
    Last72Hours,
}

impl RelativeWindow {
    /// Resolves the window to absolute bounds against `now`. Resolution
    /// happens when the criteria snapshot is built, so filtering itself
    /// stays pure.
    pub fn resolve(self, now: DateTime<Utc>) -> TimeRange {
        let hours = match self {
            Self::LastHour => 1,
            Self::Last24Hours => 24,
            Self::Last72Hours => 72,
        };
        TimeRange::between(now - Duration::hours(hours), now)
    }
}

impl FromStr for RelativeWindow {
    type Err = PaywatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1h" => Ok(Self::LastHour),
            "24h" => Ok(Self::Last24Hours),
            "72h" => Ok(Self::Last72Hours),
            other => Err(PaywatchError::Validation(format!(
                "unknown time window: {other}"
            ))),
        }
    }
}

/// A snapshot of the active search filters. The default passes everything.
///
/// Value bounds keep the operator's raw text: input that does not parse as
/// a number leaves that bound open rather than failing the search.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Free-text query; `*` acts as a wildcard.
    pub query: String,
    pub status: Option<String>,
    pub direction: Option<Direction>,
    /// Stage id; a record matches if any hop references it.
    pub stage: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub min_value: Option<String>,
    pub max_value: Option<String>,
    pub window: Option<TimeRange>,
}

impl FilterCriteria {
    pub fn min_bound(&self) -> Option<Decimal> {
        parse_bound(self.min_value.as_deref())
    }

    pub fn max_bound(&self) -> Option<Decimal> {
        parse_bound(self.max_value.as_deref())
    }
}

fn parse_bound(raw: Option<&str>) -> Option<Decimal> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse().ok()
}
