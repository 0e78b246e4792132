use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::stats;

/// One daily OHLCV row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl PriceBar {
    /// Bar where every price field equals `close`, handy for close-only data.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }
}

/// Daily bars ordered by strictly increasing date.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Validate and wrap a set of bars.
    ///
    /// Dates must be strictly increasing and every close finite and positive;
    /// anything else is a caller contract violation.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self> {
        for (i, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() || bar.close <= 0.0 {
                return Err(AnalysisError::InvalidData(format!(
                    "close on {} must be a positive finite number, got {}",
                    bar.date, bar.close
                )));
            }
            if i > 0 && bars[i - 1].date >= bar.date {
                return Err(AnalysisError::InvalidData(format!(
                    "price dates must be strictly increasing ({} followed by {})",
                    bars[i - 1].date, bar.date
                )));
            }
        }
        Ok(Self { bars })
    }

    /// Build from `(date, close)` pairs.
    pub fn from_closes<I>(closes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            closes
                .into_iter()
                .map(|(date, close)| PriceBar::from_close(date, close))
                .collect(),
        )
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// Daily returns keyed by the date of the later bar.
    pub fn dated_returns(&self) -> Vec<(NaiveDate, f64)> {
        let returns = stats::daily_returns(&self.closes());
        self.bars
            .iter()
            .skip(1)
            .map(|b| b.date)
            .zip(returns)
            .collect()
    }
}

/// Per-share cash dividends ordered by ex-date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DividendSeries {
    payments: Vec<(NaiveDate, f64)>,
}

impl DividendSeries {
    /// Sorts by date; rejects duplicate dates and non-finite amounts.
    pub fn new(mut payments: Vec<(NaiveDate, f64)>) -> Result<Self> {
        if let Some((date, amount)) = payments.iter().find(|(_, a)| !a.is_finite()) {
            return Err(AnalysisError::InvalidData(format!(
                "dividend on {date} is not a finite amount ({amount})"
            )));
        }
        payments.sort_by_key(|(date, _)| *date);
        if let Some(w) = payments.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(AnalysisError::InvalidData(format!(
                "duplicate dividend date {}",
                w[0].0
            )));
        }
        Ok(Self { payments })
    }

    /// Normalize timezone-aware ex-dates to the exchange-local calendar date.
    pub fn from_timestamps<Tz: TimeZone>(payments: Vec<(DateTime<Tz>, f64)>) -> Result<Self> {
        Self::new(
            payments
                .into_iter()
                .map(|(ts, amount)| (ts.naive_local().date(), amount))
                .collect(),
        )
    }

    pub fn payments(&self) -> &[(NaiveDate, f64)] {
        &self.payments
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.payments.iter().map(|(_, a)| a).sum()
    }

    pub fn amounts(&self) -> Vec<f64> {
        self.payments.iter().map(|(_, a)| *a).collect()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.payments.last().map(|(d, _)| *d)
    }
}

/// A reported quarter from the earnings history table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarningsRecord {
    /// Quarter label as supplied by the provider, e.g. `"2024-03-31"` or `"4Q2023"`.
    pub quarter: String,
    pub eps_actual: Option<f64>,
    pub eps_estimate: Option<f64>,
    /// Surprise as a fraction (0.05 = beat by 5%).
    pub surprise_percent: Option<f64>,
}

/// A scheduled earnings release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingEarnings {
    pub date: NaiveDate,
    pub eps_estimate: Option<f64>,
}

/// Earnings history (oldest first) plus upcoming release dates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EarningsData {
    #[serde(default)]
    pub history: Vec<EarningsRecord>,
    #[serde(default)]
    pub upcoming: Vec<UpcomingEarnings>,
}

impl EarningsData {
    pub fn is_empty(&self) -> bool {
        self.history.is_empty() && self.upcoming.is_empty()
    }
}
