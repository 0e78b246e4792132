//! Dividend cadence, trailing-twelve-month totals and sustainability scoring.

use std::collections::BTreeMap;

use analysis_core::{stats, DividendSeries};
use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{DividendAnalysis, DividendFrequency, SustainabilityRating};
use crate::ValuationAnalyzer;

/// Years of annual totals considered for the historical growth rate.
const GROWTH_LOOKBACK_YEARS: usize = 5;

/// Classify payment cadence by the median gap in calendar days between ex-dates.
pub fn detect_frequency(dividends: &DividendSeries) -> DividendFrequency {
    let payments = dividends.payments();
    if payments.len() < 2 {
        return DividendFrequency::Unknown;
    }

    let mut gaps: Vec<i64> = payments
        .windows(2)
        .map(|w| (w[1].0 - w[0].0).num_days())
        .collect();
    gaps.sort_unstable();

    let mid = gaps.len() / 2;
    let median_days = if gaps.len() % 2 == 0 {
        (gaps[mid - 1] + gaps[mid]) / 2
    } else {
        gaps[mid]
    };

    match median_days {
        d if d > 300 => DividendFrequency::Annual,
        d if d > 150 => DividendFrequency::SemiAnnual,
        d if d > 60 => DividendFrequency::Quarterly,
        d if d > 20 => DividendFrequency::Monthly,
        _ => DividendFrequency::Irregular,
    }
}

/// Dividends paid in the 365 days up to `as_of`.
///
/// When that window is empty, falls back to the most recent year's worth of
/// payments for the detected cadence (the last four for irregular payers).
pub fn ttm_dividend(dividends: &DividendSeries, as_of: NaiveDate) -> f64 {
    if dividends.is_empty() {
        return 0.0;
    }

    let cutoff = as_of - Duration::days(365);
    let trailing: f64 = dividends
        .payments()
        .iter()
        .filter(|(date, _)| *date >= cutoff)
        .map(|(_, amount)| amount)
        .sum();
    if trailing > 0.0 {
        return trailing;
    }

    let payments = dividends.payments();
    let take = detect_frequency(dividends)
        .payments_per_year()
        .unwrap_or(4)
        .min(payments.len());
    payments[payments.len() - take..].iter().map(|(_, a)| a).sum()
}

/// Dividend totals per calendar year, including zero-payment years between
/// the first and last payment.
pub fn annual_totals(dividends: &DividendSeries) -> BTreeMap<i32, f64> {
    let mut totals = BTreeMap::new();
    let (Some(first), Some(last)) = (dividends.payments().first(), dividends.last_date()) else {
        return totals;
    };

    for year in first.0.year()..=last.year() {
        totals.insert(year, 0.0);
    }
    for (date, amount) in dividends.payments() {
        *totals.entry(date.year()).or_insert(0.0) += amount;
    }
    totals
}

/// CAGR of annual dividend totals over the last five paying years, in percent.
pub fn dividend_growth_rate(dividends: &DividendSeries) -> Option<f64> {
    let paying: Vec<f64> = annual_totals(dividends)
        .into_values()
        .filter(|total| *total > 0.0)
        .collect();
    if paying.len() < 2 {
        return None;
    }

    let recent = &paying[paying.len() - paying.len().min(GROWTH_LOOKBACK_YEARS)..];
    stats::cagr(recent[recent.len() - 1], recent[0], (recent.len() - 1) as f64)
}

/// Calendar years with a dividend, counted back from the latest payment year.
pub fn consecutive_years(dividends: &DividendSeries) -> u32 {
    annual_totals(dividends)
        .values()
        .rev()
        .take_while(|total| **total > 0.0)
        .count() as u32
}

/// 0-100 score from payout ratio (percent), growth (percent) and consecutive years.
pub fn sustainability_score(
    payout_ratio_pct: Option<f64>,
    growth_rate_pct: Option<f64>,
    consecutive_years: u32,
) -> u32 {
    let payout_points = match payout_ratio_pct {
        Some(p) if p <= 50.0 => 40,
        Some(p) if p <= 70.0 => 30,
        Some(p) if p <= 90.0 => 15,
        Some(p) if p <= 100.0 => 5,
        _ => 0,
    };

    let growth_points = match growth_rate_pct {
        Some(g) if g >= 10.0 => 30,
        Some(g) if g >= 5.0 => 20,
        Some(g) if g >= 0.0 => 10,
        _ => 0,
    };

    let consistency_points = match consecutive_years {
        10.. => 30,
        5..=9 => 20,
        3..=4 => 10,
        1..=2 => 5,
        0 => 0,
    };

    payout_points + growth_points + consistency_points
}

impl ValuationAnalyzer<'_> {
    /// Yield, TTM dividend, growth, coverage and a sustainability score.
    pub fn analyze_dividends(&self) -> DividendAnalysis {
        let mut result = DividendAnalysis::default();

        let dividend_yield = self.profile.positive("dividendYield");
        let has_history = !self.dividends.is_empty() && self.dividends.total() > 0.0;
        if !has_history && dividend_yield.is_none() {
            return result;
        }
        result.pays_dividends = true;

        // Providers report yield either as a fraction (0.0366) or already in percent (3.66).
        result.dividend_yield = dividend_yield.map(|y| if y > 1.0 { y } else { y * 100.0 });

        if has_history {
            result.annual_dividend = Some(ttm_dividend(self.dividends, self.as_of));
            result.dividend_growth_rate = dividend_growth_rate(self.dividends);
            result.consecutive_years = Some(consecutive_years(self.dividends));
            result.latest_ex_dividend_date = self.dividends.last_date();
            result.frequency = Some(detect_frequency(self.dividends));
        }

        let payout_ratio = self.profile.positive("payoutRatio");
        result.payout_ratio = payout_ratio.map(|p| p * 100.0);

        if let Some(payout) = payout_ratio {
            let coverage = 1.0 / payout;
            result.dividend_coverage_ratio = Some(coverage);

            if payout > 1.0 {
                result
                    .warnings
                    .push("Payout ratio > 100% - dividends exceed earnings (unsustainable)".to_string());
            } else if payout > 0.8 {
                result
                    .warnings
                    .push("High payout ratio (>80%) - limited room for growth".to_string());
            } else if coverage < 1.5 {
                result
                    .warnings
                    .push("Low dividend coverage (<1.5x) - risk of dividend cut".to_string());
            }
        }

        let score = sustainability_score(
            result.payout_ratio,
            result.dividend_growth_rate,
            result.consecutive_years.unwrap_or(0),
        );
        result.sustainability_score = Some(score);
        result.sustainability_rating = Some(SustainabilityRating::from_score(score));

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn evenly_spaced(start: NaiveDate, gap_days: i64, count: usize, amount: f64) -> DividendSeries {
        DividendSeries::new(
            (0..count)
                .map(|i| (start + Duration::days(gap_days * i as i64), amount))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_frequency_by_median_gap() {
        let start = date(2020, 1, 15);
        assert_eq!(detect_frequency(&evenly_spaced(start, 91, 6, 0.5)), DividendFrequency::Quarterly);
        assert_eq!(detect_frequency(&evenly_spaced(start, 366, 4, 2.0)), DividendFrequency::Annual);
        assert_eq!(detect_frequency(&evenly_spaced(start, 182, 4, 1.0)), DividendFrequency::SemiAnnual);
        assert_eq!(detect_frequency(&evenly_spaced(start, 30, 12, 0.1)), DividendFrequency::Monthly);
        assert_eq!(detect_frequency(&evenly_spaced(start, 7, 5, 0.1)), DividendFrequency::Irregular);
        assert_eq!(detect_frequency(&evenly_spaced(start, 91, 1, 0.5)), DividendFrequency::Unknown);
    }

    #[test]
    fn test_ttm_uses_trailing_window() {
        let series = evenly_spaced(date(2022, 1, 15), 91, 12, 0.25);
        let as_of = series.last_date().unwrap() + Duration::days(10);
        // Payments every 91 days: four land inside the last 365 days.
        assert_relative_eq!(ttm_dividend(&series, as_of), 1.0);
    }

    #[test]
    fn test_ttm_falls_back_by_frequency_when_window_is_empty() {
        let quarterly = evenly_spaced(date(2018, 1, 15), 91, 8, 0.25);
        let far_future = date(2030, 1, 1);
        assert_relative_eq!(ttm_dividend(&quarterly, far_future), 1.0);

        let annual = evenly_spaced(date(2015, 6, 1), 366, 3, 2.0);
        assert_relative_eq!(ttm_dividend(&annual, far_future), 2.0);

        let irregular = DividendSeries::new(vec![(date(2019, 3, 1), 0.3), (date(2019, 3, 8), 0.2)]).unwrap();
        assert_relative_eq!(ttm_dividend(&irregular, far_future), 0.5);
    }

    #[test]
    fn test_growth_and_consecutive_years() {
        let series = DividendSeries::new(vec![
            (date(2019, 6, 1), 1.00),
            (date(2020, 6, 1), 1.10),
            (date(2021, 6, 1), 1.21),
        ])
        .unwrap();
        assert_relative_eq!(dividend_growth_rate(&series).unwrap(), 10.0, epsilon = 1e-9);
        assert_eq!(consecutive_years(&series), 3);
    }

    #[test]
    fn test_gap_year_breaks_the_streak() {
        let series = DividendSeries::new(vec![
            (date(2017, 6, 1), 1.0),
            (date(2018, 6, 1), 1.0),
            (date(2020, 6, 1), 1.0),
            (date(2021, 6, 1), 1.0),
        ])
        .unwrap();
        assert_eq!(consecutive_years(&series), 2);
        assert_eq!(annual_totals(&series).get(&2019), Some(&0.0));
        // Flat payments are a valid 0% growth rate.
        assert_relative_eq!(dividend_growth_rate(&series).unwrap(), 0.0);
    }

    #[test]
    fn test_growth_needs_two_paying_years() {
        let series = DividendSeries::new(vec![(date(2021, 3, 1), 0.5), (date(2021, 6, 1), 0.5)]).unwrap();
        assert!(dividend_growth_rate(&series).is_none());
    }

    #[test]
    fn test_sustainability_score_bands() {
        assert_eq!(sustainability_score(Some(40.0), Some(12.0), 25), 100);
        assert_eq!(sustainability_score(Some(65.0), Some(6.0), 6), 70);
        assert_eq!(sustainability_score(Some(85.0), Some(0.0), 3), 35);
        assert_eq!(sustainability_score(Some(100.0), Some(-2.0), 1), 10);
        assert_eq!(sustainability_score(Some(120.0), None, 0), 0);
        assert_eq!(sustainability_score(None, None, 0), 0);

        assert_eq!(SustainabilityRating::from_score(100), SustainabilityRating::Excellent);
        assert_eq!(SustainabilityRating::from_score(70), SustainabilityRating::Good);
        assert_eq!(SustainabilityRating::from_score(40), SustainabilityRating::Fair);
        assert_eq!(SustainabilityRating::from_score(35), SustainabilityRating::Poor);
        assert_eq!(SustainabilityRating::from_score(10), SustainabilityRating::HighRisk);
    }
}
