use analysis_core::{line_items, stats};

use crate::models::{
    EarningsAnalysis, EarningsQuality, EarningsSurprise, EarningsTrend, QualityMetrics,
    SurpriseStats,
};
use crate::ValuationAnalyzer;

const EPS_ROWS: &[&str] = &[line_items::DILUTED_EPS, line_items::BASIC_EPS];

const QUARTERS_PER_YEAR: usize = 4;

impl ValuationAnalyzer<'_> {
    /// TTM and forward EPS, EPS growth and trend, surprises, next report date
    /// and cash-backed earnings quality.
    pub fn analyze_earnings(&self) -> EarningsAnalysis {
        let mut result = EarningsAnalysis {
            current_eps: self.ttm_eps(),
            forward_eps: self.profile.positive("forwardEps"),
            earnings_quality: self.assess_earnings_quality(),
            ..Default::default()
        };

        let history = &self.earnings.history;
        let recent = &history[history.len().saturating_sub(QUARTERS_PER_YEAR)..];
        result.recent_surprises = recent
            .iter()
            .map(|record| EarningsSurprise {
                quarter: record.quarter.clone(),
                eps_actual: record.eps_actual,
                eps_estimate: record.eps_estimate,
                surprise_pct: record.surprise_percent.map(|s| s * 100.0),
            })
            .collect();
        result.surprise_stats = surprise_stats(&result.recent_surprises);

        let mut upcoming: Vec<_> = self
            .earnings
            .upcoming
            .iter()
            .filter(|e| e.date > self.as_of)
            .collect();
        upcoming.sort_by_key(|e| e.date);
        if let Some(next) = upcoming.first() {
            result.next_earnings_date = Some(next.date);
            result.next_earnings_estimate = next.eps_estimate;
        }

        if let Some(income) = self.statements.income_annual() {
            let eps = |period| income.first_value(EPS_ROWS, period);
            if let Some(current) = eps(0) {
                result.eps_growth_1y = eps(1).and_then(|prior| stats::growth_rate(current, prior));
                result.eps_growth_3y_cagr = eps(3).and_then(|past| stats::cagr(current, past, 3.0));
            }
        }

        result.trend = result.eps_growth_1y.map(EarningsTrend::from_growth);
        result
    }

    /// Sum of the last four reported quarters; requires all four and a positive total.
    fn ttm_eps(&self) -> Option<f64> {
        let history = &self.earnings.history;
        if history.len() < QUARTERS_PER_YEAR {
            return None;
        }

        let total = history[history.len() - QUARTERS_PER_YEAR..]
            .iter()
            .map(|record| record.eps_actual)
            .sum::<Option<f64>>()?;
        (total > 0.0).then_some(total)
    }

    /// Operating cash flow relative to net income for the latest fiscal year.
    pub fn assess_earnings_quality(&self) -> EarningsQuality {
        let mut quality = EarningsQuality::default();

        let (Some(income), Some(cash_flow)) =
            (self.statements.income_annual(), self.statements.cash_flow_annual())
        else {
            return quality;
        };

        let net_income = income.value(line_items::NET_INCOME, 0).filter(|ni| *ni > 0.0);
        let ocf = line_items::OPERATING_CASH_FLOW_ALIASES
            .iter()
            .find_map(|name| cash_flow.value(name, 0).filter(|v| *v != 0.0));

        let (Some(net_income), Some(ocf)) = (net_income, ocf) else {
            return quality;
        };

        let ratio = ocf / net_income;
        quality.metrics = QualityMetrics {
            cash_flow_to_earnings_ratio: Some(ratio),
            accruals_pct: Some((net_income - ocf) / net_income * 100.0),
        };

        let (score, assessment) = if ratio >= 1.2 {
            (90, "High Quality (strong cash backing)")
        } else if ratio >= 1.0 {
            (75, "Good Quality (cash flow matches earnings)")
        } else if ratio >= 0.8 {
            (50, "Fair Quality (moderate cash backing)")
        } else {
            (25, "Low Quality (weak cash flow)")
        };
        quality.score = Some(score);
        quality.assessment = Some(assessment.to_string());

        quality
    }
}

fn surprise_stats(surprises: &[EarningsSurprise]) -> Option<SurpriseStats> {
    let values: Vec<f64> = surprises.iter().filter_map(|s| s.surprise_pct).collect();
    if values.is_empty() {
        return None;
    }

    let positive = values.iter().filter(|v| **v > 0.0).count();
    Some(SurpriseStats {
        avg_surprise_pct: stats::mean(&values),
        positive_surprises: positive,
        negative_surprises: values.iter().filter(|v| **v < 0.0).count(),
        beat_rate: positive as f64 / values.len() as f64 * 100.0,
    })
}
