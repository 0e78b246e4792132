//! Intrinsic value (DCF, Gordon Growth DDM) plus dividend and earnings quality analysis.

mod dcf;
mod ddm;
pub mod dividends;
mod earnings;
pub mod models;


pub use models::*;

use analysis_core::{
    stats, AnalysisConfig, DividendSeries, EarningsData, FinancialStatements, PriceSeries,
    TickerProfile,
};
use chrono::{NaiveDate, Utc};

/// Valuation inputs for a single ticker.
///
/// Holds borrowed, read-only views of the provider tables; every method is a
/// pure function of those inputs plus the injected configuration.
pub struct ValuationAnalyzer<'a> {
    ticker: &'a str,
    profile: &'a TickerProfile,
    statements: &'a FinancialStatements,
    earnings: &'a EarningsData,
    dividends: &'a DividendSeries,
    config: &'a AnalysisConfig,
    current_price: Option<f64>,
    as_of: NaiveDate,
}

impl<'a> ValuationAnalyzer<'a> {
    pub fn new(
        ticker: &'a str,
        profile: &'a TickerProfile,
        prices: &'a PriceSeries,
        statements: &'a FinancialStatements,
        earnings: &'a EarningsData,
        dividends: &'a DividendSeries,
        config: &'a AnalysisConfig,
    ) -> Self {
        let current_price = profile.current_price().or_else(|| prices.last_close());
        let as_of = prices
            .last()
            .map(|bar| bar.date)
            .unwrap_or_else(|| Utc::now().date_naive());

        Self {
            ticker,
            profile,
            statements,
            earnings,
            dividends,
            config,
            current_price,
            as_of,
        }
    }

    /// Reference date for the trailing dividend window and "upcoming" earnings.
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = as_of;
        self
    }

    pub fn ticker(&self) -> &str {
        self.ticker
    }

    pub fn current_price(&self) -> Option<f64> {
        self.current_price
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    fn currency(&self) -> String {
        self.profile.currency().to_string()
    }

    /// CAPM proxy used for both WACC and the DDM required return, in percent.
    pub fn estimate_cost_of_equity(&self) -> f64 {
        let beta = self.profile.positive("beta").unwrap_or(1.0);
        self.config.capm_risk_free_rate + beta * self.config.market_risk_premium
    }

    /// `(price - intrinsic) / intrinsic * 100` when both sides are usable.
    fn discount_premium(&self, intrinsic: f64) -> Option<f64> {
        let price = self.current_price.filter(|p| *p > 0.0)?;
        stats::safe_divide(price - intrinsic, intrinsic).map(|r| r * 100.0)
    }

    /// DCF, DDM, dividend and earnings analysis with default parameters.
    ///
    /// Each section is computed independently; a failure in one is reported in
    /// that section only.
    pub fn analyze(&self) -> ValuationReport {
        self.analyze_with(&DcfParams::from_config(self.config), &DdmParams::default())
    }

    /// Same as [`analyze`](Self::analyze) with caller-supplied model parameters.
    pub fn analyze_with(&self, dcf: &DcfParams, ddm: &DdmParams) -> ValuationReport {
        let dcf_valuation = self.calculate_dcf_valuation(dcf);
        if let Some(err) = &dcf_valuation.error {
            tracing::debug!("DCF skipped for {}: {}", self.ticker, err);
        }
        let ddm_valuation = self.calculate_ddm_valuation(ddm);
        if let Some(err) = &ddm_valuation.error {
            tracing::debug!("DDM skipped for {}: {}", self.ticker, err);
        }

        ValuationReport {
            ticker: self.ticker.to_string(),
            dcf_valuation,
            ddm_valuation,
            dividend_analysis: self.analyze_dividends(),
            earnings_analysis: self.analyze_earnings(),
        }
    }
}

/// Full valuation report for one ticker.
pub fn analyze_valuation(
    ticker: &str,
    profile: &TickerProfile,
    prices: &PriceSeries,
    statements: &FinancialStatements,
    earnings: &EarningsData,
    dividends: &DividendSeries,
    config: &AnalysisConfig,
) -> ValuationReport {
    ValuationAnalyzer::new(ticker, profile, prices, statements, earnings, dividends, config).analyze()
}
