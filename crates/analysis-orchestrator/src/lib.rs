//! Runs the risk, valuation and fundamental engines for one ticker or a batch,
//! and reports which sections could not be computed.

mod data;


pub use data::{TickerData, ValuationOverrides};

use std::path::Path;

use analysis_core::{AnalysisConfig, AnalysisError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use fundamental_analysis::{FundamentalAnalyzer, FundamentalReport};
use rayon::prelude::*;
use risk_analysis::{RiskMetricsEngine, RiskReport};
use serde::Serialize;
use valuation_analysis::{DcfParams, DdmParams, ValuationAnalyzer, ValuationReport};

/// Combined engine output for one ticker.
#[derive(Debug, Clone, Serialize)]
pub struct TickerAnalysis {
    pub ticker: String,
    pub analyzed_at: DateTime<Utc>,
    /// Reference date for trailing dividends and upcoming earnings
    pub as_of: NaiveDate,
    pub risk: RiskReport,
    pub valuation: ValuationReport,
    pub fundamentals: FundamentalReport,
}

impl TickerAnalysis {
    /// Sections that came back empty or with an error, as `engine.section` or
    /// `engine.section: reason`.
    pub fn data_gaps(&self) -> Vec<String> {
        let mut gaps: Vec<String> = self
            .risk
            .missing_sections()
            .into_iter()
            .map(|s| format!("risk.{s}"))
            .collect();

        let valuation = &self.valuation;
        if let Some(err) = &valuation.dcf_valuation.error {
            gaps.push(format!("valuation.dcf_valuation: {err}"));
        }
        if let Some(err) = &valuation.ddm_valuation.error {
            gaps.push(format!("valuation.ddm_valuation: {err}"));
        }
        let earnings = &valuation.earnings_analysis;
        if earnings.current_eps.is_none()
            && earnings.eps_growth_1y.is_none()
            && earnings.recent_surprises.is_empty()
        {
            gaps.push("valuation.earnings_analysis".to_string());
        }

        gaps.extend(
            self.fundamentals
                .missing_sections()
                .into_iter()
                .map(|s| format!("fundamentals.{s}")),
        );
        gaps
    }
}

pub struct AnalysisOrchestrator {
    config: AnalysisConfig,
}

impl AnalysisOrchestrator {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Configuration from `ANALYSIS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(AnalysisConfig::from_env()?))
    }

    /// Configuration from a JSON file; a missing file means defaults.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(AnalysisConfig::load_from_file(path)?))
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run all three engines for one ticker.
    ///
    /// Sections that cannot be computed degrade independently and are logged;
    /// only a bundle with no usable input at all is an error.
    pub fn analyze(&self, data: &TickerData) -> Result<TickerAnalysis> {
        if data.is_empty() {
            tracing::warn!("No market data supplied for {}", data.ticker);
            return Err(AnalysisError::InsufficientData(format!(
                "no market data supplied for {}",
                data.ticker
            )));
        }

        tracing::info!(
            "Starting analysis for {} ({} price bars, benchmark: {})",
            data.ticker,
            data.prices.len(),
            data.benchmark.is_some()
        );

        let risk = RiskMetricsEngine::new(&self.config)
            .calculate_all_metrics(&data.prices, data.benchmark.as_ref());

        let valuation_analyzer = ValuationAnalyzer::new(
            &data.ticker,
            &data.profile,
            &data.prices,
            &data.statements,
            &data.earnings,
            &data.dividends,
            &self.config,
        );
        let dcf = DcfParams {
            growth_rate: data.overrides.fcf_growth_rate,
            wacc: data.overrides.wacc,
            ..DcfParams::from_config(&self.config)
        };
        let ddm = DdmParams {
            growth_rate: data.overrides.dividend_growth_rate,
            required_return: data.overrides.required_return,
        };
        let valuation = valuation_analyzer.analyze_with(&dcf, &ddm);

        let prices = (!data.prices.is_empty()).then_some(&data.prices);
        let fundamentals =
            FundamentalAnalyzer::new(&data.profile, &data.statements, prices, &self.config)
                .calculate_all();

        let analysis = TickerAnalysis {
            ticker: data.ticker.clone(),
            analyzed_at: Utc::now(),
            as_of: valuation_analyzer.as_of(),
            risk,
            valuation,
            fundamentals,
        };

        let gaps = analysis.data_gaps();
        for gap in &gaps {
            tracing::warn!("{}: {} unavailable", data.ticker, gap);
        }
        tracing::info!(
            "Analysis complete for {} ({} sections unavailable)",
            data.ticker,
            gaps.len()
        );

        Ok(analysis)
    }

    /// Analyze many tickers on the rayon thread pool. Results keep input order.
    pub fn analyze_batch(&self, batch: &[TickerData]) -> Vec<Result<TickerAnalysis>> {
        tracing::info!("Analyzing batch of {} tickers", batch.len());

        let results: Vec<Result<TickerAnalysis>> =
            batch.par_iter().map(|data| self.analyze(data)).collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            tracing::warn!("{} of {} tickers could not be analyzed", failed, batch.len());
        }
        results
    }
}

impl Default for AnalysisOrchestrator {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
