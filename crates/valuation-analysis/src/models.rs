use analysis_core::{AnalysisConfig, ValueSource};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Caller overrides for the DCF model. `None` means "estimate it".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfParams {
    pub growth_rate: Option<f64>,    // percent
    pub wacc: Option<f64>,           // percent
    pub terminal_growth_rate: f64,   // percent
    pub projection_years: u32,
}

impl DcfParams {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            growth_rate: None,
            wacc: None,
            terminal_growth_rate: config.terminal_growth_rate,
            projection_years: config.projection_years,
        }
    }
}

impl Default for DcfParams {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

/// Caller overrides for the dividend discount model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DdmParams {
    pub growth_rate: Option<f64>,     // percent
    pub required_return: Option<f64>, // percent
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedCashFlow {
    pub year: u32,
    pub fcf: f64,
    pub present_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DcfAssumptions {
    pub growth_rate_source: Option<ValueSource>,
    pub wacc_source: Option<ValueSource>,
    pub pv_projected_fcf: Option<f64>,
    pub terminal_value: Option<f64>,
    pub pv_terminal_value: Option<f64>,
    pub cash: Option<f64>,
    pub debt: Option<f64>,
    pub net_debt: Option<f64>,
    pub shares_calculated_from_market_cap: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfValuation {
    pub intrinsic_value_per_share: Option<f64>,
    pub current_price: Option<f64>,
    pub currency: String,
    /// `(price - intrinsic) / intrinsic * 100`; negative means undervalued
    pub discount_premium_pct: Option<f64>,
    pub fcf_current: Option<f64>,
    pub growth_rate_used: Option<f64>,
    pub terminal_growth_rate: f64,
    pub wacc_used: Option<f64>,
    pub enterprise_value: Option<f64>,
    pub equity_value: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub projection_years: u32,
    pub projections: Vec<ProjectedCashFlow>,
    pub assumptions: DcfAssumptions,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DdmAssumptions {
    pub growth_rate_source: Option<ValueSource>,
    pub required_return_source: Option<ValueSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DdmValuation {
    pub intrinsic_value_per_share: Option<f64>,
    pub current_price: Option<f64>,
    pub currency: String,
    pub discount_premium_pct: Option<f64>,
    /// Trailing twelve-month dividend per share
    pub current_dividend: Option<f64>,
    pub next_dividend_estimate: Option<f64>,
    pub growth_rate_used: Option<f64>,
    pub required_return_used: Option<f64>,
    pub model: String,
    pub assumptions: DdmAssumptions,
    pub error: Option<String>,
}

/// Payment cadence inferred from the median gap between ex-dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DividendFrequency {
    Annual,
    SemiAnnual,
    Quarterly,
    Monthly,
    Irregular,
    Unknown,
}

impl DividendFrequency {
    /// Payments that make up one year at this cadence.
    pub fn payments_per_year(&self) -> Option<usize> {
        match self {
            DividendFrequency::Annual => Some(1),
            DividendFrequency::SemiAnnual => Some(2),
            DividendFrequency::Quarterly => Some(4),
            DividendFrequency::Monthly => Some(12),
            DividendFrequency::Irregular | DividendFrequency::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SustainabilityRating {
    Excellent,
    Good,
    Fair,
    Poor,
    #[serde(rename = "High Risk")]
    HighRisk,
}

impl SustainabilityRating {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => SustainabilityRating::Excellent,
            60..=79 => SustainabilityRating::Good,
            40..=59 => SustainabilityRating::Fair,
            20..=39 => SustainabilityRating::Poor,
            _ => SustainabilityRating::HighRisk,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DividendAnalysis {
    pub pays_dividends: bool,
    pub dividend_yield: Option<f64>,   // percent
    pub annual_dividend: Option<f64>,  // TTM, per share
    pub payout_ratio: Option<f64>,     // percent
    pub dividend_growth_rate: Option<f64>,
    pub dividend_coverage_ratio: Option<f64>,
    pub consecutive_years: Option<u32>,
    pub latest_ex_dividend_date: Option<NaiveDate>,
    pub frequency: Option<DividendFrequency>,
    pub sustainability_score: Option<u32>,
    pub sustainability_rating: Option<SustainabilityRating>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsSurprise {
    pub quarter: String,
    pub eps_actual: Option<f64>,
    pub eps_estimate: Option<f64>,
    pub surprise_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurpriseStats {
    pub avg_surprise_pct: f64,
    pub positive_surprises: usize,
    pub negative_surprises: usize,
    pub beat_rate: f64, // percent of quarters with a positive surprise
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EarningsTrend {
    #[serde(rename = "Strong Growth")]
    StrongGrowth,
    #[serde(rename = "Moderate Growth")]
    ModerateGrowth,
    #[serde(rename = "Slight Decline")]
    SlightDecline,
    Declining,
}

impl EarningsTrend {
    pub fn from_growth(eps_growth_1y: f64) -> Self {
        if eps_growth_1y > 10.0 {
            EarningsTrend::StrongGrowth
        } else if eps_growth_1y > 0.0 {
            EarningsTrend::ModerateGrowth
        } else if eps_growth_1y > -10.0 {
            EarningsTrend::SlightDecline
        } else {
            EarningsTrend::Declining
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub cash_flow_to_earnings_ratio: Option<f64>,
    pub accruals_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EarningsQuality {
    pub assessment: Option<String>,
    pub score: Option<u32>,
    pub metrics: QualityMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EarningsAnalysis {
    pub current_eps: Option<f64>,
    pub forward_eps: Option<f64>,
    pub eps_growth_1y: Option<f64>,
    pub eps_growth_3y_cagr: Option<f64>,
    pub next_earnings_date: Option<NaiveDate>,
    pub next_earnings_estimate: Option<f64>,
    pub recent_surprises: Vec<EarningsSurprise>,
    pub surprise_stats: Option<SurpriseStats>,
    pub earnings_quality: EarningsQuality,
    pub trend: Option<EarningsTrend>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationReport {
    pub ticker: String,
    pub dcf_valuation: DcfValuation,
    pub ddm_valuation: DdmValuation,
    pub dividend_analysis: DividendAnalysis,
    pub earnings_analysis: EarningsAnalysis,
}
