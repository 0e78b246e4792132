use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnMetrics {
    pub daily_mean: f64,
    pub daily_std: f64,
    pub daily_min: f64,
    pub daily_max: f64,
    pub cumulative_return: f64,
    pub annualized_return: f64,
    pub total_trading_days: usize,
    pub positive_days: usize,
    pub negative_days: usize,
    /// Fraction of days with a strictly positive return
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityMetrics {
    pub daily_volatility: f64,
    pub annualized_volatility: f64,
    /// Annualized std of negative daily returns only
    pub downside_deviation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_volatility_current: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_volatility_mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_volatility_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_volatility_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_volatility_std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownMetrics {
    /// Most negative peak-to-trough decline, as a fraction (-0.25 = 25% below peak)
    pub max_drawdown: f64,
    pub max_drawdown_date: Option<NaiveDate>,
    pub current_drawdown: f64,
    /// Consecutive trailing bars below the running peak
    pub days_since_peak: usize,
    /// Calendar days from the max-drawdown date back to the prior peak, if recovered
    pub recovery_days: Option<i64>,
    pub is_recovered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRisk {
    pub beta: f64,
    /// Annualized Jensen's alpha, as a fraction
    pub alpha: f64,
    pub correlation: Option<f64>,
    pub r_squared: Option<f64>,
    pub benchmark: String,
    pub aligned_observations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueAtRisk {
    pub confidence_level: f64,
    pub var_historical: f64,
    pub cvar_historical: f64,
    pub var_parametric: f64,
    pub worst_day: f64,
}

/// Summary of a rolling series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingStats {
    pub current: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
}

/// Everything `calculate_all_metrics` produces for one price series.
///
/// Grouped metrics that could not be computed are `None` and omitted from
/// JSON; the four headline ratios fall back to `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<ReturnMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<VolatilityMetrics>,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub information_ratio: f64,
    pub calmar_ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawdown: Option<DrawdownMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_risk: Option<MarketRisk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub var_95: Option<ValueAtRisk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub var_99: Option<ValueAtRisk>,
    /// Keyed `sharpe_{window}d` / `sortino_{window}d`
    #[serde(default)]
    pub rolling_ratios: BTreeMap<String, RollingStats>,
}

impl RiskReport {
    /// Names of grouped metrics that came back empty.
    pub fn missing_sections(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.returns.is_none() {
            missing.push("returns");
        }
        if self.volatility.is_none() {
            missing.push("volatility");
        }
        if self.drawdown.is_none() {
            missing.push("drawdown");
        }
        if self.market_risk.is_none() {
            missing.push("market_risk");
        }
        if self.var_95.is_none() {
            missing.push("var_95");
        }
        if self.var_99.is_none() {
            missing.push("var_99");
        }
        if self.rolling_ratios.is_empty() {
            missing.push("rolling_ratios");
        }
        missing
    }
}
