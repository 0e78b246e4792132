//! Return, volatility, drawdown, benchmark-relative and tail-risk statistics
//! for a daily price series.

pub mod models;


pub use models::*;

use std::collections::BTreeMap;

use analysis_core::stats::{self, TRADING_DAYS_PER_YEAR};
use analysis_core::{AnalysisConfig, PriceSeries};
use chrono::NaiveDate;

/// Drawdowns shallower than this (0.1%) still count as "at the peak".
const RECOVERED_THRESHOLD: f64 = -0.001;

pub struct RiskMetricsEngine {
    risk_free_rate: f64,
    benchmark_ticker: String,
    rolling_windows: Vec<usize>,
    volatility_window: Option<usize>,
}

impl RiskMetricsEngine {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            risk_free_rate: config.risk_free_rate,
            benchmark_ticker: config.benchmark_ticker.clone(),
            rolling_windows: config.rolling_windows.clone(),
            volatility_window: config.volatility_window,
        }
    }

    /// Override the annual risk-free rate (percent) for this engine only.
    pub fn with_risk_free_rate(mut self, annual_pct: f64) -> Self {
        self.risk_free_rate = annual_pct;
        self
    }

    fn daily_risk_free(&self) -> f64 {
        stats::annual_rate_to_daily(self.risk_free_rate)
    }

    /// Return distribution, cumulative and annualized performance.
    pub fn calculate_returns(&self, prices: &PriceSeries) -> Option<ReturnMetrics> {
        let returns = stats::daily_returns(&prices.closes());
        if returns.is_empty() {
            return None;
        }

        let cumulative_return = returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0;
        let trading_days = returns.len();
        let years = trading_days as f64 / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 {
            stats::finite((1.0 + cumulative_return).powf(1.0 / years) - 1.0).unwrap_or(0.0)
        } else {
            0.0
        };

        let positive_days = returns.iter().filter(|r| **r > 0.0).count();
        let negative_days = returns.iter().filter(|r| **r < 0.0).count();

        Some(ReturnMetrics {
            daily_mean: stats::mean(&returns),
            daily_std: stats::std_dev(&returns),
            daily_min: stats::min(&returns)?,
            daily_max: stats::max(&returns)?,
            cumulative_return,
            annualized_return,
            total_trading_days: trading_days,
            positive_days,
            negative_days,
            win_rate: positive_days as f64 / trading_days as f64,
        })
    }

    /// Full-period volatility, downside deviation and an optional rolling summary.
    pub fn calculate_volatility(
        &self,
        prices: &PriceSeries,
        window: Option<usize>,
    ) -> Option<VolatilityMetrics> {
        let returns = stats::daily_returns(&prices.closes());
        if returns.is_empty() {
            return None;
        }

        let daily_volatility = stats::std_dev(&returns);
        let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        let downside_deviation = if downside.is_empty() {
            0.0
        } else {
            stats::annualize_volatility(stats::std_dev(&downside))
        };

        let mut metrics = VolatilityMetrics {
            daily_volatility,
            annualized_volatility: stats::annualize_volatility(daily_volatility),
            downside_deviation,
            rolling_volatility_current: None,
            rolling_volatility_mean: None,
            rolling_volatility_min: None,
            rolling_volatility_max: None,
            rolling_volatility_std: None,
        };

        if let Some(w) = window.filter(|w| *w >= 2 && returns.len() >= *w) {
            let rolling: Vec<f64> = returns
                .windows(w)
                .map(|slice| stats::annualize_volatility(stats::std_dev(slice)))
                .collect();
            if let Some(summary) = summarize(&rolling) {
                metrics.rolling_volatility_current = Some(summary.current);
                metrics.rolling_volatility_mean = Some(summary.mean);
                metrics.rolling_volatility_min = Some(summary.min);
                metrics.rolling_volatility_max = Some(summary.max);
                metrics.rolling_volatility_std = Some(summary.std);
            }
        }

        Some(metrics)
    }

    pub fn calculate_sharpe_ratio(&self, prices: &PriceSeries) -> f64 {
        let returns = stats::daily_returns(&prices.closes());
        sharpe_ratio(&returns, self.daily_risk_free())
    }

    pub fn calculate_sortino_ratio(&self, prices: &PriceSeries) -> f64 {
        let returns = stats::daily_returns(&prices.closes());
        sortino_ratio(&returns, self.daily_risk_free())
    }

    /// Annualized active return over tracking error, on dates both series traded.
    pub fn calculate_information_ratio(
        &self,
        prices: &PriceSeries,
        benchmark: Option<&PriceSeries>,
    ) -> f64 {
        let Some(benchmark) = benchmark else {
            return 0.0;
        };

        let (stock, bench) = align_returns(prices, benchmark);
        if stock.len() < 2 {
            return 0.0;
        }

        let active: Vec<f64> = stock.iter().zip(&bench).map(|(s, b)| s - b).collect();
        let tracking_error = stats::std_dev(&active);
        if tracking_error == 0.0 {
            return 0.0;
        }

        stats::finite(stats::mean(&active) / tracking_error * TRADING_DAYS_PER_YEAR.sqrt())
            .unwrap_or(0.0)
    }

    pub fn calculate_calmar_ratio(&self, prices: &PriceSeries) -> f64 {
        let (Some(returns), Some(drawdown)) =
            (self.calculate_returns(prices), self.calculate_drawdown(prices))
        else {
            return 0.0;
        };

        let max_drawdown = drawdown.max_drawdown.abs();
        if max_drawdown == 0.0 {
            return 0.0;
        }
        returns.annualized_return / max_drawdown
    }

    pub fn calculate_drawdown(&self, prices: &PriceSeries) -> Option<DrawdownMetrics> {
        let closes = prices.closes();
        let dates = prices.dates();
        if closes.is_empty() {
            return None;
        }

        let mut running_max = Vec::with_capacity(closes.len());
        let mut peak = f64::MIN;
        for &price in &closes {
            peak = peak.max(price);
            running_max.push(peak);
        }

        let drawdowns: Vec<f64> = closes
            .iter()
            .zip(&running_max)
            .map(|(price, peak)| (price - peak) / peak)
            .collect();

        // First occurrence of the deepest drawdown.
        let mut max_idx = 0;
        for (i, dd) in drawdowns.iter().enumerate() {
            if *dd < drawdowns[max_idx] {
                max_idx = i;
            }
        }

        let current_drawdown = *drawdowns.last()?;

        let days_since_peak = closes
            .iter()
            .zip(&running_max)
            .rev()
            .take_while(|(price, peak)| price < peak)
            .count();

        let peak_before = running_max[max_idx];
        let recovery_days = (max_idx..closes.len())
            .find(|&i| closes[i] >= peak_before)
            .map(|i| calendar_days(dates[max_idx], dates[i]));

        Some(DrawdownMetrics {
            max_drawdown: drawdowns[max_idx],
            max_drawdown_date: Some(dates[max_idx]),
            current_drawdown,
            days_since_peak,
            recovery_days,
            is_recovered: current_drawdown >= RECOVERED_THRESHOLD,
        })
    }

    /// Beta of daily returns against the benchmark; `0.0` when undefined.
    pub fn calculate_beta(&self, prices: &PriceSeries, benchmark: &PriceSeries) -> f64 {
        let (stock, bench) = align_returns(prices, benchmark);
        beta(&stock, &bench)
    }

    /// Beta, annualized alpha, correlation and R² against a caller-supplied benchmark.
    pub fn calculate_beta_alpha(
        &self,
        prices: &PriceSeries,
        benchmark: Option<&PriceSeries>,
    ) -> Option<MarketRisk> {
        let benchmark = benchmark?;
        let (stock, bench) = align_returns(prices, benchmark);
        if stock.len() < 2 {
            return None;
        }

        let beta = beta(&stock, &bench);
        let stock_annual = stats::mean(&stock) * TRADING_DAYS_PER_YEAR;
        let bench_annual = stats::mean(&bench) * TRADING_DAYS_PER_YEAR;
        let rf = self.risk_free_rate / 100.0;
        let alpha = stock_annual - (rf + beta * (bench_annual - rf));
        let correlation = stats::correlation(&stock, &bench);

        Some(MarketRisk {
            beta,
            alpha,
            correlation,
            r_squared: correlation.map(|c| c * c),
            benchmark: self.benchmark_ticker.clone(),
            aligned_observations: stock.len(),
        })
    }

    /// Historical and parametric one-day VaR/CVaR at `confidence_level` (e.g. 0.95).
    pub fn calculate_var(&self, prices: &PriceSeries, confidence_level: f64) -> Option<ValueAtRisk> {
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return None;
        }

        let returns = stats::daily_returns(&prices.closes());
        if returns.is_empty() {
            return None;
        }

        let tail_probability = 1.0 - confidence_level;
        let var_historical = stats::percentile(&returns, tail_probability * 100.0)?;

        let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= var_historical).collect();
        let cvar_historical = if tail.is_empty() {
            var_historical
        } else {
            stats::mean(&tail)
        };

        let z = stats::inverse_normal_cdf(tail_probability)?.abs();
        let var_parametric = stats::mean(&returns) - z * stats::std_dev(&returns);

        Some(ValueAtRisk {
            confidence_level,
            var_historical,
            cvar_historical,
            var_parametric,
            worst_day: stats::min(&returns)?,
        })
    }

    /// Rolling Sharpe and Sortino summaries for each window that fits the series.
    pub fn calculate_rolling_ratios(
        &self,
        prices: &PriceSeries,
        windows: &[usize],
    ) -> BTreeMap<String, RollingStats> {
        let daily_rf = self.daily_risk_free();
        let excess: Vec<f64> = stats::daily_returns(&prices.closes())
            .into_iter()
            .map(|r| r - daily_rf)
            .collect();

        let annualizer = TRADING_DAYS_PER_YEAR.sqrt();
        let mut results = BTreeMap::new();

        for &window in windows {
            if window < 2 || excess.len() < window {
                continue;
            }

            let mut sharpe_series = Vec::new();
            let mut sortino_series = Vec::new();
            for slice in excess.windows(window) {
                let mean = stats::mean(slice);

                let sd = stats::std_dev(slice);
                if sd > 0.0 {
                    sharpe_series.push(mean / sd * annualizer);
                }

                let downside: Vec<f64> = slice.iter().copied().filter(|r| *r < 0.0).collect();
                let downside_sd = stats::std_dev(&downside);
                if downside_sd > 0.0 {
                    sortino_series.push(mean / downside_sd * annualizer);
                }
            }

            if let Some(summary) = summarize(&sharpe_series) {
                results.insert(format!("sharpe_{window}d"), summary);
            }
            if let Some(summary) = summarize(&sortino_series) {
                results.insert(format!("sortino_{window}d"), summary);
            }
        }

        results
    }

    /// Every metric above in one report. A failing sub-metric never affects its siblings.
    pub fn calculate_all_metrics(
        &self,
        prices: &PriceSeries,
        benchmark: Option<&PriceSeries>,
    ) -> RiskReport {
        RiskReport {
            returns: self.calculate_returns(prices),
            volatility: self.calculate_volatility(prices, self.volatility_window),
            sharpe_ratio: self.calculate_sharpe_ratio(prices),
            sortino_ratio: self.calculate_sortino_ratio(prices),
            information_ratio: self.calculate_information_ratio(prices, benchmark),
            calmar_ratio: self.calculate_calmar_ratio(prices),
            drawdown: self.calculate_drawdown(prices),
            market_risk: self.calculate_beta_alpha(prices, benchmark),
            var_95: self.calculate_var(prices, 0.95),
            var_99: self.calculate_var(prices, 0.99),
            rolling_ratios: self.calculate_rolling_ratios(prices, &self.rolling_windows),
        }
    }
}

impl Default for RiskMetricsEngine {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

/// Risk report for one price series, optionally against a benchmark.
pub fn compute_risk_metrics(
    prices: &PriceSeries,
    benchmark: Option<&PriceSeries>,
    config: &AnalysisConfig,
) -> RiskReport {
    RiskMetricsEngine::new(config).calculate_all_metrics(prices, benchmark)
}

/// Annualized Sharpe ratio of daily returns over a daily hurdle. `0.0` when undefined.
pub fn sharpe_ratio(returns: &[f64], daily_rf: f64) -> f64 {
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();
    let sd = stats::std_dev(&excess);
    if sd == 0.0 {
        return 0.0;
    }
    stats::finite(stats::mean(&excess) / sd * TRADING_DAYS_PER_YEAR.sqrt()).unwrap_or(0.0)
}

/// Annualized Sortino ratio; the denominator only sees negative excess returns.
pub fn sortino_ratio(returns: &[f64], daily_rf: f64) -> f64 {
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();
    let downside: Vec<f64> = excess.iter().copied().filter(|r| *r < 0.0).collect();
    let downside_sd = stats::std_dev(&downside);
    if downside_sd == 0.0 {
        return 0.0;
    }
    stats::finite(stats::mean(&excess) / downside_sd * TRADING_DAYS_PER_YEAR.sqrt()).unwrap_or(0.0)
}

fn beta(stock: &[f64], bench: &[f64]) -> f64 {
    if stock.len() < 2 {
        return 0.0;
    }
    let bench_variance = stats::variance(bench);
    if bench_variance == 0.0 {
        return 0.0;
    }
    stats::finite(stats::covariance(stock, bench) / bench_variance).unwrap_or(0.0)
}

/// Daily returns of both series restricted to the dates present in both.
fn align_returns(prices: &PriceSeries, benchmark: &PriceSeries) -> (Vec<f64>, Vec<f64>) {
    let bench: BTreeMap<NaiveDate, f64> = benchmark.dated_returns().into_iter().collect();
    prices
        .dated_returns()
        .into_iter()
        .filter_map(|(date, r)| bench.get(&date).map(|b| (r, *b)))
        .unzip()
}

fn calendar_days(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

fn summarize(series: &[f64]) -> Option<RollingStats> {
    Some(RollingStats {
        current: *series.last()?,
        mean: stats::mean(series),
        min: stats::min(series)?,
        max: stats::max(series)?,
        std: stats::std_dev(series),
    })
}
