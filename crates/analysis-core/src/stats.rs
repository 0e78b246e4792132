//! Numeric building blocks shared by the risk, valuation and fundamental engines.
//!
//! Every helper here is total: degenerate input (empty slices, zero
//! denominators, non-finite operands) yields `0.0` or `None` according to the
//! documented convention of each function, never a panic or a NaN.

use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;

/// Trading days per year used for every annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Standard deviations below this are treated as exactly zero, so a constant
/// return series (rounding noise around 1e-18) reads as zero variance.
pub const ZERO_VARIANCE_EPSILON: f64 = 1e-12;

/// Keep a value only if it is a finite float.
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// `numerator / denominator`, or `None` for a zero, missing or non-finite result.
pub fn safe_divide(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    finite(numerator / denominator)
}

/// Simple percentage change between consecutive closes.
///
/// Produces `closes.len() - 1` values; empty for fewer than two closes.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    if closes.len() < 2 {
        return Vec::new();
    }

    closes
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

pub fn annualize_volatility(daily_std: f64) -> f64 {
    daily_std * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Convert an annual rate expressed in percent (e.g. `4.0`) to a per-trading-day hurdle.
pub fn annual_rate_to_daily(annual_pct: f64) -> f64 {
    (1.0 + annual_pct / 100.0).powf(1.0 / TRADING_DAYS_PER_YEAR) - 1.0
}

/// Compound annual growth rate, in percent.
///
/// `None` when `beginning <= 0`, `periods <= 0`, or the result is not a real number.
pub fn cagr(ending: f64, beginning: f64, periods: f64) -> Option<f64> {
    if !ending.is_finite() || !beginning.is_finite() || beginning <= 0.0 || periods <= 0.0 {
        return None;
    }
    finite(((ending / beginning).powf(1.0 / periods) - 1.0) * 100.0)
}

/// Simple growth `(current - prior) / |prior|`, in percent. `None` when `prior` is zero.
pub fn growth_rate(current: f64, prior: f64) -> Option<f64> {
    safe_divide(current - prior, prior.abs()).map(|g| g * 100.0)
}

/// Arithmetic mean, `0.0` for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.mean()
}

/// Sample standard deviation, `0.0` for fewer than two values or zero variance.
pub fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let sd = data.std_dev();
    if !sd.is_finite() || sd < ZERO_VARIANCE_EPSILON {
        return 0.0;
    }
    sd
}

/// Sample variance, `0.0` for fewer than two values.
pub fn variance(data: &[f64]) -> f64 {
    let sd = std_dev(data);
    sd * sd
}

/// Sample covariance of two equally long slices, `0.0` when undefined.
pub fn covariance(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }
    let cov = x.covariance(y);
    if cov.is_finite() {
        cov
    } else {
        0.0
    }
}

/// Pearson correlation, `None` when either side has zero variance.
pub fn correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    let sx = std_dev(x);
    let sy = std_dev(y);
    if sx == 0.0 || sy == 0.0 {
        return None;
    }
    finite(covariance(x, y) / (sx * sy))
}

/// `q`-th percentile (0..=100) with linear interpolation between closest ranks.
pub fn percentile(data: &[f64], q: f64) -> Option<f64> {
    if data.is_empty() || !(0.0..=100.0).contains(&q) {
        return None;
    }

    let mut sorted: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Exact inverse of the standard normal CDF for `p` in `(0, 1)`.
pub fn inverse_normal_cdf(p: f64) -> Option<f64> {
    if !(p > 0.0 && p < 1.0) {
        return None;
    }
    let normal = Normal::new(0.0, 1.0).ok()?;
    finite(normal.inverse_cdf(p))
}

pub fn min(data: &[f64]) -> Option<f64> {
    data.iter().copied().reduce(f64::min)
}

pub fn max(data: &[f64]) -> Option<f64> {
    data.iter().copied().reduce(f64::max)
}
