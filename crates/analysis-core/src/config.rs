use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

use crate::error::{AnalysisError, Result};

/// Thresholds and market assumptions injected into every engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // Market assumptions
    pub risk_free_rate: f64,              // annual, percent (4.0 = 4%)
    pub benchmark_ticker: String,         // label reported with beta/alpha
    pub rolling_windows: Vec<usize>,      // rolling Sharpe/Sortino windows, trading days
    pub volatility_window: Option<usize>, // optional rolling volatility window

    // Technical bands (carried for downstream consumers)
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,

    // Quality score bands
    pub z_score_safe: f64,        // Altman Z above this is Safe
    pub z_score_distress: f64,    // Altman Z below this is Distress
    pub min_f_score_strong: u8,   // Piotroski F at or above this is Strong
    pub min_f_score_average: u8,  // Piotroski F at or above this is Average

    // Valuation defaults
    pub capm_risk_free_rate: f64,   // percent, base of the CAPM proxy
    pub market_risk_premium: f64,   // percent, multiplied by beta
    pub terminal_growth_rate: f64,  // percent
    pub projection_years: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 4.0,
            benchmark_ticker: "^GSPC".to_string(),
            rolling_windows: vec![30, 60, 90],
            volatility_window: None,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            z_score_safe: 2.99,
            z_score_distress: 1.81,
            min_f_score_strong: 8,
            min_f_score_average: 5,
            capm_risk_free_rate: 4.0,
            market_risk_premium: 8.0,
            terminal_growth_rate: 2.5,
            projection_years: 5,
        }
    }
}

impl AnalysisConfig {
    /// Load a JSON config file. A missing file yields the defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::info!("Loaded analysis config from {}", path.display());
        Ok(config)
    }

    /// Same as [`load_from_file`](Self::load_from_file) but logs and falls back to
    /// defaults when the file is unreadable or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load_from_file(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config from {}: {}. Using defaults", path.display(), e);
            Self::default()
        })
    }

    /// Defaults overridden by `ANALYSIS_*` environment variables (`.env` is honored).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            risk_free_rate: env_or("ANALYSIS_RISK_FREE_RATE", defaults.risk_free_rate)?,
            benchmark_ticker: env::var("ANALYSIS_BENCHMARK_TICKER")
                .unwrap_or_else(|_| defaults.benchmark_ticker.clone()),
            rolling_windows: match env::var("ANALYSIS_ROLLING_WINDOWS") {
                Ok(raw) => parse_windows(&raw)?,
                Err(_) => defaults.rolling_windows.clone(),
            },
            z_score_safe: env_or("ANALYSIS_Z_SCORE_SAFE", defaults.z_score_safe)?,
            z_score_distress: env_or("ANALYSIS_Z_SCORE_DISTRESS", defaults.z_score_distress)?,
            min_f_score_strong: env_or("ANALYSIS_MIN_F_SCORE_STRONG", defaults.min_f_score_strong)?,
            min_f_score_average: env_or("ANALYSIS_MIN_F_SCORE_AVERAGE", defaults.min_f_score_average)?,
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.risk_free_rate.is_finite() {
            return Err(AnalysisError::Config("risk_free_rate must be finite".to_string()));
        }
        if let Some(w) = self.rolling_windows.iter().find(|w| **w < 2) {
            return Err(AnalysisError::Config(format!(
                "rolling window {w} is too short (minimum 2)"
            )));
        }
        if self.z_score_distress >= self.z_score_safe {
            return Err(AnalysisError::Config(format!(
                "z_score_distress ({}) must be below z_score_safe ({})",
                self.z_score_distress, self.z_score_safe
            )));
        }
        if self.min_f_score_average > self.min_f_score_strong || self.min_f_score_strong > 9 {
            return Err(AnalysisError::Config(format!(
                "invalid F-score bands: average {} / strong {}",
                self.min_f_score_average, self.min_f_score_strong
            )));
        }
        if self.projection_years == 0 {
            return Err(AnalysisError::Config("projection_years must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AnalysisError::Config(format!("{key}={raw}: {e}"))),
        Err(_) => Ok(default),
    }
}

fn parse_windows(raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|e| AnalysisError::Config(format!("ANALYSIS_ROLLING_WINDOWS entry '{s}': {e}")))
        })
        .collect()
}
