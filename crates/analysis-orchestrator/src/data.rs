use analysis_core::{
    AnalysisError, DividendSeries, EarningsData, FinancialStatements, PriceBar, PriceSeries,
    Result, TickerProfile,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

/// Caller-supplied model inputs; anything left `None` is estimated.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ValuationOverrides {
    pub fcf_growth_rate: Option<f64>,     // percent
    pub wacc: Option<f64>,                // percent
    pub dividend_growth_rate: Option<f64>, // percent
    pub required_return: Option<f64>,     // percent
}

/// Everything the market-data provider hands over for one ticker.
#[derive(Debug, Clone, Default)]
pub struct TickerData {
    pub ticker: String,
    pub profile: TickerProfile,
    pub prices: PriceSeries,
    pub benchmark: Option<PriceSeries>,
    pub statements: FinancialStatements,
    pub earnings: EarningsData,
    pub dividends: DividendSeries,
    pub overrides: ValuationOverrides,
}

#[derive(Deserialize)]
struct RawTickerData {
    ticker: String,
    #[serde(default)]
    profile: Option<Value>,
    #[serde(default)]
    prices: Vec<PriceBar>,
    #[serde(default)]
    benchmark: Option<Vec<PriceBar>>,
    #[serde(default)]
    statements: Option<Value>,
    #[serde(default)]
    earnings: EarningsData,
    #[serde(default)]
    dividends: Vec<RawDividend>,
    #[serde(default)]
    overrides: ValuationOverrides,
}

#[derive(Deserialize)]
struct RawDividend {
    date: NaiveDate,
    amount: f64,
}

impl TickerData {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Self::default()
        }
    }

    pub fn with_profile(mut self, profile: TickerProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_prices(mut self, prices: PriceSeries) -> Self {
        self.prices = prices;
        self
    }

    pub fn with_benchmark(mut self, benchmark: PriceSeries) -> Self {
        self.benchmark = Some(benchmark);
        self
    }

    pub fn with_statements(mut self, statements: FinancialStatements) -> Self {
        self.statements = statements;
        self
    }

    pub fn with_earnings(mut self, earnings: EarningsData) -> Self {
        self.earnings = earnings;
        self
    }

    pub fn with_dividends(mut self, dividends: DividendSeries) -> Self {
        self.dividends = dividends;
        self
    }

    pub fn with_overrides(mut self, overrides: ValuationOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Parse a provider bundle:
    ///
    /// ```json
    /// {
    ///   "ticker": "ACME",
    ///   "profile": {"marketCap": 1.2e9, "beta": 1.1},
    ///   "prices": [{"date": "2024-01-02", "open": 10, "high": 11, "low": 9, "close": 10.5}],
    ///   "benchmark": [...],
    ///   "statements": {"income_annual": {"Total Revenue": [1000, 900]}},
    ///   "earnings": {"history": [...], "upcoming": [...]},
    ///   "dividends": [{"date": "2024-03-01", "amount": 0.25}],
    ///   "overrides": {"wacc": 9.0}
    /// }
    /// ```
    ///
    /// Every section except `ticker` is optional. Malformed sections are errors.
    pub fn from_json(value: &Value) -> Result<Self> {
        let raw: RawTickerData = serde_json::from_value(value.clone())?;
        if raw.ticker.trim().is_empty() {
            return Err(AnalysisError::InvalidData("ticker must not be empty".to_string()));
        }

        let profile = match raw.profile {
            Some(v) => TickerProfile::from_json(&v)?,
            None => TickerProfile::default(),
        };
        let statements = match raw.statements {
            Some(v) => FinancialStatements::from_json(&v)?,
            None => FinancialStatements::default(),
        };
        let benchmark = raw.benchmark.map(PriceSeries::new).transpose()?;
        let dividends = DividendSeries::new(
            raw.dividends
                .into_iter()
                .map(|d| (d.date, d.amount))
                .collect(),
        )?;

        Ok(Self {
            ticker: raw.ticker,
            profile,
            prices: PriceSeries::new(raw.prices)?,
            benchmark,
            statements,
            earnings: raw.earnings,
            dividends,
            overrides: raw.overrides,
        })
    }

    /// True when the bundle carries nothing any engine could use.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
            && self.profile.is_empty()
            && self.statements.annual_tables_absent()
            && self.earnings.is_empty()
            && self.dividends.is_empty()
    }
}
