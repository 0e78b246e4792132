//! Growth, margin, efficiency and DuPont ratios plus Altman / Piotroski
//! quality scores from annual financial statements.

pub mod models;
mod quality;

mod tests;

pub use models::*;

use analysis_core::statements::line_items::{self, OPERATING_CASH_FLOW_ALIASES};
use analysis_core::{stats, AnalysisConfig, FinancialStatements, PriceSeries, TickerProfile};

const DAYS_PER_YEAR: f64 = 365.0;

pub struct FundamentalAnalyzer<'a> {
    profile: &'a TickerProfile,
    statements: &'a FinancialStatements,
    prices: Option<&'a PriceSeries>,
    config: &'a AnalysisConfig,
}

impl<'a> FundamentalAnalyzer<'a> {
    pub fn new(
        profile: &'a TickerProfile,
        statements: &'a FinancialStatements,
        prices: Option<&'a PriceSeries>,
        config: &'a AnalysisConfig,
    ) -> Self {
        Self {
            profile,
            statements,
            prices,
            config,
        }
    }

    fn income(&self, name: &str, period: usize) -> Option<f64> {
        self.statements.income_annual()?.value(name, period)
    }

    fn balance(&self, name: &str, period: usize) -> Option<f64> {
        self.statements.balance_annual()?.value(name, period)
    }

    fn operating_cash_flow(&self, period: usize) -> Option<f64> {
        self.statements
            .cash_flow_annual()?
            .first_value(OPERATING_CASH_FLOW_ALIASES, period)
    }

    /// Operating cash flow plus capital expenditure (reported as a negative number).
    pub fn free_cash_flow(&self, period: usize) -> Option<f64> {
        let capex = self
            .statements
            .cash_flow_annual()?
            .value(line_items::CAPITAL_EXPENDITURE, period)?;
        Some(self.operating_cash_flow(period)? + capex)
    }

    /// Profile market cap, else shares outstanding at the last close.
    pub fn market_cap(&self) -> Option<f64> {
        if let Some(market_cap) = self.profile.positive("marketCap") {
            return Some(market_cap);
        }
        let shares = self.shares_outstanding()?;
        let price = self.prices?.last_close()?;
        tracing::debug!("Market cap derived from {} shares at last close {}", shares, price);
        Some(shares * price)
    }

    fn shares_outstanding(&self) -> Option<f64> {
        self.profile
            .first_positive(&["sharesOutstanding", "impliedSharesOutstanding"])
    }

    /// 1-year growth and 3-/5-year CAGR for revenue, net income and FCF.
    pub fn calculate_growth_rates(&self) -> GrowthRates {
        GrowthRates {
            revenue: growth_metrics(|p| self.income(line_items::TOTAL_REVENUE, p)),
            earnings: growth_metrics(|p| self.income(line_items::NET_INCOME, p)),
            fcf: growth_metrics(|p| self.free_cash_flow(p)),
        }
    }

    /// FCF with yield, per-share and margin views. `None` without current FCF.
    pub fn calculate_fcf_metrics(&self) -> Option<FcfMetrics> {
        let fcf = self.free_cash_flow(0)?;

        Some(FcfMetrics {
            fcf,
            fcf_yield: self
                .market_cap()
                .and_then(|cap| stats::safe_divide(fcf, cap))
                .map(|y| y * 100.0),
            fcf_per_share: self
                .shares_outstanding()
                .and_then(|shares| stats::safe_divide(fcf, shares)),
            fcf_margin: self
                .income(line_items::TOTAL_REVENUE, 0)
                .and_then(|revenue| stats::safe_divide(fcf, revenue))
                .map(|m| m * 100.0),
        })
    }

    fn net_margin(&self, period: usize) -> Option<f64> {
        let revenue = self.income(line_items::TOTAL_REVENUE, period)?;
        let net_income = self.income(line_items::NET_INCOME, period)?;
        stats::safe_divide(net_income, revenue).map(|m| m * 100.0)
    }

    /// Current margins in percent, plus the three-year net margin trend.
    ///
    /// Falls back to the profile's reported margins when the income statement
    /// yields none.
    pub fn calculate_margins(&self) -> Margins {
        let mut margins = Margins::default();

        if let Some(revenue) = self.income(line_items::TOTAL_REVENUE, 0) {
            let margin = |name: &str| {
                self.income(name, 0)
                    .and_then(|value| stats::safe_divide(value, revenue))
                    .map(|m| m * 100.0)
            };
            margins.current = CurrentMargins {
                gross_margin: margin(line_items::GROSS_PROFIT),
                operating_margin: margin(line_items::OPERATING_INCOME),
                ebitda_margin: margin(line_items::EBITDA),
                net_margin: margin(line_items::NET_INCOME),
            };
        }

        let trend = &mut margins.trend;
        trend.current = self.net_margin(0);
        trend.one_year_ago = self.net_margin(1);
        trend.two_years_ago = self.net_margin(2);
        trend.direction = match (trend.current, trend.one_year_ago) {
            (Some(now), Some(before)) if now > before => Some(MarginDirection::Improving),
            (Some(now), Some(before)) if now < before => Some(MarginDirection::Declining),
            (Some(_), Some(_)) => Some(MarginDirection::Stable),
            _ => None,
        };

        if margins.current.is_empty() {
            let reported = |keys: &[&str]| {
                keys.iter()
                    .find_map(|k| self.profile.non_zero(k))
                    .map(|m| m * 100.0)
            };
            margins.current.net_margin = reported(&["profitMargins", "profitMargin"]);
            margins.current.operating_margin = reported(&["operatingMargins", "operatingMargin"]);
        }

        margins
    }

    /// Asset, inventory, receivables and payables turnover with days outstanding
    /// and the cash conversion cycle.
    pub fn calculate_efficiency_ratios(&self) -> EfficiencyRatios {
        let mut efficiency = EfficiencyRatios::default();
        let (Some(income), Some(balance)) =
            (self.statements.income_annual(), self.statements.balance_annual())
        else {
            return efficiency;
        };

        let revenue = income.value(line_items::TOTAL_REVENUE, 0);
        let cogs = income.value(line_items::COST_OF_REVENUE, 0);

        let turnover = |flow: Option<f64>, stock: Option<f64>| -> Option<f64> {
            stats::safe_divide(flow?, stock?)
        };
        let days = |turnover: Option<f64>| turnover.and_then(|t| stats::safe_divide(DAYS_PER_YEAR, t));

        efficiency.asset_turnover = turnover(revenue, balance.value(line_items::TOTAL_ASSETS, 0));

        efficiency.inventory_turnover = turnover(cogs, balance.average(line_items::INVENTORY, 0));
        efficiency.days_inventory_outstanding = days(efficiency.inventory_turnover);

        efficiency.receivables_turnover =
            turnover(revenue, balance.average(line_items::ACCOUNTS_RECEIVABLE, 0));
        efficiency.days_sales_outstanding = days(efficiency.receivables_turnover);

        efficiency.payables_turnover =
            turnover(cogs, balance.average(line_items::ACCOUNTS_PAYABLE, 0));
        efficiency.days_payable_outstanding = days(efficiency.payables_turnover);

        if let (Some(dio), Some(dso), Some(dpo)) = (
            efficiency.days_inventory_outstanding,
            efficiency.days_sales_outstanding,
            efficiency.days_payable_outstanding,
        ) {
            efficiency.cash_conversion_cycle = Some(dio + dso - dpo);
        }

        efficiency
    }

    /// Three-factor ROE decomposition compared against the reported ROE.
    pub fn calculate_dupont_analysis(&self) -> DupontAnalysis {
        let mut dupont = DupontAnalysis::default();
        if self.statements.income_annual().is_none() || self.statements.balance_annual().is_none() {
            return dupont;
        }

        let net_income = self.income(line_items::NET_INCOME, 0);
        let revenue = self.income(line_items::TOTAL_REVENUE, 0);
        let total_assets = self.balance(line_items::TOTAL_ASSETS, 0);
        let equity = self.balance(line_items::STOCKHOLDERS_EQUITY, 0);

        let ratio = |n: Option<f64>, d: Option<f64>| -> Option<f64> { stats::safe_divide(n?, d?) };
        let net_margin = ratio(net_income, revenue);
        let asset_turnover = ratio(revenue, total_assets);
        let equity_multiplier = ratio(total_assets, equity);

        dupont.net_margin = net_margin.map(|m| m * 100.0);
        dupont.asset_turnover = asset_turnover;
        dupont.equity_multiplier = equity_multiplier;
        if let (Some(m), Some(t), Some(e)) = (net_margin, asset_turnover, equity_multiplier) {
            dupont.roe_calculated = Some(m * t * e * 100.0);
        }
        dupont.roe_reported = ["returnOnEquity", "roe"]
            .iter()
            .find_map(|k| self.profile.non_zero(k))
            .map(|r| r * 100.0);

        dupont
    }

    pub fn calculate_all(&self) -> FundamentalReport {
        let text = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| self.profile.text(k))
                .map(str::to_string)
        };

        FundamentalReport {
            ticker: text(&["symbol"]),
            company_name: text(&["longName", "shortName", "name"]),
            sector: text(&["sector"]),
            industry: text(&["industry"]),
            growth_rates: self.calculate_growth_rates(),
            fcf_metrics: self.calculate_fcf_metrics(),
            margins: self.calculate_margins(),
            efficiency: self.calculate_efficiency_ratios(),
            dupont: self.calculate_dupont_analysis(),
            quality_scores: QualityScores {
                altman_z: self.calculate_altman_z_score(),
                piotroski_f: self.calculate_piotroski_f_score(),
            },
        }
    }
}

fn growth_metrics(value: impl Fn(usize) -> Option<f64>) -> GrowthMetrics {
    let current = value(0);
    let versus = |period: usize, f: fn(f64, f64) -> Option<f64>| {
        current.zip(value(period)).and_then(|(now, then)| f(now, then))
    };

    GrowthMetrics {
        current,
        one_year: versus(1, stats::growth_rate),
        three_year_cagr: versus(3, |now, then| stats::cagr(now, then, 3.0)),
        five_year_cagr: versus(5, |now, then| stats::cagr(now, then, 5.0)),
    }
}

/// Fundamental report for one ticker. `prices` is only used to derive market
/// capitalization when the profile lacks it.
pub fn analyze_fundamentals(
    profile: &TickerProfile,
    statements: &FinancialStatements,
    prices: Option<&PriceSeries>,
    config: &AnalysisConfig,
) -> FundamentalReport {
    FundamentalAnalyzer::new(profile, statements, prices, config).calculate_all()
}
