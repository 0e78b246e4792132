use analysis_core::{line_items, stats, FallbackChain, Sourced, ValueSource};

use crate::models::{DcfAssumptions, DcfParams, DcfValuation, ProjectedCashFlow};
use crate::ValuationAnalyzer;

/// Growth assumed when neither the caller nor the FCF history supplies one.
const DEFAULT_FCF_GROWTH: f64 = 5.0;

/// Annual FCF periods used for the historical growth estimate.
const FCF_GROWTH_PERIODS: usize = 3;

impl ValuationAnalyzer<'_> {
    /// Discounted cash flow valuation.
    ///
    /// Projects current free cash flow at the growth rate for
    /// `projection_years`, adds a Gordon Growth terminal value, bridges
    /// enterprise value to equity with net debt and divides by shares.
    /// Missing inputs and violated preconditions are reported in `error`.
    pub fn calculate_dcf_valuation(&self, params: &DcfParams) -> DcfValuation {
        let mut result = DcfValuation {
            intrinsic_value_per_share: None,
            current_price: self.current_price,
            currency: self.currency(),
            discount_premium_pct: None,
            fcf_current: None,
            growth_rate_used: None,
            terminal_growth_rate: params.terminal_growth_rate,
            wacc_used: None,
            enterprise_value: None,
            equity_value: None,
            shares_outstanding: None,
            projection_years: params.projection_years,
            projections: Vec::new(),
            assumptions: DcfAssumptions::default(),
            error: None,
        };

        let Some(cash_flow) = self.statements.cash_flow_annual() else {
            result.error = Some("No annual cash flow data available".to_string());
            return result;
        };

        let Some(fcf_current) = cash_flow.value(line_items::FREE_CASH_FLOW, 0) else {
            result.error = Some("Free Cash Flow not available".to_string());
            return result;
        };
        result.fcf_current = Some(fcf_current);

        if fcf_current <= 0.0 {
            result.error = Some("Negative or zero FCF - DCF not applicable".to_string());
            return result;
        }

        let growth = FallbackChain::new()
            .with(ValueSource::UserProvided, params.growth_rate)
            .then(ValueSource::HistoricalFcf, || self.estimate_fcf_growth_rate())
            .or_default(DEFAULT_FCF_GROWTH);
        result.growth_rate_used = Some(growth.value);
        result.assumptions.growth_rate_source = Some(growth.source);

        let wacc = FallbackChain::new()
            .with(ValueSource::UserProvided, params.wacc)
            .resolve()
            .unwrap_or_else(|| {
                Sourced::new(self.estimate_cost_of_equity(), ValueSource::EstimatedFromBeta)
            });
        result.wacc_used = Some(wacc.value);
        result.assumptions.wacc_source = Some(wacc.source);

        if wacc.value <= params.terminal_growth_rate {
            result.error = Some(format!(
                "WACC ({:.2}%) must exceed terminal growth ({:.2}%) for DCF calculation",
                wacc.value, params.terminal_growth_rate
            ));
            return result;
        }

        let g = growth.value / 100.0;
        let r = wacc.value / 100.0;
        let tg = params.terminal_growth_rate / 100.0;

        let years = params.projection_years;
        result.projections = (1..=years)
            .map(|year| {
                let fcf = fcf_current * (1.0 + g).powi(year as i32);
                ProjectedCashFlow {
                    year,
                    fcf,
                    present_value: fcf / (1.0 + r).powi(year as i32),
                }
            })
            .collect();

        let final_year_fcf = fcf_current * (1.0 + g).powi(years as i32);
        let terminal_value = final_year_fcf * (1.0 + tg) / (r - tg);
        let pv_terminal_value = terminal_value / (1.0 + r).powi(years as i32);
        let pv_projected_fcf: f64 = result.projections.iter().map(|p| p.present_value).sum();
        let enterprise_value = pv_projected_fcf + pv_terminal_value;

        result.assumptions.pv_projected_fcf = Some(pv_projected_fcf);
        result.assumptions.terminal_value = Some(terminal_value);
        result.assumptions.pv_terminal_value = Some(pv_terminal_value);
        result.enterprise_value = Some(enterprise_value);

        let cash = self.profile.positive("totalCash").unwrap_or(0.0);
        let debt = self.profile.positive("totalDebt").unwrap_or(0.0);
        let net_debt = debt - cash;
        let equity_value = enterprise_value - net_debt;
        result.assumptions.cash = Some(cash);
        result.assumptions.debt = Some(debt);
        result.assumptions.net_debt = Some(net_debt);
        result.equity_value = Some(equity_value);

        let Some((shares, from_market_cap)) = self.shares_outstanding() else {
            result.error = Some("Shares outstanding not available".to_string());
            return result;
        };
        result.shares_outstanding = Some(shares);
        result.assumptions.shares_calculated_from_market_cap = from_market_cap;

        let intrinsic = equity_value / shares;
        result.intrinsic_value_per_share = stats::finite(intrinsic);
        result.discount_premium_pct = self.discount_premium(intrinsic);

        result
    }

    /// CAGR of reported free cash flow over up to three annual periods.
    ///
    /// Uses the most recent and the oldest available period; the oldest must
    /// be positive.
    pub fn estimate_fcf_growth_rate(&self) -> Option<f64> {
        let cash_flow = self.statements.cash_flow_annual()?;
        let history: Vec<(usize, f64)> = (0..FCF_GROWTH_PERIODS)
            .filter_map(|p| cash_flow.value(line_items::FREE_CASH_FLOW, p).map(|v| (p, v)))
            .collect();

        if history.len() < 2 {
            return None;
        }
        let (newest_period, newest) = history[0];
        let (oldest_period, oldest) = history[history.len() - 1];
        stats::cagr(newest, oldest, (oldest_period - newest_period) as f64)
    }

    /// Share count from the profile, else market cap over the current price.
    /// The flag is true when the fallback was used.
    fn shares_outstanding(&self) -> Option<(f64, bool)> {
        if let Some(shares) = self
            .profile
            .first_positive(&["sharesOutstanding", "impliedSharesOutstanding"])
        {
            return Some((shares, false));
        }

        let market_cap = self.profile.positive("marketCap")?;
        let price = self.current_price.filter(|p| *p > 0.0)?;
        Some((market_cap / price, true))
    }
}
