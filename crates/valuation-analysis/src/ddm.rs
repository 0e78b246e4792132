use analysis_core::{stats, FallbackChain, Sourced, ValueSource};

use crate::dividends::{dividend_growth_rate, ttm_dividend};
use crate::models::{DdmAssumptions, DdmParams, DdmValuation};
use crate::ValuationAnalyzer;

const DEFAULT_DIVIDEND_GROWTH: f64 = 3.0;

impl ValuationAnalyzer<'_> {
    /// Gordon Growth Model: `V = D1 / (r - g)` with `D1 = TTM dividend * (1 + g)`.
    pub fn calculate_ddm_valuation(&self, params: &DdmParams) -> DdmValuation {
        let mut result = DdmValuation {
            intrinsic_value_per_share: None,
            current_price: self.current_price,
            currency: self.currency(),
            discount_premium_pct: None,
            current_dividend: None,
            next_dividend_estimate: None,
            growth_rate_used: None,
            required_return_used: None,
            model: "Gordon Growth Model".to_string(),
            assumptions: DdmAssumptions::default(),
            error: None,
        };

        if self.dividends.is_empty() {
            result.error = Some("No dividend history available".to_string());
            return result;
        }
        if self.dividends.total() <= 0.0 {
            result.error = Some("Stock does not pay dividends - DDM not applicable".to_string());
            return result;
        }

        let ttm = ttm_dividend(self.dividends, self.as_of);
        if ttm <= 0.0 {
            result.error = Some("No dividends paid in trailing 12 months".to_string());
            return result;
        }
        result.current_dividend = Some(ttm);

        let growth = FallbackChain::new()
            .with(ValueSource::UserProvided, params.growth_rate)
            .then(ValueSource::HistoricalDividends, || dividend_growth_rate(self.dividends))
            .or_default(DEFAULT_DIVIDEND_GROWTH);
        result.growth_rate_used = Some(growth.value);
        result.assumptions.growth_rate_source = Some(growth.source);

        let required = FallbackChain::new()
            .with(ValueSource::UserProvided, params.required_return)
            .resolve()
            .unwrap_or_else(|| {
                Sourced::new(self.estimate_cost_of_equity(), ValueSource::EstimatedFromBeta)
            });
        result.required_return_used = Some(required.value);
        result.assumptions.required_return_source = Some(required.source);

        if required.value <= growth.value {
            result.error = Some(format!(
                "Required return ({:.2}%) must exceed dividend growth ({:.2}%) for DDM calculation",
                required.value, growth.value
            ));
            return result;
        }

        let next_dividend = ttm * (1.0 + growth.value / 100.0);
        result.next_dividend_estimate = Some(next_dividend);

        let intrinsic = next_dividend / ((required.value - growth.value) / 100.0);
        result.intrinsic_value_per_share = stats::finite(intrinsic);
        result.discount_premium_pct = self.discount_premium(intrinsic);

        result
    }
}
