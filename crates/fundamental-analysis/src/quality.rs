//! Altman Z-score and Piotroski F-score.

use analysis_core::statements::line_items;
use analysis_core::stats;

use crate::models::{
    AltmanComponents, AltmanZScore, AltmanZone, FScoreStrength, PiotroskiCriteria,
    PiotroskiFScore,
};
use crate::FundamentalAnalyzer;

/// Criteria that can actually be evaluated; share issuance never is.
pub const PIOTROSKI_MAX_SCORE: u8 = 8;

/// Compare a ratio across the two most recent periods.
fn increased(current: Option<f64>, prior: Option<f64>) -> Option<bool> {
    Some(current? > prior?)
}

impl FundamentalAnalyzer<'_> {
    /// `Z = 1.2*X1 + 1.4*X2 + 3.3*X3 + 0.6*X4 + 1.0*X5`.
    ///
    /// All eight inputs (current assets and liabilities, total assets, retained
    /// earnings, total liabilities, EBIT, revenue, market cap) must be present;
    /// otherwise no score is produced.
    pub fn calculate_altman_z_score(&self) -> Option<AltmanZScore> {
        let current_assets = self.balance(line_items::CURRENT_ASSETS, 0)?;
        let current_liabilities = self.balance(line_items::CURRENT_LIABILITIES, 0)?;
        let total_assets = self.balance(line_items::TOTAL_ASSETS, 0)?;
        let retained_earnings = self.balance(line_items::RETAINED_EARNINGS, 0)?;
        // Required input even though no ratio below uses it.
        self.balance(line_items::TOTAL_LIABILITIES, 0)?;
        let ebit = self.income(line_items::EBIT, 0)?;
        let revenue = self.income(line_items::TOTAL_REVENUE, 0)?;
        let market_cap = self.market_cap()?;

        let per_asset = |value: f64| stats::safe_divide(value, total_assets);
        let components = AltmanComponents {
            x1: per_asset(current_assets - current_liabilities)?,
            x2: per_asset(retained_earnings)?,
            x3: per_asset(ebit)?,
            x4: per_asset(market_cap)?,
            x5: per_asset(revenue)?,
        };

        let score = 1.2 * components.x1
            + 1.4 * components.x2
            + 3.3 * components.x3
            + 0.6 * components.x4
            + 1.0 * components.x5;

        Some(AltmanZScore {
            score,
            zone: AltmanZone::classify(score, self.config.z_score_safe, self.config.z_score_distress),
            components,
        })
    }

    /// Piotroski criteria over the two most recent fiscal years.
    ///
    /// Each test is evaluated only when its own inputs exist, so the score is a
    /// lower bound. `None` only when no annual statement was supplied at all.
    pub fn calculate_piotroski_f_score(&self) -> Option<PiotroskiFScore> {
        if self.statements.annual_tables_absent() {
            return None;
        }

        let net_income = |p: usize| self.income(line_items::NET_INCOME, p);
        let revenue = |p: usize| self.income(line_items::TOTAL_REVENUE, p);
        let total_assets = |p: usize| self.balance(line_items::TOTAL_ASSETS, p);

        let roa = |p: usize| -> Option<f64> { stats::safe_divide(net_income(p)?, total_assets(p)?) };
        let current_ratio = |p: usize| -> Option<f64> {
            stats::safe_divide(
                self.balance(line_items::CURRENT_ASSETS, p)?,
                self.balance(line_items::CURRENT_LIABILITIES, p)?,
            )
        };
        let gross_margin = |p: usize| -> Option<f64> {
            stats::safe_divide(self.income(line_items::GROSS_PROFIT, p)?, revenue(p)?)
        };
        let asset_turnover =
            |p: usize| -> Option<f64> { stats::safe_divide(revenue(p)?, total_assets(p)?) };

        let ocf = self.operating_cash_flow(0);
        let criteria = PiotroskiCriteria {
            positive_net_income: net_income(0).map(|ni| ni > 0.0),
            positive_operating_cash_flow: ocf.map(|cf| cf > 0.0),
            roa_increased: increased(roa(0), roa(1)),
            cash_flow_exceeds_net_income: increased(ocf, net_income(0)),
            long_term_debt_decreased: increased(
                self.balance(line_items::LONG_TERM_DEBT, 1),
                self.balance(line_items::LONG_TERM_DEBT, 0),
            ),
            current_ratio_increased: increased(current_ratio(0), current_ratio(1)),
            no_new_shares: None,
            gross_margin_increased: increased(gross_margin(0), gross_margin(1)),
            asset_turnover_increased: increased(asset_turnover(0), asset_turnover(1)),
        };

        let score = criteria.passed();
        Some(PiotroskiFScore {
            score,
            max_score: PIOTROSKI_MAX_SCORE,
            strength: FScoreStrength::classify(
                score,
                self.config.min_f_score_strong,
                self.config.min_f_score_average,
            ),
            criteria,
        })
    }
}
