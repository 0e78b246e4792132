use serde::{Deserialize, Serialize};

/// Year-over-year growth and compound growth for one line item, in percent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthMetrics {
    /// Most recent annual value
    pub current: Option<f64>,
    #[serde(rename = "1y")]
    pub one_year: Option<f64>,
    #[serde(rename = "3y_cagr")]
    pub three_year_cagr: Option<f64>,
    #[serde(rename = "5y_cagr")]
    pub five_year_cagr: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthRates {
    pub revenue: GrowthMetrics,
    pub earnings: GrowthMetrics,
    /// Operating cash flow plus (negative) capital expenditure
    pub fcf: GrowthMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FcfMetrics {
    pub fcf: f64,
    /// Percent of market capitalization
    pub fcf_yield: Option<f64>,
    pub fcf_per_share: Option<f64>,
    /// Percent of revenue
    pub fcf_margin: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentMargins {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_margin: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_margin: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebitda_margin: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_margin: Option<f64>,
}

impl CurrentMargins {
    pub fn is_empty(&self) -> bool {
        self.gross_margin.is_none()
            && self.operating_margin.is_none()
            && self.ebitda_margin.is_none()
            && self.net_margin.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarginDirection {
    Improving,
    Declining,
    Stable,
}

/// Net margin over the three most recent fiscal years.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarginTrend {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<f64>,
    #[serde(rename = "1y_ago", default, skip_serializing_if = "Option::is_none")]
    pub one_year_ago: Option<f64>,
    #[serde(rename = "2y_ago", default, skip_serializing_if = "Option::is_none")]
    pub two_years_ago: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<MarginDirection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub current: CurrentMargins,
    pub trend: MarginTrend,
}

/// Turnover ratios and days outstanding. Ratios with a zero or missing
/// denominator are left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyRatios {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_turnover: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_turnover: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_inventory_outstanding: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receivables_turnover: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_sales_outstanding: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payables_turnover: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_payable_outstanding: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_conversion_cycle: Option<f64>,
}

impl EfficiencyRatios {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// ROE = net margin x asset turnover x equity multiplier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DupontAnalysis {
    /// Percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_margin: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_turnover: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equity_multiplier: Option<f64>,
    /// Percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roe_calculated: Option<f64>,
    /// Percent, from the ticker profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roe_reported: Option<f64>,
}

impl DupontAnalysis {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AltmanZone {
    Safe,
    Grey,
    Distress,
}

impl AltmanZone {
    pub fn classify(z_score: f64, safe: f64, distress: f64) -> Self {
        if z_score > safe {
            AltmanZone::Safe
        } else if z_score > distress {
            AltmanZone::Grey
        } else {
            AltmanZone::Distress
        }
    }
}

/// The five weighted ratios behind the Z-score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltmanComponents {
    /// Working capital / total assets
    pub x1: f64,
    /// Retained earnings / total assets
    pub x2: f64,
    /// EBIT / total assets
    pub x3: f64,
    /// Market cap / total assets
    pub x4: f64,
    /// Revenue / total assets
    pub x5: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltmanZScore {
    pub score: f64,
    pub zone: AltmanZone,
    pub components: AltmanComponents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FScoreStrength {
    Strong,
    Average,
    Weak,
}

impl FScoreStrength {
    pub fn classify(score: u8, min_strong: u8, min_average: u8) -> Self {
        if score >= min_strong {
            FScoreStrength::Strong
        } else if score >= min_average {
            FScoreStrength::Average
        } else {
            FScoreStrength::Weak
        }
    }
}

/// Outcome of each Piotroski test. `None` means the inputs were not available
/// and the point was withheld.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PiotroskiCriteria {
    pub positive_net_income: Option<bool>,
    pub positive_operating_cash_flow: Option<bool>,
    pub roa_increased: Option<bool>,
    pub cash_flow_exceeds_net_income: Option<bool>,
    pub long_term_debt_decreased: Option<bool>,
    pub current_ratio_increased: Option<bool>,
    /// Never evaluated: historical share counts are not part of the inputs.
    pub no_new_shares: Option<bool>,
    pub gross_margin_increased: Option<bool>,
    pub asset_turnover_increased: Option<bool>,
}

impl PiotroskiCriteria {
    pub fn passed(&self) -> u8 {
        [
            self.positive_net_income,
            self.positive_operating_cash_flow,
            self.roa_increased,
            self.cash_flow_exceeds_net_income,
            self.long_term_debt_decreased,
            self.current_ratio_increased,
            self.no_new_shares,
            self.gross_margin_increased,
            self.asset_turnover_increased,
        ]
        .iter()
        .filter(|c| **c == Some(true))
        .count() as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiotroskiFScore {
    /// Lower bound: unavailable criteria contribute nothing
    pub score: u8,
    pub max_score: u8,
    pub strength: FScoreStrength,
    pub criteria: PiotroskiCriteria,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    pub altman_z: Option<AltmanZScore>,
    pub piotroski_f: Option<PiotroskiFScore>,
}

/// Everything `calculate_all` produces for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    pub growth_rates: GrowthRates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcf_metrics: Option<FcfMetrics>,
    pub margins: Margins,
    pub efficiency: EfficiencyRatios,
    pub dupont: DupontAnalysis,
    pub quality_scores: QualityScores,
}

impl FundamentalReport {
    /// Names of grouped metrics that came back empty.
    pub fn missing_sections(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.growth_rates == GrowthRates::default() {
            missing.push("growth_rates");
        }
        if self.fcf_metrics.is_none() {
            missing.push("fcf_metrics");
        }
        if self.margins.current.is_empty() {
            missing.push("margins");
        }
        if self.efficiency.is_empty() {
            missing.push("efficiency");
        }
        if self.dupont.is_empty() {
            missing.push("dupont");
        }
        if self.quality_scores.altman_z.is_none() {
            missing.push("altman_z");
        }
        if self.quality_scores.piotroski_f.is_none() {
            missing.push("piotroski_f");
        }
        missing
    }
}
