use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AnalysisError, Result};

/// Line-item names as they appear in provider statement tables.
pub mod line_items {
    pub const TOTAL_REVENUE: &str = "Total Revenue";
    pub const COST_OF_REVENUE: &str = "Cost Of Revenue";
    pub const GROSS_PROFIT: &str = "Gross Profit";
    pub const OPERATING_INCOME: &str = "Operating Income";
    pub const EBITDA: &str = "EBITDA";
    pub const EBIT: &str = "EBIT";
    pub const NET_INCOME: &str = "Net Income";
    pub const DILUTED_EPS: &str = "Diluted EPS";
    pub const BASIC_EPS: &str = "Basic EPS";

    pub const TOTAL_ASSETS: &str = "Total Assets";
    pub const CURRENT_ASSETS: &str = "Current Assets";
    pub const CURRENT_LIABILITIES: &str = "Current Liabilities";
    pub const TOTAL_LIABILITIES: &str = "Total Liabilities Net Minority Interest";
    pub const STOCKHOLDERS_EQUITY: &str = "Stockholders Equity";
    pub const RETAINED_EARNINGS: &str = "Retained Earnings";
    pub const LONG_TERM_DEBT: &str = "Long Term Debt";
    pub const INVENTORY: &str = "Inventory";
    pub const ACCOUNTS_RECEIVABLE: &str = "Accounts Receivable";
    pub const ACCOUNTS_PAYABLE: &str = "Accounts Payable";

    pub const FREE_CASH_FLOW: &str = "Free Cash Flow";
    pub const OPERATING_CASH_FLOW: &str = "Operating Cash Flow";
    pub const CAPITAL_EXPENDITURE: &str = "Capital Expenditure";

    /// Names different providers use for operating cash flow, in lookup order.
    pub const OPERATING_CASH_FLOW_ALIASES: &[&str] = &[
        "Operating Cash Flow",
        "Cash From Operating Activities",
        "Cash Flowsfromusedin Operating Activities Direct",
        "Total Cash From Operating Activities",
        "Net Cash Provided By Operating Activities",
    ];
}

/// One statement table: line item name to period values, most recent period first.
///
/// A missing row means "not reported", and a `None` cell means the provider
/// had no value for that period. Neither is ever read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementTable {
    rows: BTreeMap<String, Vec<Option<f64>>>,
}

impl StatementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style row insertion. Non-finite cells are stored as missing.
    pub fn with_row<I>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        self.insert_row(name, values);
        self
    }

    pub fn insert_row<I>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let cleaned = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        self.rows.insert(name.to_string(), cleaned);
    }

    /// Parse `{"Line Item": [v0, v1, ...], ...}`.
    ///
    /// Cells may be numbers or `null`; any other shape is rejected.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            AnalysisError::InvalidData("statement table must be a JSON object".to_string())
        })?;

        let mut table = Self::new();
        for (name, cells) in object {
            let cells = cells.as_array().ok_or_else(|| {
                AnalysisError::InvalidData(format!("line item '{name}' must be an array of periods"))
            })?;
            let mut values = Vec::with_capacity(cells.len());
            for cell in cells {
                match cell {
                    Value::Null => values.push(None),
                    Value::Number(n) => values.push(n.as_f64()),
                    other => {
                        return Err(AnalysisError::InvalidData(format!(
                            "line item '{name}' has non-numeric cell {other}"
                        )))
                    }
                }
            }
            table.insert_row(name, values);
        }
        Ok(table)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_row(&self, name: &str) -> bool {
        self.rows.contains_key(name)
    }

    pub fn row(&self, name: &str) -> Option<&[Option<f64>]> {
        self.rows.get(name).map(Vec::as_slice)
    }

    /// Value of `name` at `period` (0 = most recent).
    pub fn value(&self, name: &str, period: usize) -> Option<f64> {
        self.rows.get(name)?.get(period).copied().flatten()
    }

    /// First line item in `names` that has a value at `period`.
    pub fn first_value(&self, names: &[&str], period: usize) -> Option<f64> {
        names.iter().find_map(|name| self.value(name, period))
    }

    /// Number of period columns in the widest row.
    pub fn period_count(&self) -> usize {
        self.rows.values().map(Vec::len).max().unwrap_or(0)
    }

    /// Mean of `name` over periods `period` and `period + 1`; both must be present.
    pub fn average(&self, name: &str, period: usize) -> Option<f64> {
        let current = self.value(name, period)?;
        let prior = self.value(name, period + 1)?;
        Some((current + prior) / 2.0)
    }
}

/// The six statement tables a provider may supply for one ticker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialStatements {
    #[serde(default)]
    pub income_quarterly: Option<StatementTable>,
    #[serde(default)]
    pub income_annual: Option<StatementTable>,
    #[serde(default)]
    pub balance_quarterly: Option<StatementTable>,
    #[serde(default)]
    pub balance_annual: Option<StatementTable>,
    #[serde(default)]
    pub cash_flow_quarterly: Option<StatementTable>,
    #[serde(default)]
    pub cash_flow_annual: Option<StatementTable>,
}

impl FinancialStatements {
    const TABLE_KEYS: [&'static str; 6] = [
        "income_quarterly",
        "income_annual",
        "balance_quarterly",
        "balance_annual",
        "cash_flow_quarterly",
        "cash_flow_annual",
    ];

    /// Parse `{"income_annual": {...}, "balance_annual": {...}, ...}`.
    ///
    /// Absent or `null` tables stay `None`; unknown keys and malformed tables are errors.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            AnalysisError::InvalidData("financial statements must be a JSON object".to_string())
        })?;

        if let Some(unknown) = object.keys().find(|k| !Self::TABLE_KEYS.contains(&k.as_str())) {
            return Err(AnalysisError::InvalidData(format!(
                "unknown statement table '{unknown}'"
            )));
        }

        let table = |key: &str| -> Result<Option<StatementTable>> {
            match object.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(v) => StatementTable::from_json(v).map(Some),
            }
        };

        Ok(Self {
            income_quarterly: table("income_quarterly")?,
            income_annual: table("income_annual")?,
            balance_quarterly: table("balance_quarterly")?,
            balance_annual: table("balance_annual")?,
            cash_flow_quarterly: table("cash_flow_quarterly")?,
            cash_flow_annual: table("cash_flow_annual")?,
        })
    }

    pub fn income_annual(&self) -> Option<&StatementTable> {
        self.income_annual.as_ref()
    }

    pub fn balance_annual(&self) -> Option<&StatementTable> {
        self.balance_annual.as_ref()
    }

    pub fn cash_flow_annual(&self) -> Option<&StatementTable> {
        self.cash_flow_annual.as_ref()
    }

    /// True when none of the three annual tables was supplied.
    pub fn annual_tables_absent(&self) -> bool {
        self.income_annual.is_none() && self.balance_annual.is_none() && self.cash_flow_annual.is_none()
    }
}
