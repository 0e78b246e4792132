use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AnalysisError, Result};

/// Flat scalar fundamentals for one ticker (market cap, beta, payout ratio, ...).
///
/// Providers disagree on key style, so every lookup accepts either the
/// camelCase or the snake_case spelling of a field. Numeric fields are finite
/// or absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickerProfile {
    #[serde(default)]
    numbers: BTreeMap<String, f64>,
    #[serde(default)]
    text: BTreeMap<String, String>,
}

impl TickerProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_number(mut self, key: &str, value: f64) -> Self {
        self.insert_number(key, value);
        self
    }

    pub fn with_text(mut self, key: &str, value: &str) -> Self {
        self.text.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty() && self.text.is_empty()
    }

    /// Non-finite values are dropped rather than stored.
    pub fn insert_number(&mut self, key: &str, value: f64) {
        if value.is_finite() {
            self.numbers.insert(key.to_string(), value);
        }
    }

    /// Parse a flat JSON object. Numbers and strings are kept, nested values ignored.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            AnalysisError::InvalidData("ticker profile must be a JSON object".to_string())
        })?;

        let mut profile = Self::new();
        for (key, v) in object {
            match v {
                Value::Number(n) => {
                    if let Some(x) = n.as_f64() {
                        profile.insert_number(key, x);
                    }
                }
                Value::String(s) => {
                    profile.text.insert(key.clone(), s.clone());
                }
                _ => {}
            }
        }
        Ok(profile)
    }

    /// Numeric field by name in either key style.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.numbers
            .get(key)
            .or_else(|| self.numbers.get(&to_snake_case(key)))
            .or_else(|| self.numbers.get(&to_camel_case(key)))
            .copied()
    }

    /// Numeric field, kept only when strictly positive.
    pub fn positive(&self, key: &str) -> Option<f64> {
        self.number(key).filter(|v| *v > 0.0)
    }

    /// First key in `keys` holding a strictly positive value.
    pub fn first_positive(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|k| self.positive(k))
    }

    /// Numeric field, kept only when non-zero.
    pub fn non_zero(&self, key: &str) -> Option<f64> {
        self.number(key).filter(|v| *v != 0.0)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.text
            .get(key)
            .or_else(|| self.text.get(&to_snake_case(key)))
            .or_else(|| self.text.get(&to_camel_case(key)))
            .map(String::as_str)
    }

    pub fn currency(&self) -> &str {
        self.text("currency").unwrap_or("USD")
    }

    /// Quoted price, if the provider supplied one.
    pub fn current_price(&self) -> Option<f64> {
        self.first_positive(&["currentPrice", "regularMarketPrice"])
    }
}

fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for c in key.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
