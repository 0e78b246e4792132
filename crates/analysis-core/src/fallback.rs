//! Ordered "try this, else that, else a default" lookups that remember which
//! step produced the value.

use serde::{Deserialize, Serialize};

/// Where an assumption came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    UserProvided,
    HistoricalFcf,
    HistoricalDividends,
    EstimatedFromBeta,
    Default,
}

impl ValueSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueSource::UserProvided => "user_provided",
            ValueSource::HistoricalFcf => "historical_fcf",
            ValueSource::HistoricalDividends => "historical_dividends",
            ValueSource::EstimatedFromBeta => "estimated_from_beta",
            ValueSource::Default => "default",
        }
    }
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value tagged with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Sourced<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Lazily evaluated chain of candidate sources; the first step yielding a value wins.
///
/// ```
/// use analysis_core::fallback::{FallbackChain, ValueSource};
///
/// let growth = FallbackChain::new()
///     .then(ValueSource::UserProvided, || None)
///     .then(ValueSource::HistoricalFcf, || Some(7.5))
///     .or_default(5.0);
/// assert_eq!(growth.value, 7.5);
/// assert_eq!(growth.source, ValueSource::HistoricalFcf);
/// ```
pub struct FallbackChain<'a, T> {
    steps: Vec<(ValueSource, Box<dyn FnOnce() -> Option<T> + 'a>)>,
}

impl<'a, T> Default for FallbackChain<'a, T> {
    fn default() -> Self {
        Self { steps: Vec::new() }
    }
}

impl<'a, T> FallbackChain<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-known optional value, typically a caller override.
    pub fn with(self, source: ValueSource, value: Option<T>) -> Self
    where
        T: 'a,
    {
        self.then(source, move || value)
    }

    pub fn then<F>(mut self, source: ValueSource, step: F) -> Self
    where
        F: FnOnce() -> Option<T> + 'a,
    {
        self.steps.push((source, Box::new(step)));
        self
    }

    /// First successful step, or `None` when every step came up empty.
    pub fn resolve(self) -> Option<Sourced<T>> {
        for (source, step) in self.steps {
            if let Some(value) = step() {
                tracing::debug!("Resolved assumption from {}", source);
                return Some(Sourced::new(value, source));
            }
        }
        None
    }

    pub fn or_default(self, value: T) -> Sourced<T> {
        self.resolve()
            .unwrap_or_else(|| Sourced::new(value, ValueSource::Default))
    }
}
