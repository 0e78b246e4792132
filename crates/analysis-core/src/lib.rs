//! Shared data model, statistics and configuration for the ticker analysis engines.

pub mod config;
pub mod error;
pub mod fallback;
pub mod profile;
pub mod statements;
pub mod stats;
pub mod types;

pub use config::AnalysisConfig;
pub use error::*;
pub use fallback::{FallbackChain, Sourced, ValueSource};
pub use profile::TickerProfile;
pub use statements::{line_items, FinancialStatements, StatementTable};
pub use types::*;
