//! # Errors
//!
//! $$
//! \text{run} : (\text{prices}, \text{selection}) \to \text{FrontierRun} \;\cup\; \text{FrontierError}
//! $$
//!
//! Fatal conditions of a frontier run. Non-fatal conditions (a zero-sum weight
//! draw, an undefined Sharpe ratio) are not errors: the first is logged and
//! resampled, the second is carried on the record as `None`.

use thiserror::Error;

/// Error type shared by the statistics, sampling and simulation layers.
#[derive(Error, Debug)]
pub enum FrontierError {
  #[error("at least {required} tickers must be selected, got {selected}")]
  InsufficientSelection { selected: usize, required: usize },

  #[error("not enough return observations: {observations} available, {required} required")]
  InsufficientData { observations: usize, required: usize },

  #[error("unknown ticker: {0}")]
  UnknownTicker(String),

  #[error("missing column: {0}")]
  MissingColumn(String),

  #[error("ticker selected more than once: {0}")]
  DuplicateTicker(String),

  #[error("invalid price {value} for {ticker} at row {row}")]
  InvalidPrice {
    ticker: String,
    row: usize,
    value: f64,
  },

  #[error("non-finite return for {ticker} at row {row}")]
  NonFiniteReturn { ticker: String, row: usize },

  #[error("non-finite {statistic} for {ticker}")]
  NonFiniteStatistic {
    ticker: String,
    statistic: &'static str,
  },

  #[error("non-finite portfolio: volatility {volatility}, expected return {expected_return}")]
  NonFinitePortfolio {
    volatility: f64,
    expected_return: f64,
  },

  #[error("dimension mismatch: expected {expected}, found {found}")]
  DimensionMismatch { expected: usize, found: usize },

  #[error("weight draw summed to zero after {attempts} attempts")]
  DegenerateSample { attempts: usize },

  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("run cancelled after {completed} trials")]
  Cancelled { completed: usize },

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("date parsing error: {0}")]
  DateParse(#[from] chrono::ParseError),
}

/// Result alias for frontier operations.
pub type Result<T> = std::result::Result<T, FrontierError>;
