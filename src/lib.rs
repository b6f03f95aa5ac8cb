//! # frontier-rs
//!
//! $$
//! \max_{\mathbf w \in \Delta^{n-1}} \frac{\mathbf w^\top \mu - r_f}{\sqrt{\mathbf w^\top \Sigma \mathbf w}}
//! \quad\text{approximated by sampling } \Delta^{n-1}
//! $$
//!
//! Portfolio return statistics and a Monte Carlo sample of the efficient frontier.
//!
//! ```ignore
//! use frontier_rs::quant::portfolio::{CsvPriceSource, FrontierConfig, FrontierEngine};
//!
//! let engine = FrontierEngine::new(FrontierConfig::default().with_seed(42));
//! let run = engine.run_from_source(&CsvPriceSource::new("close_prices.csv"), &["AAPL", "MSFT"])?;
//! let (trial, best) = run.results.max_sharpe().unwrap();
//! ```

pub mod error;
pub mod quant;
pub mod traits;
pub mod visualization;

pub use error::FrontierError;
pub use error::Result;
