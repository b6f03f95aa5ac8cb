//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Return statistics of a ticker selection and Monte Carlo sampling of the
//! long-only, fully invested portfolios they span.

pub mod data;
pub mod engine;
pub mod evaluator;
pub mod loader;
pub mod sampler;
pub mod statistics;
pub mod types;

pub use data::PriceSeries;
pub use data::simple_returns;
pub use engine::FrontierConfig;
pub use engine::FrontierEngine;
pub use engine::FrontierRun;
pub use engine::FrontierSimulator;
pub use evaluator::evaluate;
pub use evaluator::portfolio_return;
pub use evaluator::portfolio_variance;
pub use loader::CsvPriceSource;
pub use sampler::WeightSampler;
pub use sampler::WeightScheme;
pub use sampler::trial_seed;
pub use statistics::ReturnStatistics;
pub use statistics::TRADING_DAYS;
pub use statistics::check_selection;
pub use statistics::compute_statistics;
pub use types::FrontierResultSet;
pub use types::SimulatedPortfolio;
