//! # Return Statistics
//!
//! $$
//! \mu = k\,\bar r,\qquad \Sigma = \frac{k}{T-1}\sum_{t=1}^{T}(r_t-\bar r)(r_t-\bar r)^\top
//! $$
//!
//! Annualized mean-return vector and covariance matrix of a ticker selection.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;
use ndarray_stats::CorrelationExt;
use tracing::debug;
use tracing::instrument;

use super::data::PriceSeries;
use super::data::simple_returns;
use crate::error::FrontierError;
use crate::error::Result;

/// Trading periods per year.
pub const TRADING_DAYS: f64 = 252.0;

/// Smallest selection for which a frontier is meaningful.
pub const MIN_SELECTION: usize = 2;

/// Smallest number of return rows accepted after differencing.
pub const MIN_OBSERVATIONS: usize = 2;

/// Annualized return statistics of an ordered ticker selection.
///
/// Entry `i` of `mean` and row/column `i` of `cov` belong to `tickers[i]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnStatistics {
  /// Selected tickers, in selection order.
  pub tickers: Vec<String>,
  /// Annualized mean simple return per asset.
  pub mean: Array1<f64>,
  /// Annualized sample covariance matrix (exactly symmetric).
  pub cov: Array2<f64>,
  /// Number of return rows the estimates were computed from.
  pub observations: usize,
}

impl ReturnStatistics {
  /// Number of assets.
  pub fn asset_count(&self) -> usize {
    self.mean.len()
  }

  /// Position of `ticker` in the selection.
  pub fn position(&self, ticker: &str) -> Option<usize> {
    self.tickers.iter().position(|t| t == ticker)
  }

  /// Annualized per-asset volatility, `sqrt(diag(cov))`.
  pub fn volatilities(&self) -> Array1<f64> {
    self.cov.diag().mapv(|v| v.max(0.0).sqrt())
  }

  /// Correlation matrix implied by `cov`. Zero-variance assets get zero correlation.
  pub fn correlation(&self) -> Array2<f64> {
    let n = self.asset_count();
    let sd = self.volatilities();

    Array2::from_shape_fn((n, n), |(i, j)| {
      let denom = sd[i] * sd[j];
      if i == j {
        1.0
      } else if denom > 1e-15 {
        (self.cov[[i, j]] / denom).clamp(-1.0, 1.0)
      } else {
        0.0
      }
    })
  }
}

/// Reject selections too small to span a frontier.
pub fn check_selection<S: AsRef<str>>(tickers: &[S]) -> Result<()> {
  if tickers.len() < MIN_SELECTION {
    return Err(FrontierError::InsufficientSelection {
      selected: tickers.len(),
      required: MIN_SELECTION,
    });
  }

  Ok(())
}

/// Mean vector and covariance matrix for `tickers` drawn from `prices`.
///
/// The selection size is checked before any column is touched.
#[instrument(skip_all, fields(tickers = tickers.len(), periods = prices.len()))]
pub fn compute_statistics<S: AsRef<str>>(
  prices: &PriceSeries,
  tickers: &[S],
  annualization_factor: f64,
) -> Result<ReturnStatistics> {
  check_selection(tickers)?;

  let subset = prices.select(tickers)?;
  subset.validate()?;

  statistics_from_returns(
    subset.tickers().to_vec(),
    simple_returns(subset.prices()),
    annualization_factor,
  )
}

/// Annualize the sample mean and sample covariance (`ddof = 1`) of a return matrix.
pub fn statistics_from_returns(
  tickers: Vec<String>,
  returns: Array2<f64>,
  annualization_factor: f64,
) -> Result<ReturnStatistics> {
  let observations = returns.nrows();
  let insufficient = || FrontierError::InsufficientData {
    observations,
    required: MIN_OBSERVATIONS,
  };

  if observations < MIN_OBSERVATIONS {
    return Err(insufficient());
  }
  if returns.ncols() != tickers.len() {
    return Err(FrontierError::DimensionMismatch {
      expected: tickers.len(),
      found: returns.ncols(),
    });
  }

  // row `i` of the return matrix ends at price row `i + 1`
  if let Some(((i, j), _)) = returns.indexed_iter().find(|(_, r)| !r.is_finite()) {
    return Err(FrontierError::NonFiniteReturn {
      ticker: tickers[j].clone(),
      row: i + 1,
    });
  }

  let mean = returns.mean_axis(Axis(0)).ok_or_else(insufficient)? * annualization_factor;
  if let Some(i) = mean.iter().position(|m| !m.is_finite()) {
    return Err(FrontierError::NonFiniteStatistic {
      ticker: tickers[i].clone(),
      statistic: "mean return",
    });
  }

  // rows of the transposed view are variables, columns are observations
  let cov = returns.t().cov(1.0).map_err(|_| insufficient())?;
  let cov = (&cov + &cov.t()) * (0.5 * annualization_factor);
  if let Some(((i, _), _)) = cov.indexed_iter().find(|(_, c)| !c.is_finite()) {
    return Err(FrontierError::NonFiniteStatistic {
      ticker: tickers[i].clone(),
      statistic: "covariance",
    });
  }

  debug!(
    assets = tickers.len(),
    observations, annualization_factor, "return statistics computed"
  );

  Ok(ReturnStatistics {
    tickers,
    mean,
    cov,
    observations,
  })
}
