//! # Portfolio Evaluator
//!
//! $$
//! \mu_p = \mathbf w^\top \mu,\qquad \sigma_p = \sqrt{\mathbf w^\top \Sigma \mathbf w},\qquad
//! S = \frac{\mu_p - r_f}{\sigma_p}
//! $$
//!

use ndarray::ArrayView1;
use ndarray::ArrayView2;
use tracing::trace;

use super::types::SimulatedPortfolio;
use crate::error::FrontierError;
use crate::error::Result;

/// Check that `mean` and `cov` describe the same `n` assets.
pub fn check_dimensions(mean: ArrayView1<f64>, cov: ArrayView2<f64>) -> Result<()> {
  let n = mean.len();
  if cov.nrows() != n {
    return Err(FrontierError::DimensionMismatch {
      expected: n,
      found: cov.nrows(),
    });
  }
  if cov.ncols() != n {
    return Err(FrontierError::DimensionMismatch {
      expected: n,
      found: cov.ncols(),
    });
  }

  Ok(())
}

/// Expected portfolio return `w . mean`.
pub fn portfolio_return(weights: ArrayView1<f64>, mean: ArrayView1<f64>) -> f64 {
  weights.dot(&mean)
}

/// Portfolio variance `w' cov w`, clamped at zero.
pub fn portfolio_variance(weights: ArrayView1<f64>, cov: ArrayView2<f64>) -> f64 {
  let variance = weights.dot(&cov.dot(&weights));
  if variance < 0.0 {
    trace!(variance, "clamping negative portfolio variance to zero");
    0.0
  } else {
    variance
  }
}

/// Score one weight vector. The Sharpe ratio is `None` when volatility is exactly zero.
///
/// Non-finite inputs are an error rather than a `NaN` record.
pub fn evaluate(
  weights: ArrayView1<f64>,
  mean: ArrayView1<f64>,
  cov: ArrayView2<f64>,
  risk_free: f64,
) -> Result<SimulatedPortfolio> {
  check_dimensions(mean, cov)?;
  if weights.len() != mean.len() {
    return Err(FrontierError::DimensionMismatch {
      expected: mean.len(),
      found: weights.len(),
    });
  }

  let expected_return = portfolio_return(weights, mean);
  let volatility = portfolio_variance(weights, cov).sqrt();
  if !(volatility.is_finite() && expected_return.is_finite()) {
    return Err(FrontierError::NonFinitePortfolio {
      volatility,
      expected_return,
    });
  }
  let sharpe_ratio = if volatility == 0.0 {
    None
  } else {
    Some((expected_return - risk_free) / volatility)
  };

  Ok(SimulatedPortfolio {
    volatility,
    expected_return,
    sharpe_ratio,
  })
}
