//! # Portfolio Types
//!
//! $$
//! \mathcal F = \{(\sigma_k, \mu_k, S_k)\}_{k=1}^{N}
//! $$
//!
//! Per-trial records and the ordered result set of a frontier run.

use std::cmp::Ordering;

use ndarray::Array1;

/// Score of one sampled portfolio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulatedPortfolio {
  /// Annualized volatility, never negative.
  pub volatility: f64,
  /// Annualized expected return.
  pub expected_return: f64,
  /// Sharpe ratio; `None` when `volatility` is zero.
  pub sharpe_ratio: Option<f64>,
}

impl SimulatedPortfolio {
  pub fn has_defined_sharpe(&self) -> bool {
    self.sharpe_ratio.is_some()
  }
}

/// Records of a frontier run, ordered by trial index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrontierResultSet {
  portfolios: Vec<SimulatedPortfolio>,
}

impl FrontierResultSet {
  pub fn new(portfolios: Vec<SimulatedPortfolio>) -> Self {
    Self { portfolios }
  }

  pub fn len(&self) -> usize {
    self.portfolios.len()
  }

  pub fn is_empty(&self) -> bool {
    self.portfolios.is_empty()
  }

  /// Record of trial `trial`.
  pub fn get(&self, trial: usize) -> Option<&SimulatedPortfolio> {
    self.portfolios.get(trial)
  }

  pub fn iter(&self) -> std::slice::Iter<'_, SimulatedPortfolio> {
    self.portfolios.iter()
  }

  pub fn as_slice(&self) -> &[SimulatedPortfolio] {
    &self.portfolios
  }

  pub fn into_vec(self) -> Vec<SimulatedPortfolio> {
    self.portfolios
  }

  pub fn volatilities(&self) -> Array1<f64> {
    self.portfolios.iter().map(|p| p.volatility).collect()
  }

  pub fn expected_returns(&self) -> Array1<f64> {
    self.portfolios.iter().map(|p| p.expected_return).collect()
  }

  pub fn sharpe_ratios(&self) -> Vec<Option<f64>> {
    self.portfolios.iter().map(|p| p.sharpe_ratio).collect()
  }

  /// `(trial, record)` pairs whose Sharpe ratio is defined.
  pub fn with_defined_sharpe(&self) -> impl Iterator<Item = (usize, &SimulatedPortfolio)> + '_ {
    self
      .portfolios
      .iter()
      .enumerate()
      .filter(|(_, p)| p.has_defined_sharpe())
  }

  pub fn undefined_sharpe_count(&self) -> usize {
    self
      .portfolios
      .iter()
      .filter(|p| !p.has_defined_sharpe())
      .count()
  }

  /// Highest Sharpe ratio among records where it is defined. Ties keep the earliest trial.
  pub fn max_sharpe(&self) -> Option<(usize, &SimulatedPortfolio)> {
    let mut best: Option<(usize, &SimulatedPortfolio, f64)> = None;
    for (i, p) in self.portfolios.iter().enumerate() {
      let Some(s) = p.sharpe_ratio else {
        continue;
      };
      match best {
        Some((_, _, b)) if s.total_cmp(&b) != Ordering::Greater => {}
        _ => best = Some((i, p, s)),
      }
    }
    best.map(|(i, p, _)| (i, p))
  }

  /// Lowest volatility. Ties keep the earliest trial.
  pub fn min_volatility(&self) -> Option<(usize, &SimulatedPortfolio)> {
    self.extreme_by(|a, b| b.volatility.total_cmp(&a.volatility))
  }

  /// Highest expected return. Ties keep the earliest trial.
  pub fn max_return(&self) -> Option<(usize, &SimulatedPortfolio)> {
    self.extreme_by(|a, b| a.expected_return.total_cmp(&b.expected_return))
  }

  fn extreme_by<F>(&self, cmp: F) -> Option<(usize, &SimulatedPortfolio)>
  where
    F: Fn(&SimulatedPortfolio, &SimulatedPortfolio) -> Ordering,
  {
    let mut best: Option<(usize, &SimulatedPortfolio)> = None;
    for (i, p) in self.portfolios.iter().enumerate() {
      match best {
        Some((_, b)) if cmp(p, b) != Ordering::Greater => {}
        _ => best = Some((i, p)),
      }
    }
    best
  }

  /// Trials not dominated in (lower volatility, higher return), by ascending volatility.
  ///
  /// Records with identical volatility and return collapse onto the earliest trial.
  pub fn efficient_subset(&self) -> Vec<usize> {
    let mut order: Vec<usize> = (0..self.portfolios.len()).collect();
    order.sort_by(|&a, &b| {
      let (pa, pb) = (&self.portfolios[a], &self.portfolios[b]);
      pa.volatility
        .total_cmp(&pb.volatility)
        .then(pb.expected_return.total_cmp(&pa.expected_return))
        .then(a.cmp(&b))
    });

    let mut frontier = Vec::new();
    let mut best_return = f64::NEG_INFINITY;
    for i in order {
      let r = self.portfolios[i].expected_return;
      if r > best_return {
        best_return = r;
        frontier.push(i);
      }
    }

    frontier
  }
}

impl From<Vec<SimulatedPortfolio>> for FrontierResultSet {
  fn from(portfolios: Vec<SimulatedPortfolio>) -> Self {
    Self::new(portfolios)
  }
}

impl<'a> IntoIterator for &'a FrontierResultSet {
  type Item = &'a SimulatedPortfolio;
  type IntoIter = std::slice::Iter<'a, SimulatedPortfolio>;

  fn into_iter(self) -> Self::IntoIter {
    self.portfolios.iter()
  }
}
