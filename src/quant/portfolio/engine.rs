//! # Frontier Engine
//!
//! $$
//! \mathbf w^{(k)} \sim \text{Sampler}_k,\qquad
//! (\sigma_k, \mu_k, S_k) = \text{Evaluate}(\mathbf w^{(k)}, \mu, \Sigma),\qquad k = 1,\dots,N
//! $$
//!
//! Run configuration, trial orchestration and the high-level run API.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use ndarray::Array1;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use rand::Rng;
use rayon::prelude::*;
use tracing::info;
use tracing::instrument;

use super::data::PriceSeries;
use super::evaluator::check_dimensions;
use super::evaluator::evaluate;
use super::sampler::WeightSampler;
use super::sampler::WeightScheme;
use super::statistics::ReturnStatistics;
use super::statistics::TRADING_DAYS;
use super::statistics::check_selection;
use super::statistics::compute_statistics;
use super::types::FrontierResultSet;
use super::types::SimulatedPortfolio;
use crate::error::FrontierError;
use crate::error::Result;
use crate::traits::PriceSource;
use crate::traits::TrialExt;

/// Default number of Monte Carlo trials.
pub const DEFAULT_TRIALS: usize = 2000;

/// Runtime configuration for [`FrontierEngine`].
#[derive(Clone, Debug)]
pub struct FrontierConfig {
  /// Number of Monte Carlo trials.
  pub trial_count: usize,
  /// Periods per year used to annualize mean and covariance.
  pub annualization_factor: f64,
  /// Seed for reproducible runs (`None` draws a fresh one per run).
  pub random_seed: Option<u64>,
  /// Risk-free rate subtracted from the expected return in Sharpe ratios.
  pub risk_free_rate: f64,
  /// Raw coordinate distribution of the weight sampler.
  pub weight_scheme: WeightScheme,
  /// Run trials on the rayon pool.
  pub parallel: bool,
}

impl Default for FrontierConfig {
  fn default() -> Self {
    Self {
      trial_count: DEFAULT_TRIALS,
      annualization_factor: TRADING_DAYS,
      random_seed: None,
      risk_free_rate: 0.0,
      weight_scheme: WeightScheme::UniformNormalized,
      parallel: true,
    }
  }
}

impl FrontierConfig {
  /// Set the number of Monte Carlo trials.
  pub fn with_trials(mut self, n: usize) -> Self {
    self.trial_count = n;
    self
  }

  /// Fix the base seed so the run is reproducible.
  pub fn with_seed(mut self, seed: u64) -> Self {
    self.random_seed = Some(seed);
    self
  }

  /// Set the periods-per-year multiplier.
  pub fn with_annualization_factor(mut self, factor: f64) -> Self {
    self.annualization_factor = factor;
    self
  }

  /// Set the rate subtracted from expected return in Sharpe ratios.
  pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
    self.risk_free_rate = rate;
    self
  }

  /// Choose the weight sampler.
  pub fn with_weight_scheme(mut self, scheme: WeightScheme) -> Self {
    self.weight_scheme = scheme;
    self
  }

  /// Run trials on the rayon pool (`true`) or the calling thread.
  pub fn with_parallel(mut self, parallel: bool) -> Self {
    self.parallel = parallel;
    self
  }

  /// Reject configurations no run can use.
  pub fn validate(&self) -> Result<()> {
    if self.trial_count == 0 {
      return Err(FrontierError::InvalidConfig(
        "trial_count must be positive".into(),
      ));
    }
    if !(self.annualization_factor.is_finite() && self.annualization_factor > 0.0) {
      return Err(FrontierError::InvalidConfig(format!(
        "annualization_factor must be a positive number, got {}",
        self.annualization_factor
      )));
    }
    if !self.risk_free_rate.is_finite() {
      return Err(FrontierError::InvalidConfig(format!(
        "risk_free_rate must be finite, got {}",
        self.risk_free_rate
      )));
    }

    Ok(())
  }
}

/// Trial loop over shared, read-only mean and covariance.
///
/// Trial `k` samples with its own generator seeded from `(seed, k)`, so the
/// output does not depend on scheduling.
#[derive(Clone, Copy, Debug)]
pub struct FrontierSimulator<'a> {
  mean: ArrayView1<'a, f64>,
  cov: ArrayView2<'a, f64>,
  seed: u64,
  scheme: WeightScheme,
  risk_free: f64,
}

impl<'a> FrontierSimulator<'a> {
  /// Simulator over `mean` and `cov` with base seed `seed`.
  pub fn new(mean: ArrayView1<'a, f64>, cov: ArrayView2<'a, f64>, seed: u64) -> Result<Self> {
    check_dimensions(mean, cov)?;
    if mean.is_empty() {
      return Err(FrontierError::InvalidConfig(
        "at least one asset is required".into(),
      ));
    }

    Ok(Self {
      mean,
      cov,
      seed,
      scheme: WeightScheme::default(),
      risk_free: 0.0,
    })
  }

  /// Choose the weight sampler.
  pub fn with_weight_scheme(mut self, scheme: WeightScheme) -> Self {
    self.scheme = scheme;
    self
  }

  /// Set the rate subtracted from expected return in Sharpe ratios.
  pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
    self.risk_free = rate;
    self
  }

  pub fn asset_count(&self) -> usize {
    self.mean.len()
  }

  /// Base seed the trial seeds are derived from.
  pub fn seed(&self) -> u64 {
    self.seed
  }

  /// Regenerate the weight vector trial `trial` was scored with.
  pub fn weights_for_trial(&self, trial: usize) -> Result<Array1<f64>> {
    WeightSampler::for_trial(self.seed, trial, self.scheme).sample(self.asset_count())
  }

  /// Run `trials` trials and collect them in trial order.
  pub fn simulate(&self, trials: usize, parallel: bool) -> Result<FrontierResultSet> {
    let portfolios = if parallel {
      self.trials_par(trials)?
    } else {
      self.trials(trials)?
    };

    Ok(portfolios.into())
  }

  /// As [`Self::simulate`], stopping between trials once `cancel` is raised.
  pub fn simulate_with_cancel(
    &self,
    trials: usize,
    parallel: bool,
    cancel: &AtomicBool,
  ) -> Result<FrontierResultSet> {
    let completed = AtomicUsize::new(0);
    let run = |i: usize| -> Result<SimulatedPortfolio> {
      if cancel.load(Ordering::Relaxed) {
        return Err(FrontierError::Cancelled {
          completed: completed.load(Ordering::Relaxed),
        });
      }
      let p = self.trial(i)?;
      completed.fetch_add(1, Ordering::Relaxed);
      Ok(p)
    };

    let portfolios: Result<Vec<SimulatedPortfolio>> = if parallel {
      (0..trials).into_par_iter().map(&run).collect()
    } else {
      (0..trials).map(&run).collect()
    };

    match portfolios {
      Ok(p) => Ok(p.into()),
      Err(FrontierError::Cancelled { completed }) => {
        info!(completed, trials, "frontier run cancelled");
        Err(FrontierError::Cancelled { completed })
      }
      Err(e) => Err(e),
    }
  }
}

impl TrialExt for FrontierSimulator<'_> {
  type Output = SimulatedPortfolio;

  fn trial(&self, index: usize) -> Result<SimulatedPortfolio> {
    let w = self.weights_for_trial(index)?;
    evaluate(w.view(), self.mean, self.cov, self.risk_free)
  }
}

/// Output of a frontier run.
#[derive(Clone, Debug)]
pub struct FrontierRun {
  /// Mean vector and covariance matrix the trials were scored against.
  pub statistics: ReturnStatistics,
  /// One record per trial, in trial order.
  pub results: FrontierResultSet,
  /// Base seed of the run; replaying it reproduces `results` exactly.
  pub seed: u64,
  /// Sampler scheme the run used.
  pub weight_scheme: WeightScheme,
}

impl FrontierRun {
  /// Weight vector of trial `trial`, regenerated from the run seed.
  pub fn weights_for_trial(&self, trial: usize) -> Result<Array1<f64>> {
    WeightSampler::for_trial(self.seed, trial, self.weight_scheme)
      .sample(self.statistics.asset_count())
  }
}

/// Single entry point from a price table and a ticker selection to a frontier sample.
#[derive(Clone, Debug, Default)]
pub struct FrontierEngine {
  config: FrontierConfig,
}

impl FrontierEngine {
  /// Construct a new engine with explicit configuration.
  pub fn new(config: FrontierConfig) -> Self {
    Self { config }
  }

  /// Configuration the engine runs with.
  pub fn config(&self) -> &FrontierConfig {
    &self.config
  }

  /// Annualized statistics of `tickers`; independent of any sampling setting.
  pub fn statistics<S: AsRef<str>>(
    &self,
    prices: &PriceSeries,
    tickers: &[S],
  ) -> Result<ReturnStatistics> {
    compute_statistics(prices, tickers, self.config.annualization_factor)
  }

  /// Compute statistics for `tickers` and sample the frontier.
  pub fn run<S: AsRef<str>>(&self, prices: &PriceSeries, tickers: &[S]) -> Result<FrontierRun> {
    self.run_inner(prices, tickers, None)
  }

  /// As [`Self::run`], stopping between trials once `cancel` is raised.
  pub fn run_with_cancel<S: AsRef<str>>(
    &self,
    prices: &PriceSeries,
    tickers: &[S],
    cancel: &AtomicBool,
  ) -> Result<FrontierRun> {
    self.run_inner(prices, tickers, Some(cancel))
  }

  /// Validate the selection, then load prices from `source` and run.
  pub fn run_from_source<P, S>(&self, source: &P, tickers: &[S]) -> Result<FrontierRun>
  where
    P: PriceSource + ?Sized,
    S: AsRef<str>,
  {
    check_selection(tickers)?;
    let prices = source.load_prices()?;
    self.run(&prices, tickers)
  }

  #[instrument(skip_all, fields(tickers = tickers.len(), trials = self.config.trial_count))]
  fn run_inner<S: AsRef<str>>(
    &self,
    prices: &PriceSeries,
    tickers: &[S],
    cancel: Option<&AtomicBool>,
  ) -> Result<FrontierRun> {
    let cfg = &self.config;
    cfg.validate()?;

    let statistics = self.statistics(prices, tickers)?;
    let seed = cfg.random_seed.unwrap_or_else(|| rand::rng().random());
    let simulator = FrontierSimulator::new(statistics.mean.view(), statistics.cov.view(), seed)?
      .with_weight_scheme(cfg.weight_scheme)
      .with_risk_free_rate(cfg.risk_free_rate);

    info!(
      seed,
      assets = simulator.asset_count(),
      parallel = cfg.parallel,
      "frontier run started"
    );

    let results = match cancel {
      Some(flag) => simulator.simulate_with_cancel(cfg.trial_count, cfg.parallel, flag)?,
      None => simulator.simulate(cfg.trial_count, cfg.parallel)?,
    };

    info!(
      trials = results.len(),
      undefined_sharpe = results.undefined_sharpe_count(),
      "frontier run finished"
    );

    Ok(FrontierRun {
      statistics,
      results,
      seed,
      weight_scheme: cfg.weight_scheme,
    })
  }
}
