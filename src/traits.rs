//! # Traits
//!
//! $$
//! \text{Trait contracts: }\mathcal{A}:\text{inputs}\to\text{prices/trials}
//! $$
//!
use rayon::prelude::*;

use crate::error::Result;
use crate::quant::portfolio::data::PriceSeries;

/// Data-access seam: hands the engine a cleaned, gap-free price table.
///
/// Loading, gap repair and caching live behind this trait, never in the engine.
pub trait PriceSource {
  fn load_prices(&self) -> Result<PriceSeries>;
}

/// Independent, indexed Monte Carlo trials.
///
/// Implementors must make `trial(i)` a pure function of `i` so that sequential
/// and parallel collection give identical, trial-ordered output.
pub trait TrialExt: Send + Sync {
  type Output: Send;

  fn trial(&self, index: usize) -> Result<Self::Output>;

  fn trials(&self, m: usize) -> Result<Vec<Self::Output>> {
    (0..m).map(|i| self.trial(i)).collect()
  }

  fn trials_par(&self, m: usize) -> Result<Vec<Self::Output>> {
    (0..m).into_par_iter().map(|i| self.trial(i)).collect()
  }
}
