//! # Weight Sampler
//!
//! $$
//! w_i = \frac{u_i}{\sum_{j=1}^{n} u_j},\qquad u_i \overset{iid}{\sim} \mathcal U[0,1)
//! $$
//!
//! Random long-only, fully invested weight vectors.
//!
//! The default scheme normalizes independent uniform draws. This is not uniform
//! on the simplex: mass is pulled towards balanced portfolios, which shapes the
//! sampled frontier. [`WeightScheme::FlatDirichlet`] is available as an explicit
//! alternative.

use ndarray::Array1;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::Distribution;
use rand_distr::Exp1;
use tracing::warn;

use crate::error::FrontierError;
use crate::error::Result;

/// Zero-sum draws tolerated before a sample is given up.
pub const MAX_RESAMPLE_ATTEMPTS: usize = 1000;

/// How raw coordinates are drawn before normalization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WeightScheme {
  /// `U[0,1)` coordinates divided by their sum.
  #[default]
  UniformNormalized,
  /// `Exp(1)` coordinates divided by their sum, i.e. uniform on the simplex.
  FlatDirichlet,
}

impl WeightScheme {
  /// Parse a string into a [`WeightScheme`]. Unrecognized names fall back to
  /// [`WeightScheme::UniformNormalized`] with a warning.
  pub fn from_str(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "dirichlet" | "flat-dirichlet" | "simplex" => Self::FlatDirichlet,
      "uniform" | "uniform-normalized" => Self::UniformNormalized,
      other => {
        warn!(scheme = other, "unrecognized weight scheme, using uniform");
        Self::UniformNormalized
      }
    }
  }
}

/// Seed of trial `trial` in a run seeded with `base` (SplitMix64 finalizer).
pub fn trial_seed(base: u64, trial: usize) -> u64 {
  let mut z = base.wrapping_add((trial as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
  z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
  z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
  z ^ (z >> 31)
}

/// Draws normalized weight vectors from an owned generator.
#[derive(Clone, Debug)]
pub struct WeightSampler<R: Rng = StdRng> {
  rng: R,
  scheme: WeightScheme,
}

impl WeightSampler<StdRng> {
  /// Sampler over a `StdRng` seeded with `seed`.
  pub fn seeded(seed: u64, scheme: WeightScheme) -> Self {
    Self::new(StdRng::seed_from_u64(seed), scheme)
  }

  /// Sampler for trial `trial` of a run seeded with `base`.
  pub fn for_trial(base: u64, trial: usize, scheme: WeightScheme) -> Self {
    Self::seeded(trial_seed(base, trial), scheme)
  }
}

impl<R: Rng> WeightSampler<R> {
  /// Sampler over a caller-supplied generator.
  pub fn new(rng: R, scheme: WeightScheme) -> Self {
    Self { rng, scheme }
  }

  /// Coordinate distribution in use.
  pub fn scheme(&self) -> WeightScheme {
    self.scheme
  }

  /// Draw a weight vector over `n` assets. All-zero draws are resampled.
  pub fn sample(&mut self, n: usize) -> Result<Array1<f64>> {
    if n == 0 {
      return Err(FrontierError::InvalidConfig(
        "asset count must be positive".into(),
      ));
    }

    for attempt in 1..=MAX_RESAMPLE_ATTEMPTS {
      let raw = self.draw(n);
      let total = raw.sum();

      if total > 0.0 {
        return Ok(raw / total);
      }

      warn!(attempt, assets = n, "weight draw summed to zero, resampling");
    }

    Err(FrontierError::DegenerateSample {
      attempts: MAX_RESAMPLE_ATTEMPTS,
    })
  }

  fn draw(&mut self, n: usize) -> Array1<f64> {
    let rng = &mut self.rng;
    match self.scheme {
      WeightScheme::UniformNormalized => Array1::from_shape_fn(n, |_| rng.random::<f64>()),
      WeightScheme::FlatDirichlet => Array1::from_shape_fn(n, |_| Exp1.sample(&mut *rng)),
    }
  }
}
