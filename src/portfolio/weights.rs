//! # Weight Sampling
//!
//! $$
//! \Delta^{N-1}=\Big\{\mathbf w\in\mathbb R^N_{\ge 0}:\ \textstyle\sum_a w_a=1\Big\}
//! $$
//!
//! Long-only weight vectors and the random samplers that draw them.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use ndarray::Array1;
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Exp1;
use rand_distr::Uniform;

use crate::error::PortfolioError;
use crate::error::Result;

/// Tolerance on `sum(w) == 1`.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Resample budget for the all-zero draw guard.
const MAX_ZERO_DRAWS: usize = 64;

/// A point of the long-only simplex: non-negative entries summing to one.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightVector(Array1<f64>);

impl WeightVector {
  /// Validate an allocation.
  pub fn new(weights: Array1<f64>) -> Result<Self> {
    if weights.is_empty() {
      return Err(PortfolioError::Sampling { n_assets: 0 });
    }
    if let Some((i, w)) = weights
      .iter()
      .enumerate()
      .find(|(_, w)| !(w.is_finite() && **w >= 0.0))
    {
      return Err(PortfolioError::InvalidWeights {
        reason: format!("weight {i} is {w}, expected a finite non-negative value"),
      });
    }
    let sum = weights.sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
      return Err(PortfolioError::InvalidWeights {
        reason: format!("weights sum to {sum}, expected 1"),
      });
    }
    Ok(Self(weights))
  }

  /// Scale non-negative raw draws onto the simplex.
  fn normalized(raw: Array1<f64>) -> Option<Self> {
    let sum = raw.sum();
    if !(sum.is_finite() && sum > 0.0) {
      return None;
    }
    Some(Self(raw / sum))
  }

  /// Equal allocation over `n` assets.
  pub fn equal(n: usize) -> Result<Self> {
    if n == 0 {
      return Err(PortfolioError::Sampling { n_assets: 0 });
    }
    Ok(Self(Array1::from_elem(n, 1.0 / n as f64)))
  }

  /// Zero-length stand-in for a pre-sized slot that a trial has not written yet.
  pub(crate) fn unset() -> Self {
    Self(Array1::zeros(0))
  }

  pub fn as_array(&self) -> &Array1<f64> {
    &self.0
  }

  pub fn into_inner(self) -> Array1<f64> {
    self.0
  }
}

impl Deref for WeightVector {
  type Target = Array1<f64>;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl TryFrom<Vec<f64>> for WeightVector {
  type Error = PortfolioError;

  fn try_from(value: Vec<f64>) -> Result<Self> {
    Self::new(Array1::from(value))
  }
}

/// Draws one random allocation per call.
pub trait WeightSampler: Send + Sync {
  /// Return a weight vector of length `n`.
  fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<WeightVector>;
}

fn draw_normalized<R, F>(n: usize, rng: &mut R, mut draw: F) -> Result<WeightVector>
where
  R: Rng + ?Sized,
  F: FnMut(&mut R) -> Array1<f64>,
{
  if n == 0 {
    return Err(PortfolioError::Sampling { n_assets: 0 });
  }
  for _ in 0..MAX_ZERO_DRAWS {
    if let Some(w) = WeightVector::normalized(draw(rng)) {
      return Ok(w);
    }
  }
  Err(PortfolioError::Sampling { n_assets: n })
}

/// Independent `U[0, 1)` draws divided by their sum.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformSampler;

impl WeightSampler for UniformSampler {
  fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<WeightVector> {
    let unit = Uniform::new(0.0_f64, 1.0);
    draw_normalized(n, rng, |rng| Array1::random_using(n, unit, rng))
  }
}

/// Normalized `Exp(1)` draws: the flat Dirichlet, uniform over the simplex.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirichletSampler;

impl WeightSampler for DirichletSampler {
  fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<WeightVector> {
    draw_normalized(n, rng, |rng| Array1::random_using(n, Exp1, rng))
  }
}

/// Sampler selection for configuration and CLI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SamplerKind {
  #[default]
  Uniform,
  Dirichlet,
}

impl WeightSampler for SamplerKind {
  fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<WeightVector> {
    match self {
      Self::Uniform => UniformSampler.sample(n, rng),
      Self::Dirichlet => DirichletSampler.sample(n, rng),
    }
  }
}

impl FromStr for SamplerKind {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "uniform" | "u" => Ok(Self::Uniform),
      "dirichlet" | "flat" | "simplex" => Ok(Self::Dirichlet),
      other => Err(format!("unknown sampler {other:?}")),
    }
  }
}

impl fmt::Display for SamplerKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Uniform => write!(f, "uniform"),
      Self::Dirichlet => write!(f, "dirichlet"),
    }
  }
}
