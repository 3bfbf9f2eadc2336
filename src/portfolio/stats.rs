//! # Return Statistics
//!
//! $$
//! r_{t,a}=\ln\frac{P_{t,a}}{P_{t-1,a}},\qquad
//! \mu_a=\frac1{n_a}\sum_t r_{t,a},\qquad
//! \Sigma_{ab}=\frac{1}{n_{ab}-d}\sum_{t\in\mathcal T_{ab}}(r_{t,a}-\bar r_a)(r_{t,b}-\bar r_b)
//! $$
//!
//! Mean vector and covariance matrix of per-period log returns. Missing quotes are
//! handled pairwise: a covariance entry uses exactly the periods where both assets
//! have a defined return.

use std::fmt;
use std::str::FromStr;

use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;
use ndarray_stats::CorrelationExt;
use tracing::debug;

use crate::data::PriceTable;
use crate::error::PortfolioError;
use crate::error::Result;

/// Divisor convention of the covariance estimator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CovarianceDivisor {
  /// Unbiased estimator, divides by `n - 1`.
  #[default]
  Sample,
  /// Maximum-likelihood estimator, divides by `n`.
  Population,
}

impl CovarianceDivisor {
  /// Delta degrees of freedom.
  pub fn ddof(self) -> usize {
    match self {
      Self::Sample => 1,
      Self::Population => 0,
    }
  }

  fn normalize(self, sum: f64, n: usize) -> f64 {
    let denom = n.saturating_sub(self.ddof());
    if denom == 0 {
      // a single observation carries no dispersion
      0.0
    } else {
      sum / denom as f64
    }
  }
}

impl FromStr for CovarianceDivisor {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "sample" | "unbiased" | "n-1" => Ok(Self::Sample),
      "population" | "mle" | "n" => Ok(Self::Population),
      other => Err(format!("unknown covariance divisor {other:?}")),
    }
  }
}

impl fmt::Display for CovarianceDivisor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Sample => write!(f, "sample"),
      Self::Population => write!(f, "population"),
    }
  }
}

/// Per-period return statistics of the asset universe.
#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioStatistics {
  /// Arithmetic mean of each asset's log returns.
  pub mean: Array1<f64>,
  /// Symmetric covariance of log returns.
  pub covariance: Array2<f64>,
  /// Return periods available (`T - 1`).
  pub periods: usize,
}

impl PortfolioStatistics {
  /// Statistics from explicit moments, checked for shape, finiteness and symmetry.
  pub fn new(mean: Array1<f64>, covariance: Array2<f64>) -> Result<Self> {
    let n = mean.len();
    if n == 0 {
      return Err(PortfolioError::Sampling { n_assets: 0 });
    }
    if covariance.dim() != (n, n) {
      return Err(PortfolioError::DimensionMismatch {
        what: "covariance matrix",
        expected: n,
        found: if covariance.nrows() != n {
          covariance.nrows()
        } else {
          covariance.ncols()
        },
      });
    }
    if mean.iter().chain(covariance.iter()).any(|v| !v.is_finite()) {
      return Err(PortfolioError::data("moments must be finite"));
    }
    for i in 0..n {
      if covariance[[i, i]] < 0.0 {
        return Err(PortfolioError::data(format!(
          "variance of asset {i} is negative: {}",
          covariance[[i, i]]
        )));
      }
      for j in (i + 1)..n {
        let (a, b) = (covariance[[i, j]], covariance[[j, i]]);
        if (a - b).abs() > 1e-12 * a.abs().max(b.abs()).max(1.0) {
          return Err(PortfolioError::data(format!(
            "covariance matrix is not symmetric at ({i}, {j}): {a} vs {b}"
          )));
        }
      }
    }
    Ok(Self {
      mean,
      covariance,
      periods: 0,
    })
  }

  pub fn n_assets(&self) -> usize {
    self.mean.len()
  }

  /// Per-asset standard deviation of returns.
  pub fn volatilities(&self) -> Array1<f64> {
    self.covariance.diag().mapv(|v| v.max(0.0).sqrt())
  }
}

/// Log-return matrix of shape `(T - 1) x N`; `None` where either price is missing.
pub fn log_returns(table: &PriceTable) -> Result<Array2<Option<f64>>> {
  let prices = table.prices();
  let (t, n) = prices.dim();
  if n == 0 {
    return Err(PortfolioError::data("price table has no asset columns"));
  }
  if t < 2 {
    return Err(PortfolioError::data(format!(
      "at least 2 price rows are required, got {t}"
    )));
  }

  for ((row, col), cell) in prices.indexed_iter() {
    if let Some(p) = *cell {
      if !(p.is_finite() && p > 0.0) {
        return Err(PortfolioError::data(format!(
          "asset {} has non-positive or non-finite price {p} at row {row}",
          table.assets()[col]
        )));
      }
    }
  }
  for (col, column) in prices.axis_iter(Axis(1)).enumerate() {
    if column.iter().all(Option::is_none) {
      return Err(PortfolioError::data(format!(
        "asset {} has no prices",
        table.assets()[col]
      )));
    }
  }

  let mut out = Array2::from_elem((t - 1, n), None);
  for i in 1..t {
    for a in 0..n {
      if let (Some(prev), Some(curr)) = (prices[[i - 1, a]], prices[[i, a]]) {
        out[[i - 1, a]] = Some((curr / prev).ln());
      }
    }
  }
  Ok(out)
}

fn sample_mean<I: Iterator<Item = f64>>(xs: I) -> Option<f64> {
  let (sum, n) = xs.fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
  (n > 0).then(|| sum / n as f64)
}

fn pairwise_cov(
  returns: &Array2<Option<f64>>,
  a: usize,
  b: usize,
  divisor: CovarianceDivisor,
) -> Option<f64> {
  let pairs: Vec<(f64, f64)> = returns
    .column(a)
    .iter()
    .zip(returns.column(b).iter())
    .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
    .collect();
  let n = pairs.len();
  let mx = sample_mean(pairs.iter().map(|p| p.0))?;
  let my = sample_mean(pairs.iter().map(|p| p.1))?;
  let sum: f64 = pairs.iter().map(|(x, y)| (x - mx) * (y - my)).sum();
  Some(divisor.normalize(sum, n))
}

/// Estimate mean vector and covariance matrix from a price table.
pub fn estimate_statistics(
  table: &PriceTable,
  divisor: CovarianceDivisor,
) -> Result<PortfolioStatistics> {
  let returns = log_returns(table)?;
  let (periods, n) = returns.dim();

  let mut mean = Array1::zeros(n);
  for a in 0..n {
    mean[a] = sample_mean(returns.column(a).iter().flatten().copied()).ok_or_else(|| {
      PortfolioError::data(format!(
        "asset {} has no consecutive prices to form a return",
        table.assets()[a]
      ))
    })?;
  }

  let complete = returns.iter().all(Option::is_some);
  let covariance = if complete && periods > divisor.ddof() {
    let dense = returns.mapv(|r| r.unwrap_or(f64::NAN));
    let mut cov = dense
      .t()
      .cov(divisor.ddof() as f64)
      .map_err(|e| PortfolioError::data(format!("covariance of empty returns: {e}")))?;
    for i in 0..n {
      for j in (i + 1)..n {
        cov[[j, i]] = cov[[i, j]];
      }
    }
    cov
  } else {
    let mut cov = Array2::zeros((n, n));
    for i in 0..n {
      for j in i..n {
        let c = pairwise_cov(&returns, i, j, divisor).ok_or_else(|| {
          PortfolioError::data(format!(
            "assets {} and {} have no overlapping returns",
            table.assets()[i],
            table.assets()[j]
          ))
        })?;
        cov[[i, j]] = c;
        cov[[j, i]] = c;
      }
    }
    cov
  };

  debug!(
    assets = n,
    periods,
    complete,
    divisor = %divisor,
    "estimated return statistics"
  );

  Ok(PortfolioStatistics {
    mean,
    covariance,
    periods,
  })
}
