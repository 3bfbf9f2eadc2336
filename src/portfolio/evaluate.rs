//! # Portfolio Evaluation
//!
//! $$
//! R_p = A\,\mathbf w^\top\mu,\qquad
//! \sigma_p=\sqrt{\mathbf w^\top (A\Sigma)\,\mathbf w},\qquad
//! S=\frac{R_p-r_f}{\sigma_p}
//! $$
//!

use impl_new_derive::ImplNew;

use super::stats::PortfolioStatistics;
use super::weights::WeightVector;
use crate::config::DEFAULT_ANNUALIZATION_FACTOR;
use crate::config::DEFAULT_RISK_FREE_RATE;
use crate::error::PortfolioError;
use crate::error::Result;

/// Scalars shared by every trial of a run.
#[derive(ImplNew, Clone, Copy, Debug, PartialEq)]
pub struct EvaluationParams {
  /// Annual risk-free rate.
  pub risk_free_rate: f64,
  /// Trading periods per year.
  pub annualization_factor: f64,
}

impl Default for EvaluationParams {
  fn default() -> Self {
    Self {
      risk_free_rate: DEFAULT_RISK_FREE_RATE,
      annualization_factor: DEFAULT_ANNUALIZATION_FACTOR,
    }
  }
}

/// Annualized return, volatility and Sharpe ratio of one allocation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PortfolioMetrics {
  pub expected_return: f64,
  pub volatility: f64,
  pub sharpe: f64,
}

/// Evaluate `weights` against the return statistics.
///
/// Fails with [`PortfolioError::DegenerateRisk`] (no trial index) when the portfolio
/// variance is zero.
pub fn evaluate_portfolio(
  weights: &WeightVector,
  stats: &PortfolioStatistics,
  params: &EvaluationParams,
) -> Result<PortfolioMetrics> {
  let n = stats.n_assets();
  if weights.len() != n {
    return Err(PortfolioError::DimensionMismatch {
      what: "weight vector",
      expected: n,
      found: weights.len(),
    });
  }

  let a = params.annualization_factor;
  let expected_return = a * weights.dot(&stats.mean);
  // w' (A Sigma) w; rounding can push a PSD form slightly below zero
  let variance = (a * weights.dot(&stats.covariance.dot(weights.as_array()))).max(0.0);
  let volatility = variance.sqrt();

  if volatility == 0.0 || !volatility.is_finite() {
    return Err(PortfolioError::DegenerateRisk {
      trial: None,
      attempts: 1,
    });
  }

  Ok(PortfolioMetrics {
    expected_return,
    volatility,
    sharpe: (expected_return - params.risk_free_rate) / volatility,
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;
  use ndarray::array;

  use super::*;

  fn two_asset_stats() -> PortfolioStatistics {
    PortfolioStatistics::new(
      array![0.001, 0.002],
      array![[0.0004, 0.0001], [0.0001, 0.0009]],
    )
    .unwrap()
  }

  #[test]
  fn equal_weight_two_asset_scenario() {
    let w = WeightVector::try_from(vec![0.5, 0.5]).unwrap();
    let m = evaluate_portfolio(&w, &two_asset_stats(), &EvaluationParams::default()).unwrap();

    assert_relative_eq!(m.expected_return, 0.378, epsilon = 1e-12);
    assert_relative_eq!(m.volatility, 0.0945f64.sqrt(), epsilon = 1e-12);
    assert_relative_eq!(m.volatility, 0.30741, epsilon = 1e-5);
    assert_relative_eq!(m.sharpe, 1.1971, epsilon = 1e-4);
  }

  #[test]
  fn sharpe_is_exactly_the_stated_ratio() {
    let stats = two_asset_stats();
    let params = EvaluationParams::new(0.03, 252.0);
    for w in [[1.0, 0.0], [0.0, 1.0], [0.25, 0.75], [0.9, 0.1]] {
      let w = WeightVector::try_from(w.to_vec()).unwrap();
      let m = evaluate_portfolio(&w, &stats, &params).unwrap();
      assert!(m.volatility >= 0.0);
      assert_eq!(m.sharpe, (m.expected_return - 0.03) / m.volatility);
    }
  }

  #[test]
  fn zero_variance_is_degenerate() {
    let stats = PortfolioStatistics::new(array![0.001, 0.002], array![[0.0, 0.0], [0.0, 0.0]])
      .unwrap();
    let w = WeightVector::equal(2).unwrap();
    let err = evaluate_portfolio(&w, &stats, &EvaluationParams::default());
    assert!(matches!(err, Err(PortfolioError::DegenerateRisk { .. })));
  }

  #[test]
  fn perfectly_hedged_weights_are_degenerate() {
    // perfectly negatively correlated, equal variance: 50/50 nets to zero variance
    let stats = PortfolioStatistics::new(
      array![0.001, 0.001],
      array![[0.0004, -0.0004], [-0.0004, 0.0004]],
    )
    .unwrap();
    let w = WeightVector::equal(2).unwrap();
    let err = evaluate_portfolio(&w, &stats, &EvaluationParams::default());
    assert!(matches!(err, Err(PortfolioError::DegenerateRisk { .. })));

    let tilted = WeightVector::try_from(vec![0.75, 0.25]).unwrap();
    assert!(evaluate_portfolio(&tilted, &stats, &EvaluationParams::default()).is_ok());
  }

  #[test]
  fn slightly_negative_variance_is_clamped_to_degenerate() {
    // symmetric but not positive semi-definite, as a pairwise estimate can be
    let stats = PortfolioStatistics::new(
      array![0.001, 0.002],
      array![[0.0004, -0.0005], [-0.0005, 0.0004]],
    )
    .unwrap();
    let w = WeightVector::equal(2).unwrap();
    let raw = w.dot(&stats.covariance.dot(w.as_array()));
    assert!(raw < 0.0);

    let err = evaluate_portfolio(&w, &stats, &EvaluationParams::default());
    assert!(matches!(
      err,
      Err(PortfolioError::DegenerateRisk {
        trial: None,
        attempts: 1
      })
    ));

    let tilted = WeightVector::try_from(vec![0.9, 0.1]).unwrap();
    let m = evaluate_portfolio(&tilted, &stats, &EvaluationParams::default()).unwrap();
    assert!(m.volatility.is_finite() && m.volatility > 0.0);
    assert!(m.sharpe.is_finite());
  }

  #[test]
  fn length_mismatch_is_rejected() {
    let w = WeightVector::equal(3).unwrap();
    let err = evaluate_portfolio(&w, &two_asset_stats(), &EvaluationParams::default());
    assert!(matches!(
      err,
      Err(PortfolioError::DimensionMismatch {
        expected: 2,
        found: 3,
        ..
      })
    ));
  }
}
