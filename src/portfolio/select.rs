//! # Result Selection
//!
//! $$
//! i^\*_S=\min\big(\arg\max_i S_i\big),\qquad i^\*_\sigma=\min\big(\arg\min_i \sigma_i\big)
//! $$
//!
//! Single pass over the trial table; ties resolve to the lowest trial index.

use super::types::BestPortfolio;
use super::types::BestPortfolios;
use super::types::SimulationResult;
use crate::error::PortfolioError;
use crate::error::Result;

/// Trial indices of the max-Sharpe and min-risk rows.
pub fn best_indices(result: &SimulationResult) -> Result<(usize, usize)> {
  let samples = result.samples();
  let first = samples.first().ok_or(PortfolioError::EmptyResult)?;

  let (mut best_sharpe, mut max_sharpe) = (first.sharpe, 0);
  let (mut best_risk, mut min_risk) = (first.volatility, 0);

  for (i, s) in samples.iter().enumerate().skip(1) {
    // strict comparisons keep the first occurrence on ties
    if s.sharpe > best_sharpe {
      best_sharpe = s.sharpe;
      max_sharpe = i;
    }
    if s.volatility < best_risk {
      best_risk = s.volatility;
      min_risk = i;
    }
  }

  Ok((max_sharpe, min_risk))
}

/// Pick the max-Sharpe and min-risk portfolios of a finished run.
pub fn select_best(result: &SimulationResult) -> Result<BestPortfolios<'_>> {
  let (max_sharpe, min_risk) = best_indices(result)?;
  let samples = result.samples();
  Ok(BestPortfolios {
    max_sharpe: BestPortfolio {
      trial: max_sharpe,
      sample: &samples[max_sharpe],
    },
    min_risk: BestPortfolio {
      trial: min_risk,
      sample: &samples[min_risk],
    },
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;
  use ndarray::array;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  use super::*;
  use crate::portfolio::evaluate::EvaluationParams;
  use crate::portfolio::evaluate::evaluate_portfolio;
  use crate::portfolio::simulation::simulate;
  use crate::portfolio::stats::PortfolioStatistics;
  use crate::portfolio::types::PortfolioSample;
  use crate::portfolio::weights::UniformSampler;
  use crate::portfolio::weights::WeightVector;

  fn sample(w: Vec<f64>, v: f64, s: f64) -> PortfolioSample {
    PortfolioSample {
      weights: WeightVector::try_from(w).unwrap(),
      expected_return: 0.0,
      volatility: v,
      sharpe: s,
    }
  }

  #[test]
  fn empty_result_is_an_error() {
    let empty = SimulationResult::new(vec!["A".into()], Vec::new());
    assert!(matches!(select_best(&empty), Err(PortfolioError::EmptyResult)));
  }

  #[test]
  fn ties_resolve_to_first_trial() {
    let res = SimulationResult::new(
      vec!["A".into()],
      vec![
        sample(vec![1.0], 0.3, 1.0),
        sample(vec![1.0], 0.2, 2.0),
        sample(vec![1.0], 0.2, 2.0),
        sample(vec![1.0], 0.5, 0.5),
      ],
    );
    let best = select_best(&res).unwrap();
    assert_eq!(best.max_sharpe.trial, 1);
    assert_eq!(best.min_risk.trial, 1);
  }

  #[test]
  fn hand_checked_three_portfolios() {
    let stats = PortfolioStatistics::new(
      array![0.001, 0.002],
      array![[0.0004, 0.0001], [0.0001, 0.0009]],
    )
    .unwrap();
    let params = EvaluationParams::default();
    let samples: Vec<PortfolioSample> = [vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]]
      .into_iter()
      .map(|w| {
        let w = WeightVector::try_from(w).unwrap();
        let m = evaluate_portfolio(&w, &stats, &params).unwrap();
        PortfolioSample::new(w, m)
      })
      .collect();

    // (1,0): R = 0.252, sigma = sqrt(0.1008) = 0.31749, S = 0.76223
    // (0,1): R = 0.504, sigma = sqrt(0.2268) = 0.47624, S = 1.03729
    // (.5,.5): R = 0.378, sigma = sqrt(0.0945) = 0.30741, S = 1.19710
    assert_relative_eq!(samples[0].sharpe, 0.242 / 0.1008f64.sqrt(), epsilon = 1e-12);
    assert_relative_eq!(samples[1].sharpe, 0.494 / 0.2268f64.sqrt(), epsilon = 1e-12);

    let res = SimulationResult::new(vec!["A".into(), "B".into()], samples);
    let best = select_best(&res).unwrap();
    assert_eq!(best.max_sharpe.trial, 2);
    assert_eq!(best.min_risk.trial, 2);
    assert_relative_eq!(best.max_sharpe.sample.sharpe, 1.1971, epsilon = 1e-4);
  }

  #[test]
  fn selection_dominates_every_row() {
    let stats = PortfolioStatistics::new(
      array![0.0004, 0.0009, -0.0002, 0.0006],
      array![
        [0.00040, 0.00010, 0.00002, 0.00005],
        [0.00010, 0.00090, 0.00003, 0.00012],
        [0.00002, 0.00003, 0.00025, 0.00001],
        [0.00005, 0.00012, 0.00001, 0.00050],
      ],
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(2024);
    let samples = simulate(
      &stats,
      &EvaluationParams::default(),
      2_000,
      &UniformSampler,
      &mut rng,
      0,
    )
    .unwrap();
    let res = SimulationResult::new((0..4).map(|i| format!("A{i}")).collect(), samples);

    let best = select_best(&res).unwrap();
    for s in res.samples() {
      assert!(best.max_sharpe.sample.sharpe >= s.sharpe);
      assert!(best.min_risk.sample.volatility <= s.volatility);
    }
  }
}
