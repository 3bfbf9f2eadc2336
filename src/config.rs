//! # Simulation Configuration
//!
//! $$
//! (\text{assets}, M, r_f, A, \text{seed})
//! $$
//!
//! Run parameters for [`crate::portfolio::MonteCarloEngine`].

use crate::error::PortfolioError;
use crate::error::Result;
use crate::portfolio::stats::CovarianceDivisor;
use crate::portfolio::weights::SamplerKind;

/// Default number of Monte Carlo trials.
pub const DEFAULT_NUM_SIMULATIONS: usize = 10_000;
/// Default annual risk-free rate.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.01;
/// Trading days per year.
pub const DEFAULT_ANNUALIZATION_FACTOR: f64 = 252.0;
/// Local resample budget for a single zero-volatility trial.
pub const DEFAULT_MAX_DEGENERATE_RETRIES: usize = 16;

/// Runtime configuration for a simulation run.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
  /// Ordered asset identifiers. Drives N and the output column order.
  pub assets: Vec<String>,
  /// Number of random portfolios to evaluate.
  pub num_simulations: usize,
  /// Annual risk-free rate used in the Sharpe ratio.
  pub risk_free_rate: f64,
  /// Trading periods per year used to annualize per-period statistics.
  pub annualization_factor: f64,
  /// Seed for reproducible runs. `None` draws one from OS entropy.
  pub random_seed: Option<u64>,
  /// How weight vectors are drawn from the simplex.
  pub sampler: SamplerKind,
  /// Divisor policy of the covariance estimator.
  pub covariance: CovarianceDivisor,
  /// Evaluate trial chunks on the rayon pool.
  pub parallel: bool,
  /// Resamples allowed for one degenerate trial before the run fails.
  pub max_degenerate_retries: usize,
  /// Draw an indicatif progress bar while simulating.
  pub show_progress: bool,
}

impl Default for SimulationConfig {
  fn default() -> Self {
    Self {
      assets: Vec::new(),
      num_simulations: DEFAULT_NUM_SIMULATIONS,
      risk_free_rate: DEFAULT_RISK_FREE_RATE,
      annualization_factor: DEFAULT_ANNUALIZATION_FACTOR,
      random_seed: None,
      sampler: SamplerKind::Uniform,
      covariance: CovarianceDivisor::Sample,
      parallel: false,
      max_degenerate_retries: DEFAULT_MAX_DEGENERATE_RETRIES,
      show_progress: false,
    }
  }
}

impl SimulationConfig {
  /// Config for the given assets with every other option at its default.
  pub fn with_assets<I, S>(assets: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      assets: assets.into_iter().map(Into::into).collect(),
      ..Self::default()
    }
  }

  pub fn n_assets(&self) -> usize {
    self.assets.len()
  }

  /// Reject values the engine cannot run with.
  pub fn validate(&self) -> Result<()> {
    if self.assets.is_empty() {
      return Err(PortfolioError::config("at least one asset is required"));
    }
    for (i, asset) in self.assets.iter().enumerate() {
      if asset.trim().is_empty() {
        return Err(PortfolioError::config(format!(
          "asset identifier at position {i} is blank"
        )));
      }
      if self.assets[..i].contains(asset) {
        return Err(PortfolioError::config(format!(
          "asset {asset} is listed more than once"
        )));
      }
    }
    if self.num_simulations == 0 {
      return Err(PortfolioError::config("num_simulations must be positive"));
    }
    if !self.risk_free_rate.is_finite() {
      return Err(PortfolioError::config(format!(
        "risk_free_rate must be finite, got {}",
        self.risk_free_rate
      )));
    }
    if !(self.annualization_factor.is_finite() && self.annualization_factor > 0.0) {
      return Err(PortfolioError::config(format!(
        "annualization_factor must be finite and positive, got {}",
        self.annualization_factor
      )));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_follow_reference_run() {
    let cfg = SimulationConfig::default();

    assert_eq!(cfg.num_simulations, 10_000);
    assert_eq!(cfg.risk_free_rate, 0.01);
    assert_eq!(cfg.annualization_factor, 252.0);
    assert!(cfg.random_seed.is_none());
    assert!(!cfg.parallel);
  }

  #[test]
  fn validate_accepts_minimal_config() {
    let cfg = SimulationConfig::with_assets(["GOOG"]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.n_assets(), 1);
  }

  #[test]
  fn validate_rejects_bad_values() {
    let empty = SimulationConfig::default();
    assert!(matches!(empty.validate(), Err(PortfolioError::Config { .. })));

    let zero_trials = SimulationConfig {
      num_simulations: 0,
      ..SimulationConfig::with_assets(["A", "B"])
    };
    assert!(matches!(
      zero_trials.validate(),
      Err(PortfolioError::Config { .. })
    ));

    let bad_factor = SimulationConfig {
      annualization_factor: 0.0,
      ..SimulationConfig::with_assets(["A"])
    };
    assert!(bad_factor.validate().is_err());

    let nan_rate = SimulationConfig {
      risk_free_rate: f64::NAN,
      ..SimulationConfig::with_assets(["A"])
    };
    assert!(nan_rate.validate().is_err());

    let duplicate = SimulationConfig::with_assets(["A", "B", "A"]);
    assert!(duplicate.validate().is_err());
  }
}
