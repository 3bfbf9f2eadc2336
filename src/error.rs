//! # Errors
//!
//! $$
//! \text{DataError} \cup \text{SamplingError} \cup \text{DegenerateRiskError} \cup \text{EmptyResultError}
//! $$
//!
//! Typed failures raised by the estimator, sampler, evaluator, driver and selector.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = PortfolioError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum PortfolioError {
  /// Malformed or insufficient price history.
  #[error("data error: {reason}")]
  Data { reason: String },

  /// The sampler was asked for a weight vector over zero assets.
  #[error("sampling error: cannot draw weights for {n_assets} assets")]
  Sampling { n_assets: usize },

  /// A portfolio whose variance is zero, so the Sharpe ratio is undefined.
  ///
  /// `trial` is set by the simulation driver; a direct evaluation leaves it `None`.
  #[error("degenerate risk{}: portfolio volatility is zero", trial_context(.trial, .attempts))]
  DegenerateRisk {
    trial: Option<usize>,
    attempts: usize,
  },

  /// Selection was requested on a simulation without samples.
  #[error("empty result: no portfolio samples to select from")]
  EmptyResult,

  #[error("dimension mismatch for {what}: expected {expected}, found {found}")]
  DimensionMismatch {
    what: &'static str,
    expected: usize,
    found: usize,
  },

  /// A weight vector outside the long-only simplex.
  #[error("invalid weights: {reason}")]
  InvalidWeights { reason: String },

  #[error("invalid configuration: {reason}")]
  Config { reason: String },

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[cfg(feature = "yahoo")]
  #[error("Yahoo Finance error: {0}")]
  Yahoo(#[from] yahoo_finance_api::YahooError),
}

fn trial_context(trial: &Option<usize>, attempts: &usize) -> String {
  match trial {
    Some(trial) => format!(" at trial {trial} after {attempts} draw(s)"),
    None => String::new(),
  }
}

impl PortfolioError {
  pub(crate) fn data(reason: impl Into<String>) -> Self {
    Self::Data {
      reason: reason.into(),
    }
  }

  pub(crate) fn config(reason: impl Into<String>) -> Self {
    Self::Config {
      reason: reason.into(),
    }
  }

  /// `true` for the zero-volatility failure the driver is allowed to retry.
  pub fn is_degenerate(&self) -> bool {
    matches!(self, Self::DegenerateRisk { .. })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn degenerate_message_names_the_trial_only_when_known() {
    let direct = PortfolioError::DegenerateRisk {
      trial: None,
      attempts: 1,
    };
    assert_eq!(
      direct.to_string(),
      "degenerate risk: portfolio volatility is zero"
    );

    let driven = PortfolioError::DegenerateRisk {
      trial: Some(12),
      attempts: 3,
    };
    assert_eq!(
      driven.to_string(),
      "degenerate risk at trial 12 after 3 draw(s): portfolio volatility is zero"
    );
    assert!(driven.is_degenerate());
  }
}
