//! # Portfolio Types
//!
//! $$
//! \mathcal R=\{(\mathbf w_i, R_i, \sigma_i, S_i)\}_{i=0}^{M-1}
//! $$
//!
//! Trial records, the simulation table and the selected portfolios.

use std::io::Write;

use ndarray::Array2;

use super::evaluate::PortfolioMetrics;
use super::weights::WeightVector;
use crate::error::Result;

/// Leading metric columns of the result table.
pub const METRIC_COLUMNS: [&str; 3] = ["Return", "Risk", "Sharpe"];

/// Outcome of a single trial. Never mutated once written into a [`SimulationResult`].
#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioSample {
  /// Allocation drawn for the trial.
  pub weights: WeightVector,
  /// Annualized expected return.
  pub expected_return: f64,
  /// Annualized volatility.
  pub volatility: f64,
  /// Sharpe ratio computed as `(expected_return - risk_free) / volatility`.
  pub sharpe: f64,
}

impl PortfolioSample {
  pub fn new(weights: WeightVector, metrics: PortfolioMetrics) -> Self {
    Self {
      weights,
      expected_return: metrics.expected_return,
      volatility: metrics.volatility,
      sharpe: metrics.sharpe,
    }
  }

  pub(crate) fn unset() -> Self {
    Self {
      weights: WeightVector::unset(),
      expected_return: 0.0,
      volatility: 0.0,
      sharpe: 0.0,
    }
  }

  pub fn metrics(&self) -> PortfolioMetrics {
    PortfolioMetrics {
      expected_return: self.expected_return,
      volatility: self.volatility,
      sharpe: self.sharpe,
    }
  }
}

/// All trials of a run, indexed by trial number.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationResult {
  assets: Vec<String>,
  samples: Vec<PortfolioSample>,
  /// Run seed, when the run was driven by the seeded engine.
  pub seed: Option<u64>,
  /// Resamples spent on zero-volatility draws across the run.
  pub degenerate_retries: usize,
}

impl SimulationResult {
  pub fn new(assets: Vec<String>, samples: Vec<PortfolioSample>) -> Self {
    Self {
      assets,
      samples,
      seed: None,
      degenerate_retries: 0,
    }
  }

  pub fn assets(&self) -> &[String] {
    &self.assets
  }

  pub fn samples(&self) -> &[PortfolioSample] {
    &self.samples
  }

  pub fn get(&self, trial: usize) -> Option<&PortfolioSample> {
    self.samples.get(trial)
  }

  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  pub fn returns(&self) -> Vec<f64> {
    self.samples.iter().map(|s| s.expected_return).collect()
  }

  pub fn volatilities(&self) -> Vec<f64> {
    self.samples.iter().map(|s| s.volatility).collect()
  }

  pub fn sharpes(&self) -> Vec<f64> {
    self.samples.iter().map(|s| s.sharpe).collect()
  }

  /// Column headers of [`Self::to_table`].
  pub fn columns(&self) -> Vec<String> {
    METRIC_COLUMNS
      .iter()
      .map(|c| c.to_string())
      .chain(self.assets.iter().cloned())
      .collect()
  }

  /// Dense `M x (3 + N)` table: return, risk, sharpe, then one weight per asset.
  pub fn to_table(&self) -> Array2<f64> {
    let width = METRIC_COLUMNS.len() + self.assets.len();
    let mut table = Array2::zeros((self.samples.len(), width));
    for (mut row, sample) in table.outer_iter_mut().zip(&self.samples) {
      row[0] = sample.expected_return;
      row[1] = sample.volatility;
      row[2] = sample.sharpe;
      for (cell, w) in row.iter_mut().skip(3).zip(sample.weights.iter()) {
        *cell = *w;
      }
    }
    table
  }

  /// Export the table as CSV with a header row.
  pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
    let mut out = ::csv::Writer::from_writer(writer);
    out.write_record(self.columns())?;
    for row in self.to_table().outer_iter() {
      out.write_record(row.iter().map(|v| v.to_string()))?;
    }
    out.flush()?;
    Ok(())
  }
}

/// A trial picked by a selection criterion; borrows from the result it came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BestPortfolio<'a> {
  pub trial: usize,
  pub sample: &'a PortfolioSample,
}

/// The two reference portfolios of a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BestPortfolios<'a> {
  /// Highest Sharpe ratio; earliest trial wins ties.
  pub max_sharpe: BestPortfolio<'a>,
  /// Lowest volatility; earliest trial wins ties.
  pub min_risk: BestPortfolio<'a>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample(w: Vec<f64>, r: f64, v: f64, s: f64) -> PortfolioSample {
    PortfolioSample {
      weights: WeightVector::try_from(w).unwrap(),
      expected_return: r,
      volatility: v,
      sharpe: s,
    }
  }

  fn result() -> SimulationResult {
    SimulationResult::new(
      vec!["GOOG".to_string(), "MSFT".to_string()],
      vec![
        sample(vec![0.25, 0.75], 0.1, 0.2, 0.45),
        sample(vec![1.0, 0.0], 0.3, 0.4, 0.725),
      ],
    )
  }

  #[test]
  fn table_layout_is_metrics_then_weights() {
    let res = result();
    let table = res.to_table();

    assert_eq!(table.dim(), (2, 5));
    assert_eq!(
      res.columns(),
      vec!["Return", "Risk", "Sharpe", "GOOG", "MSFT"]
    );
    assert_eq!(table.row(0).to_vec(), vec![0.1, 0.2, 0.45, 0.25, 0.75]);
    assert_eq!(table[[1, 3]], 1.0);
    assert_eq!(res.sharpes(), vec![0.45, 0.725]);
  }

  #[test]
  fn csv_export_has_header_and_rows() {
    let mut buf = Vec::new();
    result().write_csv(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Return,Risk,Sharpe,GOOG,MSFT");
    assert_eq!(lines[1], "0.1,0.2,0.45,0.25,0.75");
  }
}
