//! # Reports
//!
//! $$
//! (\mathbf w^\*_{S},\ \mathbf w^\*_{\sigma}) \mapsto \text{table}
//! $$
//!
//! Plain-text tables of the selected portfolios and the asset statistics.

use prettytable::Table;
use prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE;
use prettytable::row;

use crate::portfolio::BestPortfolios;
use crate::portfolio::PortfolioStatistics;
use crate::portfolio::SimulationResult;

/// Side-by-side view of the max-Sharpe and min-risk portfolios.
pub fn best_portfolios_table(result: &SimulationResult, best: &BestPortfolios<'_>) -> Table {
  let sharpe = best.max_sharpe.sample;
  let safe = best.min_risk.sample;

  let mut table = Table::new();
  table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
  table.set_titles(row!["", "Max Sharpe", "Min Risk"]);
  table.add_row(row![
    "Trial",
    best.max_sharpe.trial,
    best.min_risk.trial
  ]);
  table.add_row(row![
    "Return",
    format!("{:.6}", sharpe.expected_return),
    format!("{:.6}", safe.expected_return)
  ]);
  table.add_row(row![
    "Risk",
    format!("{:.6}", sharpe.volatility),
    format!("{:.6}", safe.volatility)
  ]);
  table.add_row(row![
    "Sharpe",
    format!("{:.6}", sharpe.sharpe),
    format!("{:.6}", safe.sharpe)
  ]);
  for (i, asset) in result.assets().iter().enumerate() {
    table.add_row(row![
      asset,
      format!("{:.4}", sharpe.weights[i]),
      format!("{:.4}", safe.weights[i])
    ]);
  }
  table
}

/// Annualized mean return and volatility per asset.
pub fn statistics_table(
  assets: &[String],
  stats: &PortfolioStatistics,
  annualization_factor: f64,
) -> Table {
  let vols = stats.volatilities();
  let mut table = Table::new();
  table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
  table.set_titles(row!["Asset", "Ann. return", "Ann. volatility"]);
  for (i, asset) in assets.iter().enumerate() {
    table.add_row(row![
      asset,
      format!("{:.6}", stats.mean[i] * annualization_factor),
      format!("{:.6}", vols[i] * annualization_factor.sqrt())
    ]);
  }
  table
}

/// Text rendering of [`best_portfolios_table`].
pub fn render_best(result: &SimulationResult, best: &BestPortfolios<'_>) -> String {
  best_portfolios_table(result, best).to_string()
}
