//! # Portfolio Engine
//!
//! $$
//! P \xrightarrow{\text{estimate}} (\mu,\Sigma) \xrightarrow{\text{simulate}} \mathcal R
//! \xrightarrow{\text{select}} (\mathbf w^\*_{S}, \mathbf w^\*_{\sigma})
//! $$
//!
//! Entry point wiring a price source through estimation, simulation and selection.

use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use tracing::info;

use super::evaluate::EvaluationParams;
use super::select::best_indices;
use super::simulation::TrialPlan;
use super::simulation::simulate_seeded;
use super::stats::PortfolioStatistics;
use super::stats::estimate_statistics;
use super::types::BestPortfolio;
use super::types::BestPortfolios;
use super::types::SimulationResult;
use crate::config::SimulationConfig;
use crate::data::PriceSource;
use crate::error::PortfolioError;
use crate::error::Result;
use crate::rng::entropy_seed;

const PROGRESS_TEMPLATE: &str = "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} portfolios";

/// Everything a run produces. The selected indices always point into its own result.
#[derive(Clone, Debug)]
pub struct SimulationReport {
  statistics: PortfolioStatistics,
  result: SimulationResult,
  max_sharpe: usize,
  min_risk: usize,
}

impl SimulationReport {
  /// Per-period statistics the trials were evaluated against.
  pub fn statistics(&self) -> &PortfolioStatistics {
    &self.statistics
  }

  /// The finished trial table.
  pub fn result(&self) -> &SimulationResult {
    &self.result
  }

  /// Hand back statistics and trial table.
  pub fn into_parts(self) -> (PortfolioStatistics, SimulationResult) {
    (self.statistics, self.result)
  }

  /// The max-Sharpe and min-risk rows of [`Self::result`].
  pub fn best(&self) -> BestPortfolios<'_> {
    let samples = self.result.samples();
    BestPortfolios {
      max_sharpe: BestPortfolio {
        trial: self.max_sharpe,
        sample: &samples[self.max_sharpe],
      },
      min_risk: BestPortfolio {
        trial: self.min_risk,
        sample: &samples[self.min_risk],
      },
    }
  }
}

/// Monte Carlo search for the max-Sharpe and min-volatility allocations.
#[derive(Clone, Debug)]
pub struct MonteCarloEngine {
  config: SimulationConfig,
}

impl MonteCarloEngine {
  /// Construct a new engine with a validated configuration.
  pub fn new(config: SimulationConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self { config })
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &SimulationConfig {
    &self.config
  }

  pub fn params(&self) -> EvaluationParams {
    EvaluationParams::new(
      self.config.risk_free_rate,
      self.config.annualization_factor,
    )
  }

  /// Fetch prices for the configured assets and estimate their return statistics.
  pub fn estimate<P: PriceSource + ?Sized>(&self, source: &P) -> Result<PortfolioStatistics> {
    let table = source.fetch(&self.config.assets)?;
    if table.assets() != self.config.assets.as_slice() {
      return Err(PortfolioError::data(format!(
        "price source returned columns {:?}, expected {:?}",
        table.assets(),
        self.config.assets
      )));
    }
    estimate_statistics(&table, self.config.covariance)
  }

  /// Run the configured number of trials against `stats`.
  pub fn simulate(&self, stats: &PortfolioStatistics) -> Result<SimulationResult> {
    let n = self.config.n_assets();
    if stats.n_assets() != n {
      return Err(PortfolioError::DimensionMismatch {
        what: "statistics",
        expected: n,
        found: stats.n_assets(),
      });
    }

    let seed = self.config.random_seed.unwrap_or_else(entropy_seed);
    let plan = TrialPlan {
      trials: self.config.num_simulations,
      seed,
      max_degenerate_retries: self.config.max_degenerate_retries,
      parallel: self.config.parallel,
    };
    info!(
      assets = n,
      trials = plan.trials,
      seed,
      sampler = %self.config.sampler,
      parallel = plan.parallel,
      "starting Monte Carlo portfolio simulation"
    );

    let progress = self.progress_bar();
    let run = simulate_seeded(stats, &self.params(), &self.config.sampler, &plan, &progress);
    progress.finish_and_clear();
    let run = run?;

    let mut result = SimulationResult::new(self.config.assets.clone(), run.samples);
    result.seed = Some(seed);
    result.degenerate_retries = run.degenerate_retries;
    Ok(result)
  }

  /// Estimate, simulate and select in one call.
  pub fn run<P: PriceSource + ?Sized>(&self, source: &P) -> Result<SimulationReport> {
    let statistics = self.estimate(source)?;
    let result = self.simulate(&statistics)?;
    let (max_sharpe, min_risk) = best_indices(&result)?;

    let best = &result.samples()[max_sharpe];
    let safest = &result.samples()[min_risk];
    info!(
      trial = max_sharpe,
      sharpe = best.sharpe,
      ret = best.expected_return,
      risk = best.volatility,
      "max-Sharpe portfolio"
    );
    info!(
      trial = min_risk,
      sharpe = safest.sharpe,
      ret = safest.expected_return,
      risk = safest.volatility,
      "min-risk portfolio"
    );
    if result.degenerate_retries > 0 {
      info!(
        retries = result.degenerate_retries,
        "zero-volatility draws were resampled"
      );
    }

    Ok(SimulationReport {
      statistics,
      result,
      max_sharpe,
      min_risk,
    })
  }

  fn progress_bar(&self) -> ProgressBar {
    if !self.config.show_progress {
      return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(self.config.num_simulations as u64);
    if let Ok(style) = ProgressStyle::with_template(PROGRESS_TEMPLATE) {
      bar.set_style(style);
    }
    bar
  }
}
