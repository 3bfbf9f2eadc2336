use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
#[cfg(feature = "yahoo")]
use chrono::NaiveDate;
use clap::Parser;
use portfolio_mc::config::DEFAULT_ANNUALIZATION_FACTOR;
use portfolio_mc::config::DEFAULT_MAX_DEGENERATE_RETRIES;
use portfolio_mc::config::DEFAULT_NUM_SIMULATIONS;
use portfolio_mc::config::DEFAULT_RISK_FREE_RATE;
use portfolio_mc::config::SimulationConfig;
use portfolio_mc::data::PriceSource;
use portfolio_mc::data::csv_loader::CsvPriceSource;
use portfolio_mc::portfolio::CovarianceDivisor;
use portfolio_mc::portfolio::MonteCarloEngine;
use portfolio_mc::portfolio::SamplerKind;
use portfolio_mc::report::render_best;
use portfolio_mc::report::statistics_table;
use portfolio_mc::visualization::write_frontier_html;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
  name = "portfolio-mc",
  version,
  about = "Monte Carlo search for max-Sharpe and min-risk portfolios"
)]
struct Cli {
  /// Comma-separated asset identifiers, in output column order
  #[arg(long, value_delimiter = ',', required = true)]
  assets: Vec<String>,
  /// CSV of prices: optional leading `date` column, one column per asset
  #[arg(long)]
  prices: Option<PathBuf>,
  /// First day of the Yahoo Finance download (YYYY-MM-DD)
  #[cfg(feature = "yahoo")]
  #[arg(long)]
  start: Option<NaiveDate>,
  /// Last day of the Yahoo Finance download (YYYY-MM-DD)
  #[cfg(feature = "yahoo")]
  #[arg(long)]
  end: Option<NaiveDate>,
  #[arg(long, default_value_t = DEFAULT_NUM_SIMULATIONS)]
  simulations: usize,
  #[arg(long, default_value_t = DEFAULT_RISK_FREE_RATE)]
  risk_free_rate: f64,
  #[arg(long, default_value_t = DEFAULT_ANNUALIZATION_FACTOR)]
  annualization_factor: f64,
  /// Fixed seed; omit for an entropy seed
  #[arg(long)]
  seed: Option<u64>,
  /// uniform | dirichlet
  #[arg(long, default_value_t = SamplerKind::Uniform)]
  sampler: SamplerKind,
  /// sample | population
  #[arg(long, default_value_t = CovarianceDivisor::Sample)]
  covariance: CovarianceDivisor,
  /// Run trial chunks on all cores
  #[arg(long)]
  parallel: bool,
  #[arg(long)]
  progress: bool,
  /// Resamples allowed for a zero-volatility trial
  #[arg(long, default_value_t = DEFAULT_MAX_DEGENERATE_RETRIES)]
  max_retries: usize,
  /// Write every trial to this CSV
  #[arg(long)]
  output: Option<PathBuf>,
  /// Write the risk/return scatter to this HTML file
  #[arg(long)]
  plot: Option<PathBuf>,
  #[arg(long, default_value = "info")]
  log: String,
}

impl Cli {
  fn config(&self) -> SimulationConfig {
    SimulationConfig {
      num_simulations: self.simulations,
      risk_free_rate: self.risk_free_rate,
      annualization_factor: self.annualization_factor,
      random_seed: self.seed,
      sampler: self.sampler,
      covariance: self.covariance,
      parallel: self.parallel,
      max_degenerate_retries: self.max_retries,
      show_progress: self.progress,
      ..SimulationConfig::with_assets(self.assets.iter().cloned())
    }
  }

  fn source(&self) -> Result<Box<dyn PriceSource>> {
    if let Some(path) = &self.prices {
      return Ok(Box::new(CsvPriceSource::new(path)));
    }
    #[cfg(feature = "yahoo")]
    if let (Some(start), Some(end)) = (self.start, self.end) {
      let source = portfolio_mc::data::yahoo::YahooPriceSource::new(start, end)?;
      return Ok(Box::new(source));
    }
    bail!("no price source given, pass --prices (or --start/--end with the yahoo feature)")
  }
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log)))
    .with_target(false)
    .init();

  let engine = MonteCarloEngine::new(cli.config()).context("invalid configuration")?;
  let source = cli.source()?;
  let report = engine
    .run(source.as_ref())
    .context("portfolio simulation failed")?;
  let best = report.best();

  println!(
    "{}",
    statistics_table(
      report.result().assets(),
      report.statistics(),
      engine.config().annualization_factor
    )
  );
  println!("{}", render_best(report.result(), &best));

  if let Some(path) = &cli.output {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    report.result().write_csv(BufWriter::new(file))?;
    info!(path = %path.display(), rows = report.result().len(), "wrote simulation table");
  }
  if let Some(path) = &cli.plot {
    write_frontier_html(report.result(), &best, path)?;
    info!(path = %path.display(), "wrote risk/return plot");
  }
  Ok(())
}
