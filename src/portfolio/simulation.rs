//! # Monte Carlo Driver
//!
//! $$
//! \mathbf w_i\sim\mathcal D(\Delta^{N-1}),\quad
//! (R_i,\sigma_i,S_i)=\operatorname{eval}(\mathbf w_i;\mu,\Sigma,r_f,A),\quad i=0,\dots,M-1
//! $$
//!
//! Trials only read the shared statistics and write their own slot of a pre-sized table,
//! so chunks of trials run independently on the rayon pool.

use indicatif::ProgressBar;
use rand::Rng;
use rayon::prelude::*;
use tracing::debug;
use tracing::warn;

use super::evaluate::EvaluationParams;
use super::evaluate::evaluate_portfolio;
use super::stats::PortfolioStatistics;
use super::types::PortfolioSample;
use super::weights::WeightSampler;
use crate::error::PortfolioError;
use crate::error::Result;
use crate::rng::stream_rng;

/// Trials per independently seeded chunk.
pub const CHUNK_TRIALS: usize = 1024;

/// Draw and evaluate one trial, resampling zero-volatility draws up to `max_retries` times.
fn run_trial<S, R>(
  trial: usize,
  stats: &PortfolioStatistics,
  params: &EvaluationParams,
  sampler: &S,
  rng: &mut R,
  max_retries: usize,
  retries: &mut usize,
) -> Result<PortfolioSample>
where
  S: WeightSampler + ?Sized,
  R: Rng + ?Sized,
{
  let n = stats.n_assets();
  let mut attempts = 0;
  loop {
    let weights = sampler.sample(n, rng)?;
    attempts += 1;
    match evaluate_portfolio(&weights, stats, params) {
      Ok(metrics) => return Ok(PortfolioSample::new(weights, metrics)),
      Err(e) if e.is_degenerate() && attempts <= max_retries => {
        warn!(trial, attempt = attempts, "zero-volatility draw, resampling");
        *retries += 1;
      }
      Err(e) if e.is_degenerate() => {
        return Err(PortfolioError::DegenerateRisk {
          trial: Some(trial),
          attempts,
        });
      }
      Err(e) => return Err(e),
    }
  }
}

/// Fill `slots` with trials `first_trial..first_trial + slots.len()`.
///
/// Returns the number of degenerate draws that were resampled.
pub fn fill_trials<S, R>(
  slots: &mut [PortfolioSample],
  first_trial: usize,
  stats: &PortfolioStatistics,
  params: &EvaluationParams,
  sampler: &S,
  rng: &mut R,
  max_retries: usize,
) -> Result<usize>
where
  S: WeightSampler + ?Sized,
  R: Rng + ?Sized,
{
  let mut retries = 0;
  for (offset, slot) in slots.iter_mut().enumerate() {
    *slot = run_trial(
      first_trial + offset,
      stats,
      params,
      sampler,
      rng,
      max_retries,
      &mut retries,
    )?;
  }
  Ok(retries)
}

/// Run `trials` trials sequentially on one random source.
pub fn simulate<S, R>(
  stats: &PortfolioStatistics,
  params: &EvaluationParams,
  trials: usize,
  sampler: &S,
  rng: &mut R,
  max_retries: usize,
) -> Result<Vec<PortfolioSample>>
where
  S: WeightSampler + ?Sized,
  R: Rng + ?Sized,
{
  let mut slots = vec![PortfolioSample::unset(); trials];
  fill_trials(&mut slots, 0, stats, params, sampler, rng, max_retries)?;
  Ok(slots)
}

/// How a seeded run is laid out.
#[derive(Clone, Copy, Debug)]
pub struct TrialPlan {
  pub trials: usize,
  pub seed: u64,
  pub max_degenerate_retries: usize,
  pub parallel: bool,
}

/// Samples of a seeded run plus its retry count.
#[derive(Clone, Debug)]
pub struct SeededRun {
  pub samples: Vec<PortfolioSample>,
  pub degenerate_retries: usize,
}

/// Run a seeded simulation split into [`CHUNK_TRIALS`]-sized chunks.
///
/// Chunk `k` draws from its own stream derived from `(seed, k)`, so the table is the
/// same whether chunks run sequentially or in parallel. When several chunks fail the
/// error of the lowest chunk is returned.
pub fn simulate_seeded<S>(
  stats: &PortfolioStatistics,
  params: &EvaluationParams,
  sampler: &S,
  plan: &TrialPlan,
  progress: &ProgressBar,
) -> Result<SeededRun>
where
  S: WeightSampler + ?Sized,
{
  let mut slots = vec![PortfolioSample::unset(); plan.trials];
  debug!(
    trials = plan.trials,
    chunks = plan.trials.div_ceil(CHUNK_TRIALS),
    parallel = plan.parallel,
    "scheduling trial chunks"
  );

  let run_chunk = |(k, chunk): (usize, &mut [PortfolioSample])| -> Result<usize> {
    let mut rng = stream_rng(plan.seed, k as u64);
    let retries = fill_trials(
      chunk,
      k * CHUNK_TRIALS,
      stats,
      params,
      sampler,
      &mut rng,
      plan.max_degenerate_retries,
    )?;
    progress.inc(chunk.len() as u64);
    Ok(retries)
  };

  let outcomes: Vec<Result<usize>> = if plan.parallel {
    slots
      .par_chunks_mut(CHUNK_TRIALS)
      .enumerate()
      .map(&run_chunk)
      .collect()
  } else {
    slots
      .chunks_mut(CHUNK_TRIALS)
      .enumerate()
      .map(&run_chunk)
      .collect()
  };
  let degenerate_retries = outcomes.into_iter().sum::<Result<usize>>()?;

  Ok(SeededRun {
    samples: slots,
    degenerate_retries,
  })
}
