use std::hint::black_box;

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use indicatif::ProgressBar;
use ndarray::Array1;
use ndarray::Array2;
use portfolio_mc::portfolio::EvaluationParams;
use portfolio_mc::portfolio::PortfolioStatistics;
use portfolio_mc::portfolio::SamplerKind;
use portfolio_mc::portfolio::TrialPlan;
use portfolio_mc::portfolio::simulate_seeded;

const TRIALS: usize = 50_000;

fn statistics(n: usize) -> PortfolioStatistics {
  let mean = Array1::from_shape_fn(n, |i| 0.0002 + 0.0001 * i as f64);
  let cov = Array2::from_shape_fn((n, n), |(i, j)| {
    let vi = 0.01 + 0.002 * i as f64;
    let vj = 0.01 + 0.002 * j as f64;
    if i == j {
      vi * vi
    } else {
      0.3 * vi * vj
    }
  });
  PortfolioStatistics::new(mean, cov).unwrap()
}

fn bench_simulation(c: &mut Criterion) {
  let mut group = c.benchmark_group("MonteCarlo");
  group.sample_size(10);
  let params = EvaluationParams::default();

  for &n in &[4usize, 32] {
    let stats = statistics(n);
    for parallel in [false, true] {
      let plan = TrialPlan {
        trials: TRIALS,
        seed: 42,
        max_degenerate_retries: 16,
        parallel,
      };
      let label = if parallel { "parallel" } else { "sequential" };
      group.bench_with_input(BenchmarkId::new(label, n), &n, |b, _| {
        b.iter(|| {
          let run = simulate_seeded(
            &stats,
            &params,
            &SamplerKind::Uniform,
            &plan,
            &ProgressBar::hidden(),
          )
          .unwrap();
          black_box(run.samples.len())
        })
      });
    }
  }
  group.finish();
}

criterion_group!(benches, bench_simulation);
criterion_main!(benches);
