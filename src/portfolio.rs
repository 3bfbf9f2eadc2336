//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Random search over the long-only simplex for the max-Sharpe and min-volatility
//! allocations.

pub mod engine;
pub mod evaluate;
pub mod select;
pub mod simulation;
pub mod stats;
pub mod types;
pub mod weights;

pub use engine::MonteCarloEngine;
pub use engine::SimulationReport;
pub use evaluate::evaluate_portfolio;
pub use evaluate::EvaluationParams;
pub use evaluate::PortfolioMetrics;
pub use select::best_indices;
pub use select::select_best;
pub use simulation::fill_trials;
pub use simulation::simulate;
pub use simulation::simulate_seeded;
pub use simulation::TrialPlan;
pub use stats::estimate_statistics;
pub use stats::log_returns;
pub use stats::CovarianceDivisor;
pub use stats::PortfolioStatistics;
pub use types::BestPortfolio;
pub use types::BestPortfolios;
pub use types::PortfolioSample;
pub use types::SimulationResult;
pub use weights::DirichletSampler;
pub use weights::SamplerKind;
pub use weights::UniformSampler;
pub use weights::WeightSampler;
pub use weights::WeightVector;
