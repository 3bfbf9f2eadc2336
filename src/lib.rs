//! # portfolio-mc
//!
//! Monte Carlo exploration of long-only portfolio allocations. Historical prices are
//! turned into log-return statistics, random weight vectors are drawn from the simplex
//! and evaluated, and the trials with the best Sharpe ratio and the lowest volatility
//! are selected.
//!
//! ## Modules
//!
//! | Module            | Description                                                                |
//! |-------------------|----------------------------------------------------------------------------|
//! | [`config`]        | Run configuration and defaults.                                            |
//! | [`data`]          | Price tables and the sources (in-memory, CSV, Yahoo Finance) behind them.  |
//! | [`error`]         | Typed error taxonomy.                                                      |
//! | [`portfolio`]     | Statistics, sampling, evaluation, simulation driver and selection.         |
//! | [`report`]        | Text tables for the selected portfolios.                                   |
//! | [`rng`]           | Deterministic per-chunk random streams.                                    |
//! | [`visualization`] | Risk/return scatter of a finished run.                                     |
//!
//! ## Features
//!
//! - `yahoo`: Enables [`data::yahoo::YahooPriceSource`]
//!
//! ## Parallelism
//!
//! With `parallel` set, trial chunks run on the `rayon` pool. Each chunk owns a random
//! stream derived from the run seed, so a seeded run yields the same table either way.
//!
//! ## Example Usage
//!
//! ```rust
//! use portfolio_mc::config::SimulationConfig;
//! use portfolio_mc::data::csv_loader::CsvPriceSource;
//! use portfolio_mc::portfolio::MonteCarloEngine;
//!
//! let config = SimulationConfig {
//!   random_seed: Some(42),
//!   ..SimulationConfig::with_assets(["GOOG", "AMZN", "META", "MSFT"])
//! };
//! let engine = MonteCarloEngine::new(config)?;
//! let report = engine.run(&CsvPriceSource::new("prices.csv"))?;
//! let best = report.best();
//! println!("max Sharpe: {:?}", best.max_sharpe.sample);
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod portfolio;
pub mod report;
pub mod rng;
pub mod visualization;

pub use config::SimulationConfig;
pub use error::PortfolioError;
pub use error::Result;
pub use portfolio::MonteCarloEngine;
pub use portfolio::SimulationReport;
