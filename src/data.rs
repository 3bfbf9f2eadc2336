//! # Price Data
//!
//! $$
//! P \in (\mathbb R_{>0} \cup \{\varnothing\})^{T \times N}
//! $$
//!
//! Date-ordered price tables and the sources that produce them.

pub mod csv_loader;
#[cfg(feature = "yahoo")]
pub mod yahoo;

use chrono::NaiveDate;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::Axis;

use crate::error::PortfolioError;
use crate::error::Result;

/// Historical prices, one row per date (ascending) and one column per asset.
///
/// Cells are `None` where the asset has no quote for that date, typically at the
/// start of a series for late listings.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceTable {
  assets: Vec<String>,
  dates: Vec<NaiveDate>,
  prices: Array2<Option<f64>>,
}

impl PriceTable {
  /// Build an undated table from a `T x N` price matrix.
  pub fn new(assets: Vec<String>, prices: Array2<Option<f64>>) -> Result<Self> {
    if prices.ncols() != assets.len() {
      return Err(PortfolioError::DimensionMismatch {
        what: "price table columns",
        expected: assets.len(),
        found: prices.ncols(),
      });
    }
    Ok(Self {
      assets,
      dates: Vec::new(),
      prices,
    })
  }

  /// Build a table from row-major cells.
  pub fn from_rows(assets: Vec<String>, rows: Vec<Vec<Option<f64>>>) -> Result<Self> {
    let n = assets.len();
    let t = rows.len();
    let mut cells = Vec::with_capacity(t * n);
    for (i, row) in rows.into_iter().enumerate() {
      if row.len() != n {
        return Err(PortfolioError::data(format!(
          "row {i} has {} cells, expected {n}",
          row.len()
        )));
      }
      cells.extend(row);
    }
    let prices = Array2::from_shape_vec((t, n), cells)
      .map_err(|e| PortfolioError::data(format!("cannot shape price matrix: {e}")))?;
    Self::new(assets, prices)
  }

  /// Build a table without gaps from a dense `T x N` matrix.
  pub fn from_dense(assets: Vec<String>, prices: &Array2<f64>) -> Result<Self> {
    Self::new(assets, prices.mapv(Some))
  }

  /// Attach row dates. They must match the row count and be strictly ascending.
  pub fn with_dates(mut self, dates: Vec<NaiveDate>) -> Result<Self> {
    if dates.len() != self.n_rows() {
      return Err(PortfolioError::DimensionMismatch {
        what: "price table dates",
        expected: self.n_rows(),
        found: dates.len(),
      });
    }
    if let Some(w) = dates.windows(2).find(|w| w[0] >= w[1]) {
      return Err(PortfolioError::data(format!(
        "dates must be strictly ascending, found {} followed by {}",
        w[0], w[1]
      )));
    }
    self.dates = dates;
    Ok(self)
  }

  pub fn assets(&self) -> &[String] {
    &self.assets
  }

  /// Row dates, empty for undated tables.
  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn prices(&self) -> &Array2<Option<f64>> {
    &self.prices
  }

  pub fn n_rows(&self) -> usize {
    self.prices.nrows()
  }

  pub fn n_assets(&self) -> usize {
    self.assets.len()
  }

  pub fn column(&self, asset: usize) -> ArrayView1<'_, Option<f64>> {
    self.prices.column(asset)
  }

  /// `true` when no cell is missing.
  pub fn is_complete(&self) -> bool {
    self.prices.iter().all(Option::is_some)
  }

  /// Reorder and subset columns to `assets`.
  pub fn select(&self, assets: &[String]) -> Result<PriceTable> {
    let mut idx = Vec::with_capacity(assets.len());
    for asset in assets {
      let pos = self
        .assets
        .iter()
        .position(|a| a == asset)
        .ok_or_else(|| PortfolioError::data(format!("asset {asset} not present in price table")))?;
      idx.push(pos);
    }

    Ok(Self {
      assets: assets.to_vec(),
      dates: self.dates.clone(),
      prices: self.prices.select(Axis(1), &idx),
    })
  }
}

/// Provider of historical prices for a list of assets.
pub trait PriceSource {
  /// Fetch a table whose columns follow the order of `assets`.
  fn fetch(&self, assets: &[String]) -> Result<PriceTable>;
}

/// A source backed by a table already in memory.
#[derive(Clone, Debug)]
pub struct InMemorySource {
  table: PriceTable,
}

impl InMemorySource {
  pub fn new(table: PriceTable) -> Self {
    Self { table }
  }
}

impl PriceSource for InMemorySource {
  fn fetch(&self, assets: &[String]) -> Result<PriceTable> {
    self.table.select(assets)
  }
}

impl<S: PriceSource + ?Sized> PriceSource for &S {
  fn fetch(&self, assets: &[String]) -> Result<PriceTable> {
    (**self).fetch(assets)
  }
}
