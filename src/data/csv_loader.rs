//! # CSV Price Source
//!
//! $$
//! \texttt{date},\ P_{t,1},\dots,P_{t,N}
//! $$
//!
//! Reads wide price files: an optional leading `date` column (`YYYY-MM-DD`) followed by
//! one column per asset. Empty cells are missing quotes.

use std::path::Path;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::debug;

use super::PriceSource;
use super::PriceTable;
use crate::error::PortfolioError;
use crate::error::Result;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Price source reading a CSV file on every fetch.
#[derive(Clone, Debug)]
pub struct CsvPriceSource {
  path: PathBuf,
}

impl CsvPriceSource {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl PriceSource for CsvPriceSource {
  fn fetch(&self, assets: &[String]) -> Result<PriceTable> {
    let table = read_price_csv(&self.path)?;
    table.select(assets)
  }
}

/// Parse a whole price file into a [`PriceTable`].
pub fn read_price_csv(path: impl AsRef<Path>) -> Result<PriceTable> {
  let path = path.as_ref();
  if !path.exists() {
    return Err(PortfolioError::data(format!(
      "price file {} not found",
      path.display()
    )));
  }
  let reader = ::csv::Reader::from_path(path)?;
  let table = read_prices(reader)?;
  debug!(
    path = %path.display(),
    rows = table.n_rows(),
    assets = table.n_assets(),
    "loaded price file"
  );
  Ok(table)
}

/// Parse prices from any CSV reader with a header row.
pub fn read_prices<R: std::io::Read>(mut reader: ::csv::Reader<R>) -> Result<PriceTable> {
  let headers = reader.headers()?.clone();
  let dated = headers
    .get(0)
    .is_some_and(|h| h.trim().eq_ignore_ascii_case("date"));
  let skip = usize::from(dated);
  let assets: Vec<String> = headers
    .iter()
    .skip(skip)
    .map(|h| h.trim().to_string())
    .collect();

  let mut dates = Vec::new();
  let mut rows = Vec::new();

  for (idx, record) in reader.records().enumerate() {
    let record = record?;
    let line = idx + 2;

    if dated {
      let raw = record.get(0).unwrap_or_default().trim();
      let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        PortfolioError::data(format!("line {line}: invalid date {raw:?}: {e}"))
      })?;
      dates.push(date);
    }

    let mut row = Vec::with_capacity(assets.len());
    for (col, cell) in record.iter().skip(skip).enumerate() {
      let cell = cell.trim();
      if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        row.push(None);
        continue;
      }
      let value = cell.parse::<f64>().map_err(|e| {
        PortfolioError::data(format!(
          "line {line}, column {}: invalid price {cell:?}: {e}",
          assets.get(col).map(String::as_str).unwrap_or("?")
        ))
      })?;
      row.push(Some(value));
    }
    rows.push(row);
  }

  let table = PriceTable::from_rows(assets, rows)?;
  if dated {
    table.with_dates(dates)
  } else {
    Ok(table)
  }
}
