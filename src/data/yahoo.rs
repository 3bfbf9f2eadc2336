//! # Yahoo Finance Price Source
//!
//! $$
//! P_{t,a} = \text{AdjClose}_a(t),\quad t \in [\text{start}, \text{end})
//! $$
//!
//! Downloads daily adjusted closes per ticker and outer-joins them on date, so a ticker
//! listed after `start` contributes leading gaps.

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono::Datelike;
use chrono::NaiveDate;
use time::Month;
use time::OffsetDateTime;
use tracing::debug;
use tracing::info;
use yahoo_finance_api::YahooConnector;

use super::PriceSource;
use super::PriceTable;
use crate::error::PortfolioError;
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct YahooPriceSource {
  pub start: NaiveDate,
  pub end: NaiveDate,
}

impl YahooPriceSource {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
    if start >= end {
      return Err(PortfolioError::config(format!(
        "download window is empty: start {start} is not before end {end}"
      )));
    }
    Ok(Self { start, end })
  }

  async fn download(&self, assets: &[String]) -> Result<PriceTable> {
    let provider = YahooConnector::new()?;
    let start = to_offset(self.start)?;
    let end = to_offset(self.end)?;

    let mut by_date: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    for (col, ticker) in assets.iter().enumerate() {
      let response = provider.get_quote_history(ticker, start, end).await?;
      let quotes = response.quotes()?;
      debug!(ticker = %ticker, quotes = quotes.len(), "downloaded quote history");

      for quote in quotes {
        let date = DateTime::from_timestamp(quote.timestamp as i64, 0)
          .map(|dt| dt.date_naive())
          .ok_or_else(|| {
            PortfolioError::data(format!(
              "{ticker}: quote timestamp {} out of range",
              quote.timestamp
            ))
          })?;
        let row = by_date
          .entry(date)
          .or_insert_with(|| vec![None; assets.len()]);
        row[col] = Some(quote.adjclose);
      }
    }

    let (dates, rows): (Vec<_>, Vec<_>) = by_date.into_iter().unzip();
    info!(
      assets = assets.len(),
      rows = rows.len(),
      start = %self.start,
      end = %self.end,
      "assembled price table from Yahoo Finance"
    );
    PriceTable::from_rows(assets.to_vec(), rows)?.with_dates(dates)
  }
}

impl PriceSource for YahooPriceSource {
  fn fetch(&self, assets: &[String]) -> Result<PriceTable> {
    let runtime = tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()?;
    runtime.block_on(self.download(assets))
  }
}

fn to_offset(date: NaiveDate) -> Result<OffsetDateTime> {
  let month = Month::try_from(date.month() as u8)
    .map_err(|e| PortfolioError::data(format!("invalid month in {date}: {e}")))?;
  let day = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
    .map_err(|e| PortfolioError::data(format!("invalid date {date}: {e}")))?;
  Ok(day.midnight().assume_utc())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_window_is_rejected() {
    let d = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    assert!(YahooPriceSource::new(d, d).is_err());
  }

  #[test]
  fn converts_calendar_dates() {
    let d = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    let odt = to_offset(d).unwrap();
    assert_eq!(odt.year(), 2015);
    assert_eq!(odt.day(), 1);
    assert_eq!(odt.hour(), 0);
  }
}
