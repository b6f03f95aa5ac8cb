//! # Price Loader
//!
//! $$
//! \tilde p_{\cdot,i} = \operatorname{ffill}\big(\operatorname{bfill}(p_{\cdot,i})\big)
//! $$
//!
//! CSV-backed [`PriceSource`]. Gaps are repaired here, before the engine sees
//! the table: backward-fill, then forward-fill, then rows that still have a gap
//! (an asset without a single quote) are dropped.

use std::io;
use std::path::Path;
use std::path::PathBuf;

use chrono::NaiveDate;
use chrono::NaiveDateTime;
use csv::ReaderBuilder;
use csv::Trim;
use ndarray::Array2;
use ndarray::Axis;
use tracing::debug;

use super::data::PriceSeries;
use crate::error::FrontierError;
use crate::error::Result;
use crate::traits::PriceSource;

pub const DEFAULT_DATE_COLUMN: &str = "Date";

/// Close prices stored as `Date,<ticker>,<ticker>,...`.
#[derive(Clone, Debug)]
pub struct CsvPriceSource {
  path: PathBuf,
  date_column: String,
}

impl CsvPriceSource {
  /// Source reading `path` with a `Date` column.
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      date_column: DEFAULT_DATE_COLUMN.to_string(),
    }
  }

  /// Use `column` as the date column.
  pub fn with_date_column(mut self, column: &str) -> Self {
    self.date_column = column.to_string();
    self
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl PriceSource for CsvPriceSource {
  fn load_prices(&self) -> Result<PriceSeries> {
    let reader = ReaderBuilder::new().trim(Trim::All).from_path(&self.path)?;
    let series = read_prices(reader, &self.date_column)?;

    debug!(
      path = %self.path.display(),
      periods = series.len(),
      assets = series.tickers().len(),
      "prices loaded"
    );

    Ok(series)
  }
}

/// Parse a price table, sort it by date and repair gaps.
///
/// Empty or non-numeric cells count as gaps.
pub fn read_prices<R: io::Read>(
  mut reader: csv::Reader<R>,
  date_column: &str,
) -> Result<PriceSeries> {
  let headers = reader.headers()?.clone();
  let date_idx = headers
    .iter()
    .position(|h| h == date_column)
    .ok_or_else(|| FrontierError::MissingColumn(date_column.to_string()))?;
  let tickers: Vec<String> = headers
    .iter()
    .enumerate()
    .filter(|(i, _)| *i != date_idx)
    .map(|(_, h)| h.to_string())
    .collect();

  let mut rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
  for record in reader.records() {
    let record = record?;
    let date = parse_date(&record[date_idx])?;
    let values = record
      .iter()
      .enumerate()
      .filter(|(i, _)| *i != date_idx)
      .map(|(_, raw)| parse_price(raw))
      .collect();
    rows.push((date, values));
  }
  rows.sort_by_key(|(d, _)| *d);

  let mut prices = Array2::from_elem((rows.len(), tickers.len()), f64::NAN);
  for (i, (_, values)) in rows.iter().enumerate() {
    for (j, &v) in values.iter().enumerate() {
      prices[[i, j]] = v;
    }
  }
  let dates: Vec<NaiveDate> = rows.into_iter().map(|(d, _)| d).collect();

  fill_gaps(&mut prices);
  let (dates, prices) = drop_incomplete_rows(dates, prices);

  PriceSeries::new(dates, tickers, prices)
}

/// `YYYY-MM-DD`, optionally followed by ` HH:MM:SS`.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
  let raw = raw.trim();
  match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    Ok(d) => Ok(d),
    Err(err) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
      .map(|dt| dt.date())
      .map_err(|_| err.into()),
  }
}

fn parse_price(raw: &str) -> f64 {
  raw
    .parse::<f64>()
    .ok()
    .filter(|v| v.is_finite())
    .unwrap_or(f64::NAN)
}

/// Backward-fill then forward-fill `NaN` gaps, column by column.
pub fn fill_gaps(prices: &mut Array2<f64>) {
  for mut col in prices.columns_mut() {
    let mut next = f64::NAN;
    for v in col.iter_mut().rev() {
      if v.is_nan() {
        *v = next;
      } else {
        next = *v;
      }
    }

    let mut prev = f64::NAN;
    for v in col.iter_mut() {
      if v.is_nan() {
        *v = prev;
      } else {
        prev = *v;
      }
    }
  }
}

/// Remove rows that still contain a gap.
pub fn drop_incomplete_rows(
  dates: Vec<NaiveDate>,
  prices: Array2<f64>,
) -> (Vec<NaiveDate>, Array2<f64>) {
  let keep: Vec<usize> = prices
    .outer_iter()
    .enumerate()
    .filter(|(_, row)| row.iter().all(|v| !v.is_nan()))
    .map(|(i, _)| i)
    .collect();

  if keep.len() < prices.nrows() {
    debug!(
      dropped = prices.nrows() - keep.len(),
      "dropped rows with unrepairable gaps"
    );
  }

  let dates = keep.iter().map(|&i| dates[i]).collect();
  (dates, prices.select(Axis(0), &keep))
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use ndarray::array;

  use super::*;

  fn from_str(data: &str) -> Result<PriceSeries> {
    let reader = ReaderBuilder::new()
      .trim(Trim::All)
      .from_reader(data.as_bytes());
    read_prices(reader, DEFAULT_DATE_COLUMN)
  }

  #[test]
  fn gaps_are_backward_then_forward_filled() {
    let mut p = array![
      [f64::NAN, 1.0],
      [2.0, f64::NAN],
      [f64::NAN, 3.0],
      [4.0, f64::NAN]
    ];
    fill_gaps(&mut p);

    assert_eq!(p, array![[2.0, 1.0], [2.0, 3.0], [4.0, 3.0], [4.0, 3.0]]);
  }

  #[test]
  fn rows_are_sorted_by_date() {
    let series = from_str(
      "Date,AAA,BBB\n\
       2024-01-03,12,22\n\
       2024-01-01,10,20\n\
       2024-01-02,11,21\n",
    )
    .unwrap();

    let dates = series.dates().unwrap();
    assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(dates[2], NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    assert_eq!(series.prices().column(0).to_vec(), vec![10.0, 11.0, 12.0]);
    assert_eq!(series.tickers(), &["AAA".to_string(), "BBB".to_string()]);
  }

  #[test]
  fn empty_cells_are_repaired() {
    let series = from_str(
      "Date,AAA,BBB\n\
       2024-01-01,,20\n\
       2024-01-02,11,\n\
       2024-01-03,12,22\n",
    )
    .unwrap();

    assert_eq!(
      series.prices(),
      &array![[11.0, 20.0], [11.0, 22.0], [12.0, 22.0]]
    );
    assert!(series.validate().is_ok());
  }

  #[test]
  fn column_without_quotes_drops_every_row() {
    let series = from_str(
      "Date,AAA,BBB\n\
       2024-01-01,10,\n\
       2024-01-02,11,\n",
    )
    .unwrap();

    assert!(series.is_empty());
  }

  #[test]
  fn date_column_may_be_anywhere() {
    let series = from_str(
      "AAA,Date,BBB\n\
       10,2024-01-01 00:00:00,20\n\
       11,2024-01-02 00:00:00,21\n",
    )
    .unwrap();

    assert_eq!(series.tickers(), &["AAA".to_string(), "BBB".to_string()]);
    assert_eq!(series.prices()[[1, 1]], 21.0);
  }

  #[test]
  fn missing_date_column_is_reported() {
    let err = from_str("Day,AAA\n2024-01-01,1\n").unwrap_err();
    assert!(matches!(err, FrontierError::MissingColumn(c) if c == "Date"));
  }

  #[test]
  fn malformed_date_is_reported() {
    let err = from_str("Date,AAA\n01/02/2024,1\n").unwrap_err();
    assert!(matches!(err, FrontierError::DateParse(_)));
  }

  #[test]
  fn csv_source_reads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "Date,AAA,BBB,CCC").unwrap();
    writeln!(file, "2024-01-01,10,20,30").unwrap();
    writeln!(file, "2024-01-02,10.5,19.5,30.3").unwrap();
    writeln!(file, "2024-01-03,10.2,19.9,").unwrap();
    file.flush().unwrap();

    let series = CsvPriceSource::new(file.path()).load_prices().unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.prices()[[2, 2]], 30.3);
  }

  #[test]
  fn missing_file_is_an_error() {
    let source = CsvPriceSource::new("/definitely/not/here.csv");
    assert!(source.load_prices().is_err());
  }
}
