//! # Portfolio Data
//!
//! $$
//! r_{t,i} = \frac{p_{t,i}}{p_{t-1,i}} - 1
//! $$
//!
//! Cleaned price tables and periodic simple returns.

use std::collections::HashSet;

use chrono::NaiveDate;
use ndarray::Array2;
use ndarray::Axis;
use ndarray::s;

use crate::error::FrontierError;
use crate::error::Result;
use crate::traits::PriceSource;

/// Gap-free price table: rows are periods in ascending date order, columns are assets.
#[derive(Clone, Debug)]
pub struct PriceSeries {
  dates: Option<Vec<NaiveDate>>,
  tickers: Vec<String>,
  prices: Array2<f64>,
}

impl PriceSeries {
  /// Build a dated price table.
  pub fn new(dates: Vec<NaiveDate>, tickers: Vec<String>, prices: Array2<f64>) -> Result<Self> {
    if dates.len() != prices.nrows() {
      return Err(FrontierError::DimensionMismatch {
        expected: dates.len(),
        found: prices.nrows(),
      });
    }

    Self::build(Some(dates), tickers, prices)
  }

  /// Build an undated table from `(ticker, prices)` columns of equal length.
  pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<f64>)>) -> Result<Self> {
    let n_rows = columns.first().map_or(0, |(_, c)| c.len());
    let n_cols = columns.len();
    let mut tickers = Vec::with_capacity(n_cols);
    let mut prices = Array2::<f64>::zeros((n_rows, n_cols));

    for (j, (ticker, column)) in columns.into_iter().enumerate() {
      if column.len() != n_rows {
        return Err(FrontierError::DimensionMismatch {
          expected: n_rows,
          found: column.len(),
        });
      }
      for (i, p) in column.into_iter().enumerate() {
        prices[[i, j]] = p;
      }
      tickers.push(ticker.into());
    }

    Self::build(None, tickers, prices)
  }

  fn build(
    dates: Option<Vec<NaiveDate>>,
    tickers: Vec<String>,
    prices: Array2<f64>,
  ) -> Result<Self> {
    if tickers.len() != prices.ncols() {
      return Err(FrontierError::DimensionMismatch {
        expected: tickers.len(),
        found: prices.ncols(),
      });
    }

    let mut seen = HashSet::with_capacity(tickers.len());
    for t in &tickers {
      if !seen.insert(t.as_str()) {
        return Err(FrontierError::DuplicateTicker(t.clone()));
      }
    }

    Ok(Self {
      dates,
      tickers,
      prices,
    })
  }

  /// Period dates, if the table is dated.
  pub fn dates(&self) -> Option<&[NaiveDate]> {
    self.dates.as_deref()
  }

  /// Asset identifiers in column order.
  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  /// Raw price matrix (periods x assets).
  pub fn prices(&self) -> &Array2<f64> {
    &self.prices
  }

  /// Number of periods.
  pub fn len(&self) -> usize {
    self.prices.nrows()
  }

  pub fn is_empty(&self) -> bool {
    self.prices.nrows() == 0
  }

  /// Column index of `ticker`.
  pub fn column_index(&self, ticker: &str) -> Result<usize> {
    self
      .tickers
      .iter()
      .position(|t| t == ticker)
      .ok_or_else(|| FrontierError::UnknownTicker(ticker.to_string()))
  }

  /// Sub-table holding `tickers`, in the order given.
  pub fn select<S: AsRef<str>>(&self, tickers: &[S]) -> Result<Self> {
    let mut idx = Vec::with_capacity(tickers.len());
    let mut seen = HashSet::with_capacity(tickers.len());

    for t in tickers {
      let t = t.as_ref();
      if !seen.insert(t) {
        return Err(FrontierError::DuplicateTicker(t.to_string()));
      }
      idx.push(self.column_index(t)?);
    }

    Ok(Self {
      dates: self.dates.clone(),
      tickers: idx.iter().map(|&j| self.tickers[j].clone()).collect(),
      prices: self.prices.select(Axis(1), &idx),
    })
  }

  /// Check that every price is finite and strictly positive.
  pub fn validate(&self) -> Result<()> {
    for ((row, col), &value) in self.prices.indexed_iter() {
      if !value.is_finite() || value <= 0.0 {
        return Err(FrontierError::InvalidPrice {
          ticker: self.tickers[col].clone(),
          row,
          value,
        });
      }
    }

    Ok(())
  }
}

impl PriceSource for PriceSeries {
  fn load_prices(&self) -> Result<PriceSeries> {
    Ok(self.clone())
  }
}

/// Periodic simple returns. The first period has no predecessor and is dropped.
pub fn simple_returns(prices: &Array2<f64>) -> Array2<f64> {
  if prices.nrows() < 2 {
    return Array2::zeros((0, prices.ncols()));
  }

  let prev = prices.slice(s![..-1, ..]);
  let next = prices.slice(s![1.., ..]);
  &next / &prev - 1.0
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;
  use ndarray::array;

  use super::*;

  fn two_assets() -> PriceSeries {
    PriceSeries::from_columns(vec![
      ("A", vec![100.0, 101.0, 102.0, 103.0]),
      ("B", vec![50.0, 49.0, 50.0, 51.0]),
    ])
    .unwrap()
  }

  #[test]
  fn simple_returns_drop_first_period() {
    let r = simple_returns(two_assets().prices());

    assert_eq!(r.dim(), (3, 2));
    assert_relative_eq!(r[[0, 0]], 0.01, epsilon = 1e-15);
    assert_relative_eq!(r[[1, 0]], 1.0 / 101.0, epsilon = 1e-15);
    assert_relative_eq!(r[[0, 1]], -0.02, epsilon = 1e-15);
    assert_relative_eq!(r[[2, 1]], 0.02, epsilon = 1e-15);
  }

  #[test]
  fn simple_returns_of_single_period_is_empty() {
    let r = simple_returns(&array![[1.0, 2.0]]);
    assert_eq!(r.dim(), (0, 2));
  }

  #[test]
  fn select_follows_requested_order() {
    let sub = two_assets().select(&["B", "A"]).unwrap();

    assert_eq!(sub.tickers(), &["B".to_string(), "A".to_string()]);
    assert_eq!(sub.prices()[[0, 0]], 50.0);
    assert_eq!(sub.prices()[[3, 1]], 103.0);
  }

  #[test]
  fn select_rejects_unknown_and_duplicate_tickers() {
    let series = two_assets();

    assert!(matches!(
      series.select(&["A", "ZZZ"]),
      Err(FrontierError::UnknownTicker(t)) if t == "ZZZ"
    ));
    assert!(matches!(
      series.select(&["A", "A"]),
      Err(FrontierError::DuplicateTicker(t)) if t == "A"
    ));
  }

  #[test]
  fn validate_reports_first_bad_price() {
    let series = PriceSeries::from_columns(vec![
      ("A", vec![1.0, 2.0, 3.0]),
      ("B", vec![1.0, f64::NAN, 0.0]),
    ])
    .unwrap();

    match series.validate() {
      Err(FrontierError::InvalidPrice { ticker, row, .. }) => {
        assert_eq!(ticker, "B");
        assert_eq!(row, 1);
      }
      other => panic!("expected InvalidPrice, got {other:?}"),
    }
  }

  #[test]
  fn ragged_columns_are_rejected() {
    let res = PriceSeries::from_columns(vec![("A", vec![1.0, 2.0]), ("B", vec![1.0])]);
    assert!(matches!(
      res,
      Err(FrontierError::DimensionMismatch {
        expected: 2,
        found: 1
      })
    ));
  }

  #[test]
  fn dated_series_checks_row_count() {
    let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let res = PriceSeries::new(vec![d], vec!["A".into()], array![[1.0], [2.0]]);
    assert!(res.is_err());
  }
}
