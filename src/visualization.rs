//! # Visualization
//!
//! $$
//! \{(\sigma_k, \mu_k, S_k)\}_{k=1}^{N} \mapsto \text{scatter in the } (\sigma, \mu) \text{ plane coloured by } S
//! $$
//!
//! Plotly renderings of a frontier run. Nothing in the engine depends on this module.
use std::fs;
use std::path::Path;

use plotly::Bar;
use plotly::Layout;
use plotly::Plot;
use plotly::Scatter;
use plotly::common::ColorScale;
use plotly::common::ColorScalePalette;
use plotly::common::Line;
use plotly::common::Marker;
use plotly::common::Mode;
use plotly::common::Title;
use plotly::layout::Axis;
use tracing::debug;

use crate::error::Result;
use crate::quant::portfolio::FrontierResultSet;
use crate::quant::portfolio::ReturnStatistics;

/// Bar chart of annualized per-asset volatility, in percent.
pub fn volatility_chart(stats: &ReturnStatistics) -> Plot {
  let vols: Vec<f64> = stats.volatilities().iter().map(|v| v * 100.0).collect();
  let top = vols.iter().copied().fold(0.0f64, f64::max);

  let mut plot = Plot::new();
  plot.add_trace(Bar::new(stats.tickers.clone(), vols).name("volatility"));
  plot.set_layout(
    Layout::new()
      .title(Title::with_text("Annualized Volatility by Ticker (%)"))
      .x_axis(Axis::new().title(Title::with_text("Ticker")))
      .y_axis(
        Axis::new()
          .title(Title::with_text("Annual Volatility (%)"))
          .range(vec![0.0, top * 1.1]),
      ),
  );
  plot
}

/// Builder for the frontier scatter chart.
pub struct FrontierPlotter {
  title: String,
  marker_size: usize,
  show_efficient: bool,
}

impl Default for FrontierPlotter {
  fn default() -> Self {
    Self::new()
  }
}

impl FrontierPlotter {
  /// Plotter with the default title, marker size 5 and no overlay.
  pub fn new() -> Self {
    Self {
      title: "Efficient Frontier (simulated portfolios)".into(),
      marker_size: 5,
      show_efficient: false,
    }
  }

  /// Chart title.
  pub fn title(mut self, title: &str) -> Self {
    self.title = title.into();
    self
  }

  /// Marker size in pixels, at least 1.
  pub fn marker_size(mut self, size: usize) -> Self {
    self.marker_size = size.max(1);
    self
  }

  /// Overlay the non-dominated trials as a line.
  pub fn show_efficient(mut self, show: bool) -> Self {
    self.show_efficient = show;
    self
  }

  /// Scatter of (volatility, expected return) coloured by Sharpe ratio.
  ///
  /// Trials with an undefined Sharpe ratio go to a separate grey trace.
  pub fn plot(&self, results: &FrontierResultSet) -> Plot {
    let mut defined = Series::default();
    let mut undefined = Series::default();

    for (i, p) in results.iter().enumerate() {
      let target = match p.sharpe_ratio {
        Some(s) => {
          defined.sharpe.push(s);
          &mut defined
        }
        None => &mut undefined,
      };
      target.vol.push(p.volatility);
      target.ret.push(p.expected_return);
      target.label.push(format!("trial {i}"));
    }

    let mut plot = Plot::new();

    if !defined.vol.is_empty() {
      plot.add_trace(
        Scatter::new(defined.vol, defined.ret)
          .mode(Mode::Markers)
          .name("Sharpe ratio")
          .text_array(defined.label)
          .marker(
            Marker::new()
              .size(self.marker_size)
              .color_array(defined.sharpe)
              .color_scale(ColorScale::Palette(ColorScalePalette::Viridis))
              .show_scale(true),
          ),
      );
    }

    if !undefined.vol.is_empty() {
      plot.add_trace(
        Scatter::new(undefined.vol, undefined.ret)
          .mode(Mode::Markers)
          .name("undefined Sharpe")
          .text_array(undefined.label)
          .marker(Marker::new().size(self.marker_size).color("lightgray")),
      );
    }

    if self.show_efficient {
      let idx = results.efficient_subset();
      let vol: Vec<f64> = idx.iter().map(|&i| results.as_slice()[i].volatility).collect();
      let ret: Vec<f64> = idx
        .iter()
        .map(|&i| results.as_slice()[i].expected_return)
        .collect();
      plot.add_trace(
        Scatter::new(vol, ret)
          .mode(Mode::Lines)
          .name("non-dominated")
          .line(Line::new().width(1.5).color("black")),
      );
    }

    plot.set_layout(
      Layout::new()
        .title(Title::with_text(self.title.as_str()))
        .x_axis(Axis::new().title(Title::with_text("Volatility")))
        .y_axis(Axis::new().title(Title::with_text("Expected Return"))),
    );
    plot
  }
}

#[derive(Default)]
struct Series {
  vol: Vec<f64>,
  ret: Vec<f64>,
  sharpe: Vec<f64>,
  label: Vec<String>,
}

/// Write `plot` as a standalone HTML page.
pub fn write_html(plot: &Plot, path: impl AsRef<Path>) -> Result<()> {
  let path = path.as_ref();
  fs::write(path, plot.to_html())?;
  debug!(path = %path.display(), "chart written");
  Ok(())
}
