use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use clap::ArgAction;
use clap::Parser;
use clap::ValueEnum;
use frontier_rs::quant::portfolio::CsvPriceSource;
use frontier_rs::quant::portfolio::FrontierConfig;
use frontier_rs::quant::portfolio::FrontierEngine;
use frontier_rs::quant::portfolio::FrontierRun;
use frontier_rs::quant::portfolio::SimulatedPortfolio;
use frontier_rs::quant::portfolio::TRADING_DAYS;
use frontier_rs::quant::portfolio::WeightScheme;
use frontier_rs::traits::PriceSource;
use frontier_rs::visualization::FrontierPlotter;
use frontier_rs::visualization::volatility_chart;
use frontier_rs::visualization::write_html;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use prettytable::Table;
use prettytable::row;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Sample the efficient frontier of a basket of assets from a close-price CSV.
#[derive(Parser, Debug)]
#[command(name = "frontier", version, about, long_about = None)]
struct Cli {
  /// CSV with a date column followed by one close-price column per ticker
  #[arg(short, long)]
  data: PathBuf,

  /// Name of the date column
  #[arg(long, default_value = "Date")]
  date_column: String,

  /// Tickers to include, comma separated (default: every column)
  #[arg(short, long, value_delimiter = ',')]
  tickers: Vec<String>,

  /// Number of Monte Carlo trials
  #[arg(short = 'n', long, default_value_t = 2000)]
  trials: usize,

  /// Periods per year
  #[arg(long, default_value_t = TRADING_DAYS)]
  annualization: f64,

  /// Seed for a reproducible run
  #[arg(long)]
  seed: Option<u64>,

  /// Annual risk-free rate used in Sharpe ratios
  #[arg(long, default_value_t = 0.0)]
  risk_free: f64,

  /// Weight sampler
  #[arg(long, value_enum, default_value_t = SchemeArg::Uniform)]
  scheme: SchemeArg,

  /// Run trials on a single thread
  #[arg(long)]
  sequential: bool,

  /// Write the frontier scatter to this HTML file
  #[arg(long)]
  plot_frontier: Option<PathBuf>,

  /// Write the per-asset volatility bars to this HTML file
  #[arg(long)]
  plot_volatility: Option<PathBuf>,

  /// Verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = ArgAction::Count)]
  verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SchemeArg {
  /// Normalized independent uniforms
  Uniform,
  /// Normalized exponentials, uniform on the simplex
  Dirichlet,
}

impl From<SchemeArg> for WeightScheme {
  fn from(arg: SchemeArg) -> Self {
    match arg {
      SchemeArg::Uniform => WeightScheme::UniformNormalized,
      SchemeArg::Dirichlet => WeightScheme::FlatDirichlet,
    }
  }
}

fn init_tracing(verbose: u8) {
  let level = match verbose {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let source = CsvPriceSource::new(&cli.data).with_date_column(&cli.date_column);
  let prices = source
    .load_prices()
    .with_context(|| format!("loading prices from {}", cli.data.display()))?;

  let tickers = if cli.tickers.is_empty() {
    prices.tickers().to_vec()
  } else {
    cli.tickers.clone()
  };

  let mut config = FrontierConfig::default()
    .with_trials(cli.trials)
    .with_annualization_factor(cli.annualization)
    .with_risk_free_rate(cli.risk_free)
    .with_weight_scheme(cli.scheme.into())
    .with_parallel(!cli.sequential);
  if let Some(seed) = cli.seed {
    config = config.with_seed(seed);
  }

  let spinner = ProgressBar::new_spinner();
  spinner.set_style(ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")?);
  spinner.set_message(format!("sampling {} portfolios", cli.trials));
  spinner.enable_steady_tick(Duration::from_millis(100));

  let run = FrontierEngine::new(config).run(&prices, &tickers);
  spinner.finish_and_clear();
  let run = run.context("frontier run failed")?;

  info!(seed = run.seed, "run complete; pass --seed to reproduce");

  print_assets(&run);
  print_summary(&run)?;

  if let Some(path) = &cli.plot_frontier {
    let plot = FrontierPlotter::new().show_efficient(true).plot(&run.results);
    write_html(&plot, path).with_context(|| format!("writing {}", path.display()))?;
  }
  if let Some(path) = &cli.plot_volatility {
    write_html(&volatility_chart(&run.statistics), path)
      .with_context(|| format!("writing {}", path.display()))?;
  }

  Ok(())
}

fn print_assets(run: &FrontierRun) {
  let stats = &run.statistics;
  let vols = stats.volatilities();

  let mut table = Table::new();
  table.set_titles(row!["Ticker", "Mean return (%)", "Volatility (%)"]);
  for (i, ticker) in stats.tickers.iter().enumerate() {
    table.add_row(row![
      ticker,
      format!("{:.2}", stats.mean[i] * 100.0),
      format!("{:.2}", vols[i] * 100.0)
    ]);
  }
  table.printstd();
}

fn print_summary(run: &FrontierRun) -> Result<()> {
  let results = &run.results;
  let picks: [(&str, Option<(usize, &SimulatedPortfolio)>); 3] = [
    ("Max Sharpe", results.max_sharpe()),
    ("Min volatility", results.min_volatility()),
    ("Max return", results.max_return()),
  ];

  let mut table = Table::new();
  table.set_titles(row!["Portfolio", "Trial", "Volatility", "Return", "Sharpe", "Weights"]);
  for (label, pick) in picks {
    let Some((trial, p)) = pick else {
      continue;
    };
    let weights = run.weights_for_trial(trial)?;
    let weights = run
      .statistics
      .tickers
      .iter()
      .zip(weights.iter())
      .map(|(t, w)| format!("{t}={:.1}%", w * 100.0))
      .collect::<Vec<_>>()
      .join(" ");
    let sharpe = p
      .sharpe_ratio
      .map_or_else(|| "undefined".to_string(), |s| format!("{s:.3}"));

    table.add_row(row![
      label,
      trial,
      format!("{:.4}", p.volatility),
      format!("{:.4}", p.expected_return),
      sharpe,
      weights
    ]);
  }
  table.printstd();

  println!(
    "{} trials, {} with undefined Sharpe ratio, {} non-dominated, seed {}",
    results.len(),
    results.undefined_sharpe_count(),
    results.efficient_subset().len(),
    run.seed
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scheme_flag_accepts_known_values() {
    let cli =
      Cli::try_parse_from(["frontier", "--data", "p.csv", "--scheme", "dirichlet"]).unwrap();
    assert_eq!(WeightScheme::from(cli.scheme), WeightScheme::FlatDirichlet);

    let cli = Cli::try_parse_from(["frontier", "--data", "p.csv"]).unwrap();
    assert_eq!(WeightScheme::from(cli.scheme), WeightScheme::UniformNormalized);
  }

  #[test]
  fn misspelled_scheme_is_rejected() {
    let err = Cli::try_parse_from(["frontier", "--data", "p.csv", "--scheme", "dirichlett"]);
    assert!(err.is_err());
  }

  #[test]
  fn tickers_are_comma_separated() {
    let cli = Cli::try_parse_from(["frontier", "-d", "p.csv", "-t", "AAPL,MSFT"]).unwrap();
    assert_eq!(cli.tickers, vec!["AAPL".to_string(), "MSFT".to_string()]);
    assert_eq!(cli.trials, 2000);
  }
}
