use std::hint::black_box;

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use frontier_rs::quant::portfolio::FrontierSimulator;
use frontier_rs::quant::portfolio::PriceSeries;
use frontier_rs::quant::portfolio::TRADING_DAYS;
use frontier_rs::quant::portfolio::WeightSampler;
use frontier_rs::quant::portfolio::WeightScheme;
use frontier_rs::quant::portfolio::compute_statistics;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

const TRIALS: usize = 2000;

fn synthetic_prices(n_assets: usize, n_periods: usize) -> PriceSeries {
  let mut rng = StdRng::seed_from_u64(7);
  let mut columns = Vec::with_capacity(n_assets);
  for j in 0..n_assets {
    let mut p = 100.0;
    let mut col = Vec::with_capacity(n_periods);
    for _ in 0..n_periods {
      col.push(p);
      p *= 1.0 + rng.random_range(-0.02..0.02);
    }
    columns.push((format!("T{j}"), col));
  }
  PriceSeries::from_columns(columns).unwrap()
}

fn bench_statistics(c: &mut Criterion) {
  let mut group = c.benchmark_group("statistics");

  for &assets in &[2, 10, 50] {
    let prices = synthetic_prices(assets, 1260);
    let tickers = prices.tickers().to_vec();
    group.bench_with_input(BenchmarkId::new("compute", assets), &assets, |b, _| {
      b.iter(|| black_box(compute_statistics(&prices, &tickers, TRADING_DAYS).unwrap()))
    });
  }

  group.finish();
}

fn bench_sampler(c: &mut Criterion) {
  let mut group = c.benchmark_group("sampler");

  for scheme in [WeightScheme::UniformNormalized, WeightScheme::FlatDirichlet] {
    group.bench_function(format!("{scheme:?}"), |b| {
      let mut sampler = WeightSampler::seeded(1, scheme);
      b.iter(|| black_box(sampler.sample(20).unwrap()))
    });
  }

  group.finish();
}

fn bench_simulation(c: &mut Criterion) {
  let mut group = c.benchmark_group("simulation");

  for &assets in &[5, 25] {
    let prices = synthetic_prices(assets, 500);
    let tickers = prices.tickers().to_vec();
    let stats = compute_statistics(&prices, &tickers, TRADING_DAYS).unwrap();
    let sim = FrontierSimulator::new(stats.mean.view(), stats.cov.view(), 42).unwrap();

    group.bench_with_input(BenchmarkId::new("sequential", assets), &assets, |b, _| {
      b.iter(|| black_box(sim.simulate(TRIALS, false).unwrap()))
    });
    group.bench_with_input(BenchmarkId::new("parallel", assets), &assets, |b, _| {
      b.iter(|| black_box(sim.simulate(TRIALS, true).unwrap()))
    });
  }

  group.finish();
}

criterion_group!(benches, bench_statistics, bench_sampler, bench_simulation);
criterion_main!(benches);
