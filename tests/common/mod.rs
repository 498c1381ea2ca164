//! Shared test fixtures.

#![allow(dead_code)]

use chrono::NaiveDate;
use std::io::Write;
use trendtrader::domain::config::{BacktestConfig, StrategyConfig};
use trendtrader::domain::ohlcv::OhlcvBar;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Bars with OHLC collapsed onto the close, one calendar day apart.
pub fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: date(2024, 1, 1) + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000,
        })
        .collect()
}

/// Bars with a symmetric high/low band around the close.
pub fn make_band_bars(prices: &[f64], band: f64) -> Vec<OhlcvBar> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: date(2024, 1, 1) + chrono::Duration::days(i as i64),
            open: close,
            high: close + band,
            low: close - band,
            close,
            volume: 1000,
        })
        .collect()
}

/// Zero-fee, full-size, no-stop configuration for accounting-focused tests.
pub fn frictionless_backtest() -> BacktestConfig {
    BacktestConfig {
        initial_cash: 10_000.0,
        fee_rate: 0.0,
        ..BacktestConfig::default()
    }
}

pub fn frictionless_strategy() -> StrategyConfig {
    StrategyConfig {
        stop_loss_pct: 0.0,
        trailing_stop_enabled: false,
        position_size_fraction: 1.0,
        allow_shorting: true,
        ..StrategyConfig::default()
    }
}

/// Write an OHLCV CSV fixture at `<dir>/<symbol>.csv`.
pub fn write_csv_fixture(dir: &std::path::Path, symbol: &str, bars: &[OhlcvBar]) {
    let path = dir.join(format!("{}.csv", symbol));
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "date,open,high,low,close,volume").unwrap();
    for bar in bars {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            bar.date.format("%Y-%m-%d"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume,
        )
        .unwrap();
    }
}
