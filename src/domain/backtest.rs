//! Backtest pipeline: bars → indicators → signals → simulation → metrics.

use chrono::NaiveDate;

use crate::domain::config::{BacktestConfig, StrategyConfig};
use crate::domain::error::TrendtraderError;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::donchian::calculate_donchian;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::kalman::calculate_kalman;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::metrics::{drawdown_series, Metrics};
use crate::domain::ohlcv::{is_strictly_ordered, OhlcvBar};
use crate::domain::position::ClosedTrade;
use crate::domain::signal::{compose_signals, PathHit};
use crate::domain::simulator::run_simulation;

/// Everything a report sink needs: summary metrics plus the full set of
/// series aligned 1:1 with the input bars. Undefined indicator values are
/// NaN in these vectors.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub rsi: Vec<f64>,
    pub kalman: Vec<f64>,
    pub donchian_upper: Vec<f64>,
    pub donchian_lower: Vec<f64>,
    pub atr: Vec<f64>,
    pub entries: Vec<bool>,
    pub exits: Vec<bool>,
    pub direction: Vec<i8>,
    pub position: Vec<i8>,
    pub stop: Vec<Option<f64>>,
    pub equity: Vec<f64>,
    pub benchmark_equity: Vec<f64>,
    pub drawdown: Vec<f64>,
    pub path_hits: Vec<PathHit>,
    pub trades: Vec<ClosedTrade>,
    pub metrics: Metrics,
}

pub fn run_backtest(
    bars: &[OhlcvBar],
    symbol: &str,
    backtest: &BacktestConfig,
    strategy: &StrategyConfig,
) -> Result<BacktestResult, TrendtraderError> {
    if bars.is_empty() {
        return Err(TrendtraderError::NoData {
            symbol: symbol.to_string(),
        });
    }
    if bars.len() < 2 {
        return Err(TrendtraderError::InsufficientData {
            symbol: symbol.to_string(),
            bars: bars.len(),
            minimum: 2,
        });
    }
    if !is_strictly_ordered(bars) {
        return Err(TrendtraderError::Data {
            reason: format!("{} bars are not strictly date-ordered", symbol),
        });
    }

    let signals = compose_signals(bars, strategy);
    let simulation = run_simulation(bars, &signals, backtest, strategy);
    let metrics = Metrics::compute(&simulation, bars, backtest);

    // Display indicators are computed for the report regardless of which
    // composer ran; the composer builds its own internally.
    let ema_fast = calculate_ema(bars, strategy.ema_fast_window);
    let ema_slow = calculate_ema(bars, strategy.ema_slow_window);
    let rsi = calculate_rsi(bars, strategy.rsi_window);
    let kalman = calculate_kalman(
        bars,
        strategy.kalman.process_noise,
        strategy.kalman.measurement_noise,
    );
    let donchian = calculate_donchian(bars, strategy.donchian_window);
    let atr = calculate_atr(bars, strategy.atr_window);

    let n = bars.len();
    let first_close = bars[0].close;
    let benchmark_equity: Vec<f64> = bars
        .iter()
        .map(|b| backtest.initial_cash * b.close / first_close)
        .collect();
    let drawdown = drawdown_series(&simulation.equity);
    let exits: Vec<bool> = (0..n)
        .map(|k| signals.long_exits[k] || signals.short_exits[k])
        .collect();

    Ok(BacktestResult {
        dates: bars.iter().map(|b| b.date).collect(),
        close: bars.iter().map(|b| b.close).collect(),
        ema_fast: (0..n).map(|k| ema_fast.simple_at(k)).collect(),
        ema_slow: (0..n).map(|k| ema_slow.simple_at(k)).collect(),
        rsi: (0..n).map(|k| rsi.simple_at(k)).collect(),
        kalman: (0..n).map(|k| kalman.simple_at(k)).collect(),
        donchian_upper: (0..n).map(|k| donchian.channel_at(k).0).collect(),
        donchian_lower: (0..n).map(|k| donchian.channel_at(k).1).collect(),
        atr: (0..n).map(|k| atr.simple_at(k)).collect(),
        entries: signals.entries,
        exits,
        direction: signals.direction,
        position: simulation.position.clone(),
        stop: simulation.stop.clone(),
        equity: simulation.equity.clone(),
        benchmark_equity,
        drawdown,
        path_hits: signals.path_hits,
        trades: simulation.trades,
        metrics,
    })
}
