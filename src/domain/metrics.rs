//! Performance metrics and statistics.
//!
//! Pure aggregation over the simulator's output. Degenerate quantities
//! (zero-variance returns, zero trades) are reported as `None`, never as a
//! silent zero that would misrepresent performance as certain.

use crate::domain::config::BacktestConfig;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::simulator::SimulationResult;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    /// Buy-and-hold close-to-close return over the same span.
    pub benchmark_return: f64,
    pub annualized_return: f64,
    /// `None` when the return series has zero variance.
    pub sharpe_ratio: Option<f64>,
    /// Largest peak-to-trough equity decline as a negative fraction;
    /// 0.0 when equity never dips below its running peak.
    pub max_drawdown: f64,
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    /// `None` when no trades were taken.
    pub win_rate: Option<f64>,
    /// `None` when no trades were taken; +∞ with wins and no losses.
    pub profit_factor: Option<f64>,
}

impl Metrics {
    pub fn compute(
        simulation: &SimulationResult,
        bars: &[OhlcvBar],
        config: &BacktestConfig,
    ) -> Self {
        let final_equity = simulation
            .equity
            .last()
            .copied()
            .unwrap_or(config.initial_cash);
        let total_return = final_equity / config.initial_cash - 1.0;

        let benchmark_return = match (bars.first(), bars.last()) {
            (Some(first), Some(last)) if first.close > 0.0 => last.close / first.close - 1.0,
            _ => 0.0,
        };

        let n = simulation.net_returns.len() as f64;
        let annualized_return = if n > 0.0 {
            (1.0 + total_return).powf(config.bars_per_year / n) - 1.0
        } else {
            0.0
        };

        let sharpe_ratio = compute_sharpe(&simulation.net_returns, config.bars_per_year);
        let max_drawdown = drawdown_series(&simulation.equity)
            .into_iter()
            .fold(0.0_f64, f64::min);

        let trades_won = simulation
            .trades
            .iter()
            .filter(|t| t.net_return > 0.0)
            .count();
        let trades_lost = simulation
            .trades
            .iter()
            .filter(|t| t.net_return < 0.0)
            .count();
        let total_trades = simulation.trades.len();

        let win_rate = if total_trades > 0 {
            Some(trades_won as f64 / total_trades as f64)
        } else {
            None
        };

        let profit_factor = if total_trades == 0 {
            None
        } else {
            let wins: f64 = simulation
                .trades
                .iter()
                .filter(|t| t.net_return > 0.0)
                .map(|t| t.net_return)
                .sum();
            let losses: f64 = simulation
                .trades
                .iter()
                .filter(|t| t.net_return < 0.0)
                .map(|t| -t.net_return)
                .sum();
            if losses > 0.0 {
                Some(wins / losses)
            } else if wins > 0.0 {
                Some(f64::INFINITY)
            } else {
                Some(0.0)
            }
        };

        Metrics {
            total_return,
            benchmark_return,
            annualized_return,
            sharpe_ratio,
            max_drawdown,
            total_trades,
            trades_won,
            trades_lost,
            win_rate,
            profit_factor,
        }
    }
}

/// Annualized Sharpe ratio; `None` when the return deviation is zero.
fn compute_sharpe(returns: &[f64], bars_per_year: f64) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        Some(mean * bars_per_year / (stddev * bars_per_year.sqrt()))
    } else {
        None
    }
}

/// Per-bar drawdown from the running equity peak, each value <= 0.
pub fn drawdown_series(equity: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(equity.len());
    let mut peak = f64::MIN;

    for &value in equity {
        if value > peak {
            peak = value;
        }
        out.push(if peak > 0.0 { (value - peak) / peak } else { 0.0 });
    }

    out
}
