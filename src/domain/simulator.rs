//! Trade simulation: signals → positions, returns, equity, trades.
//!
//! An explicit state machine over the bar sequence with states flat, long
//! and short. Signals computed on bar k take effect from bar k+1 (one-bar
//! execution lag), so a bar's return contribution always comes from the
//! position carried into that bar. Entries and exits execute at the signal
//! bar's close. Short exposure negates the sign of the price return; there
//! is no synthetic inverted price series.
//!
//! Accounting is in return space: per-bar net return
//!   r[k] = held_sign × f × (close[k]/close[k-1] − 1) − fee_rate × f × turnover[k]
//! where f is the position size fraction and turnover counts position
//! changes at bar k (a direct flip counts two). Equity is the running
//! product initial_cash × Π(1 + r).

use crate::domain::config::{BacktestConfig, StrategyConfig};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::position::{ClosedTrade, Direction, ExitReason, OpenPosition};
use crate::domain::signal::SignalSet;

#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Position held during each bar (the one earning that bar's return).
    pub position: Vec<i8>,
    /// Stop level carried out of each bar while a position is open.
    pub stop: Vec<Option<f64>>,
    /// Per-bar net return, commission included.
    pub net_returns: Vec<f64>,
    /// Equity after each bar.
    pub equity: Vec<f64>,
    pub trades: Vec<ClosedTrade>,
}

struct PortfolioState {
    open: Option<OpenPosition>,
    equity: f64,
}

pub fn run_simulation(
    bars: &[OhlcvBar],
    signals: &SignalSet,
    backtest: &BacktestConfig,
    strategy: &StrategyConfig,
) -> SimulationResult {
    let n = bars.len();
    let fraction = strategy.position_size_fraction;
    let fee = backtest.fee_rate;

    let mut result = SimulationResult {
        position: Vec::with_capacity(n),
        stop: Vec::with_capacity(n),
        net_returns: Vec::with_capacity(n),
        equity: Vec::with_capacity(n),
        trades: Vec::new(),
    };
    let mut state = PortfolioState {
        open: None,
        equity: backtest.initial_cash,
    };

    for k in 0..n {
        let close = bars[k].close;
        let held_sign = state
            .open
            .as_ref()
            .map(|p| p.direction.sign())
            .unwrap_or(0.0);
        result.position.push(held_sign as i8);

        let market_return = if k == 0 {
            0.0
        } else {
            close / bars[k - 1].close - 1.0
        };
        let mut bar_return = held_sign * fraction * market_return;
        let mut turnover = 0.0;

        // Stop management happens before signal exits: a breached stop closes
        // at this close no matter what the composer says.
        if let Some(pos) = state.open.as_mut() {
            if pos.stop_breached(close) {
                let reason = pos.stop_exit_reason();
                let trade = close_trade(pos, k, bars, fraction, fee, 2.0, reason);
                result.trades.push(trade);
                turnover += 1.0;
                state.open = None;
            } else if strategy.trailing_stop_enabled {
                pos.ratchet_stop(close, strategy.stop_loss_pct);
            }
        }

        // Composer exits, gated to the direction actually held.
        if let Some(pos) = &state.open {
            let exit_hit = match pos.direction {
                Direction::Long => signals.long_exits[k],
                Direction::Short => signals.short_exits[k],
            };
            if exit_hit {
                let trade = close_trade(pos, k, bars, fraction, fee, 2.0, ExitReason::Signal);
                result.trades.push(trade);
                turnover += 1.0;
                state.open = None;
            }
        }

        // Entries. An opposite-direction entry is two atomic transitions:
        // close the held position, then open the new one, each paying
        // commission.
        if signals.entries[k] {
            if let Some(direction) = Direction::from_signal(signals.direction[k]) {
                let opposite = state
                    .open
                    .as_ref()
                    .is_some_and(|p| p.direction != direction);
                if opposite {
                    if let Some(pos) = state.open.take() {
                        let trade =
                            close_trade(&pos, k, bars, fraction, fee, 2.0, ExitReason::Reversal);
                        result.trades.push(trade);
                        turnover += 1.0;
                    }
                }
                let permitted = direction == Direction::Long || strategy.allow_shorting;
                if state.open.is_none() && permitted {
                    state.open = Some(OpenPosition::open(
                        direction,
                        k,
                        bars[k].date,
                        close,
                        strategy.stop_loss_pct,
                    ));
                    turnover += 1.0;
                }
            }
        }

        bar_return -= fee * fraction * turnover;
        result.net_returns.push(bar_return);
        state.equity *= 1.0 + bar_return;
        result.equity.push(state.equity);
        result.stop.push(state.open.as_ref().and_then(|p| p.stop_price));
    }

    // A position still open at the end of the series is closed for trade
    // accounting only: no commission, equity already reflects every bar.
    if let Some(pos) = &state.open {
        if n > 0 {
            let trade = close_trade(pos, n - 1, bars, fraction, fee, 1.0, ExitReason::EndOfData);
            result.trades.push(trade);
        }
    }

    result
}

fn close_trade(
    pos: &OpenPosition,
    exit_index: usize,
    bars: &[OhlcvBar],
    fraction: f64,
    fee: f64,
    commission_units: f64,
    exit_reason: ExitReason,
) -> ClosedTrade {
    let exit_price = bars[exit_index].close;
    let price_return = exit_price / pos.entry_price - 1.0;
    let net_return = pos.direction.sign() * fraction * price_return
        - fee * fraction * commission_units;

    ClosedTrade {
        direction: pos.direction,
        entry_index: pos.entry_index,
        exit_index,
        entry_date: pos.entry_date,
        exit_date: bars[exit_index].date,
        entry_price: pos.entry_price,
        exit_price,
        net_return,
        exit_reason,
    }
}
