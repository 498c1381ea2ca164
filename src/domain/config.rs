//! Run configuration.
//!
//! Immutable parameter objects built once at startup and passed into each
//! run, so parallel scenario runs can never interfere through shared state.

use chrono::NaiveDate;

use crate::domain::signal::SignalKind;

/// Account-level backtest parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_cash: f64,
    /// Proportional commission per position change (fraction of notional).
    pub fee_rate: f64,
    /// Bars per year for annualization (252 for daily equity bars,
    /// 365 for daily crypto, 8760 for hourly crypto).
    pub bars_per_year: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            initial_cash: 10_000.0,
            fee_rate: 0.001,
            bars_per_year: 252.0,
        }
    }
}

/// Signal and risk-management parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub signal: SignalKind,
    pub ema_fast_window: usize,
    pub ema_slow_window: usize,
    pub rsi_window: usize,
    pub donchian_window: usize,
    pub atr_window: usize,
    /// Stop distance as a fraction of entry price; 0 disables the stop.
    pub stop_loss_pct: f64,
    pub trailing_stop_enabled: bool,
    /// Fraction of equity exposed while a position is open.
    pub position_size_fraction: f64,
    pub allow_shorting: bool,
    pub kalman: KalmanConfig,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            signal: SignalKind::MultiPath,
            ema_fast_window: 20,
            ema_slow_window: 50,
            rsi_window: 14,
            donchian_window: 20,
            atr_window: 14,
            stop_loss_pct: 0.12,
            trailing_stop_enabled: true,
            position_size_fraction: 0.90,
            allow_shorting: true,
            kalman: KalmanConfig::default(),
        }
    }
}

/// Kalman filter tuning shared by the two Kalman composers.
#[derive(Debug, Clone, PartialEq)]
pub struct KalmanConfig {
    /// Process-noise variance Q: how fast the underlying trend may move.
    pub process_noise: f64,
    /// Measurement-noise variance R: how noisy the observed price is.
    pub measurement_noise: f64,
    /// Trend composer: slope must exceed this fraction of ATR to signal.
    pub slope_atr_fraction: f64,
    /// Reversion composer: rolling window for the residual z-score.
    pub zscore_window: usize,
    /// Reversion composer: enter long below this z-score.
    pub zscore_entry: f64,
    /// Reversion composer: exit above this z-score.
    pub zscore_exit: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        KalmanConfig {
            process_noise: 0.01,
            measurement_noise: 0.5,
            slope_atr_fraction: 0.1,
            zscore_window: 30,
            zscore_entry: -1.5,
            zscore_exit: 0.5,
        }
    }
}
