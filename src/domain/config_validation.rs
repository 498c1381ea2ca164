//! Configuration validation.
//!
//! All fields are validated once at startup, before any data is loaded or
//! any simulation executes; the per-bar hot path assumes valid parameters.

use crate::domain::error::TrendtraderError;
use crate::domain::signal::SignalKind;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    validate_symbol(config)?;
    validate_data_dir(config)?;
    validate_dates(config)?;
    validate_initial_cash(config)?;
    validate_fee_rate(config)?;
    validate_bars_per_year(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    validate_signal_kind(config)?;
    validate_windows(config)?;
    validate_stop_loss(config)?;
    validate_position_size(config)?;
    validate_kalman(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> TrendtraderError {
    TrendtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn missing(section: &str, key: &str) -> TrendtraderError {
    TrendtraderError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    match config.get_string("backtest", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(missing("backtest", "symbol")),
    }
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    match config.get_string("backtest", "data_dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(missing("backtest", "data_dir")),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    let start = parse_date(config.get_string("backtest", "start_date").as_deref(), "start_date")?;
    let end = parse_date(config.get_string("backtest", "end_date").as_deref(), "end_date")?;

    if start >= end {
        return Err(invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, TrendtraderError> {
    match value {
        None => Err(missing("backtest", field)),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            invalid(
                "backtest",
                field,
                &format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    let value = config.get_double("backtest", "initial_cash", 10_000.0);
    if value <= 0.0 {
        return Err(invalid("backtest", "initial_cash", "initial_cash must be positive"));
    }
    Ok(())
}

fn validate_fee_rate(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    let value = config.get_double("backtest", "fee_rate", 0.0);
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid("backtest", "fee_rate", "fee_rate must be between 0 and 1"));
    }
    Ok(())
}

fn validate_bars_per_year(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    let value = config.get_double("backtest", "bars_per_year", 252.0);
    if value <= 0.0 {
        return Err(invalid("backtest", "bars_per_year", "bars_per_year must be positive"));
    }
    Ok(())
}

fn validate_signal_kind(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    let value = config
        .get_string("strategy", "signal")
        .unwrap_or_else(|| "multi_path".to_string());
    if SignalKind::parse(&value).is_none() {
        return Err(invalid(
            "strategy",
            "signal",
            "expected multi_path, kalman_trend or kalman_reversion",
        ));
    }
    Ok(())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    for key in [
        "ema_fast_window",
        "ema_slow_window",
        "rsi_window",
        "donchian_window",
        "atr_window",
    ] {
        let value = config.get_int("strategy", key, 1);
        if value < 1 {
            return Err(invalid("strategy", key, "window must be at least 1"));
        }
    }

    let fast = config.get_int("strategy", "ema_fast_window", 20);
    let slow = config.get_int("strategy", "ema_slow_window", 50);
    if fast >= slow {
        return Err(invalid(
            "strategy",
            "ema_fast_window",
            "ema_fast_window must be smaller than ema_slow_window",
        ));
    }
    Ok(())
}

fn validate_stop_loss(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    let value = config.get_double("strategy", "stop_loss_pct", 0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "strategy",
            "stop_loss_pct",
            "stop_loss_pct must be in [0, 1)",
        ));
    }
    Ok(())
}

fn validate_position_size(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    let value = config.get_double("strategy", "position_size_fraction", 1.0);
    if value <= 0.0 || value > 1.0 {
        return Err(invalid(
            "strategy",
            "position_size_fraction",
            "position_size_fraction must be in (0, 1]",
        ));
    }
    Ok(())
}

fn validate_kalman(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    let q = config.get_double("kalman", "process_noise", 0.01);
    if q <= 0.0 {
        return Err(invalid("kalman", "process_noise", "process_noise must be positive"));
    }
    let r = config.get_double("kalman", "measurement_noise", 0.5);
    if r <= 0.0 {
        return Err(invalid(
            "kalman",
            "measurement_noise",
            "measurement_noise must be positive",
        ));
    }
    let frac = config.get_double("kalman", "slope_atr_fraction", 0.1);
    if frac < 0.0 {
        return Err(invalid(
            "kalman",
            "slope_atr_fraction",
            "slope_atr_fraction must be non-negative",
        ));
    }
    let window = config.get_int("kalman", "zscore_window", 30);
    if window < 2 {
        return Err(invalid("kalman", "zscore_window", "zscore_window must be at least 2"));
    }
    let entry = config.get_double("kalman", "zscore_entry", -1.5);
    let exit = config.get_double("kalman", "zscore_exit", 0.5);
    if entry >= exit {
        return Err(invalid(
            "kalman",
            "zscore_entry",
            "zscore_entry must be below zscore_exit",
        ));
    }
    Ok(())
}
