//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestResult};
use crate::domain::config::{BacktestConfig, KalmanConfig, StrategyConfig};
use crate::domain::config_validation::{validate_backtest_config, validate_strategy_config};
use crate::domain::error::TrendtraderError;
use crate::domain::metrics::Metrics;
use crate::domain::signal::SignalKind;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "trendtrader", about = "Indicator-driven trading signal backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Write the aligned output series to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
        /// Validate the configuration and stop before loading data
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the available data range for a symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            symbol,
            dry_run,
        } => run_backtest_command(&config, output.as_deref(), symbol.as_deref(), dry_run),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TrendtraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn validate_all(adapter: &dyn ConfigPort) -> Result<(), ExitCode> {
    validate_backtest_config(adapter)
        .and_then(|()| validate_strategy_config(adapter))
        .map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        })
}

fn run_backtest_command(
    config_path: &PathBuf,
    output_path: Option<&std::path::Path>,
    symbol_override: Option<&str>,
    dry_run: bool,
) -> ExitCode {
    // Stage 1: load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(code) = validate_all(&adapter) {
        return code;
    }
    if dry_run {
        eprintln!("Config validated successfully");
        return ExitCode::SUCCESS;
    }

    // Stage 2: build parameter objects
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };
    let strategy = build_strategy_config(&adapter);
    let symbol = match resolve_symbol(symbol_override, &adapter) {
        Some(s) => s,
        None => {
            eprintln!("error: symbol is required");
            return ExitCode::from(2);
        }
    };

    // Stage 3: fetch data
    let data_dir = adapter
        .get_string("backtest", "data_dir")
        .unwrap_or_else(|| ".".to_string());
    let data_port = CsvAdapter::new(PathBuf::from(data_dir));

    eprintln!(
        "Fetching {} from {} to {}",
        symbol, bt_config.start_date, bt_config.end_date,
    );
    let bars = match data_port.fetch_ohlcv(&symbol, bt_config.start_date, bt_config.end_date) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };
    eprintln!("  {} bars loaded", bars.len());

    // Stage 4: run the pipeline
    eprintln!("Running {} strategy...", strategy.signal);
    let result = match run_backtest(&bars, &symbol, &bt_config, &strategy) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    // Stage 5: console summary
    print_summary(&result);

    // Stage 6: export aligned series
    if let Some(path) = output_path {
        if let Err(e) = CsvReportAdapter.write(&result, path) {
            eprintln!("error: failed to write report: {e}");
            return ExitCode::from(&e);
        }
        eprintln!("\nSeries written to: {}", path.display());
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(code) = validate_all(&adapter) {
        return code;
    }
    eprintln!("Config validated successfully");
    ExitCode::SUCCESS
}

fn run_info(config_path: &PathBuf, symbol_override: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let data_dir = adapter
        .get_string("backtest", "data_dir")
        .unwrap_or_else(|| ".".to_string());
    let data_port = CsvAdapter::new(PathBuf::from(data_dir));

    let symbols = match resolve_symbol(symbol_override, &adapter) {
        Some(s) => vec![s],
        None => match data_port.list_symbols() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(&e);
            }
        },
    };

    for symbol in symbols {
        match data_port.data_range(&symbol) {
            Ok(Some((first, last, count))) => {
                eprintln!("{}: {} to {} ({} bars)", symbol, first, last, count);
            }
            Ok(None) => eprintln!("{}: no data", symbol),
            Err(e) => eprintln!("{}: error ({})", symbol, e),
        }
    }

    ExitCode::SUCCESS
}

fn resolve_symbol(symbol_override: Option<&str>, adapter: &dyn ConfigPort) -> Option<String> {
    match symbol_override {
        Some(s) => Some(s.to_string()),
        None => adapter
            .get_string("backtest", "symbol")
            .filter(|s| !s.trim().is_empty()),
    }
}

pub fn build_backtest_config(
    adapter: &dyn ConfigPort,
) -> Result<BacktestConfig, TrendtraderError> {
    let start_str = adapter.get_string("backtest", "start_date").ok_or_else(|| {
        TrendtraderError::ConfigMissing {
            section: "backtest".into(),
            key: "start_date".into(),
        }
    })?;
    let end_str = adapter.get_string("backtest", "end_date").ok_or_else(|| {
        TrendtraderError::ConfigMissing {
            section: "backtest".into(),
            key: "end_date".into(),
        }
    })?;

    let parse = |s: &str, key: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| TrendtraderError::ConfigInvalid {
            section: "backtest".into(),
            key: key.into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        })
    };

    Ok(BacktestConfig {
        start_date: parse(&start_str, "start_date")?,
        end_date: parse(&end_str, "end_date")?,
        initial_cash: adapter.get_double("backtest", "initial_cash", 10_000.0),
        fee_rate: adapter.get_double("backtest", "fee_rate", 0.001),
        bars_per_year: adapter.get_double("backtest", "bars_per_year", 252.0),
    })
}

pub fn build_strategy_config(adapter: &dyn ConfigPort) -> StrategyConfig {
    let defaults = StrategyConfig::default();
    let signal = adapter
        .get_string("strategy", "signal")
        .and_then(|s| SignalKind::parse(&s))
        .unwrap_or(defaults.signal);

    StrategyConfig {
        signal,
        ema_fast_window: adapter.get_int("strategy", "ema_fast_window", 20) as usize,
        ema_slow_window: adapter.get_int("strategy", "ema_slow_window", 50) as usize,
        rsi_window: adapter.get_int("strategy", "rsi_window", 14) as usize,
        donchian_window: adapter.get_int("strategy", "donchian_window", 20) as usize,
        atr_window: adapter.get_int("strategy", "atr_window", 14) as usize,
        stop_loss_pct: adapter.get_double("strategy", "stop_loss_pct", 0.12),
        trailing_stop_enabled: adapter.get_bool("strategy", "trailing_stop_enabled", true),
        position_size_fraction: adapter.get_double("strategy", "position_size_fraction", 0.90),
        allow_shorting: adapter.get_bool("strategy", "allow_shorting", true),
        kalman: KalmanConfig {
            process_noise: adapter.get_double("kalman", "process_noise", 0.01),
            measurement_noise: adapter.get_double("kalman", "measurement_noise", 0.5),
            slope_atr_fraction: adapter.get_double("kalman", "slope_atr_fraction", 0.1),
            zscore_window: adapter.get_int("kalman", "zscore_window", 30) as usize,
            zscore_entry: adapter.get_double("kalman", "zscore_entry", -1.5),
            zscore_exit: adapter.get_double("kalman", "zscore_exit", 0.5),
        },
    }
}

fn fmt_opt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v * 100.0),
        None => "undefined".to_string(),
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_infinite() => "inf".to_string(),
        Some(v) => format!("{:.2}", v),
        None => "undefined".to_string(),
    }
}

fn print_summary(result: &BacktestResult) {
    let m: &Metrics = &result.metrics;
    eprintln!("\n=== Results ===");
    eprintln!("Total Return:     {:.2}%", m.total_return * 100.0);
    eprintln!("Benchmark:        {:.2}%", m.benchmark_return * 100.0);
    eprintln!(
        "Excess Return:    {:.2}%",
        (m.total_return - m.benchmark_return) * 100.0
    );
    eprintln!("Annualized:       {:.2}%", m.annualized_return * 100.0);
    eprintln!("Sharpe Ratio:     {}", fmt_opt(m.sharpe_ratio));
    eprintln!("Max Drawdown:     {:.1}%", m.max_drawdown * 100.0);
    eprintln!("Total Trades:     {}", m.total_trades);
    eprintln!("Win Rate:         {}", fmt_opt_pct(m.win_rate));
    eprintln!("Profit Factor:    {}", fmt_opt(m.profit_factor));

    if !result.path_hits.is_empty() {
        eprintln!("\n=== Entry Paths ===");
        for hit in &result.path_hits {
            let side = if hit.direction == 1 { "long" } else { "short" };
            eprintln!(
                "  {} {}: {}",
                result.dates[hit.index],
                side,
                hit.paths.join("+"),
            );
        }
    }
}
