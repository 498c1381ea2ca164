//! CSV report adapter.
//!
//! Writes the full aligned output series as one CSV row per bar, the hand-off
//! format for external plotting. Undefined values (indicator warm-up, no
//! stop) are written as empty cells.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TrendtraderError;
use crate::ports::report_port::ReportPort;
use std::path::Path;

pub struct CsvReportAdapter;

fn cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{:.6}", value)
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), TrendtraderError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| TrendtraderError::Data {
            reason: format!("failed to create {}: {}", output_path.display(), e),
        })?;

        wtr.write_record([
            "date",
            "close",
            "ema_fast",
            "ema_slow",
            "rsi",
            "kalman",
            "donchian_upper",
            "donchian_lower",
            "atr",
            "entry",
            "exit",
            "direction",
            "position",
            "stop",
            "equity",
            "benchmark_equity",
            "drawdown",
        ])
        .map_err(|e| TrendtraderError::Data {
            reason: format!("CSV write error: {}", e),
        })?;

        for k in 0..result.dates.len() {
            let record = [
                result.dates[k].format("%Y-%m-%d").to_string(),
                cell(result.close[k]),
                cell(result.ema_fast[k]),
                cell(result.ema_slow[k]),
                cell(result.rsi[k]),
                cell(result.kalman[k]),
                cell(result.donchian_upper[k]),
                cell(result.donchian_lower[k]),
                cell(result.atr[k]),
                (result.entries[k] as u8).to_string(),
                (result.exits[k] as u8).to_string(),
                result.direction[k].to_string(),
                result.position[k].to_string(),
                result.stop[k].map(cell).unwrap_or_default(),
                cell(result.equity[k]),
                cell(result.benchmark_equity[k]),
                cell(result.drawdown[k]),
            ];
            wtr.write_record(&record).map_err(|e| TrendtraderError::Data {
                reason: format!("CSV write error: {}", e),
            })?;
        }

        wtr.flush()?;
        Ok(())
    }
}
