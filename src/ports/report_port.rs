//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TrendtraderError;
use std::path::Path;

/// Port for handing the computed series to an external sink (plotting tools,
/// spreadsheets). The core defines no binary format; adapters decide.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), TrendtraderError>;
}
