//! CSV file data adapter.
//!
//! Reads `<base_path>/<SYMBOL>.csv` with a header row and columns
//! `date,open,high,low,close,volume` (date as YYYY-MM-DD). Rows outside the
//! requested range are skipped; output is sorted by date.

use crate::domain::error::TrendtraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_all(&self, symbol: &str) -> Result<Vec<OhlcvBar>, TrendtraderError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| TrendtraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| TrendtraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| TrendtraderError::Data {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                TrendtraderError::Data {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            let field = |idx: usize, name: &str| -> Result<f64, TrendtraderError> {
                record
                    .get(idx)
                    .ok_or_else(|| TrendtraderError::Data {
                        reason: format!("missing {} column", name),
                    })?
                    .parse()
                    .map_err(|e| TrendtraderError::Data {
                        reason: format!("invalid {} value: {}", name, e),
                    })
            };

            let open = field(1, "open")?;
            let high = field(2, "high")?;
            let low = field(3, "low")?;
            let close = field(4, "close")?;
            let volume: i64 = record
                .get(5)
                .ok_or_else(|| TrendtraderError::Data {
                    reason: "missing volume column".into(),
                })?
                .parse()
                .map_err(|e| TrendtraderError::Data {
                    reason: format!("invalid volume value: {}", e),
                })?;

            bars.push(OhlcvBar {
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TrendtraderError> {
        let bars = self
            .read_all(symbol)?
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect();
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TrendtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TrendtraderError::Data {
            reason: format!("failed to read directory {}: {}", self.base_path.display(), e),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TrendtraderError::Data {
                reason: format!("failed to read directory entry: {}", e),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    symbols.push(stem.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TrendtraderError> {
        let bars = self.read_all(symbol)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, symbol: &str, rows: &[&str]) {
        let path = dir.path().join(format!("{}.csv", symbol));
        let mut file = fs::File::create(path).unwrap();
        writeln!(file, "date,open,high,low,close,volume").unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fetch_ohlcv_reads_and_sorts() {
        let dir = TempDir::new().unwrap();
        write_csv(
            &dir,
            "BTC-USD",
            &[
                "2024-01-03,102,103,101,102.5,3000",
                "2024-01-01,100,101,99,100.5,1000",
                "2024-01-02,101,102,100,101.5,2000",
            ],
        );
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let bars = adapter
            .fetch_ohlcv("BTC-USD", date(2024, 1, 1), date(2024, 1, 31))
            .unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, date(2024, 1, 1));
        assert_eq!(bars[2].date, date(2024, 1, 3));
        assert!((bars[0].close - 100.5).abs() < f64::EPSILON);
        assert_eq!(bars[0].volume, 1000);
    }

    #[test]
    fn fetch_ohlcv_filters_date_range() {
        let dir = TempDir::new().unwrap();
        write_csv(
            &dir,
            "BTC-USD",
            &[
                "2024-01-01,100,101,99,100.5,1000",
                "2024-01-02,101,102,100,101.5,2000",
                "2024-01-03,102,103,101,102.5,3000",
            ],
        );
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let bars = adapter
            .fetch_ohlcv("BTC-USD", date(2024, 1, 2), date(2024, 1, 2))
            .unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, date(2024, 1, 2));
    }

    #[test]
    fn fetch_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter
            .fetch_ohlcv("NOPE", date(2024, 1, 1), date(2024, 1, 31))
            .unwrap_err();
        assert!(matches!(err, TrendtraderError::Data { .. }));
    }

    #[test]
    fn malformed_row_is_error() {
        let dir = TempDir::new().unwrap();
        write_csv(&dir, "BAD", &["2024-01-01,not_a_number,101,99,100.5,1000"]);
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter
            .fetch_ohlcv("BAD", date(2024, 1, 1), date(2024, 1, 31))
            .unwrap_err();
        assert!(matches!(err, TrendtraderError::Data { .. }));
    }

    #[test]
    fn list_symbols_finds_csv_files() {
        let dir = TempDir::new().unwrap();
        write_csv(&dir, "BTC-USD", &["2024-01-01,1,1,1,1,1"]);
        write_csv(&dir, "ETH-USD", &["2024-01-01,1,1,1,1,1"]);
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let symbols = adapter.list_symbols().unwrap();
        assert_eq!(symbols, vec!["BTC-USD", "ETH-USD"]);
    }

    #[test]
    fn data_range_reports_span() {
        let dir = TempDir::new().unwrap();
        write_csv(
            &dir,
            "BTC-USD",
            &[
                "2024-01-01,100,101,99,100.5,1000",
                "2024-02-15,101,102,100,101.5,2000",
            ],
        );
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let range = adapter.data_range("BTC-USD").unwrap().unwrap();
        assert_eq!(range, (date(2024, 1, 1), date(2024, 2, 15), 2));
    }
}
