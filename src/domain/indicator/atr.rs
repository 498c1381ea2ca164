//! ATR (Average True Range) indicator.
//!
//! True range = max(high-low, |high-prev_close|, |low-prev_close|); the
//! first bar has no prior close and uses high-low. ATR is the simple moving
//! average of the true range over n bars.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    if period == 0 {
        for bar in bars {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            });
        }
        return IndicatorSeries {
            indicator_type: IndicatorType::Atr(period),
            values,
        };
    }

    let tr: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect();

    let mut sum = 0.0;
    for (i, bar) in bars.iter().enumerate() {
        sum += tr[i];
        if i >= period {
            sum -= tr[i - period];
        }

        let valid = i + 1 >= period;
        values.push(IndicatorPoint {
            date: bar.date,
            valid,
            value: IndicatorValue::Simple(if valid { sum / period as f64 } else { 0.0 }),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bar(day: u32, high: f64, low: f64, close: f64) -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn atr_warmup() {
        let bars: Vec<OhlcvBar> = (1..=5).map(|i| make_bar(i, 110.0, 90.0, 100.0)).collect();
        let series = calculate_atr(&bars, 3);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[3].valid);
    }

    #[test]
    fn atr_is_mean_of_true_range() {
        let bars = vec![
            make_bar(1, 110.0, 100.0, 105.0),
            make_bar(2, 115.0, 105.0, 110.0),
            make_bar(3, 120.0, 110.0, 115.0),
        ];
        let series = calculate_atr(&bars, 3);

        // TR = [10, 10, 10] → ATR = 10.
        assert!((series.simple_at(2) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn atr_uses_simple_average_not_smoothing() {
        // A gap bar inflates one TR; once it leaves the window the SMA
        // returns exactly to the quiet level, with no smoothing tail.
        let bars = vec![
            make_bar(1, 110.0, 100.0, 105.0),
            make_bar(2, 145.0, 135.0, 140.0), // gap: TR = |145-105| = 40
            make_bar(3, 145.0, 135.0, 140.0),
            make_bar(4, 145.0, 135.0, 140.0),
            make_bar(5, 145.0, 135.0, 140.0),
        ];
        let series = calculate_atr(&bars, 2);

        assert!((series.simple_at(1) - (10.0 + 40.0) / 2.0).abs() < 1e-9);
        assert!((series.simple_at(2) - (40.0 + 10.0) / 2.0).abs() < 1e-9);
        assert!((series.simple_at(3) - 10.0).abs() < 1e-9);
        assert!((series.simple_at(4) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn atr_gap_dominates_true_range() {
        let bars = vec![
            make_bar(1, 110.0, 100.0, 105.0),
            make_bar(2, 130.0, 120.0, 125.0),
        ];
        let series = calculate_atr(&bars, 2);

        // TR[0] = 10, TR[1] = |130 - 105| = 25.
        assert!((series.simple_at(1) - 17.5).abs() < 1e-9);
    }

    #[test]
    fn atr_zero_period_all_invalid() {
        let bars: Vec<OhlcvBar> = (1..=3).map(|i| make_bar(i, 110.0, 90.0, 100.0)).collect();
        let series = calculate_atr(&bars, 0);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn atr_empty_bars() {
        let series = calculate_atr(&[], 14);
        assert!(series.values.is_empty());
    }
}
