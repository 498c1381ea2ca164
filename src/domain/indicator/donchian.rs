//! Donchian channel indicator.
//!
//! Upper = max(high), lower = min(low) over the n bars strictly before the
//! current bar. The one-bar shift keeps the channel free of the current
//! bar's own extremes, so a breakout comparison never sees itself.
//! Warmup: first n bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_donchian(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let valid = period > 0 && i >= period;

        let value = if valid {
            let window = &bars[i - period..i];
            let upper = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
            let lower = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
            IndicatorValue::Channel { upper, lower }
        } else {
            IndicatorValue::Channel {
                upper: 0.0,
                lower: 0.0,
            }
        };

        values.push(IndicatorPoint {
            date: bar.date,
            valid,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Donchian(period),
        values,
    }
}
