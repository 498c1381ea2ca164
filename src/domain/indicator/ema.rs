//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1); EMA[0] = C[0]; EMA[i] = EMA[i-1] + k*(C[i] - EMA[i-1]),
//! algebraically C[i]*k + EMA[i-1]*(1-k). The incremental form is exact on
//! constant input (the correction term is exactly zero), so a flat series
//! can never drift EMAs of different windows apart.
//! Seeding at the first close is deterministic: given the same inputs the
//! early-series values are always identical, at the cost of a seed bias that
//! decays geometrically. All bars are valid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
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
            indicator_type: IndicatorType::Ema(period),
            values,
        };
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        ema = if i == 0 {
            bar.close
        } else {
            ema + k * (bar.close - ema)
        };
        values.push(IndicatorPoint {
            date: bar.date,
            valid: true,
            value: IndicatorValue::Simple(ema),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}
