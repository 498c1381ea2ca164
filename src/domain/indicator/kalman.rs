//! Kalman filter price estimator.
//!
//! Scalar filter under a random-walk process model (no control input).
//! State per step is (estimate, error variance). For k >= 1:
//!
//!   predict: x⁻ = x[k-1],  P⁻ = P[k-1] + q
//!   gain:    K  = P⁻ / (P⁻ + r)
//!   update:  x[k] = x⁻ + K·(close[k] − x⁻),  P[k] = (1−K)·P⁻
//!
//! Initial condition: x[0] = close[0], P[0] = 1.0. Single forward pass;
//! x[k] depends only on closes up to k. All bars are valid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

const INITIAL_ERROR_VARIANCE: f64 = 1.0;

pub fn calculate_kalman(bars: &[OhlcvBar], q: f64, r: f64) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    let mut estimate = 0.0;
    let mut error_variance = INITIAL_ERROR_VARIANCE;

    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            estimate = bar.close;
        } else {
            let predicted = estimate;
            let predicted_variance = error_variance + q;
            let gain = predicted_variance / (predicted_variance + r);
            estimate = predicted + gain * (bar.close - predicted);
            error_variance = (1.0 - gain) * predicted_variance;
        }

        values.push(IndicatorPoint {
            date: bar.date,
            valid: true,
            value: IndicatorValue::Simple(estimate),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Kalman { q, r },
        values,
    }
}
