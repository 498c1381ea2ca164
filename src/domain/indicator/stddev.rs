//! Rolling standard deviation.
//!
//! Population standard deviation over a trailing window of n values.
//! Operates on a plain value slice so it can be applied to derived series
//! (e.g. the close-minus-Kalman residual), not just closes.
//! Warmup: first (n-1) positions are NaN.

pub fn rolling_stddev(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        if period == 0 || i + 1 < period {
            out.push(f64::NAN);
            continue;
        }

        let window = &values[i + 1 - period..=i];
        let mean: f64 = window.iter().sum::<f64>() / period as f64;
        let variance: f64 = window
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;

        out.push(variance.sqrt());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stddev_warmup_is_nan() {
        let out = rolling_stddev(&[10.0, 20.0, 30.0, 40.0], 3);

        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert!(!out[2].is_nan());
        assert!(!out[3].is_nan());
    }

    #[test]
    fn stddev_constant_values_is_zero() {
        let out = rolling_stddev(&[100.0; 5], 3);

        for v in &out[2..] {
            assert!((v - 0.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn stddev_known_window() {
        // Window [10, 20, 30]: mean 20, variance (100+0+100)/3.
        let out = rolling_stddev(&[10.0, 20.0, 30.0], 3);
        let expected = (200.0_f64 / 3.0).sqrt();
        assert!((out[2] - expected).abs() < 1e-12);
    }

    #[test]
    fn stddev_window_slides() {
        let out = rolling_stddev(&[10.0, 20.0, 30.0, 30.0, 30.0], 3);
        // Last window is [30, 30, 30].
        assert!((out[4] - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stddev_zero_period_all_nan() {
        let out = rolling_stddev(&[1.0, 2.0], 0);
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn stddev_empty() {
        assert!(rolling_stddev(&[], 3).is_empty());
    }
}
