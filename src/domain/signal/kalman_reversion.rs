//! Kalman mean-reversion composer (long-only).
//!
//! Treats the Kalman estimate as fair value. The close-minus-estimate
//! residual is normalized by its rolling standard deviation into a z-score:
//! deeply negative means the price has stretched below fair value, so enter
//! long; once the z-score recovers past the exit threshold, close. A zero or
//! undefined residual deviation produces no signal.

use crate::domain::config::StrategyConfig;
use crate::domain::indicator::kalman::calculate_kalman;
use crate::domain::indicator::stddev::rolling_stddev;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::{rising_edges, PathHit, SignalSet};

pub fn compose(bars: &[OhlcvBar], config: &StrategyConfig) -> SignalSet {
    let n = bars.len();
    let kalman = calculate_kalman(
        bars,
        config.kalman.process_noise,
        config.kalman.measurement_noise,
    );

    let residuals: Vec<f64> = (0..n)
        .map(|k| bars[k].close - kalman.simple_at(k))
        .collect();
    let deviation = rolling_stddev(&residuals, config.kalman.zscore_window);

    let zscore: Vec<f64> = (0..n)
        .map(|k| {
            if deviation[k] > 0.0 {
                residuals[k] / deviation[k]
            } else {
                f64::NAN
            }
        })
        .collect();

    let raw_entry: Vec<bool> = zscore.iter().map(|&z| z < config.kalman.zscore_entry).collect();
    let entry_fires = rising_edges(&raw_entry);

    let mut signals = SignalSet::empty(n);
    for k in 0..n {
        if entry_fires[k] {
            signals.entries[k] = true;
            signals.direction[k] = 1;
            signals.path_hits.push(PathHit {
                index: k,
                direction: 1,
                paths: vec!["zscore_stretch"],
            });
        }
        signals.long_exits[k] = zscore[k] > config.kalman.zscore_exit;
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    fn config() -> StrategyConfig {
        let mut c = StrategyConfig::default();
        c.kalman.process_noise = 0.05;
        c.kalman.measurement_noise = 0.5;
        c.kalman.zscore_window = 10;
        c.kalman.zscore_entry = -1.5;
        c.kalman.zscore_exit = 0.5;
        c
    }

    /// Mild alternating noise around a level, enough to give the residual a
    /// nonzero rolling deviation.
    fn noisy_level(n: usize, level: f64) -> Vec<f64> {
        (0..n)
            .map(|i| level + if i % 2 == 0 { 0.4 } else { -0.4 })
            .collect()
    }

    #[test]
    fn flat_series_never_signals() {
        // Residual is identically zero, deviation is zero: z is undefined.
        let bars = make_bars(&[100.0; 50]);
        let signals = compose(&bars, &config());

        assert!(signals.entries.iter().all(|&e| !e));
        assert!(signals.long_exits.iter().all(|&e| !e));
    }

    #[test]
    fn deep_dip_fires_long_entry() {
        let mut prices = noisy_level(30, 100.0);
        prices.push(92.0); // far below fair value
        prices.push(92.0);
        let bars = make_bars(&prices);
        let signals = compose(&bars, &config());

        assert!(
            signals.entries.iter().any(|&e| e),
            "dip should trigger a long entry"
        );
        for hit in &signals.path_hits {
            assert_eq!(hit.direction, 1);
            assert_eq!(hit.paths, vec!["zscore_stretch"]);
        }
    }

    #[test]
    fn dip_entry_fires_once_while_stretched() {
        let mut prices = noisy_level(30, 100.0);
        prices.extend([92.0, 92.0, 92.0]);
        let bars = make_bars(&prices);
        let signals = compose(&bars, &config());

        // The stretch persists for three bars but only the rising edge fires.
        let fires = signals.entries.iter().filter(|&&e| e).count();
        assert_eq!(fires, 1);
    }

    #[test]
    fn recovery_fires_exit() {
        let mut prices = noisy_level(30, 100.0);
        prices.extend([92.0, 92.0]);
        prices.extend([104.0, 104.0]); // snap back above fair value
        let bars = make_bars(&prices);
        let signals = compose(&bars, &config());

        assert!(signals.entries.iter().any(|&e| e));
        assert!(
            signals.long_exits.iter().any(|&e| e),
            "snap-back should trigger an exit"
        );
    }

    #[test]
    fn never_goes_short() {
        let mut prices = noisy_level(30, 100.0);
        prices.extend([110.0, 110.0]); // stretched above fair value
        let bars = make_bars(&prices);
        let signals = compose(&bars, &config());

        assert!(signals.direction.iter().all(|&d| d >= 0));
        assert!(signals.short_exits.iter().all(|&e| !e));
    }
}
