//! Kalman slope trend composer.
//!
//! The Kalman estimate strips measurement noise from the close series; its
//! one-bar slope is the trend read. A signal needs the slope to clear a
//! threshold scaled by ATR, so quiet drift inside the noise band is ignored.
//! Inside the band the previous direction is held, which keeps positions on
//! through consolidation until the opposite signal arrives. There are no
//! composer exits; reversals flip the position and the simulator's stop
//! rules do the rest.

use crate::domain::config::StrategyConfig;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::kalman::calculate_kalman;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::{PathHit, SignalSet};

pub fn compose(bars: &[OhlcvBar], config: &StrategyConfig) -> SignalSet {
    let n = bars.len();
    let kalman = calculate_kalman(
        bars,
        config.kalman.process_noise,
        config.kalman.measurement_noise,
    );
    let atr = calculate_atr(bars, config.atr_window);

    let mut signals = SignalSet::empty(n);
    let mut held: i8 = 0;

    for k in 0..n {
        let slope = if k >= 1 {
            kalman.simple_at(k) - kalman.simple_at(k - 1)
        } else {
            f64::NAN
        };
        let threshold = config.kalman.slope_atr_fraction * atr.simple_at(k);

        // NaN slope or threshold fails both comparisons and holds.
        let raw = if slope > threshold {
            1
        } else if slope < -threshold {
            -1
        } else {
            held
        };

        if raw != held && raw != 0 {
            signals.entries[k] = true;
            signals.direction[k] = raw;
            signals.path_hits.push(PathHit {
                index: k,
                direction: raw,
                paths: vec![if raw == 1 { "slope_up" } else { "slope_down" }],
            });
        }
        held = raw;
    }

    signals
}
