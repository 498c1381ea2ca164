//! Multi-path trend/momentum composer.
//!
//! Several independently-reasoned entry paths are evaluated against a shared
//! indicator snapshot and OR-reduced; the paths overlap on purpose. Each path
//! is a conjunction of comparisons with its own RSI guard band. Only the
//! rising edge of the combined condition fires, and exits are deliberately
//! conservative — the trailing stop in the simulator does most exit work.

use crate::domain::config::StrategyConfig;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::donchian::calculate_donchian;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::{crosses_above, rising_edges, PathHit, SignalSet};

const RSI_TREND_ALIGN_LONG: f64 = 45.0;
const RSI_BREAKOUT_LONG: f64 = 40.0;
const RSI_TREND_MOMENTUM_LONG: f64 = 40.0;
const RSI_PRICE_MOMENTUM_LONG: f64 = 45.0;

const RSI_TREND_ALIGN_SHORT: f64 = 55.0;
const RSI_BREAKOUT_SHORT: f64 = 60.0;
const RSI_TREND_MOMENTUM_SHORT: f64 = 60.0;
const RSI_PRICE_MOMENTUM_SHORT: f64 = 55.0;

const RSI_EXIT_LONG: f64 = 40.0;
const RSI_EXIT_SHORT: f64 = 60.0;

/// Shared per-run indicator snapshot the path predicates read from.
struct Snapshot<'a> {
    bars: &'a [OhlcvBar],
    ema_fast: IndicatorSeries,
    ema_slow: IndicatorSeries,
    rsi: IndicatorSeries,
    donchian: IndicatorSeries,
}

impl Snapshot<'_> {
    fn close(&self, k: usize) -> f64 {
        self.bars[k].close
    }

    fn trend_up(&self, k: usize) -> bool {
        self.ema_fast.simple_at(k) > self.ema_slow.simple_at(k)
    }

    fn trend_down(&self, k: usize) -> bool {
        self.ema_fast.simple_at(k) < self.ema_slow.simple_at(k)
    }

    fn ema_cross_up(&self, k: usize) -> bool {
        k >= 1
            && crosses_above(
                self.ema_fast.simple_at(k),
                self.ema_slow.simple_at(k),
                self.ema_fast.simple_at(k - 1),
                self.ema_slow.simple_at(k - 1),
            )
    }

    fn ema_cross_down(&self, k: usize) -> bool {
        k >= 1
            && crosses_above(
                self.ema_slow.simple_at(k),
                self.ema_fast.simple_at(k),
                self.ema_slow.simple_at(k - 1),
                self.ema_fast.simple_at(k - 1),
            )
    }

    fn rsi_above(&self, k: usize, threshold: f64) -> bool {
        self.rsi.simple_at(k) > threshold
    }

    fn rsi_below(&self, k: usize, threshold: f64) -> bool {
        self.rsi.simple_at(k) < threshold
    }

    fn breaks_upper(&self, k: usize) -> bool {
        let (upper, _) = self.donchian.channel_at(k);
        self.close(k) > upper
    }

    fn breaks_lower(&self, k: usize) -> bool {
        let (_, lower) = self.donchian.channel_at(k);
        self.close(k) < lower
    }

    fn two_bar_rise(&self, k: usize) -> bool {
        k >= 2 && self.close(k) > self.close(k - 1) && self.close(k - 1) > self.close(k - 2)
    }

    fn two_bar_fall(&self, k: usize) -> bool {
        k >= 2 && self.close(k) < self.close(k - 1) && self.close(k - 1) < self.close(k - 2)
    }

    fn fired_long_paths(&self, k: usize) -> Vec<&'static str> {
        let mut fired = Vec::new();
        if self.ema_cross_up(k) {
            fired.push("crossover");
        }
        if self.trend_up(k)
            && self.close(k) > self.ema_fast.simple_at(k)
            && self.rsi_above(k, RSI_TREND_ALIGN_LONG)
        {
            fired.push("trend_align");
        }
        if self.breaks_upper(k) && self.rsi_above(k, RSI_BREAKOUT_LONG) {
            fired.push("breakout");
        }
        if self.trend_up(k) && self.rsi_above(k, RSI_TREND_MOMENTUM_LONG) {
            fired.push("trend_momentum");
        }
        if self.two_bar_rise(k) && self.rsi_above(k, RSI_PRICE_MOMENTUM_LONG) && self.trend_up(k) {
            fired.push("price_momentum");
        }
        fired
    }

    fn fired_short_paths(&self, k: usize) -> Vec<&'static str> {
        let mut fired = Vec::new();
        if self.ema_cross_down(k) {
            fired.push("crossover");
        }
        if self.trend_down(k)
            && self.close(k) < self.ema_fast.simple_at(k)
            && self.rsi_below(k, RSI_TREND_ALIGN_SHORT)
        {
            fired.push("trend_align");
        }
        if self.breaks_lower(k) && self.rsi_below(k, RSI_BREAKOUT_SHORT) {
            fired.push("breakout");
        }
        if self.trend_down(k) && self.rsi_below(k, RSI_TREND_MOMENTUM_SHORT) {
            fired.push("trend_momentum");
        }
        if self.two_bar_fall(k) && self.rsi_below(k, RSI_PRICE_MOMENTUM_SHORT) && self.trend_down(k)
        {
            fired.push("price_momentum");
        }
        fired
    }
}

pub fn compose(bars: &[OhlcvBar], config: &StrategyConfig) -> SignalSet {
    let n = bars.len();
    let snapshot = Snapshot {
        bars,
        ema_fast: calculate_ema(bars, config.ema_fast_window),
        ema_slow: calculate_ema(bars, config.ema_slow_window),
        rsi: calculate_rsi(bars, config.rsi_window),
        donchian: calculate_donchian(bars, config.donchian_window),
    };

    let mut raw_long = vec![false; n];
    let mut raw_short = vec![false; n];
    let mut long_paths: Vec<Vec<&'static str>> = Vec::with_capacity(n);
    let mut short_paths: Vec<Vec<&'static str>> = Vec::with_capacity(n);

    for k in 0..n {
        let lp = snapshot.fired_long_paths(k);
        let sp = snapshot.fired_short_paths(k);
        raw_long[k] = !lp.is_empty();
        raw_short[k] = !sp.is_empty();
        long_paths.push(lp);
        short_paths.push(sp);
    }

    let long_fires = rising_edges(&raw_long);
    let short_fires = rising_edges(&raw_short);

    let mut signals = SignalSet::empty(n);
    for k in 0..n {
        // A simultaneous long and short fire resolves short.
        if short_fires[k] {
            signals.entries[k] = true;
            signals.direction[k] = -1;
            signals.path_hits.push(PathHit {
                index: k,
                direction: -1,
                paths: short_paths[k].clone(),
            });
        } else if long_fires[k] {
            signals.entries[k] = true;
            signals.direction[k] = 1;
            signals.path_hits.push(PathHit {
                index: k,
                direction: 1,
                paths: long_paths[k].clone(),
            });
        }

        signals.long_exits[k] =
            snapshot.ema_cross_down(k) || (snapshot.breaks_lower(k) && snapshot.rsi_below(k, RSI_EXIT_LONG));
        signals.short_exits[k] =
            snapshot.ema_cross_up(k) || (snapshot.breaks_upper(k) && snapshot.rsi_above(k, RSI_EXIT_SHORT));
    }

    signals
}
