//! Signal composition: indicator series → entry/exit/direction sequences.
//!
//! A composer maps a bar slice plus strategy parameters to a [`SignalSet`].
//! Comparisons against undefined indicator values use NaN operands, so any
//! path touching a warm-up bar evaluates to false and never signals.

pub mod multi_path;
pub mod kalman_trend;
pub mod kalman_reversion;

use crate::domain::config::StrategyConfig;
use crate::domain::ohlcv::OhlcvBar;

/// Which composer derives the signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    MultiPath,
    KalmanTrend,
    KalmanReversion,
}

impl SignalKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "multi_path" => Some(SignalKind::MultiPath),
            "kalman_trend" => Some(SignalKind::KalmanTrend),
            "kalman_reversion" => Some(SignalKind::KalmanReversion),
            _ => None,
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SignalKind::MultiPath => "multi_path",
            SignalKind::KalmanTrend => "kalman_trend",
            SignalKind::KalmanReversion => "kalman_reversion",
        };
        write!(f, "{}", name)
    }
}

/// Record of which named entry path(s) fired at a bar.
#[derive(Debug, Clone, PartialEq)]
pub struct PathHit {
    pub index: usize,
    pub direction: i8,
    pub paths: Vec<&'static str>,
}

/// Per-bar boolean signals aligned to the bar slice.
///
/// `direction` is nonzero only at bars where an entry fires; forward-filling
/// into a held position is the simulator's job.
#[derive(Debug, Clone)]
pub struct SignalSet {
    pub entries: Vec<bool>,
    pub long_exits: Vec<bool>,
    pub short_exits: Vec<bool>,
    pub direction: Vec<i8>,
    pub path_hits: Vec<PathHit>,
}

impl SignalSet {
    pub fn empty(len: usize) -> Self {
        SignalSet {
            entries: vec![false; len],
            long_exits: vec![false; len],
            short_exits: vec![false; len],
            direction: vec![0; len],
            path_hits: Vec::new(),
        }
    }
}

/// Dispatch to the configured composer.
pub fn compose_signals(bars: &[OhlcvBar], config: &StrategyConfig) -> SignalSet {
    match config.signal {
        SignalKind::MultiPath => multi_path::compose(bars, config),
        SignalKind::KalmanTrend => kalman_trend::compose(bars, config),
        SignalKind::KalmanReversion => kalman_reversion::compose(bars, config),
    }
}

/// "A crosses above B" at the current bar: strictly above now, at or below
/// on the prior bar. The asymmetry avoids re-triggering on a flat approach.
/// NaN in any operand makes the crossover false.
pub(crate) fn crosses_above(a_curr: f64, b_curr: f64, a_prev: f64, b_prev: f64) -> bool {
    a_curr > b_curr && a_prev <= b_prev
}

/// Keep only the rising edge of a sustained condition: true at `k` iff
/// `raw[k]` and not `raw[k-1]`.
pub(crate) fn rising_edges(raw: &[bool]) -> Vec<bool> {
    raw.iter()
        .enumerate()
        .map(|(k, &v)| v && (k == 0 || !raw[k - 1]))
        .collect()
}
