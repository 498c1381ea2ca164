//! Position state and trade records.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    pub fn from_signal(value: i8) -> Option<Direction> {
        match value {
            1 => Some(Direction::Long),
            -1 => Some(Direction::Short),
            _ => None,
        }
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Composer exit signal.
    Signal,
    /// Fixed stop-loss breach.
    StopLoss,
    /// Ratcheted trailing-stop breach.
    TrailingStop,
    /// Opposite-direction entry closed the position before reopening.
    Reversal,
    /// Series ended with the position still open.
    EndOfData,
}

/// The single open position of a simulation run.
#[derive(Debug, Clone)]
pub struct OpenPosition {
    pub direction: Direction,
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub stop_price: Option<f64>,
    ratcheted: bool,
}

impl OpenPosition {
    pub fn open(
        direction: Direction,
        entry_index: usize,
        entry_date: NaiveDate,
        entry_price: f64,
        stop_loss_pct: f64,
    ) -> Self {
        let stop_price = if stop_loss_pct > 0.0 {
            Some(match direction {
                Direction::Long => entry_price * (1.0 - stop_loss_pct),
                Direction::Short => entry_price * (1.0 + stop_loss_pct),
            })
        } else {
            None
        };

        OpenPosition {
            direction,
            entry_index,
            entry_date,
            entry_price,
            stop_price,
            ratcheted: false,
        }
    }

    /// Move the stop in the position's favor, never against it.
    pub fn ratchet_stop(&mut self, price: f64, stop_loss_pct: f64) {
        let Some(stop) = self.stop_price else {
            return;
        };
        let candidate = match self.direction {
            Direction::Long => price * (1.0 - stop_loss_pct),
            Direction::Short => price * (1.0 + stop_loss_pct),
        };
        let tighter = match self.direction {
            Direction::Long => candidate > stop,
            Direction::Short => candidate < stop,
        };
        if tighter {
            self.stop_price = Some(candidate);
            self.ratcheted = true;
        }
    }

    /// Close-based breach check against the stop carried into this bar.
    pub fn stop_breached(&self, price: f64) -> bool {
        match self.stop_price {
            None => false,
            Some(stop) => match self.direction {
                Direction::Long => price <= stop,
                Direction::Short => price >= stop,
            },
        }
    }

    /// Distinguishes a stop that never moved from a trailed one.
    pub fn stop_exit_reason(&self) -> ExitReason {
        if self.ratcheted {
            ExitReason::TrailingStop
        } else {
            ExitReason::StopLoss
        }
    }
}

/// A completed round trip.
#[derive(Debug, Clone)]
pub struct ClosedTrade {
    pub direction: Direction,
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Direction-signed price return scaled by the position fraction, net of
    /// the commissions charged to this trade.
    pub net_return: f64,
    pub exit_reason: ExitReason,
}
