//! Alert state machine: per-ticker direction latch.
//!
//! A ticker alerts once per breakout. The latched direction suppresses
//! repeats until the move re-enters the corridor `(-threshold, +threshold)`,
//! which silently resets the latch. A flip straight from one side to the
//! other fires again without an intermediate reset.

mod state;

pub use state::AlertState;

use serde::{Deserialize, Serialize};

/// Last direction an alert was sent for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
    #[default]
    None,
    Up,
    Down,
}

impl AlertDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertDirection::None => "none",
            AlertDirection::Up => "up",
            AlertDirection::Down => "down",
        }
    }

    pub(crate) fn arrow(self) -> &'static str {
        match self {
            AlertDirection::Up => "📈",
            AlertDirection::Down => "📉",
            AlertDirection::None => "",
        }
    }
}

impl std::fmt::Display for AlertDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of the corridor `pct` falls on. Both bounds are inclusive.
#[must_use]
pub fn classify(pct: f64, threshold: f64) -> AlertDirection {
    if pct >= threshold {
        AlertDirection::Up
    } else if pct <= -threshold {
        AlertDirection::Down
    } else {
        AlertDirection::None
    }
}

/// Outcome of one ticker evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// New breakout (or flip); send an alert and latch the direction.
    Fire(AlertDirection),
    /// Back inside the corridor after an alert; clear the latch silently.
    Reset,
    /// Inside the corridor with no latch.
    Quiet,
    /// Still outside the corridor on the latched side.
    AlreadyAlerted(AlertDirection),
}

impl Transition {
    /// Latch value after applying this transition to `prev`.
    #[must_use]
    pub fn next_state(self, prev: AlertDirection) -> AlertDirection {
        match self {
            Transition::Fire(dir) => dir,
            Transition::Reset => AlertDirection::None,
            Transition::Quiet | Transition::AlreadyAlerted(_) => prev,
        }
    }

    /// Whether the latch changes and must be persisted.
    #[must_use]
    pub fn mutates(self) -> bool {
        matches!(self, Transition::Fire(_) | Transition::Reset)
    }
}

/// Decides what to do for a ticker given its latched direction and move.
#[must_use]
pub fn decide(prev: AlertDirection, pct: f64, threshold: f64) -> Transition {
    match (classify(pct, threshold), prev) {
        (AlertDirection::None, AlertDirection::None) => Transition::Quiet,
        (AlertDirection::None, _) => Transition::Reset,
        (dir, prev) if dir == prev => Transition::AlreadyAlerted(dir),
        (dir, _) => Transition::Fire(dir),
    }
}
