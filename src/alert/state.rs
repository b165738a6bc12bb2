use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::alert::{AlertDirection, Transition};
use crate::core::AlertError;
use crate::store::JsonFileMap;

/// Persisted mapping ticker → latched [`AlertDirection`].
///
/// Each mutation is written to disk before returning, so a crash loses at
/// most the ticker in flight.
#[derive(Debug)]
pub struct AlertState {
    map: JsonFileMap<AlertDirection>,
}

impl AlertState {
    /// Loads the state file. Missing or corrupt files start an empty state.
    ///
    /// Entries holding anything other than `"up"`, `"down"` or `"none"` are
    /// logged and dropped; the remaining latches are kept.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let raw: JsonFileMap<Value> = JsonFileMap::load_or_default(&path);

        let mut map = JsonFileMap::empty(path);
        for (ticker, value) in raw.iter() {
            match AlertDirection::deserialize(value) {
                Ok(direction) => {
                    map.insert(ticker.as_str(), direction);
                }
                Err(_) => {
                    tracing::warn!(ticker = %ticker, value = %value, "unknown alert state; treating as none");
                }
            }
        }
        Self { map }
    }

    /// Latched direction for `ticker`, `None` if never alerted.
    pub fn get(&self, ticker: &str) -> AlertDirection {
        self.map.get(ticker).copied().unwrap_or_default()
    }

    /// Sets and persists the latch for `ticker`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be written.
    pub fn set(&mut self, ticker: &str, direction: AlertDirection) -> Result<(), AlertError> {
        self.map.insert(ticker, direction);
        self.map.save()
    }

    /// Applies `transition` to the latch of `ticker`, persisting only when
    /// the latch actually changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be written.
    pub fn apply(&mut self, ticker: &str, transition: Transition) -> Result<AlertDirection, AlertError> {
        let prev = self.get(ticker);
        let next = transition.next_state(prev);
        if transition.mutates() {
            self.set(ticker, next)?;
        }
        Ok(next)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
