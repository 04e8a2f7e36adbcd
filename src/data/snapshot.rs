//! JSON market snapshot
//!
//! A snapshot is a point-in-time capture of quotes, chains and price history for a
//! set of underlyings. It is produced outside this crate and loaded here.
//!
//! ```json
//! {
//!   "as_of": "2025-06-18",
//!   "underlyings": [
//!     {
//!       "quote": { "symbol": "NVDA", "price": 120.0, "valid": true },
//!       "expirations": [
//!         { "expiry": "2025-07-18",
//!           "puts": [ { "strike": 110.0, "bid": 2.4, "ask": 2.6, "implied_vol": 0.35 } ] }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{MarketDataSource, UnderlyingData};
use crate::core::{ScreenerError, ScreenerResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub as_of: NaiveDate,
    #[serde(default)]
    pub underlyings: Vec<UnderlyingData>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl MarketSnapshot {
    pub fn new(as_of: NaiveDate, underlyings: Vec<UnderlyingData>) -> Self {
        let mut snapshot = Self {
            as_of,
            underlyings,
            index: HashMap::new(),
        };
        snapshot.prepare();
        snapshot
    }

    /// Parse a snapshot from JSON
    pub fn from_json_str(json: &str) -> ScreenerResult<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        Ok(Self::new(snapshot.as_of, snapshot.underlyings))
    }

    /// Load a snapshot file
    pub fn from_json_file(path: impl AsRef<Path>) -> ScreenerResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let snapshot = Self::from_json_str(&json)?;

        tracing::info!(
            "Loaded snapshot {:?}: {} underlyings as of {}",
            path,
            snapshot.underlyings.len(),
            snapshot.as_of
        );
        Ok(snapshot)
    }

    /// Write the snapshot as pretty JSON
    pub fn save_json_file(&self, path: impl AsRef<Path>) -> ScreenerResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Symbols in file order
    pub fn symbols(&self) -> Vec<String> {
        self.underlyings
            .iter()
            .map(|u| u.quote.symbol.clone())
            .collect()
    }

    /// Stamp chain expiries onto puts and index symbols; a repeated symbol
    /// resolves to its first entry
    fn prepare(&mut self) {
        for underlying in &mut self.underlyings {
            for chain in &mut underlying.expirations {
                chain.stamp_expiry();
            }
        }

        self.index.clear();
        for (i, underlying) in self.underlyings.iter().enumerate() {
            self.index
                .entry(underlying.quote.symbol.to_uppercase())
                .or_insert(i);
        }
    }
}

impl MarketDataSource for MarketSnapshot {
    fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    fn underlying(&self, symbol: &str) -> ScreenerResult<UnderlyingData> {
        self.index
            .get(&symbol.to_uppercase())
            .and_then(|&i| self.underlyings.get(i))
            .cloned()
            .ok_or_else(|| ScreenerError::data(format!("no data for {} in snapshot", symbol)))
    }
}
