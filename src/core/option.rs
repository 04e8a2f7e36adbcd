//! Put contract records
//!
//! Raw per-strike market data for one listed put, as delivered by the data source.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Contract multiplier for US equity options
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

/// A listed put contract quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Strike price
    pub strike: f64,
    /// Bid price (0 = no bid)
    #[serde(default)]
    pub bid: f64,
    /// Ask price
    #[serde(default)]
    pub ask: f64,
    /// Last traded price
    #[serde(default)]
    pub last: f64,
    /// Implied volatility as a decimal (0.35 = 35%), 0 when the provider has none
    #[serde(default)]
    pub implied_vol: f64,
    /// Trading volume
    #[serde(default)]
    pub volume: u64,
    /// Open interest
    #[serde(default)]
    pub open_interest: u64,
    /// Expiration date, filled from the owning chain when absent
    #[serde(default)]
    pub expiry: Option<NaiveDate>,
}

impl OptionContract {
    /// Create a put quote with no volume/OI or expiry attached
    pub fn new(strike: f64, bid: f64, ask: f64, implied_vol: f64) -> Self {
        Self {
            strike,
            bid,
            ask,
            last: 0.0,
            implied_vol,
            volume: 0,
            open_interest: 0,
            expiry: None,
        }
    }

    /// Mid price
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// Bid-ask spread
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }

    /// Relative spread (spread / mid), `None` when mid is not positive
    pub fn relative_spread(&self) -> Option<f64> {
        let mid = self.mid();
        if mid > 0.0 {
            Some(self.spread() / mid)
        } else {
            None
        }
    }

    /// Has a live bid
    pub fn is_tradeable(&self) -> bool {
        self.bid > 0.0
    }

    /// Is this put out of the money at the given spot?
    pub fn is_otm(&self, spot: f64) -> bool {
        self.strike < spot
    }

    /// Bid/ask to trade against, falling back to a band around the last price
    /// when the book is empty (e.g. outside market hours).
    ///
    /// Returns `None` when neither a bid nor a last trade exists.
    pub fn bid_ask_or_last(&self, band: f64) -> Option<(f64, f64)> {
        if self.bid > 0.0 {
            Some((self.bid, self.ask))
        } else if self.last > 0.0 {
            Some((self.last * (1.0 - band), self.last * (1.0 + band)))
        } else {
            None
        }
    }

    /// Ask to pay, with the same last-price fallback when no ask is quoted
    pub fn ask_or_last(&self, band: f64) -> Option<(f64, f64)> {
        if self.ask > 0.0 {
            Some((self.bid, self.ask))
        } else if self.last > 0.0 {
            Some((self.last * (1.0 - band), self.last * (1.0 + band)))
        } else {
            None
        }
    }
}
