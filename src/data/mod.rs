//! Market data
//!
//! The screener reads quotes and put chains through [`MarketDataSource`]. The crate
//! ships one source, a JSON [`MarketSnapshot`] captured ahead of time.

pub mod snapshot;

pub use snapshot::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{ExpirationChain, Quote, ScreenerResult};

/// Everything the screener needs about one underlying
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderlyingData {
    pub quote: Quote,
    /// Put chains, one per listed expiration
    #[serde(default)]
    pub expirations: Vec<ExpirationChain>,
    /// Next earnings date, if announced
    #[serde(default)]
    pub earnings_date: Option<NaiveDate>,
    /// Daily closes, oldest first (for the IV rank estimate)
    #[serde(default)]
    pub price_history: Vec<f64>,
}

impl UnderlyingData {
    pub fn new(quote: Quote, expirations: Vec<ExpirationChain>) -> Self {
        Self {
            quote,
            expirations,
            earnings_date: None,
            price_history: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.quote.symbol
    }

    /// Whether earnings fall between `as_of` and `expiry`, inclusive
    pub fn earnings_before(&self, as_of: NaiveDate, expiry: NaiveDate) -> bool {
        self.earnings_date
            .map(|date| as_of <= date && date <= expiry)
            .unwrap_or(false)
    }
}

/// Supplier of per-underlying market data
///
/// Shared across screening threads, hence `Sync`.
pub trait MarketDataSource: Sync {
    /// Date the data is valued at; days-to-expiration count from here
    fn as_of(&self) -> NaiveDate;

    fn underlying(&self, symbol: &str) -> ScreenerResult<UnderlyingData>;
}
