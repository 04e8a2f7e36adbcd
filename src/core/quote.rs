//! Underlying quotes and put chains
//!
//! Spot price plus the fundamentals used for quality scoring, and the per-expiry
//! put chains the screener walks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::option::OptionContract;

/// Underlying quote with fundamentals
///
/// Percent fields are in percent (55.0 = 55%). A fundamental the provider could not
/// supply is reported as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quote {
    /// Underlying symbol
    pub symbol: String,
    /// Spot price
    pub price: f64,
    /// Market capitalization
    pub market_cap: f64,
    /// Trailing price/earnings ratio
    pub pe_ratio: f64,
    /// Gross margin (%)
    pub gross_margin: f64,
    /// Operating margin (%)
    pub operating_margin: f64,
    /// Net profit margin (%)
    pub profit_margin: f64,
    /// Free-cash-flow yield (%)
    pub fcf_yield: f64,
    /// Year-over-year revenue growth (%)
    pub revenue_growth: f64,
    /// Sector name
    pub sector: String,
    /// Whether the provider returned a usable quote; assumed when absent
    #[serde(default = "default_valid")]
    pub valid: bool,
}

fn default_valid() -> bool {
    true
}

impl Quote {
    /// Create a valid quote with no fundamentals
    pub fn new(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            valid: true,
            ..Default::default()
        }
    }

    /// Usable for screening: flagged valid with a positive, finite price
    pub fn is_usable(&self) -> bool {
        self.valid && self.price.is_finite() && self.price > 0.0
    }

    /// Case-insensitive sector substring match
    pub fn in_sector(&self, sector: &str) -> bool {
        self.sector.to_lowercase().contains(&sector.to_lowercase())
    }
}

/// Puts for a single expiration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirationChain {
    /// Expiration date
    pub expiry: NaiveDate,
    /// Put quotes, in the order supplied (normally strike ascending)
    #[serde(default)]
    pub puts: Vec<OptionContract>,
}

impl ExpirationChain {
    pub fn new(expiry: NaiveDate, puts: Vec<OptionContract>) -> Self {
        let mut chain = Self { expiry, puts };
        chain.stamp_expiry();
        chain
    }

    /// Attach this chain's expiry to any put that doesn't carry one
    pub fn stamp_expiry(&mut self) {
        for put in &mut self.puts {
            put.expiry.get_or_insert(self.expiry);
        }
    }

    /// Whole calendar days from `as_of` to expiry (negative once expired)
    pub fn days_to_expiry(&self, as_of: NaiveDate) -> i64 {
        (self.expiry - as_of).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_usability() {
        assert!(Quote::new("NVDA", 120.0).is_usable());
        assert!(!Quote::new("NVDA", 0.0).is_usable());
        assert!(!Quote::new("NVDA", f64::NAN).is_usable());

        let mut q = Quote::new("NVDA", 120.0);
        q.valid = false;
        assert!(!q.is_usable());
    }

    #[test]
    fn test_missing_valid_flag_defaults_to_valid() {
        let q: Quote = serde_json::from_str(r#"{ "symbol": "NVDA", "price": 120.0 }"#).unwrap();
        assert!(q.valid);
        assert!(q.is_usable());

        let q: Quote =
            serde_json::from_str(r#"{ "symbol": "NVDA", "price": 120.0, "valid": false }"#).unwrap();
        assert!(!q.is_usable());
    }

    #[test]
    fn test_sector_match() {
        let mut q = Quote::new("NVDA", 120.0);
        q.sector = "Technology".into();
        assert!(q.in_sector("tech"));
        assert!(!q.in_sector("Healthcare"));
    }

    #[test]
    fn test_chain_dte_and_expiry_stamp() {
        let expiry = NaiveDate::from_ymd_opt(2025, 7, 18).unwrap();
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 18).unwrap();
        let chain = ExpirationChain::new(expiry, vec![OptionContract::new(100.0, 1.0, 1.1, 0.3)]);

        assert_eq!(chain.days_to_expiry(as_of), 30);
        assert_eq!(chain.puts[0].expiry, Some(expiry));
    }
}
