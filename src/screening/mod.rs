//! Cash-secured put screening
//!
//! Turns a grid of (underlying × expiration × strike) put quotes into a ranked
//! shortlist.
//!
//! Pipeline, per underlying:
//! 1. **Underlying filters**: sector and fundamental floors, quality score
//! 2. **Expiration pre-filter**: drop whole expirations outside the DTE band
//! 3. **Contract filter**: moneyness, bid, spread width, delta band, monthly return
//! 4. **Composite scoring**: weighted return/IV-rank/cushion/theta/quality/gamma score
//!
//! and once for the whole universe:
//! 5. **Ranking**: stable sort by score, truncate to top-N

mod config;
mod filter;
mod income;
mod quality;
mod ranker;
mod scoring;
mod screener;
pub mod spreads;

pub use config::*;
pub use filter::*;
pub use income::*;
pub use quality::*;
pub use ranker::*;
pub use scoring::*;
pub use screener::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::Greeks;

/// Cosmetic star rating of a composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StarRating {
    None,
    One,
    Two,
    Three,
}

impl StarRating {
    /// ≥20 three stars, ≥16 two, ≥12 one
    pub fn from_score(score: f64) -> Self {
        if score >= 20.0 {
            StarRating::Three
        } else if score >= 16.0 {
            StarRating::Two
        } else if score >= 12.0 {
            StarRating::One
        } else {
            StarRating::None
        }
    }

    /// Display form, e.g. "★★"
    pub fn symbol(&self) -> &'static str {
        match self {
            StarRating::None => "",
            StarRating::One => "★",
            StarRating::Two => "★★",
            StarRating::Three => "★★★",
        }
    }
}

/// A put that survived every filter, with its derived metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningCandidate {
    /// Underlying symbol
    pub symbol: String,
    /// Underlying sector
    pub sector: String,
    /// Underlying spot price
    pub spot: f64,
    /// Strike price
    pub strike: f64,
    /// Expiration date
    pub expiry: NaiveDate,
    /// Days to expiration
    pub dte: i64,
    pub bid: f64,
    pub ask: f64,
    /// Mid price
    pub mid: f64,
    /// Black-Scholes Greeks at the resolved volatility
    pub greeks: Greeks,
    /// Implied volatility as quoted, in percent
    pub iv_pct: f64,
    /// Estimated IV rank (0–100) of the underlying, if known
    pub iv_rank: Option<f64>,
    /// Distance of strike below spot, in percent
    pub otm_pct: f64,
    /// Premium return normalized to 30 days, in percent
    pub monthly_return: f64,
    /// Cash collateral per contract (strike × 100)
    pub capital_required: f64,
    /// Premium per contract (mid × 100)
    pub premium: f64,
    /// Fundamental quality score (0–100)
    pub quality_score: u8,
    pub volume: u64,
    pub open_interest: u64,
    /// Next earnings date falls before expiration
    pub earnings_before_expiry: bool,
    /// Composite ranking score
    pub score: f64,
    /// Star rating of `score`
    pub rating: StarRating,
}
