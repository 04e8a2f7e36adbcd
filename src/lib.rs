//! # CSP Screener - Cash-Secured Put Screening
//!
//! Screens a universe of underlyings for cash-secured put opportunities: prices
//! every out-of-the-money put with Black-Scholes, filters on liquidity, delta and
//! return, scores the survivors and ranks them.
//!
//! ## Key Components
//!
//! - **Models**: Abramowitz-Stegun normal CDF, Black-Scholes put Greeks, IV rank estimate
//! - **Screening**: quality scoring, contract filter, composite scoring, ranking
//! - **Spreads**: put credit spread construction and scoring
//! - **Data**: `MarketDataSource` seam with a JSON snapshot implementation
//!
//! ## Usage
//!
//! ```rust,no_run
//! use csp_screener::prelude::*;
//!
//! let snapshot = MarketSnapshot::from_json_file("snapshot.json").unwrap();
//! let preset = Preset::Income;
//!
//! let screener = Screener::with_config(preset.config()).unwrap();
//! let report = screener.screen_universe(&snapshot, &preset.watchlist().symbols);
//!
//! for c in &report.candidates {
//!     println!("{} {} {:.2} {}", c.symbol, c.strike, c.score, c.rating.symbol());
//! }
//! ```
//!
//! ## What This Does NOT Do
//!
//! - Fetch live market data (snapshots are produced elsewhere)
//! - Place orders
//! - Price American exercise, dividends or a volatility smile

pub mod core;
pub mod data;
pub mod models;
pub mod screening;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        ExpirationChain, Greeks, OptionContract, Quote, ScreenerError, ScreenerResult,
        CONTRACT_MULTIPLIER,
    };

    // Data
    pub use crate::data::{MarketDataSource, MarketSnapshot, UnderlyingData};

    // Models
    pub use crate::models::{estimate_iv_rank, norm_cdf, norm_pdf, put_greeks};

    // Screening
    pub use crate::screening::{
        composite_score,
        quality_score,
        rank,
        screen_contract,
        screen_expiration,
        spreads::{screen_put_spreads, SpreadCandidate},
        FilterOutcome,
        FundamentalFloors,
        IncomeProjection,
        Preset,
        Ranked,
        Rejection,
        Screener,
        ScreeningCandidate,
        // Config
        ScreeningConfig,
        ScreeningReport,
        SpreadConfig,
        StarRating,
        Watchlist,
    };
}

// Re-export main types at crate root
pub use crate::core::{ScreenerError, ScreenerResult};
pub use crate::screening::{Screener, ScreeningCandidate, ScreeningConfig};
