//! Screener - main facade for the screening pipeline
//!
//! Runs the per-underlying stages (underlying filters, DTE pre-filter, contract
//! filter, scoring) for every symbol of a watchlist, then ranks the union once.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::spreads::{screen_put_spreads, SpreadCandidate};
use super::{
    apply_score, quality_score, rank, screen_expiration, ExpiryContext, Ranked, RejectionCounts,
    ScreeningCandidate, ScreeningConfig,
};
use crate::core::{ExpirationChain, ScreenerError, ScreenerResult};
use crate::data::{MarketDataSource, UnderlyingData};
use crate::models::estimate_iv_rank;

/// Why a whole underlying was left out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The data source had nothing usable for the symbol
    Unavailable(String),
    /// Quote flagged invalid or price not positive
    InvalidQuote,
    /// Outside the configured sector
    Sector,
    /// Below a fundamental floor
    Fundamentals,
}

/// Outcome of screening one underlying
#[derive(Debug, Clone, PartialEq)]
pub struct UnderlyingScreen<T = ScreeningCandidate> {
    pub symbol: String,
    /// Scored survivors in discovery order (expiration, then strike as supplied)
    pub candidates: Vec<T>,
    pub rejections: RejectionCounts,
    /// Survivors dropped by the IV rank floor
    pub below_iv_rank: usize,
    pub skipped: Option<SkipReason>,
}

impl<T> UnderlyingScreen<T> {
    fn skipped(symbol: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            symbol: symbol.into(),
            candidates: Vec::new(),
            rejections: RejectionCounts::default(),
            below_iv_rank: 0,
            skipped: Some(reason),
        }
    }
}

/// Ranked result of one screening run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningReport<T = ScreeningCandidate> {
    pub as_of: NaiveDate,
    /// Underlyings that reached the contract filter
    pub symbols_screened: usize,
    pub symbols_skipped: usize,
    /// Survivors across the universe before truncation
    pub total_found: usize,
    pub rejections: RejectionCounts,
    /// Top-N by score, descending
    pub candidates: Vec<T>,
}

impl<T> ScreeningReport<T> {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Per-underlying values shared by every expiration
struct UnderlyingContext {
    quality_score: u8,
    iv_rank: Option<f64>,
}

/// Main screener that runs the full pipeline
pub struct Screener {
    config: ScreeningConfig,
}

impl Screener {
    /// Create a screener with the default configuration
    pub fn new() -> Self {
        Self {
            config: ScreeningConfig::default(),
        }
    }

    /// Create with a custom configuration, validated once here
    pub fn with_config(config: ScreeningConfig) -> ScreenerResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get current configuration
    pub fn config(&self) -> &ScreeningConfig {
        &self.config
    }

    /// Screen every symbol and rank the survivors
    ///
    /// Underlyings are screened in parallel; results are merged in watchlist order
    /// before the single ranking pass, so the output matches a sequential run.
    pub fn screen_universe<S>(&self, source: &S, symbols: &[String]) -> ScreeningReport
    where
        S: MarketDataSource + ?Sized,
    {
        let as_of = source.as_of();
        let screens: Vec<UnderlyingScreen> = symbols
            .par_iter()
            .map(|symbol| match source.underlying(symbol) {
                Ok(data) => self.screen_underlying(&data, as_of),
                Err(e) => unavailable(symbol, e),
            })
            .collect();

        self.merge(as_of, screens)
    }

    /// Screen every symbol for put credit spreads and rank them
    pub fn screen_spreads_universe<S>(
        &self,
        source: &S,
        symbols: &[String],
    ) -> ScreeningReport<SpreadCandidate>
    where
        S: MarketDataSource + ?Sized,
    {
        let as_of = source.as_of();
        let screens: Vec<UnderlyingScreen<SpreadCandidate>> = symbols
            .par_iter()
            .map(|symbol| match source.underlying(symbol) {
                Ok(data) => self.screen_spreads_underlying(&data, as_of),
                Err(e) => unavailable(symbol, e),
            })
            .collect();

        self.merge(as_of, screens)
    }

    /// Filter and score the puts of one underlying
    pub fn screen_underlying(&self, data: &UnderlyingData, as_of: NaiveDate) -> UnderlyingScreen {
        let underlying = match self.prepare(data) {
            Ok(u) => u,
            Err(reason) => return UnderlyingScreen::skipped(data.symbol(), reason),
        };

        let mut candidates = Vec::new();
        let mut rejections = RejectionCounts::default();

        for (chain, dte) in self.eligible_expirations(data, as_of) {
            let ctx = expiry_context(data, &underlying, chain, dte, as_of);
            let screen = screen_expiration(&ctx, chain, &self.config);

            rejections.merge(&screen.rejections);
            candidates.extend(screen.candidates);
        }

        for candidate in &mut candidates {
            apply_score(candidate);
        }

        let found = candidates.len();
        self.apply_iv_rank_floor(&mut candidates, |c| c.iv_rank);
        let below_iv_rank = found - candidates.len();

        tracing::debug!(
            "{}: rejected itm={} no_bid={} wide={} non_finite={} delta={} return={} ivr={}",
            data.symbol(),
            rejections.in_the_money,
            rejections.no_bid,
            rejections.wide_spread,
            rejections.non_finite,
            rejections.delta_out_of_band,
            rejections.low_return,
            below_iv_rank
        );
        tracing::info!(
            "{}: {} candidates (quality {}, iv rank {:?})",
            data.symbol(),
            candidates.len(),
            underlying.quality_score,
            underlying.iv_rank
        );

        UnderlyingScreen {
            symbol: data.symbol().to_string(),
            candidates,
            rejections,
            below_iv_rank,
            skipped: None,
        }
    }

    /// Build and score put credit spreads for one underlying
    pub fn screen_spreads_underlying(
        &self,
        data: &UnderlyingData,
        as_of: NaiveDate,
    ) -> UnderlyingScreen<SpreadCandidate> {
        let underlying = match self.prepare(data) {
            Ok(u) => u,
            Err(reason) => return UnderlyingScreen::skipped(data.symbol(), reason),
        };

        let mut spreads = Vec::new();
        for (chain, dte) in self.eligible_expirations(data, as_of) {
            let ctx = expiry_context(data, &underlying, chain, dte, as_of);
            spreads.extend(screen_put_spreads(&ctx, chain, &self.config));
        }

        let found = spreads.len();
        self.apply_iv_rank_floor(&mut spreads, |s| s.iv_rank);

        tracing::info!("{}: {} spreads", data.symbol(), spreads.len());

        UnderlyingScreen {
            symbol: data.symbol().to_string(),
            below_iv_rank: found - spreads.len(),
            candidates: spreads,
            rejections: RejectionCounts::default(),
            skipped: None,
        }
    }

    /// Underlying-level gates plus the values every expiration shares
    fn prepare(&self, data: &UnderlyingData) -> Result<UnderlyingContext, SkipReason> {
        let quote = &data.quote;

        if !quote.is_usable() {
            tracing::warn!("Skipping {}: invalid quote (price {})", quote.symbol, quote.price);
            return Err(SkipReason::InvalidQuote);
        }
        if !self.config.admits_sector(quote) {
            tracing::debug!("Skipping {}: sector {:?} filtered out", quote.symbol, quote.sector);
            return Err(SkipReason::Sector);
        }
        if !self.config.fundamentals.admits(quote) {
            tracing::debug!("Skipping {}: below fundamental floors", quote.symbol);
            return Err(SkipReason::Fundamentals);
        }

        Ok(UnderlyingContext {
            quality_score: quality_score(quote),
            iv_rank: estimate_iv_rank(&data.price_history),
        })
    }

    /// Expirations inside the DTE band, in supplied order
    fn eligible_expirations<'a>(
        &'a self,
        data: &'a UnderlyingData,
        as_of: NaiveDate,
    ) -> impl Iterator<Item = (&'a ExpirationChain, i64)> + 'a {
        data.expirations
            .iter()
            .map(move |chain| (chain, chain.days_to_expiry(as_of)))
            .filter(move |(_, dte)| self.config.dte_in_range(*dte))
    }

    /// Drop results below `min_iv_rank`; an unknown rank never passes a set floor
    fn apply_iv_rank_floor<T>(&self, items: &mut Vec<T>, iv_rank: impl Fn(&T) -> Option<f64>) {
        if let Some(floor) = self.config.min_iv_rank {
            items.retain(|item| iv_rank(item).map(|r| r >= floor).unwrap_or(false));
        }
    }

    fn merge<T: Ranked>(
        &self,
        as_of: NaiveDate,
        screens: Vec<UnderlyingScreen<T>>,
    ) -> ScreeningReport<T> {
        let mut symbols_screened = 0;
        let mut symbols_skipped = 0;
        let mut rejections = RejectionCounts::default();
        let mut all = Vec::new();

        for screen in screens {
            if screen.skipped.is_some() {
                symbols_skipped += 1;
                continue;
            }
            symbols_screened += 1;
            rejections.merge(&screen.rejections);
            all.extend(screen.candidates);
        }

        let total_found = all.len();
        let candidates = rank(all, self.config.top_n);

        tracing::info!(
            "Screened {} underlyings ({} skipped): {} found, {} kept",
            symbols_screened,
            symbols_skipped,
            total_found,
            candidates.len()
        );

        ScreeningReport {
            as_of,
            symbols_screened,
            symbols_skipped,
            total_found,
            rejections,
            candidates,
        }
    }
}

impl Default for Screener {
    fn default() -> Self {
        Self::new()
    }
}

fn expiry_context<'a>(
    data: &'a UnderlyingData,
    underlying: &UnderlyingContext,
    chain: &ExpirationChain,
    dte: i64,
    as_of: NaiveDate,
) -> ExpiryContext<'a> {
    ExpiryContext {
        quote: &data.quote,
        expiry: chain.expiry,
        dte,
        quality_score: underlying.quality_score,
        iv_rank: underlying.iv_rank,
        earnings_before_expiry: data.earnings_before(as_of, chain.expiry),
    }
}

fn unavailable<T>(symbol: &str, error: ScreenerError) -> UnderlyingScreen<T> {
    tracing::warn!("Skipping {}: {}", symbol, error);
    UnderlyingScreen::skipped(symbol, SkipReason::Unavailable(error.to_string()))
}
