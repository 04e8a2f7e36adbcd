//! Contract filter
//!
//! Applies the eligibility stages to each put of one expiration, in a fixed order,
//! stopping at the first failure:
//! 1. out of the money (strike < spot)
//! 2. live bid
//! 3. spread within tolerance of mid
//! 4. Greeks at the contract IV (or fallback vol) are finite
//! 5. |delta| in band
//! 6. monthly return at or above the minimum
//!
//! Every stage returns `Result<_, Rejection>` so a rejected contract carries the
//! reason and value that failed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ScreeningCandidate, ScreeningConfig, StarRating};
use crate::core::{ExpirationChain, Greeks, OptionContract, Quote, CONTRACT_MULTIPLIER};
use crate::models::put_greeks;

const DAYS_PER_YEAR: f64 = 365.0;
const DAYS_PER_MONTH: f64 = 30.0;

/// Why a contract was dropped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Rejection {
    /// Strike at or above spot
    InTheMoney { strike: f64, spot: f64 },
    /// No live bid
    NoBid,
    /// (ask - bid) / mid above tolerance
    WideSpread { ratio: f64 },
    /// Pricing produced NaN or infinity
    NonFiniteGreeks,
    /// |delta| outside the configured band
    DeltaOutOfBand { delta: f64 },
    /// Monthly return below the minimum (or not computable)
    ReturnBelowMinimum { monthly_return: f64 },
}

/// Result of running one contract through the filter
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    Accepted(Box<ScreeningCandidate>),
    Rejected(Rejection),
}

impl FilterOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, FilterOutcome::Accepted(_))
    }

    pub fn accepted(self) -> Option<ScreeningCandidate> {
        match self {
            FilterOutcome::Accepted(c) => Some(*c),
            FilterOutcome::Rejected(_) => None,
        }
    }
}

/// Per-stage rejection tallies for one expiration or underlying
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionCounts {
    pub in_the_money: usize,
    pub no_bid: usize,
    pub wide_spread: usize,
    pub non_finite: usize,
    pub delta_out_of_band: usize,
    pub low_return: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, rejection: &Rejection) {
        match rejection {
            Rejection::InTheMoney { .. } => self.in_the_money += 1,
            Rejection::NoBid => self.no_bid += 1,
            Rejection::WideSpread { .. } => self.wide_spread += 1,
            Rejection::NonFiniteGreeks => self.non_finite += 1,
            Rejection::DeltaOutOfBand { .. } => self.delta_out_of_band += 1,
            Rejection::ReturnBelowMinimum { .. } => self.low_return += 1,
        }
    }

    pub fn merge(&mut self, other: &RejectionCounts) {
        self.in_the_money += other.in_the_money;
        self.no_bid += other.no_bid;
        self.wide_spread += other.wide_spread;
        self.non_finite += other.non_finite;
        self.delta_out_of_band += other.delta_out_of_band;
        self.low_return += other.low_return;
    }

    pub fn total(&self) -> usize {
        self.in_the_money
            + self.no_bid
            + self.wide_spread
            + self.non_finite
            + self.delta_out_of_band
            + self.low_return
    }
}

/// Everything about the underlying and expiration a contract is judged against
#[derive(Debug, Clone, Copy)]
pub struct ExpiryContext<'a> {
    pub quote: &'a Quote,
    pub expiry: NaiveDate,
    pub dte: i64,
    pub quality_score: u8,
    pub iv_rank: Option<f64>,
    pub earnings_before_expiry: bool,
}

/// Surviving candidates of one expiration, in chain order
#[derive(Debug, Clone, Default)]
pub struct ExpirationScreen {
    pub candidates: Vec<ScreeningCandidate>,
    pub rejections: RejectionCounts,
}

/// Run every put of a chain through the filter
///
/// The chain must already have passed the DTE pre-filter.
pub fn screen_expiration(
    ctx: &ExpiryContext,
    chain: &ExpirationChain,
    config: &ScreeningConfig,
) -> ExpirationScreen {
    let mut screen = ExpirationScreen::default();

    for contract in &chain.puts {
        match screen_contract(ctx, contract, config) {
            FilterOutcome::Accepted(candidate) => screen.candidates.push(*candidate),
            FilterOutcome::Rejected(rejection) => screen.rejections.record(&rejection),
        }
    }

    screen
}

/// Run a single put through the filter stages
pub fn screen_contract(
    ctx: &ExpiryContext,
    contract: &OptionContract,
    config: &ScreeningConfig,
) -> FilterOutcome {
    match evaluate(ctx, contract, config) {
        Ok(candidate) => FilterOutcome::Accepted(Box::new(candidate)),
        Err(rejection) => FilterOutcome::Rejected(rejection),
    }
}

fn evaluate(
    ctx: &ExpiryContext,
    contract: &OptionContract,
    config: &ScreeningConfig,
) -> Result<ScreeningCandidate, Rejection> {
    let spot = ctx.quote.price;

    check_out_of_the_money(contract, spot)?;
    check_bid(contract)?;
    let mid = check_spread(contract, config.max_spread_pct)?;

    let sigma = resolve_volatility(contract, config.fallback_volatility);
    let time = ctx.dte as f64 / DAYS_PER_YEAR;
    let greeks = put_greeks(spot, contract.strike, time, config.risk_free_rate, sigma);
    check_finite(&greeks)?;
    check_delta(&greeks, config)?;

    let monthly_return = monthly_return(mid, contract.strike, ctx.dte);
    check_return(monthly_return, config.min_monthly_return)?;

    Ok(ScreeningCandidate {
        symbol: ctx.quote.symbol.clone(),
        sector: ctx.quote.sector.clone(),
        spot,
        strike: contract.strike,
        expiry: ctx.expiry,
        dte: ctx.dte,
        bid: contract.bid,
        ask: contract.ask,
        mid,
        greeks,
        iv_pct: contract.implied_vol * 100.0,
        iv_rank: ctx.iv_rank,
        otm_pct: (spot - contract.strike) / spot * 100.0,
        monthly_return,
        capital_required: contract.strike * CONTRACT_MULTIPLIER,
        premium: mid * CONTRACT_MULTIPLIER,
        quality_score: ctx.quality_score,
        volume: contract.volume,
        open_interest: contract.open_interest,
        earnings_before_expiry: ctx.earnings_before_expiry,
        score: 0.0,
        rating: StarRating::None,
    })
}

/// Stage 1: only out-of-the-money puts
pub fn check_out_of_the_money(contract: &OptionContract, spot: f64) -> Result<(), Rejection> {
    if contract.is_otm(spot) {
        Ok(())
    } else {
        Err(Rejection::InTheMoney {
            strike: contract.strike,
            spot,
        })
    }
}

/// Stage 2: a bid of 0 marks an untradeable quote
pub fn check_bid(contract: &OptionContract) -> Result<(), Rejection> {
    if contract.is_tradeable() {
        Ok(())
    } else {
        Err(Rejection::NoBid)
    }
}

/// Stage 3: spread relative to mid, returning the mid on success
pub fn check_spread(contract: &OptionContract, max_spread_pct: f64) -> Result<f64, Rejection> {
    match contract.relative_spread() {
        Some(ratio) if ratio > max_spread_pct => Err(Rejection::WideSpread { ratio }),
        _ => Ok(contract.mid()),
    }
}

/// Contract IV when quoted, otherwise the fallback; never zero
pub fn resolve_volatility(contract: &OptionContract, fallback: f64) -> f64 {
    if contract.implied_vol > 0.0 {
        contract.implied_vol
    } else {
        fallback
    }
}

fn check_finite(greeks: &Greeks) -> Result<(), Rejection> {
    if greeks.is_finite() {
        Ok(())
    } else {
        Err(Rejection::NonFiniteGreeks)
    }
}

/// Stage 5: |delta| within the band
pub fn check_delta(greeks: &Greeks, config: &ScreeningConfig) -> Result<(), Rejection> {
    if config.delta_in_band(greeks.delta.abs()) {
        Ok(())
    } else {
        Err(Rejection::DeltaOutOfBand {
            delta: greeks.delta,
        })
    }
}

/// Premium over strike, normalized to 30 days, in percent (0 when `dte <= 0`)
pub fn monthly_return(mid: f64, strike: f64, dte: i64) -> f64 {
    if dte <= 0 {
        return 0.0;
    }
    (mid / strike) * (DAYS_PER_MONTH / dte as f64) * 100.0
}

/// Stage 6: minimum monthly return
pub fn check_return(monthly_return: f64, min_monthly_return: f64) -> Result<(), Rejection> {
    if monthly_return.is_finite() && monthly_return >= min_monthly_return {
        Ok(())
    } else {
        Err(Rejection::ReturnBelowMinimum { monthly_return })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote() -> Quote {
        Quote::new("TEST", 120.0)
    }

    fn ctx(quote: &Quote, dte: i64) -> ExpiryContext<'_> {
        ExpiryContext {
            quote,
            expiry: NaiveDate::from_ymd_opt(2025, 7, 18).unwrap(),
            dte,
            quality_score: 50,
            iv_rank: None,
            earnings_before_expiry: false,
        }
    }

    #[test]
    fn test_accepts_reference_put() {
        let q = quote();
        let put = OptionContract::new(110.0, 2.40, 2.60, 0.35);
        let c = screen_contract(&ctx(&q, 30), &put, &ScreeningConfig::default())
            .accepted()
            .unwrap();

        assert!((c.mid - 2.50).abs() < 1e-12);
        assert!((c.capital_required - 11000.0).abs() < 1e-9);
        assert!((c.premium - 250.0).abs() < 1e-9);
        assert!((c.monthly_return - 2.272727).abs() < 1e-5);
        assert!((c.otm_pct - 8.333333).abs() < 1e-5);
        assert!((c.iv_pct - 35.0).abs() < 1e-9);
        assert!(c.greeks.delta < -0.15 && c.greeks.delta > -0.35);
    }

    #[test]
    fn test_itm_and_atm_rejected() {
        let q = quote();
        let config = ScreeningConfig::default();
        for strike in [120.0, 125.0] {
            let put = OptionContract::new(strike, 5.0, 5.2, 0.3);
            assert!(matches!(
                screen_contract(&ctx(&q, 30), &put, &config),
                FilterOutcome::Rejected(Rejection::InTheMoney { .. })
            ));
        }
    }

    #[test]
    fn test_no_bid_rejected() {
        let q = quote();
        let put = OptionContract::new(110.0, 0.0, 2.60, 0.35);
        assert_eq!(
            screen_contract(&ctx(&q, 30), &put, &ScreeningConfig::default()),
            FilterOutcome::Rejected(Rejection::NoBid)
        );
    }

    #[test]
    fn test_wide_spread_rejected() {
        let q = quote();
        let put = OptionContract::new(110.0, 2.00, 3.00, 0.35);
        match screen_contract(&ctx(&q, 30), &put, &ScreeningConfig::default()) {
            FilterOutcome::Rejected(Rejection::WideSpread { ratio }) => {
                assert!((ratio - 0.40).abs() < 1e-12)
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_first_failing_stage_is_reported() {
        let q = quote();
        let config = ScreeningConfig::default();
        let outcome = |put: OptionContract| screen_contract(&ctx(&q, 30), &put, &config);

        // ITM with no bid
        assert_eq!(
            outcome(OptionContract::new(125.0, 0.0, 6.20, 0.35)),
            FilterOutcome::Rejected(Rejection::InTheMoney {
                strike: 125.0,
                spot: 120.0
            })
        );
        // No bid beats the spread check
        assert_eq!(
            outcome(OptionContract::new(110.0, 0.0, 3.00, 0.35)),
            FilterOutcome::Rejected(Rejection::NoBid)
        );
        // Wide spread on a put that would also miss the delta band
        assert!(matches!(
            outcome(OptionContract::new(90.0, 0.10, 0.30, 0.35)),
            FilterOutcome::Rejected(Rejection::WideSpread { .. })
        ));
        // Out of band delta is reported before the return check
        let strict = ScreeningConfig {
            min_monthly_return: 50.0,
            ..Default::default()
        };
        assert!(matches!(
            screen_contract(&ctx(&q, 30), &OptionContract::new(90.0, 0.20, 0.22, 0.35), &strict),
            FilterOutcome::Rejected(Rejection::DeltaOutOfBand { .. })
        ));
    }

    #[test]
    fn test_spread_at_tolerance_passes() {
        // (2.25 - 1.75) / 2.00 = 0.25
        let put = OptionContract::new(110.0, 1.75, 2.25, 0.35);
        assert_eq!(check_spread(&put, 0.25), Ok(2.0));
        assert!(check_spread(&put, 0.20).is_err());
    }

    #[test]
    fn test_deep_otm_fails_delta_band() {
        let q = quote();
        let put = OptionContract::new(90.0, 0.20, 0.22, 0.35);
        assert!(matches!(
            screen_contract(&ctx(&q, 30), &put, &ScreeningConfig::default()),
            FilterOutcome::Rejected(Rejection::DeltaOutOfBand { .. })
        ));
    }

    #[test]
    fn test_low_return_rejected() {
        let q = quote();
        let config = ScreeningConfig {
            min_monthly_return: 5.0,
            ..Default::default()
        };
        let put = OptionContract::new(110.0, 2.40, 2.60, 0.35);
        assert!(matches!(
            screen_contract(&ctx(&q, 30), &put, &config),
            FilterOutcome::Rejected(Rejection::ReturnBelowMinimum { .. })
        ));
    }

    #[test]
    fn test_zero_dte_has_zero_greeks_and_is_dropped() {
        let q = quote();
        let config = ScreeningConfig {
            min_dte: 0,
            ..Default::default()
        };
        let put = OptionContract::new(110.0, 2.40, 2.60, 0.35);
        assert_eq!(
            screen_contract(&ctx(&q, 0), &put, &config),
            FilterOutcome::Rejected(Rejection::DeltaOutOfBand { delta: 0.0 })
        );
    }

    #[test]
    fn test_negative_strike_is_not_propagated() {
        let q = quote();
        let put = OptionContract::new(-5.0, 2.40, 2.60, 0.35);
        assert!(!screen_contract(&ctx(&q, 30), &put, &ScreeningConfig::default()).is_accepted());
    }

    #[test]
    fn test_volatility_fallback() {
        let put = OptionContract::new(110.0, 2.40, 2.60, 0.0);
        assert_eq!(resolve_volatility(&put, 0.30), 0.30);

        let put = OptionContract::new(110.0, 2.40, 2.60, 0.42);
        assert_eq!(resolve_volatility(&put, 0.30), 0.42);
    }

    #[test]
    fn test_monthly_return() {
        assert!((monthly_return(2.5, 110.0, 30) - 2.272727).abs() < 1e-5);
        assert!((monthly_return(2.5, 110.0, 15) - 4.545454).abs() < 1e-5);
        assert_eq!(monthly_return(2.5, 110.0, 0), 0.0);
    }

    #[test]
    fn test_refiltering_survivors_is_idempotent() {
        let q = quote();
        let config = ScreeningConfig::default();
        let expiry = NaiveDate::from_ymd_opt(2025, 7, 18).unwrap();
        let chain = ExpirationChain::new(
            expiry,
            vec![
                OptionContract::new(95.0, 0.30, 0.34, 0.35),
                OptionContract::new(105.0, 1.20, 1.30, 0.35),
                OptionContract::new(108.0, 1.90, 2.05, 0.35),
                OptionContract::new(110.0, 2.40, 2.60, 0.35),
                OptionContract::new(112.0, 2.00, 3.00, 0.35),
                OptionContract::new(113.0, 3.40, 3.60, 0.35),
                OptionContract::new(115.0, 0.0, 4.20, 0.35),
                OptionContract::new(125.0, 6.00, 6.20, 0.35),
            ],
        );

        let first = screen_expiration(&ctx(&q, 30), &chain, &config);
        assert!(!first.candidates.is_empty());
        assert_eq!(first.candidates.len() + first.rejections.total(), chain.puts.len());

        let survivors: Vec<OptionContract> = chain
            .puts
            .iter()
            .filter(|p| first.candidates.iter().any(|c| c.strike == p.strike))
            .cloned()
            .collect();
        let second = screen_expiration(
            &ctx(&q, 30),
            &ExpirationChain::new(expiry, survivors),
            &config,
        );

        assert_eq!(second.candidates, first.candidates);
        assert_eq!(second.rejections.total(), 0);
    }

    #[test]
    fn test_rejection_counts() {
        let mut counts = RejectionCounts::default();
        counts.record(&Rejection::NoBid);
        counts.record(&Rejection::WideSpread { ratio: 0.3 });
        counts.record(&Rejection::NoBid);

        let mut total = RejectionCounts::default();
        total.merge(&counts);
        total.merge(&counts);

        assert_eq!(counts.no_bid, 2);
        assert_eq!(total.total(), 6);
    }
}
