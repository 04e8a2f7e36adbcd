//! Put credit spreads
//!
//! Sell an OTM put from the delta band, buy a further OTM put as protection.
//! Risk is capped at `width - credit` per share, so the collateral is the max loss
//! instead of the full strike.
//!
//! Long leg choice: the first strike 5–10% below the short strike (by default),
//! otherwise the nearest quotable strike below it.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::filter::{monthly_return, ExpiryContext};
use super::ranker::Ranked;
use super::scoring::iv_rank_fraction;
use super::{ScreeningConfig, SpreadConfig};
use crate::core::{ExpirationChain, OptionContract, CONTRACT_MULTIPLIER};
use crate::models::put_greeks;

const DAYS_PER_YEAR: f64 = 365.0;
const ANNUALIZED_CAP: f64 = 9999.0;
const PROFIT_TARGET: f64 = 0.50;
/// Spreads typically reach half their value about a third of the way to expiry
const TARGET_TIME_FRACTION: f64 = 0.33;

/// A priced put credit spread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadCandidate {
    pub symbol: String,
    pub spot: f64,
    pub short_strike: f64,
    pub long_strike: f64,
    pub width: f64,
    pub expiry: NaiveDate,
    pub dte: i64,
    pub short_bid: f64,
    pub short_ask: f64,
    pub short_mid: f64,
    pub long_bid: f64,
    pub long_ask: f64,
    pub long_mid: f64,
    /// Short bid minus long ask, per share
    pub net_credit: f64,
    /// Mid-to-mid credit, per share
    pub net_credit_mid: f64,
    /// Width minus credit, per share
    pub max_loss: f64,
    /// Credit per contract
    pub max_profit: f64,
    /// Max loss per contract
    pub capital_required: f64,
    /// Credit over max loss, in percent
    pub return_on_risk: f64,
    pub monthly_return: f64,
    /// Compounded return on risk, capped at 9999%
    pub annualized_return: f64,
    pub breakeven: f64,
    /// Distance from spot down to breakeven, in percent
    pub otm_pct: f64,
    /// Rough probability of profit from the short delta, in percent
    pub pop: f64,
    /// Credit over width, in percent
    pub credit_efficiency: f64,
    pub credit_per_dollar: f64,
    /// Debit to close at 50% profit
    pub profit_target: f64,
    pub days_to_target: i64,
    /// Short leg delta
    pub delta: f64,
    /// Short leg IV as quoted, in percent
    pub iv_pct: f64,
    pub iv_rank: Option<f64>,
    pub volume: u64,
    pub open_interest: u64,
    pub earnings_before_expiry: bool,
    pub quality_score: u8,
    pub score: f64,
}

impl Ranked for SpreadCandidate {
    fn score(&self) -> f64 {
        self.score
    }
}

struct ShortLeg<'a> {
    contract: &'a OptionContract,
    bid: f64,
    ask: f64,
    delta: f64,
}

struct LongLeg<'a> {
    contract: &'a OptionContract,
    bid: f64,
    ask: f64,
}

/// Pair every eligible short put of a chain with its long leg
///
/// The chain must already have passed the DTE pre-filter.
pub fn screen_put_spreads(
    ctx: &ExpiryContext,
    chain: &ExpirationChain,
    config: &ScreeningConfig,
) -> Vec<SpreadCandidate> {
    let mut puts: Vec<&OptionContract> = chain.puts.iter().collect();
    puts.sort_by(|a, b| b.strike.partial_cmp(&a.strike).unwrap_or(Ordering::Equal));

    let mut spreads = Vec::new();

    for (i, contract) in puts.iter().enumerate() {
        let Some(short) = short_leg(ctx, contract, config) else {
            continue;
        };
        let Some(long) = long_leg(&short, &puts[i + 1..], &config.spreads) else {
            continue;
        };
        if let Some(spread) = price_spread(ctx, &short, &long, config) {
            spreads.push(spread);
        }
    }

    spreads
}

fn short_leg<'a>(
    ctx: &ExpiryContext,
    contract: &'a OptionContract,
    config: &ScreeningConfig,
) -> Option<ShortLeg<'a>> {
    let spot = ctx.quote.price;
    let settings = &config.spreads;

    if !contract.is_otm(spot) {
        return None;
    }

    let (bid, ask) = contract.bid_ask_or_last(settings.last_price_band)?;
    let mid = (bid + ask) / 2.0;
    if mid > 0.0 && (ask - bid) / mid > settings.max_short_spread_pct {
        return None;
    }

    let sigma = credible_volatility(contract.implied_vol, settings);
    let time = ctx.dte as f64 / DAYS_PER_YEAR;
    let greeks = put_greeks(spot, contract.strike, time, config.risk_free_rate, sigma);
    if !greeks.is_finite() || !config.delta_in_band(greeks.delta.abs()) {
        return None;
    }

    Some(ShortLeg {
        contract,
        bid,
        ask,
        delta: greeks.delta,
    })
}

/// Quoted IV unless it is implausibly low
fn credible_volatility(implied_vol: f64, settings: &SpreadConfig) -> f64 {
    if implied_vol >= settings.min_credible_iv {
        implied_vol
    } else {
        settings.fallback_volatility
    }
}

/// `lower` holds the strikes below the short leg, highest first
fn long_leg<'a>(
    short: &ShortLeg,
    lower: &[&'a OptionContract],
    settings: &SpreadConfig,
) -> Option<LongLeg<'a>> {
    let short_strike = short.contract.strike;
    let min_strike = short_strike * settings.long_leg_min_ratio;
    let max_strike = short_strike * settings.long_leg_max_ratio;

    let mut quotable = lower
        .iter()
        .copied()
        .filter(|c| c.strike < short_strike)
        .filter_map(|c| {
            c.ask_or_last(settings.last_price_band)
                .map(|(bid, ask)| LongLeg { contract: c, bid, ask })
        });

    let first = quotable.next()?;
    if (min_strike..=max_strike).contains(&first.contract.strike) {
        return Some(first);
    }

    quotable
        .take_while(|leg| leg.contract.strike >= min_strike)
        .find(|leg| leg.contract.strike <= max_strike)
        .or(Some(first))
}

fn price_spread(
    ctx: &ExpiryContext,
    short: &ShortLeg,
    long: &LongLeg,
    config: &ScreeningConfig,
) -> Option<SpreadCandidate> {
    let spot = ctx.quote.price;
    let dte = ctx.dte;

    let width = short.contract.strike - long.contract.strike;
    if width <= 0.0 {
        return None;
    }

    let net_credit = short.bid - long.ask;
    if net_credit <= 0.0 {
        return None;
    }

    let max_loss = width - net_credit;
    if max_loss <= 0.0 {
        return None;
    }

    let return_on_risk = net_credit / max_loss * 100.0;
    // Same 30-day normalization as puts, with max loss standing in for the strike
    let monthly = monthly_return(net_credit, max_loss, dte);
    if monthly < config.min_monthly_return {
        return None;
    }

    let short_mid = (short.bid + short.ask) / 2.0;
    let long_mid = (long.bid + long.ask) / 2.0;
    let capital_required = max_loss * CONTRACT_MULTIPLIER;
    let breakeven = short.contract.strike - net_credit;
    let otm_pct = (spot - breakeven) / spot * 100.0;
    let pop = (1.0 - short.delta.abs()) * 100.0;

    let annualized_return = if dte > 0 {
        ((1.0 + return_on_risk / 100.0).powf(DAYS_PER_YEAR / dte as f64) - 1.0) * 100.0
    } else {
        0.0
    };

    let mut spread = SpreadCandidate {
        symbol: ctx.quote.symbol.clone(),
        spot,
        short_strike: short.contract.strike,
        long_strike: long.contract.strike,
        width,
        expiry: ctx.expiry,
        dte,
        short_bid: short.bid,
        short_ask: short.ask,
        short_mid,
        long_bid: long.bid,
        long_ask: long.ask,
        long_mid,
        net_credit,
        net_credit_mid: short_mid - long_mid,
        max_loss,
        max_profit: net_credit * CONTRACT_MULTIPLIER,
        capital_required,
        return_on_risk,
        monthly_return: monthly,
        annualized_return: annualized_return.min(ANNUALIZED_CAP),
        breakeven,
        otm_pct,
        pop,
        credit_efficiency: net_credit / width * 100.0,
        credit_per_dollar: net_credit * CONTRACT_MULTIPLIER / capital_required * 100.0,
        profit_target: net_credit * PROFIT_TARGET,
        days_to_target: (dte.max(0) as f64 * TARGET_TIME_FRACTION).floor() as i64,
        delta: short.delta,
        iv_pct: short.contract.implied_vol * 100.0,
        iv_rank: ctx.iv_rank,
        volume: short.contract.volume,
        open_interest: short.contract.open_interest,
        earnings_before_expiry: ctx.earnings_before_expiry,
        quality_score: ctx.quality_score,
        score: 0.0,
    };
    spread.score = spread_score(&spread);

    Some(spread)
}

/// 10 in the 0.15–0.25 sweet spot, 5 just outside it
pub fn delta_bonus(abs_delta: f64) -> f64 {
    if (0.15..=0.25).contains(&abs_delta) {
        10.0
    } else if (0.12..0.15).contains(&abs_delta) || (abs_delta > 0.25 && abs_delta <= 0.30) {
        5.0
    } else {
        0.0
    }
}

/// $5–$10 wide is optimal; narrower earns little credit, wider ties up capital
pub fn width_score(width: f64) -> f64 {
    if (5.0..=10.0).contains(&width) {
        8.0
    } else if width > 10.0 && width <= 20.0 {
        5.0
    } else if width < 5.0 {
        3.0
    } else {
        2.0
    }
}

/// Composite score of a priced spread
pub fn spread_score(spread: &SpreadCandidate) -> f64 {
    let ivr = iv_rank_fraction(spread.iv_rank);
    let quality = f64::from(spread.quality_score) / 100.0 * 10.0;

    spread.return_on_risk * 0.25
        + spread.credit_per_dollar * 0.20
        + spread.pop * 0.15
        + ivr * 12.0
        + delta_bonus(spread.delta.abs())
        + width_score(spread.width)
        + quality * 0.4
        + spread.otm_pct * 0.08
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Quote;
    use crate::screening::rank;

    fn ctx(quote: &Quote) -> ExpiryContext<'_> {
        ExpiryContext {
            quote,
            expiry: NaiveDate::from_ymd_opt(2025, 7, 18).unwrap(),
            dte: 30,
            quality_score: 50,
            iv_rank: None,
            earnings_before_expiry: false,
        }
    }

    fn chain(puts: Vec<OptionContract>) -> ExpirationChain {
        ExpirationChain::new(NaiveDate::from_ymd_opt(2025, 7, 18).unwrap(), puts)
    }

    fn reference_chain() -> ExpirationChain {
        chain(vec![
            OptionContract::new(100.0, 0.50, 0.60, 0.35),
            OptionContract::new(105.0, 1.20, 1.30, 0.35),
            OptionContract::new(110.0, 2.40, 2.60, 0.35),
            OptionContract::new(113.0, 3.40, 3.60, 0.35),
            OptionContract::new(125.0, 6.00, 6.20, 0.35),
        ])
    }

    #[test]
    fn test_reference_spreads() {
        let q = Quote::new("TEST", 120.0);
        let spreads = screen_put_spreads(&ctx(&q), &reference_chain(), &ScreeningConfig::default());

        assert_eq!(spreads.len(), 2);

        let s = &spreads[0];
        assert_eq!((s.short_strike, s.long_strike), (113.0, 105.0));
        assert!((s.width - 8.0).abs() < 1e-12);
        assert!((s.net_credit - 2.10).abs() < 1e-9);
        assert!((s.max_loss - 5.90).abs() < 1e-9);
        assert!((s.capital_required - 590.0).abs() < 1e-6);
        assert!((s.return_on_risk - 35.593220).abs() < 1e-5);
        assert!((s.breakeven - 110.9).abs() < 1e-9);
        assert!((s.otm_pct - 7.583333).abs() < 1e-5);
        assert!((s.pop - 75.365065).abs() < 1e-4);
        assert!((s.credit_efficiency - 26.25).abs() < 1e-9);
        assert!((s.annualized_return - 3963.454).abs() < 1e-2);
        assert_eq!(s.days_to_target, 9);
        assert!((s.score - 53.928376).abs() < 1e-4);

        // 105 lies above the 5–10% window below 110, so the long leg is 100
        let s = &spreads[1];
        assert_eq!((s.short_strike, s.long_strike), (110.0, 100.0));
        assert!((s.net_credit - 1.80).abs() < 1e-9);
        assert!((s.score - 49.114773).abs() < 1e-4);
    }

    #[test]
    fn test_ranked_spreads() {
        let q = Quote::new("TEST", 120.0);
        let mut spreads = screen_put_spreads(&ctx(&q), &reference_chain(), &ScreeningConfig::default());
        spreads.reverse();

        let ranked = rank(spreads, 5);
        assert_eq!(ranked[0].short_strike, 113.0);
        assert_eq!(ranked[1].short_strike, 110.0);
    }

    #[test]
    fn test_short_leg_last_price_fallback() {
        let q = Quote::new("TEST", 120.0);
        let mut short = OptionContract::new(113.0, 0.0, 0.0, 0.35);
        short.last = 3.50;

        let spreads = screen_put_spreads(
            &ctx(&q),
            &chain(vec![short, OptionContract::new(105.0, 1.20, 1.30, 0.35)]),
            &ScreeningConfig::default(),
        );

        assert_eq!(spreads.len(), 1);
        assert!((spreads[0].short_bid - 3.325).abs() < 1e-9);
        assert!((spreads[0].short_ask - 3.675).abs() < 1e-9);
    }

    #[test]
    fn test_long_leg_without_quotes_is_skipped() {
        let q = Quote::new("TEST", 120.0);
        let spreads = screen_put_spreads(
            &ctx(&q),
            &chain(vec![
                OptionContract::new(113.0, 3.40, 3.60, 0.35),
                OptionContract::new(105.0, 0.0, 0.0, 0.35),
                OptionContract::new(100.0, 0.50, 0.60, 0.35),
            ]),
            &ScreeningConfig::default(),
        );

        assert_eq!(spreads.len(), 1);
        assert_eq!(spreads[0].long_strike, 100.0);
    }

    #[test]
    fn test_debit_spread_rejected() {
        let q = Quote::new("TEST", 120.0);
        let spreads = screen_put_spreads(
            &ctx(&q),
            &chain(vec![
                OptionContract::new(113.0, 3.40, 3.60, 0.35),
                OptionContract::new(105.0, 3.00, 3.50, 0.35),
            ]),
            &ScreeningConfig::default(),
        );
        assert!(spreads.is_empty());
    }

    #[test]
    fn test_spread_score_iv_rank() {
        let q = Quote::new("TEST", 120.0);
        let mut spread = screen_put_spreads(&ctx(&q), &reference_chain(), &ScreeningConfig::default())
            .remove(0);
        let base = spread_score(&spread);

        spread.iv_rank = Some(0.0);
        assert_eq!(spread_score(&spread), base);

        spread.iv_rank = Some(100.0);
        assert!((spread_score(&spread) - base - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_low_iv_replaced() {
        let settings = SpreadConfig::default();
        assert_eq!(credible_volatility(0.05, &settings), 0.35);
        assert_eq!(credible_volatility(0.15, &settings), 0.15);
        assert_eq!(credible_volatility(0.60, &settings), 0.60);
    }

    #[test]
    fn test_bonus_tiers() {
        assert_eq!(delta_bonus(0.20), 10.0);
        assert_eq!(delta_bonus(0.13), 5.0);
        assert_eq!(delta_bonus(0.28), 5.0);
        assert_eq!(delta_bonus(0.33), 0.0);

        assert_eq!(width_score(5.0), 8.0);
        assert_eq!(width_score(15.0), 5.0);
        assert_eq!(width_score(2.5), 3.0);
        assert_eq!(width_score(50.0), 2.0);
    }
}
