//! Income projection over the top of a ranked list
//!
//! Puts earn their daily theta; spreads earn their credit spread evenly over the
//! days to expiration. Neither is a profit guarantee, only the decay rate at
//! today's prices.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::spreads::SpreadCandidate;
use super::ScreeningCandidate;
use crate::core::CONTRACT_MULTIPLIER;

const DAYS_PER_WEEK: f64 = 7.0;
const DAYS_PER_MONTH: f64 = 30.0;

/// A position that can be projected
pub trait IncomeSource {
    fn symbol(&self) -> &str;
    fn expiry(&self) -> NaiveDate;
    fn dte(&self) -> i64;
    /// Dollars per contract earned per day
    fn daily_income(&self) -> f64;
    /// Cash tied up per contract
    fn capital(&self) -> f64;
    /// Dollars kept if the position expires worthless
    fn max_profit(&self) -> f64;
}

impl IncomeSource for ScreeningCandidate {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn expiry(&self) -> NaiveDate {
        self.expiry
    }

    fn dte(&self) -> i64 {
        self.dte
    }

    fn daily_income(&self) -> f64 {
        self.greeks.theta.abs()
    }

    fn capital(&self) -> f64 {
        self.capital_required
    }

    fn max_profit(&self) -> f64 {
        self.premium
    }
}

impl IncomeSource for SpreadCandidate {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn expiry(&self) -> NaiveDate {
        self.expiry
    }

    fn dte(&self) -> i64 {
        self.dte
    }

    fn daily_income(&self) -> f64 {
        if self.dte > 0 {
            self.net_credit * CONTRACT_MULTIPLIER / self.dte as f64
        } else {
            0.0
        }
    }

    fn capital(&self) -> f64 {
        self.capital_required
    }

    fn max_profit(&self) -> f64 {
        self.max_profit
    }
}

/// One projected position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeLine {
    pub symbol: String,
    pub expiry: NaiveDate,
    pub dte: i64,
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
    pub capital: f64,
}

/// Totals across the projected positions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeProjection {
    pub lines: Vec<IncomeLine>,
    pub weekly_total: f64,
    pub monthly_total: f64,
    pub max_profit_total: f64,
    pub capital_total: f64,
}

impl IncomeProjection {
    /// Project the first `top_n` items of an already ranked list
    pub fn from_ranked<T: IncomeSource>(ranked: &[T], top_n: usize) -> Self {
        let mut projection = IncomeProjection::default();

        for item in ranked.iter().take(top_n) {
            let daily = item.daily_income();
            let line = IncomeLine {
                symbol: item.symbol().to_string(),
                expiry: item.expiry(),
                dte: item.dte(),
                daily,
                weekly: daily * DAYS_PER_WEEK,
                monthly: daily * DAYS_PER_MONTH,
                capital: item.capital(),
            };

            projection.weekly_total += line.weekly;
            projection.monthly_total += line.monthly;
            projection.capital_total += line.capital;
            projection.max_profit_total += item.max_profit();
            projection.lines.push(line);
        }

        projection
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Monthly income over total capital, in percent
    pub fn monthly_roi(&self) -> Option<f64> {
        (self.capital_total > 0.0).then(|| self.monthly_total / self.capital_total * 100.0)
    }

    /// Max profit over total capital, in percent
    pub fn max_roi(&self) -> Option<f64> {
        (self.capital_total > 0.0).then(|| self.max_profit_total / self.capital_total * 100.0)
    }
}
