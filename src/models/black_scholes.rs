//! Black-Scholes European put Greeks
//!
//! Closed-form sensitivities under constant volatility and rate, no dividends.
//! Units follow what a put seller reads off a screen:
//! - theta in currency per day per 100-share contract
//! - vega per 1 vol point, rho per 1% rate move (both per share)

use super::normal::{norm_cdf, norm_pdf};
use crate::core::{Greeks, CONTRACT_MULTIPLIER};

const DAYS_PER_YEAR: f64 = 365.0;

/// Black-Scholes d1 and d2
///
/// Callers must ensure `time > 0` and `vol > 0`.
pub fn d1_d2(spot: f64, strike: f64, time: f64, rate: f64, vol: f64) -> (f64, f64) {
    let vol_sqrt_t = vol * time.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * vol * vol) * time) / vol_sqrt_t;
    (d1, d1 - vol_sqrt_t)
}

/// Greeks of a European put
///
/// # Arguments
/// * `spot` - Underlying price
/// * `strike` - Strike price
/// * `time` - Time to expiry in years
/// * `rate` - Continuously compounded risk-free rate
/// * `vol` - Volatility (decimal)
///
/// Returns the zero vector when `time <= 0` or `vol <= 0`.
pub fn put_greeks(spot: f64, strike: f64, time: f64, rate: f64, vol: f64) -> Greeks {
    if time <= 0.0 || vol <= 0.0 {
        return Greeks::zero();
    }

    let (d1, d2) = d1_d2(spot, strike, time, rate, vol);
    let sqrt_t = time.sqrt();
    let pdf_d1 = norm_pdf(d1);
    let n_neg_d1 = norm_cdf(-d1);
    let n_neg_d2 = norm_cdf(-d2);
    let df = (-rate * time).exp();

    let delta = -n_neg_d1;

    let denom = spot * vol * sqrt_t;
    let gamma = if denom > 0.0 { pdf_d1 / denom } else { 0.0 };

    let theta_annual = -(spot * pdf_d1 * vol) / (2.0 * sqrt_t) + rate * strike * df * n_neg_d2;
    let theta = theta_annual / DAYS_PER_YEAR * CONTRACT_MULTIPLIER;

    let vega = spot * pdf_d1 * sqrt_t / 100.0;

    let rho = -strike * time * df * n_neg_d2 / 100.0;

    Greeks::new(delta, gamma, theta, vega, rho)
}
