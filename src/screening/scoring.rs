//! Composite score
//!
//! ```text
//! score = monthly_return × 0.40
//!       + iv_rank_term               // (ivr/100) × 15, or 15 × 0.5 when unknown
//!       + otm_pct × 0.25
//!       + min(|theta|/10, 5) × 1.5
//!       + (quality/100 × 10) × 0.8
//!       − min(gamma × 10000, 5) × 0.5
//! ```
//!
//! The weights are fixed so scores stay comparable between runs.

use serde::{Deserialize, Serialize};

use super::{ScreeningCandidate, StarRating};

pub const RETURN_WEIGHT: f64 = 0.40;
pub const IV_RANK_SCALE: f64 = 15.0;
/// Stand-in for IV rank / 100 when no price history is available
pub const IV_RANK_PLACEHOLDER: f64 = 0.5;
pub const OTM_WEIGHT: f64 = 0.25;
pub const THETA_WEIGHT: f64 = 1.5;
pub const QUALITY_WEIGHT: f64 = 0.8;
pub const GAMMA_WEIGHT: f64 = 0.5;

const THETA_CAP: f64 = 5.0;
const GAMMA_CAP: f64 = 5.0;

/// Score and its star rating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub score: f64,
    pub rating: StarRating,
}

/// Daily theta income term, capped at 5
pub fn theta_score(theta: f64) -> f64 {
    (theta.abs() / 10.0).min(THETA_CAP)
}

/// Assignment-risk penalty from gamma, capped at 5
pub fn gamma_penalty(gamma: f64) -> f64 {
    (gamma * 10_000.0).min(GAMMA_CAP)
}

/// Quality score rescaled to 0–10
pub fn quality_contribution(quality_score: u8) -> f64 {
    f64::from(quality_score) / 100.0 * 10.0
}

/// IV rank as a fraction, or the placeholder when unknown
///
/// A rank of exactly 0 is read as unknown, the same as a missing rank.
pub fn iv_rank_fraction(iv_rank: Option<f64>) -> f64 {
    iv_rank
        .filter(|&r| r > 0.0)
        .map(|r| r / 100.0)
        .unwrap_or(IV_RANK_PLACEHOLDER)
}

/// IV rank term; the constant placeholder when rank is unknown
pub fn iv_rank_term(iv_rank: Option<f64>) -> f64 {
    iv_rank_fraction(iv_rank) * IV_RANK_SCALE
}

/// Composite score of a filtered candidate
pub fn composite_score(candidate: &ScreeningCandidate) -> CompositeScore {
    let score = candidate.monthly_return * RETURN_WEIGHT
        + iv_rank_term(candidate.iv_rank)
        + candidate.otm_pct * OTM_WEIGHT
        + theta_score(candidate.greeks.theta) * THETA_WEIGHT
        + quality_contribution(candidate.quality_score) * QUALITY_WEIGHT
        - gamma_penalty(candidate.greeks.gamma) * GAMMA_WEIGHT;

    CompositeScore {
        score,
        rating: StarRating::from_score(score),
    }
}

/// Write the composite score and rating onto the candidate
pub fn apply_score(candidate: &mut ScreeningCandidate) {
    let CompositeScore { score, rating } = composite_score(candidate);
    candidate.score = score;
    candidate.rating = rating;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Greeks;
    use chrono::NaiveDate;

    fn candidate(monthly_return: f64, otm_pct: f64, greeks: Greeks, quality: u8) -> ScreeningCandidate {
        ScreeningCandidate {
            symbol: "TEST".into(),
            sector: String::new(),
            spot: 120.0,
            strike: 110.0,
            expiry: NaiveDate::from_ymd_opt(2025, 7, 18).unwrap(),
            dte: 30,
            bid: 2.4,
            ask: 2.6,
            mid: 2.5,
            greeks,
            iv_pct: 35.0,
            iv_rank: None,
            otm_pct,
            monthly_return,
            capital_required: 11_000.0,
            premium: 250.0,
            quality_score: quality,
            volume: 0,
            open_interest: 0,
            earnings_before_expiry: false,
            score: 0.0,
            rating: StarRating::None,
        }
    }

    #[test]
    fn test_placeholder_term_is_constant() {
        assert!((iv_rank_term(None) - 7.5).abs() < 1e-12);
        assert!((iv_rank_term(Some(80.0)) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_iv_rank_reads_as_unknown() {
        assert_eq!(iv_rank_term(Some(0.0)), iv_rank_term(None));
        assert_eq!(iv_rank_fraction(Some(0.0)), IV_RANK_PLACEHOLDER);
        assert!((iv_rank_fraction(Some(0.1)) - 0.001).abs() < 1e-15);
    }

    #[test]
    fn test_caps() {
        assert_eq!(theta_score(-4.0), 0.4);
        assert_eq!(theta_score(-80.0), 5.0);
        assert!((gamma_penalty(0.0002) - 2.0).abs() < 1e-12);
        assert_eq!(gamma_penalty(0.01), 5.0);
    }

    #[test]
    fn test_reference_score() {
        let greeks = Greeks::new(-0.169996, 0.0210156, -4.812667, 0.087, -0.0177);
        let c = candidate(2.272727, 8.333333, greeks, 50);
        let s = composite_score(&c);

        // 0.909091 + 7.5 + 2.083333 + 0.721900 + 4.0 - 2.5
        assert!((s.score - 12.714324).abs() < 1e-4);
        assert_eq!(s.rating, StarRating::One);
    }

    #[test]
    fn test_iv_rank_extension() {
        let greeks = Greeks::new(-0.2, 0.0, -10.0, 0.1, -0.02);
        let mut c = candidate(2.0, 10.0, greeks, 100);
        let base = composite_score(&c).score;

        c.iv_rank = Some(100.0);
        let high = composite_score(&c).score;
        assert!((high - base - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_apply_score() {
        let greeks = Greeks::new(-0.25, 0.0, -30.0, 0.1, -0.02);
        let mut c = candidate(6.0, 12.0, greeks, 90);
        apply_score(&mut c);

        // 2.4 + 7.5 + 3.0 + 4.5 + 7.2
        assert!((c.score - 24.6).abs() < 1e-9);
        assert_eq!(c.rating, StarRating::Three);
    }
}
