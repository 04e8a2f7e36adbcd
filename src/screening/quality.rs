//! Fundamental quality score
//!
//! Starts from a neutral 50 and adds independent per-metric adjustments, then
//! clamps once to [0, 100]. A metric reported as 0 is treated as unavailable and
//! never lands in a penalty tier.

use crate::core::Quote;

const NEUTRAL: i32 = 50;

/// Quality score (0–100) of an underlying from its fundamentals
pub fn quality_score(quote: &Quote) -> u8 {
    let score = NEUTRAL
        + gross_margin_points(quote.gross_margin)
        + operating_margin_points(quote.operating_margin)
        + fcf_yield_points(quote.fcf_yield)
        + revenue_growth_points(quote.revenue_growth)
        + pe_points(quote.pe_ratio);

    score.clamp(0, 100) as u8
}

/// ≥60% excellent, ≥40% good, below 20% poor
fn gross_margin_points(gm: f64) -> i32 {
    if gm >= 60.0 {
        12
    } else if gm >= 40.0 {
        6
    } else if gm < 20.0 && gm > 0.0 {
        -8
    } else {
        0
    }
}

fn operating_margin_points(om: f64) -> i32 {
    if om >= 25.0 {
        10
    } else if om >= 15.0 {
        5
    } else if om < 0.0 {
        -10
    } else {
        0
    }
}

fn fcf_yield_points(fy: f64) -> i32 {
    if fy >= 5.0 {
        10
    } else if fy >= 2.0 {
        5
    } else if fy < 0.0 {
        -8
    } else {
        0
    }
}

fn revenue_growth_points(rg: f64) -> i32 {
    if rg >= 20.0 {
        10
    } else if rg >= 10.0 {
        5
    } else if rg < 0.0 {
        -8
    } else {
        0
    }
}

/// Reasonable P/E preferred; negative earnings or >100x penalized
fn pe_points(pe: f64) -> i32 {
    if pe > 0.0 && pe <= 25.0 {
        8
    } else if pe > 25.0 && pe <= 50.0 {
        2
    } else if pe > 100.0 || pe < 0.0 {
        -5
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn quote(gm: f64, om: f64, fy: f64, rg: f64, pe: f64) -> Quote {
        Quote {
            gross_margin: gm,
            operating_margin: om,
            fcf_yield: fy,
            revenue_growth: rg,
            pe_ratio: pe,
            ..Quote::new("TEST", 100.0)
        }
    }

    #[test]
    fn test_missing_fundamentals_are_neutral() {
        assert_eq!(quality_score(&quote(0.0, 0.0, 0.0, 0.0, 0.0)), 50);
    }

    #[test]
    fn test_best_in_class() {
        // 50 + 12 + 10 + 10 + 10 + 8
        assert_eq!(quality_score(&quote(75.0, 40.0, 6.0, 30.0, 20.0)), 100);
    }

    #[test]
    fn test_worst_case() {
        // 50 - 8 - 10 - 8 - 8 - 5
        assert_eq!(quality_score(&quote(10.0, -5.0, -1.0, -3.0, -12.0)), 11);
    }

    #[test]
    fn test_mild_tiers() {
        // 50 + 6 + 5 + 5 + 5 + 2
        assert_eq!(quality_score(&quote(45.0, 18.0, 3.0, 12.0, 30.0)), 73);
    }

    #[test]
    fn test_gross_margin_floor_excludes_zero() {
        assert_eq!(gross_margin_points(0.0), 0);
        assert_eq!(gross_margin_points(15.0), -8);
        assert_eq!(gross_margin_points(25.0), 0);
    }

    #[test]
    fn test_pe_tiers() {
        assert_eq!(pe_points(0.0), 0);
        assert_eq!(pe_points(25.0), 8);
        assert_eq!(pe_points(50.0), 2);
        assert_eq!(pe_points(75.0), 0);
        assert_eq!(pe_points(150.0), -5);
    }

    proptest! {
        #[test]
        fn score_is_bounded(
            gm in -100.0f64..100.0,
            om in -100.0f64..100.0,
            fy in -50.0f64..50.0,
            rg in -100.0f64..300.0,
            pe in -500.0f64..500.0,
        ) {
            let s = quality_score(&quote(gm, om, fy, rg, pe));
            prop_assert!(s <= 100);
        }
    }
}
