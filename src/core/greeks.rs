//! Option Greeks
//!
//! Sensitivities of a short-dated equity put, in the units the screener reports.

use serde::{Deserialize, Serialize};

/// Put Greeks as reported by the screener
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// Delta: dV/dS, in [-1, 0] for a put
    pub delta: f64,
    /// Gamma: d²V/dS²
    pub gamma: f64,
    /// Theta: currency per day per 100-share contract
    pub theta: f64,
    /// Vega: currency per share per 1 vol point
    pub vega: f64,
    /// Rho: currency per share per 1% rate move
    pub rho: f64,
}

impl Greeks {
    pub fn new(delta: f64, gamma: f64, theta: f64, vega: f64, rho: f64) -> Self {
        Self {
            delta,
            gamma,
            theta,
            vega,
            rho,
        }
    }

    /// All-zero vector returned for degenerate pricing inputs
    pub fn zero() -> Self {
        Self::default()
    }

    /// True when every sensitivity is a finite number
    pub fn is_finite(&self) -> bool {
        [self.delta, self.gamma, self.theta, self.vega, self.rho]
            .iter()
            .all(|v| v.is_finite())
    }
}
