//! Pricing models
//!
//! Implements:
//! - Standard normal PDF/CDF (Abramowitz & Stegun)
//! - Black-Scholes European put Greeks
//! - Realized-volatility IV rank estimate

pub mod normal;
pub mod black_scholes;
pub mod iv_rank;

pub use normal::*;
pub use black_scholes::*;
pub use iv_rank::*;
