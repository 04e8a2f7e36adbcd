//! Core data types for the screener
//!
//! Defines fundamental types:
//! - Quote: spot price and fundamentals of an underlying
//! - OptionContract / ExpirationChain: raw put quotes per expiry
//! - Greeks: put sensitivities
//! - ScreenerError: crate error type

pub mod option;
pub mod quote;
pub mod greeks;
pub mod error;

pub use option::*;
pub use quote::*;
pub use greeks::*;
pub use error::*;
