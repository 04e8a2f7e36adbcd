//! Configuration for the screening pipeline
//!
//! A `ScreeningConfig` is built once (from defaults, a preset or a JSON file),
//! validated, and then only read for the whole run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Quote, ScreenerError, ScreenerResult};

/// Thresholds and market constants for one screening run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    /// Minimum |delta| of the short put
    /// Default: 0.15
    pub min_delta: f64,

    /// Maximum |delta| of the short put
    /// Default: 0.35
    pub max_delta: f64,

    /// Minimum days to expiration
    /// Default: 20
    pub min_dte: i64,

    /// Maximum days to expiration
    /// Default: 50
    pub max_dte: i64,

    /// Minimum premium return normalized to 30 days, in percent
    /// Default: 0.5
    pub min_monthly_return: f64,

    /// Number of ranked results to keep
    /// Default: 25
    pub top_n: usize,

    /// Risk-free rate used for pricing
    /// Default: 0.045
    pub risk_free_rate: f64,

    /// Volatility used when a contract has no implied vol
    /// Default: 0.30
    pub fallback_volatility: f64,

    /// Maximum bid-ask spread as a fraction of mid
    /// Default: 0.15
    pub max_spread_pct: f64,

    /// Minimum IV rank (0–100); candidates with unknown rank fail when set
    pub min_iv_rank: Option<f64>,

    /// Only screen underlyings whose sector contains this (case-insensitive)
    pub sector: Option<String>,

    /// Fundamental floors applied per underlying
    pub fundamentals: FundamentalFloors,

    /// Put credit spread settings
    pub spreads: SpreadConfig,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            min_delta: 0.15,
            max_delta: 0.35,
            min_dte: 20,
            max_dte: 50,
            min_monthly_return: 0.5,
            top_n: 25,
            risk_free_rate: 0.045,
            fallback_volatility: 0.30,
            max_spread_pct: 0.15,
            min_iv_rank: None,
            sector: None,
            fundamentals: FundamentalFloors::default(),
            spreads: SpreadConfig::default(),
        }
    }
}

impl ScreeningConfig {
    /// Reject configurations that cannot produce a meaningful run
    pub fn validate(&self) -> ScreenerResult<()> {
        if !(0.0..=1.0).contains(&self.min_delta) || !(0.0..=1.0).contains(&self.max_delta) {
            return Err(ScreenerError::invalid_config(format!(
                "delta band [{}, {}] must lie within [0, 1]",
                self.min_delta, self.max_delta
            )));
        }
        if self.min_delta > self.max_delta {
            return Err(ScreenerError::invalid_config(format!(
                "min_delta {} exceeds max_delta {}",
                self.min_delta, self.max_delta
            )));
        }
        if self.min_dte < 0 {
            return Err(ScreenerError::invalid_config(format!(
                "min_dte {} is negative",
                self.min_dte
            )));
        }
        if self.min_dte > self.max_dte {
            return Err(ScreenerError::invalid_config(format!(
                "min_dte {} exceeds max_dte {}",
                self.min_dte, self.max_dte
            )));
        }
        if !self.min_monthly_return.is_finite() {
            return Err(ScreenerError::invalid_config("min_monthly_return must be finite"));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(ScreenerError::invalid_config("risk_free_rate must be finite"));
        }
        if !self.fallback_volatility.is_finite() || self.fallback_volatility <= 0.0 {
            return Err(ScreenerError::invalid_config(format!(
                "fallback_volatility {} must be positive",
                self.fallback_volatility
            )));
        }
        if self.max_spread_pct.is_nan() || self.max_spread_pct < 0.0 {
            return Err(ScreenerError::invalid_config(format!(
                "max_spread_pct {} must be non-negative",
                self.max_spread_pct
            )));
        }
        if let Some(ivr) = self.min_iv_rank {
            if !(0.0..=100.0).contains(&ivr) {
                return Err(ScreenerError::invalid_config(format!(
                    "min_iv_rank {} must lie within [0, 100]",
                    ivr
                )));
            }
        }
        self.spreads.validate()
    }

    /// Parse a (possibly partial) JSON config; missing fields take defaults
    pub fn from_json_str(json: &str) -> ScreenerResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> ScreenerResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Whether a days-to-expiration count falls in the configured band
    pub fn dte_in_range(&self, dte: i64) -> bool {
        dte >= self.min_dte && dte <= self.max_dte
    }

    /// Whether |delta| falls in the configured band
    pub fn delta_in_band(&self, abs_delta: f64) -> bool {
        abs_delta >= self.min_delta && abs_delta <= self.max_delta
    }

    /// Whether an underlying's sector matches the configured one (if any)
    pub fn admits_sector(&self, quote: &Quote) -> bool {
        self.sector
            .as_deref()
            .map(|sector| quote.in_sector(sector))
            .unwrap_or(true)
    }
}

/// Optional fundamental floors; `None` disables a floor
///
/// A fundamental reported as exactly 0 is treated as unavailable and never fails
/// a floor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalFloors {
    /// Minimum gross margin (%)
    pub min_gross_margin: Option<f64>,
    /// Minimum free-cash-flow yield (%)
    pub min_fcf_yield: Option<f64>,
    /// Minimum revenue growth (%)
    pub min_revenue_growth: Option<f64>,
}

impl FundamentalFloors {
    pub fn admits(&self, quote: &Quote) -> bool {
        fn above(floor: Option<f64>, value: f64) -> bool {
            match floor {
                Some(min) if value != 0.0 => value >= min,
                _ => true,
            }
        }

        above(self.min_gross_margin, quote.gross_margin)
            && above(self.min_fcf_yield, quote.fcf_yield)
            && above(self.min_revenue_growth, quote.revenue_growth)
    }
}

/// Put credit spread settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadConfig {
    /// Maximum bid-ask spread of the short leg as a fraction of mid
    /// Default: 0.20
    pub max_short_spread_pct: f64,

    /// Implied vols below this are considered bad data
    /// Default: 0.15
    pub min_credible_iv: f64,

    /// Volatility used in place of a missing or non-credible IV
    /// Default: 0.35
    pub fallback_volatility: f64,

    /// Band around the last price used when a leg has no live quote
    /// Default: 0.05
    pub last_price_band: f64,

    /// Preferred long strike range as fractions of the short strike
    /// Default: 0.90..=0.95
    pub long_leg_min_ratio: f64,
    pub long_leg_max_ratio: f64,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            max_short_spread_pct: 0.20,
            min_credible_iv: 0.15,
            fallback_volatility: 0.35,
            last_price_band: 0.05,
            long_leg_min_ratio: 0.90,
            long_leg_max_ratio: 0.95,
        }
    }
}

impl SpreadConfig {
    fn validate(&self) -> ScreenerResult<()> {
        if self.fallback_volatility.is_nan() || self.fallback_volatility <= 0.0 {
            return Err(ScreenerError::invalid_config(
                "spreads.fallback_volatility must be positive",
            ));
        }
        if !(0.0..1.0).contains(&self.last_price_band) {
            return Err(ScreenerError::invalid_config(
                "spreads.last_price_band must lie within [0, 1)",
            ));
        }
        if !(0.0 < self.long_leg_min_ratio
            && self.long_leg_min_ratio <= self.long_leg_max_ratio
            && self.long_leg_max_ratio < 1.0)
        {
            return Err(ScreenerError::invalid_config(
                "spreads long leg ratios must satisfy 0 < min <= max < 1",
            ));
        }
        Ok(())
    }
}

/// Named list of underlyings to screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watchlist {
    pub name: String,
    pub symbols: Vec<String>,
}

impl Watchlist {
    pub fn custom(symbols: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: "Custom".to_string(),
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }

    fn named(name: &str, symbols: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
        }
    }
}

const DEFAULT_SYMBOLS: &[&str] = &[
    "SPY", "QQQ", "AAPL", "MSFT", "AMZN", "GOOGL", "NVDA", "AMD", "META", "TSLA", "KO", "PEP",
    "JNJ", "JPM", "BAC",
];

const AI_TECH_SYMBOLS: &[&str] = &[
    // Semiconductors
    "NVDA", "AMD", "TSM", "AVGO", "MRVL", "ARM", "MU", "INTC", "QCOM", "SMCI",
    // Software and cloud
    "MSFT", "GOOGL", "META", "AMZN", "PLTR", "CRM", "SNOW", "AI", "ORCL", "NOW",
    // Datacenter infrastructure
    "EQIX", "DLR", "VRT", "ANET",
    "TSLA",
    // Cybersecurity
    "CRWD", "ZS",
    "RKLB", "NBIS", "GTLB", "UBER",
];

const INCOME_SYMBOLS: &[&str] = &[
    "NVDA", "AMZN", "TSLA", "GOOGL", "AMD", "META", "MSFT", "AAPL", "AVGO", "MU", "SMCI", "PLTR",
];

const MAK_SYMBOLS: &[&str] = &[
    "TSLA", "PLTR", "AMZN", "GOOGL", "META", "NVDA", "AMD", "SOFI", "HOOD", "UBER", "CRM", "AAPL",
    "MSFT",
];

/// Strategy presets: a fixed config paired with its watchlist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    /// Defaults over a broad large-cap list
    #[default]
    Default,
    /// Defaults over an AI/tech and datacenter list
    AiStocks,
    /// Low-delta income selling (|delta| 0.15–0.25)
    Income,
    /// High IV rank, 1% monthly minimum, |delta| 0.20–0.35
    MakStrategy,
}

impl Preset {
    pub fn config(&self) -> ScreeningConfig {
        match self {
            Preset::Default | Preset::AiStocks => ScreeningConfig::default(),
            Preset::Income => ScreeningConfig {
                max_delta: 0.25,
                ..Default::default()
            },
            Preset::MakStrategy => ScreeningConfig {
                min_iv_rank: Some(50.0),
                min_monthly_return: 1.0,
                min_delta: 0.20,
                max_delta: 0.35,
                min_dte: 20,
                max_dte: 50,
                ..Default::default()
            },
        }
    }

    pub fn watchlist(&self) -> Watchlist {
        match self {
            Preset::Default => Watchlist::named("Default Watchlist", DEFAULT_SYMBOLS),
            Preset::AiStocks => Watchlist::named("AI/Tech + Datacenter Watchlist", AI_TECH_SYMBOLS),
            Preset::Income => Watchlist::named("Income Strategy", INCOME_SYMBOLS),
            Preset::MakStrategy => Watchlist::named("Mak Strategy", MAK_SYMBOLS),
        }
    }

    /// Look a preset up by its short name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Preset::Default),
            "ai" | "ai-stocks" => Some(Preset::AiStocks),
            "income" => Some(Preset::Income),
            "mak" | "mak-strategy" => Some(Preset::MakStrategy),
            _ => None,
        }
    }
}
