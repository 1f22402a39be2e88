//! Strategy parameters - one statically validated struct per kind

use arbiter_core::VenueId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StrategyError};

fn default_quantity() -> u32 {
    1
}

fn default_min_spread_percent() -> Decimal {
    dec!(10)
}

fn default_window() -> usize {
    20
}

/// Buy on the way down, sell on the way up, inside a fixed price band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    pub venue: VenueId,
    pub min_price: Decimal,
    pub max_price: Decimal,
    /// Number of equal bands between `min_price` and `max_price`
    pub grid_count: u32,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl GridParams {
    pub fn step(&self) -> Decimal {
        (self.max_price - self.min_price) / Decimal::from(self.grid_count)
    }
}

/// Cross-venue spread trading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageParams {
    /// Buy at the cheapest venue only at or below this price
    pub buy_threshold: Decimal,
    /// Sell at the dearest venue only at or above this price
    pub sell_threshold: Decimal,
    /// Spread, as percent of the cheapest price, that must be exceeded
    #[serde(default = "default_min_spread_percent")]
    pub min_spread_percent: Decimal,
    /// Absolute spread that must be exceeded
    #[serde(default)]
    pub min_spread_amount: Decimal,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// Ride the short-term trend at one venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendFollowingParams {
    pub venue: VenueId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// Fade deviations from a moving average at one venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanReversionParams {
    pub venue: VenueId,
    /// Samples in the moving average
    #[serde(default = "default_window")]
    pub window: usize,
    /// Band around the average, in percent
    pub deviation_percent: Decimal,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// Parameters of a strategy, tagged by kind
///
/// Unknown kinds fail deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyParams {
    Grid(GridParams),
    Arbitrage(ArbitrageParams),
    TrendFollowing(TrendFollowingParams),
    MeanReversion(MeanReversionParams),
}

impl StrategyParams {
    pub fn kind(&self) -> &'static str {
        match self {
            StrategyParams::Grid(_) => "grid",
            StrategyParams::Arbitrage(_) => "arbitrage",
            StrategyParams::TrendFollowing(_) => "trend_following",
            StrategyParams::MeanReversion(_) => "mean_reversion",
        }
    }

    /// Check value ranges; called on create and update
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Err(StrategyError::InvalidParams(reason.to_string()));

        match self {
            StrategyParams::Grid(p) => {
                if p.venue.is_empty() {
                    return invalid("grid venue is empty");
                }
                if p.min_price <= Decimal::ZERO {
                    return invalid("grid min_price must be positive");
                }
                if p.max_price <= p.min_price {
                    return invalid("grid max_price must exceed min_price");
                }
                if p.grid_count == 0 {
                    return invalid("grid_count must be at least 1");
                }
                check_quantity(p.quantity)
            }
            StrategyParams::Arbitrage(p) => {
                if p.buy_threshold <= Decimal::ZERO || p.sell_threshold <= Decimal::ZERO {
                    return invalid("arbitrage thresholds must be positive");
                }
                if p.min_spread_percent < Decimal::ZERO || p.min_spread_amount < Decimal::ZERO {
                    return invalid("arbitrage spread minimums must not be negative");
                }
                check_quantity(p.quantity)
            }
            StrategyParams::TrendFollowing(p) => {
                if p.venue.is_empty() {
                    return invalid("trend_following venue is empty");
                }
                check_quantity(p.quantity)
            }
            StrategyParams::MeanReversion(p) => {
                if p.venue.is_empty() {
                    return invalid("mean_reversion venue is empty");
                }
                if p.window < 2 {
                    return invalid("mean_reversion window must be at least 2");
                }
                if p.deviation_percent <= Decimal::ZERO || p.deviation_percent >= dec!(100) {
                    return invalid("mean_reversion deviation_percent must be in (0, 100)");
                }
                check_quantity(p.quantity)
            }
        }
    }
}

fn check_quantity(quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(StrategyError::InvalidParams(
            "quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}
