//! Strategy Logic Trait and Context
//!
//! Defines the interface every strategy kind implements and the read-only
//! view of the market it is evaluated against.

use std::collections::BTreeMap;

use arbiter_core::{ItemId, PricePoint, Side, Timestamp, VenueId};
use arbiter_market::PriceStore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::params::StrategyParams;
use crate::{arbitrage, grid, mean_reversion, trend_following};

/// A buy or sell decision before it becomes an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub side: Side,
    pub venue: VenueId,
    pub price: Decimal,
    pub quantity: u32,
    pub reason: String,
}

impl Intent {
    pub fn buy(venue: impl Into<VenueId>, price: Decimal, quantity: u32, reason: String) -> Self {
        Self {
            side: Side::Buy,
            venue: venue.into(),
            price,
            quantity,
            reason,
        }
    }

    pub fn sell(venue: impl Into<VenueId>, price: Decimal, quantity: u32, reason: String) -> Self {
        Self {
            side: Side::Sell,
            venue: venue.into(),
            price,
            quantity,
            reason,
        }
    }
}

/// Context provided to a strategy on each tick
pub struct StrategyContext<'a> {
    pub item: &'a ItemId,
    /// Newest quote per venue, one consistent snapshot
    pub latest: &'a BTreeMap<VenueId, PricePoint>,
    /// For kinds that need history
    pub store: &'a PriceStore,
    /// Start of the history window
    pub since: Timestamp,
    /// Units the owner holds unlocked
    pub held: u32,
}

impl StrategyContext<'_> {
    /// Latest price at one venue
    pub fn price_at(&self, venue: &str) -> Option<Decimal> {
        self.latest.get(venue).map(|p| p.price)
    }

    /// Prices at one venue inside the history window, oldest first
    pub fn history(&self, venue: &str) -> Vec<Decimal> {
        self.store.history(self.item, venue, self.since).prices()
    }

    pub fn is_holding(&self) -> bool {
        self.held > 0
    }
}

/// Strategy trait - one implementation per strategy kind
///
/// Evaluation is synchronous; the executor turns intents into orders.
pub trait StrategyLogic: Send {
    /// Kind name for logging
    fn name(&self) -> &str;

    /// Called on every evaluation tick
    fn on_tick(&mut self, ctx: &StrategyContext<'_>) -> Vec<Intent>;
}

/// Build the logic for a set of parameters
pub fn build_logic(params: &StrategyParams) -> Box<dyn StrategyLogic> {
    match params {
        StrategyParams::Grid(p) => Box::new(grid::GridStrategy::new(p.clone())),
        StrategyParams::Arbitrage(p) => Box::new(arbitrage::ArbitrageStrategy::new(p.clone())),
        StrategyParams::TrendFollowing(p) => {
            Box::new(trend_following::TrendFollowingStrategy::new(p.clone()))
        }
        StrategyParams::MeanReversion(p) => {
            Box::new(mean_reversion::MeanReversionStrategy::new(p.clone()))
        }
    }
}
