//! Order creation requests

use arbiter_core::{ItemId, OrderStatus, OwnerId, Side, StrategyId, VenueId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a user or strategy asks the manager to place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub owner: OwnerId,
    pub item: ItemId,
    pub venue: VenueId,
    pub side: Side,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub strategy_id: Option<StrategyId>,
}

impl OrderRequest {
    pub fn new(
        owner: impl Into<OwnerId>,
        item: impl Into<ItemId>,
        venue: impl Into<VenueId>,
        side: Side,
        price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            owner: owner.into(),
            item: item.into(),
            venue: venue.into(),
            side,
            price,
            quantity,
            strategy_id: None,
        }
    }

    pub fn buy(
        owner: impl Into<OwnerId>,
        item: impl Into<ItemId>,
        venue: impl Into<VenueId>,
        price: Decimal,
        quantity: u32,
    ) -> Self {
        Self::new(owner, item, venue, Side::Buy, price, quantity)
    }

    pub fn sell(
        owner: impl Into<OwnerId>,
        item: impl Into<ItemId>,
        venue: impl Into<VenueId>,
        price: Decimal,
        quantity: u32,
    ) -> Self {
        Self::new(owner, item, venue, Side::Sell, price, quantity)
    }

    pub fn with_strategy(mut self, strategy_id: StrategyId) -> Self {
        self.strategy_id = Some(strategy_id);
        self
    }
}

/// Filter and page for order listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            status: None,
            page: 1,
            page_size: 20,
        }
    }
}

/// One page of orders, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<arbiter_core::Order>,
    /// Matching orders across all pages
    pub total: usize,
}
