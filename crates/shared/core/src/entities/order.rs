use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LotId, OrderStatus, Side};
use crate::values::{ItemId, OwnerId, VenueId};

/// Unique identifier for an order
pub type OrderId = Uuid;

/// Unique identifier for a strategy
pub type StrategyId = Uuid;

/// Opaque reference returned by a venue for an accepted buy/sell
pub type VenueOrderRef = String;

/// Full order details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub owner: OwnerId,
    /// The item being traded
    pub item: ItemId,
    pub venue: VenueId,
    pub side: Side,
    /// Limit price per unit
    pub price: Decimal,
    pub quantity: u32,
    pub status: OrderStatus,
    /// Set when the order was generated by a strategy
    pub strategy_id: Option<StrategyId>,
    /// Inventory lot reserved by a sell order
    pub reservation: Option<LotId>,
    pub venue_order_ref: Option<VenueOrderRef>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Create a new pending order with explicit id and timestamp
    #[allow(clippy::too_many_arguments)]
    pub fn new_with_time(
        id: OrderId,
        owner: impl Into<OwnerId>,
        item: impl Into<ItemId>,
        venue: impl Into<VenueId>,
        side: Side,
        price: Decimal,
        quantity: u32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner: owner.into(),
            item: item.into(),
            venue: venue.into(),
            side,
            price,
            quantity,
            status: OrderStatus::Pending,
            strategy_id: None,
            reservation: None,
            venue_order_ref: None,
            failure_reason: None,
            created_at: timestamp,
            updated_at: timestamp,
            executed_at: None,
        }
    }

    /// Create a new pending order using current system time
    pub fn new(
        owner: impl Into<OwnerId>,
        item: impl Into<ItemId>,
        venue: impl Into<VenueId>,
        side: Side,
        price: Decimal,
        quantity: u32,
    ) -> Self {
        Self::new_with_time(
            Uuid::new_v4(),
            owner,
            item,
            venue,
            side,
            price,
            quantity,
            Utc::now(),
        )
    }

    /// Attribute the order to a strategy
    pub fn with_strategy(mut self, strategy_id: StrategyId) -> Self {
        self.strategy_id = Some(strategy_id);
        self
    }

    /// Notional value (price x quantity), `None` when it does not fit a Decimal
    pub fn notional(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
