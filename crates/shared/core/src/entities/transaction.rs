use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{OrderId, Side};
use crate::values::{ItemId, OwnerId, VenueId};

/// Unique identifier for a transaction
pub type TransactionId = Uuid;

/// Ledger effect of a completed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub order_id: OrderId,
    pub owner: OwnerId,
    pub item: ItemId,
    pub venue: VenueId,
    pub side: Side,
    /// price x quantity
    pub amount: Decimal,
    pub fee: Decimal,
    /// Realized profit, sells only
    pub profit: Option<Decimal>,
    pub completed_at: DateTime<Utc>,
}

impl Transaction {
    /// Profit counted for statistics (zero for buys)
    pub fn realized_profit(&self) -> Decimal {
        self.profit.unwrap_or(Decimal::ZERO)
    }

    pub fn is_win(&self) -> bool {
        self.realized_profit() > Decimal::ZERO
    }
}
