use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::OrderId;
use crate::values::{ItemId, OwnerId, VenueId};

/// Unique identifier for an inventory lot
pub type LotId = Uuid;

/// Venue-side handle for an owned asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    /// Venue-specific asset identifier
    pub asset_id: String,
    pub item: ItemId,
    pub quantity: u32,
}

impl AssetRef {
    pub fn new(asset_id: impl Into<String>, item: impl Into<ItemId>, quantity: u32) -> Self {
        Self {
            asset_id: asset_id.into(),
            item: item.into(),
            quantity,
        }
    }
}

/// One acquired lot of an item held by an owner at a venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: LotId,
    pub owner: OwnerId,
    pub item: ItemId,
    pub venue: VenueId,
    /// Venue asset handle, when known
    pub asset_id: Option<String>,
    pub quantity: u32,
    /// Reserved for exactly one in-flight sell order
    pub locked: bool,
    /// Order holding the reservation
    pub locked_by: Option<OrderId>,
    /// Unit price paid when the lot was acquired
    pub acquired_price: Decimal,
    pub acquired_at: DateTime<Utc>,
}

impl InventoryRecord {
    pub fn new(
        owner: impl Into<OwnerId>,
        item: impl Into<ItemId>,
        venue: impl Into<VenueId>,
        quantity: u32,
        acquired_price: Decimal,
        acquired_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            item: item.into(),
            venue: venue.into(),
            asset_id: None,
            quantity,
            locked: false,
            locked_by: None,
            acquired_price,
            acquired_at,
        }
    }

    pub fn with_asset_id(mut self, asset_id: impl Into<String>) -> Self {
        self.asset_id = Some(asset_id.into());
        self
    }

    /// Venue handle for selling `quantity` units out of this lot
    pub fn asset_ref(&self, quantity: u32) -> AssetRef {
        AssetRef {
            asset_id: self
                .asset_id
                .clone()
                .unwrap_or_else(|| self.id.to_string()),
            item: self.item.clone(),
            quantity,
        }
    }

    /// Cost basis of the whole lot
    pub fn cost_basis(&self) -> Decimal {
        self.acquired_price * Decimal::from(self.quantity)
    }
}
