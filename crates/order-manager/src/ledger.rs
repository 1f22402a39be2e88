//! Inventory Ledger - owned lots per (owner, item) with an exclusive sell lock
//!
//! Lots for one (owner, item) live in a single map entry, ordered by
//! `acquired_at`. Locking scans and flips the flag while holding that entry,
//! so two concurrent sells can never reserve the same lot.

use std::sync::Arc;

use arbiter_core::{AssetRef, InventoryRecord, ItemId, LotId, OrderId, OwnerId, VenueId};
use chrono::Utc;
use dashmap::DashMap;
use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

type LotKey = (OwnerId, ItemId);

/// Proof that one order holds one lot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub lot_id: LotId,
    pub owner: OwnerId,
    pub item: ItemId,
    /// Venue the lot was acquired at
    pub venue: VenueId,
    pub order_id: OrderId,
    pub quantity: u32,
    pub acquired_price: Decimal,
    pub asset_ref: AssetRef,
}

/// Owned inventory
///
/// Cheap to clone; clones share the same lots.
#[derive(Clone, Default)]
pub struct InventoryLedger {
    lots: Arc<DashMap<LotKey, Vec<InventoryRecord>>>,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the oldest unlocked lot holding at least `quantity` units
    pub fn try_lock(
        &self,
        owner: &str,
        item: &str,
        quantity: u32,
        order_id: OrderId,
    ) -> Result<Reservation, LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::InvalidQuantity(quantity));
        }
        let insufficient = || LedgerError::InsufficientInventory {
            owner: owner.to_string(),
            item: item.to_string(),
            requested: quantity,
        };

        let key = (owner.to_string(), item.to_string());
        let mut lots = self.lots.get_mut(&key).ok_or_else(insufficient)?;

        let mut saw_locked = false;
        for lot in lots.iter_mut().filter(|lot| lot.quantity >= quantity) {
            if lot.locked {
                saw_locked = true;
                continue;
            }
            lot.locked = true;
            lot.locked_by = Some(order_id);
            debug!("[ledger] lot {} locked by {}", lot.id, order_id);

            return Ok(Reservation {
                lot_id: lot.id,
                owner: lot.owner.clone(),
                item: lot.item.clone(),
                venue: lot.venue.clone(),
                order_id,
                quantity,
                acquired_price: lot.acquired_price,
                asset_ref: lot.asset_ref(quantity),
            });
        }

        if saw_locked {
            Err(LedgerError::AlreadyLocked {
                owner: owner.to_string(),
                item: item.to_string(),
            })
        } else {
            Err(insufficient())
        }
    }

    /// Release a reservation
    ///
    /// Idempotent. Only clears a lock still held by the reservation's order;
    /// returns whether anything was released.
    pub fn unlock(&self, reservation: &Reservation) -> bool {
        let key = (reservation.owner.clone(), reservation.item.clone());
        let Some(mut lots) = self.lots.get_mut(&key) else {
            return false;
        };
        let Some(lot) = lots.iter_mut().find(|lot| lot.id == reservation.lot_id) else {
            return false;
        };
        if lot.locked_by != Some(reservation.order_id) {
            return false;
        }
        lot.locked = false;
        lot.locked_by = None;
        debug!("[ledger] lot {} released by {}", lot.id, reservation.order_id);
        true
    }

    /// Add a newly acquired lot
    pub fn credit(
        &self,
        owner: &str,
        item: &str,
        venue: &str,
        quantity: u32,
        price: Decimal,
        asset_id: Option<String>,
    ) -> Result<LotId, LedgerError> {
        let mut lot = InventoryRecord::new(owner, item, venue, quantity, price, Utc::now());
        lot.asset_id = asset_id;
        self.credit_lot(lot)
    }

    /// Add a lot built by the caller, keeping FIFO order by `acquired_at`
    pub fn credit_lot(&self, lot: InventoryRecord) -> Result<LotId, LedgerError> {
        if lot.quantity == 0 {
            return Err(LedgerError::InvalidQuantity(0));
        }
        let id = lot.id;
        info!(
            "[ledger] credit {} x{} @ {} to {} ({})",
            lot.item, lot.quantity, lot.acquired_price, lot.owner, lot.venue
        );

        let mut lots = self
            .lots
            .entry((lot.owner.clone(), lot.item.clone()))
            .or_default();
        let pos = lots.partition_point(|l| l.acquired_at <= lot.acquired_at);
        lots.insert(pos, lot);
        Ok(id)
    }

    /// Consume reserved units on sell completion
    ///
    /// The lot disappears at zero; otherwise it is released for later sells.
    pub fn debit(&self, reservation: &Reservation, quantity: u32) -> Result<(), LedgerError> {
        let key = (reservation.owner.clone(), reservation.item.clone());
        let not_reserved = || LedgerError::NotReserved {
            lot_id: reservation.lot_id,
            order_id: reservation.order_id,
        };

        let emptied = {
            let mut lots = self.lots.get_mut(&key).ok_or_else(not_reserved)?;
            let pos = lots
                .iter()
                .position(|lot| {
                    lot.id == reservation.lot_id && lot.locked_by == Some(reservation.order_id)
                })
                .ok_or_else(not_reserved)?;

            let lot = &mut lots[pos];
            if quantity == 0 || quantity > lot.quantity {
                return Err(LedgerError::InvalidQuantity(quantity));
            }
            lot.quantity -= quantity;
            if lot.quantity == 0 {
                lots.remove(pos);
            } else {
                lot.locked = false;
                lot.locked_by = None;
            }
            lots.is_empty()
        };

        if emptied {
            self.lots.remove_if(&key, |_, lots| lots.is_empty());
        }
        debug!(
            "[ledger] debit {} x{} from lot {}",
            reservation.item, quantity, reservation.lot_id
        );
        Ok(())
    }

    /// Every lot an owner holds, oldest first per item
    pub fn records(&self, owner: &str) -> Vec<InventoryRecord> {
        let mut records: Vec<InventoryRecord> = self
            .lots
            .iter()
            .filter(|entry| entry.key().0 == owner)
            .flat_map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| a.item.cmp(&b.item).then(a.acquired_at.cmp(&b.acquired_at)));
        records
    }

    /// Units not reserved by any order
    pub fn available_quantity(&self, owner: &str, item: &str) -> u32 {
        self.sum_quantity(owner, item, |lot| !lot.locked)
    }

    /// Units held, reserved or not
    pub fn held_quantity(&self, owner: &str, item: &str) -> u32 {
        self.sum_quantity(owner, item, |_| true)
    }

    fn sum_quantity(&self, owner: &str, item: &str, include: impl Fn(&InventoryRecord) -> bool) -> u32 {
        let key = (owner.to_string(), item.to_string());
        self.lots
            .get(&key)
            .map(|lots| lots.iter().filter(|l| include(l)).map(|l| l.quantity).sum())
            .unwrap_or(0)
    }

    /// Whether a venue asset is already on the books
    pub fn contains_asset(&self, owner: &str, venue: &str, asset_id: &str) -> bool {
        self.lots.iter().any(|entry| {
            entry.key().0 == owner
                && entry
                    .value()
                    .iter()
                    .any(|lot| lot.venue == venue && lot.asset_id.as_deref() == Some(asset_id))
        })
    }

    /// Market value of an owner's lots
    ///
    /// `price_of(item, venue)` supplies the current quote; lots without one
    /// are valued at their acquisition price.
    pub fn inventory_value<F>(&self, owner: &str, price_of: F) -> Decimal
    where
        F: Fn(&ItemId, &VenueId) -> Option<Decimal>,
    {
        self.records(owner)
            .iter()
            .map(|lot| {
                let unit = price_of(&lot.item, &lot.venue).unwrap_or(lot.acquired_price);
                unit * Decimal::from(lot.quantity)
            })
            .sum()
    }
}
