//! Order Manager errors

use arbiter_core::{ItemId, LotId, OrderId, OrderStatus, OwnerId};
use arbiter_gateway::GatewayError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Inventory reservation and bookkeeping failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient inventory: {owner} holds no unlocked lot of {item} with {requested} units")]
    InsufficientInventory {
        owner: OwnerId,
        item: ItemId,
        requested: u32,
    },

    #[error("Inventory already locked: every lot of {item} for {owner} is reserved")]
    AlreadyLocked { owner: OwnerId, item: ItemId },

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    #[error("Lot {lot_id} is not reserved by order {order_id}")]
    NotReserved { lot_id: LotId, order_id: OrderId },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Price must be positive, got {0}")]
    InvalidPrice(Decimal),

    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(u32),

    #[error("Order amount overflows: {price} x {quantity}")]
    AmountOverflow { price: Decimal, quantity: u32 },

    #[error("Venue unavailable: {0}")]
    Venue(#[from] GatewayError),

    #[error(transparent)]
    Inventory(#[from] LedgerError),

    #[error("Order not found: {0}")]
    NotFound(OrderId),

    #[error("Order {order_id} does not belong to {caller}")]
    Unauthorized { order_id: OrderId, caller: OwnerId },

    #[error("Order {order_id} is {status} and can no longer be cancelled")]
    NotCancellable {
        order_id: OrderId,
        status: OrderStatus,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
