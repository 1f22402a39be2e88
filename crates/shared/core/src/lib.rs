//! Arbiter Core Domain
//!
//! Pure domain types for the Arbiter trading engine.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod events;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Venue-side handles
    AssetRef,
    // Inventory
    InventoryRecord,
    LotId,
    // Core trading entities
    Order,
    OrderId,
    OrderStatus,
    // Market data
    PricePoint,
    Side,
    StrategyId,
    // Ledger effects
    Transaction,
    TransactionId,
    VenueOrderRef,
};
pub use events::{EngineEvent, Notification, NotificationLevel, OrderUpdate, OrderUpdateKind, PriceUpdate};
pub use values::{ItemId, OwnerId, Timestamp, VenueId};
