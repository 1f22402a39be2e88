//! Arbiter Order Manager
//!
//! The Order Manager sits between strategies (or users) and the venues,
//! responsible for:
//! - **Validation**: price, quantity and venue checks before anything is stored
//! - **Inventory Ledger**: owned lots with an exclusive per-lot sell lock
//! - **Order Lifecycle**: `pending -> completed | failed | cancelled`, one
//!   spawned execution per order, bounded venue calls
//! - **Transactions & Stats**: fees, realized profit, profit/trading statistics
//!
//! ## Architecture
//!
//! ```text
//! Strategies / Users ──► OrderRequest
//!                             │
//!                ┌────────────▼─────────────────────────────┐
//!                │              Order Manager               │
//!                │  validate ─► try_lock (sells) ─► pending │──► order_update{created}
//!                │                   │                      │
//!                │         spawn execution task             │
//!                │                   │                      │
//!                └───────────────────┼──────────────────────┘
//!                                    ▼
//!                   VenueConnector::buy / sell (with timeout)
//!                                    │
//!              ┌─────────────────────┴───────────────────┐
//!              ▼ ok                                       ▼ error / timeout
//!   completed: credit | debit,                 failed: unlock (sells)
//!   Transaction{amount, fee, profit}
//!              │                                          │
//!              └──────────────► order_update ◄────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use arbiter_order_manager::{OrderManager, OrderManagerConfig, OrderRequest};
//!
//! let manager = OrderManager::new(OrderManagerConfig::default(), ledger, registry, publisher);
//!
//! let (order, done) = manager.submit(OrderRequest::buy("alice", "AK-47 | Redline", "buff", dec!(50), 2))?;
//! let order = done.await?; // completed or failed
//! ```

pub mod error;
pub mod ledger;
pub mod manager;
pub mod request;
pub mod stats;

// Re-export main types
pub use error::{Error, LedgerError, Result};
pub use ledger::{InventoryLedger, Reservation};
pub use manager::{OrderManager, OrderManagerConfig};
pub use request::{OrderPage, OrderQuery, OrderRequest};
pub use stats::{ProfitStats, StatsPeriod, TradingStats};
