mod inventory;
mod order;
mod order_status;
mod price_point;
mod side;
mod transaction;

pub use inventory::{AssetRef, InventoryRecord, LotId};
pub use order::{Order, OrderId, StrategyId, VenueOrderRef};
pub use order_status::OrderStatus;
pub use price_point::PricePoint;
pub use side::Side;
pub use transaction::{Transaction, TransactionId};
