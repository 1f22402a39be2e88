//! Order Lifecycle Manager
//!
//! Orders move `pending -> {completed, failed, cancelled}`. Every transition
//! is one check-and-set on the order's map entry; only the caller that wins
//! it applies side effects (ledger, transactions, events).

use std::sync::Arc;
use std::time::Duration;

use arbiter_core::{
    EngineEvent, Order, OrderId, OrderStatus, OrderUpdateKind, Side, Transaction, VenueOrderRef,
};
use arbiter_gateway::{VenueRegistry, call_with_timeout};
use arbiter_ports::{ConnectorError, EventPublisher, VenueConnector};
use chrono::Utc;
use dashmap::DashMap;
use log::{error, info, warn};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ledger::{InventoryLedger, Reservation};
use crate::request::{OrderPage, OrderQuery, OrderRequest};
use crate::stats::{ProfitStats, StatsPeriod, TradingStats};

/// Configuration for the order manager
#[derive(Debug, Clone)]
pub struct OrderManagerConfig {
    /// Deadline for one venue buy/sell
    pub connector_timeout: Duration,
    /// Fee charged on every completed order, as a fraction of its amount
    pub fee_rate: Decimal,
}

impl Default for OrderManagerConfig {
    fn default() -> Self {
        Self {
            connector_timeout: Duration::from_secs(30),
            fee_rate: dec!(0.025),
        }
    }
}

struct Settlement {
    amount: Decimal,
    fee: Decimal,
    profit: Option<Decimal>,
}

/// Owns orders, reservations and transactions
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct OrderManager {
    orders: Arc<DashMap<OrderId, Order>>,
    reservations: Arc<DashMap<OrderId, Reservation>>,
    transactions: Arc<RwLock<Vec<Transaction>>>,
    ledger: InventoryLedger,
    registry: VenueRegistry,
    publisher: Arc<dyn EventPublisher>,
    config: Arc<OrderManagerConfig>,
}

impl OrderManager {
    pub fn new(
        config: OrderManagerConfig,
        ledger: InventoryLedger,
        registry: VenueRegistry,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            orders: Arc::new(DashMap::new()),
            reservations: Arc::new(DashMap::new()),
            transactions: Arc::new(RwLock::new(Vec::new())),
            ledger,
            registry,
            publisher,
            config: Arc::new(config),
        }
    }

    pub fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    pub fn registry(&self) -> &VenueRegistry {
        &self.registry
    }

    /// Create an order and start executing it
    ///
    /// Validation and (for sells) the inventory reservation happen before
    /// anything is stored. The handle resolves to the order's terminal state.
    pub fn submit(&self, request: OrderRequest) -> Result<(Order, JoinHandle<Order>)> {
        if request.price <= Decimal::ZERO {
            return Err(Error::InvalidPrice(request.price));
        }
        if request.quantity < 1 {
            return Err(Error::InvalidQuantity(request.quantity));
        }
        if request
            .price
            .checked_mul(Decimal::from(request.quantity))
            .and_then(|amount| amount.checked_mul(self.config.fee_rate))
            .is_none()
        {
            return Err(Error::AmountOverflow {
                price: request.price,
                quantity: request.quantity,
            });
        }
        let connector = self.registry.connector(&request.venue)?;

        let mut order = Order::new(
            request.owner,
            request.item,
            request.venue,
            request.side,
            request.price,
            request.quantity,
        );
        order.strategy_id = request.strategy_id;

        if order.side == Side::Sell {
            let reservation =
                self.ledger
                    .try_lock(&order.owner, &order.item, order.quantity, order.id)?;
            order.reservation = Some(reservation.lot_id);
            self.reservations.insert(order.id, reservation);
        }

        self.orders.insert(order.id, order.clone());
        info!(
            "[{}] created {} {} x{} @ {} on {}",
            order.id, order.side, order.item, order.quantity, order.price, order.venue
        );
        self.publisher
            .publish(EngineEvent::order(OrderUpdateKind::Created, order.clone()));

        let manager = self.clone();
        let handle = tokio::spawn(manager.execute(order.clone(), connector));
        Ok((order, handle))
    }

    /// Create an order; execution continues in the background
    pub fn create_order(&self, request: OrderRequest) -> Result<Order> {
        self.submit(request).map(|(order, _)| order)
    }

    async fn execute(self, order: Order, connector: Arc<dyn VenueConnector>) -> Order {
        let id = order.id;
        if let Some(current) = self.order(id)
            && !current.status.is_pending()
        {
            return current;
        }

        let limit = self.config.connector_timeout;
        let result = match order.side {
            Side::Buy => {
                call_with_timeout(limit, connector.buy(&order.item, order.price, order.quantity))
                    .await
            }
            Side::Sell => {
                let asset = self.reservations.get(&id).map(|r| r.asset_ref.clone());
                match asset {
                    Some(asset) => {
                        call_with_timeout(limit, connector.sell(&asset, order.price, order.quantity))
                            .await
                    }
                    None => Err(ConnectorError::Rejected("reservation released".to_string())),
                }
            }
        };

        match result {
            Ok(venue_ref) => self.complete(id, venue_ref),
            Err(e) => self.fail(id, e.to_string()),
        }
        self.order(id).unwrap_or(order)
    }

    /// The single check-and-set on an order entry
    fn transition(
        &self,
        id: OrderId,
        next: OrderStatus,
        apply: impl FnOnce(&mut Order),
    ) -> Option<Order> {
        let mut entry = self.orders.get_mut(&id)?;
        if !entry.status.can_transition_to(next) {
            warn!(
                "[{}] ignored transition {} -> {}",
                id, entry.status, next
            );
            return None;
        }
        let now = Utc::now();
        entry.status = next;
        entry.updated_at = now;
        apply(&mut *entry);
        Some(entry.value().clone())
    }

    /// Amount, fee and (for sells) profit of an order about to complete
    fn settle(&self, order: &Order) -> Option<Settlement> {
        let amount = order.notional()?;
        let fee = amount.checked_mul(self.config.fee_rate)?;
        let profit = match order.side {
            Side::Buy => None,
            Side::Sell => match self.reservations.get(&order.id) {
                Some(reservation) => {
                    let cost = reservation
                        .acquired_price
                        .checked_mul(Decimal::from(order.quantity))?;
                    Some(amount.checked_sub(cost)?.checked_sub(fee)?)
                }
                None => None,
            },
        };
        Some(Settlement { amount, fee, profit })
    }

    fn complete(&self, id: OrderId, venue_ref: VenueOrderRef) {
        let Some(pending) = self.order(id) else {
            return;
        };
        // Nothing past the check-and-set may fail, so settle first.
        let Some(Settlement { amount, fee, profit }) = self.settle(&pending) else {
            self.fail(id, "settlement amount overflows".to_string());
            return;
        };

        let now = Utc::now();
        let Some(order) = self.transition(id, OrderStatus::Completed, |o| {
            o.executed_at = Some(now);
            o.venue_order_ref = Some(venue_ref.clone());
        }) else {
            return;
        };

        match order.side {
            Side::Buy => {
                if let Err(e) = self.ledger.credit(
                    &order.owner,
                    &order.item,
                    &order.venue,
                    order.quantity,
                    order.price,
                    Some(venue_ref),
                ) {
                    error!("[{}] credit failed: {}", id, e);
                }
            }
            Side::Sell => match self.reservations.remove(&id) {
                Some((_, reservation)) => {
                    if let Err(e) = self.ledger.debit(&reservation, order.quantity) {
                        error!("[{}] debit failed: {}", id, e);
                    }
                }
                None => error!("[{}] completed sell without reservation", id),
            },
        }

        let transaction = Transaction {
            id: Uuid::new_v4(),
            order_id: id,
            owner: order.owner.clone(),
            item: order.item.clone(),
            venue: order.venue.clone(),
            side: order.side,
            amount,
            fee,
            profit,
            completed_at: now,
        };
        self.transactions.write().push(transaction);

        info!(
            "[{}] completed {} {} x{} (fee {}, profit {:?})",
            id, order.side, order.item, order.quantity, fee, profit
        );
        self.publisher
            .publish(EngineEvent::order(OrderUpdateKind::Completed, order));
    }

    fn fail(&self, id: OrderId, reason: String) {
        let Some(order) = self.transition(id, OrderStatus::Failed, |o| {
            o.failure_reason = Some(reason.clone());
        }) else {
            return;
        };
        self.release(id);

        warn!("[{}] failed: {}", id, reason);
        self.publisher
            .publish(EngineEvent::order(OrderUpdateKind::Failed, order));
    }

    fn release(&self, id: OrderId) {
        if let Some((_, reservation)) = self.reservations.remove(&id) {
            self.ledger.unlock(&reservation);
        }
    }

    /// Cancel a pending order on behalf of its owner
    pub fn cancel_order(&self, id: OrderId, caller: &str) -> Result<Order> {
        let current = self.order(id).ok_or(Error::NotFound(id))?;
        if current.owner != caller {
            return Err(Error::Unauthorized {
                order_id: id,
                caller: caller.to_string(),
            });
        }

        let Some(order) = self.transition(id, OrderStatus::Cancelled, |_| {}) else {
            let status = self.order(id).map_or(current.status, |o| o.status);
            return Err(Error::NotCancellable {
                order_id: id,
                status,
            });
        };
        self.release(id);

        info!("[{}] cancelled by {}", id, caller);
        self.publisher
            .publish(EngineEvent::order(OrderUpdateKind::Cancelled, order.clone()));
        Ok(order)
    }

    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.orders.get(&id).map(|o| o.value().clone())
    }

    /// An owner's orders, newest first
    pub fn orders(&self, owner: &str, query: &OrderQuery) -> OrderPage {
        let mut matching: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| o.owner == owner && query.status.is_none_or(|s| o.status == s))
            .map(|o| o.value().clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len();
        let page_size = query.page_size.max(1);
        let skip = query.page.saturating_sub(1) * page_size;
        OrderPage {
            orders: matching.into_iter().skip(skip).take(page_size).collect(),
            total,
        }
    }

    /// Orders still pending for an owner
    pub fn active_orders(&self, owner: &str) -> usize {
        self.orders
            .iter()
            .filter(|o| o.owner == owner && o.status.is_pending())
            .count()
    }

    pub fn transactions(&self, owner: &str) -> Vec<Transaction> {
        self.transactions
            .read()
            .iter()
            .filter(|t| t.owner == owner)
            .cloned()
            .collect()
    }

    pub fn profit_stats(&self, owner: &str, period: StatsPeriod) -> ProfitStats {
        let since = period.start(Utc::now());
        let transactions = self.transactions.read();
        ProfitStats::from_transactions(
            period,
            transactions
                .iter()
                .filter(|t| t.owner == owner && t.completed_at >= since),
        )
    }

    /// Volume, pending orders and inventory value
    ///
    /// `price_of(item, venue)` supplies current quotes for the valuation.
    pub fn trading_stats<F>(&self, owner: &str, price_of: F) -> TradingStats
    where
        F: Fn(&arbiter_core::ItemId, &arbiter_core::VenueId) -> Option<Decimal>,
    {
        let total_volume: Decimal = self
            .transactions
            .read()
            .iter()
            .filter(|t| t.owner == owner)
            .map(|t| t.amount)
            .sum();

        TradingStats {
            total_volume,
            active_orders: self.active_orders(owner),
            inventory_value: self.ledger.inventory_value(owner, price_of),
        }
    }
}
