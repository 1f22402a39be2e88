//! Strategy Executor
//!
//! Runs one evaluation of one strategy: confirm it is active, snapshot the
//! market, evaluate the kind's logic, turn intents into orders and wait for
//! them. Evaluations of the same strategy never overlap.

use arbiter_core::{Order, Side, StrategyId};
use arbiter_market::PriceStore;
use arbiter_order_manager::{OrderManager, OrderRequest};
use chrono::Utc;
use futures_util::future::join_all;
use log::{debug, error, info, warn};
use tokio::sync::Mutex;

use crate::entity::Strategy;
use crate::registry::StrategyRegistry;
use crate::strategy::{Intent, StrategyContext, StrategyLogic, build_logic};

/// Result of one tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The strategy is no longer active; the task should end
    Inactive,
    /// A previous tick is still in flight; nothing was evaluated
    Deferred,
    /// Orders placed this tick, in their terminal states
    Executed { orders: Vec<Order> },
}

pub struct StrategyExecutor {
    strategy_id: StrategyId,
    registry: StrategyRegistry,
    store: PriceStore,
    orders: OrderManager,
    history_window: chrono::Duration,
    logic: Mutex<Box<dyn StrategyLogic>>,
}

impl StrategyExecutor {
    pub fn new(
        strategy: &Strategy,
        registry: StrategyRegistry,
        store: PriceStore,
        orders: OrderManager,
        history_window: chrono::Duration,
    ) -> Self {
        Self {
            strategy_id: strategy.id,
            registry,
            store,
            orders,
            history_window,
            logic: Mutex::new(build_logic(&strategy.params)),
        }
    }

    pub fn strategy_id(&self) -> StrategyId {
        self.strategy_id
    }

    pub async fn tick(&self) -> TickOutcome {
        let Ok(mut logic) = self.logic.try_lock() else {
            debug!("[{}] previous tick still running, deferring", self.strategy_id);
            return TickOutcome::Deferred;
        };

        let Some(strategy) = self.registry.get(self.strategy_id).filter(|s| s.is_active()) else {
            return TickOutcome::Inactive;
        };

        let held = self
            .orders
            .ledger()
            .available_quantity(&strategy.owner, &strategy.item);
        let intents = {
            let latest = self.store.latest_by_venue(&strategy.item);
            let ctx = StrategyContext {
                item: &strategy.item,
                latest: &latest,
                store: &self.store,
                since: Utc::now() - self.history_window,
                held,
            };
            logic.on_tick(&ctx)
        };
        if !intents.is_empty() {
            info!(
                "[{}] {} produced {} intent(s) for {}",
                strategy.id,
                logic.name(),
                intents.len(),
                strategy.item
            );
        }

        let handles = self.place(&strategy, intents, held);
        let orders = join_all(handles)
            .await
            .into_iter()
            .filter_map(|joined| match joined {
                Ok(order) => Some(order),
                Err(e) => {
                    error!("[{}] order task failed: {}", self.strategy_id, e);
                    None
                }
            })
            .collect();

        TickOutcome::Executed { orders }
    }

    /// Submit one order per intent; sells beyond what is held are skipped
    fn place(
        &self,
        strategy: &Strategy,
        intents: Vec<Intent>,
        held: u32,
    ) -> Vec<tokio::task::JoinHandle<Order>> {
        let mut sellable = held;
        let mut handles = Vec::with_capacity(intents.len());

        for intent in intents {
            if intent.side == Side::Sell {
                if sellable < intent.quantity {
                    debug!(
                        "[{}] skipping sell of {}: holding {}",
                        strategy.id, intent.quantity, sellable
                    );
                    continue;
                }
                sellable -= intent.quantity;
            }

            let request = OrderRequest::new(
                strategy.owner.clone(),
                strategy.item.clone(),
                intent.venue,
                intent.side,
                intent.price,
                intent.quantity,
            )
            .with_strategy(strategy.id);

            match self.orders.submit(request) {
                Ok((order, handle)) => {
                    info!("[{}] placed {} ({})", strategy.id, order.id, intent.reason);
                    handles.push(handle);
                }
                Err(e) => warn!("[{}] order rejected: {}", strategy.id, e),
            }
        }
        handles
    }
}
