//! Strategy Scheduler
//!
//! One periodic task per active strategy. Each task owns a
//! [`StrategyExecutor`] and a stop channel; deactivation signals the channel
//! and waits for the task to end. Lifecycle operations on one strategy are
//! serialized, so its status and its task always change together.
//!
//! ```text
//! activate ──► spawn task ──► interval tick ──► executor.tick()
//!                   ▲                               │
//! deactivate ── stop signal ◄── raced at every await┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use arbiter_core::{EngineEvent, Notification, OrderStatus, StrategyId};
use arbiter_market::PriceStore;
use arbiter_order_manager::OrderManager;
use arbiter_ports::EventPublisher;
use dashmap::DashMap;
use log::{error, info};
use tokio::sync::{Mutex, OwnedMutexGuard, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::entity::{NewStrategy, Strategy, StrategyStatus, StrategyUpdate};
use crate::error::{Result, StrategyError};
use crate::executor::{StrategyExecutor, TickOutcome};
use crate::registry::StrategyRegistry;

/// Configuration for the scheduler
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Period between evaluations of one strategy
    pub evaluation_interval: Duration,
    /// How far back history-based kinds look
    pub history_window: chrono::Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            evaluation_interval: Duration::from_secs(60),
            history_window: chrono::Duration::days(30),
        }
    }
}

struct RunningStrategy {
    executor: Arc<StrategyExecutor>,
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owns strategy lifecycles and their evaluation tasks
#[derive(Clone)]
pub struct StrategyScheduler {
    registry: StrategyRegistry,
    store: PriceStore,
    orders: OrderManager,
    publisher: Arc<dyn EventPublisher>,
    config: Arc<SchedulerConfig>,
    running: Arc<DashMap<StrategyId, RunningStrategy>>,
    lifecycle: Arc<DashMap<StrategyId, Arc<Mutex<()>>>>,
}

impl StrategyScheduler {
    pub fn new(
        config: SchedulerConfig,
        registry: StrategyRegistry,
        store: PriceStore,
        orders: OrderManager,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            registry,
            store,
            orders,
            publisher,
            config: Arc::new(config),
            running: Arc::new(DashMap::new()),
            lifecycle: Arc::new(DashMap::new()),
        }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn create(&self, new: NewStrategy) -> Result<Strategy> {
        let strategy = self.registry.create(new)?;
        info!(
            "[{}] created {} strategy '{}' for {}",
            strategy.id,
            strategy.kind(),
            strategy.name,
            strategy.item
        );
        Ok(strategy)
    }

    /// Mark active and start evaluating every `evaluation_interval`
    pub async fn activate(&self, id: StrategyId, caller: &str) -> Result<Strategy> {
        let _guard = self.lock(id).await;
        let strategy = self.registry.set_status(id, caller, StrategyStatus::Active)?;
        if self
            .running
            .get(&id)
            .is_none_or(|task| task.handle.is_finished())
        {
            self.start(&strategy);
        }
        self.notify(Notification::info(
            "Strategy activated",
            format!("{} is now active", strategy.name),
        ));
        Ok(strategy)
    }

    /// Mark paused and wait for the task to end
    pub async fn deactivate(&self, id: StrategyId, caller: &str) -> Result<Strategy> {
        let _guard = self.lock(id).await;
        let strategy = self.registry.set_status(id, caller, StrategyStatus::Paused)?;
        self.halt(id).await;
        self.notify(Notification::info(
            "Strategy paused",
            format!("{} was paused", strategy.name),
        ));
        Ok(strategy)
    }

    /// Mark stopped for good and wait for the task to end
    pub async fn stop(&self, id: StrategyId, caller: &str) -> Result<Strategy> {
        let _guard = self.lock(id).await;
        let strategy = self.registry.set_status(id, caller, StrategyStatus::Stopped)?;
        self.halt(id).await;
        Ok(strategy)
    }

    /// Apply an update; an active strategy restarts with the new parameters
    pub async fn update(&self, id: StrategyId, caller: &str, update: StrategyUpdate) -> Result<Strategy> {
        let _guard = self.lock(id).await;
        let restart = update.params.is_some();
        let strategy = self.registry.update(id, caller, update)?;
        if restart && strategy.is_active() {
            self.halt(id).await;
            self.start(&strategy);
            info!("[{}] restarted with new parameters", id);
        }
        Ok(strategy)
    }

    /// Stop and remove
    pub async fn delete(&self, id: StrategyId, caller: &str) -> Result<Strategy> {
        let _guard = self.lock(id).await;
        self.registry.owned(id, caller)?;
        self.halt(id).await;
        let strategy = self.registry.remove(id, caller)?;
        self.lifecycle.remove(&id);
        info!("[{}] deleted", id);
        Ok(strategy)
    }

    /// Evaluate a running strategy immediately
    ///
    /// Returns `Deferred` when its scheduled tick is in flight.
    pub async fn evaluate_now(&self, id: StrategyId, caller: &str) -> Result<TickOutcome> {
        let strategy = self.registry.owned(id, caller)?;
        let executor = self
            .running
            .get(&id)
            .map(|r| r.executor.clone())
            .ok_or(StrategyError::InvalidState {
                strategy_id: id,
                status: strategy.status,
            })?;
        Ok(executor.tick().await)
    }

    pub fn is_running(&self, id: StrategyId) -> bool {
        self.running.contains_key(&id)
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    /// Stop every task; statuses are left as they are
    pub async fn shutdown(&self) {
        let ids: Vec<StrategyId> = self.running.iter().map(|r| *r.key()).collect();
        for id in ids {
            let _guard = self.lock(id).await;
            self.halt(id).await;
        }
        info!("[scheduler] all strategy tasks stopped");
    }

    async fn lock(&self, id: StrategyId) -> OwnedMutexGuard<()> {
        let lock = self.lifecycle.entry(id).or_default().clone();
        lock.lock_owned().await
    }

    fn start(&self, strategy: &Strategy) {
        let executor = Arc::new(StrategyExecutor::new(
            strategy,
            self.registry.clone(),
            self.store.clone(),
            self.orders.clone(),
            self.config.history_window,
        ));
        let (stop, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run(
            executor.clone(),
            self.config.evaluation_interval,
            stop_rx,
            self.publisher.clone(),
        ));
        info!(
            "[{}] evaluating every {:?}",
            strategy.id, self.config.evaluation_interval
        );
        self.running.insert(
            strategy.id,
            RunningStrategy {
                executor,
                stop,
                handle,
            },
        );
    }

    async fn halt(&self, id: StrategyId) {
        let Some((_, task)) = self.running.remove(&id) else {
            return;
        };
        let _ = task.stop.send(true);
        if let Err(e) = task.handle.await {
            error!("[{}] strategy task ended abnormally: {}", id, e);
        }
    }

    fn notify(&self, notification: Notification) {
        self.publisher.publish(EngineEvent::Notification(notification));
    }
}

async fn run(
    executor: Arc<StrategyExecutor>,
    every: Duration,
    mut stop: watch::Receiver<bool>,
    publisher: Arc<dyn EventPublisher>,
) {
    let id = executor.strategy_id();
    let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = wait_for_stop(&mut stop) => break,
            _ = ticker.tick() => {}
        }

        let outcome = tokio::select! {
            _ = wait_for_stop(&mut stop) => break,
            outcome = executor.tick() => outcome,
        };

        match outcome {
            TickOutcome::Inactive => {
                info!("[{}] no longer active", id);
                break;
            }
            TickOutcome::Deferred => {}
            TickOutcome::Executed { orders } => {
                for order in orders.iter().filter(|o| o.status == OrderStatus::Failed) {
                    publisher.publish(EngineEvent::Notification(Notification::warning(
                        "Strategy order failed",
                        format!(
                            "{} {} on {} from strategy {} failed: {}",
                            order.side,
                            order.item,
                            order.venue,
                            id,
                            order.failure_reason.as_deref().unwrap_or("unknown")
                        ),
                    )));
                }
            }
        }
    }
    info!("[{}] strategy task stopped", id);
}

/// Resolves once `stop` reads true or its sender is gone
async fn wait_for_stop(stop: &mut watch::Receiver<bool>) {
    loop {
        let stopped = *stop.borrow_and_update();
        if stopped || stop.changed().await.is_err() {
            return;
        }
    }
}
