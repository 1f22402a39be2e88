//! Engine - composition root
//!
//! Wires every component from one [`EngineConfig`] and exposes the inbound
//! control operations, queries and statistics.

use std::collections::BTreeMap;
use std::sync::Arc;

use arbiter_broadcast::{BroadcastHub, ws};
use arbiter_core::{
    AssetRef, EngineEvent, ItemId, Order, OrderId, PricePoint, PriceUpdate, StrategyId,
    Timestamp, Transaction, VenueId,
};
use arbiter_gateway::{VenueRegistry, call_with_timeout};
use arbiter_market::{
    ArbitrageOpportunity, CollectReport, MarketAnalysis, MarketAnalyzer, MarketOverview,
    PriceChange, PriceCollector, PriceHistory, PriceStore, RecordOutcome,
};
use arbiter_order_manager::{
    InventoryLedger, OrderManager, OrderPage, OrderQuery, OrderRequest, ProfitStats, StatsPeriod,
};
use arbiter_ports::{EventPublisher, VenueConnector};
use arbiter_strategy::{
    NewStrategy, Strategy, StrategyRegistry, StrategyScheduler, StrategyUpdate, TickOutcome,
};
use log::{info, warn};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};

/// Trading statistics for one owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    pub total_volume: Decimal,
    pub active_orders: usize,
    pub inventory_value: Decimal,
    pub strategy_count: usize,
}

struct Background {
    stop: watch::Sender<bool>,
    collector: Option<JoinHandle<()>>,
}

pub struct Engine {
    config: EngineConfig,
    store: PriceStore,
    analyzer: MarketAnalyzer,
    venues: VenueRegistry,
    orders: OrderManager,
    strategies: StrategyScheduler,
    hub: BroadcastHub,
    background: Mutex<Option<Background>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let hub = BroadcastHub::new(config.hub());
        let publisher: Arc<dyn EventPublisher> = Arc::new(hub.clone());
        let store = PriceStore::new(config.price_store());
        let analyzer = MarketAnalyzer::new(store.clone(), config.market.default_min_profit_percent);
        let venues = VenueRegistry::new();
        let orders = OrderManager::new(
            config.order_manager(),
            InventoryLedger::new(),
            venues.clone(),
            publisher.clone(),
        );
        let strategies = StrategyScheduler::new(
            config.scheduler(),
            StrategyRegistry::new(),
            store.clone(),
            orders.clone(),
            publisher,
        );

        Ok(Self {
            config,
            store,
            analyzer,
            venues,
            orders,
            strategies,
            hub,
            background: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    /// Websocket route for real-time subscribers
    pub fn router(&self) -> axum::Router {
        ws::router(self.hub.clone())
    }

    pub fn store(&self) -> &PriceStore {
        &self.store
    }

    pub fn ledger(&self) -> &InventoryLedger {
        self.orders.ledger()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Register a venue; enablement follows the `venues` config section
    pub fn register_venue(&self, connector: Arc<dyn VenueConnector>) -> Result<()> {
        let name = connector.name();
        self.venues.register(connector)?;
        if let Some(enabled) = self.config.venue_enabled(&name) {
            self.venues.set_enabled(&name, enabled)?;
        }
        info!("[engine] venue {} registered (enabled={})", name, self.venues.is_enabled(&name));
        Ok(())
    }

    pub fn set_venue_enabled(&self, venue: &str, enabled: bool) -> Result<()> {
        Ok(self.venues.set_enabled(venue, enabled)?)
    }

    pub fn venues(&self) -> Vec<VenueId> {
        self.venues.names()
    }

    /// Start background price collection
    pub fn start(&self) -> Result<()> {
        let mut background = self.background.lock();
        if background.is_some() {
            return Err(EngineError::AlreadyStarted);
        }

        let (stop, stop_rx) = watch::channel(false);
        let collector = if self.config.market.tracked_items.is_empty() {
            info!("[engine] no tracked items, price collection disabled");
            None
        } else {
            let collector = PriceCollector::new(
                self.store.clone(),
                self.venues.clone(),
                Arc::new(self.hub.clone()),
                self.config.collector(),
            );
            Some(collector.spawn(stop_rx))
        };

        *background = Some(Background { stop, collector });
        info!("[engine] started with {} venue(s)", self.venues.len());
        Ok(())
    }

    /// Stop collection and every strategy task
    pub async fn shutdown(&self) {
        let background = self.background.lock().take();
        if let Some(background) = background {
            let _ = background.stop.send(true);
            if let Some(handle) = background.collector
                && let Err(e) = handle.await
            {
                warn!("[engine] collector ended abnormally: {}", e);
            }
        }
        self.strategies.shutdown().await;
        info!("[engine] shut down");
    }

    pub fn is_running(&self) -> bool {
        self.background.lock().is_some()
    }

    // =========================================================================
    // Strategies
    // =========================================================================

    pub fn create_strategy(&self, new: NewStrategy) -> Result<Strategy> {
        Ok(self.strategies.create(new)?)
    }

    pub async fn activate_strategy(&self, id: StrategyId, caller: &str) -> Result<Strategy> {
        Ok(self.strategies.activate(id, caller).await?)
    }

    pub async fn deactivate_strategy(&self, id: StrategyId, caller: &str) -> Result<Strategy> {
        Ok(self.strategies.deactivate(id, caller).await?)
    }

    pub async fn stop_strategy(&self, id: StrategyId, caller: &str) -> Result<Strategy> {
        Ok(self.strategies.stop(id, caller).await?)
    }

    pub async fn update_strategy(
        &self,
        id: StrategyId,
        caller: &str,
        update: StrategyUpdate,
    ) -> Result<Strategy> {
        Ok(self.strategies.update(id, caller, update).await?)
    }

    pub async fn delete_strategy(&self, id: StrategyId, caller: &str) -> Result<Strategy> {
        Ok(self.strategies.delete(id, caller).await?)
    }

    pub async fn evaluate_strategy(&self, id: StrategyId, caller: &str) -> Result<TickOutcome> {
        Ok(self.strategies.evaluate_now(id, caller).await?)
    }

    pub fn strategy(&self, id: StrategyId, caller: &str) -> Result<Strategy> {
        Ok(self.strategies.registry().owned(id, caller)?)
    }

    pub fn strategies(&self, owner: &str) -> Vec<Strategy> {
        self.strategies.registry().list(owner)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Create an order; execution continues in the background
    pub fn create_order(&self, request: OrderRequest) -> Result<Order> {
        Ok(self.orders.create_order(request)?)
    }

    /// Create an order and get a handle resolving to its terminal state
    pub fn submit_order(&self, request: OrderRequest) -> Result<(Order, JoinHandle<Order>)> {
        Ok(self.orders.submit(request)?)
    }

    pub fn cancel_order(&self, id: OrderId, caller: &str) -> Result<Order> {
        Ok(self.orders.cancel_order(id, caller)?)
    }

    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.orders.order(id)
    }

    pub fn orders(&self, owner: &str, query: &OrderQuery) -> OrderPage {
        self.orders.orders(owner, query)
    }

    pub fn transactions(&self, owner: &str) -> Vec<Transaction> {
        self.orders.transactions(owner)
    }

    // =========================================================================
    // Market data
    // =========================================================================

    /// Record an observation pushed by a venue; new points are broadcast
    pub fn record_price(&self, point: PricePoint) -> Result<RecordOutcome> {
        let update = PriceUpdate {
            item: point.item.clone(),
            price: point.price,
            venue: point.venue.clone(),
            time: point.observed_at,
        };
        let outcome = self.store.record(point)?;
        if outcome == RecordOutcome::Inserted {
            self.hub.publish(EngineEvent::PriceUpdate(update));
        }
        Ok(outcome)
    }

    /// One polling round over every enabled venue and tracked item
    pub async fn collect_prices(&self) -> CollectReport {
        PriceCollector::new(
            self.store.clone(),
            self.venues.clone(),
            Arc::new(self.hub.clone()),
            self.config.collector(),
        )
        .collect_once()
        .await
    }

    pub fn latest_prices(&self, item: &str) -> Arc<BTreeMap<VenueId, PricePoint>> {
        self.store.latest_by_venue(item)
    }

    pub fn price_history(&self, item: &str, venue: &str, since: Timestamp) -> PriceHistory {
        self.store.history(item, venue, since)
    }

    pub fn items(&self) -> Vec<ItemId> {
        self.store.items()
    }

    pub fn analyze(&self, item: &str, venue: &str, since: Timestamp) -> Option<MarketAnalysis> {
        self.analyzer.analyze(item, venue, since)
    }

    pub fn price_change(&self, item: &str, venue: &str, since: Timestamp) -> Option<PriceChange> {
        self.analyzer.price_change(item, venue, since)
    }

    /// Opportunities for one item; `None` uses the configured minimum
    pub fn arbitrage(&self, item: &str, min_profit_percent: Option<Decimal>) -> Vec<ArbitrageOpportunity> {
        let min = min_profit_percent.unwrap_or(self.analyzer.default_min_profit_percent());
        self.analyzer.arbitrage(item, min)
    }

    pub fn scan_arbitrage(&self, min_profit_percent: Option<Decimal>) -> Vec<ArbitrageOpportunity> {
        let min = min_profit_percent.unwrap_or(self.analyzer.default_min_profit_percent());
        self.analyzer.scan_arbitrage(min)
    }

    pub fn market_overview(&self) -> MarketOverview {
        self.analyzer.overview()
    }

    // =========================================================================
    // Inventory and stats
    // =========================================================================

    /// Credit venue assets the ledger does not know yet
    ///
    /// New lots are valued at the venue's latest price, or zero without one.
    /// Returns the number of lots added.
    pub async fn sync_inventory(&self, owner: &str, venue: &str) -> Result<usize> {
        let connector = self.venues.connector(venue)?;
        let owner_id = owner.to_string();
        let assets: Vec<AssetRef> = call_with_timeout(
            self.config.collector().call_timeout,
            connector.get_inventory(&owner_id),
        )
        .await?;

        let mut added = 0;
        for asset in assets {
            if asset.quantity == 0 || self.ledger().contains_asset(owner, venue, &asset.asset_id) {
                continue;
            }
            let price = self
                .store
                .latest(&asset.item, venue)
                .map(|p| p.price)
                .unwrap_or(Decimal::ZERO);
            self.ledger().credit(
                owner,
                &asset.item,
                venue,
                asset.quantity,
                price,
                Some(asset.asset_id.clone()),
            )?;
            added += 1;
        }
        info!("[engine] synced {} new lot(s) for {} from {}", added, owner, venue);
        Ok(added)
    }

    pub fn profit_stats(&self, owner: &str, period: StatsPeriod) -> ProfitStats {
        self.orders.profit_stats(owner, period)
    }

    pub fn trading_stats(&self, owner: &str) -> EngineStats {
        let trading = self
            .orders
            .trading_stats(owner, |item, venue| self.store.latest(item, venue).map(|p| p.price));
        EngineStats {
            total_volume: trading.total_volume,
            active_orders: trading.active_orders,
            inventory_value: trading.inventory_value,
            strategy_count: self.strategies.registry().count(owner),
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(background) = self.background.get_mut().take() {
            let _ = background.stop.send(true);
        }
    }
}
