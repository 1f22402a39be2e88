//! Strategy Scheduler Integration Test
//!
//! Runs strategies against simulated venues through the real order manager:
//! 1. Ticks of one strategy never overlap
//! 2. Periodic evaluation starts on activate and ends on deactivate
//! 3. Sells are limited to what the owner holds
//! 4. Failed orders are reported, not fatal

use std::sync::Arc;
use std::time::Duration;

use arbiter_core::{EngineEvent, NotificationLevel, OrderStatus, PricePoint, Side};
use arbiter_gateway::{SimulatedVenue, SimulatedVenueConfig, VenueRegistry};
use arbiter_market::PriceStore;
use arbiter_order_manager::{InventoryLedger, OrderManager, OrderManagerConfig, OrderQuery};
use arbiter_ports::{ConnectorError, RecordingPublisher};
use arbiter_strategy::{
    ArbitrageParams, NewStrategy, SchedulerConfig, Strategy, StrategyExecutor, StrategyParams,
    StrategyRegistry, StrategyScheduler, StrategyStatus, StrategyUpdate, TickOutcome,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const ITEM: &str = "AK-47 | Redline";
const OWNER: &str = "alice";

struct Harness {
    scheduler: StrategyScheduler,
    registry: StrategyRegistry,
    store: PriceStore,
    orders: OrderManager,
    alpha: Arc<SimulatedVenue>,
    beta: Arc<SimulatedVenue>,
    publisher: Arc<RecordingPublisher>,
}

fn harness(latency: Duration) -> Harness {
    let _ = env_logger::try_init();

    let config = SimulatedVenueConfig {
        latency,
        ..Default::default()
    };
    let alpha = Arc::new(SimulatedVenue::with_config("alpha", config.clone()));
    let beta = Arc::new(SimulatedVenue::with_config("beta", config));
    let venues = VenueRegistry::new();
    venues.register(alpha.clone()).unwrap();
    venues.register(beta.clone()).unwrap();

    let publisher = Arc::new(RecordingPublisher::new());
    let orders = OrderManager::new(
        OrderManagerConfig::default(),
        InventoryLedger::new(),
        venues,
        publisher.clone(),
    );
    let store = PriceStore::default();
    store.record(PricePoint::new(ITEM, "alpha", dec!(100))).unwrap();
    store.record(PricePoint::new(ITEM, "beta", dec!(120))).unwrap();

    let registry = StrategyRegistry::new();
    let scheduler = StrategyScheduler::new(
        SchedulerConfig::default(),
        registry.clone(),
        store.clone(),
        orders.clone(),
        publisher.clone(),
    );

    Harness {
        scheduler,
        registry,
        store,
        orders,
        alpha,
        beta,
        publisher,
    }
}

/// Buys at alpha below `buy`, sells at beta above `sell`
fn arbitrage(buy: Decimal, sell: Decimal) -> StrategyParams {
    StrategyParams::Arbitrage(ArbitrageParams {
        buy_threshold: buy,
        sell_threshold: sell,
        min_spread_percent: dec!(10),
        min_spread_amount: dec!(5),
        quantity: 1,
    })
}

fn create(h: &Harness, params: StrategyParams) -> Strategy {
    h.scheduler
        .create(NewStrategy::new(OWNER, ITEM, "spread", params))
        .unwrap()
}

fn executor(h: &Harness, strategy: &Strategy) -> Arc<StrategyExecutor> {
    Arc::new(StrategyExecutor::new(
        strategy,
        h.registry.clone(),
        h.store.clone(),
        h.orders.clone(),
        chrono::Duration::days(30),
    ))
}

fn placed(h: &Harness) -> usize {
    h.orders.orders(OWNER, &OrderQuery::default()).total
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_tick_is_deferred() {
    let h = harness(Duration::from_secs(10));
    let strategy = create(&h, arbitrage(dec!(105), dec!(1000)));
    h.registry
        .set_status(strategy.id, OWNER, StrategyStatus::Active)
        .unwrap();
    let executor = executor(&h, &strategy);

    let first = tokio::spawn({
        let executor = executor.clone();
        async move { executor.tick().await }
    });
    tokio::task::yield_now().await;

    // first tick is waiting on the venue
    assert_eq!(executor.tick().await, TickOutcome::Deferred);

    let TickOutcome::Executed { orders } = first.await.unwrap() else {
        panic!("first tick did not execute");
    };
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Completed);
    assert_eq!(orders[0].side, Side::Buy);
    assert_eq!(orders[0].venue, "alpha");
    assert_eq!(orders[0].strategy_id, Some(strategy.id));
    assert_eq!(placed(&h), 1);
}

#[tokio::test]
async fn test_paused_strategy_is_inactive() {
    let h = harness(Duration::ZERO);
    let strategy = create(&h, arbitrage(dec!(105), dec!(1000)));

    assert_eq!(executor(&h, &strategy).tick().await, TickOutcome::Inactive);
    assert_eq!(placed(&h), 0);
}

#[tokio::test]
async fn test_sell_limited_to_holdings() {
    let h = harness(Duration::ZERO);
    let strategy = create(&h, arbitrage(dec!(50), dec!(110)));
    h.registry
        .set_status(strategy.id, OWNER, StrategyStatus::Active)
        .unwrap();
    let executor = executor(&h, &strategy);

    // nothing held: the sell intent is dropped
    assert_eq!(
        executor.tick().await,
        TickOutcome::Executed { orders: vec![] }
    );
    assert!(h.beta.calls().is_empty());

    h.orders
        .ledger()
        .credit(OWNER, ITEM, "alpha", 1, dec!(90), Some("asset-1".into()))
        .unwrap();

    let TickOutcome::Executed { orders } = executor.tick().await else {
        panic!("tick did not execute");
    };
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].side, Side::Sell);
    assert_eq!(orders[0].status, OrderStatus::Completed);
    assert_eq!(h.orders.ledger().held_quantity(OWNER, ITEM), 0);
}

#[tokio::test(start_paused = true)]
async fn test_activate_runs_periodically_until_deactivated() {
    let h = harness(Duration::ZERO);
    let strategy = create(&h, arbitrage(dec!(105), dec!(1000)));

    h.scheduler.activate(strategy.id, OWNER).await.unwrap();
    assert!(h.scheduler.is_running(strategy.id));

    // first evaluation is one interval after activation
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(placed(&h), 0);
    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(placed(&h), 1);

    let paused = h.scheduler.deactivate(strategy.id, OWNER).await.unwrap();
    assert_eq!(paused.status, StrategyStatus::Paused);
    assert!(!h.scheduler.is_running(strategy.id));

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(placed(&h), 1);
    assert!(!h.publisher.events_of("notification").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_orders_do_not_stop_strategy() {
    let h = harness(Duration::ZERO);
    h.alpha
        .fail_with(ConnectorError::Rejected("maintenance".into()));
    let strategy = create(&h, arbitrage(dec!(105), dec!(1000)));
    h.scheduler.activate(strategy.id, OWNER).await.unwrap();

    tokio::time::sleep(Duration::from_secs(121)).await;

    let failed = h.orders.orders(
        OWNER,
        &OrderQuery {
            status: Some(OrderStatus::Failed),
            ..Default::default()
        },
    );
    assert_eq!(failed.total, 2);
    assert!(h.scheduler.is_running(strategy.id));

    // one warning per failed order
    let warnings = h
        .publisher
        .events_of("notification")
        .into_iter()
        .filter(|e| matches!(e, EngineEvent::Notification(n) if n.level == NotificationLevel::Warning))
        .count();
    assert_eq!(warnings, 2);

    h.scheduler.shutdown().await;
    assert_eq!(h.scheduler.running_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_update_restarts_and_delete_stops() {
    let h = harness(Duration::ZERO);
    let strategy = create(&h, arbitrage(dec!(50), dec!(1000)));
    h.scheduler.activate(strategy.id, OWNER).await.unwrap();

    // thresholds out of reach: nothing happens
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(placed(&h), 0);

    let updated = h
        .scheduler
        .update(
            strategy.id,
            OWNER,
            StrategyUpdate::params(arbitrage(dec!(105), dec!(1000))),
        )
        .await
        .unwrap();
    assert!(updated.is_active());
    assert!(h.scheduler.is_running(strategy.id));

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(placed(&h), 1);

    h.scheduler.delete(strategy.id, OWNER).await.unwrap();
    assert!(!h.scheduler.is_running(strategy.id));
    assert!(h.registry.get(strategy.id).is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_activate_and_deactivate_keep_task_in_step() {
    let h = harness(Duration::ZERO);
    let strategy = create(&h, arbitrage(dec!(50), dec!(1000)));
    let id = strategy.id;

    for _ in 0..200 {
        let activate = tokio::spawn({
            let scheduler = h.scheduler.clone();
            async move { scheduler.activate(id, OWNER).await }
        });
        let deactivate = tokio::spawn({
            let scheduler = h.scheduler.clone();
            async move { scheduler.deactivate(id, OWNER).await }
        });
        activate.await.unwrap().unwrap();
        deactivate.await.unwrap().unwrap();

        assert_eq!(h.registry.is_active(id), h.scheduler.is_running(id));
    }

    h.scheduler.shutdown().await;
    assert_eq!(h.scheduler.running_count(), 0);
}

#[tokio::test]
async fn test_evaluate_now_requires_running_task() {
    let h = harness(Duration::ZERO);
    let strategy = create(&h, arbitrage(dec!(105), dec!(1000)));

    assert!(h.scheduler.evaluate_now(strategy.id, OWNER).await.is_err());

    h.scheduler.activate(strategy.id, OWNER).await.unwrap();
    let outcome = h.scheduler.evaluate_now(strategy.id, OWNER).await.unwrap();
    assert!(matches!(outcome, TickOutcome::Executed { ref orders } if orders.len() == 1));
    assert!(h.scheduler.evaluate_now(strategy.id, "bob").await.is_err());

    h.scheduler.shutdown().await;
}
