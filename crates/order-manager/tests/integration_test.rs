//! Order Manager Integration Test
//!
//! Drives orders end to end against simulated venues:
//! 1. Validation and reservation before anything is stored
//! 2. Execution to completed / failed, with ledger and transaction effects
//! 3. Cancellation and lost-race handling
//! 4. Statistics over the resulting transactions

use std::sync::Arc;
use std::time::Duration;

use arbiter_core::{EngineEvent, OrderStatus, OrderUpdateKind};
use arbiter_gateway::{GatewayError, SimulatedVenue, SimulatedVenueConfig, VenueRegistry};
use arbiter_order_manager::{
    Error, InventoryLedger, LedgerError, OrderManager, OrderManagerConfig, OrderQuery,
    OrderRequest, StatsPeriod,
};
use arbiter_ports::{ConnectorError, RecordingPublisher};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const ITEM: &str = "AK-47 | Redline";

struct Harness {
    manager: OrderManager,
    venue: Arc<SimulatedVenue>,
    publisher: Arc<RecordingPublisher>,
}

fn harness_with(venue_config: SimulatedVenueConfig, config: OrderManagerConfig) -> Harness {
    let _ = env_logger::try_init();

    let venue = Arc::new(SimulatedVenue::with_config("alpha", venue_config));
    let registry = VenueRegistry::new();
    registry.register(venue.clone()).unwrap();
    let publisher = Arc::new(RecordingPublisher::new());
    let manager = OrderManager::new(config, InventoryLedger::new(), registry, publisher.clone());

    Harness {
        manager,
        venue,
        publisher,
    }
}

fn harness() -> Harness {
    harness_with(SimulatedVenueConfig::default(), OrderManagerConfig::default())
}

fn order_kinds(publisher: &RecordingPublisher) -> Vec<OrderUpdateKind> {
    publisher
        .events_of("order_update")
        .into_iter()
        .filter_map(|e| match e {
            EngineEvent::OrderUpdate(update) => Some(update.kind),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_buy_completes_and_credits_inventory() {
    let h = harness();

    let (order, done) = h
        .manager
        .submit(OrderRequest::buy("alice", ITEM, "alpha", dec!(50), 2))
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    let order = done.await.unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert!(order.executed_at.is_some());
    assert_eq!(order.venue_order_ref.as_deref(), Some("alpha-1"));

    let lots = h.manager.ledger().records("alice");
    assert_eq!(lots.len(), 1);
    assert_eq!(lots[0].quantity, 2);
    assert_eq!(lots[0].acquired_price, dec!(50));

    let txs = h.manager.transactions("alice");
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].amount, dec!(100));
    assert_eq!(txs[0].fee, dec!(2.5));
    assert_eq!(txs[0].profit, None);

    assert_eq!(
        order_kinds(&h.publisher),
        vec![OrderUpdateKind::Created, OrderUpdateKind::Completed]
    );
}

#[tokio::test]
async fn test_sell_realizes_profit_against_lot_price() {
    let h = harness();
    h.manager
        .ledger()
        .credit("alice", ITEM, "alpha", 1, dec!(50), None)
        .unwrap();

    let (_, done) = h
        .manager
        .submit(OrderRequest::sell("alice", ITEM, "alpha", dec!(80), 1))
        .unwrap();
    let order = done.await.unwrap();

    assert_eq!(order.status, OrderStatus::Completed);
    let txs = h.manager.transactions("alice");
    assert_eq!(txs[0].fee, dec!(2));
    assert_eq!(txs[0].profit, Some(dec!(28.0)));
    assert!(h.manager.ledger().records("alice").is_empty());

    let stats = h.manager.profit_stats("alice", StatsPeriod::Day);
    assert_eq!(stats.trade_count, 1);
    assert_eq!(stats.total_profit, dec!(28));
    assert_eq!(stats.win_rate, dec!(100));
}

#[tokio::test]
async fn test_invalid_requests_are_never_stored() {
    let h = harness();

    assert_eq!(
        h.manager
            .create_order(OrderRequest::buy("alice", ITEM, "alpha", dec!(0), 1))
            .unwrap_err(),
        Error::InvalidPrice(dec!(0))
    );
    assert_eq!(
        h.manager
            .create_order(OrderRequest::buy("alice", ITEM, "alpha", dec!(10), 0))
            .unwrap_err(),
        Error::InvalidQuantity(0)
    );
    assert_eq!(
        h.manager
            .create_order(OrderRequest::buy("alice", ITEM, "nowhere", dec!(10), 1))
            .unwrap_err(),
        Error::Venue(GatewayError::UnknownVenue("nowhere".into()))
    );

    h.manager.registry().set_enabled("alpha", false).unwrap();
    assert_eq!(
        h.manager
            .create_order(OrderRequest::buy("alice", ITEM, "alpha", dec!(10), 1))
            .unwrap_err(),
        Error::Venue(GatewayError::VenueDisabled("alpha".into()))
    );

    assert!(matches!(
        h.manager
            .create_order(OrderRequest::sell("alice", ITEM, "nowhere", dec!(10), 1)),
        Err(Error::Venue(_))
    ));

    assert_eq!(h.manager.orders("alice", &OrderQuery::default()).total, 0);
    assert!(h.publisher.events().is_empty());
}

#[tokio::test]
async fn test_overflowing_amount_is_rejected_before_reserving() {
    let h = harness();
    h.manager
        .ledger()
        .credit("alice", ITEM, "alpha", 2, dec!(50), None)
        .unwrap();

    let err = h
        .manager
        .create_order(OrderRequest::sell("alice", ITEM, "alpha", Decimal::MAX, 2))
        .unwrap_err();
    assert_eq!(
        err,
        Error::AmountOverflow {
            price: Decimal::MAX,
            quantity: 2
        }
    );

    assert_eq!(h.manager.ledger().available_quantity("alice", ITEM), 2);
    assert_eq!(h.manager.orders("alice", &OrderQuery::default()).total, 0);
    assert!(h.publisher.events().is_empty());
}

#[tokio::test]
async fn test_unsettleable_sell_fails_and_releases_lot() {
    let h = harness();
    h.manager
        .ledger()
        .credit("alice", ITEM, "alpha", 2, Decimal::MAX, None)
        .unwrap();

    let (_, done) = h
        .manager
        .submit(OrderRequest::sell("alice", ITEM, "alpha", dec!(10), 2))
        .unwrap();
    let order = done.await.unwrap();

    assert_eq!(order.status, OrderStatus::Failed);
    assert!(order.failure_reason.is_some());
    assert_eq!(h.manager.ledger().available_quantity("alice", ITEM), 2);
    assert!(h.manager.transactions("alice").is_empty());
    assert_eq!(
        order_kinds(&h.publisher),
        vec![OrderUpdateKind::Created, OrderUpdateKind::Failed]
    );
}

#[tokio::test]
async fn test_sell_without_inventory_is_rejected() {
    let h = harness();

    let err = h
        .manager
        .create_order(OrderRequest::sell("alice", ITEM, "alpha", dec!(80), 1))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Inventory(LedgerError::InsufficientInventory { .. })
    ));
    assert_eq!(h.manager.orders("alice", &OrderQuery::default()).total, 0);
}

#[tokio::test]
async fn test_second_sell_on_same_lot_sees_already_locked() {
    let h = harness();
    h.manager
        .ledger()
        .credit("alice", ITEM, "alpha", 1, dec!(50), None)
        .unwrap();

    let first = h
        .manager
        .create_order(OrderRequest::sell("alice", ITEM, "alpha", dec!(80), 1));
    let second = h
        .manager
        .create_order(OrderRequest::sell("alice", ITEM, "alpha", dec!(81), 1));

    assert!(first.is_ok());
    assert!(matches!(
        second,
        Err(Error::Inventory(LedgerError::AlreadyLocked { .. }))
    ));
    assert_eq!(h.manager.orders("alice", &OrderQuery::default()).total, 1);
}

#[tokio::test]
async fn test_failed_sell_releases_lock() {
    let h = harness();
    h.manager
        .ledger()
        .credit("alice", ITEM, "alpha", 1, dec!(50), None)
        .unwrap();
    h.venue
        .fail_with(ConnectorError::Rejected("listing closed".into()));

    let (_, done) = h
        .manager
        .submit(OrderRequest::sell("alice", ITEM, "alpha", dec!(80), 1))
        .unwrap();
    let order = done.await.unwrap();

    assert_eq!(order.status, OrderStatus::Failed);
    assert!(order.failure_reason.unwrap().contains("listing closed"));
    assert_eq!(h.manager.ledger().available_quantity("alice", ITEM), 1);
    assert!(h.manager.transactions("alice").is_empty());
    assert_eq!(
        order_kinds(&h.publisher),
        vec![OrderUpdateKind::Created, OrderUpdateKind::Failed]
    );
}

#[tokio::test(start_paused = true)]
async fn test_venue_timeout_fails_order() {
    let h = harness_with(
        SimulatedVenueConfig {
            latency: Duration::from_secs(120),
            ..Default::default()
        },
        OrderManagerConfig {
            connector_timeout: Duration::from_secs(5),
            ..Default::default()
        },
    );

    let (_, done) = h
        .manager
        .submit(OrderRequest::buy("alice", ITEM, "alpha", dec!(50), 1))
        .unwrap();
    let order = done.await.unwrap();

    assert_eq!(order.status, OrderStatus::Failed);
    assert!(order.failure_reason.unwrap().contains("timed out"));
    assert!(h.manager.ledger().records("alice").is_empty());
}

#[tokio::test]
async fn test_cancel_before_execution_releases_lock() {
    let h = harness();
    h.manager
        .ledger()
        .credit("alice", ITEM, "alpha", 1, dec!(50), None)
        .unwrap();

    let (order, done) = h
        .manager
        .submit(OrderRequest::sell("alice", ITEM, "alpha", dec!(80), 1))
        .unwrap();

    assert!(matches!(
        h.manager.cancel_order(order.id, "mallory"),
        Err(Error::Unauthorized { .. })
    ));

    let cancelled = h.manager.cancel_order(order.id, "alice").unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(h.manager.ledger().available_quantity("alice", ITEM), 1);

    let settled = done.await.unwrap();
    assert_eq!(settled.status, OrderStatus::Cancelled);
    assert!(h.venue.calls().is_empty());

    assert!(matches!(
        h.manager.cancel_order(order.id, "alice"),
        Err(Error::NotCancellable {
            status: OrderStatus::Cancelled,
            ..
        })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_venue_fill_after_cancel_is_ignored() {
    let h = harness_with(
        SimulatedVenueConfig {
            latency: Duration::from_secs(10),
            ..Default::default()
        },
        OrderManagerConfig::default(),
    );
    h.manager
        .ledger()
        .credit("alice", ITEM, "alpha", 1, dec!(50), None)
        .unwrap();

    let (order, done) = h
        .manager
        .submit(OrderRequest::sell("alice", ITEM, "alpha", dec!(80), 1))
        .unwrap();
    // let the execution task reach the venue call
    tokio::task::yield_now().await;

    h.manager.cancel_order(order.id, "alice").unwrap();
    let settled = done.await.unwrap();

    assert_eq!(settled.status, OrderStatus::Cancelled);
    assert_eq!(h.venue.calls().len(), 1);
    assert!(h.manager.transactions("alice").is_empty());
    assert_eq!(h.manager.ledger().available_quantity("alice", ITEM), 1);
    assert_eq!(
        order_kinds(&h.publisher),
        vec![OrderUpdateKind::Created, OrderUpdateKind::Cancelled]
    );
}

#[tokio::test]
async fn test_listing_pages_newest_first_and_stats() {
    let h = harness();

    let mut ids = Vec::new();
    for price in [10, 20, 30] {
        let (order, done) = h
            .manager
            .submit(OrderRequest::buy("alice", ITEM, "alpha", price.into(), 1))
            .unwrap();
        done.await.unwrap();
        ids.push(order.id);
    }

    let page = h.manager.orders(
        "alice",
        &OrderQuery {
            status: Some(OrderStatus::Completed),
            page: 1,
            page_size: 2,
        },
    );
    assert_eq!(page.total, 3);
    assert_eq!(page.orders.len(), 2);
    assert_eq!(page.orders[0].id, ids[2]);

    let stats = h.manager.trading_stats("alice", |_, _| Some(dec!(25)));
    assert_eq!(stats.total_volume, dec!(60));
    assert_eq!(stats.active_orders, 0);
    assert_eq!(stats.inventory_value, dec!(75));
}
