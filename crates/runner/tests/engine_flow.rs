//! Engine Integration Test
//!
//! Exercises the engine end to end against simulated venues:
//! 1. Prices recorded or collected reach the store and subscribers
//! 2. A strategy activated through the engine trades on its schedule
//! 3. Manual orders, inventory sync and statistics agree with each other

use std::sync::Arc;
use std::time::Duration;

use arbiter_core::{AssetRef, OrderStatus, PricePoint};
use arbiter_gateway::SimulatedVenue;
use arbiter_market::RecordOutcome;
use arbiter_order_manager::{OrderQuery, OrderRequest, StatsPeriod};
use arbiter_runner::{Engine, EngineConfig, EngineError};
use arbiter_strategy::{ArbitrageParams, NewStrategy, StrategyParams, StrategyStatus};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const ITEM: &str = "AK-47 | Redline";
const OWNER: &str = "alice";

struct Harness {
    engine: Engine,
    alpha: Arc<SimulatedVenue>,
    beta: Arc<SimulatedVenue>,
}

fn harness(config: &str) -> Harness {
    let _ = env_logger::try_init();

    let engine = Engine::new(EngineConfig::from_json(config).unwrap()).unwrap();
    let alpha = Arc::new(SimulatedVenue::new("alpha"));
    let beta = Arc::new(SimulatedVenue::new("beta"));
    engine.register_venue(alpha.clone()).unwrap();
    engine.register_venue(beta.clone()).unwrap();

    Harness {
        engine,
        alpha,
        beta,
    }
}

fn drain(rx: &mut tokio::sync::mpsc::Receiver<Arc<str>>) -> Vec<serde_json::Value> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(serde_json::from_str(&frame).unwrap());
    }
    frames
}

#[tokio::test]
async fn test_record_price_broadcasts_once() {
    let h = harness("{}");
    let (_, mut rx) = h.engine.hub().register();

    let point = PricePoint::new(ITEM, "alpha", dec!(100));
    assert_eq!(h.engine.record_price(point.clone()).unwrap(), RecordOutcome::Inserted);
    assert_eq!(h.engine.record_price(point).unwrap(), RecordOutcome::Duplicate);

    let frames = drain(&mut rx);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["type"], "price_update");
    assert_eq!(frames[0]["data"]["venue"], "alpha");

    assert!(matches!(
        h.engine.record_price(PricePoint::new(ITEM, "alpha", Decimal::ZERO)),
        Err(EngineError::Price(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_collector_runs_until_shutdown() {
    let h = harness(
        r#"{"market": {"tracked_items": ["AK-47 | Redline"], "collect_interval_ms": 1000}}"#,
    );
    h.alpha.set_price(ITEM, dec!(100));
    h.beta.set_price(ITEM, dec!(125));

    h.engine.start().unwrap();
    assert!(matches!(h.engine.start(), Err(EngineError::AlreadyStarted)));

    tokio::time::sleep(Duration::from_millis(2500)).await;
    let latest = h.engine.latest_prices(ITEM);
    assert_eq!(latest.len(), 2);
    assert_eq!(latest["beta"].price, dec!(125));

    let opportunities = h.engine.arbitrage(ITEM, None);
    assert_eq!(opportunities.len(), 1);
    assert_eq!(opportunities[0].buy_venue, "alpha");
    assert_eq!(opportunities[0].profit_percent, dec!(25));
    assert!(h.engine.arbitrage(ITEM, Some(dec!(30))).is_empty());

    h.engine.shutdown().await;
    assert!(!h.engine.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_strategy_trades_through_engine() {
    let h = harness(r#"{"strategy": {"evaluation_interval_ms": 1000}}"#);
    h.engine.record_price(PricePoint::new(ITEM, "alpha", dec!(100))).unwrap();
    h.engine.record_price(PricePoint::new(ITEM, "beta", dec!(120))).unwrap();
    let (_, mut rx) = h.engine.hub().register();

    let strategy = h
        .engine
        .create_strategy(NewStrategy::new(
            OWNER,
            ITEM,
            "spread",
            StrategyParams::Arbitrage(ArbitrageParams {
                buy_threshold: dec!(105),
                sell_threshold: dec!(1000),
                min_spread_percent: dec!(10),
                min_spread_amount: Decimal::ZERO,
                quantity: 1,
            }),
        ))
        .unwrap();
    assert_eq!(strategy.status, StrategyStatus::Paused);
    assert_eq!(h.engine.trading_stats(OWNER).strategy_count, 1);

    h.engine.activate_strategy(strategy.id, OWNER).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let paused = h.engine.deactivate_strategy(strategy.id, OWNER).await.unwrap();
    assert_eq!(paused.status, StrategyStatus::Paused);

    let page = h.engine.orders(OWNER, &OrderQuery::default());
    assert_eq!(page.total, 1);
    assert_eq!(page.orders[0].status, OrderStatus::Completed);
    assert_eq!(page.orders[0].strategy_id, Some(strategy.id));
    assert_eq!(h.engine.ledger().held_quantity(OWNER, ITEM), 1);

    let kinds: Vec<String> = drain(&mut rx)
        .into_iter()
        .filter(|f| f["type"] == "order_update")
        .map(|f| f["data"]["kind"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(kinds, vec!["created", "completed"]);

    let stats = h.engine.trading_stats(OWNER);
    assert_eq!(stats.total_volume, dec!(100));
    assert_eq!(stats.active_orders, 0);
    assert_eq!(stats.inventory_value, dec!(100));
}

#[tokio::test]
async fn test_manual_orders_and_inventory_sync() {
    let h = harness(r#"{"venues": [{"name": "beta", "enabled": false}]}"#);
    h.engine.record_price(PricePoint::new(ITEM, "alpha", dec!(50))).unwrap();
    h.alpha.add_holding(OWNER, AssetRef::new("asset-7", ITEM, 1));

    // disabled venue rejects creation
    assert!(matches!(
        h.engine.create_order(OrderRequest::buy(OWNER, ITEM, "beta", dec!(50), 1)),
        Err(EngineError::Order(_))
    ));

    assert_eq!(h.engine.sync_inventory(OWNER, "alpha").await.unwrap(), 1);
    assert_eq!(h.engine.sync_inventory(OWNER, "alpha").await.unwrap(), 0);
    assert_eq!(h.engine.ledger().available_quantity(OWNER, ITEM), 1);

    let (_, done) = h
        .engine
        .submit_order(OrderRequest::sell(OWNER, ITEM, "alpha", dec!(80), 1))
        .unwrap();
    let sold = done.await.unwrap();
    assert_eq!(sold.status, OrderStatus::Completed);

    let transactions = h.engine.transactions(OWNER);
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].profit, Some(dec!(28.0)));

    let profit = h.engine.profit_stats(OWNER, StatsPeriod::Day);
    assert_eq!(profit.trade_count, 1);
    assert_eq!(profit.total_profit, dec!(28.0));

    // a completed order can no longer be cancelled
    assert!(h.engine.cancel_order(sold.id, OWNER).is_err());
    let updated = h.engine.order(sold.id).unwrap();
    assert_eq!(updated.status, OrderStatus::Completed);
}
