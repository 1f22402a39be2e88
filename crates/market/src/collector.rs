//! Price Collector - polls every enabled venue into the price store

use std::sync::Arc;
use std::time::Duration;

use arbiter_core::{EngineEvent, ItemId, PricePoint, PriceUpdate};
use arbiter_gateway::{VenueRegistry, call_with_timeout};
use arbiter_ports::{ConnectorError, EventPublisher, VenueConnector};
use futures_util::future::join_all;
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::store::{PriceStore, RecordOutcome};

/// Configuration for the price collector
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Time between polling rounds
    pub interval: Duration,
    /// Items requested from every venue each round
    pub tracked_items: Vec<ItemId>,
    /// Deadline for one `get_price` call
    pub call_timeout: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            tracked_items: Vec::new(),
            call_timeout: Duration::from_secs(10),
        }
    }
}

/// Counts from one polling round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectReport {
    pub inserted: usize,
    pub duplicates: usize,
    pub failures: usize,
}

pub struct PriceCollector {
    store: PriceStore,
    registry: VenueRegistry,
    publisher: Arc<dyn EventPublisher>,
    config: CollectorConfig,
}

impl PriceCollector {
    pub fn new(
        store: PriceStore,
        registry: VenueRegistry,
        publisher: Arc<dyn EventPublisher>,
        config: CollectorConfig,
    ) -> Self {
        Self {
            store,
            registry,
            publisher,
            config,
        }
    }

    /// Poll every (enabled venue, tracked item) pair once
    pub async fn collect_once(&self) -> CollectReport {
        let calls = self.registry.enabled().into_iter().flat_map(|connector| {
            self.config
                .tracked_items
                .iter()
                .map(move |item| fetch(Arc::clone(&connector), item.clone(), self.config.call_timeout))
        });
        let results = join_all(calls).await;

        let mut report = CollectReport::default();
        for result in results {
            match result {
                Ok(point) => self.ingest(point, &mut report),
                Err((venue, item, e)) => {
                    warn!("[collector] {} {} failed: {}", venue, item, e);
                    report.failures += 1;
                }
            }
        }
        debug!(
            "[collector] round done: {} new, {} dup, {} failed",
            report.inserted, report.duplicates, report.failures
        );
        report
    }

    fn ingest(&self, point: PricePoint, report: &mut CollectReport) {
        let update = PriceUpdate {
            item: point.item.clone(),
            price: point.price,
            venue: point.venue.clone(),
            time: point.observed_at,
        };
        match self.store.record(point) {
            Ok(RecordOutcome::Inserted) => {
                report.inserted += 1;
                self.publisher.publish(EngineEvent::PriceUpdate(update));
            }
            Ok(RecordOutcome::Duplicate | RecordOutcome::Expired) => report.duplicates += 1,
            Err(e) => {
                warn!("[collector] {}@{} rejected: {}", update.item, update.venue, e);
                report.failures += 1;
            }
        }
    }

    /// Poll on every interval until `stop` flips to true or its sender drops
    pub fn spawn(self, mut stop: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "[collector] started: {} items every {:?}",
                self.config.tracked_items.len(),
                self.config.interval
            );
            let mut ticker = tokio::time::interval(self.config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        self.collect_once().await;
                    }
                }
            }
            info!("[collector] stopped");
        })
    }
}

async fn fetch(
    connector: Arc<dyn VenueConnector>,
    item: ItemId,
    limit: Duration,
) -> Result<PricePoint, (String, ItemId, ConnectorError)> {
    call_with_timeout(limit, connector.get_price(&item))
        .await
        .map_err(|e| (connector.name(), item, e))
}
