//! Price Store - append-only observation series with a latest-value cache
//!
//! Each item owns one book guarded by its map entry: per-venue series sorted
//! by `observed_at`, and an `Arc` snapshot of the newest point per venue.
//! Readers clone the `Arc`; a writer replaces it under the entry lock, so a
//! reader never sees a partially updated latest map.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use arbiter_core::{ItemId, PricePoint, Timestamp, VenueId};
use dashmap::DashMap;
use log::{debug, trace};
use rust_decimal::Decimal;

use crate::error::{PriceStoreError, Result};

/// Configuration for the price store
#[derive(Debug, Clone)]
pub struct PriceStoreConfig {
    /// Max points retained per (item, venue) series
    pub history_limit: usize,
}

impl Default for PriceStoreConfig {
    fn default() -> Self {
        Self {
            history_limit: 10_000,
        }
    }
}

/// Result of recording an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Stored (and, if newest, cached as latest)
    Inserted,
    /// Same (item, venue, observed_at) already stored; nothing changed
    Duplicate,
    /// Older than everything in a full series; not retained
    Expired,
}

#[derive(Default)]
struct ItemBook {
    series: HashMap<VenueId, VecDeque<PricePoint>>,
    latest: Arc<BTreeMap<VenueId, PricePoint>>,
}

/// Snapshot of one series, ascending by `observed_at`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    points: Vec<PricePoint>,
}

impl PriceHistory {
    pub fn iter(&self) -> std::slice::Iter<'_, PricePoint> {
        self.points.iter()
    }

    /// Prices only, in time order
    pub fn prices(&self) -> Vec<Decimal> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl IntoIterator for PriceHistory {
    type Item = PricePoint;
    type IntoIter = std::vec::IntoIter<PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a PriceHistory {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// In-memory price store
///
/// Cheap to clone; clones share the same books.
#[derive(Clone)]
pub struct PriceStore {
    books: Arc<DashMap<ItemId, ItemBook>>,
    config: PriceStoreConfig,
}

impl PriceStore {
    pub fn new(config: PriceStoreConfig) -> Self {
        Self {
            books: Arc::new(DashMap::new()),
            config,
        }
    }

    /// Append an observation
    ///
    /// Out-of-order points land at their sorted position; the latest cache
    /// only moves forward in time.
    pub fn record(&self, point: PricePoint) -> Result<RecordOutcome> {
        if point.price <= Decimal::ZERO {
            return Err(PriceStoreError::InvalidPrice(point.price));
        }
        if point.volume < Decimal::ZERO {
            return Err(PriceStoreError::InvalidVolume(point.volume));
        }

        let limit = self.config.history_limit.max(1);
        let mut book = self.books.entry(point.item.clone()).or_default();
        let book = &mut *book;
        let series = book.series.entry(point.venue.clone()).or_default();

        let pos = match series.binary_search_by(|p| p.observed_at.cmp(&point.observed_at)) {
            Ok(_) => {
                trace!(
                    "[price-store] duplicate {}@{} at {}",
                    point.item, point.venue, point.observed_at
                );
                return Ok(RecordOutcome::Duplicate);
            }
            Err(pos) => pos,
        };
        if pos == 0 && series.len() >= limit {
            return Ok(RecordOutcome::Expired);
        }

        series.insert(pos, point.clone());
        while series.len() > limit {
            series.pop_front();
        }

        let advances = book
            .latest
            .get(&point.venue)
            .is_none_or(|current| current.observed_at < point.observed_at);
        if advances {
            debug!(
                "[price-store] {}@{} -> {}",
                point.item, point.venue, point.price
            );
            Arc::make_mut(&mut book.latest).insert(point.venue.clone(), point);
        }

        Ok(RecordOutcome::Inserted)
    }

    /// Newest point per venue, captured at a single instant
    pub fn latest_by_venue(&self, item: &str) -> Arc<BTreeMap<VenueId, PricePoint>> {
        self.books
            .get(item)
            .map(|book| Arc::clone(&book.latest))
            .unwrap_or_default()
    }

    /// Newest point for one venue
    pub fn latest(&self, item: &str, venue: &str) -> Option<PricePoint> {
        self.latest_by_venue(item).get(venue).cloned()
    }

    /// Points with `observed_at >= since`, ascending
    pub fn history(&self, item: &str, venue: &str, since: Timestamp) -> PriceHistory {
        let Some(book) = self.books.get(item) else {
            return PriceHistory::default();
        };
        let Some(series) = book.series.get(venue) else {
            return PriceHistory::default();
        };

        let start = series.partition_point(|p| p.observed_at < since);
        PriceHistory {
            points: series.range(start..).cloned().collect(),
        }
    }

    /// Items with at least one observation
    pub fn items(&self) -> Vec<ItemId> {
        let mut items: Vec<ItemId> = self.books.iter().map(|e| e.key().clone()).collect();
        items.sort();
        items
    }

    /// Venues that have quoted an item
    pub fn venues(&self, item: &str) -> Vec<VenueId> {
        self.latest_by_venue(item).keys().cloned().collect()
    }

    /// Points retained for one series
    pub fn series_len(&self, item: &str, venue: &str) -> usize {
        self.books
            .get(item)
            .and_then(|book| book.series.get(venue).map(VecDeque::len))
            .unwrap_or(0)
    }

    pub fn config(&self) -> &PriceStoreConfig {
        &self.config
    }
}

impl Default for PriceStore {
    fn default() -> Self {
        Self::new(PriceStoreConfig::default())
    }
}
