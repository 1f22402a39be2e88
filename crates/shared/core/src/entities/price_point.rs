use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{ItemId, VenueId};

/// A single price observation for an item at a venue
///
/// Immutable once recorded. Two points are the same observation when
/// `(item, venue, observed_at)` match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub item: ItemId,
    pub venue: VenueId,
    pub price: Decimal,
    pub volume: Decimal,
    pub currency: String,
    pub observed_at: DateTime<Utc>,
}

impl PricePoint {
    /// Create an observation with explicit timestamp
    pub fn new_with_time(
        item: impl Into<ItemId>,
        venue: impl Into<VenueId>,
        price: Decimal,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            item: item.into(),
            venue: venue.into(),
            price,
            volume: Decimal::ZERO,
            currency: "CNY".to_string(),
            observed_at,
        }
    }

    /// Create an observation using current system time
    pub fn new(item: impl Into<ItemId>, venue: impl Into<VenueId>, price: Decimal) -> Self {
        Self::new_with_time(item, venue, price, Utc::now())
    }

    pub fn with_volume(mut self, volume: Decimal) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Whether two points describe the same observation
    pub fn same_observation(&self, other: &PricePoint) -> bool {
        self.item == other.item
            && self.venue == other.venue
            && self.observed_at == other.observed_at
    }
}
