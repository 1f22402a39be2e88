//! Market Analyzer - analysis over the price store
//!
//! Reads only snapshots from the store; nothing here holds a store lock while
//! computing.

use arbiter_core::{ItemId, PricePoint, Timestamp, VenueId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::arbitrage::{ArbitrageOpportunity, find_opportunities};
use crate::indicators::{self, RSI_PERIOD, Trend};
use crate::store::PriceStore;

/// Percent move separating `up`/`down` from `stable`
const DIRECTION_THRESHOLD: Decimal = dec!(5);

/// Summary statistics for one (item, venue) series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub item: ItemId,
    pub venue: VenueId,
    pub samples: usize,
    pub min: Decimal,
    pub max: Decimal,
    pub mean: Decimal,
    pub std_dev: Decimal,
    pub volatility: Decimal,
    pub ma_7: Option<Decimal>,
    pub ma_14: Option<Decimal>,
    pub ma_30: Option<Decimal>,
    pub rsi: Decimal,
    pub trend: Trend,
    pub last: PricePoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceDirection {
    Up,
    Down,
    Stable,
}

/// First-to-last move of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub first: Decimal,
    pub last: Decimal,
    pub change_percent: Decimal,
    /// None when the first observation had no volume
    pub volume_change_percent: Option<Decimal>,
    pub direction: PriceDirection,
    /// 0.8 for a clear move, 0.6 for stable
    pub confidence: Decimal,
}

/// Cross-item view of the latest quotes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOverview {
    pub items: usize,
    pub quotes: usize,
    pub mean_price: Decimal,
    pub median_price: Option<Decimal>,
}

#[derive(Clone)]
pub struct MarketAnalyzer {
    store: PriceStore,
    default_min_profit_percent: Decimal,
}

impl MarketAnalyzer {
    pub fn new(store: PriceStore, default_min_profit_percent: Decimal) -> Self {
        Self {
            store,
            default_min_profit_percent,
        }
    }

    pub fn default_min_profit_percent(&self) -> Decimal {
        self.default_min_profit_percent
    }

    pub fn store(&self) -> &PriceStore {
        &self.store
    }

    /// Statistics over the series since `since`; None without samples
    pub fn analyze(&self, item: &str, venue: &str, since: Timestamp) -> Option<MarketAnalysis> {
        let history = self.store.history(item, venue, since);
        let last = history.last()?.clone();
        let prices = history.prices();

        Some(MarketAnalysis {
            item: item.to_string(),
            venue: venue.to_string(),
            samples: prices.len(),
            min: indicators::min(&prices).unwrap_or(Decimal::ZERO),
            max: indicators::max(&prices).unwrap_or(Decimal::ZERO),
            mean: indicators::mean(&prices),
            std_dev: indicators::std_dev(&prices),
            volatility: indicators::volatility(&prices),
            ma_7: indicators::sma(&prices, 7),
            ma_14: indicators::sma(&prices, 14),
            ma_30: indicators::sma(&prices, 30),
            rsi: indicators::rsi(&prices, RSI_PERIOD),
            trend: indicators::classify_trend(&prices),
            last,
        })
    }

    pub fn trend(&self, item: &str, venue: &str, since: Timestamp) -> Trend {
        indicators::classify_trend(&self.store.history(item, venue, since).prices())
    }

    /// Move from the first to the last point since `since`
    ///
    /// Needs at least two points.
    pub fn price_change(&self, item: &str, venue: &str, since: Timestamp) -> Option<PriceChange> {
        let history = self.store.history(item, venue, since);
        if history.len() < 2 {
            return None;
        }
        let first = history.first()?;
        let last = history.last()?;

        let change_percent = (last.price - first.price) / first.price * Decimal::ONE_HUNDRED;
        let volume_change_percent = (!first.volume.is_zero())
            .then(|| (last.volume - first.volume) / first.volume * Decimal::ONE_HUNDRED);

        let direction = if change_percent > DIRECTION_THRESHOLD {
            PriceDirection::Up
        } else if change_percent < -DIRECTION_THRESHOLD {
            PriceDirection::Down
        } else {
            PriceDirection::Stable
        };
        let confidence = match direction {
            PriceDirection::Stable => dec!(0.6),
            _ => dec!(0.8),
        };

        Some(PriceChange {
            first: first.price,
            last: last.price,
            change_percent,
            volume_change_percent,
            direction,
            confidence,
        })
    }

    /// Opportunities for one item from its latest cross-venue snapshot
    pub fn arbitrage(&self, item: &str, min_profit_percent: Decimal) -> Vec<ArbitrageOpportunity> {
        let latest = self.store.latest_by_venue(item);
        find_opportunities(item, &latest, min_profit_percent)
    }

    /// Opportunities across every tracked item, best first
    pub fn scan_arbitrage(&self, min_profit_percent: Decimal) -> Vec<ArbitrageOpportunity> {
        let mut all: Vec<ArbitrageOpportunity> = self
            .store
            .items()
            .iter()
            .flat_map(|item| self.arbitrage(item, min_profit_percent))
            .collect();
        all.sort_by(|a, b| b.profit_percent.cmp(&a.profit_percent));
        all
    }

    /// Mean and median over every latest quote
    pub fn overview(&self) -> MarketOverview {
        let items = self.store.items();
        let prices: Vec<Decimal> = items
            .iter()
            .flat_map(|item| {
                self.store
                    .latest_by_venue(item)
                    .values()
                    .map(|p| p.price)
                    .collect::<Vec<_>>()
            })
            .collect();

        MarketOverview {
            items: items.len(),
            quotes: prices.len(),
            mean_price: indicators::mean(&prices),
            median_price: indicators::median(&prices),
        }
    }
}
